#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::{NameRegistered, Settlement};
use crate::instructions::register::utils::*;
use crate::instructions::utils::*;
use crate::pricing::{PriceUnit, PythRateSource};
use crate::registry::{self, ChildRegistration};
use crate::state::*;

/// Account constraints for child name registration
///
/// Registers `label` under `parent_node` for a fee collected from the payer and
/// forwarded to the parent's beneficiary. A label whose record has expired can
/// be registered again by anyone.
/// Remaining accounts are forwarded to the resolver program with each record.
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32], label: String)]
pub struct RegisterNameAccountConstraints<'info> {
    /// User paying the fee and the rent of a new record
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: deserialized by the handler so a missing config fails with ParentNameNotSetup
    #[account(
        seeds = [DOMAIN_CONFIG_SEED, parent_node.as_ref()],
        bump,
    )]
    pub domain_config: UncheckedAccount<'info>,

    /// CHECK: ownership and node are verified by registry::load_parent
    pub parent_record: UncheckedAccount<'info>,

    /// Child record, created on first registration and overwritten on reclaim
    #[account(
        init_if_needed,
        payer = payer,
        space = ANCHOR_DISCRIMINATOR + NameRecord::INIT_SPACE,
        seeds = [NAME_RECORD_SEED, parent_node.as_ref(), label.as_bytes()],
        bump
    )]
    pub name_record: Account<'info, NameRecord>,

    #[account(
        mut,
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,

    /// CHECK: compared with the configured beneficiary before any transfer
    #[account(mut)]
    pub beneficiary: UncheckedAccount<'info>,

    /// Payer's stable token account, required for stable payments
    #[account(
        mut,
        constraint = payer_stable_account.mint == program_state.stable_mint @ SubnameRegistrarError::MissingAccount,
        constraint = payer_stable_account.owner == payer.key() @ SubnameRegistrarError::MissingAccount,
    )]
    pub payer_stable_account: Option<Account<'info, TokenAccount>>,

    /// Beneficiary's stable token account, required for stable payments
    #[account(
        mut,
        constraint = beneficiary_stable_account.mint == program_state.stable_mint @ SubnameRegistrarError::MissingAccount,
    )]
    pub beneficiary_stable_account: Option<Account<'info, TokenAccount>>,

    /// Pyth price oracle account (SOL/USD price), required for native quotes
    pub pyth_price_update: Option<Account<'info, PriceUpdateV2>>,

    /// CHECK: must match the `resolver` argument when records are supplied
    pub resolver_program: Option<UncheckedAccount<'info>>,

    pub token_program: Option<Program<'info, Token>>,

    pub system_program: Program<'info, System>,
}

impl<'info> RegisterNameAccountConstraints<'info> {
    pub fn collector(&self) -> PaymentCollector<'_, 'info> {
        PaymentCollector {
            payer: &self.payer,
            beneficiary: self.beneficiary.as_ref(),
            payer_stable_account: self.payer_stable_account.as_ref(),
            beneficiary_stable_account: self.beneficiary_stable_account.as_ref(),
            token_program: self.token_program.as_ref(),
            system_program: &self.system_program,
        }
    }
}

/// Child name registration handler, shared by `register` and `register_with_token`
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `parent_node` - Namehash of the parent name
/// * `label` - Label to register under the parent
/// * `owner` - Owner of the new name, not necessarily the payer
/// * `resolver` - Resolver program stored in the record
/// * `duration` - Registration length in seconds, a multiple of one week
/// * `records` - Resolver instructions to dispatch once the name exists
/// * `unit` - Explicit payment unit, `None` for the pricer's default
/// * `supplied_lamports` - Lamports the payer is willing to spend on a native fee
///
/// # Errors
/// * `ParentNameNotSetup` - Parent has no active configuration
/// * `ParentExpired` / `DurationTooLong` - Parent does not outlive the new name
/// * `Unavailable` - Name is registered and not expired
#[allow(clippy::too_many_arguments)]
pub fn register_name_handler<'info>(
    context: Context<'_, '_, '_, 'info, RegisterNameAccountConstraints<'info>>,
    parent_node: [u8; 32],
    label: String,
    owner: Pubkey,
    resolver: Pubkey,
    duration: i64,
    records: Vec<Vec<u8>>,
    unit: Option<PriceUnit>,
    supplied_lamports: u64,
) -> Result<()> {
    registry::validate_label(&label)?;
    let current_timestamp = get_current_timestamp()?;
    let program_id = context.program_id;
    let accounts = context.accounts;

    let config = load_active_config(&accounts.domain_config, program_id)?;
    let rates = PythRateSource::new(accounts.pyth_price_update.as_deref());
    let quote = config.pricer.quote_in(duration, unit, &rates)?;

    let parent = registry::load_parent(&accounts.parent_record, &parent_node, program_id)?;
    validate_parent(
        &parent,
        current_timestamp,
        duration,
        accounts.program_state.grace_period_seconds,
    )?;
    require!(
        accounts.name_record.is_available(current_timestamp),
        SubnameRegistrarError::Unavailable
    );

    let surplus = accounts
        .collector()
        .collect(&config, quote, supplied_lamports)?;

    let registration = ChildRegistration {
        parent_node,
        label: &label,
        owner,
        resolver,
        expiry: calculate_expiry_timestamp(current_timestamp, duration)?,
    };
    let record = registration.into_record(current_timestamp, context.bumps.name_record);
    accounts.name_record.set_inner(record.clone());
    accounts.program_state.record_registrations(1)?;

    registry::dispatch_records(
        &resolver,
        accounts.resolver_program.as_ref().map(|program| program.as_ref()),
        context.remaining_accounts,
        &records,
        &record.node,
    )?;

    msg!(
        "Name {} registered under parent with owner {} until {}",
        label,
        owner,
        record.expiry_timestamp
    );

    emit!(NameRegistered {
        parent_node,
        node: record.node,
        label,
        owner,
        payer: accounts.payer.key(),
        unit: quote.unit,
        fee: quote.amount,
        settlement: Settlement::Direct { surplus },
        expiry: record.expiry_timestamp,
    });

    Ok(())
}
