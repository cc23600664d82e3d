#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::{NameRenewed, Settlement};
use crate::instructions::register::utils::*;
use crate::instructions::utils::*;
use crate::pricing::{PriceUnit, PythRateSource};
use crate::registry;
use crate::state::*;

/// Account constraints for child name renewal
///
/// Anyone may pay to renew a name that has not expired yet. Renewal only
/// extends the expiry and never changes ownership.
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32], label: String)]
pub struct RenewNameAccountConstraints<'info> {
    /// User paying for the renewal
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

    /// CHECK: deserialized by the handler so a missing record fails with NameNotRegistered
    #[account(
        mut,
        seeds = [NAME_RECORD_SEED, parent_node.as_ref(), label.as_bytes()],
        bump
    )]
    pub name_record: UncheckedAccount<'info>,

    #[account(
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,

    /// CHECK: compared with the configured beneficiary before any transfer
    #[account(mut)]
    pub beneficiary: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = payer_stable_account.mint == program_state.stable_mint @ SubnameRegistrarError::MissingAccount,
        constraint = payer_stable_account.owner == payer.key() @ SubnameRegistrarError::MissingAccount,
    )]
    pub payer_stable_account: Option<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = beneficiary_stable_account.mint == program_state.stable_mint @ SubnameRegistrarError::MissingAccount,
    )]
    pub beneficiary_stable_account: Option<Account<'info, TokenAccount>>,

    /// Pyth price oracle account (SOL/USD price), required for native quotes
    pub pyth_price_update: Option<Account<'info, PriceUpdateV2>>,

    pub token_program: Option<Program<'info, Token>>,

    pub system_program: Program<'info, System>,
}

impl<'info> RenewNameAccountConstraints<'info> {
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

/// Child name renewal handler, shared by `renew` and `renew_with_token`
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `parent_node` - Namehash of the parent name
/// * `label` - Label of the name to renew
/// * `duration` - Seconds added to the current expiry, a multiple of one week
/// * `unit` - Explicit payment unit, `None` for the pricer's default
/// * `supplied_lamports` - Lamports the payer is willing to spend on a native fee
///
/// # Errors
/// * `NameNotRegistered` - Name does not exist or has already expired
/// * `DurationTooLong` - Renewed name would outlive its parent
pub fn renew_name_handler(
    context: Context<RenewNameAccountConstraints>,
    parent_node: [u8; 32],
    label: String,
    duration: i64,
    unit: Option<PriceUnit>,
    supplied_lamports: u64,
) -> Result<()> {
    let current_timestamp = get_current_timestamp()?;
    let program_id = context.program_id;
    let accounts = &context.accounts;

    let config = load_active_config(&accounts.domain_config, program_id)?;
    let rates = PythRateSource::new(accounts.pyth_price_update.as_deref());
    let quote = config.pricer.quote_in(duration, unit, &rates)?;

    let parent = registry::load_parent(&accounts.parent_record, &parent_node, program_id)?;
    let parent_expiry = validate_parent(
        &parent,
        current_timestamp,
        duration,
        accounts.program_state.grace_period_seconds,
    )?;

    let mut record = registry::child_info(&accounts.name_record, program_id)?
        .ok_or(error!(SubnameRegistrarError::NameNotRegistered))?;
    let old_expiry = record.expiry_timestamp;
    let new_expiry = calculate_renewed_expiry(&record, current_timestamp, duration, parent_expiry)?;

    let surplus = accounts
        .collector()
        .collect(&config, quote, supplied_lamports)?;

    registry::set_child_expiry(&accounts.name_record, &mut record, new_expiry)?;

    msg!("Name {} renewed from {} to {}", label, old_expiry, new_expiry);

    emit!(NameRenewed {
        parent_node,
        node: record.node,
        label,
        payer: accounts.payer.key(),
        unit: quote.unit,
        fee: quote.amount,
        settlement: Settlement::Direct { surplus },
        old_expiry,
        new_expiry,
    });

    Ok(())
}
