#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::{NameRegistered, Settlement};
use crate::instructions::register::utils::*;
use crate::instructions::utils::*;
use crate::pricing::{PriceQuote, PriceUnit, PythRateSource};
use crate::registry::{self, ChildRegistration};
use crate::state::*;

/// Account constraints for registering several names under one parent
///
/// Remaining accounts: one child record PDA per label, in label order,
/// followed by the accounts forwarded to the resolver program.
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32])]
pub struct BatchRegisterAccountConstraints<'info> {
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

    #[account(
        mut,
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

    pub pyth_price_update: Option<Account<'info, PriceUpdateV2>>,

    /// CHECK: must match the `resolver` argument when records are supplied
    pub resolver_program: Option<UncheckedAccount<'info>>,

    pub token_program: Option<Program<'info, Token>>,

    pub system_program: Program<'info, System>,
}

impl<'info> BatchRegisterAccountConstraints<'info> {
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

/// Batch registration handler, shared by `batch_register` and `batch_register_with_token`
///
/// Every label is quoted and validated first, the summed fee is collected in
/// one transfer, then the records are written. Any failure aborts the batch.
///
/// # Errors
/// * `DataMissing` - Input vectors or child accounts disagree in length
#[allow(clippy::too_many_arguments)]
pub fn batch_register_handler<'info>(
    context: Context<'_, '_, '_, 'info, BatchRegisterAccountConstraints<'info>>,
    parent_node: [u8; 32],
    labels: Vec<String>,
    owners: Vec<Pubkey>,
    durations: Vec<i64>,
    resolver: Pubkey,
    records: Vec<Vec<Vec<u8>>>,
    unit: Option<PriceUnit>,
    supplied_lamports: u64,
) -> Result<()> {
    check_batch_lengths(labels.len(), &[owners.len(), durations.len(), records.len()])?;
    require!(
        context.remaining_accounts.len() >= labels.len(),
        SubnameRegistrarError::DataMissing
    );
    let (child_accounts, resolver_accounts) = context.remaining_accounts.split_at(labels.len());

    let current_timestamp = get_current_timestamp()?;
    let program_id = context.program_id;
    let accounts = context.accounts;

    let config = load_active_config(&accounts.domain_config, program_id)?;
    let rates = PythRateSource::new(accounts.pyth_price_update.as_deref());
    let parent = registry::load_parent(&accounts.parent_record, &parent_node, program_id)?;
    let grace_period_seconds = accounts.program_state.grace_period_seconds;

    let mut quotes = Vec::with_capacity(labels.len());
    for (label, duration) in labels.iter().zip(&durations) {
        registry::validate_label(label)?;
        quotes.push(config.pricer.quote_in(*duration, unit, &rates)?);
        validate_parent(&parent, current_timestamp, *duration, grace_period_seconds)?;
    }

    // one pricer per parent, so every quote shares a unit
    let total = PriceQuote {
        unit: unit.unwrap_or_else(|| config.pricer.default_unit()),
        amount: sum_fees(quotes.iter().map(|quote| quote.amount))?,
    };
    let surplus = accounts
        .collector()
        .collect(&config, total, supplied_lamports)?;

    let payer = accounts.payer.to_account_info();
    let system_program = accounts.system_program.to_account_info();
    let resolver_program = accounts.resolver_program.as_ref().map(|program| program.as_ref());

    for (index, label) in labels.into_iter().enumerate() {
        let registration = ChildRegistration {
            parent_node,
            label: &label,
            owner: owners[index],
            resolver,
            expiry: calculate_expiry_timestamp(current_timestamp, durations[index])?,
        };
        let record = registry::create_child(
            &child_accounts[index],
            &payer,
            &system_program,
            program_id,
            &registration,
            current_timestamp,
        )?;
        registry::dispatch_records(
            &resolver,
            resolver_program,
            resolver_accounts,
            &records[index],
            &record.node,
        )?;

        emit!(NameRegistered {
            parent_node,
            node: record.node,
            label,
            owner: record.owner,
            payer: payer.key(),
            unit: quotes[index].unit,
            fee: quotes[index].amount,
            settlement: Settlement::Direct {
                surplus: if index == 0 { surplus } else { 0 },
            },
            expiry: record.expiry_timestamp,
        });
    }

    let registered = quotes.len() as u64;
    accounts.program_state.record_registrations(registered)?;

    msg!(
        "Batch registered {} names for {} {:?}",
        registered,
        total.amount,
        total.unit
    );

    Ok(())
}
