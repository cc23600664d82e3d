#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::{NameRenewed, Settlement};
use crate::instructions::register::utils::*;
use crate::instructions::utils::*;
use crate::pricing::{PriceQuote, PriceUnit, PythRateSource};
use crate::registry;
use crate::state::*;

/// Account constraints for renewing several names under one parent
///
/// Remaining accounts: one child record PDA per label, in label order.
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32])]
pub struct BatchRenewAccountConstraints<'info> {
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

    pub token_program: Option<Program<'info, Token>>,

    pub system_program: Program<'info, System>,
}

impl<'info> BatchRenewAccountConstraints<'info> {
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

/// Batch renewal handler, shared by `batch_renew` and `batch_renew_with_token`
///
/// # Errors
/// * `DataMissing` - Input vectors or child accounts disagree in length
/// * `NameNotRegistered` - One of the names is missing or expired
pub fn batch_renew_handler<'info>(
    context: Context<'_, '_, '_, 'info, BatchRenewAccountConstraints<'info>>,
    parent_node: [u8; 32],
    labels: Vec<String>,
    durations: Vec<i64>,
    unit: Option<PriceUnit>,
    supplied_lamports: u64,
) -> Result<()> {
    check_batch_lengths(
        labels.len(),
        &[durations.len(), context.remaining_accounts.len()],
    )?;

    let current_timestamp = get_current_timestamp()?;
    let program_id = context.program_id;
    let accounts = &context.accounts;

    let config = load_active_config(&accounts.domain_config, program_id)?;
    let rates = PythRateSource::new(accounts.pyth_price_update.as_deref());
    let parent = registry::load_parent(&accounts.parent_record, &parent_node, program_id)?;
    let grace_period_seconds = accounts.program_state.grace_period_seconds;

    let mut renewals: Vec<(NameRecord, PriceQuote, i64)> = Vec::with_capacity(labels.len());
    for ((label, duration), child) in labels.iter().zip(&durations).zip(context.remaining_accounts) {
        let quote = config.pricer.quote_in(*duration, unit, &rates)?;
        let parent_expiry = validate_parent(&parent, current_timestamp, *duration, grace_period_seconds)?;

        let (address, _) = registry::find_name_record_address(&parent_node, label, program_id);
        require_keys_eq!(
            child.key(),
            address,
            anchor_lang::error::ErrorCode::ConstraintSeeds
        );
        let record = registry::child_info(child, program_id)?
            .ok_or(error!(SubnameRegistrarError::NameNotRegistered))?;
        // a repeated label would be charged twice for one extension
        require!(
            renewals.iter().all(|(renewed, _, _)| renewed.node != record.node),
            SubnameRegistrarError::DataMissing
        );
        let new_expiry = calculate_renewed_expiry(&record, current_timestamp, *duration, parent_expiry)?;
        renewals.push((record, quote, new_expiry));
    }

    let total = PriceQuote {
        unit: unit.unwrap_or_else(|| config.pricer.default_unit()),
        amount: sum_fees(renewals.iter().map(|(_, quote, _)| quote.amount))?,
    };
    let surplus = accounts
        .collector()
        .collect(&config, total, supplied_lamports)?;

    for (index, ((mut record, quote, new_expiry), child)) in renewals
        .into_iter()
        .zip(context.remaining_accounts)
        .enumerate()
    {
        let old_expiry = record.expiry_timestamp;
        registry::set_child_expiry(child, &mut record, new_expiry)?;

        emit!(NameRenewed {
            parent_node,
            node: record.node,
            label: record.label.clone(),
            payer: accounts.payer.key(),
            unit: quote.unit,
            fee: quote.amount,
            settlement: Settlement::Direct {
                surplus: if index == 0 { surplus } else { 0 },
            },
            old_expiry,
            new_expiry,
        });
    }

    msg!(
        "Batch renewed {} names for {} {:?}",
        labels.len(),
        total.amount,
        total.unit
    );

    Ok(())
}
