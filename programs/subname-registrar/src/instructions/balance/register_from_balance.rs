#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::{NameRegistered, Settlement};
use crate::instructions::balance::utils::*;
use crate::instructions::register::utils::*;
use crate::instructions::utils::*;
use crate::pricing::PythRateSource;
use crate::registry::{self, ChildRegistration};
use crate::state::*;

/// Account constraints for registering a child name against the prepaid ledger
///
/// The fee is debited from the payer's balance and the beneficiary is paid
/// out of the treasury. Remaining accounts are forwarded to the resolver
/// program with each record.
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32], label: String)]
pub struct RegisterFromBalanceAccountConstraints<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init_if_needed,
        payer = payer,
        space = ANCHOR_DISCRIMINATOR + UserBalance::INIT_SPACE,
        seeds = [USER_BALANCE_SEED, payer.key().as_ref()],
        bump
    )]
    pub user_balance: Account<'info, UserBalance>,

    /// CHECK: deserialized by the handler so a missing config fails with ParentNameNotSetup
    #[account(
        seeds = [DOMAIN_CONFIG_SEED, parent_node.as_ref()],
        bump,
    )]
    pub domain_config: UncheckedAccount<'info>,

    /// CHECK: ownership and node are verified by registry::load_parent
    pub parent_record: UncheckedAccount<'info>,

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

    #[account(
        mut,
        seeds = [NATIVE_VAULT_SEED],
        bump = program_state.vault_bump
    )]
    pub native_vault: SystemAccount<'info>,

    #[account(
        mut,
        seeds = [STABLE_TREASURY_SEED],
        bump = program_state.treasury_bump
    )]
    pub stable_treasury: Account<'info, TokenAccount>,

    /// CHECK: compared with the configured beneficiary before any transfer
    #[account(mut)]
    pub beneficiary: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = beneficiary_stable_account.mint == program_state.stable_mint @ SubnameRegistrarError::MissingAccount,
    )]
    pub beneficiary_stable_account: Option<Account<'info, TokenAccount>>,

    /// Pyth price oracle account (SOL/USD price), read when the treasury pays in lamports
    pub pyth_price_update: Option<Account<'info, PriceUpdateV2>>,

    /// CHECK: must match the `resolver` argument when records are supplied
    pub resolver_program: Option<UncheckedAccount<'info>>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

impl<'info> RegisterFromBalanceAccountConstraints<'info> {
    pub fn treasury(&self) -> TreasuryPayer<'_, 'info> {
        TreasuryPayer {
            program_state: &self.program_state,
            native_vault: &self.native_vault,
            stable_treasury: &self.stable_treasury,
            beneficiary: self.beneficiary.as_ref(),
            beneficiary_stable_account: self.beneficiary_stable_account.as_ref(),
            token_program: &self.token_program,
            system_program: &self.system_program,
        }
    }
}

/// Register a child name paid from the payer's prepaid balance
///
/// Every validation runs before the ledger is touched.
///
/// # Errors
/// * `PricerNotUSDC` - The parent's pricer does not quote in the stable unit
/// * `InsufficientBalance` - The prepaid balance is below the fee
/// * `InsufficientTreasury` - The treasury holds too little of either asset
#[allow(clippy::too_many_arguments)]
pub fn register_from_balance_handler<'info>(
    context: Context<'_, '_, '_, 'info, RegisterFromBalanceAccountConstraints<'info>>,
    parent_node: [u8; 32],
    label: String,
    owner: Pubkey,
    resolver: Pubkey,
    duration: i64,
    records: Vec<Vec<u8>>,
) -> Result<()> {
    registry::validate_label(&label)?;
    let current_timestamp = get_current_timestamp()?;
    let program_id = context.program_id;
    let accounts = context.accounts;
    open_balance(
        &mut accounts.user_balance,
        accounts.payer.key(),
        context.bumps.user_balance,
    );

    let config = load_active_config(&accounts.domain_config, program_id)?;
    let rates = PythRateSource::new(accounts.pyth_price_update.as_deref());
    let parent_record = &accounts.parent_record;
    let name_record = &accounts.name_record;
    let grace_period_seconds = accounts.program_state.grace_period_seconds;

    let (quote, ()) = charge_balance(
        &mut accounts.user_balance,
        &config.pricer,
        duration,
        &rates,
        || {
            let parent = registry::load_parent(parent_record, &parent_node, program_id)?;
            validate_parent(&parent, current_timestamp, duration, grace_period_seconds)?;
            require!(
                name_record.is_available(current_timestamp),
                SubnameRegistrarError::Unavailable
            );
            Ok(())
        },
    )?;
    let payout = accounts.treasury().pay(&config, quote.amount, &rates)?;

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
        "Name {} registered from balance, {} stable units debited, balance is now {}",
        label,
        quote.amount,
        accounts.user_balance.amount
    );

    emit!(NameRegistered {
        parent_node,
        node: record.node,
        label,
        owner,
        payer: accounts.payer.key(),
        unit: quote.unit,
        fee: quote.amount,
        settlement: Settlement::Balance {
            payout_unit: payout.unit,
            payout_amount: payout.amount,
        },
        expiry: record.expiry_timestamp,
    });

    Ok(())
}
