#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::{NameRenewed, Settlement};
use crate::instructions::balance::utils::*;
use crate::instructions::register::utils::*;
use crate::instructions::utils::*;
use crate::pricing::PythRateSource;
use crate::registry;
use crate::state::*;

/// Account constraints for renewing a child name against the prepaid ledger
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32], label: String)]
pub struct RenewFromBalanceAccountConstraints<'info> {
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

    pub pyth_price_update: Option<Account<'info, PriceUpdateV2>>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

impl<'info> RenewFromBalanceAccountConstraints<'info> {
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

/// Renew a child name paid from the payer's prepaid balance
///
/// # Errors
/// * `PricerNotUSDC` - The parent's pricer does not quote in the stable unit
/// * `NameNotRegistered` - Name does not exist or has already expired
/// * `InsufficientBalance` - The prepaid balance is below the fee
pub fn renew_from_balance_handler(
    context: Context<RenewFromBalanceAccountConstraints>,
    parent_node: [u8; 32],
    label: String,
    duration: i64,
) -> Result<()> {
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

    let (quote, (mut record, new_expiry)) = charge_balance(
        &mut accounts.user_balance,
        &config.pricer,
        duration,
        &rates,
        || {
            let parent = registry::load_parent(parent_record, &parent_node, program_id)?;
            let parent_expiry =
                validate_parent(&parent, current_timestamp, duration, grace_period_seconds)?;
            let record = registry::child_info(name_record, program_id)?
                .ok_or(error!(SubnameRegistrarError::NameNotRegistered))?;
            let new_expiry =
                calculate_renewed_expiry(&record, current_timestamp, duration, parent_expiry)?;
            Ok((record, new_expiry))
        },
    )?;
    let old_expiry = record.expiry_timestamp;
    let payout = accounts.treasury().pay(&config, quote.amount, &rates)?;

    registry::set_child_expiry(&accounts.name_record, &mut record, new_expiry)?;

    msg!(
        "Name {} renewed from balance until {}, balance is now {}",
        label,
        new_expiry,
        accounts.user_balance.amount
    );

    emit!(NameRenewed {
        parent_node,
        node: record.node,
        label,
        payer: accounts.payer.key(),
        unit: quote.unit,
        fee: quote.amount,
        settlement: Settlement::Balance {
            payout_unit: payout.unit,
            payout_amount: payout.amount,
        },
        old_expiry,
        new_expiry,
    });

    Ok(())
}
