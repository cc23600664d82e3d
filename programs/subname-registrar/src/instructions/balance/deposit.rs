#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, transfer};
use anchor_spl::token::{self, Token, TokenAccount};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::BalanceDeposited;
use crate::instructions::balance::utils::*;
use crate::pricing::{PriceUnit, PythRateSource};
use crate::state::*;

/// Account constraints for depositing stable tokens into the prepaid ledger
///
/// Deposits are one-way: nothing in the program returns them to the depositor.
#[derive(Accounts)]
pub struct DepositStableAccountConstraints<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = ANCHOR_DISCRIMINATOR + UserBalance::INIT_SPACE,
        seeds = [USER_BALANCE_SEED, depositor.key().as_ref()],
        bump
    )]
    pub user_balance: Account<'info, UserBalance>,

    #[account(
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,

    #[account(
        mut,
        constraint = depositor_stable_account.mint == program_state.stable_mint @ SubnameRegistrarError::MissingAccount,
        constraint = depositor_stable_account.owner == depositor.key() @ SubnameRegistrarError::MissingAccount,
    )]
    pub depositor_stable_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [STABLE_TREASURY_SEED],
        bump = program_state.treasury_bump
    )]
    pub stable_treasury: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

/// Account constraints for depositing lamports into the prepaid ledger
#[derive(Accounts)]
pub struct DepositNativeAccountConstraints<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = ANCHOR_DISCRIMINATOR + UserBalance::INIT_SPACE,
        seeds = [USER_BALANCE_SEED, depositor.key().as_ref()],
        bump
    )]
    pub user_balance: Account<'info, UserBalance>,

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

    /// Pyth price oracle account (SOL/USD price)
    pub pyth_price_update: Account<'info, PriceUpdateV2>,

    pub system_program: Program<'info, System>,
}

/// Credit the depositor 1:1 for `amount` stable tokens moved into the treasury
///
/// A zero amount succeeds without moving anything.
pub fn deposit_stable_handler(
    context: Context<DepositStableAccountConstraints>,
    amount: u64,
) -> Result<()> {
    let accounts = context.accounts;
    open_balance(
        &mut accounts.user_balance,
        accounts.depositor.key(),
        context.bumps.user_balance,
    );
    if amount == 0 {
        return Ok(());
    }

    token::transfer(
        CpiContext::new(
            accounts.token_program.to_account_info(),
            token::Transfer {
                from: accounts.depositor_stable_account.to_account_info(),
                to: accounts.stable_treasury.to_account_info(),
                authority: accounts.depositor.to_account_info(),
            },
        ),
        amount,
    )
    .map_err(|_| error!(SubnameRegistrarError::TransferFailed))?;

    accounts.user_balance.credit(amount)?;

    msg!(
        "Deposited {} stable units, balance is now {}",
        amount,
        accounts.user_balance.amount
    );

    emit!(BalanceDeposited {
        account: accounts.depositor.key(),
        unit: PriceUnit::Stable,
        supplied: amount,
        credited: amount,
        balance: accounts.user_balance.amount,
    });

    Ok(())
}

/// Credit the depositor with the stable value of `lamports` moved into the vault
///
/// # Errors
/// * `AmountTooSmall` - The deposit is worth less than one stable minor unit
/// * `InvalidRate` - The oracle rate is stale or non-positive
pub fn deposit_native_handler(
    context: Context<DepositNativeAccountConstraints>,
    lamports: u64,
) -> Result<()> {
    let accounts = context.accounts;
    open_balance(
        &mut accounts.user_balance,
        accounts.depositor.key(),
        context.bumps.user_balance,
    );
    if lamports == 0 {
        return Ok(());
    }

    let rates = PythRateSource::new(Some(&*accounts.pyth_price_update));
    let credited = native_deposit_credit(lamports, &rates)?;

    transfer(
        CpiContext::new(
            accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: accounts.depositor.to_account_info(),
                to: accounts.native_vault.to_account_info(),
            },
        ),
        lamports,
    )
    .map_err(|_| error!(SubnameRegistrarError::TransferFailed))?;

    accounts.user_balance.credit(credited)?;

    msg!(
        "Deposited {} lamports worth {} stable units, balance is now {}",
        lamports,
        credited,
        accounts.user_balance.amount
    );

    emit!(BalanceDeposited {
        account: accounts.depositor.key(),
        unit: PriceUnit::Native,
        supplied: lamports,
        credited,
        balance: accounts.user_balance.amount,
    });

    Ok(())
}
