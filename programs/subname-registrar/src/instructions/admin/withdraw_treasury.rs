#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, transfer};
use anchor_spl::token::{self, Token, TokenAccount};

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::TreasuryWithdrawn;
use crate::instructions::balance::utils::spendable_lamports;
use crate::pricing::PriceUnit;
use crate::state::*;

/// Account constraints for sweeping the treasury
///
/// Only the program authority can move pooled funds out. Individual
/// depositors never get their prepaid balance back.
#[derive(Accounts)]
pub struct WithdrawTreasuryAccountConstraints<'info> {
    /// Program authority, must match the authority in ProgramState
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        has_one = authority @ SubnameRegistrarError::NotProgramAuthority,
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

    /// Authority's stable token account, required for stable sweeps
    #[account(
        mut,
        constraint = authority_stable_account.mint == program_state.stable_mint @ SubnameRegistrarError::MissingAccount,
    )]
    pub authority_stable_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

/// Resolve the requested amount against what is available, `0` meaning everything
fn withdrawal_amount(requested: u64, available: u64) -> Result<u64> {
    if requested == 0 {
        return Ok(available);
    }
    require!(
        available >= requested,
        SubnameRegistrarError::InsufficientTreasury
    );
    Ok(requested)
}

/// Withdraw lamports from the native vault
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `amount` - Amount to withdraw (in lamports), if 0 then withdraw all available balance
pub fn withdraw_native_handler(
    context: Context<WithdrawTreasuryAccountConstraints>,
    amount: u64,
) -> Result<()> {
    let accounts = &context.accounts;
    let withdraw_amount = withdrawal_amount(
        amount,
        spendable_lamports(&accounts.native_vault.to_account_info())?,
    )?;

    let signer_seeds: &[&[&[u8]]] = &[&[NATIVE_VAULT_SEED, &[accounts.program_state.vault_bump]]];
    transfer(
        CpiContext::new_with_signer(
            accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: accounts.native_vault.to_account_info(),
                to: accounts.authority.to_account_info(),
            },
            signer_seeds,
        ),
        withdraw_amount,
    )?;

    msg!("Withdrew {} lamports to authority", withdraw_amount);

    emit!(TreasuryWithdrawn {
        authority: accounts.authority.key(),
        unit: PriceUnit::Native,
        amount: withdraw_amount,
    });

    Ok(())
}

/// Withdraw stable tokens from the treasury token account
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `amount` - Amount to withdraw (in minor units), if 0 then withdraw everything
pub fn withdraw_stable_handler(
    context: Context<WithdrawTreasuryAccountConstraints>,
    amount: u64,
) -> Result<()> {
    let accounts = &context.accounts;
    let destination = accounts
        .authority_stable_account
        .as_ref()
        .ok_or(error!(SubnameRegistrarError::MissingAccount))?;
    let withdraw_amount = withdrawal_amount(amount, accounts.stable_treasury.amount)?;

    let signer_seeds: &[&[&[u8]]] = &[&[PROGRAM_STATE_SEED, &[accounts.program_state.bump]]];
    token::transfer(
        CpiContext::new_with_signer(
            accounts.token_program.to_account_info(),
            token::Transfer {
                from: accounts.stable_treasury.to_account_info(),
                to: destination.to_account_info(),
                authority: accounts.program_state.to_account_info(),
            },
            signer_seeds,
        ),
        withdraw_amount,
    )?;

    msg!("Withdrew {} stable units to {}", withdraw_amount, destination.key());

    emit!(TreasuryWithdrawn {
        authority: accounts.authority.key(),
        unit: PriceUnit::Stable,
        amount: withdraw_amount,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::error_code;

    #[test]
    fn zero_sweeps_everything() {
        assert_eq!(withdrawal_amount(0, 42).unwrap(), 42);
        assert_eq!(withdrawal_amount(40, 42).unwrap(), 40);
        assert_eq!(
            error_code(withdrawal_amount(43, 42).unwrap_err()),
            error_code(SubnameRegistrarError::InsufficientTreasury.into())
        );
    }
}
