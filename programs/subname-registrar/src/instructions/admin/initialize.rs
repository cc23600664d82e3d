#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, transfer};
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::state::*;

/// Account constraints for program initialization instruction
///
/// This instruction sets up the program state, the stable treasury token
/// account and the native vault. It can only be executed once.
#[derive(Accounts)]
pub struct InitializeAccountConstraints<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Program state account (PDA)
    #[account(
        init,
        payer = authority,
        space = ANCHOR_DISCRIMINATOR + ProgramState::INIT_SPACE,
        seeds = [PROGRAM_STATE_SEED],
        bump
    )]
    pub program_state: Account<'info, ProgramState>,

    /// Stable token prepaid balances and fees are denominated in
    #[account(
        constraint = stable_mint.decimals as u32 == STABLE_DECIMALS @ SubnameRegistrarError::InvalidStableMint,
    )]
    pub stable_mint: Account<'info, Mint>,

    /// Treasury holding deposited stable tokens, owned by the program state
    #[account(
        init,
        payer = authority,
        seeds = [STABLE_TREASURY_SEED],
        bump,
        token::mint = stable_mint,
        token::authority = program_state,
    )]
    pub stable_treasury: Account<'info, TokenAccount>,

    /// Vault holding deposited lamports
    #[account(
        mut,
        seeds = [NATIVE_VAULT_SEED],
        bump
    )]
    pub native_vault: SystemAccount<'info>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

/// Initialize program state
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `grace_period_seconds` - Grace period already included in the expiry of
///   protected top-level names
pub fn initialize_handler(
    context: Context<InitializeAccountConstraints>,
    grace_period_seconds: i64,
) -> Result<()> {
    require!(grace_period_seconds >= 0, SubnameRegistrarError::InvalidDuration);

    let program_state = &mut context.accounts.program_state;

    // Set program state
    program_state.authority = context.accounts.authority.key();
    program_state.stable_mint = context.accounts.stable_mint.key();
    program_state.grace_period_seconds = grace_period_seconds;
    program_state.names_registered = 0;
    program_state.bump = context.bumps.program_state;
    program_state.vault_bump = context.bumps.native_vault;
    program_state.treasury_bump = context.bumps.stable_treasury;

    // vault starts rent exempt
    let rent_reserve = Rent::get()?.minimum_balance(0);
    let shortfall = rent_reserve.saturating_sub(context.accounts.native_vault.lamports());
    if shortfall > 0 {
        transfer(
            CpiContext::new(
                context.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: context.accounts.authority.to_account_info(),
                    to: context.accounts.native_vault.to_account_info(),
                },
            ),
            shortfall,
        )?;
    }

    msg!("Program initialized with authority: {}", program_state.authority);
    msg!("Stable mint set to: {}", program_state.stable_mint);
    msg!("Grace period set to: {} days", grace_period_seconds / 86400);

    Ok(())
}
