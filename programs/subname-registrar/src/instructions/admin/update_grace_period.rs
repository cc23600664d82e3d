#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::state::*;

/// Account constraints for updating the top-level grace period
///
/// The grace period is subtracted from the expiry of protected top-level
/// parents whenever they are checked, so changing it moves the last moment
/// children can be registered or renewed under them.
#[derive(Accounts)]
pub struct UpdateGracePeriodAccountConstraints<'info> {
    /// Program authority, must match the authority in ProgramState
    pub authority: Signer<'info>,

    #[account(
        mut,
        has_one = authority @ SubnameRegistrarError::NotProgramAuthority,
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,
}

/// Update the grace period of protected top-level parents
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `grace_period_seconds` - New grace period in seconds, not negative
pub fn update_grace_period_handler(
    context: Context<UpdateGracePeriodAccountConstraints>,
    grace_period_seconds: i64,
) -> Result<()> {
    require!(grace_period_seconds >= 0, SubnameRegistrarError::InvalidDuration);

    let program_state = &mut context.accounts.program_state;
    let previous = program_state.grace_period_seconds;
    program_state.grace_period_seconds = grace_period_seconds;

    msg!(
        "Top-level grace period updated from {} to {} seconds",
        previous,
        grace_period_seconds
    );

    Ok(())
}
