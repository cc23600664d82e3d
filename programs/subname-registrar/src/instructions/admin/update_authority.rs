#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::state::*;

/// Account constraints for handing over the controlling authority
///
/// The authority registers top-level parents and is the only account that
/// can sweep the treasury, so the new authority must sign as well.
#[derive(Accounts)]
pub struct UpdateAuthorityAccountConstraints<'info> {
    /// Current program authority, must match the authority in ProgramState
    pub authority: Signer<'info>,

    #[account(
        mut,
        has_one = authority @ SubnameRegistrarError::NotProgramAuthority,
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,

    /// Incoming authority
    pub new_authority: Signer<'info>,
}

/// Transfer the controlling authority
pub fn update_authority_handler(
    context: Context<UpdateAuthorityAccountConstraints>,
) -> Result<()> {
    let program_state = &mut context.accounts.program_state;
    let previous = program_state.authority;
    program_state.authority = context.accounts.new_authority.key();

    msg!(
        "Authority updated from {} to {}",
        previous,
        program_state.authority
    );

    Ok(())
}
