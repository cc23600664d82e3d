#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::NameTransferred;
use crate::instructions::utils::*;
use crate::registry;
use crate::state::*;

/// Account constraints for transferring a name to a new owner
#[derive(Accounts)]
pub struct TransferNameAccountConstraints<'info> {
    /// Current name owner
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [NAME_RECORD_SEED, name_record.parent.as_ref(), name_record.label.as_bytes()],
        bump = name_record.bump
    )]
    pub name_record: Account<'info, NameRecord>,

    #[account(
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,
}

/// Transfer a name to a new owner
///
/// The parent cannot take a child back, so only the current owner signs.
///
/// # Errors
/// * `Unauthorised` - Signer is not the owner, or the name has expired
pub fn transfer_name_handler(
    context: Context<TransferNameAccountConstraints>,
    new_owner: Pubkey,
) -> Result<()> {
    let current_timestamp = get_current_timestamp()?;
    let grace_period_seconds = context.accounts.program_state.grace_period_seconds;
    let owner = context.accounts.owner.key();

    let name_record = &mut context.accounts.name_record;
    require!(
        registry::is_authorised(name_record, &owner, current_timestamp, grace_period_seconds),
        SubnameRegistrarError::Unauthorised
    );

    name_record.owner = new_owner;

    msg!("Transferred name {} to new owner {}", name_record.label, new_owner);

    emit!(NameTransferred {
        node: name_record.node,
        previous_owner: owner,
        new_owner,
    });

    Ok(())
}
