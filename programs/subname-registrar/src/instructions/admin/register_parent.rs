#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::ParentRegistered;
use crate::instructions::utils::*;
use crate::registry;
use crate::state::*;

/// Account constraints for registering a top-level parent name
///
/// Top-level names are issued by the program authority. Their owner can then
/// configure subname rental underneath them.
#[derive(Accounts)]
#[instruction(label: String)]
pub struct RegisterParentAccountConstraints<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        has_one = authority @ SubnameRegistrarError::NotProgramAuthority,
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,

    #[account(
        init,
        payer = authority,
        space = ANCHOR_DISCRIMINATOR + NameRecord::INIT_SPACE,
        seeds = [NAME_RECORD_SEED, ROOT_NODE.as_ref(), label.as_bytes()],
        bump
    )]
    pub parent_record: Account<'info, NameRecord>,

    pub system_program: Program<'info, System>,
}

/// Register a top-level name
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `label` - Top-level label
/// * `owner` - Owner allowed to configure the name as a parent
/// * `expiry_timestamp` - Expiry of the name, including the grace period when `top_level` is set
/// * `top_level` - Marks the name as a protected top-level name
pub fn register_parent_handler(
    context: Context<RegisterParentAccountConstraints>,
    label: String,
    owner: Pubkey,
    expiry_timestamp: i64,
    top_level: bool,
) -> Result<()> {
    registry::validate_label(&label)?;
    let current_timestamp = get_current_timestamp()?;

    let node = registry::namehash(&ROOT_NODE, &label);
    let fuses = if top_level { IS_TOP_LEVEL | CANNOT_UNWRAP } else { 0 };

    context.accounts.parent_record.set_inner(NameRecord {
        node,
        parent: ROOT_NODE,
        label: label.clone(),
        owner,
        resolver: Pubkey::default(),
        fuses,
        expiry_timestamp,
        registration_timestamp: current_timestamp,
        bump: context.bumps.parent_record,
    });

    msg!("Parent {} registered with owner {} until {}", label, owner, expiry_timestamp);

    emit!(ParentRegistered {
        node,
        label,
        owner,
        expiry: expiry_timestamp,
        top_level,
    });

    Ok(())
}
