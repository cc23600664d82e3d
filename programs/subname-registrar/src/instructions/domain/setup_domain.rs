#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::DomainConfigured;
use crate::instructions::utils::*;
use crate::pricing::Pricer;
use crate::registry;
use crate::state::*;

/// Account constraints for configuring subname rental under a parent
///
/// Only the owner of an unexpired parent may write its configuration.
#[derive(Accounts)]
#[instruction(parent_node: [u8; 32])]
pub struct SetupDomainAccountConstraints<'info> {
    /// Owner of the parent name
    #[account(mut)]
    pub controller: Signer<'info>,

    /// CHECK: ownership and node are verified by registry::load_parent
    pub parent_record: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = controller,
        space = ANCHOR_DISCRIMINATOR + DomainConfig::INIT_SPACE,
        seeds = [DOMAIN_CONFIG_SEED, parent_node.as_ref()],
        bump
    )]
    pub domain_config: Account<'info, DomainConfig>,

    #[account(
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump
    )]
    pub program_state: Account<'info, ProgramState>,

    pub system_program: Program<'info, System>,
}

/// Overwrite the whole configuration of a parent
///
/// # Parameters
/// * `context` - Instruction context, containing all relevant accounts
/// * `parent_node` - Namehash of the parent name
/// * `pricer` - Strategy quoting fees for names under the parent
/// * `beneficiary` - Wallet receiving the fees
/// * `active` - Whether registrations and renewals are open
///
/// # Errors
/// * `ParentNotWrapped` - Parent record is missing or unreadable
/// * `Unauthorised` - Signer does not own the parent, or the parent has expired
pub fn setup_domain_handler(
    context: Context<SetupDomainAccountConstraints>,
    parent_node: [u8; 32],
    pricer: Pricer,
    beneficiary: Pubkey,
    active: bool,
) -> Result<()> {
    let current_timestamp = get_current_timestamp()?;
    let accounts = context.accounts;

    let parent = registry::load_parent(&accounts.parent_record, &parent_node, context.program_id)?;
    require!(
        registry::is_authorised(
            &parent,
            &accounts.controller.key(),
            current_timestamp,
            accounts.program_state.grace_period_seconds,
        ),
        SubnameRegistrarError::Unauthorised
    );

    accounts.domain_config.set_inner(DomainConfig {
        parent_node,
        pricer,
        beneficiary,
        active,
        bump: context.bumps.domain_config,
    });

    msg!(
        "Domain {} configured: beneficiary {}, active {}",
        parent.label,
        beneficiary,
        active
    );

    emit!(DomainConfigured {
        parent_node,
        pricer,
        beneficiary,
        active,
    });

    Ok(())
}
