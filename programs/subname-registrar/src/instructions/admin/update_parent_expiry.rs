#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::events::ParentExpiryUpdated;
use crate::state::*;

/// Account constraints for updating a top-level name's expiry timestamp
///
/// This admin instruction lets the program authority extend or shorten a
/// top-level parent, for example after it was renewed upstream.
/// Can set the expiry to any time, including past times for testing purposes.
#[derive(Accounts)]
#[instruction(label: String)]
pub struct UpdateParentExpiryAccountConstraints<'info> {
    /// Program authority that can execute admin commands
    pub authority: Signer<'info>,

    #[account(
        seeds = [PROGRAM_STATE_SEED],
        bump = program_state.bump,
        has_one = authority @ SubnameRegistrarError::NotProgramAuthority,
    )]
    pub program_state: Account<'info, ProgramState>,

    /// Top-level record to update
    #[account(
        mut,
        seeds = [NAME_RECORD_SEED, ROOT_NODE.as_ref(), label.as_bytes()],
        bump = parent_record.bump
    )]
    pub parent_record: Account<'info, NameRecord>,
}

/// Overwrite the expiry of `record`, describing the change
fn apply_expiry(record: &mut NameRecord, new_expiry_timestamp: i64) -> ParentExpiryUpdated {
    let old_expiry = record.expiry_timestamp;
    record.expiry_timestamp = new_expiry_timestamp;
    ParentExpiryUpdated {
        node: record.node,
        label: record.label.clone(),
        old_expiry,
        new_expiry: new_expiry_timestamp,
    }
}

/// Update a top-level name's expiry timestamp
///
/// Children keep their own expiry; only future registrations and renewals
/// are bounded by the new value.
pub fn update_parent_expiry_handler(
    context: Context<UpdateParentExpiryAccountConstraints>,
    new_expiry_timestamp: i64,
) -> Result<()> {
    let update = apply_expiry(&mut context.accounts.parent_record, new_expiry_timestamp);

    msg!(
        "Updated expiry of parent {} from {} to {}",
        update.label,
        update.old_expiry,
        update.new_expiry
    );

    emit!(update);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_update_reports_both_timestamps() {
        let mut record = NameRecord {
            node: [3u8; 32],
            parent: ROOT_NODE,
            label: "club".to_string(),
            owner: Pubkey::new_unique(),
            resolver: Pubkey::default(),
            fuses: IS_TOP_LEVEL,
            expiry_timestamp: 1_000,
            registration_timestamp: 0,
            bump: 255,
        };

        let update = apply_expiry(&mut record, 500);

        assert_eq!(record.expiry_timestamp, 500);
        assert_eq!(update.node, [3u8; 32]);
        assert_eq!(update.label, "club");
        assert_eq!(update.old_expiry, 1_000);
        assert_eq!(update.new_expiry, 500);
    }
}
