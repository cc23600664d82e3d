//! Minimal name registry backing the registrar.
//!
//! Names live in [`NameRecord`] PDAs derived from `(parent_node, label)`.
//! The registrar only needs a narrow surface from it: read a record, create a
//! child, push a child's expiry, ask whether a caller may modify a name, and
//! forward resolver records.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hashv;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke;
use anchor_lang::system_program::{
    allocate, assign, create_account, transfer, Allocate, Assign, CreateAccount, Transfer,
};

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::state::NameRecord;

pub fn label_hash(label: &str) -> [u8; 32] {
    hashv(&[label.as_bytes()]).to_bytes()
}

/// Node of `label` under `parent_node`
pub fn namehash(parent_node: &[u8; 32], label: &str) -> [u8; 32] {
    hashv(&[parent_node.as_ref(), label_hash(label).as_ref()]).to_bytes()
}

pub fn validate_label(label: &str) -> Result<()> {
    require!(
        !label.is_empty() && label.len() <= MAX_LABEL_LENGTH,
        SubnameRegistrarError::InvalidLabel
    );
    Ok(())
}

pub fn find_name_record_address(parent_node: &[u8; 32], label: &str, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[NAME_RECORD_SEED, parent_node.as_ref(), label.as_bytes()],
        program_id,
    )
}

/// Deserialize a program-owned account, `None` when it was never created
pub fn load_program_account<T: AccountDeserialize>(
    info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<Option<T>> {
    if info.owner != program_id || info.data_is_empty() {
        return Ok(None);
    }
    let data = info.try_borrow_data()?;
    Ok(Some(T::try_deserialize(&mut &data[..])?))
}

/// Record of a name, `None` means the name is free
pub fn child_info(info: &AccountInfo, program_id: &Pubkey) -> Result<Option<NameRecord>> {
    load_program_account(info, program_id)
}

/// Read the parent record, mapping anything unreadable to `ParentNotWrapped`
pub fn load_parent(info: &AccountInfo, parent_node: &[u8; 32], program_id: &Pubkey) -> Result<NameRecord> {
    let parent = load_program_account::<NameRecord>(info, program_id)
        .ok()
        .flatten()
        .ok_or(error!(SubnameRegistrarError::ParentNotWrapped))?;
    require!(
        parent.node == *parent_node,
        SubnameRegistrarError::ParentNotWrapped
    );
    Ok(parent)
}

/// Whether `caller` may modify `record` right now
pub fn is_authorised(record: &NameRecord, caller: &Pubkey, current_time: i64, grace_period_seconds: i64) -> bool {
    record.owner == *caller && current_time <= record.effective_expiry(grace_period_seconds)
}

pub fn write_record(info: &AccountInfo, record: &NameRecord) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data[..];
    record.try_serialize(&mut writer)
}

/// Push a renewed expiry into an existing record
pub fn set_child_expiry(child: &AccountInfo, record: &mut NameRecord, expiry: i64) -> Result<()> {
    record.expiry_timestamp = expiry;
    write_record(child, record)
}

/// Everything needed to issue a child name
pub struct ChildRegistration<'a> {
    pub parent_node: [u8; 32],
    pub label: &'a str,
    pub owner: Pubkey,
    pub resolver: Pubkey,
    pub expiry: i64,
}

impl ChildRegistration<'_> {
    pub fn node(&self) -> [u8; 32] {
        namehash(&self.parent_node, self.label)
    }

    /// Children are always issued with `PARENT_CANNOT_CONTROL` burned
    pub fn into_record(&self, current_timestamp: i64, bump: u8) -> NameRecord {
        NameRecord {
            node: self.node(),
            parent: self.parent_node,
            label: self.label.to_string(),
            owner: self.owner,
            resolver: self.resolver,
            fuses: PARENT_CANNOT_CONTROL,
            expiry_timestamp: self.expiry,
            registration_timestamp: current_timestamp,
            bump,
        }
    }
}

/// How an address without a record is turned into one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordFunding {
    /// Address holds nothing, a single `create_account` funds it
    Create { lamports: u64 },
    /// Address was already sent lamports: top up to rent exemption, then
    /// allocate and assign in place
    Adopt { top_up: u64 },
}

pub fn plan_record_funding(current_lamports: u64, rent_minimum: u64) -> RecordFunding {
    if current_lamports == 0 {
        RecordFunding::Create {
            lamports: rent_minimum,
        }
    } else {
        RecordFunding::Adopt {
            top_up: rent_minimum.saturating_sub(current_lamports),
        }
    }
}

/// Create or reclaim the child record held in `child`. Used by the batch
/// paths, where records arrive as remaining accounts.
pub fn create_child<'info>(
    child: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    program_id: &Pubkey,
    registration: &ChildRegistration,
    current_timestamp: i64,
) -> Result<NameRecord> {
    let (address, bump) = find_name_record_address(&registration.parent_node, registration.label, program_id);
    require_keys_eq!(
        child.key(),
        address,
        anchor_lang::error::ErrorCode::ConstraintSeeds
    );

    match child_info(child, program_id)? {
        Some(existing) => require!(
            existing.is_available(current_timestamp),
            SubnameRegistrarError::Unavailable
        ),
        None => {
            let space = ANCHOR_DISCRIMINATOR + NameRecord::INIT_SPACE;
            let signer_seeds: &[&[&[u8]]] = &[&[
                NAME_RECORD_SEED,
                registration.parent_node.as_ref(),
                registration.label.as_bytes(),
                &[bump],
            ]];
            let rent_minimum = Rent::get()?.minimum_balance(space);
            match plan_record_funding(child.lamports(), rent_minimum) {
                RecordFunding::Create { lamports } => {
                    create_account(
                        CpiContext::new_with_signer(
                            system_program.clone(),
                            CreateAccount {
                                from: payer.clone(),
                                to: child.clone(),
                            },
                            signer_seeds,
                        ),
                        lamports,
                        space as u64,
                        program_id,
                    )?;
                }
                RecordFunding::Adopt { top_up } => {
                    if top_up > 0 {
                        transfer(
                            CpiContext::new(
                                system_program.clone(),
                                Transfer {
                                    from: payer.clone(),
                                    to: child.clone(),
                                },
                            ),
                            top_up,
                        )?;
                    }
                    allocate(
                        CpiContext::new_with_signer(
                            system_program.clone(),
                            Allocate {
                                account_to_allocate: child.clone(),
                            },
                            signer_seeds,
                        ),
                        space as u64,
                    )?;
                    assign(
                        CpiContext::new_with_signer(
                            system_program.clone(),
                            Assign {
                                account_to_assign: child.clone(),
                            },
                            signer_seeds,
                        ),
                        program_id,
                    )?;
                }
            }
        }
    }

    let record = registration.into_record(current_timestamp, bump);
    write_record(child, &record)?;
    Ok(record)
}

/// A record payload is an instruction for the resolver program whose first
/// argument is the node it writes to
pub fn verify_record_payload(payload: &[u8], node: &[u8; 32]) -> Result<()> {
    let node_slot = payload
        .get(RECORD_SELECTOR_LENGTH..RECORD_SELECTOR_LENGTH + 32)
        .ok_or(error!(SubnameRegistrarError::NamehashMismatch))?;
    require!(
        node_slot == node.as_ref(),
        SubnameRegistrarError::NamehashMismatch
    );
    Ok(())
}

/// Forward resolver records for `node` once every payload has been checked
pub fn dispatch_records<'info>(
    resolver: &Pubkey,
    resolver_program: Option<&AccountInfo<'info>>,
    resolver_accounts: &[AccountInfo<'info>],
    records: &[Vec<u8>],
    node: &[u8; 32],
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    require!(
        records.len() <= MAX_RECORDS_PER_NAME,
        SubnameRegistrarError::DataMissing
    );
    for payload in records {
        verify_record_payload(payload, node)?;
    }

    let resolver_program = resolver_program.ok_or(error!(SubnameRegistrarError::MissingAccount))?;
    require_keys_eq!(
        resolver_program.key(),
        *resolver,
        SubnameRegistrarError::MissingAccount
    );

    let metas: Vec<AccountMeta> = resolver_accounts
        .iter()
        .map(|info| AccountMeta {
            pubkey: info.key(),
            is_signer: info.is_signer,
            is_writable: info.is_writable,
        })
        .collect();
    let mut infos = resolver_accounts.to_vec();
    infos.push(resolver_program.clone());

    for payload in records {
        let instruction = Instruction {
            program_id: *resolver,
            accounts: metas.clone(),
            data: payload.clone(),
        };
        invoke(&instruction, &infos)?;
    }
    msg!("Dispatched {} resolver records", records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::error_code;

    fn payload(node: &[u8; 32]) -> Vec<u8> {
        let mut data = vec![0xAB; RECORD_SELECTOR_LENGTH];
        data.extend_from_slice(node);
        data.extend_from_slice(b"addr");
        data
    }

    #[test]
    fn namehash_is_scoped_by_parent() {
        let parent = namehash(&ROOT_NODE, "club");
        let other = namehash(&ROOT_NODE, "guild");
        assert_ne!(namehash(&parent, "alice"), namehash(&other, "alice"));
        assert_eq!(namehash(&parent, "alice"), namehash(&parent, "alice"));
        assert_ne!(parent, ROOT_NODE);
    }

    #[test]
    fn label_limits() {
        assert!(validate_label("alice").is_ok());
        assert!(validate_label(&"a".repeat(MAX_LABEL_LENGTH)).is_ok());
        for label in [String::new(), "a".repeat(MAX_LABEL_LENGTH + 1)] {
            assert_eq!(
                error_code(validate_label(&label).unwrap_err()),
                error_code(SubnameRegistrarError::InvalidLabel.into())
            );
        }
    }

    #[test]
    fn record_payload_must_target_the_child() {
        let node = namehash(&namehash(&ROOT_NODE, "club"), "alice");
        assert!(verify_record_payload(&payload(&node), &node).is_ok());

        let mismatch_code = error_code(SubnameRegistrarError::NamehashMismatch.into());
        let elsewhere = namehash(&ROOT_NODE, "club");
        assert_eq!(
            error_code(verify_record_payload(&payload(&elsewhere), &node).unwrap_err()),
            mismatch_code
        );
        let truncated = &payload(&node)[..RECORD_SELECTOR_LENGTH + 31];
        assert_eq!(
            error_code(verify_record_payload(truncated, &node).unwrap_err()),
            mismatch_code
        );
    }

    #[test]
    fn mismatched_record_aborts_before_any_dispatch() {
        let node = namehash(&ROOT_NODE, "club");
        let good = payload(&node);
        let bad = payload(&[9u8; 32]);
        let err = dispatch_records(&Pubkey::new_unique(), None, &[], &[good, bad], &node).unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::NamehashMismatch.into())
        );
    }

    #[test]
    fn prefunded_record_address_is_adopted() {
        assert_eq!(
            plan_record_funding(0, 2_000_000),
            RecordFunding::Create { lamports: 2_000_000 }
        );
        assert_eq!(
            plan_record_funding(1, 2_000_000),
            RecordFunding::Adopt { top_up: 1_999_999 }
        );
        assert_eq!(
            plan_record_funding(5_000_000, 2_000_000),
            RecordFunding::Adopt { top_up: 0 }
        );
    }

    #[test]
    fn authorisation_follows_owner_and_expiry() {
        let owner = Pubkey::new_unique();
        let record = ChildRegistration {
            parent_node: ROOT_NODE,
            label: "club",
            owner,
            resolver: Pubkey::default(),
            expiry: 1_000,
        }
        .into_record(0, 255);

        assert!(is_authorised(&record, &owner, 1_000, 0));
        assert!(!is_authorised(&record, &owner, 1_001, 0));
        assert!(!is_authorised(&record, &Pubkey::new_unique(), 10, 0));
        assert_eq!(record.fuses & PARENT_CANNOT_CONTROL, PARENT_CANNOT_CONTROL);
    }
}
