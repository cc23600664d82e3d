use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, transfer};
use anchor_spl::token::{self, Token, TokenAccount};

use crate::error::SubnameRegistrarError;
use crate::pricing::{PriceQuote, PriceUnit};
use crate::registry::load_program_account;
use crate::state::*;

/// Load the configuration of a parent, failing unless it exists and is active
pub fn load_active_config(info: &AccountInfo, program_id: &Pubkey) -> Result<DomainConfig> {
    let config = load_program_account::<DomainConfig>(info, program_id)?
        .ok_or(error!(SubnameRegistrarError::ParentNameNotSetup))?;
    require!(config.active, SubnameRegistrarError::ParentNameNotSetup);
    Ok(config)
}

/// Check that the parent is alive and outlives `now + duration`.
/// Returns the parent's effective expiry.
pub fn validate_parent(
    parent: &NameRecord,
    current_timestamp: i64,
    duration: i64,
    grace_period_seconds: i64,
) -> Result<i64> {
    let parent_expiry = parent.effective_expiry(grace_period_seconds);
    require!(
        current_timestamp <= parent_expiry,
        SubnameRegistrarError::ParentExpired
    );
    let end = current_timestamp
        .checked_add(duration)
        .ok_or(error!(SubnameRegistrarError::MathOverflow))?;
    require!(end <= parent_expiry, SubnameRegistrarError::DurationTooLong);
    Ok(parent_expiry)
}

/// Expiry of a fresh registration
pub fn calculate_expiry_timestamp(current_timestamp: i64, duration: i64) -> Result<i64> {
    current_timestamp
        .checked_add(duration)
        .ok_or(error!(SubnameRegistrarError::MathOverflow))
}

/// Expiry after renewing `record` by `duration`. Time already paid for is
/// kept; children get no grace on their own expiry.
pub fn calculate_renewed_expiry(
    record: &NameRecord,
    current_timestamp: i64,
    duration: i64,
    parent_expiry: i64,
) -> Result<i64> {
    require!(
        !record.is_vacant() && !record.is_expired(current_timestamp),
        SubnameRegistrarError::NameNotRegistered
    );
    let new_expiry = record
        .expiry_timestamp
        .checked_add(duration)
        .ok_or(error!(SubnameRegistrarError::MathOverflow))?;
    require!(
        new_expiry <= parent_expiry,
        SubnameRegistrarError::DurationTooLong
    );
    Ok(new_expiry)
}

/// Batch inputs must be non-empty and of one length
pub fn check_batch_lengths(expected: usize, lengths: &[usize]) -> Result<()> {
    require!(
        expected > 0 && lengths.iter().all(|length| *length == expected),
        SubnameRegistrarError::DataMissing
    );
    Ok(())
}

pub fn sum_fees(fees: impl IntoIterator<Item = u64>) -> Result<u64> {
    fees.into_iter().try_fold(0u64, |total, fee| {
        total
            .checked_add(fee)
            .ok_or(error!(SubnameRegistrarError::MathOverflow))
    })
}

/// What the collector moves for a quote
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentPlan {
    /// Amount forwarded to the beneficiary
    pub forward: u64,
    /// Supplied lamports beyond the fee, left with the caller
    pub surplus: u64,
}

pub fn plan_payment(quote: PriceQuote, supplied_lamports: u64) -> Result<PaymentPlan> {
    match quote.unit {
        PriceUnit::Native => {
            require!(
                supplied_lamports >= quote.amount,
                SubnameRegistrarError::InsufficientPayment
            );
            Ok(PaymentPlan {
                forward: quote.amount,
                surplus: supplied_lamports - quote.amount,
            })
        }
        // paying in tokens and lamports at once is not allowed
        PriceUnit::Stable => {
            require!(
                supplied_lamports == 0,
                SubnameRegistrarError::InsufficientPayment
            );
            Ok(PaymentPlan {
                forward: quote.amount,
                surplus: 0,
            })
        }
    }
}

/// Moves a fee from the caller to the parent's beneficiary
pub struct PaymentCollector<'a, 'info> {
    pub payer: &'a Signer<'info>,
    pub beneficiary: &'a AccountInfo<'info>,
    pub payer_stable_account: Option<&'a Account<'info, TokenAccount>>,
    pub beneficiary_stable_account: Option<&'a Account<'info, TokenAccount>>,
    pub token_program: Option<&'a Program<'info, Token>>,
    pub system_program: &'a Program<'info, System>,
}

impl PaymentCollector<'_, '_> {
    /// Collect `quote` and return the surplus left with the caller
    pub fn collect(&self, config: &DomainConfig, quote: PriceQuote, supplied_lamports: u64) -> Result<u64> {
        require_keys_eq!(
            self.beneficiary.key(),
            config.beneficiary,
            SubnameRegistrarError::BeneficiaryMismatch
        );
        let plan = plan_payment(quote, supplied_lamports)?;
        if plan.forward == 0 {
            return Ok(plan.surplus);
        }

        match quote.unit {
            PriceUnit::Native => transfer(
                CpiContext::new(
                    self.system_program.to_account_info(),
                    system_program::Transfer {
                        from: self.payer.to_account_info(),
                        to: self.beneficiary.clone(),
                    },
                ),
                plan.forward,
            )
            .map_err(|_| error!(SubnameRegistrarError::TransferFailed))?,
            PriceUnit::Stable => {
                let missing = || error!(SubnameRegistrarError::MissingAccount);
                let from = self.payer_stable_account.ok_or_else(missing)?;
                let to = self.beneficiary_stable_account.ok_or_else(missing)?;
                let token_program = self.token_program.ok_or_else(missing)?;
                require_keys_eq!(
                    to.owner,
                    config.beneficiary,
                    SubnameRegistrarError::BeneficiaryMismatch
                );

                token::transfer(
                    CpiContext::new(
                        token_program.to_account_info(),
                        token::Transfer {
                            from: from.to_account_info(),
                            to: to.to_account_info(),
                            authority: self.payer.to_account_info(),
                        },
                    ),
                    plan.forward,
                )
                .map_err(|_| error!(SubnameRegistrarError::TransferFailed))?
            }
        }

        msg!("Collected {} {:?} for beneficiary {}", plan.forward, quote.unit, config.beneficiary);
        Ok(plan.surplus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::test_utils::error_code;

    const DAY: i64 = 24 * 60 * 60;

    fn name(expiry: i64, fuses: u32) -> NameRecord {
        NameRecord {
            node: [1u8; 32],
            parent: ROOT_NODE,
            label: "name".to_string(),
            owner: Pubkey::new_unique(),
            resolver: Pubkey::default(),
            fuses,
            expiry_timestamp: expiry,
            registration_timestamp: 0,
            bump: 255,
        }
    }

    fn code(err: Error) -> u32 {
        error_code(err)
    }

    fn expect(err: SubnameRegistrarError) -> u32 {
        error_code(err.into())
    }

    #[test]
    fn parent_must_outlive_the_child() {
        let now = 1_000 * DAY;
        let parent = name(now + 30 * DAY, 0);
        assert!(validate_parent(&parent, now, PERIOD_SECONDS, 0).is_ok());
        assert!(validate_parent(&parent, now, 30 * DAY, 0).is_ok());
        assert_eq!(
            code(validate_parent(&parent, now, 5 * PERIOD_SECONDS, 0).unwrap_err()),
            expect(SubnameRegistrarError::DurationTooLong)
        );
        assert_eq!(
            code(validate_parent(&parent, now + 31 * DAY, PERIOD_SECONDS, 0).unwrap_err()),
            expect(SubnameRegistrarError::ParentExpired)
        );
    }

    #[test]
    fn protected_parent_loses_its_grace_period() {
        let grace = DEFAULT_GRACE_PERIOD_SECONDS;
        let raw_expiry = 2_000 * DAY;
        let parent = name(raw_expiry, IS_TOP_LEVEL);
        let effective = raw_expiry - grace;

        assert_eq!(
            code(validate_parent(&parent, effective + 1, 0, grace).unwrap_err()),
            expect(SubnameRegistrarError::ParentExpired)
        );
        // a zero duration isolates the expiry check from the duration bound
        assert!(validate_parent(&parent, effective - 1, 0, grace).is_ok());
        assert_eq!(
            code(validate_parent(&parent, effective - 1, PERIOD_SECONDS, grace).unwrap_err()),
            expect(SubnameRegistrarError::DurationTooLong)
        );
        assert!(validate_parent(&parent, effective - PERIOD_SECONDS - 1, PERIOD_SECONDS, grace).is_ok());
    }

    #[test]
    fn renewal_extends_from_previous_expiry() {
        let now = 500 * DAY;
        let child = name(now + 10 * DAY, PARENT_CANNOT_CONTROL);
        let renewed = calculate_renewed_expiry(&child, now, PERIOD_SECONDS, i64::MAX).unwrap();
        assert_eq!(renewed - now, 17 * DAY);
    }

    #[test]
    fn renewal_of_expired_or_missing_name_fails() {
        let now = 500 * DAY;
        let expired = name(now - 1, PARENT_CANNOT_CONTROL);
        assert_eq!(
            code(calculate_renewed_expiry(&expired, now, PERIOD_SECONDS, i64::MAX).unwrap_err()),
            expect(SubnameRegistrarError::NameNotRegistered)
        );

        let mut vacant = name(now + DAY, 0);
        vacant.node = [0u8; 32];
        assert_eq!(
            code(calculate_renewed_expiry(&vacant, now, PERIOD_SECONDS, i64::MAX).unwrap_err()),
            expect(SubnameRegistrarError::NameNotRegistered)
        );
    }

    #[test]
    fn renewal_cannot_outlive_the_parent() {
        let now = 500 * DAY;
        let child = name(now + 10 * DAY, PARENT_CANNOT_CONTROL);
        let parent_expiry = now + 14 * DAY;
        assert_eq!(
            code(calculate_renewed_expiry(&child, now, PERIOD_SECONDS, parent_expiry).unwrap_err()),
            expect(SubnameRegistrarError::DurationTooLong)
        );
    }

    #[test]
    fn native_overpayment_is_left_with_caller() {
        let quote = PriceQuote {
            unit: PriceUnit::Native,
            amount: 6_666_666,
        };
        let plan = plan_payment(quote, 10_000_000).unwrap();
        assert_eq!(plan.forward, 6_666_666);
        assert_eq!(plan.surplus, 3_333_334);
        assert_eq!(plan.forward + plan.surplus, 10_000_000);

        assert_eq!(
            code(plan_payment(quote, 6_666_665).unwrap_err()),
            expect(SubnameRegistrarError::InsufficientPayment)
        );
    }

    #[test]
    fn token_payment_rejects_attached_lamports() {
        let quote = PriceQuote {
            unit: PriceUnit::Stable,
            amount: 1_000_000,
        };
        assert_eq!(
            plan_payment(quote, 0).unwrap(),
            PaymentPlan {
                forward: 1_000_000,
                surplus: 0
            }
        );
        assert_eq!(
            code(plan_payment(quote, 1).unwrap_err()),
            expect(SubnameRegistrarError::InsufficientPayment)
        );
    }

    #[test]
    fn batch_lengths_must_agree() {
        assert!(check_batch_lengths(3, &[3, 3, 3]).is_ok());
        assert_eq!(
            code(check_batch_lengths(3, &[3, 2]).unwrap_err()),
            expect(SubnameRegistrarError::DataMissing)
        );
        assert_eq!(
            code(check_batch_lengths(0, &[0]).unwrap_err()),
            expect(SubnameRegistrarError::DataMissing)
        );
    }

    #[test]
    fn fees_are_summed_with_overflow_check() {
        assert_eq!(sum_fees([500_000, 1_000_000, 0]).unwrap(), 1_500_000);
        assert_eq!(
            code(sum_fees([u64::MAX, 1]).unwrap_err()),
            expect(SubnameRegistrarError::MathOverflow)
        );
    }
}
