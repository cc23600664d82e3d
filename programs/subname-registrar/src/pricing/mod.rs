//! Fee quoting for child names.
//!
//! A parent's [`DomainConfig`](crate::state::DomainConfig) stores one [`Pricer`].
//! Every pricer answers in its own default unit; only pricers exposing the
//! [`MultiUnitQuoter`] capability can answer in a unit chosen by the caller.

use anchor_lang::prelude::*;

use crate::constants::PERIOD_SECONDS;
use crate::error::SubnameRegistrarError;

pub use fixed::*;
pub use oracle::*;
pub use periodic::*;

mod fixed;
pub mod oracle;
mod periodic;

/// Unit a fee is denominated and settled in
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum PriceUnit {
    /// Stable token minor units (6 decimals)
    Stable,
    /// Lamports
    Native,
}

/// A fee computed for a single call, never cached
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceQuote {
    pub unit: PriceUnit,
    pub amount: u64,
}

pub trait PriceQuoter {
    fn default_unit(&self) -> PriceUnit;

    /// Fee for `duration` seconds in the pricer's default unit
    fn quote(&self, duration: i64, rates: &dyn RateSource) -> Result<PriceQuote>;

    /// Capability check for quoting in a caller-chosen unit
    fn multi_unit(&self) -> Option<&dyn MultiUnitQuoter> {
        None
    }
}

pub trait MultiUnitQuoter {
    fn quote_for_unit(&self, duration: i64, unit: PriceUnit, rates: &dyn RateSource) -> Result<u64>;
}

/// Pricing strategy stored in a domain configuration
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum Pricer {
    Fixed(FixedPricer),
    Periodic(PeriodicPricer),
}

impl Pricer {
    pub fn quoter(&self) -> &dyn PriceQuoter {
        match self {
            Pricer::Fixed(pricer) => pricer,
            Pricer::Periodic(pricer) => pricer,
        }
    }

    pub fn default_unit(&self) -> PriceUnit {
        self.quoter().default_unit()
    }

    /// Quote in `unit` when one is requested, otherwise in the default unit
    pub fn quote_in(
        &self,
        duration: i64,
        unit: Option<PriceUnit>,
        rates: &dyn RateSource,
    ) -> Result<PriceQuote> {
        let quoter = self.quoter();
        let Some(unit) = unit else {
            return quoter.quote(duration, rates);
        };

        match quoter.multi_unit() {
            Some(multi) => Ok(PriceQuote {
                unit,
                amount: multi.quote_for_unit(duration, unit, rates)?,
            }),
            None if unit == quoter.default_unit() => quoter.quote(duration, rates),
            None => err!(SubnameRegistrarError::UnsupportedUnit),
        }
    }
}

/// Number of whole pricing periods in `duration`
pub fn periods(duration: i64) -> Result<u64> {
    require!(
        duration > 0 && duration % PERIOD_SECONDS == 0,
        SubnameRegistrarError::InvalidDuration
    );
    Ok((duration / PERIOD_SECONDS) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{error_code, sol_usd, StaticRate};

    #[test]
    fn rejects_zero_negative_and_partial_periods() {
        for duration in [0, -PERIOD_SECONDS, 1, PERIOD_SECONDS - 1, PERIOD_SECONDS + 1] {
            let err = periods(duration).unwrap_err();
            assert_eq!(
                error_code(err),
                error_code(SubnameRegistrarError::InvalidDuration.into())
            );
        }
        assert_eq!(periods(PERIOD_SECONDS).unwrap(), 1);
        assert_eq!(periods(52 * PERIOD_SECONDS).unwrap(), 52);
    }

    #[test]
    fn fixed_pricer_rejects_foreign_unit() {
        let pricer = Pricer::Fixed(FixedPricer {
            unit: PriceUnit::Stable,
            price_per_period: 500_000,
        });
        let rates = StaticRate(sol_usd(150));

        let same = pricer
            .quote_in(PERIOD_SECONDS, Some(PriceUnit::Stable), &rates)
            .unwrap();
        assert_eq!(same.amount, 500_000);

        let err = pricer
            .quote_in(PERIOD_SECONDS, Some(PriceUnit::Native), &rates)
            .unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::UnsupportedUnit.into())
        );
    }

    #[test]
    fn periodic_pricer_serves_both_units() {
        let pricer = Pricer::Periodic(PeriodicPricer {
            default_unit: PriceUnit::Native,
            price_per_period: 500_000,
        });
        let rates = StaticRate(sol_usd(100));

        let default = pricer.quote_in(2 * PERIOD_SECONDS, None, &rates).unwrap();
        assert_eq!(default.unit, PriceUnit::Native);
        // $1 at $100/SOL
        assert_eq!(default.amount, 10_000_000);

        let stable = pricer
            .quote_in(2 * PERIOD_SECONDS, Some(PriceUnit::Stable), &rates)
            .unwrap();
        assert_eq!(
            stable,
            PriceQuote {
                unit: PriceUnit::Stable,
                amount: 1_000_000
            }
        );
    }
}
