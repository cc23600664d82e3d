use anchor_lang::prelude::*;

use crate::error::SubnameRegistrarError;
use crate::pricing::{
    periods, stable_to_native, MultiUnitQuoter, PriceQuote, PriceQuoter, PriceUnit, RateSource,
};

/// Price per period set in stable units. Native quotes are converted through
/// the oracle at the time of the call.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct PeriodicPricer {
    /// Unit used when the caller does not pick one
    pub default_unit: PriceUnit,
    /// Stable minor units charged per week
    pub price_per_period: u64,
}

impl PeriodicPricer {
    fn stable_amount(&self, duration: i64) -> Result<u64> {
        periods(duration)?
            .checked_mul(self.price_per_period)
            .ok_or(error!(SubnameRegistrarError::MathOverflow))
    }
}

impl PriceQuoter for PeriodicPricer {
    fn default_unit(&self) -> PriceUnit {
        self.default_unit
    }

    fn quote(&self, duration: i64, rates: &dyn RateSource) -> Result<PriceQuote> {
        Ok(PriceQuote {
            unit: self.default_unit,
            amount: self.quote_for_unit(duration, self.default_unit, rates)?,
        })
    }

    fn multi_unit(&self) -> Option<&dyn MultiUnitQuoter> {
        Some(self)
    }
}

impl MultiUnitQuoter for PeriodicPricer {
    fn quote_for_unit(&self, duration: i64, unit: PriceUnit, rates: &dyn RateSource) -> Result<u64> {
        let stable = self.stable_amount(duration)?;
        match unit {
            PriceUnit::Stable => Ok(stable),
            PriceUnit::Native => stable_to_native(stable, &rates.latest_rate()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PERIOD_SECONDS;
    use crate::pricing::OracleRate;
    use crate::test_utils::{error_code, sol_usd, StaticRate};

    fn half_dollar_weekly() -> PeriodicPricer {
        PeriodicPricer {
            default_unit: PriceUnit::Stable,
            price_per_period: 500_000,
        }
    }

    #[test]
    fn stable_fee_has_no_rounding_drift() {
        let pricer = half_dollar_weekly();
        let rates = StaticRate(sol_usd(150));
        for n in 1..=104u64 {
            let quote = pricer.quote(n as i64 * PERIOD_SECONDS, &rates).unwrap();
            assert_eq!(quote.amount, n * 500_000);
        }
        assert_eq!(
            pricer.quote(2 * PERIOD_SECONDS, &rates).unwrap().amount,
            1_000_000
        );
    }

    #[test]
    fn native_quote_fails_closed_on_bad_rate() {
        let pricer = half_dollar_weekly();
        let err = pricer
            .quote_for_unit(PERIOD_SECONDS, PriceUnit::Native, &StaticRate(OracleRate::invalid()))
            .unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::InvalidRate.into())
        );
    }

    #[test]
    fn stable_quote_ignores_a_broken_oracle() {
        let pricer = half_dollar_weekly();
        let amount = pricer
            .quote_for_unit(PERIOD_SECONDS, PriceUnit::Stable, &StaticRate(OracleRate::invalid()))
            .unwrap();
        assert_eq!(amount, 500_000);
    }
}
