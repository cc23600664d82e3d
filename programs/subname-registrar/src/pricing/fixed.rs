use anchor_lang::prelude::*;

use crate::error::SubnameRegistrarError;
use crate::pricing::{periods, PriceQuote, PriceQuoter, PriceUnit, RateSource};

/// Flat price per period in a single unit, no oracle involved
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct FixedPricer {
    pub unit: PriceUnit,
    /// Minor units of `unit` charged per week
    pub price_per_period: u64,
}

impl PriceQuoter for FixedPricer {
    fn default_unit(&self) -> PriceUnit {
        self.unit
    }

    fn quote(&self, duration: i64, _rates: &dyn RateSource) -> Result<PriceQuote> {
        let amount = periods(duration)?
            .checked_mul(self.price_per_period)
            .ok_or(error!(SubnameRegistrarError::MathOverflow))?;
        Ok(PriceQuote {
            unit: self.unit,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PERIOD_SECONDS;
    use crate::pricing::OracleRate;

    struct Unreachable;

    impl RateSource for Unreachable {
        fn latest_rate(&self) -> Result<OracleRate> {
            panic!("fixed pricing must not read the oracle")
        }
    }

    #[test]
    fn native_price_is_taken_verbatim() {
        let pricer = FixedPricer {
            unit: PriceUnit::Native,
            price_per_period: 2_000_000,
        };
        let quote = pricer.quote(3 * PERIOD_SECONDS, &Unreachable).unwrap();
        assert_eq!(
            quote,
            PriceQuote {
                unit: PriceUnit::Native,
                amount: 6_000_000
            }
        );
        assert!(pricer.multi_unit().is_none());
    }
}
