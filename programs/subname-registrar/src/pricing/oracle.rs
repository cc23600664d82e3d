//! SOL/USD rate access and the conversions between lamports and stable units.
//!
//! Every read goes to the Pyth price account; nothing is cached between reads.

use anchor_lang::prelude::*;
use pyth_solana_receiver_sdk::price_update::{get_feed_id_from_hex, PriceUpdateV2};

use crate::constants::*;
use crate::error::SubnameRegistrarError;

/// Latest SOL/USD reading. `rate` is the USD price of one SOL scaled by
/// `10^decimals`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleRate {
    pub rate: i64,
    pub decimals: u32,
    pub is_valid: bool,
}

impl OracleRate {
    pub fn invalid() -> Self {
        Self {
            rate: 0,
            decimals: 0,
            is_valid: false,
        }
    }

    fn checked_rate(&self) -> Result<u128> {
        require!(
            self.is_valid && self.rate > 0,
            SubnameRegistrarError::InvalidRate
        );
        Ok(self.rate as u128)
    }

    /// 10^(native decimals + oracle decimals - stable decimals)
    fn scale(&self) -> Result<u128> {
        let exponent = NATIVE_DECIMALS
            .checked_add(self.decimals)
            .and_then(|exponent| exponent.checked_sub(STABLE_DECIMALS))
            .ok_or(error!(SubnameRegistrarError::MathOverflow))?;
        10u128
            .checked_pow(exponent)
            .ok_or(error!(SubnameRegistrarError::MathOverflow))
    }
}

pub trait RateSource {
    fn latest_rate(&self) -> Result<OracleRate>;
}

/// Rate source backed by a Pyth pull-oracle price update account
pub struct PythRateSource<'a> {
    price_update: Option<&'a PriceUpdateV2>,
}

impl<'a> PythRateSource<'a> {
    pub fn new(price_update: Option<&'a PriceUpdateV2>) -> Self {
        Self { price_update }
    }
}

impl RateSource for PythRateSource<'_> {
    fn latest_rate(&self) -> Result<OracleRate> {
        let price_update = self
            .price_update
            .ok_or(error!(SubnameRegistrarError::MissingAccount))?;
        let feed_id = get_feed_id_from_hex(SOL_USD_PRICE_FEED_ID)?;

        match price_update.get_price_no_older_than(&Clock::get()?, PYTH_PRICE_FEED_MAX_AGE, &feed_id) {
            Ok(price) if price.exponent <= 0 => Ok(OracleRate {
                rate: price.price,
                decimals: price.exponent.unsigned_abs(),
                is_valid: true,
            }),
            Ok(price) => {
                msg!("Unexpected positive price exponent {}", price.exponent);
                Ok(OracleRate::invalid())
            }
            Err(_) => {
                msg!("SOL/USD price is stale or does not match the feed");
                Ok(OracleRate::invalid())
            }
        }
    }
}

/// Lamports worth `stable_amount` stable units at `rate`
pub fn stable_to_native(stable_amount: u64, rate: &OracleRate) -> Result<u64> {
    let price = rate.checked_rate()?;
    let lamports = (stable_amount as u128)
        .checked_mul(rate.scale()?)
        .ok_or(error!(SubnameRegistrarError::MathOverflow))?
        / price;
    u64::try_from(lamports).map_err(|_| error!(SubnameRegistrarError::MathOverflow))
}

/// Stable units worth `lamports` at `rate`, rounded down
pub fn native_to_stable(lamports: u64, rate: &OracleRate) -> Result<u64> {
    let price = rate.checked_rate()?;
    let stable = (lamports as u128)
        .checked_mul(price)
        .ok_or(error!(SubnameRegistrarError::MathOverflow))?
        / rate.scale()?;
    u64::try_from(stable).map_err(|_| error!(SubnameRegistrarError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{error_code, sol_usd};

    #[test]
    fn converts_one_dollar_at_150() {
        let rate = sol_usd(150);
        assert_eq!(stable_to_native(1_000_000, &rate).unwrap(), 6_666_666);
        assert_eq!(native_to_stable(1_000_000_000, &rate).unwrap(), 150_000_000);
    }

    #[test]
    fn doubling_the_rate_halves_the_native_fee() {
        let fee = 3_000_000;
        let low = stable_to_native(fee, &sol_usd(120)).unwrap();
        let high = stable_to_native(fee, &sol_usd(240)).unwrap();
        assert!(high <= low);
        assert!(low / 2 - high <= 1);
    }

    #[test]
    fn dust_rounds_to_zero() {
        assert_eq!(native_to_stable(1, &sol_usd(150)).unwrap(), 0);
    }

    #[test]
    fn rejects_unusable_rates() {
        let invalid_code = error_code(SubnameRegistrarError::InvalidRate.into());
        let negative = OracleRate {
            rate: -1,
            decimals: 8,
            is_valid: true,
        };
        let zero = OracleRate {
            rate: 0,
            decimals: 8,
            is_valid: true,
        };
        let stale = OracleRate {
            is_valid: false,
            ..sol_usd(150)
        };

        for rate in [negative, zero, stale, OracleRate::invalid()] {
            assert_eq!(error_code(stable_to_native(1, &rate).unwrap_err()), invalid_code);
            assert_eq!(error_code(native_to_stable(1, &rate).unwrap_err()), invalid_code);
        }
    }

    #[test]
    fn missing_price_account_is_reported() {
        let err = PythRateSource::new(None).latest_rate().unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::MissingAccount.into())
        );
    }
}
