use anchor_lang::error::Error;
use anchor_lang::prelude::*;

use crate::pricing::{OracleRate, RateSource};

/// Numeric code of an Anchor error, so tests compare codes and not origins
pub fn error_code(err: Error) -> u32 {
    match err {
        Error::AnchorError(err) => err.error_code_number,
        Error::ProgramError(err) => panic!("expected an anchor error, got {err:?}"),
    }
}

/// SOL/USD reading in Pyth's 8-decimal format
pub fn sol_usd(dollars: i64) -> OracleRate {
    OracleRate {
        rate: dollars * 100_000_000,
        decimals: 8,
        is_valid: true,
    }
}

pub struct StaticRate(pub OracleRate);

impl RateSource for StaticRate {
    fn latest_rate(&self) -> Result<OracleRate> {
        Ok(self.0)
    }
}
