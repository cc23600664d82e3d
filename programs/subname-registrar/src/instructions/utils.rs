use anchor_lang::prelude::*;

/// Cluster time in unix seconds, the clock every expiry is measured against
pub fn get_current_timestamp() -> Result<i64> {
    Ok(Clock::get()?.unix_timestamp)
}
