pub use deposit::*;
mod deposit;

pub use register_from_balance::*;
mod register_from_balance;

pub use renew_from_balance::*;
mod renew_from_balance;

pub mod utils;
