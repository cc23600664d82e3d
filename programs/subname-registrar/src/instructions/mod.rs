pub mod admin;
pub mod balance;
pub mod domain;
pub mod register;
pub mod transfer;
pub mod utils;
pub mod view;

pub use admin::*;
pub use balance::*;
pub use domain::*;
pub use register::*;
pub use transfer::*;
pub use view::*;
