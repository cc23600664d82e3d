pub use register_name::*;
mod register_name;

pub use renew_name::*;
mod renew_name;

pub use batch_register::*;
mod batch_register;

pub use batch_renew::*;
mod batch_renew;

pub mod utils;
