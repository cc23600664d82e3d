pub use initialize::*;
mod initialize;

pub use register_parent::*;
mod register_parent;

pub use update_authority::*;
mod update_authority;

pub use update_grace_period::*;
mod update_grace_period;

pub use update_parent_expiry::*;
mod update_parent_expiry;

pub use withdraw_treasury::*;
mod withdraw_treasury;
