pub use transfer_name::*;
mod transfer_name;
