pub use setup_domain::*;
mod setup_domain;
