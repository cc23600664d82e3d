pub use queries::*;
mod queries;
