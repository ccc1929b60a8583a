pub mod config;
pub mod error;
pub mod types;

pub use config::{Credentials, WalrusConfig};
pub use error::{Result, WalrusError};
pub use types::*;
