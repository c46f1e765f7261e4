pub mod client;
mod config;
mod error;
pub mod signer;

pub use client::SumsubClient;
pub use config::{SumsubConfig, DEFAULT_TIMEOUT, SUMSUB_BASE_URL};
pub use error::SumsubError;
pub use signer::{RequestSigner, SignedRequest};
