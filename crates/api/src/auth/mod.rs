//! Caller identity from bearer tokens.
//!
//! - [`token`] -- validates tokens minted by the account service.

pub mod token;
