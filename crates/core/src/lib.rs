//! Domain logic for the 3D asset gallery.
//!
//! Nothing in this crate talks to the database. The repository layer loads
//! rows, converts them into the plain values defined here and persists the
//! results.

pub mod access;
pub mod catalog;
pub mod config;
pub mod derived;
pub mod downloads;
pub mod error;
pub mod formats;
pub mod pagination;
pub mod query;
pub mod rank;
pub mod roles;
pub mod storage;
pub mod types;
