//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! database row, plus `Deserialize` DTOs for inserts and patches where the
//! table is written through the API.

pub mod asset;
pub mod format;
pub mod hidden_media;
pub mod tag;
pub mod user;
