//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod asset_repo;
pub mod format_repo;
pub mod hidden_media_repo;
pub mod tag_repo;
pub mod user_repo;

pub use asset_repo::AssetRepo;
pub use format_repo::FormatRepo;
pub use hidden_media_repo::HiddenMediaRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
