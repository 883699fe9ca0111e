pub mod assets;
pub mod hidden_media;
