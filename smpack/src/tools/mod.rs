pub mod download;
pub mod validate;
