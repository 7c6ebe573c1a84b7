//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cannot walk assets under {root}: {message}")]
    AssetWalk { root: String, message: String },

    #[error("cannot read asset {path}: {message}")]
    AssetRead { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
