//! Error types for the canvas core.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a stored record back into an item.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemError {
    #[error("malformed item record: {0}")]
    MalformedRecord(String),
    #[error("unknown item type: {0:?}")]
    UnknownItemType(String),
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("image asset not found: {0}")]
    AssetNotFound(String),
    #[error("invalid image id: {0:?}")]
    InvalidImageId(String),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("notebook not found: {0}")]
    NotebookNotFound(String),
    #[error("page {page} not found in notebook {notebook}")]
    PageNotFound { notebook: String, page: String },
    #[error("a notebook named {0:?} already exists")]
    DuplicateNotebook(String),
    #[error("{0:?} is not a valid notebook name")]
    InvalidNotebookName(String),
    #[error("the default page of a notebook cannot be deleted")]
    DefaultPageProtected,
    #[error("page file {path} is corrupt: {reason}")]
    CorruptPage { path: PathBuf, reason: String },
    #[error("notebook metadata {path} is corrupt: {source}")]
    CorruptMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no page is open")]
    NoPageOpen,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
