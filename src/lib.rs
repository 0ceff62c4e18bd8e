//! Notebooks of infinite canvases holding text boxes and images.
//!
//! The GUI drives a [`CanvasSession`]; everything below it is plain data and
//! file I/O:
//!
//! - [`model`]: text and image items, their records and geometry
//! - [`canvas`]: the items of the open page
//! - [`codec`]: page documents
//! - [`assets`]: PNG files per image id
//! - [`repository`]: notebooks and pages on disk

pub mod assets;
pub mod canvas;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod session;

pub use canvas::Canvas;
pub use codec::{DecodedPage, LoadWarning};
pub use error::{AssetError, ItemError, RepositoryError, SessionError};
pub use model::{ImageItem, Item, Placeable, TextItem};
pub use repository::{NotebookMeta, PageMeta, Repository, DEFAULT_PAGE_ID};
pub use session::CanvasSession;
