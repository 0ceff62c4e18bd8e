//! Page document codec.
//!
//! A page file is `{"items": [record, ...]}` in z-order. Images are stored
//! beside it through an [`AssetStore`]; only their id travels in the JSON.

use std::collections::HashMap;
use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::AssetStore;
use crate::error::{AssetError, ItemError};
use crate::model::Item;

/// Bitmaps held in memory for the images of one page, keyed by image id.
pub type Bitmaps = HashMap<String, RgbaImage>;

#[derive(Debug, Serialize, Deserialize)]
pub struct PageFile {
    pub items: Vec<Value>,
}

/// A record that was dropped while decoding a page. The rest of the page
/// still loads.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadWarning {
    Malformed { index: usize, reason: String },
    UnknownType { index: usize, type_tag: String },
    AssetMissing { image_id: String },
    AssetUnreadable { image_id: String, reason: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::Malformed { index, reason } => {
                write!(f, "item {index} skipped: {reason}")
            }
            LoadWarning::UnknownType { index, type_tag } => {
                write!(f, "item {index} skipped: unknown type {type_tag:?}")
            }
            LoadWarning::AssetMissing { image_id } => {
                write!(f, "image {image_id} skipped: asset file missing")
            }
            LoadWarning::AssetUnreadable { image_id, reason } => {
                write!(f, "image {image_id} skipped: {reason}")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct DecodedPage {
    pub items: Vec<Item>,
    pub bitmaps: Bitmaps,
    pub warnings: Vec<LoadWarning>,
}

/// Build the page document for `items`, writing every in-memory bitmap to
/// `store` first.
pub fn encode_page(
    items: &[Item],
    bitmaps: &Bitmaps,
    store: &AssetStore,
) -> Result<PageFile, AssetError> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        if let Item::Image(img) = item {
            match bitmaps.get(&img.image_id) {
                Some(bitmap) => {
                    store.put(&img.image_id, bitmap)?;
                }
                None if !store.contains(&img.image_id) => {
                    tracing::warn!(
                        image_id = %img.image_id,
                        "saving image reference without pixel data or asset file"
                    );
                }
                None => {}
            }
        }
        records.push(item.to_record());
    }
    Ok(PageFile { items: records })
}

/// Serialize a page document to the exact bytes written to disk.
pub fn page_to_json(page: &PageFile) -> serde_json::Result<String> {
    serde_json::to_string_pretty(page)
}

/// Decode a page document. Only a document that is not a page at all is an
/// error; bad records and missing assets are reported as warnings.
pub fn decode_page(json: &str, store: &AssetStore) -> Result<DecodedPage, serde_json::Error> {
    let file: PageFile = serde_json::from_str(json)?;
    let mut page = DecodedPage::default();

    for (index, record) in file.items.iter().enumerate() {
        let item = match Item::from_record(record) {
            Ok(item) => item,
            Err(ItemError::UnknownItemType(type_tag)) => {
                tracing::warn!(index, type_tag = %type_tag, "skipping item of unknown type");
                page.warnings.push(LoadWarning::UnknownType { index, type_tag });
                continue;
            }
            Err(ItemError::MalformedRecord(reason)) => {
                tracing::warn!(index, reason = %reason, "skipping malformed item");
                page.warnings.push(LoadWarning::Malformed { index, reason });
                continue;
            }
        };

        if let Item::Image(img) = &item {
            match store.get(&img.image_id) {
                Ok(bitmap) => {
                    let recorded = (img.width, img.height);
                    let actual = bitmap.dimensions();
                    if actual != recorded {
                        tracing::warn!(
                            image_id = %img.image_id,
                            ?recorded,
                            ?actual,
                            "image asset size differs from its record"
                        );
                    }
                    page.bitmaps.insert(img.image_id.clone(), bitmap);
                }
                Err(AssetError::AssetNotFound(image_id)) => {
                    tracing::warn!(image_id = %image_id, "skipping image with missing asset");
                    page.warnings.push(LoadWarning::AssetMissing { image_id });
                    continue;
                }
                Err(e) => {
                    tracing::warn!(image_id = %img.image_id, error = %e, "skipping unreadable image");
                    page.warnings.push(LoadWarning::AssetUnreadable {
                        image_id: img.image_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
        }
        page.items.push(item);
    }

    Ok(page)
}
