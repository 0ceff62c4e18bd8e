//! Canvas items: text boxes and image references.
//!
//! Items are plain values. Everything the GUI needs for geometry goes through
//! [`Placeable`]; everything persistence needs goes through
//! [`Item::to_record`] / [`Item::from_record`].

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ItemError;

pub const MIN_TEXT_WIDTH: f32 = 100.0;
pub const MIN_TEXT_HEIGHT: f32 = 50.0;
pub const DEFAULT_TEXT_WIDTH: f32 = 300.0;
pub const DEFAULT_TEXT_HEIGHT: f32 = 200.0;
pub const MIN_IMAGE_SCALE: f32 = 0.1;

/// Half-width of the square region items may be placed in.
pub const CANVAS_EXTENT: f32 = 10_000.0;

fn clamp_coord(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-CANVAS_EXTENT, CANVAS_EXTENT)
    }
}

fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale >= MIN_IMAGE_SCALE {
        scale
    } else {
        MIN_IMAGE_SCALE
    }
}

// ── Geometry ────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: (f32, f32),
    pub max: (f32, f32),
}

impl Bounds {
    pub fn from_pos_size(pos: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            min: pos,
            max: (pos.0 + size.0, pos.1 + size.1),
        }
    }

    pub fn contains(&self, p: (f32, f32)) -> bool {
        p.0 >= self.min.0 && p.0 <= self.max.0 && p.1 >= self.min.1 && p.1 <= self.max.1
    }
}

/// What the GUI layer can do with any item: place it, measure it, hit it,
/// drag it.
pub trait Placeable {
    fn position(&self) -> (f32, f32);

    /// Size as displayed on the canvas.
    fn size(&self) -> (f32, f32);

    fn move_to(&mut self, x: f32, y: f32);

    fn translate(&mut self, dx: f32, dy: f32) {
        let (x, y) = self.position();
        self.move_to(x + dx, y + dy);
    }

    fn bounds(&self) -> Bounds {
        Bounds::from_pos_size(self.position(), self.size())
    }

    fn contains(&self, p: (f32, f32)) -> bool {
        self.bounds().contains(p)
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TextItem {
    /// Opaque markup, stored and restored verbatim.
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextItem {
    pub fn new(content: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut item = Self {
            content: content.into(),
            x: clamp_coord(x),
            y: clamp_coord(y),
            width: MIN_TEXT_WIDTH,
            height: MIN_TEXT_HEIGHT,
        };
        item.resize(width, height);
        item
    }

    /// An empty text box of the default size.
    pub fn at(x: f32, y: f32) -> Self {
        Self::new("", x, y, DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(MIN_TEXT_WIDTH).min(2.0 * CANVAS_EXTENT);
        self.height = height.max(MIN_TEXT_HEIGHT).min(2.0 * CANVAS_EXTENT);
    }

    pub fn to_record(&self) -> Value {
        json!({
            "type": "text",
            "x": self.x,
            "y": self.y,
            "width": self.width.max(MIN_TEXT_WIDTH),
            "height": self.height.max(MIN_TEXT_HEIGHT),
            "content": self.content,
        })
    }

    pub fn from_record(record: &Value) -> Result<Self, ItemError> {
        let raw: TextItem = serde_json::from_value(record.clone())
            .map_err(|e| ItemError::MalformedRecord(format!("text: {e}")))?;
        check_finite(&[raw.x, raw.y, raw.width, raw.height])?;
        Ok(Self::new(raw.content, raw.x, raw.y, raw.width, raw.height))
    }
}

impl Placeable for TextItem {
    fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.x = clamp_coord(x);
        self.y = clamp_coord(y);
    }
}

// ── Image ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImageItem {
    pub image_id: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    /// Natural pixel size of the bitmap.
    pub width: u32,
    pub height: u32,
}

impl ImageItem {
    pub fn new(image_id: impl Into<String>, x: f32, y: f32, width: u32, height: u32) -> Self {
        Self {
            image_id: image_id.into(),
            x: clamp_coord(x),
            y: clamp_coord(y),
            scale: 1.0,
            width,
            height,
        }
    }

    /// A new image reference with a freshly generated id.
    pub fn with_new_id(x: f32, y: f32, width: u32, height: u32) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), x, y, width, height)
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = clamp_scale(scale);
    }

    pub fn to_record(&self) -> Value {
        json!({
            "type": "image",
            "image_id": self.image_id,
            "x": self.x,
            "y": self.y,
            "scale": clamp_scale(self.scale),
            "width": self.width,
            "height": self.height,
        })
    }

    pub fn from_record(record: &Value) -> Result<Self, ItemError> {
        let raw: ImageItem = serde_json::from_value(record.clone())
            .map_err(|e| ItemError::MalformedRecord(format!("image: {e}")))?;
        check_finite(&[raw.x, raw.y, raw.scale])?;
        if raw.image_id.is_empty() {
            return Err(ItemError::MalformedRecord("image: empty image_id".into()));
        }
        let mut item = Self::new(raw.image_id, raw.x, raw.y, raw.width, raw.height);
        item.set_scale(raw.scale);
        Ok(item)
    }
}

impl Placeable for ImageItem {
    fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn size(&self) -> (f32, f32) {
        (
            self.width as f32 * self.scale,
            self.height as f32 * self.scale,
        )
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.x = clamp_coord(x);
        self.y = clamp_coord(y);
    }
}

fn check_finite(values: &[f32]) -> Result<(), ItemError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ItemError::MalformedRecord("non-finite number".into()))
    }
}

// ── Item ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Text(TextItem),
    Image(ImageItem),
}

impl Item {
    pub fn to_record(&self) -> Value {
        match self {
            Item::Text(t) => t.to_record(),
            Item::Image(i) => i.to_record(),
        }
    }

    pub fn from_record(record: &Value) -> Result<Self, ItemError> {
        let tag = record
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ItemError::MalformedRecord("missing \"type\" tag".into()))?;
        match tag {
            "text" => TextItem::from_record(record).map(Item::Text),
            "image" => ImageItem::from_record(record).map(Item::Image),
            other => Err(ItemError::UnknownItemType(other.to_string())),
        }
    }

    pub fn as_text(&self) -> Option<&TextItem> {
        match self {
            Item::Text(t) => Some(t),
            Item::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageItem> {
        match self {
            Item::Image(i) => Some(i),
            Item::Text(_) => None,
        }
    }
}

impl Placeable for Item {
    fn position(&self) -> (f32, f32) {
        match self {
            Item::Text(t) => t.position(),
            Item::Image(i) => i.position(),
        }
    }

    fn size(&self) -> (f32, f32) {
        match self {
            Item::Text(t) => t.size(),
            Item::Image(i) => i.size(),
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        match self {
            Item::Text(t) => t.move_to(x, y),
            Item::Image(i) => i.move_to(x, y),
        }
    }
}

impl From<TextItem> for Item {
    fn from(t: TextItem) -> Self {
        Item::Text(t)
    }
}

impl From<ImageItem> for Item {
    fn from(i: ImageItem) -> Self {
        Item::Image(i)
    }
}
