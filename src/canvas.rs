//! The in-memory item set of the open page.

use image::RgbaImage;

use crate::codec::{Bitmaps, DecodedPage};
use crate::model::{ImageItem, Item, Placeable, TextItem, DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH};

/// Items in z-order (last is topmost) plus the pixel data of their images.
#[derive(Debug)]
pub struct Canvas {
    items: Vec<Item>,
    bitmaps: Bitmaps,
    text_size: (f32, f32),
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            bitmaps: Bitmaps::new(),
            text_size: (DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT),
        }
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_page(page: DecodedPage) -> Self {
        Self {
            items: page.items,
            bitmaps: page.bitmaps,
            ..Self::default()
        }
    }

    /// Size given to text boxes created by [`Canvas::create_text_item`].
    pub fn set_default_text_size(&mut self, width: f32, height: f32) {
        self.text_size = (width, height);
    }

    pub fn create_text_item(&mut self, pos: (f32, f32)) -> TextItem {
        let (w, h) = self.text_size;
        let item = TextItem::new("", pos.0, pos.1, w, h);
        self.items.push(Item::Text(item.clone()));
        item
    }

    /// Place a new image. The bitmap stays in memory until the page is saved.
    pub fn create_image_item(&mut self, pos: (f32, f32), bitmap: RgbaImage) -> ImageItem {
        let item = ImageItem::with_new_id(pos.0, pos.1, bitmap.width(), bitmap.height());
        self.bitmaps.insert(item.image_id.clone(), bitmap);
        self.items.push(Item::Image(item.clone()));
        item
    }

    pub fn list_items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }

    pub fn bitmaps(&self) -> &Bitmaps {
        &self.bitmaps
    }

    pub fn bitmap(&self, image_id: &str) -> Option<&RgbaImage> {
        self.bitmaps.get(image_id)
    }

    /// Index of the topmost item under `p`.
    pub fn item_at(&self, p: (f32, f32)) -> Option<usize> {
        self.items.iter().rposition(|item| item.contains(p))
    }

    pub fn move_item(&mut self, index: usize, x: f32, y: f32) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.move_to(x, y);
                true
            }
            None => false,
        }
    }

    pub fn translate_item(&mut self, index: usize, dx: f32, dy: f32) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.translate(dx, dy);
                true
            }
            None => false,
        }
    }

    /// Resize a text box. Returns false if `index` is not a text box.
    pub fn resize_text(&mut self, index: usize, width: f32, height: f32) -> bool {
        match self.items.get_mut(index) {
            Some(Item::Text(t)) => {
                t.resize(width, height);
                true
            }
            _ => false,
        }
    }

    pub fn set_text_content(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.items.get_mut(index) {
            Some(Item::Text(t)) => {
                t.content = content.into();
                true
            }
            _ => false,
        }
    }

    /// Rescale an image. Returns false if `index` is not an image.
    pub fn set_image_scale(&mut self, index: usize, scale: f32) -> bool {
        match self.items.get_mut(index) {
            Some(Item::Image(i)) => {
                i.set_scale(scale);
                true
            }
            _ => false,
        }
    }

    /// Move an item to the top of the z-order. Returns its new index.
    pub fn bring_to_front(&mut self, index: usize) -> Option<usize> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.items.push(item);
        Some(self.items.len() - 1)
    }

    pub fn remove_item(&mut self, index: usize) -> Option<Item> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        if let Item::Image(img) = &item {
            let still_used = self
                .items
                .iter()
                .any(|i| matches!(i, Item::Image(o) if o.image_id == img.image_id));
            if !still_used {
                self.bitmaps.remove(&img.image_id);
            }
        }
        Some(item)
    }
}
