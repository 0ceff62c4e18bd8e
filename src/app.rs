use std::collections::HashMap;

use canvas_notes::model::{Item, Placeable};
use canvas_notes::{CanvasSession, PageMeta, DEFAULT_PAGE_ID};
use eframe::egui;
use image::RgbaImage;

/// Screen-space size of the drag strip on top of text boxes.
const TITLE_BAR_HEIGHT: f32 = 10.0;
/// Screen-space size of the bottom-right resize handle.
const HANDLE_SIZE: f32 = 10.0;
const BASE_FONT_SIZE: f32 = 14.0;

// ── Interaction State ───────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum DragState {
    None,
    Moving {
        index: usize,
    },
    Resizing {
        index: usize,
        start: (f32, f32),
        offset: egui::Vec2,
    },
    Scaling {
        index: usize,
        start_scale: f32,
        start_width: f32,
        offset: egui::Vec2,
    },
}

enum Action {
    OpenNotebook(String),
    CreateNotebook(String),
    SwitchPage(String),
    CreatePage(String),
    RenamePage(String, String),
    DeletePage(String),
    InsertImage,
    Save,
}

fn handle_rect(item_rect: egui::Rect) -> egui::Rect {
    egui::Rect::from_min_max(item_rect.max - egui::vec2(HANDLE_SIZE, HANDLE_SIZE), item_rect.max)
}

fn decode_dropped(file: &egui::DroppedFile) -> Option<image::ImageResult<RgbaImage>> {
    if let Some(bytes) = &file.bytes {
        Some(image::load_from_memory(&bytes[..]).map(|img| img.to_rgba8()))
    } else {
        file.path
            .as_ref()
            .map(|path| image::open(path).map(|img| img.to_rgba8()))
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct NotesApp {
    session: CanvasSession,
    notebooks: Vec<String>,
    pages: Vec<PageMeta>,
    textures: HashMap<String, egui::TextureHandle>,

    drag: DragState,
    selected: Option<usize>,
    editing: Option<usize>,
    focus_editor: bool,

    new_notebook_name: String,
    new_page_name: String,
    rename_buf: String,
    status: String,

    // pan & zoom
    pan: egui::Vec2,
    zoom: f32,
    panning: bool,
    view_rect: egui::Rect,
}

impl NotesApp {
    pub fn new(session: CanvasSession) -> Self {
        let mut app = Self {
            session,
            notebooks: Vec::new(),
            pages: Vec::new(),
            textures: HashMap::new(),
            drag: DragState::None,
            selected: None,
            editing: None,
            focus_editor: false,
            new_notebook_name: String::new(),
            new_page_name: String::new(),
            rename_buf: String::new(),
            status: String::new(),
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            panning: false,
            view_rect: egui::Rect::NOTHING,
        };
        app.refresh_lists();
        app.page_changed();
        app
    }

    fn refresh_lists(&mut self) {
        let repo = self.session.repository();
        let mut notebooks: Vec<String> = repo.list_notebooks().collect();
        notebooks.sort_by_key(|n| n.to_lowercase());
        self.notebooks = notebooks;
        self.pages = match self.session.notebook() {
            Some(nb) => repo.list_pages(nb).unwrap_or_default(),
            None => Vec::new(),
        };
    }

    /// Reset per-page view state after a different page was loaded.
    fn page_changed(&mut self) {
        self.textures.clear();
        self.drag = DragState::None;
        self.selected = None;
        self.editing = None;
        let dropped = self.session.last_warnings();
        self.status = if dropped.is_empty() {
            String::new()
        } else {
            let details: Vec<String> = dropped.iter().map(|w| w.to_string()).collect();
            format!("{} item(s) could not be loaded: {}", dropped.len(), details.join("; "))
        };
    }

    fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "operation failed");
                self.status = e.to_string();
                None
            }
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::OpenNotebook(name) => {
                let result = self.session.open_notebook(&name);
                if self.report(result).is_some() {
                    self.refresh_lists();
                    self.page_changed();
                }
            }
            Action::CreateNotebook(name) => {
                let created = self.session.repository().create_notebook(name.trim());
                if self.report(created).is_some() {
                    self.new_notebook_name.clear();
                    self.apply(Action::OpenNotebook(name.trim().to_string()));
                }
            }
            Action::SwitchPage(page_id) => {
                let result = self.session.switch_page(&page_id);
                if self.report(result).is_some() {
                    self.page_changed();
                }
            }
            Action::CreatePage(display_name) => {
                let created = self.session.create_page(display_name.trim());
                if let Some(page) = self.report(created) {
                    self.new_page_name.clear();
                    self.refresh_lists();
                    self.apply(Action::SwitchPage(page.id));
                }
            }
            Action::RenamePage(page_id, display_name) => {
                let Some(notebook) = self.session.notebook().map(str::to_string) else {
                    return;
                };
                let result = self
                    .session
                    .repository()
                    .rename_page(&notebook, &page_id, display_name.trim());
                self.report(result);
                self.refresh_lists();
            }
            Action::DeletePage(page_id) => {
                let Some(notebook) = self.session.notebook().map(str::to_string) else {
                    return;
                };
                if self.session.page_id() == Some(page_id.as_str()) {
                    self.apply(Action::SwitchPage(DEFAULT_PAGE_ID.to_string()));
                }
                let result = self.session.repository().delete_page(&notebook, &page_id);
                self.report(result);
                self.refresh_lists();
            }
            Action::InsertImage => {
                let picked = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
                    .pick_file();
                if let Some(path) = picked {
                    let decoded = image::open(&path).map(|img| img.to_rgba8());
                    if let Some(bitmap) = self.report(decoded) {
                        let at = self.to_canvas(self.view_rect, self.view_rect.center());
                        self.insert_image(bitmap, at);
                    }
                }
            }
            Action::Save => {
                let result = self.session.save();
                if self.report(result).is_some() {
                    self.status = "Saved".into();
                }
            }
        }
    }

    fn insert_image(&mut self, bitmap: RgbaImage, at: (f32, f32)) {
        let Some(canvas) = self.session.canvas_mut() else {
            self.status = "Open a notebook before adding images".into();
            return;
        };
        canvas.create_image_item(at, bitmap);
        self.selected = Some(canvas.len() - 1);
    }

    /// Convert canvas coords to screen-space
    fn to_screen(&self, view: egui::Rect, p: (f32, f32)) -> egui::Pos2 {
        view.center() + self.pan + egui::vec2(p.0, p.1) * self.zoom
    }

    /// Convert screen-space coords to canvas coords
    fn to_canvas(&self, view: egui::Rect, screen_pos: egui::Pos2) -> (f32, f32) {
        let rel = (screen_pos - view.center() - self.pan) / self.zoom;
        (rel.x, rel.y)
    }

    fn item_rect(&self, view: egui::Rect, item: &Item) -> egui::Rect {
        let b = item.bounds();
        egui::Rect::from_min_max(self.to_screen(view, b.min), self.to_screen(view, b.max))
    }

    fn ensure_textures(&mut self, ctx: &egui::Context) {
        let Some(canvas) = self.session.canvas() else {
            return;
        };
        for item in canvas.list_items() {
            let Item::Image(img) = item else { continue };
            if self.textures.contains_key(&img.image_id) {
                continue;
            }
            if let Some(bitmap) = canvas.bitmap(&img.image_id) {
                let size = [bitmap.width() as usize, bitmap.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, bitmap.as_raw());
                let texture = ctx.load_texture(
                    format!("image-{}", img.image_id),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                self.textures.insert(img.image_id.clone(), texture);
            }
        }
    }

    fn draw_items(&self, painter: &egui::Painter, view: egui::Rect, hovered: Option<usize>) {
        let Some(canvas) = self.session.canvas() else {
            return;
        };
        for (i, item) in canvas.list_items().iter().enumerate() {
            let rect = self.item_rect(view, item);
            let is_selected = self.selected == Some(i);
            match item {
                Item::Text(text) => {
                    painter.rect_filled(rect, 0.0, egui::Color32::WHITE);
                    painter.rect_stroke(
                        rect,
                        0.0,
                        egui::Stroke::new(1.0, egui::Color32::from_gray(200)),
                        egui::StrokeKind::Inside,
                    );
                    if hovered == Some(i) || is_selected || self.editing == Some(i) {
                        let bar = egui::Rect::from_min_size(
                            rect.min,
                            egui::vec2(rect.width(), TITLE_BAR_HEIGHT),
                        );
                        painter.rect_filled(bar, 0.0, egui::Color32::from_gray(220));
                    }
                    if self.editing != Some(i) {
                        let galley = painter.layout(
                            text.content.clone(),
                            egui::FontId::proportional(BASE_FONT_SIZE * self.zoom),
                            egui::Color32::BLACK,
                            (rect.width() - 8.0).max(1.0),
                        );
                        painter.with_clip_rect(rect).galley(
                            rect.min + egui::vec2(4.0, TITLE_BAR_HEIGHT + 2.0),
                            galley,
                            egui::Color32::BLACK,
                        );
                    }
                    painter.rect_filled(handle_rect(rect), 0.0, egui::Color32::from_rgb(100, 100, 255));
                }
                Item::Image(img) => {
                    match self.textures.get(&img.image_id) {
                        Some(tex) => painter.image(
                            tex.id(),
                            rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        ),
                        None => painter.rect_filled(rect, 0.0, egui::Color32::from_gray(120)),
                    };
                    if is_selected || hovered == Some(i) {
                        painter.rect_filled(
                            handle_rect(rect),
                            0.0,
                            egui::Color32::from_rgb(100, 100, 255),
                        );
                    }
                }
            }
            if is_selected {
                self.draw_selection_indicator(painter, rect);
            }
        }
    }

    fn draw_selection_indicator(&self, painter: &egui::Painter, rect: egui::Rect) {
        let expanded = rect.expand(4.0);
        painter.rect_stroke(
            expanded,
            2.0,
            egui::Stroke::new(1.5, egui::Color32::from_rgb(0, 120, 255)),
            egui::StrokeKind::Middle,
        );
    }

    fn begin_drag(&mut self, view: egui::Rect, pos: egui::Pos2) -> DragState {
        let Some(canvas) = self.session.canvas() else {
            return DragState::None;
        };
        let Some(index) = canvas.item_at(self.to_canvas(view, pos)) else {
            self.selected = None;
            return DragState::None;
        };
        let rect = self.item_rect(view, &canvas.list_items()[index]);
        let on_handle = handle_rect(rect).contains(pos);
        let state = match &canvas.list_items()[index] {
            Item::Text(t) if on_handle => DragState::Resizing {
                index,
                start: (t.width, t.height),
                offset: egui::Vec2::ZERO,
            },
            Item::Image(img) if on_handle => DragState::Scaling {
                index,
                start_scale: img.scale,
                start_width: rect.width().max(1.0),
                offset: egui::Vec2::ZERO,
            },
            _ => DragState::Moving { index },
        };
        self.selected = Some(index);
        state
    }

    fn continue_drag(&mut self, delta: egui::Vec2) {
        let zoom = self.zoom;
        let Some(canvas) = self.session.canvas_mut() else {
            return;
        };
        match &mut self.drag {
            DragState::Moving { index } => {
                canvas.translate_item(*index, delta.x / zoom, delta.y / zoom);
            }
            DragState::Resizing {
                index,
                start,
                offset,
            } => {
                *offset += delta;
                canvas.resize_text(*index, start.0 + offset.x / zoom, start.1 + offset.y / zoom);
            }
            DragState::Scaling {
                index,
                start_scale,
                start_width,
                offset,
            } => {
                *offset += delta;
                let factor = (*start_width + offset.x) / *start_width;
                canvas.set_image_scale(*index, *start_scale * factor);
            }
            DragState::None => {}
        }
    }

    /// Double-click: edit the text box under the pointer, or create one on
    /// empty canvas.
    fn edit_at(&mut self, p: (f32, f32)) {
        let Some(canvas) = self.session.canvas_mut() else {
            return;
        };
        let index = match canvas.item_at(p) {
            Some(i) if canvas.item(i).and_then(Item::as_text).is_some() => i,
            Some(_) => return,
            None => {
                canvas.create_text_item(p);
                canvas.len() - 1
            }
        };
        self.selected = Some(index);
        self.editing = Some(index);
        self.focus_editor = true;
    }

    fn show_text_editor(&mut self, ctx: &egui::Context, view: egui::Rect) {
        let Some(index) = self.editing else {
            return;
        };
        let rect = self
            .session
            .canvas()
            .and_then(|c| c.item(index))
            .filter(|item| item.as_text().is_some())
            .map(|item| self.item_rect(view, item));
        let Some(rect) = rect else {
            self.editing = None;
            return;
        };
        let body = egui::Rect::from_min_max(
            rect.min + egui::vec2(0.0, TITLE_BAR_HEIGHT),
            rect.max - egui::vec2(0.0, HANDLE_SIZE),
        );

        let mut finished = false;
        let focus = std::mem::take(&mut self.focus_editor);
        egui::Area::new(egui::Id::new(("text_edit", index)))
            .fixed_pos(body.min)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let Some(Item::Text(text)) =
                    self.session.canvas_mut().and_then(|c| c.item_mut(index))
                else {
                    return;
                };
                let te = ui.add_sized(
                    body.size(),
                    egui::TextEdit::multiline(&mut text.content).hint_text("Start typing..."),
                );
                if focus {
                    te.request_focus();
                }
                if te.lost_focus() {
                    finished = true;
                }
            });
        if finished {
            self.editing = None;
        }
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) -> Option<Action> {
        let mut action = None;
        let current_notebook = self.session.notebook().map(str::to_string);
        let current_page = self.session.page_id().map(str::to_string);

        ui.heading("Notebooks");
        for name in &self.notebooks {
            if ui
                .selectable_label(current_notebook.as_deref() == Some(name.as_str()), name)
                .clicked()
            {
                action = Some(Action::OpenNotebook(name.clone()));
            }
        }
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.new_notebook_name).desired_width(110.0));
            if ui.button("New").clicked() && !self.new_notebook_name.trim().is_empty() {
                action = Some(Action::CreateNotebook(self.new_notebook_name.clone()));
            }
        });

        if current_notebook.is_none() {
            return action;
        }
        ui.separator();
        ui.heading("Pages");
        for page in &self.pages {
            let label = ui.selectable_label(current_page.as_deref() == Some(page.id.as_str()), &page.name);
            if label.clicked() {
                action = Some(Action::SwitchPage(page.id.clone()));
            }
            label.context_menu(|ui| {
                ui.add(egui::TextEdit::singleline(&mut self.rename_buf).desired_width(120.0));
                if ui.button("Rename").clicked() && !self.rename_buf.trim().is_empty() {
                    action = Some(Action::RenamePage(page.id.clone(), self.rename_buf.clone()));
                    self.rename_buf.clear();
                    ui.close_menu();
                }
                if ui.button("Delete page").clicked() {
                    action = Some(Action::DeletePage(page.id.clone()));
                    ui.close_menu();
                }
            });
        }
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.new_page_name).desired_width(110.0));
            if ui.button("Add page").clicked() && !self.new_page_name.trim().is_empty() {
                action = Some(Action::CreatePage(self.new_page_name.clone()));
            }
        });
        action
    }
}

impl NotesApp {
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        let result = self.session.close();
        if self.report(result).is_none() {
            // The page is still open; keep the window so the error is seen.
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
    }

    /// Delete key on the canvas. Ignored while any text field has focus.
    fn delete_selected(&mut self, ctx: &egui::Context) {
        if self.editing.is_some() || ctx.wants_keyboard_input() {
            return;
        }
        if let (Some(index), Some(canvas)) = (self.selected, self.session.canvas_mut()) {
            canvas.remove_item(index);
            self.selected = None;
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for NotesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_textures(ctx);

        self.handle_close_request(ctx);

        let mut actions = Vec::new();

        // Keyboard shortcuts
        let (save, delete) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            )
        });
        if save {
            actions.push(Action::Save);
        }
        if delete {
            self.delete_selected(ctx);
        }

        // Dropped image files
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            let at = ctx
                .input(|i| i.pointer.latest_pos())
                .unwrap_or(self.view_rect.center());
            let at = self.to_canvas(self.view_rect, at);
            for file in &dropped {
                if let Some(decoded) = decode_dropped(file) {
                    if let Some(bitmap) = self.report(decoded) {
                        self.insert_image(bitmap, at);
                    }
                }
            }
        }

        egui::SidePanel::left("sidebar")
            .default_width(200.0)
            .show(ctx, |ui| {
                if let Some(action) = self.sidebar(ui) {
                    actions.push(action);
                }
            });

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let page_open = self.session.canvas().is_some();
                if ui.add_enabled(page_open, egui::Button::new("Insert image…")).clicked() {
                    actions.push(Action::InsertImage);
                }
                if ui.add_enabled(page_open, egui::Button::new("Save")).clicked() {
                    actions.push(Action::Save);
                }
                let selected_image = self.selected.and_then(|i| {
                    self.session
                        .canvas()
                        .and_then(|c| c.item(i))
                        .and_then(Item::as_image)
                        .map(|img| (i, img.scale))
                });
                if let Some((index, mut scale)) = selected_image {
                    ui.separator();
                    ui.label("Scale:");
                    if ui.add(egui::Slider::new(&mut scale, 0.1..=5.0)).changed() {
                        if let Some(canvas) = self.session.canvas_mut() {
                            canvas.set_image_scale(index, scale);
                        }
                    }
                }
                ui.separator();
                ui.label(format!("Zoom: {:.0}%", self.zoom * 100.0));
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match (self.session.notebook(), self.session.page_id()) {
                    (Some(nb), Some(page)) => {
                        let items = self.session.canvas().map_or(0, |c| c.len());
                        ui.label(format!("{nb} / {page} — {items} item(s)"));
                    }
                    _ => {
                        ui.label("No notebook open");
                    }
                }
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        // Canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let view = response.rect;
            self.view_rect = view;

            painter.rect_filled(view, 0.0, egui::Color32::from_gray(245));

            let hovered = response.hover_pos().and_then(|pos| {
                let p = self.to_canvas(view, pos);
                self.session.canvas().and_then(|c| c.item_at(p))
            });
            self.draw_items(&painter, view, hovered);
            self.show_text_editor(ctx, view);

            // Handle pan (middle mouse button)
            let middle_down = ctx.input(|i| i.pointer.middle_down());
            if middle_down {
                let delta = ctx.input(|i| i.pointer.delta());
                self.pan += delta;
                self.panning = true;
            } else {
                self.panning = false;
            }

            // Handle zoom (scroll wheel)
            let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 && response.hovered() {
                let zoom_factor = 1.0 + scroll_delta * 0.002;
                let new_zoom = (self.zoom * zoom_factor).clamp(0.1, 10.0);
                if let Some(cursor) = response.hover_pos() {
                    let cursor_rel = cursor - view.center() - self.pan;
                    self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
                }
                self.zoom = new_zoom;
            }

            if self.panning {
                return;
            }

            if response.double_clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let p = self.to_canvas(view, pos);
                    self.edit_at(p);
                }
            } else if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let p = self.to_canvas(view, pos);
                    let hit = self.session.canvas().and_then(|c| c.item_at(p));
                    self.selected = hit;
                    if self.editing != hit {
                        self.editing = None;
                    }
                }
            }

            if response.drag_started_by(egui::PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.drag = self.begin_drag(view, pos);
                }
            }
            if response.dragged_by(egui::PointerButton::Primary) {
                self.continue_drag(response.drag_delta());
            }
            if response.drag_stopped_by(egui::PointerButton::Primary) {
                self.drag = DragState::None;
            }
        });

        for action in actions {
            self.apply(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_notes::Repository;
    use tempfile::TempDir;

    fn app_with_text_box() -> (TempDir, NotesApp) {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path());
        repo.create_notebook("Foo").unwrap();
        let mut session = CanvasSession::new(repo);
        session.open_notebook("Foo").unwrap();
        session.canvas_mut().unwrap().create_text_item((0.0, 0.0));
        let mut app = NotesApp::new(session);
        app.selected = Some(0);
        (tmp, app)
    }

    fn close_requested_input() -> egui::RawInput {
        let mut input = egui::RawInput::default();
        input
            .viewports
            .entry(egui::ViewportId::ROOT)
            .or_default()
            .events
            .push(egui::ViewportEvent::Close);
        input
    }

    fn root_commands(output: &egui::FullOutput) -> Vec<egui::ViewportCommand> {
        output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map(|v| v.commands.clone())
            .unwrap_or_default()
    }

    #[test]
    fn delete_key_removes_selection_on_canvas() {
        let (_tmp, mut app) = app_with_text_box();
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| app.delete_selected(ctx));
        assert!(app.session.canvas().unwrap().is_empty());
        assert_eq!(app.selected, None);
    }

    #[test]
    fn delete_key_in_focused_field_keeps_selection() {
        let (_tmp, mut app) = app_with_text_box();
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            ctx.memory_mut(|m| m.request_focus(egui::Id::new("new_page_name")));
            app.delete_selected(ctx);
        });
        assert_eq!(app.session.canvas().unwrap().len(), 1);
        assert_eq!(app.selected, Some(0));
    }

    #[test]
    fn close_saves_and_lets_window_go() {
        let (tmp, mut app) = app_with_text_box();
        let ctx = egui::Context::default();
        let output = ctx.run(close_requested_input(), |ctx| app.handle_close_request(ctx));

        assert!(!root_commands(&output).contains(&egui::ViewportCommand::CancelClose));
        assert!(app.session.canvas().is_none());
        let page = Repository::new(tmp.path()).load_page("Foo", DEFAULT_PAGE_ID).unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn failed_close_keeps_window_open() {
        let (tmp, mut app) = app_with_text_box();
        std::fs::remove_dir_all(tmp.path().join("Foo")).unwrap();
        let ctx = egui::Context::default();
        let output = ctx.run(close_requested_input(), |ctx| app.handle_close_request(ctx));

        assert!(root_commands(&output).contains(&egui::ViewportCommand::CancelClose));
        assert!(app.session.canvas().is_some());
        assert!(!app.status.is_empty());
    }
}
