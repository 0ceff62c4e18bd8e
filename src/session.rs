//! The open notebook and page.
//!
//! The session flushes the open page whenever it is left: on switching
//! pages, opening another notebook, or closing. There is no dirty tracking.

use crate::canvas::Canvas;
use crate::codec::LoadWarning;
use crate::error::{RepositoryError, SessionError};
use crate::model::{DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH};
use crate::repository::{PageMeta, Repository, DEFAULT_PAGE_ID};

#[derive(Debug)]
struct OpenPage {
    notebook: String,
    page_id: String,
    canvas: Canvas,
}

#[derive(Debug)]
pub struct CanvasSession {
    repo: Repository,
    open: Option<OpenPage>,
    last_warnings: Vec<LoadWarning>,
    text_size: (f32, f32),
}

impl CanvasSession {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            open: None,
            last_warnings: Vec::new(),
            text_size: (DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT),
        }
    }

    pub fn with_default_text_size(mut self, width: f32, height: f32) -> Self {
        self.text_size = (width, height);
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn notebook(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.notebook.as_str())
    }

    pub fn page_id(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.page_id.as_str())
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.open.as_ref().map(|o| &o.canvas)
    }

    pub fn canvas_mut(&mut self) -> Option<&mut Canvas> {
        self.open.as_mut().map(|o| &mut o.canvas)
    }

    /// Items dropped while loading the current page.
    pub fn last_warnings(&self) -> &[LoadWarning] {
        &self.last_warnings
    }

    /// Open `name` on its default page, saving whatever was open before.
    pub fn open_notebook(&mut self, name: &str) -> Result<(), SessionError> {
        self.repo.notebook(name)?;
        self.save()?;
        self.load(name, DEFAULT_PAGE_ID)?;
        tracing::info!(notebook = %name, "opened notebook");
        Ok(())
    }

    /// Save the current page and load `page_id` of the same notebook. If the
    /// target does not exist nothing is saved and the current page stays open.
    pub fn switch_page(&mut self, page_id: &str) -> Result<(), SessionError> {
        let notebook = self
            .notebook()
            .ok_or(SessionError::NoPageOpen)?
            .to_string();
        if !self.repo.page_exists(&notebook, page_id)? {
            return Err(RepositoryError::PageNotFound {
                notebook,
                page: page_id.to_string(),
            }
            .into());
        }
        self.save()?;
        self.load(&notebook, page_id)
    }

    /// Add a page to the open notebook without switching to it.
    pub fn create_page(&mut self, display_name: &str) -> Result<PageMeta, SessionError> {
        let notebook = self.notebook().ok_or(SessionError::NoPageOpen)?;
        Ok(self.repo.create_page(notebook, display_name)?)
    }

    /// Write the open page to disk. Does nothing when no page is open.
    pub fn save(&self) -> Result<(), SessionError> {
        if let Some(open) = &self.open {
            self.repo.save_page(
                &open.notebook,
                &open.page_id,
                open.canvas.list_items(),
                open.canvas.bitmaps(),
            )?;
        }
        Ok(())
    }

    /// Save and release the open page.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.save()?;
        if let Some(open) = self.open.take() {
            tracing::info!(notebook = %open.notebook, page = %open.page_id, "closed page");
        }
        self.last_warnings.clear();
        Ok(())
    }

    fn load(&mut self, notebook: &str, page_id: &str) -> Result<(), SessionError> {
        let mut page = self.repo.load_page(notebook, page_id)?;
        self.last_warnings = std::mem::take(&mut page.warnings);
        let mut canvas = Canvas::from_page(page);
        canvas.set_default_text_size(self.text_size.0, self.text_size.1);
        self.open = Some(OpenPage {
            notebook: notebook.to_string(),
            page_id: page_id.to_string(),
            canvas,
        });
        Ok(())
    }
}
