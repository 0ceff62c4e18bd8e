//! On-disk notebooks and pages.
//!
//! ```text
//! <root>/<notebook>/notebook.json
//! <root>/<notebook>/pages/<page_id>.json
//! <root>/<notebook>/images/<image_id>.png
//! ```
//!
//! `notebook.json` is the only place page order and display names live.
//! Page files are addressed by id alone.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::{is_path_segment, AssetStore};
use crate::codec::{self, Bitmaps, DecodedPage, PageFile};
use crate::error::{RepositoryError, Result};
use crate::model::Item;

pub const DEFAULT_PAGE_ID: &str = "page_0";

const METADATA_FILE: &str = "notebook.json";
const PAGES_DIR: &str = "pages";
const IMAGES_DIR: &str = "images";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotebookMeta {
    pub name: String,
    pub pages: Vec<PageMeta>,
    /// Number used for the next page id. Older files without it fall back to
    /// one past the highest numbered page.
    #[serde(default)]
    pub next_page: u64,
}

impl NotebookMeta {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pages: vec![PageMeta {
                id: DEFAULT_PAGE_ID.to_string(),
                name: name.to_string(),
            }],
            next_page: 1,
        }
    }

    fn allocate_page_id(&mut self) -> String {
        let highest = self
            .pages
            .iter()
            .filter_map(|p| p.id.strip_prefix("page_")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let mut n = self.next_page.max(highest + 1);
        while self.page(&format!("page_{n}")).is_some() {
            n += 1;
        }
        self.next_page = n + 1;
        format!("page_{n}")
    }

    pub fn page(&self, page_id: &str) -> Option<&PageMeta> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// Pages shown to the user: everything except the default page.
    pub fn visible_pages(&self) -> impl Iterator<Item = &PageMeta> {
        self.pages.iter().filter(|p| p.id != DEFAULT_PAGE_ID)
    }
}

/// Write `bytes` to `path` through a sibling temp file and a rename, so a
/// failed write leaves the previous content in place.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp_path, path)
}

#[derive(Clone, Debug)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn notebook_dir(&self, name: &str) -> Result<PathBuf> {
        if !is_path_segment(name) {
            return Err(RepositoryError::InvalidNotebookName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn page_path(&self, notebook: &str, page_id: &str) -> Result<PathBuf> {
        Ok(self
            .notebook_dir(notebook)?
            .join(PAGES_DIR)
            .join(format!("{page_id}.json")))
    }

    pub fn assets(&self, notebook: &str) -> Result<AssetStore> {
        Ok(AssetStore::new(self.notebook_dir(notebook)?.join(IMAGES_DIR)))
    }

    // ── Notebooks ───────────────────────────────────────────────────────────

    pub fn create_notebook(&self, name: &str) -> Result<NotebookMeta> {
        let dir = self.notebook_dir(name)?;
        if dir.exists() {
            return Err(RepositoryError::DuplicateNotebook(name.to_string()));
        }
        fs::create_dir_all(dir.join(PAGES_DIR))?;
        fs::create_dir_all(dir.join(IMAGES_DIR))?;

        let meta = NotebookMeta::new(name);
        self.write_metadata(name, &meta)?;
        self.write_page_file(name, DEFAULT_PAGE_ID, &PageFile { items: Vec::new() })?;

        tracing::info!(notebook = %name, "created notebook");
        Ok(meta)
    }

    /// Names of the notebooks under the root. Lazy; call again to restart.
    /// Directories without a readable `notebook.json` are skipped.
    pub fn list_notebooks(&self) -> impl Iterator<Item = String> + '_ {
        fs::read_dir(&self.root)
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(move |entry| {
                let name = entry.file_name().to_str()?.to_string();
                if !entry.path().is_dir() {
                    return None;
                }
                self.notebook(&name).ok().map(|_| name)
            })
    }

    pub fn notebook(&self, name: &str) -> Result<NotebookMeta> {
        let path = self.notebook_dir(name)?.join(METADATA_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotebookNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let mut meta: NotebookMeta = serde_json::from_str(&contents)
            .map_err(|source| RepositoryError::CorruptMetadata { path, source })?;
        // The directory is the notebook's identity; a stale stored name follows it.
        if meta.name != name {
            tracing::debug!(notebook = %name, stored = %meta.name, "notebook name differs from directory");
            meta.name = name.to_string();
        }
        Ok(meta)
    }

    fn write_metadata(&self, notebook: &str, meta: &NotebookMeta) -> Result<()> {
        let path = self.notebook_dir(notebook)?.join(METADATA_FILE);
        let json = serde_json::to_string_pretty(meta)?;
        write_atomic(&path, json.as_bytes())?;
        Ok(())
    }

    // ── Pages ───────────────────────────────────────────────────────────────

    /// User-visible pages in notebook order. The default page is not listed.
    pub fn list_pages(&self, notebook: &str) -> Result<Vec<PageMeta>> {
        Ok(self.notebook(notebook)?.visible_pages().cloned().collect())
    }

    pub fn create_page(&self, notebook: &str, display_name: &str) -> Result<PageMeta> {
        let mut meta = self.notebook(notebook)?;
        let page = PageMeta {
            id: meta.allocate_page_id(),
            name: display_name.to_string(),
        };
        meta.pages.push(page.clone());
        self.write_page_file(notebook, &page.id, &PageFile { items: Vec::new() })?;
        self.write_metadata(notebook, &meta)?;

        tracing::info!(notebook = %notebook, page = %page.id, "created page");
        Ok(page)
    }

    pub fn rename_page(&self, notebook: &str, page_id: &str, display_name: &str) -> Result<()> {
        let mut meta = self.notebook(notebook)?;
        let page = meta
            .pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| page_not_found(notebook, page_id))?;
        page.name = display_name.to_string();
        self.write_metadata(notebook, &meta)
    }

    /// Remove a page and its item file. Image assets stay: they are shared by
    /// the whole notebook.
    pub fn delete_page(&self, notebook: &str, page_id: &str) -> Result<()> {
        if page_id == DEFAULT_PAGE_ID {
            return Err(RepositoryError::DefaultPageProtected);
        }
        let mut meta = self.notebook(notebook)?;
        let before = meta.pages.len();
        meta.pages.retain(|p| p.id != page_id);
        if meta.pages.len() == before {
            return Err(page_not_found(notebook, page_id));
        }
        self.write_metadata(notebook, &meta)?;

        match fs::remove_file(self.page_path(notebook, page_id)?) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(notebook = %notebook, page = %page_id, "deleted page");
        Ok(())
    }

    fn require_page(&self, notebook: &str, page_id: &str) -> Result<()> {
        match self.notebook(notebook)?.page(page_id) {
            Some(_) => Ok(()),
            None => Err(page_not_found(notebook, page_id)),
        }
    }

    pub fn page_exists(&self, notebook: &str, page_id: &str) -> Result<bool> {
        Ok(self.notebook(notebook)?.page(page_id).is_some())
    }

    /// Load a page's items. A page listed in the metadata but without a file
    /// is empty.
    pub fn load_page(&self, notebook: &str, page_id: &str) -> Result<DecodedPage> {
        self.require_page(notebook, page_id)?;
        let path = self.page_path(notebook, page_id)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(notebook = %notebook, page = %page_id, "no page file, starting empty");
                return Ok(DecodedPage::default());
            }
            Err(e) => return Err(e.into()),
        };

        let store = self.assets(notebook)?;
        let page = codec::decode_page(&json, &store).map_err(|e| RepositoryError::CorruptPage {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            notebook = %notebook,
            page = %page_id,
            items = page.items.len(),
            dropped = page.warnings.len(),
            "loaded page"
        );
        Ok(page)
    }

    /// Write every item of a page. Either the whole page is replaced or the
    /// previous file is left as it was.
    pub fn save_page(
        &self,
        notebook: &str,
        page_id: &str,
        items: &[Item],
        bitmaps: &Bitmaps,
    ) -> Result<()> {
        self.require_page(notebook, page_id)?;
        let store = self.assets(notebook)?;
        let page = codec::encode_page(items, bitmaps, &store)?;
        self.write_page_file(notebook, page_id, &page)?;

        tracing::debug!(
            notebook = %notebook,
            page = %page_id,
            items = items.len(),
            "saved page"
        );
        Ok(())
    }

    fn write_page_file(&self, notebook: &str, page_id: &str, page: &PageFile) -> Result<()> {
        let path = self.page_path(notebook, page_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = codec::page_to_json(page)?;
        write_atomic(&path, json.as_bytes())?;
        Ok(())
    }
}

fn page_not_found(notebook: &str, page_id: &str) -> RepositoryError {
    RepositoryError::PageNotFound {
        notebook: notebook.to_string(),
        page: page_id.to_string(),
    }
}
