use std::collections::HashMap;
use std::fs;

use canvas_notes::codec::Bitmaps;
use canvas_notes::model::{ImageItem, Item, TextItem};
use canvas_notes::{AssetError, LoadWarning, Repository, RepositoryError, DEFAULT_PAGE_ID};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn repo() -> (TempDir, Repository) {
    let tmp = TempDir::new().unwrap();
    let repo = Repository::new(tmp.path());
    (tmp, repo)
}

#[test]
fn create_notebook_lays_out_directories() {
    let (tmp, repo) = repo();
    let meta = repo.create_notebook("Foo").unwrap();

    let dir = tmp.path().join("Foo");
    assert!(dir.join("notebook.json").is_file());
    assert!(dir.join("pages").join("page_0.json").is_file());
    assert!(dir.join("images").is_dir());

    assert_eq!(meta.pages.len(), 1);
    assert_eq!(meta.pages[0].id, DEFAULT_PAGE_ID);
    assert_eq!(meta.pages[0].name, "Foo");

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("notebook.json")).unwrap()).unwrap();
    assert_eq!(on_disk["name"], "Foo");
    assert_eq!(on_disk["pages"][0]["id"], "page_0");
}

#[test]
fn duplicate_notebook_is_rejected() {
    let (_tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();
    assert!(matches!(
        repo.create_notebook("Foo"),
        Err(RepositoryError::DuplicateNotebook(name)) if name == "Foo"
    ));
}

#[test]
fn default_page_is_hidden_and_empty() {
    let (_tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();

    assert!(repo.list_pages("Foo").unwrap().is_empty());
    let page = repo.load_page("Foo", DEFAULT_PAGE_ID).unwrap();
    assert!(page.items.is_empty());
    assert!(page.warnings.is_empty());
}

#[test]
fn page_ids_are_sequential_and_never_reused() {
    let (_tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();

    let ids: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|name| repo.create_page("Foo", name).unwrap().id)
        .collect();
    assert_eq!(ids, vec!["page_1", "page_2", "page_3"]);

    repo.delete_page("Foo", "page_3").unwrap();
    assert_eq!(repo.create_page("Foo", "d").unwrap().id, "page_4");

    let names: Vec<String> = repo
        .list_pages("Foo")
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["a", "b", "d"]);
}

#[test]
fn page_operations_on_missing_notebook_or_page() {
    let (_tmp, repo) = repo();
    assert!(matches!(
        repo.create_page("Nope", "x"),
        Err(RepositoryError::NotebookNotFound(_))
    ));

    repo.create_notebook("Foo").unwrap();
    assert!(matches!(
        repo.load_page("Foo", "page_9"),
        Err(RepositoryError::PageNotFound { .. })
    ));
    assert!(matches!(
        repo.save_page("Foo", "page_9", &[], &Bitmaps::new()),
        Err(RepositoryError::PageNotFound { .. })
    ));
    assert!(matches!(
        repo.delete_page("Foo", DEFAULT_PAGE_ID),
        Err(RepositoryError::DefaultPageProtected)
    ));
}

#[test]
fn absent_page_file_loads_as_empty() {
    let (tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();
    let page = repo.create_page("Foo", "first").unwrap();
    fs::remove_file(tmp.path().join("Foo").join("pages").join(format!("{}.json", page.id))).unwrap();

    assert!(repo.load_page("Foo", &page.id).unwrap().items.is_empty());
}

#[test]
fn rename_page_keeps_file() {
    let (tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();
    let page = repo.create_page("Foo", "draft").unwrap();
    repo.rename_page("Foo", &page.id, "final").unwrap();

    assert_eq!(repo.list_pages("Foo").unwrap()[0].name, "final");
    assert!(tmp.path().join("Foo").join("pages").join("page_1.json").is_file());
}

#[test]
fn list_notebooks_skips_non_notebooks() {
    let (tmp, repo) = repo();
    repo.create_notebook("One").unwrap();
    repo.create_notebook("Two").unwrap();
    fs::create_dir(tmp.path().join("stray")).unwrap();
    fs::write(tmp.path().join("loose.txt"), "x").unwrap();
    fs::create_dir(tmp.path().join("broken")).unwrap();
    fs::write(tmp.path().join("broken").join("notebook.json"), "{").unwrap();

    let mut names: Vec<String> = repo.list_notebooks().collect();
    names.sort();
    assert_eq!(names, vec!["One", "Two"]);

    // restartable
    assert_eq!(repo.list_notebooks().count(), 2);
}

#[test]
fn list_notebooks_on_missing_root_is_empty() {
    let tmp = TempDir::new().unwrap();
    let repo = Repository::new(tmp.path().join("does-not-exist"));
    assert_eq!(repo.list_notebooks().count(), 0);
}

#[test]
fn save_then_load_round_trips_items_in_order() {
    let (_tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();

    let image = ImageItem::new("pic-1", -40.0, 12.5, 3, 2);
    let items = vec![
        Item::from(TextItem::new("<b>hello</b>", 10.0, 20.0, 320.0, 90.0)),
        Item::from(image),
        Item::from(TextItem::at(-500.0, 800.0)),
    ];
    let mut bitmaps = Bitmaps::new();
    bitmaps.insert("pic-1".into(), RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255])));

    repo.save_page("Foo", DEFAULT_PAGE_ID, &items, &bitmaps).unwrap();
    let page = repo.load_page("Foo", DEFAULT_PAGE_ID).unwrap();

    assert_eq!(page.items, items);
    assert_eq!(page.bitmaps["pic-1"], bitmaps["pic-1"]);
}

#[test]
fn saving_twice_is_idempotent() {
    let (tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();

    let items = vec![
        Item::from(ImageItem::new("img", 0.0, 0.0, 2, 2)),
        Item::from(TextItem::at(1.0, 1.0)),
    ];
    let bitmaps: Bitmaps = HashMap::from([("img".to_string(), RgbaImage::new(2, 2))]);

    let page_path = tmp.path().join("Foo").join("pages").join("page_0.json");
    repo.save_page("Foo", DEFAULT_PAGE_ID, &items, &bitmaps).unwrap();
    let first = fs::read(&page_path).unwrap();
    repo.save_page("Foo", DEFAULT_PAGE_ID, &items, &bitmaps).unwrap();
    let second = fs::read(&page_path).unwrap();

    assert_eq!(first, second);
    let assets: Vec<_> = fs::read_dir(tmp.path().join("Foo").join("images"))
        .unwrap()
        .flatten()
        .map(|e| e.file_name())
        .collect();
    assert_eq!(assets, vec!["img.png"]);
    let pages: Vec<_> = fs::read_dir(tmp.path().join("Foo").join("pages"))
        .unwrap()
        .flatten()
        .map(|e| e.file_name())
        .collect();
    assert_eq!(pages, vec!["page_0.json"]);
}

#[test]
fn missing_asset_drops_only_that_image() {
    let (tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();
    fs::write(
        tmp.path().join("Foo").join("pages").join("page_0.json"),
        r#"{"items": [
            {"type": "text", "x": 0.0, "y": 0.0, "width": 100.0, "height": 50.0, "content": "keep"},
            {"type": "image", "image_id": "missing", "x": 5.0, "y": 5.0, "scale": 1.0, "width": 10, "height": 10}
        ]}"#,
    )
    .unwrap();

    let page = repo.load_page("Foo", DEFAULT_PAGE_ID).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].as_text().unwrap().content, "keep");
    assert_eq!(
        page.warnings,
        vec![LoadWarning::AssetMissing {
            image_id: "missing".into()
        }]
    );
}

#[test]
fn corrupt_page_file_is_an_error() {
    let (tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();
    fs::write(tmp.path().join("Foo").join("pages").join("page_0.json"), "not json").unwrap();

    assert!(matches!(
        repo.load_page("Foo", DEFAULT_PAGE_ID),
        Err(RepositoryError::CorruptPage { .. })
    ));
}

#[test]
fn new_page_never_reuses_an_id_from_a_file_without_counter() {
    let (tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();
    let dir = tmp.path().join("Foo");
    fs::write(
        dir.join("notebook.json"),
        r#"{"name": "Foo", "pages": [{"id": "page_0", "name": "Foo"}, {"id": "page_2", "name": "Kept"}]}"#,
    )
    .unwrap();
    let kept = vec![Item::from(TextItem::new("keep me", 0.0, 0.0, 100.0, 50.0))];
    repo.save_page("Foo", "page_2", &kept, &Bitmaps::new()).unwrap();

    let page = repo.create_page("Foo", "new").unwrap();
    assert_eq!(page.id, "page_3");

    let ids: Vec<_> = repo.list_pages("Foo").unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["page_2", "page_3"]);
    assert_eq!(repo.load_page("Foo", "page_2").unwrap().items, kept);
}

#[test]
fn renamed_notebook_directory_is_written_in_place() {
    let (tmp, repo) = repo();
    repo.create_notebook("Work").unwrap();
    fs::rename(tmp.path().join("Work"), tmp.path().join("Archive")).unwrap();

    assert_eq!(repo.list_notebooks().collect::<Vec<_>>(), vec!["Archive"]);
    assert_eq!(repo.notebook("Archive").unwrap().name, "Archive");

    let page = repo.create_page("Archive", "Later").unwrap();
    repo.rename_page("Archive", &page.id, "Much later").unwrap();
    assert_eq!(repo.list_pages("Archive").unwrap()[0].name, "Much later");
    assert!(!tmp.path().join("Work").exists());

    let stored = fs::read_to_string(tmp.path().join("Archive").join("notebook.json")).unwrap();
    assert!(stored.contains(r#""name": "Archive""#));
}

#[test]
fn failed_save_leaves_previous_page_file() {
    let (tmp, repo) = repo();
    repo.create_notebook("Foo").unwrap();
    let page_path = tmp.path().join("Foo").join("pages").join("page_0.json");
    let items = vec![Item::from(TextItem::at(1.0, 2.0))];
    repo.save_page("Foo", DEFAULT_PAGE_ID, &items, &Bitmaps::new()).unwrap();
    let before = fs::read(&page_path).unwrap();

    let bad = vec![
        Item::from(TextItem::at(3.0, 4.0)),
        Item::from(ImageItem::new("a/b", 0.0, 0.0, 1, 1)),
    ];
    let bitmaps: Bitmaps = HashMap::from([("a/b".to_string(), RgbaImage::new(1, 1))]);
    assert!(matches!(
        repo.save_page("Foo", DEFAULT_PAGE_ID, &bad, &bitmaps),
        Err(RepositoryError::Asset(AssetError::InvalidImageId(_)))
    ));

    assert_eq!(fs::read(&page_path).unwrap(), before);
    assert_eq!(repo.load_page("Foo", DEFAULT_PAGE_ID).unwrap().items, items);
}
