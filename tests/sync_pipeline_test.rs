// End-to-end pipeline tests: native tree → canonical forest → snapshot
// wire format → fresh native tree, across both root-id schemes.

use bookmark_hub_sync::model::{BrowserFamily, IdScheme, SyncSnapshot};
use bookmark_hub_sync::service::clear_native_children;
use bookmark_hub_sync::store::{BookmarkStore, CreateDetail, TreeStore};
use bookmark_hub_sync::{bookmark_count, dedup_tree, export_tree, flatten_tree, import_tree};

fn create(store: &mut TreeStore, parent: &str, title: &str, url: Option<&str>) -> String {
    store
        .create(CreateDetail {
            parent_id: parent.to_string(),
            title: title.to_string(),
            url: url.map(|u| u.to_string()),
        })
        .unwrap()
        .id
}

/// A Gecko tree with content behind every standard root.
fn seeded_gecko_store() -> TreeStore {
    let mut store = TreeStore::fresh(IdScheme::Gecko);
    create(&mut store, "toolbar_____", "News", Some("https://news.example"));
    let work = create(&mut store, "toolbar_____", "Work", None);
    create(&mut store, &work, "CI", Some("https://ci.dev"));
    create(&mut store, &work, "Docs", Some("https://docs.dev"));
    create(&mut store, "menu________", "Menu link", Some("https://menu.example"));
    create(&mut store, "unfiled_____", "Stash", Some("https://stash.example"));
    create(&mut store, "mobile______", "Phone", Some("https://phone.example"));
    store
}

#[test]
fn gecko_round_trip_preserves_structure_and_order() {
    let source = seeded_gecko_store();
    let forest = export_tree(source.root());
    assert_eq!(bookmark_count(&forest), 6);

    // Through the wire format, as upload/download would see it.
    let snapshot = SyncSnapshot::new(forest.clone(), "test-agent".to_string(), BrowserFamily::Firefox);
    let wire = serde_json::to_string(&snapshot).unwrap();
    let parsed: SyncSnapshot = serde_json::from_str(&wire).unwrap();

    let mut target = TreeStore::fresh(IdScheme::Gecko);
    let scheme = IdScheme::Gecko;
    let stats = import_tree(&parsed.bookmarks, scheme, scheme.unfiled_id(), &mut target);
    assert_eq!(stats.created, 7); // 6 bookmarks + 1 folder
    assert_eq!(stats.skipped, 0);

    // Identical canonical forest on re-export: structure, titles, urls
    // and child order all survive; only browser-local ids differ.
    assert_eq!(export_tree(target.root()), forest);
}

#[test]
fn gecko_to_chromium_routes_menu_into_other_bookmarks() {
    let source = seeded_gecko_store();
    let forest = export_tree(source.root());

    let mut target = TreeStore::fresh(IdScheme::Chromium);
    let scheme = IdScheme::Chromium;
    import_tree(&forest, scheme, scheme.unfiled_id(), &mut target);

    let titles = |id: &str| -> Vec<String> {
        target
            .find(id)
            .unwrap()
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    };

    assert_eq!(titles("1"), vec!["News", "Work"]);
    // The documented Chromium collapse: menu and unfiled share slot "2",
    // in forest order (menu root precedes unfiled in a Gecko tree).
    assert_eq!(titles("2"), vec!["Menu link", "Stash"]);
    assert_eq!(titles("3"), vec!["Phone"]);

    // Nothing lost, just refiled.
    assert_eq!(bookmark_count(&export_tree(target.root())), 6);
}

#[test]
fn chromium_export_comes_back_to_gecko_without_loss() {
    // Start from a Chromium tree, hop through a snapshot, land in Gecko.
    let mut source = TreeStore::fresh(IdScheme::Chromium);
    create(&mut source, "1", "Bar link", Some("https://bar.example"));
    create(&mut source, "2", "Other link", Some("https://other.example"));
    create(&mut source, "3", "Phone link", Some("https://phone.example"));

    let forest = export_tree(source.root());
    // Chromium has no distinct menu root; the exporter pads the slot.
    let menu = forest
        .iter()
        .find(|n| n.title == "MenuFolder")
        .expect("padded menu slot");
    assert_eq!(menu.children.as_deref(), Some(&[][..]));

    let mut target = TreeStore::fresh(IdScheme::Gecko);
    let scheme = IdScheme::Gecko;
    import_tree(&forest, scheme, scheme.unfiled_id(), &mut target);

    let child_count = |id: &str| {
        target
            .find(id)
            .unwrap()
            .children
            .as_ref()
            .map(|c| c.len())
            .unwrap_or(0)
    };
    assert_eq!(child_count("toolbar_____"), 1);
    assert_eq!(child_count("unfiled_____"), 1);
    assert_eq!(child_count("mobile______"), 1);
    assert_eq!(child_count("menu________"), 0);
}

#[test]
fn clear_then_reimport_replaces_the_whole_tree() {
    let mut store = seeded_gecko_store();
    let original = export_tree(store.root());

    let removed = clear_native_children(&mut store).unwrap();
    assert_eq!(removed, 5); // News, Work, Menu link, Stash, Phone
    assert_eq!(bookmark_count(&export_tree(store.root())), 0);

    let scheme = IdScheme::Gecko;
    import_tree(&original, scheme, scheme.unfiled_id(), &mut store);
    assert_eq!(export_tree(store.root()), original);
}

#[test]
fn dedup_on_upload_path_shrinks_the_snapshot_only() {
    let mut store = TreeStore::fresh(IdScheme::Gecko);
    // The menu root precedes the toolbar in traversal order, so its copy
    // of the duplicated URL is the one that survives.
    create(&mut store, "menu________", "Kept", Some("https://dup.example"));
    create(&mut store, "toolbar_____", "Dropped", Some("https://dup.example"));
    create(&mut store, "unfiled_____", "Other", Some("https://other.example"));

    let forest = export_tree(store.root());
    let deduped = dedup_tree(&forest);

    assert_eq!(bookmark_count(&forest), 3);
    assert_eq!(bookmark_count(&deduped), 2);
    // The live tree is untouched by snapshot-side dedup.
    assert_eq!(bookmark_count(&export_tree(store.root())), 3);

    let kept: Vec<String> = flatten_tree(&deduped).into_iter().map(|r| r.title).collect();
    assert_eq!(kept, vec!["Kept", "Other"]);
}

#[test]
fn snapshot_written_by_a_browser_extension_client_imports_cleanly() {
    // Wire shape a browser-extension client writes into the same gist.
    let wire = r#"{
        "browser": "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/115.0",
        "browserType": "firefox",
        "version": "0.0.9",
        "createDate": 1700000000000,
        "bookmarks": [
            {"title": "ToolbarFolder", "children": [
                {"title": "Example", "url": "https://example.com"},
                {"title": "Nested", "children": [
                    {"title": "Deep", "url": "https://deep.example"}
                ]}
            ]},
            {"title": "MenuFolder", "children": []},
            {"title": "UnfiledFolder", "children": []},
            {"title": "MobileFolder", "children": []}
        ]
    }"#;

    let snapshot: SyncSnapshot = serde_json::from_str(wire).unwrap();
    assert_eq!(snapshot.browser_type, BrowserFamily::Firefox);
    assert_eq!(bookmark_count(&snapshot.bookmarks), 2);

    let mut store = TreeStore::fresh(IdScheme::Gecko);
    let scheme = IdScheme::Gecko;
    let stats = import_tree(&snapshot.bookmarks, scheme, scheme.unfiled_id(), &mut store);
    assert_eq!(stats.created, 3);

    let records = flatten_tree(&export_tree(store.root()));
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].path, "ToolbarFolder/Nested");
}

#[test]
fn empty_snapshot_is_data_free_not_an_error() {
    let wire = r#"{"browser":"","browserType":"chrome","version":"0.0.9","createDate":0,"bookmarks":[]}"#;
    let snapshot: SyncSnapshot = serde_json::from_str(wire).unwrap();
    assert!(snapshot.bookmarks.is_empty());
    assert_eq!(bookmark_count(&snapshot.bookmarks), 0);

    // Importing nothing is a clean no-op against a fresh tree.
    let mut store = TreeStore::fresh(IdScheme::Chromium);
    let scheme = IdScheme::Chromium;
    let stats = import_tree(&snapshot.bookmarks, scheme, scheme.unfiled_id(), &mut store);
    assert_eq!(stats.created, 0);
    assert_eq!(bookmark_count(&export_tree(store.root())), 0);
}

#[test]
fn file_backed_store_survives_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");

    let mut store = TreeStore::fresh(IdScheme::Gecko).with_path(path.clone());
    create(&mut store, "toolbar_____", "Persisted", Some("https://p.example"));
    store.persist().unwrap();

    let reopened = TreeStore::open(&path).unwrap();
    let forest = export_tree(reopened.root());
    assert_eq!(bookmark_count(&forest), 1);
    assert_eq!(flatten_tree(&forest)[0].title, "Persisted");
}
