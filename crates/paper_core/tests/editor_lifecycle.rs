use paper_core::config::{SAVE_QUIET_WINDOW_MS, STORAGE_KEY};
use paper_core::{
    open_db_in_memory, ChecklistScope, Command, Document, DocumentStore, Editor, EditorConfig,
    ImportError, MemoryStore, SequentialIdGenerator, SqliteDocumentStore, ViewKind,
};
use serde_json::{json, Value};

fn open<S: DocumentStore>(store: S) -> Editor<S> {
    Editor::bootstrap(
        store,
        EditorConfig::default(),
        Box::new(SequentialIdGenerator::new()),
    )
}

fn section_percent<S: DocumentStore>(editor: &Editor<S>, index: usize) -> u8 {
    let section = editor.view().sections()[index];
    let indicator = editor
        .view()
        .find_descendant(section, ViewKind::Progress)
        .unwrap();
    editor.view().get(indicator).unwrap().progress.unwrap().percent
}

fn nested_store() -> MemoryStore {
    let payload = json!({
        "schemaVersion": 3,
        "title": "Nested",
        "sections": [
            {
                "id": "sec-d",
                "title": "D",
                "checklist": [{ "id": "chk-s1", "text": "own", "checked": true }],
                "subsections": [
                    {
                        "id": "sub-d",
                        "title": "D.1",
                        "checklist": [{ "id": "chk-n1", "text": "nested", "checked": false }]
                    }
                ]
            },
            {
                "id": "sec-e",
                "title": "E",
                "checklist": [{ "id": "chk-e1", "text": "other", "checked": false }],
                "subsections": [{ "id": "sub-e", "title": "E.1" }]
            }
        ]
    });
    MemoryStore::with_value(STORAGE_KEY, payload.to_string())
}

fn stored_json(store: &MemoryStore) -> Value {
    serde_json::from_str(&store.value(STORAGE_KEY).unwrap()).unwrap()
}

#[test]
fn default_bootstrap_has_one_empty_expanded_section() {
    let store = MemoryStore::new();
    let editor = open(&store);

    let document = editor.document();
    assert_eq!(document.title, "Untitled");
    assert_eq!(document.sections.len(), 1);
    let section = &document.sections[0];
    assert_eq!(section.title, "New Section");
    assert!(section.checklist.is_empty());
    assert!(section.subsections.is_empty());
    assert!(!section.collapsed);

    let saved = stored_json(&store);
    assert_eq!(saved["schemaVersion"], 3);
    assert_eq!(saved["sections"][0]["id"], section.id.as_str());
}

#[test]
fn unreadable_store_still_yields_usable_editor() {
    let store = MemoryStore::with_value(STORAGE_KEY, "{\"title\": \"Old\"}");
    store.set_fail_reads(true);
    store.set_fail_writes(true);
    let mut editor = open(&store);

    assert_eq!(editor.document().title, "Untitled");
    assert_eq!(editor.document().sections.len(), 1);

    editor.dispatch(Command::AddSection, 0).unwrap();
    assert!(editor.tick(SAVE_QUIET_WINDOW_MS));
    assert_eq!(editor.view().sections().len(), 2);
    assert_eq!(store.write_count(), 0);
}

#[test]
fn burst_of_edits_writes_once_with_final_state() {
    let store = MemoryStore::new();
    let mut editor = open(&store);
    let writes_after_bootstrap = store.write_count();
    let title = editor.view().page_title();

    for (step, text) in ["D", "Dr", "Dra", "Draf", "Draft"].into_iter().enumerate() {
        let now = step as u64 * 100;
        editor
            .dispatch(
                Command::EditText {
                    node: title,
                    text: text.to_string(),
                },
                now,
            )
            .unwrap();
        assert!(!editor.tick(now + 1));
    }

    assert!(!editor.tick(400 + SAVE_QUIET_WINDOW_MS - 1));
    assert!(editor.tick(400 + SAVE_QUIET_WINDOW_MS));
    assert!(!editor.tick(10_000));

    assert_eq!(store.write_count(), writes_after_bootstrap + 1);
    assert_eq!(stored_json(&store)["title"], "Draft");
}

#[test]
fn failed_import_changes_nothing() {
    let store = MemoryStore::new();
    let mut editor = open(&store);
    let section = editor.view().sections()[0];
    editor
        .dispatch(
            Command::AddChecklistItem {
                container: section,
                scope: ChecklistScope::Section,
            },
            0,
        )
        .unwrap();
    editor.flush();

    let document = editor.document().clone();
    let view = editor.view().clone();
    let persisted = store.value(STORAGE_KEY);
    let writes = store.write_count();

    let err = editor.import(b"{ not json").unwrap_err();
    assert!(matches!(err, ImportError::InvalidJson(_)));

    assert_eq!(editor.document(), &document);
    assert_eq!(editor.view(), &view);
    assert_eq!(store.value(STORAGE_KEY), persisted);
    assert_eq!(store.write_count(), writes);
}

#[test]
fn import_replaces_document_and_saves_immediately() {
    let store = MemoryStore::new();
    let mut editor = open(&store);
    let writes = store.write_count();
    let payload = json!({
        "schemaVersion": 2,
        "title": "Imported",
        "sections": [
            {
                "id": "sec-imp",
                "title": "Only",
                "collapsed": "yes",
                "checklist": [{ "id": "chk-imp", "text": "x", "checked": true }],
                "subsections": [{ "title": "Nested" }]
            }
        ]
    });

    editor
        .import(serde_json::to_string(&payload).unwrap().as_bytes())
        .unwrap();

    let document = editor.document();
    assert_eq!(document.schema_version, 3);
    assert_eq!(document.title, "Imported");
    assert!(!document.sections[0].collapsed);
    assert!(!document.sections[0].subsections[0].id.is_empty());
    assert_eq!(store.write_count(), writes + 1);
    assert_eq!(stored_json(&store)["sections"][0]["checklist"][0]["checked"], true);
    assert!(!editor.is_save_pending());
}

#[test]
fn export_commits_live_edits_and_names_file_after_title() {
    let store = MemoryStore::new();
    let mut editor = open(&store);
    let title = editor.view().page_title();
    editor
        .dispatch(
            Command::EditText {
                node: title,
                text: "Q3: plan?".to_string(),
            },
            0,
        )
        .unwrap();

    let export = editor.export().unwrap();
    assert_eq!(export.file_name, "Q3_ plan_.json");
    let exported: Document = {
        let value: Value = serde_json::from_str(&export.contents).unwrap();
        Document::from_json_value(&value)
    };
    assert_eq!(&exported, editor.document());
}

#[test]
fn commands_flow_through_to_sqlite_store() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let mut editor = open(store);

    let section = editor.view().sections()[0];
    editor
        .dispatch(Command::AddSubsection { section }, 0)
        .unwrap();
    let subsection = editor
        .view()
        .find_descendant(section, ViewKind::Subsection)
        .unwrap();
    let created = editor
        .dispatch(
            Command::AddChecklistItem {
                container: subsection,
                scope: ChecklistScope::Subsection,
            },
            10,
        )
        .unwrap()
        .created
        .unwrap();
    editor
        .dispatch(
            Command::SetChecked {
                item: created,
                checked: true,
            },
            20,
        )
        .unwrap();
    assert!(editor.tick(20 + SAVE_QUIET_WINDOW_MS));

    let reopened = open(SqliteDocumentStore::try_new(&conn).unwrap());
    let section = &reopened.document().sections[0];
    assert_eq!(section.subsections[0].title, "Subsection");
    assert!(section.subsections[0].checklist[0].checked);
    assert_eq!(section.progress(), 100);
}

#[test]
fn deleting_subsection_drops_its_items_and_refreshes_progress() {
    let store = nested_store();
    let mut editor = open(&store);
    assert_eq!(section_percent(&editor, 0), 50);

    let nested_item = editor.view().find_by_node_id("chk-n1").unwrap();
    editor
        .dispatch(
            Command::DeleteSubsection {
                subsection: nested_item,
            },
            0,
        )
        .unwrap();

    assert_eq!(section_percent(&editor, 0), 100);
    assert!(editor.view().find_by_node_id("sub-d").is_none());
    assert!(editor.view().find_by_node_id("chk-n1").is_none());
    assert!(editor.is_save_pending());
    assert!(editor.commit().sections[0].subsections.is_empty());
}

#[test]
fn deleting_item_through_its_text_field() {
    let store = nested_store();
    let mut editor = open(&store);

    let item = editor.view().find_by_node_id("chk-s1").unwrap();
    let text = editor
        .view()
        .find_descendant(item, ViewKind::ItemText)
        .unwrap();
    editor
        .dispatch(Command::DeleteItem { item: text }, 0)
        .unwrap();

    assert!(!editor.view().contains(item));
    assert_eq!(section_percent(&editor, 0), 0);
    let document = editor.commit();
    assert!(document.sections[0].checklist.is_empty());
    assert_eq!(document.sections[0].subsections[0].checklist.len(), 1);
}

#[test]
fn deleting_section_removes_everything_under_it() {
    let store = nested_store();
    let mut editor = open(&store);

    let section = editor.view().sections()[1];
    editor
        .dispatch(Command::DeleteSection { section }, 0)
        .unwrap();
    assert!(editor.flush());

    let document = editor.document();
    assert_eq!(document.sections.len(), 1);
    assert_eq!(document.sections[0].id, "sec-d");
    assert_eq!(document.item_count(), 2);
    for gone in ["sec-e", "sub-e", "chk-e1"] {
        assert!(editor.view().find_by_node_id(gone).is_none());
    }
    let saved = stored_json(&store);
    assert_eq!(saved["sections"].as_array().unwrap().len(), 1);
}
