use paper_core::config::STORAGE_KEY;
use paper_core::{
    ChecklistItem, ChecklistScope, Command, Document, DragKind, DropOutcome, Editor,
    EditorConfig, MemoryStore, Placement, Section, SequentialIdGenerator, Subsection, ViewKind,
};

fn two_section_document() -> Document {
    let mut document = Document::new("Plan");

    let mut first = Section::new("sec-a", "A");
    first.checklist.push(ChecklistItem::new("chk-a1", "a1"));
    first.checklist.push(ChecklistItem::new("chk-a2", "a2"));
    first.subsections.push(Subsection::new("sub-a1", "A.1"));
    first.subsections.push(Subsection::new("sub-a2", "A.2"));

    let mut second = Section::new("sec-b", "B");
    let mut nested = Subsection::new("sub-b1", "B.1");
    let mut done = ChecklistItem::new("chk-b1", "b1");
    done.checked = true;
    nested.checklist.push(done);
    second.subsections.push(nested);
    second.subsections.push(Subsection::new("sub-b2", "B.2"));

    document.sections.push(first);
    document.sections.push(second);
    document
}

fn seeded_store() -> MemoryStore {
    let json = serde_json::to_string(&two_section_document()).unwrap();
    MemoryStore::with_value(STORAGE_KEY, json)
}

fn open(store: &MemoryStore) -> Editor<&MemoryStore> {
    Editor::bootstrap(
        store,
        EditorConfig::default(),
        Box::new(SequentialIdGenerator::new()),
    )
}

#[test]
fn subsection_cannot_cross_sections() {
    let store = seeded_store();
    let mut editor = open(&store);
    let before = editor.commit().clone();

    let source = editor.view().find_by_node_id("sub-a1").unwrap();
    let foreign = editor.view().find_by_node_id("sub-b1").unwrap();
    let y = editor.view().get(foreign).unwrap().rect.midpoint();

    assert_eq!(editor.drag_start(source), Some(DragKind::Subsection));
    assert_eq!(editor.drag_over(foreign, y), None);
    assert_eq!(editor.drop(foreign, y, 0), DropOutcome::Rejected);

    assert_eq!(editor.commit(), &before);
    assert!(!editor.is_save_pending());
}

#[test]
fn subsection_reorders_within_its_section() {
    let store = seeded_store();
    let mut editor = open(&store);

    let source = editor.view().find_by_node_id("sub-a1").unwrap();
    let sibling = editor.view().find_by_node_id("sub-a2").unwrap();
    let y = editor.view().get(sibling).unwrap().rect.midpoint();

    editor.drag_start(source);
    let target = editor.drag_over(sibling, y).unwrap();
    assert_eq!(target.placement, Placement::After(sibling));
    assert!(matches!(editor.drop(sibling, y, 0), DropOutcome::Moved { .. }));

    let order = editor.commit().sections[0]
        .subsections
        .iter()
        .map(|subsection| subsection.id.clone())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["sub-a2", "sub-a1"]);
}

#[test]
fn item_moves_into_another_sections_subsection() {
    let store = seeded_store();
    let mut editor = open(&store);

    let source = editor.view().find_by_node_id("chk-a1").unwrap();
    let anchor = editor.view().find_by_node_id("chk-b1").unwrap();
    let top = editor.view().get(anchor).unwrap().rect.top;

    editor.drag_start(source);
    let outcome = editor.drop(anchor, top, 100);
    assert!(matches!(
        outcome,
        DropOutcome::Moved {
            kind: DragKind::ChecklistItem,
            ..
        }
    ));
    assert!(editor.is_save_pending());

    let section_b = editor.view().sections()[1];
    let indicator = editor
        .view()
        .find_descendant(section_b, ViewKind::Progress)
        .unwrap();
    assert_eq!(
        editor.view().get(indicator).unwrap().progress.unwrap().percent,
        50
    );

    let document = editor.commit().clone();
    let origin = document.sections[0]
        .checklist
        .iter()
        .map(|item| item.id.as_str())
        .collect::<Vec<_>>();
    let destination = document.sections[1].subsections[0]
        .checklist
        .iter()
        .map(|item| item.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(origin, vec!["chk-a2"]);
    assert_eq!(destination, vec!["chk-a1", "chk-b1"]);
}

#[test]
fn item_dropped_on_empty_checklist_appends() {
    let store = seeded_store();
    let mut editor = open(&store);

    let source = editor.view().find_by_node_id("chk-a2").unwrap();
    let empty = editor.view().find_by_node_id("sub-b2").unwrap();
    let list = editor
        .view()
        .find_descendant(empty, ViewKind::Checklist(ChecklistScope::Subsection))
        .unwrap();
    let y = editor.view().get(list).unwrap().rect.top;

    editor.drag_start(source);
    let target = editor.drag_over(list, y).unwrap();
    assert_eq!(target.container, list);
    assert_eq!(target.placement, Placement::Append);
    editor.drop(list, y, 0);

    let document = editor.commit();
    assert_eq!(document.sections[1].subsections[1].checklist[0].id, "chk-a2");
}

#[test]
fn collapsed_section_contents_are_not_drop_targets() {
    let store = seeded_store();
    let mut editor = open(&store);
    let section_b = editor.view().sections()[1];
    editor
        .dispatch(Command::ToggleFold { section: section_b }, 0)
        .unwrap();

    let source = editor.view().find_by_node_id("chk-a1").unwrap();
    let hidden = editor.view().find_by_node_id("chk-b1").unwrap();
    assert!(editor.view().is_hidden(hidden));

    editor.drag_start(source);
    assert_eq!(editor.drag_over(hidden, 0.0), None);
    assert_eq!(editor.drop(hidden, 0.0, 0), DropOutcome::Rejected);
}

#[test]
fn section_drop_before_first_section() {
    let store = seeded_store();
    let mut editor = open(&store);
    let first = editor.view().sections()[0];
    let second = editor.view().sections()[1];
    let title = editor
        .view()
        .find_descendant(second, ViewKind::SectionTitle)
        .unwrap();
    let top = editor.view().get(first).unwrap().rect.top;

    assert_eq!(editor.drag_start(title), Some(DragKind::Section));
    assert!(matches!(editor.drop(first, top, 0), DropOutcome::Moved { .. }));
    assert_eq!(editor.commit().sections[0].id, "sec-b");
}

#[test]
fn section_drag_over_foreign_item_is_rejected() {
    let store = seeded_store();
    let mut editor = open(&store);
    let before = editor.commit().clone();

    let source = editor.view().sections()[0];
    let item = editor.view().find_by_node_id("chk-b1").unwrap();
    let y = editor.view().get(item).unwrap().rect.midpoint();

    assert_eq!(editor.drag_start(source), Some(DragKind::Section));
    assert_eq!(editor.drag_over(item, y), None);
    assert_eq!(editor.drop(item, y, 0), DropOutcome::Rejected);
    assert_eq!(editor.commit(), &before);
    assert!(!editor.is_save_pending());
}

#[test]
fn subsection_drag_over_own_section_title_is_rejected() {
    let store = seeded_store();
    let mut editor = open(&store);

    let source = editor.view().find_by_node_id("sub-a2").unwrap();
    let section = editor.view().sections()[0];
    let title = editor
        .view()
        .find_descendant(section, ViewKind::SectionTitle)
        .unwrap();

    editor.drag_start(source);
    assert_eq!(editor.drag_over(title, 0.0), None);
}

#[test]
fn section_drag_over_other_section_title_is_accepted() {
    let store = seeded_store();
    let mut editor = open(&store);

    let source = editor.view().sections()[0];
    let second = editor.view().sections()[1];
    let title = editor
        .view()
        .find_descendant(second, ViewKind::SectionTitle)
        .unwrap();
    let y = editor.view().get(title).unwrap().rect.top;

    editor.drag_start(source);
    let target = editor.drag_over(title, y).unwrap();
    assert_eq!(target.placement, Placement::Before(second));
}
