use serde_json::json;

use super::*;
use crate::canvas::CanvasNode;

// =============================================================
// Helpers
// =============================================================

fn engine() -> (EngineCore, PageId) {
    let mut core = EngineCore::default();
    let page = core.create_page("Home", "/");
    (core, page)
}

fn drop_palette(core: &mut EngineCore, kind: ComponentKind, target: PointerTarget) -> Vec<Action> {
    core.begin_palette_drag(kind);
    core.pointer_move(target);
    core.drop_on(target)
}

fn created(actions: &[Action]) -> InstanceId {
    actions
        .iter()
        .find_map(|a| match a {
            Action::InstanceCreated { id, .. } => Some(*id),
            _ => None,
        })
        .unwrap()
}

fn instance_count(core: &EngineCore, page: &PageId) -> usize {
    core.doc.page(page).map_or(0, |p| p.len())
}

// =============================================================
// Palette drops
// =============================================================

#[test]
fn palette_drop_on_background_creates_root_instance() {
    let (mut core, page) = engine();
    let actions = drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background);
    let id = created(&actions);

    let inst = core.doc.get_component(&page, &id).unwrap();
    assert_eq!(inst.component_type, "row");
    assert_eq!(inst.parent_id, None);
    assert_eq!(inst.config["gap"], json!("8px"));
    assert!(actions.contains(&Action::SelectionChanged { page_id: page, id: Some(id) }));
    assert_eq!(actions.last(), Some(&Action::RenderNeeded));
    assert_eq!(core.selection(), Some(id));
    assert!(!core.input.is_dragging());
}

#[test]
fn palette_drop_on_container_nests() {
    let (mut core, page) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let button = created(&drop_palette(&mut core, ComponentKind::Button, PointerTarget::Instance(row)));
    assert_eq!(core.doc.get_component(&page, &button).unwrap().parent_id, Some(row));
}

#[test]
fn drop_on_leaf_is_rejected_without_mutation() {
    let (mut core, page) = engine();
    let button = created(&drop_palette(&mut core, ComponentKind::Button, PointerTarget::Background));
    let before = core.doc.export_page(&page).unwrap();

    let actions = drop_palette(&mut core, ComponentKind::Text, PointerTarget::Instance(button));
    assert!(actions.contains(&Action::DropRejected(DropRejection::NotAContainer(button))));
    assert!(!actions.iter().any(|a| matches!(a, Action::InstanceCreated { .. })));
    assert_eq!(core.doc.export_page(&page).unwrap(), before);
    assert_eq!(instance_count(&core, &page), 1);
}

#[test]
fn drop_outside_cancels() {
    let (mut core, page) = engine();
    let actions = drop_palette(&mut core, ComponentKind::Text, PointerTarget::Outside);
    assert!(actions.contains(&Action::DragCancelled));
    assert_eq!(instance_count(&core, &page), 0);
}

#[test]
fn malformed_payload_is_rejected() {
    let (mut core, page) = engine();
    core.begin_payload_drag("{not json");
    let actions = core.drop_on(PointerTarget::Background);
    assert!(matches!(actions[0], Action::DropRejected(DropRejection::BadPayload(_))));
    assert_eq!(instance_count(&core, &page), 0);
}

#[test]
fn payload_with_unknown_type_is_rejected() {
    let (mut core, page) = engine();
    core.begin_payload_drag(r#"{"type":"marquee","label":"Marquee","category":"basic"}"#);
    let actions = core.drop_on(PointerTarget::Background);
    assert!(actions.contains(&Action::DropRejected(DropRejection::Store(StoreError::UnknownType("marquee".into())))));
    assert_eq!(instance_count(&core, &page), 0);
}

#[test]
fn drop_without_gesture_is_rejected() {
    let (mut core, _) = engine();
    assert_eq!(core.drop_on(PointerTarget::Background), vec![Action::DropRejected(DropRejection::NotDragging)]);
}

// =============================================================
// Highlight
// =============================================================

#[test]
fn pointer_move_tracks_highlight_changes_only() {
    let (mut core, _) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let text = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));

    core.begin_palette_drag(ComponentKind::Button);
    assert_eq!(
        core.pointer_move(PointerTarget::Instance(row)),
        vec![Action::HighlightChanged(Some(DropTarget::Container(row))), Action::RenderNeeded]
    );
    assert!(core.pointer_move(PointerTarget::Instance(row)).is_empty());
    assert_eq!(
        core.pointer_move(PointerTarget::Instance(text)),
        vec![Action::HighlightChanged(None), Action::RenderNeeded]
    );

    core.pointer_move(PointerTarget::Background);
    assert!(core.render_canvas().root_highlight);
    let actions = core.cancel_drag();
    assert_eq!(actions, vec![Action::HighlightChanged(None), Action::DragCancelled, Action::RenderNeeded]);
    assert!(!core.render_canvas().root_highlight);
}

#[test]
fn moving_container_does_not_highlight_itself_or_descendants() {
    let (mut core, _) = engine();
    let outer = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let inner = created(&drop_palette(&mut core, ComponentKind::Column, PointerTarget::Instance(outer)));

    core.begin_move(outer);
    assert!(core.pointer_move(PointerTarget::Instance(outer)).is_empty());
    assert!(core.pointer_move(PointerTarget::Instance(inner)).is_empty());
    assert_eq!(core.input.hover(), None);
}

// =============================================================
// Moves
// =============================================================

#[test]
fn move_gesture_reparents() {
    let (mut core, page) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let text = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));

    core.begin_move(text);
    let actions = core.drop_on(PointerTarget::Instance(row));
    assert!(actions.contains(&Action::InstanceMoved { page_id: page, id: text, parent: Some(row) }));
    assert_eq!(core.doc.get_component(&page, &text).unwrap().parent_id, Some(row));
}

#[test]
fn move_into_own_descendant_is_rejected() {
    let (mut core, page) = engine();
    let outer = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let inner = created(&drop_palette(&mut core, ComponentKind::Column, PointerTarget::Instance(outer)));

    core.begin_move(outer);
    let actions = core.drop_on(PointerTarget::Instance(inner));
    assert!(actions.contains(&Action::DropRejected(DropRejection::Store(StoreError::Cycle { id: outer, parent: inner }))));
    assert_eq!(core.doc.get_component(&page, &outer).unwrap().parent_id, None);
}

#[test]
fn move_over_leaf_lands_in_its_container() {
    let (mut core, page) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let button = created(&drop_palette(&mut core, ComponentKind::Button, PointerTarget::Instance(row)));
    let text = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));

    core.begin_move(text);
    assert_eq!(
        core.pointer_move(PointerTarget::Instance(button)),
        vec![Action::HighlightChanged(Some(DropTarget::Container(row))), Action::RenderNeeded]
    );
    let actions = core.drop_on(PointerTarget::Instance(button));
    assert!(actions.contains(&Action::InstanceMoved { page_id: page, id: text, parent: Some(row) }));
    let order: Vec<InstanceId> = core.doc.child_components(&page, Some(row)).iter().map(|i| i.id).collect();
    assert_eq!(order, vec![button, text]);
}

#[test]
fn move_over_root_leaf_lands_at_root() {
    let (mut core, page) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let text = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Instance(row)));
    let button = created(&drop_palette(&mut core, ComponentKind::Button, PointerTarget::Background));

    core.begin_move(text);
    let actions = core.drop_on(PointerTarget::Instance(button));
    assert!(actions.contains(&Action::InstanceMoved { page_id: page, id: text, parent: None }));
    assert_eq!(core.doc.get_component(&page, &text).unwrap().parent_id, None);
}

#[test]
fn direct_move_with_position() {
    let (mut core, page) = engine();
    let a = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));
    let b = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));
    core.move_instance(b, None, Some(0));
    let order: Vec<InstanceId> = core.doc.child_components(&page, None).iter().map(|i| i.id).collect();
    assert_eq!(order, vec![b, a]);
}

// =============================================================
// Selection and deletion
// =============================================================

#[test]
fn deleting_ancestor_of_selection_clears_it() {
    let (mut core, page) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    let button = created(&drop_palette(&mut core, ComponentKind::Button, PointerTarget::Instance(row)));
    assert_eq!(core.selection(), Some(button));

    let actions = core.delete(row);
    assert_eq!(actions[0], Action::SelectionChanged { page_id: page, id: None });
    assert_eq!(actions[1], Action::InstancesDeleted { page_id: page, ids: vec![row, button] });
    assert_eq!(core.selection(), None);
    assert!(core.inspect().is_none());
}

#[test]
fn deleting_unrelated_instance_keeps_selection() {
    let (mut core, _) = engine();
    let a = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));
    let b = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));
    core.select(Some(a));
    core.delete(b);
    assert_eq!(core.selection(), Some(a));
}

#[test]
fn delete_missing_is_silent() {
    let (mut core, _) = engine();
    assert!(core.delete(uuid::Uuid::new_v4()).is_empty());
}

#[test]
fn select_ignores_missing_and_unchanged() {
    let (mut core, page) = engine();
    let a = created(&drop_palette(&mut core, ComponentKind::Text, PointerTarget::Background));
    assert!(core.select(Some(a)).is_empty());
    assert!(core.select(Some(uuid::Uuid::new_v4())).is_empty());
    assert_eq!(core.select(None)[0], Action::SelectionChanged { page_id: page, id: None });
}

#[test]
fn duplicate_selects_copy() {
    let (mut core, page) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    drop_palette(&mut core, ComponentKind::Text, PointerTarget::Instance(row));
    let actions = core.duplicate(row);
    let copy = created(&actions);
    assert_eq!(core.selection(), Some(copy));
    assert_eq!(instance_count(&core, &page), 4);
}

// =============================================================
// Inspector and views
// =============================================================

#[test]
fn inspector_edits_go_to_selection() {
    let (mut core, page) = engine();
    let button = created(&drop_palette(&mut core, ComponentKind::Button, PointerTarget::Background));
    let actions = core.set_field("label", json!("Save")).unwrap();
    assert_eq!(actions[0], Action::InstanceUpdated { page_id: page, id: button });
    assert_eq!(core.inspect().unwrap().id, button);

    let (outcome, _) = core.edit_structured("action", "{type: 'submit'}").unwrap();
    assert!(matches!(outcome, StructuredEdit::Committed { .. }));
    assert_eq!(core.doc.get_component(&page, &button).unwrap().config["action"], json!({"type": "submit"}));
}

#[test]
fn inspector_without_selection() {
    let (mut core, _) = engine();
    assert_eq!(core.set_field("label", json!("x")).unwrap_err(), FieldError::NoSelection);
}

#[test]
fn views_follow_active_page() {
    let (mut core, _) = engine();
    let row = created(&drop_palette(&mut core, ComponentKind::Row, PointerTarget::Background));
    drop_palette(&mut core, ComponentKind::Text, PointerTarget::Instance(row));

    assert_eq!(core.tree_rows().len(), 2);
    core.toggle_tree_expanded(row);
    assert_eq!(core.tree_rows().len(), 1);
    core.toggle_canvas_collapsed(row);
    match &core.render_canvas().nodes[0] {
        CanvasNode::Container(c) => assert!(c.collapsed),
        CanvasNode::Leaf(_) => panic!("row should render as a container"),
    }

    let other = core.create_page("Other", "/other");
    assert!(core.set_active_page(other));
    assert!(core.tree_rows().is_empty());
    assert!(core.render_canvas().nodes.is_empty());
}
