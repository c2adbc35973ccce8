//! End-to-end scenarios over the public API: one document in, patched
//! document out, for each source kind.

use pretty_assertions::assert_eq;
use uifix::{
    apply_change_set, autofix_document, build_pointer_map, generate_changes_markup, ChangeSet,
    Fix, LintMessage, MarkupEvent, QualifyHandlerFix, RemoveAttributeFix, RemoveJsonPropertyFix,
    ScriptMetadataIndex, ScriptPosition, StructuralEvents,
};

use uifix::markup::scan;

fn open_tags(content: &str) -> Vec<uifix::markup::Tag> {
    scan(content)
        .into_iter()
        .filter_map(|event| match event {
            MarkupEvent::OpenTag(tag) => Some(tag),
            MarkupEvent::Attribute(_) => None,
        })
        .collect()
}

#[test]
fn insert_into_plain_content() {
    let patched = apply_change_set(
        "Hello world!",
        vec![ChangeSet::Insert {
            start: 5,
            value: " beautiful".to_string(),
        }],
    )
    .unwrap();
    assert_eq!(patched, "Hello beautiful world!");
}

#[test]
fn remove_attribute_from_tag() {
    let content = r#"<script remove="me" keep="me">"#;
    let tag = &open_tags(content)[0];
    let fix = RemoveAttributeFix::new(tag, 0).unwrap();

    let messages = vec![
        LintMessage::new("no-deprecated-attribute", ScriptPosition::new(1, 9))
            .with_fix(Box::new(fix)),
    ];
    let patched = autofix_document(content, StructuralEvents::Markup(scan(content)), messages)
        .unwrap()
        .unwrap();
    assert_eq!(patched, r#"<script keep="me">"#);
}

#[test]
fn remove_json_property_consumes_the_comma() {
    let content = r#"{"before":true,"text":"Hello World"}"#;
    let pointers = build_pointer_map(content).unwrap();
    let fix = RemoveJsonPropertyFix::new("/text", &pointers, false).unwrap();

    let messages = vec![
        LintMessage::new("no-deprecated-property", ScriptPosition::new(1, 16))
            .with_fix(Box::new(fix)),
    ];
    let patched = autofix_document(content, StructuralEvents::Json, messages)
        .unwrap()
        .unwrap();
    assert_eq!(patched, r#"{"before":true}"#);
    serde_json::from_str::<serde_json::Value>(&patched).unwrap();
}

#[test]
fn remove_json_property_collapses_empty_parent() {
    let content = r#"{"settings":{"text":"Hello World"}}"#;
    let pointers = build_pointer_map(content).unwrap();
    let fix = RemoveJsonPropertyFix::new("/settings/text", &pointers, true).unwrap();

    let messages = vec![
        LintMessage::new("no-deprecated-property", ScriptPosition::new(1, 14))
            .with_fix(Box::new(fix)),
    ];
    let patched = autofix_document(content, StructuralEvents::Json, messages)
        .unwrap()
        .unwrap();
    assert_eq!(patched, "{}");
    serde_json::from_str::<serde_json::Value>(&patched).unwrap();
}

#[test]
fn rename_single_character_valueless_attribute() {
    let content = "<script keep=\"me\" ,>";
    let tag = &open_tags(content)[0];
    let fix = uifix::RenameAttributeFix::new(&tag.attributes[1], "i-was-renamed");

    let changes = generate_changes_markup(content, scan(content), vec![Box::new(fix)]);
    let patched = apply_change_set(content, changes).unwrap();
    assert_eq!(patched, "<script keep=\"me\" i-was-renamed>");
    assert!(!patched.contains(','));
}

#[test]
fn conflicting_fixes_leave_exactly_one_change_batch() {
    let content = r#"<script legacy="x">"#;
    let tag = &open_tags(content)[0];
    let remove = RemoveAttributeFix::new(tag, 0).unwrap();
    let rename = uifix::RenameAttributeFix::new(&tag.attributes[0], "modern");

    let changes = generate_changes_markup(
        content,
        scan(content),
        vec![Box::new(remove), Box::new(rename)],
    );
    // Exactly one fix survives; its single delete removes the attribute.
    assert_eq!(changes.len(), 1);
    let patched = apply_change_set(content, changes).unwrap();
    assert_eq!(patched, "<script>");
}

#[test]
fn qualify_handler_against_controller_metadata() {
    let content = "<core:View controllerName=\"app.Main\">\n\t<Button press=\"onPress\"/>\n</core:View>";

    let mut index = ScriptMetadataIndex::new();
    index.record_controller(
        "app.Main",
        "webapp/controller/Main.controller.js",
        ["onPress"],
    );

    // The rule layer located the handler attribute at line 2, column 10
    // (1-based), and the fix verifies the method before the scan.
    let mut fix = QualifyHandlerFix::new("onPress", "app.Main", Some(ScriptPosition::new(2, 10)));
    fix.verify_handler(&index, "webapp/view/Main.view.xml");

    let changes = generate_changes_markup(content, scan(content), vec![Box::new(fix)]);
    let patched = apply_change_set(content, changes).unwrap();
    assert_eq!(
        patched,
        "<core:View controllerName=\"app.Main\">\n\t<Button press=\".onPress\"/>\n</core:View>"
    );
}

#[test]
fn discovery_order_does_not_change_the_result() {
    let content = "<script a=\"1\" b=\"2\" c=\"3\">";
    let tag = &open_tags(content)[0];

    let forward: Vec<Box<dyn Fix>> = vec![
        Box::new(RemoveAttributeFix::new(tag, 0).unwrap()),
        Box::new(RemoveAttributeFix::new(tag, 2).unwrap()),
    ];
    let backward: Vec<Box<dyn Fix>> = vec![
        Box::new(RemoveAttributeFix::new(tag, 2).unwrap()),
        Box::new(RemoveAttributeFix::new(tag, 0).unwrap()),
    ];

    let first = apply_change_set(
        content,
        generate_changes_markup(content, scan(content), forward),
    )
    .unwrap();
    let second = apply_change_set(
        content,
        generate_changes_markup(content, scan(content), backward),
    )
    .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "<script b=\"2\">");
}
