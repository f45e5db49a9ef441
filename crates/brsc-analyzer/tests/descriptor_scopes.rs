//! Component scope tests: parent linking, script-import hygiene,
//! cross-component overrides, events, and editor services.

use brsc_analyzer::services;
use brsc_analyzer::{ProgramEvent, ProjectConfig, Program};
use brsc_ast::catalog::codes;
use brsc_ast::{Position, Range};
use std::cell::RefCell;
use std::rc::Rc;

fn program() -> Program {
    Program::new(ProjectConfig {
        root_dir: Some("/proj".into()),
        ..ProjectConfig::default()
    })
}

const PARENT_XML: &str = "<component name=\"ParentComp\">\n  <script type=\"text/brightscript\" uri=\"pkg:/source/util.brs\"/>\n</component>";
const CHILD_XML: &str = "<component name=\"ChildComp\" extends=\"ParentComp\">\n  <script type=\"text/brightscript\" uri=\"pkg:/source/util.brs\"/>\n</component>";

#[test]
fn test_descriptor_creates_component_scope() {
    let mut program = program();
    program
        .set_file("/proj/components/widget.xml", "<component name=\"Widget\"/>")
        .unwrap();
    let scope = program.get_scope("components/widget.xml").unwrap();
    assert!(matches!(
        scope.kind,
        brsc_analyzer::ScopeKind::Component { .. }
    ));
}

#[test]
fn test_duplicate_ancestor_script_import() {
    let mut program = program();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();
    program
        .set_file("/proj/components/parent.xml", PARENT_XML)
        .unwrap();
    program.set_file("/proj/components/child.xml", CHILD_XML).unwrap();

    let diagnostics = program.get_diagnostics();
    let duplicates: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.code == codes::DUPLICATE_ANCESTOR_SCRIPT_IMPORT)
        .collect();
    assert_eq!(duplicates.len(), 1, "got: {:?}", diagnostics);
    let warning = duplicates[0];
    // On the child's import range, naming the parent component
    assert!(warning.file.to_string_lossy().contains("child.xml"));
    assert_eq!(warning.range.start.line, 1);
    assert!(warning.message.contains("ParentComp"));
}

#[test]
fn test_missing_script_import() {
    let mut program = program();
    program
        .set_file(
            "/proj/components/widget.xml",
            "<component name=\"Widget\">\n  <script uri=\"pkg:/source/missing.brs\"/>\n</component>",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::REFERENCED_FILE_DOES_NOT_EXIST);
}

#[test]
fn test_empty_script_import() {
    let mut program = program();
    program
        .set_file(
            "/proj/components/widget.xml",
            "<component name=\"Widget\">\n  <script uri=\"\"/>\n</component>",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SCRIPT_SRC_CANNOT_BE_EMPTY);
}

#[test]
fn test_script_import_case_mismatch() {
    let mut program = program();
    program
        .set_file("/proj/source/Util.brs", "sub helper()\nend sub")
        .unwrap();
    program
        .set_file(
            "/proj/components/widget.xml",
            "<component name=\"Widget\">\n  <script uri=\"pkg:/source/util.brs\"/>\n</component>",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(diagnostics[0].code, codes::SCRIPT_IMPORT_CASE_MISMATCH);
    assert!(diagnostics[0].message.contains("source/util.brs"));
    assert!(diagnostics[0].message.contains("source/Util.brs"));
}

#[test]
fn test_override_info_across_component_scopes() {
    let mut program = program();
    program
        .set_file(
            "/proj/components/parent.brs",
            "function greet()\n    return 1\nend function",
        )
        .unwrap();
    program
        .set_file(
            "/proj/components/child.brs",
            "function greet()\n    return 2\nend function",
        )
        .unwrap();
    program
        .set_file(
            "/proj/components/parent.xml",
            "<component name=\"ParentComp\">\n  <script uri=\"pkg:/components/parent.brs\"/>\n</component>",
        )
        .unwrap();
    program
        .set_file(
            "/proj/components/child.xml",
            "<component name=\"ChildComp\" extends=\"ParentComp\">\n  <script uri=\"pkg:/components/child.brs\"/>\n</component>",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    let info = &diagnostics[0];
    assert_eq!(info.code, codes::OVERRIDES_ANCESTOR_FUNCTION);
    assert!(info.file.to_string_lossy().contains("child.brs"));
    assert_eq!(info.related.len(), 1);
    assert!(info.related[0]
        .location
        .path
        .to_string_lossy()
        .contains("parent.brs"));
}

#[test]
fn test_init_is_exempt_from_override_info() {
    let mut program = program();
    program
        .set_file("/proj/components/parent.brs", "sub init()\nend sub")
        .unwrap();
    program
        .set_file("/proj/components/child.brs", "sub init()\nend sub")
        .unwrap();
    program
        .set_file(
            "/proj/components/parent.xml",
            "<component name=\"ParentComp\">\n  <script uri=\"pkg:/components/parent.brs\"/>\n</component>",
        )
        .unwrap();
    program
        .set_file(
            "/proj/components/child.xml",
            "<component name=\"ChildComp\" extends=\"ParentComp\">\n  <script uri=\"pkg:/components/child.brs\"/>\n</component>",
        )
        .unwrap();

    assert!(program.get_diagnostics().is_empty());
}

#[test]
fn test_parent_attaches_when_added_later() {
    let mut program = program();
    program.set_file("/proj/components/child.xml", CHILD_XML).unwrap();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();

    let child = program
        .get_file("/proj/components/child.xml")
        .and_then(|f| f.as_descriptor())
        .unwrap();
    assert!(child.wants_parent());
    assert!(child.parent().is_none());

    program
        .set_file("/proj/components/parent.xml", PARENT_XML)
        .unwrap();
    let child = program
        .get_file("/proj/components/child.xml")
        .and_then(|f| f.as_descriptor())
        .unwrap();
    assert_eq!(
        child.parent().unwrap().to_string_lossy(),
        "/proj/components/parent.xml"
    );

    // Scope parent follows the descriptor link
    let scope = program.get_scope("components/child.xml").unwrap();
    assert_eq!(scope.parent_name(), Some("components/parent.xml"));
}

#[test]
fn test_parent_detaches_on_removal() {
    let mut program = program();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();
    program
        .set_file("/proj/components/parent.xml", PARENT_XML)
        .unwrap();
    program.set_file("/proj/components/child.xml", CHILD_XML).unwrap();

    program.remove_file("/proj/components/parent.xml");
    let child = program
        .get_file("/proj/components/child.xml")
        .and_then(|f| f.as_descriptor())
        .unwrap();
    assert!(child.parent().is_none());
    // Falls back to the platform parent
    let scope = program.get_scope("components/child.xml").unwrap();
    assert_eq!(scope.parent_name(), None);
}

#[test]
fn test_definition_on_extends_attribute() {
    let mut program = program();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();
    program
        .set_file("/proj/components/parent.xml", PARENT_XML)
        .unwrap();
    program.set_file("/proj/components/child.xml", CHILD_XML).unwrap();

    let child = program
        .get_file("/proj/components/child.xml")
        .and_then(|f| f.as_descriptor())
        .unwrap();
    let position = child.parent_name_range.start;

    let location = services::definition(&program, "/proj/components/child.xml", position).unwrap();
    assert_eq!(
        location.path.to_string_lossy(),
        "/proj/components/parent.xml"
    );
    assert_eq!(location.range, Range::zero());
}

#[test]
fn test_definition_on_call_site() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    helper()\nend sub",
        )
        .unwrap();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();

    let location =
        services::definition(&program, "/proj/source/main.brs", Position::new(1, 6)).unwrap();
    assert!(location.path.to_string_lossy().contains("util.brs"));
    assert_eq!(location.range, Range::of(0, 4, 0, 10));
}

#[test]
fn test_completions_in_scope() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    total = 1\n    helper()\nend sub\nsub helper()\nend sub",
        )
        .unwrap();

    let items = services::completions(&program, "/proj/source/main.brs", Position::new(2, 4));
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert!(labels.contains(&"helper"));
    assert!(labels.contains(&"main"));
    assert!(labels.contains(&"total"));
    // Platform catalog is included
    assert!(labels.contains(&"UCase"));
}

#[test]
fn test_completions_in_dotted_position_use_property_catalog() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    m.top.visible = true\nend sub",
        )
        .unwrap();

    // Inside "top" of m.top
    let items = services::completions(&program, "/proj/source/main.brs", Position::new(1, 7));
    assert!(!items.is_empty());
    assert!(items
        .iter()
        .all(|i| i.kind == services::CompletionKind::Property));
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert!(labels.contains(&"top"));
    assert!(labels.contains(&"visible"));
}

#[test]
fn test_events_fire_in_mutation_order() {
    let events: Rc<RefCell<Vec<ProgramEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let mut program = program();
    let sink = Rc::clone(&events);
    let handle = program.subscribe_events(move |event| sink.borrow_mut().push(event.clone()));

    program
        .set_file("/proj/components/widget.xml", "<component name=\"Widget\"/>")
        .unwrap();
    program.remove_file("/proj/components/widget.xml");
    program.unsubscribe_events(handle);

    let recorded = events.borrow();
    let scope_name = "components/widget.xml".to_string();
    let path = std::path::PathBuf::from("/proj/components/widget.xml");
    assert!(recorded.contains(&ProgramEvent::ScopeAdded(scope_name.clone())));
    assert!(recorded.contains(&ProgramEvent::FileAdded(path.clone())));
    assert!(recorded.contains(&ProgramEvent::ScopeRemoved(scope_name)));
    assert!(recorded.contains(&ProgramEvent::FileRemoved(path)));
}

#[test]
fn test_change_to_imported_file_invalidates_component_scope() {
    let mut program = program();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();
    program
        .set_file("/proj/components/parent.xml", PARENT_XML)
        .unwrap();
    let _ = program.get_diagnostics();
    assert!(program.get_scope("components/parent.xml").unwrap().is_validated());

    program
        .set_file("/proj/source/util.brs", "sub helper2()\nend sub")
        .unwrap();
    assert!(!program.get_scope("components/parent.xml").unwrap().is_validated());
}

#[test]
fn test_scopes_for_file_tracks_ancestor_imports() {
    let mut program = program();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();
    program
        .set_file("/proj/components/parent.xml", PARENT_XML)
        .unwrap();
    program
        .set_file(
            "/proj/components/child.xml",
            "<component name=\"ChildComp\" extends=\"ParentComp\"/>",
        )
        .unwrap();

    let scopes: Vec<&str> = program
        .scopes_for_file("/proj/source/util.brs")
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    // util.brs is under source/, imported by the parent, and visible to
    // the child through the resolved ancestor chain
    assert!(scopes.contains(&"source"));
    assert!(scopes.contains(&"components/parent.xml"));
    assert!(scopes.contains(&"components/child.xml"));
}
