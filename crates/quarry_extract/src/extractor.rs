//! Syntactic C# metadata extraction via tree-sitter.
//!
//! The extractor walks each document's syntax tree and collects namespace,
//! type, and member declarations. Nested namespace declarations flatten to
//! dotted names; types declared outside any namespace land in the global
//! namespace. Within one unit, equal-named namespaces across documents are
//! unified and duplicate children collapse to the first occurrence, which
//! folds partial declarations into one item.

use std::collections::BTreeMap;
use std::path::Path;

use quarry_metadata::{
    ItemKind, MemberKind, MetadataItem, ReferenceItem, TypeKind, UnitMetadata,
};
use quarry_workspace::SourceLanguage;
use tree_sitter::{Node, Parser};

use crate::service::{CompileError, CompileRequest, CompilerService};

/// Name given to the namespace holding types declared outside any
/// namespace declaration.
const GLOBAL_NAMESPACE: &str = "Global";

/// Tree-sitter-based extractor for C# sources.
pub struct CSharpExtractor;

impl CompilerService for CSharpExtractor {
    fn compile(&self, request: &CompileRequest) -> Result<UnitMetadata, CompileError> {
        if request.language != SourceLanguage::CSharp {
            return Err(CompileError::Unsupported {
                language: request.language.tag().to_string(),
            });
        }

        let mut namespaces: BTreeMap<String, MetadataItem> = BTreeMap::new();
        for document in &request.documents {
            extract_document(document, &mut namespaces)?;
        }

        let mut unit = UnitMetadata::new(&request.unit);
        unit.namespaces = namespaces.into_values().collect();
        for ns in &unit.namespaces {
            register_references(ns, None, &mut unit.references);
        }
        Ok(unit)
    }
}

/// Parses one document and folds its declarations into the namespace map.
fn extract_document(
    path: &Path,
    namespaces: &mut BTreeMap<String, MetadataItem>,
) -> Result<(), CompileError> {
    let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
        .map_err(|e| CompileError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| CompileError::Parse {
            path: path.to_path_buf(),
            reason: "parser produced no tree".to_string(),
        })?;

    scan_node(tree.root_node(), source.as_bytes(), path, "", namespaces);
    Ok(())
}

/// Walks the tree collecting type declarations into their namespaces.
fn scan_node(
    node: Node<'_>,
    src: &[u8],
    file: &Path,
    namespace: &str,
    namespaces: &mut BTreeMap<String, MetadataItem>,
) {
    match node.kind() {
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            let Some(name) = field_text(node, "name", src) else {
                return;
            };
            let full = if namespace.is_empty() {
                name
            } else {
                format!("{namespace}.{name}")
            };
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                scan_node(child, src, file, &full, namespaces);
            }
        }
        kind if type_kind(kind).is_some() => {
            if let Some(item) = build_type(node, src, file) {
                let ns_name = if namespace.is_empty() {
                    GLOBAL_NAMESPACE
                } else {
                    namespace
                };
                let entry = namespaces
                    .entry(ns_name.to_string())
                    .or_insert_with(|| MetadataItem::namespace(ns_name));
                // Partial declarations collapse to the first occurrence.
                if !entry.children.iter().any(|c| c.name == item.name) {
                    entry.children.push(item);
                }
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                scan_node(child, src, file, namespace, namespaces);
            }
        }
    }
}

/// Maps a tree-sitter node kind to a type kind.
fn type_kind(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "struct_declaration" => Some(TypeKind::Struct),
        "interface_declaration" => Some(TypeKind::Interface),
        "enum_declaration" => Some(TypeKind::Enum),
        "record_declaration" => Some(TypeKind::Record),
        "delegate_declaration" => Some(TypeKind::Delegate),
        _ => None,
    }
}

/// Builds a type item with its members and nested types.
fn build_type(node: Node<'_>, src: &[u8], file: &Path) -> Option<MetadataItem> {
    let kind = type_kind(node.kind())?;
    let name = field_text(node, "name", src)?;
    let mut item = MetadataItem::new_type(name, kind, file);

    let Some(body) = node.child_by_field_name("body") else {
        return Some(item);
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "method_declaration" => {
                push_member(&mut item, member, MemberKind::Method, src, file);
            }
            "constructor_declaration" => {
                push_member(&mut item, member, MemberKind::Constructor, src, file);
            }
            "property_declaration" => {
                push_member(&mut item, member, MemberKind::Property, src, file);
            }
            "event_declaration" => {
                push_member(&mut item, member, MemberKind::Event, src, file);
            }
            "enum_member_declaration" => {
                push_member(&mut item, member, MemberKind::EnumMember, src, file);
            }
            "field_declaration" => {
                push_declarators(&mut item, member, MemberKind::Field, src, file);
            }
            "event_field_declaration" => {
                push_declarators(&mut item, member, MemberKind::Event, src, file);
            }
            kind if type_kind(kind).is_some() => {
                if let Some(nested) = build_type(member, src, file) {
                    item.children.push(nested);
                }
            }
            _ => {}
        }
    }
    Some(item)
}

/// Appends one named member to a type item.
fn push_member(
    item: &mut MetadataItem,
    node: Node<'_>,
    kind: MemberKind,
    src: &[u8],
    file: &Path,
) {
    let Some(name) = field_text(node, "name", src) else {
        return;
    };
    let mut member = MetadataItem::member(name, kind, file);
    if let ItemKind::Member { signature, .. } = &mut member.kind {
        *signature = signature_of(node, src);
    }
    item.children.push(member);
}

/// Appends one member per variable declarator (fields declare several
/// names in one declaration: `int a, b;`).
fn push_declarators(
    item: &mut MetadataItem,
    node: Node<'_>,
    kind: MemberKind,
    src: &[u8],
    file: &Path,
) {
    let mut names = Vec::new();
    collect_declarators(node, src, &mut names);
    for name in names {
        item.children.push(MetadataItem::member(name, kind, file));
    }
}

fn collect_declarators(node: Node<'_>, src: &[u8], names: &mut Vec<String>) {
    if node.kind() == "variable_declarator" {
        if let Some(name) = node.named_child(0).and_then(|n| node_text(n, src)) {
            names.push(name);
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_declarators(child, src, names);
    }
}

/// The declaration text up to its body, collapsed to one line.
fn signature_of(node: Node<'_>, src: &[u8]) -> Option<String> {
    let text = node.utf8_text(src).ok()?;
    let mut cut = text.len();
    for marker in ["{", ";", "=>"] {
        if let Some(pos) = text.find(marker) {
            cut = cut.min(pos);
        }
    }
    let signature = text[..cut].split_whitespace().collect::<Vec<_>>().join(" ");
    if signature.is_empty() {
        None
    } else {
        Some(signature)
    }
}

fn field_text(node: Node<'_>, field: &str, src: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| node_text(n, src))
}

fn node_text(node: Node<'_>, src: &[u8]) -> Option<String> {
    node.utf8_text(src).ok().map(|s| s.to_string())
}

/// Registers an item and its descendants in the unit's references map
/// under their dot-qualified ids.
fn register_references(
    item: &MetadataItem,
    parent: Option<&str>,
    references: &mut BTreeMap<String, ReferenceItem>,
) {
    let qualified = match parent {
        Some(parent) => format!("{parent}.{}", item.name),
        None => item.name.clone(),
    };
    references
        .entry(qualified.clone())
        .or_insert_with(|| ReferenceItem {
            id: qualified.clone(),
            name: item.name.clone(),
        });
    for child in &item.children {
        register_references(child, Some(&qualified), references);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn compile_sources(sources: &[(&str, &str)]) -> UnitMetadata {
        let dir = tempfile::tempdir().unwrap();
        let mut documents = Vec::new();
        for (name, content) in sources {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            documents.push(path);
        }
        CSharpExtractor
            .compile(&CompileRequest {
                unit: "test-unit".to_string(),
                language: SourceLanguage::CSharp,
                documents,
            })
            .unwrap()
    }

    fn find<'a>(items: &'a [MetadataItem], name: &str) -> &'a MetadataItem {
        items
            .iter()
            .find(|i| i.name == name)
            .unwrap_or_else(|| panic!("no item named {name}"))
    }

    #[test]
    fn extracts_namespace_type_and_members() {
        let unit = compile_sources(&[(
            "Widget.cs",
            r#"
namespace Acme.Widgets
{
    public class Widget
    {
        private int count;

        public Widget() { }

        public int Count { get; set; }

        public void Spin(int turns) { }
    }
}
"#,
        )]);

        assert_eq!(unit.namespaces.len(), 1);
        let ns = &unit.namespaces[0];
        assert_eq!(ns.name, "Acme.Widgets");

        let widget = find(&ns.children, "Widget");
        assert_eq!(widget.kind, ItemKind::Type { type_kind: TypeKind::Class });
        let names: Vec<&str> = widget.children.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"count"));
        assert!(names.contains(&"Widget"));
        assert!(names.contains(&"Count"));
        assert!(names.contains(&"Spin"));

        let spin = find(&widget.children, "Spin");
        match &spin.kind {
            ItemKind::Member { member_kind, signature } => {
                assert_eq!(*member_kind, MemberKind::Method);
                assert_eq!(signature.as_deref(), Some("public void Spin(int turns)"));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn file_scoped_namespace() {
        let unit = compile_sources(&[(
            "A.cs",
            "namespace Acme;\n\npublic interface IThing { void Go(); }\n",
        )]);
        assert_eq!(unit.namespaces[0].name, "Acme");
        let thing = find(&unit.namespaces[0].children, "IThing");
        assert_eq!(
            thing.kind,
            ItemKind::Type { type_kind: TypeKind::Interface }
        );
    }

    #[test]
    fn nested_namespaces_flatten_to_dotted_names() {
        let unit = compile_sources(&[(
            "A.cs",
            r#"
namespace Outer
{
    namespace Inner
    {
        public class Deep { }
    }
}
"#,
        )]);
        let names: Vec<&str> = unit.namespaces.iter().map(|n| n.name.as_str()).collect();
        assert!(names.contains(&"Outer.Inner"), "namespaces: {names:?}");
        let inner = find(&unit.namespaces, "Outer.Inner");
        assert_eq!(inner.children[0].name, "Deep");
    }

    #[test]
    fn global_types_use_global_namespace() {
        let unit = compile_sources(&[("A.cs", "public class Loose { }\n")]);
        assert_eq!(unit.namespaces[0].name, GLOBAL_NAMESPACE);
        assert_eq!(unit.namespaces[0].children[0].name, "Loose");
    }

    #[test]
    fn enum_members_extracted() {
        let unit = compile_sources(&[(
            "Color.cs",
            "namespace Acme { public enum Color { Red, Green, Blue } }\n",
        )]);
        let color = find(&unit.namespaces[0].children, "Color");
        assert_eq!(color.kind, ItemKind::Type { type_kind: TypeKind::Enum });
        assert_eq!(color.children.len(), 3);
        assert!(matches!(
            color.children[0].kind,
            ItemKind::Member { member_kind: MemberKind::EnumMember, .. }
        ));
    }

    #[test]
    fn partial_declarations_collapse_within_unit() {
        let unit = compile_sources(&[
            (
                "A.cs",
                "namespace Acme { public partial class Widget { public void One() { } } }\n",
            ),
            (
                "B.cs",
                "namespace Acme { public partial class Widget { public void Two() { } } }\n",
            ),
        ]);
        let acme = find(&unit.namespaces, "Acme");
        let widgets: Vec<_> = acme.children.iter().filter(|c| c.name == "Widget").collect();
        assert_eq!(widgets.len(), 1);
        // First occurrence wins; the second document's members are dropped.
        assert_eq!(widgets[0].children.len(), 1);
        assert_eq!(widgets[0].children[0].name, "One");
    }

    #[test]
    fn references_use_qualified_ids() {
        let unit = compile_sources(&[(
            "Widget.cs",
            "namespace Acme { public class Widget { public void Spin() { } } }\n",
        )]);
        assert!(unit.references.contains_key("Acme"));
        assert!(unit.references.contains_key("Acme.Widget"));
        assert!(unit.references.contains_key("Acme.Widget.Spin"));
        assert_eq!(unit.references["Acme.Widget"].name, "Widget");
    }

    #[test]
    fn unreadable_document_fails_unit() {
        let err = CSharpExtractor
            .compile(&CompileRequest {
                unit: "u".to_string(),
                language: SourceLanguage::CSharp,
                documents: vec![PathBuf::from("/nonexistent/Gone.cs")],
            })
            .unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }
}
