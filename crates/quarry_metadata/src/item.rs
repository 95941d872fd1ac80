//! The polymorphic metadata item tree produced by extraction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The kind of a type declaration.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A class declaration.
    Class,
    /// A struct declaration.
    Struct,
    /// An interface declaration.
    Interface,
    /// An enum declaration.
    Enum,
    /// A record declaration.
    Record,
    /// A delegate declaration.
    Delegate,
}

/// The kind of a member declaration.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// An ordinary method.
    Method,
    /// A constructor.
    Constructor,
    /// A property.
    Property,
    /// A field.
    Field,
    /// An event.
    Event,
    /// A named constant of an enum.
    EnumMember,
}

/// The variant-specific part of a [`MetadataItem`].
///
/// All variants share the common name/source/children shape carried by the
/// item itself; the kind adds what differs per variant.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ItemKind {
    /// A namespace. The name is fully dotted (`"Acme.Widgets"`).
    Namespace,
    /// A type declaration.
    Type {
        /// What kind of type this is.
        type_kind: TypeKind,
    },
    /// A member of a type.
    Member {
        /// What kind of member this is.
        member_kind: MemberKind,
        /// The declaration signature as written in source, if captured.
        signature: Option<String>,
    },
}

/// One node in the extracted metadata tree.
///
/// The `name` is the collision key within the parent. `source` records the
/// file the declaration came from; a merged namespace node spanning several
/// files carries no single source.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Declared name; for namespaces, the fully dotted name.
    pub name: String,
    /// The variant-specific kind of this item.
    #[serde(flatten)]
    pub kind: ItemKind,
    /// The originating file, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Child items in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MetadataItem>,
}

impl MetadataItem {
    /// Creates an empty namespace node.
    pub fn namespace(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Namespace,
            source: None,
            children: Vec::new(),
        }
    }

    /// Creates a type node.
    pub fn new_type(
        name: impl Into<String>,
        type_kind: TypeKind,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Type { type_kind },
            source: Some(source.into()),
            children: Vec::new(),
        }
    }

    /// Creates a member node.
    pub fn member(
        name: impl Into<String>,
        member_kind: MemberKind,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Member {
                member_kind,
                signature: None,
            },
            source: Some(source.into()),
            children: Vec::new(),
        }
    }

    /// Appends a child and returns `self`, for building trees in tests.
    pub fn with_child(mut self, child: MetadataItem) -> Self {
        self.children.push(child);
        self
    }
}

/// A cross-link target: one entry in a unit's references map.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ReferenceItem {
    /// The globally unique symbol id (dot-qualified name).
    pub id: String,
    /// The display name of the symbol.
    pub name: String,
}

/// The metadata tree produced by one compilation unit.
///
/// The root owns the namespace list and the references map used for
/// cross-linking at output time. Consumed once by the merger.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct UnitMetadata {
    /// The canonical key of the unit that produced this tree.
    pub unit: String,
    /// Root namespaces, one per distinct dotted namespace name.
    pub namespaces: Vec<MetadataItem>,
    /// Symbol id → reference, for cross-reference resolution.
    #[serde(default)]
    pub references: BTreeMap<String, ReferenceItem>,
}

impl UnitMetadata {
    /// Creates an empty tree for the given unit key.
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            namespaces: Vec::new(),
            references: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_small_tree() {
        let tree = MetadataItem::namespace("Acme").with_child(
            MetadataItem::new_type("Widget", TypeKind::Class, "src/Widget.cs")
                .with_child(MetadataItem::member("Spin", MemberKind::Method, "src/Widget.cs")),
        );
        assert_eq!(tree.kind, ItemKind::Namespace);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].children[0].name, "Spin");
    }

    #[test]
    fn serde_tags_variants() {
        let ty = MetadataItem::new_type("Widget", TypeKind::Class, "src/Widget.cs");
        let json = serde_json::to_string(&ty).unwrap();
        assert!(json.contains("\"item\":\"type\""));
        assert!(json.contains("\"type_kind\":\"class\""));

        let back: MetadataItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn namespace_has_no_source() {
        let ns = MetadataItem::namespace("Acme.Widgets");
        assert!(ns.source.is_none());
        let json = serde_json::to_string(&ns).unwrap();
        assert!(!json.contains("source"));
    }

    #[test]
    fn unit_roundtrip() {
        let mut unit = UnitMetadata::new("/work/p1.csproj");
        unit.namespaces.push(MetadataItem::namespace("Acme"));
        unit.references.insert(
            "Acme".to_string(),
            ReferenceItem {
                id: "Acme".to_string(),
                name: "Acme".to_string(),
            },
        );
        let json = serde_json::to_string(&unit).unwrap();
        let back: UnitMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unit);
    }
}
