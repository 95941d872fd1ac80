//! Deterministic merge of per-unit metadata trees.
//!
//! The merger consumes the trees produced by independently processed
//! compilation units and builds one namespace-rooted tree plus a flat
//! qualified-name index. Units complete in arbitrary order, so the merge
//! first sorts them by unit key; every collision then resolves
//! first-occurrence-wins deterministically.

use crate::item::{MetadataItem, ReferenceItem, UnitMetadata};
use quarry_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One entry in the flat qualified-name index.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The simple (unqualified) name of the item.
    pub name: String,
    /// The originating file, if known.
    pub source: Option<PathBuf>,
}

/// The result of merging all units of one target.
///
/// Owns the merged namespace tree, the flat index populated during the
/// merge pass, and the unioned references map. The index is consumed by
/// output generation for cross-reference resolution; it is a build
/// artifact, not ambient state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MergedMetadata {
    /// Merged root namespaces, sorted by name.
    pub namespaces: Vec<MetadataItem>,
    /// Dot-qualified name → index entry, for every namespace, type, and member.
    pub index: BTreeMap<String, IndexEntry>,
    /// Unioned symbol references from all units.
    pub references: BTreeMap<String, ReferenceItem>,
}

/// Merges the metadata trees of all units into one consistent tree.
///
/// Pass 1 unifies namespaces with equal names across units and unions
/// their children; a child name collision within a unified namespace keeps
/// the first occurrence and reports the discarded one. Pass 2 registers
/// every item in the flat index under its dot-qualified name, again
/// first-wins with a warning on collision. References merge first-wins
/// silently (ids are expected to be globally unique per symbol).
///
/// The result is independent of the order of `units`.
pub fn merge_units(mut units: Vec<UnitMetadata>, sink: &DiagnosticSink) -> MergedMetadata {
    units.sort_by(|a, b| a.unit.cmp(&b.unit));

    // Pass 1: namespace reconciliation.
    let mut namespaces: BTreeMap<String, MetadataItem> = BTreeMap::new();
    let mut references: BTreeMap<String, ReferenceItem> = BTreeMap::new();

    for unit in units {
        for ns in unit.namespaces {
            let merged = namespaces
                .entry(ns.name.clone())
                .or_insert_with(|| MetadataItem::namespace(ns.name.clone()));
            for child in ns.children {
                match merged.children.iter().find(|c| c.name == child.name) {
                    Some(kept) => report_collision(sink, &ns.name, &child, kept),
                    None => merged.children.push(child),
                }
            }
        }
        for (id, reference) in unit.references {
            references.entry(id).or_insert(reference);
        }
    }

    // Pass 2: flat qualified-name index.
    let mut index: BTreeMap<String, IndexEntry> = BTreeMap::new();
    for ns in namespaces.values() {
        register(ns, None, &mut index, sink);
    }

    MergedMetadata {
        namespaces: namespaces.into_values().collect(),
        index,
        references,
    }
}

/// Registers `item` and its descendants in the flat index.
fn register(
    item: &MetadataItem,
    parent: Option<&str>,
    index: &mut BTreeMap<String, IndexEntry>,
    sink: &DiagnosticSink,
) {
    let qualified = match parent {
        Some(parent) => format!("{parent}.{}", item.name),
        None => item.name.clone(),
    };

    match index.get(&qualified) {
        Some(kept) => {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Compile, 311),
                    format!("name '{qualified}' is already indexed; duplicate discarded"),
                )
                .with_source(item.source.clone().unwrap_or_default())
                .with_note(format!(
                    "kept entry from {}",
                    kept.source
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<unknown>".to_string())
                )),
            );
        }
        None => {
            index.insert(
                qualified.clone(),
                IndexEntry {
                    name: item.name.clone(),
                    source: item.source.clone(),
                },
            );
        }
    }

    for child in &item.children {
        register(child, Some(&qualified), index, sink);
    }
}

/// Reports a discarded duplicate child, naming both source paths.
fn report_collision(
    sink: &DiagnosticSink,
    namespace: &str,
    discarded: &MetadataItem,
    kept: &MetadataItem,
) {
    let describe = |item: &MetadataItem| {
        item.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string())
    };
    sink.emit(
        Diagnostic::warning(
            DiagnosticCode::new(Category::Compile, 310),
            format!(
                "duplicate item '{namespace}.{}' discarded (declared in {})",
                discarded.name,
                describe(discarded)
            ),
        )
        .with_source(discarded.source.clone().unwrap_or_default())
        .with_note(format!("kept declaration from {}", describe(kept))),
    );
}
