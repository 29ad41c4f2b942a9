//! Link resolution between adjacent hierarchy levels
//!
//! Each L3 and L4 row carries a free-text column listing the parent-level
//! requirements it refines, one reference per line. Those references become
//! the node's outbound links; registering them records the inverse edge on
//! every parent that exists.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::{Level, RecordStore, TraceGraph};

/// Characters that end a line inside a spreadsheet cell
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Parses a multi-line link field into fully qualified target ids.
///
/// Lines are trimmed, blank lines dropped, and `prefix` is prepended to
/// every remaining token. Vertical tabs, form feeds, the ASCII record
/// separators and the Unicode line and paragraph separators all end a line.
/// An absent or empty field yields no links.
pub fn resolve(raw: Option<&str>, prefix: &str) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(is_line_break)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| format!("{}{}", prefix, token))
        .collect()
}

/// Registers `source_id` as a child on every target that exists in `targets`.
///
/// Missing targets are reported as dangling and skipped. A source already
/// present on a target is reported and appended again, so it counts twice.
/// Returns the number of edges registered.
pub fn register_links(
    source_id: &str,
    source_level: Level,
    target_ids: &[String],
    targets: &mut RecordStore,
    diagnostics: &mut Diagnostics,
) -> usize {
    let target_level = targets.level;
    let mut registered = 0;

    for target_id in target_ids {
        let Some(target) = targets.get_mut(target_id) else {
            diagnostics.push(Diagnostic::DanglingLink {
                source_level,
                source_id: source_id.to_string(),
                target_level,
                target_id: target_id.clone(),
            });
            continue;
        };

        // TODO: drop the repeat once downstream counts no longer rely on it
        if target.inbound_links.iter().any(|id| id == source_id) {
            diagnostics.push(Diagnostic::DuplicateLink {
                target_level,
                target_id: target_id.clone(),
                source_id: source_id.to_string(),
            });
        }
        target.inbound_links.push(source_id.to_string());
        registered += 1;
    }

    registered
}

/// Registers every outbound link of `sources` on `targets`, in source order
pub fn link_stores(
    sources: &RecordStore,
    targets: &mut RecordStore,
    diagnostics: &mut Diagnostics,
) -> usize {
    sources
        .in_order()
        .into_iter()
        .map(|node| {
            register_links(
                &node.id,
                sources.level,
                &node.outbound_links,
                targets,
                diagnostics,
            )
        })
        .sum()
}

/// Builds the inbound adjacency of the whole graph: L3 into L2, then L4 into L3
pub fn link_graph(graph: &mut TraceGraph, diagnostics: &mut Diagnostics) -> usize {
    let TraceGraph { l2, l3, l4 } = graph;
    let upper = link_stores(l3, l2, diagnostics);
    let lower = link_stores(l4, l3, diagnostics);
    log::info!(
        "Registered {} L3->L2 and {} L4->L3 links",
        upper,
        lower
    );
    upper + lower
}
