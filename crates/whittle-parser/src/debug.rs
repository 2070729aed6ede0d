//! Indented plain-text rendering of entity trees, for tests and
//! diagnostics.

use whittle_common::entity::{EntityId, Tree};

/// Render the whole tree, one entity per line, two-space indentation.
///
/// Each line shows the entity's role (its operator text, `pair`, or
/// `group`), then its head and tail texts and a dependency count when
/// present. The output is deterministic, which is what the snapshot
/// tests key on.
pub fn debug_tree(tree: &Tree) -> String {
    let mut out = String::new();
    render(tree, tree.root(), 0, &mut out);
    out
}

fn render(tree: &Tree, id: EntityId, depth: usize, out: &mut String) {
    let entity = &tree[id];
    for _ in 0..depth {
        out.push_str("  ");
    }

    if entity.is_pair {
        out.push_str("pair");
    } else if let Some(token) = entity.token {
        match token.text() {
            Some(text) => {
                out.push('`');
                out.push_str(text);
                out.push('`');
            }
            None => out.push_str("text"),
        }
    } else {
        out.push_str("group");
    }

    if let Some(filename) = &entity.filename {
        out.push_str(&format!(" file={filename}"));
    }
    if !entity.head.is_empty() {
        out.push_str(&format!(" head={:?}", entity.head.as_str()));
    }
    if !entity.tail.is_empty() {
        out.push_str(&format!(" tail={:?}", entity.tail.as_str()));
    }
    if !entity.dependencies.is_empty() {
        out.push_str(&format!(" deps={}", entity.dependencies.len()));
    }
    out.push('\n');

    for &child in &entity.children {
        render(tree, child, depth + 1, out);
    }
}
