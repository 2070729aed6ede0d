//! Priority-layer scope parser.
//!
//! Turns the flat token stream into a raw entity tree without a grammar.
//! The parser keeps one queue of accumulated entities per precedence row
//! (plus a `text` level at the bottom and a `zero` sentinel at the top).
//! When a separator token of row `n` arrives, every finer level is drained
//! and grouped under it, so low-priority separators naturally become
//! ancestors of high-priority ones: removing a `;`-delimited statement
//! yields a coherent source range, and removing an operand of `||` leaves
//! the surrounding expression structure intact.

use whittle_common::entity::{EntityData, EntityId, Tree};
use whittle_common::span::Span;
use whittle_common::text::SourceText;
use whittle_common::token::{SeparatorKind, TokenKind, SEPARATOR_ROWS};
use whittle_lexer::Lexer;

/// Queue index of the sentinel level above all separator rows.
const ZERO_LEVEL: usize = 0;
/// Queue index of the text level below all separator rows.
const TEXT_LEVEL: usize = SEPARATOR_ROWS + 1;
/// Total number of level queues.
const LEVEL_COUNT: usize = SEPARATOR_ROWS + 2;

/// Queue index for a precedence row.
fn row_level(row: usize) -> usize {
    row + 1
}

/// Parse D source into a fresh tree.
///
/// The root carries the parsed text as its `contents`; its children are
/// the raw top-level entities. Run [`crate::passes::post_process`] on the
/// root to refine the tree.
pub fn parse_source(text: &str) -> Tree {
    let source = SourceText::new(text);
    let mut tree = Tree::new();
    let root = tree.root();
    tree[root].contents = Some(source.clone());
    parse_source_into(&mut tree, root, &source);
    tree
}

/// Parse `source` and attach the resulting entities under `parent`.
pub fn parse_source_into(tree: &mut Tree, parent: EntityId, source: &SourceText) {
    let mut parser = ScopeParser {
        lexer: Lexer::new(source.as_str()),
        source: source.clone(),
    };
    parser.parse_scope(tree, parent, None);
}

struct ScopeParser<'src> {
    lexer: Lexer<'src>,
    source: SourceText,
}

impl ScopeParser<'_> {
    /// Build `result`'s children from the token stream, stopping at the
    /// token matching `scope_end` (whose span becomes `result`'s tail) or
    /// at end of input (tail stays empty -- unmatched closers are not an
    /// error here).
    fn parse_scope(&mut self, tree: &mut Tree, result: EntityId, scope_end: Option<TokenKind>) {
        let mut queues: Vec<Vec<EntityId>> = vec![Vec::new(); LEVEL_COUNT];
        loop {
            let (kind, span) = self.lexer.read_token();
            if kind == TokenKind::End {
                // Trivia consumed while looking for a token that never
                // came still has to round-trip; park it as a text leaf.
                if !span.is_empty() {
                    let leaf = EntityData::from_token(TokenKind::Other)
                        .with_head(self.source.slice(span));
                    let id = tree.alloc(leaf);
                    queues[TEXT_LEVEL].push(id);
                }
                break;
            }
            if Some(kind) == scope_end {
                tree[result].tail = self.source.slice(span);
                break;
            }
            self.handle_token(tree, &mut queues, kind, span);
        }
        tree[result].children = terminate_level(tree, &mut queues, ZERO_LEVEL);
    }

    fn handle_token(
        &mut self,
        tree: &mut Tree,
        queues: &mut [Vec<EntityId>],
        kind: TokenKind,
        span: Span,
    ) {
        let mut level = TEXT_LEVEL;
        let mut children = Vec::new();
        if let Some(row) = kind.precedence_row() {
            level = row_level(row);
            children = terminate_level(tree, queues, level);
        }

        match kind.separator() {
            SeparatorKind::Prefix | SeparatorKind::Pair => {
                let is_pair_token = kind.separator() == SeparatorKind::Pair;
                if children.is_empty() {
                    let entity = EntityData::from_token(kind).with_head(self.source.slice(span));
                    let id = tree.alloc(entity);
                    if is_pair_token {
                        self.parse_scope(tree, id, kind.matching_closer());
                    }
                    queues[level].push(id);
                } else {
                    // The drained entities become an anonymous container,
                    // and the separator itself follows as a second entity.
                    let mut container = EntityData::synthetic();
                    container.children = children;
                    let container = tree.alloc(container);
                    let after = EntityData::from_token(kind).with_head(self.source.slice(span));
                    let after = tree.alloc(after);
                    if is_pair_token {
                        self.parse_scope(tree, after, kind.matching_closer());
                    }
                    queues[level].push(container);
                    queues[level].push(after);
                }
            }
            SeparatorKind::Postfix | SeparatorKind::Binary => {
                let mut entity = EntityData::from_token(kind).with_tail(self.source.slice(span));
                entity.children = children;
                let id = tree.alloc(entity);
                queues[level].push(id);
            }
            SeparatorKind::None => {
                debug_assert!(children.is_empty(), "non-separator drained a level");
                let entity = EntityData::from_token(kind).with_head(self.source.slice(span));
                let id = tree.alloc(entity);
                queues[TEXT_LEVEL].push(id);
            }
        }
    }
}

/// Drain every queue finer than `level`, grouping as we go.
///
/// Returns the immediate finer queue's entities followed by one group of
/// everything finer still; all drained queues are left empty.
fn terminate_level(tree: &mut Tree, queues: &mut [Vec<EntityId>], level: usize) -> Vec<EntityId> {
    if level + 1 >= queues.len() {
        return Vec::new();
    }
    let mut items = std::mem::take(&mut queues[level + 1]);
    let deeper = terminate_level(tree, queues, level + 1);
    items.extend(group(tree, deeper));
    items
}

/// Wrap two or more entities in a synthetic group; fewer pass through.
pub(crate) fn group(tree: &mut Tree, items: Vec<EntityId>) -> Vec<EntityId> {
    if items.len() <= 1 {
        return items;
    }
    let mut grouped = EntityData::synthetic();
    grouped.children = items;
    vec![tree.alloc(grouped)]
}

/// Like [`group`], but always yields exactly one entity.
///
/// Callers that need a single node (pair halves, dependency targets) use
/// this; a singleton list contributes its one entity unwrapped.
pub(crate) fn group_to_one(tree: &mut Tree, items: Vec<EntityId>) -> Option<EntityId> {
    match items.len() {
        0 => None,
        1 => Some(items[0]),
        _ => Some(group(tree, items)[0]),
    }
}
