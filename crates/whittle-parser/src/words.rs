//! Word-level splitting, for identifier-level reduction.
//!
//! Two flavours: a plain scanner that cuts on alphanumeric transitions,
//! and a language-aware one driving the full D lexer so strings and
//! comments hold together as single units.

use whittle_common::entity::{EntityData, EntityId, Tree};
use whittle_common::span::Span;
use whittle_common::text::{SourceText, Text};
use whittle_common::token::is_word_byte;
use whittle_lexer::word_spans;

/// Split `text` into `(word, trailing-non-word)` leaf entities.
pub fn parse_to_words(text: &str) -> Tree {
    let source = SourceText::new(text);
    let mut tree = Tree::new();
    let root = tree.root();
    tree[root].contents = Some(source.clone());
    parse_to_words_into(&mut tree, root, &source);
    tree
}

/// Plain word split of `source`, attached under `parent`.
///
/// Each entity's head is a maximal run of word characters and its tail the
/// run of everything up to the next word. A leading non-word run yields a
/// headless first entity, so the leaves always concatenate back to the
/// input.
pub fn parse_to_words_into(tree: &mut Tree, parent: EntityId, source: &SourceText) {
    let bytes = source.as_str().as_bytes();
    let mut children = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && is_word_byte(bytes[i]) {
            i += 1;
        }
        let word_end = i;
        while i < bytes.len() && !is_word_byte(bytes[i]) {
            i += 1;
        }
        let entity = EntityData::synthetic()
            .with_head(source.slice(Span::new(start as u32, word_end as u32)))
            .with_tail(source.slice(Span::new(word_end as u32, i as u32)));
        children.push(tree.alloc(entity));
    }
    tree[parent].children = children;
}

/// Split `text` into words using the D lexer.
pub fn parse_to_words_lang(text: &str) -> Tree {
    let source = SourceText::new(text);
    let mut tree = Tree::new();
    let root = tree.root();
    tree[root].contents = Some(source.clone());
    parse_to_words_lang_into(&mut tree, root, &source);
    tree
}

/// Language-aware word split of `source`, attached under `parent`.
///
/// Word tokens become heads; runs of operators, whitespace, and comments
/// coalesce onto the previous word's tail, so a string or nested comment
/// is never split down the middle.
pub fn parse_to_words_lang_into(tree: &mut Tree, parent: EntityId, source: &SourceText) {
    let slice = |span: Option<Span>| span.map_or_else(Text::empty, |s| source.slice(s));
    let children = word_spans(source.as_str())
        .into_iter()
        .map(|word| {
            let entity = EntityData::synthetic()
                .with_head(slice(word.head))
                .with_tail(slice(word.tail));
            tree.alloc(entity)
        })
        .collect();
    tree[parent].children = children;
}
