//! Tree builder for the whittle splitter.
//!
//! Takes the token stream from `whittle-lexer` and produces the entity
//! tree the reducer consumes: [`parser`] builds the raw tree with a
//! priority-layer queue, [`passes`] refines it into idiomatic statement
//! units, [`cluster`] rebalances wide fan-outs for binary-search removal,
//! and [`words`] is the alternative word-level pipeline.

pub mod cluster;
pub mod debug;
pub mod parser;
pub mod passes;
pub mod words;

pub use cluster::{optimize, BIN_SIZE};
pub use debug::debug_tree;
pub use parser::{parse_source, parse_source_into};
pub use passes::post_process;
pub use words::{parse_to_words, parse_to_words_into, parse_to_words_lang, parse_to_words_lang_into};

use whittle_common::entity::Tree;

/// Parse D source and run the full post-processing pipeline.
///
/// Equivalent to [`parse_source`] followed by [`post_process`] on the
/// root; the common case for callers that want the refined tree.
pub fn parse(text: &str) -> Tree {
    let mut tree = parse_source(text);
    let root = tree.root();
    post_process(&mut tree, root);
    tree
}
