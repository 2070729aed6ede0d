//! Filename-pattern dispatch: which splitter handles which file.

use globset::{GlobBuilder, GlobMatcher};

use crate::error::LoadError;

/// The splitter to run over a file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Splitter {
    /// The D pipeline: lexer plus scope parser (or word mode).
    D,
    /// Plain word splitting.
    Words,
    /// One opaque leaf holding the whole file.
    Files,
}

/// A compiled `(pattern, splitter)` rule.
///
/// Patterns are case-sensitive globs over the file's base name only:
/// `*` matches any sequence, `?` a single character, `[abc]` a class.
#[derive(Debug, Clone)]
pub struct ParseRule {
    matcher: GlobMatcher,
    pub splitter: Splitter,
}

impl ParseRule {
    pub fn new(pattern: &str, splitter: Splitter) -> Result<Self, LoadError> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|source| LoadError::BadPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            matcher: glob.compile_matcher(),
            splitter,
        })
    }

    pub fn matches(&self, base_name: &str) -> bool {
        self.matcher.is_match(base_name)
    }
}

/// The built-in fallback rules, searched after any user rules.
///
/// The final `*` rule guarantees every file matches something.
pub fn default_rules() -> Vec<ParseRule> {
    [("*.d", Splitter::D), ("*.di", Splitter::D), ("*", Splitter::Files)]
        .into_iter()
        .map(|(pattern, splitter)| {
            ParseRule::new(pattern, splitter).expect("built-in patterns compile")
        })
        .collect()
}

/// Pick the splitter for a base name: first matching rule wins.
pub fn splitter_for(rules: &[ParseRule], base_name: &str) -> Splitter {
    rules
        .iter()
        .find(|rule| rule.matches(base_name))
        .map(|rule| rule.splitter)
        .expect("the default `*` rule matches every name")
}
