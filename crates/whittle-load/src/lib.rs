//! Load files or directory trees into entity trees.
//!
//! This is the dispatch layer in front of the splitter pipelines: each
//! file's base name is matched against the parse rules (user rules first,
//! then the defaults), and the winning splitter turns its contents into
//! entities. A directory becomes a synthetic root whose children are the
//! file roots; a single file becomes the tree root itself.

pub mod error;
pub mod rules;

use std::fs;
use std::path::{Component, Path, PathBuf};

use whittle_common::entity::{EntityData, EntityId, Tree};
use whittle_common::text::SourceText;
use whittle_lexer::strip_comments;
use whittle_parser::{parse_source_into, parse_to_words_into, parse_to_words_lang_into, post_process};

pub use error::LoadError;
pub use rules::{default_rules, splitter_for, ParseRule, Splitter};

/// How D files are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Scope parser plus post-processing (statement-level entities).
    #[default]
    Source,
    /// Language-aware word splitting (identifier-level entities).
    Words,
}

/// Options recognised by [`load_files`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Elide comments from D files before tokenising.
    pub strip_comments: bool,
    /// User rules, searched before the defaults.
    pub rules: Vec<(String, Splitter)>,
    /// Splitter mode for D files.
    pub mode: LoadMode,
}

/// A loaded entity tree plus the adjusted input path.
#[derive(Debug)]
pub struct Load {
    /// For a single file, the input path with its extension stripped (the
    /// reducer uses it as the base name for output directories); for a
    /// directory, the path unchanged.
    pub path: PathBuf,
    pub tree: Tree,
}

/// Load `path` (a file or a directory) into an entity tree.
///
/// I/O failures and malformed user patterns are fatal; everything about
/// the file *contents* is not -- the splitters are total.
pub fn load_files(path: &Path, options: &LoadOptions) -> Result<Load, LoadError> {
    let mut rules = Vec::with_capacity(options.rules.len() + 3);
    for (pattern, splitter) in &options.rules {
        rules.push(ParseRule::new(pattern, *splitter)?);
    }
    rules.extend(default_rules());

    if path.is_dir() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree[root].no_remove = true;

        let mut files = Vec::new();
        collect_files(path, path, &mut files)?;
        files.sort();

        for relative in files {
            let text = read_text(&path.join(&relative))?;
            let file = tree.alloc(EntityData {
                filename: Some(slash_separated(&relative)),
                no_remove: true,
                ..EntityData::synthetic()
            });
            tree[root].children.push(file);
            split_file(&mut tree, file, &base_name(&relative), text, &rules, options);
        }
        Ok(Load {
            path: path.to_path_buf(),
            tree,
        })
    } else {
        let text = read_text(path)?;
        let mut tree = Tree::new();
        let root = tree.root();
        tree[root].filename = Some(base_name(path));
        tree[root].no_remove = true;
        split_file(&mut tree, root, &base_name(path), text, &rules, options);
        Ok(Load {
            path: path.with_extension(""),
            tree,
        })
    }
}

/// Split one file's contents under the `file` entity.
fn split_file(
    tree: &mut Tree,
    file: EntityId,
    base_name: &str,
    text: String,
    rules: &[ParseRule],
    options: &LoadOptions,
) {
    let mut splitter = splitter_for(rules, base_name);
    // Ddoc macro files carry a `.d` extension but are not D source.
    if splitter == Splitter::D && text.starts_with("Ddoc") {
        splitter = Splitter::Files;
    }

    match splitter {
        Splitter::Files => {
            let source = SourceText::new(text);
            tree[file].contents = Some(source.clone());
            if !source.is_empty() {
                let leaf = tree.alloc(EntityData::synthetic().with_head(source.whole()));
                tree[file].children.push(leaf);
            }
        }
        Splitter::Words => {
            let source = SourceText::new(text);
            tree[file].contents = Some(source.clone());
            parse_to_words_into(tree, file, &source);
        }
        Splitter::D => {
            let text = if options.strip_comments {
                strip_comments(&text)
            } else {
                text
            };
            let source = SourceText::new(text);
            tree[file].contents = Some(source.clone());
            match options.mode {
                LoadMode::Source => {
                    parse_source_into(tree, file, &source);
                    post_process(tree, file);
                }
                LoadMode::Words => parse_to_words_lang_into(tree, file, &source),
            }
        }
    }
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect every regular file under `dir`, as paths relative to `root`.
fn collect_files(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            collect_files(root, &entry_path, files)?;
        } else if entry_path.is_file() {
            let relative = entry_path.strip_prefix(root).unwrap_or(&entry_path);
            files.push(relative.to_path_buf());
        }
    }
    Ok(())
}

/// A relative path as a `/`-separated string, regardless of host OS.
fn slash_separated(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(os_str) => Some(os_str.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
