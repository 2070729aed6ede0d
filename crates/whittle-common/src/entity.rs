use std::ops::{Index, IndexMut};

use crate::text::{SourceText, Text};
use crate::token::TokenKind;

/// Handle to an entity inside a [`Tree`].
///
/// Ids are plain arena indices. They are non-owning, so `dependencies`
/// edges between entities can never form ownership cycles, and they stay
/// valid for the life of the tree (entities detached by post-processing
/// remain in the arena, merely unreferenced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

impl EntityId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the splitter's output tree: a labelled slice of source with
/// ordered children.
///
/// Serialised form is `head ++ children… ++ tail`. A `token` of `None`
/// marks a synthetic entity introduced by grouping rather than by a
/// terminal token.
#[derive(Debug, Clone, Default)]
pub struct EntityData {
    /// Text before the children (`{`, or the whole text of a leaf).
    pub head: Text,
    pub children: Vec<EntityId>,
    /// Text after the children (`}`, `;`, a binary operator).
    pub tail: Text,
    /// Relative `/`-separated path; set on file-root entities only.
    pub filename: Option<String>,
    /// The parsed text of the file; retained on file roots only.
    pub contents: Option<SourceText>,
    /// The lexical token that produced this entity, if any.
    pub token: Option<TokenKind>,
    /// Marks an entity wrapping a brace-paired statement.
    pub is_pair: bool,
    /// Forbids removal of this entity itself; children may still go.
    pub no_remove: bool,
    /// Reducer-owned: whether the reducer currently considers this gone.
    pub removed: bool,
    /// Entities whose removal must imply this one's removal.
    pub dependencies: Vec<EntityId>,
    /// Reducer-owned progress field.
    pub id: u32,
    /// Reducer-owned: size of this subtree, see [`Tree::refresh_descendants`].
    pub descendants: usize,
}

impl EntityData {
    /// A synthetic grouping entity: no token, no text of its own.
    pub fn synthetic() -> Self {
        Self::default()
    }

    /// An entity produced by the given lexical token.
    pub fn from_token(token: TokenKind) -> Self {
        Self {
            token: Some(token),
            ..Self::default()
        }
    }

    pub fn with_head(mut self, head: Text) -> Self {
        self.head = head;
        self
    }

    pub fn with_tail(mut self, tail: Text) -> Self {
        self.tail = tail;
        self
    }

    /// Synthetic iff grouping-made: no token behind it.
    pub fn is_synthetic(&self) -> bool {
        self.token.is_none()
    }
}

/// Arena holding every entity of one splitter run, plus the root handle.
///
/// A tree may hold a single file or a whole directory (file roots as
/// children of a synthetic directory root). All structural rewriting done
/// by the post-processing passes goes through `&mut Tree`.
#[derive(Debug)]
pub struct Tree {
    entities: Vec<EntityData>,
    root: EntityId,
}

impl Tree {
    /// Create a tree containing just a synthetic root.
    pub fn new() -> Self {
        let mut tree = Self {
            entities: Vec::new(),
            root: EntityId(0),
        };
        tree.root = tree.alloc(EntityData::synthetic());
        tree
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Add an entity to the arena and return its handle.
    pub fn alloc(&mut self, data: EntityData) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(data);
        id
    }

    /// Number of entities ever allocated (including detached ones).
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The in-order text of the subtree at `id`, skipping removed entities.
    pub fn reassemble_from(&self, id: EntityId) -> String {
        let mut out = String::new();
        self.write_entity(id, &mut out);
        out
    }

    /// The in-order text of the whole tree.
    pub fn reassemble(&self) -> String {
        self.reassemble_from(self.root)
    }

    fn write_entity(&self, id: EntityId, out: &mut String) {
        let entity = &self[id];
        if entity.removed {
            return;
        }
        out.push_str(entity.head.as_str());
        for &child in &entity.children {
            self.write_entity(child, out);
        }
        out.push_str(entity.tail.as_str());
    }

    /// Diagnostic label: `"Pair"` for pair wrappers, the operator text for
    /// token-bearing entities, empty otherwise.
    pub fn label(&self, id: EntityId) -> &'static str {
        let entity = &self[id];
        if entity.is_pair {
            "Pair"
        } else {
            entity.token.and_then(TokenKind::text).unwrap_or("")
        }
    }

    /// Recompute every entity's `descendants` count (subtree size counting
    /// the entity itself). Returns the root's count.
    pub fn refresh_descendants(&mut self) -> usize {
        fn count(tree: &mut Tree, id: EntityId) -> usize {
            let children = tree[id].children.clone();
            let mut total = 1;
            for child in children {
                total += count(tree, child);
            }
            tree[id].descendants = total;
            total
        }
        let root = self.root;
        count(self, root)
    }

    /// Every id reachable from `id`, preorder. Used by invariant checks.
    pub fn descendant_ids(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self[next].children.iter().rev().copied());
        }
        out
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<EntityId> for Tree {
    type Output = EntityData;

    fn index(&self, id: EntityId) -> &EntityData {
        &self.entities[id.index()]
    }
}

impl IndexMut<EntityId> for Tree {
    fn index_mut(&mut self, id: EntityId) -> &mut EntityData {
        &mut self.entities[id.index()]
    }
}
