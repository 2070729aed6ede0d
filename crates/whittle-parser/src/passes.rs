//! Post-processing passes over the raw entity tree.
//!
//! The scope parser produces a structurally sound but noisy tree. These
//! passes promote idiomatic constructs to first-class entities so the
//! reducer gets better removal candidates: statements collapse to single
//! nodes, binary operators gain dependency links to their detached
//! operands, keyword statements pair up with their bodies, and `if`/`else`,
//! `do`/`while`, `try`/`catch`/`finally` clauses merge into one node.
//!
//! The pipeline is idempotent: running it over an already-processed tree
//! changes nothing. Rewrites that would wrap the entire child list of a
//! plain synthetic group are skipped for exactly that reason -- the parent
//! already is that group.

use whittle_common::entity::{EntityData, EntityId, Tree};
use whittle_common::token::{SeparatorKind, TokenKind};

use crate::parser::{group, group_to_one};

/// Refine the subtree under `id`, children first.
pub fn post_process(tree: &mut Tree, id: EntityId) {
    let children = tree[id].children.clone();
    for child in children {
        post_process(tree, child);
    }

    let mut items = std::mem::take(&mut tree[id].children);
    // A plain synthetic parent already groups its children; whole-list
    // rewrites below it would just nest it inside a copy of itself.
    let entity = &tree[id];
    let guard = entity.is_synthetic()
        && entity.head.is_empty()
        && entity.tail.is_empty()
        && entity.contents.is_none()
        && entity.filename.is_none();

    simplify(tree, &mut items);
    link_dependencies(tree, &mut items);
    form_pairs(tree, &mut items, guard);
    group_block_keywords(tree, &mut items, guard);
    group_block_statements(tree, &mut items, guard);
    tree[id].children = items;
}

/// Drop empty synthetic entities, inline single-child ones, and flatten a
/// postfix separator's lone leaf operand into its head. Runs to fixed
/// point over the list.
fn simplify(tree: &mut Tree, items: &mut Vec<EntityId>) {
    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < items.len() {
            let id = items[i];
            let entity = &tree[id];
            let plain = entity.is_synthetic()
                && entity.head.is_empty()
                && entity.tail.is_empty()
                && entity.dependencies.is_empty()
                && !entity.is_pair
                && !entity.no_remove;

            if plain && entity.children.is_empty() {
                items.remove(i);
                changed = true;
                continue;
            }
            if plain && entity.children.len() == 1 {
                items[i] = tree[id].children[0];
                changed = true;
                continue;
            }

            // `a;` wants to be one entity, head `a` and tail `;`, not a
            // statement wrapping a one-word operand. Binary separators
            // keep their operand children: the dependency pass needs them.
            if entity.head.is_empty() && entity.children.len() == 1 {
                if let Some(token) = entity.token {
                    if token.separator() == SeparatorKind::Postfix {
                        let child = entity.children[0];
                        let child_data = &tree[child];
                        if child_data.children.is_empty()
                            && child_data.tail.is_empty()
                            && child_data.dependencies.is_empty()
                            && !child_data.is_pair
                            && !child_data.no_remove
                        {
                            let head = child_data.head.clone();
                            tree[id].head = head;
                            tree[id].children.clear();
                            changed = true;
                            continue;
                        }
                    }
                }
            }

            i += 1;
        }
    }
}

/// Link binary separators to their right-hand operands.
///
/// The median binary separator `e` splits the list: everything left of it
/// plus its own (detached) operand children become one group with `e` at
/// the end, everything right of it becomes the tail. One dependency edge
/// `e -> tail` is recorded: the tail's removal must drag the operator
/// with it. The left side needs no edge, `e` lives inside that group.
fn link_dependencies(tree: &mut Tree, items: &mut Vec<EntityId>) {
    loop {
        if items.len() < 2 {
            break;
        }
        let points: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|&(_, &id)| {
                let entity = &tree[id];
                entity
                    .token
                    .is_some_and(|t| t.separator() == SeparatorKind::Binary)
                    && !entity.children.is_empty()
            })
            .map(|(i, _)| i)
            .collect();
        let Some(&median) = points.get(points.len() / 2) else {
            break;
        };

        let separator = items[median];
        let operands = std::mem::take(&mut tree[separator].children);
        let mut head_items = items[..median].to_vec();
        head_items.extend(group(tree, operands));
        head_items.push(separator);
        let head = group_to_one(tree, head_items).expect("head contains the separator");
        let tail = group_to_one(tree, items[median + 1..].to_vec());

        let mut rewritten = vec![head];
        if let Some(tail) = tail {
            tree[separator].dependencies.push(tail);
            rewritten.push(tail);
        }
        *items = rewritten;

        // The rewrite built new sibling lists; give them the same
        // treatment before re-examining this level.
        for new_id in [Some(head), tail].into_iter().flatten() {
            let mut kids = std::mem::take(&mut tree[new_id].children);
            link_dependencies(tree, &mut kids);
            tree[new_id].children = kids;
        }
    }
}

/// Pair a brace block with whatever precedes it back to the last pair or
/// statement boundary. This discovers natural `signature { body }` shapes
/// (declarations, function bodies) without syntactic knowledge.
fn form_pairs(tree: &mut Tree, items: &mut Vec<EntityId>, guard: bool) {
    let mut last_pair = 0;
    let mut i = 0;
    while i < items.len() {
        match tree[items[i]].token {
            Some(TokenKind::LBrace) => {
                let whole_list = last_pair == 0 && i + 1 == items.len();
                if i >= last_pair + 1 && !(guard && whole_list) {
                    let signature = group_to_one(tree, items[last_pair..i].to_vec())
                        .expect("at least one item before the brace");
                    let pair = tree.alloc(EntityData {
                        children: vec![signature, items[i]],
                        is_pair: true,
                        ..EntityData::synthetic()
                    });
                    items.splice(last_pair..=i, [pair]);
                    i = last_pair + 1;
                    last_pair = i;
                } else {
                    last_pair = i + 1;
                    i += 1;
                }
            }
            Some(TokenKind::Semicolon) => {
                last_pair = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
}

/// Group a block keyword with its optional `(...)` argument and the item
/// that follows (the `;` statement or `{` block), making the keyword a
/// pair with its body.
fn group_block_keywords(tree: &mut Tree, items: &mut Vec<EntityId>, guard: bool) {
    let mut i = 0;
    while i < items.len() {
        let is_keyword = tree[items[i]]
            .token
            .is_some_and(TokenKind::is_block_keyword);
        if is_keyword {
            let mut j = i + 1;
            if j < items.len() && tree[items[j]].token == Some(TokenKind::LParen) {
                j += 1;
            }
            j += 1;
            let whole_list = i == 0 && j == items.len();
            if j <= items.len() && !(guard && whole_list) {
                let keyword = group_to_one(tree, items[i..j - 1].to_vec())
                    .expect("at least the keyword itself");
                let body = items[j - 1];
                let pair = tree.alloc(EntityData {
                    children: vec![keyword, body],
                    is_pair: true,
                    ..EntityData::synthetic()
                });
                items.splice(i..j, [pair]);
            }
        }
        i += 1;
    }
}

/// First lexical token reachable in the subtree (the entity's own, or its
/// first child's, recursively).
fn first_token(tree: &Tree, id: EntityId) -> Option<TokenKind> {
    let entity = &tree[id];
    if entity.token.is_some() {
        return entity.token;
    }
    entity
        .children
        .first()
        .and_then(|&child| first_token(tree, child))
}

/// Whether `items[j]` is a keyword-led clause starting with `kind`: a
/// synthetic entity with exactly two children whose first child leads
/// with that token.
fn clause_matches(tree: &Tree, items: &[EntityId], j: usize, kind: TokenKind) -> bool {
    items.get(j).is_some_and(|&id| {
        let entity = &tree[id];
        entity.is_synthetic()
            && entity.children.len() == 2
            && first_token(tree, entity.children[0]) == Some(kind)
    })
}

/// Merge adjacent keyword-led clauses into one statement entity:
/// `if`/`else`, `do`/`while`, `try`/`catch`*/`finally`, and as a fallback
/// any slot followed by `in`/`out`/`body` contract clauses in any order.
fn group_block_statements(tree: &mut Tree, items: &mut Vec<EntityId>, guard: bool) {
    let mut i = 0;
    while i < items.len() {
        let mut j = i;
        if clause_matches(tree, items, j, TokenKind::If)
            || clause_matches(tree, items, j, TokenKind::StaticIf)
        {
            j += 1;
            if clause_matches(tree, items, j, TokenKind::Else) {
                j += 1;
            }
        } else if clause_matches(tree, items, j, TokenKind::Do) {
            j += 1;
            if clause_matches(tree, items, j, TokenKind::While) {
                j += 1;
            }
        } else if clause_matches(tree, items, j, TokenKind::Try) {
            j += 1;
            while clause_matches(tree, items, j, TokenKind::Catch) {
                j += 1;
            }
            if clause_matches(tree, items, j, TokenKind::Finally) {
                j += 1;
            }
        } else {
            j += 1;
            loop {
                if clause_matches(tree, items, j, TokenKind::In)
                    || clause_matches(tree, items, j, TokenKind::Out)
                    || clause_matches(tree, items, j, TokenKind::Body)
                {
                    j += 1;
                } else {
                    break;
                }
            }
        }

        let whole_list = i == 0 && j == items.len();
        if j > i + 1 && !(guard && whole_list) {
            let statement =
                group_to_one(tree, items[i..j].to_vec()).expect("grouping at least two items");
            items.splice(i..j, [statement]);
        }
        i += 1;
    }
}
