//! Bottom-up binary clustering of wide sibling lists.
//!
//! The reducer removes entities by binary search over sibling lists, so a
//! flat list of N children costs N probes while a balanced tree costs
//! log N. This pass bounds every entity's fan-out at [`BIN_SIZE`] by
//! repeatedly grouping contiguous runs of siblings into synthetic bins.

use whittle_common::entity::{EntityData, EntityId, Tree};

/// Maximum children per entity after [`optimize`].
pub const BIN_SIZE: usize = 2;

/// Rebalance the whole tree in place.
pub fn optimize(tree: &mut Tree) {
    let root = tree.root();
    optimize_entity(tree, root);
}

/// Rebalance the subtree under `id`, children first.
pub fn optimize_entity(tree: &mut Tree, id: EntityId) {
    let children = tree[id].children.clone();
    for child in children {
        optimize_entity(tree, child);
    }

    loop {
        let items = &tree[id].children;
        let len = items.len();
        if len <= BIN_SIZE {
            break;
        }
        // Near the bottom, split the remainder evenly instead of leaving
        // a lone straggler bin.
        let size = if len >= 2 * BIN_SIZE {
            BIN_SIZE
        } else {
            (len + 1).div_ceil(2)
        };

        let items = std::mem::take(&mut tree[id].children);
        let mut binned = Vec::with_capacity(items.len() / size + 1);
        for chunk in items.chunks(size) {
            if chunk.len() > 1 {
                let bin = tree.alloc(EntityData {
                    children: chunk.to_vec(),
                    ..EntityData::synthetic()
                });
                binned.push(bin);
            } else {
                binned.extend_from_slice(chunk);
            }
        }
        tree[id].children = binned;
    }
}
