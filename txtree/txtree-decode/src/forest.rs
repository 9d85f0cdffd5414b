//! Forest validation over the decoded node table.

use crate::TocNode;
use crate::error::{DecodeError, DecodeResult};

/// Check that every root spans a tree.
///
/// Walks each root's subtree and fails if any node is reached twice, which
/// covers both cycles and nodes with two parents. Different roots may share
/// nodes; an archive with a single record can point all five roots at it.
///
/// # Errors
///
/// Returns an error if a root or child index is outside the node table, or
/// a node is reachable more than once from the same root.
pub fn validate_forest(roots: &[u32], nodes: &[TocNode]) -> DecodeResult<()> {
    let len = u32::try_from(nodes.len()).unwrap_or(u32::MAX);
    let mut seen = vec![false; nodes.len()];
    let mut stack = Vec::new();

    for (slot, &root) in roots.iter().enumerate() {
        // Identical roots span identical subtrees.
        if roots[..slot].contains(&root) {
            continue;
        }

        seen.fill(false);
        stack.clear();
        stack.push(root);

        while let Some(index) = stack.pop() {
            let node = nodes
                .get(index as usize)
                .ok_or(DecodeError::IndexOutOfBounds {
                    context: "tree node",
                    index,
                    len,
                })?;

            let visited = &mut seen[index as usize];
            if *visited {
                return Err(DecodeError::NotAForest { root, index });
            }
            *visited = true;

            stack.extend(node.child_indices());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(children: [Option<u32>; 4]) -> TocNode {
        TocNode {
            position: 0,
            compressed_length: 1,
            decompressed_size: 1,
            children,
            reserved: 0,
        }
    }

    #[test]
    fn test_valid_forest() {
        let nodes = [
            node([Some(1), None, None, Some(2)]),
            node([None; 4]),
            node([Some(3), None, None, None]),
            node([None; 4]),
            node([None; 4]),
        ];
        assert!(validate_forest(&[0, 0, 4, 0, 4], &nodes).is_ok());
    }

    #[test]
    fn test_single_node_shared_by_all_roots() {
        assert!(validate_forest(&[0; 5], &[node([None; 4])]).is_ok());
    }

    #[test]
    fn test_roots_may_share_subtrees() {
        // Root 2 is also a child of root 0.
        let nodes = [
            node([None, Some(1), None, None]),
            node([None; 4]),
            node([None; 4]),
        ];
        assert!(validate_forest(&[0, 1, 2, 1, 0], &nodes).is_ok());
    }

    #[test]
    fn test_cycle() {
        let nodes = [
            node([Some(1), None, None, None]),
            node([None, None, Some(0), None]),
        ];
        assert_eq!(
            validate_forest(&[0; 5], &nodes),
            Err(DecodeError::NotAForest { root: 0, index: 0 })
        );
    }

    #[test]
    fn test_self_loop() {
        let nodes = [node([None; 4]), node([None, Some(1), None, None])];
        assert_eq!(
            validate_forest(&[0, 0, 0, 0, 1], &nodes),
            Err(DecodeError::NotAForest { root: 1, index: 1 })
        );
    }

    #[test]
    fn test_two_parents() {
        let nodes = [
            node([Some(1), Some(2), None, None]),
            node([Some(3), None, None, None]),
            node([None, Some(3), None, None]),
            node([None; 4]),
        ];
        assert_eq!(
            validate_forest(&[0; 5], &nodes),
            Err(DecodeError::NotAForest { root: 0, index: 3 })
        );
    }

    #[test]
    fn test_child_outside_table() {
        let nodes = [node([None, None, None, Some(9)])];
        assert_eq!(
            validate_forest(&[0; 5], &nodes),
            Err(DecodeError::IndexOutOfBounds {
                context: "tree node",
                index: 9,
                len: 1
            })
        );
    }
}
