use crate::tensor::{NodeId, Tensor};
use std::collections::HashSet;

/// Orders the computation graph reachable from `root` so that every node
/// comes before the inputs of its `grad_fn`.
///
/// Iterative depth-first post-order, reversed. Nodes are identified by the
/// address of their shared `TensorData`, so shallow clones collapse to one node.
pub(crate) fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut post_order: Vec<Tensor> = Vec::new();
    // (node, children already pushed)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            post_order.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let grad_fn = node.grad_fn();
        stack.push((node, true));
        if let Some(op) = grad_fn {
            for input in op.inputs() {
                if !visited.contains(&input.node_id()) {
                    stack.push((input, false));
                }
            }
        }
    }

    post_order.reverse();
    post_order
}
