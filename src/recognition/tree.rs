//! The recognition tree: every matrix state visited by the search.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. The
//! root is always `NodeId(0)`. After the search the tree is finalised once:
//! success counts are summed bottom-up and each node's children are sorted
//! by the `z` of their reduction step.

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Stable index of a node in its tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// The hypothesis `(x, y: z)α` that produced a node from its parent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReductionStep {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub alpha: f64,
}

impl fmt::Display for ReductionStep {
    /// `(x,y:z)alpha`, alpha printed with the formatter's precision (4 by default).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(4);
        write!(
            f,
            "({},{}:{}){:.*}",
            self.x, self.y, self.z, precision, self.alpha
        )
    }
}

/// Why a branch of the search was not expanded further.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The matrix violates the pseudometric axioms.
    NoPseudometric,
    /// The hypothesis implies a negative increment or pre-event distance.
    NegativeDelta,
    /// No hypothesis led to a valid smaller matrix.
    NoCandidate,
    /// Four items remain but they are not realisable by one event.
    SpikesTooShort,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPseudometric => "no pseudometric",
            Self::NegativeDelta => "negative delta/dxy",
            Self::NoCandidate => "no candidate",
            Self::SpikesTooShort => "spikes too short",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matrix state reached during the search.
#[derive(Clone, Debug)]
pub struct RecognitionNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    items: Vec<usize>,
    matrix: Option<Array2<f64>>,
    reduction_step: Option<ReductionStep>,
    success_count: usize,
    failure_reason: Option<FailureReason>,
}

impl RecognitionNode {
    pub(crate) fn new(
        items: Vec<usize>,
        matrix: Option<Array2<f64>>,
        reduction_step: Option<ReductionStep>,
    ) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            items,
            matrix,
            reduction_step,
            success_count: 0,
            failure_reason: None,
        }
    }

    pub(crate) fn fail(&mut self, reason: FailureReason) {
        self.failure_reason = Some(reason);
    }

    pub(crate) fn succeed(&mut self) {
        self.success_count = 1;
    }

    /// Number of items `n`.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Item labels of the matrix rows.
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// The distance matrix, absent when the step was rejected before a
    /// matrix was built.
    pub fn matrix(&self) -> Option<&Array2<f64>> {
        self.matrix.as_ref()
    }

    pub fn reduction_step(&self) -> Option<&ReductionStep> {
        self.reduction_step.as_ref()
    }

    /// Successful full reduction paths through this node.
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure_reason
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `<<n=N>>` or `<<n=N|(x,y:z)alpha>>` with `precision` decimals.
    pub fn token(&self, precision: usize) -> String {
        match &self.reduction_step {
            Some(step) => format!("<<n={}|{:.*}>>", self.item_count(), precision, step),
            None => format!("<<n={}>>", self.item_count()),
        }
    }
}

/// Arena-backed search tree.
#[derive(Clone, Debug)]
pub struct RecognitionTree {
    nodes: Vec<RecognitionNode>,
    total_successes: usize,
}

impl RecognitionTree {
    pub(crate) fn with_root(root: RecognitionNode) -> Self {
        Self {
            nodes: vec![root],
            total_successes: 0,
        }
    }

    /// Append `child` under `parent` and return its id.
    pub(crate) fn add_child(&mut self, parent: NodeId, mut child: RecognitionNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        child.parent = Some(parent);
        self.nodes.push(child);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut RecognitionNode {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &RecognitionNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct successful reduction paths from the root.
    pub fn total_successes(&self) -> usize {
        self.total_successes
    }

    /// Whether at least one reduction path succeeded.
    pub fn is_recognized(&self) -> bool {
        self.total_successes > 0
    }

    /// Node ids in pre-order (parent before children).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    /// Node ids in post-order (children before parent).
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), false)];
        while let Some((id, visited)) = stack.pop() {
            if visited {
                order.push(id);
            } else {
                stack.push((id, true));
                stack.extend(self.node(id).children.iter().rev().map(|&c| (c, false)));
            }
        }
        order
    }

    /// All `(parent, child)` pairs in pre-order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.preorder()
            .into_iter()
            .flat_map(|id| self.node(id).children.iter().map(move |&c| (id, c)))
            .collect()
    }

    /// Non-leaf node ids in pre-order.
    pub fn inner_vertices(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| !self.node(id).is_leaf())
            .collect()
    }

    /// Edges whose child is itself an inner vertex, in pre-order.
    pub fn inner_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.edges()
            .into_iter()
            .filter(|&(_, child)| !self.node(child).is_leaf())
            .collect()
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).parent;
        }
        depth
    }

    /// Newick-like rendering of the tree shape, terminated by `;`.
    pub fn to_newick(&self, precision: usize) -> String {
        let mut out = String::new();
        self.write_newick(self.root(), precision, &mut out);
        out.push(';');
        out
    }

    fn write_newick(&self, id: NodeId, precision: usize, out: &mut String) {
        let node = self.node(id);
        if !node.children.is_empty() {
            out.push('(');
            for (i, &child) in node.children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                self.write_newick(child, precision, out);
            }
            out.push(')');
        }
        out.push_str(&node.token(precision));
    }

    /// Sum success counts bottom-up and order children by `z`.
    pub(crate) fn finalize(&mut self) {
        for id in self.postorder() {
            let count = self.nodes[id.0].success_count;
            if count > 0 {
                if let Some(parent) = self.nodes[id.0].parent {
                    self.nodes[parent.0].success_count += count;
                }
            }
        }
        self.total_successes = self.nodes[0].success_count;

        for i in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by_key(|c| self.nodes[c.0].reduction_step.map(|s| s.z));
            self.nodes[i].children = children;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(x: usize, y: usize, z: usize, alpha: f64) -> Option<ReductionStep> {
        Some(ReductionStep { x, y, z, alpha })
    }

    /// root(5) -> [a(4, z=4) -> success, b(4, z=2) -> failure, c(4, z=3) -> success]
    fn sample_tree() -> RecognitionTree {
        let mut tree = RecognitionTree::with_root(RecognitionNode::new((0..5).collect(), None, None));
        let root = tree.root();
        let mut a = RecognitionNode::new(vec![0, 1, 2, 3], None, step(0, 1, 4, 0.25));
        a.succeed();
        let mut b = RecognitionNode::new(vec![0, 1, 3, 4], None, step(0, 1, 2, 0.5));
        b.fail(FailureReason::SpikesTooShort);
        let mut c = RecognitionNode::new(vec![0, 1, 2, 4], None, step(1, 2, 3, 1.0));
        c.succeed();
        tree.add_child(root, a);
        tree.add_child(root, b);
        tree.add_child(root, c);
        tree
    }

    #[test]
    fn test_step_display_precision() {
        let s = ReductionStep {
            x: 0,
            y: 3,
            z: 4,
            alpha: 0.123456,
        };
        assert_eq!(s.to_string(), "(0,3:4)0.1235");
        assert_eq!(format!("{:.2}", s), "(0,3:4)0.12");
    }

    #[test]
    fn test_failure_reason_tags() {
        assert_eq!(FailureReason::NoPseudometric.to_string(), "no pseudometric");
        assert_eq!(FailureReason::NegativeDelta.to_string(), "negative delta/dxy");
        assert_eq!(FailureReason::NoCandidate.to_string(), "no candidate");
        assert_eq!(FailureReason::SpikesTooShort.to_string(), "spikes too short");
    }

    #[test]
    fn test_finalize_aggregates_and_sorts() {
        let mut tree = sample_tree();
        tree.finalize();
        assert_eq!(tree.total_successes(), 2);
        assert!(tree.is_recognized());

        let zs: Vec<usize> = tree
            .node(tree.root())
            .children()
            .iter()
            .map(|&c| tree.node(c).reduction_step().map(|s| s.z).unwrap_or(0))
            .collect();
        assert_eq!(zs, vec![2, 3, 4]);
    }

    #[test]
    fn test_aggregation_invariant() {
        let mut tree = sample_tree();
        tree.finalize();
        for id in tree.preorder() {
            let node = tree.node(id);
            if node.is_leaf() {
                assert!(node.success_count() <= 1);
            } else {
                let sum: usize = node
                    .children()
                    .iter()
                    .map(|&c| tree.node(c).success_count())
                    .sum();
                assert_eq!(node.success_count(), sum);
            }
        }
    }

    #[test]
    fn test_traversal_orders() {
        let mut tree = sample_tree();
        tree.finalize();
        assert_eq!(
            tree.preorder(),
            vec![NodeId(0), NodeId(2), NodeId(3), NodeId(1)]
        );
        assert_eq!(
            tree.postorder(),
            vec![NodeId(2), NodeId(3), NodeId(1), NodeId(0)]
        );
        assert_eq!(tree.edges().len(), 3);
        assert_eq!(tree.depth(NodeId(3)), 1);
        assert_eq!(tree.depth(tree.root()), 0);
        assert_eq!(tree.node(NodeId(3)).parent(), Some(tree.root()));
    }

    #[test]
    fn test_inner_vertices_and_edges() {
        let mut tree = sample_tree();
        tree.finalize();
        assert_eq!(tree.inner_vertices(), vec![tree.root()]);
        assert!(tree.inner_edges().is_empty());

        let mut deeper = sample_tree();
        let grandchild = RecognitionNode::new(vec![0, 1, 2], None, step(0, 1, 3, 0.5));
        let leaf = deeper.add_child(NodeId(1), grandchild);
        deeper.finalize();
        assert_eq!(deeper.inner_vertices(), vec![NodeId(0), NodeId(1)]);
        assert_eq!(deeper.inner_edges(), vec![(NodeId(0), NodeId(1))]);
        assert_eq!(deeper.edges().len(), 4);
        assert!(deeper.node(leaf).is_leaf());
    }

    #[test]
    fn test_newick() {
        let mut tree = sample_tree();
        tree.finalize();
        assert_eq!(
            tree.to_newick(2),
            "(<<n=4|(0,1:2)0.50>>,<<n=4|(1,2:3)1.00>>,<<n=4|(0,1:4)0.25>>)<<n=5>>;"
        );
    }

    #[test]
    fn test_single_node_newick() {
        let tree = RecognitionTree::with_root(RecognitionNode::new(vec![0, 1], None, None));
        assert_eq!(tree.to_newick(4), "<<n=2>>;");
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
    }
}
