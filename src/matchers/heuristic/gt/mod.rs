//! GumTree-style heuristic matchers, tuned for source code.

use serde::{Deserialize, Serialize};

use crate::tree::{IdD, Language, NodeKind, Tree};

pub mod acceptance;
pub mod bottom_up_matcher;
pub mod comparators;
pub mod greedy_bottom_up_matcher;
pub mod greedy_subtree_matcher;
pub mod missing_identical_subtree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtreeMatcherConfig {
    /// Subtrees lower than this are never considered, 1 includes leaves.
    pub min_height: usize,
    /// Comment subtrees are neither staged nor explored, and are left out of
    /// the last-chance matching of the roots. Comments inside a larger
    /// identical subtree still follow it.
    pub ignore_comments: bool,
}

impl Default for SubtreeMatcherConfig {
    fn default() -> Self {
        Self {
            min_height: 1,
            ignore_comments: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BottomUpMatcherConfig {
    /// Run last-chance matching again under already mapped nodes whose
    /// children are left unmapped on both sides.
    pub second_chance: bool,
    /// Comments are never containers nor last-chance candidates.
    pub ignore_comments: bool,
}

impl Default for BottomUpMatcherConfig {
    fn default() -> Self {
        Self {
            second_chance: true,
            ignore_comments: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Call-argument and simple-type fragments at or below this height are skipped.
    pub min_height: usize,
    /// A source with more candidates than this, whose first candidate also has
    /// more sources than this, is left unmapped.
    pub ambiguity_threshold: usize,
    /// Return statements at or below this height are not recovered.
    pub tiny_return_height: usize,
    /// Comment subtrees are neither staged nor explored.
    pub ignore_comments: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            min_height: 2,
            ambiguity_threshold: 5,
            tiny_return_height: 2,
            ignore_comments: false,
        }
    }
}

/// A tree whose raw types are read through a given vocabulary.
#[derive(Clone, Copy)]
pub struct TreeView<'a> {
    pub tree: &'a Tree,
    pub language: Language,
}

impl<'a> TreeView<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            language: tree.language(),
        }
    }

    pub fn with_language(tree: &'a Tree, language: Language) -> Self {
        Self { tree, language }
    }

    pub fn kind(&self, id: &IdD) -> NodeKind {
        if self.language == self.tree.language() {
            self.tree.kind(id)
        } else {
            self.language
                .classify_node(self.tree.type_name(id), self.tree.keyword(id))
        }
    }

    pub fn parent_kind(&self, id: &IdD) -> Option<NodeKind> {
        self.tree.parent(id).map(|p| self.kind(&p))
    }

    /// Child of a call receiver.
    pub fn in_receiver(&self, id: &IdD) -> bool {
        self.parent_kind(id) == Some(NodeKind::MethodInvocationReceiver)
    }

    pub fn has_receiver(&self, id: &IdD) -> bool {
        self.tree
            .children(id)
            .iter()
            .any(|c| self.kind(c) == NodeKind::MethodInvocationReceiver)
    }

    /// The operator of an infix expression, from its operator child or else its own label.
    pub fn infix_operator(&self, id: &IdD) -> Option<&'a str> {
        let tree = self.tree;
        tree.children(id)
            .iter()
            .find(|c| self.kind(c) == NodeKind::InfixOperator)
            .and_then(|c| tree.label(c))
            .or_else(|| tree.label(id))
    }

    /// The closest method declaration containing `id`, `id` included.
    pub fn enclosing_method(&self, id: &IdD) -> Option<IdD> {
        std::iter::once(*id)
            .chain(self.tree.parents(*id))
            .find(|x| self.kind(x) == NodeKind::MethodDeclaration)
    }
}

/// Rejects a pair where exactly one side is a receiver, or calls where only one side has a receiver.
pub fn receiver_symmetric(src: &TreeView, s: &IdD, dst: &TreeView, d: &IdD) -> bool {
    if src.in_receiver(s) != dst.in_receiver(d) {
        return false;
    }
    if src.kind(s) == NodeKind::MethodInvocation && dst.kind(d) == NodeKind::MethodInvocation {
        return src.has_receiver(s) == dst.has_receiver(d);
    }
    true
}

pub fn infix_operators_differ(src: &TreeView, s: &IdD, dst: &TreeView, d: &IdD) -> bool {
    src.kind(s) == NodeKind::InfixExpression
        && dst.kind(d) == NodeKind::InfixExpression
        && src.infix_operator(s) != dst.infix_operator(d)
}

/// Guards applied to every isomorphic pair before it becomes a candidate.
pub fn is_candidate_allowed(src: &TreeView, s: &IdD, dst: &TreeView, d: &IdD) -> bool {
    receiver_symmetric(src, s, dst, d) && !infix_operators_differ(src, s, dst, d)
}

/// Same types and same shape, and also same labels unless `STRUCTURAL`.
///
/// Hashes are compared first; on equal hashes both post-order layouts are
/// walked side by side, types, labels and arities fixing the shape.
pub fn isomorphic<const STRUCTURAL: bool>(
    src_arena: &Tree,
    src: &IdD,
    dst_arena: &Tree,
    dst: &IdD,
) -> bool {
    let (src_h, dst_h) = if STRUCTURAL {
        (src_arena.structural_hash(src), dst_arena.structural_hash(dst))
    } else {
        (src_arena.hash(src), dst_arena.hash(dst))
    };
    if src_h != dst_h {
        return false;
    }
    if src_arena.size(src) != dst_arena.size(dst) {
        return false;
    }
    let src_range = src_arena.lld(src)..=*src;
    let dst_range = dst_arena.lld(dst)..=*dst;
    src_range.zip(dst_range).all(|(s, d)| {
        src_arena.same_type(&s, dst_arena, &d)
            && (STRUCTURAL || src_arena.label(&s) == dst_arena.label(&d))
            && src_arena.children(&s).len() == dst_arena.children(&d).len()
    })
}
