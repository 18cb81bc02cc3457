//! Arena representation of the syntax trees being matched.
//!
//! Nodes are laid out in post-order, so the descendants of a node `n` are
//! exactly the contiguous range `lld(n)..n` and the root is the last node.
//! Parent and children are plain indices into the arena.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::Range;

use crate::error::{Error, Result};
use crate::utils::{self, acc_child_hash, clamp_u64_to_u32, inner_node_hash};

pub mod kinds;
pub mod simple_tree;

pub use kinds::{Language, NodeKind};
pub use simple_tree::SimpleTree;

/// Index of a node in a [`Tree`].
pub type IdD = u32;

#[derive(Debug, Clone)]
struct Node {
    ty: u16,
    kind: NodeKind,
    label: Option<String>,
    pos: usize,
    length: usize,
    parent: Option<IdD>,
    children: Vec<IdD>,
    lld: IdD,
    height: usize,
    label_hash: u32,
    structural_hash: u32,
}

#[derive(Debug, Clone)]
pub struct Tree {
    language: Language,
    types: Vec<String>,
    nodes: Vec<Node>,
}

impl Tree {
    /// Builds the arena of `tree`, computing heights, sizes and hashes bottom-up.
    pub fn build(language: Language, tree: &SimpleTree) -> Result<Self> {
        let mut builder = Builder {
            language,
            types: vec![],
            type_index: HashMap::new(),
            nodes: Vec::with_capacity(tree.size()),
            next_pre: 0,
        };
        builder.add(tree, None)?;
        log::trace!(
            "built {:?} tree with {} nodes and {} types",
            language,
            builder.nodes.len(),
            builder.types.len()
        );
        Ok(Tree {
            language,
            types: builder.types,
            nodes: builder.nodes,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> IdD {
        (self.nodes.len() - 1) as IdD
    }

    fn node(&self, id: &IdD) -> &Node {
        &self.nodes[*id as usize]
    }

    /// Raw type name, as given by the parser.
    pub fn type_name(&self, id: &IdD) -> &str {
        &self.types[self.node(id).ty as usize]
    }

    pub fn kind(&self, id: &IdD) -> NodeKind {
        self.node(id).kind
    }

    /// Identity of the type of a node across trees: its kind, plus the raw name
    /// when the kind is [`NodeKind::Other`].
    pub fn type_key(&self, id: &IdD) -> (NodeKind, &str) {
        let kind = self.kind(id);
        if kind == NodeKind::Other {
            (kind, self.type_name(id))
        } else {
            (kind, "")
        }
    }

    /// Leading keyword of a node: its own label, or else the label or the
    /// type of its first child.
    pub fn keyword(&self, id: &IdD) -> Option<&str> {
        keyword_of(
            self.label(id),
            self.children(id)
                .first()
                .map(|c| (self.type_name(c), self.label(c))),
        )
    }

    pub fn same_type(&self, id: &IdD, other: &Tree, other_id: &IdD) -> bool {
        self.type_key(id) == other.type_key(other_id)
    }

    pub fn label(&self, id: &IdD) -> Option<&str> {
        self.node(id).label.as_deref()
    }

    pub fn pos(&self, id: &IdD) -> usize {
        self.node(id).pos
    }

    pub fn length(&self, id: &IdD) -> usize {
        self.node(id).length
    }

    /// A leaf has height 1.
    pub fn height(&self, id: &IdD) -> usize {
        self.node(id).height
    }

    /// Number of nodes in the subtree, the node included.
    pub fn size(&self, id: &IdD) -> usize {
        self.descendants_count(id) + 1
    }

    /// Hash of the subtree, types and labels included.
    pub fn hash(&self, id: &IdD) -> u32 {
        self.node(id).label_hash
    }

    /// Hash of the shape of the subtree, labels excluded.
    pub fn structural_hash(&self, id: &IdD) -> u32 {
        self.node(id).structural_hash
    }

    pub fn parent(&self, id: &IdD) -> Option<IdD> {
        self.node(id).parent
    }

    pub fn has_parent(&self, id: &IdD) -> bool {
        self.parent(id).is_some()
    }

    pub fn children(&self, id: &IdD) -> &[IdD] {
        &self.node(id).children
    }

    pub fn is_leaf(&self, id: &IdD) -> bool {
        self.children(id).is_empty()
    }

    /// Follows `path`, a list of child offsets, from `id`.
    pub fn child(&self, id: &IdD, path: &[usize]) -> Option<IdD> {
        let mut r = *id;
        for i in path {
            r = *self.children(&r).get(*i)?;
        }
        Some(r)
    }

    /// Left-most leaf descendant.
    pub fn lld(&self, id: &IdD) -> IdD {
        self.node(id).lld
    }

    pub fn descendants_range(&self, id: &IdD) -> Range<IdD> {
        self.lld(id)..*id
    }

    /// Descendants in post-order, the node itself excluded.
    pub fn descendants(&self, id: &IdD) -> Vec<IdD> {
        self.descendants_range(id).collect()
    }

    pub fn descendants_count(&self, id: &IdD) -> usize {
        (*id - self.lld(id)) as usize
    }

    pub fn is_descendant(&self, desc: &IdD, of: &IdD) -> bool {
        self.descendants_range(of).contains(desc)
    }

    /// Ancestors from the parent up to the root.
    pub fn parents(&self, id: IdD) -> Parents<'_> {
        Parents {
            tree: self,
            current: self.parent(&id),
        }
    }

    pub fn position_in_parent(&self, id: &IdD) -> Option<usize> {
        let p = self.parent(id)?;
        self.children(&p).iter().position(|x| x == id)
    }

    /// Immediately preceding sibling.
    pub fn lsib(&self, id: &IdD) -> Option<IdD> {
        let p = self.parent(id)?;
        let i = self.position_in_parent(id)?;
        i.checked_sub(1).map(|i| self.children(&p)[i])
    }

    pub fn iter_df_post(&self) -> Range<IdD> {
        0..self.nodes.len() as IdD
    }

    pub fn iter_pre(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: if self.is_empty() {
                vec![]
            } else {
                vec![self.root()]
            },
        }
    }
}

pub struct Parents<'a> {
    tree: &'a Tree,
    current: Option<IdD>,
}

impl Iterator for Parents<'_> {
    type Item = IdD;

    fn next(&mut self) -> Option<IdD> {
        let r = self.current?;
        self.current = self.tree.parent(&r);
        Some(r)
    }
}

pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<IdD>,
}

impl Iterator for PreOrder<'_> {
    type Item = IdD;

    fn next(&mut self) -> Option<IdD> {
        let r = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(&r).iter().rev().copied());
        Some(r)
    }
}

fn keyword_of<'a>(label: Option<&'a str>, first_child: Option<(&'a str, Option<&'a str>)>) -> Option<&'a str> {
    label.filter(|l| !l.is_empty()).or_else(|| {
        first_child.map(|(ty, label)| label.filter(|l| !l.is_empty()).unwrap_or(ty))
    })
}

struct Builder {
    language: Language,
    types: Vec<String>,
    type_index: HashMap<String, u16>,
    nodes: Vec<Node>,
    next_pre: usize,
}

impl Builder {
    fn intern(&mut self, ty: &str) -> Result<u16> {
        if let Some(t) = self.type_index.get(ty) {
            return Ok(*t);
        }
        let t = u16::try_from(self.types.len()).map_err(|_| Error::TooManyTypes(u16::MAX as usize))?;
        self.types.push(ty.to_owned());
        self.type_index.insert(ty.to_owned(), t);
        Ok(t)
    }

    /// `parent_span` is only given when the parent carries an explicit range.
    fn add(&mut self, tree: &SimpleTree, parent_span: Option<(usize, usize)>) -> Result<IdD> {
        let pre = self.next_pre;
        self.next_pre += 1;
        if let (Some((pos, len)), Some((parent_pos, parent_len))) = (tree.range, parent_span) {
            if pos < parent_pos || pos + len > parent_pos + parent_len {
                return Err(Error::ChildOutOfRange {
                    ty: tree.ty.clone(),
                    start: pos,
                    end: pos + len,
                    parent_start: parent_pos,
                    parent_end: parent_pos + parent_len,
                });
            }
        }

        let mut children = Vec::with_capacity(tree.children.len());
        for c in &tree.children {
            children.push(self.add(c, tree.range)?);
        }

        let len = self.nodes.len();
        let id = IdD::try_from(len).map_err(|_| Error::TooManyNodes(len + 1))?;
        let ty = self.intern(&tree.ty)?;
        let keyword = keyword_of(
            tree.label.as_deref(),
            tree.children.first().map(|c| (c.ty.as_str(), c.label.as_deref())),
        );
        let kind = self.language.classify_node(&tree.ty, keyword);
        let lld = children.first().map_or(id, |c| self.nodes[*c as usize].lld);
        let size = id - lld + 1;
        let height = 1 + children
            .iter()
            .map(|c| self.nodes[*c as usize].height)
            .max()
            .unwrap_or(0);
        let (pos, length) = tree.range.unwrap_or((pre, size as usize));

        let type_key = if kind == NodeKind::Other {
            (kind, tree.ty.as_str())
        } else {
            (kind, "")
        };
        let k = clamp_u64_to_u32(&utils::hash(&type_key));
        let l = clamp_u64_to_u32(&utils::hash(&tree.label));
        let mut label_middle = 0;
        let mut struct_middle = 0;
        for c_id in &children {
            let c = &self.nodes[*c_id as usize];
            let c_size = c_id - c.lld + 1;
            label_middle = acc_child_hash(label_middle, c.label_hash, c_size);
            struct_middle = acc_child_hash(struct_middle, c.structural_hash, c_size);
        }
        for c in &children {
            self.nodes[*c as usize].parent = Some(id);
        }
        self.nodes.push(Node {
            ty,
            kind,
            label: tree.label.clone(),
            pos,
            length,
            parent: None,
            children,
            lld,
            height,
            label_hash: inner_node_hash(k, l, size, label_middle),
            structural_hash: inner_node_hash(k, 0, size, struct_middle),
        });
        Ok(id)
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut stack = vec![(self.root(), 0)];
        while let Some((id, depth)) = stack.pop() {
            write!(f, "{}{}", "  ".repeat(depth), self.type_name(&id))?;
            if let Some(l) = self.label(&id) {
                write!(f, ": {}", l)?;
            }
            writeln!(f, " [{},{}]", self.pos(&id), self.pos(&id) + self.length(&id))?;
            for c in self.children(&id).iter().rev() {
                stack.push((*c, depth + 1));
            }
        }
        Ok(())
    }
}
