//! Decides which recovered matches are trustworthy enough to keep.

use super::{TreeView, receiver_symmetric};
use crate::tree::{IdD, Language, NodeKind};

/// The type vocabularies used to read each side of a tree pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vocabularies {
    pub src: Language,
    pub dst: Language,
}

impl Vocabularies {
    pub fn same(language: Language) -> Self {
        Self {
            src: language,
            dst: language,
        }
    }
}

/// An isomorphic pair proposed for recovery, with its surroundings.
pub struct CandidatePair<'a> {
    pub src_view: TreeView<'a>,
    pub dst_view: TreeView<'a>,
    pub src: IdD,
    pub dst: IdD,
    /// Return statements at or below this height are too small to be trusted.
    pub tiny_return_height: usize,
}

impl CandidatePair<'_> {
    pub fn src_kind(&self) -> NodeKind {
        self.src_view.kind(&self.src)
    }

    pub fn dst_kind(&self) -> NodeKind {
        self.dst_view.kind(&self.dst)
    }
}

pub trait AcceptancePredicate {
    fn accept(&self, pair: &CandidatePair) -> bool;
}

impl<F: Fn(&CandidatePair) -> bool> AcceptancePredicate for F {
    fn accept(&self, pair: &CandidatePair) -> bool {
        self(pair)
    }
}

/// Keeps comments, imports, object creations, infix expressions, call
/// fragments, receiver-symmetric calls and non-trivial statements, unless
/// either side lies in a test method.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAcceptance;

impl AcceptancePredicate for DefaultAcceptance {
    fn accept(&self, pair: &CandidatePair) -> bool {
        if in_test_method(&pair.src_view, &pair.src) || in_test_method(&pair.dst_view, &pair.dst) {
            return false;
        }
        use NodeKind::*;
        match pair.src_kind() {
            k if k.is_comment() => true,
            ImportDeclaration => true,
            ClassInstanceCreation | InfixExpression => true,
            MethodInvocationArguments | MethodInvocationReceiver => true,
            MethodInvocation => {
                receiver_symmetric(&pair.src_view, &pair.src, &pair.dst_view, &pair.dst)
            }
            ReturnStatement => pair.src_view.tree.height(&pair.src) > pair.tiny_return_height,
            Block => false,
            k => k.is_statement(),
        }
    }
}

/// Whether the closest method declaration around `id` carries a test
/// annotation, or is named as a test in a language that finds tests by name.
pub fn in_test_method(view: &TreeView, id: &IdD) -> bool {
    let Some(method) = view.enclosing_method(id) else {
        return false;
    };
    if let Some(prefix) = view.language.test_name_prefix() {
        if method_name(view, &method).is_some_and(|n| n.starts_with(prefix)) {
            return true;
        }
    }
    let names = view.language.test_annotations();
    annotations_of(view, &method)
        .into_iter()
        .filter_map(|a| annotation_name(view, &a))
        .any(|n| names.iter().any(|t| same_annotation(&n, t)))
}

fn method_name<'a>(view: &TreeView<'a>, method: &IdD) -> Option<&'a str> {
    let tree = view.tree;
    tree.children(method)
        .iter()
        .find(|c| view.kind(c).is_name())
        .and_then(|c| tree.label(c))
}

/// Annotations among the children of the method, inside its modifier-like
/// children, and in the run of annotations directly preceding it.
fn annotations_of(view: &TreeView, method: &IdD) -> Vec<IdD> {
    let tree = view.tree;
    let is_annotation = |x: &IdD| view.kind(x) == NodeKind::Annotation;
    let mut r = vec![];
    for c in tree.children(method) {
        if is_annotation(c) {
            r.push(*c);
        } else if view.kind(c) != NodeKind::Block {
            r.extend(tree.children(c).iter().copied().filter(is_annotation));
        }
    }
    if let (Some(p), Some(i)) = (tree.parent(method), tree.position_in_parent(method)) {
        r.extend(
            tree.children(&p)[..i]
                .iter()
                .rev()
                .take_while(|x| is_annotation(x))
                .copied(),
        );
    }
    r
}

/// The label of the annotation, or else the dotted name spelled by the name
/// leaves of its first child holding any. Argument lists are left out.
fn annotation_name(view: &TreeView, annotation: &IdD) -> Option<String> {
    let tree = view.tree;
    if let Some(l) = tree.label(annotation).filter(|l| !l.is_empty()) {
        return Some(l.to_owned());
    }
    tree.children(annotation).iter().find_map(|c| {
        let segments = name_segments(view, c);
        (!segments.is_empty()).then(|| segments.join("."))
    })
}

fn name_segments<'a>(view: &TreeView<'a>, id: &IdD) -> Vec<&'a str> {
    let tree = view.tree;
    let mut r = vec![];
    let mut stack = vec![*id];
    while let Some(x) = stack.pop() {
        let kind = view.kind(&x);
        if kind == NodeKind::MethodInvocationArguments {
            continue;
        }
        if kind.is_name() || tree.type_name(&x) == "type_identifier" {
            if let Some(l) = tree.label(&x).filter(|l| !l.is_empty()) {
                r.push(l);
                continue;
            }
        }
        stack.extend(tree.children(&x).iter().rev().copied());
    }
    r
}

fn same_annotation(name: &str, expected: &str) -> bool {
    let name = name.trim_start_matches('@');
    name == expected || name.rsplit('.').next() == expected.rsplit('.').next()
}
