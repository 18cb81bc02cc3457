use std::collections::HashMap;

use crate::matchers::Mapper;
use crate::matchers::mapping_store::{MonoMappingStore, TreeMappingStore};
use crate::tree::{IdD, NodeKind, Tree};
use crate::utils::sequence_algorithms::longest_common_subsequence;

use super::{TreeView, infix_operators_differ, isomorphic};

/// Options of last-chance matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastChance {
    /// Comment children are left unmapped.
    pub ignore_comments: bool,
    /// The pair is the pair of roots of a matching: histogram matching runs
    /// under it whatever its parents.
    pub from_roots: bool,
}

impl<'t, M: MonoMappingStore<Src = IdD, Dst = IdD>> Mapper<'t, M> {
    /// Unmapped destination nodes strictly under `dst_root`, of the same type
    /// as `src`, that are ancestors of the counterparts of the mapped
    /// descendants of `src`.
    pub fn get_dst_candidates(&self, src: &IdD, dst_root: &IdD) -> Vec<IdD> {
        let mut seeds = vec![];
        for c in self.src_arena.descendants_range(src) {
            if let Some(m) = self.mappings.get_dst(&c) {
                if self.dst_arena.is_descendant(&m, dst_root) {
                    seeds.push(m);
                }
            }
        }
        let mut candidates = vec![];
        let mut visited = bitvec::bitbox![0;self.dst_arena.len()];
        for mut seed in seeds {
            while let Some(parent) = self.dst_arena.parent(&seed) {
                if parent == *dst_root || visited[parent as usize] {
                    break;
                }
                visited.set(parent as usize, true);
                if self.src_arena.same_type(src, self.dst_arena, &parent)
                    && !self.mappings.is_dst(&parent)
                {
                    candidates.push(parent);
                }
                seed = parent;
            }
        }
        candidates
    }

    /// Recovers mappings among the unmapped children of `src` and `dst`:
    /// identical subtrees in sequence, then subtrees of identical shape in
    /// sequence, then children alone of their type on both sides, infix
    /// expressions with different operators excepted.
    pub fn last_chance_match_histogram(&mut self, src: &IdD, dst: &IdD) {
        self.last_chance_match(src, dst, LastChance::default())
    }

    pub fn last_chance_match(&mut self, src: &IdD, dst: &IdD, options: LastChance) {
        self.lcs_equal_matching(src, dst, options.ignore_comments);
        self.lcs_structure_matching(src, dst, options.ignore_comments);
        let src_parent = self.src_arena.parent(src);
        let dst_parent = self.dst_arena.parent(dst);
        let histogram = options.from_roots
            || match (src_parent, dst_parent) {
                (None, None) => true,
                (Some(sp), Some(dp)) => self.src_arena.same_type(&sp, self.dst_arena, &dp),
                _ => false,
            };
        if histogram {
            self.histogram_matching(src, dst, options.ignore_comments)
        }
    }

    fn unmapped_children(
        arena: &Tree,
        id: &IdD,
        is_mapped: impl Fn(&IdD) -> bool,
        ignore_comments: bool,
    ) -> Vec<IdD> {
        arena
            .children(id)
            .iter()
            .filter(|c| !is_mapped(c) && !(ignore_comments && arena.kind(c).is_comment()))
            .copied()
            .collect()
    }

    fn lcs_matching<F: Fn(&Self, &IdD, &IdD) -> bool>(
        &mut self,
        src: &IdD,
        dst: &IdD,
        ignore_comments: bool,
        cmp: F,
    ) {
        let src_children =
            Self::unmapped_children(self.src_arena, src, |c| self.mappings.is_src(c), ignore_comments);
        let dst_children =
            Self::unmapped_children(self.dst_arena, dst, |c| self.mappings.is_dst(c), ignore_comments);

        let lcs = longest_common_subsequence::<_, _, usize, _>(
            &src_children,
            &dst_children,
            |src, dst| cmp(self, src, dst),
        );
        for (i, j) in lcs {
            let t1 = &src_children[i];
            let t2 = &dst_children[j];
            if self.mappings.are_srcs_unmapped(self.src_arena, t1)
                && self.mappings.are_dsts_unmapped(self.dst_arena, t2)
            {
                self.add_mapping_recursively(t1, t2);
            }
        }
    }

    fn lcs_equal_matching(&mut self, src: &IdD, dst: &IdD, ignore_comments: bool) {
        self.lcs_matching(src, dst, ignore_comments, |s, src, dst| {
            isomorphic::<false>(s.src_arena, src, s.dst_arena, dst)
        })
    }

    fn lcs_structure_matching(&mut self, src: &IdD, dst: &IdD, ignore_comments: bool) {
        self.lcs_matching(src, dst, ignore_comments, |s, src, dst| {
            isomorphic::<true>(s.src_arena, src, s.dst_arena, dst)
        })
    }

    fn histogram_matching(&mut self, src: &IdD, dst: &IdD, ignore_comments: bool) {
        let src_arena = self.src_arena;
        let dst_arena = self.dst_arena;
        let src_children =
            Self::unmapped_children(src_arena, src, |c| self.mappings.is_src(c), ignore_comments);
        let dst_children =
            Self::unmapped_children(dst_arena, dst, |c| self.mappings.is_dst(c), ignore_comments);
        let mut src_histogram: HashMap<(NodeKind, &str), Vec<IdD>> = HashMap::new();
        for c in &src_children {
            src_histogram.entry(src_arena.type_key(c)).or_default().push(*c);
        }
        let mut dst_histogram: HashMap<(NodeKind, &str), Vec<IdD>> = HashMap::new();
        for c in &dst_children {
            dst_histogram.entry(dst_arena.type_key(c)).or_default().push(*c);
        }
        // children order keeps the outcome independent of hashing
        for c in &src_children {
            let t = src_arena.type_key(c);
            let (Some(srcs), Some(dsts)) = (src_histogram.get(&t), dst_histogram.get(&t)) else {
                continue;
            };
            if srcs.len() == 1 && dsts.len() == 1 {
                let t1 = srcs[0];
                let t2 = dsts[0];
                if infix_operators_differ(&TreeView::new(src_arena), &t1, &TreeView::new(dst_arena), &t2) {
                    continue;
                }
                if self.mappings.link_if_both_unmapped(t1, t2) {
                    let options = LastChance {
                        ignore_comments,
                        from_roots: false,
                    };
                    self.last_chance_match(&t1, &t2, options);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::mapping_store::{MappingStore, VecStore};
    use crate::tests::tree;
    use crate::tree::{Language, Tree};

    #[test]
    fn last_chance_recovers_children() {
        let src = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("ExpressionStatement"; [tree!("SimpleName", "a")]),
                tree!("ReturnStatement"; [tree!("SimpleName", "x")]),
                tree!("IfStatement"; [tree!("SimpleName", "c")]),
            ]),
        )
        .unwrap();
        let dst = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("ExpressionStatement"; [tree!("SimpleName", "a")]),
                tree!("ReturnStatement"; [tree!("SimpleName", "y")]),
                tree!("ThrowStatement"; [tree!("SimpleName", "c")]),
            ]),
        )
        .unwrap();
        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        let (s, d) = (src.root(), dst.root());
        mapper.last_chance_match_histogram(&s, &d);
        let ms = &mapper.mappings;
        // identical
        assert!(ms.has(&src.child(&s, &[0]).unwrap(), &dst.child(&d, &[0]).unwrap()));
        assert!(ms.has(&src.child(&s, &[0, 0]).unwrap(), &dst.child(&d, &[0, 0]).unwrap()));
        // same shape
        assert!(ms.has(&src.child(&s, &[1]).unwrap(), &dst.child(&d, &[1]).unwrap()));
        assert!(ms.has(&src.child(&s, &[1, 0]).unwrap(), &dst.child(&d, &[1, 0]).unwrap()));
        // different types
        assert!(!ms.is_src(&src.child(&s, &[2]).unwrap()));
        assert!(!ms.is_dst(&dst.child(&d, &[2]).unwrap()));
        // roots are left to the caller
        assert!(!ms.is_src(&s));
    }

    #[test]
    fn histogram_links_unique_types() {
        let src = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("IfStatement"; [tree!("SimpleName", "c"), tree!("Block")]),
                tree!("ExpressionStatement", "e1"),
                tree!("ExpressionStatement", "e2"),
            ]),
        )
        .unwrap();
        let dst = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("ExpressionStatement", "e3"),
                tree!("IfStatement"; [tree!("SimpleName", "d"), tree!("Block"; [tree!("BreakStatement")])]),
                tree!("ExpressionStatement", "e4"),
            ]),
        )
        .unwrap();
        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        let (s, d) = (src.root(), dst.root());
        mapper.last_chance_match_histogram(&s, &d);
        let ms = &mapper.mappings;
        let src_if = src.child(&s, &[0]).unwrap();
        let dst_if = dst.child(&d, &[1]).unwrap();
        assert!(ms.has(&src_if, &dst_if));
        // recursion under the if statement
        assert!(ms.has(&src.child(&src_if, &[0]).unwrap(), &dst.child(&dst_if, &[0]).unwrap()));
        assert!(ms.has(&src.child(&src_if, &[1]).unwrap(), &dst.child(&dst_if, &[1]).unwrap()));
        // expression statements were already paired by shape, in order
        assert!(ms.has(&src.child(&s, &[1]).unwrap(), &dst.child(&d, &[0]).unwrap()));
        assert!(ms.has(&src.child(&s, &[2]).unwrap(), &dst.child(&d, &[2]).unwrap()));
    }

    #[test]
    fn candidates_walk_up_from_mapped_descendants() {
        let src = Tree::build(
            Language::Java,
            &tree!("CompilationUnit"; [
                tree!("Block"; [tree!("SimpleName", "a"), tree!("SimpleName", "b")]),
            ]),
        )
        .unwrap();
        let dst = Tree::build(
            Language::Java,
            &tree!("CompilationUnit"; [
                tree!("Block"; [
                    tree!("Block"; [tree!("SimpleName", "a")]),
                    tree!("SimpleName", "b"),
                ]),
            ]),
        )
        .unwrap();
        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        mapper.mappings.link(0, 0);
        mapper.mappings.link(1, 2);
        let block = src.child(&src.root(), &[0]).unwrap();
        let mut candidates = mapper.get_dst_candidates(&block, &dst.root());
        candidates.sort();
        let outer = dst.child(&dst.root(), &[0]).unwrap();
        let inner = dst.child(&dst.root(), &[0, 0]).unwrap();
        assert_eq!(candidates, vec![inner, outer]);

        // the walk stops at the given root
        assert_eq!(mapper.get_dst_candidates(&block, &outer), vec![inner]);
        // counterparts outside of the given root are not followed
        assert!(mapper.get_dst_candidates(&block, &inner).is_empty());
    }

    #[test]
    fn comments_left_out_of_last_chance() {
        let src = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("LineComment", "// a"),
                tree!("ExpressionStatement"; [tree!("SimpleName", "a")]),
            ]),
        )
        .unwrap();
        let dst = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("LineComment", "// b"),
                tree!("ExpressionStatement"; [tree!("SimpleName", "a")]),
            ]),
        )
        .unwrap();
        let (s, d) = (src.root(), dst.root());
        let comment = src.child(&s, &[0]).unwrap();

        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        mapper.last_chance_match_histogram(&s, &d);
        assert!(mapper.mappings.is_src(&comment));

        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        let options = LastChance {
            ignore_comments: true,
            from_roots: true,
        };
        mapper.last_chance_match(&s, &d, options);
        assert!(!mapper.mappings.is_src(&comment));
        assert!(mapper.mappings.has(&src.child(&s, &[1]).unwrap(), &dst.child(&d, &[1]).unwrap()));
    }

    #[test]
    fn histogram_under_seeded_roots() {
        // blocks nested under statements of different types
        let src = Tree::build(
            Language::Java,
            &tree!("WhileStatement"; [
                tree!("Block"; [tree!("IfStatement"; [tree!("SimpleName", "c")])]),
            ]),
        )
        .unwrap();
        let dst = Tree::build(
            Language::Java,
            &tree!("DoStatement"; [
                tree!("Block"; [
                    tree!("IfStatement"; [tree!("SimpleName", "d"), tree!("Block")]),
                ]),
            ]),
        )
        .unwrap();
        let s = src.child(&src.root(), &[0]).unwrap();
        let d = dst.child(&dst.root(), &[0]).unwrap();
        let src_if = src.child(&s, &[0]).unwrap();

        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        mapper.last_chance_match_histogram(&s, &d);
        assert!(!mapper.mappings.is_src(&src_if));

        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        let options = LastChance {
            ignore_comments: false,
            from_roots: true,
        };
        mapper.last_chance_match(&s, &d, options);
        assert!(mapper.mappings.has(&src_if, &dst.child(&d, &[0]).unwrap()));
    }
}
