use bitvec::boxed::BitBox;
use logging_timer::time;

use super::bottom_up_matcher::LastChance;
use super::comparators::FullMappingComparator;
use super::{SubtreeMatcherConfig, TreeView, is_candidate_allowed, isomorphic};
use crate::matchers::Mapper;
use crate::matchers::mapping_store::{MappingStore, MonoMappingStore, MultiMappingStore, TreeMappingStore};
use crate::tree::{IdD, NodeKind, Tree};

/// Top-down matcher: maps the highest identical subtrees first, settling
/// ambiguous candidates with [`FullMappingComparator`].
pub struct GreedySubtreeMatcher<'t, M> {
    internal: SubtreeMatcher<'t, M>,
}

impl<'t, M: MonoMappingStore<Src = IdD, Dst = IdD>> GreedySubtreeMatcher<'t, M> {
    pub fn match_it<MM>(mapper: Mapper<'t, M>) -> Mapper<'t, M>
    where
        MM: MultiMappingStore<Src = IdD, Dst = IdD> + Default,
    {
        Self::match_with::<MM>(mapper, &SubtreeMatcherConfig::default())
    }

    pub fn match_with<MM>(mapper: Mapper<'t, M>, config: &SubtreeMatcherConfig) -> Mapper<'t, M>
    where
        MM: MultiMappingStore<Src = IdD, Dst = IdD> + Default,
    {
        let src_root = mapper.src_arena.root();
        let dst_root = mapper.dst_arena.root();
        Self::match_subtrees::<MM>(mapper, src_root, dst_root, config)
    }

    /// Matches the subtree of `src_root` against the subtree of `dst_root`,
    /// on top of the mappings already in `mapper`.
    pub fn match_subtrees<MM>(
        mapper: Mapper<'t, M>,
        src_root: IdD,
        dst_root: IdD,
        config: &SubtreeMatcherConfig,
    ) -> Mapper<'t, M>
    where
        MM: MultiMappingStore<Src = IdD, Dst = IdD> + Default,
    {
        let mut internal = SubtreeMatcher::new(mapper, config.min_height).with_roots(src_root, dst_root);
        internal.ignore_comments = config.ignore_comments;
        let mut matcher = Self { internal };
        matcher.execute::<MM>();
        matcher.internal.mapper
    }

    fn execute<MM: MultiMappingStore<Src = IdD, Dst = IdD> + Default>(&mut self) {
        let mut mm: MM = Default::default();
        mm.topit(
            self.internal.mapper.src_arena.len(),
            self.internal.mapper.dst_arena.len(),
        );
        self.internal.matchh_to_be_filtered(&mut mm);
        self.filter_mappings(&mm);

        let (src_root, dst_root) = (self.internal.src_root, self.internal.dst_root);
        let options = LastChance {
            ignore_comments: self.internal.ignore_comments,
            from_roots: true,
        };
        let mapper = &mut self.internal.mapper;
        if mapper.src_arena.same_type(&src_root, mapper.dst_arena, &dst_root) {
            mapper.last_chance_match(&src_root, &dst_root, options);
        }
    }

    #[time("debug")]
    fn filter_mappings<MM: MultiMappingStore<Src = IdD, Dst = IdD>>(&mut self, multi_mappings: &MM) {
        let src_len = self.internal.mapper.src_arena.len();
        let dst_len = self.internal.mapper.dst_arena.len();
        // Select unique mappings first and extract ambiguous mappings.
        let mut ambiguous_list: Vec<(IdD, IdD)> = vec![];
        let mut ignored = bitvec::bitbox![0;src_len];
        for src in multi_mappings.all_mapped_srcs() {
            let mut is_mapping_unique = false;
            if multi_mappings.is_src_unique(&src) {
                let dst = multi_mappings.get_dsts(&src)[0];
                if multi_mappings.is_dst_unique(&dst) {
                    self.internal.commit(&src, &dst);
                    is_mapping_unique = true;
                }
            }

            if !(ignored[src as usize] || is_mapping_unique) {
                let adsts = multi_mappings.get_dsts(&src);
                let asrcs = multi_mappings.get_srcs(&adsts[0]);
                for asrc in asrcs {
                    for adst in adsts {
                        ambiguous_list.push((*asrc, *adst));
                    }
                }
                asrcs.iter().for_each(|x| ignored.set(*x as usize, true))
            }
        }

        let mapping_list = FullMappingComparator::new(&self.internal.mapper).sort(ambiguous_list);

        let mut src_ignored = bitvec::bitbox![0;src_len];
        let mut dst_ignored = bitvec::bitbox![0;dst_len];
        // Literals and the like are settled by their immediate surroundings.
        for (src, dst) in &mapping_list {
            if src_ignored[*src as usize] || dst_ignored[*dst as usize] {
                continue;
            }
            if self.internal.src_view.kind(src).is_atomic()
                && self.internal.is_anchored_by_context(src, dst)
            {
                self.internal
                    .accept(src, dst, &mut src_ignored, &mut dst_ignored);
            }
        }

        // Select the best ambiguous mappings
        for (src, dst) in &mapping_list {
            if src_ignored[*src as usize] || dst_ignored[*dst as usize] {
                continue;
            }
            if self.internal.src_view.kind(src).is_name() && !self.internal.is_name_acceptable(src, dst) {
                continue;
            }
            self.internal
                .accept(src, dst, &mut src_ignored, &mut dst_ignored);
        }
    }
}

impl<'t, M> From<GreedySubtreeMatcher<'t, M>> for SubtreeMatcher<'t, M> {
    fn from(value: GreedySubtreeMatcher<'t, M>) -> Self {
        value.internal
    }
}

/// Scans both trees by decreasing height, staging isomorphic pairs as candidates.
pub struct SubtreeMatcher<'t, M> {
    pub mapper: Mapper<'t, M>,
    pub(super) src_view: TreeView<'t>,
    pub(super) dst_view: TreeView<'t>,
    pub(super) min_height: usize,
    /// Only stage pairs of subtrees untouched by the mapping, and do not
    /// explore subtrees that are already entirely mapped.
    pub(super) skip_covered: bool,
    /// Comment subtrees are neither staged nor explored.
    pub(super) ignore_comments: bool,
    /// Roots of the subtrees being scanned, the roots of the arenas by default.
    pub(super) src_root: IdD,
    pub(super) dst_root: IdD,
}

impl<'t, M: MappingStore<Src = IdD, Dst = IdD>> SubtreeMatcher<'t, M> {
    pub(super) fn new(mut mapper: Mapper<'t, M>, min_height: usize) -> Self {
        mapper
            .mappings
            .topit(mapper.src_arena.len(), mapper.dst_arena.len());
        Self {
            src_view: TreeView::new(mapper.src_arena),
            dst_view: TreeView::new(mapper.dst_arena),
            src_root: mapper.src_arena.root(),
            dst_root: mapper.dst_arena.root(),
            mapper,
            min_height,
            skip_covered: false,
            ignore_comments: false,
        }
    }

    pub(super) fn with_roots(mut self, src_root: IdD, dst_root: IdD) -> Self {
        self.src_root = src_root;
        self.dst_root = dst_root;
        self
    }

    /// Maps the pair and its descendants, provided that both subtrees are still unmapped.
    pub(super) fn commit(&mut self, src: &IdD, dst: &IdD) -> bool {
        let mapper = &mut self.mapper;
        if mapper.mappings.are_srcs_unmapped(mapper.src_arena, src)
            && mapper.mappings.are_dsts_unmapped(mapper.dst_arena, dst)
        {
            mapper.add_mapping_recursively(src, dst);
            true
        } else {
            false
        }
    }

    /// Commits the pair and excludes both subtrees from further acceptance.
    pub(super) fn accept(
        &mut self,
        src: &IdD,
        dst: &IdD,
        src_ignored: &mut BitBox,
        dst_ignored: &mut BitBox,
    ) -> bool {
        if !self.commit(src, dst) {
            return false;
        }
        src_ignored.set(*src as usize, true);
        self.mapper
            .src_arena
            .descendants_range(src)
            .for_each(|x| src_ignored.set(x as usize, true));
        dst_ignored.set(*dst as usize, true);
        self.mapper
            .dst_arena
            .descendants_range(dst)
            .for_each(|x| dst_ignored.set(x as usize, true));
        true
    }

    /// Same child index under parents of the same type, or preceding siblings mapped together.
    pub(super) fn is_anchored_by_context(&self, src: &IdD, dst: &IdD) -> bool {
        let src_arena = self.mapper.src_arena;
        let dst_arena = self.mapper.dst_arena;
        if let (Some(ps), Some(pd)) = (src_arena.parent(src), dst_arena.parent(dst)) {
            if src_arena.same_type(&ps, dst_arena, &pd)
                && src_arena.position_in_parent(src) == dst_arena.position_in_parent(dst)
            {
                return true;
            }
        }
        match (src_arena.lsib(src), dst_arena.lsib(dst)) {
            (Some(a), Some(b)) => self.mapper.mappings.has(&a, &b),
            _ => false,
        }
    }

    /// Names under a conditional expression must sit at the same index of a
    /// conditional on both sides, and names under a call must be under a call
    /// on both sides.
    ///
    /// The index rule does not tell branches apart semantically.
    pub(super) fn is_name_acceptable(&self, src: &IdD, dst: &IdD) -> bool {
        let src_parent = self.src_view.parent_kind(src);
        let dst_parent = self.dst_view.parent_kind(dst);
        let cond = Some(NodeKind::ConditionalExpression);
        if src_parent == cond || dst_parent == cond {
            if src_parent != dst_parent {
                return false;
            }
            if self.mapper.src_arena.position_in_parent(src)
                != self.mapper.dst_arena.position_in_parent(dst)
            {
                return false;
            }
        }
        let call = Some(NodeKind::MethodInvocation);
        (src_parent == call) == (dst_parent == call)
    }

    fn pop_larger(&self, src_trees: &mut PriorityTreeList, dst_trees: &mut PriorityTreeList) {
        if src_trees.peek_height() > dst_trees.peek_height() {
            src_trees.open();
        } else {
            dst_trees.open();
        }
    }

    /// Brings both lists to the same height, false once one of them is exhausted.
    fn synchronize(&self, src_trees: &mut PriorityTreeList, dst_trees: &mut PriorityTreeList) -> bool {
        while src_trees.peek_height() != -1
            && dst_trees.peek_height() != -1
            && src_trees.peek_height() != dst_trees.peek_height()
        {
            self.pop_larger(src_trees, dst_trees);
        }
        src_trees.peek_height() != -1 && dst_trees.peek_height() != -1
    }

    fn is_candidate(&self, src: &IdD, dst: &IdD, coverage: &Option<Coverage>) -> bool {
        if let Some(coverage) = coverage {
            if coverage.src_covered[*src as usize] || coverage.dst_covered[*dst as usize] {
                return false;
            }
        }
        isomorphic::<false>(self.mapper.src_arena, src, self.mapper.dst_arena, dst)
            && is_candidate_allowed(&self.src_view, src, &self.dst_view, dst)
    }

    #[time("debug")]
    pub(super) fn matchh_to_be_filtered<MM: MultiMappingStore<Src = IdD, Dst = IdD>>(
        &self,
        multi_mappings: &mut MM,
    ) {
        let src_arena = self.mapper.src_arena;
        let dst_arena = self.mapper.dst_arena;
        let coverage = self.skip_covered.then(|| Coverage::new(&self.mapper));
        let mut src_trees = PriorityTreeList::new(src_arena, self.src_root, self.min_height)
            .ignoring_comments(self.ignore_comments);
        let mut dst_trees = PriorityTreeList::new(dst_arena, self.dst_root, self.min_height)
            .ignoring_comments(self.ignore_comments);
        while self.synchronize(&mut src_trees, &mut dst_trees) {
            let (Some(current_height_src_trees), Some(current_height_dst_trees)) =
                (src_trees.pop(), dst_trees.pop())
            else {
                break;
            };

            let mut marks_for_src_trees = bitvec::bitbox![0;current_height_src_trees.len()];
            let mut marks_for_dst_trees = bitvec::bitbox![0;current_height_dst_trees.len()];

            for (i, src) in current_height_src_trees.iter().enumerate() {
                for (j, dst) in current_height_dst_trees.iter().enumerate() {
                    if self.is_candidate(src, dst, &coverage) {
                        multi_mappings.link(*src, *dst);
                        marks_for_src_trees.set(i, true);
                        marks_for_dst_trees.set(j, true);
                    }
                }
            }
            for (i, src) in current_height_src_trees.iter().enumerate() {
                let done = coverage
                    .as_ref()
                    .is_some_and(|c| c.src_full[*src as usize]);
                if !marks_for_src_trees[i] && !done {
                    src_trees.open_tree(src);
                }
            }
            for (j, dst) in current_height_dst_trees.iter().enumerate() {
                let done = coverage
                    .as_ref()
                    .is_some_and(|c| c.dst_full[*dst as usize]);
                if !marks_for_dst_trees[j] && !done {
                    dst_trees.open_tree(dst);
                }
            }
            src_trees.update_height();
            dst_trees.update_height();
        }
        log::trace!("staged {} candidate mappings", multi_mappings.len());
    }
}

/// Per-node summary of an existing mapping: whether a subtree holds any
/// mapped node, and whether it is mapped entirely.
struct Coverage {
    src_covered: BitBox,
    src_full: BitBox,
    dst_covered: BitBox,
    dst_full: BitBox,
}

impl Coverage {
    fn new<M: MappingStore<Src = IdD, Dst = IdD>>(mapper: &Mapper<'_, M>) -> Self {
        let (src_covered, src_full) = Self::side(mapper.src_arena, |x| mapper.mappings.is_src(x));
        let (dst_covered, dst_full) = Self::side(mapper.dst_arena, |x| mapper.mappings.is_dst(x));
        Self {
            src_covered,
            src_full,
            dst_covered,
            dst_full,
        }
    }

    fn side(arena: &Tree, is_mapped: impl Fn(&IdD) -> bool) -> (BitBox, BitBox) {
        let mut covered = bitvec::bitbox![0;arena.len()];
        let mut full = bitvec::bitbox![0;arena.len()];
        // children come first in post-order
        for x in arena.iter_df_post() {
            let m = is_mapped(&x);
            let cs = arena.children(&x);
            let c = m || cs.iter().any(|c| covered[*c as usize]);
            let f = m && cs.iter().all(|c| full[*c as usize]);
            covered.set(x as usize, c);
            full.set(x as usize, f);
        }
        (covered, full)
    }
}

/// Subtrees waiting to be compared, bucketed by height.
pub(super) struct PriorityTreeList<'a> {
    trees: Vec<Option<Vec<IdD>>>,

    arena: &'a Tree,

    max_height: usize,
    min_height: usize,
    ignore_comments: bool,

    current_idx: isize,
}

impl<'a> PriorityTreeList<'a> {
    pub(super) fn new(arena: &'a Tree, tree: IdD, min_height: usize) -> Self {
        let h = arena.height(&tree);
        let list_size = if h >= min_height {
            h + 1 - min_height
        } else {
            0
        };
        let mut r = Self {
            trees: vec![None; list_size],
            arena,
            max_height: h,
            min_height,
            ignore_comments: false,
            current_idx: if list_size == 0 { -1 } else { 0 },
        };
        r.add_tree_aux(tree, h);
        r
    }

    /// Drops the comments staged so far, and every comment added later.
    pub(super) fn ignoring_comments(mut self, ignore: bool) -> Self {
        self.ignore_comments = ignore;
        if ignore {
            let arena = self.arena;
            for trees in self.trees.iter_mut() {
                if let Some(v) = trees {
                    v.retain(|x| !arena.kind(x).is_comment());
                    if v.is_empty() {
                        *trees = None;
                    }
                }
            }
            self.update_height();
        }
        self
    }

    fn idx(&self, height: usize) -> usize {
        self.max_height - height
    }

    fn height(&self, idx: usize) -> usize {
        self.max_height - idx
    }

    fn add_tree(&mut self, tree: IdD) {
        let h = self.arena.height(&tree);
        self.add_tree_aux(tree, h)
    }

    fn add_tree_aux(&mut self, tree: IdD, h: usize) {
        if self.ignore_comments && self.arena.kind(&tree).is_comment() {
            return;
        }
        if h >= self.min_height {
            let idx = self.idx(h);
            self.trees[idx].get_or_insert_with(Vec::new).push(tree);
        }
    }

    pub(super) fn open(&mut self) -> Option<Vec<IdD>> {
        let pop = self.pop()?;
        for tree in &pop {
            self.open_tree(tree);
        }
        self.update_height();
        Some(pop)
    }

    pub(super) fn pop(&mut self) -> Option<Vec<IdD>> {
        if self.current_idx < 0 {
            None
        } else {
            self.trees[self.current_idx as usize].take()
        }
    }

    pub(super) fn open_tree(&mut self, tree: &IdD) {
        let arena = self.arena;
        for c in arena.children(tree) {
            self.add_tree(*c);
        }
    }

    pub(super) fn peek_height(&self) -> isize {
        if self.current_idx == -1 {
            -1
        } else {
            self.height(self.current_idx as usize) as isize
        }
    }

    pub(super) fn update_height(&mut self) {
        self.current_idx = -1;
        for i in 0..self.trees.len() {
            if self.trees[i].is_some() {
                self.current_idx = i as isize;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::mapping_store::{DefaultMultiMappingStore, MappingStore, VecStore};
    use crate::tests::{init_logger, tree};
    use crate::tree::{Language, SimpleTree};

    fn java(t: SimpleTree) -> Tree {
        Tree::build(Language::Java, &t).unwrap()
    }

    /// Runs the candidate scan and the filtering, without the root last chance.
    fn filtered<'t>(src: &'t Tree, dst: &'t Tree) -> VecStore<IdD> {
        let mapper: Mapper<VecStore<IdD>> = (src, dst).into();
        let mut matcher = GreedySubtreeMatcher {
            internal: SubtreeMatcher::new(mapper, 1),
        };
        let mut mm = DefaultMultiMappingStore::<IdD>::default();
        mm.topit(src.len(), dst.len());
        matcher.internal.matchh_to_be_filtered(&mut mm);
        matcher.filter_mappings(&mm);
        matcher.internal.mapper.mappings
    }

    #[test]
    fn literals_follow_their_left_sibling() {
        init_logger();
        // a, 1, b, 1  against  c, b, 1, a, 1
        let src = java(tree!("Block"; [
            tree!("SimpleName", "a"),
            tree!("NumberLiteral", "1"),
            tree!("SimpleName", "b"),
            tree!("NumberLiteral", "1"),
        ]));
        let dst = java(tree!("Block"; [
            tree!("SimpleName", "c"),
            tree!("SimpleName", "b"),
            tree!("NumberLiteral", "1"),
            tree!("SimpleName", "a"),
            tree!("NumberLiteral", "1"),
        ]));
        let ms = filtered(&src, &dst);
        assert!(ms.has(&0, &3));
        assert!(ms.has(&2, &1));
        assert!(ms.has(&1, &4));
        assert!(ms.has(&3, &2));
        assert_eq!(ms.len(), 4);
    }

    #[test]
    fn names_stay_in_their_conditional_branch() {
        init_logger();
        // c ? x : null  against  d ? null : x; x
        let src = java(tree!("Block"; [
            tree!("ConditionalExpression"; [
                tree!("SimpleName", "c"),
                tree!("SimpleName", "x"),
                tree!("NullLiteral", "null"),
            ]),
        ]));
        let dst = java(tree!("Block"; [
            tree!("ConditionalExpression"; [
                tree!("SimpleName", "d"),
                tree!("NullLiteral", "null"),
                tree!("SimpleName", "x"),
            ]),
            tree!("SimpleName", "x"),
        ]));
        let ms = filtered(&src, &dst);
        assert!(ms.has(&2, &1));
        assert!(!ms.is_src(&1));

        let mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        let matcher = SubtreeMatcher::new(mapper, 1);
        assert!(!matcher.is_name_acceptable(&1, &2));
        assert!(!matcher.is_name_acceptable(&1, &4));
        assert!(matcher.is_name_acceptable(&0, &0));
    }

    #[test]
    fn names_of_calls_match_names_of_calls() {
        let src = java(tree!("MethodInvocation"; [tree!("SimpleName", "f")]));
        let call = java(tree!("MethodInvocation"; [tree!("SimpleName", "f")]));
        let block = java(tree!("Block"; [tree!("SimpleName", "f")]));

        let matcher = SubtreeMatcher::new(Mapper::<VecStore<IdD>>::from((&src, &call)), 1);
        assert!(matcher.is_name_acceptable(&0, &0));
        let matcher = SubtreeMatcher::new(Mapper::<VecStore<IdD>>::from((&src, &block)), 1);
        assert!(!matcher.is_name_acceptable(&0, &0));
        let matcher = SubtreeMatcher::new(Mapper::<VecStore<IdD>>::from((&block, &src)), 1);
        assert!(!matcher.is_name_acceptable(&0, &0));
    }

    #[test]
    fn priority_list_by_height() {
        let t = java(tree!("Block"; [
            tree!("ReturnStatement"; [tree!("SimpleName", "x")]),
            tree!("BreakStatement"),
        ]));
        let mut list = PriorityTreeList::new(&t, t.root(), 1);
        assert_eq!(list.peek_height(), 3);
        assert_eq!(list.pop(), Some(vec![3]));
        list.open_tree(&3);
        list.update_height();
        assert_eq!(list.peek_height(), 2);
        assert_eq!(list.open(), Some(vec![1]));
        assert_eq!(list.peek_height(), 1);
        let mut last = list.pop().unwrap();
        last.sort();
        assert_eq!(last, vec![0, 2]);
        list.update_height();
        assert_eq!(list.peek_height(), -1);
    }
}
