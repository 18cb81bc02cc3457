//! Ranking of competing mappings.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::matchers::Mapper;
use crate::matchers::mapping_store::MappingStore;
use crate::matchers::similarity_metrics::SimilarityMeasure;
use crate::tree::{IdD, Tree};
use crate::utils::sequence_algorithms::longest_common_subsequence;

/// Orders candidate pairs from the most to the least convincing.
///
/// Pairs are ranked by the similarity of their parents' descendants, then by
/// the similarity of their ancestor chains, then by how close their positions
/// in those chains are, then by the distance between their source offsets.
/// Remaining ties fall back to [`compare_positions`].
pub struct FullMappingComparator<'a, M> {
    src_arena: &'a Tree,
    dst_arena: &'a Tree,
    mappings: &'a M,
}

struct Rank {
    sib: f64,
    parent: f64,
    pos_in_parent: f64,
    delta_pos: usize,
}

impl<'a, M: MappingStore<Src = IdD, Dst = IdD>> FullMappingComparator<'a, M> {
    pub fn new(mapper: &'a Mapper<'_, M>) -> Self {
        Self {
            src_arena: mapper.src_arena,
            dst_arena: mapper.dst_arena,
            mappings: &mapper.mappings,
        }
    }

    pub fn sort(&self, ambiguous_mappings: Vec<(IdD, IdD)>) -> Vec<(IdD, IdD)> {
        log::trace!("ambiguous_mappings.len: {}", ambiguous_mappings.len());
        // similarities only depend on parents, shared by siblings
        let mut sib_sim = HashMap::<(Option<IdD>, Option<IdD>), f64>::default();
        let mut parent_sim = HashMap::<(Option<IdD>, Option<IdD>), f64>::default();
        let mut ranked: Vec<_> = ambiguous_mappings
            .into_iter()
            .map(|l| {
                let parents = (self.src_arena.parent(&l.0), self.dst_arena.parent(&l.1));
                let sib = *sib_sim
                    .entry(parents)
                    .or_insert_with(|| self.coef_sib(parents));
                let parent = *parent_sim
                    .entry(parents)
                    .or_insert_with(|| self.coef_parent(&l));
                let rank = Rank {
                    sib,
                    parent,
                    pos_in_parent: self.coef_pos_in_parent(&l),
                    delta_pos: self.src_arena.pos(&l.0).abs_diff(self.dst_arena.pos(&l.1)),
                };
                (rank, l)
            })
            .collect();
        ranked.sort_by(|(ra, a), (rb, b)| {
            rb.sib
                .total_cmp(&ra.sib)
                .then_with(|| rb.parent.total_cmp(&ra.parent))
                .then_with(|| ra.pos_in_parent.total_cmp(&rb.pos_in_parent))
                .then_with(|| ra.delta_pos.cmp(&rb.delta_pos))
                .then_with(|| compare_positions(self.src_arena, self.dst_arena, a, b))
        });
        ranked.into_iter().map(|(_, l)| l).collect()
    }

    fn coef_sib(&self, (p_src, p_dst): (Option<IdD>, Option<IdD>)) -> f64 {
        let (Some(p_src), Some(p_dst)) = (p_src, p_dst) else {
            return 0.;
        };
        SimilarityMeasure::range(
            &self.src_arena.descendants_range(&p_src),
            &self.dst_arena.descendants_range(&p_dst),
            self.mappings,
        )
        .dice()
    }

    fn coef_parent(&self, l: &(IdD, IdD)) -> f64 {
        let s1: Vec<_> = self.src_arena.parents(l.0).collect();
        let s2: Vec<_> = self.dst_arena.parents(l.1).collect();
        if s1.is_empty() && s2.is_empty() {
            return 0.;
        }
        let common = longest_common_subsequence::<_, _, usize, _>(&s1, &s2, |a, b| {
            self.src_arena.same_type(a, self.dst_arena, b)
                && self.src_arena.label(a) == self.dst_arena.label(b)
        });
        (2 * common.len()) as f64 / (s1.len() + s2.len()) as f64
    }

    fn coef_pos_in_parent(&self, l: &(IdD, IdD)) -> f64 {
        let normalized_positions = |arena: &'a Tree, x: IdD| {
            std::iter::once(x).chain(arena.parents(x)).filter_map(move |x| {
                let p = arena.parent(&x)?;
                let i = arena.position_in_parent(&x)?;
                Some(i as f64 / arena.children(&p).len() as f64)
            })
        };
        normalized_positions(self.src_arena, l.0)
            .zip(normalized_positions(self.dst_arena, l.1))
            .map(|(src, dst)| (src - dst) * (src - dst))
            .sum::<f64>()
            .sqrt()
    }
}

/// Ascending source offset, then destination offset, then node indexes.
pub fn compare_positions(
    src_arena: &Tree,
    dst_arena: &Tree,
    a: &(IdD, IdD),
    b: &(IdD, IdD),
) -> Ordering {
    src_arena
        .pos(&a.0)
        .cmp(&src_arena.pos(&b.0))
        .then_with(|| dst_arena.pos(&a.1).cmp(&dst_arena.pos(&b.1)))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::mapping_store::VecStore;
    use crate::tests::tree;
    use crate::tree::Language;

    #[test]
    fn position_breaks_ties() {
        let src = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("NumberLiteral", "1"),
                tree!("NumberLiteral", "1"),
            ]),
        )
        .unwrap();
        let dst = src.clone();
        let mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        let sorted = FullMappingComparator::new(&mapper).sort(vec![(1, 0), (0, 1), (1, 1), (0, 0)]);
        assert_eq!(sorted, vec![(0, 0), (1, 1), (0, 1), (1, 0)]);
    }

    #[test]
    fn similar_parents_first() {
        // the second block shares a mapped sibling with the destination block
        let src = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("Block"; [tree!("StringLiteral", "s"), tree!("SimpleName", "a")]),
                tree!("Block"; [tree!("StringLiteral", "s"), tree!("SimpleName", "b")]),
            ]),
        )
        .unwrap();
        let dst = Tree::build(
            Language::Java,
            &tree!("Block"; [
                tree!("Block"; [tree!("StringLiteral", "s"), tree!("SimpleName", "b")]),
            ]),
        )
        .unwrap();
        let mut mapper: Mapper<VecStore<IdD>> = (&src, &dst).into();
        // b -> b
        mapper.mappings.link(4, 1);
        let sorted = FullMappingComparator::new(&mapper).sort(vec![(0, 0), (3, 0)]);
        assert_eq!(sorted, vec![(3, 0), (0, 0)]);
    }
}
