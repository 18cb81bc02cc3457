use super::bottom_up_matcher::LastChance;
use super::{BottomUpMatcherConfig, TreeView, infix_operators_differ};
use crate::matchers::Mapper;
use crate::matchers::mapping_store::{MonoMappingStore, TreeMappingStore};
use crate::matchers::similarity_metrics;
use crate::tree::IdD;

/// Bottom-up matcher: pairs unmapped inner nodes with the destination
/// ancestor sharing most of their mapped descendants, then recovers their
/// children with last-chance matching.
pub struct GreedyBottomUpMatcher<'t, M> {
    internal: Mapper<'t, M>,
    config: BottomUpMatcherConfig,
}

impl<'t, M> From<GreedyBottomUpMatcher<'t, M>> for Mapper<'t, M> {
    fn from(value: GreedyBottomUpMatcher<'t, M>) -> Self {
        value.internal
    }
}

impl<'t, M: MonoMappingStore<Src = IdD, Dst = IdD>> GreedyBottomUpMatcher<'t, M> {
    pub fn match_it(mapper: Mapper<'t, M>) -> Mapper<'t, M> {
        Self::match_with(mapper, &BottomUpMatcherConfig::default())
    }

    pub fn match_with(mapper: Mapper<'t, M>, config: &BottomUpMatcherConfig) -> Mapper<'t, M> {
        let src_root = mapper.src_arena.root();
        let dst_root = mapper.dst_arena.root();
        Self::match_subtrees(mapper, src_root, dst_root, config)
    }

    /// Matches the subtree of `src_root` against the subtree of `dst_root`,
    /// on top of the mappings already in `mapper`. The pair plays the part of
    /// the roots.
    pub fn match_subtrees(
        mut mapper: Mapper<'t, M>,
        src_root: IdD,
        dst_root: IdD,
        config: &BottomUpMatcherConfig,
    ) -> Mapper<'t, M> {
        mapper
            .mappings
            .topit(mapper.src_arena.len(), mapper.dst_arena.len());
        let mut matcher = Self {
            internal: mapper,
            config: config.clone(),
        };
        matcher.execute(src_root, dst_root);
        matcher.into()
    }

    fn execute(&mut self, src_root: IdD, dst_root: IdD) {
        let mapper = &mut self.internal;
        let src_arena = mapper.src_arena;
        let dst_arena = mapper.dst_arena;
        let src_view = TreeView::new(src_arena);
        let dst_view = TreeView::new(dst_arena);
        let options = LastChance {
            ignore_comments: self.config.ignore_comments,
            from_roots: false,
        };
        // the root comes last in post-order
        for a in src_arena.lld(&src_root)..=src_root {
            if options.ignore_comments && src_arena.kind(&a).is_comment() {
                continue;
            }
            if a == src_root {
                if src_arena.same_type(&a, dst_arena, &dst_root)
                    && !mapper.mappings.is_src(&a)
                    && !mapper.mappings.is_dst(&dst_root)
                {
                    mapper.mappings.link(a, dst_root);
                    let roots = LastChance {
                        from_roots: true,
                        ..options
                    };
                    mapper.last_chance_match(&a, &dst_root, roots);
                    continue;
                }
            } else if !(mapper.mappings.is_src(&a) || src_arena.is_leaf(&a)) {
                let candidates = mapper.get_dst_candidates(&a, &dst_root);
                let mut best = None;
                let mut max: f64 = -1.;
                for cand in candidates {
                    let threshold = 1. / (1. + ((dst_arena.size(&cand) + src_arena.size(&a)) as f64).ln());
                    let sim = similarity_metrics::chawathe_similarity(
                        &src_arena.descendants_range(&a),
                        &dst_arena.descendants_range(&cand),
                        &mapper.mappings,
                    );
                    if sim > max && sim >= threshold {
                        max = sim;
                        best = Some(cand);
                    }
                }

                if let Some(best) = best {
                    mapper.last_chance_match(&a, &best, options);
                    if !infix_operators_differ(&src_view, &a, &dst_view, &best) {
                        mapper.mappings.link_if_both_unmapped(a, best);
                    }
                }
                continue;
            }
            if !self.config.second_chance {
                continue;
            }
            let Some(b) = mapper.mappings.get_dst(&a) else {
                continue;
            };
            if mapper.mappings.has_unmapped_src_children(src_arena, &a)
                && mapper.mappings.has_unmapped_dst_children(dst_arena, &b)
            {
                mapper.last_chance_match(&a, &b, options);
            }
        }
        log::debug!("bottom-up: {} mappings", mapper.mappings.len());
    }
}
