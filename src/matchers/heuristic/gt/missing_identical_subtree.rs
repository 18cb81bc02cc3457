//! Recovery of identical subtrees left unmapped by the primary passes,
//! typically duplicated code where the top-down matcher could not decide.
//!
//! Only pairs of subtrees that no mapping touches yet are considered, so a
//! recovery pass never alters what earlier passes decided.

use logging_timer::time;

use super::acceptance::{AcceptancePredicate, CandidatePair, DefaultAcceptance, Vocabularies};
use super::comparators::FullMappingComparator;
use super::greedy_subtree_matcher::SubtreeMatcher;
use super::{RecoveryConfig, SubtreeMatcherConfig, TreeView};
use crate::matchers::Mapper;
use crate::matchers::mapping_store::{MappingStore, MultiMappingStore};
use crate::tree::{IdD, Language, NodeKind};

pub struct MissingIdenticalSubtree<P = DefaultAcceptance> {
    predicate: P,
    vocabularies: Vocabularies,
    config: RecoveryConfig,
}

impl MissingIdenticalSubtree<DefaultAcceptance> {
    /// Default acceptance rules, both trees read with the same vocabulary.
    pub fn strict(language: Language) -> Self {
        Self {
            predicate: DefaultAcceptance,
            vocabularies: Vocabularies::same(language),
            config: RecoveryConfig::default(),
        }
    }
}

impl<P: AcceptancePredicate> MissingIdenticalSubtree<P> {
    pub fn with_predicate(predicate: P, src_language: Language, dst_language: Language) -> Self {
        Self {
            predicate,
            vocabularies: Vocabularies {
                src: src_language,
                dst: dst_language,
            },
            config: RecoveryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RecoveryConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs over any store, one-to-one or multi-valued: pairs touching an
    /// existing mapping are left out either way.
    pub fn match_it<'t, M, MM>(&self, mapper: Mapper<'t, M>) -> Mapper<'t, M>
    where
        M: MappingStore<Src = IdD, Dst = IdD>,
        MM: MultiMappingStore<Src = IdD, Dst = IdD> + Default,
    {
        let src_root = mapper.src_arena.root();
        let dst_root = mapper.dst_arena.root();
        self.match_subtrees::<M, MM>(mapper, src_root, dst_root)
    }

    /// Recovery restricted to the subtrees of `src_root` and `dst_root`.
    pub fn match_subtrees<'t, M, MM>(&self, mapper: Mapper<'t, M>, src_root: IdD, dst_root: IdD) -> Mapper<'t, M>
    where
        M: MappingStore<Src = IdD, Dst = IdD>,
        MM: MultiMappingStore<Src = IdD, Dst = IdD> + Default,
    {
        let mut internal = SubtreeMatcher::new(mapper, SubtreeMatcherConfig::default().min_height)
            .with_roots(src_root, dst_root);
        internal.src_view = TreeView::with_language(internal.mapper.src_arena, self.vocabularies.src);
        internal.dst_view = TreeView::with_language(internal.mapper.dst_arena, self.vocabularies.dst);
        internal.skip_covered = true;
        internal.ignore_comments = self.config.ignore_comments;

        let mut mm: MM = Default::default();
        mm.topit(internal.mapper.src_arena.len(), internal.mapper.dst_arena.len());
        internal.matchh_to_be_filtered(&mut mm);
        self.filter_mappings(&mut internal, &mm);
        internal.mapper
    }

    #[time("debug")]
    fn filter_mappings<M, MM>(&self, internal: &mut SubtreeMatcher<'_, M>, multi_mappings: &MM)
    where
        M: MappingStore<Src = IdD, Dst = IdD>,
        MM: MultiMappingStore<Src = IdD, Dst = IdD>,
    {
        let src_arena = internal.mapper.src_arena;
        let src_len = src_arena.len();
        let dst_len = internal.mapper.dst_arena.len();
        let mut srcs: Vec<IdD> = multi_mappings.all_mapped_srcs().collect();
        srcs.sort_by_key(|x| (src_arena.pos(x), *x));

        let mut unique = 0;
        let mut ambiguous_list: Vec<(IdD, IdD)> = vec![];
        let mut ignored = bitvec::bitbox![0;src_len];
        for src in srcs {
            if !self.is_eligible(internal, multi_mappings, &src) {
                continue;
            }
            if multi_mappings.is_src_unique(&src) {
                let dst = multi_mappings.get_dsts(&src)[0];
                if multi_mappings.is_dst_unique(&dst) {
                    if self.is_acceptable(internal, &src, &dst) && internal.commit(&src, &dst) {
                        unique += 1;
                    }
                    continue;
                }
            }
            if ignored[src as usize] {
                continue;
            }
            let adsts = multi_mappings.get_dsts(&src);
            let asrcs = multi_mappings.get_srcs(&adsts[0]);
            for asrc in asrcs {
                if !self.is_eligible(internal, multi_mappings, asrc) {
                    continue;
                }
                for adst in adsts {
                    ambiguous_list.push((*asrc, *adst));
                }
            }
            asrcs.iter().for_each(|x| ignored.set(*x as usize, true))
        }
        log::trace!(
            "recovery: {} unique, {} ambiguous candidates",
            unique,
            ambiguous_list.len()
        );

        let mapping_list = FullMappingComparator::new(&internal.mapper).sort(ambiguous_list);

        let mut src_ignored = bitvec::bitbox![0;src_len];
        let mut dst_ignored = bitvec::bitbox![0;dst_len];
        for (src, dst) in &mapping_list {
            if src_ignored[*src as usize] || dst_ignored[*dst as usize] {
                continue;
            }
            if self.is_acceptable(internal, src, dst) {
                internal.accept(src, dst, &mut src_ignored, &mut dst_ignored);
            }
        }
    }

    /// Call receivers never stand alone, small argument lists and type
    /// references neither, and overly duplicated fragments are left out.
    fn is_eligible<M, MM>(&self, internal: &SubtreeMatcher<'_, M>, multi_mappings: &MM, src: &IdD) -> bool
    where
        MM: MultiMappingStore<Src = IdD, Dst = IdD>,
    {
        match internal.src_view.kind(src) {
            NodeKind::MethodInvocationReceiver => return false,
            NodeKind::MethodInvocationArguments | NodeKind::SimpleType
                if internal.mapper.src_arena.height(src) <= self.config.min_height =>
            {
                return false;
            }
            _ => (),
        }
        !self.is_too_ambiguous(multi_mappings, src)
    }

    fn is_too_ambiguous<MM>(&self, multi_mappings: &MM, src: &IdD) -> bool
    where
        MM: MultiMappingStore<Src = IdD, Dst = IdD>,
    {
        let threshold = self.config.ambiguity_threshold;
        let dsts = multi_mappings.get_dsts(src);
        dsts.len() > threshold && multi_mappings.get_srcs(&dsts[0]).len() > threshold
    }

    fn is_acceptable<M>(&self, internal: &SubtreeMatcher<'_, M>, src: &IdD, dst: &IdD) -> bool {
        self.predicate.accept(&CandidatePair {
            src_view: internal.src_view,
            dst_view: internal.dst_view,
            src: *src,
            dst: *dst,
            tiny_return_height: self.config.tiny_return_height,
        })
    }
}
