//! Compositions of matchers into complete diffs.

use serde::{Deserialize, Serialize};

use crate::matchers::Mapper;
use crate::matchers::heuristic::gt::acceptance::DefaultAcceptance;
use crate::matchers::heuristic::gt::greedy_bottom_up_matcher::GreedyBottomUpMatcher;
use crate::matchers::heuristic::gt::greedy_subtree_matcher::GreedySubtreeMatcher;
use crate::matchers::heuristic::gt::missing_identical_subtree::MissingIdenticalSubtree;
use crate::matchers::heuristic::gt::{BottomUpMatcherConfig, RecoveryConfig, SubtreeMatcherConfig};
use crate::matchers::mapping_store::{
    DefaultMultiMappingStore, ExtendedMultiMappingStore, MappingStore, MonoMappingStore, VecStore,
};
use crate::matchers::Mapping;
use crate::tree::IdD;

pub mod ast_diff;

/// One matching pass. Passes are meant to run in declaration order, each
/// one building on the mappings of the previous ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    TopDown,
    BottomUp,
    /// Recovery with the default acceptance rules, reading both trees with the
    /// vocabulary of the source tree.
    RecoveryStrict,
    /// Recovery with the default acceptance rules, reading each tree with its
    /// own vocabulary.
    RecoveryNonAmbiguous,
}

impl Strategy {
    pub fn apply<'t, M>(&self, mapper: Mapper<'t, M>, config: &AstDiffConfig) -> Mapper<'t, M>
    where
        M: MonoMappingStore<Src = IdD, Dst = IdD>,
    {
        let src_root = mapper.src_arena.root();
        let dst_root = mapper.dst_arena.root();
        self.apply_to(mapper, src_root, dst_root, config)
    }

    /// Runs the pass on the subtrees of `src_root` and `dst_root` only,
    /// treating them as the roots.
    pub fn apply_to<'t, M>(
        &self,
        mapper: Mapper<'t, M>,
        src_root: IdD,
        dst_root: IdD,
        config: &AstDiffConfig,
    ) -> Mapper<'t, M>
    where
        M: MonoMappingStore<Src = IdD, Dst = IdD>,
    {
        match self {
            Strategy::TopDown => GreedySubtreeMatcher::match_subtrees::<DefaultMultiMappingStore<IdD>>(
                mapper,
                src_root,
                dst_root,
                &config.subtree,
            ),
            Strategy::BottomUp => {
                GreedyBottomUpMatcher::match_subtrees(mapper, src_root, dst_root, &config.bottom_up)
            }
            Strategy::RecoveryStrict | Strategy::RecoveryNonAmbiguous => {
                self.recover_subtrees(mapper, src_root, dst_root, config)
            }
        }
    }

    pub fn is_recovery(&self) -> bool {
        matches!(self, Strategy::RecoveryStrict | Strategy::RecoveryNonAmbiguous)
    }

    /// Runs a recovery pass over any store, multi-valued ones included.
    ///
    /// The primary passes need a one-to-one store: here they leave `mapper` as is.
    pub fn recover<'t, M>(&self, mapper: Mapper<'t, M>, config: &AstDiffConfig) -> Mapper<'t, M>
    where
        M: MappingStore<Src = IdD, Dst = IdD>,
    {
        let src_root = mapper.src_arena.root();
        let dst_root = mapper.dst_arena.root();
        self.recover_subtrees(mapper, src_root, dst_root, config)
    }

    fn recover_subtrees<'t, M>(
        &self,
        mapper: Mapper<'t, M>,
        src_root: IdD,
        dst_root: IdD,
        config: &AstDiffConfig,
    ) -> Mapper<'t, M>
    where
        M: MappingStore<Src = IdD, Dst = IdD>,
    {
        match self {
            Strategy::TopDown | Strategy::BottomUp => {
                log::debug!("{:?} needs a one-to-one store, skipped", self);
                mapper
            }
            Strategy::RecoveryStrict => {
                MissingIdenticalSubtree::strict(mapper.src_arena.language())
                    .with_config(config.recovery.clone())
                    .match_subtrees::<M, DefaultMultiMappingStore<IdD>>(mapper, src_root, dst_root)
            }
            Strategy::RecoveryNonAmbiguous => {
                let src_language = mapper.src_arena.language();
                let dst_language = mapper.dst_arena.language();
                MissingIdenticalSubtree::with_predicate(DefaultAcceptance, src_language, dst_language)
                    .with_config(config.recovery.clone())
                    .match_subtrees::<M, DefaultMultiMappingStore<IdD>>(mapper, src_root, dst_root)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstDiffConfig {
    pub strategies: Vec<Strategy>,
    pub subtree: SubtreeMatcherConfig,
    pub bottom_up: BottomUpMatcherConfig,
    pub recovery: RecoveryConfig,
}

impl Default for AstDiffConfig {
    fn default() -> Self {
        Self {
            strategies: vec![Strategy::TopDown, Strategy::BottomUp, Strategy::RecoveryStrict],
            subtree: Default::default(),
            bottom_up: Default::default(),
            recovery: Default::default(),
        }
    }
}

/// Seconds spent in each pass, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MappingDurations(pub Vec<f64>);

impl ComputeTime for MappingDurations {
    fn time(&self) -> f64 {
        self.0.iter().sum()
    }
}

pub struct DiffResult<M, MD> {
    pub mapping_durations: MD,
    pub mapper: M,
    /// Passes that ran, with the size of the mapping after each of them.
    pub passes: Vec<(Strategy, usize)>,
}

#[derive(Debug, Serialize)]
pub struct ResultsSummary<MD> {
    pub mapping_durations: MD,
    pub mappings: usize,
    pub passes: Vec<(Strategy, usize)>,
}

impl<'t, MD: Clone> DiffResult<Mapper<'t, VecStore<IdD>>, MD> {
    pub fn summarize(&self) -> ResultsSummary<MD> {
        ResultsSummary {
            mapping_durations: self.mapping_durations.clone(),
            mappings: self.mapper.mappings.len(),
            passes: self.passes.clone(),
        }
    }
}

impl<'t, MD> DiffResult<Mapper<'t, VecStore<IdD>>, MD> {
    pub fn mappings_in_preorder(&self) -> Vec<Mapping> {
        self.mapper.mappings_in_preorder()
    }

    pub fn to_extended(&self) -> ExtendedMultiMappingStore<IdD> {
        (&self.mapper.mappings).into()
    }
}

pub trait ComputeTime {
    fn time(&self) -> f64;
}

impl<MD> ResultsSummary<MD> {
    pub fn compare_results(&self, other: &Self) -> bool {
        self.mappings == other.mappings && self.passes == other.passes
    }
}

impl<MD: ComputeTime> ComputeTime for ResultsSummary<MD> {
    fn time(&self) -> f64 {
        self.mapping_durations.time()
    }
}

impl<M, MD: ComputeTime> ComputeTime for DiffResult<M, MD> {
    fn time(&self) -> f64 {
        self.mapping_durations.time()
    }
}

impl<MD: ComputeTime> std::fmt::Display for DiffResult<Mapper<'_, VecStore<IdD>>, MD> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "structural matching {}s", self.time())?;
        for (strategy, mappings) in &self.passes {
            writeln!(f, "  {:?}: {}", strategy, mappings)?;
        }
        let src_arena = self.mapper.src_arena;
        let dst_arena = self.mapper.dst_arena;
        for Mapping { src, dst } in self.mappings_in_preorder() {
            writeln!(
                f,
                "{} [{}] -> {} [{}]",
                src_arena.type_name(&src),
                src_arena.pos(&src),
                dst_arena.type_name(&dst),
                dst_arena.pos(&dst),
            )?;
        }
        Ok(())
    }
}

macro_rules! tr {
    ($($val:ident),*) => {
        $(
            log::trace!("{}={}", stringify!($val), $val);
        )*
    };
}
pub(self) use tr;
