use std::time::Instant;

use super::tr;
use super::{AstDiffConfig, DiffResult, MappingDurations};
use crate::matchers::Mapper;
use crate::matchers::mapping_store::{ExtendedMultiMappingStore, MappingStore, VecStore};
use crate::tree::{IdD, Tree};

pub type AstDiffResult<'t> = DiffResult<Mapper<'t, VecStore<IdD>>, MappingDurations>;

/// Matches `src` against `dst` with the default pass sequence.
pub fn diff<'t>(src: &'t Tree, dst: &'t Tree) -> AstDiffResult<'t> {
    diff_with(src, dst, &AstDiffConfig::default())
}

pub fn diff_with<'t>(src: &'t Tree, dst: &'t Tree, config: &AstDiffConfig) -> AstDiffResult<'t> {
    let now = Instant::now();
    let mut mapper: Mapper<VecStore<IdD>> = (src, dst).into();
    let prepare_t = now.elapsed().as_secs_f64();
    tr!(prepare_t);

    let mut durations = Vec::with_capacity(config.strategies.len());
    let mut passes = Vec::with_capacity(config.strategies.len());
    for strategy in &config.strategies {
        let now = Instant::now();
        mapper = strategy.apply(mapper, config);
        let matcher_t = now.elapsed().as_secs_f64();
        let mappings_s = mapper.mappings().len();
        tr!(matcher_t, mappings_s);
        log::debug!("{:?}: {} mappings", strategy, mappings_s);
        durations.push(matcher_t);
        passes.push((*strategy, mappings_s));
    }

    DiffResult {
        mapping_durations: MappingDurations(durations),
        mapper,
        passes,
    }
}

/// Runs the passes of `config` on the subtrees of `src_root` and `dst_root`
/// only, on top of the mappings already in `mapper`, for instance to match
/// the bodies of two declarations paired beforehand.
pub fn diff_subtrees<'t>(
    mut mapper: Mapper<'t, VecStore<IdD>>,
    src_root: IdD,
    dst_root: IdD,
    config: &AstDiffConfig,
) -> Mapper<'t, VecStore<IdD>> {
    for strategy in &config.strategies {
        mapper = strategy.apply_to(mapper, src_root, dst_root, config);
        log::debug!(
            "{:?} on {} and {}: {} mappings",
            strategy,
            src_root,
            dst_root,
            mapper.mappings().len()
        );
    }
    mapper
}

/// Reruns the recovery passes of `config` over a multi-valued store, such as
/// [`DiffResult::to_extended`] completed with mappings found elsewhere.
pub fn recover_extended<'t>(
    mapper: Mapper<'t, ExtendedMultiMappingStore<IdD>>,
    config: &AstDiffConfig,
) -> Mapper<'t, ExtendedMultiMappingStore<IdD>> {
    config
        .strategies
        .iter()
        .filter(|s| s.is_recovery())
        .fold(mapper, |mapper, strategy| {
            let mapper = strategy.recover(mapper, config);
            log::debug!("{:?}: {} extended mappings", strategy, mapper.mappings().len());
            mapper
        })
}
