//! Matchers associate nodes in pairs of trees.
//!
//! Every matcher consumes a [`Mapper`], holding the two trees and the final
//! mapping store, and hands it back with more mappings. Mappings committed by
//! one matcher are never removed by the following ones.

pub mod heuristic;
pub mod mapping_store;
pub mod similarity_metrics;


use serde::Serialize;

use crate::tree::{IdD, Tree};
use mapping_store::{MappingStore, MonoMappingStore};

/// A correspondence between a source node and a destination node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Mapping {
    pub src: IdD,
    pub dst: IdD,
}

impl From<(IdD, IdD)> for Mapping {
    fn from((src, dst): (IdD, IdD)) -> Self {
        Self { src, dst }
    }
}

/// The two trees being matched and the mappings accumulated between them.
///
/// Trees are only borrowed: matchers never alter them.
pub struct Mapper<'t, M> {
    pub src_arena: &'t Tree,
    pub dst_arena: &'t Tree,
    pub mappings: M,
}

impl<'t, M: MappingStore + Default> From<(&'t Tree, &'t Tree)> for Mapper<'t, M> {
    fn from((src_arena, dst_arena): (&'t Tree, &'t Tree)) -> Self {
        let mut mappings = M::default();
        mappings.topit(src_arena.len(), dst_arena.len());
        Self {
            src_arena,
            dst_arena,
            mappings,
        }
    }
}

impl<'t, M: MappingStore> Mapper<'t, M> {
    pub fn mappings(&self) -> &M {
        &self.mappings
    }
}

impl<'t, M: MappingStore<Src = IdD, Dst = IdD>> Mapper<'t, M> {
    /// Links `src` to `dst` and every descendant of `src` to its counterpart in `dst`.
    ///
    /// Both subtrees must be isomorphic, so that their post-order layouts coincide.
    pub fn add_mapping_recursively(&mut self, src: &IdD, dst: &IdD) {
        self.mappings.link(*src, *dst);
        self.src_arena
            .descendants_range(src)
            .zip(self.dst_arena.descendants_range(dst))
            .for_each(|(src, dst)| self.mappings.link(src, dst));
    }
}

impl<'t, M: MonoMappingStore<Src = IdD, Dst = IdD>> Mapper<'t, M> {
    pub fn mappings_in_preorder(&self) -> Vec<Mapping> {
        self.src_arena
            .iter_pre()
            .filter_map(|src| {
                let dst = self.mappings.get_dst(&src)?;
                Some(Mapping { src, dst })
            })
            .collect()
    }
}
