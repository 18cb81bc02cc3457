use std::ops::Range;

use num_traits::PrimInt;

use super::mapping_store::MappingStore;

/// Similarity between two sets of descendants, given as post-order ranges,
/// counted over the pairs already present in a mapping.
///
/// With a multi-valued store, a source node counts once when any of its
/// counterparts lies in the destination range.
pub struct SimilarityMeasure {
    ncd: u32,
    src_l: usize,
    dst_l: usize,
}

impl SimilarityMeasure {
    pub fn range<Id1: PrimInt, Id2: PrimInt, Store: MappingStore<Src = Id1, Dst = Id2>>(
        src: &Range<Id1>,
        dst: &Range<Id2>,
        mappings: &Store,
    ) -> Self {
        Self {
            ncd: number_of_common_descendants_ranges(src, dst, mappings),
            src_l: (src.end - src.start).to_usize().unwrap_or(0),
            dst_l: (dst.end - dst.start).to_usize().unwrap_or(0),
        }
    }

    pub fn chawathe(&self) -> f64 {
        let max = f64::max(self.src_l as f64, self.dst_l as f64);
        ratio(self.ncd as f64, max)
    }

    pub fn overlap(&self) -> f64 {
        let min = f64::min(self.src_l as f64, self.dst_l as f64);
        ratio(self.ncd as f64, min)
    }

    pub fn dice(&self) -> f64 {
        ratio(2.0_f64 * (self.ncd as f64), self.src_l as f64 + self.dst_l as f64)
    }

    pub fn jaccard(&self) -> f64 {
        let num = self.ncd as f64;
        let den = self.src_l as f64 + self.dst_l as f64 - num;
        ratio(num, den)
    }
}

/// Empty sets have nothing in common.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0. { 0. } else { num / den }
}

pub fn chawathe_similarity<
    Id1: PrimInt,
    Id2: PrimInt,
    Store: MappingStore<Src = Id1, Dst = Id2>,
>(
    src: &Range<Id1>,
    dst: &Range<Id2>,
    mappings: &Store,
) -> f64 {
    SimilarityMeasure::range(src, dst, mappings).chawathe()
}

pub fn dice_similarity<
    Id1: PrimInt,
    Id2: PrimInt,
    Store: MappingStore<Src = Id1, Dst = Id2>,
>(
    src: &Range<Id1>,
    dst: &Range<Id2>,
    mappings: &Store,
) -> f64 {
    SimilarityMeasure::range(src, dst, mappings).dice()
}

pub fn number_of_common_descendants_ranges<
    Id1: PrimInt,
    Id2: PrimInt,
    Store: MappingStore<Src = Id1, Dst = Id2>,
>(
    src: &Range<Id1>,
    dst: &Range<Id2>,
    mappings: &Store,
) -> u32 {
    let mut common = 0;
    let mut t = src.start;
    while t < src.end {
        if mappings.dsts_of(&t).any(|m| dst.contains(&m)) {
            common += 1;
        }
        t = t + Id1::one();
    }
    common
}
