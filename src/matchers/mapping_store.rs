use std::fmt::Debug;

use num_traits::{PrimInt, cast, one, zero};

use crate::tree::{IdD, Tree};

pub trait MappingStore: Clone + Default {
    type Src;
    type Dst;
    /// Sizes the store for trees of `left` and `right` nodes.
    fn topit(&mut self, left: usize, right: usize);
    fn len(&self) -> usize;
    fn capacity(&self) -> (usize, usize);
    fn has(&self, src: &Self::Src, dst: &Self::Dst) -> bool;
    fn link(&mut self, src: Self::Src, dst: Self::Dst);
    fn cut(&mut self, src: Self::Src, dst: Self::Dst);
    fn is_src(&self, src: &Self::Src) -> bool;
    fn is_dst(&self, dst: &Self::Dst) -> bool;
    /// Every counterpart of `src`, none when it is unmapped.
    fn dsts_of(&self, src: &Self::Src) -> impl Iterator<Item = Self::Dst> + '_;
}
pub type DefaultMappingStore<T> = VecStore<T>;

pub trait MonoMappingStore: MappingStore {
    type Iter<'a>: Iterator<Item = (Self::Src, Self::Dst)>
    where
        Self: 'a;
    fn get_src(&self, dst: &Self::Dst) -> Option<Self::Src>;
    fn get_dst(&self, src: &Self::Src) -> Option<Self::Dst>;
    /// Links `t1` and `t2` only if neither is mapped yet.
    fn link_if_both_unmapped(&mut self, t1: Self::Src, t2: Self::Dst) -> bool;
    /// Mapped pairs, by ascending source.
    fn iter(&self) -> Self::Iter<'_>;
}

pub trait MultiMappingStore: MappingStore {
    type Iter1<'a>: Iterator<Item = Self::Src>
    where
        Self: 'a;
    type Iter2<'a>: Iterator<Item = Self::Dst>
    where
        Self: 'a;
    fn get_srcs(&self, dst: &Self::Dst) -> &[Self::Src];
    fn get_dsts(&self, src: &Self::Src) -> &[Self::Dst];
    fn all_mapped_srcs(&self) -> Self::Iter1<'_>;
    fn all_mapped_dsts(&self) -> Self::Iter2<'_>;
    fn is_src_unique(&self, src: &Self::Src) -> bool;
    fn is_dst_unique(&self, dst: &Self::Dst) -> bool;
}
pub type DefaultMultiMappingStore<T> = MultiVecStore<T>;

/// Bijective store, each side indexed by node.
///
/// Entries hold the counterpart plus one, zero meaning unmapped.
#[derive(Debug, Clone)]
pub struct VecStore<T> {
    pub src_to_dst: Vec<T>,
    pub dst_to_src: Vec<T>,
}

impl<T> Default for VecStore<T> {
    fn default() -> Self {
        Self {
            src_to_dst: Default::default(),
            dst_to_src: Default::default(),
        }
    }
}

fn idx<T: PrimInt>(x: &T) -> usize {
    x.to_usize().unwrap_or(usize::MAX)
}

impl<T: PrimInt + Debug> MappingStore for VecStore<T> {
    type Src = T;
    type Dst = T;

    fn len(&self) -> usize {
        self.src_to_dst.iter().filter(|x| **x != zero()).count()
    }

    fn capacity(&self) -> (usize, usize) {
        (self.src_to_dst.len(), self.dst_to_src.len())
    }

    fn link(&mut self, src: T, dst: T) {
        debug_assert!(!self.is_src(&src), "{:?} is already mapped", src);
        debug_assert!(!self.is_dst(&dst), "{:?} is already mapped", dst);
        self.src_to_dst[idx(&src)] = dst + one();
        self.dst_to_src[idx(&dst)] = src + one();
    }

    fn cut(&mut self, src: T, dst: T) {
        self.src_to_dst[idx(&src)] = zero();
        self.dst_to_src[idx(&dst)] = zero();
    }

    fn is_src(&self, src: &T) -> bool {
        self.src_to_dst[idx(src)] != zero()
    }

    fn is_dst(&self, dst: &T) -> bool {
        self.dst_to_src[idx(dst)] != zero()
    }

    fn topit(&mut self, left: usize, right: usize) {
        self.src_to_dst.resize(left, zero());
        self.dst_to_src.resize(right, zero());
    }

    fn has(&self, src: &T, dst: &T) -> bool {
        self.src_to_dst[idx(src)] == *dst + one() && self.dst_to_src[idx(dst)] == *src + one()
    }

    fn dsts_of(&self, src: &T) -> impl Iterator<Item = T> + '_ {
        self.get_dst(src).into_iter()
    }
}

impl<T: PrimInt + Debug> MonoMappingStore for VecStore<T> {
    type Iter<'a>
        = MonoIter<'a, T>
    where
        Self: 'a;

    fn get_src(&self, dst: &T) -> Option<T> {
        self.dst_to_src
            .get(idx(dst))
            .filter(|x| !x.is_zero())
            .map(|x| *x - one())
    }

    fn get_dst(&self, src: &T) -> Option<T> {
        self.src_to_dst
            .get(idx(src))
            .filter(|x| !x.is_zero())
            .map(|x| *x - one())
    }

    fn link_if_both_unmapped(&mut self, t1: T, t2: T) -> bool {
        if !self.is_src(&t1) && !self.is_dst(&t2) {
            self.link(t1, t2);
            true
        } else {
            false
        }
    }

    fn iter(&self) -> Self::Iter<'_> {
        MonoIter {
            v: self.src_to_dst.iter().enumerate(),
        }
    }
}

pub struct MonoIter<'a, T: 'a> {
    v: std::iter::Enumerate<core::slice::Iter<'a, T>>,
}

impl<T: PrimInt> Iterator for MonoIter<'_, T> {
    type Item = (T, T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, x) = self.v.next()?;
            if !x.is_zero() {
                if let Some(i) = cast::<_, T>(i) {
                    return Some((i, *x - one()));
                }
            }
        }
    }
}

/// Many-to-many store, used to stage candidates before choosing among them.
#[derive(Debug, Clone)]
pub struct MultiVecStore<T> {
    pub src_to_dsts: Vec<Option<Vec<T>>>,
    pub dst_to_srcs: Vec<Option<Vec<T>>>,
}

impl<T> Default for MultiVecStore<T> {
    fn default() -> Self {
        Self {
            src_to_dsts: Default::default(),
            dst_to_srcs: Default::default(),
        }
    }
}

fn remove_from<T: PartialEq>(slot: &mut Option<Vec<T>>, x: &T) {
    if let Some(v) = slot {
        if let Some(i) = v.iter().position(|y| y == x) {
            v.remove(i);
        }
        if v.is_empty() {
            *slot = None;
        }
    }
}

impl<T: PrimInt + Debug> MappingStore for MultiVecStore<T> {
    type Src = T;
    type Dst = T;

    fn len(&self) -> usize {
        self.src_to_dsts
            .iter()
            .filter_map(|x| x.as_ref())
            .map(|x| x.len())
            .sum()
    }

    fn capacity(&self) -> (usize, usize) {
        (self.src_to_dsts.len(), self.dst_to_srcs.len())
    }

    fn link(&mut self, src: T, dst: T) {
        self.src_to_dsts[idx(&src)].get_or_insert_with(Vec::new).push(dst);
        self.dst_to_srcs[idx(&dst)].get_or_insert_with(Vec::new).push(src);
    }

    fn cut(&mut self, src: T, dst: T) {
        remove_from(&mut self.src_to_dsts[idx(&src)], &dst);
        remove_from(&mut self.dst_to_srcs[idx(&dst)], &src);
    }

    fn is_src(&self, src: &T) -> bool {
        self.src_to_dsts[idx(src)].is_some()
    }

    fn is_dst(&self, dst: &T) -> bool {
        self.dst_to_srcs[idx(dst)].is_some()
    }

    fn topit(&mut self, left: usize, right: usize) {
        self.src_to_dsts.resize(left, None);
        self.dst_to_srcs.resize(right, None);
    }

    fn has(&self, src: &T, dst: &T) -> bool {
        self.src_to_dsts[idx(src)]
            .as_ref()
            .is_some_and(|v| v.contains(dst))
            && self.dst_to_srcs[idx(dst)]
                .as_ref()
                .is_some_and(|v| v.contains(src))
    }

    fn dsts_of(&self, src: &T) -> impl Iterator<Item = T> + '_ {
        self.get_dsts(src).iter().copied()
    }
}

impl<T: PrimInt + Debug> MultiMappingStore for MultiVecStore<T> {
    type Iter1<'a>
        = Iter<'a, T>
    where
        T: 'a;
    type Iter2<'a>
        = Iter<'a, T>
    where
        T: 'a;

    fn get_srcs(&self, dst: &T) -> &[T] {
        self.dst_to_srcs[idx(dst)].as_deref().unwrap_or(&[])
    }

    fn get_dsts(&self, src: &T) -> &[T] {
        self.src_to_dsts[idx(src)].as_deref().unwrap_or(&[])
    }

    fn all_mapped_srcs(&self) -> Iter<'_, T> {
        Iter {
            v: self.src_to_dsts.iter().enumerate(),
        }
    }

    fn all_mapped_dsts(&self) -> Iter<'_, T> {
        Iter {
            v: self.dst_to_srcs.iter().enumerate(),
        }
    }

    fn is_src_unique(&self, src: &T) -> bool {
        self.get_dsts(src).len() == 1
    }

    fn is_dst_unique(&self, dst: &T) -> bool {
        self.get_srcs(dst).len() == 1
    }
}

pub struct Iter<'a, T: 'a> {
    v: std::iter::Enumerate<core::slice::Iter<'a, Option<Vec<T>>>>,
}

impl<T: PrimInt> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, x) = self.v.next()?;
            if x.is_some() {
                if let Some(i) = cast::<_, T>(i) {
                    return Some(i);
                }
            }
        }
    }
}

/// Multi-valued form of a final mapping, for consumers that keep every
/// correspondence of duplicated subtrees.
///
/// Unlike [`MultiVecStore`] it is meant to be read after matching, so it can be
/// built from a [`VecStore`] and iterated pair by pair.
#[derive(Debug, Clone)]
pub struct ExtendedMultiMappingStore<T> {
    internal: MultiVecStore<T>,
}

impl<T> Default for ExtendedMultiMappingStore<T> {
    fn default() -> Self {
        Self {
            internal: Default::default(),
        }
    }
}

impl<T: PrimInt + Debug> ExtendedMultiMappingStore<T> {
    /// Mapped pairs, by ascending source then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (T, T)> + '_ {
        self.internal
            .all_mapped_srcs()
            .flat_map(move |s| self.internal.get_dsts(&s).iter().map(move |d| (s, *d)))
    }
}

impl<T: PrimInt + Debug> From<&VecStore<T>> for ExtendedMultiMappingStore<T> {
    fn from(store: &VecStore<T>) -> Self {
        let mut r = Self::default();
        let (left, right) = store.capacity();
        r.topit(left, right);
        for (src, dst) in store.iter() {
            r.link(src, dst);
        }
        r
    }
}

impl<T: PrimInt + Debug> MappingStore for ExtendedMultiMappingStore<T> {
    type Src = T;
    type Dst = T;

    fn topit(&mut self, left: usize, right: usize) {
        self.internal.topit(left, right)
    }

    fn len(&self) -> usize {
        self.internal.len()
    }

    fn capacity(&self) -> (usize, usize) {
        self.internal.capacity()
    }

    fn has(&self, src: &T, dst: &T) -> bool {
        self.internal.has(src, dst)
    }

    /// Ignores pairs already present.
    fn link(&mut self, src: T, dst: T) {
        if !self.internal.has(&src, &dst) {
            self.internal.link(src, dst)
        }
    }

    fn cut(&mut self, src: T, dst: T) {
        self.internal.cut(src, dst)
    }

    fn is_src(&self, src: &T) -> bool {
        self.internal.is_src(src)
    }

    fn is_dst(&self, dst: &T) -> bool {
        self.internal.is_dst(dst)
    }

    fn dsts_of(&self, src: &T) -> impl Iterator<Item = T> + '_ {
        self.internal.dsts_of(src)
    }
}

impl<T: PrimInt + Debug> MultiMappingStore for ExtendedMultiMappingStore<T> {
    type Iter1<'a>
        = Iter<'a, T>
    where
        T: 'a;
    type Iter2<'a>
        = Iter<'a, T>
    where
        T: 'a;

    fn get_srcs(&self, dst: &T) -> &[T] {
        self.internal.get_srcs(dst)
    }

    fn get_dsts(&self, src: &T) -> &[T] {
        self.internal.get_dsts(src)
    }

    fn all_mapped_srcs(&self) -> Iter<'_, T> {
        self.internal.all_mapped_srcs()
    }

    fn all_mapped_dsts(&self) -> Iter<'_, T> {
        self.internal.all_mapped_dsts()
    }

    fn is_src_unique(&self, src: &T) -> bool {
        self.internal.is_src_unique(src)
    }

    fn is_dst_unique(&self, dst: &T) -> bool {
        self.internal.is_dst_unique(dst)
    }
}

/// Queries combining a store with the trees it maps.
pub trait TreeMappingStore: MappingStore<Src = IdD, Dst = IdD> {
    /// Neither `src` nor any of its descendants is mapped.
    fn are_srcs_unmapped(&self, src_arena: &Tree, src: &IdD) -> bool {
        !self.is_src(src)
            && src_arena
                .descendants_range(src)
                .all(|x| !self.is_src(&x))
    }

    /// Neither `dst` nor any of its descendants is mapped.
    fn are_dsts_unmapped(&self, dst_arena: &Tree, dst: &IdD) -> bool {
        !self.is_dst(dst)
            && dst_arena
                .descendants_range(dst)
                .all(|x| !self.is_dst(&x))
    }

    /// `src` or one of its descendants already takes part in a mapping.
    fn is_src_covered(&self, src_arena: &Tree, src: &IdD) -> bool {
        !self.are_srcs_unmapped(src_arena, src)
    }

    /// `dst` or one of its descendants already takes part in a mapping.
    fn is_dst_covered(&self, dst_arena: &Tree, dst: &IdD) -> bool {
        !self.are_dsts_unmapped(dst_arena, dst)
    }

    /// `src` and every one of its descendants are mapped.
    fn is_src_fully_mapped(&self, src_arena: &Tree, src: &IdD) -> bool {
        self.is_src(src) && src_arena.descendants_range(src).all(|x| self.is_src(&x))
    }

    /// `dst` and every one of its descendants are mapped.
    fn is_dst_fully_mapped(&self, dst_arena: &Tree, dst: &IdD) -> bool {
        self.is_dst(dst) && dst_arena.descendants_range(dst).all(|x| self.is_dst(&x))
    }

    fn has_unmapped_src_children(&self, src_arena: &Tree, src: &IdD) -> bool {
        src_arena.children(src).iter().any(|x| !self.is_src(x))
    }

    fn has_unmapped_dst_children(&self, dst_arena: &Tree, dst: &IdD) -> bool {
        dst_arena.children(dst).iter().any(|x| !self.is_dst(x))
    }
}

impl<M: MappingStore<Src = IdD, Dst = IdD>> TreeMappingStore for M {}
