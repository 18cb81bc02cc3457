use std::hash::{DefaultHasher, Hash, Hasher};

pub mod sequence_algorithms;

pub fn hash<T: ?Sized + Hash>(x: &T) -> u64 {
    let mut state = DefaultHasher::default();
    x.hash(&mut state);
    state.finish()
}

pub fn clamp_u64_to_u32(x: &u64) -> u32 {
    ((x >> 32) as u32) ^ (*x as u32)
}

const ENTER: u32 = {
    let mut result = 1u32;
    result = 31 * result + 'e' as u32;
    result = 31 * result + 'n' as u32;
    result = 31 * result + 't' as u32;
    result = 31 * result + 'e' as u32;
    result = 31 * result + 'r' as u32;
    result
};
const LEAVE: u32 = {
    let mut result = 1u32;
    result = 31 * result + 'l' as u32;
    result = 31 * result + 'e' as u32;
    result = 31 * result + 'a' as u32;
    result = 31 * result + 'v' as u32;
    result = 31 * result + 'e' as u32;
    result
};
const BASE: u32 = 33;

/// Rolling hash of a node framed around the accumulated hash of its children.
///
/// `size` is the number of nodes in the subtree, so that the closing frame
/// lands after every child contribution.
pub fn inner_node_hash(kind: u32, label: u32, size: u32, middle_hash: u32) -> u32 {
    let frame = |delimiter: u32| {
        1u32.wrapping_mul(31)
            .wrapping_add(kind)
            .wrapping_mul(31)
            .wrapping_add(label)
            .wrapping_mul(31)
            .wrapping_add(delimiter)
    };
    frame(ENTER)
        .wrapping_add(middle_hash)
        .wrapping_add(frame(LEAVE).wrapping_mul(hash_factor(size)))
}

/// Appends a child contribution to an accumulated middle hash, keeping child order significant.
pub fn acc_child_hash(middle_hash: u32, child_hash: u32, child_size: u32) -> u32 {
    middle_hash
        .wrapping_mul(hash_factor(child_size.wrapping_mul(2)))
        .wrapping_add(child_hash)
}

fn hash_factor(exponent: u32) -> u32 {
    fast_exponentiation(BASE, exponent)
}

fn fast_exponentiation(base: u32, exponent: u32) -> u32 {
    if exponent == 0 {
        1
    } else if exponent == 1 {
        base
    } else {
        let mut result: u32 = 1;
        let mut exponent = exponent;
        let mut base = base;
        while exponent > 0 {
            if (exponent & 1) != 0 {
                result = result.wrapping_mul(base);
            }
            exponent >>= 1;
            base = base.wrapping_mul(base);
        }
        result
    }
}
