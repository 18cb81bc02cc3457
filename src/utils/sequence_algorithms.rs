use num_traits::PrimInt;

/// Returns the longest common subsequence between two sequences, elements being
/// compared with `cmp`.
///
/// The result is a list of index pairs, ascending on both sides, matching an
/// index of `s0` to an index of `s1`.
pub fn longest_common_subsequence<T1, T2, U: PrimInt, F: Fn(&T1, &T2) -> bool>(
    s0: &[T1],
    s1: &[T2],
    cmp: F,
) -> Vec<(U, U)> {
    let mut lens: Vec<Vec<u32>> = vec![vec![0u32; s1.len() + 1]; s0.len() + 1];
    for (i, x0) in s0.iter().enumerate() {
        for (j, x1) in s1.iter().enumerate() {
            if cmp(x0, x1) {
                lens[i + 1][j + 1] = lens[i][j] + 1;
            } else {
                lens[i + 1][j + 1] = Ord::max(lens[i + 1][j], lens[i][j + 1]);
            }
        }
    }
    extract_indexes(lens, s0.len(), s1.len())
}

pub fn extract_indexes<T: Eq, U: PrimInt>(
    lens: Vec<Vec<T>>,
    len1: usize,
    len2: usize,
) -> Vec<(U, U)> {
    let mut indexes = vec![];
    let mut x = len1;
    let mut y = len2;
    while x != 0 && y != 0 {
        if lens[x][y] == lens[x - 1][y] {
            x -= 1;
        } else if lens[x][y] == lens[x][y - 1] {
            y -= 1;
        } else {
            // the table is never larger than the inputs, so indexes always fit
            indexes.push((
                U::from(x - 1).unwrap_or_else(U::max_value),
                U::from(y - 1).unwrap_or_else(U::max_value),
            ));
            x -= 1;
            y -= 1;
        }
    }
    indexes.into_iter().rev().collect()
}
