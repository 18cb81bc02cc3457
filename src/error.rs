use thiserror::Error;

/// Errors raised while building a [`crate::tree::Tree`] from its parser-side description.
///
/// Matching itself cannot fail: leaving nodes unmapped is a valid outcome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("tree has {0} nodes, more than a node index can address")]
    TooManyNodes(usize),

    #[error("tree uses more than {0} distinct node types")]
    TooManyTypes(usize),

    #[error(
        "`{ty}` spans {start}..{end}, outside of its parent span {parent_start}..{parent_end}"
    )]
    ChildOutOfRange {
        ty: String,
        start: usize,
        end: usize,
        parent_start: usize,
        parent_end: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
