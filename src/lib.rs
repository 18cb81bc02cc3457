//! Structural matching between two versions of a syntax tree.
//!
//! The matchers in [`matchers`] compute a node-to-node correspondence between
//! a source tree and a destination tree, and [`algorithms`] composes them into
//! the usual pass sequence: a greedy top-down pass over identical subtrees, a
//! bottom-up pass driven by similarity, then recovery passes for identical
//! subtrees the first passes left behind because of ambiguity.

pub mod algorithms;
pub mod error;
pub mod matchers;
pub mod tree;
pub mod utils;

pub use error::Error;

#[cfg(test)]
mod tests;
