macro_rules! tree {
    ( $k:expr ) => {
        crate::tree::SimpleTree::new($k, None, vec![])
    };
    ( $k:expr, $l:expr) => {
        crate::tree::SimpleTree::new($k, Some($l), vec![])
    };
    ( $k:expr, $l:expr; [$($x:expr),+ $(,)?]) => {
        crate::tree::SimpleTree::new($k, Some($l), vec![$($x),+])
    };
    ( $k:expr; [$($x:expr),+ $(,)?]) => {
        crate::tree::SimpleTree::new($k, None, vec![$($x),+])
    };
}
pub(crate) use tree;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) mod examples;
mod tree_tests;
