use serde::Deserialize;

/// Parser-side description of a syntax tree, consumed by [`super::Tree::build`].
///
/// `range` is `(pos, length)` in the source text; when absent it is synthesised
/// from the pre-order rank of the node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimpleTree {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub range: Option<(usize, usize)>,
    #[serde(default)]
    pub children: Vec<SimpleTree>,
}

impl SimpleTree {
    pub fn new(ty: &str, label: Option<&str>, children: Vec<SimpleTree>) -> Self {
        Self {
            ty: ty.to_owned(),
            label: label.map(|s| s.to_owned()),
            range: None,
            children,
        }
    }

    pub fn with_range(mut self, pos: usize, length: usize) -> Self {
        self.range = Some((pos, length));
        self
    }

    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }
}
