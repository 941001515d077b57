/// Nesting depth allowed by [`ParseOptions::default`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Knobs for [`parse_with_options`](crate::parse_with_options).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest list nesting accepted, `None` for no limit. A top-level
    /// `list{}` has depth 1, a bare string or number depth 0.
    pub max_depth: Option<usize>,
}

impl ParseOptions {
    /// No nesting limit. Recursion is then bounded only by the stack.
    pub fn unlimited() -> Self {
        Self { max_depth: None }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}
