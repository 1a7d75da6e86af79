//! Codec configuration.

/// Default cap on struct nesting during encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied by [crate::schema::Schema] while walking values and bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    /// Deepest struct nesting accepted. The top-level struct is depth 1.
    pub max_depth: usize,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
