//! Decoder limits
//!
//! Records come from files and sockets that may be damaged or hostile, so the
//! decoder refuses lengths and nesting beyond these bounds instead of
//! allocating or recursing without limit.

/// Default maximum nesting depth of containers
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default maximum declared length of a text, blob or collection (256 MiB)
pub const DEFAULT_MAX_LENGTH: u64 = 256 * 1024 * 1024;

/// Safety limits applied while decoding records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum container nesting depth
    pub max_depth: usize,
    /// Maximum declared length of a single text, blob or collection
    pub max_length: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Limits {
    /// Set how many containers may nest inside one record
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the largest byte length or element count a record may declare
    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = max_length;
        self
    }
}
