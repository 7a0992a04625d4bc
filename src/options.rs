//! Runtime configuration
//!
//! Every policy knob of the object model lives here: space limits, the
//! large-object threshold and the dictionary-mode threshold. Defaults mirror
//! what a desktop-class runtime would use; tests shrink them.

/// Options consumed by [`Context::with_options`](crate::Context::with_options)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Byte limit of the young space
    pub young_space_size: usize,
    /// Byte limit of the old space
    pub old_space_size: usize,
    /// Byte limit of the non-movable space
    pub non_movable_space_size: usize,
    /// Byte limit of the huge-object space
    pub huge_space_size: usize,
    /// Byte limit of the read-only space
    pub read_only_space_size: usize,
    /// Byte limit of the snapshot space
    pub snapshot_space_size: usize,
    /// Objects larger than this go to the huge space
    pub large_object_threshold: usize,
    /// Property count past which an object switches to dictionary mode
    pub dictionary_threshold: u32,
    /// In-object property slots given to plain objects
    pub inline_properties: u32,
    /// Entries in the per-thread transition cache (rounded up to a power of two)
    pub transition_cache_size: usize,
    /// Collect before every allocation
    pub stress_gc: bool,
}

impl RuntimeOptions {
    pub const DEFAULT_DICTIONARY_THRESHOLD: u32 = 1020;
    pub const DEFAULT_INLINE_PROPERTIES: u32 = 4;

    pub fn with_young_space_size(mut self, bytes: usize) -> Self {
        self.young_space_size = bytes;
        self
    }

    pub fn with_old_space_size(mut self, bytes: usize) -> Self {
        self.old_space_size = bytes;
        self
    }

    pub fn with_large_object_threshold(mut self, bytes: usize) -> Self {
        self.large_object_threshold = bytes;
        self
    }

    pub fn with_dictionary_threshold(mut self, count: u32) -> Self {
        self.dictionary_threshold = count;
        self
    }

    pub fn with_inline_properties(mut self, count: u32) -> Self {
        self.inline_properties = count;
        self
    }

    pub fn with_transition_cache_size(mut self, entries: usize) -> Self {
        self.transition_cache_size = entries;
        self
    }

    pub fn with_stress_gc(mut self, enabled: bool) -> Self {
        self.stress_gc = enabled;
        self
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            young_space_size: 4 * 1024 * 1024,
            old_space_size: 256 * 1024 * 1024,
            non_movable_space_size: 16 * 1024 * 1024,
            huge_space_size: 256 * 1024 * 1024,
            read_only_space_size: 256 * 1024,
            snapshot_space_size: 16 * 1024 * 1024,
            large_object_threshold: 256 * 1024,
            dictionary_threshold: Self::DEFAULT_DICTIONARY_THRESHOLD,
            inline_properties: Self::DEFAULT_INLINE_PROPERTIES,
            transition_cache_size: 64,
            stress_gc: cfg!(feature = "debug-gc"),
        }
    }
}
