//! Constants for PCI address handling
//!
//! Keeps separators, sentinels and size limits in one place.

/// Address formatting
pub mod bdf {
    /// Separator between domain, bus and device/function
    pub const FIELD_SEP: char = ':';

    /// Separator between device and function
    pub const FUNC_SEP: char = '.';

    /// Separator used between addresses in a set's string form
    pub const ADDR_SEP: &str = " ";

    /// Canonical rendering of the zero domain
    pub const ZERO_DOMAIN: &str = "0000";
}

/// Size limits for files read from disk
pub mod limits {
    /// Maximum topology snapshot size (8 MiB)
    pub const MAX_SNAPSHOT_SIZE: u64 = 8 * 1024 * 1024;

    /// Maximum config file size (1 MiB)
    pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;
}
