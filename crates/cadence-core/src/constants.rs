/// Widest query window accepted at the request boundary, in days.
pub const DEFAULT_MAX_WINDOW_DAYS: i64 = 366;

/// Default window reaches this many months before "now" when no bounds are given.
pub const DEFAULT_MONTHS_BEFORE: u32 = 1;

/// Default window reaches this many months after "now" when no bounds are given.
pub const DEFAULT_MONTHS_AFTER: u32 = 2;

/// Label applied to events created without any.
pub const UNLABELED: &str = "unlabeled";

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
