//! Shared constants used across highlightr crates.

/// Theme activated when no other theme is configured.
pub const DEFAULT_THEME: &str = "pojoaque";

/// Coalescing delay between an edit and the engine call, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1_000;

/// Base code font family.
pub const DEFAULT_FONT_FAMILY: &str = "Courier";

/// Base code font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Document-level scope seeded at the bottom of every scope stack.
pub const BASE_SCOPE: &str = "hljs";

/// Class prefix the engine puts on every emitted scope.
pub const SCOPE_CLASS_PREFIX: &str = "hljs-";

/// Thread name of the background highlight worker.
pub const WORKER_THREAD_NAME: &str = "highlightr-worker";

