//! System-wide constants for the OpenSettle settlement engine.

/// Symbol of the common settlement unit all currencies convert into.
pub const COMMON_UNIT: &str = "SPEND";

/// Maximum (token, amount) entries in a single item lot.
pub const MAX_LOT_ENTRIES: usize = 32;

/// Maximum discounts registrable per listing (anti-flood; the discount
/// scan is linear).
pub const MAX_DISCOUNTS_PER_LISTING: usize = 64;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenSettle";
