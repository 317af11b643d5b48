// Common utilities shared across artifact loading

pub mod hash;

// Re-exports for convenience
pub use hash::{sha256_file, FileDigest};

// Shared constants
pub const BUFFER_SIZE: usize = 1024 * 1024; // 1MB read buffer; artifact databases are small
