mod bytes;
mod hash;

pub use bytes::{as_string, exhaust, is_equal, size_to_string, to_bytes};
pub use hash::{DualHasher, compute_crc32};
