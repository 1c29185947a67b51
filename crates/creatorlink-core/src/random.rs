//! Short random tokens used for slugs and storage object names.

use rand_core::{OsRng, RngCore};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A lowercase alphanumeric token of exactly `len` characters.
pub fn base36_token(len: usize) -> String {
  (0..len)
    .map(|_| BASE36[(OsRng.next_u32() % 36) as usize] as char)
    .collect()
}
