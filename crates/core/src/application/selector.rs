// Work Selector
// Deterministic prompt -> catalog item mapping

use crate::domain::{Catalog, WorkItem};
use md5::{Digest, Md5};

/// Pick the catalog item for a prompt
///
/// Pure function of the prompt bytes and the catalog: MD5 of the prompt,
/// read as an unsigned big-endian integer, modulo the catalog length.
/// Every string is valid input, including the empty string.
pub fn select<'a>(prompt: &str, catalog: &'a Catalog) -> &'a WorkItem {
    let index = digest_mod(prompt.as_bytes(), catalog.len());
    &catalog.items()[index]
}

// Exact big-integer modulo, one byte at a time. `modulus` is never zero.
fn digest_mod(bytes: &[u8], modulus: usize) -> usize {
    let modulus = modulus as u128;
    let digest = Md5::digest(bytes);
    digest
        .iter()
        .fold(0u128, |acc, &byte| (acc * 256 + u128::from(byte)) % modulus) as usize
}
