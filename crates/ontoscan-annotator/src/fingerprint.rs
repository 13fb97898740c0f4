//! Stable 32-bit term fingerprints.
//!
//! The fingerprint is the join key between the dictionary export, the span
//! matcher replies and the term cache, so it must never change between
//! builds or releases. FNV-1a over the UTF-8 bytes of the normalized term.

const FNV32_OFFSET: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// Trim and upper-case a surface term.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_uppercase()
}

/// Fingerprint of the normalized form of `term`.
pub fn fingerprint(term: &str) -> u32 {
    fnv32(normalize_term(term).as_bytes())
}

/// Fingerprint of a term that is already normalized.
pub fn fingerprint_normalized(normalized: &str) -> u32 {
    fnv32(normalized.as_bytes())
}

fn fnv32(bytes: &[u8]) -> u32 {
    let mut hash = FNV32_OFFSET;
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV32_PRIME);
    }
    hash
}
