//! Seed derivation for deterministic option randomization.
//!
//! The hash is the classic 31-multiplier string hash folded into 32 signed
//! bits, computed over UTF-16 code units. It must stay bit-identical across
//! releases: changing it reshuffles every viewer's stored quiz view.

/// Derive a non-negative seed from a stable string key.
///
/// The empty key yields 0.
pub fn derive_seed(key: &str) -> u64 {
    let mut hash: i32 = 0;
    for unit in key.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    i64::from(hash).unsigned_abs()
}

/// The per-viewer, per-question key used in deterministic mode.
pub fn randomization_key(viewer_id: &str, question_id: &str) -> String {
    format!("{viewer_id}-{question_id}")
}
