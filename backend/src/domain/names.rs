//! Display-name canonicalization.
//!
//! Asset filenames in the object store are derived from animal names, so
//! both sides need the same canonical token: NFKC compatibility folding
//! (full-width and half-width variants collapse), lowercasing, then
//! stripping whitespace, punctuation and the separator marks that show up
//! in Japanese animal names.

use unicode_normalization::UnicodeNormalization;

/// Canonical filename-safe token for a display name. Pure and idempotent;
/// empty input yields an empty token.
pub fn normalize_name(name: &str) -> String {
    name.nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| !is_stripped(*c))
        .collect()
}

/// Characters removed after folding: whitespace, ASCII punctuation, and the
/// separator marks NFKC leaves alone (middle dot, ellipses, dashes, the
/// long-vowel mark, wave dash).
fn is_stripped(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(c, '・' | '…' | '‥' | '‐' | '‑' | '–' | '—' | '―' | 'ー' | '〜')
}
