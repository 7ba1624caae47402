//! Cache key generation.

use crate::types::QueryParams;
use serde::Serialize;

/// Canonical serializations longer than this (in UTF-16 units) are replaced by their hash.
pub const MAX_CANONICAL_KEY_LEN: usize = 200;

#[derive(Serialize)]
struct KeyParts<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a QueryParams>,
    url: &'a str,
}

/// Derives cache keys scoped to one client instance's `source` tag.
#[derive(Debug, Clone)]
pub struct CacheKeyGenerator {
    source: String,
}

impl CacheKeyGenerator {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// `source:{"params":…,"url":…}`, or `source:<hash>` when the JSON form is too long.
    ///
    /// Hashed keys may collide.
    pub fn generate(&self, url: &str, params: Option<&QueryParams>) -> String {
        let canonical = serde_json::to_string(&KeyParts { params, url })
            .unwrap_or_else(|_| url.to_string());
        if canonical.encode_utf16().count() > MAX_CANONICAL_KEY_LEN {
            format!("{}:{}", self.source, string_hash(&canonical))
        } else {
            format!("{}:{}", self.source, canonical)
        }
    }
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new("default")
    }
}

/// 32-bit `h * 31 + c` string hash over UTF-16 units, rendered in base 36.
pub fn string_hash(s: &str) -> String {
    let mut hash: i32 = 0;
    for unit in s.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    to_base36(hash)
}

fn to_base36(n: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let negative = n < 0;
    let mut v = (n as i64).unsigned_abs();
    if v == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while v > 0 {
        out.push(DIGITS[(v % 36) as usize]);
        v /= 36;
    }
    if negative {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamValue;

    #[test]
    fn test_short_key_keeps_canonical_form() {
        let gen = CacheKeyGenerator::new("markets");
        assert_eq!(gen.generate("/assets", None), "markets:{\"url\":\"/assets\"}");

        let mut params = QueryParams::new();
        params.insert("ids".into(), ParamValue::from(vec!["a", "b"]));
        assert_eq!(
            gen.generate("/assets", Some(&params)),
            "markets:{\"params\":{\"ids\":[\"a\",\"b\"]},\"url\":\"/assets\"}"
        );
    }

    #[test]
    fn test_sources_never_collide() {
        let a = CacheKeyGenerator::new("a").generate("/x", None);
        let b = CacheKeyGenerator::new("b").generate("/x", None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_long_key_is_hashed() {
        let gen = CacheKeyGenerator::default();
        let url = format!("/search/{}", "x".repeat(250));
        let key = gen.generate(&url, None);
        assert!(key.starts_with("default:"));
        assert!(key.len() < 30);
        assert_eq!(key, gen.generate(&url, None));
    }

    #[test]
    fn test_threshold_counts_utf16_units() {
        let gen = CacheKeyGenerator::default();
        // 100 astral-plane chars: 110 chars in the JSON form, but 210 UTF-16 units.
        let url = "\u{1F680}".repeat(100);
        let key = gen.generate(&url, None);
        assert!(!key.contains('\u{1F680}'));
        assert!(key.len() < 30);

        // Same char count in the BMP stays canonical.
        let url = "\u{00E9}".repeat(100);
        assert!(gen.generate(&url, None).contains('\u{00E9}'));
    }

    #[test]
    fn test_string_hash_values() {
        assert_eq!(string_hash(""), "0");
        // 'a' = 97 = 2 * 36 + 25
        assert_eq!(string_hash("a"), "2p");
        // "ab" = 97 * 31 + 98 = 3105 = 2 * 1296 + 14 * 36 + 9
        assert_eq!(string_hash("ab"), "2e9");
    }

    #[test]
    fn test_negative_hash_has_sign() {
        let long = "z".repeat(64);
        let h = string_hash(&long);
        let expected_negative = {
            let mut acc: i32 = 0;
            for u in long.encode_utf16() {
                acc = (acc << 5).wrapping_sub(acc).wrapping_add(u as i32);
            }
            acc < 0
        };
        assert_eq!(h.starts_with('-'), expected_negative);
    }
}
