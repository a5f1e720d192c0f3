//! Deterministic cache key generation.

use sha2::Digest;
use sha2::Sha256;

use crate::params::QueryParams;

/// Marker folded into the canonical form for aggregated (all-pages)
/// fetches, so a single-resource entry and an all-pages entry for the
/// same endpoint and params never collide.
const ALL_PAGES_MARKER: &str = "#all";

/// Computes the cache key for a request.
///
/// The key is the SHA-256 hex digest of a canonical request form:
/// the slash-trimmed endpoint, a `?`, the name-sorted `k=v` parameter
/// pairs, and (for aggregated fetches) the all-pages marker. Identical
/// logical requests therefore always hash to the identical key,
/// regardless of parameter insertion order; absent parameters are
/// excluded from the form just as they are excluded from the request URL.
pub fn cache_key(endpoint: &str, params: &QueryParams, all_pages: bool) -> String {
    use std::fmt::Write;

    let mut canonical = format!(
        "{}?{}",
        endpoint.trim_matches('/'),
        params.canonical()
    );
    if all_pages {
        canonical.push_str(ALL_PAGES_MARKER);
    }

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();

    let mut key = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(key, "{byte:02x}");
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_requests_share_a_key() {
        let params = QueryParams::new().set("document__key", "wotc-srd");
        assert_eq!(
            cache_key("spells", &params, false),
            cache_key("spells", &params, false)
        );
    }

    #[test]
    fn test_param_order_does_not_matter() {
        let a = QueryParams::new().set("a", 1i64).set("b", 2i64);
        let b = QueryParams::new().set("b", 2i64).set("a", 1i64);
        assert_eq!(cache_key("spells", &a, false), cache_key("spells", &b, false));
    }

    #[test]
    fn test_distinct_endpoints_distinct_keys() {
        let params = QueryParams::new().set("search", "fire");
        assert_ne!(
            cache_key("spells", &params, false),
            cache_key("magicitems", &params, false)
        );
    }

    #[test]
    fn test_all_pages_marker_separates_entries() {
        let params = QueryParams::new();
        assert_ne!(
            cache_key("classes", &params, false),
            cache_key("classes", &params, true)
        );
    }

    #[test]
    fn test_absent_param_equals_omitted_param() {
        let explicit = QueryParams::new()
            .set("search", "orc")
            .set_opt("document__key", None::<&str>);
        let omitted = QueryParams::new().set("search", "orc");
        assert_eq!(
            cache_key("monsters", &explicit, false),
            cache_key("monsters", &omitted, false)
        );
    }

    #[test]
    fn test_slash_trimming_normalizes_endpoint() {
        let params = QueryParams::new();
        assert_eq!(
            cache_key("/classes/", &params, false),
            cache_key("classes", &params, false)
        );
    }

    #[test]
    fn test_delimiters_in_values_never_collide() {
        let smuggled = QueryParams::new().set("document__key", "srd&search=fire");
        let split = QueryParams::new()
            .set("document__key", "srd")
            .set("search", "fire");
        assert_ne!(
            cache_key("spells", &smuggled, false),
            cache_key("spells", &split, false)
        );
    }

    #[test]
    fn test_differing_params_differ() {
        let a = QueryParams::new().set("page", 1i64);
        let b = QueryParams::new().set("page", 2i64);
        assert_ne!(cache_key("spells", &a, false), cache_key("spells", &b, false));
    }
}
