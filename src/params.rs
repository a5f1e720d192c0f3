//! Query parameters for API requests.

use std::fmt;

/// A single query parameter value.
///
/// Values are converted to strings when the request URL is built.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A boolean value (rendered as `true`/`false`).
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// An ordered collection of query parameters.
///
/// Parameters are appended to the request URL in insertion order. For
/// cache key generation a canonical, name-sorted rendering is used
/// instead, so logically identical parameter sets always hash alike
/// regardless of insertion order.
///
/// # Example
///
/// ```
/// use open5e_client::params::QueryParams;
///
/// let params = QueryParams::new()
///     .set("document__key", "wotc-srd")
///     .set("search", "fireball")
///     // `None` is skipped entirely - absent from both URL and cache key
///     .set_opt("level", None::<i64>);
///
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, ParamValue)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any existing value for the same name.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name.into(), value.into());
        self
    }

    /// Sets a parameter if the value is `Some`, otherwise leaves the set
    /// unchanged.
    ///
    /// An absent parameter appears in neither the outgoing query string
    /// nor the cache key, so `set_opt(name, None)` and omitting the call
    /// entirely are equivalent.
    pub fn set_opt(self, name: impl Into<String>, value: Option<impl Into<ParamValue>>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }

    pub(crate) fn insert(&mut self, name: String, value: ParamValue) {
        if let Some(pair) = self.pairs.iter_mut().find(|(n, _)| *n == name) {
            pair.1 = value;
        } else {
            self.pairs.push((name, value));
        }
    }

    /// Returns the value for a parameter, if set.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Renders the parameters in canonical form for cache key generation:
    /// name-sorted `name=value` pairs joined with `&`. Names and values
    /// are percent-escaped so a delimiter inside caller text (a search
    /// string, say) can never read as additional pairs.
    pub(crate) fn canonical(&self) -> String {
        // `%` first so escape sequences stay unambiguous
        fn escape(field: &str) -> String {
            field
                .replace('%', "%25")
                .replace('&', "%26")
                .replace('=', "%3D")
        }

        let mut pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|(n, v)| format!("{}={}", escape(n), escape(&v.to_string())))
            .collect();
        pairs.sort();
        pairs.join("&")
    }

    /// Merges `other` into a copy of `self`, with `other` winning on
    /// name collisions. Used to overlay pagination parameters onto
    /// caller-supplied ones.
    pub(crate) fn merged_with(&self, other: &QueryParams) -> QueryParams {
        let mut out = self.clone();
        for (name, value) in &other.pairs {
            out.insert(name.clone(), value.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_existing() {
        let params = QueryParams::new().set("page", 1i64).set("page", 2i64);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("page"), Some(&ParamValue::Int(2)));
    }

    #[test]
    fn test_set_opt_none_is_absent() {
        let with_none = QueryParams::new()
            .set("search", "orc")
            .set_opt("level", None::<i64>);
        let without = QueryParams::new().set("search", "orc");
        assert_eq!(with_none, without);
        assert_eq!(with_none.canonical(), without.canonical());
    }

    #[test]
    fn test_canonical_is_order_insensitive() {
        let a = QueryParams::new().set("a", 1i64).set("b", 2i64);
        let b = QueryParams::new().set("b", 2i64).set("a", 1i64);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_delimiters_in_values_stay_one_pair() {
        let smuggled = QueryParams::new().set("document__key", "srd&search=fire");
        let split = QueryParams::new()
            .set("document__key", "srd")
            .set("search", "fire");
        assert_ne!(smuggled.canonical(), split.canonical());
    }

    #[test]
    fn test_escape_round_trips_literal_percent() {
        let literal = QueryParams::new().set("search", "50%26");
        let escaped_amp = QueryParams::new().set("search", "50&");
        assert_ne!(literal.canonical(), escaped_amp.canonical());
    }

    #[test]
    fn test_iter_preserves_insertion_order() {
        let params = QueryParams::new().set("z", "last?").set("a", "first");
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_merged_with_overlays() {
        let base = QueryParams::new().set("document__key", "wotc-srd").set("limit", 20i64);
        let overlay = QueryParams::new().set("page", 3i64).set("limit", 50i64);
        let merged = base.merged_with(&overlay);
        assert_eq!(merged.get("limit"), Some(&ParamValue::Int(50)));
        assert_eq!(merged.get("page"), Some(&ParamValue::Int(3)));
        assert_eq!(
            merged.get("document__key"),
            Some(&ParamValue::Str("wotc-srd".to_string()))
        );
    }
}
