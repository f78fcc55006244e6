//! Query string building.

/// Ordered query parameters.
///
/// Empty values are dropped so that blank filters never reach the backend.
///
/// # Example
///
/// ```
/// use trimtool_lib::api::QueryParams;
///
/// let q = QueryParams::new()
///     .text("make", "Toyota")
///     .text("model", "")
///     .number("limit", 50);
/// assert_eq!(q.to_query_string(), "?make=Toyota&limit=50");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text parameter unless it is blank.
    pub fn text(mut self, key: &'static str, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    /// Adds a numeric parameter.
    pub fn number(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Adds a parameter when present.
    pub fn optional(self, key: &'static str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => {
                let v = v.to_string();
                self.text(key, &v)
            }
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `?a=1&b=2`, or an empty string when there are no parameters.
    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let mut serializer = url::form_urlencoded::Serializer::for_suffix(String::from("?"), 1);
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Percent-encodes a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_render_nothing() {
        assert_eq!(QueryParams::new().to_query_string(), "");
        assert_eq!(QueryParams::new().text("make", "   ").to_query_string(), "");
    }

    #[test]
    fn test_values_are_encoded() {
        let q = QueryParams::new().text("model", "Land Cruiser").text("trim_name", "GX&R");
        assert_eq!(q.to_query_string(), "?model=Land+Cruiser&trim_name=GX%26R");
    }

    #[test]
    fn test_optional_skips_none() {
        let q = QueryParams::new()
            .optional("skip", None::<u32>)
            .optional("limit", Some(10));
        assert_eq!(q.to_query_string(), "?limit=10");
    }

    #[test]
    fn test_first_pair_has_no_separator() {
        let q = QueryParams::new().number("skip", 0).number("limit", 50);
        let rendered = q.to_query_string();
        assert_eq!(rendered, "?skip=0&limit=50");
        assert!(!rendered.starts_with("?&"));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("ab/12"), "ab%2F12");
    }
}
