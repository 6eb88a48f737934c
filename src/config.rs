use serde::Deserialize;

/// Markup substituted into the text before any directive is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichConfig {
    pub line_break: String,
    pub rule_marker: String,
    pub details_open: String,
    pub details_close: String,
    /// `None` leaves nested `@Localize` resolution unbounded.
    pub max_localize_depth: Option<usize>,
}

impl EnrichConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            line_break: "</br>".to_string(),
            rule_marker: "<hr />\n".to_string(),
            details_open: r#"<div class="details">"#.to_string(),
            details_close: "</div>".to_string(),
            max_localize_depth: Some(32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EnrichConfig::from_json(r#"{"line_break": "<br>"}"#).unwrap();
        assert_eq!(config.line_break, "<br>");
        assert_eq!(config.details_close, "</div>");
        assert_eq!(config.max_localize_depth, Some(32));
    }

    #[test]
    fn test_unbounded_depth() {
        let config = EnrichConfig::from_json(r#"{"max_localize_depth": null}"#).unwrap();
        assert_eq!(config.max_localize_depth, None);
    }

    #[test]
    fn test_unknown_field() {
        assert!(EnrichConfig::from_json(r#"{"linebreak": "<br>"}"#).is_err());
    }
}
