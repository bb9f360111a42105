//! Two-way binding discovery.
//!
//! A bound input advertises the data path it edits in one of three places,
//! checked in order: a template model attribute, a descriptor injected by the
//! framework devtools, or the component's declared model option. The first
//! source that is present decides, even when its expression is empty.

/// Raw binding information read from an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSources {
    /// All attributes of the element, in attribute order.
    pub attributes: Vec<(String, String)>,
    /// `model.expression` of the devtools binding descriptor, when a
    /// descriptor with a model entry exists.
    pub devtools_expression: Option<String>,
    /// Model-option expression of the component mounted on the element.
    pub model_option_expression: Option<String>,
}

/// `v-model`, `v-model.<modifier>` or `:model`.
#[inline]
pub fn is_model_attribute(name: &str) -> bool {
    name == "v-model" || name.starts_with("v-model.") || name == ":model"
}

/// Pick the binding path from the first present source.
pub fn find_model_binding(sources: &BindingSources) -> Option<ModelPath> {
    if let Some((_, value)) = sources
        .attributes
        .iter()
        .find(|(name, _)| is_model_attribute(name))
    {
        return ModelPath::parse(value);
    }

    sources
        .devtools_expression
        .as_deref()
        .or(sources.model_option_expression.as_deref())
        .and_then(ModelPath::parse)
}

/// Dotted property path such as `form.user.email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPath {
    segments: Vec<String>,
}

impl ModelPath {
    /// `None` for an empty expression.
    pub fn parse(expression: &str) -> Option<Self> {
        if expression.is_empty() {
            return None;
        }
        Some(Self {
            segments: expression.split('.').map(str::to_string).collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Key assigned on the holder object.
    pub fn last(&self) -> &str {
        // parse() never produces an empty segment list
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Walk every segment but the last, starting at `root`. Returns the object
    /// that owns the final key, or `None` as soon as a segment is absent.
    pub fn walk<N, L>(&self, root: &N, mut lookup: L) -> Option<N>
    where
        N: Clone,
        L: FnMut(&N, &str) -> Option<N>,
    {
        let holder_len = self.segments.len().saturating_sub(1);
        let mut current = root.clone();
        for segment in &self.segments[..holder_len] {
            current = lookup(&current, segment)?;
        }
        Some(current)
    }
}

impl std::fmt::Display for ModelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_model_attribute_names() {
        assert!(is_model_attribute("v-model"));
        assert!(is_model_attribute("v-model.trim"));
        assert!(is_model_attribute(":model"));
        assert!(!is_model_attribute("v-models"));
        assert!(!is_model_attribute("model"));
        assert!(!is_model_attribute("data-v-model"));
    }

    #[test]
    fn test_attribute_source_wins() {
        let sources = BindingSources {
            attributes: attrs(&[("class", "x"), ("v-model.trim", "form.email")]),
            devtools_expression: Some("other".into()),
            model_option_expression: Some("third".into()),
        };
        assert_eq!(find_model_binding(&sources).unwrap().to_string(), "form.email");
    }

    #[test]
    fn test_first_model_attribute_in_order() {
        let sources = BindingSources {
            attributes: attrs(&[(":model", "a"), ("v-model", "b")]),
            ..Default::default()
        };
        assert_eq!(find_model_binding(&sources).unwrap().to_string(), "a");
    }

    #[test]
    fn test_fallback_order() {
        let devtools = BindingSources {
            devtools_expression: Some("user.name".into()),
            model_option_expression: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(find_model_binding(&devtools).unwrap().to_string(), "user.name");

        let option = BindingSources {
            model_option_expression: Some("value".into()),
            ..Default::default()
        };
        assert_eq!(find_model_binding(&option).unwrap().to_string(), "value");

        assert!(find_model_binding(&BindingSources::default()).is_none());
    }

    #[test]
    fn test_present_but_empty_source_stops_search() {
        let sources = BindingSources {
            attributes: attrs(&[("v-model", "")]),
            devtools_expression: Some("user.name".into()),
            ..Default::default()
        };
        assert!(find_model_binding(&sources).is_none());

        let devtools_empty = BindingSources {
            devtools_expression: Some(String::new()),
            model_option_expression: Some("value".into()),
            ..Default::default()
        };
        assert!(find_model_binding(&devtools_empty).is_none());
    }

    #[test]
    fn test_walk() {
        let lookup = |node: &&'static str, key: &str| -> Option<&'static str> {
            match (*node, key) {
                ("root", "form") => Some("form"),
                ("form", "user") => Some("user"),
                _ => None,
            }
        };

        let path = ModelPath::parse("form.user.email").unwrap();
        assert_eq!(path.walk(&"root", lookup), Some("user"));
        assert_eq!(path.last(), "email");

        let single = ModelPath::parse("email").unwrap();
        assert_eq!(single.walk(&"root", lookup), Some("root"));

        let broken = ModelPath::parse("form.missing.email").unwrap();
        assert_eq!(broken.walk(&"root", lookup), None);
    }
}
