//! DOM abstraction used by the filler.

/// Error type for page access.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Failed to dispatch '{event}' event: {reason}")]
    Dispatch { event: &'static str, reason: String },
}

/// A DOM element that may carry a form value.
pub trait FormField: Clone + 'static {
    /// The element's `value` property. `None` when the element has none
    /// (not a form control), which the filler treats as "not empty".
    fn current_value(&self) -> Option<String>;

    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, selector: &str) -> Option<Self>;

    /// First descendant matching `selector`.
    fn query_first(&self, selector: &str) -> Option<Self>;

    fn set_value(&self, value: &str);

    /// Fire a bubbling, non-cancelable synthetic `input` event.
    fn dispatch_input(&self) -> Result<(), PageError>;
}

/// The live page the filler evaluates rules against.
pub trait Page {
    type Field: FormField;

    /// Full URL of the current document.
    fn url(&self) -> String;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Field>, PageError>;
}

/// Resolve the element that should actually receive the value: the inner
/// native input of an enclosing component wrapper when there is one,
/// otherwise the matched element itself.
pub fn effective_target<F: FormField>(field: &F, wrapper_selector: &str, inner_selector: &str) -> F {
    field
        .closest(wrapper_selector)
        .and_then(|wrapper| wrapper.query_first(inner_selector))
        .unwrap_or_else(|| field.clone())
}

/// Write the value and notify listeners as if the user had typed it.
pub fn write_and_notify<F: FormField>(target: &F, value: &str) -> Result<(), PageError> {
    target.set_value(value);
    target.dispatch_input()
}
