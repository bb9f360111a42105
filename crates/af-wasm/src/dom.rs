//! `web-sys` implementation of the page seam.

use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventInit, Node, NodeList, Window};

use af_core::{AddedNode, FormField, Page, PageError};

use crate::js_error;

#[derive(Debug, Clone)]
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Window has no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Page for DomPage {
    type Field = DomField;

    fn url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn query_all(&self, selector: &str) -> Result<Vec<DomField>, PageError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| PageError::InvalidSelector {
                selector: selector.to_string(),
                reason: js_error(&e),
            })?;
        Ok(elements(&list).map(DomField).collect())
    }
}

/// Elements of a node list, in list order.
pub(crate) fn elements(list: &NodeList) -> impl Iterator<Item = Element> + '_ {
    (0..list.length())
        .filter_map(move |i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
}

/// A live DOM element.
#[derive(Debug, Clone, PartialEq)]
pub struct DomField(pub Element);

impl DomField {
    pub fn element(&self) -> &Element {
        &self.0
    }
}

impl FormField for DomField {
    fn current_value(&self) -> Option<String> {
        Reflect::get(self.0.as_ref(), &JsValue::from_str("value"))
            .ok()
            .and_then(|value| value.as_string())
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        self.0.closest(selector).ok().flatten().map(DomField)
    }

    fn query_first(&self, selector: &str) -> Option<Self> {
        self.0.query_selector(selector).ok().flatten().map(DomField)
    }

    fn set_value(&self, value: &str) {
        if let Err(e) = Reflect::set(self.0.as_ref(), &JsValue::from_str("value"), &JsValue::from_str(value)) {
            log::warn!("Failed to set value on <{}>: {}", self.0.tag_name(), js_error(&e));
        }
    }

    fn dispatch_input(&self) -> Result<(), PageError> {
        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(false);

        let event = Event::new_with_event_init_dict("input", &init).map_err(|e| PageError::Dispatch {
            event: "input",
            reason: js_error(&e),
        })?;
        self.0.dispatch_event(&event).map_err(|e| PageError::Dispatch {
            event: "input",
            reason: js_error(&e),
        })?;
        Ok(())
    }
}

/// A node delivered in a mutation record's `addedNodes`.
pub struct AddedDomNode(pub Node);

impl AddedNode for AddedDomNode {
    fn matches_selector(&self, selector: &str) -> bool {
        self.0
            .dyn_ref::<Element>()
            .map(|el| el.matches(selector).unwrap_or(false))
            .unwrap_or(false)
    }

    fn contains_selector(&self, selector: &str) -> bool {
        self.0
            .dyn_ref::<Element>()
            .and_then(|el| el.query_selector(selector).ok().flatten())
            .is_some()
    }
}
