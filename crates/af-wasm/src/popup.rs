//! Popup rule editor.

use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlInputElement, Window};

use af_core::{Rule, RuleEditor, RuleView};

use crate::js_error;
use crate::storage::ChromeStorage;

const URL_PATTERN_ID: &str = "urlPattern";
const SELECTOR_ID: &str = "selector";
const DEFAULT_VALUE_ID: &str = "defaultValue";
const SAVE_BUTTON_ID: &str = "saveRule";
const CLEAR_BUTTON_ID: &str = "clearRules";
const RULES_LIST_ID: &str = "rulesList";

type PopupEditor = RuleEditor<ChromeStorage, PopupView>;

pub struct PopupView {
    window: Window,
    document: Document,
}

impl PopupView {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Window has no document"))?;
        Ok(Self { window, document })
    }

    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }

    /// Current (url pattern, selector, default value) form contents.
    pub fn read_form(&self) -> (String, String, String) {
        let value = |id| self.input(id).map(|input| input.value()).unwrap_or_default();
        (value(URL_PATTERN_ID), value(SELECTOR_ID), value(DEFAULT_VALUE_ID))
    }

    fn element(&self, tag: &str, class: &str, text: Option<&str>) -> Result<Element, JsValue> {
        let el = self.document.create_element(tag)?;
        if !class.is_empty() {
            el.set_class_name(class);
        }
        if text.is_some() {
            el.set_text_content(text);
        }
        Ok(el)
    }

    fn field_row(&self, label: &str, value: &str) -> Result<Element, JsValue> {
        let row = self.element("p", "", None)?;
        row.append_child(&self.element("strong", "", Some(label))?.into())?;
        row.append_child(&self.element("span", "field-value", Some(value))?.into())?;
        Ok(row)
    }

    fn rule_item(&self, index: usize, rule: &Rule) -> Result<Element, JsValue> {
        let item = self.element("div", "rule-item", None)?;
        item.append_child(&self.field_row("Site: ", &rule.url_pattern)?.into())?;
        item.append_child(&self.field_row("Selector: ", &rule.selector)?.into())?;
        item.append_child(&self.field_row("Default value: ", &rule.default_value)?.into())?;

        let delete = self.element("button", "delete-rule", Some("Delete rule"))?;
        delete.set_attribute("data-index", &index.to_string())?;
        item.append_child(&delete)?;
        Ok(item)
    }

    fn try_render(&self, rules: &[Rule]) -> Result<(), JsValue> {
        let list = self
            .document
            .get_element_by_id(RULES_LIST_ID)
            .ok_or_else(|| JsValue::from_str("Missing #rulesList"))?;
        list.set_text_content(None);
        list.append_child(&self.element("h3", "", Some("Saved rules:"))?.into())?;
        for (index, rule) in rules.iter().enumerate() {
            list.append_child(&self.rule_item(index, rule)?.into())?;
        }
        Ok(())
    }
}

impl RuleView for PopupView {
    fn render(&self, rules: &[Rule]) {
        if let Err(e) = self.try_render(rules) {
            log::warn!("Failed to render rules: {}", js_error(&e));
        }
    }

    fn clear_form(&self) {
        for id in [URL_PATTERN_ID, SELECTOR_ID, DEFAULT_VALUE_ID] {
            if let Some(input) = self.input(id) {
                input.set_value("");
            }
        }
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            log::warn!("Failed to show alert: {}", js_error(&e));
        }
    }
}

/// Render the stored rules and wire the save, delete and clear controls.
pub fn start(storage_key: &str) -> Result<(), JsValue> {
    let view = PopupView::new()?;
    let document = view.document.clone();
    let editor: Rc<PopupEditor> = Rc::new(RuleEditor::new(ChromeStorage::new(storage_key), view));

    {
        let editor = editor.clone();
        spawn_local(async move {
            editor.load_and_render().await;
        });
    }

    if let Some(save) = document.get_element_by_id(SAVE_BUTTON_ID) {
        let editor = editor.clone();
        on_click(&save, move |_| {
            let editor = editor.clone();
            let (url_pattern, selector, default_value) = editor.view().read_form();
            spawn_local(async move {
                if let Err(e) = editor.add_rule(&url_pattern, &selector, &default_value).await {
                    log::warn!("Rule not saved: {}", e);
                }
            });
        })?;
    }

    // Delete buttons are re-created on every render, so listen once on the
    // list and resolve the index from the clicked control.
    if let Some(list) = document.get_element_by_id(RULES_LIST_ID) {
        let editor = editor.clone();
        on_click(&list, move |event| {
            let Some(index) = delete_index(&event) else {
                return;
            };
            let editor = editor.clone();
            spawn_local(async move {
                if let Err(e) = editor.delete_rule(index).await {
                    log::warn!("Rule not deleted: {}", e);
                }
            });
        })?;
    }

    if let Some(clear) = document.get_element_by_id(CLEAR_BUTTON_ID) {
        let editor = editor.clone();
        on_click(&clear, move |_| {
            let editor = editor.clone();
            spawn_local(async move {
                if let Err(e) = editor.clear_all_rules().await {
                    log::warn!("Rules not cleared: {}", e);
                }
            });
        })?;
    }

    Ok(())
}

fn on_click(target: &Element, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let callback: &Function = closure.as_ref().unchecked_ref();
    target.add_event_listener_with_callback("click", callback)?;
    closure.forget();
    Ok(())
}

fn delete_index(event: &Event) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let button = target.closest(".delete-rule").ok().flatten()?;
    button.get_attribute("data-index")?.parse().ok()
}
