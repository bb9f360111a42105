//! Vue 2 adapter.
//!
//! Vue 2 attaches the component instance to its mount element as `__vue__`.
//! Writes go through `vm.$set` so reactive dependents re-render, and the DOM
//! mirror happens inside `vm.$nextTick`.

use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Window};

use af_core::{BindingSources, FrameworkError, InstanceProbe, InstanceResolver, ReactiveFramework};

use crate::dom::{elements, DomField};
use crate::js_error;

/// Property lookup that treats any falsy result as absent.
fn truthy_prop(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(JsValue::is_truthy)
}

fn method(target: &JsValue, name: &'static str) -> Result<Function, FrameworkError> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or(FrameworkError::MissingPrimitive(name))
}

// =============================================================================
// Instance probes
// =============================================================================

/// Instance attached to the conventional root mount element.
pub struct MountPointProbe {
    document: Document,
    selector: &'static str,
}

impl InstanceProbe<JsValue> for MountPointProbe {
    fn name(&self) -> &'static str {
        "mount-point"
    }

    fn find(&self) -> Option<JsValue> {
        let el = self.document.query_selector(self.selector).ok().flatten()?;
        truthy_prop(el.as_ref(), "__vue__")
    }
}

/// Root instance published on a well-known global.
pub struct GlobalRootProbe {
    window: Window,
    global: &'static str,
}

impl InstanceProbe<JsValue> for GlobalRootProbe {
    fn name(&self) -> &'static str {
        "global-root"
    }

    fn find(&self) -> Option<JsValue> {
        truthy_prop(self.window.as_ref(), self.global)
    }
}

/// Root of the first instance found on an element carrying the scoped-style
/// marker attribute.
///
/// Scoped styles emit `data-v-<hash>`, never a bare `data-v-`, so this
/// attribute selector almost never matches on real pages. Kept as the last
/// resort probe.
pub struct MarkerAttributeProbe {
    document: Document,
    selector: &'static str,
}

impl InstanceProbe<JsValue> for MarkerAttributeProbe {
    fn name(&self) -> &'static str {
        "marker-attribute"
    }

    fn find(&self) -> Option<JsValue> {
        let list = self.document.query_selector_all(self.selector).ok()?;
        let found = elements(&list).find_map(|el| {
            let vm = truthy_prop(el.as_ref(), "__vue__")?;
            truthy_prop(&vm, "$root")
        });
        found
    }
}

/// Mount point `#app`, then `window.__VUE_ROOT__`, then `[data-v-]`.
pub fn resolver(window: &Window, document: &Document) -> InstanceResolver<JsValue> {
    InstanceResolver::new()
        .with_probe(MountPointProbe {
            document: document.clone(),
            selector: "#app",
        })
        .with_probe(GlobalRootProbe {
            window: window.clone(),
            global: "__VUE_ROOT__",
        })
        .with_probe(MarkerAttributeProbe {
            document: document.clone(),
            selector: "[data-v-]",
        })
}

// =============================================================================
// Framework
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct VueFramework;

impl ReactiveFramework<DomField> for VueFramework {
    type Instance = JsValue;
    type Node = JsValue;

    fn root(&self, instance: &JsValue) -> JsValue {
        instance.clone()
    }

    fn binding_sources(&self, field: &DomField) -> BindingSources {
        let el = field.element();

        let attrs = el.attributes();
        let attributes = (0..attrs.length())
            .filter_map(|i| attrs.item(i))
            .map(|attr| (attr.name(), attr.value()))
            .collect();

        // Devtools descriptor: el.__vueBinding.model.expression
        let devtools_expression = truthy_prop(el.as_ref(), "__vueBinding")
            .and_then(|binding| truthy_prop(&binding, "model"))
            .map(|model| expression_of(&model));

        // Component model option: el.__vue__.$options.model.expression
        let model_option_expression = truthy_prop(el.as_ref(), "__vue__")
            .and_then(|vm| truthy_prop(&vm, "$options"))
            .and_then(|options| truthy_prop(&options, "model"))
            .map(|model| expression_of(&model));

        BindingSources {
            attributes,
            devtools_expression,
            model_option_expression,
        }
    }

    fn lookup(&self, node: &JsValue, key: &str) -> Option<JsValue> {
        truthy_prop(node, key)
    }

    fn reactive_set(&self, instance: &JsValue, holder: &JsValue, key: &str, value: &str) -> Result<(), FrameworkError> {
        let set = method(instance, "$set")?;
        set.call3(instance, holder, &JsValue::from_str(key), &JsValue::from_str(value))
            .map_err(|e| FrameworkError::CallFailed {
                call: "$set",
                reason: js_error(&e),
            })?;
        Ok(())
    }

    fn next_tick(&self, instance: &JsValue, task: Box<dyn FnOnce()>) -> Result<(), FrameworkError> {
        let next_tick = method(instance, "$nextTick")?;
        let callback = Closure::once_into_js(move || task());
        next_tick
            .call1(instance, &callback)
            .map_err(|e| FrameworkError::CallFailed {
                call: "$nextTick",
                reason: js_error(&e),
            })?;
        Ok(())
    }
}

fn expression_of(model: &JsValue) -> String {
    Reflect::get(model, &JsValue::from_str("expression"))
        .ok()
        .and_then(|expr| expr.as_string())
        .unwrap_or_default()
}
