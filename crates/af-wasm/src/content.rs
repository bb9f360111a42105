//! Content-script wiring: page-lifecycle triggers, the mutation observer and
//! the debounced pass.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Function};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node, Window};

use af_core::debounce::TimerError;
use af_core::{batch_adds_inputs, Debouncer, FillerConfig, PageFiller, Timers, Trigger};

use crate::dom::{AddedDomNode, DomPage};
use crate::js_error;
use crate::storage::ChromeStorage;
use crate::vue::{self, VueFramework};

type DomFiller = PageFiller<DomPage, ChromeStorage, VueFramework>;

/// `setTimeout`/`clearTimeout` on the page window.
#[derive(Debug, Clone)]
pub struct BrowserTimers {
    window: Window,
}

/// A pending timer. Owns its callback, so clearing or replacing the timer
/// frees whatever the task captured.
pub struct TimerHandle {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl BrowserTimers {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    /// Run `task` once after `delay_ms`. The callback frees itself when it
    /// runs, so this is only for timers that are never cleared.
    pub fn schedule_once(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<i32, TimerError> {
        let callback = Closure::once_into_js(move || task());
        self.arm(callback.unchecked_ref(), delay_ms)
    }

    fn arm(&self, callback: &Function, delay_ms: u32) -> Result<i32, TimerError> {
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay)
            .map_err(|e| TimerError(js_error(&e)))
    }
}

impl Timers for BrowserTimers {
    type Handle = TimerHandle;

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<TimerHandle, TimerError> {
        let mut task = Some(task);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(task) = task.take() {
                task();
            }
        });
        let id = self.arm(callback.as_ref().unchecked_ref(), delay_ms)?;
        Ok(TimerHandle {
            id,
            _callback: callback,
        })
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.window.clear_timeout_with_handle(handle.id);
    }
}

pub struct ContentScript {
    filler: Rc<DomFiller>,
    timers: BrowserTimers,
    debouncer: Debouncer<BrowserTimers>,
    observer: RefCell<Option<MutationObserver>>,
    stopped: Cell<bool>,
}

impl ContentScript {
    /// Build the filler and register every trigger.
    pub fn start(config: FillerConfig) -> Result<Rc<Self>, JsValue> {
        let page = DomPage::new()?;
        let timers = BrowserTimers::new(page.window().clone());
        let resolver = vue::resolver(page.window(), page.document());
        let storage = ChromeStorage::new(config.storage_key.clone());
        let debounce_ms = config.mutation_debounce_ms;

        let filler = PageFiller::new(page, storage, config).with_framework(VueFramework, resolver);
        let script = Rc::new(Self {
            filler: Rc::new(filler),
            timers: timers.clone(),
            debouncer: Debouncer::new(timers, debounce_ms),
            observer: RefCell::new(None),
            stopped: Cell::new(false),
        });

        for trigger in Trigger::ALL {
            if let Some((event, on_window)) = trigger.event() {
                script.listen(event, on_window, trigger)?;
            }
        }
        script.observe_mutations()?;
        script.fire(Trigger::Immediate);

        log::info!("Content script started on {}", script.filler.page().window().location().href().unwrap_or_default());
        Ok(script)
    }

    /// Schedule a pass for `trigger` according to its delay and debounce
    /// policy.
    pub fn fire(self: &Rc<Self>, trigger: Trigger) {
        if self.stopped.get() {
            return;
        }

        let delay = trigger.delay_ms(self.filler.config());
        let scheduled = match delay {
            None => {
                self.run_pass(trigger);
                Ok(())
            }
            Some(_) if trigger.is_debounced() => {
                let script = self.clone();
                self.debouncer.call(Box::new(move || script.run_pass(trigger)))
            }
            Some(delay_ms) => {
                let script = self.clone();
                self.timers
                    .schedule_once(delay_ms, Box::new(move || script.run_pass(trigger)))
                    .map(|_| ())
            }
        };

        if let Err(e) = scheduled {
            log::warn!("Failed to schedule {} pass: {}", trigger, e);
        }
    }

    fn run_pass(&self, trigger: Trigger) {
        if self.stopped.get() {
            return;
        }
        let filler = self.filler.clone();
        spawn_local(async move {
            log::debug!("Running {} pass", trigger);
            let report = filler.run_pass().await;
            log::debug!("{} pass finished: {:?}", trigger, report);
        });
    }

    fn listen(self: &Rc<Self>, event: &str, on_window: bool, trigger: Trigger) -> Result<(), JsValue> {
        let script = self.clone();
        let handler = Closure::<dyn FnMut()>::new(move || script.fire(trigger));
        let callback: &Function = handler.as_ref().unchecked_ref();

        let page = self.filler.page();
        if on_window {
            page.window().add_event_listener_with_callback(event, callback)?;
        } else {
            page.document().add_event_listener_with_callback(event, callback)?;
        }
        // Listeners live as long as the page.
        handler.forget();
        Ok(())
    }

    fn observe_mutations(self: &Rc<Self>) -> Result<(), JsValue> {
        let script = self.clone();
        let watch_selector = self.filler.config().watch_selector.clone();
        let handler = Closure::<dyn FnMut(Array, MutationObserver)>::new(move |records: Array, _observer| {
            let added = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .flat_map(|record| {
                    let nodes = record.added_nodes();
                    (0..nodes.length()).filter_map(move |i| nodes.get(i))
                })
                .map(AddedDomNode);

            if batch_adds_inputs(added, &watch_selector) {
                log::debug!("New inputs detected");
                script.fire(Trigger::Mutation);
            }
        });

        let observer = MutationObserver::new(handler.as_ref().unchecked_ref())?;
        handler.forget();

        let document = self.filler.page().document();
        let target: Node = match document.body() {
            Some(body) => body.into(),
            None => document
                .document_element()
                .ok_or_else(|| JsValue::from_str("Document has no root element"))?
                .into(),
        };

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        options.set_attributes(true);
        observer.observe_with_options(&target, &options)?;

        *self.observer.borrow_mut() = Some(observer);
        Ok(())
    }

    /// Disconnect the observer, drop the pending debounced pass and ignore
    /// further triggers.
    pub fn stop(&self) {
        self.stopped.set(true);
        self.debouncer.cancel();
        if let Some(observer) = self.observer.borrow_mut().take() {
            observer.disconnect();
        }
        log::info!("Content script stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}
