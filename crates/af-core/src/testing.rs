//! In-memory fakes for the page, view, timers and framework seams.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::binding::BindingSources;
use crate::debounce::{TimerError, Timers};
use crate::editor::RuleView;
use crate::framework::{FrameworkError, InstanceProbe, ReactiveFramework};
use crate::page::{FormField, Page, PageError};
use crate::trigger::AddedNode;
use crate::types::Rule;

// =============================================================================
// Fake DOM
// =============================================================================

struct FakeNode {
    tag: String,
    id: String,
    classes: Vec<String>,
    attributes: RefCell<Vec<(String, String)>>,
    value: RefCell<Option<String>>,
    parent: RefCell<Weak<FakeNode>>,
    children: RefCell<Vec<Rc<FakeNode>>>,
    input_events: Cell<usize>,
    writes: Cell<usize>,
}

#[derive(Clone)]
pub struct FakeField(Rc<FakeNode>);

impl FakeField {
    pub fn same_node(&self, other: &FakeField) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .attributes
            .borrow_mut()
            .push((name.to_string(), value.to_string()));
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0.attributes.borrow().clone()
    }

    pub fn input_events(&self) -> usize {
        self.0.input_events.get()
    }

    pub fn write_count(&self) -> usize {
        self.0.writes.get()
    }

    fn matches(&self, selector: &str) -> Result<bool, PageError> {
        let mut any = false;
        for part in selector.split(',') {
            any |= SimpleSelector::parse(part.trim(), selector)?.matches(&self.0);
        }
        Ok(any)
    }

    fn descendants(&self) -> Vec<FakeField> {
        let mut out = Vec::new();
        collect(&self.0.children.borrow(), &mut out);
        out
    }
}

fn collect(nodes: &[Rc<FakeNode>], out: &mut Vec<FakeField>) {
    for node in nodes {
        out.push(FakeField(node.clone()));
        collect(&node.children.borrow(), out);
    }
}

/// `tag`, `#id`, `.class` and compounds of them.
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn parse(part: &str, full: &str) -> Result<Self, PageError> {
        let invalid = || PageError::InvalidSelector {
            selector: full.to_string(),
            reason: "unsupported syntax".to_string(),
        };
        if part.is_empty()
            || !part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '#' | '.'))
        {
            return Err(invalid());
        }

        let mut selector = SimpleSelector { tag: None, id: None, classes: Vec::new() };
        let mut kind = ' ';
        let mut current = String::new();
        let flush = |kind: char, text: &mut String, sel: &mut SimpleSelector| -> Result<(), PageError> {
            if text.is_empty() {
                return if kind == ' ' { Ok(()) } else { Err(invalid()) };
            }
            match kind {
                '#' => sel.id = Some(std::mem::take(text)),
                '.' => sel.classes.push(std::mem::take(text)),
                _ => sel.tag = Some(std::mem::take(text)),
            }
            Ok(())
        };
        for c in part.chars() {
            if c == '#' || c == '.' {
                flush(kind, &mut current, &mut selector)?;
                kind = c;
            } else {
                current.push(c);
            }
        }
        flush(kind, &mut current, &mut selector)?;
        Ok(selector)
    }

    fn matches(&self, node: &FakeNode) -> bool {
        self.tag.as_ref().map_or(true, |t| *t == node.tag)
            && self.id.as_ref().map_or(true, |id| *id == node.id)
            && self.classes.iter().all(|c| node.classes.contains(c))
    }
}

impl FormField for FakeField {
    fn current_value(&self) -> Option<String> {
        self.0.value.borrow().clone()
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.matches(selector).unwrap_or(false) {
                return Some(node);
            }
            current = node.0.parent.borrow().upgrade().map(FakeField);
        }
        None
    }

    fn query_first(&self, selector: &str) -> Option<Self> {
        self.descendants()
            .into_iter()
            .find(|node| node.matches(selector).unwrap_or(false))
    }

    fn set_value(&self, value: &str) {
        self.0.writes.set(self.0.writes.get() + 1);
        *self.0.value.borrow_mut() = Some(value.to_string());
    }

    fn dispatch_input(&self) -> Result<(), PageError> {
        self.0.input_events.set(self.0.input_events.get() + 1);
        Ok(())
    }
}

impl AddedNode for FakeField {
    fn matches_selector(&self, selector: &str) -> bool {
        self.matches(selector).unwrap_or(false)
    }

    fn contains_selector(&self, selector: &str) -> bool {
        self.query_first(selector).is_some()
    }
}

#[derive(Clone)]
pub struct FakePage {
    url: Rc<RefCell<String>>,
    roots: Rc<RefCell<Vec<Rc<FakeNode>>>>,
    queries: Rc<RefCell<Vec<String>>>,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        Self {
            url: Rc::new(RefCell::new(url.to_string())),
            roots: Rc::default(),
            queries: Rc::default(),
        }
    }

    /// Append an element. Only `input` elements carry a value property.
    pub fn append(&self, parent: Option<&FakeField>, tag: &str, id: &str, classes: &[&str]) -> FakeField {
        let node = Rc::new(FakeNode {
            tag: tag.to_string(),
            id: id.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            attributes: RefCell::new(Vec::new()),
            value: RefCell::new((tag == "input").then(String::new)),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            input_events: Cell::new(0),
            writes: Cell::new(0),
        });
        match parent {
            Some(parent) => {
                *node.parent.borrow_mut() = Rc::downgrade(&parent.0);
                parent.0.children.borrow_mut().push(node.clone());
            }
            None => self.roots.borrow_mut().push(node.clone()),
        }
        FakeField(node)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl Page for FakePage {
    type Field = FakeField;

    fn url(&self) -> String {
        self.url.borrow().clone()
    }

    fn query_all(&self, selector: &str) -> Result<Vec<FakeField>, PageError> {
        self.queries.borrow_mut().push(selector.to_string());
        let mut all = Vec::new();
        collect(&self.roots.borrow(), &mut all);
        let mut out = Vec::new();
        for node in all {
            if node.matches(selector)? {
                out.push(node);
            }
        }
        Ok(out)
    }
}

// =============================================================================
// Fake view
// =============================================================================

#[derive(Default)]
pub struct RecordingView {
    renders: RefCell<Vec<Vec<Rule>>>,
    form_clears: Cell<usize>,
    alerts: RefCell<Vec<String>>,
}

impl RecordingView {
    pub fn last_render(&self) -> Option<Vec<Rule>> {
        self.renders.borrow().last().cloned()
    }

    pub fn render_count(&self) -> usize {
        self.renders.borrow().len()
    }

    pub fn form_clears(&self) -> usize {
        self.form_clears.get()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl RuleView for RecordingView {
    fn render(&self, rules: &[Rule]) {
        self.renders.borrow_mut().push(rules.to_vec());
    }

    fn clear_form(&self) {
        self.form_clears.set(self.form_clears.get() + 1);
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

// =============================================================================
// Fake timers
// =============================================================================

struct PendingTimer {
    handle: u32,
    due: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Clone, Default)]
pub struct FakeTimers {
    now: Rc<Cell<u64>>,
    next_handle: Rc<Cell<u32>>,
    pending: Rc<RefCell<Vec<PendingTimer>>>,
}

impl FakeTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, running due tasks in deadline order.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let due_index = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.handle))
                    .map(|(i, _)| i);
                due_index.map(|i| pending.remove(i))
            };
            match next {
                Some(timer) => {
                    self.now.set(timer.due);
                    (timer.task)();
                }
                None => break,
            }
        }
        self.now.set(target);
    }
}

impl Timers for FakeTimers {
    type Handle = u32;

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<u32, TimerError> {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        self.pending.borrow_mut().push(PendingTimer {
            handle,
            due: self.now.get() + u64::from(delay_ms),
            task,
        });
        Ok(handle)
    }

    fn clear_timeout(&self, handle: u32) {
        self.pending.borrow_mut().retain(|t| t.handle != handle);
    }
}

// =============================================================================
// Fake framework
// =============================================================================

pub struct FakeProbe {
    name: &'static str,
    instance: Option<u32>,
}

impl FakeProbe {
    pub fn new(name: &'static str, instance: Option<u32>) -> Self {
        Self { name, instance }
    }
}

impl InstanceProbe<u32> for FakeProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self) -> Option<u32> {
        self.instance
    }
}

#[derive(Default)]
struct FrameworkState {
    /// Dotted paths of objects reachable from the root.
    objects: HashSet<String>,
    /// (holder path, key) -> assigned value
    values: HashMap<(String, String), String>,
    ticks: Vec<Box<dyn FnOnce()>>,
    set_calls: usize,
    fail_sets: bool,
    fail_ticks: bool,
}

/// Graph nodes are dotted paths; the root is the empty path.
#[derive(Clone, Default)]
pub struct FakeFramework(Rc<RefCell<FrameworkState>>);

impl FakeFramework {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance(&self) -> u32 {
        1
    }

    pub fn define_object(&self, path: &str) {
        self.0.borrow_mut().objects.insert(path.to_string());
    }

    pub fn value_at(&self, holder: &str, key: &str) -> Option<String> {
        self.0
            .borrow()
            .values
            .get(&(holder.to_string(), key.to_string()))
            .cloned()
    }

    pub fn set_calls(&self) -> usize {
        self.0.borrow().set_calls
    }

    pub fn fail_sets(&self) {
        self.0.borrow_mut().fail_sets = true;
    }

    pub fn fail_ticks(&self) {
        self.0.borrow_mut().fail_ticks = true;
    }

    /// Run queued next-tick tasks.
    pub fn flush(&self) {
        let ticks = std::mem::take(&mut self.0.borrow_mut().ticks);
        for task in ticks {
            task();
        }
    }
}

impl ReactiveFramework<FakeField> for FakeFramework {
    type Instance = u32;
    type Node = String;

    fn root(&self, _instance: &u32) -> String {
        String::new()
    }

    fn binding_sources(&self, field: &FakeField) -> BindingSources {
        BindingSources {
            attributes: field.attributes(),
            ..BindingSources::default()
        }
    }

    fn lookup(&self, node: &String, key: &str) -> Option<String> {
        let child = if node.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", node, key)
        };
        self.0.borrow().objects.contains(&child).then_some(child)
    }

    fn reactive_set(&self, _instance: &u32, holder: &String, key: &str, value: &str) -> Result<(), FrameworkError> {
        let mut state = self.0.borrow_mut();
        if state.fail_sets {
            return Err(FrameworkError::MissingPrimitive("$set"));
        }
        state.set_calls += 1;
        state.values.insert((holder.clone(), key.to_string()), value.to_string());
        Ok(())
    }

    fn next_tick(&self, _instance: &u32, task: Box<dyn FnOnce()>) -> Result<(), FrameworkError> {
        let mut state = self.0.borrow_mut();
        if state.fail_ticks {
            return Err(FrameworkError::MissingPrimitive("$nextTick"));
        }
        state.ticks.push(task);
        Ok(())
    }
}
