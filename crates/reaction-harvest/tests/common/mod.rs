//! Scripted in-memory page for driving the harvest core without a browser.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use reaction_harvest::{
    Document, Element, FieldLocator, FieldLocators, HarvestConfig, ListSelectors, PageError,
    PageResult, Timing,
};

// ─────────────────────── selectors ───────────────────────

pub const TRIGGER: &str = "button.reactions";
pub const CONTAINER: &str = "div.modal-content";
pub const LIST: &str = "ul.reactor-list";
pub const ITEM: &str = "li.reactor";
pub const NAME: &str = "span.name";
pub const ROLE: &str = "span.role";
pub const LINK: &str = "a.profile";
pub const REACTION: &str = "img.reaction";

/// Harvest config matching the fake page, with no real waiting.
pub fn config(max_scroll_attempts: u32) -> HarvestConfig {
    HarvestConfig {
        selectors: ListSelectors {
            trigger: TRIGGER.to_string(),
            container: CONTAINER.to_string(),
            list: LIST.to_string(),
            item: ITEM.to_string(),
        },
        fields: FieldLocators {
            user_name: FieldLocator::text(NAME),
            current_role: FieldLocator::text(ROLE),
            profile_link: FieldLocator::attribute(LINK, "href"),
            reaction_type: FieldLocator::attribute(REACTION, "alt"),
        },
        timing: Timing {
            stabilization_wait_ms: 0,
            max_scroll_attempts,
            field_attach_wait_ms: 0,
            open_timeout_ms: 0,
            container_timeout_ms: 0,
            ..Timing::default()
        },
    }
}

// ─────────────────────── items ───────────────────────

/// How a field element behaves when looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    /// Attached; both waiting and immediate lookups succeed.
    Present,
    /// Never attaches.
    Never,
    /// The bounded wait fails, but an immediate lookup finds it.
    Late,
}

#[derive(Debug, Clone)]
pub struct FakeField {
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub attach: Attach,
}

#[derive(Debug, Clone, Default)]
pub struct FakeItem {
    pub fields: HashMap<&'static str, FakeField>,
}

impl FakeItem {
    /// A fully populated entry for the 1-based position `n`.
    pub fn person(n: usize) -> Self {
        let mut item = FakeItem::default();
        item.fields.insert(NAME, text_field(&format!("  Person {n}\n")));
        item.fields.insert(ROLE, text_field(&format!("Role {n} ")));
        item.fields
            .insert(LINK, attr_field("href", &format!("https://example.com/in/person-{n}")));
        item.fields.insert(REACTION, attr_field("alt", "Like"));
        item
    }

    pub fn with_attach(mut self, selector: &'static str, attach: Attach) -> Self {
        if let Some(field) = self.fields.get_mut(selector) {
            field.attach = attach;
        }
        self
    }

    pub fn without_attr(mut self, selector: &'static str) -> Self {
        if let Some(field) = self.fields.get_mut(selector) {
            field.attrs.clear();
        }
        self
    }
}

fn text_field(text: &str) -> FakeField {
    FakeField {
        text: text.to_string(),
        attrs: HashMap::new(),
        attach: Attach::Present,
    }
}

fn attr_field(name: &str, value: &str) -> FakeField {
    FakeField {
        text: String::new(),
        attrs: HashMap::from([(name.to_string(), value.to_string())]),
        attach: Attach::Present,
    }
}

pub fn people(count: usize) -> Vec<FakeItem> {
    (1..=count).map(FakeItem::person).collect()
}

// ─────────────────────── page ───────────────────────

/// How the container's scrollable extent responds to scrolling.
#[derive(Debug, Clone)]
pub enum Heights {
    /// Height after `k` scrolls is `script[min(k, len - 1)]`.
    Script(Vec<u64>),
    /// Grows by the given step on every scroll, forever.
    Growing(u64),
    /// Proportional to the number of rendered entries.
    PerItem(u64),
}

/// Side effects observed on the page, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Click,
    Scroll,
    Enumerate,
}

#[derive(Debug)]
struct PageState {
    heights: Heights,
    items: Vec<FakeItem>,
    initial_items: usize,
    items_per_scroll: usize,
    scrolls: usize,
    has_trigger: bool,
    has_container: bool,
    container_visible: bool,
    opened: bool,
    events: Vec<Event>,
}

impl PageState {
    fn rendered(&self) -> usize {
        let rendered = self.initial_items + self.scrolls * self.items_per_scroll;
        rendered.min(self.items.len())
    }

    fn height(&self) -> u64 {
        match &self.heights {
            Heights::Script(script) => {
                let idx = self.scrolls.min(script.len().saturating_sub(1));
                script.get(idx).copied().unwrap_or(0)
            }
            Heights::Growing(step) => step * (self.scrolls as u64 + 1),
            Heights::PerItem(per_item) => per_item * self.rendered() as u64,
        }
    }
}

/// An in-memory reactions dialog.
#[derive(Debug, Clone)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    /// All `items` rendered up front; height follows `heights`.
    pub fn new(items: Vec<FakeItem>, heights: Heights) -> Self {
        let count = items.len();
        Self::build(items, heights, count, 0)
    }

    /// Entries render in batches: `initial` up front, `per_scroll` more per scroll.
    pub fn lazy(items: Vec<FakeItem>, initial: usize, per_scroll: usize) -> Self {
        Self::build(items, Heights::PerItem(64), initial, per_scroll)
    }

    fn build(items: Vec<FakeItem>, heights: Heights, initial: usize, per_scroll: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                heights,
                items,
                initial_items: initial,
                items_per_scroll: per_scroll,
                scrolls: 0,
                has_trigger: true,
                has_container: true,
                container_visible: true,
                opened: false,
                events: Vec::new(),
            })),
        }
    }

    pub fn without_trigger(self) -> Self {
        self.state.lock().unwrap().has_trigger = false;
        self
    }

    pub fn without_container(self) -> Self {
        self.state.lock().unwrap().has_container = false;
        self
    }

    pub fn with_hidden_container(self) -> Self {
        self.state.lock().unwrap().container_visible = false;
        self
    }

    /// Handle to the scrollable container, bypassing the trigger.
    pub fn container(&self) -> Box<dyn Element> {
        self.node(Node::Container)
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    fn node(&self, node: Node) -> Box<dyn Element> {
        Box::new(FakeElement {
            node,
            page: self.clone(),
        })
    }
}

#[async_trait]
impl Document for FakePage {
    async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> PageResult<Box<dyn Element>> {
        let state = self.state.lock().unwrap();
        let found = match selector {
            TRIGGER => state.has_trigger.then_some(Node::Trigger),
            CONTAINER => (state.opened && state.has_container && state.container_visible)
                .then_some(Node::Container),
            _ => return Err(PageError::NotFound(selector.to_string())),
        };
        drop(state);
        found
            .map(|node| self.node(node))
            .ok_or_else(|| PageError::timeout(selector, timeout))
    }
}

#[derive(Debug, Clone)]
enum Node {
    Trigger,
    Container,
    List,
    Item(usize),
    Field(usize, &'static str),
}

struct FakeElement {
    node: Node,
    page: FakePage,
}

impl FakeElement {
    fn field(&self) -> Option<FakeField> {
        match self.node {
            Node::Field(item, selector) => {
                let state = self.page.state.lock().unwrap();
                state.items.get(item)?.fields.get(selector).cloned()
            }
            _ => None,
        }
    }

    fn lookup(&self, selector: &str, waiting: bool) -> Option<Node> {
        let state = self.page.state.lock().unwrap();
        match (&self.node, selector) {
            (Node::Container, LIST) => Some(Node::List),
            (Node::List, ITEM) => (state.rendered() > 0).then_some(Node::Item(0)),
            (Node::Item(i), _) => {
                let (key, field) = state.items.get(*i)?.fields.get_key_value(selector)?;
                let attached = match field.attach {
                    Attach::Present => true,
                    Attach::Never => false,
                    Attach::Late => !waiting,
                };
                attached.then_some(Node::Field(*i, *key))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Element for FakeElement {
    async fn wait_for_child(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> PageResult<Box<dyn Element>> {
        self.lookup(selector, true)
            .map(|node| self.page.node(node))
            .ok_or_else(|| PageError::timeout(selector, timeout))
    }

    async fn find_child(&self, selector: &str) -> PageResult<Option<Box<dyn Element>>> {
        Ok(self.lookup(selector, false).map(|node| self.page.node(node)))
    }

    async fn find_children(&self, selector: &str) -> PageResult<Vec<Box<dyn Element>>> {
        let count = {
            let mut state = self.page.state.lock().unwrap();
            match (&self.node, selector) {
                (Node::List, ITEM) => {
                    state.events.push(Event::Enumerate);
                    state.rendered()
                }
                _ => 0,
            }
        };
        Ok((0..count).map(|i| self.page.node(Node::Item(i))).collect())
    }

    async fn wait_until_visible(&self, timeout: Duration) -> PageResult<()> {
        let state = self.page.state.lock().unwrap();
        match self.node {
            Node::Container if !state.container_visible => {
                Err(PageError::timeout(CONTAINER, timeout))
            }
            _ => Ok(()),
        }
    }

    async fn text(&self) -> PageResult<String> {
        Ok(self.field().map(|f| f.text).unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> PageResult<Option<String>> {
        Ok(self.field().and_then(|f| f.attrs.get(name).cloned()))
    }

    async fn click(&self) -> PageResult<()> {
        let mut state = self.page.state.lock().unwrap();
        state.events.push(Event::Click);
        if let Node::Trigger = self.node {
            state.opened = true;
        }
        Ok(())
    }

    async fn scroll_height(&self) -> PageResult<u64> {
        let state = self.page.state.lock().unwrap();
        match self.node {
            Node::Container => Ok(state.height()),
            _ => Ok(0),
        }
    }

    async fn scroll_to_end(&self) -> PageResult<()> {
        let mut state = self.page.state.lock().unwrap();
        if let Node::Container = self.node {
            state.scrolls += 1;
            state.events.push(Event::Scroll);
        }
        Ok(())
    }
}
