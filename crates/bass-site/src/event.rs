//! Event bus mapping labels to handlers.
//!
//! Labels are colon-separated strings such as `render:pre:page:any` or
//! `generate:post:page:extension:md`. The builder and renderer fire labels
//! at fixed points of their walk; handlers registered for a label receive
//! the tree and the node the event is about, and may change both.
//!
//! One bus belongs to one [`Project`](crate::Project), so separate builds
//! never share handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::SiteError;
use crate::layout::Layout;
use crate::tree::{NodeId, SiteTree};

/// Prefix of the labels that mark an extension as a page type.
pub const PAGE_EXTENSION_PREFIX: &str = "generate:post:page:extension:";

/// Result of running a handler.
pub type HandlerResult = Result<(), SiteError>;

/// Event handler.
pub type Handler = Arc<dyn Fn(&mut EventContext<'_>) -> HandlerResult + Send + Sync>;

/// What a handler gets to work with.
pub struct EventContext<'a> {
    /// The whole site tree.
    pub tree: &'a mut SiteTree,
    /// Node the event was fired for.
    pub node: NodeId,
    layout: Option<&'a dyn Layout>,
}

impl<'a> EventContext<'a> {
    /// Context for an event fired while generating the tree.
    pub fn new(tree: &'a mut SiteTree, node: NodeId) -> Self {
        Self {
            tree,
            node,
            layout: None,
        }
    }

    /// Context for an event fired while rendering with `layout`.
    pub fn with_layout(tree: &'a mut SiteTree, node: NodeId, layout: &'a dyn Layout) -> Self {
        Self {
            tree,
            node,
            layout: Some(layout),
        }
    }

    /// Templates in use, available during rendering only.
    #[must_use]
    pub fn layout(&self) -> Option<&'a dyn Layout> {
        self.layout
    }
}

/// Label to handler mapping.
#[derive(Default, Clone)]
pub struct EventBus {
    handlers: HashMap<String, Handler>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<&String> = self.handlers.keys().collect();
        labels.sort();
        f.debug_struct("EventBus").field("labels", &labels).finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler closure for `label`.
    ///
    /// See [`EventBus::register_handler`].
    pub fn register<F>(&mut self, label: impl Into<String>, handler: F)
    where
        F: Fn(&mut EventContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(label, Arc::new(handler));
    }

    /// Register `handler` for `label`.
    ///
    /// If `label` already has a handler, the two are composed: the existing
    /// one runs first and the new one only if it succeeded.
    pub fn register_handler(&mut self, label: impl Into<String>, handler: Handler) {
        let label = label.into();
        match self.handlers.remove(&label) {
            Some(existing) => {
                tracing::debug!(label = %label, "Event handler extended");
                self.handlers.insert(label, compose(existing, handler));
            }
            None => {
                tracing::debug!(label = %label, "New event handler");
                self.handlers.insert(label, handler);
            }
        }
    }

    /// Copy the handler of `from` to `to`.
    ///
    /// The copy is a snapshot: handlers registered for `from` later do not
    /// run for `to`. Does nothing if `to` already has a handler or `from`
    /// has none.
    pub fn alias(&mut self, from: &str, to: &str) {
        if self.handlers.contains_key(to) {
            tracing::debug!(from = %from, to = %to, "Event handler exists, not copied");
            return;
        }
        match self.handlers.get(from) {
            Some(handler) => {
                tracing::debug!(from = %from, to = %to, "Event handler copied");
                let handler = Arc::clone(handler);
                self.handlers.insert(to.to_owned(), handler);
            }
            None => tracing::debug!(from = %from, "No event handler, cannot copy"),
        }
    }

    /// Remove the handler of `label`, if any.
    pub fn unregister(&mut self, label: &str) {
        if self.handlers.remove(label).is_some() {
            tracing::debug!(label = %label, "Event handler removed");
        } else {
            tracing::debug!(label = %label, "No event handler, cannot remove");
        }
    }

    /// Whether `label` has a handler.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.handlers.contains_key(label)
    }

    /// Run the handler of `label`; does nothing if there is none.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a handler.
    pub fn fire(&self, label: &str, ctx: &mut EventContext<'_>) -> HandlerResult {
        match self.handlers.get(label) {
            Some(handler) => handler(ctx),
            None => Ok(()),
        }
    }

    /// Extensions that have a page handler, sorted.
    #[must_use]
    pub fn page_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .handlers
            .keys()
            .filter_map(|label| label.strip_prefix(PAGE_EXTENSION_PREFIX))
            .map(str::to_owned)
            .collect();
        extensions.sort();
        extensions
    }
}

fn compose(first: Handler, second: Handler) -> Handler {
    Arc::new(move |ctx: &mut EventContext<'_>| {
        first(ctx)?;
        second(ctx)
    })
}
