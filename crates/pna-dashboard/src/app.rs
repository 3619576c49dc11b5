//! The assembled dashboard: page, callback graph and scheduler

use crate::callbacks::{register_all, Services};
use crate::layout;
use crate::markup::Node;
use pna_reactive::{
    CallbackGraph, CallbackRegistry, ComponentModel, Layout, RegistrationError, Scheduler,
};
use std::sync::Arc;

/// Everything shared by all sessions
///
/// Built once at startup. Construction fails if the callbacks do not validate
/// against the page.
#[derive(Debug)]
pub struct Dashboard {
    page: Node,
    layout: Layout,
    scheduler: Scheduler,
}

impl Dashboard {
    /// Build the page, register its callbacks and validate the graph
    ///
    /// # Errors
    /// Any [`RegistrationError`] from registration or graph validation.
    pub fn build(services: &Services) -> Result<Self, RegistrationError> {
        let page = layout::page();
        let layout = page.to_layout();

        let mut registry = CallbackRegistry::new();
        register_all(&mut registry, services)?;
        let graph = Arc::new(CallbackGraph::build(registry, &layout)?);
        tracing::info!(
            components = layout.len(),
            callbacks = graph.len(),
            edges = graph.edge_count(),
            "callback graph validated"
        );

        Ok(Self {
            page,
            layout,
            scheduler: Scheduler::new(graph),
        })
    }

    /// Initial markup tree
    #[inline]
    #[must_use]
    pub fn page(&self) -> &Node {
        &self.page
    }

    /// Declared components and their initial values
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Validated callback graph
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Arc<CallbackGraph> {
        self.scheduler.graph()
    }

    /// Round runner
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Fresh component model for a new session
    #[must_use]
    pub fn new_model(&self) -> ComponentModel {
        ComponentModel::from_layout(&self.layout)
    }
}
