//! PNA Reactive (pna-reactive)
//!
//! Server-side evaluation of declarative UI callbacks, in two phases:
//! 1. **Construction Phase**: register callback specs and validate them against
//!    the declared layout, producing an immutable [`CallbackGraph`]
//! 2. **Execution Phase**: run evaluation rounds against a per-session
//!    [`ComponentModel`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pna_reactive::prelude::*;
//!
//! // Construction phase
//! let mut registry = CallbackRegistry::new();
//! registry.register(
//!     CallbackSpec::builder()
//!         .output(("greeting", "children"))
//!         .input(("name", "value"))
//!         .handle_fn(|call| Ok(Outputs::one(call.input(0).clone()))),
//! )?;
//! let graph = Arc::new(CallbackGraph::build(registry, &layout)?);
//!
//! // Execution phase
//! let scheduler = Scheduler::new(graph);
//! let mut model = ComponentModel::from_layout(&layout);
//! let report = scheduler.run_round(&mut model, Dispatch::InitialLoad).await?;
//! ```

pub mod context;
pub mod error;
pub mod graph;
pub mod model;
pub mod registry;
pub mod scheduler;
pub mod state_machine;
pub mod types;

pub use context::TriggerContext;
pub use error::{HandlerError, ModelError, RegistrationError, RoundStateError, SchedulerError};
pub use graph::CallbackGraph;
pub use model::{Component, ComponentModel, Layout};
pub use registry::{
    handler_fn, CallArgs, CallbackRegistry, CallbackSpec, CallbackSpecBuilder, Handler, Outputs,
    SpecDescriptor,
};
pub use scheduler::{Dispatch, RoundReport, Scheduler, SpecOutcome};
pub use state_machine::RoundState;
pub use types::{ParsePropertyRefError, PropertyRef, SpecId};

/// Property values are plain JSON; typed payloads serialize into them.
pub use serde_json::Value;

/// Convenience re-exports for declaring and running callbacks
pub mod prelude {
    pub use crate::context::TriggerContext;
    pub use crate::error::{HandlerError, ModelError, RegistrationError, SchedulerError};
    pub use crate::graph::CallbackGraph;
    pub use crate::model::{ComponentModel, Layout};
    pub use crate::registry::{
        handler_fn, CallArgs, CallbackRegistry, CallbackSpec, Handler, Outputs,
    };
    pub use crate::scheduler::{Dispatch, RoundReport, Scheduler, SpecOutcome};
    pub use crate::state_machine::RoundState;
    pub use crate::types::{PropertyRef, SpecId};
    pub use serde_json::Value;
    pub use std::sync::Arc;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
