//! PNA Dashboard (pna-dashboard)
//!
//! The propaganda narrative analysis page on top of the reactive core:
//! - [`layout`]: the initial component tree
//! - [`callbacks`]: every callback of the page and its handler
//! - [`figure`], [`markup`], [`payload`]: typed values that serialize into
//!   component properties
//! - [`server`]: the axum routes the browser talks to
//! - [`config`]: command-line and environment configuration of `pna-server`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pna_dashboard::{create_router, AppState, Dashboard, RouterOptions, Services};
//!
//! let corpus = PhilippinesEmbassyCorpus::load("data")?;
//! let services = Services::in_memory(Arc::new(corpus));
//! let dashboard = Arc::new(Dashboard::build(&services)?);
//! let app = create_router(AppState::new(dashboard), &RouterOptions::default());
//! ```

pub mod app;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod figure;
pub mod ids;
pub mod layout;
pub mod markup;
pub mod payload;
pub mod server;
pub mod session;

pub use app::Dashboard;
pub use callbacks::{register_all, Services};
pub use config::{cli, Action, DashboardConfig, RunMode};
pub use error::{DashboardError, DashboardResult};
pub use figure::Figure;
pub use markup::{Node, Style};
pub use payload::{FormAction, NarrativeFormPhase, NarrativeFormState, WordVecData};
pub use server::{create_router, ApiError, AppState, RouterOptions, UpdateRequest, UpdateResponse};
pub use session::{SessionId, SessionStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
