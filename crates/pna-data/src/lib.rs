//! PNA Data (pna-data)
//!
//! Tabular query results and the read-only data façade the dashboard handlers
//! call:
//! - [`Table`]: column-ordered JSON cells with the handful of relational
//!   operations the handlers need
//! - [`DataFacade`]: analytic queries over a corpus
//! - [`PhilippinesEmbassyCorpus`]: the façade backed by precomputed CSV/JSON
//!   artifacts

pub mod corpus;
pub mod error;
pub mod facade;
pub mod table;

pub use corpus::{read_csv, CorpusParts, PhilippinesEmbassyCorpus};
pub use error::{FacadeError, TableError};
pub use facade::DataFacade;
pub use table::{Row, SplitTable, Table};
