//! Infrastructure layer: CSV, local storage, config, the ledger service and
//! application bootstrap.

pub mod app;
pub mod clock;
pub mod config;
pub mod csv;
pub mod service;
pub mod session_store;

pub use app::App;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use self::csv::{CsvError, HEADER, ImportReport, SkippedRow};
pub use service::{ImportError, ImportOutcome, LedgerService, NewTransaction};
pub use session_store::FileSessionStore;
