//! Ledger reports.
//!
//! - Trial Balance
//! - Account Ledger

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
