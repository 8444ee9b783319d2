//! Clients for the services Summarist talks to.

pub mod summary_service;

pub use summary_service::{HttpSummaryService, SummaryService};
