//! Summarist - AI summaries of web pages and YouTube videos.
//!
//! The crate has three parts:
//! 1. The Summarization Service: a Lambda HTTP handler (`api`) that turns text
//!    or a URL into a Markdown summary with `OpenAI`, and rewrites summaries to
//!    a requested length
//! 2. The browser extension choreography (`extension`): background dispatcher,
//!    per-tab content script sessions, and the overlay they render
//! 3. The web front end (`web`): page and video summarizer sessions with
//!    on-demand length adjustment
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution of the service
//! - reqwest and openai-api-rs for the `OpenAI` Responses API
//! - html2text for page text extraction and pulldown-cmark for rendering
//! - Tokio channels for request/response messaging inside the extension
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use summarist::clients::HttpSummaryService;
//! use summarist::core::config::ClientConfig;
//! use summarist::web::Summarizer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     summarist::setup_logging();
//!
//!     let service = HttpSummaryService::new(&ClientConfig::default())?;
//!     let mut summarizer = Summarizer::new(Arc::new(service));
//!
//!     summarizer.mount(Some("https://youtu.be/dQw4w9WgXcQ")).await;
//!     let session = summarizer.session(summarizer.active_kind());
//!     if let Some(html) = session.rendered_summary() {
//!         println!("{html}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod api;
pub mod clients;
pub mod core;
pub mod errors;
pub mod extension;
pub mod utils;
pub mod web;

pub use errors::SummaristError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. Calling it again after a subscriber is
/// installed is a no-op.
///
/// # Example
///
/// ```
/// summarist::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
