//! Web front end: form-driven page and video summarizer sessions.

pub mod session;
pub mod summarizer;

pub use session::{Notice, SummarizerSession};
pub use summarizer::Summarizer;
