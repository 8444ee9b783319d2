//! URL classification, page text extraction, and Markdown rendering.

pub mod links;
pub mod markdown;
pub mod text;
