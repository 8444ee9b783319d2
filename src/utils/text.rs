use crate::errors::SummaristError;

/// Wide enough that `html2text` never re-wraps ordinary paragraphs.
const RENDER_WIDTH: usize = 10_000;

/// Pages with less visible text than this are not worth summarizing.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Renders page HTML to the text a reader would see.
///
/// # Errors
///
/// Returns `SummaristError::ParseError` if the document cannot be rendered.
pub fn visible_text(html: &str) -> Result<String, SummaristError> {
    html2text::from_read(html.as_bytes(), RENDER_WIDTH)
        .map_err(|e| SummaristError::ParseError(format!("Failed to extract page text: {e}")))
}

/// True when the trimmed text is long enough to send for summarization.
#[must_use]
pub fn has_enough_content(text: &str) -> bool {
    text.trim().chars().count() >= MIN_CONTENT_CHARS
}
