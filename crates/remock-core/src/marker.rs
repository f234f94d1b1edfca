//! Title marker parsing.
//!
//! Tests and suites opt in to a mode by prefixing their title with a
//! bracketed token: `[x]` blacklists, `[r]` forces recording, `[s]` forces
//! stubbing. The marker is consumed once: the parser strips it and the
//! session remembers the stripped title for the rest of the run.

use thiserror::Error;

/// The recognized marker tokens, in the order they are matched.
const MARKER_TOKENS: [(&str, MarkerKind); 3] = [
    ("[x]", MarkerKind::Blacklist),
    ("[r]", MarkerKind::ForceRecord),
    ("[s]", MarkerKind::ForceStub),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Blacklist,
    ForceRecord,
    ForceStub,
}

/// The result of parsing one title: an optional marker plus the title with
/// the marker stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub marker: Option<MarkerKind>,
    pub title: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkerError {
    #[error("title carries more than one mode marker: {title:?}")]
    ConflictingMarkers { title: String },
}

/// Parses a leading mode marker from a test or suite title.
///
/// Only a marker at the very start of the title counts; the stripped title
/// is trimmed of the whitespace that separated it from the marker. A title
/// containing more than one recognized token is rejected rather than
/// silently resolved in favor of the first.
pub fn parse_title(title: &str) -> Result<ParsedTitle, MarkerError> {
    let token_count: usize = MARKER_TOKENS
        .iter()
        .map(|(token, _)| title.matches(token).count())
        .sum();
    if token_count > 1 {
        return Err(MarkerError::ConflictingMarkers {
            title: title.to_string(),
        });
    }

    for (token, kind) in MARKER_TOKENS {
        if let Some(rest) = title.strip_prefix(token) {
            return Ok(ParsedTitle {
                marker: Some(kind),
                title: rest.trim().to_string(),
            });
        }
    }

    Ok(ParsedTitle {
        marker: None,
        title: title.to_string(),
    })
}
