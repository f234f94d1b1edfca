//! Intercept pattern matching.
//!
//! The configured pattern is parsed once per run. Three forms are
//! recognized:
//! - `/body/flags` — a literal regex with optional flags (`i` is honored,
//!   the rest have no meaning here and are ignored)
//! - a string containing `*` or `?` — a glob, where `**` spans path
//!   segments and `*` stays within one
//! - anything else — an exact URL match
//!
//! The bare pattern `*` matches every URL; it is the configured default so
//! hosts that never set a pattern intercept everything.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone)]
pub enum InterceptPattern {
    All,
    Exact(String),
    Glob(Regex),
    Regex(Regex),
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid intercept pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl InterceptPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern == "*" || pattern == "**" {
            return Ok(Self::All);
        }

        if let Some((body, flags)) = split_regex_literal(pattern) {
            let expr = if flags.contains('i') {
                format!("(?i){body}")
            } else {
                body.to_string()
            };
            let regex = Regex::new(&expr).map_err(|source| PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;
            return Ok(Self::Regex(regex));
        }

        if pattern.contains('*') || pattern.contains('?') {
            let regex =
                Regex::new(&glob_to_regex(pattern)).map_err(|source| PatternError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })?;
            return Ok(Self::Glob(regex));
        }

        Ok(Self::Exact(pattern.to_string()))
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(expected) => url == expected,
            Self::Glob(regex) | Self::Regex(regex) => regex.is_match(url),
        }
    }
}

/// Splits `/body/flags` into `(body, flags)` if the pattern is a regex
/// literal: it must start with `/` and end with `/` plus zero or more
/// ASCII letter flags.
fn split_regex_literal(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let (body, flags) = (&rest[..close], &rest[close + 1..]);
    if flags.chars().all(|c| c.is_ascii_alphabetic()) {
        Some((body, flags))
    } else {
        None
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut expr = String::from("^");
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    expr.push_str(".*");
                } else {
                    expr.push_str("[^/]*");
                }
            }
            '?' => expr.push('.'),
            _ => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');
    expr
}
