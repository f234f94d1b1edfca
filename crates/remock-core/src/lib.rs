//! # remock-core
//!
//! Policy engine for the Remock fixture broker.
//!
//! This crate provides:
//! - Configuration for the broker's host-visible options
//! - Title marker parsing (`[x]` / `[r]` / `[s]`)
//! - The per-run session owning the mode sets and mode resolution
//! - Fixture naming (request URL -> stable fixture key)
//! - Intercept pattern matching and the stub-mode interceptor

pub mod config;
mod error;
pub mod interceptor;
pub mod marker;
pub mod naming;
pub mod pattern;
pub mod session;

pub use config::{DEFAULT_DISAMBIGUATION_TOKEN, DEFAULT_INTERCEPT_PATTERN, RemockConfig};
pub use error::{CoreError, Result};
pub use interceptor::{
    STUB_HEADER_NAME, STUB_HEADER_VALUE, StubDecision, StubInterceptor, StubReply,
};
pub use marker::{MarkerError, MarkerKind, ParsedTitle, parse_title};
pub use naming::{fixture_key, sanitize};
pub use pattern::{InterceptPattern, PatternError};
pub use session::{ModeDecision, ResolvedTest, TestRunSession};
