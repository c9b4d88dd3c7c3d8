use std::path::PathBuf;

use thiserror::Error;

/// A failure contained to one subtree of a render.
///
/// Every variant becomes an `Element::Error` at the spot where it happened;
/// siblings keep rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Incorrect type serialization for {type_name}: missing `{parameter}`")]
    MissingParameter {
        type_name: String,
        parameter: &'static str,
    },

    #[error("Incorrect type serialization for {type_name}: malformed `{parameter}` ({detail})")]
    MalformedParameter {
        type_name: String,
        parameter: &'static str,
        detail: String,
    },

    #[error("Unexpected value summary for {type_name}: expected {expected}")]
    UnexpectedSummary {
        type_name: String,
        expected: &'static str,
    },

    #[error("Type alias cycle: {}", chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },

    #[error("Type alias chain for {name} exceeds {limit} hops")]
    AliasChainTooLong { name: String, limit: usize },

    #[error("Maximum nesting depth of {limit} exceeded")]
    DepthExceeded { limit: usize },
}

impl RenderError {
    /// Stable identifier for consumers that style or count errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "missing_parameter",
            Self::MalformedParameter { .. } => "malformed_parameter",
            Self::UnexpectedSummary { .. } => "unexpected_summary",
            Self::AliasCycle { .. } => "alias_cycle",
            Self::AliasChainTooLong { .. } => "alias_chain_too_long",
            Self::DepthExceeded { .. } => "depth_exceeded",
        }
    }
}

/// Failures while turning input files into documents.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {detail}")]
    Parse { origin: String, detail: String },

    #[error("jq expression failed on {origin}: {detail}")]
    Jq { origin: String, detail: String },

    #[error("JSON pointer {pointer} selects nothing in {origin}")]
    PointerMiss { origin: String, pointer: String },

    #[error("glob pattern matched no files: {0}")]
    NoMatches(String),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}
