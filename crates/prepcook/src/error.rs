// File: src/error.rs
// Purpose: Fatal render errors

use prepcook_parser::ParseError;
use thiserror::Error;

use crate::resolver::ExprFailure;

/// Errors that abort a render. No partial output is returned with them.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot iterate `{collection}` at scope `{scope}`: {reason}")]
    IteratorType {
        collection: String,
        scope: String,
        reason: String,
    },

    #[error("no {kind} is bound as `{name}`")]
    UnresolvedBinding { kind: &'static str, name: String },

    #[error("invalid include `{0}`, expected `css:<name>` or `js:<name>`")]
    InvalidInclude(String),

    #[error("`{expression}` does not satisfy `{assertion}`")]
    TypeAssertion {
        expression: String,
        assertion: String,
        #[source]
        source: ExprFailure,
    },

    #[error("failed to load template `{name}`")]
    Loader {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("sub-templates nested deeper than {0} levels")]
    TemplateDepthExceeded(usize),
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
