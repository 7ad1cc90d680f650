//! Error types for graph access and the build pipeline.

use bkg_core::CoreError;
use thiserror::Error;

use crate::builder::BuildStage;

pub type GraphResult<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    /// The client never connected; no request was sent.
    #[error("graph database is not connected")]
    Disconnected,

    #[error("failed to connect to {uri}: {message}")]
    Connect { uri: String, message: String },

    #[error("query failed: {message}")]
    Query { statement: String, message: String },

    /// A read-only query contained a clause that can modify the graph.
    #[error("{clause} is not allowed in a read-only query")]
    WriteNotAllowed { clause: String },

    #[error("unexpected value for '{field}': {message}")]
    Decode { field: String, message: String },

    #[error(transparent)]
    Dataset(#[from] CoreError),

    #[error("knowledge graph build failed at {stage}: {source}")]
    Build {
        stage: BuildStage,
        #[source]
        source: Box<GraphError>,
    },
}

impl GraphError {
    pub fn query(statement: &str, message: impl ToString) -> Self {
        Self::Query {
            statement: statement.to_string(),
            message: message.to_string(),
        }
    }

    pub fn decode(field: &str, message: impl ToString) -> Self {
        Self::Decode {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the error means the database is unavailable rather than
    /// the request being wrong.
    pub fn is_unavailable(&self) -> bool {
        match self {
            GraphError::Disconnected | GraphError::Connect { .. } => true,
            GraphError::Build { source, .. } => source.is_unavailable(),
            _ => false,
        }
    }
}
