//! # BKG Graph
//!
//! Neo4j side of the borough knowledge graph.
//!
//! Imports the borough CSV datasets as nodes, wires up location, adjacency
//! and containment edges, and answers the parameterized read queries the
//! dashboard is built on. Everything talks to the database through the
//! [`CypherExecutor`] trait.

pub mod builder;
pub mod client;
pub mod error;
pub mod import;
pub mod queries;
pub mod relationships;
pub mod schema;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use builder::{
    build_knowledge_graph, clear_database, run_build, BuildOptions, BuildReport, BuildStage,
    StageReport,
};
pub use client::{
    CypherExecutor, GraphClient, GraphConfig, GraphCounts, QueryOutcome, QuerySummary, Record,
    RecordExt, Statement,
};
pub use error::{GraphError, GraphResult};
pub use import::ImportSummary;
pub use schema::initialize_schema;
