//! # BKG Core
//!
//! Everything in the borough knowledge graph that does not talk to Neo4j:
//! the tabular datasets and their readers, the application config file,
//! the result shapes returned by the query layer, and the pure transforms
//! that turn those results into dashboard charts.

pub mod binning;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod model;

pub use config::{AppConfig, DataPaths, ImportSettings, SurvivalKey};
pub use dataset::BoroughFilter;
pub use error::{CoreError, CoreResult};
