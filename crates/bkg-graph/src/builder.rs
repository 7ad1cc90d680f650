//! End-to-end knowledge graph build.
//!
//! Stages run strictly in order; the first failure aborts the rest and is
//! reported once, tagged with the stage it happened in. Nothing is rolled
//! back.

use std::fmt;
use std::time::{Duration, Instant};

use bkg_core::{AppConfig, BoroughFilter, DataPaths, SurvivalKey};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::client::{CypherExecutor, GraphClient, GraphConfig, RecordExt, Statement};
use crate::error::{GraphError, GraphResult};
use crate::import::{self, ImportSummary};
use crate::relationships;
use crate::schema;

/// Build pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    Reset,
    SchemaSetup,
    ImportBusinesses,
    ImportPopulation,
    ImportSurvival,
    ConnectLocation,
    ConnectAdjacency,
    ConnectContainment,
    Done,
}

impl BuildStage {
    /// Working stages in execution order.
    pub const SEQUENCE: [BuildStage; 8] = [
        BuildStage::Reset,
        BuildStage::SchemaSetup,
        BuildStage::ImportBusinesses,
        BuildStage::ImportPopulation,
        BuildStage::ImportSurvival,
        BuildStage::ConnectLocation,
        BuildStage::ConnectAdjacency,
        BuildStage::ConnectContainment,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            BuildStage::Reset => "Clearing the database",
            BuildStage::SchemaSetup => "Setting up constraints",
            BuildStage::ImportBusinesses => "Importing businesses",
            BuildStage::ImportPopulation => "Importing population density",
            BuildStage::ImportSurvival => "Importing business survival rates",
            BuildStage::ConnectLocation => "Connecting businesses to boroughs",
            BuildStage::ConnectAdjacency => "Connecting neighbouring boroughs",
            BuildStage::ConnectContainment => "Connecting boroughs to aggregate regions",
            BuildStage::Done => "Knowledge graph built",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Reset => "reset",
            BuildStage::SchemaSetup => "schema_setup",
            BuildStage::ImportBusinesses => "import_businesses",
            BuildStage::ImportPopulation => "import_population",
            BuildStage::ImportSurvival => "import_survival",
            BuildStage::ConnectLocation => "connect_location",
            BuildStage::ConnectAdjacency => "connect_adjacency",
            BuildStage::ConnectContainment => "connect_containment",
            BuildStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Inputs for one build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub paths: DataPaths,
    /// Applied identically to every import and relationship step.
    pub filter: BoroughFilter,
    pub survival_key: SurvivalKey,
}

impl BuildOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            paths: config.data.clone(),
            filter: BoroughFilter::only(config.import.test_boroughs.iter().cloned()),
            survival_key: config.import.survival_key,
        }
    }

    /// Replace the allow-list. An empty list builds everything.
    pub fn with_boroughs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = BoroughFilter::only(names);
        self
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: BuildStage,
    pub summary: ImportSummary,
    pub elapsed_ms: u128,
}

/// Outcome of a completed build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub elapsed: Duration,
    pub boroughs: Vec<String>,
    pub stages: Vec<StageReport>,
}

impl BuildReport {
    pub fn stage(&self, stage: BuildStage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}

/// Called as each stage starts, and once more with [`BuildStage::Done`].
pub type StageObserver<'a> = &'a (dyn Fn(BuildStage) + Send + Sync);

/// Connect, build, and close the connection whatever the outcome.
pub async fn build_knowledge_graph(
    config: &GraphConfig,
    options: &BuildOptions,
    observer: Option<StageObserver<'_>>,
) -> GraphResult<BuildReport> {
    let client = GraphClient::connect(config).await?;
    let result = run_build(&client, options, observer).await;
    client.close();
    result
}

/// Run every stage against `exec`.
pub async fn run_build(
    exec: &dyn CypherExecutor,
    options: &BuildOptions,
    observer: Option<StageObserver<'_>>,
) -> GraphResult<BuildReport> {
    let started_at = Utc::now();
    let started = Instant::now();
    let boroughs = options.filter.names();
    info!(boroughs = ?boroughs, "Starting knowledge graph build");

    let mut stages = Vec::with_capacity(BuildStage::SEQUENCE.len());
    for stage in BuildStage::SEQUENCE {
        if let Some(notify) = observer {
            notify(stage);
        }
        info!(%stage, "{}...", stage.description());

        let stage_started = Instant::now();
        let summary = run_stage(exec, stage, options)
            .await
            .map_err(|source| GraphError::Build {
                stage,
                source: Box::new(source),
            })?;

        stages.push(StageReport {
            stage,
            summary,
            elapsed_ms: stage_started.elapsed().as_millis(),
        });
    }

    if let Some(notify) = observer {
        notify(BuildStage::Done);
    }
    let elapsed = started.elapsed();
    info!(elapsed_ms = elapsed.as_millis() as u64, "Knowledge graph build complete");

    Ok(BuildReport {
        started_at,
        elapsed,
        boroughs,
        stages,
    })
}

async fn run_stage(
    exec: &dyn CypherExecutor,
    stage: BuildStage,
    options: &BuildOptions,
) -> GraphResult<ImportSummary> {
    let paths = &options.paths;
    let filter = &options.filter;
    match stage {
        BuildStage::Reset => clear_database(exec).await,
        BuildStage::SchemaSetup => {
            let statements = schema::initialize_schema(exec).await?;
            Ok(ImportSummary {
                rows_submitted: statements,
                ..Default::default()
            })
        }
        BuildStage::ImportBusinesses => import::import_businesses(exec, &paths.businesses, filter).await,
        BuildStage::ImportPopulation => import::import_population(exec, &paths.population, filter).await,
        BuildStage::ImportSurvival => {
            import::import_survival(exec, &paths.survival, filter, options.survival_key).await
        }
        BuildStage::ConnectLocation => {
            relationships::connect_businesses_to_boroughs(exec, &paths.businesses, filter).await
        }
        BuildStage::ConnectAdjacency => {
            relationships::connect_neighbouring_boroughs(exec, &paths.adjacency, filter).await
        }
        BuildStage::ConnectContainment => {
            relationships::connect_boroughs_to_aggregate(exec, &paths.hierarchy, filter).await
        }
        BuildStage::Done => Ok(ImportSummary::default()),
    }
}

/// Delete every node and relationship, then drop every constraint and
/// index by name. The summary counts dropped schema objects.
pub async fn clear_database(exec: &dyn CypherExecutor) -> GraphResult<ImportSummary> {
    exec.run(Statement::new("MATCH (n) DETACH DELETE n")).await?;

    let mut dropped = 0;
    for (kind, show) in [
        ("CONSTRAINT", "SHOW CONSTRAINTS YIELD name RETURN name"),
        ("INDEX", "SHOW INDEXES YIELD name RETURN name"),
    ] {
        let outcome = exec.query(Statement::new(show)).await?;
        for record in &outcome.records {
            let name = record.text("name")?;
            info!(kind, %name, "Dropping schema object");
            exec.run(Statement::new(format!(
                "DROP {} {} IF EXISTS",
                kind,
                escape_identifier(&name)
            )))
            .await?;
            dropped += 1;
        }
    }

    if dropped == 0 {
        warn!("No constraints or indexes found to drop");
    }
    info!(dropped, "Database cleared");
    Ok(ImportSummary {
        rows_submitted: dropped,
        ..Default::default()
    })
}

/// Quote a schema object name as a Cypher identifier.
pub fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
