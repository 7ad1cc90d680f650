//! Neo4j schema initialization (uniqueness constraints).

use tracing::info;

use crate::client::{CypherExecutor, Statement};
use crate::error::GraphResult;

/// Cypher statements for schema initialization.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT borough_name IF NOT EXISTS FOR (b:Borough) REQUIRE b.name IS UNIQUE",
    "CREATE CONSTRAINT business_type_type IF NOT EXISTS FOR (t:BusinessType) REQUIRE t.type IS UNIQUE",
    "CREATE CONSTRAINT business_identity IF NOT EXISTS FOR (b:Business) REQUIRE (b.name, b.osmId) IS UNIQUE",
];

/// Create the constraints. Safe to run multiple times.
pub async fn initialize_schema(exec: &dyn CypherExecutor) -> GraphResult<usize> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        exec.run(Statement::new(*statement)).await?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(SCHEMA_STATEMENTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingExecutor;

    #[tokio::test]
    async fn test_statements_are_idempotent() {
        let exec = RecordingExecutor::default();
        assert_eq!(initialize_schema(&exec).await.unwrap(), 3);
        let texts = exec.texts();
        assert_eq!(texts.len(), 3);
        assert!(texts.iter().all(|t| t.contains("IF NOT EXISTS")));
        assert!(texts[2].contains("(b.name, b.osmId)"));
    }
}
