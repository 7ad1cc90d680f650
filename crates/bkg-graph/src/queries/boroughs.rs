use crate::client::{CypherExecutor, RecordExt, Statement};
use crate::error::GraphResult;

use super::{fetch, text_column};

/// Every borough name, alphabetical.
pub async fn all_boroughs(exec: &dyn CypherExecutor) -> GraphResult<Vec<String>> {
    text_column(exec, "MATCH (b:Borough) RETURN b.name AS name ORDER BY name", "name").await
}

/// The borough itself followed by its direct neighbours (alphabetical).
/// Empty when the borough is unknown.
pub async fn borough_and_neighbours(exec: &dyn CypherExecutor, name: &str) -> GraphResult<Vec<String>> {
    let statement = Statement::new(
        "MATCH (b:Borough {name: $name})
         OPTIONAL MATCH (b)-[:NEIGHBOURS]-(n:Borough)
         WITH b, collect(DISTINCT n.name) AS neighbours
         RETURN b.name AS name, neighbours",
    )
    .param("name", name);

    let records = fetch(exec, statement).await?;
    let Some(record) = records.first() else {
        return Ok(Vec::new());
    };

    let own = record.text("name")?;
    let mut neighbours: Vec<String> = record
        .text_list("neighbours")?
        .into_iter()
        .filter(|n| *n != own)
        .collect();
    neighbours.sort();
    neighbours.dedup();

    let mut out = Vec::with_capacity(neighbours.len() + 1);
    out.push(own);
    out.extend(neighbours);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_self_first() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({
            "name": "Merton",
            "neighbours": ["Wandsworth", "Sutton", "Merton"]
        })]);
        let names = borough_and_neighbours(&exec, "Merton").await.unwrap();
        assert_eq!(names, vec!["Merton", "Sutton", "Wandsworth"]);
        assert_eq!(exec.taken()[0].params["name"], "Merton");
    }

    #[tokio::test]
    async fn test_unknown_borough() {
        let exec = RecordingExecutor::default();
        assert!(borough_and_neighbours(&exec, "Atlantis").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_boroughs() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({"name": "Merton"}), json!({"name": "Sutton"})]);
        assert_eq!(all_boroughs(&exec).await.unwrap(), vec!["Merton", "Sutton"]);
    }

    #[tokio::test]
    async fn test_query_error_is_not_empty() {
        let exec = RecordingExecutor::default();
        exec.fail_next("boom");
        assert!(all_boroughs(&exec).await.is_err());
    }
}
