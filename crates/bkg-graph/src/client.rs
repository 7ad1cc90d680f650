//! Neo4j connection client.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use neo4rs::{
    BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
    ConfigBuilder, Graph, Query,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::{GraphError, GraphResult};

/// One result row: column name to JSON value.
pub type Record = Map<String, Value>;

/// Configuration for connecting to Neo4j.
///
/// The password is never serialized and is masked in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
            max_connections: 8,
        }
    }
}

impl GraphConfig {
    /// Read `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` and `NEO4J_DATABASE`,
    /// loading a `.env` file first if present. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            uri: env::var("NEO4J_URI").unwrap_or(defaults.uri),
            user: env::var("NEO4J_USER").unwrap_or(defaults.user),
            password: env::var("NEO4J_PASSWORD").unwrap_or(defaults.password),
            database: env::var("NEO4J_DATABASE").unwrap_or(defaults.database),
            max_connections: defaults.max_connections,
        }
    }
}

/// A Cypher statement with bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Map<String, Value>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Map::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    fn to_query(&self) -> Query {
        self.params
            .iter()
            .fold(Query::new(self.text.clone()), |query, (key, value)| {
                query.param(key, json_to_bolt(value))
            })
    }
}

/// What the server reported about one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySummary {
    pub statement: String,
    pub records: usize,
    pub elapsed: Duration,
}

/// Rows, column names and summary of one statement.
///
/// Column names are taken from the first row; an empty result has none.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub records: Vec<Record>,
    pub keys: Vec<String>,
    pub summary: QuerySummary,
}

impl QueryOutcome {
    pub fn new(statement: &str, records: Vec<Record>, elapsed: Duration) -> Self {
        let keys = records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        let summary = QuerySummary {
            statement: statement.to_string(),
            records: records.len(),
            elapsed,
        };
        Self {
            records,
            keys,
            summary,
        }
    }
}

/// Anything that can run Cypher. The pipeline and the query layer take
/// this instead of a concrete client.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    async fn query(&self, statement: Statement) -> GraphResult<QueryOutcome>;

    /// Run a statement inside a transaction that is always rolled back, so
    /// nothing it writes is kept.
    async fn query_read_only(&self, statement: Statement) -> GraphResult<QueryOutcome>;

    /// Run a statement whose rows are not needed.
    async fn run(&self, statement: Statement) -> GraphResult<QuerySummary> {
        self.query(statement).await.map(|outcome| outcome.summary)
    }
}

/// Client for the borough knowledge graph.
///
/// A client built with [`GraphClient::connect_or_disabled`] may hold no
/// connection; every call then fails with [`GraphError::Disconnected`].
#[derive(Clone)]
pub struct GraphClient {
    graph: Option<Graph>,
    config: GraphConfig,
}

impl GraphClient {
    /// Connect and ping the server.
    ///
    /// neo4rs opens its pool lazily, so a `RETURN 1` round trip is made here
    /// to surface a bad URI or credentials immediately.
    pub async fn connect(config: &GraphConfig) -> GraphResult<Self> {
        let connect_error = |message: String| GraphError::Connect {
            uri: config.uri.clone(),
            message,
        };

        let neo4j_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(500)
            .build()
            .map_err(|e| connect_error(e.to_string()))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self {
            graph: Some(graph),
            config: config.clone(),
        })
    }

    /// Like [`GraphClient::connect`], but a failure is logged and a disabled
    /// client is returned instead.
    pub async fn connect_or_disabled(config: &GraphConfig) -> Self {
        match Self::connect(config).await {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "Neo4j unavailable, graph features disabled");
                Self::disabled(config)
            }
        }
    }

    /// A client with no connection.
    pub fn disabled(config: &GraphConfig) -> Self {
        Self {
            graph: None,
            config: config.clone(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.graph.is_some()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Release the connection pool.
    pub fn close(self) {
        if self.graph.is_some() {
            info!(uri = %self.config.uri, "Neo4j connection closed");
        }
    }

    /// Node and relationship counts for status display.
    pub async fn counts(&self) -> GraphResult<GraphCounts> {
        graph_counts(self).await
    }
}

#[async_trait]
impl CypherExecutor for GraphClient {
    async fn query(&self, statement: Statement) -> GraphResult<QueryOutcome> {
        let graph = self.graph.as_ref().ok_or(GraphError::Disconnected)?;
        let started = Instant::now();
        debug!(statement = %statement.text, params = statement.params.len(), "Running Cypher");

        let mut stream = graph.execute(statement.to_query()).await.map_err(|e| {
            error!(error = %e, statement = %statement.text, "Cypher execution failed");
            GraphError::query(&statement.text, e)
        })?;

        let mut records = Vec::new();
        loop {
            match stream.next().await {
                Ok(Some(row)) => {
                    let record: Record = row
                        .to()
                        .map_err(|e| GraphError::decode("row", e))?;
                    records.push(record);
                }
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, statement = %statement.text, "Cypher stream failed");
                    return Err(GraphError::query(&statement.text, e));
                }
            }
        }

        Ok(QueryOutcome::new(&statement.text, records, started.elapsed()))
    }

    async fn query_read_only(&self, statement: Statement) -> GraphResult<QueryOutcome> {
        let graph = self.graph.as_ref().ok_or(GraphError::Disconnected)?;
        let started = Instant::now();
        debug!(statement = %statement.text, "Running Cypher in a rolled-back transaction");

        let fail = |e: neo4rs::Error| {
            error!(error = %e, statement = %statement.text, "Cypher execution failed");
            GraphError::query(&statement.text, e)
        };

        let mut txn = graph.start_txn().await.map_err(fail)?;
        let mut records = Vec::new();
        let drained = match txn.execute(statement.to_query()).await {
            Ok(mut stream) => loop {
                match stream.next(txn.handle()).await {
                    Ok(Some(row)) => match row.to::<Record>() {
                        Ok(record) => records.push(record),
                        Err(e) => break Err(GraphError::decode("row", e)),
                    },
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(fail(e)),
                }
            },
            Err(e) => Err(fail(e)),
        };

        if let Err(e) = txn.rollback().await {
            warn!(error = %e, "Rollback of read-only transaction failed");
        }
        drained?;

        Ok(QueryOutcome::new(&statement.text, records, started.elapsed()))
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
    pub labels: BTreeMap<String, usize>,
}

/// Count nodes, relationships and nodes per label.
pub async fn graph_counts(exec: &dyn CypherExecutor) -> GraphResult<GraphCounts> {
    let nodes = scalar_count(exec, "MATCH (n) RETURN count(n) AS count").await?;
    let relationships = scalar_count(exec, "MATCH ()-[r]->() RETURN count(r) AS count").await?;

    let outcome = exec
        .query(Statement::new(
            "MATCH (n) UNWIND labels(n) AS label RETURN label, count(*) AS count ORDER BY label",
        ))
        .await?;
    let mut labels = BTreeMap::new();
    for record in &outcome.records {
        labels.insert(record.text("label")?, record.int("count")? as usize);
    }

    Ok(GraphCounts {
        nodes,
        relationships,
        labels,
    })
}

async fn scalar_count(exec: &dyn CypherExecutor, text: &str) -> GraphResult<usize> {
    let outcome = exec.query(Statement::new(text)).await?;
    match outcome.records.first() {
        Some(record) => Ok(record.int("count")? as usize),
        None => Ok(0),
    }
}

/// Typed access to record fields.
pub trait RecordExt {
    fn text(&self, key: &str) -> GraphResult<String>;
    fn int(&self, key: &str) -> GraphResult<i64>;
    fn opt_int(&self, key: &str) -> GraphResult<Option<i64>>;
    fn opt_float(&self, key: &str) -> GraphResult<Option<f64>>;
    fn text_list(&self, key: &str) -> GraphResult<Vec<String>>;
}

impl RecordExt for Record {
    fn text(&self, key: &str) -> GraphResult<String> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(GraphError::decode(key, format!("expected string, got {:?}", other))),
        }
    }

    fn int(&self, key: &str) -> GraphResult<i64> {
        self.opt_int(key)?
            .ok_or_else(|| GraphError::decode(key, "expected integer, got null"))
    }

    fn opt_int(&self, key: &str) -> GraphResult<Option<i64>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| GraphError::decode(key, format!("expected integer, got {}", v))),
        }
    }

    fn opt_float(&self, key: &str) -> GraphResult<Option<f64>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| GraphError::decode(key, format!("expected number, got {}", v))),
        }
    }

    fn text_list(&self, key: &str) -> GraphResult<Vec<String>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(GraphError::decode(key, format!("expected string, got {}", other))),
                })
                .collect(),
            Some(other) => Err(GraphError::decode(key, format!("expected list, got {}", other))),
        }
    }
}

/// Convert a JSON parameter into its Bolt equivalent.
pub fn json_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => match n.as_f64() {
                Some(f) => BoltType::Float(BoltFloat::new(f)),
                None => {
                    warn!(value = %n, "Number out of Bolt range, sending null");
                    BoltType::Null(BoltNull)
                }
            },
        },
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::Array(items) => {
            let mut list = BoltList::with_capacity(items.len());
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(map) => {
            let mut bolt = BoltMap::with_capacity(map.len());
            for (k, v) in map {
                bolt.put(BoltString::new(k), json_to_bolt(v));
            }
            BoltType::Map(bolt)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every statement and answers from a queue of canned results.
    #[derive(Default)]
    pub(crate) struct RecordingExecutor {
        pub statements: Mutex<Vec<Statement>>,
        /// Texts sent through `query_read_only`.
        pub read_only: Mutex<Vec<String>>,
        responses: Mutex<Vec<GraphResult<Vec<Record>>>>,
    }

    impl RecordingExecutor {
        /// Queue a response. Responses are consumed in order; once the queue
        /// is empty every statement returns no rows.
        pub fn respond(&self, records: Vec<Value>) {
            let records = records
                .into_iter()
                .filter_map(|r| r.as_object().cloned())
                .collect();
            self.responses.lock().unwrap().push(Ok(records));
        }

        pub fn fail_next(&self, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .push(Err(GraphError::query("", message)));
        }

        pub fn texts(&self) -> Vec<String> {
            self.statements
                .lock()
                .unwrap()
                .iter()
                .map(|s| s.text.clone())
                .collect()
        }

        pub fn taken(&self) -> Vec<Statement> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CypherExecutor for RecordingExecutor {
        async fn query(&self, statement: Statement) -> GraphResult<QueryOutcome> {
            let text = statement.text.clone();
            self.statements.lock().unwrap().push(statement);
            let next = {
                let mut queue = self.responses.lock().unwrap();
                if queue.is_empty() {
                    Ok(Vec::new())
                } else {
                    queue.remove(0)
                }
            };
            next.map(|records| QueryOutcome::new(&text, records, Duration::ZERO))
        }

        async fn query_read_only(&self, statement: Statement) -> GraphResult<QueryOutcome> {
            self.read_only.lock().unwrap().push(statement.text.clone());
            self.query(statement).await
        }
    }

    #[tokio::test]
    async fn test_disabled_client_short_circuits() {
        let client = GraphClient::disabled(&GraphConfig::default());
        assert!(!client.is_connected());
        let err = client.query(Statement::new("RETURN 1")).await.unwrap_err();
        assert!(matches!(err, GraphError::Disconnected));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_statement_params() {
        let st = Statement::new("RETURN $x")
            .param("x", 3)
            .param("names", vec!["Merton".to_string()]);
        assert_eq!(st.params["x"], json!(3));
        assert_eq!(st.params["names"], json!(["Merton"]));
    }

    #[test]
    fn test_outcome_keys_from_first_row() {
        let rec = json!({"name": "Merton", "count": 2}).as_object().cloned().unwrap();
        let outcome = QueryOutcome::new("q", vec![rec], Duration::ZERO);
        assert_eq!(outcome.keys, vec!["count", "name"]);
        assert_eq!(outcome.summary.records, 1);
        assert!(QueryOutcome::new("q", vec![], Duration::ZERO).keys.is_empty());
    }

    #[test]
    fn test_record_ext() {
        let rec = json!({
            "name": "Merton",
            "count": 4,
            "rate": 91.5,
            "missing": null,
            "names": ["a", "b"]
        })
        .as_object()
        .cloned()
        .unwrap();
        assert_eq!(rec.text("name").unwrap(), "Merton");
        assert_eq!(rec.int("count").unwrap(), 4);
        assert_eq!(rec.opt_float("rate").unwrap(), Some(91.5));
        assert_eq!(rec.opt_float("count").unwrap(), Some(4.0));
        assert_eq!(rec.opt_int("missing").unwrap(), None);
        assert!(rec.int("missing").is_err());
        assert!(rec.text("count").is_err());
        assert_eq!(rec.text_list("names").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_json_to_bolt() {
        assert!(matches!(json_to_bolt(&json!(null)), BoltType::Null(_)));
        assert!(matches!(json_to_bolt(&json!(7)), BoltType::Integer(_)));
        assert!(matches!(json_to_bolt(&json!(0.5)), BoltType::Float(_)));
        assert!(matches!(json_to_bolt(&json!("x")), BoltType::String(_)));
        match json_to_bolt(&json!([{"a": 1}, 2])) {
            BoltType::List(list) => {
                assert_eq!(list.len(), 2);
                assert!(matches!(list.value[0], BoltType::Map(_)));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_graph_counts() {
        let exec = RecordingExecutor::default();
        exec.respond(vec![json!({"count": 5})]);
        exec.respond(vec![json!({"count": 3})]);
        exec.respond(vec![
            json!({"label": "Borough", "count": 2}),
            json!({"label": "Business", "count": 3}),
        ]);
        let counts = graph_counts(&exec).await.unwrap();
        assert_eq!(counts.nodes, 5);
        assert_eq!(counts.relationships, 3);
        assert_eq!(counts.labels["Business"], 3);
    }

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.database, "neo4j");
    }

    #[test]
    fn test_config_hides_password() {
        let config = GraphConfig {
            password: "s3cret-pw".into(),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret-pw"));
        assert!(debug.contains("bolt://localhost:7687"));

        let value = serde_json::to_value(&config).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["user"], "neo4j");

        let parsed: GraphConfig = serde_json::from_value(json!({
            "uri": "bolt://db:7687",
            "user": "reader",
            "password": "s3cret-pw",
            "database": "neo4j",
            "max_connections": 2
        }))
        .unwrap();
        assert_eq!(parsed.password, "s3cret-pw");
    }

    #[tokio::test]
    async fn test_unreachable_server_gives_disabled_client() {
        let config = GraphConfig {
            uri: "bolt://127.0.0.1:1".into(),
            ..Default::default()
        };
        let client = tokio::time::timeout(
            Duration::from_secs(60),
            GraphClient::connect_or_disabled(&config),
        )
        .await
        .unwrap();

        assert!(!client.is_connected());
        let err = client.query(Statement::new("RETURN 1")).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
