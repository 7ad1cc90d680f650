//! Free-form graph exploration and the preset tables.

use std::fmt;
use std::str::FromStr;

use bkg_core::model::RelationRecord;
use serde_json::Value;

use crate::client::{CypherExecutor, Record, RecordExt, Statement};
use crate::error::{GraphError, GraphResult};

use super::fetch;

/// Query the graph view starts with.
pub const DEFAULT_GRAPH_QUERY: &str =
    "MATCH (a)-[r]->(b) RETURN a AS source, type(r) AS relation, b AS target LIMIT 100";

const PRESET_LIMIT: i64 = 25;

/// Clauses that modify data or schema.
const WRITE_CLAUSES: &[&str] = &[
    "CREATE", "MERGE", "DELETE", "DETACH", "SET", "REMOVE", "DROP", "LOAD", "FOREACH", "ALTER",
    "GRANT", "DENY", "REVOKE", "START", "STOP", "TERMINATE",
];

/// Reject Cypher containing a write clause or a procedure call.
///
/// Keywords inside string literals, comments, quoted identifiers, property
/// keys and labels are ignored. `CALL { .. }` subqueries are allowed.
pub fn ensure_read_only(cypher: &str) -> GraphResult<()> {
    let chars: Vec<char> = cypher.chars().collect();
    let next_significant = |from: usize| chars[from..].iter().copied().find(|c| !c.is_whitespace());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' | '`' => {
                i += 1;
                while i < chars.len() && chars[i] != c {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                i += 2;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let before = chars[..start].iter().rev().copied().find(|c| !c.is_whitespace());
                if matches!(before, Some('.' | ':' | '$')) || next_significant(i) == Some(':') {
                    continue;
                }

                let word = chars[start..i].iter().collect::<String>().to_uppercase();
                let procedure_call = word == "CALL" && next_significant(i) != Some('{');
                if procedure_call || WRITE_CLAUSES.contains(&word.as_str()) {
                    return Err(GraphError::WriteNotAllowed { clause: word });
                }
            }
            _ => i += 1,
        }
    }
    Ok(())
}

/// Run a query returning `source`, `relation` and `target` columns.
///
/// The query runs as a subquery so the endpoints can be projected to their
/// property maps, and at most `limit` rows come back. Write clauses are
/// rejected up front, and the statement runs in a transaction that is
/// rolled back.
pub async fn graph_view(
    exec: &dyn CypherExecutor,
    cypher: &str,
    limit: i64,
) -> GraphResult<Vec<RelationRecord>> {
    ensure_read_only(cypher)?;
    let inner = cypher.trim().trim_end_matches(';');
    let statement = Statement::new(format!(
        "CALL {{\n{}\n}}\nRETURN properties(source) AS source, relation, properties(target) AS target\nLIMIT $limit",
        inner
    ))
    .param("limit", limit.max(0));

    exec.query_read_only(statement)
        .await?
        .records
        .into_iter()
        .map(relation_record)
        .collect()
}

fn relation_record(mut record: Record) -> GraphResult<RelationRecord> {
    let relation = record.text("relation")?;
    let mut endpoint = |key: &str| match record.remove(key) {
        Some(Value::Object(map)) => Ok(map),
        other => Err(GraphError::decode(key, format!("expected node properties, got {:?}", other))),
    };
    let source = endpoint("source")?;
    let target = endpoint("target")?;
    Ok(RelationRecord {
        source,
        relation,
        target,
    })
}

/// Canned tables for quick inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePreset {
    Boroughs,
    Businesses,
    Relationships,
}

impl TablePreset {
    pub const ALL: [TablePreset; 3] = [
        TablePreset::Boroughs,
        TablePreset::Businesses,
        TablePreset::Relationships,
    ];

    fn statement(&self) -> &'static str {
        match self {
            TablePreset::Boroughs => "MATCH (b:Borough) RETURN properties(b) AS row LIMIT $limit",
            TablePreset::Businesses => "MATCH (b:Business) RETURN properties(b) AS row LIMIT $limit",
            TablePreset::Relationships => {
                "MATCH (a)-[r]->(b)
                 RETURN properties(a) AS source, type(r) AS relation, properties(b) AS target
                 LIMIT $limit"
            }
        }
    }
}

impl fmt::Display for TablePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TablePreset::Boroughs => "boroughs",
            TablePreset::Businesses => "businesses",
            TablePreset::Relationships => "relationships",
        })
    }
}

impl FromStr for TablePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TablePreset::ALL
            .into_iter()
            .find(|p| p.to_string() == s.to_lowercase())
            .ok_or_else(|| format!("unknown table '{}', expected boroughs, businesses or relationships", s))
    }
}

/// Rows of a preset table. Node presets are flattened to the node's
/// properties.
pub async fn preset_table(exec: &dyn CypherExecutor, preset: TablePreset) -> GraphResult<Vec<Record>> {
    let statement = Statement::new(preset.statement()).param("limit", PRESET_LIMIT);
    let records = fetch(exec, statement).await?;

    match preset {
        TablePreset::Relationships => Ok(records),
        TablePreset::Boroughs | TablePreset::Businesses => records
            .into_iter()
            .map(|mut r| match r.remove("row") {
                Some(Value::Object(map)) => Ok(map),
                other => Err(GraphError::decode("row", format!("expected properties, got {:?}", other))),
            })
            .collect(),
    }
}
