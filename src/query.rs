use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

use crate::{config::QueryServiceConfig, error::DataError};

/// Statement
///
/// Parameterized SQL text plus its positional parameters, serialized as the request
/// body of the query endpoint (`{"sql": ..., "params": [...]}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends a positional parameter; `None` binds SQL NULL.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// QueryEnvelope
///
/// The double-nested response shape: `{"result": [{"results": [...]}], "success": bool}`.
/// Every field defaults, whether absent or `null`, so that a partial or error payload
/// such as `{"result": null, "success": false, "errors": [...]}` still decodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Vec<QueryResult>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QueryEnvelope {
    /// Builds a successful envelope holding one result set.
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            result: vec![QueryResult { results: rows }],
            success: true,
            errors: Vec::new(),
        }
    }

    /// Rows of the first result set; an absent result set yields an empty list.
    pub fn rows<T: DeserializeOwned>(self) -> Result<Vec<T>, DataError> {
        let rows = self
            .result
            .into_iter()
            .next()
            .map(|set| set.results)
            .unwrap_or_default();

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(DataError::from))
            .collect()
    }

    /// First row of the first result set, as produced by `RETURNING *`.
    pub fn first_row<T: DeserializeOwned>(self) -> Result<T, DataError> {
        let row = self
            .result
            .into_iter()
            .next()
            .and_then(|set| set.results.into_iter().next())
            .ok_or(DataError::MissingRow)?;

        Ok(serde_json::from_value(row)?)
    }
}

/// QueryExecutor
///
/// The seam between the typed data layer and the remote relational service.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, statement: Statement) -> Result<QueryEnvelope, DataError>;
}

pub type ExecutorState = Arc<dyn QueryExecutor>;

/// HttpQueryExecutor
///
/// Posts statements to the remote query endpoint with a bearer credential. No retries
/// and no timeout beyond the client defaults.
#[derive(Clone)]
pub struct HttpQueryExecutor {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl HttpQueryExecutor {
    pub fn new(client: reqwest::Client, config: &QueryServiceConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
    async fn execute(&self, statement: Statement) -> Result<QueryEnvelope, DataError> {
        tracing::debug!(
            sql = %statement.sql,
            params = statement.params.len(),
            "dispatching query"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&statement)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let envelope: QueryEnvelope = serde_json::from_slice(&body)?;

        if !envelope.success {
            tracing::warn!(
                %status,
                errors = ?envelope.errors,
                "query service reported an unsuccessful query"
            );
        }

        Ok(envelope)
    }
}
