use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use storefront::{
    error::DataError,
    models::{ContentPatch, NewContent, NewProduct, ProductPatch},
    query::{ExecutorState, QueryEnvelope, QueryExecutor, Statement},
    repository::{D1Repository, Repository, sql},
};

// --- RECORDING EXECUTOR ---

/// Captures every statement and replays canned envelopes in order.
#[derive(Default)]
struct RecordingExecutor {
    statements: Mutex<Vec<Statement>>,
    replies: Mutex<VecDeque<QueryEnvelope>>,
}

impl RecordingExecutor {
    fn replying(replies: Vec<QueryEnvelope>) -> Arc<Self> {
        Arc::new(Self {
            statements: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into()),
        })
    }

    fn last(&self) -> Statement {
        self.statements.lock().unwrap().last().cloned().expect("no statement sent")
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, statement: Statement) -> Result<QueryEnvelope, DataError> {
        self.statements.lock().unwrap().push(statement);
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}

fn repository(executor: &Arc<RecordingExecutor>) -> D1Repository {
    D1Repository::new(executor.clone() as ExecutorState)
}

fn product_row(id: i64, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "price": 399,
        "image_url": null,
        "category": "dropshipping",
        "status": status,
        "created_at": "2025-01-01 10:00:00",
        "updated_at": "2025-01-01 10:00:00"
    })
}

// --- Reads ---

#[tokio::test]
async fn test_list_products_sends_ordered_select_and_decodes_rows() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![
        product_row(2, "Newer", "active"),
        product_row(1, "Older", "draft"),
    ])]);

    let products = repository(&executor).list_products().await.unwrap();

    let statement = executor.last();
    assert_eq!(statement.sql, "SELECT * FROM products ORDER BY created_at DESC");
    assert!(statement.params.is_empty());
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Newer");
    assert_eq!(products[0].price, Some(399.0));
    assert_eq!(products[1].status.as_deref(), Some("draft"));
}

#[tokio::test]
async fn test_list_content_orders_by_page_then_section() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![])]);

    let content = repository(&executor).list_content().await.unwrap();

    assert!(content.is_empty());
    assert_eq!(executor.last().sql, "SELECT * FROM content ORDER BY page, section");
}

#[tokio::test]
async fn test_missing_result_shape_reads_as_empty_list() {
    // Envelope without any result set, e.g. {"success": false, "errors": [...]}.
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::default()]);

    let products = repository(&executor).list_products().await.unwrap();
    assert!(products.is_empty());
}

fn error_envelope() -> QueryEnvelope {
    serde_json::from_value(json!({
        "result": null,
        "success": false,
        "errors": [{ "code": 7500, "message": "no such table: products" }],
        "messages": []
    }))
    .expect("error replies must decode")
}

#[tokio::test]
async fn test_null_result_reads_as_empty_list() {
    let executor = RecordingExecutor::replying(vec![error_envelope(), error_envelope()]);
    let repo = repository(&executor);

    assert!(repo.list_products().await.unwrap().is_empty());
    assert!(repo.list_content().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_with_null_result_passes_failure_flag_through() {
    let executor = RecordingExecutor::replying(vec![error_envelope()]);

    assert!(!repository(&executor).delete_product(5).await.unwrap());
}

#[test]
fn test_null_fields_inside_result_sets_decode() {
    let envelope: QueryEnvelope = serde_json::from_value(json!({
        "result": [{ "results": null }],
        "success": null,
        "errors": null
    }))
    .unwrap();

    assert!(!envelope.success);
    assert!(envelope.errors.is_empty());
    assert!(envelope.rows::<Value>().unwrap().is_empty());
}

#[tokio::test]
async fn test_undecodable_row_is_an_error() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![
        json!({ "id": "not-a-number", "name": 5 }),
    ])]);

    let result = repository(&executor).list_products().await;
    assert!(matches!(result, Err(DataError::Decode(_))));
}

// --- Writes ---

#[tokio::test]
async fn test_create_product_binds_columns_in_order_with_active_default() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![
        product_row(9, "AI Chatbot", "active"),
    ])]);

    let created = repository(&executor)
        .create_product(NewProduct {
            name: "AI Chatbot".to_string(),
            price: Some(1499.0),
            category: Some("ai".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let statement = executor.last();
    assert!(statement.sql.starts_with("INSERT INTO products"));
    assert!(statement.sql.ends_with("RETURNING *"));
    assert_eq!(
        statement.params,
        vec![
            json!("AI Chatbot"),
            Value::Null,
            json!(1499.0),
            Value::Null,
            json!("ai"),
            json!("active"),
        ]
    );
    assert_eq!(created.id, 9);
}

#[tokio::test]
async fn test_create_product_keeps_explicit_status() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![
        product_row(1, "Draft", "draft"),
    ])]);

    repository(&executor)
        .create_product(NewProduct {
            name: "Draft".to_string(),
            status: Some("draft".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(executor.last().params[5], json!("draft"));
}

#[tokio::test]
async fn test_create_without_returned_row_is_missing_row() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![])]);

    let result = repository(&executor)
        .create_content(NewContent {
            page: "home".to_string(),
            section: "hero".to_string(),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(DataError::MissingRow)));
}

#[tokio::test]
async fn test_update_product_binds_nulls_for_absent_fields() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![
        product_row(3, "Renamed", "active"),
    ])]);

    let updated = repository(&executor)
        .update_product(
            3,
            ProductPatch {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let statement = executor.last();
    assert!(statement.sql.contains("name = COALESCE(?, name)"));
    assert!(statement.sql.contains("updated_at = ?"));
    assert!(statement.sql.ends_with("WHERE id = ? RETURNING *"));
    assert_eq!(statement.params.len(), 8);
    assert_eq!(statement.params[0], json!("Renamed"));
    assert!(statement.params[1..6].iter().all(Value::is_null));
    assert!(statement.params[6].is_string());
    assert_eq!(statement.params[7], json!(3));
    assert_eq!(updated.name, "Renamed");
}

#[tokio::test]
async fn test_update_content_targets_content_table() {
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![json!({
        "id": 4, "page": "about", "section": "story", "title": "Our story",
        "content": null, "image_url": null, "status": "active",
        "created_at": null, "updated_at": null
    })])]);

    let updated = repository(&executor)
        .update_content(
            4,
            ContentPatch {
                title: Some("Our story".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let statement = executor.last();
    assert!(statement.sql.starts_with("UPDATE content SET"));
    assert_eq!(statement.params[2], json!("Our story"));
    assert_eq!(statement.params[7], json!(4));
    assert_eq!(updated.title.as_deref(), Some("Our story"));
}

#[tokio::test]
async fn test_delete_reports_remote_success_flag() {
    let failed = QueryEnvelope {
        success: false,
        ..Default::default()
    };
    let executor = RecordingExecutor::replying(vec![QueryEnvelope::with_rows(vec![]), failed]);
    let repo = repository(&executor);

    assert!(repo.delete_product(5).await.unwrap());
    assert_eq!(executor.last().sql, "DELETE FROM products WHERE id = ?");
    assert_eq!(executor.last().params, vec![json!(5)]);

    assert!(!repo.delete_product(5).await.unwrap());
}

// --- Timestamps ---

#[test]
fn test_timestamp_format_and_ordering() {
    let first = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let second = first + Duration::milliseconds(1);

    assert_eq!(sql::timestamp(first), "2025-03-01 12:00:00.000");
    assert!(sql::timestamp(second) > sql::timestamp(first));
}

#[test]
fn test_update_statements_carry_the_given_clock() {
    let now = Utc.with_ymd_and_hms(2025, 6, 30, 8, 15, 0).unwrap();

    let statement = sql::update_content(1, &ContentPatch::default(), now);
    assert_eq!(statement.params[6], json!("2025-06-30 08:15:00.000"));
}
