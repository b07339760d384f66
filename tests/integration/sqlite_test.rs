//! SQLite client integration tests.

use askdb::config::ConnectionConfig;
use askdb::db::{self, DatabaseClient, SqliteClient, Value};
use askdb::schema::{SchemaCache, SchemaProvider};

use super::{sample_client, SAMPLE_SQL};

#[tokio::test]
async fn test_sample_tables_are_listed_by_name() {
    let client = sample_client().await;

    let tables = client.list_tables().await.unwrap();

    assert_eq!(tables, vec!["orders", "products", "users"]);
}

#[tokio::test]
async fn test_columns_keep_declaration_order_and_nullability() {
    let client = sample_client().await;

    let columns = client.list_columns("orders").await.unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();

    assert_eq!(
        names,
        vec!["id", "user_id", "product_id", "quantity", "total_price", "order_date"]
    );
    let user_id = &columns[1];
    assert_eq!(user_id.data_type, "INTEGER");
    assert!(!user_id.is_nullable);
    assert!(columns[5].is_nullable);
}

#[tokio::test]
async fn test_provider_renders_sample_schema() {
    let client = sample_client().await;
    let provider = SchemaProvider::new(client, SchemaCache::new(), true);

    let schema = provider.get_schema(true).await.unwrap();

    assert!(schema.starts_with("\nTable: orders\n  - id: INTEGER\n  - user_id: INTEGER NOT NULL"));
    assert!(schema.ends_with("  - created_at: TIMESTAMP"));
    assert!(provider.cache().is_valid());
}

#[tokio::test]
async fn test_values_are_typed_by_storage_class() {
    let client = sample_client().await;

    let result = client
        .execute_query("SELECT name, price, stock, NULL AS missing FROM products WHERE id = 2")
        .await
        .unwrap();

    assert_eq!(result.row_count(), 1);
    let row = &result.rows[0];
    assert_eq!(row[0], Value::String("Mechanical Keyboard".to_string()));
    assert_eq!(row[1], Value::Float(499.0));
    assert_eq!(row[2], Value::Int(100));
    assert_eq!(row[3], Value::Null);
}

#[tokio::test]
async fn test_connect_through_factory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    let url = format!("sqlite://{}", path.display());
    let config = ConnectionConfig::from_connection_string(&url).unwrap();

    let client = db::connect(&config).await.unwrap();
    client.execute_script(SAMPLE_SQL).await.unwrap();
    client.close().await.unwrap();

    let reopened = SqliteClient::connect(&config).await.unwrap();
    let result = reopened
        .execute_query("SELECT COUNT(*) FROM orders")
        .await
        .unwrap();
    assert_eq!(result.rows[0][0], Value::Int(6));
}

#[tokio::test]
async fn test_seed_script_can_be_rerun() {
    let client = sample_client().await;

    client.execute_script(SAMPLE_SQL).await.unwrap();

    let result = client.execute_query("SELECT COUNT(*) FROM users").await.unwrap();
    assert_eq!(result.rows[0][0], Value::Int(4));
}
