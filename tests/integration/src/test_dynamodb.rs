//! Record store tests against a DynamoDB-compatible endpoint.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aws_sdk_dynamodb::types::{
        AttributeDefinition, AttributeValue as SdkValue, BillingMode, KeySchemaElement, KeyType,
        ScalarAttributeType,
    };
    use o2p_core::{DynamoDbBackend, RecordStore};
    use o2p_model::{AttributeValue, ChangeSet, Record};
    use serde_json::json;

    use crate::{dispatcher, dynamodb_client, invoke, spawn_server, test_table_name};

    /// Helper: create a table keyed by the string attribute `id`.
    async fn create_record_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        client
            .create_table()
            .table_name(table_name)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("id")
                    .key_type(KeyType::Hash)
                    .build()
                    .unwrap(),
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name("id")
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));
    }

    async fn delete_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        let _ = client.delete_table().table_name(table_name).send().await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_run_lifecycle_against_dynamodb() {
        let client = dynamodb_client();
        let table = test_table_name("lifecycle");
        create_record_table(&client, &table).await;
        let store = RecordStore::new(Arc::new(DynamoDbBackend::new(client.clone())), &table);

        let created = store
            .try_create(Record::new("c1").with_attribute("name", "Henrietta"))
            .await
            .unwrap();
        assert_eq!(created.id, "c1");
        assert_eq!(store.try_get_all().await.unwrap().len(), 1);

        let changes = ChangeSet::new()
            .with("eggsCount", 3)
            .unwrap()
            .with("status", "laying")
            .unwrap();
        store.try_update("c1", changes).await.unwrap();

        let stored = store.try_get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(stored.get("name"), Some(&AttributeValue::from("Henrietta")));
        assert_eq!(stored.get("eggsCount"), Some(&AttributeValue::from(3)));
        assert_eq!(stored.get("status"), Some(&AttributeValue::from("laying")));

        assert_eq!(store.try_remove("c1").await.unwrap(), "c1");
        assert_eq!(store.try_get_by_id("c1").await.unwrap(), None);
        assert!(store.try_get_all().await.unwrap().is_empty());

        delete_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_read_items_written_outside_the_store() {
        let client = dynamodb_client();
        let table = test_table_name("foreign");
        create_record_table(&client, &table).await;

        client
            .put_item()
            .table_name(&table)
            .item("id", SdkValue::S("c7".to_owned()))
            .item(
                "colors",
                SdkValue::Ss(vec!["red".to_owned(), "brown".to_owned()]),
            )
            .send()
            .await
            .unwrap();

        let store = RecordStore::new(Arc::new(DynamoDbBackend::new(client.clone())), &table);
        let record = store.try_get_by_id("c7").await.unwrap().unwrap();
        let colors = record.get("colors").and_then(AttributeValue::as_l).unwrap();
        assert_eq!(colors.len(), 2);

        delete_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_scan_past_one_page() {
        let client = dynamodb_client();
        let table = test_table_name("paging");
        create_record_table(&client, &table).await;
        let store = RecordStore::new(Arc::new(DynamoDbBackend::new(client.clone())), &table);

        // Five 350 KB items overflow the 1 MB scan page.
        let padding = "x".repeat(350 * 1024);
        for i in 0..5 {
            store
                .try_create(Record::new(format!("c{i}")).with_attribute("padding", padding.as_str()))
                .await
                .unwrap();
        }

        assert_eq!(store.try_get_all().await.unwrap().len(), 5);

        delete_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_mask_missing_table_over_http() {
        let client = dynamodb_client();
        let backend = Arc::new(DynamoDbBackend::new(client));
        let server = spawn_server(dispatcher(backend, &test_table_name("absent"), false)).await;
        let http = reqwest::Client::new();

        let (status, body) = invoke(
            &http,
            &server,
            &json!({"operation": "getById", "arguments": {"id": "c1"}}),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body, serde_json::Value::Null);

        server.stop().await;
    }
}
