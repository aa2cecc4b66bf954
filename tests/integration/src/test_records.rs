//! End-to-end record operations over HTTP against the in-memory backend.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use o2p_core::MemoryBackend;
    use o2p_http::InvocationHttpConfig;
    use serde_json::json;

    use crate::{dispatcher, invoke, memory_dispatcher, spawn_server, spawn_server_with_config};

    #[tokio::test]
    async fn test_should_run_record_lifecycle() {
        let server = spawn_server(memory_dispatcher()).await;
        let client = reqwest::Client::new();

        let (status, body) = invoke(
            &client,
            &server,
            &json!({
                "operation": "create",
                "arguments": {"record": {"id": "c1", "name": "Henrietta"}}
            }),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body, json!({"id": "c1", "name": "Henrietta"}));

        let (_, body) = invoke(&client, &server, &json!({"operation": "getAll"})).await;
        assert_eq!(body, json!([{"id": "c1", "name": "Henrietta"}]));

        let (_, body) = invoke(
            &client,
            &server,
            &json!({
                "operation": "update",
                "arguments": {"record": {"id": "c1", "eggsCount": 3}}
            }),
        )
        .await;
        assert_eq!(body, json!({"id": "c1", "eggsCount": 3}));

        let (_, body) = invoke(
            &client,
            &server,
            &json!({"operation": "getById", "arguments": {"id": "c1"}}),
        )
        .await;
        assert_eq!(body, json!({"id": "c1", "eggsCount": 3, "name": "Henrietta"}));

        let (_, body) = invoke(
            &client,
            &server,
            &json!({"operation": "remove", "arguments": {"id": "c1"}}),
        )
        .await;
        assert_eq!(body, json!("c1"));

        let (_, body) = invoke(
            &client,
            &server,
            &json!({"operation": "getById", "arguments": {"id": "c1"}}),
        )
        .await;
        assert_eq!(body, serde_json::Value::Null);

        let (_, body) = invoke(&client, &server, &json!({"operation": "getAll"})).await;
        assert_eq!(body, json!([]));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_accept_appsync_events() {
        let server = spawn_server(memory_dispatcher()).await;
        let client = reqwest::Client::new();

        let (status, body) = invoke(
            &client,
            &server,
            &json!({
                "info": {"fieldName": "create"},
                "arguments": {"chicken": {"id": "c2", "name": "Ginger", "status": "laying"}}
            }),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["id"], "c2");

        let (_, body) = invoke(
            &client,
            &server,
            &json!({
                "info": {"fieldName": "update"},
                "arguments": {"chicken": {"id": "c2", "status": "resting"}}
            }),
        )
        .await;
        assert_eq!(body, json!({"id": "c2", "status": "resting"}));

        let (_, body) = invoke(
            &client,
            &server,
            &json!({"info": {"fieldName": "getById"}, "arguments": {"id": "c2"}}),
        )
        .await;
        assert_eq!(body, json!({"id": "c2", "name": "Ginger", "status": "resting"}));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_answer_null_for_unknown_operation() {
        let server = spawn_server(memory_dispatcher()).await;
        let client = reqwest::Client::new();

        let (status, body) = invoke(
            &client,
            &server,
            &json!({"operation": "frobnicate", "arguments": {"id": "c1"}}),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body, serde_json::Value::Null);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_unknown_operation_in_strict_mode() {
        let backend = Arc::new(MemoryBackend::new().with_table("o2p"));
        let server = spawn_server(dispatcher(backend, "o2p", true)).await;
        let client = reqwest::Client::new();

        let (status, body) = invoke(&client, &server, &json!({"operation": "frobnicate"})).await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(body["__type"], "UnknownOperation");

        let (status, body) = invoke(&client, &server, &json!({"operation": "getById"})).await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(body["__type"], "MissingArgument");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_mask_missing_table_as_empty_results() {
        let server = spawn_server(dispatcher(Arc::new(MemoryBackend::new()), "o2p", false)).await;
        let client = reqwest::Client::new();

        let (status, body) = invoke(
            &client,
            &server,
            &json!({"operation": "getById", "arguments": {"id": "c1"}}),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body, serde_json::Value::Null);

        let (_, body) = invoke(&client, &server, &json!({"operation": "getAll"})).await;
        assert_eq!(body, json!([]));

        let (_, body) = invoke(
            &client,
            &server,
            &json!({"operation": "create", "arguments": {"record": {"id": "c1"}}}),
        )
        .await;
        assert_eq!(body, serde_json::Value::Null);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_malformed_json() {
        let server = spawn_server(memory_dispatcher()).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(server.url("/"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        assert!(resp.headers().contains_key("x-request-id"));
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["__type"], "SerializationException");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_oversized_body() {
        let config = InvocationHttpConfig {
            max_body_bytes: 64,
            ..InvocationHttpConfig::default()
        };
        let server = spawn_server_with_config(memory_dispatcher(), config).await;
        let client = reqwest::Client::new();

        let padding = "x".repeat(128);
        let resp = client
            .post(server.url("/"))
            .json(&json!({
                "operation": "create",
                "arguments": {"record": {"id": "c1", "padding": padding}}
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
        assert!(resp.headers().contains_key("x-request-id"));
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["__type"], "RequestEntityTooLarge");

        let (status, body) = invoke(&client, &server, &json!({"operation": "getAll"})).await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body, json!([]));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_report_health_and_unknown_routes() {
        let server = spawn_server(memory_dispatcher()).await;
        let client = reqwest::Client::new();

        let resp = client.get(server.url("/health")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "running");
        assert!(body["version"].is_string());

        let resp = client.get(server.url("/nope")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        let resp = client.get(server.url("/")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

        server.stop().await;
    }
}
