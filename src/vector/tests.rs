//! Request/response behaviour against a local mock of the Vectorize API.

use super::*;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const ACCOUNT: &str = "acc-123";
const TOKEN: &str = "tok-secret-value";

fn config_for(server: &ServerGuard) -> ConnectionConfig {
    ConnectionConfig::new(ACCOUNT, TOKEN).with_endpoint(server.url())
}

fn path(endpoint: &str) -> String {
    format!("/accounts/{}/vectorize/v2/{}", ACCOUNT, endpoint)
}

fn client() -> VectorizeClient {
    VectorizeClient::new().unwrap()
}

fn index_body() -> serde_json::Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": {
            "name": "docs-1",
            "config": {"dimensions": 3, "metric": "cosine"},
            "created_on": "2024-05-01T10:00:00.000Z",
            "modified_on": "2024-05-01T10:00:00.000Z"
        }
    })
}

#[tokio::test]
async fn create_index_returns_service_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("indexes").as_str())
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "name": "docs-1",
            "config": {"dimensions": 3, "metric": "cosine"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(index_body().to_string())
        .create_async()
        .await;

    let created = client()
        .create_index(&config_for(&server), &CreateIndexRequest::new("docs-1", 3, Metric::Cosine))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(serde_json::to_value(&created).unwrap(), index_body()["result"]);
}

#[tokio::test]
async fn describe_index_matches_get_index() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path("indexes/docs-1").as_str())
        .with_status(200)
        .with_body(index_body().to_string())
        .expect(2)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = client();
    let fetched = client.get_index(&config, "docs-1").await.unwrap();
    let described = client.describe_index(&config, "docs-1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(fetched, described);
    assert_eq!(
        serde_json::to_vec(&fetched).unwrap(),
        serde_json::to_vec(&described).unwrap()
    );
}

#[tokio::test]
async fn insert_checks_dimensions_before_sending() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("indexes/docs-1/insert").as_str())
        .match_body(Matcher::PartialJson(json!({
            "vectors": [{"id": "v1"}]
        })))
        .with_status(200)
        .with_body(r#"{"success":true,"errors":[],"messages":[],"result":{"mutationId":"m-1"}}"#)
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = client();

    let ok = client
        .insert_vectors(&config, "docs-1", &[Vector::new("v1", vec![0.1, 0.2, 0.3])], Some(3))
        .await
        .unwrap();
    assert_eq!(ok.mutation_id, "m-1");

    let err = client
        .insert_vectors(&config, "docs-1", &[Vector::new("v1", vec![0.1, 0.2])], Some(3))
        .await
        .unwrap_err();
    assert!(matches!(err, VectorizeError::DimensionMismatch { ref id, .. } if id == "v1"));
    assert!(err.is_local());

    mock.assert_async().await;
}

#[tokio::test]
async fn unsuccessful_envelope_becomes_remote_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("indexes/missing").as_str())
        .with_status(200)
        .with_body(
            json!({
                "success": false,
                "errors": [{"code": 1003, "message": "index not found"}],
                "messages": []
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client()
        .get_index(&config_for(&server), "missing")
        .await
        .unwrap_err();

    match &err {
        VectorizeError::RemoteApi { message, errors, .. } => {
            assert!(message.contains("index not found"));
            assert_eq!(errors[0].code, 1003);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("indexes/missing"));
    assert!(!err.to_string().contains(TOKEN));
}

#[tokio::test]
async fn query_by_id_sends_id_as_vector() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("indexes/docs-1/query").as_str())
        .match_body(Matcher::Json(json!({
            "vector": "v1",
            "topK": 5,
            "returnValues": false,
            "returnMetadata": "none"
        })))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "result": {"count": 1, "matches": [{"id": "v2", "score": 0.93}]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = QueryByIdRequest {
        id: "v1".to_string(),
        top_k: 5,
        return_values: false,
        return_metadata: ReturnMetadata::None,
        filter: None,
        namespace: None,
    };
    let result = client()
        .query_vector_by_id(&config_for(&server), "docs-1", request)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.count, 1);
    assert_eq!(result.matches[0].id, "v2");
}

#[tokio::test]
async fn query_sends_filter_and_namespace() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("indexes/docs-1/query").as_str())
        .match_body(Matcher::PartialJson(json!({
            "vector": [0.5, 0.25, 1.0],
            "topK": 3,
            "returnMetadata": "all",
            "filter": {"genre": "jazz"},
            "namespace": "tenant-a"
        })))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"count":0,"matches":[]}}"#)
        .create_async()
        .await;

    let mut filter = serde_json::Map::new();
    filter.insert("genre".to_string(), json!("jazz"));
    let request = QueryRequest::new(vec![0.5, 0.25, 1.0])
        .top_k(3)
        .return_metadata(ReturnMetadata::All)
        .filter(filter)
        .namespace("tenant-a");

    let result = client()
        .query_vectors(&config_for(&server), "docs-1", &request, Some(3))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(result.matches.is_empty());
}

#[tokio::test]
async fn empty_id_list_never_reaches_network() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client()
        .delete_vectors_by_ids(&config_for(&server), "docs-1", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, VectorizeError::InvalidArgument(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn delete_by_ids_posts_id_list() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("indexes/docs-1/delete_by_ids").as_str())
        .match_body(Matcher::Json(json!({"ids": ["v1", "v2"]})))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-9"}}"#)
        .create_async()
        .await;

    let ids = vec!["v1".to_string(), "v2".to_string()];
    let result = client()
        .delete_vectors_by_ids(&config_for(&server), "docs-1", &ids)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.mutation_id, "m-9");
}

#[tokio::test]
async fn http_error_statuses_are_classified() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("indexes/docs-1/info").as_str())
        .with_status(404)
        .with_body(
            r#"{"success":false,"errors":[{"code":3000,"message":"vectorize.index.not_found"}]}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", path("indexes").as_str())
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let config = config_for(&server);
    let client = client();

    let err = client.index_info(&config, "docs-1").await.unwrap_err();
    assert!(matches!(err, VectorizeError::RemoteApi { status: Some(404), .. }));
    assert!(err.to_string().contains("vectorize.index.not_found"));

    let err = client.list_indexes(&config).await.unwrap_err();
    assert!(matches!(err, VectorizeError::Transport { status: Some(503), .. }));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let config = ConnectionConfig::new(ACCOUNT, TOKEN).with_endpoint("http://127.0.0.1:1");
    let err = client().list_indexes(&config).await.unwrap_err();

    match &err {
        VectorizeError::Transport { status, source, .. } => {
            assert!(status.is_none());
            assert!(source.is_some());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!format!("{:?}", err).contains(TOKEN));
}

#[tokio::test]
async fn batched_upsert_sends_chunks_in_order() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", path("indexes/docs-1/upsert").as_str())
        .match_body(Matcher::PartialJson(json!({"vectors": [{"id": "a"}, {"id": "b"}]})))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-1"}}"#)
        .create_async()
        .await;
    let second = server
        .mock("POST", path("indexes/docs-1/upsert").as_str())
        .match_body(Matcher::PartialJson(json!({"vectors": [{"id": "c"}]})))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-2"}}"#)
        .create_async()
        .await;

    let vectors = vec![
        Vector::new("a", vec![1.0, 0.0]),
        Vector::new("b", vec![0.0, 1.0]),
        Vector::new("c", vec![1.0, 1.0]),
    ];
    let results = client()
        .upsert_vectors_batched(&config_for(&server), "docs-1", &vectors, Some(2), 2)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let ids: Vec<&str> = results.iter().map(|r| r.mutation_id.as_str()).collect();
    assert_eq!(ids, vec!["m-1", "m-2"]);
}

#[tokio::test]
async fn metadata_index_lifecycle() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", path("indexes/docs-1/metadata_index/create").as_str())
        .match_body(Matcher::Json(json!({"propertyName": "genre", "indexType": "string"})))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-3"}}"#)
        .create_async()
        .await;
    let list = server
        .mock("GET", path("indexes/docs-1/metadata_index/list").as_str())
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "result": {"metadataIndexes": [{"propertyName": "genre", "indexType": "string"}]}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let delete = server
        .mock("POST", path("indexes/docs-1/metadata_index/delete").as_str())
        .match_body(Matcher::Json(json!({"propertyName": "genre"})))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-4"}}"#)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = client();
    let spec = MetadataIndexSpec::new("genre", MetadataIndexType::String);

    let created = client.create_metadata_index(&config, "docs-1", &spec).await.unwrap();
    assert_eq!(created.mutation_id, "m-3");
    assert_eq!(
        client.list_metadata_indexes(&config, "docs-1").await.unwrap().metadata_indexes,
        vec![spec.clone()]
    );
    let deleted = client.delete_metadata_index(&config, "docs-1", "genre").await.unwrap();
    assert_eq!(deleted.mutation_id, "m-4");

    create.assert_async().await;
    list.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn list_vectors_passes_cursor_and_limit() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path("indexes/docs-1/list").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("cursor".into(), "next-page".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "result": {
                    "count": 2,
                    "isTruncated": true,
                    "nextCursor": "p3",
                    "vectors": [{"id": "a"}, {"id": "b"}]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let options = ListVectorsOptions {
        cursor: Some("next-page".to_string()),
        limit: Some(2),
    };
    let listing = client()
        .list_vectors(&config_for(&server), "docs-1", &options)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(listing.is_truncated);
    assert_eq!(listing.next_cursor.as_deref(), Some("p3"));
    assert_eq!(listing.vectors.len(), 2);
}

#[tokio::test]
async fn delete_index_accepts_null_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", path("indexes/docs-1").as_str())
        .with_status(200)
        .with_body(r#"{"success":true,"result":null,"errors":[],"messages":[]}"#)
        .create_async()
        .await;

    client().delete_index(&config_for(&server), "docs-1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn invalid_names_and_config_fail_locally() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = client();

    let err = client.get_index(&config, "Bad_Name").await.unwrap_err();
    assert!(matches!(err, VectorizeError::InvalidArgument(ref m) if m.contains("Bad_Name")));

    let no_token = ConnectionConfig::new(ACCOUNT, "").with_endpoint(server.url());
    assert!(client.list_indexes(&no_token).await.unwrap_err().is_local());

    mock.assert_async().await;
}

#[tokio::test]
async fn delete_index_with_null_messages_still_reports_failure() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", path("indexes/docs-1").as_str())
        .with_status(200)
        .with_body(
            json!({
                "success": false,
                "result": null,
                "errors": [{"code": 3000, "message": "index not found"}],
                "messages": null
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client()
        .delete_index(&config_for(&server), "docs-1")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, VectorizeError::RemoteApi { status: Some(200), .. }));
    assert!(err.to_string().contains("index not found"));
}

#[tokio::test]
async fn get_by_ids_decodes_stored_vectors() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("indexes/docs-1/get_by_ids").as_str())
        .match_body(Matcher::Json(json!({"ids": ["v1", "v2"]})))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "result": [
                    {"id": "v1", "values": [0.5, 1.0], "metadata": {"genre": "jazz"}},
                    {"id": "v2", "values": [0.25, 0.0], "namespace": "tenant-a"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let ids = vec!["v1".to_string(), "v2".to_string()];
    let vectors = client()
        .get_vectors_by_ids(&config_for(&server), "docs-1", &ids)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0].id, "v1");
    assert_eq!(vectors[0].values, vec![0.5, 1.0]);
    assert_eq!(vectors[0].metadata.as_ref().unwrap()["genre"], json!("jazz"));
    assert_eq!(vectors[1].namespace.as_deref(), Some("tenant-a"));
    assert!(vectors[1].metadata.is_none());
}

#[tokio::test]
async fn upsert_posts_to_upsert_endpoint() {
    let mut server = Server::new_async().await;
    let upsert = server
        .mock("POST", path("indexes/docs-1/upsert").as_str())
        .match_body(Matcher::Json(json!({
            "vectors": [{"id": "v1", "values": [1.0, 0.0], "namespace": "tenant-a"}]
        })))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-7"}}"#)
        .create_async()
        .await;
    let insert = server
        .mock("POST", path("indexes/docs-1/insert").as_str())
        .expect(0)
        .create_async()
        .await;

    let vectors = [Vector::new("v1", vec![1.0, 0.0]).namespace("tenant-a")];
    let result = client()
        .upsert_vectors(&config_for(&server), "docs-1", &vectors, Some(2))
        .await
        .unwrap();

    upsert.assert_async().await;
    insert.assert_async().await;
    assert_eq!(result.mutation_id, "m-7");
}

#[tokio::test]
async fn batched_insert_stops_at_first_failed_chunk() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", path("indexes/docs-1/insert").as_str())
        .match_body(Matcher::PartialJson(json!({"vectors": [{"id": "a"}]})))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-1"}}"#)
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("POST", path("indexes/docs-1/insert").as_str())
        .match_body(Matcher::PartialJson(json!({"vectors": [{"id": "b"}]})))
        .with_status(500)
        .with_body(r#"{"success":false,"errors":[{"code":1000,"message":"write failed"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let third = server
        .mock("POST", path("indexes/docs-1/insert").as_str())
        .match_body(Matcher::PartialJson(json!({"vectors": [{"id": "c"}]})))
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"mutationId":"m-3"}}"#)
        .expect(0)
        .create_async()
        .await;

    let vectors = vec![
        Vector::new("a", vec![1.0, 0.0]),
        Vector::new("b", vec![0.0, 1.0]),
        Vector::new("c", vec![1.0, 1.0]),
    ];
    let err = client()
        .insert_vectors_batched(&config_for(&server), "docs-1", &vectors, Some(2), 1)
        .await
        .unwrap_err();

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;
    assert!(matches!(err, VectorizeError::RemoteApi { status: Some(500), .. }));
    assert!(err.to_string().contains("write failed"));
}

#[tokio::test]
async fn list_indexes_returns_every_description() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path("indexes").as_str())
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "errors": [],
                "messages": [],
                "result": [
                    index_body()["result"].clone(),
                    {
                        "name": "docs-2",
                        "description": "second",
                        "config": {"dimensions": 768, "metric": "euclidean"},
                        "created_on": "2024-05-02T10:00:00.000Z",
                        "modified_on": "2024-05-02T10:00:00.000Z"
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let indexes = client().list_indexes(&config_for(&server)).await.unwrap();

    mock.assert_async().await;
    let names: Vec<&str> = indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["docs-1", "docs-2"]);
    assert_eq!(indexes[1].config.dimensions, 768);
    assert_eq!(indexes[1].config.metric, Metric::Euclidean);
    assert_eq!(serde_json::to_value(&indexes[0]).unwrap(), index_body()["result"]);
}
