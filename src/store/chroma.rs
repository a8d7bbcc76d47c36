//! Chroma vector store client (v2 REST API).
//!
//! All collection-scoped endpoints live under
//! `{url}/api/v2/tenants/{tenant}/databases/{database}/collections`. Collections are
//! addressed by name for lookup and by id for data operations.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::{
    cosine_space_metadata, Collection, GetOptions, GetResult, Include, NearestQuery, QueryResult,
    Record, VectorStore,
};
use crate::config::StoreConfig;
use crate::error::{MemoryError, MemoryResult};

pub struct ChromaStore {
    http: reqwest::Client,
    base_url: String,
    tenant: String,
    database: String,
}

#[derive(Serialize)]
struct UpsertBody<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    documents: Vec<&'a str>,
    metadatas: Vec<&'a super::Metadata>,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query_embeddings: &'a [Vec<f32>],
    n_results: usize,
    include: &'a [Include],
}

#[derive(Serialize)]
struct GetBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    include: &'a [Include],
}

impl ChromaStore {
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build vector store HTTP client")?;
        tracing::info!(url = %config.url, tenant = %config.tenant, database = %config.database, "chroma client ready");
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
        })
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    fn collection_url(&self, collection: &Collection, action: &str) -> String {
        format!("{}/{}/{}", self.collections_url(), collection.id, action)
    }

    /// Send a request and decode a JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> MemoryResult<T> {
        let response = checked(request.send().await?, what).await?;
        response
            .json()
            .await
            .map_err(|e| MemoryError::downstream(format!("invalid vector store response for {what}: {e}")))
    }

    /// Send a request whose body is irrelevant.
    async fn send_unit(&self, request: RequestBuilder, what: &str) -> MemoryResult<()> {
        checked(request.send().await?, what).await?;
        Ok(())
    }
}

/// Map non-2xx responses onto the error taxonomy.
async fn checked(response: reqwest::Response, what: &str) -> MemoryResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND || body.contains("does not exist") {
        return Err(MemoryError::NotFound(format!("{what}: {}", error_message(&body))));
    }
    Err(MemoryError::downstream(format!(
        "vector store returned HTTP {status} for {what}: {}",
        error_message(&body)
    )))
}

/// Chroma error bodies look like `{"error": "NotFoundError", "message": "..."}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn heartbeat(&self) -> MemoryResult<()> {
        let url = format!("{}/api/v2/heartbeat", self.base_url);
        self.send_unit(self.http.get(url), "heartbeat").await
    }

    async fn get_or_create_collection(&self, name: &str) -> MemoryResult<Collection> {
        let body = json!({
            "name": name,
            "metadata": cosine_space_metadata(),
            "get_or_create": true,
        });
        self.send(self.http.post(self.collections_url()).json(&body), "create collection")
            .await
    }

    async fn get_collection(&self, name: &str) -> MemoryResult<Collection> {
        let url = format!("{}/{}", self.collections_url(), name);
        match self.send(self.http.get(url), "get collection").await {
            Err(MemoryError::NotFound(_)) => {
                Err(MemoryError::NotFound(format!("collection {name} does not exist")))
            }
            other => other,
        }
    }

    async fn list_collections(&self) -> MemoryResult<Vec<Collection>> {
        self.send(self.http.get(self.collections_url()), "list collections")
            .await
    }

    async fn upsert(&self, collection: &Collection, records: &[Record]) -> MemoryResult<()> {
        let body = UpsertBody {
            ids: records.iter().map(|r| r.id.as_str()).collect(),
            embeddings: records.iter().map(|r| r.embedding.as_slice()).collect(),
            documents: records.iter().map(|r| r.document.as_str()).collect(),
            metadatas: records.iter().map(|r| &r.metadata).collect(),
        };
        let url = self.collection_url(collection, "upsert");
        self.send_unit(self.http.post(url).json(&body), "upsert").await
    }

    async fn query(
        &self,
        collection: &Collection,
        query: &NearestQuery,
    ) -> MemoryResult<QueryResult> {
        let body = QueryBody {
            query_embeddings: &query.embeddings,
            n_results: query.n_results,
            include: &query.include,
        };
        let url = self.collection_url(collection, "query");
        self.send(self.http.post(url).json(&body), "query").await
    }

    async fn get(&self, collection: &Collection, options: &GetOptions) -> MemoryResult<GetResult> {
        let body = GetBody {
            limit: options.limit,
            offset: options.offset,
            include: &options.include,
        };
        let url = self.collection_url(collection, "get");
        self.send(self.http.post(url).json(&body), "get").await
    }

    async fn delete(&self, collection: &Collection, ids: &[String]) -> MemoryResult<()> {
        let url = self.collection_url(collection, "delete");
        self.send_unit(self.http.post(url).json(&json!({ "ids": ids })), "delete")
            .await
    }

    async fn count(&self, collection: &Collection) -> MemoryResult<usize> {
        let url = self.collection_url(collection, "count");
        self.send(self.http.get(url), "count").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COLLECTIONS: &str = "/api/v2/tenants/default_tenant/databases/default_database/collections";

    fn store_for(server: &MockServer) -> ChromaStore {
        ChromaStore::new(&StoreConfig {
            url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    fn collection() -> Collection {
        Collection {
            id: "c0ffee".into(),
            name: "memories".into(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn get_or_create_requests_cosine_space() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COLLECTIONS))
            .and(body_partial_json(json!({
                "name": "memories",
                "get_or_create": true,
                "metadata": {"hnsw:space": "cosine"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "c0ffee", "name": "memories", "metadata": {"hnsw:space": "cosine"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = store_for(&server).get_or_create_collection("memories").await.unwrap();
        assert_eq!(created.id, "c0ffee");
        assert_eq!(created.name, "memories");
    }

    #[tokio::test]
    async fn missing_collection_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{COLLECTIONS}/ghost")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "NotFoundError", "message": "Collection [ghost] does not exists"
            })))
            .mount(&server)
            .await;

        let err = store_for(&server).get_collection("ghost").await.unwrap_err();
        assert!(matches!(err, MemoryError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn query_sends_embeddings_and_parses_nested_lists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{COLLECTIONS}/c0ffee/query")))
            .and(body_partial_json(json!({
                "query_embeddings": [[1.0, 0.0]],
                "n_results": 2,
                "include": ["documents", "metadatas", "distances"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ids": [["a", "b"]],
                "documents": [["doc a", "doc b"]],
                "metadatas": [[{"source": "notes"}, {"source": "chat"}]],
                "distances": [[0.01, 0.3]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = store_for(&server)
            .query(
                &collection(),
                &NearestQuery {
                    embeddings: vec![vec![1.0, 0.0]],
                    n_results: 2,
                    include: vec![Include::Documents, Include::Metadatas, Include::Distances],
                },
            )
            .await
            .unwrap();
        assert_eq!(result.ids, vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(result.distance(0, 1), Some(0.3));
        assert_eq!(result.document(0, 0), Some("doc a"));
    }

    #[tokio::test]
    async fn get_passes_limit_and_include() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{COLLECTIONS}/c0ffee/get")))
            .and(body_partial_json(json!({"limit": 5, "include": ["embeddings"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ids": ["a"],
                "embeddings": [[0.5, 0.5]],
                "documents": null,
                "metadatas": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = store_for(&server)
            .get(
                &collection(),
                &GetOptions {
                    limit: Some(5),
                    offset: None,
                    include: vec![Include::Embeddings],
                },
            )
            .await
            .unwrap();
        assert_eq!(result.ids, vec!["a"]);
        assert_eq!(result.embeddings, Some(vec![vec![0.5, 0.5]]));
        assert!(result.documents.is_none());
    }

    #[tokio::test]
    async fn upsert_delete_and_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{COLLECTIONS}/c0ffee/upsert")))
            .and(body_partial_json(json!({"ids": ["id1"], "documents": ["hello"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{COLLECTIONS}/c0ffee/delete")))
            .and(body_partial_json(json!({"ids": ["id1"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{COLLECTIONS}/c0ffee/count")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(7)))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let record = Record {
            id: "id1".into(),
            document: "hello".into(),
            embedding: vec![1.0, 2.0],
            metadata: cosine_space_metadata(),
        };
        store.upsert(&collection(), &[record]).await.unwrap();
        store.delete(&collection(), &["id1".to_string()]).await.unwrap();
        assert_eq!(store.count(&collection()).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn server_error_is_downstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(COLLECTIONS))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let err = store_for(&server).list_collections().await.unwrap_err();
        assert!(matches!(err, MemoryError::Downstream(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn unreachable_store_is_downstream() {
        let store = ChromaStore::new(&StoreConfig {
            url: "http://127.0.0.1:1".into(),
            ..Default::default()
        })
        .unwrap();
        let err = store.heartbeat().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"error":"X","message":"Collection [a] does not exists"}"#),
            "Collection [a] does not exists"
        );
        assert_eq!(error_message("plain text"), "plain text");
    }
}
