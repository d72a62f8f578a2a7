//! HTTP surfaces of the storage node.
//!
//! - API (`/api/v0/*`): uploads and node identity
//! - Gateway (`/ipfs/{cid}`): read-only content retrieval

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::storage::blocks::BlockStore;

#[derive(Debug, Clone)]
pub struct NodeState {
    pub blocks: BlockStore,
    pub node_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AddQuery {
    pub path: Option<String>,
}

/// Response of `POST /api/v0/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddResponse {
    pub hash: String,
    pub name: String,
    pub size: u64,
}

/// Response of `GET /api/v0/id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdResponse {
    #[serde(rename = "ID")]
    pub id: String,
    pub peers: Vec<String>,
}

pub fn api_router(state: NodeState) -> Router {
    Router::new()
        .route("/api/v0/add", post(add))
        .route("/api/v0/id", get(id))
        .with_state(state)
}

pub fn gateway_router(state: NodeState) -> Router {
    Router::new()
        .route("/ipfs/{cid}", get(cat))
        .with_state(state)
}

async fn add(State(state): State<NodeState>, Query(query): Query<AddQuery>, body: Bytes) -> Response {
    match state.blocks.put(&body).await {
        Ok(hash) => {
            let name = query.path.unwrap_or_else(|| hash.clone());
            tracing::debug!(cid = %hash, name = %name, size = body.len(), "Block added");
            Json(AddResponse {
                hash,
                name,
                size: body.len() as u64,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store block");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn id(State(state): State<NodeState>) -> Json<IdResponse> {
    Json(IdResponse {
        id: state.node_id.clone(),
        peers: Vec::new(),
    })
}

async fn cat(State(state): State<NodeState>, Path(cid): Path<String>) -> Response {
    match state.blocks.get(&cid).await {
        Ok(Some(bytes)) => bytes.into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, format!("{} not found", cid)).into_response(),
        Err(e) => {
            tracing::error!(cid = %cid, error = %e, "Failed to read block");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn node(dir: &std::path::Path) -> NodeState {
        NodeState {
            blocks: BlockStore::open(dir).await.unwrap(),
            node_id: "test-node".to_string(),
        }
    }

    #[tokio::test]
    async fn add_then_fetch_through_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let state = node(dir.path()).await;

        let response = api_router(state.clone())
            .oneshot(
                Request::post("/api/v0/add?path=images/a.png")
                    .body(Body::from("png bytes"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let added: AddResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(added.name, "images/a.png");
        assert_eq!(added.size, 9);

        let response = gateway_router(state)
            .oneshot(
                Request::get(format!("/ipfs/{}", added.hash))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"png bytes");
    }

    #[tokio::test]
    async fn unknown_cid_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = gateway_router(node(dir.path()).await)
            .oneshot(Request::get("/ipfs/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn id_reports_no_peers() {
        let dir = tempfile::tempdir().unwrap();
        let response = api_router(node(dir.path()).await)
            .oneshot(Request::get("/api/v0/id").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ID"], "test-node");
        assert_eq!(body["Peers"], serde_json::json!([]));
    }
}
