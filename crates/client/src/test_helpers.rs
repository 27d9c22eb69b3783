//! # テスト用モックサーバー
//!
//! Gatewayとストレージの代わりにローカルで起動するaxumサーバー群。
//! モックストレージは署名付きURLのクエリ `sig` と `ct` を検証し、
//! 期限切れ署名やContent-Typeの不一致を403で拒否する。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use bytes::Bytes;
use media_upload_types::{is_accepted_media_type, media_extension, UploadUrlRequest, UploadUrlResponse};

/// モックストレージに保存されたオブジェクト
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub body: Bytes,
}

/// 起動済みモックストレージへのハンドル
#[derive(Clone)]
pub struct MockStorage {
    pub base_url: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl MockStorage {
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}

/// テスト用モックストレージを起動する。`PUT /{key}` を受け付ける。
pub async fn start_mock_storage() -> MockStorage {
    let objects: Arc<Mutex<HashMap<String, StoredObject>>> = Arc::default();

    let app = axum::Router::new()
        .route(
            "/{key}",
            axum::routing::put(
                |State(objects): State<Arc<Mutex<HashMap<String, StoredObject>>>>,
                 Path(key): Path<String>,
                 Query(query): Query<HashMap<String, String>>,
                 headers: HeaderMap,
                 body: Bytes| async move {
                    if query.get("sig").map(String::as_str) == Some("expired") {
                        return StatusCode::FORBIDDEN;
                    }
                    let content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    if let Some(signed_type) = query.get("ct") {
                        if signed_type != &content_type {
                            return StatusCode::FORBIDDEN;
                        }
                    }
                    objects
                        .lock()
                        .unwrap()
                        .insert(key, StoredObject { content_type, body });
                    StatusCode::OK
                },
            ),
        )
        .with_state(objects.clone());

    let base_url = serve(app).await;
    MockStorage { base_url, objects }
}

/// テスト用モックGatewayを起動する。
/// 発行する署名付きURLは `storage_base_url` のモックストレージを指す。
pub async fn start_mock_gateway(storage_base_url: &str) -> String {
    let storage = storage_base_url.to_string();
    let counter = Arc::new(AtomicUsize::new(0));

    let app = axum::Router::new().route(
        "/generate-upload-url",
        axum::routing::post(move |Json(body): Json<UploadUrlRequest>| {
            let storage = storage.clone();
            let counter = counter.clone();
            async move {
                let Some(file_type) = body.file_type.filter(|t| is_accepted_media_type(t)) else {
                    return Err((StatusCode::BAD_REQUEST, "invalid fileType".to_string()));
                };
                let ext = media_extension(&file_type).unwrap_or_default();
                let file_name = format!("obj-{}.{ext}", counter.fetch_add(1, Ordering::SeqCst));
                let signed_url = reqwest::Url::parse_with_params(
                    &format!("{storage}/{file_name}"),
                    &[("sig", "ok"), ("ct", file_type.as_str())],
                )
                .unwrap()
                .to_string();
                Ok(Json(UploadUrlResponse {
                    signed_url,
                    public_url: format!("{storage}/{file_name}"),
                    file_name,
                    expires_at: 1_700_000_300,
                }))
            }
        }),
    );

    serve(app).await
}
