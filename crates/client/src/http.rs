//! # HTTPアダプタ
//!
//! - [`GatewayClient`]: `POST /generate-upload-url` で署名付きURLを取得
//! - [`HttpTransfer`]: 署名付きURLへのストリーミングPUT（進捗通知付き）

use bytes::Bytes;
use media_upload_types::{UploadUrlRequest, UploadUrlResponse};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::handshake::{ObjectTransfer, TransferProgress, UploadAuthorizer};
use crate::selection::SelectedFile;

/// 進捗通知の粒度（バイト）
const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Gatewayクライアント。
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// `base_url` は `http://localhost:3000` のようなGatewayのオリジン。
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/generate-upload-url", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl UploadAuthorizer for GatewayClient {
    async fn request_upload_url(
        &self,
        file: &SelectedFile,
    ) -> Result<UploadUrlResponse, ClientError> {
        let request = UploadUrlRequest {
            file_type: Some(file.content_type.clone()),
            file_name: Some(file.name.clone()),
        };

        let resp = self
            .http
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Authorization(format!("Gatewayへの接続に失敗: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Authorization(format!("HTTP {status}: {body}")));
        }

        resp.json::<UploadUrlResponse>()
            .await
            .map_err(|e| ClientError::Authorization(format!("レスポンスのパースに失敗: {e}")))
    }
}

/// 署名付きURLへのPUT転送。
pub struct HttpTransfer {
    http: reqwest::Client,
    chunk_size: usize,
}

impl Default for HttpTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransfer {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// 進捗通知の粒度を変更する（0は1として扱う）。
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// 本体をチャンクに分割する（コピーなし）。
fn split_chunks(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect()
}

#[async_trait::async_trait]
impl ObjectTransfer for HttpTransfer {
    async fn put_object(
        &self,
        signed_url: &str,
        content_type: &str,
        data: Bytes,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<(), ClientError> {
        let total = data.len() as u64;
        let _ = progress.send(TransferProgress { sent: 0, total });

        // チャンクがHTTPボディとして読み出されるたびに進捗を通知する
        let mut sent = 0u64;
        let chunks = split_chunks(&data, self.chunk_size);
        let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            let _ = progress.send(TransferProgress { sent, total });
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        // S3の署名付きPUTはチャンク転送を受け付けないためContent-Lengthを明示する
        let resp = self
            .http
            .put(signed_url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| ClientError::Transfer(format!("ストレージへの接続に失敗: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Transfer(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}
