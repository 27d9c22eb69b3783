//! # POST /generate-upload-url
//!
//! ストレージへの直接アップロード用署名付きURL発行。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use media_upload_types::{UploadUrlRequest, UploadUrlResponse};

use crate::authorization::authorize_upload;
use crate::config::GatewayState;
use crate::error::GatewayError;

/// POST /generate-upload-url — 署名付きURL発行。
///
/// `fileType` の欠落や壊れたJSONは400、ポリシー違反も400、
/// 署名の失敗は500として返す。
pub async fn handle_generate_upload_url(
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<UploadUrlRequest>, JsonRejection>,
) -> Result<Json<UploadUrlResponse>, GatewayError> {
    let Json(body) = body.map_err(|e| GatewayError::BadRequest(e.body_text()))?;

    let file_type = body
        .file_type
        .filter(|t| !t.is_empty())
        .ok_or(GatewayError::MissingFileType)?;

    let authorization =
        authorize_upload(state.signer.as_ref(), &file_type, state.presign_expiry_secs).await?;

    tracing::info!(
        file_name = %authorization.file_name,
        content_type = %file_type,
        original_name = body.file_name.as_deref().unwrap_or("-"),
        expires_at = authorization.expires_at,
        "署名付きアップロードURLを発行"
    );

    Ok(Json(authorization))
}
