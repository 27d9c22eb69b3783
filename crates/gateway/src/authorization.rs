//! # アップロード認可
//!
//! 宣言されたMIMEタイプを、1オブジェクト分の期限付き書き込み許可と
//! アップロード後の公開URLに変換する。
//!
//! ストレージにはまだ何も作成しない。作成されるのは「許可」のみ。

use media_upload_types::{is_accepted_media_type, media_extension, UploadUrlResponse};

use crate::error::GatewayError;
use crate::storage::UploadSigner;

/// 拡張子から一意なオブジェクトキー `{uuid}.{extension}` を生成する。
pub fn generate_object_key(extension: &str) -> String {
    format!("{}.{extension}", uuid::Uuid::new_v4())
}

/// MIMEタイプを検証し、署名付きアップロードURLを発行する。
///
/// ポリシー違反の場合は署名を行わずに `InvalidContentType` を返す。
/// 署名に失敗した場合は `Storage` を返す（5xx扱い）。
pub async fn authorize_upload(
    signer: &dyn UploadSigner,
    content_type: &str,
    expiry_secs: u32,
) -> Result<UploadUrlResponse, GatewayError> {
    if !is_accepted_media_type(content_type) {
        return Err(GatewayError::InvalidContentType(content_type.to_string()));
    }
    let extension = media_extension(content_type)
        .ok_or_else(|| GatewayError::InvalidContentType(content_type.to_string()))?;

    let file_name = generate_object_key(extension);

    let signed = signer
        .presign_upload(&file_name, content_type, expiry_secs)
        .await?;

    Ok(UploadUrlResponse {
        signed_url: signed.url,
        public_url: signer.public_url(&file_name),
        file_name,
        expires_at: signed.expires_at,
    })
}
