//! # アップロード署名ストレージ
//!
//! 署名付きアップロードURLを発行するストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod s3;

#[cfg(feature = "vendor-aws")]
pub use s3::S3UploadSigner;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::GatewayError;

/// 署名付きアップロードURLの生成結果。
#[derive(Debug, Clone)]
pub struct SignedUpload {
    /// クライアントがアップロードに使用するURL（PUT）
    pub url: String,
    /// URL有効期限（UNIXタイムスタンプ）
    pub expires_at: u64,
}

/// 署名付きアップロードURLを発行するストレージの抽象インターフェース。
///
/// 署名アルゴリズム自体はストレージのクライアントライブラリに委ねる。
/// 発行されたURLは `object_key` と `content_type` の組にのみ有効であること
/// （ストレージ側の署名検証で保証される）。
#[async_trait::async_trait]
pub trait UploadSigner: Send + Sync {
    /// `object_key` へ `content_type` のオブジェクトを1つPUTするための
    /// 署名付きURLを `expiry_secs` 秒の有効期限で生成する。
    async fn presign_upload(
        &self,
        object_key: &str,
        content_type: &str,
        expiry_secs: u32,
    ) -> Result<SignedUpload, GatewayError>;

    /// アップロード後にオブジェクトを取得できる公開URL。
    /// 設定とキーのみから決まる純粋関数であること。
    fn public_url(&self, object_key: &str) -> String;
}

/// ベースURLとオブジェクトキーから公開URLを組み立てる。
pub fn public_object_url(base_url: &str, object_key: &str) -> String {
    format!("{}/{object_key}", base_url.trim_end_matches('/'))
}

/// AWS S3の仮想ホスト形式の公開ベースURL。
pub fn aws_public_base_url(bucket: &str, region: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com")
}

/// 現在時刻から `expiry_secs` 秒後のUNIXタイムスタンプ。
pub fn expiry_timestamp(expiry_secs: u32) -> Result<u64, GatewayError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| GatewayError::Internal(format!("時刻取得失敗: {e}")))?
        .as_secs();
    Ok(now + u64::from(expiry_secs))
}
