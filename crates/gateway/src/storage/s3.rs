//! # S3互換 アップロード署名実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIで
//! 署名付きPUT URLを発行する。

use anyhow::Context;
use http_s3::header::CONTENT_TYPE;
use http_s3::{HeaderMap, HeaderValue};

use super::{aws_public_base_url, expiry_timestamp, public_object_url, SignedUpload, UploadSigner};
use crate::error::GatewayError;

/// S3互換ストレージによる署名付きURL発行。
pub struct S3UploadSigner {
    bucket: s3::Bucket,
    /// 公開URLのベース（`{base}/{object_key}` で公開URLになる）
    public_base_url: String,
}

impl S3UploadSigner {
    /// S3互換バケットと公開ベースURLから構築する。
    pub fn new(bucket: s3::Bucket, public_base_url: String) -> Self {
        Self {
            bucket,
            public_base_url,
        }
    }

    /// S3互換バケットを初期化する。
    ///
    /// `endpoint` が `None` の場合はAWS S3（仮想ホスト形式）、
    /// 指定された場合はそのエンドポイントをパス形式で使用する。
    fn init_bucket(
        endpoint: Option<&str>,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket_name: &str,
    ) -> anyhow::Result<s3::Bucket> {
        let region_config = s3::Region::Custom {
            region: region.to_string(),
            endpoint: endpoint
                .map(str::to_string)
                .unwrap_or_else(|| format!("https://s3.{region}.amazonaws.com")),
        };

        let credentials = s3::creds::Credentials::new(
            Some(access_key),
            Some(secret_key),
            None,
            None,
            None,
        )?;

        let bucket = s3::Bucket::new(bucket_name, region_config, credentials)?;
        let bucket = if endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(*bucket)
    }

    /// 環境変数から構築する。
    ///
    /// - `AWS_BUCKET_NAME`（必須）
    /// - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`（必須）
    /// - `AWS_REGION`（既定: us-east-1）
    /// - `S3_ENDPOINT`（任意、MinIO等）
    /// - `S3_PUBLIC_BASE_URL`（任意、公開URLのベースを上書き）
    pub fn from_env() -> anyhow::Result<Self> {
        let bucket_name =
            std::env::var("AWS_BUCKET_NAME").context("AWS_BUCKET_NAMEが未設定です")?;
        let access_key =
            std::env::var("AWS_ACCESS_KEY_ID").context("AWS_ACCESS_KEY_IDが未設定です")?;
        let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .context("AWS_SECRET_ACCESS_KEYが未設定です")?;
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let endpoint = std::env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty());

        let bucket = Self::init_bucket(
            endpoint.as_deref(),
            &region,
            &access_key,
            &secret_key,
            &bucket_name,
        )?;

        let public_base_url = match std::env::var("S3_PUBLIC_BASE_URL") {
            Ok(base) if !base.is_empty() => base,
            _ => match endpoint.as_deref() {
                // パス形式のエンドポイントではバケット名をパスに含める
                Some(ep) => format!("{}/{bucket_name}", ep.trim_end_matches('/')),
                None => aws_public_base_url(&bucket_name, &region),
            },
        };

        tracing::info!(
            bucket = %bucket_name,
            region = %region,
            public_base_url = %public_base_url,
            "S3署名設定を読み込みました"
        );

        Ok(Self::new(bucket, public_base_url))
    }
}

#[async_trait::async_trait]
impl UploadSigner for S3UploadSigner {
    /// Content-Typeを署名対象ヘッダーに含めた署名付きPUT URLを生成する。
    async fn presign_upload(
        &self,
        object_key: &str,
        content_type: &str,
        expiry_secs: u32,
    ) -> Result<SignedUpload, GatewayError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(content_type)
            .map_err(|e| GatewayError::InvalidContentType(format!("{content_type} ({e})")))?;
        headers.insert(CONTENT_TYPE, value);

        let url = self
            .bucket
            .presign_put(object_key, expiry_secs, Some(headers), None)
            .await
            .map_err(|e| GatewayError::Storage(format!("署名付きアップロードURL生成失敗: {e}")))?;

        Ok(SignedUpload {
            url,
            expires_at: expiry_timestamp(expiry_secs)?,
        })
    }

    fn public_url(&self, object_key: &str) -> String {
        public_object_url(&self.public_base_url, object_key)
    }
}
