//! # Media Upload 共有型定義
//!
//! Gatewayとクライアントの間でやり取りするデータ構造と、
//! 両者が共有するアップロード可能なMIMEタイプのポリシーを提供する。
//!
//! ## ワイヤフォーマット
//! - JSONのフィールド名はcamelCase（ブラウザクライアントとの互換性のため）

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 受付ポリシー
// ---------------------------------------------------------------------------

/// アップロードを受け付けるMIMEタイプのプレフィックス。
/// 大文字小文字を区別する。
pub const ACCEPTED_TYPE_PREFIXES: [&str; 2] = [IMAGE_TYPE_PREFIX, VIDEO_TYPE_PREFIX];

/// 画像のMIMEタイプのプレフィックス
pub const IMAGE_TYPE_PREFIX: &str = "image/";

/// 動画のMIMEタイプのプレフィックス
pub const VIDEO_TYPE_PREFIX: &str = "video/";

/// 署名付きアップロードURLの有効期限（秒）
pub const UPLOAD_URL_EXPIRY_SECS: u32 = 300;

/// MIMEタイプが受付ポリシー（`image/*` または `video/*`）に合致するか判定する。
pub fn is_accepted_media_type(content_type: &str) -> bool {
    ACCEPTED_TYPE_PREFIXES
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
}

/// MIMEタイプから拡張子（最初の `/` と次の `/` の間）を取り出す。
///
/// 拡張子はオブジェクトキーの一部になるため、空のもの、
/// `[A-Za-z0-9+.-]` 以外の文字を含むもの、`.` のみのものは `None`。
pub fn media_extension(content_type: &str) -> Option<&str> {
    let (_, rest) = content_type.split_once('/')?;
    let ext = rest.split('/').next()?;
    let valid = !ext.is_empty()
        && !ext.chars().all(|c| c == '.')
        && ext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'));
    valid.then_some(ext)
}

/// プレビュー表示の種別。宣言されたMIMEタイプから決まる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// MIMEタイプから種別を判定する。受付ポリシー外なら `None`。
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with(IMAGE_TYPE_PREFIX) {
            Some(MediaKind::Image)
        } else if content_type.starts_with(VIDEO_TYPE_PREFIX) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// POST /generate-upload-url
// ---------------------------------------------------------------------------

/// /generate-upload-url リクエスト。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    /// アップロードするファイルのMIMEタイプ。
    /// 欠落はGateway側で400として扱うため `Option` で受ける。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// クライアント側の元ファイル名（ログ用、オブジェクトキーには使わない）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// /generate-upload-url レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// 署名付きアップロードURL（PUT）
    pub signed_url: String,
    /// 発行されたオブジェクトキー（`{uuid}.{extension}`）
    pub file_name: String,
    /// アップロード完了後に公開されるURL
    pub public_url: String,
    /// 署名付きURLの有効期限（UNIXタイムスタンプ）
    #[serde(default)]
    pub expires_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_media_types() {
        assert!(is_accepted_media_type("image/png"));
        assert!(is_accepted_media_type("video/mp4"));
        assert!(is_accepted_media_type("image/svg+xml"));

        assert!(!is_accepted_media_type(""));
        assert!(!is_accepted_media_type("application/pdf"));
        assert!(!is_accepted_media_type("Image/png"));
        assert!(!is_accepted_media_type("image"));
        assert!(!is_accepted_media_type("audio/mpeg"));
        assert!(!is_accepted_media_type(" image/png"));
    }

    #[test]
    fn test_media_extension() {
        assert_eq!(media_extension("image/png"), Some("png"));
        assert_eq!(media_extension("video/quicktime"), Some("quicktime"));
        assert_eq!(media_extension("image/svg+xml"), Some("svg+xml"));
        assert_eq!(media_extension("video/x-ms.wmv"), Some("x-ms.wmv"));
        // 2つ目の `/` 以降は捨てる
        assert_eq!(media_extension("image/a/b"), Some("a"));
        assert_eq!(media_extension("image/x/../../evil.html"), Some("x"));
        assert_eq!(media_extension("image"), None);
    }

    /// キーに使えない拡張子を拒否することを確認
    #[test]
    fn test_media_extension_rejects_unsafe() {
        assert_eq!(media_extension("image/"), None);
        assert_eq!(media_extension("image//evil"), None);
        assert_eq!(media_extension("image/.."), None);
        assert_eq!(media_extension("image/png?x=1"), None);
        assert_eq!(media_extension("image/png; charset=x"), None);
        assert_eq!(media_extension("image/p%2Fng"), None);
        assert_eq!(media_extension("image/p\\ng"), None);
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::from_content_type("image/jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_content_type("video/webm"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_content_type("text/plain"), None);
    }

    /// ワイヤフォーマットがcamelCaseであることを確認
    #[test]
    fn test_wire_format_camel_case() {
        let req: UploadUrlRequest =
            serde_json::from_str(r#"{"fileType":"image/png","fileName":"cat.png"}"#).unwrap();
        assert_eq!(req.file_type.as_deref(), Some("image/png"));
        assert_eq!(req.file_name.as_deref(), Some("cat.png"));

        let req: UploadUrlRequest = serde_json::from_str("{}").unwrap();
        assert!(req.file_type.is_none());

        let resp = UploadUrlResponse {
            signed_url: "https://s3/x?sig".to_string(),
            file_name: "x.png".to_string(),
            public_url: "https://s3/x.png".to_string(),
            expires_at: 42,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["signedUrl"], "https://s3/x?sig");
        assert_eq!(value["fileName"], "x.png");
        assert_eq!(value["publicUrl"], "https://s3/x.png");
        assert_eq!(value["expiresAt"], 42);
    }
}
