//! # ファイル選択と事前検証
//!
//! 認可リクエストを無駄にしないため、ネットワーク呼び出しの前に
//! MIMEタイプとサイズを検証する。あくまで利用者向けの事前チェックであり、
//! 受付可否の最終判断はGatewayが行う。

use std::path::Path;

use bytes::Bytes;
use media_upload_types::is_accepted_media_type;

use crate::error::SelectionError;

/// アップロード可能なファイルサイズの既定上限（MiB）
pub const MAX_FILE_SIZE_MB: u64 = 10;

/// 内容の判別できないファイルに付与するMIMEタイプ
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 利用者が選択したファイル。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// 元のファイル名
    pub name: String,
    /// 宣言されたMIMEタイプ（転送時のContent-Typeにそのまま使う）
    pub content_type: String,
    /// ファイル本体
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// ファイルサイズ（バイト）
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// ファイルを読み込む。
    ///
    /// `content_type` が `None` の場合は拡張子から推定し、
    /// 推定できなければ `application/octet-stream` とする。
    pub async fn from_path(
        path: impl AsRef<Path>,
        content_type: Option<String>,
    ) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type.unwrap_or_else(|| {
            guess_content_type(path)
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string()
        });
        Ok(Self::new(name, content_type, data))
    }
}

/// 選択されたファイルを検証する（MIMEタイプ → サイズの順）。
pub fn validate_selection(file: &SelectedFile, max_mb: u64) -> Result<(), SelectionError> {
    if !is_accepted_media_type(&file.content_type) {
        return Err(SelectionError::UnsupportedType);
    }
    if file.size() > max_mb.saturating_mul(1024 * 1024) {
        return Err(SelectionError::TooLarge { max_mb });
    }
    Ok(())
}

/// よく使われるメディアファイルの拡張子からMIMEタイプを推定する。
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(content_type)
}
