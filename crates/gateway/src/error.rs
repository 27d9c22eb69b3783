//! # Gateway エラー型
//!
//! 入力ポリシー違反（4xx）とストレージ署名の失敗（5xx）を区別する。

use axum::http::StatusCode;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 受付ポリシー（image/* または video/*）に合致しないMIMEタイプ
    #[error("許可されていないMIMEタイプです（image/* と video/* のみ）: {0:?}")]
    InvalidContentType(String),
    /// 署名付きURLの生成に失敗（認証情報・ネットワーク・プロバイダ障害）
    #[error("ストレージ操作に失敗: {0}")]
    Storage(String),
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),
    /// `fileType` が欠落または空
    #[error("fileType is required")]
    MissingFileType,
}

impl GatewayError {
    /// HTTPステータスコードへの対応付け。
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidContentType(_)
            | GatewayError::BadRequest(_)
            | GatewayError::MissingFileType => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Storage(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "リクエスト処理に失敗");
        }
        (status, self.to_string()).into_response()
    }
}
