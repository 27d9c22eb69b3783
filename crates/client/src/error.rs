//! # クライアント エラー型
//!
//! ネットワークに到達する前の選択エラーと、認可・転送フェーズのエラーを区別する。
//! 利用者に見せるメッセージは汎用的なものに留め、詳細はログに出す。

/// 認可・転送いずれかに失敗した場合に利用者へ表示するメッセージ
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";

/// ファイル選択時・アップロード開始時の事前検証エラー。
/// ネットワーク呼び出しは一切行われない。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// ファイル未選択でアップロードを開始しようとした
    #[error("Please select a file.")]
    NoFileSelected,
    /// image/* または video/* 以外
    #[error("Only image and video files are allowed.")]
    UnsupportedType,
    /// サイズ上限超過
    #[error("File must be less than {max_mb}MB.")]
    TooLarge { max_mb: u64 },
}

/// アップロード手順中のエラー。
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Gatewayからの署名付きURL取得に失敗
    #[error("署名付きURLの取得に失敗: {0}")]
    Authorization(String),
    /// ストレージへの直接転送に失敗
    #[error("ストレージへの転送に失敗: {0}")]
    Transfer(String),
}
