//! # Media Upload クライアント
//!
//! ファイルを選択・検証し、Gatewayから署名付きURLを取得して
//! ストレージへ直接アップロードする。
//!
//! ## 構成
//! - [`selection`]: ネットワーク呼び出し前の事前検証
//! - [`session`]: アップロード試行の有限状態機械（純粋な遷移関数）
//! - [`handshake`]: 認可→転送の二段階手順
//! - [`http`]: Gateway / ストレージへのHTTPアダプタ

pub mod error;
pub mod handshake;
pub mod http;
pub mod selection;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use error::{ClientError, SelectionError, UPLOAD_FAILED_MESSAGE};
pub use handshake::{run_upload, ObjectTransfer, TransferProgress, UploadAuthorizer};
pub use http::{GatewayClient, HttpTransfer};
pub use selection::{validate_selection, SelectedFile, MAX_FILE_SIZE_MB};
pub use session::{Preview, UploadEvent, UploadPhase, UploadSession};
