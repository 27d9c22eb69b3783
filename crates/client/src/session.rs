//! # アップロードセッション
//!
//! 1回のアップロード試行の状態を表す有限状態機械。
//!
//! ```text
//! Idle → Requesting → Authorized → Transferring → {Completed | Failed}
//! ```
//!
//! 全ての遷移は `(状態, イベント) → 新しい状態` の純粋関数
//! [`UploadSession::apply`] で表す。現在の状態で受け付けないイベントは無視する。

use media_upload_types::{MediaKind, UploadUrlResponse};

use crate::error::{SelectionError, UPLOAD_FAILED_MESSAGE};
use crate::selection::{validate_selection, SelectedFile, MAX_FILE_SIZE_MB};

/// アップロード試行のフェーズ。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadPhase {
    /// 待機中（ファイル選択前後）
    #[default]
    Idle,
    /// Gatewayへ署名付きURLを要求中
    Requesting,
    /// 署名付きURL取得済み
    Authorized,
    /// ストレージへ転送中
    Transferring,
    /// 転送成功（終端）
    Completed,
    /// 認可または転送に失敗（終端）
    Failed,
}

/// セッションに適用するイベント。
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// ファイル選択が変更された（`None` は選択のキャンセル）
    FileSelected(Option<SelectedFile>),
    /// 利用者がアップロードを開始した
    UploadRequested,
    /// Gatewayが署名付きURLを発行した
    Authorized(UploadUrlResponse),
    /// Gatewayへの要求が失敗した
    AuthorizationFailed,
    /// ストレージへのPUTを開始した
    TransferStarted,
    /// 転送済みバイト数の更新
    TransferProgress { sent: u64, total: u64 },
    /// ストレージが成功応答を返した
    TransferSucceeded,
    /// 転送が失敗した
    TransferFailed,
}

/// 完了後のプレビュー表示。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Image(String),
    Video(String),
}

/// クライアント側のアップロードセッション。
#[derive(Debug, Clone)]
pub struct UploadSession {
    max_file_size_mb: u64,
    file: Option<SelectedFile>,
    phase: UploadPhase,
    authorization: Option<UploadUrlResponse>,
    preview_url: Option<String>,
    progress_percent: u8,
    error_message: Option<String>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE_MB)
    }
}

/// `round(sent * 100 / total)` を整数演算で求める。
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = sent.min(total) as u128;
    let total = total as u128;
    ((sent * 200 + total) / (total * 2)) as u8
}

impl UploadSession {
    /// サイズ上限（MiB）を指定して空のセッションを作る。
    pub fn new(max_file_size_mb: u64) -> Self {
        Self {
            max_file_size_mb,
            file: None,
            phase: UploadPhase::Idle,
            authorization: None,
            preview_url: None,
            progress_percent: 0,
            error_message: None,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn authorization(&self) -> Option<&UploadUrlResponse> {
        self.authorization.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_mb
    }

    /// 認可要求から転送完了までの間か
    pub fn is_uploading(&self) -> bool {
        matches!(
            self.phase,
            UploadPhase::Requesting | UploadPhase::Authorized | UploadPhase::Transferring
        )
    }

    pub fn is_complete(&self) -> bool {
        self.phase == UploadPhase::Completed
    }

    /// 完了したアップロードのプレビュー。
    /// 画像か動画かは宣言されたMIMEタイプで決める。
    pub fn preview(&self) -> Option<Preview> {
        let url = self.preview_url.clone()?;
        let file = self.file.as_ref()?;
        match MediaKind::from_content_type(&file.content_type)? {
            MediaKind::Image => Some(Preview::Image(url)),
            MediaKind::Video => Some(Preview::Video(url)),
        }
    }

    /// イベントを適用して次の状態を返す。
    pub fn apply(self, event: UploadEvent) -> Self {
        match event {
            UploadEvent::FileSelected(file) => self.select(file),
            UploadEvent::UploadRequested => self.request_upload(),
            UploadEvent::Authorized(authorization) if self.phase == UploadPhase::Requesting => {
                Self {
                    phase: UploadPhase::Authorized,
                    authorization: Some(authorization),
                    ..self
                }
            }
            UploadEvent::AuthorizationFailed if self.phase == UploadPhase::Requesting => {
                self.fail()
            }
            UploadEvent::TransferStarted if self.phase == UploadPhase::Authorized => Self {
                phase: UploadPhase::Transferring,
                ..self
            },
            UploadEvent::TransferProgress { sent, total }
                if self.phase == UploadPhase::Transferring =>
            {
                // 単調非減少
                let percent = progress_percent(sent, total).max(self.progress_percent);
                Self {
                    progress_percent: percent,
                    ..self
                }
            }
            UploadEvent::TransferSucceeded if self.phase == UploadPhase::Transferring => {
                let preview_url = self.authorization.as_ref().map(|a| a.public_url.clone());
                Self {
                    phase: UploadPhase::Completed,
                    progress_percent: 100,
                    preview_url,
                    ..self
                }
            }
            UploadEvent::TransferFailed
                if matches!(self.phase, UploadPhase::Authorized | UploadPhase::Transferring) =>
            {
                self.fail()
            }
            _ => self,
        }
    }

    /// ファイル選択: 進捗・エラー・完了・プレビューを全てリセットしてから検証する。
    fn select(self, file: Option<SelectedFile>) -> Self {
        let reset = Self::new(self.max_file_size_mb);
        let Some(file) = file else {
            return reset;
        };
        match validate_selection(&file, self.max_file_size_mb) {
            Ok(()) => Self {
                file: Some(file),
                ..reset
            },
            Err(e) => Self {
                error_message: Some(e.to_string()),
                ..reset
            },
        }
    }

    /// アップロード開始。待機中か失敗後のみ受け付ける。
    fn request_upload(self) -> Self {
        if !matches!(self.phase, UploadPhase::Idle | UploadPhase::Failed) {
            return self;
        }
        if self.file.is_none() {
            return Self {
                phase: UploadPhase::Idle,
                error_message: Some(SelectionError::NoFileSelected.to_string()),
                ..self
            };
        }
        Self {
            phase: UploadPhase::Requesting,
            authorization: None,
            preview_url: None,
            progress_percent: 0,
            error_message: None,
            ..self
        }
    }

    fn fail(self) -> Self {
        Self {
            phase: UploadPhase::Failed,
            preview_url: None,
            error_message: Some(UPLOAD_FAILED_MESSAGE.to_string()),
            ..self
        }
    }
}
