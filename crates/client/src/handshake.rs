//! # 認可→転送の二段階アップロード
//!
//! 1. Gatewayへ宣言MIMEタイプを送り、署名付きURLを受け取る
//! 2. 署名付きURLへファイル本体を直接PUTする（Gatewayを経由しない）
//!
//! 2は1の結果なしには始められないため、両者は厳密に逐次実行する。
//! 自動リトライもキャンセルも行わない。

use bytes::Bytes;
use media_upload_types::UploadUrlResponse;
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::selection::SelectedFile;
use crate::session::{UploadEvent, UploadPhase, UploadSession};

/// 転送済みバイト数の通知。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub sent: u64,
    pub total: u64,
}

/// 署名付きURLの発行元（通常はGateway）。
#[async_trait::async_trait]
pub trait UploadAuthorizer: Send + Sync {
    /// ファイルの宣言MIMEタイプに対する署名付きURLを要求する。
    async fn request_upload_url(&self, file: &SelectedFile)
        -> Result<UploadUrlResponse, ClientError>;
}

/// 署名付きURLへの直接転送。
#[async_trait::async_trait]
pub trait ObjectTransfer: Send + Sync {
    /// `signed_url` へ `data` をPUTする。
    /// `Content-Type` は認可時に宣言したものと完全に一致させること。
    /// 進捗は `progress` へ送る（受信側が閉じていても転送は続ける）。
    async fn put_object(
        &self,
        signed_url: &str,
        content_type: &str,
        data: Bytes,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<(), ClientError>;
}

/// アップロードを1回試行し、終了時のセッションを返す。
///
/// `observer` は状態が変わるたびに呼ばれる（進捗は値が変わった時のみ）。
/// 失敗の詳細はログに出し、セッションには汎用メッセージのみ残す。
pub async fn run_upload<A, T, F>(
    session: UploadSession,
    authorizer: &A,
    transfer: &T,
    mut observer: F,
) -> UploadSession
where
    A: UploadAuthorizer + ?Sized,
    T: ObjectTransfer + ?Sized,
    F: FnMut(&UploadSession),
{
    let mut session = session.apply(UploadEvent::UploadRequested);
    observer(&session);
    if session.phase() != UploadPhase::Requesting {
        return session;
    }
    let Some(file) = session.file().cloned() else {
        return session;
    };

    // Phase 1: 署名付きURLの取得
    let authorization = match authorizer.request_upload_url(&file).await {
        Ok(authorization) => authorization,
        Err(e) => {
            tracing::warn!(error = %e, file = %file.name, "署名付きURLの取得に失敗");
            session = session.apply(UploadEvent::AuthorizationFailed);
            observer(&session);
            return session;
        }
    };
    tracing::debug!(
        file_name = %authorization.file_name,
        expires_at = authorization.expires_at,
        "署名付きURLを取得"
    );
    let signed_url = authorization.signed_url.clone();
    session = session.apply(UploadEvent::Authorized(authorization));
    observer(&session);

    // Phase 2: ストレージへの直接転送
    session = session.apply(UploadEvent::TransferStarted);
    observer(&session);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let put = transfer.put_object(&signed_url, &file.content_type, file.data.clone(), tx);
    tokio::pin!(put);

    let result = loop {
        tokio::select! {
            biased;
            Some(progress) = rx.recv() => {
                session = apply_progress(session, progress, &mut observer);
            }
            result = &mut put => break result,
        }
    };
    while let Ok(progress) = rx.try_recv() {
        session = apply_progress(session, progress, &mut observer);
    }

    session = match result {
        Ok(()) => session.apply(UploadEvent::TransferSucceeded),
        Err(e) => {
            tracing::warn!(error = %e, file = %file.name, "ストレージへの転送に失敗");
            session.apply(UploadEvent::TransferFailed)
        }
    };
    observer(&session);
    session
}

fn apply_progress<F>(
    session: UploadSession,
    progress: TransferProgress,
    observer: &mut F,
) -> UploadSession
where
    F: FnMut(&UploadSession),
{
    let before = session.progress_percent();
    let session = session.apply(UploadEvent::TransferProgress {
        sent: progress.sent,
        total: progress.total,
    });
    if session.progress_percent() != before {
        observer(&session);
    }
    session
}
