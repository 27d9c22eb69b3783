//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。

use std::net::SocketAddr;

use anyhow::Context;
use media_upload_types::UPLOAD_URL_EXPIRY_SECS;

use crate::storage::UploadSigner;

/// 既定のリッスンポート
const DEFAULT_PORT: u16 = 3000;

/// Gatewayの共有状態。
/// 可変状態を持たないため、全ハンドラから並行に参照できる。
pub struct GatewayState {
    /// 署名付きURLの発行元（S3互換等、トレイトで抽象化）
    pub signer: Box<dyn UploadSigner>,
    /// 署名付きURLの有効期限（秒）
    pub presign_expiry_secs: u32,
}

impl GatewayState {
    pub fn new(signer: Box<dyn UploadSigner>) -> Self {
        Self {
            signer,
            presign_expiry_secs: UPLOAD_URL_EXPIRY_SECS,
        }
    }
}

/// `PORT` 環境変数からリッスンアドレスを決める（既定: 0.0.0.0:3000）。
pub fn listen_addr_from_env() -> anyhow::Result<SocketAddr> {
    let port = match std::env::var("PORT") {
        Ok(port) => port
            .parse::<u16>()
            .with_context(|| format!("PORTが不正です: {port}"))?,
        Err(_) => DEFAULT_PORT,
    };
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}
