//! # Media Upload Gateway
//!
//! クライアントがファイル本体をGatewayに送らずに、ストレージへ直接
//! アップロードするための署名付きURLを発行する。
//!
//! ## 役割
//! - MIMEタイプの受付ポリシー検証（image/* と video/*）
//! - 一意なオブジェクトキーの生成
//! - 期限付き（300秒）の署名付きPUT URLと公開URLの発行
//!
//! ## API エンドポイント
//! - `POST /generate-upload-url` — 署名付きURL発行

mod authorization;
mod config;
mod endpoints;
mod error;
mod storage;

use std::sync::Arc;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::GatewayState;
use crate::storage::UploadSigner;

/// 環境変数から署名付きURLの発行元（S3互換）を構築する。
#[cfg(feature = "vendor-aws")]
fn signer_from_env() -> anyhow::Result<Box<dyn UploadSigner>> {
    Ok(Box::new(storage::S3UploadSigner::from_env()?))
}

#[cfg(not(feature = "vendor-aws"))]
fn signer_from_env() -> anyhow::Result<Box<dyn UploadSigner>> {
    anyhow::bail!("署名付きURLの発行元がありません（vendor-aws フィーチャーを有効にしてビルドしてください）")
}

/// Gatewayのルーターを構築する。
fn build_router(state: Arc<GatewayState>) -> axum::Router {
    // ブラウザクライアントは別オリジンから呼び出す
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    axum::Router::new()
        .route(
            "/generate-upload-url",
            axum::routing::post(endpoints::handle_generate_upload_url),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .envは任意（本番では環境変数を直接与える）
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let state = Arc::new(GatewayState::new(signer_from_env()?));
    tracing::info!(
        presign_expiry_secs = state.presign_expiry_secs,
        "署名付きURLの有効期限を設定"
    );

    let app = build_router(state);

    let addr = config::listen_addr_from_env()?;
    tracing::info!("Gatewayを {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
