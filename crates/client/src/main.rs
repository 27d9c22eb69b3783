//! # Media Upload CLI
//!
//! ```text
//! media-upload <FILE> [--gateway-url URL] [--content-type MIME] [--max-size-mb N]
//! ```
//!
//! Gatewayから署名付きURLを取得し、ファイルをストレージへ直接アップロードする。

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use media_upload_client::{
    run_upload, GatewayClient, HttpTransfer, Preview, SelectedFile, UploadEvent, UploadPhase,
    UploadSession, MAX_FILE_SIZE_MB,
};

#[derive(Parser)]
#[command(name = "media-upload", about = "画像・動画を署名付きURLでストレージへ直接アップロードする")]
struct Cli {
    /// アップロードするファイル
    file: PathBuf,

    /// GatewayのベースURL
    #[arg(long, env = "MEDIA_UPLOAD_GATEWAY_URL", default_value = "http://localhost:3000")]
    gateway_url: String,

    /// 宣言するMIMEタイプ（省略時は拡張子から推定）
    #[arg(long)]
    content_type: Option<String>,

    /// ファイルサイズの上限（MiB）
    #[arg(long, default_value_t = MAX_FILE_SIZE_MB)]
    max_size_mb: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file = SelectedFile::from_path(&cli.file, cli.content_type).await?;
    tracing::info!(
        file = %file.name,
        content_type = %file.content_type,
        size = file.size(),
        "ファイルを選択"
    );

    let session =
        UploadSession::new(cli.max_size_mb).apply(UploadEvent::FileSelected(Some(file)));
    if let Some(message) = session.error_message() {
        anyhow::bail!("{message}");
    }

    let authorizer = GatewayClient::new(cli.gateway_url);
    let transfer = HttpTransfer::new();

    let session = run_upload(session, &authorizer, &transfer, |s| {
        if s.phase() == UploadPhase::Transferring {
            eprint!("\rUploading... {:>3}%", s.progress_percent());
            let _ = std::io::stderr().flush();
        }
    })
    .await;
    eprintln!();

    match (session.phase(), session.preview()) {
        (UploadPhase::Completed, Some(Preview::Image(url))) => println!("Uploaded image: {url}"),
        (UploadPhase::Completed, Some(Preview::Video(url))) => println!("Uploaded video: {url}"),
        _ => anyhow::bail!(
            "{}",
            session
                .error_message()
                .unwrap_or(media_upload_client::UPLOAD_FAILED_MESSAGE)
        ),
    }

    Ok(())
}
