//! # Gatewayエンドポイント

pub mod upload_url;

pub use upload_url::handle_generate_upload_url;
