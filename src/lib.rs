pub mod config;
pub mod notify;
pub mod rest;
pub mod retry;
pub mod sticker;
pub mod validate;

use std::sync::Arc;

use config::AppConfig;
use notify::WebhookClient;
use sticker::StickerPipeline;

/// Shared application state passed to every HTTP handler.
///
/// Constructed once in `main` and injected as `Arc<AppContext>` — nothing in
/// the crate reads configuration through ambient globals.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<StickerPipeline>,
    pub webhook: WebhookClient,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let pipeline = Arc::new(StickerPipeline::new(&config));
        let webhook = WebhookClient::new(&config);
        Self {
            config,
            pipeline,
            webhook,
            started_at: std::time::Instant::now(),
        }
    }
}
