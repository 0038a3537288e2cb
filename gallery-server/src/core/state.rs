use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderService;
use crate::payment::PaymentBridge;
use crate::services::IngestService;
use crate::watermark::{WatermarkCompositor, WatermarkLayout, load_font};
use shared::{AppError, AppResult};

/// Shared server state
///
/// Holds the configuration, the embedded database handle and the service
/// singletons. Cloning is cheap; everything heavy sits behind an Arc.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub payment: Arc<PaymentBridge>,
    pub ingest: IngestService,
    pub orders: OrderService,
}

impl ServerState {
    /// Initialize the full state from configuration
    ///
    /// Creates the work directory layout, opens the database and loads the
    /// payment key material.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::config(format!("Cannot create work directory: {e}")))?;

        let db_path = config.database_dir().join("gallery.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;
        let db = db_service.db;

        let layout = match config.watermark_layout.as_str() {
            "tiled" => WatermarkLayout::Tiled,
            "banner" => WatermarkLayout::Banner,
            other => {
                tracing::warn!("Unknown WATERMARK_LAYOUT '{other}', using banner");
                WatermarkLayout::Banner
            }
        };
        let font = load_font(config.watermark_font_path.as_deref());
        let compositor = Arc::new(WatermarkCompositor::new(
            config.watermark_label.clone(),
            layout,
            font,
        ));

        let payment = Arc::new(PaymentBridge::from_config(config)?);

        let ingest = IngestService::new(db.clone(), compositor, config.clone());
        let orders = OrderService::new(db.clone());

        Ok(Self {
            config: config.clone(),
            db,
            payment,
            ingest,
            orders,
        })
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
