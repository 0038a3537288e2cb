//! Gallery Server - event photography storefront backend
//!
//! # Overview
//!
//! Photographers upload event photos, buyers browse watermarked previews and
//! purchase clean originals through an external card payment provider.
//!
//! - **Ingest** (`services`): upload validation, watermarking, file layout
//! - **Watermark** (`watermark`): preview rendering, banner and tiled layouts
//! - **Orders** (`orders`): order lifecycle state machine
//! - **Payment** (`payment`): payload signing and notification verification
//! - **Database** (`db`): embedded SurrealDB storage
//! - **HTTP API** (`api`): RESTful routes
//!
//! # Module structure
//!
//! ```text
//! gallery-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # database layer and repositories
//! ├── orders/        # order state machine
//! ├── payment/       # provider signing bridge
//! ├── services/      # ingest pipeline
//! ├── watermark/     # preview compositor
//! └── utils/         # logging, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod payment;
pub mod services;
pub mod utils;
pub mod watermark;

pub use self::core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use payment::{NotificationVerdict, PaymentBridge, build_canonical};
pub use services::{IngestService, RewatermarkReport};
pub use watermark::{WatermarkCompositor, WatermarkLayout};

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env, then set up logging using the configured work directory
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.logs_dir();
    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.to_str());
    Ok(())
}
