use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/gallery | Work directory (database, images, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | DEFAULT_PHOTO_PRICE | 5.99 | Price assigned to uploads without one |
/// | MAX_UPLOAD_BYTES | 5242880 | Per-file upload limit |
/// | WATERMARK_LABEL | PREVIEW | First text line rendered on previews |
/// | WATERMARK_LAYOUT | banner | banner \| tiled |
/// | WATERMARK_FONT_PATH | (unset) | TTF/OTF used for the banner text |
/// | PAYMENT_PRIVATE_KEY_PATH | (unset) | PKCS#8 PEM used to sign checkout payloads |
/// | PAYMENT_PUBLIC_CERT_PATH | (unset) | Provider certificate used to verify notifications |
/// | PAYMENT_ALLOW_UNVERIFIED | false | Accept unsigned notifications (never in production) |
/// | PAYMENT_MERCHANT_ID | (unset) | Merchant account id at the provider |
/// | PAYMENT_CURRENCY | EUR | Currency for checkout parameter sets |
/// | PUBLIC_BASE_URL | http://localhost:{port} | Base URL for provider callbacks |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/gallery HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the database, image files and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Price assigned to uploaded photos when the request carries none
    pub default_price: Decimal,
    /// Per-file upload size limit in bytes
    pub max_upload_bytes: usize,
    /// First text line rendered on watermark banners
    pub watermark_label: String,
    /// Watermark layout: banner | tiled
    pub watermark_layout: String,
    /// Font file for banner text; system font dirs are probed when unset
    pub watermark_font_path: Option<String>,
    /// PKCS#8 private key PEM for signing checkout payloads
    pub payment_private_key_path: Option<String>,
    /// Provider certificate or public key PEM for verifying notifications
    pub payment_public_cert_path: Option<String>,
    /// Accept notifications without a verifiable signature (dev only)
    pub payment_allow_unverified: bool,
    /// Merchant account id at the payment provider
    pub payment_merchant_id: Option<String>,
    /// ISO 4217 currency for checkout parameter sets
    pub payment_currency: String,
    /// Externally reachable base URL, used for provider callback URLs
    pub public_base_url: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let http_port: u16 = std::env::var("HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/gallery".into()),
            http_port,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            default_price: std::env::var("DEFAULT_PHOTO_PRICE")
                .ok()
                .and_then(|p| Decimal::from_str(&p).ok())
                .unwrap_or_else(|| Decimal::new(599, 2)),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5 * 1024 * 1024),
            watermark_label: std::env::var("WATERMARK_LABEL").unwrap_or_else(|_| "PREVIEW".into()),
            watermark_layout: std::env::var("WATERMARK_LAYOUT").unwrap_or_else(|_| "banner".into()),
            watermark_font_path: std::env::var("WATERMARK_FONT_PATH").ok(),
            payment_private_key_path: std::env::var("PAYMENT_PRIVATE_KEY_PATH").ok(),
            payment_public_cert_path: std::env::var("PAYMENT_PUBLIC_CERT_PATH").ok(),
            payment_allow_unverified: std::env::var("PAYMENT_ALLOW_UNVERIFIED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            payment_merchant_id: std::env::var("PAYMENT_MERCHANT_ID").ok(),
            payment_currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "EUR".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{http_port}")),
        }
    }

    /// Override work dir and port, keeping the rest from the environment
    ///
    /// Used by integration tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    // === Work directory layout ===

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Clean originals, never served publicly before purchase
    pub fn originals_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("images").join("originals")
    }

    /// Watermarked previews, served under /previews
    pub fn previews_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("images").join("previews")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.originals_dir())?;
        std::fs::create_dir_all(self.previews_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_price() {
        let config = Config::with_overrides("/tmp/gallery-test", 0);
        assert_eq!(config.default_price, Decimal::new(599, 2));
    }

    #[test]
    fn test_work_dir_layout() {
        let config = Config::with_overrides("/data/gallery", 3000);
        assert_eq!(
            config.previews_dir(),
            PathBuf::from("/data/gallery/images/previews")
        );
        assert_eq!(config.database_dir(), PathBuf::from("/data/gallery/database"));
    }
}
