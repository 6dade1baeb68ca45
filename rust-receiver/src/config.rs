//! Configuration module for environment variable parsing.
//!
//! All paths and relay parameters are read once at startup and handed to the
//! web state as an explicit struct.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// File name of the saved webhook image inside the upload directory.
pub const SAVED_IMAGE_NAME: &str = "resImage.png";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Storage settings for inbound webhook images
    pub storage: StorageConfig,

    /// Settings for the outbound face-swap relay
    pub relay: RelayConfig,
}

/// Where received images are written.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the saved image, created at startup
    pub upload_dir: PathBuf,

    /// Request body limit for webhook uploads
    pub max_upload_bytes: usize,
}

impl StorageConfig {
    /// Fixed path of the saved image. Every successful submission overwrites it.
    pub fn saved_image_path(&self) -> PathBuf {
        self.upload_dir.join(SAVED_IMAGE_NAME)
    }
}

/// Outbound face-swap API configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Face-swap API endpoint
    pub api_url: String,

    /// Value for the `x-api-key` header. Absence is reported per request.
    pub api_key: Option<String>,

    /// Webhook target the provider calls back when the job is done
    pub webhook_url: String,

    /// Generation id sent with every relay request
    pub id_gen: String,

    /// Type tag sent with every relay request
    pub type_tag: String,

    /// Image sent as the `input_image` part
    pub input_image: PathBuf,

    /// Image sent as the `target_image` part
    pub target_image: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let input_image = PathBuf::from(
            env::var("RELAY_INPUT_IMAGE").unwrap_or_else(|_| "../image.jpeg".to_string()),
        );
        let target_image = env::var("RELAY_TARGET_IMAGE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| input_image.clone());

        Config {
            port: parse_or("PORT", 4000),

            storage: StorageConfig {
                upload_dir: PathBuf::from(
                    env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                ),
                max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 << 20),
            },

            relay: RelayConfig {
                api_url: env::var("RELAY_API_URL")
                    .unwrap_or_else(|_| "https://public-api.example.com/faceswap".to_string()),
                api_key: non_empty("API_KEY"),
                webhook_url: env::var("RELAY_WEBHOOK_URL")
                    .unwrap_or_else(|_| "https://webhook.site".to_string()),
                id_gen: env::var("RELAY_ID_GEN").unwrap_or_else(|_| "UNIQ ID".to_string()),
                type_tag: env::var("RELAY_TYPE").unwrap_or_else(|_| "face_swap".to_string()),
                input_image,
                target_image,
            },
        }
    }
}

/// Parse a variable into `T`, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "invalid_env_value_using_default");
            default
        }
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
