//! Imagehook - webhook receiver for generated images.
//!
//! This library backs the `imagehook-web` binary:
//! - `POST /webhook` accepts the provider callback and saves the result image
//! - `POST /swap_face` relays a face-swap request to the provider API
//!
//! ## Flow
//!
//! ```text
//! swap_face → Provider API → (later) webhook → uploads/resImage.png
//! ```

pub mod config;
pub mod error;
pub mod relay;
pub mod sink;
pub mod submission;
pub mod web;

// Re-export commonly used types
pub use config::{Config, RelayConfig, StorageConfig};
pub use error::{RelayError, RequestError, SubmissionError};
pub use relay::{RelayClient, RelayResponse};
pub use sink::{EventSink, MemorySink, Severity, TracingSink};
pub use submission::{process_submission, Submission, UploadedImage};
pub use web::{create_router, AppState};
