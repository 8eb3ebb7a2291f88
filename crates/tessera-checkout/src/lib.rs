//! # tessera-checkout: Hosting Layer for Tessera POS
//!
//! Everything `tessera-core` is not allowed to do lives here: reading the
//! configuration, reading the clock, logging, and turning rejections into
//! serializable API errors.
//!
//! ## Module Structure
//! ```text
//! tessera-checkout/
//! ├── lib.rs       ← You are here (module wiring, tracing setup)
//! ├── main.rs      ← `tessera-checkout` binary: stdin JSON → stdout JSON
//! ├── config.rs    ← CheckoutConfig (checkout.toml + TESSERA_* overrides)
//! ├── clock.rs     ← Clock collaborator (SystemClock, FixedClock)
//! ├── engine.rs    ← CheckoutEngine operations
//! ├── request.rs   ← JSON envelope + dispatch
//! └── error.rs     ← ApiError, ErrorCode, ConfigError
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod request;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CheckoutConfig;
pub use engine::CheckoutEngine;
pub use error::{ApiError, ConfigError, ErrorCode};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr; stdout is reserved for JSON responses.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tessera_checkout=trace` - Trace this crate only
/// - Default: INFO level
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
