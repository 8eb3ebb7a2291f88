//! # tessera-checkout
//!
//! Reads one JSON request from stdin (or from the file given as the first
//! argument), runs it and prints the JSON response.
//!
//! ## Exit Status
//! - `0` - success, response on stdout
//! - `1` - rejection or bad input, `ApiError` JSON on stdout
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load checkout config (file + environment, defaults on failure)
//! 3. Read the request
//! 4. Dispatch and print

use std::io::Read;
use std::process::ExitCode;

use tessera_checkout::request::handle_json;
use tessera_checkout::{init_tracing, ApiError, CheckoutConfig, CheckoutEngine};
use tracing::info;

fn main() -> ExitCode {
    init_tracing();

    let config = CheckoutConfig::load_or_default(None);
    info!(
        store = %config.store.name,
        tax_rate_bps = config.tax.rate_bps,
        currency = %config.store.currency_code,
        "Checkout engine ready"
    );
    let engine = CheckoutEngine::new(config);

    let result = read_input(std::env::args().nth(1)).and_then(|input| handle_json(&engine, &input));

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match serde_json::to_string_pretty(&err) {
                Ok(json) => println!("{}", json),
                Err(_) => println!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: Option<String>) -> Result<String, ApiError> {
    match path {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| ApiError::invalid_request(format!("Cannot read {}: {}", path, e))),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| ApiError::invalid_request(format!("Cannot read stdin: {}", e)))?;
            Ok(input)
        }
    }
}
