//! `cookie-tool` — operator CLI entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging (stderr).
//! 3. Register the cookie hooks with a fresh decode cache.
//! 4. Serve `seal` / `open` commands from stdin until EOF.

mod filter;

use anyhow::Result;
use cookie_crypt::{telemetry, Config, CookieHooks, DecodeCache};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: cookie-tool configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "cookie-tool starting");

    // -----------------------------------------------------------------------
    // 3. Hooks
    // -----------------------------------------------------------------------
    let cache = DecodeCache::from_capacity(cfg.decode_cache_capacity);
    let hooks = CookieHooks::register(&cfg, cache);

    // -----------------------------------------------------------------------
    // 4. Command loop
    // -----------------------------------------------------------------------
    filter::run(&hooks, tokio::io::stdin(), tokio::io::stdout()).await
}
