//! Taskwright server binary.
//!
//! ```bash
//! # In-memory storage with a throwaway token secret
//! taskwright --dev
//!
//! # PostgreSQL, applying the bundled schema first
//! DATABASE_URL=postgres://localhost/taskwright \
//! TASKWRIGHT_JWT_SECRET=... \
//!     taskwright --storage postgres --migrate
//! ```

use clap::Parser;
use taskwright::config::{CliArgs, Config};
use taskwright::{app, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli)?;

    telemetry::init(&config.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = ?config.storage.kind,
        "starting taskwright"
    );

    app::run(&config).await
}
