use anyhow::Result;
use ielts_practice_core::telemetry::init_tracing;
use ielts_practice_core::{PracticeApp, PracticeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing()?;

    let config = PracticeConfig::from_env()?;
    let app = PracticeApp::new(config);
    app.run().await
}
