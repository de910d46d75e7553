// Property assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load the property catalog
// 4. Create mpsc channels
// 5. Spawn app logic task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use immo_core::catalog;
use immo_core::config;
use immo_llm::LlmClient;
use immo_tui::{app, tui};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Property assistant starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: title={}, login mode={:?}, model={}",
        config.app.title, config.login.mode, config.llm.model
    );

    // 3. Load the property catalog
    let catalog = catalog::default_catalog().context("failed to load property catalog")?;
    info!("Loaded {} properties", catalog.len());

    // 4. Create mpsc channels (before AppState so llm_tx can be passed in)
    let (llm_tx, llm_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let llm_client = LlmClient::from_config(&config);
    match &llm_client {
        LlmClient::Active(_) => info!("LLM client initialized (API key configured)"),
        LlmClient::Disabled => info!("LLM client disabled (no API key)"),
    }
    let llm_enabled = llm_client.is_active();

    let view_state = tui::ViewState::from_config(&config, &catalog, llm_enabled);
    let app_state = app::AppState::new(config, catalog, llm_client, llm_tx);

    // 5. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(llm_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the TUI event loop (blocking until the user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx, view_state).await {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Property assistant shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("immo.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("immo=info,immo_core=info,immo_llm=info,immo_tui=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
