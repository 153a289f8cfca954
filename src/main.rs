use std::sync::Arc;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vendor_admin::clients::HttpClient;
use vendor_admin::config::Settings;
use vendor_admin::console::{Console, ConsoleNotifier, PromptConfirm};
use vendor_admin::services::ApiService;
use vendor_admin::storage::{FileSessionStore, MemorySessionStore, SessionStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vendor_admin=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::new()?;

    let session: Arc<dyn SessionStore> = if settings.session.path.is_empty() {
        Arc::new(MemorySessionStore::new())
    } else {
        Arc::new(FileSessionStore::open(&settings.session.path, &settings.session.key).await?)
    };

    let client = Arc::new(HttpClient::new(&settings.api)?);
    info!(base_url = %client.base_url(), "Starting vendor admin console");
    let api = Arc::new(ApiService::new(client));

    let input = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let confirm = Arc::new(PromptConfirm::new(input.clone()));

    let mut console = Console::new(api, session, confirm, Arc::new(ConsoleNotifier));
    console.run(&*input).await?;

    Ok(())
}
