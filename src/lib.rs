pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod prompt;
pub mod router;
pub mod search;
pub mod server;
pub mod telegram;
pub mod types;

#[cfg(test)]
mod test_support;

use log::{debug, info};

use config::Config;
use error::Result;
use router::RequestRouter;

/// Run the webhook server.
pub async fn run() -> Result<()> {
    info!("Initializing webhook");
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();

    debug!("Building provider clients");
    let router = RequestRouter::from_config(config);

    server::serve(router, &bind_addr).await
}
