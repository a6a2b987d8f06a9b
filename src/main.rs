#[tokio::main]
async fn main() -> miyabot::error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("miyabot=info"))
        .init();
    log::info!("Starting miyabot webhook");

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("A rustls crypto provider was already installed");
    }

    match miyabot::run().await {
        Ok(()) => {
            log::info!("Webhook shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Webhook encountered an error: {}", e);
            Err(e)
        }
    }
}
