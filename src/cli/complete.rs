//! `complete` command: fetch the whole answer from the reference endpoint.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::time::Instant;

use crate::client::StreamClient;
use crate::config::Config;

pub async fn handle_complete_command(config: &Config, query: &str) -> Result<()> {
    let client = StreamClient::new(config.client_base_url());
    let started = Instant::now();

    let body = client
        .complete(query)
        .await
        .map_err(|e| eyre!(e.user_message()))?;

    println!("{}", body);
    eprintln!("Total time: {} ms", started.elapsed().as_millis());
    Ok(())
}
