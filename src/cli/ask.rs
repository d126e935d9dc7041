//! `ask` command: stream an answer and redraw it in place as it arrives.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::adapters::TerminalRenderer;
use crate::client::{Closure, SessionUpdate, StreamClient};
use crate::config::Config;
use crate::traits::Renderer;

pub async fn handle_ask_command(config: &Config, query: &str) -> Result<()> {
    let client = StreamClient::new(config.client_base_url());
    let mut subscription = client.subscribe(query);
    let mut renderer = TerminalRenderer::stdout();

    let closure = loop {
        let update = tokio::select! {
            update = subscription.next() => update,
            _ = tokio::signal::ctrl_c() => None,
        };

        match update {
            Some(SessionUpdate::Fragment {
                display,
                first_fragment_latency,
            }) => {
                if let Some(latency) = first_fragment_latency {
                    renderer.first_fragment(latency);
                    tracing::debug!(latency_ms = latency.as_millis() as u64, "First fragment");
                }
                renderer.render(&display);
            }
            Some(SessionUpdate::Closed(closure)) => break closure,
            // Interrupted; closing drops the connection
            None => {
                subscription.close();
                break Closure::Clean;
            }
        }
    };
    renderer.closed(&closure);

    match subscription.session().first_fragment_latency() {
        Some(latency) => eprintln!("Time to first fragment: {} ms", latency.as_millis()),
        None => eprintln!("No fragments received"),
    }

    match closure {
        Closure::Clean => Ok(()),
        Closure::Error(e) => Err(eyre!(e.user_message())),
    }
}
