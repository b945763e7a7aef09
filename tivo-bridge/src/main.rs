//! TiVo Remote-Control Bridge
//!
//! Serves the TiVo proxy over standard input/output: each input line is a
//! JSON request envelope and each response is written as one JSON line.
//! Logs go to stderr.

mod settings;
mod transport;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tivo_proxy::{MessageDispatcher, ObjectServer, TivoProxy};
use tivo_sim::SimulatedDevice;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::Settings;

/// Bounded queue depth between the transport and the server loop
const CHANNEL_CAPACITY: usize = 64;

/// tivo-bridge - serve TiVo remote-control commands as JSON lines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file path (defaults to the XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore the channel cache and fetch the lineup from the device
    #[arg(long)]
    reload_channels: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Include all our crates in the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tivo_bridge=info,tivo_protocol=info,tivo_proxy=info,tivo_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting TiVo bridge");

    let settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    let lineup = settings.lineup()?;
    let device = Arc::new(SimulatedDevice::new(lineup));

    let proxy = TivoProxy::start(device, &settings.proxy, args.reload_channels)
        .context("loading channel lineup")?;
    tracing::info!("{} channels indexed", proxy.channels().len());

    let server = ObjectServer::new(settings.server_name.clone(), MessageDispatcher::serve(proxy));

    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (publish_tx, publish_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let reader = tokio::spawn(transport::read_events(
        BufReader::new(tokio::io::stdin()),
        event_tx,
    ));
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        transport::publish_responses(&mut stdout, publish_rx).await
    });

    server.run(event_rx, publish_tx).await;

    writer.await?.context("writing responses")?;
    reader.await?.context("reading requests")?;
    Ok(())
}
