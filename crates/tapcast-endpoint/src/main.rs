//! tapcast-endpoint binary entry point.
//!
//! Wires together the config, the event synthesis controller, and the
//! network session, then runs the Tokio async dispatch loop until the
//! controller disconnects.
//!
//! # Platform event sink
//!
//! The `MockEventSink` used here records all synthesized events rather
//! than actually injecting OS input. In a production build it is replaced
//! by a platform adapter (uinput on Linux, `InputManager` on Android).

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tapcast_core::domain::geometry::ScreenSize;
use tapcast_endpoint::application::controller::Controller;
use tapcast_endpoint::config::EndpointConfig;
use tapcast_endpoint::infrastructure::composer::VirtualKeyboardComposer;
use tapcast_endpoint::infrastructure::device::ScreenGeometry;
use tapcast_endpoint::infrastructure::event_sink::mock::MockEventSink;
use tapcast_endpoint::infrastructure::network::Session;

const CONFIG_FILE: &str = "tapcast.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = EndpointConfig::load(Path::new(CONFIG_FILE))?;
    config.apply_args(std::env::args().skip(1))?;

    // Initialise structured logging. RUST_LOG still wins when set, so a
    // targeted filter can be applied without touching the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.tracing_filter())),
        )
        .init();

    info!(
        host = %config.host,
        port = config.port,
        scid = %config.scid,
        audio = config.audio,
        video = config.video,
        "tapcast endpoint starting"
    );

    // ── Control socket ────────────────────────────────────────────────────────
    let addr = format!("{}:{}", config.host, config.port);
    let stream = tokio::net::TcpStream::connect(&addr).await?;
    stream.set_nodelay(true)?;
    info!(%addr, "connected to controller");

    // ── Event synthesis pipeline ──────────────────────────────────────────────
    let device = ScreenGeometry::new(ScreenSize::new(
        config.screen_width,
        config.screen_height,
    ));
    let sink = MockEventSink::new();
    let controller = Controller::new(device, &sink, VirtualKeyboardComposer::new());

    let mut session = Session::new(stream, controller);
    session.run().await?;

    info!(delivered = sink.delivered(), "endpoint shut down");
    Ok(())
}
