use clap::Parser;
use log::{error, info};
use macroquad::prelude::*;
use pong_client::client::Client;
use pong_client::config::{Args, ClientConfig};
use pong_client::error::ClientError;
use pong_client::event::ClientEvent;
use pong_client::input::poll_keyboard;
use pong_client::network::ConnectionManager;
use pong_client::rendering::{FrameConfig, Overlay, Renderer};
use pong_client::session::SessionBroker;
use shared::{BOARD_HEIGHT, BOARD_WIDTH};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

fn window_conf() -> Conf {
    Conf {
        window_title: "Pong".to_owned(),
        window_width: BOARD_WIDTH as i32,
        window_height: BOARD_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    if let Err(e) = run(&args).await {
        error!("{}", e);
        show_until_quit(Overlay::Failed(e.to_string())).await;
    }
}

async fn run(args: &Args) -> Result<(), ClientError> {
    let config = ClientConfig::from_args(args)?;

    info!("Starting client...");
    info!("Server: {}", config.server);
    info!("Controls: W/S or Up/Down to move");

    // Socket tasks run here; the window loop stays on this thread.
    let runtime = Runtime::new()?;
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let connection = runtime.block_on(establish(&config, events_tx.clone()))?;
    let mut client = Client::new(connection, Renderer::new());

    prevent_quit();
    loop {
        for key in poll_keyboard() {
            let _ = events_tx.send(ClientEvent::Key(key));
        }

        let quitting = is_quit_requested();
        if quitting {
            let _ = events_tx.send(ClientEvent::Unload);
        }

        client.drain(&mut events_rx);

        client.renderer().draw(&FrameConfig {
            overlay: client.overlay(),
            connection: Some(client.connection().state()),
        });

        if quitting {
            break;
        }
        next_frame().await;
    }

    runtime.block_on(client.connection_mut().flush(config.shutdown_grace));
    info!("Client stopped");
    Ok(())
}

async fn establish(
    config: &ClientConfig,
    events: mpsc::UnboundedSender<ClientEvent>,
) -> Result<ConnectionManager, ClientError> {
    let broker = SessionBroker::new(config.join_url()?, config.join_timeout)?;
    let handle = broker.join_match().await?;

    let url = config.game_url(handle.game_key())?;
    let mut connection = ConnectionManager::new(handle);
    connection
        .connect(&url, config.connect_timeout, events)
        .await?;

    Ok(connection)
}

/// Keeps the window up with an explanation until the user closes it.
async fn show_until_quit(overlay: Overlay) {
    let renderer = Renderer::new();
    let frame = FrameConfig {
        overlay,
        connection: None,
    };

    while !is_quit_requested() && !is_key_pressed(KeyCode::Escape) {
        renderer.draw(&frame);
        next_frame().await;
    }
}
