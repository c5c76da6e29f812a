use crate::connection::Connection;
use clap::Parser;
use std::fmt::Display;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod connection;
mod stream_manager;

/// Relays streams from RTMP publishers to any number of RTMP players
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to accept RTMP connections on
    #[arg(short, long, default_value = "0.0.0.0:1935")]
    listen: String,

    /// Chunk size negotiated with clients once they publish or play
    #[arg(long, default_value_t = 4096)]
    chunk_size: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let manager_sender = stream_manager::start();

    let listener = TcpListener::bind(&args.listen).await?;
    info!("Listening for connections on {}", args.listen);
    let mut current_id = 0;

    loop {
        let (stream, connection_info) = listener.accept().await?;

        let connection = Connection::new(current_id, manager_sender.clone(), args.chunk_size);
        info!("Connection {}: Connection received from {}", current_id, connection_info.ip());

        spawn(connection.run(stream));
        current_id += 1;
    }
}

fn spawn<F, E>(future: F)
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display,
{
    tokio::task::spawn(async {
        if let Err(error) = future.await {
            error!("{}", error);
        }
    });
}

/// Sends a message over an unbounded receiver and returns true if the message was sent
/// or false if the channel has been closed.
fn send<T>(sender: &UnboundedSender<T>, message: T) -> bool {
    sender.send(message).is_ok()
}
