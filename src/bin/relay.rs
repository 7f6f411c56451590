//! twin-breakout-relay binary
//!
//! Accepts WebSocket clients, pairs them two to a room, and forwards each
//! text frame to the other occupant unchanged.
//!
//! ## Configuration (flags or env)
//!
//! | Key                 | Default        | Description                         |
//! |---------------------|----------------|-------------------------------------|
//! | `RELAY_ADDR`        | `0.0.0.0:8080` | Listen address                      |
//! | `RELAY_QUEUE_DEPTH` | `256`          | Per-player outbound frames buffered |

#[cfg(not(target_arch = "wasm32"))]
mod server {
    use std::collections::HashMap;
    use std::error::Error;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use clap::Parser;
    use futures_util::{SinkExt, StreamExt};
    use parking_lot::Mutex;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc::{self, error::TrySendError};
    use tokio_tungstenite::tungstenite::Message;

    use twin_breakout::relay::{Delivery, Lobby, PlayerId};

    // -----------------------------------------------------------------------
    // CLI
    // -----------------------------------------------------------------------

    #[derive(Parser, Debug)]
    #[command(
        name = "twin-breakout-relay",
        about = "Pairs Twin Breakout players and forwards their sync messages",
        version
    )]
    struct Args {
        /// Listen address
        #[arg(long, env = "RELAY_ADDR", default_value = "0.0.0.0:8080")]
        addr: SocketAddr,

        /// Outbound frames buffered per player before new ones are dropped
        #[arg(long, env = "RELAY_QUEUE_DEPTH", default_value_t = 256)]
        queue_depth: usize,
    }

    // -----------------------------------------------------------------------
    // Shared state
    // -----------------------------------------------------------------------

    /// Lobby plus a bounded outbox per connected player
    #[derive(Default)]
    struct Hub {
        lobby: Lobby,
        outboxes: HashMap<PlayerId, mpsc::Sender<String>>,
    }

    impl Hub {
        /// Queue each delivery on its recipient's outbox. Never waits: a full
        /// outbox loses the frame.
        fn dispatch(&self, deliveries: impl IntoIterator<Item = Delivery>) {
            for delivery in deliveries {
                let Some(outbox) = self.outboxes.get(&delivery.to) else {
                    continue;
                };
                match outbox.try_send(delivery.text) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        log::warn!("Player {} outbox full, dropping frame", delivery.to)
                    }
                    Err(TrySendError::Closed(_)) => {
                        log::debug!("Player {} already gone", delivery.to)
                    }
                }
            }
        }
    }

    type SharedHub = Arc<Mutex<Hub>>;

    /// Pause after a failed accept so fd exhaustion doesn't spin the loop
    const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

    /// Unwrap an accept result, logging failures. A failed accept only
    /// loses that one connection.
    fn admit<S>(accepted: std::io::Result<(S, SocketAddr)>) -> Option<(S, SocketAddr)> {
        match accepted {
            Ok(conn) => Some(conn),
            Err(e) => {
                log::warn!("Accept failed: {}", e);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Entry point
    // -----------------------------------------------------------------------

    #[tokio::main]
    pub async fn run() -> Result<(), Box<dyn Error>> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = Args::parse();
        let listener = TcpListener::bind(args.addr).await?;
        log::info!(
            "Relay listening on {} (queue depth {})",
            args.addr,
            args.queue_depth
        );

        let hub = SharedHub::default();
        let mut next_id: PlayerId = 0;
        loop {
            let Some((stream, addr)) = admit(listener.accept().await) else {
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            };
            next_id += 1;
            tokio::spawn(handle_connection(
                hub.clone(),
                stream,
                addr,
                next_id,
                args.queue_depth,
            ));
        }
    }

    async fn handle_connection(
        hub: SharedHub,
        stream: TcpStream,
        addr: SocketAddr,
        id: PlayerId,
        queue_depth: usize,
    ) {
        let ws = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                log::warn!("Handshake with {} failed: {}", addr, e);
                return;
            }
        };
        log::info!("Player {} connected from {}", id, addr);

        let (mut sink, mut frames) = ws.split();
        let (tx, mut rx) = mpsc::channel::<String>(queue_depth.max(1));

        {
            let mut hub = hub.lock();
            hub.outboxes.insert(id, tx);
            let joined = hub.lobby.join(id);
            hub.dispatch(joined);
        }

        // Writer ends once the hub drops this player's sender
        let writer = tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    log::debug!("Write to player {} failed: {}", id, e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let hub = hub.lock();
                    hub.dispatch(hub.lobby.route(id, &text));
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Read from player {} failed: {}", id, e);
                    break;
                }
            }
        }

        {
            let mut hub = hub.lock();
            hub.outboxes.remove(&id);
            let left = hub.lobby.leave(id);
            hub.dispatch(left);
        }
        let _ = writer.await;
        log::info!("Player {} disconnected", id);
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    server::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
