use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tandem::client::rtc::{RtcTransportFactory, SyntheticMedia};
use tandem::client::{ClientConfig, ClientEngine, ClientHandle, ClientStatus};
use tandem::model::{IceServerConfig, default_ice_servers};
use tandem::server::{ServerConfig, serve};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Anonymous one-to-one pairing over WebRTC")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct IceArgs {
    /// STUN server URL. Repeat for more. Defaults to public Google servers.
    #[arg(long = "stun")]
    stun: Vec<String>,

    /// TURN server URL. Repeat for more.
    #[arg(long = "turn", requires = "turn_username")]
    turn: Vec<String>,

    #[arg(long, env = "TANDEM_TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TANDEM_TURN_CREDENTIAL")]
    turn_credential: Option<String>,
}

impl IceArgs {
    fn ice_servers(&self) -> Vec<IceServerConfig> {
        let mut servers: Vec<_> = self.stun.iter().map(IceServerConfig::open).collect();
        if servers.is_empty() {
            servers = default_ice_servers();
        }
        if !self.turn.is_empty() {
            servers.push(IceServerConfig {
                urls: self.turn.clone(),
                username: self.turn_username.clone(),
                credential: self.turn_credential.clone(),
            });
        }
        servers
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the matchmaking and signaling server.
    Serve {
        #[arg(long, env = "TANDEM_BIND")]
        bind: Option<SocketAddr>,

        /// Port on all interfaces, used when no bind address is given.
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        #[arg(long, default_value_t = 2000)]
        max_chat_len: usize,

        #[command(flatten)]
        ice: IceArgs,
    },

    /// Join as a headless peer sending synthetic audio and video.
    ///
    /// Lines typed on stdin are sent as chat; `/skip`, `/stop` and `/find` control pairing.
    Dial {
        #[arg(long, env = "TANDEM_URL", default_value = "ws://127.0.0.1:5000/ws")]
        url: String,

        #[arg(long)]
        handle: Option<String>,

        #[command(flatten)]
        ice: IceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Commands::Serve {
            bind,
            port,
            max_chat_len,
            ice,
        } => {
            let defaults = ServerConfig::default();
            let bind = bind
                .or_else(|| port.map(|p| SocketAddr::from(([0, 0, 0, 0], p))))
                .unwrap_or(defaults.bind);

            println!("{} {}", "Serving on".green().bold(), bind);
            serve(ServerConfig {
                bind,
                ice_servers: ice.ice_servers(),
                max_chat_len,
                ..defaults
            })
            .await
            .context("Server stopped")?;
        }

        Commands::Dial { url, handle, ice } => {
            let mut config = ClientConfig::new(url);
            config.handle = handle;
            config.ice_servers = ice.ice_servers();
            dial(config).await?;
        }
    }

    Ok(())
}

async fn dial(config: ClientConfig) -> Result<()> {
    let media = Arc::new(SyntheticMedia::new());
    let mut client = ClientEngine::connect(config, media.clone(), Arc::new(RtcTransportFactory::new()))
        .await
        .context("Failed to reach the signaling server")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut status_rx = client.subscribe();
    let mut searching = false;

    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                print_status(&status);
                match status {
                    ClientStatus::Ready if !searching => {
                        searching = true;
                        client.find().await?;
                    }
                    ClientStatus::MediaUnavailable(_) | ClientStatus::Disconnected => break,
                    _ => {}
                }
            }

            Some(line) = client.next_chat() => {
                println!("{} {}", "partner:".blue().bold(), line.text);
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_input(&client, line.trim()).await? {
                    break;
                }
            }
        }
    }

    println!(
        "{} {} RTP packets received",
        "Done.".green().bold(),
        media.received_packets()
    );
    client.close().await;
    Ok(())
}

/// Returns false when the user asked to quit.
async fn handle_input(client: &ClientHandle, line: &str) -> Result<bool> {
    match line {
        "" => {}
        "/skip" => client.skip().await?,
        "/stop" => client.stop().await?,
        "/find" => client.find().await?,
        "/quit" => return Ok(false),
        text => client.chat(text).await?,
    }
    Ok(true)
}

fn print_status(status: &ClientStatus) {
    let line = status.to_string();
    let line = match status {
        ClientStatus::Connected { .. } => line.green().bold(),
        ClientStatus::Negotiating { .. } | ClientStatus::Searching => line.cyan(),
        ClientStatus::PartnerLeft | ClientStatus::Stopped => line.yellow(),
        ClientStatus::MediaUnavailable(_)
        | ClientStatus::NegotiationFailed(_)
        | ClientStatus::Disconnected => line.red().bold(),
        _ => line.normal(),
    };
    println!("{} {}", "●".dimmed(), line);
}
