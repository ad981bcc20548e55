//! shellbot console
//!
//! Chat with the shellbot service from a terminal, one line per message.

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sb_console::client::GatewayClient;
use sb_console::input::{parse_line, ConsoleInput};
use sb_console::output::{print_error, print_info, print_replies, print_warning};
use sb_core::config::DEFAULT_GATEWAY_ADDRESS;
use sb_core::gateway::{Button, GatewayResponse};
use sb_core::OperatorId;

#[derive(Parser)]
#[command(name = "shellbot-console")]
#[command(about = "Terminal front end for the shellbot service")]
#[command(version)]
struct Args {
    /// Gateway address of the service
    #[arg(short, long, default_value = DEFAULT_GATEWAY_ADDRESS)]
    address: String,

    /// Operator identity to send events as
    #[arg(short, long, env = "SHELLBOT_OPERATOR")]
    operator: String,

    /// Ask the service to shut down and exit
    #[arg(long)]
    stop: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut client = GatewayClient::with_address(args.address);

    if args.stop {
        client.shutdown().await?;
        print_info("Service is shutting down");
        return Ok(());
    }

    if !client.ping().await? {
        anyhow::bail!("No shellbot service at {}", client.address());
    }

    let operator = OperatorId::new(args.operator);
    print_info(&format!(
        "Connected to {} as {}. /start to begin, @N presses a button, /quit leaves.",
        client.address(),
        operator
    ));

    let mut buttons: Vec<Button> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let event = match parse_line(&line, &buttons) {
            Ok(ConsoleInput::Event(event)) => event,
            Ok(ConsoleInput::Nothing) => continue,
            Ok(ConsoleInput::Quit) => break,
            Err(message) => {
                print_warning(&message);
                continue;
            }
        };

        match client.send_event(&operator, event).await? {
            GatewayResponse::Replies { replies } => {
                print_replies(&replies);
                if let Some(menu) = replies.iter().rev().find(|r| !r.buttons().is_empty()) {
                    buttons = menu.buttons().to_vec();
                }
            }
            GatewayResponse::Ignored => {
                print_warning(&format!("Operator {} is not allowed to use this service", operator))
            }
            GatewayResponse::Error { message } => print_error(&message),
            other => tracing::debug!("Unexpected response: {:?}", other),
        }
    }

    Ok(())
}
