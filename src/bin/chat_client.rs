//! Headless chat client binary
//!
//! Posts each stdin line as a message and prints every message relayed by
//! the server. Keep-alive pings are suppressed unless asked for.
//!
//! Run with: cargo run --bin chat-client -- --nick alice

use chat_relay::client::{MessagePoster, MessageSubscriber};

use tokio::io::{AsyncBufReadExt, BufReader};

struct Args {
    nick: String,
    hostname: String,
    port: u16,
    show_pings: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            nick: "nickname".into(),
            hostname: "localhost".into(),
            port: 8080,
            show_pings: false,
        }
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--nick" => {
                args.nick = iter.next().ok_or("Missing value for --nick")?;
            }
            "--hostname" => {
                args.hostname = iter.next().ok_or("Missing value for --hostname")?;
            }
            "--port" => {
                let value = iter.next().ok_or("Missing value for --port")?;
                args.port = value
                    .parse()
                    .map_err(|_| format!("Invalid value for --port: '{}'", value))?;
            }
            "--show-pings" => {
                args.show_pings = true;
            }
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: '{}'", other)),
        }
    }

    Ok(args)
}

fn print_usage() {
    eprintln!("Usage: chat-client [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --nick NAME        Display name for posted messages (default: nickname)");
    eprintln!("  --hostname HOST    Relay server hostname (default: localhost)");
    eprintln!("  --port PORT        Relay server port (default: 8080)");
    eprintln!("  --show-pings       Print server keep-alive messages too");
    eprintln!("  -h, --help         Show this help");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let addr = format!("{}:{}", args.hostname, args.port);

    let mut subscriber = MessageSubscriber::connect(addr.as_str()).await?;
    let show_pings = args.show_pings;
    tokio::spawn(async move {
        loop {
            match subscriber.next().await {
                Ok(Some(message)) => {
                    if message.is_keep_alive() && !show_pings {
                        continue;
                    }
                    println!("{}", message);
                }
                Ok(None) => {
                    eprintln!("Server closed the stream");
                    std::process::exit(0);
                }
                Err(e) => {
                    eprintln!("Stream error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    });

    let mut poster = MessagePoster::connect(addr.as_str()).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if let Err(e) = poster.post(&args.nick, text).await {
            eprintln!("Post failed: {}", e);
        }
    }

    Ok(())
}
