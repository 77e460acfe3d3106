//! Chat relay server binary
//!
//! Run with: cargo run --bin chat-server -- [OPTIONS]
//!
//! Examples:
//!   chat-server                          # listens on 0.0.0.0:8080
//!   chat-server --port 9000              # custom port
//!   chat-server --threads 4              # 4 runtime worker threads
//!   chat-server --ping-interval 30       # keep-alive every 30s of idle

use std::time::Duration;

use chat_relay::{ChatServer, DefaultHandler, ServerConfig};

struct Args {
    port: u16,
    threads: usize,
    ping_interval: u64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            port: 8080,
            threads: 0,
            ping_interval: 10,
        }
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--port" => {
                args.port = next_value(&mut iter, "--port")?;
            }
            "--threads" => {
                args.threads = next_value(&mut iter, "--threads")?;
            }
            "--ping-interval" => {
                args.ping_interval = next_value(&mut iter, "--ping-interval")?;
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

fn next_value<T: std::str::FromStr>(
    iter: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T, String> {
    let value = iter
        .next()
        .ok_or_else(|| format!("Missing value for {}", flag))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: '{}'", flag, value))
}

fn print_usage() {
    eprintln!("Usage: chat-server [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --port PORT             Port to listen on (default: 8080)");
    eprintln!("  --threads N             Runtime worker threads (default: number of cores)");
    eprintln!("  --ping-interval SECS    Idle keep-alive interval (default: 10)");
    eprintln!("  -h, --help              Show this help");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
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
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_relay=info".parse()?),
        )
        .init();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if args.threads > 0 {
        builder.worker_threads(args.threads);
    }
    let runtime = builder.enable_all().build()?;

    runtime.block_on(async move {
        let config = ServerConfig::default()
            .bind(([0, 0, 0, 0], args.port).into())
            .idle_ping_interval(Duration::from_secs(args.ping_interval))
            .worker_threads(args.threads);

        let server = ChatServer::new(config, DefaultHandler);

        server
            .run_until(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
    })?;

    Ok(())
}
