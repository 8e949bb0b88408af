use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "failover-cli")]
#[command(about = "Inspect a running RSSI failover controller", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9100", env = "FAILOVER_STATUS_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full controller snapshot as JSON
    Status,
    /// Active receiver and readings, one line per receiver
    Receivers,
    /// Transition counts per direction
    Transitions,
    /// Raw Prometheus metrics
    Metrics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let status = fetch_status(&client, base).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Receivers => {
            let status = fetch_status(&client, base).await?;
            let receivers = status["receivers"].as_array().cloned().unwrap_or_default();
            for rx in receivers {
                let marker = if rx["active"].as_bool().unwrap_or(false) { "*" } else { " " };
                let reading = rx["rssi_dbm"]
                    .as_f64()
                    .map(|v| format!("{v:7.2} dBm"))
                    .unwrap_or_else(|| "    n/a    ".to_string());
                println!(
                    "{marker} {:<8} {:<8} {reading}",
                    rx["label"].as_str().unwrap_or("?"),
                    rx["role"].as_str().unwrap_or("?"),
                );
            }
        }
        Commands::Transitions => {
            let status = fetch_status(&client, base).await?;
            println!("{}", serde_json::to_string_pretty(&status["transitions"])?);
        }
        Commands::Metrics => {
            let res = client.get(format!("{base}/metrics")).send().await?;
            if !res.status().is_success() {
                eprintln!("Error: status server returned {}", res.status());
                return Ok(());
            }
            print!("{}", res.text().await?);
        }
    }

    Ok(())
}

async fn fetch_status(client: &reqwest::Client, base: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let res = client.get(format!("{base}/status")).send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(format!("status server returned {status}").into());
    }
    Ok(res.json().await?)
}
