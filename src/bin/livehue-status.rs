//! Deployment status check
//!
//! Queries `GET /status` on a running server and prints a short report.
//!
//!   livehue-status                          # http://localhost:3000
//!   livehue-status https://livehue.example  # explicit base URL
//!   LIVEHUE_STATUS_URL=... livehue-status

use std::process::ExitCode;
use std::time::Duration;

use chrono::{Local, TimeZone};
use livehue::server::StatusResponse;

const DEFAULT_URL: &str = "http://localhost:3000";

async fn fetch_status(base: &str) -> Result<StatusResponse, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    client
        .get(format!("{}/status", base.trim_end_matches('/')))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

fn format_timestamp(ms: u64) -> String {
    match Local.timestamp_millis_opt(ms as i64).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let base = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LIVEHUE_STATUS_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    println!("Checking {}", base);

    match fetch_status(&base).await {
        Ok(status) => {
            println!("  status:    {}", status.status);
            println!("  mode:      {}", status.mode);
            println!("  clients:   {}", status.clients);
            println!("  timestamp: {}", format_timestamp(status.timestamp));
            println!();
            if status.clients > 0 {
                println!("Server is up and broadcasting to {} viewer(s)", status.clients);
            } else {
                println!("Server is up; open {}/ in a browser to start a viewer", base.trim_end_matches('/'));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Status check failed: {}", e);
            if e.is_connect() || e.is_timeout() {
                eprintln!("Is the server running and reachable at {}?", base);
            }
            ExitCode::FAILURE
        }
    }
}
