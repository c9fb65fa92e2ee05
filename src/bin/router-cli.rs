use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the host router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token, when the router is configured with an API key.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routing rules
    List,
    /// Add a rule forwarding FROM (http://host/base/) to TO (backend URL)
    Add {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Remove the rule with the given id
    Remove { id: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let endpoint = format!("{}/list", cli.url.trim_end_matches('/'));

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }

    match cli.command {
        Commands::List => {
            let res = client.get(&endpoint).headers(headers).send().await?;
            check_status(&res)?;
            let rules: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        Commands::Add { from, to } => {
            let res = client
                .post(&endpoint)
                .headers(headers)
                .json(&json!({ "from": from, "to": to }))
                .send()
                .await?;
            check_status(&res)?;
            println!("Rule added");
        }
        Commands::Remove { id } => {
            let res = client
                .delete(&endpoint)
                .headers(headers)
                .query(&[("id", id)])
                .send()
                .await?;
            check_status(&res)?;
            println!("Rule {id} removed");
        }
    }

    Ok(())
}

fn check_status(res: &reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        return Err(format!("management API returned status {status}").into());
    }
    Ok(())
}
