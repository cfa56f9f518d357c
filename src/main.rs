use clap::{Parser, Subcommand};
use dotenv::dotenv;
use intellicourse::advisor::config::AdvisorConfig;
use intellicourse::advisor::server::{self, AppState, QueryResponse};
use intellicourse::advisor::workflow::CourseWorkflow;

use std::net::{IpAddr, SocketAddr};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the course advisor API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Answer a single question and print the JSON response
    Ask {
        /// The question to ask
        #[arg(short, long)]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = AdvisorConfig::from_env()?;

    match args.command {
        Commands::Serve { host, port } => {
            let workflow = match CourseWorkflow::from_config(&config) {
                Ok(workflow) => Some(workflow),
                Err(e) => {
                    log::error!("Error building workflow: {}", e);
                    None
                }
            };
            server::serve(SocketAddr::new(host, port), AppState::new(workflow)).await?;
        }
        Commands::Ask { query } => {
            let query = query.trim();
            if query.is_empty() {
                return Err("Query is empty".into());
            }
            let workflow = CourseWorkflow::from_config(&config)?;
            let response = QueryResponse::from(workflow.run(query).await);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
