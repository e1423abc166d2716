use clap::{Parser, Subcommand};
use tracing::error;

use petmap::app::ports::BackendPort;
use petmap::app::session::MapSession;
use petmap::config::Config;
use petmap::districts;
use petmap::domain::CanonicalCategory;
use petmap::infra::console_map::ConsoleMap;
use petmap::infra::http_api::BackendClient;
use petmap::logging;
use petmap::metrics::init_metrics;

#[derive(Parser)]
#[command(name = "petmap")]
#[command(about = "Seoul pet facility locator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the districts the map knows how to center on
    Districts,
    /// Fetch a district's facilities and show the visible set
    Facilities {
        /// District name, e.g. 강남구
        #[arg(long)]
        gu: String,
        /// Only keep these categories (comma-separated), e.g. hospital,pharmacy
        #[arg(long)]
        categories: Option<String>,
    },
    /// Search facilities and concepts in the knowledge graph
    Search {
        /// Free-text query
        query: String,
    },
    /// Page through the adoption listings
    Animals {
        /// First row to fetch
        #[arg(long, default_value_t = 1)]
        start: u32,
        /// Last row to fetch
        #[arg(long, default_value_t = 10)]
        end: u32,
    },
    /// Ask the assistant a question
    Ask {
        /// Message to send
        message: String,
    },
}

async fn show_facilities(
    backend: &BackendClient,
    gu: &str,
    categories: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut map = ConsoleMap::new();
    let mut session = MapSession::new();

    if let Some(list) = categories {
        for part in list.split(',') {
            let part = part.trim();
            match CanonicalCategory::parse(part) {
                Some(category) => {
                    session.toggle_category(category, &mut map);
                }
                None => println!("⚠️  Unknown category: {}", part),
            }
        }
    }

    let ticket = session.change_district(gu, &mut map);
    let outcome = backend.facilities_by_district(ticket.district()).await;
    let failed = outcome.is_err();
    session.complete_fetch(&ticket, outcome, &mut map);

    if failed {
        println!("⚠️  Facility fetch failed; showing an empty district");
    }

    println!(
        "\n📍 {} of {} facilities visible in {}:",
        session.visible().len(),
        session.facilities().len(),
        gu
    );
    for facility in session.visible() {
        let label = facility.category.map(|c| c.label()).unwrap_or("미분류");
        println!(
            "   [{}] {} ({:.4}, {:.4})",
            label, facility.name, facility.coords.lat, facility.coords.lng
        );
    }
    Ok(())
}

async fn run_command(
    command: Commands,
    backend: &BackendClient,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        // handled in main before the backend exists
        Commands::Districts => {}
        Commands::Facilities { gu, categories } => {
            println!("🐕 Loading facilities for {}...", gu);
            show_facilities(backend, &gu, categories.as_deref()).await?;
        }
        Commands::Search { query } => {
            println!("🔎 Searching for \"{}\"...", query);
            let results = backend.search(&query).await?;
            println!("\n📊 {} results:", results.total);
            for hit in &results.results {
                let kind = hit.kind.as_deref().unwrap_or("-");
                println!("   [{}] {} ({})", kind, hit.label, hit.uri);
                if let Some(description) = &hit.description {
                    println!("       {}", description);
                }
            }
        }
        Commands::Animals { start, end } => {
            println!("🐾 Fetching adoption listings {}..{}...", start, end);
            let page = backend.adoption_page(start, end).await?;
            println!(
                "\n📊 {} rows ({} listed in total):",
                page.rows.len(),
                page.total
            );
            for row in &page.rows {
                println!("   {}", serde_json::to_string(row)?);
            }
        }
        Commands::Ask { message } => {
            println!("💬 Asking: {}", message);
            let answer = backend.ask(&message).await?;
            println!("\n{}", answer);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();
    init_metrics();

    let cli = Cli::parse();

    if let Commands::Districts = cli.command {
        println!("🗺️  Districts with known centers:");
        for name in districts::names() {
            println!("   {}", name);
        }
        return Ok(());
    }

    let config = Config::load()?;
    let backend = BackendClient::new(&config.api)?;

    if let Err(e) = run_command(cli.command, &backend).await {
        error!("command failed: {}", e);
        println!("❌ Command failed: {}", e);
    }
    Ok(())
}
