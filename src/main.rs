use clap::{Parser, Subcommand, ValueEnum};
use dari_core::{
    create_listing_table, create_stat_table, format_run_summary, read_csv, write_csv, write_json,
    PropertyType, Result, StatRow,
};
use dari_scrapers::{ScrapeQuery, ScrapeReport, ScraperFactory, ScraperType as CoreScraperType};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape property listings and export them
    #[command(about = "Scrape property listings and export them")]
    #[command(long_about = "Scrape property listings from a marketplace and write them to CSV, \
                            optionally also to JSON. Currently supports Mubawab.")]
    Scrape(ScrapeCommand),

    /// Summarize a previously exported CSV
    #[command(about = "Summarize a previously exported CSV")]
    #[command(long_about = "Read an exported CSV back and print counts by property type, the top \
                            gouvernorats and the quality indicators.")]
    Stats(StatsCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliScraperType {
    Mubawab,
}

impl From<CliScraperType> for CoreScraperType {
    fn from(value: CliScraperType) -> Self {
        match value {
            CliScraperType::Mubawab => CoreScraperType::Mubawab,
        }
    }
}

#[derive(Parser)]
struct ScrapeCommand {
    /// The scraper to use (-x, --scraper)
    #[arg(short = 'x', long, value_enum, default_value_t = CliScraperType::Mubawab)]
    scraper: CliScraperType,

    /// Type of property (-t, --property-type). Can be specified multiple times;
    /// defaults to every supported type.
    #[arg(short = 't', long, value_enum, num_args = 1.., value_delimiter = ',')]
    property_type: Vec<PropertyType>,

    /// Maximum number of search pages to scrape per property type (-c, --max-pages)
    #[arg(short = 'c', long, default_value_t = 3)]
    max_pages: u32,

    /// Drop listings at or below this price in TND (-p, --min-price)
    #[arg(short = 'p', long)]
    min_price: Option<u64>,

    /// Output CSV path (-o, --output)
    #[arg(short = 'o', long, default_value = "mubawab_combined_properties.csv")]
    output: PathBuf,

    /// Also write the listings as JSON to this path (-j, --json)
    #[arg(short = 'j', long)]
    json: Option<PathBuf>,
}

#[derive(Parser)]
struct StatsCommand {
    /// Input CSV path (-i, --input)
    #[arg(short = 'i', long, default_value = "mubawab_combined_properties.csv")]
    input: PathBuf,

    /// Number of gouvernorats to show (-l, --limit)
    #[arg(short = 'l', long, default_value_t = 10)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape(cmd) => {
            let scraper = ScraperFactory::create_scraper(cmd.scraper.into())?;

            let property_types = if cmd.property_type.is_empty() {
                scraper.supported_property_types()
            } else {
                cmd.property_type
            };

            let mut report = ScrapeReport::default();
            for property_type in property_types {
                info!("Scraping {} listings", property_type);
                let query = ScrapeQuery::new(property_type);
                report.merge(scraper.scrape_listing(query, cmd.max_pages).await?);
            }

            println!("{}", format_run_summary(report.included(), report.excluded));

            let mut listings = report.listings;
            if let Some(min_price) = cmd.min_price {
                let before = listings.len();
                listings.retain(|listing| listing.price > min_price);
                info!(
                    "Dropped {} listings at or below {} TND",
                    before - listings.len(),
                    min_price
                );
            }

            write_csv(&cmd.output, &listings)?;
            info!("Wrote {} listings to {}", listings.len(), cmd.output.display());

            if let Some(json_path) = cmd.json {
                write_json(&json_path, &listings)?;
                info!("Wrote JSON to {}", json_path.display());
            }

            if !listings.is_empty() {
                println!("{}", create_listing_table(&listings, 10));
            }
        }
        Commands::Stats(cmd) => {
            let listings = read_csv(&cmd.input)?;
            let total = listings.len();
            println!("Listings in {}: {}", cmd.input.display(), total);

            let mut by_type: HashMap<PropertyType, usize> = HashMap::new();
            let mut by_gouvernorat: HashMap<String, usize> = HashMap::new();
            let mut neuf = 0;
            let mut haut_standing = 0;

            for listing in &listings {
                *by_type.entry(listing.property_type).or_default() += 1;
                *by_gouvernorat.entry(listing.gouvernorat.clone()).or_default() += 1;
                neuf += usize::from(listing.neuf);
                haut_standing += usize::from(listing.haut_standing);
            }

            let type_rows: Vec<StatRow> = [PropertyType::House, PropertyType::Apartment]
                .iter()
                .map(|t| StatRow::new(t.to_string(), by_type.get(t).copied().unwrap_or(0), total))
                .collect();
            println!("\nBy property type:\n{}", create_stat_table(&type_rows));

            let mut gouvernorats: Vec<(String, usize)> = by_gouvernorat.into_iter().collect();
            gouvernorats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            let gouvernorat_rows: Vec<StatRow> = gouvernorats
                .into_iter()
                .take(cmd.limit)
                .map(|(name, count)| StatRow::new(name, count, total))
                .collect();
            println!("\nTop gouvernorats:\n{}", create_stat_table(&gouvernorat_rows));

            let quality_rows = vec![
                StatRow::new("Neuf", neuf, total),
                StatRow::new("Haut standing", haut_standing, total),
            ];
            println!("\nQuality indicators:\n{}", create_stat_table(&quality_rows));
        }
    }

    Ok(())
}
