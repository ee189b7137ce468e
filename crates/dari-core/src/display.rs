use crate::Listing;
use colored::Colorize;
use tabled::settings::{object::Columns, Modify, Style, Width};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ListingTableRow {
    #[tabled(rename = "Type")]
    property_type: String,
    #[tabled(rename = "Prix (TND)", display_with = "display_right_12")]
    price: String,
    #[tabled(rename = "Surface (m²)", display_with = "display_right_8")]
    surface: String,
    #[tabled(rename = "Chambres", display_with = "display_right_5")]
    rooms: String,
    #[tabled(rename = "Gouvernorat")]
    gouvernorat: String,
    #[tabled(rename = "Délégation")]
    delegation: String,
}

fn display_right_12(s: &str) -> String {
    format!("{:>12}", s)
}

fn display_right_8(s: &str) -> String {
    format!("{:>8}", s)
}

fn display_right_5(s: &str) -> String {
    format!("{:>5}", s)
}

impl ListingTableRow {
    fn from_listing(listing: &Listing) -> Self {
        Self {
            property_type: listing.property_type.to_string(),
            price: listing.price.to_string(),
            surface: listing.surface_totale.to_string(),
            rooms: listing.nombre_chambres.to_string(),
            gouvernorat: listing.gouvernorat.clone(),
            delegation: listing.delegation.clone(),
        }
    }
}

pub fn create_listing_table(listings: &[Listing], limit: usize) -> String {
    let rows: Vec<ListingTableRow> = listings
        .iter()
        .take(limit)
        .map(ListingTableRow::from_listing)
        .collect();

    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(4)).with(Width::truncate(24)))
        .with(Modify::new(Columns::single(5)).with(Width::truncate(24)));

    table.to_string()
}

/// One line of the `stats` report, e.g. a gouvernorat with its listing count.
#[derive(Tabled)]
pub struct StatRow {
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Count", display_with = "display_right_8")]
    pub count: String,
    #[tabled(rename = "Share", display_with = "display_right_8")]
    pub share: String,
}

impl StatRow {
    pub fn new(label: impl Into<String>, count: usize, total: usize) -> Self {
        let share = if total == 0 {
            "0.0%".to_string()
        } else {
            format!("{:.1}%", count as f64 / total as f64 * 100.0)
        };
        Self {
            label: label.into(),
            count: count.to_string(),
            share,
        }
    }
}

pub fn create_stat_table(rows: &[StatRow]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

/// Post-run summary in the style of the original collector's console output.
pub fn format_run_summary(included: usize, excluded: usize) -> String {
    let total = included + excluded;
    let rate = if total == 0 {
        0.0
    } else {
        included as f64 / total as f64 * 100.0
    };

    format!(
        "{}\n{} {}\n{} {}\n{} {:.1}%",
        "Scrape summary".bold(),
        "Included listings:".green(),
        included,
        "Excluded listings:".red(),
        excluded,
        "Inclusion rate:".bold(),
        rate
    )
}
