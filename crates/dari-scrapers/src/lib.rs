pub mod extract;
pub mod mubawab;

use async_trait::async_trait;
use dari_core::{Listing, PropertyType, Result};
use std::sync::Arc;

pub use extract::{split_location, ListingExtractor};
pub use mubawab::MubawabScraper;

/// Enum representing the supported listing marketplaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScraperType {
    /// Mubawab - Tunisian real estate listings
    Mubawab,
    // Add more scrapers here as we implement them
}

#[derive(Debug, Clone)]
pub struct ScrapeQuery {
    pub property_type: PropertyType,
    pub page: u32,
}

impl ScrapeQuery {
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            page: 1,
        }
    }

    pub fn next_page(&mut self) {
        self.page += 1;
    }
}

/// What one scrape run produced: the accepted records plus the count of
/// listings the extractor rejected.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub listings: Vec<Listing>,
    pub excluded: usize,
}

impl ScrapeReport {
    pub fn merge(&mut self, other: ScrapeReport) {
        self.listings.extend(other.listings);
        self.excluded += other.excluded;
    }

    pub fn included(&self) -> usize {
        self.listings.len()
    }
}

/// Trait for translating a PropertyType into a marketplace URL slug
pub trait PropertyTypeTranslator {
    fn property_type_to_slug(&self, property_type: &PropertyType) -> &'static str;
}

/// Trait for scraping property listings from various marketplaces
#[async_trait]
pub trait Scraper: Send + Sync + PropertyTypeTranslator {
    /// Scrape a single search-results page and every listing it links to.
    /// The boolean is false once the marketplace has no further pages.
    async fn scrape_page(&self, query: &ScrapeQuery) -> Result<(ScrapeReport, bool)>;

    fn supported_property_types(&self) -> Vec<PropertyType>;

    /// Walk search pages up to `max_pages`, stopping early at the first
    /// empty page.
    async fn scrape_listing(
        &self,
        mut query: ScrapeQuery,
        max_pages: u32,
    ) -> Result<ScrapeReport> {
        let mut report = ScrapeReport::default();
        let mut pages_scraped = 0;

        while pages_scraped < max_pages {
            let (page_report, has_next) = self.scrape_page(&query).await?;
            report.merge(page_report);

            if !has_next {
                break;
            }

            query.next_page();
            pages_scraped += 1;
        }

        Ok(report)
    }
}

/// Factory for creating scraper instances
pub struct ScraperFactory;

impl ScraperFactory {
    pub fn create_scraper(scraper_type: ScraperType) -> Result<Arc<dyn Scraper>> {
        match scraper_type {
            ScraperType::Mubawab => Ok(Arc::new(MubawabScraper::new()?)),
            // Add more cases here as we implement more scrapers
        }
    }
}
