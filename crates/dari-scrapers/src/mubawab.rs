use crate::extract::{parse_selector, ListingExtractor};
use crate::{PropertyTypeTranslator, ScrapeQuery, ScrapeReport, Scraper};
use async_trait::async_trait;
use dari_core::{Listing, PropertyType, Result};
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const BASE_URL: &str = "https://www.mubawab.tn";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug)]
pub struct MubawabScraper {
    client: Client,
    extractor: ListingExtractor,
}

impl MubawabScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            extractor: ListingExtractor::new()?,
        })
    }

    /// Page 1 is the bare search URL; later pages append the `:p:N` suffix.
    fn search_url(&self, property_type: &PropertyType, page: u32) -> String {
        let mut url = format!(
            "{}/fr/sc/{}",
            BASE_URL,
            self.property_type_to_slug(property_type)
        );
        if page > 1 {
            url.push_str(&format!(":p:{}", page));
        }
        url
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        Ok(response.error_for_status()?.text().await?)
    }

    /// Collect listing links from a search-results page: every
    /// `div.listingBox` carries the detail-page URL in its `linkref`
    /// attribute, sometimes relative to the site root.
    pub fn collect_listing_links(&self, html: &str) -> Result<Vec<Url>> {
        let document = Html::parse_document(html);
        let listing_box = parse_selector("div.listingBox")?;

        let mut links = Vec::new();
        for element in document.select(&listing_box) {
            let Some(linkref) = element.value().attr("linkref") else {
                continue;
            };
            let url = if linkref.starts_with("http") {
                Url::parse(linkref)?
            } else {
                Url::parse(BASE_URL)?.join(linkref)?
            };
            links.push(url);
        }

        Ok(links)
    }

    fn extract_listing(
        &self,
        url: &Url,
        html: &str,
        property_type: PropertyType,
    ) -> Option<Listing> {
        let document = Html::parse_document(html);
        self.extractor.extract(url, &document, property_type)
    }
}

impl PropertyTypeTranslator for MubawabScraper {
    fn property_type_to_slug(&self, property_type: &PropertyType) -> &'static str {
        match property_type {
            PropertyType::House => "maisons-a-vendre",
            PropertyType::Apartment => "appartements-a-vendre",
        }
    }
}

#[async_trait]
impl Scraper for MubawabScraper {
    fn supported_property_types(&self) -> Vec<PropertyType> {
        vec![PropertyType::House, PropertyType::Apartment]
    }

    async fn scrape_page(&self, query: &ScrapeQuery) -> Result<(ScrapeReport, bool)> {
        let url = self.search_url(&query.property_type, query.page);
        info!("Scraping search page: {}", url);

        let html = self.fetch_page(&url).await?;
        let links = self.collect_listing_links(&html)?;
        debug!("Found {} listing links on page {}", links.len(), query.page);

        // An empty results page means we walked past the last page.
        let has_next = !links.is_empty();

        let mut report = ScrapeReport::default();
        for link in &links {
            let html = match self.fetch_page(link.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", link, e);
                    continue;
                }
            };

            match self.extract_listing(link, &html, query.property_type) {
                Some(listing) => {
                    info!(
                        price = listing.price,
                        surface = listing.surface_totale,
                        chambres = listing.nombre_chambres,
                        "Included {}",
                        link
                    );
                    report.listings.push(listing);
                }
                None => {
                    info!("Excluded {}", link);
                    report.excluded += 1;
                }
            }
        }

        Ok((report, has_next))
    }
}
