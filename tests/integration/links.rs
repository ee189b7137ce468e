use dari_scrapers::MubawabScraper;
use url::Url;

#[test]
fn test_collects_links_from_search_results() {
    let scraper = MubawabScraper::new().unwrap();
    let html = r#"<html><body>
        <div class="listingBox" linkref="/fr/a/111/appartement-tunis">
            <h2>Appartement S+2 Tunis</h2>
        </div>
        <div class="listingBox" linkref="https://www.mubawab.tn/fr/a/222/villa-hammamet">
            <h2>Villa Hammamet</h2>
        </div>
        <div class="listingBox">
            <h2>Encart sans lien</h2>
        </div>
        <div class="otherBox" linkref="/fr/a/333/ignore"></div>
    </body></html>"#;

    let links = scraper.collect_listing_links(html).unwrap();

    assert_eq!(
        links,
        vec![
            Url::parse("https://www.mubawab.tn/fr/a/111/appartement-tunis").unwrap(),
            Url::parse("https://www.mubawab.tn/fr/a/222/villa-hammamet").unwrap(),
        ]
    );
}
