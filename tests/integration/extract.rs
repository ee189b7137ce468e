use dari_core::{PropertyType, UNSPECIFIED};
use dari_scrapers::ListingExtractor;
use scraper::Html;
use url::Url;

pub fn detail_page() -> String {
    r#"<html><body>
        <h3 class="orangeTit">1&nbsp;250&nbsp;000 TND</h3>
        <h3 class="greyTit">Les Jardins à Ariana Ville</h3>
        <div class="disFlex adDetails">
            <div class="adDetailFeature"><i class="icon icon-triangle"></i><span>180 m²</span></div>
            <div class="adDetailFeature"><i class="icon icon-bed"></i><span>4 Chambres</span></div>
            <div class="adDetailFeature"><i class="icon icon-bath"></i><span>2 Salles de bain</span></div>
        </div>
        <div class="adFeatures">
            <div class="adMainFeature"><div class="adMainFeatureContent">
                <p class="adMainFeatureContentLabel">Etat</p>
                <p class="adMainFeatureContentValue">Neuf</p>
            </div></div>
            <div class="adMainFeature"><div class="adMainFeatureContent">
                <p class="adMainFeatureContentLabel">Standing</p>
                <p class="adMainFeatureContentValue">Haut standing</p>
            </div></div>
            <div class="adMainFeature"><div class="adMainFeatureContent">
                <p class="adMainFeatureContentLabel">Étage du bien</p>
                <p class="adMainFeatureContentValue">3ème</p>
            </div></div>
            <div class="adFeature"><span>Ascenseur</span></div>
            <div class="adFeature"><span>Parking</span></div>
        </div>
        <p class="fSize11">Climatisation</p>
        <div class="blockProp">
            <p>Appartement haut standing avec terrasse et vue mer, proche des commodités.</p>
        </div>
    </body></html>"#
        .to_string()
}

pub fn listing_url() -> Url {
    Url::parse("https://www.mubawab.tn/fr/a/7654321/appartement-ariana").unwrap()
}

#[test]
fn test_full_detail_page_extraction() {
    let extractor = ListingExtractor::new().unwrap();
    let document = Html::parse_document(&detail_page());

    let listing = extractor
        .extract(&listing_url(), &document, PropertyType::Apartment)
        .unwrap();

    assert_eq!(listing.property_type, PropertyType::Apartment);
    assert_eq!(listing.price, 1_250_000);
    assert_eq!(listing.surface_totale, 180);
    assert_eq!(listing.nombre_chambres, 4);
    assert_eq!(listing.nombre_salle_bain, 2);
    assert_eq!(listing.etage, Some(3));
    assert_eq!(listing.gouvernorat, "ariana ville");
    assert_eq!(listing.delegation, "les jardins");
    assert_eq!(listing.area, UNSPECIFIED);
    assert_eq!(
        listing.description,
        "Appartement haut standing avec terrasse et vue mer, proche des commodités."
    );

    assert!(listing.neuf);
    assert!(listing.haut_standing);
    assert!(listing.ascenseur);
    assert!(listing.parking);
    assert!(listing.climatisation);
    assert!(listing.terrasse);
    assert!(listing.vue_panoramique);

    assert!(!listing.piscine);
    assert!(!listing.jardin);
    assert!(!listing.balcon);
    assert!(!listing.chauffage);
}

#[test]
fn test_full_detail_page_as_house_forces_ground_floor() {
    let extractor = ListingExtractor::new().unwrap();
    let document = Html::parse_document(&detail_page());

    let listing = extractor
        .extract(&listing_url(), &document, PropertyType::House)
        .unwrap();

    assert_eq!(listing.property_type, PropertyType::House);
    assert_eq!(listing.etage, Some(0));
}

#[test]
fn test_exclusion_phrase_rejects_full_page() {
    let extractor = ListingExtractor::new().unwrap();
    let page = detail_page().replace(
        "proche des commodités",
        "proche des commodités, prix à débattre",
    );
    let document = Html::parse_document(&page);

    assert!(extractor
        .extract(&listing_url(), &document, PropertyType::Apartment)
        .is_none());
}

#[test]
fn test_extraction_is_pure_across_calls() {
    let extractor = ListingExtractor::new().unwrap();
    let document = Html::parse_document(&detail_page());

    let first = extractor.extract(&listing_url(), &document, PropertyType::Apartment);
    let second = extractor.extract(&listing_url(), &document, PropertyType::Apartment);

    assert_eq!(first, second);
}
