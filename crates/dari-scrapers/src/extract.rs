use dari_core::{DariError, Listing, PropertyType, Result, UNSPECIFIED};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Phrases that mark a listing as incomplete or price-hidden anywhere in the
/// page text. Matching is heuristic: only clear phrase hits reject a page.
const EXCLUSION_PHRASES: &[&str] = &[
    "en cours de construction",
    "construction en cours",
    "prix non spécifié",
    "prix non specifie",
    "prix sur demande",
    "sur demande",
    "négociation",
    "à débattre",
    "a débattre",
    "contactez-nous pour le prix",
    "prix à consulter",
];

/// Narrower sub-list checked inside price containers and the price heading.
const HIDDEN_PRICE_PHRASES: &[&str] = &["non spécifié", "sur demande", "négociation"];

/// `Etat` values that mark a listing as new or freshly renovated.
const NEW_CONDITION_TERMS: &[&str] = &["nouveau", "neuf", "rénové", "renove", "projet neuf"];

/// Labels of the key/value feature pair carrying the floor.
const FLOOR_LABELS: &[&str] = &["étage du bien", "étage", "etage", "niveau"];

/// Amenities detected by a plain keyword scan over feature elements, tag
/// elements and the description.
const AMENITY_KEYWORDS: &[&str] = &[
    "parking",
    "piscine",
    "jardin",
    "balcon",
    "terrasse",
    "ascenseur",
    "climatisation",
    "chauffage",
];

const VIEW_KEYWORDS: &[&str] = &[
    "vue panoramique",
    "vue magnifique",
    "vue exceptionnelle",
    "vue splendide",
    "vue imprenable",
    "vue dégagée",
    "vue mer",
    "vue sur mer",
    "vue plage",
    "vue sur la plage",
    "vue montagne",
    "vue sur les montagnes",
    "vue campagne",
    "vue sur la campagne",
    "vue lac",
    "vue sur le lac",
    "vue jardin",
    "vue sur le jardin",
    "vue piscine",
    "vue sur la piscine",
    "panoramique",
    "panorama",
    "vue 360",
    "vue à 360°",
];

const VIEW_ADJECTIVES: &[&str] = &[
    "magnifique",
    "exceptionnelle",
    "splendide",
    "imprenable",
    "dégagée",
];

const VIEW_SCENERY: &[&str] = &["mer", "plage", "montagne", "campagne", "lac", "jardin"];

/// One step of the floor-detection chain. Rules run in declaration order and
/// the first hit wins, so the priority is auditable in `ListingExtractor::new`.
#[derive(Debug)]
enum FloorRule {
    /// First capture group is the floor number.
    Capture(Regex),
    /// Any match means ground floor.
    Ground(Regex),
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| DariError::Scraping(e.to_string()))
}

fn parse_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| DariError::Scraping(e.to_string()))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a location heading into (gouvernorat, delegation).
///
/// `"Les Jardins à Ariana Ville"` puts the gouvernorat after the "à";
/// `"Tunis, El Omrane"` puts it before the comma; a bare name is taken as
/// the gouvernorat alone. Output is lowercased.
pub fn split_location(text: &str) -> (String, String) {
    let text = text.trim().to_lowercase();
    if text.is_empty() || text == UNSPECIFIED.to_lowercase() {
        return (UNSPECIFIED.to_string(), UNSPECIFIED.to_string());
    }

    let parts: Vec<&str> = text.split(" à ").collect();
    if parts.len() >= 2 {
        // The gouvernorat is the last segment, the delegation the first.
        return (
            parts[parts.len() - 1].trim().to_string(),
            parts[0].trim().to_string(),
        );
    }

    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() >= 2 {
        return (parts[0].trim().to_string(), parts[1].trim().to_string());
    }

    (text, UNSPECIFIED.to_string())
}

/// Per-listing attribute extractor for Mubawab detail pages.
///
/// Selectors and regexes are compiled once; `extract` is then a pure
/// function of the document and property type, safe to call concurrently
/// over independent documents.
#[derive(Debug)]
pub struct ListingExtractor {
    price_heading: Selector,
    price_container: Selector,
    location_heading: Selector,
    location_fallback_block: Selector,
    location_fallback_heading: Selector,
    details_container: Selector,
    detail_feature: Selector,
    detail_icon: Selector,
    description_block: Selector,
    paragraph: Selector,
    features_container: Selector,
    main_feature: Selector,
    feature_label: Selector,
    feature_value: Selector,
    amenity_feature: Selector,
    amenity_tag: Selector,
    integer: Regex,
    floor_rules: Vec<FloorRule>,
    ordinal: Regex,
}

impl ListingExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            price_heading: parse_selector("h3.orangeTit")?,
            price_container: parse_selector("h3, span, div")?,
            location_heading: parse_selector("h3.greyTit")?,
            location_fallback_block: parse_selector("div.blockProp.mapBlockProp")?,
            location_fallback_heading: parse_selector("h4.titBlockProp")?,
            details_container: parse_selector("div.disFlex.adDetails")?,
            detail_feature: parse_selector("div.adDetailFeature")?,
            detail_icon: parse_selector("i")?,
            description_block: parse_selector("div.blockProp")?,
            paragraph: parse_selector("p")?,
            features_container: parse_selector("div.adFeatures")?,
            main_feature: parse_selector("div.adMainFeature")?,
            feature_label: parse_selector("p.adMainFeatureContentLabel")?,
            feature_value: parse_selector("p.adMainFeatureContentValue")?,
            amenity_feature: parse_selector("div.adFeature")?,
            amenity_tag: parse_selector("p.fSize11")?,
            integer: parse_regex(r"\d+")?,
            floor_rules: vec![
                FloorRule::Capture(parse_regex(r"(\d+)(?:ᵉʳ|er|ème|étage|e étage)")?),
                FloorRule::Capture(parse_regex(r"étage\s*(\d+)")?),
                FloorRule::Capture(parse_regex(r"niveau\s*(\d+)")?),
                FloorRule::Capture(parse_regex(r"au\s*(\d+)(?:ᵉʳ|er|ème)\s*étage")?),
                FloorRule::Ground(parse_regex(r"rez[- ]de[- ]chaussée|rdc")?),
            ],
            ordinal: parse_regex(r"(\d+)(?:ᵉʳ|er|ème|e)")?,
        })
    }

    /// Extract one listing from a parsed detail page.
    ///
    /// Returns `None` when the listing is excluded: an exclusion phrase on
    /// the page, a missing price heading, a hidden-price heading text, or an
    /// under-construction `Etat` value. All other missing structure degrades
    /// to schema defaults, never to rejection.
    pub fn extract(
        &self,
        url: &Url,
        document: &Html,
        property_type: PropertyType,
    ) -> Option<Listing> {
        let page_text = document.root_element().text().collect::<String>().to_lowercase();

        if self.is_excluded(document, &page_text) {
            return None;
        }

        let mut listing = Listing::new(url.clone(), property_type);

        listing.price = self.extract_price(document)?;
        self.extract_location(document, &mut listing);
        self.extract_details(document, &mut listing);
        listing.description = self.extract_description(document);
        listing.etage = self.extract_floor(document, &listing.description, property_type);

        if !self.extract_condition(document, &mut listing) {
            debug!(url = %url, "excluding listing: under construction");
            return None;
        }

        self.extract_amenities(document, &page_text, &mut listing);

        Some(listing)
    }

    /// Cheap short-circuit run before any field extraction. False negatives
    /// are acceptable, false positives are not.
    fn is_excluded(&self, document: &Html, page_text: &str) -> bool {
        if let Some(phrase) = EXCLUSION_PHRASES.iter().find(|p| page_text.contains(*p)) {
            debug!(phrase, "excluding listing: exclusion phrase matched");
            return true;
        }

        for element in document.select(&self.price_container) {
            let is_price_class = element.value().classes().any(|class| {
                let class = class.to_lowercase();
                class.contains("price") || class.contains("prix")
            });
            if !is_price_class {
                continue;
            }

            let text = element_text(element).to_lowercase();
            if HIDDEN_PRICE_PHRASES.iter().any(|p| text.contains(p)) {
                debug!("excluding listing: hidden price container");
                return true;
            }
        }

        false
    }

    /// A missing price heading or a hidden-price text rejects the listing.
    /// A heading whose text carries no digit at all yields price 0, which is
    /// left for downstream price-threshold filtering.
    fn extract_price(&self, document: &Html) -> Option<u64> {
        let heading = document.select(&self.price_heading).next()?;
        let text = element_text(heading).replace('\u{a0}', " ");
        let lowered = text.to_lowercase();

        if HIDDEN_PRICE_PHRASES.iter().any(|p| lowered.contains(p)) {
            debug!(price = %text.trim(), "excluding listing: hidden price text");
            return None;
        }

        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        Some(digits.parse().unwrap_or(0))
    }

    fn extract_location(&self, document: &Html, listing: &mut Listing) {
        if let Some(heading) = document.select(&self.location_heading).next() {
            let text = normalize_whitespace(&element_text(heading));
            let (gouvernorat, delegation) = split_location(&text);
            listing.gouvernorat = gouvernorat;
            listing.delegation = delegation;
            return;
        }

        // Fallback: the map block heading carries a raw area name.
        let Some(block) = document.select(&self.location_fallback_block).next() else {
            return;
        };
        let Some(heading) = block.select(&self.location_fallback_heading).next() else {
            return;
        };
        let text = normalize_whitespace(&element_text(heading));
        let (gouvernorat, delegation) = split_location(&text);
        listing.area = text;
        listing.gouvernorat = gouvernorat;
        listing.delegation = delegation;
    }

    /// Surface, bedroom and bathroom counts from the details strip. Each
    /// feature is classified by its icon class or by a textual keyword; the
    /// first integer token in its text is the value.
    fn extract_details(&self, document: &Html, listing: &mut Listing) {
        let Some(container) = document.select(&self.details_container).next() else {
            return;
        };

        for detail in container.select(&self.detail_feature) {
            let text = normalize_whitespace(&element_text(detail));
            let icon_classes = detail
                .select(&self.detail_icon)
                .next()
                .map(|icon| icon.value().classes().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();

            if icon_classes.contains("icon-triangle") || text.contains("m²") {
                if let Some(value) = self.first_integer(&text) {
                    listing.surface_totale = value;
                }
            } else if icon_classes.contains("icon-bed") || text.contains("Chambres") {
                if let Some(value) = self.first_integer(&text) {
                    listing.nombre_chambres = value;
                }
            } else if icon_classes.contains("icon-bath") || text.contains("Salle de bain") {
                if let Some(value) = self.first_integer(&text) {
                    listing.nombre_salle_bain = value;
                }
            }
        }
    }

    /// The description is the paragraph whose immediate parent is the
    /// description block, which guards against unrelated nested paragraphs.
    fn extract_description(&self, document: &Html) -> String {
        let Some(block) = document.select(&self.description_block).next() else {
            return String::new();
        };

        for paragraph in block.select(&self.paragraph) {
            let parent_is_block = paragraph
                .parent()
                .and_then(ElementRef::wrap)
                .map(|parent| parent.value().classes().any(|class| class == "blockProp"))
                .unwrap_or(false);
            if parent_is_block {
                return element_text(paragraph).trim().to_string();
            }
        }

        String::new()
    }

    /// Floor detection. Houses are always ground floor. For apartments a
    /// labeled feature pair wins over description patterns, which win over
    /// the ordinal-in-context heuristic; `None` means undetectable, which
    /// callers must not conflate with ground floor.
    fn extract_floor(
        &self,
        document: &Html,
        description: &str,
        property_type: PropertyType,
    ) -> Option<u32> {
        if property_type == PropertyType::House {
            return Some(0);
        }

        if let Some(floor) = self.floor_from_features(document) {
            return Some(floor);
        }

        if description.is_empty() {
            return None;
        }
        let text = description.to_lowercase();

        for rule in &self.floor_rules {
            match rule {
                FloorRule::Capture(pattern) => {
                    if let Some(captures) = pattern.captures(&text) {
                        if let Ok(floor) = captures[1].parse() {
                            return Some(floor);
                        }
                    }
                }
                FloorRule::Ground(pattern) => {
                    if pattern.is_match(&text) {
                        return Some(0);
                    }
                }
            }
        }

        self.floor_from_ordinal(&text)
    }

    fn floor_from_features(&self, document: &Html) -> Option<u32> {
        let container = document.select(&self.features_container).next()?;

        for feature in container.select(&self.main_feature) {
            let label = feature.select(&self.feature_label).next();
            let value = feature.select(&self.feature_value).next();
            let (Some(label), Some(value)) = (label, value) else {
                continue;
            };

            let label = element_text(label).trim().to_lowercase();
            if !FLOOR_LABELS.contains(&label.as_str()) {
                continue;
            }

            let value = element_text(value).trim().to_string();
            if let Some(floor) = self.first_integer(&value) {
                return Some(floor);
            }
            let value = value.to_lowercase();
            if value.contains("rez") || value.contains("rdc") {
                return Some(0);
            }
        }

        None
    }

    /// Last-resort heuristic: a bare ordinal is taken as the floor when the
    /// word "étage" or "niveau" sits within a few characters of it.
    fn floor_from_ordinal(&self, text: &str) -> Option<u32> {
        let captures = self.ordinal.captures(text)?;
        let matched = captures.get(0)?;

        let mut start = matched.start().saturating_sub(10);
        while !text.is_char_boundary(start) {
            start -= 1;
        }
        let mut end = (matched.end() + 10).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }

        let context = &text[start..end];
        if context.contains("étage") || context.contains("niveau") {
            captures.get(1)?.as_str().parse().ok()
        } else {
            None
        }
    }

    /// `Etat` and `Standing` key/value pairs. Returns false when the listing
    /// must be rejected as under construction.
    fn extract_condition(&self, document: &Html, listing: &mut Listing) -> bool {
        let Some(container) = document.select(&self.features_container).next() else {
            return true;
        };

        for feature in container.select(&self.main_feature) {
            let label = feature.select(&self.feature_label).next();
            let value = feature.select(&self.feature_value).next();
            let (Some(label), Some(value)) = (label, value) else {
                continue;
            };

            let label = element_text(label).trim().to_string();
            let value = element_text(value).trim().to_lowercase();

            match label.as_str() {
                "Etat" => {
                    if value.contains("construction") {
                        return false;
                    }
                    if NEW_CONDITION_TERMS.contains(&value.as_str()) {
                        listing.neuf = true;
                    }
                }
                "Standing" => {
                    if value.contains("haut") || value.contains("standing") {
                        listing.haut_standing = true;
                    }
                }
                _ => {}
            }
        }

        true
    }

    /// Amenity flags with union semantics: a keyword hit in any source sets
    /// the flag and nothing unsets it. Sources are the dedicated feature
    /// elements, the small-text amenity tags, and the description.
    fn extract_amenities(&self, document: &Html, page_text: &str, listing: &mut Listing) {
        let mut sources: Vec<String> = Vec::new();
        for container in document.select(&self.features_container) {
            for feature in container.select(&self.amenity_feature) {
                sources.push(element_text(feature).to_lowercase());
            }
        }
        for tag in document.select(&self.amenity_tag) {
            sources.push(element_text(tag).to_lowercase());
        }
        sources.push(listing.description.to_lowercase());

        let found = |keyword: &str| sources.iter().any(|text| text.contains(keyword));

        listing.parking = found(AMENITY_KEYWORDS[0]);
        listing.piscine = found(AMENITY_KEYWORDS[1]);
        listing.jardin = found(AMENITY_KEYWORDS[2]);
        listing.balcon = found(AMENITY_KEYWORDS[3]);
        listing.terrasse = found(AMENITY_KEYWORDS[4]);
        listing.ascenseur = found(AMENITY_KEYWORDS[5]);
        listing.climatisation = found(AMENITY_KEYWORDS[6]);
        listing.chauffage = found(AMENITY_KEYWORDS[7]);

        listing.vue_panoramique = self.detect_panoramic_view(page_text);
    }

    /// Panoramic view uses the extended keyword list over the whole page
    /// text, then a looser co-occurrence check of "vue" with a strong
    /// adjective or a scenic noun.
    fn detect_panoramic_view(&self, page_text: &str) -> bool {
        if VIEW_KEYWORDS.iter().any(|k| page_text.contains(k)) {
            return true;
        }

        page_text.contains("vue")
            && (VIEW_ADJECTIVES.iter().any(|w| page_text.contains(w))
                || VIEW_SCENERY.iter().any(|w| page_text.contains(w)))
    }

    fn first_integer(&self, text: &str) -> Option<u32> {
        self.integer.find(text)?.as_str().parse().ok()
    }
}
