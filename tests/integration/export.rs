use dari_core::{read_csv, write_csv, write_json, PropertyType};
use dari_scrapers::ListingExtractor;
use scraper::Html;
use std::fs;
use tempfile::tempdir;

use crate::extract::{detail_page, listing_url};

#[test]
fn test_extracted_listing_round_trips_through_csv() {
    let extractor = ListingExtractor::new().unwrap();
    let document = Html::parse_document(&detail_page());
    let listing = extractor
        .extract(&listing_url(), &document, PropertyType::Apartment)
        .unwrap();

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("listings.csv");
    write_csv(&path, std::slice::from_ref(&listing)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("type,price,surface_totale"));
    assert!(content.contains("ariana ville"));
    assert!(content.contains("1250000"));

    let read_back = read_csv(&path).unwrap();
    assert_eq!(read_back, vec![listing]);
}

#[test]
fn test_json_export_keeps_flag_encoding() {
    let extractor = ListingExtractor::new().unwrap();
    let document = Html::parse_document(&detail_page());
    let listing = extractor
        .extract(&listing_url(), &document, PropertyType::Apartment)
        .unwrap();

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("listings.json");
    write_json(&path, std::slice::from_ref(&listing)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed[0]["type"], 1);
    assert_eq!(parsed[0]["ascenseur"], 1);
    assert_eq!(parsed[0]["piscine"], 0);
    assert_eq!(parsed[0]["etage"], 3);
}

#[test]
fn test_empty_export_creates_readable_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("empty.csv");

    write_csv(&path, &[]).unwrap();

    assert!(path.exists());
    let read_back = read_csv(&path).unwrap();
    assert!(read_back.is_empty());
}
