//! Listing extraction for imovelweb.com.br pages.
//!
//! Everything that depends on the site's markup lives here: the icon class
//! table, the price labels and the CSS selectors. When the site changes its
//! HTML, this is the file to touch.

use crate::models::ListingRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Record field fed by a feature icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureField {
    TotalArea,
    UsableArea,
    Bathrooms,
    ParkingSpaces,
    Bedrooms,
    EnSuiteBathrooms,
}

impl FeatureField {
    fn slot(self, record: &mut ListingRecord) -> &mut Option<u64> {
        match self {
            FeatureField::TotalArea => &mut record.total_area,
            FeatureField::UsableArea => &mut record.usable_area,
            FeatureField::Bathrooms => &mut record.bathrooms,
            FeatureField::ParkingSpaces => &mut record.parking_spaces,
            FeatureField::Bedrooms => &mut record.bedrooms,
            FeatureField::EnSuiteBathrooms => &mut record.en_suite_bathrooms,
        }
    }
}

/// Icon class on a feature item -> field it fills.
///
/// The classes are the site's names for the total-area, covered-area,
/// bathroom, parking, bedroom and toilet icons.
pub const FEATURE_FIELDS: &[(&str, FeatureField)] = &[
    ("icon-stotal", FeatureField::TotalArea),
    ("icon-scubierta", FeatureField::UsableArea),
    ("icon-bano", FeatureField::Bathrooms),
    ("icon-cochera", FeatureField::ParkingSpaces),
    ("icon-dormitorio", FeatureField::Bedrooms),
    ("icon-toilete", FeatureField::EnSuiteBathrooms),
];

/// Label patterns inside the price block
pub const RENT_LABEL: &str = "Aluguel";
pub const CONDO_FEE_LABEL: &str = "Condo";
pub const IPTU_LABEL: &str = "IPTU";

const LISTING_ID_PATTERN: &str = r"([0-9]+)\.html";
const NUMBER_PATTERN: &str = r"[0-9]+";
const THOUSANDS_SEPARATOR: char = '.';

const RESULT_CARD_SELECTOR: &str = "div[data-to-posting]";
const RESULT_CARD_ATTR: &str = "data-to-posting";
const NEXT_PAGE_SELECTOR: &str = r#"a[aria-label="Siguiente página"]"#;
const FEATURE_SELECTOR: &str = "li.icon-feature";
const FEATURE_ICON_SELECTOR: &str = "i";
const PRICE_BLOCK_SELECTOR: &str = "div.block-price-container";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no numeric listing id in url: {0}")]
    MissingListingId(String),
    #[error("price block not found")]
    MissingPriceBlock,
    #[error("rent not found in price block")]
    MissingRent,
    #[error("number out of range: {0}")]
    InvalidNumber(String),
    #[error("invalid pattern: {0}")]
    Pattern(String),
}

/// Parses imovelweb results pages and listing pages
pub struct ImovelwebExtractor {
    listing_id: Regex,
    number: Regex,
    rent_label: Regex,
    condo_fee_label: Regex,
    iptu_label: Regex,
    result_card: Selector,
    next_page: Selector,
    feature: Selector,
    feature_icon: Selector,
    price_block: Selector,
}

impl ImovelwebExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            listing_id: regex(LISTING_ID_PATTERN)?,
            number: regex(NUMBER_PATTERN)?,
            rent_label: regex(RENT_LABEL)?,
            condo_fee_label: regex(CONDO_FEE_LABEL)?,
            iptu_label: regex(IPTU_LABEL)?,
            result_card: selector(RESULT_CARD_SELECTOR)?,
            next_page: selector(NEXT_PAGE_SELECTOR)?,
            feature: selector(FEATURE_SELECTOR)?,
            feature_icon: selector(FEATURE_ICON_SELECTOR)?,
            price_block: selector(PRICE_BLOCK_SELECTOR)?,
        })
    }

    /// Detail-page paths on a results page, in page order, without repeats
    pub fn detail_paths(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        document
            .select(&self.result_card)
            .filter_map(|card| card.value().attr(RESULT_CARD_ATTR))
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .filter(|path| seen.insert(path.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Whether a results page links to a following page
    pub fn has_next_page(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        document.select(&self.next_page).next().is_some()
    }

    /// Listing id: the digits right before `.html` in the detail URL
    pub fn listing_id(&self, url: &str) -> Result<u64, ExtractError> {
        let digits = self
            .listing_id
            .captures_iter(url)
            .last()
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| ExtractError::MissingListingId(url.to_string()))?;

        digits
            .as_str()
            .parse()
            .map_err(|_| ExtractError::InvalidNumber(digits.as_str().to_string()))
    }

    /// Parse a listing page.
    ///
    /// Returns `Ok(None)` without looking at the page when the id is in `seen`.
    pub fn extract(
        &self,
        html: &str,
        url: &str,
        seen: &HashSet<u64>,
    ) -> Result<Option<ListingRecord>, ExtractError> {
        let id = self.listing_id(url)?;
        if seen.contains(&id) {
            debug!("Listing {} already seen", id);
            return Ok(None);
        }

        let document = Html::parse_document(html);
        let mut record = ListingRecord::new(id, url, 0);

        self.read_features(&document, &mut record)?;
        self.read_prices(&document, &mut record)?;

        Ok(Some(record))
    }

    fn read_features(&self, document: &Html, record: &mut ListingRecord) -> Result<(), ExtractError> {
        for item in document.select(&self.feature) {
            let Some(field) = item
                .select(&self.feature_icon)
                .next()
                .and_then(feature_field)
            else {
                continue;
            };

            let text = item.text().collect::<String>();
            match self.first_number(&text)? {
                Some(value) => *field.slot(record) = Some(value),
                None => debug!("Feature {:?} has no value: {:?}", field, text.trim()),
            }
        }

        Ok(())
    }

    fn read_prices(&self, document: &Html, record: &mut ListingRecord) -> Result<(), ExtractError> {
        let block = document
            .select(&self.price_block)
            .next()
            .ok_or(ExtractError::MissingPriceBlock)?;

        let rent_element = block
            .children()
            .filter_map(ElementRef::wrap)
            .find(|element| self.rent_label.is_match(&element_text(element)))
            .ok_or(ExtractError::MissingRent)?;

        record.rent = self
            .first_number(&element_text(&rent_element))?
            .ok_or(ExtractError::MissingRent)?;

        // Fee rows sit either inside the rent element or after it
        let fee_rows = rent_element
            .children()
            .chain(rent_element.next_siblings())
            .filter_map(ElementRef::wrap);

        for row in fee_rows {
            let text = element_text(&row);
            if self.condo_fee_label.is_match(&text) {
                if let Some(value) = self.first_number(&text)? {
                    record.condo_fee = Some(value);
                }
            } else if self.iptu_label.is_match(&text) {
                if let Some(value) = self.first_number(&text)? {
                    record.iptu = Some(value);
                }
            }
        }

        Ok(())
    }

    /// First run of digits, ignoring thousands separators
    fn first_number(&self, text: &str) -> Result<Option<u64>, ExtractError> {
        let cleaned = text.replace(THOUSANDS_SEPARATOR, "");
        match self.number.find(&cleaned) {
            Some(digits) => digits
                .as_str()
                .parse()
                .map(Some)
                .map_err(|_| ExtractError::InvalidNumber(digits.as_str().to_string())),
            None => Ok(None),
        }
    }
}

fn feature_field(icon: ElementRef<'_>) -> Option<FeatureField> {
    icon.value().classes().find_map(|class| {
        FEATURE_FIELDS
            .iter()
            .find(|(tag, _)| *tag == class)
            .map(|(_, field)| *field)
    })
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn regex(pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|e| ExtractError::Pattern(e.to_string()))
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Pattern(format!("{css}: {e}")))
}
