use crate::core::country::infer_country;
use crate::core::urls::{amazon_seller_url, keepa_seller_url};
use crate::core::{CountryCode, FetchedSeller, OutputRow};

/// Output row for a seller established in the UK, `None` for everyone else
/// (including sellers whose country cannot be determined).
pub fn build_output_row(seller: &FetchedSeller, domain: &str) -> Option<OutputRow> {
    infer_country(&seller.record)
        .filter(CountryCode::is_target)
        .map(|country| output_row(seller, &country, domain))
}

pub fn output_row(seller: &FetchedSeller, country: &CountryCode, domain: &str) -> OutputRow {
    OutputRow {
        seller_id: seller.seller_id.clone(),
        seller_name: seller.record.seller_name(),
        established_country: country.to_string(),
        amazon_url: amazon_seller_url(&seller.seller_id, domain),
        keepa_url: keepa_seller_url(&seller.seller_id, domain),
    }
}
