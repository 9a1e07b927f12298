// Best-effort country of establishment for a seller record.
//
// Provider data is loosely shaped, so inference walks a fixed list of
// candidate fields and stops at the first one that yields a value:
//
// 1. direct fields (`establishedCountry`, `countryCode`, `country`)
// 2. address-like fields, as a list of lines or a comma separated string
// 3. the nested `extra` mapping (`country`, `countryCode`, `establishedCountry`)

use crate::domain::model::{CountryCode, FieldValue, SellerRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const DIRECT_FIELDS: [&str; 3] = ["establishedCountry", "countryCode", "country"];

pub const ADDRESS_FIELDS: [&str; 5] = [
    "businessAddress",
    "registrationAddress",
    "address",
    "storefrontAddress",
    "sellerAddress",
];

// Order differs from DIRECT_FIELDS.
pub const EXTRA_FIELDS: [&str; 3] = ["country", "countryCode", "establishedCountry"];

static UK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(United\s+Kingdom|Great\s+Britain|\bUK\b|\bGB\b)")
        .expect("UK pattern is a valid regex")
});

pub fn infer_country(record: &SellerRecord) -> Option<CountryCode> {
    from_direct_fields(record)
        .or_else(|| from_address_fields(record))
        .or_else(|| from_extra(record))
}

/// True when `text` names the United Kingdom anywhere, as a phrase or as a
/// standalone `UK`/`GB` token.
pub fn mentions_uk(text: &str) -> bool {
    UK_PATTERN.is_match(text)
}

fn from_direct_fields(record: &SellerRecord) -> Option<CountryCode> {
    DIRECT_FIELDS
        .iter()
        .find_map(|name| record.field(name).as_trimmed_text())
        .map(CountryCode::normalize)
}

fn from_address_fields(record: &SellerRecord) -> Option<CountryCode> {
    ADDRESS_FIELDS.iter().find_map(|name| match record.field(name) {
        FieldValue::Sequence(lines) => from_address_lines(lines),
        FieldValue::Text(text) => from_address_text(text),
        _ => None,
    })
}

fn from_address_lines(lines: &[Value]) -> Option<CountryCode> {
    let last = match lines.last()? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if is_two_letter_code(&last) {
        Some(CountryCode::normalize(&last))
    } else if mentions_uk(&last) {
        Some(CountryCode::normalize("GB"))
    } else {
        None
    }
}

fn from_address_text(text: &str) -> Option<CountryCode> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // rsplit always yields at least one segment
    let tail = trimmed.rsplit(',').next().unwrap_or(trimmed).trim();
    if is_two_letter_code(tail) {
        Some(CountryCode::normalize(tail))
    } else if mentions_uk(text) {
        Some(CountryCode::normalize("GB"))
    } else {
        None
    }
}

fn from_extra(record: &SellerRecord) -> Option<CountryCode> {
    let extra = record.field("extra").as_mapping()?;
    EXTRA_FIELDS
        .iter()
        .find_map(|name| FieldValue::lookup(extra, name).as_trimmed_text())
        .map(CountryCode::normalize)
}

fn is_two_letter_code(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic())
}
