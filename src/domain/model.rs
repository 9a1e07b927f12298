use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub type SellerId = String;

/// One seller object as returned by the data provider. No schema is assumed;
/// fields are read through [`FieldValue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellerRecord {
    fields: Map<String, Value>,
}

/// Shape of a single record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    Other(&'a Value),
    Absent,
}

impl<'a> FieldValue<'a> {
    pub fn lookup(fields: &'a Map<String, Value>, name: &str) -> Self {
        match fields.get(name) {
            None => FieldValue::Absent,
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(Value::Array(items)) => FieldValue::Sequence(items),
            Some(Value::Object(map)) => FieldValue::Mapping(map),
            Some(other) => FieldValue::Other(other),
        }
    }

    pub fn as_text(self) -> Option<&'a str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(self) -> Option<&'a [Value]> {
        match self {
            FieldValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(self) -> Option<&'a Map<String, Value>> {
        match self {
            FieldValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Non-empty text after trimming.
    pub fn as_trimmed_text(self) -> Option<&'a str> {
        self.as_text().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl SellerRecord {
    /// Only JSON objects are seller records; anything else (null, arrays,
    /// scalars) yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> FieldValue<'_> {
        FieldValue::lookup(&self.fields, name)
    }

    pub fn seller_name(&self) -> String {
        self.field("sellerName")
            .as_text()
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

/// Upper-cased country token inferred from a seller record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub const TARGETS: [&'static str; 2] = ["GB", "UK"];

    pub fn normalize(raw: &str) -> Self {
        CountryCode(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_target(&self) -> bool {
        Self::TARGETS.contains(&self.0.as_str())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRow {
    pub seller_id: SellerId,
    pub seller_name: String,
    pub established_country: String,
    pub amazon_url: String,
    pub keepa_url: String,
}

impl OutputRow {
    pub const HEADER: [&'static str; 5] = [
        "sellerId",
        "sellerName",
        "establishedCountry",
        "amazonUrl",
        "keepaUrl",
    ];
}

/// A record returned by the provider for an input identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSeller {
    pub seller_id: SellerId,
    pub record: SellerRecord,
}

/// Options forwarded to the provider with every lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    pub storefront: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub rows: Vec<OutputRow>,
    pub csv_output: String,
    pub inspected: usize,
    pub undetermined: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub matched: usize,
    pub output_path: String,
}
