pub mod batch;
pub mod country;
pub mod etl;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod urls;

pub use crate::domain::model::{
    CountryCode, FetchedSeller, FieldValue, LookupOptions, OutputRow, RunSummary, SellerId,
    SellerRecord, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SellerLookup, Storage};
pub use crate::utils::error::Result;
