// Adapters layer: concrete implementations for external systems.

pub mod keepa;

pub use keepa::KeepaClient;
