//! Remote game catalog for the portal sites.
//!
//! A catalog is a single JSON array hosted next to the site assets. This
//! crate owns everything up to the in-memory snapshot: decoding the document
//! into an explicit [`Catalog`] envelope, the shared [`CatalogClient`] that
//! fetches it once per session, and category ordering. Rendering lives in
//! `portal-render`.
//!
//! # Modules
//!
//! - **document**: JSON array → `Catalog { metadata, entries }`
//! - **client**: de-duplicated, memoized fetch with empty-catalog fallback
//! - **categories**: section order and display names from `info{N}` metadata
//! - **downloads**: coarse numeric parsing of `"1.2K"`-style counters

pub mod categories;
pub mod client;
pub mod document;
pub mod downloads;
pub mod error;
pub mod types;

// Re-export primary types for convenience.
pub use client::{CatalogClient, CatalogSource, HttpSource};
pub use downloads::parse_downloads;
pub use error::CatalogError;
pub use types::{Catalog, CatalogEntry, CatalogMetadata};
