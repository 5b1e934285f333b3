//! View models for the portal pages.
//!
//! Everything here is a pure function of a [`Catalog`](portal_catalog::Catalog)
//! snapshot, the page query and a random source. Nothing touches a DOM or
//! the network; a front end binds the resulting values to its own surface.
//!
//! # Modules
//!
//! - **links**: query parsing, same-site links with channel propagation
//! - **cards**: card view models, shuffled per-category sections
//! - **detail**: game lookup with placeholder fallback, recommendations
//! - **pages**: home, category and detail page models
//! - **monogram** / **theme**: image fallback block and legible text colour

pub mod cards;
pub mod detail;
pub mod error;
pub mod links;
pub mod monogram;
pub mod pages;
pub mod theme;

// Re-export primary types for convenience.
pub use cards::{CardView, RenderContext, Section, Sections, sections_for, shuffle};
pub use detail::{ResolvedGame, recommendations, resolve};
pub use error::RenderError;
pub use links::{LinkBuilder, PageQuery, SitePaths};
pub use pages::{MissingGamePolicy, PageOutcome, PageSettings};
