//! Play target availability probe.
//!
//! Before sending a visitor to an external game URL, the portal checks that
//! the URL answers. A dead target turns into an explanatory modal instead
//! of a broken page.

pub mod probe;

pub use probe::{Availability, PlayDecision, PlayProbe};
