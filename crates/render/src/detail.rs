//! Detail page game resolution and recommendations.

use portal_catalog::types::normalize_category;
use portal_catalog::{Catalog, CatalogEntry};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::cards::{CardView, RenderContext, icon_file_for, shuffle};

/// The game a detail page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGame {
    pub entry: CatalogEntry,
    /// The identifier as it appeared in the query, trimmed.
    pub requested: String,
    /// True when no catalog entry matched and `entry` was synthesized.
    pub placeholder: bool,
}

impl ResolvedGame {
    /// Id of the matched catalog entry; `None` for placeholders.
    pub fn catalog_id(&self) -> Option<i64> {
        (!self.placeholder).then_some(self.entry.id)
    }

    /// Identifier used in links and the play URL.
    ///
    /// Numeric identifiers are written canonically (`042` and `+42` become
    /// `42`); a non-numeric literal is kept as requested.
    pub fn target_id(&self) -> String {
        if self.placeholder && self.requested.parse::<i64>().is_err() {
            self.requested.clone()
        } else {
            self.entry.id.to_string()
        }
    }

    /// Card for the game itself, linking back to the requested identifier.
    pub fn card(&self, ctx: &RenderContext) -> CardView {
        let mut card = CardView::from_entry(&self.entry, ctx);
        card.href = ctx.links.detail(self.target_id());
        card
    }
}

/// Resolves a raw query identifier to a catalog entry.
///
/// Never fails: unknown or non-numeric identifiers yield a placeholder named
/// `Game {id}` whose icon follows the `{assetBase}/icons/{id}.jpg`
/// convention, so the page always renders.
pub fn resolve(catalog: &Catalog, raw_id: &str, ctx: &RenderContext) -> ResolvedGame {
    let requested = raw_id.trim().to_string();
    let parsed = requested.parse::<i64>().ok();

    if let Some(entry) = parsed.and_then(|id| catalog.find(id)) {
        return ResolvedGame {
            entry: entry.clone(),
            requested,
            placeholder: false,
        };
    }

    debug!(id = %requested, "game not in catalog, using placeholder");
    ResolvedGame {
        entry: placeholder_entry(parsed.unwrap_or_default(), &requested, ctx),
        requested,
        placeholder: true,
    }
}

/// Picks up to `limit` recommendation cards for the game `current_id`.
///
/// Only listable entries are considered and `current_id` is never included.
/// Pass `None` when the shown game is not a catalog entry.
/// Games of `current_category` come first, each group shuffled; when fewer
/// than `limit` exist, all of them are returned.
pub fn recommendations<R: Rng + ?Sized>(
    catalog: &Catalog,
    current_id: Option<i64>,
    current_category: &str,
    limit: usize,
    ctx: &RenderContext,
    rng: &mut R,
) -> Vec<CardView> {
    let category = normalize_category(current_category);

    let (mut same, mut other): (Vec<&CatalogEntry>, Vec<&CatalogEntry>) = catalog
        .entries
        .iter()
        .filter(|e| Some(e.id) != current_id && e.is_listable())
        .partition(|e| !category.is_empty() && e.category == category);

    shuffle(&mut same, rng);
    shuffle(&mut other, rng);

    same.into_iter()
        .chain(other)
        .take(limit)
        .map(|e| CardView::from_entry(e, ctx))
        .collect()
}

fn placeholder_entry(id: i64, literal: &str, ctx: &RenderContext) -> CatalogEntry {
    let label = match literal.parse::<i64>() {
        Ok(_) => id.to_string(),
        Err(_) if literal.is_empty() => "?".to_string(),
        Err(_) => literal.to_string(),
    };
    CatalogEntry {
        id,
        name: format!("Game {label}"),
        category: ctx.default_category.clone(),
        image: Some(icon_file_for(&label)),
        description: Some(ctx.default_description.clone()),
        rating: Some(ctx.default_rating),
        downloads: None,
    }
}
