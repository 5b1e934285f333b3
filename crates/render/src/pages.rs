//! Page models for the home, category and detail pages.
//!
//! Each function takes the loaded catalog and the page query and returns a
//! serializable model, or a redirect when the query cannot be served.

use std::collections::HashMap;

use portal_catalog::Catalog;
use portal_catalog::categories::{self, DEFAULT_CATEGORY_ORDER};
use portal_catalog::types::normalize_category;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::{self, CardView, RenderContext};
use crate::detail;
use crate::links::{DEFAULT_PLAY_URL_TEMPLATE, PageQuery, play_url};

/// What a detail page does for an id the catalog does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingGamePolicy {
    /// Render a synthesized `Game {id}` entry.
    #[default]
    Placeholder,
    /// Send the visitor back to the home page.
    RedirectHome,
}

/// Per-deployment page tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// Metadata field holding the section order (e.g. `info2`).
    pub info_key: String,
    /// Section order when the catalog carries none.
    pub default_categories: Vec<String>,
    pub per_category_limit: usize,
    pub carousel_limit: usize,
    pub popular_limit: usize,
    pub recommendation_limit: usize,
    pub play_url_template: String,
    pub missing_game_policy: MissingGamePolicy,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            info_key: "info2".into(),
            default_categories: DEFAULT_CATEGORY_ORDER
                .iter()
                .map(|k| k.to_string())
                .collect(),
            per_category_limit: 8,
            carousel_limit: 5,
            popular_limit: 10,
            recommendation_limit: 8,
            play_url_template: DEFAULT_PLAY_URL_TEMPLATE.into(),
            missing_game_policy: MissingGamePolicy::Placeholder,
        }
    }
}

/// Either a page to render or a place to go instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "page", rename_all = "camelCase")]
pub enum PageOutcome<T> {
    Render(T),
    Redirect(String),
}

/// A category menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLink {
    pub key: String,
    pub title: String,
    pub href: String,
}

/// One titled section of the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub category: CategoryLink,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePage {
    pub menu: Vec<CategoryLink>,
    pub carousel: Vec<CardView>,
    pub popular: Vec<CardView>,
    /// Non-empty sections in menu order.
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPage {
    pub menu: Vec<CategoryLink>,
    pub category: CategoryLink,
    pub games: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPage {
    pub menu: Vec<CategoryLink>,
    pub game: CardView,
    pub description: String,
    pub category: CategoryLink,
    /// External URL that launches the game.
    pub play_url: String,
    pub placeholder: bool,
    pub recommendations: Vec<CardView>,
}

/// Builds the home page: menu, carousel, popular strip and sections.
pub fn home_page<R: Rng + ?Sized>(
    catalog: &Catalog,
    settings: &PageSettings,
    ctx: &RenderContext,
    rng: &mut R,
) -> HomePage {
    let order = category_order(catalog, settings);
    let names = categories::display_names(catalog, &settings.info_key);
    let sections = cards::sections_for(catalog, &order, settings.per_category_limit, ctx, rng);

    HomePage {
        menu: menu(&order, &names, ctx),
        carousel: cards::carousel(catalog, settings.carousel_limit, ctx, rng),
        popular: cards::popular(catalog, settings.popular_limit, ctx),
        sections: sections
            .into_iter()
            .filter(|s| !s.cards.is_empty())
            .map(|s| SectionView {
                category: category_link(&s.key, &names, ctx),
                cards: s.cards,
            })
            .collect(),
    }
}

/// Builds a category page, or redirects home when no category was given.
pub fn category_page(
    catalog: &Catalog,
    query: &PageQuery,
    settings: &PageSettings,
    ctx: &RenderContext,
) -> PageOutcome<CategoryPage> {
    let Some(key) = query.category.as_deref().map(normalize_category) else {
        debug!("category page without category, redirecting home");
        return PageOutcome::Redirect(ctx.links.home());
    };

    let order = category_order(catalog, settings);
    let names = categories::display_names(catalog, &settings.info_key);

    PageOutcome::Render(CategoryPage {
        menu: menu(&order, &names, ctx),
        games: cards::category_listing(catalog, &key, ctx),
        category: category_link(&key, &names, ctx),
    })
}

/// Builds a detail page.
///
/// A missing id redirects home. An unknown id renders a placeholder or
/// redirects, per [`MissingGamePolicy`].
pub fn detail_page<R: Rng + ?Sized>(
    catalog: &Catalog,
    query: &PageQuery,
    settings: &PageSettings,
    ctx: &RenderContext,
    rng: &mut R,
) -> PageOutcome<DetailPage> {
    let Some(raw_id) = query.id.as_deref() else {
        debug!("detail page without id, redirecting home");
        return PageOutcome::Redirect(ctx.links.home());
    };

    let resolved = detail::resolve(catalog, raw_id, ctx);
    if resolved.placeholder && settings.missing_game_policy == MissingGamePolicy::RedirectHome {
        debug!(id = %resolved.requested, "unknown game, redirecting home");
        return PageOutcome::Redirect(ctx.links.home());
    }

    let order = category_order(catalog, settings);
    let names = categories::display_names(catalog, &settings.info_key);
    let entry = &resolved.entry;

    PageOutcome::Render(DetailPage {
        menu: menu(&order, &names, ctx),
        game: resolved.card(ctx),
        description: entry
            .description
            .clone()
            .unwrap_or_else(|| ctx.default_description.clone()),
        category: category_link(&entry.category, &names, ctx),
        play_url: play_url(
            &settings.play_url_template,
            &ctx.asset_base,
            resolved.target_id(),
        ),
        placeholder: resolved.placeholder,
        recommendations: detail::recommendations(
            catalog,
            resolved.catalog_id(),
            &entry.category,
            settings.recommendation_limit,
            ctx,
            rng,
        ),
    })
}

fn category_order(catalog: &Catalog, settings: &PageSettings) -> Vec<String> {
    categories::order_or(catalog, &settings.info_key, &settings.default_categories)
}

fn menu(
    order: &[String],
    names: &HashMap<String, String>,
    ctx: &RenderContext,
) -> Vec<CategoryLink> {
    order.iter().map(|key| category_link(key, names, ctx)).collect()
}

fn category_link(
    key: &str,
    names: &HashMap<String, String>,
    ctx: &RenderContext,
) -> CategoryLink {
    CategoryLink {
        key: key.to_string(),
        title: categories::display_name(names, key),
        href: ctx.links.category(key),
    }
}
