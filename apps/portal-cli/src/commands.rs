//! Page rendering for the CLI subcommands.

use portal_catalog::Catalog;
use portal_launch::{PlayDecision, PlayProbe};
use portal_render::links::play_url;
use portal_render::pages::{self, PageOutcome};
use portal_render::{PageQuery, theme};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::config::PortalConfig;

/// Pages backed by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Category,
    Detail,
}

/// Renders `page` for `query` into its JSON model.
pub fn render_page<R: Rng + ?Sized>(
    page: Page,
    catalog: &Catalog,
    query: &PageQuery,
    config: &PortalConfig,
    rng: &mut R,
) -> serde_json::Result<Value> {
    let settings = config.page_settings();
    let ctx = config.render_context(query);

    match page {
        Page::Home => serde_json::to_value(PageOutcome::Render(pages::home_page(
            catalog, &settings, &ctx, rng,
        ))),
        Page::Category => {
            serde_json::to_value(pages::category_page(catalog, query, &settings, &ctx))
        }
        Page::Detail => {
            serde_json::to_value(pages::detail_page(catalog, query, &settings, &ctx, rng))
        }
    }
}

/// Decides where the play button of the queried game leads.
///
/// Without a numeric id the visitor goes home. The target is probed only
/// when the configuration asks for it.
pub async fn play(
    query: &PageQuery,
    config: &PortalConfig,
) -> anyhow::Result<PageOutcome<PlayDecision>> {
    let ctx = config.render_context(query);
    let Some(id) = query.id.as_deref().and_then(|raw| raw.trim().parse::<i64>().ok()) else {
        tracing::debug!(id = ?query.id, "no playable game id, redirecting home");
        return Ok(PageOutcome::Redirect(ctx.links.home()));
    };

    let url = play_url(&config.play_url_template, &ctx.asset_base, id);
    let decision = if config.probe_play_target {
        PlayProbe::new()?.decide(&url).await
    } else {
        PlayDecision::Navigate { url }
    };
    Ok(PageOutcome::Render(decision))
}

/// Text colour picked for a background.
#[derive(Debug, Serialize)]
pub struct Contrast {
    pub background: String,
    pub foreground: String,
}

pub fn contrast(background: &str) -> anyhow::Result<Contrast> {
    let parsed = theme::Rgb::parse_hex(background)?;
    Ok(Contrast {
        background: parsed.to_string(),
        foreground: theme::contrast_text(parsed).to_string(),
    })
}
