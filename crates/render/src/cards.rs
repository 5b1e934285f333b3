//! Game card view models and per-category sections.

use std::cmp::Reverse;

use portal_catalog::document::MAX_RATING;
use portal_catalog::types::normalize_category;
use portal_catalog::{Catalog, CatalogEntry, parse_downloads};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::links::{LinkBuilder, encode};
use crate::monogram::{Monogram, monogram};

/// Rating shown for games without one.
pub const DEFAULT_RATING: u8 = 5;

/// Description shown for games without one.
pub const DEFAULT_DESCRIPTION: &str = "Jump in and play instantly in your browser.";

/// Category given to placeholder games.
pub const DEFAULT_CATEGORY: &str = "action";

const STAR: char = '★';

/// Deployment values every card needs.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Asset origin, without trailing slash.
    pub asset_base: String,
    pub links: LinkBuilder,
    pub default_rating: u8,
    pub default_description: String,
    pub default_category: String,
}

impl RenderContext {
    pub fn new(asset_base: &str, links: LinkBuilder) -> Self {
        Self {
            asset_base: asset_base.trim_end_matches('/').to_string(),
            links,
            default_rating: DEFAULT_RATING,
            default_description: DEFAULT_DESCRIPTION.into(),
            default_category: DEFAULT_CATEGORY.into(),
        }
    }

    /// Resolves an entry's icon to a full URL.
    ///
    /// Absolute URLs pass through. Bare filenames live under
    /// `{assetBase}/icons/`, with `.jpg` assumed when no extension is given.
    /// Entries without an image use `{assetBase}/icons/{id}.jpg`.
    pub fn image_url(&self, entry: &CatalogEntry) -> String {
        match entry.image.as_deref().map(str::trim) {
            Some(img) if is_absolute(img) => img.to_string(),
            Some(img) if !img.is_empty() => {
                let file = img.trim_start_matches('/');
                let file = file.strip_prefix("icons/").unwrap_or(file);
                if has_extension(file) {
                    format!("{}/icons/{file}", self.asset_base)
                } else {
                    format!("{}/icons/{file}.jpg", self.asset_base)
                }
            }
            _ => format!("{}/icons/{}.jpg", self.asset_base, entry.id),
        }
    }
}

/// A render-ready game card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub image_url: String,
    /// Shown in place of the image when it fails to load.
    pub fallback: Monogram,
    pub rating: u8,
    pub stars: String,
    pub downloads: Option<String>,
    /// Detail page link, channel included.
    pub href: String,
}

impl CardView {
    pub fn from_entry(entry: &CatalogEntry, ctx: &RenderContext) -> Self {
        let rating = entry.rating.unwrap_or(ctx.default_rating).min(MAX_RATING);
        Self {
            id: entry.id,
            title: entry.name.clone(),
            category: entry.category.clone(),
            image_url: ctx.image_url(entry),
            fallback: monogram(&entry.name),
            rating,
            stars: stars(rating),
            downloads: entry.downloads.clone(),
            href: ctx.links.detail(entry.id),
        }
    }
}

/// Cards of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub key: String,
    pub cards: Vec<CardView>,
}

/// Ordered mapping from category key to its cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sections(Vec<Section>);

impl Sections {
    /// Returns the cards for `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&[CardView]> {
        let key = normalize_category(key);
        self.0
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.cards.as_slice())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Section> {
        self.0
    }
}

impl IntoIterator for Sections {
    type Item = Section;
    type IntoIter = std::vec::IntoIter<Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Shuffles `items` in place with a uniform Fisher–Yates pass.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Builds one shuffled section per category key.
///
/// Each section holds at most `per_category_limit` cards drawn from the
/// entries whose category matches the key. Keys repeat at most once.
pub fn sections_for<R: Rng + ?Sized>(
    catalog: &Catalog,
    categories: &[String],
    per_category_limit: usize,
    ctx: &RenderContext,
    rng: &mut R,
) -> Sections {
    let mut sections: Vec<Section> = Vec::with_capacity(categories.len());

    for key in categories {
        let key = normalize_category(key);
        if key.is_empty() || sections.iter().any(|s| s.key == key) {
            continue;
        }

        let mut matching: Vec<&CatalogEntry> = catalog.in_category(&key).collect();
        shuffle(&mut matching, rng);
        matching.truncate(per_category_limit);

        debug!(category = %key, cards = matching.len(), "built section");
        sections.push(Section {
            cards: matching
                .into_iter()
                .map(|e| CardView::from_entry(e, ctx))
                .collect(),
            key,
        });
    }

    Sections(sections)
}

/// Random featured picks across the whole catalog.
pub fn carousel<R: Rng + ?Sized>(
    catalog: &Catalog,
    limit: usize,
    ctx: &RenderContext,
    rng: &mut R,
) -> Vec<CardView> {
    let mut picks: Vec<&CatalogEntry> = catalog
        .entries
        .iter()
        .filter(|e| e.is_listable())
        .collect();
    shuffle(&mut picks, rng);
    picks
        .into_iter()
        .take(limit)
        .map(|e| CardView::from_entry(e, ctx))
        .collect()
}

/// Every game of one category, most downloaded first.
pub fn category_listing(catalog: &Catalog, key: &str, ctx: &RenderContext) -> Vec<CardView> {
    let mut games: Vec<&CatalogEntry> = catalog.in_category(key).collect();
    sort_by_downloads(&mut games);
    games.into_iter().map(|e| CardView::from_entry(e, ctx)).collect()
}

/// The most downloaded games of the catalog.
pub fn popular(catalog: &Catalog, limit: usize, ctx: &RenderContext) -> Vec<CardView> {
    let mut games: Vec<&CatalogEntry> = catalog.entries.iter().collect();
    sort_by_downloads(&mut games);
    games
        .into_iter()
        .take(limit)
        .map(|e| CardView::from_entry(e, ctx))
        .collect()
}

/// Renders a rating as a run of stars.
pub fn stars(rating: u8) -> String {
    std::iter::repeat_n(STAR, usize::from(rating.min(MAX_RATING))).collect()
}

fn sort_by_downloads(games: &mut [&CatalogEntry]) {
    games.sort_by_cached_key(|e| {
        (
            Reverse(parse_downloads(e.downloads.as_deref())),
            e.name.to_lowercase(),
        )
    });
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

fn has_extension(file: &str) -> bool {
    let name = file.rsplit('/').next().unwrap_or(file);
    name.rsplit_once('.').is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

/// Percent-encodes a literal identifier for use as an icon filename.
pub(crate) fn icon_file_for(literal: &str) -> String {
    format!("{}.jpg", encode(literal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::SitePaths;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entry(id: i64, category: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name: format!("Game {id}"),
            category: category.into(),
            image: Some(format!("g{id}.png")),
            description: None,
            rating: None,
            downloads: None,
        }
    }

    fn catalog() -> Catalog {
        let mut entries = Vec::new();
        for id in 1..=6 {
            entries.push(entry(id, "action"));
        }
        for id in 7..=9 {
            entries.push(entry(id, "puzzle"));
        }
        entries.push(entry(10, "racing"));
        Catalog {
            metadata: None,
            entries,
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(
            "https://cdn.example.com/",
            LinkBuilder::new(SitePaths::default()).with_channel(Some("abc".into())),
        )
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in 0..20 {
            let original: Vec<usize> = (0..size).collect();
            let mut shuffled = original.clone();
            shuffle(&mut shuffled, &mut rng);
            let mut sorted = shuffled.clone();
            sorted.sort();
            assert_eq!(sorted, original, "size {size}");
        }
    }

    #[test]
    fn shuffle_reaches_every_position() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen_first = [false; 4];
        for _ in 0..200 {
            let mut items = [0, 1, 2, 3];
            shuffle(&mut items, &mut rng);
            seen_first[items[0]] = true;
        }
        assert!(seen_first.iter().all(|s| *s));
    }

    #[test]
    fn sections_respect_category_and_limit() {
        let catalog = catalog();
        let ctx = ctx();
        let mut rng = StdRng::seed_from_u64(1);
        let keys: Vec<String> = ["action", "puzzle", "racing", "sports"]
            .iter()
            .map(|k| k.to_string())
            .collect();

        let sections = sections_for(&catalog, &keys, 4, &ctx, &mut rng);

        assert_eq!(sections.len(), 4);
        assert_eq!(sections.get("action").unwrap().len(), 4);
        assert_eq!(sections.get("puzzle").unwrap().len(), 3);
        assert_eq!(sections.get("racing").unwrap().len(), 1);
        assert!(sections.get("sports").unwrap().is_empty());
        for section in sections.iter() {
            assert!(section.cards.iter().all(|c| c.category == section.key));
        }
    }

    #[test]
    fn section_ids_are_drawn_from_filtered_entries() {
        let catalog = catalog();
        let ctx = ctx();
        let mut rng = StdRng::seed_from_u64(3);
        let keys = vec!["Action".to_string()];

        let sections = sections_for(&catalog, &keys, 100, &ctx, &mut rng);
        let mut ids: Vec<i64> = sections
            .get("action")
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn duplicate_keys_produce_one_section() {
        let keys = vec!["puzzle".to_string(), "PUZZLE".to_string()];
        let mut rng = StdRng::seed_from_u64(0);
        let sections = sections_for(&catalog(), &keys, 5, &ctx(), &mut rng);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn card_view_fields() {
        let mut e = entry(42, "action");
        e.rating = Some(3);
        e.downloads = Some("1.2K".into());
        let card = CardView::from_entry(&e, &ctx());

        assert_eq!(card.image_url, "https://cdn.example.com/icons/g42.png");
        assert_eq!(card.rating, 3);
        assert_eq!(card.stars, "★★★");
        assert_eq!(card.downloads.as_deref(), Some("1.2K"));
        assert!(card.href.ends_with("id=42&channel=abc"));
        assert_eq!(card.fallback.initials, "G4");
    }

    #[test]
    fn missing_rating_defaults_to_five_stars() {
        let card = CardView::from_entry(&entry(1, "action"), &ctx());
        assert_eq!(card.rating, 5);
        assert_eq!(card.stars, "★★★★★");
    }

    #[test]
    fn image_url_resolution() {
        let ctx = ctx();
        let mut e = entry(8, "action");

        e.image = Some("https://other.example.com/x.png".into());
        assert_eq!(ctx.image_url(&e), "https://other.example.com/x.png");

        e.image = Some("racer".into());
        assert_eq!(ctx.image_url(&e), "https://cdn.example.com/icons/racer.jpg");

        e.image = Some("/icons/racer.webp".into());
        assert_eq!(ctx.image_url(&e), "https://cdn.example.com/icons/racer.webp");

        e.image = None;
        assert_eq!(ctx.image_url(&e), "https://cdn.example.com/icons/8.jpg");
    }

    #[test]
    fn carousel_is_limited() {
        let cards = carousel(&catalog(), 3, &ctx(), &mut StdRng::seed_from_u64(5));
        assert_eq!(cards.len(), 3);
        let mut ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn category_listing_sorts_by_downloads() {
        let mut catalog = catalog();
        catalog.entries[6].downloads = Some("2M".into());
        catalog.entries[7].downloads = Some("900".into());
        catalog.entries[8].downloads = Some("1.5K".into());

        let ids: Vec<i64> = category_listing(&catalog, "PUZZLE", &ctx())
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![7, 9, 8]);
    }

    #[test]
    fn popular_takes_top_downloads() {
        let mut catalog = catalog();
        catalog.entries[9].downloads = Some("3M".into());
        catalog.entries[0].downloads = Some("10K".into());

        let ids: Vec<i64> = popular(&catalog, 2, &ctx()).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 1]);
    }

    #[test]
    fn stars_are_clamped() {
        assert_eq!(stars(0), "");
        assert_eq!(stars(9).chars().count(), 5);
    }
}
