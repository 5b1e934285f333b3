//! Portal configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/game-portal/portal.toml`
//! - Windows: `%APPDATA%/game-portal/portal.toml`

use std::path::{Path, PathBuf};

use portal_catalog::categories::DEFAULT_CATEGORY_ORDER;
use portal_render::cards::{DEFAULT_DESCRIPTION, DEFAULT_RATING};
use portal_render::links::DEFAULT_PLAY_URL_TEMPLATE;
use portal_render::{
    LinkBuilder, MissingGamePolicy, PageQuery, PageSettings, RenderContext, SitePaths,
};
use serde::{Deserialize, Serialize};

/// Deployment settings of one portal site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// URL of the catalog JSON document.
    pub catalog_url: String,

    /// Base URL for icons and hosted games.
    pub asset_base: String,

    pub home_path: String,
    pub detail_path: String,
    pub category_path: String,

    /// External play URL; `{assetBase}` and `{id}` are substituted.
    pub play_url_template: String,

    /// Metadata field holding the section order.
    pub category_info_key: String,

    /// Section order when the catalog carries none.
    pub default_categories: Vec<String>,

    pub per_category_limit: usize,
    pub carousel_limit: usize,
    pub popular_limit: usize,
    pub recommendation_limit: usize,

    pub default_rating: u8,
    pub default_description: String,

    pub missing_game_policy: MissingGamePolicy,

    /// Check the play URL before navigating to it.
    pub probe_play_target: bool,

    /// Page background, used to pick a legible text colour.
    pub theme_background: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        let pages = PageSettings::default();
        let paths = SitePaths::default();
        Self {
            catalog_url: "https://cdn.example.com/games.json".into(),
            asset_base: "https://cdn.example.com".into(),
            home_path: paths.home,
            detail_path: paths.detail,
            category_path: paths.category,
            play_url_template: DEFAULT_PLAY_URL_TEMPLATE.into(),
            category_info_key: pages.info_key,
            default_categories: DEFAULT_CATEGORY_ORDER.iter().map(|k| k.to_string()).collect(),
            per_category_limit: pages.per_category_limit,
            carousel_limit: pages.carousel_limit,
            popular_limit: pages.popular_limit,
            recommendation_limit: pages.recommendation_limit,
            default_rating: DEFAULT_RATING,
            default_description: DEFAULT_DESCRIPTION.into(),
            missing_game_policy: MissingGamePolicy::Placeholder,
            probe_play_target: true,
            theme_background: "#1e1e2e".into(),
        }
    }
}

impl PortalConfig {
    /// Loads configuration from the platform path, or creates a default if
    /// not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads configuration from `path`, writing defaults there if missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: PortalConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = PortalConfig::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn site_paths(&self) -> SitePaths {
        SitePaths {
            home: self.home_path.clone(),
            detail: self.detail_path.clone(),
            category: self.category_path.clone(),
        }
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            info_key: self.category_info_key.clone(),
            default_categories: self.default_categories.clone(),
            per_category_limit: self.per_category_limit,
            carousel_limit: self.carousel_limit,
            popular_limit: self.popular_limit,
            recommendation_limit: self.recommendation_limit,
            play_url_template: self.play_url_template.clone(),
            missing_game_policy: self.missing_game_policy,
        }
    }

    /// Builds the render context for a page request, carrying its channel.
    pub fn render_context(&self, query: &PageQuery) -> RenderContext {
        let links = LinkBuilder::for_query(self.site_paths(), query);
        let mut ctx = RenderContext::new(&self.asset_base, links);
        ctx.default_rating = self.default_rating;
        ctx.default_description = self.default_description.clone();
        ctx
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("game-portal")
            .join("portal.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("game-portal").join("portal.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/game-portal/portal.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PortalConfig::default();
        assert_eq!(config.category_info_key, "info2");
        assert_eq!(config.default_categories.len(), 7);
        assert_eq!(config.per_category_limit, 8);
        assert_eq!(config.recommendation_limit, 8);
        assert_eq!(config.default_rating, 5);
        assert!(config.probe_play_target);
        assert_eq!(config.missing_game_policy, MissingGamePolicy::Placeholder);
    }

    #[test]
    fn config_partial_toml() {
        let toml_str = r#"
            catalog_url = "https://games.example.org/list.json"
            missing_game_policy = "redirect_home"
            per_category_limit = 4
        "#;
        let config: PortalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.catalog_url, "https://games.example.org/list.json");
        assert_eq!(config.missing_game_policy, MissingGamePolicy::RedirectHome);
        assert_eq!(config.per_category_limit, 4);
        assert_eq!(config.carousel_limit, 5);
        assert_eq!(config.detail_path, "detail.html");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = PortalConfig {
            asset_base: "https://assets.example.net".into(),
            default_categories: vec!["puzzle".into(), "action".into()],
            probe_play_target: false,
            ..PortalConfig::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: PortalConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn load_creates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("portal.toml");

        let config = PortalConfig::load_from(&path).unwrap();
        assert_eq!(config, PortalConfig::default());
        assert!(path.exists());

        let reloaded = PortalConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("portal.toml");
        std::fs::write(&path, "per_category_limit = \"many\"").unwrap();

        assert!(PortalConfig::load_from(&path).is_err());
    }

    #[test]
    fn render_context_carries_channel_and_defaults() {
        let config = PortalConfig {
            asset_base: "https://assets.example.net/".into(),
            default_rating: 3,
            ..PortalConfig::default()
        };
        let query = PageQuery::parse("?id=42&channel=abc");

        let ctx = config.render_context(&query);
        assert_eq!(ctx.asset_base, "https://assets.example.net");
        assert_eq!(ctx.default_rating, 3);
        assert!(ctx.links.detail(42).ends_with("id=42&channel=abc"));
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("game-portal"));
    }
}
