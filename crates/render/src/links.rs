//! Page query parameters and same-site links.
//!
//! Every outbound same-site link carries the `channel` referral token of
//! the current page, when there is one.

use std::fmt::Display;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped in query values. Unreserved URL characters pass through.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Default external play target.
pub const DEFAULT_PLAY_URL_TEMPLATE: &str = "{assetBase}/games1/{id}/index.html";

/// Parameters the portal pages read from their query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Game identifier (detail pages), kept verbatim.
    pub id: Option<String>,
    /// Category key (category pages).
    pub category: Option<String>,
    /// Referral token to propagate.
    pub channel: Option<String>,
}

impl PageQuery {
    /// Parses a query string (`?id=42&channel=abc`).
    ///
    /// Accepts a bare query, one with a leading `?`, or a full URL. The
    /// first occurrence of a parameter wins; blank values count as absent.
    pub fn parse(input: &str) -> Self {
        let query = match input.split_once('?') {
            Some((_, q)) => q,
            None => input,
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut parsed = PageQuery::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match decode_component(key).as_str() {
                "id" => &mut parsed.id,
                "category" => &mut parsed.category,
                "channel" => &mut parsed.channel,
                _ => continue,
            };
            if slot.is_none() {
                let value = decode_component(value);
                let value = value.trim();
                if !value.is_empty() {
                    *slot = Some(value.to_string());
                }
            }
        }
        parsed
    }
}

/// Page locations of one deployment, relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub home: String,
    pub detail: String,
    pub category: String,
}

impl Default for SitePaths {
    fn default() -> Self {
        Self {
            home: "index.html".into(),
            detail: "detail.html".into(),
            category: "category.html".into(),
        }
    }
}

/// Builds same-site links that keep the active channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBuilder {
    paths: SitePaths,
    channel: Option<String>,
}

impl LinkBuilder {
    pub fn new(paths: SitePaths) -> Self {
        Self {
            paths,
            channel: None,
        }
    }

    /// Sets the channel to propagate. Blank channels are ignored.
    pub fn with_channel(mut self, channel: Option<String>) -> Self {
        self.channel = channel
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }

    /// Creates a builder carrying the channel of `query`.
    pub fn for_query(paths: SitePaths, query: &PageQuery) -> Self {
        Self::new(paths).with_channel(query.channel.clone())
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn home(&self) -> String {
        self.preserve_channel(&self.paths.home)
    }

    /// Detail page link: `{detail}?id={id}[&channel=...]`.
    pub fn detail(&self, id: impl Display) -> String {
        let url = format!("{}?id={}", self.paths.detail, encode(&id.to_string()));
        self.preserve_channel(&url)
    }

    /// Category page link: `{category}?category={key}[&channel=...]`.
    pub fn category(&self, key: &str) -> String {
        let url = format!("{}?category={}", self.paths.category, encode(key));
        self.preserve_channel(&url)
    }

    /// Appends the active channel to a same-site URL.
    ///
    /// URLs that already carry a `channel` parameter are left untouched.
    pub fn preserve_channel(&self, url: &str) -> String {
        let Some(channel) = self.channel.as_deref() else {
            return url.to_string();
        };

        let (base, fragment) = match url.split_once('#') {
            Some((b, f)) => (b, Some(f)),
            None => (url, None),
        };

        if PageQuery::parse(base).channel.is_some() && base.contains('?') {
            return url.to_string();
        }

        let separator = match base.split_once('?') {
            None => "?",
            Some((_, q)) if q.is_empty() || q.ends_with('&') => "",
            Some(_) => "&",
        };

        let mut out = format!("{base}{separator}channel={}", encode(channel));
        if let Some(fragment) = fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

/// Expands the external play URL template for a game.
///
/// Recognized placeholders: `{assetBase}` and `{id}`.
pub fn play_url(template: &str, asset_base: &str, id: impl Display) -> String {
    template
        .replace("{assetBase}", asset_base.trim_end_matches('/'))
        .replace("{id}", &encode(&id.to_string()))
}

/// Percent-encodes a query value or path segment.
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
