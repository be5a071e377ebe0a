//! Normalized lookup result shared by every source, the resolver and the
//! formatter.
//!
//! A [`Candidate`] is built by exactly one source and carries that source's
//! [`SourceKind`] for its whole life. The formatter picks its template from
//! the kind, so the kind is private and only readable through [`Candidate::kind`].

use std::collections::BTreeMap;
use std::fmt;

// ── SourceKind ────────────────────────────────────────────────────────────────

/// Which source produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// User-submitted entry from the custom store.
    Custom,
    /// Comic Vine character search.
    PrimaryApi,
    /// Marvel character search.
    SecondaryApi,
    /// SuperHero API name search.
    LegacyApi,
    /// Jikan anime title search.
    AnimeApi,
    /// Prose written by the LLM fallback.
    Generated,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Custom => "custom",
            SourceKind::PrimaryApi => "primary",
            SourceKind::SecondaryApi => "secondary",
            SourceKind::LegacyApi => "legacy",
            SourceKind::AnimeApi => "anime",
            SourceKind::Generated => "generated",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Attribute keys ────────────────────────────────────────────────────────────

/// Attribute keys written by the adapters and read by the formatter.
///
/// Keys are source-specific; the formatter never assumes one is present.
pub mod attr {
    pub const ALIASES: &str = "aliases";
    pub const GENDER: &str = "gender";
    pub const PUBLISHER: &str = "publisher";
    pub const COMICS: &str = "comics";

    pub const FULL_NAME: &str = "full_name";
    pub const ALIGNMENT: &str = "alignment";
    pub const FIRST_APPEARANCE: &str = "first_appearance";

    pub const INTELLIGENCE: &str = "intelligence";
    pub const STRENGTH: &str = "strength";
    pub const SPEED: &str = "speed";
    pub const DURABILITY: &str = "durability";
    pub const POWER: &str = "power";
    pub const COMBAT: &str = "combat";

    pub const RACE: &str = "race";
    pub const HEIGHT: &str = "height";
    pub const WEIGHT: &str = "weight";

    pub const SCORE: &str = "score";
    pub const EPISODES: &str = "episodes";

    /// The six power stats, in display order.
    pub const POWER_STATS: [&str; 6] = [INTELLIGENCE, STRENGTH, SPEED, DURABILITY, POWER, COMBAT];
}

// ── Link ──────────────────────────────────────────────────────────────────────

/// A labelled outbound URL (rendered as an inline button by chat channels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self { label: label.into(), url: url.into() }
    }
}

// ── Candidate ─────────────────────────────────────────────────────────────────

/// One displayable record returned by a source for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    name: String,
    kind: SourceKind,
    pub summary: String,
    pub image_url: Option<String>,
    pub links: Vec<Link>,
    pub attributes: BTreeMap<String, String>,
}

impl Candidate {
    /// Build an empty candidate. Returns `None` when `name` is blank.
    pub fn new(kind: SourceKind, name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            kind,
            summary: String::new(),
            image_url: None,
            links: Vec::new(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the image URL; blank values are ignored.
    pub fn with_image(mut self, url: Option<String>) -> Self {
        self.image_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_link(mut self, label: &str, url: impl Into<String>) -> Self {
        self.links.push(Link::new(label, url));
        self
    }

    /// Record an attribute; `None` leaves the key absent so it renders as a
    /// placeholder.
    pub fn with_attr(mut self, key: &str, value: Option<String>) -> Self {
        if let Some(v) = value {
            self.attributes.insert(key.to_string(), v);
        }
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
