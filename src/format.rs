//! Presentation: turns a [`Candidate`] into a chat [`Reply`].
//!
//! Pure: no I/O, no knowledge of which channel will send the reply. The
//! template is chosen by [`SourceKind`]. Fields a template always shows are
//! filled with a placeholder when the source did not provide them.

use reqwest::Url;

use crate::candidate::{Candidate, Link, SourceKind, attr};

const NA: &str = "N/A";
const NO_ALIASES: &str = "None";
const SEARCH_URL: &str = "https://www.google.com/search";

/// One outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Image to send alongside (photo caption style) when the channel can.
    pub image: Option<String>,
    pub links: Vec<Link>,
}

impl Reply {
    /// Text-only reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), image: None, links: Vec::new() }
    }
}

/// Render one candidate.
pub fn format(candidate: &Candidate) -> Reply {
    match candidate.kind() {
        SourceKind::Custom => format_custom(candidate),
        SourceKind::PrimaryApi | SourceKind::SecondaryApi => format_character(candidate),
        SourceKind::LegacyApi => format_legacy(candidate),
        SourceKind::AnimeApi => format_anime(candidate),
        SourceKind::Generated => format_generated(candidate),
    }
}

/// Render several candidates as separate replies, order preserved.
pub fn format_all(candidates: &[Candidate]) -> Vec<Reply> {
    candidates.iter().map(format).collect()
}

fn or_na<'a>(c: &'a Candidate, key: &str) -> &'a str {
    c.attr(key).unwrap_or(NA)
}

/// "Title Case" label for an attribute key such as `first_appearance`.
fn label(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, word) in key.split(['_', '-']).filter(|w| !w.is_empty()).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_uppercase());
            } else {
                out.push(first);
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Web search link for `name`.
pub fn search_link(name: &str) -> Link {
    let url = Url::parse_with_params(SEARCH_URL, &[("q", name)])
        .map(String::from)
        .unwrap_or_else(|_| SEARCH_URL.to_string());
    Link::new("Search the web", url)
}

fn format_custom(c: &Candidate) -> Reply {
    let mut text = format!("{}\n\n{}", c.name(), c.summary);
    for (key, value) in &c.attributes {
        text.push_str(&format!("\n{}: {value}", label(key)));
    }

    let mut links = Vec::new();
    if let Some(image) = &c.image_url {
        links.push(Link::new("Image", image.clone()));
    }
    links.push(search_link(c.name()));

    Reply { text, image: c.image_url.clone(), links }
}

fn format_character(c: &Candidate) -> Reply {
    let mut text = format!(
        "{}\nAliases: {}\nGender: {}",
        c.name(),
        c.attr(attr::ALIASES).unwrap_or(NO_ALIASES),
        or_na(c, attr::GENDER),
    );
    if let Some(publisher) = c.attr(attr::PUBLISHER) {
        text.push_str(&format!("\nPublisher: {publisher}"));
    }
    if let Some(comics) = c.attr(attr::COMICS) {
        text.push_str(&format!("\nComics: {comics}"));
    }
    text.push_str(&format!("\n\n{}", c.summary));

    Reply { text, image: c.image_url.clone(), links: c.links.clone() }
}

fn format_legacy(c: &Candidate) -> Reply {
    let mut text = format!(
        "{}\nFull name: {}\nAlignment: {}\nFirst appearance: {}\n\nPower stats",
        c.name(),
        or_na(c, attr::FULL_NAME),
        or_na(c, attr::ALIGNMENT),
        or_na(c, attr::FIRST_APPEARANCE),
    );
    for key in attr::POWER_STATS {
        text.push_str(&format!("\n{}: {}", label(key), or_na(c, key)));
    }
    text.push_str("\n\nAppearance");
    for key in [attr::GENDER, attr::RACE, attr::HEIGHT, attr::WEIGHT] {
        text.push_str(&format!("\n{}: {}", label(key), or_na(c, key)));
    }

    Reply { text, image: c.image_url.clone(), links: c.links.clone() }
}

fn format_anime(c: &Candidate) -> Reply {
    let mut text = format!(
        "{}\nScore: {}\nEpisodes: {}",
        c.name(),
        or_na(c, attr::SCORE),
        or_na(c, attr::EPISODES),
    );
    if let Some(link) = c.links.first() {
        text.push_str(&format!("\n{}", link.url));
    }
    text.push_str(&format!("\n\n{}", c.summary));

    Reply { text, image: c.image_url.clone(), links: c.links.clone() }
}

fn format_generated(c: &Candidate) -> Reply {
    Reply::text(format!("{} (AI generated)\n\n{}", c.name(), c.summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_shows_name_summary_and_search_link() {
        let c = Candidate::new(SourceKind::Custom, "Batman")
            .unwrap()
            .with_summary("The Dark Knight");
        let r = format(&c);
        assert!(r.text.contains("Batman"));
        assert!(r.text.contains("The Dark Knight"));
        assert!(r.image.is_none());
        assert_eq!(r.links.len(), 1);
        assert_eq!(r.links[0].url, "https://www.google.com/search?q=Batman");
    }

    #[test]
    fn custom_with_image_adds_image_link_first() {
        let c = Candidate::new(SourceKind::Custom, "Foo Bar")
            .unwrap()
            .with_summary("A hero")
            .with_image(Some("http://img".into()));
        let r = format(&c);
        assert_eq!(r.image.as_deref(), Some("http://img"));
        assert_eq!(r.links[0], Link::new("Image", "http://img"));
        assert_eq!(r.links[1].url, "https://www.google.com/search?q=Foo+Bar");
    }

    #[test]
    fn character_defaults_aliases_and_gender() {
        let c = Candidate::new(SourceKind::SecondaryApi, "Spider-Man")
            .unwrap()
            .with_summary("Friendly neighbourhood hero")
            .with_link("More info", "https://marvel.com/detail");
        let r = format(&c);
        assert!(r.text.contains("Aliases: None"));
        assert!(r.text.contains("Gender: N/A"));
        assert!(r.text.ends_with("Friendly neighbourhood hero"));
        assert_eq!(r.links[0].label, "More info");
    }

    #[test]
    fn legacy_renders_every_field_in_order() {
        let c = Candidate::new(SourceKind::LegacyApi, "Batman")
            .unwrap()
            .with_attr(attr::INTELLIGENCE, Some("100".into()))
            .with_attr(attr::ALIGNMENT, Some("good".into()));
        let text = format(&c).text;
        let expected = [
            "Full name: N/A",
            "Alignment: good",
            "First appearance: N/A",
            "Intelligence: 100",
            "Strength: N/A",
            "Speed: N/A",
            "Durability: N/A",
            "Power: N/A",
            "Combat: N/A",
            "Gender: N/A",
            "Race: N/A",
            "Height: N/A",
            "Weight: N/A",
        ];
        let mut from = 0;
        for line in expected {
            let at = text[from..].find(line).unwrap_or_else(|| panic!("missing or out of order: {line}"));
            from += at + line.len();
        }
    }

    #[test]
    fn anime_shows_link_and_synopsis() {
        let c = Candidate::new(SourceKind::AnimeApi, "Naruto")
            .unwrap()
            .with_summary("Ninja story")
            .with_link("More info", "https://myanimelist.net/anime/20");
        let r = format(&c);
        assert!(r.text.contains("https://myanimelist.net/anime/20"));
        assert!(r.text.contains("Score: N/A"));
        assert!(r.text.ends_with("Ninja story"));
    }

    #[test]
    fn generated_has_no_image_or_links() {
        let c = Candidate::new(SourceKind::Generated, "Zzqx123")
            .unwrap()
            .with_summary("A mysterious hero.")
            .with_image(Some("http://ignored".into()));
        let r = format(&c);
        assert!(r.text.contains("Zzqx123"));
        assert!(r.text.contains("A mysterious hero."));
        assert!(r.image.is_none());
        assert!(r.links.is_empty());
    }

    #[test]
    fn format_all_keeps_order() {
        let cs: Vec<_> = ["One", "Two", "Three"]
            .iter()
            .map(|n| Candidate::new(SourceKind::AnimeApi, n).unwrap())
            .collect();
        let replies = format_all(&cs);
        assert_eq!(replies.len(), 3);
        assert!(replies[2].text.starts_with("Three"));
    }

    #[test]
    fn label_title_cases_first_word() {
        assert_eq!(label("first_appearance"), "First appearance");
        assert_eq!(label("full-name"), "Full name");
        assert_eq!(label("power"), "Power");
    }
}
