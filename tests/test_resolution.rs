//! End-to-end lookups through the dispatcher, offline: fixed sources, the
//! dummy LLM and an in-memory or temp-file store.

use std::sync::Arc;

use hero_bot::candidate::{Candidate, SourceKind, attr};
use hero_bot::commands::Dispatcher;
use hero_bot::config::{CommandsConfig, Config};
use hero_bot::llm::LlmProvider;
use hero_bot::llm::providers::dummy::DummyProvider;
use hero_bot::resolve::Resolver;
use hero_bot::sources::SourceAdapter;
use hero_bot::sources::fixed::FixedAdapter;
use hero_bot::sources::generated::GeneratedAdapter;
use hero_bot::store::json_file::JsonFileStore;
use hero_bot::store::memory::MemoryStore;
use hero_bot::store::{CustomEntry, EntryStore};

fn open_commands() -> CommandsConfig {
    CommandsConfig { admin_user_id: None }
}

fn legacy_batman() -> Candidate {
    Candidate::new(SourceKind::LegacyApi, "Batman")
        .unwrap()
        .with_summary("Bruce Wayne (DC Comics)")
        .with_attr(attr::FULL_NAME, Some("Bruce Wayne".into()))
        .with_attr(attr::ALIGNMENT, Some("good".into()))
}

#[tokio::test]
async fn custom_entry_beats_remote_sources() {
    let legacy = FixedAdapter::returning(SourceKind::LegacyApi, vec![legacy_batman()]);
    let store = Arc::new(MemoryStore::with_entries(vec![CustomEntry::new("Batman", "The Dark Knight")]));
    let resolver = Resolver::new(store, vec![SourceAdapter::Fixed(legacy.clone())], None);
    let dispatcher = Dispatcher::new(resolver, &open_commands());

    let replies = dispatcher.handle_text(None, "/hero batman").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].text.contains("The Dark Knight"));
    assert_eq!(legacy.calls(), 0);
}

#[tokio::test]
async fn remote_source_answers_when_store_misses() {
    let legacy = FixedAdapter::returning(SourceKind::LegacyApi, vec![legacy_batman()]);
    let resolver = Resolver::new(
        Arc::new(MemoryStore::new()),
        vec![
            SourceAdapter::Fixed(FixedAdapter::unavailable(SourceKind::PrimaryApi)),
            SourceAdapter::Fixed(legacy),
        ],
        None,
    );
    let dispatcher = Dispatcher::new(resolver, &open_commands());

    let replies = dispatcher.handle_text(None, "Batman").await;
    assert!(replies[0].text.contains("Full name: Bruce Wayne"));
    assert!(replies[0].text.contains("Alignment: good"));
    assert!(replies[0].text.contains("Combat: N/A"));
}

#[tokio::test]
async fn unknown_name_is_generated_once() {
    let legacy = FixedAdapter::empty(SourceKind::LegacyApi);
    let fallback = GeneratedAdapter::new(LlmProvider::Dummy(DummyProvider));
    let resolver = Resolver::new(
        Arc::new(MemoryStore::new()),
        vec![SourceAdapter::Fixed(legacy.clone())],
        Some(fallback.clone()),
    );
    let dispatcher = Dispatcher::new(resolver, &open_commands());

    let replies = dispatcher.handle_text(None, "/hero Zzqx123").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].text.starts_with("Zzqx123 (AI generated)"));
    assert!(replies[0].image.is_none());
    assert_eq!(legacy.calls(), 1);
    assert_eq!(fallback.requests(), 1);
}

#[tokio::test]
async fn fallback_is_skipped_when_a_source_matches() {
    let legacy = FixedAdapter::returning(SourceKind::LegacyApi, vec![legacy_batman()]);
    let fallback = GeneratedAdapter::new(LlmProvider::Dummy(DummyProvider));
    let resolver = Resolver::new(
        Arc::new(MemoryStore::new()),
        vec![SourceAdapter::Fixed(legacy)],
        Some(fallback.clone()),
    );
    let dispatcher = Dispatcher::new(resolver, &open_commands());

    dispatcher.handle_text(None, "/hero Batman").await;
    assert_eq!(fallback.requests(), 0);
}

#[tokio::test]
async fn anime_lists_every_result() {
    let titles = ["Naruto", "Naruto Shippuden", "Boruto"]
        .iter()
        .map(|t| {
            Candidate::new(SourceKind::AnimeApi, t)
                .unwrap()
                .with_summary("ninjas")
                .with_attr(attr::SCORE, Some("8.0".into()))
        })
        .collect();
    let resolver = Resolver::new(Arc::new(MemoryStore::new()), vec![], None)
        .with_anime(SourceAdapter::Fixed(FixedAdapter::returning(SourceKind::AnimeApi, titles)));
    let dispatcher = Dispatcher::new(resolver, &open_commands());

    let replies = dispatcher.handle_text(None, "/anime naruto").await;
    assert_eq!(replies.len(), 3);
    assert!(replies[1].text.starts_with("Naruto Shippuden"));

    let none = Resolver::new(Arc::new(MemoryStore::new()), vec![], None)
        .with_anime(SourceAdapter::Fixed(FixedAdapter::empty(SourceKind::AnimeApi)));
    let dispatcher = Dispatcher::new(none, &open_commands());
    assert_eq!(
        dispatcher.handle_text(None, "/anime qqqq").await[0].text,
        "No anime found for 'qqqq'."
    );
}

#[tokio::test]
async fn added_hero_survives_restart() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("heroes.json");

    {
        let store = Arc::new(JsonFileStore::open(&path).unwrap());
        let dispatcher = Dispatcher::new(Resolver::new(store, vec![], None), &open_commands());
        let replies = dispatcher.handle_text(Some(5), "/addhero Foo|A hero|http://img").await;
        assert_eq!(replies[0].text, "Added hero 'Foo'.");
    }

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    assert_eq!(store.list_all().unwrap().len(), 1);
    let dispatcher = Dispatcher::new(Resolver::new(store, vec![], None), &open_commands());

    let replies = dispatcher.handle_text(None, "/hero foo").await;
    assert!(replies[0].text.starts_with("Foo"));
    assert_eq!(replies[0].image.as_deref(), Some("http://img"));
}

#[tokio::test]
async fn resolver_builds_from_offline_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = Config::test_default(tmp.path());
    let resolver = Resolver::from_config(&config, Arc::new(MemoryStore::new())).unwrap();
    let dispatcher = Dispatcher::new(resolver, &config.commands);

    // Empty chain + dummy provider: any unknown name is generated.
    let replies = dispatcher.handle_text(None, "/hero Nobody").await;
    assert!(replies[0].text.contains("(AI generated)"));

    // Anime source points at a closed port: reported as not found.
    let replies = dispatcher.handle_text(None, "/anime Nobody").await;
    assert_eq!(replies[0].text, "No anime found for 'Nobody'.");
}
