//! End-to-end pipeline tests: mirror fetch, classification, diffing, and
//! alert fan-out wired together over a mock page server.

use std::sync::Arc;
use std::time::Duration;

use poster_watch_adapters::notify::StubNotifier;
use poster_watch_adapters::pages::MirrorClient;
use poster_watch_adapters::state::InMemoryWatchStore;
use poster_watch_domain::usecases::{
    AddOutcome, CheckConfig, CheckCycle, CycleOutcome, Watchlist, WatchlistError,
};
use poster_watch_domain::{SubscriberId, WatchStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn timeline_entry(author: &str) -> String {
    format!(
        "<div class=\"timeline-item\"><div class=\"tweet-header\">\
         <a class=\"username\" href=\"/{author}\" title=\"@{author}\">\
         <bdi>@{author}</bdi></a></div>\
         <div class=\"tweet-content\">gm</div></div>"
    )
}

fn community_page(authors: &[&str]) -> String {
    let mut html = String::from(
        "<html><head><title>timeline</title></head><body>\
         <div class=\"community-note\">Community</div>",
    );
    for author in authors {
        html.push_str(&timeline_entry(author));
    }
    html.push_str("</body></html>");
    html
}

fn fast_mirror(uri: &str) -> MirrorClient {
    MirrorClient::with_timing(
        vec![uri.to_string()],
        Duration::from_secs(5),
        Duration::ZERO,
    )
}

fn fast_config() -> CheckConfig {
    CheckConfig {
        posts_per_check: 20,
        handle_pace: Duration::ZERO,
        dry_run: false,
    }
}

#[tokio::test]
async fn test_first_cycle_alerts_every_subscriber_once() {
    let page_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/solana"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(community_page(&["alice", "bob", "carol"])),
        )
        .mount(&page_server)
        .await;

    let pages = Arc::new(fast_mirror(&page_server.uri()));
    let store = Arc::new(InMemoryWatchStore::new());
    let notifier = Arc::new(StubNotifier::new(true));

    let watchlist = Watchlist::new(store.clone(), pages.clone());
    assert!(matches!(
        watchlist.add("@Solana").await.unwrap(),
        AddOutcome::Added(_)
    ));
    store.subscribe(SubscriberId(42)).await.unwrap();
    store.subscribe(SubscriberId(-1001)).await.unwrap();

    let cycle = CheckCycle::new(pages, store.clone(), notifier.clone(), fast_config());

    let outcome = cycle.run_once().await.unwrap();
    let CycleOutcome::Completed(report) = outcome else {
        panic!("Expected a completed cycle");
    };

    assert_eq!(report.handles_with_new(), 1);
    assert_eq!(report.new_poster_total(), 3);
    assert_eq!(report.alerts_delivered, 2);
    assert_eq!(report.alerts_failed, 0);

    let sent = notifier.get_sent();
    assert_eq!(sent.len(), 2);
    let recipients: Vec<SubscriberId> = sent.iter().map(|(to, _)| *to).collect();
    assert!(recipients.contains(&SubscriberId(42)));
    assert!(recipients.contains(&SubscriberId(-1001)));

    let (_, text) = &sent[0];
    assert!(text.contains("New posters on @solana (Community Page)"));
    assert!(text.contains("3 new user(s):"));
    assert!(text.contains("@alice, @bob, @carol"));
}

#[tokio::test]
async fn test_second_cycle_is_quiet_when_nothing_changed() {
    let page_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/solana"))
        .respond_with(ResponseTemplate::new(200).set_body_string(community_page(&["alice"])))
        .mount(&page_server)
        .await;

    let pages = Arc::new(fast_mirror(&page_server.uri()));
    let store = Arc::new(InMemoryWatchStore::new());
    let notifier = Arc::new(StubNotifier::new(true));

    let watchlist = Watchlist::new(store.clone(), pages.clone());
    watchlist.add("solana").await.unwrap();
    store.subscribe(SubscriberId(42)).await.unwrap();

    let cycle = CheckCycle::new(pages, store, notifier.clone(), fast_config());

    cycle.run_once().await.unwrap();
    cycle.run_once().await.unwrap();

    // Only the first cycle found anything new.
    assert_eq!(notifier.get_sent().len(), 1);
}

#[tokio::test]
async fn test_new_poster_added_between_cycles_is_reported_alone() {
    let page_server = MockServer::start().await;

    // The add probe and the first cycle see alice; the second cycle sees dave too.
    Mock::given(method("GET"))
        .and(path("/solana"))
        .respond_with(ResponseTemplate::new(200).set_body_string(community_page(&["alice"])))
        .up_to_n_times(2)
        .mount(&page_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solana"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(community_page(&["alice", "dave"])),
        )
        .mount(&page_server)
        .await;

    let pages = Arc::new(fast_mirror(&page_server.uri()));
    let store = Arc::new(InMemoryWatchStore::new());
    let notifier = Arc::new(StubNotifier::new(true));

    let watchlist = Watchlist::new(store.clone(), pages.clone());
    watchlist.add("solana").await.unwrap();
    store.subscribe(SubscriberId(42)).await.unwrap();

    let cycle = CheckCycle::new(pages, store, notifier.clone(), fast_config());

    cycle.run_once().await.unwrap();
    cycle.run_once().await.unwrap();

    let sent = notifier.get_sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].1.contains("1 new user(s):"));
    assert!(sent[1].1.ends_with("@dave"));
    assert!(!sent[1].1.contains("@alice"));
}

#[tokio::test]
async fn test_add_rejects_handle_whose_page_never_loads() {
    let page_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&page_server)
        .await;

    let pages = Arc::new(fast_mirror(&page_server.uri()));
    let store = Arc::new(InMemoryWatchStore::new());
    let watchlist = Watchlist::new(store.clone(), pages);

    let result = watchlist.add("ghost").await;
    assert!(matches!(result, Err(WatchlistError::PageNotFound { .. })));
    assert!(store.handles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_page_leaves_seen_state_untouched() {
    let page_server = MockServer::start().await;

    // The add probe and the first cycle succeed, then the mirror goes dark.
    Mock::given(method("GET"))
        .and(path("/solana"))
        .respond_with(ResponseTemplate::new(200).set_body_string(community_page(&["alice"])))
        .up_to_n_times(2)
        .mount(&page_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solana"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&page_server)
        .await;

    let pages = Arc::new(fast_mirror(&page_server.uri()));
    let store = Arc::new(InMemoryWatchStore::new());
    let notifier = Arc::new(StubNotifier::new(true));

    let watchlist = Watchlist::new(store.clone(), pages.clone());
    watchlist.add("solana").await.unwrap();
    store.subscribe(SubscriberId(42)).await.unwrap();

    let cycle = CheckCycle::new(pages, store.clone(), notifier.clone(), fast_config());

    cycle.run_once().await.unwrap();

    let outcome = cycle.run_once().await.unwrap();
    let CycleOutcome::Completed(report) = outcome else {
        panic!("Expected a completed cycle");
    };
    assert_eq!(report.unavailable(), 1);

    // The earlier posters stay remembered through the outage.
    let status = store.status().await.unwrap();
    assert_eq!(status.seen_posters, 1);
    assert_eq!(notifier.get_sent().len(), 1);
}
