use std::time::Duration;

use super::*;
use crate::test_support::{result, FakeGeo};

fn controller(geo: Arc<FakeGeo>) -> (SearchController, broadcast::Receiver<PickerEvent>) {
    let (events, rx) = broadcast::channel(64);
    (
        SearchController::new(geo, events, &PickerConfig::default()),
        rx,
    )
}

#[tokio::test(start_paused = true)]
async fn short_queries_never_reach_the_network() {
    let geo = FakeGeo::new();
    let (search, _rx) = controller(geo.clone());

    search.input("L").await;
    search.input("Le").await;
    search.input("  Le  ").await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(geo.search_queries().is_empty());
    assert!(search.results().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn keystroke_burst_issues_one_query_after_quiet_window() {
    let geo = FakeGeo::new();
    geo.set_search(Ok(vec![result("Lenina St 1", 52.93, 158.40)]));
    let (search, _rx) = controller(geo.clone());

    for text in ["Len", "Leni", "Lenin", "Lenina"] {
        search.input(text).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(geo.search_queries().is_empty(), "still inside the debounce window");

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(geo.search_queries(), vec!["Lenina".to_string()]);
    assert_eq!(geo.search_calls.lock().expect("lock")[0].1, 6);
    assert_eq!(search.results().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn separate_quiet_windows_each_query_once() {
    let geo = FakeGeo::new();
    let (search, _rx) = controller(geo.clone());

    search.input("Port").await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    search.input("Porta").await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(
        geo.search_queries(),
        vec!["Port".to_string(), "Porta".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn shortening_the_query_cancels_the_pending_one() {
    let geo = FakeGeo::new();
    geo.set_search(Ok(vec![result("Port", 52.99, 158.65)]));
    let (search, _rx) = controller(geo.clone());

    search.input("Port").await;
    assert!(search.has_pending());
    search.input("Po").await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(geo.search_queries().is_empty());
    assert!(search.results().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_search_degrades_to_empty_list() {
    let geo = FakeGeo::new();
    geo.set_search(Ok(vec![result("Port", 52.99, 158.65)]));
    let (search, mut rx) = controller(geo.clone());

    search.input("Port").await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(search.results().await.len(), 1);

    geo.set_search(Err("503 Service Unavailable"));
    search.input("Porto").await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(search.results().await.is_empty());

    let mut last = None;
    while let Ok(event) = rx.try_recv() {
        last = Some(event);
    }
    assert_eq!(last, Some(PickerEvent::SearchResults(Vec::new())));
}

#[tokio::test(start_paused = true)]
async fn choosing_a_result_closes_the_list() {
    let geo = FakeGeo::new();
    geo.set_search(Ok(vec![
        result("Lenina St 1", 52.93, 158.40),
        result("Lenina St 2", 52.94, 158.41),
    ]));
    let (search, _rx) = controller(geo.clone());

    search.input("Lenina").await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let chosen = search.choose(1).await.expect("second result");
    assert_eq!(chosen.display_name, "Lenina St 2");
    assert!(search.results().await.is_empty());
    assert!(search.choose(0).await.is_none());
}
