use std::time::Duration;

use super::*;
use crate::{
    error::PickerError,
    markers::{HeadlessMap, MarkerRole},
    test_support::{point, sighting, FakeGeo},
};

struct Harness {
    geo: Arc<FakeGeo>,
    map: Arc<HeadlessMap>,
    sync: Arc<DriverSyncLoop>,
    rx: broadcast::Receiver<PickerEvent>,
}

fn harness() -> Harness {
    let geo = FakeGeo::new();
    let map = Arc::new(HeadlessMap::new());
    let markers = Arc::new(Mutex::new(MarkerStore::new(map.clone())));
    let (events, rx) = broadcast::channel(64);
    let sync = Arc::new(DriverSyncLoop::new(geo.clone(), markers, events));
    Harness { geo, map, sync, rx }
}

#[tokio::test]
async fn successful_poll_renders_every_sighting() {
    let mut h = harness();
    h.geo.push_drivers(Ok(vec![sighting("d1", 52.93, 158.41, 3)]));
    h.sync.track(point(52.93, 158.40)).await;

    let outcome = h.sync.refresh(point(52.93, 158.40)).await.expect("poll");

    assert_eq!(outcome, RefreshOutcome::Rendered(1));
    assert_eq!(h.map.count(MarkerRole::Driver), 1);
    assert_eq!(h.geo.driver_polls(), vec![point(52.93, 158.40)]);
    assert_eq!(
        h.rx.try_recv().expect("event"),
        PickerEvent::DriversUpdated { count: 1 }
    );
}

#[tokio::test]
async fn failed_poll_keeps_previous_drivers_and_badge() {
    let mut h = harness();
    h.geo.push_drivers(Ok(vec![sighting("d1", 52.93, 158.41, 3)]));
    h.geo.push_drivers(Err("connection reset"));
    let origin = point(52.93, 158.40);
    h.sync.track(origin).await;

    h.sync.refresh(origin).await.expect("first poll");
    let _ = h.rx.try_recv();
    let err = h.sync.refresh(origin).await.expect_err("second poll fails");

    assert!(matches!(err, PickerError::NetworkFailure(_)));
    let drivers = h
        .map
        .live_markers()
        .into_iter()
        .filter(|spec| spec.role == MarkerRole::Driver)
        .collect::<Vec<_>>();
    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0].popup.as_deref(), Some("Driver d1 • 3s"));
    assert!(h.rx.try_recv().is_err(), "no badge update on failure");
}

#[tokio::test(start_paused = true)]
async fn poll_for_a_moved_origin_is_discarded() {
    let h = harness();
    h.geo.delay_drivers(Duration::from_millis(200));
    h.geo.push_drivers(Ok(vec![sighting("old", 52.93, 158.41, 3)]));
    h.geo.push_drivers(Ok(vec![
        sighting("new1", 52.80, 158.30, 1),
        sighting("new2", 52.81, 158.31, 2),
    ]));

    h.sync.track(point(52.93, 158.40)).await;
    let stale = h.sync.spawn_refresh(point(52.93, 158.40));
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.sync.track(point(52.80, 158.29)).await;
    let fresh = h.sync.refresh(point(52.80, 158.29)).await.expect("fresh poll");
    stale.await.expect("stale task");

    assert_eq!(fresh, RefreshOutcome::Rendered(2));
    assert_eq!(h.map.count(MarkerRole::Driver), 2);
    assert_eq!(h.sync.anchor().await, Some(point(52.80, 158.29)));
}

#[tokio::test(start_paused = true)]
async fn poll_completing_after_clear_is_discarded() {
    let h = harness();
    h.geo.delay_drivers(Duration::from_millis(200));
    h.geo.push_drivers(Ok(vec![sighting("d1", 52.93, 158.41, 3)]));
    h.sync.track(point(52.93, 158.40)).await;

    let sync = h.sync.clone();
    let in_flight = tokio::spawn(async move { sync.refresh(point(52.93, 158.40)).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.sync.clear().await;

    let outcome = in_flight.await.expect("join").expect("poll");
    assert_eq!(outcome, RefreshOutcome::Superseded);
    assert_eq!(h.map.count(MarkerRole::Driver), 0);
    assert_eq!(h.sync.anchor().await, None);
}

#[tokio::test]
async fn poll_for_an_older_origin_cannot_reclaim_the_anchor() {
    let h = harness();
    let newer = point(52.80, 158.29);
    h.sync.track(newer).await;

    let outcome = h.sync.refresh(point(52.93, 158.40)).await.expect("poll");

    assert_eq!(outcome, RefreshOutcome::Superseded);
    assert!(h.geo.driver_polls().is_empty());
    assert_eq!(h.sync.anchor().await, Some(newer));
}

#[tokio::test(start_paused = true)]
async fn periodic_tick_polls_only_with_an_origin() {
    let h = harness();
    let origin = Arc::new(Mutex::new(None::<GeoPoint>));

    let source = origin.clone();
    let task = h.sync.spawn_periodic(Duration::from_secs(5), move || {
        let source = source.clone();
        async move { *source.lock().await }
    });

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert!(h.geo.driver_polls().is_empty());

    *origin.lock().await = Some(point(52.93, 158.40));
    h.sync.track(point(52.93, 158.40)).await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.geo.driver_polls().len(), 2);

    task.abort();
}
