//! Metrics integration and existence-check freshness

use super::helpers::*;
use crate::backend::{BackendError, BrokerRegistry, Direction};
use crate::service::error::ServiceError;

#[tokio::test]
async fn test_stale_cache_passes_send_but_not_metrics() {
    let h = harness();
    h.service.create_queue("q1").await.unwrap();
    h.service.send_message("q1", "g1", b"warm").await.unwrap();

    // Topic disappears behind the registry cache
    h.backend.registry.delete_topic("q1", "zk").await.unwrap();
    let refreshes = h.backend.registry.refresh_count();

    let send_err = h.service.send_message("q1", "g1", b"late").await.unwrap_err();
    assert!(!send_err.is_not_found(), "lenient check refreshed: {send_err}");
    assert!(matches!(
        upstream_source(&send_err),
        Some(BackendError::NotFound(_))
    ));
    assert_eq!(h.backend.registry.refresh_count(), refreshes);

    let metrics_err = h
        .service
        .get_send_metrics("q1", "g1", START - 60, START + 60, 1)
        .await
        .unwrap_err();
    assert!(metrics_err.is_not_found());
    assert_eq!(h.backend.registry.refresh_count(), refreshes + 1);

    // The refresh is now visible to the lenient path too
    assert!(h.service.send_message("q1", "g1", b"x").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_send_metrics_are_bucketed_chronologically() {
    let h = harness();
    h.service.create_queue("q1").await.unwrap();

    h.service.send_message("q1", "g1", b"a").await.unwrap();
    h.clock.advance_secs(45);
    h.service.send_message("q1", "g1", b"b").await.unwrap();
    h.service.send_message("q1", "g2", b"c").await.unwrap();

    let series = h
        .service
        .get_send_metrics("q1", "g1", START, START + 60, 2)
        .await
        .unwrap();
    assert_eq!(series.direction, Direction::Send);
    assert_eq!(
        series
            .buckets
            .iter()
            .map(|b| (b.start, b.end, b.count))
            .collect::<Vec<_>>(),
        vec![(START, START + 30, 1), (START + 30, START + 60, 1)]
    );

    let all_groups = h
        .service
        .get_send_metrics("q1", "", START, START + 60, 2)
        .await
        .unwrap();
    assert_eq!(
        all_groups.buckets.iter().map(|b| b.count).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn test_receive_metrics() {
    let h = harness();
    h.service.create_queue("q1").await.unwrap();
    h.service.send_message("q1", "g1", b"a").await.unwrap();
    h.service.receive_message("q1", "g1").await.unwrap();

    let series = h
        .service
        .get_receive_metrics("q1", "g1", START, START + 10, 5)
        .await
        .unwrap();
    assert_eq!(series.direction, Direction::Receive);
    assert_eq!(series.buckets.len(), 5);
    assert_eq!(series.buckets[0].count, 1);
    assert_eq!(series.total(), 1);
}

#[tokio::test]
async fn test_metrics_window_is_validated() {
    let h = harness();
    h.service.create_queue("q1").await.unwrap();

    for (start, end, buckets) in [
        (START, START, 1),
        (START + 5, START, 1),
        (START, START + 5, 0),
        (START, START + 5, u32::MAX),
    ] {
        let err = h
            .service
            .get_send_metrics("q1", "g1", start, end, buckets)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument { .. }), "{err}");
    }
}

#[tokio::test]
async fn test_uneven_window_last_bucket_takes_remainder() {
    let h = harness();
    h.service.create_queue("q1").await.unwrap();
    h.clock.advance_secs(8);
    h.service.send_message("q1", "g1", b"a").await.unwrap();

    let series = h
        .service
        .get_send_metrics("q1", "g1", START, START + 11, 3)
        .await
        .unwrap();
    assert_eq!(
        series
            .buckets
            .iter()
            .map(|b| (b.start - START, b.end - START, b.count))
            .collect::<Vec<_>>(),
        vec![(0, 3, 0), (3, 6, 0), (6, 11, 1)]
    );
}

#[tokio::test]
async fn test_widest_window_does_not_overflow() {
    let h = harness();
    h.service.create_queue("q1").await.unwrap();
    h.service.send_message("q1", "g1", b"a").await.unwrap();

    let series = h
        .service
        .get_send_metrics("q1", "g1", i64::MIN, i64::MAX, 2)
        .await
        .unwrap();
    assert_eq!(series.buckets.first().map(|b| b.start), Some(i64::MIN));
    assert_eq!(series.buckets.last().map(|b| b.end), Some(i64::MAX));
    assert_eq!(series.total(), 1);

    let series = h
        .service
        .get_receive_metrics("q1", "g1", i64::MIN, 1, 2)
        .await
        .unwrap();
    assert_eq!(series.buckets.len(), 2);
}

#[tokio::test]
async fn test_metrics_require_queue() {
    let h = harness();
    let err = h
        .service
        .get_receive_metrics("ghost", "g1", START, START + 60, 1)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
