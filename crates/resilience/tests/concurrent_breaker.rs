//! Concurrency tests for a breaker shared across many in-flight calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use resilience::{
    BreakerConfig, BreakerState, CallError, Resilience, ResilienceConfig, ResilienceError,
    RetryPolicy,
};

fn shared(threshold: u32, open_for: Duration) -> Resilience {
    Resilience::for_dependency(
        "catalog",
        ResilienceConfig::new(
            RetryPolicy::no_retry(),
            BreakerConfig::new(threshold, open_for),
        ),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failures_open_the_circuit_without_lost_updates() {
    let r = shared(100, Duration::from_secs(60));

    let tasks = (0..99).map(|_| {
        let r = r.clone();
        tokio::spawn(async move {
            r.execute(|| async { Err::<(), _>(CallError::<()>::transient("refused")) })
                .await
        })
    });
    for result in join_all(tasks).await {
        assert!(result.unwrap().is_err());
    }

    assert_eq!(r.breaker().consecutive_failures(), 99);
    assert_eq!(r.breaker().state(), BreakerState::Closed);

    let _ = r
        .execute(|| async { Err::<(), _>(CallError::<()>::transient("refused")) })
        .await;
    assert_eq!(r.breaker().state(), BreakerState::Open);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_trial_reaches_the_dependency_while_half_open() {
    let r = shared(1, Duration::from_millis(20));
    let _ = r
        .execute(|| async { Err::<(), _>(CallError::<()>::transient("refused")) })
        .await;
    assert_eq!(r.breaker().state(), BreakerState::Open);

    tokio::time::sleep(Duration::from_millis(30)).await;

    let reached = Arc::new(AtomicU32::new(0));
    let tasks = (0..16).map(|_| {
        let r = r.clone();
        let reached = reached.clone();
        tokio::spawn(async move {
            r.execute(|| {
                reached.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<_, CallError<()>>(())
                }
            })
            .await
        })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(reached.load(Ordering::SeqCst), 1);
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ResilienceError::CircuitOpen { .. }))
    );
    assert_eq!(r.breaker().state(), BreakerState::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn aborted_trial_does_not_wedge_the_breaker() {
    let r = shared(1, Duration::from_millis(10));
    let _ = r
        .execute(|| async { Err::<(), _>(CallError::<()>::transient("refused")) })
        .await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let stuck = {
        let r = r.clone();
        tokio::spawn(async move {
            r.execute(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<_, CallError<()>>(())
            })
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(r.breaker().state(), BreakerState::HalfOpen);

    stuck.abort();
    let _ = stuck.await;

    let result = r.execute(|| async { Ok::<_, CallError<()>>(7) }).await;
    assert_eq!(result.unwrap(), 7);
    assert_eq!(r.breaker().state(), BreakerState::Closed);
}
