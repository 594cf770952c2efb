//! Periodic notification trigger.

use crate::metrics::{NOTIFICATION_DELIVERIES, NOTIFICATION_DELIVERY_DURATION, NOTIFICATIONS_PENDING};
use parcel_notify::{DeliveryOutcome, Notifier};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Interval used when the configured one is zero.
const FALLBACK_INTERVAL: Duration = Duration::from_secs(180);

/// Spawn the background task that drains and delivers pending notifications.
///
/// The first delivery happens one full interval after start. The task exits
/// once `shutdown` is cancelled; a delivery already in progress completes.
pub fn spawn_notification_task(
    notifier: Notifier,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_notification_loop(notifier, interval, shutdown))
}

async fn run_notification_loop(notifier: Notifier, interval: Duration, shutdown: CancellationToken) {
    let interval = if interval.is_zero() {
        tracing::warn!(
            fallback_secs = FALLBACK_INTERVAL.as_secs(),
            "Notification interval is zero, using fallback"
        );
        FALLBACK_INTERVAL
    } else {
        interval
    };

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    tracing::info!(interval_secs = interval.as_secs(), "Notification trigger started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        run_once(&notifier).await;
    }
    tracing::info!("Notification trigger stopped");
}

/// Drain and deliver once, recording the outcome.
pub async fn run_once(notifier: &Notifier) -> DeliveryOutcome {
    NOTIFICATIONS_PENDING.set(gauge_value(notifier.pending_len()));

    let start = Instant::now();
    let outcome = notifier.drain_and_deliver().await;
    NOTIFICATION_DELIVERIES
        .with_label_values(&[outcome.as_str()])
        .inc();
    if outcome != DeliveryOutcome::NothingToSend {
        NOTIFICATION_DELIVERY_DURATION.observe(start.elapsed().as_secs_f64());
    }

    NOTIFICATIONS_PENDING.set(gauge_value(notifier.pending_len()));
    outcome
}

fn gauge_value(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}
