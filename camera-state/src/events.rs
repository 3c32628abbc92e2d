//! Event queue and motion generator
//!
//! A bounded pull-point queue: the generator task appends a motion-alarm
//! notification every interval, PullMessages drains everything queued.
//! When the queue is full the oldest record is dropped first, so a VMS
//! that stops pulling loses history, never memory.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Topic of the synthetic motion notifications.
pub const MOTION_TOPIC: &str = "tns1:VideoSource/MotionAlarm";

/// How often the generator queues a notification.
pub const GENERATOR_PERIOD: Duration = Duration::from_secs(30);

/// Most notifications retained while nobody pulls.
pub const QUEUE_CAPACITY: usize = 50;

/// One queued notification.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub topic: String,
    pub time: DateTime<Utc>,
    pub state: bool,
}

impl EventRecord {
    /// A motion-alarm notification stamped now.
    pub fn motion_alarm() -> Self {
        Self {
            topic: MOTION_TOPIC.to_string(),
            time: Utc::now(),
            state: true,
        }
    }
}

/// Bounded notification queue shared by the generator and PullMessages.
#[derive(Debug)]
pub struct EventQueue {
    records: Mutex<VecDeque<EventRecord>>,
    capacity: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::with_capacity(QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Append a record, dropping the oldest first when full. The queue
    /// never holds more than its capacity.
    pub async fn record(&self, record: EventRecord) {
        let mut records = self.records.lock().await;
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Remove and return everything queued, oldest first.
    pub async fn drain(&self) -> Vec<EventRecord> {
        let mut records = self.records.lock().await;
        records.drain(..).collect()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the motion generator: one `true` motion-alarm record per period
/// until cancelled. The first record lands one full period after start.
pub fn spawn_generator(
    queue: Arc<EventQueue>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("motion event generator started, period {:?}", period);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(period) => {
                    queue.record(EventRecord::motion_alarm()).await;
                }
            }
        }
        tracing::info!("motion event generator stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> EventRecord {
        EventRecord {
            topic: format!("evt-{}", n),
            time: Utc::now(),
            state: true,
        }
    }

    #[tokio::test]
    async fn drain_returns_oldest_first_and_empties() {
        let queue = EventQueue::new();
        for n in 0..3 {
            queue.record(numbered(n)).await;
        }

        let drained = queue.drain().await;
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].topic, "evt-0");
        assert_eq!(drained[2].topic, "evt-2");

        assert!(queue.is_empty().await);
        assert!(queue.drain().await.is_empty());
    }

    #[tokio::test]
    async fn overflow_drops_oldest_records() {
        let queue = EventQueue::with_capacity(5);
        for n in 0..8 {
            queue.record(numbered(n)).await;
        }

        assert_eq!(queue.len().await, 5);
        let drained = queue.drain().await;
        assert_eq!(drained[0].topic, "evt-3");
        assert_eq!(drained[4].topic, "evt-7");
    }

    #[tokio::test]
    async fn queue_never_exceeds_capacity() {
        let queue = EventQueue::new();
        for n in 0..(QUEUE_CAPACITY + 10) {
            queue.record(numbered(n)).await;
            assert!(queue.len().await <= QUEUE_CAPACITY);
        }
        assert_eq!(queue.len().await, QUEUE_CAPACITY);
    }

    #[tokio::test]
    async fn generator_queues_motion_alarms_until_cancelled() {
        let queue = Arc::new(EventQueue::new());
        let cancel = CancellationToken::new();
        let handle = spawn_generator(Arc::clone(&queue), Duration::from_millis(10), cancel.clone());

        tokio::time::sleep(Duration::from_millis(45)).await;
        cancel.cancel();
        handle.await.unwrap();

        let drained = queue.drain().await;
        assert!(drained.len() >= 2, "expected several events, got {}", drained.len());
        assert!(drained.iter().all(|e| e.topic == MOTION_TOPIC && e.state));

        // No new records after cancellation.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(queue.is_empty().await);
    }
}
