//! Tracks the last consumed update so redeliveries can be detected.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::store::{SequencerState, SequencerStore};

/// A record older than this is discarded.
pub const STALE_AFTER_DAYS: i64 = 7;

/// How an update id at or below the last recorded one is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingPolicy {
    /// Reject ids `<=` the last recorded id, once one has been recorded.
    RejectStale,
    /// Accept every id; only the high-water mark is tracked.
    #[default]
    Tolerate,
}

impl OrderingPolicy {
    /// `true` selects [`OrderingPolicy::RejectStale`].
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::RejectStale
        } else {
            Self::Tolerate
        }
    }

    fn admits(self, state: &SequencerState, event_id: i64) -> bool {
        match self {
            Self::RejectStale => state.last_event_id == 0 || event_id > state.last_event_id,
            Self::Tolerate => true,
        }
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "strict" | "reject" => Ok(Self::RejectStale),
            "" | "0" | "false" | "no" | "tolerate" => Ok(Self::Tolerate),
            other => Err(format!("unknown ordering policy: {other}")),
        }
    }
}

/// Admits inbound updates against the persisted [`SequencerState`].
///
/// All reads and writes go through one async mutex, so concurrent handlers
/// in this process see a consistent record.
pub struct UpdateSequencer {
    store: Arc<dyn SequencerStore>,
    clock: Arc<dyn Clock>,
    policy: OrderingPolicy,
    lock: Mutex<()>,
}

impl UpdateSequencer {
    pub fn new(store: Arc<dyn SequencerStore>, clock: Arc<dyn Clock>, policy: OrderingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            lock: Mutex::new(()),
        }
    }

    /// Whether `event_id` should be handled under the configured policy.
    pub async fn should_process(&self, event_id: i64) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let state = self.current().await?;
        Ok(self.policy.admits(&state, event_id))
    }

    /// Record `event_id` as consumed. The stored id never moves backward.
    pub async fn record_processed(&self, event_id: i64) -> Result<()> {
        let _guard = self.lock.lock().await;
        let state = self.current().await?;
        self.advance(&state, event_id).await
    }

    /// Check and record in one step. Returns `false` for a rejected update,
    /// which is left unrecorded.
    pub async fn admit(&self, event_id: i64) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let state = self.current().await?;
        if !self.policy.admits(&state, event_id) {
            debug!(
                "Rejecting update {} (last processed {})",
                event_id, state.last_event_id
            );
            return Ok(false);
        }
        self.advance(&state, event_id).await?;
        Ok(true)
    }

    /// The current record, after the staleness check.
    pub async fn state(&self) -> Result<SequencerState> {
        let _guard = self.lock.lock().await;
        self.current().await
    }

    async fn current(&self) -> Result<SequencerState> {
        let now = self.clock.now();
        match self.store.load_state().await? {
            Some(state) if now - state.last_update_time <= TimeDelta::days(STALE_AFTER_DAYS) => {
                Ok(state)
            }
            Some(state) => {
                info!(
                    "Update record from {} is stale, resetting",
                    state.last_update_time
                );
                self.reset(now).await
            }
            None => {
                info!("No update record, starting fresh");
                self.reset(now).await
            }
        }
    }

    async fn reset(&self, now: DateTime<Utc>) -> Result<SequencerState> {
        let state = SequencerState::fresh(now);
        self.store.save_state(&state).await?;
        Ok(state)
    }

    async fn advance(&self, state: &SequencerState, event_id: i64) -> Result<()> {
        let next = SequencerState {
            last_event_id: state.last_event_id.max(event_id),
            last_update_time: self.clock.now(),
        };
        self.store.save_state(&next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;

    fn sequencer(policy: OrderingPolicy) -> (UpdateSequencer, Arc<MemoryStore>, Arc<FixedClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::at_date(2025, 3, 1).unwrap());
        let sequencer = UpdateSequencer::new(store.clone(), clock.clone(), policy);
        (sequencer, store, clock)
    }

    #[tokio::test]
    async fn test_absent_record_resets() {
        let (sequencer, store, clock) = sequencer(OrderingPolicy::Tolerate);

        let state = sequencer.state().await.unwrap();
        assert_eq!(state, SequencerState::fresh(clock.now()));
        assert_eq!(store.load_state().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_never_moves_backward() {
        let (sequencer, _, _) = sequencer(OrderingPolicy::Tolerate);

        sequencer.record_processed(50).await.unwrap();
        sequencer.record_processed(20).await.unwrap();
        assert_eq!(sequencer.state().await.unwrap().last_event_id, 50);
    }

    #[tokio::test]
    async fn test_reject_stale_policy() {
        let (sequencer, _, _) = sequencer(OrderingPolicy::RejectStale);

        assert!(sequencer.admit(10).await.unwrap());
        assert!(!sequencer.admit(10).await.unwrap());
        assert!(!sequencer.admit(9).await.unwrap());
        assert!(sequencer.admit(11).await.unwrap());
    }

    #[tokio::test]
    async fn test_stale_record_is_discarded() {
        let (sequencer, store, clock) = sequencer(OrderingPolicy::RejectStale);
        sequencer.record_processed(300).await.unwrap();

        clock.advance(TimeDelta::days(STALE_AFTER_DAYS) + TimeDelta::seconds(1));
        assert!(sequencer.should_process(5).await.unwrap());
        let stored = store.load_state().await.unwrap().unwrap();
        assert_eq!(stored.last_event_id, 0);
        assert_eq!(stored.last_update_time, clock.now());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (sequencer, store, _) = sequencer(OrderingPolicy::Tolerate);
        store.set_unavailable(true);

        assert!(matches!(
            sequencer.admit(1).await,
            Err(crate::error::BotError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("true".parse::<OrderingPolicy>(), Ok(OrderingPolicy::RejectStale));
        assert_eq!("tolerate".parse::<OrderingPolicy>(), Ok(OrderingPolicy::Tolerate));
        assert_eq!("".parse::<OrderingPolicy>(), Ok(OrderingPolicy::Tolerate));
        assert!("sometimes".parse::<OrderingPolicy>().is_err());
        assert_eq!(OrderingPolicy::from_strict(true), OrderingPolicy::RejectStale);
    }
}
