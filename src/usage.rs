use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{DenyReason, PersistenceError};
use crate::wire::{Caller, SubscriptionStatus};

/// ========================================
/// Usage gate (admission control)
/// ========================================
///
/// Runs before any paid provider call. Check-and-increment is a single
/// atomic store operation so two concurrent requests from the same caller
/// can never both slip under the limit.

#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub count: u32,
    pub status: SubscriptionStatus,
    pub resets_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Consumed { used: u32 },
    Exhausted { used: u32 },
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn get_usage(&self, key: &str) -> Result<UsageRecord, PersistenceError>;

    /// Upsert the caller's current billing status onto the record (applying
    /// any periodic reset) without consuming quota. Used for tiers the gate
    /// never limits.
    async fn refresh_status(
        &self,
        key: &str,
        status: SubscriptionStatus,
    ) -> Result<UsageRecord, PersistenceError>;

    /// Atomically: reset the counter if the periodic boundary has passed,
    /// record the caller's current billing status, then increment iff
    /// `count < limit`. Returns the post-operation count either way. The
    /// counter moves here and nowhere else.
    async fn try_consume(
        &self,
        key: &str,
        limit: u32,
        status: SubscriptionStatus,
    ) -> Result<ConsumeOutcome, PersistenceError>;
}

pub struct InMemoryUsageStore {
    records: Mutex<HashMap<String, UsageRecord>>,
    reset_period: Duration,
}

impl InMemoryUsageStore {
    pub fn new(reset_period_days: i64) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            reset_period: Duration::days(reset_period_days),
        }
    }

    /// Test/seeding hook: install a record wholesale.
    pub fn seed(&self, key: &str, record: UsageRecord) {
        self.records.lock().insert(key.to_string(), record);
    }

    fn fresh(&self) -> UsageRecord {
        UsageRecord {
            count: 0,
            status: SubscriptionStatus::Free,
            resets_at: Utc::now() + self.reset_period,
        }
    }
}

fn apply_reset(record: &mut UsageRecord, period: Duration) {
    if Utc::now() >= record.resets_at {
        record.count = 0;
        record.resets_at = Utc::now() + period;
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn get_usage(&self, key: &str) -> Result<UsageRecord, PersistenceError> {
        let mut records = self.records.lock();
        let fresh = self.fresh();
        let record = records.entry(key.to_string()).or_insert(fresh);
        apply_reset(record, self.reset_period);
        Ok(record.clone())
    }

    async fn refresh_status(
        &self,
        key: &str,
        status: SubscriptionStatus,
    ) -> Result<UsageRecord, PersistenceError> {
        let mut records = self.records.lock();
        let fresh = self.fresh();
        let record = records.entry(key.to_string()).or_insert(fresh);
        apply_reset(record, self.reset_period);
        record.status = status;
        Ok(record.clone())
    }

    async fn try_consume(
        &self,
        key: &str,
        limit: u32,
        status: SubscriptionStatus,
    ) -> Result<ConsumeOutcome, PersistenceError> {
        let mut records = self.records.lock();
        let fresh = self.fresh();
        let record = records.entry(key.to_string()).or_insert(fresh);
        apply_reset(record, self.reset_period);
        record.status = status;

        if record.count >= limit {
            return Ok(ConsumeOutcome::Exhausted { used: record.count });
        }
        record.count += 1;
        Ok(ConsumeOutcome::Consumed { used: record.count })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { used: u32 },
    Denied { reason: DenyReason, used: u32, limit: u32 },
}

pub struct UsageGate {
    store: Arc<dyn UsageStore>,
    guest_limit: u32,
    free_limit: u32,
}

impl UsageGate {
    pub fn new(store: Arc<dyn UsageStore>, guest_limit: u32, free_limit: u32) -> Self {
        Self { store, guest_limit, free_limit }
    }

    /// Rules, in order: guests get one generation per session; authenticated
    /// callers without an active subscription get `free_limit` per period;
    /// active subscribers are never limited and consume no quota. The stored
    /// record's status follows the caller's billing status on every pass.
    pub async fn admit(&self, caller: &Caller) -> Result<Admission, PersistenceError> {
        let key = caller.usage_key();

        let (limit, status, reason) = match caller {
            Caller::Guest { .. } => {
                (self.guest_limit, SubscriptionStatus::Free, DenyReason::GuestLimitReached)
            }
            Caller::User { status: SubscriptionStatus::Active, .. } => {
                let record = self
                    .store
                    .refresh_status(&key, SubscriptionStatus::Active)
                    .await?;
                debug!(key = %key, used = record.count, "active subscription, admitted");
                return Ok(Admission::Allowed { used: record.count });
            }
            Caller::User { status, .. } => (self.free_limit, *status, DenyReason::FreeLimitReached),
        };

        match self.store.try_consume(&key, limit, status).await? {
            ConsumeOutcome::Consumed { used } => {
                debug!(key = %key, used, limit, "admitted");
                Ok(Admission::Allowed { used })
            }
            ConsumeOutcome::Exhausted { used } => {
                debug!(key = %key, used, limit, %reason, "denied");
                Ok(Admission::Denied { reason, used, limit })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(store: Arc<InMemoryUsageStore>) -> UsageGate {
        UsageGate::new(store, 1, 5)
    }

    fn guest(id: &str) -> Caller {
        Caller::Guest { session_id: id.into() }
    }

    fn user(id: &str, status: SubscriptionStatus) -> Caller {
        Caller::User { id: id.into(), status }
    }

    #[tokio::test]
    async fn guest_first_generation_allowed_second_denied() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        let gate = gate(store.clone());
        let caller = guest("s1");

        assert_eq!(gate.admit(&caller).await.unwrap(), Admission::Allowed { used: 1 });
        assert_eq!(
            gate.admit(&caller).await.unwrap(),
            Admission::Denied { reason: DenyReason::GuestLimitReached, used: 1, limit: 1 }
        );
        // Counter untouched by the denied attempt.
        assert_eq!(store.get_usage("guest:s1").await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn distinct_guest_sessions_do_not_share_quota() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        let gate = gate(store);
        assert!(matches!(gate.admit(&guest("a")).await.unwrap(), Admission::Allowed { .. }));
        assert!(matches!(gate.admit(&guest("b")).await.unwrap(), Admission::Allowed { .. }));
    }

    #[tokio::test]
    async fn free_user_at_limit_is_denied_without_increment() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        store.seed(
            "user:u1",
            UsageRecord {
                count: 5,
                status: SubscriptionStatus::Free,
                resets_at: Utc::now() + Duration::days(30),
            },
        );
        let gate = gate(store.clone());

        assert_eq!(
            gate.admit(&user("u1", SubscriptionStatus::Free)).await.unwrap(),
            Admission::Denied { reason: DenyReason::FreeLimitReached, used: 5, limit: 5 }
        );
        assert_eq!(store.get_usage("user:u1").await.unwrap().count, 5);
    }

    #[tokio::test]
    async fn canceled_subscription_counts_as_free_tier() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        store.seed(
            "user:u2",
            UsageRecord {
                count: 5,
                status: SubscriptionStatus::Canceled,
                resets_at: Utc::now() + Duration::days(30),
            },
        );
        let gate = gate(store);
        assert!(matches!(
            gate.admit(&user("u2", SubscriptionStatus::Canceled)).await.unwrap(),
            Admission::Denied { reason: DenyReason::FreeLimitReached, .. }
        ));
    }

    #[tokio::test]
    async fn active_subscriber_always_allowed_and_never_incremented() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        store.seed(
            "user:u3",
            UsageRecord {
                count: 999,
                status: SubscriptionStatus::Active,
                resets_at: Utc::now() + Duration::days(30),
            },
        );
        let gate = gate(store.clone());
        let caller = user("u3", SubscriptionStatus::Active);

        for _ in 0..3 {
            assert!(matches!(gate.admit(&caller).await.unwrap(), Admission::Allowed { .. }));
        }
        assert_eq!(store.get_usage("user:u3").await.unwrap().count, 999);
    }

    #[tokio::test]
    async fn counter_resets_after_period_boundary() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        store.seed(
            "user:u4",
            UsageRecord {
                count: 5,
                status: SubscriptionStatus::Free,
                resets_at: Utc::now() - Duration::seconds(1),
            },
        );
        let gate = gate(store);
        assert_eq!(
            gate.admit(&user("u4", SubscriptionStatus::Free)).await.unwrap(),
            Admission::Allowed { used: 1 }
        );
    }

    #[tokio::test]
    async fn admission_keeps_stored_status_in_step_with_billing() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        store.seed(
            "user:u6",
            UsageRecord {
                count: 2,
                status: SubscriptionStatus::Free,
                resets_at: Utc::now() + Duration::days(30),
            },
        );
        let gate = gate(store.clone());

        // Billing reports an upgrade: the record follows, quota untouched.
        gate.admit(&user("u6", SubscriptionStatus::Active)).await.unwrap();
        let record = store.get_usage("user:u6").await.unwrap();
        assert_eq!(record.status, SubscriptionStatus::Active);
        assert_eq!(record.count, 2);

        // Downgrade back to free tier: status follows and quota resumes.
        gate.admit(&user("u6", SubscriptionStatus::Free)).await.unwrap();
        let record = store.get_usage("user:u6").await.unwrap();
        assert_eq!(record.status, SubscriptionStatus::Free);
        assert_eq!(record.count, 3);
    }

    #[tokio::test]
    async fn concurrent_requests_at_four_admit_exactly_one() {
        let store = Arc::new(InMemoryUsageStore::new(30));
        store.seed(
            "user:u5",
            UsageRecord {
                count: 4,
                status: SubscriptionStatus::Free,
                resets_at: Utc::now() + Duration::days(30),
            },
        );
        let gate = Arc::new(gate(store.clone()));
        let caller = user("u5", SubscriptionStatus::Free);

        let a = tokio::spawn({
            let gate = gate.clone();
            let caller = caller.clone();
            async move { gate.admit(&caller).await.unwrap() }
        });
        let b = tokio::spawn({
            let gate = gate.clone();
            let caller = caller.clone();
            async move { gate.admit(&caller).await.unwrap() }
        });

        let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
        let allowed = [ra, rb]
            .iter()
            .filter(|r| matches!(r, Admission::Allowed { .. }))
            .count();
        assert_eq!(allowed, 1);
        assert_eq!(store.get_usage("user:u5").await.unwrap().count, 5);
    }
}
