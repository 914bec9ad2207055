use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{OwnerIdentity, PendingConnection};
use crate::utils::{generate_six_digit_code, validate_code_format};

/// In-memory registry of live pairing codes.
///
/// One connection record per code value; a record is consumed by the first
/// successful redemption and never updated in place. State lives for the
/// process lifetime only — codes are short-lived, so losing them on restart
/// is acceptable for expected request volumes.
///
/// Every operation runs under one exclusive lock, which is what makes
/// redeem's check-then-delete atomic: two concurrent redemptions of the same
/// code can never both succeed.
#[derive(Clone)]
pub struct PairingRegistry {
    ttl: Duration,
    codes: Arc<Mutex<HashMap<String, PendingConnection>>>,
}

impl PairingRegistry {
    pub fn new(code_ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(code_ttl_secs),
            codes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Issue a fresh code for `owner` and store its pending connection.
    ///
    /// Resamples until the candidate collides with no stored code. Expired
    /// records are swept first, but an expired-and-unswept value would still
    /// block reuse until removed. Issuances are independent: a second code
    /// for the same owner does not invalidate anyone else's.
    pub async fn issue(&self, owner: OwnerIdentity) -> PendingConnection {
        let mut codes = self.codes.lock().await;
        let now = Utc::now();
        Self::sweep_locked(&mut codes, now);

        let code = loop {
            let candidate = generate_six_digit_code();
            if !codes.contains_key(&candidate) {
                break candidate;
            }
        };

        let pending = PendingConnection {
            code: code.clone(),
            owner,
            created_at: now,
            expires_at: now + self.ttl,
        };
        codes.insert(code, pending.clone());
        pending
    }

    /// Redeem a code, consuming its pending connection.
    ///
    /// Format violations fail before the store is touched. A hit past its
    /// deadline is removed and reported as `Expired`; a miss is `NotFound`
    /// whether the code never existed, was already redeemed, or was swept —
    /// deliberately indistinguishable.
    pub async fn redeem(&self, code: &str) -> AppResult<PendingConnection> {
        let code = validate_code_format(code)?;

        let mut codes = self.codes.lock().await;
        let now = Utc::now();

        // Any hit is removed: a live record is consumed (one-time use), an
        // expired one is dropped on discovery.
        match codes.remove(&code) {
            None => Err(AppError::NotFound(
                "Pairing code not recognized".to_string(),
            )),
            Some(pending) if now > pending.expires_at => Err(AppError::Expired(
                "Pairing code has expired, request a new one".to_string(),
            )),
            Some(pending) => Ok(pending),
        }
    }

    /// Remove every record past its deadline. Linear in live-code count,
    /// which stays small (bounded by request rate over one TTL window).
    pub async fn sweep(&self) -> usize {
        let mut codes = self.codes.lock().await;
        Self::sweep_locked(&mut codes, Utc::now())
    }

    pub async fn live_count(&self) -> usize {
        self.codes.lock().await.len()
    }

    fn sweep_locked(codes: &mut HashMap<String, PendingConnection>, now: DateTime<Utc>) -> usize {
        let before = codes.len();
        codes.retain(|_, pending| now <= pending.expires_at);
        before - codes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(user_id: i64, chat_id: i64) -> OwnerIdentity {
        OwnerIdentity {
            user_id,
            chat_id,
            username: Some("ada".to_string()),
            first_name: Some("Ada".to_string()),
        }
    }

    #[tokio::test]
    async fn test_issued_codes_are_six_digits_and_unique() {
        let registry = PairingRegistry::new(300);
        let mut seen = std::collections::HashSet::new();

        for i in 0..200 {
            let pending = registry.issue(owner(i, i)).await;
            assert_eq!(pending.code.len(), 6);
            assert!(pending.code.chars().all(|c| c.is_ascii_digit()));
            assert!(seen.insert(pending.code), "duplicate live code issued");
        }
        assert_eq!(registry.live_count().await, 200);
    }

    #[tokio::test]
    async fn test_issue_sets_expiry_from_ttl() {
        let registry = PairingRegistry::new(300);
        let pending = registry.issue(owner(1, 1)).await;
        assert_eq!(
            pending.expires_at - pending.created_at,
            Duration::seconds(300)
        );
    }

    #[tokio::test]
    async fn test_redeem_returns_owner_and_consumes_code() {
        let registry = PairingRegistry::new(300);
        let pending = registry.issue(owner(42, 42)).await;

        let redeemed = registry.redeem(&pending.code).await.unwrap();
        assert_eq!(redeemed.owner.user_id, 42);
        assert_eq!(redeemed.owner.chat_id, 42);

        // One-time use: the second attempt sees nothing.
        match registry.redeem(&pending.code).await {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_redeem_trims_whitespace() {
        let registry = PairingRegistry::new(300);
        let pending = registry.issue(owner(1, 1)).await;
        let padded = format!("  {}\n", pending.code);
        assert!(registry.redeem(&padded).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_format_fails_without_touching_store() {
        let registry = PairingRegistry::new(300);
        registry.issue(owner(1, 1)).await;

        for bad in ["12a456", "12345", "1234567", "", "no", "٤٨٢٩١٣"] {
            match registry.redeem(bad).await {
                Err(AppError::InvalidFormat(_)) => {}
                other => panic!("expected InvalidFormat for {bad:?}, got {other:?}"),
            }
        }
        assert_eq!(registry.live_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let registry = PairingRegistry::new(300);
        match registry.redeem("482913").await {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expired_code_fails_then_disappears() {
        let registry = PairingRegistry::new(300);
        let pending = registry.issue(owner(7, 7)).await;

        // Backdate the record past its deadline.
        {
            let mut codes = registry.codes.lock().await;
            let record = codes.get_mut(&pending.code).unwrap();
            record.expires_at = Utc::now() - Duration::milliseconds(1);
        }

        match registry.redeem(&pending.code).await {
            Err(AppError::Expired(_)) => {}
            other => panic!("expected Expired, got {other:?}"),
        }
        // Removed on the expired lookup, so the retry can no longer tell
        // an expired code from one that never existed.
        match registry.redeem(&pending.code).await {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_redeemable_right_up_to_deadline() {
        let registry = PairingRegistry::new(300);
        let pending = registry.issue(owner(7, 7)).await;

        {
            let mut codes = registry.codes.lock().await;
            let record = codes.get_mut(&pending.code).unwrap();
            // Deadline still ahead of any clock reading the redeem makes.
            record.expires_at = Utc::now() + Duration::seconds(1);
        }

        assert!(registry.redeem(&pending.code).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_records() {
        let registry = PairingRegistry::new(300);
        let stale = registry.issue(owner(1, 1)).await;
        let fresh = registry.issue(owner(2, 2)).await;

        {
            let mut codes = registry.codes.lock().await;
            codes.get_mut(&stale.code).unwrap().expires_at = Utc::now() - Duration::seconds(1);
        }

        assert_eq!(registry.sweep().await, 1);
        assert_eq!(registry.live_count().await, 1);
        assert!(registry.redeem(&fresh.code).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_redeem_has_exactly_one_winner() {
        let registry = PairingRegistry::new(300);
        let pending = registry.issue(owner(9, 9)).await;

        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let mut handles = Vec::new();
        for _ in 0..2 {
            let registry = registry.clone();
            let code = pending.code.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                registry.redeem(&code).await
            }));
        }

        let mut successes = 0;
        let mut not_found = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::NotFound(_)) => not_found += 1,
                Err(other) => panic!("unexpected failure: {other:?}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(not_found, 1);
    }

    #[tokio::test]
    async fn test_issuances_are_independent_across_owners() {
        let registry = PairingRegistry::new(300);
        let first = registry.issue(owner(1, 1)).await;
        let again = registry.issue(owner(1, 1)).await;
        let other = registry.issue(owner(2, 2)).await;

        // Re-issuing for one owner leaves every other live code intact.
        assert!(registry.redeem(&other.code).await.is_ok());
        assert!(registry.redeem(&first.code).await.is_ok());
        assert!(registry.redeem(&again.code).await.is_ok());
    }
}
