//! Request lifetime tokens.
//!
//! Every request a store issues gets a [`RequestToken`] from the store's
//! [`Lifetime`]. When the response comes back the store asks whether the
//! token is still allowed to touch state. Tokens die when a newer one is
//! applied or when the owner is torn down with [`Lifetime::invalidate`].

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Lifetime {
    issued: AtomicU64,
    /// Tokens at or below this are dead.
    floor: AtomicU64,
    applied: AtomicU64,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_live(&self, token: RequestToken) -> bool {
        token.0 > self.floor.load(Ordering::SeqCst)
    }

    /// True only for the most recently issued token, as long as it is live.
    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.is_live(token) && token.0 == self.issued.load(Ordering::SeqCst)
    }

    /// Marks `token` as the newest applied response.
    ///
    /// Returns false when the token is dead or an equal or newer one was
    /// already applied, in which case the caller must drop the response.
    pub fn try_apply(&self, token: RequestToken) -> bool {
        if !self.is_live(token) {
            return false;
        }
        self.applied.fetch_max(token.0, Ordering::SeqCst) < token.0
    }

    /// Kills every token issued so far.
    pub fn invalidate(&self) {
        self.floor
            .store(self.issued.load(Ordering::SeqCst), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_response_is_dropped() {
        let lifetime = Lifetime::new();
        let first = lifetime.issue();
        let second = lifetime.issue();

        assert!(lifetime.try_apply(second));
        assert!(!lifetime.try_apply(first));
        assert!(!lifetime.try_apply(second));
    }

    #[test]
    fn older_response_applies_if_it_lands_first() {
        let lifetime = Lifetime::new();
        let first = lifetime.issue();
        let second = lifetime.issue();

        assert!(lifetime.try_apply(first));
        assert!(lifetime.try_apply(second));
    }

    #[test]
    fn invalidate_kills_outstanding_tokens() {
        let lifetime = Lifetime::new();
        let before = lifetime.issue();
        lifetime.invalidate();
        let after = lifetime.issue();

        assert!(!lifetime.is_live(before));
        assert!(!lifetime.try_apply(before));
        assert!(lifetime.is_latest(after));
        assert!(lifetime.try_apply(after));
    }

    #[test]
    fn only_newest_is_latest() {
        let lifetime = Lifetime::new();
        let first = lifetime.issue();
        assert!(lifetime.is_latest(first));
        let second = lifetime.issue();
        assert!(!lifetime.is_latest(first));
        assert!(lifetime.is_latest(second));
    }
}
