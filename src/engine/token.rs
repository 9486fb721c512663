//! Generation counters for cooperative jobs.
//!
//! Each request mints a fresh [`CancelToken`] from a [`TokenCounter`]. A job
//! compares its token to the counter before every batch; once a newer token
//! has been minted the job stops and its result is never committed.

/// Marker handed to one cooperative job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CancelToken(u64);

impl CancelToken {
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic counter that decides which token is current.
#[derive(Debug, Default)]
pub struct TokenCounter {
    current: u64,
}

impl TokenCounter {
    pub const fn new() -> Self {
        Self { current: 0 }
    }

    /// Mint a token newer than every token minted before it, superseding
    /// them all.
    pub const fn mint(&mut self) -> CancelToken {
        self.current += 1;
        CancelToken(self.current)
    }

    /// Supersede outstanding tokens without starting new work.
    pub const fn invalidate(&mut self) {
        self.current += 1;
    }

    pub const fn is_current(&self, token: CancelToken) -> bool {
        token.0 == self.current
    }
}

/// Outcome of advancing a job by one batch.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<T> {
    /// More batches remain.
    Pending,
    /// The job finished under a current token.
    Done(T),
    /// The token went stale; carries whatever was built so far, which the
    /// caller must discard.
    Superseded(T),
}

impl<T> Step<T> {
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minting_supersedes_older_tokens() {
        let mut counter = TokenCounter::new();
        let first = counter.mint();
        assert!(counter.is_current(first));
        let second = counter.mint();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn test_invalidate_leaves_no_current_token() {
        let mut counter = TokenCounter::new();
        let token = counter.mint();
        counter.invalidate();
        assert!(!counter.is_current(token));
    }
}
