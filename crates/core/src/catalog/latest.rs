//! Stale-response suppression for overlapping queries.

/// Holds the newest result seen so far, keyed by the filter generation that
/// requested it.
///
/// When filters change faster than queries resolve, responses can arrive out
/// of order. [`LatestResults::offer`] accepts a response only if its
/// generation is at least as new as the one currently held.
#[derive(Debug, Clone, Default)]
pub struct LatestResults<T> {
    current: Option<(u64, T)>,
}

impl<T> LatestResults<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Offer a response for `generation`. Returns `true` if it was kept.
    pub fn offer(&mut self, generation: u64, value: T) -> bool {
        if let Some((held, _)) = &self.current
            && *held > generation
        {
            tracing::debug!(held, generation, "dropping stale result");
            return false;
        }
        self.current = Some((generation, value));
        true
    }

    /// The newest accepted result.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.current.as_ref().map(|(_, value)| value)
    }

    /// Generation of the newest accepted result.
    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        self.current.as_ref().map(|(generation, _)| *generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_generation_wins_regardless_of_arrival_order() {
        let mut latest = LatestResults::new();
        assert!(latest.offer(2, "second"));
        assert!(!latest.offer(1, "first"));
        assert_eq!(latest.get(), Some(&"second"));

        assert!(latest.offer(3, "third"));
        assert_eq!(latest.generation(), Some(3));
    }

    #[test]
    fn test_same_generation_replaces() {
        let mut latest = LatestResults::new();
        latest.offer(1, 10);
        assert!(latest.offer(1, 11));
        assert_eq!(latest.get(), Some(&11));
    }
}
