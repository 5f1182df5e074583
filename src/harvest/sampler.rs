//! Bounded diff sampling for token-ratio estimation.
//!
//! The estimator needs a body of representative diff text without buffering
//! arbitrarily large diffs in memory. [`DiffSample`] holds a single budget
//! shared across the whole harvest: each diff contributes a prefix until the
//! budget runs out, after which nothing further is ever appended. The result
//! is a prefix-biased, budget-capped corpus, not a uniform random sample.

/// Total sample budget for a run, in bytes.
pub const DEFAULT_SAMPLE_BUDGET: u64 = 200_000;

/// Budget-capped, append-only sample of diff text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSample {
    remaining: u64,
    buffer: String,
}

impl DiffSample {
    /// Creates an empty sample with the given byte budget.
    #[must_use]
    pub const fn new(budget: u64) -> Self {
        Self {
            remaining: budget,
            buffer: String::new(),
        }
    }

    /// Appends a prefix of `diff`, bounded by the remaining budget.
    ///
    /// Takes `min(remaining, diff.len())` bytes from the start of the diff,
    /// backed off to the nearest UTF-8 character boundary, and decrements
    /// the budget by the bytes actually copied.
    pub fn absorb(&mut self, diff: &str) {
        if self.remaining == 0 || diff.is_empty() {
            return;
        }

        let budgeted = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(diff.len());
        let mut end = budgeted;
        while end > 0 && !diff.is_char_boundary(end) {
            end -= 1;
        }

        let Some(prefix) = diff.get(..end) else {
            return;
        };
        self.buffer.push_str(prefix);
        self.remaining = self.remaining.saturating_sub(u64::try_from(end).unwrap_or(0));
    }

    /// Borrow the sampled text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Remaining budget in bytes.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns true when nothing has been sampled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for DiffSample {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::DiffSample;

    #[test]
    fn absorbs_whole_diffs_while_budget_lasts() {
        let mut sample = DiffSample::new(10);
        sample.absorb("abcd");
        sample.absorb("efg");

        assert_eq!(sample.text(), "abcdefg");
        assert_eq!(sample.remaining(), 3);
    }

    #[test]
    fn oversized_diff_contributes_only_a_prefix() {
        let mut sample = DiffSample::new(4);
        sample.absorb("abcdefgh");

        assert_eq!(sample.text(), "abcd");
        assert_eq!(sample.remaining(), 0);
    }

    #[test]
    fn exhausted_budget_appends_nothing_further() {
        let mut sample = DiffSample::new(3);
        sample.absorb("abc");
        sample.absorb("def");

        assert_eq!(sample.text(), "abc");
        assert_eq!(sample.remaining(), 0);
    }

    #[rstest]
    #[case(vec!["abc", "defghij", "k", ""], 5)]
    #[case(vec!["abcdefghijklmnop"], 5)]
    #[case(vec!["a"; 12], 5)]
    fn buffer_never_exceeds_the_initial_budget(
        #[case] diffs: Vec<&str>,
        #[case] budget: u64,
    ) {
        let mut sample = DiffSample::new(budget);
        for diff in diffs {
            sample.absorb(diff);
            let used = u64::try_from(sample.text().len()).expect("sample fits in u64");
            assert!(used <= budget);
            assert_eq!(sample.remaining(), budget - used);
        }
    }

    #[test]
    fn cut_points_back_off_to_utf8_boundaries() {
        // "é" is two bytes, so a 2-byte budget cannot take half of it.
        let mut sample = DiffSample::new(2);
        sample.absorb("aéé");

        assert_eq!(sample.text(), "a");
        assert_eq!(sample.remaining(), 1);
    }

    #[test]
    fn aligned_cut_points_take_the_full_budget() {
        let mut sample = DiffSample::new(3);
        sample.absorb("aéé");

        assert_eq!(sample.text(), "aé");
        assert_eq!(sample.remaining(), 0);
    }

    #[test]
    fn empty_diff_is_a_no_op() {
        let mut sample = DiffSample::new(5);
        sample.absorb("");

        assert!(sample.is_empty());
        assert_eq!(sample.remaining(), 5);
    }
}
