//! Shuffle-bag sampling for non-repetitive narrative selection.
//!
//! Draws without replacement and refills only once the bag is empty, which
//! bounds both the overall repeat rate and the longest repeat run. An
//! explicit guard prevents the refill boundary from lining up the same
//! item three times in a row.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Without-replacement sampler over a fixed pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleBag<T> {
    pool: Vec<T>,
    remaining: Vec<T>,
    last: Option<T>,
    run_len: u8,
}

impl<T: Clone + PartialEq> ShuffleBag<T> {
    /// Build a bag over `pool`. Empty pools are permitted but can only be
    /// drawn from via `draw_or`, which then yields the fallback.
    #[must_use]
    pub fn new(pool: Vec<T>) -> Self {
        Self {
            remaining: pool.clone(),
            pool,
            last: None,
            run_len: 0,
        }
    }

    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Draw the next item, refilling the bag when exhausted.
    ///
    /// Returns `None` only for an empty pool.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        self.draw_where(rng, |_| true)
    }

    /// Draw the next item matching `eligible`, falling back to an arbitrary
    /// bag item when nothing in the current fill matches.
    pub fn draw_where<R, F>(&mut self, rng: &mut R, eligible: F) -> Option<T>
    where
        R: Rng + ?Sized,
        F: Fn(&T) -> bool,
    {
        if self.pool.is_empty() {
            return None;
        }
        if self.remaining.is_empty() {
            self.remaining.clone_from(&self.pool);
        }

        let pick = self
            .pick_index(rng, |item| eligible(item) && !self.would_repeat_thrice(item))
            .or_else(|| self.pick_index(rng, |item| !self.would_repeat_thrice(item)))
            .or_else(|| self.pick_index(rng, |_| true))?;
        let item = self.remaining.swap_remove(pick);

        if self.last.as_ref() == Some(&item) {
            self.run_len = self.run_len.saturating_add(1);
        } else {
            self.run_len = 1;
            self.last = Some(item.clone());
        }
        Some(item)
    }

    /// Draw with a fallback for empty pools.
    pub fn draw_or<R: Rng + ?Sized>(&mut self, rng: &mut R, fallback: T) -> T {
        self.draw(rng).unwrap_or(fallback)
    }

    fn pick_index<R, F>(&self, rng: &mut R, accept: F) -> Option<usize>
    where
        R: Rng + ?Sized,
        F: Fn(&T) -> bool,
    {
        let candidates: Vec<usize> = self
            .remaining
            .iter()
            .enumerate()
            .filter(|(_, item)| accept(item))
            .map(|(idx, _)| idx)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let choice = rng.gen_range(0..candidates.len());
        candidates.get(choice).copied()
    }

    fn would_repeat_thrice(&self, item: &T) -> bool {
        self.run_len >= 2 && self.last.as_ref() == Some(item)
    }
}
