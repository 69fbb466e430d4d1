//! Bounded history windows with a pluggable reduction.
//!
//! The same window type backs the gesture label vote (mode) and the volume
//! level average (mean).

use std::{collections::VecDeque, fmt};

use crate::{EngineError, Result};

/// Collapses the contents of a window into a single output value.
pub trait Reduction<T> {
    type Output;

    /// Called with a non-empty window, oldest value first.
    fn reduce(&self, window: &VecDeque<T>) -> Self::Output;
}

/// Most frequent value; ties go to the value that appears first in the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mode;

impl<T: PartialEq + Clone> Reduction<T> for Mode {
    type Output = T;

    fn reduce(&self, window: &VecDeque<T>) -> T {
        let mut best: Option<(&T, usize)> = None;
        for (index, candidate) in window.iter().enumerate() {
            if window.iter().take(index).any(|seen| seen == candidate) {
                continue;
            }
            let count = window.iter().filter(|value| *value == candidate).count();
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((candidate, count));
            }
        }
        // The window is never empty when reduced.
        best.map(|(value, _)| value.clone())
            .unwrap_or_else(|| window[0].clone())
    }
}

/// Arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl Reduction<f32> for Mean {
    type Output = f32;

    fn reduce(&self, window: &VecDeque<f32>) -> f32 {
        let sum: f32 = window.iter().sum();
        sum / window.len() as f32
    }
}

/// FIFO of the last `capacity` values, reduced on every push.
pub struct TemporalSmoother<T, R> {
    capacity: usize,
    window: VecDeque<T>,
    reduction: R,
}

pub type ModeSmoother<T> = TemporalSmoother<T, Mode>;
pub type MeanSmoother = TemporalSmoother<f32, Mean>;

impl<T, R: Reduction<T>> TemporalSmoother<T, R> {
    pub fn new(capacity: usize, reduction: R) -> Result<Self> {
        if capacity == 0 {
            return Err(EngineError::config("smoothing window capacity must be positive"));
        }
        Ok(Self {
            capacity,
            window: VecDeque::with_capacity(capacity),
            reduction,
        })
    }

    /// Appends a value, evicting the oldest past capacity, and returns the
    /// reduced window.
    pub fn push(&mut self, value: T) -> Option<R::Output> {
        self.window.push_back(value);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
        self.current()
    }

    /// Reduction of the current window; `None` while empty.
    pub fn current(&self) -> Option<R::Output> {
        if self.window.is_empty() {
            None
        } else {
            Some(self.reduction.reduce(&self.window))
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.window.iter()
    }
}

impl<T: PartialEq + Clone> TemporalSmoother<T, Mode> {
    pub fn mode(capacity: usize) -> Result<Self> {
        Self::new(capacity, Mode)
    }
}

impl TemporalSmoother<f32, Mean> {
    pub fn mean(capacity: usize) -> Result<Self> {
        Self::new(capacity, Mean)
    }
}

impl<T: fmt::Debug, R: fmt::Debug> fmt::Debug for TemporalSmoother<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalSmoother")
            .field("capacity", &self.capacity)
            .field("window", &self.window)
            .field("reduction", &self.reduction)
            .finish()
    }
}
