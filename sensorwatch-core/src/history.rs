//! Bounded per-channel history of recent readings.

use std::collections::VecDeque;

use sensorwatch_types::ChannelPoint;

use crate::normalize::Reading;

/// An ordered, de-duplicating buffer of recent readings for one channel.
///
/// Insertion order is arrival order, with one override: a reading whose
/// label matches an existing entry replaces that entry in place. Bursty
/// sub-second traffic therefore coalesces into one slot per second instead
/// of flushing the visible history.
///
/// Invariants: `len() <= capacity`, at most one entry per distinct label.
#[derive(Debug, Clone)]
pub struct ChannelHistory {
    points: VecDeque<Reading>,
    capacity: usize,
}

impl ChannelHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a reading. Always succeeds.
    pub fn record(&mut self, reading: Reading) {
        if let Some(slot) = self.points.iter_mut().find(|r| r.label == reading.label) {
            // Same second: coalesce into the existing slot, keeping its
            // position.
            *slot = reading;
            return;
        }

        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(reading);
    }

    /// The most recently arrived reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.points.iter()
    }

    /// Snapshot view in arrival order.
    pub fn to_points(&self) -> Vec<ChannelPoint> {
        self.points
            .iter()
            .map(|r| ChannelPoint {
                label: r.label.clone(),
                value: r.value,
                raw_value: r.raw_value,
            })
            .collect()
    }
}
