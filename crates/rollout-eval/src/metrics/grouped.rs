//! Grouping of completed samples by problem

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::sample::EvalSample;

/// Completed samples keyed by problem id.
///
/// Iteration follows first-seen order of the problem ids; each group keeps its
/// samples in work-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedResults {
    order: Vec<String>,
    groups: HashMap<String, Vec<EvalSample>>,
}

impl GroupedResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample to its problem's group
    pub fn push(&mut self, sample: EvalSample) {
        match self.groups.get_mut(&sample.problem_id) {
            Some(group) => group.push(sample),
            None => {
                self.order.push(sample.problem_id.clone());
                self.groups.insert(sample.problem_id.clone(), vec![sample]);
            }
        }
    }

    pub fn get(&self, problem_id: &str) -> Option<&[EvalSample]> {
        self.groups.get(problem_id).map(Vec::as_slice)
    }

    /// Number of problems
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of samples across every group
    pub fn total_samples(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Problem ids in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(problem_id, samples)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EvalSample])> {
        self.order.iter().filter_map(|id| {
            self.groups
                .get(id)
                .map(|group| (id.as_str(), group.as_slice()))
        })
    }

    /// Every sample, group by group
    pub fn samples(&self) -> impl Iterator<Item = &EvalSample> {
        self.iter().flat_map(|(_, group)| group.iter())
    }
}

impl FromIterator<EvalSample> for GroupedResults {
    fn from_iter<I: IntoIterator<Item = EvalSample>>(iter: I) -> Self {
        let mut grouped = GroupedResults::new();
        for sample in iter {
            grouped.push(sample);
        }
        grouped
    }
}

impl Serialize for GroupedResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (id, group) in self.iter() {
            map.serialize_entry(id, group)?;
        }
        map.end()
    }
}

/// Folds recovered and fresh samples into [`GroupedResults`].
///
/// Each sample occupies the slot of its position in the expanded work list,
/// so the final grouping does not depend on completion order or on whether a
/// sample came from the checkpoint log.
#[derive(Debug)]
pub struct ResultAggregator {
    slots: Vec<Option<EvalSample>>,
    filled: usize,
}

impl ResultAggregator {
    /// Aggregator for a work list of `len` samples
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            filled: 0,
        }
    }

    /// Place the sample at work-list position `index`.
    ///
    /// Returns `false` if the position is out of range or already taken.
    pub fn insert(&mut self, index: usize, sample: EvalSample) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(sample);
        self.filled += 1;
        true
    }

    /// Positions filled so far
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Build the grouped view; unfilled positions are skipped
    pub fn finish(self) -> GroupedResults {
        self.slots.into_iter().flatten().collect()
    }
}
