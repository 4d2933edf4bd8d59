//! Distance-sorted candidate lists for splitting a group around two centres.

use super::try_vec;
use crate::error::ClusteringError;

/// Per-item claim stamps for the current split.
///
/// A vertex is claimed when its stamp equals the current generation, so
/// starting a new split only bumps the counter.
#[derive(Debug)]
pub(super) struct ClaimMarks {
    stamps: Vec<usize>,
    generation: usize,
}

impl ClaimMarks {
    pub(super) fn new(items: usize) -> Result<Self, ClusteringError> {
        let mut stamps = try_vec(items, "claim marks")?;
        stamps.resize(items, 0);
        Ok(Self {
            stamps,
            generation: 0,
        })
    }

    /// Starts a new split, releasing every claim, and returns its
    /// generation.
    pub(super) fn advance(&mut self) -> usize {
        self.generation += 1;
        self.generation
    }

    pub(super) fn claim(&mut self, item: usize) {
        self.stamps[item] = self.generation;
    }

    pub(super) fn is_claimed(&self, item: usize) -> bool {
        self.stamps[item] == self.generation
    }
}

/// Members of a group sorted by distance to one centre, ties by id, with a
/// cursor past the entries already consumed.
#[derive(Debug)]
pub(super) struct DistanceList {
    entries: Vec<(f64, usize)>,
    cursor: usize,
}

impl DistanceList {
    /// Builds the sorted list from `members` and their `distances` to the
    /// centre, leaving out both centres.
    pub(super) fn populate(
        members: &[usize],
        distances: &[f64],
        centres: [usize; 2],
    ) -> Result<Self, ClusteringError> {
        let mut entries = try_vec(members.len(), "distance list")?;
        entries.extend(
            members
                .iter()
                .zip(distances)
                .filter(|&(member, _)| !centres.contains(member))
                .map(|(&member, &distance)| (distance, member)),
        );
        entries.sort_unstable_by(|left, right| {
            left.0.total_cmp(&right.0).then(left.1.cmp(&right.1))
        });
        Ok(Self { entries, cursor: 0 })
    }

    /// Claims and returns the nearest unclaimed member.
    pub(super) fn take_next(&mut self, marks: &mut ClaimMarks) -> Option<usize> {
        while let Some(&(_, member)) = self.entries.get(self.cursor) {
            self.cursor += 1;
            if !marks.is_claimed(member) {
                marks.claim(member);
                return Some(member);
            }
        }
        None
    }

    /// Claims up to `k` of the nearest unclaimed members into `side`.
    pub(super) fn take_first_k(&mut self, k: usize, marks: &mut ClaimMarks, side: &mut Vec<usize>) {
        for _ in 0..k {
            match self.take_next(marks) {
                Some(member) => side.push(member),
                None => break,
            }
        }
    }
}
