//! Top-down greedy clustering by repeated bisection.
//!
//! Groups are split around two approximately extreme members until every
//! group is smaller than twice the minimum cluster size. Each split hands
//! both centres `min_cluster_size - 1` of their nearest members before the
//! two sides alternate, so no side ever drops below the minimum.

mod dist_list;
mod stack;

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{debug, instrument, trace};

use self::dist_list::{ClaimMarks, DistanceList};
use self::stack::{ClusterItem, ClusterStack};
use crate::{
    clustering::Clustering,
    datasource::DataSource,
    error::ClusteringError,
};

/// Partitions every item of `source` into clusters of at least
/// `min_cluster_size` members.
///
/// # Errors
/// Returns [`ClusteringError::EmptySource`] when the source is empty,
/// [`ClusteringError::InsufficientItems`] when it holds fewer than
/// `min_cluster_size` items, [`ClusteringError::NonFiniteDistance`] or
/// [`ClusteringError::DataSource`] when a distance cannot be used, and
/// [`ClusteringError::AllocationFailed`] when working storage cannot be
/// reserved. No partial clustering is returned.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use mincluster_core::{PointMatrix, greedy_clustering};
///
/// let points = PointMatrix::from_rows(
///     "line",
///     vec![vec![0.0], vec![0.1], vec![0.2], vec![5.0], vec![5.1], vec![5.2]],
/// )?;
/// let min = NonZeroUsize::new(3).expect("non-zero");
/// let clustering = greedy_clustering(&points, min)?;
/// assert_eq!(clustering.cluster_count(), 2);
/// assert_eq!(clustering.cluster_sizes(), vec![3, 3]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.greedy_clustering",
    err,
    skip(source),
    fields(
        data_source = %source.name(),
        items = source.len(),
        min_cluster_size = %min_cluster_size,
    ),
)]
pub fn greedy_clustering<D: DataSource>(
    source: &D,
    min_cluster_size: NonZeroUsize,
) -> Result<Clustering, ClusteringError> {
    let items = source.len();
    if items == 0 {
        return Err(ClusteringError::EmptySource {
            data_source: Arc::from(source.name()),
        });
    }
    if items < min_cluster_size.get() {
        return Err(ClusteringError::InsufficientItems {
            data_source: Arc::from(source.name()),
            items,
            min_cluster_size,
        });
    }

    let mut members = try_vec(items, "member list")?;
    members.extend(0..items);
    Splitter::new(source, min_cluster_size)?.run(vec![ClusterItem::new(members, 0)])
}

/// Splits every cluster of `clustering` further, keeping unassigned items
/// unassigned.
///
/// Clusters smaller than twice `min_cluster_size` are kept whole. Labels of
/// the result are renumbered in order of the input clusters.
///
/// # Errors
/// Returns [`ClusteringError::LabelCountMismatch`] when `clustering` does not
/// cover exactly the items of `source`, and otherwise the same errors as
/// [`greedy_clustering`] apart from the size checks.
#[instrument(
    name = "core.greedy_refine",
    err,
    skip(source, clustering),
    fields(
        data_source = %source.name(),
        items = source.len(),
        clusters = clustering.cluster_count(),
        min_cluster_size = %min_cluster_size,
    ),
)]
pub fn refine<D: DataSource>(
    source: &D,
    min_cluster_size: NonZeroUsize,
    clustering: &Clustering,
) -> Result<Clustering, ClusteringError> {
    if clustering.len() != source.len() {
        return Err(ClusteringError::LabelCountMismatch {
            labels: clustering.len(),
            items: source.len(),
        });
    }

    let mut groups: Vec<Vec<usize>> = clustering
        .cluster_sizes()
        .into_iter()
        .map(Vec::with_capacity)
        .collect();
    for (item, label) in clustering.labels().iter().enumerate() {
        if let Some(id) = label
            && let Some(group) = groups.get_mut(id.get())
        {
            group.push(item);
        }
    }
    let roots = groups
        .into_iter()
        .map(|members| ClusterItem::new(members, 0))
        .collect();
    Splitter::new(source, min_cluster_size)?.run(roots)
}

/// Reserves exactly `capacity` slots, reporting failure as
/// [`ClusteringError::AllocationFailed`].
fn try_vec<T>(capacity: usize, what: &'static str) -> Result<Vec<T>, ClusteringError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| ClusteringError::AllocationFailed { what })?;
    Ok(buffer)
}

/// The two split centres and the distances from `a` to every member.
struct Centres {
    a: usize,
    b: usize,
    from_a: Vec<f64>,
}

/// State of one clustering run.
struct Splitter<'a, D: DataSource> {
    source: &'a D,
    min_cluster_size: usize,
    split_threshold: usize,
    marks: ClaimMarks,
    clustering: Clustering,
}

impl<'a, D: DataSource> Splitter<'a, D> {
    fn new(source: &'a D, min_cluster_size: NonZeroUsize) -> Result<Self, ClusteringError> {
        let items = source.len();
        Ok(Self {
            source,
            min_cluster_size: min_cluster_size.get(),
            split_threshold: min_cluster_size.get().saturating_mul(2),
            marks: ClaimMarks::new(items)?,
            clustering: Clustering::unassigned(items),
        })
    }

    fn run(mut self, roots: Vec<ClusterItem>) -> Result<Clustering, ClusteringError> {
        let mut stack = ClusterStack::with_roots(roots);
        let mut splits = 0usize;
        while let Some(item) = stack.pop() {
            if item.len() < self.split_threshold {
                self.finalise(&item);
                continue;
            }
            let Some(centres) = self.find_centres(item.members())? else {
                self.finalise(&item);
                continue;
            };
            let (left, right) = self.split(&item, &centres)?;
            splits += 1;
            record_split();
            trace!(
                generation = left.generation(),
                parent = item.len(),
                left = left.len(),
                right = right.len(),
                "split group"
            );
            for half in [left, right] {
                if half.len() >= self.split_threshold {
                    stack.push(half);
                } else {
                    self.finalise(&half);
                }
            }
        }
        debug!(
            splits,
            clusters = self.clustering.cluster_count(),
            "greedy clustering finished"
        );
        Ok(self.clustering)
    }

    fn finalise(&mut self, item: &ClusterItem) {
        if item.members().is_empty() {
            return;
        }
        let id = self.clustering.open_cluster();
        for &member in item.members() {
            self.clustering.assign(member, id);
        }
    }

    /// Picks the member farthest from the first member, then the member
    /// farthest from that one. Ties go to the lowest id.
    fn find_centres(&self, members: &[usize]) -> Result<Option<Centres>, ClusteringError> {
        let Some(&start) = members.first() else {
            return Ok(None);
        };
        let from_start = self.distances_from(start, members)?;
        let Some(a) = farthest(members, &from_start, None) else {
            return Ok(None);
        };
        let from_a = self.distances_from(a, members)?;
        Ok(farthest(members, &from_a, Some(a)).map(|b| Centres { a, b, from_a }))
    }

    fn split(
        &mut self,
        item: &ClusterItem,
        centres: &Centres,
    ) -> Result<(ClusterItem, ClusterItem), ClusteringError> {
        let members = item.members();
        let (a, b) = (centres.a, centres.b);
        let from_b = self.distances_from(b, members)?;
        let mut list_a = DistanceList::populate(members, &centres.from_a, [a, b])?;
        let mut list_b = DistanceList::populate(members, &from_b, [a, b])?;

        let generation = self.marks.advance();
        self.marks.claim(a);
        self.marks.claim(b);
        let mut side_a = try_vec(members.len(), "split side")?;
        let mut side_b = try_vec(members.len(), "split side")?;
        side_a.push(a);
        side_b.push(b);

        let quota = self.min_cluster_size - 1;
        list_a.take_first_k(quota, &mut self.marks, &mut side_a);
        list_b.take_first_k(quota, &mut self.marks, &mut side_b);
        while side_a.len() + side_b.len() < members.len() {
            let mut progressed = false;
            if let Some(member) = list_a.take_next(&mut self.marks) {
                side_a.push(member);
                progressed = true;
            }
            if side_a.len() + side_b.len() < members.len()
                && let Some(member) = list_b.take_next(&mut self.marks)
            {
                side_b.push(member);
                progressed = true;
            }
            if !progressed {
                break;
            }
        }

        top_up(&mut side_a, &mut side_b, self.min_cluster_size);
        top_up(&mut side_b, &mut side_a, self.min_cluster_size);
        Ok((
            ClusterItem::new(side_a, generation),
            ClusterItem::new(side_b, generation),
        ))
    }

    fn distances_from(
        &self,
        query: usize,
        members: &[usize],
    ) -> Result<Vec<f64>, ClusteringError> {
        let distances = self
            .source
            .batch_distances(query, members)
            .map_err(|error| ClusteringError::DataSource {
                data_source: Arc::from(self.source.name()),
                error,
            })?;
        if let Some((&member, _)) = members
            .iter()
            .zip(&distances)
            .find(|&(_, distance)| !distance.is_finite())
        {
            return Err(ClusteringError::NonFiniteDistance {
                left: query,
                right: member,
            });
        }
        Ok(distances)
    }
}

/// Member with the largest distance, skipping `skip`; ties go to the lowest
/// id.
fn farthest(members: &[usize], distances: &[f64], skip: Option<usize>) -> Option<usize> {
    members
        .iter()
        .zip(distances)
        .filter(|&(&member, _)| Some(member) != skip)
        .fold(None, |best: Option<(usize, f64)>, (&member, &distance)| match best {
            Some((kept, kept_distance))
                if kept_distance.total_cmp(&distance).then(member.cmp(&kept)).is_gt() =>
            {
                Some((kept, kept_distance))
            }
            _ => Some((member, distance)),
        })
        .map(|(member, _)| member)
}

/// Moves the most recently claimed members of `donor` to `short` until
/// `short` reaches `min` members. The donor's centre is never moved.
fn top_up(short: &mut Vec<usize>, donor: &mut Vec<usize>, min: usize) {
    while short.len() < min && donor.len() > min.max(1) {
        if let Some(member) = donor.pop() {
            short.push(member);
        }
    }
}

#[cfg(feature = "metrics")]
fn record_split() {
    metrics::counter!("mincluster_greedy_splits").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_split() {}
