//! Work list of groups awaiting a split decision.

/// A group of items that is either split again or finalised as a cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct ClusterItem {
    members: Vec<usize>,
    /// Split generation that produced this item; `0` for input groups.
    generation: usize,
}

impl ClusterItem {
    pub(super) fn new(members: Vec<usize>, generation: usize) -> Self {
        Self {
            members,
            generation,
        }
    }

    #[rustfmt::skip]
    pub(super) fn members(&self) -> &[usize] { &self.members }

    #[rustfmt::skip]
    pub(super) fn len(&self) -> usize { self.members.len() }

    #[rustfmt::skip]
    pub(super) fn generation(&self) -> usize { self.generation }
}

/// LIFO stack of [`ClusterItem`]s.
///
/// Every item on the stack is disjoint from every other item and from the
/// clusters already finalised.
#[derive(Debug, Default)]
pub(super) struct ClusterStack {
    items: Vec<ClusterItem>,
}

impl ClusterStack {
    /// Creates a stack that pops `roots` in their given order.
    pub(super) fn with_roots(mut roots: Vec<ClusterItem>) -> Self {
        roots.reverse();
        Self { items: roots }
    }

    pub(super) fn push(&mut self, item: ClusterItem) {
        self.items.push(item);
    }

    pub(super) fn pop(&mut self) -> Option<ClusterItem> {
        self.items.pop()
    }
}
