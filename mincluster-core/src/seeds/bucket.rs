//! Bucket-sorted priority index over vertex scores.
//!
//! Every vertex lives in one flat `queue`, sorted by slot, where a slot is a
//! score bucket in pop order. `slot_start[k]` is the first position of slot
//! `k` and `position_of[v]` is the position of `v`, so moving a vertex to the
//! neighbouring slot is one swap plus a boundary shift. Popping advances a
//! cursor over the queue; positions before the cursor have been handed out.
//!
//! Within a slot, unpopped vertices stay in ascending id order. A decrease
//! swaps the moving vertex with the vertex at the slot boundary and then
//! restores the order of both slots by insertion steps.

/// Which end of the score range [`BucketQueue::pop`] serves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PopOrder {
    LowestFirst,
    HighestFirst,
}

#[derive(Clone, Debug)]
pub(crate) struct BucketQueue {
    order: PopOrder,
    max_score: usize,
    queue: Vec<usize>,
    position_of: Vec<usize>,
    slot_start: Vec<usize>,
    scores: Vec<usize>,
    removed: Vec<bool>,
    cursor: usize,
}

impl BucketQueue {
    /// Builds the index from one score per vertex.
    pub(crate) fn new(scores: Vec<usize>, order: PopOrder) -> Self {
        let max_score = scores.iter().copied().max().unwrap_or(0);
        let slots = max_score + 1;
        let slot_of = |score: usize| match order {
            PopOrder::LowestFirst => score,
            PopOrder::HighestFirst => max_score - score,
        };

        let mut slot_start = vec![0; slots + 1];
        for &score in &scores {
            slot_start[slot_of(score) + 1] += 1;
        }
        for slot in 0..slots {
            slot_start[slot + 1] += slot_start[slot];
        }

        let mut next = slot_start[..slots].to_vec();
        let mut queue = vec![0; scores.len()];
        let mut position_of = vec![0; scores.len()];
        for (vertex, &score) in scores.iter().enumerate() {
            let slot = slot_of(score);
            queue[next[slot]] = vertex;
            position_of[vertex] = next[slot];
            next[slot] += 1;
        }

        Self {
            order,
            max_score,
            removed: vec![false; scores.len()],
            queue,
            position_of,
            slot_start,
            scores,
            cursor: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn score(&self, vertex: usize) -> usize {
        self.scores[vertex]
    }

    /// Returns `true` while `vertex` has neither been popped nor removed.
    pub(crate) fn is_queued(&self, vertex: usize) -> bool {
        !self.removed[vertex] && self.position_of[vertex] >= self.cursor
    }

    /// Withdraws `vertex` so it is never popped.
    pub(crate) fn remove(&mut self, vertex: usize) {
        self.removed[vertex] = true;
    }

    /// Hands out the next queued vertex in score order, ties by ascending id.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        while let Some(&vertex) = self.queue.get(self.cursor) {
            self.cursor += 1;
            if !self.removed[vertex] {
                return Some(vertex);
            }
        }
        None
    }

    /// Lowers the score of a queued vertex by one and re-buckets it.
    ///
    /// Popped, removed and zero-score vertices are left untouched.
    pub(crate) fn decrease(&mut self, vertex: usize) {
        if !self.is_queued(vertex) || self.scores[vertex] == 0 {
            return;
        }
        let score = self.scores[vertex];
        self.scores[vertex] = score - 1;
        match self.order {
            PopOrder::LowestFirst => self.move_to_previous_slot(vertex, score),
            PopOrder::HighestFirst => self.move_to_next_slot(vertex, self.max_score - score),
        }
    }

    /// Moves `vertex` from slot `slot` into slot `slot - 1`, which pops
    /// earlier.
    fn move_to_previous_slot(&mut self, vertex: usize, slot: usize) {
        let front = self.slot_start[slot].max(self.cursor);
        let displaced = self.queue[front];
        self.swap(front, self.position_of[vertex]);
        self.slot_start[slot] = front + 1;

        if displaced != vertex {
            self.sink(displaced, self.slot_start[slot]);
        }
        let floor = self.slot_start[slot - 1].max(self.cursor);
        self.sink(vertex, floor);
    }

    /// Moves `vertex` from slot `slot` into slot `slot + 1`, which pops
    /// later.
    fn move_to_next_slot(&mut self, vertex: usize, slot: usize) {
        let back = self.slot_start[slot + 1] - 1;
        let displaced = self.queue[back];
        self.swap(back, self.position_of[vertex]);
        self.slot_start[slot + 1] = back;

        if displaced != vertex {
            self.rise(displaced, back);
        }
        self.rise(vertex, self.slot_start[slot + 2]);
    }

    /// Moves `vertex` towards the front while its predecessor has a larger
    /// id and sits at or after `floor`.
    fn sink(&mut self, vertex: usize, floor: usize) {
        let mut position = self.position_of[vertex];
        while position > floor && self.queue[position - 1] > vertex {
            self.swap(position - 1, position);
            position -= 1;
        }
    }

    /// Moves `vertex` towards the back while its successor has a smaller id
    /// and sits before `ceiling`.
    fn rise(&mut self, vertex: usize, ceiling: usize) {
        let mut position = self.position_of[vertex];
        while position + 1 < ceiling && self.queue[position + 1] < vertex {
            self.swap(position, position + 1);
            position += 1;
        }
    }

    fn swap(&mut self, left: usize, right: usize) {
        self.queue.swap(left, right);
        self.position_of[self.queue[left]] = left;
        self.position_of[self.queue[right]] = right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn drain(queue: &mut BucketQueue) -> Vec<usize> {
        std::iter::from_fn(|| queue.pop()).collect()
    }

    #[rstest]
    #[case::lowest(PopOrder::LowestFirst, vec![1, 4, 0, 2, 3])]
    #[case::highest(PopOrder::HighestFirst, vec![3, 0, 2, 4, 1])]
    fn pops_by_score_then_id(#[case] order: PopOrder, #[case] expected: Vec<usize>) {
        let mut queue = BucketQueue::new(vec![2, 0, 2, 3, 1], order);
        assert_eq!(drain(&mut queue), expected);
    }

    #[test]
    fn decrease_keeps_both_buckets_sorted() {
        let mut queue = BucketQueue::new(vec![1, 2, 2, 2, 1], PopOrder::LowestFirst);
        queue.decrease(3);

        assert_eq!(queue.score(3), 1);
        assert_eq!(drain(&mut queue), vec![0, 3, 4, 1, 2]);
    }

    #[test]
    fn decrease_after_partial_drain_pops_next() {
        let mut queue = BucketQueue::new(vec![0, 1, 2, 2], PopOrder::LowestFirst);
        assert_eq!(queue.pop(), Some(0));
        assert_eq!(queue.pop(), Some(1));

        queue.decrease(3);

        assert_eq!(drain(&mut queue), vec![3, 2]);
    }

    #[test]
    fn decrease_in_highest_first_order_defers_vertex() {
        let mut queue = BucketQueue::new(vec![3, 3, 3, 1], PopOrder::HighestFirst);
        queue.decrease(0);
        queue.decrease(1);

        assert_eq!(drain(&mut queue), vec![2, 0, 1, 3]);
    }

    #[test]
    fn removed_and_popped_vertices_are_not_rebucketed() {
        let mut queue = BucketQueue::new(vec![1, 1, 2], PopOrder::LowestFirst);
        assert_eq!(queue.pop(), Some(0));
        queue.remove(1);
        queue.decrease(0);
        queue.decrease(1);

        assert!(!queue.is_queued(0));
        assert!(!queue.is_queued(1));
        assert!(queue.is_queued(2));
        assert_eq!(queue.score(0), 1);
        assert_eq!(drain(&mut queue), vec![2]);
    }

    #[test]
    fn zero_scores_do_not_underflow() {
        let mut queue = BucketQueue::new(vec![0, 0], PopOrder::HighestFirst);
        queue.decrease(1);
        assert_eq!(queue.score(1), 0);
        assert_eq!(drain(&mut queue), vec![0, 1]);
    }

    #[test]
    fn empty_index_pops_nothing() {
        let mut queue = BucketQueue::new(Vec::new(), PopOrder::LowestFirst);
        assert_eq!(queue.pop(), None);
    }
}
