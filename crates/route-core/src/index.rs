use crate::intervals::GenomeInterval;
use crate::strand::Strand;
use std::collections::HashMap;

/// Result of an interval query.
///
/// The neighbors are only set when nothing overlaps the query.
#[derive(Debug)]
pub struct QueryResult<'a, T> {
    pub entries: Vec<&'a T>,

    /// Element with the greatest `(end, begin)` among those ending at or before the query start.
    pub left: Option<&'a T>,

    /// First element in `(begin, end)` order among those starting at or after the query end.
    pub right: Option<&'a T>,
}

impl<'a, T> QueryResult<'a, T> {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            left: None,
            right: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Static augmented interval tree stored in a sorted array.
///
/// The implicit tree is rooted at the median of the begin-sorted elements; every node keeps
/// the max end of its subtree. Coordinates are 0-based, half-open.
#[derive(Debug, Clone)]
pub struct IntervalArray<T> {
    elements: Vec<T>,
    begins: Vec<u64>,
    ends: Vec<u64>,
    max_ends: Vec<u64>,

    /// Element indices sorted by (end, begin).
    by_end: Vec<usize>,
}

impl<T> Default for IntervalArray<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            begins: Vec::new(),
            ends: Vec::new(),
            max_ends: Vec::new(),
            by_end: Vec::new(),
        }
    }
}

impl<T> IntervalArray<T> {
    pub fn new<F>(elements: Vec<T>, extractor: F) -> Self
    where
        F: Fn(&T) -> (u64, u64),
    {
        let mut keyed: Vec<((u64, u64), T)> = elements
            .into_iter()
            .map(|element| (extractor(&element), element))
            .collect();
        // stable: ties keep input order
        keyed.sort_by_key(|(key, _)| *key);

        let (begins, ends): (Vec<u64>, Vec<u64>) = keyed.iter().map(|(key, _)| *key).unzip();
        let elements: Vec<T> = keyed.into_iter().map(|(_, element)| element).collect();

        let mut by_end: Vec<usize> = (0..elements.len()).collect();
        by_end.sort_by_key(|&i| (ends[i], begins[i], i));

        let mut array = Self {
            max_ends: vec![0; elements.len()],
            elements,
            begins,
            ends,
            by_end,
        };
        array.compute_max_ends(0, array.elements.len());
        array
    }

    fn compute_max_ends(&mut self, left: usize, right: usize) -> u64 {
        if left >= right {
            return 0;
        }
        let center = left + (right - left) / 2;

        let max_end = self.ends[center]
            .max(self.compute_max_ends(left, center))
            .max(self.compute_max_ends(center + 1, right));
        self.max_ends[center] = max_end;
        max_end
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in `(begin, end)` order.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn overlapping(&self, begin: u64, end: u64) -> QueryResult<'_, T> {
        if self.is_empty() {
            return QueryResult::empty();
        }

        let mut indices = Vec::new();
        self.query(0, self.elements.len(), begin, end, &mut indices);

        if !indices.is_empty() {
            return QueryResult {
                entries: indices.into_iter().map(|i| &self.elements[i]).collect(),
                left: None,
                right: None,
            };
        }

        let n_ending_before = self.by_end.partition_point(|&i| self.ends[i] <= begin);
        let left = n_ending_before
            .checked_sub(1)
            .map(|pos| &self.elements[self.by_end[pos]]);

        let first_starting_after = self.begins.partition_point(|&b| b < end);
        let right = self.elements.get(first_starting_after);

        QueryResult {
            entries: Vec::new(),
            left,
            right,
        }
    }

    /// In-order walk, so the output stays sorted by (begin, end).
    fn query(&self, left: usize, right: usize, begin: u64, end: u64, out: &mut Vec<usize>) {
        if left >= right {
            return;
        }
        let center = left + (right - left) / 2;
        if self.max_ends[center] <= begin {
            return;
        }

        self.query(left, center, begin, end, out);

        if self.begins[center] < end && begin < self.ends[center] {
            out.push(center);
        }

        if self.begins[center] >= end {
            return;
        }

        self.query(center + 1, right, begin, end, out);
    }
}

/// One interval array per contig, keyed on the forward strand.
#[derive(Debug)]
pub struct GenomeIndex<T: GenomeInterval> {
    arrays: HashMap<usize, IntervalArray<T>>,
}

impl<T: GenomeInterval> Default for GenomeIndex<T> {
    fn default() -> Self {
        Self {
            arrays: HashMap::new(),
        }
    }
}

impl<T: GenomeInterval> GenomeIndex<T> {
    pub fn new(elements: Vec<T>) -> Self {
        let mut by_contig: HashMap<usize, Vec<T>> = HashMap::new();
        for element in elements {
            by_contig
                .entry(element.contig_index())
                .or_default()
                .push(element);
        }

        let arrays = by_contig
            .into_iter()
            .map(|(contig_index, elements)| {
                (
                    contig_index,
                    IntervalArray::new(elements, |e| {
                        (
                            e.start_on_strand(Strand::Forward),
                            e.end_on_strand(Strand::Forward),
                        )
                    }),
                )
            })
            .collect();

        Self { arrays }
    }

    pub fn len(&self) -> usize {
        self.arrays.values().map(|a| a.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlapping<R: GenomeInterval + ?Sized>(&self, region: &R) -> QueryResult<'_, T> {
        match self.arrays.get(&region.contig_index()) {
            Some(array) => array.overlapping(
                region.start_on_strand(Strand::Forward),
                region.end_on_strand(Strand::Forward),
            ),
            None => QueryResult::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: usize,
        begin: u64,
        end: u64,
    }

    fn get_test_array() -> IntervalArray<Item> {
        let items = vec![
            Item { id: 0, begin: 10, end: 20 },
            Item { id: 1, begin: 15, end: 40 },
            Item { id: 2, begin: 50, end: 60 },
            Item { id: 3, begin: 50, end: 55 },
            Item { id: 4, begin: 70, end: 70 },
            Item { id: 5, begin: 90, end: 100 },
        ];
        IntervalArray::new(items, |i| (i.begin, i.end))
    }

    fn ids(items: &[&Item]) -> Vec<usize> {
        items.iter().map(|i| i.id).collect()
    }

    #[rstest]
    #[case(0, 10, vec![])]
    #[case(0, 11, vec![0])]
    #[case(19, 21, vec![0, 1])]
    #[case(30, 52, vec![1, 3, 2])]
    #[case(55, 56, vec![2])]
    #[case(16, 16, vec![0, 1])]
    #[case(100, 200, vec![])]
    fn test_overlapping(#[case] begin: u64, #[case] end: u64, #[case] expected: Vec<usize>) {
        let array = get_test_array();
        assert_eq!(ids(&array.overlapping(begin, end).entries), expected);
    }

    #[rstest]
    #[case(0, 5, None, Some(0))]
    #[case(40, 50, Some(1), Some(3))]
    #[case(60, 65, Some(2), Some(4))]
    #[case(71, 80, Some(4), Some(5))]
    #[case(100, 120, Some(5), None)]
    fn test_neighbors(
        #[case] begin: u64,
        #[case] end: u64,
        #[case] left: Option<usize>,
        #[case] right: Option<usize>,
    ) {
        let array = get_test_array();
        let result = array.overlapping(begin, end);
        assert!(result.is_empty());
        assert_eq!(result.left.map(|i| i.id), left);
        assert_eq!(result.right.map(|i| i.id), right);
    }

    #[test]
    fn test_neighbors_not_reported_on_overlap() {
        let array = get_test_array();
        let result = array.overlapping(12, 13);
        assert_eq!(ids(&result.entries), vec![0]);
        assert!(result.left.is_none() && result.right.is_none());
    }

    #[test]
    fn test_empty_array() {
        let array: IntervalArray<Item> = IntervalArray::new(Vec::new(), |i| (i.begin, i.end));
        let result = array.overlapping(0, 1000);
        assert!(result.is_empty());
        assert!(result.left.is_none() && result.right.is_none());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let items = vec![
            Item { id: 0, begin: 5, end: 10 },
            Item { id: 1, begin: 5, end: 10 },
            Item { id: 2, begin: 1, end: 10 },
        ];
        let array = IntervalArray::new(items, |i| (i.begin, i.end));
        assert_eq!(ids(&array.overlapping(0, 20).entries), vec![2, 0, 1]);
    }

    #[test]
    fn test_random_queries_match_linear_scan() {
        let mut rng = StdRng::seed_from_u64(42);

        for n_items in [1usize, 2, 7, 100, 500] {
            let items: Vec<Item> = (0..n_items)
                .map(|id| {
                    let begin = rng.gen_range(0..10_000u64);
                    let length = rng.gen_range(0..300u64);
                    Item {
                        id,
                        begin,
                        end: begin + length,
                    }
                })
                .collect();
            let array = IntervalArray::new(items.clone(), |i| (i.begin, i.end));

            for _ in 0..1000 {
                let begin = rng.gen_range(0..10_500u64);
                let end = begin + rng.gen_range(0..500u64);
                let result = array.overlapping(begin, end);

                let mut expected: Vec<&Item> = items
                    .iter()
                    .filter(|i| i.begin < end && begin < i.end)
                    .collect();
                expected.sort_by_key(|i| (i.begin, i.end, i.id));
                assert_eq!(ids(&result.entries), ids(&expected));

                if expected.is_empty() {
                    let left = items
                        .iter()
                        .filter(|i| i.end <= begin)
                        .map(|i| (i.end, i.begin))
                        .max();
                    let right = items
                        .iter()
                        .filter(|i| i.begin >= end)
                        .map(|i| (i.begin, i.end))
                        .min();
                    assert_eq!(result.left.map(|i| (i.end, i.begin)), left);
                    assert_eq!(result.right.map(|i| (i.begin, i.end)), right);
                }
            }
        }
    }
}
