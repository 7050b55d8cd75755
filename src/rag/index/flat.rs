// Exact L2 index over a dense row-major matrix
use std::cmp::Ordering;

use super::Neighbor;

/// Brute-force squared-L2 index. Rows are stored back to back.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Caller guarantees every row has length `dimension`
    pub(super) fn from_rows(dimension: usize, rows: &[Vec<f32>]) -> Self {
        let mut data = Vec::with_capacity(dimension * rows.len());
        for row in rows {
            data.extend_from_slice(row);
        }
        Self { dimension, data }
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `k` nearest rows, nearest first; equal distances keep ordinal order
    pub fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        if k == 0 || self.dimension == 0 {
            return Vec::new();
        }

        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(ordinal, row)| Neighbor {
                ordinal,
                distance: squared_l2(query, row),
            })
            .collect();

        scored.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
            Ordering::Equal => a.ordinal.cmp(&b.ordinal),
            other => other,
        });
        scored.truncate(k);
        scored
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_nearest_first() {
        let rows = vec![vec![10.0, 0.0], vec![1.0, 0.0], vec![5.0, 0.0]];
        let index = FlatL2Index::from_rows(2, &rows);
        let hits = index.search(&[0.0, 0.0], 3);
        let order: Vec<usize> = hits.iter().map(|n| n.ordinal).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert_eq!(hits[0].distance, 1.0);
    }

    #[test]
    fn test_ties_break_by_ordinal() {
        let rows = vec![vec![1.0], vec![-1.0], vec![1.0]];
        let index = FlatL2Index::from_rows(1, &rows);
        let order: Vec<usize> = index.search(&[0.0], 3).iter().map(|n| n.ordinal).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_k_larger_than_rows() {
        let rows = vec![vec![1.0, 1.0]];
        let index = FlatL2Index::from_rows(2, &rows);
        assert_eq!(index.len(), 1);
        assert_eq!(index.search(&[0.0, 0.0], 10).len(), 1);
        assert!(index.search(&[0.0, 0.0], 0).is_empty());
    }
}
