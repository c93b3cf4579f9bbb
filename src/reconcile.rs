//! Puts the selected rows into the optimizer's visiting order.

use serde::Serialize;

use crate::model::{Candidate, LatLon, OptimizedRoute};
use crate::{Error, Result};

/// Stops in visiting order plus the path to draw between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRoute {
    pub stops: Vec<Candidate>,
    pub geometry: Vec<LatLon>,
    pub total_distance_meters: f64,
}

pub fn reconcile(selected: &[Candidate], route: &OptimizedRoute) -> Result<ReconciledRoute> {
    check_permutation(&route.order, selected.len())?;

    let stops = route
        .order
        .iter()
        .map(|&idx| selected[idx].clone())
        .collect();

    Ok(ReconciledRoute {
        stops,
        geometry: route.path_geometry.clone(),
        total_distance_meters: route.total_distance_meters,
    })
}

fn check_permutation(order: &[usize], len: usize) -> Result<()> {
    if order.len() != len {
        return Err(Error::InvalidPermutation(format!(
            "expected {len} stops, optimizer returned {}",
            order.len()
        )));
    }
    let mut seen = vec![false; len];
    for &idx in order {
        match seen.get_mut(idx) {
            None => {
                return Err(Error::InvalidPermutation(format!(
                    "index {idx} is out of range for {len} stops"
                )));
            }
            Some(true) => {
                return Err(Error::InvalidPermutation(format!(
                    "index {idx} appears more than once"
                )));
            }
            Some(slot) => *slot = true,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("stop {i}"), (2.30 + i as f64 * 0.01, 48.85)))
            .collect()
    }

    fn route(order: Vec<usize>) -> OptimizedRoute {
        OptimizedRoute {
            order,
            path_geometry: vec![(48.85, 2.30), (48.851, 2.305), (48.85, 2.31), (48.85, 2.32)],
            total_distance_meters: 4200.0,
        }
    }

    /// Every permutation of `0..n`, Heap's algorithm.
    fn permutations(n: usize) -> Vec<Vec<usize>> {
        fn heap(k: usize, items: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            if k <= 1 {
                out.push(items.clone());
                return;
            }
            for i in 0..k - 1 {
                heap(k - 1, items, out);
                if k % 2 == 0 {
                    items.swap(i, k - 1);
                } else {
                    items.swap(0, k - 1);
                }
            }
            heap(k - 1, items, out);
        }
        let mut items: Vec<usize> = (0..n).collect();
        let mut out = Vec::new();
        heap(n, &mut items, &mut out);
        out
    }

    #[test]
    fn reorders_into_visiting_order() {
        let selected = selected(4);
        let result = reconcile(&selected, &route(vec![2, 0, 3, 1])).unwrap();
        assert_eq!(
            result.stops,
            vec![
                selected[2].clone(),
                selected[0].clone(),
                selected[3].clone(),
                selected[1].clone()
            ]
        );
    }

    #[test]
    fn geometry_passes_through_untouched() {
        let selected = selected(2);
        let route = route(vec![1, 0]);
        let result = reconcile(&selected, &route).unwrap();
        assert_eq!(result.geometry, route.path_geometry);
        assert_eq!(result.geometry.len(), 4);
        assert_eq!(result.total_distance_meters, 4200.0);
    }

    #[test]
    fn every_permutation_yields_each_row_once() {
        for n in 1..=5 {
            let selected = selected(n);
            for order in permutations(n) {
                let result = reconcile(&selected, &route(order.clone())).unwrap();
                assert_eq!(result.stops.len(), n);
                for candidate in &selected {
                    let hits = result.stops.iter().filter(|s| *s == candidate).count();
                    assert_eq!(hits, 1, "order {order:?}");
                }
            }
        }
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let err = reconcile(&selected(3), &route(vec![0, 0, 1])).unwrap_err();
        assert!(matches!(err, Error::InvalidPermutation(_)));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = reconcile(&selected(3), &route(vec![0, 1, 3])).unwrap_err();
        assert!(matches!(err, Error::InvalidPermutation(_)));
    }

    #[test]
    fn partial_order_is_rejected_not_truncated() {
        let err = reconcile(&selected(4), &route(vec![2, 0])).unwrap_err();
        assert!(matches!(err, Error::InvalidPermutation(_)));
        let err = reconcile(&selected(2), &route(vec![1, 0, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidPermutation(_)));
    }
}
