// KdTree - Balanced spatial partition over descriptors
//
// Built in one pass by median splits on a cycling axis. The tree is never
// updated in place; the index throws it away and builds a new one whenever
// the collection changes.
//
// Search is exact k-nearest-neighbor under L1 distance. Candidates are
// ordered by (distance, position), so equal distances resolve to the
// lowest position regardless of tree shape.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::analysis::{Descriptor, DESCRIPTOR_DIM};

struct Node {
    point: Descriptor,
    /// Position of the point in the slice the tree was built from
    position: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// A search hit: position in the build slice and L1 distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

impl Eq for Neighbor {}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct KdTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl KdTree {
    /// Build a balanced tree over `points`
    pub fn build(points: &[Descriptor]) -> Self {
        let mut items: Vec<(usize, Descriptor)> = points.iter().copied().enumerate().collect();
        let mut nodes = Vec::with_capacity(items.len());
        let root = Self::build_recursive(&mut items, 0, &mut nodes);
        Self { nodes, root }
    }

    fn build_recursive(
        items: &mut [(usize, Descriptor)],
        depth: usize,
        nodes: &mut Vec<Node>,
    ) -> Option<usize> {
        if items.is_empty() {
            return None;
        }

        let axis = depth % DESCRIPTOR_DIM;
        let median = items.len() / 2;
        items.select_nth_unstable_by(median, |a, b| {
            a.1[axis].total_cmp(&b.1[axis]).then(a.0.cmp(&b.0))
        });

        let (position, point) = items[median];
        let index = nodes.len();
        nodes.push(Node {
            point,
            position,
            axis,
            left: None,
            right: None,
        });

        let (left_items, rest) = items.split_at_mut(median);
        let left = Self::build_recursive(left_items, depth + 1, nodes);
        let right = Self::build_recursive(&mut rest[1..], depth + 1, nodes);

        nodes[index].left = left;
        nodes[index].right = right;
        Some(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the `k` nearest points to `query`, sorted by ascending distance
    /// then ascending position. Returns every point when `k >= len`.
    pub fn nearest(&self, query: &Descriptor, k: usize) -> Vec<Neighbor> {
        let root = match self.root {
            Some(root) if k > 0 => root,
            _ => return Vec::new(),
        };

        let mut best = BinaryHeap::with_capacity(k.min(self.nodes.len()) + 1);
        self.search(root, query, k, &mut best);
        best.into_sorted_vec()
    }

    fn search(
        &self,
        node_index: usize,
        query: &Descriptor,
        k: usize,
        best: &mut BinaryHeap<Neighbor>,
    ) {
        let node = &self.nodes[node_index];

        let candidate = Neighbor {
            position: node.position,
            distance: query.l1_distance(&node.point),
        };
        if best.len() < k {
            best.push(candidate);
        } else if best.peek().is_some_and(|worst| candidate < *worst) {
            best.pop();
            best.push(candidate);
        }

        // Left subtree holds values <= split, right subtree values >= split
        let diff = query[node.axis] - node.point[node.axis];
        let (near, far) = if diff <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.search(near, query, k, best);
        }

        if let Some(far) = far {
            // Equal bounds are still visited: a tie there may carry a lower position
            let reachable = best.len() < k
                || best
                    .peek()
                    .map_or(true, |worst| diff.abs() <= worst.distance);
            if reachable {
                self.search(far, query, k, best);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn brute_force(points: &[Descriptor], query: &Descriptor, k: usize) -> Vec<Neighbor> {
        let mut all: Vec<Neighbor> = points
            .iter()
            .enumerate()
            .map(|(position, p)| Neighbor {
                position,
                distance: query.l1_distance(p),
            })
            .collect();
        all.sort();
        all.truncate(k);
        all
    }

    fn random_points(rng: &mut impl Rng, count: usize) -> Vec<Descriptor> {
        (0..count)
            .map(|_| {
                Descriptor::new([
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..8000.0),
                    rng.gen_range(0.0..4000.0),
                    rng.gen_range(0.0..1.0),
                ])
            })
            .collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest(&Descriptor::new([0.0; 5]), 3).is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let points = random_points(&mut rng, 300);
        let tree = KdTree::build(&points);
        assert_eq!(tree.len(), 300);

        for _ in 0..50 {
            let query = random_points(&mut rng, 1)[0];
            for k in [1, 3, 10] {
                assert_eq!(tree.nearest(&query, k), brute_force(&points, &query, k));
            }
        }
    }

    #[test]
    fn test_ties_resolve_to_lowest_position() {
        let points = vec![
            Descriptor::new([2.0, 0.0, 0.0, 0.0, 0.0]),
            Descriptor::new([0.0, 1.0, 0.0, 0.0, 0.0]),
            Descriptor::new([1.0, 0.0, 0.0, 0.0, 0.0]),
            Descriptor::new([0.0, 1.0, 0.0, 0.0, 0.0]),
            Descriptor::new([0.0, 0.0, 0.0, 0.0, 1.0]),
        ];
        let tree = KdTree::build(&points);
        let hits = tree.nearest(&Descriptor::new([0.0; 5]), 4);
        let positions: Vec<usize> = hits.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert!(hits.iter().all(|n| n.distance == 1.0));
    }

    #[test]
    fn test_k_larger_than_tree_returns_all_sorted() {
        let points = vec![
            Descriptor::new([3.0, 0.0, 0.0, 0.0, 0.0]),
            Descriptor::new([1.0, 0.0, 0.0, 0.0, 0.0]),
            Descriptor::new([2.0, 0.0, 0.0, 0.0, 0.0]),
        ];
        let tree = KdTree::build(&points);
        let hits = tree.nearest(&Descriptor::new([0.0; 5]), 10);
        let positions: Vec<usize> = hits.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert!(tree.nearest(&Descriptor::new([0.0; 5]), 0).is_empty());
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let points = random_points(&mut rng, 64);
        let query = random_points(&mut rng, 1)[0];
        let first = KdTree::build(&points).nearest(&query, 5);
        let second = KdTree::build(&points).nearest(&query, 5);
        assert_eq!(first, second);
    }
}
