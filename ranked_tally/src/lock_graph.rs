use log::debug;

use std::collections::BTreeSet;

use crate::election::CandidateId;

/// The graph of locked pairwise victories.
///
/// An edge `(w, l)` means that `w` is locked ahead of `l`. Edges are only added
/// through `lock`, which refuses any edge that would close a cycle, so the graph
/// is acyclic at all times. All the queries look at the current edges.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LockGraph {
    // Outgoing edges of each candidate.
    successors: Vec<Vec<CandidateId>>,
    // All the edges, in insertion order.
    edges: Vec<(CandidateId, CandidateId)>,
}

impl LockGraph {
    pub fn new(num_candidates: usize) -> LockGraph {
        LockGraph {
            successors: vec![Vec::new(); num_candidates],
            edges: Vec::new(),
        }
    }

    pub fn num_candidates(&self) -> usize {
        self.successors.len()
    }

    /// All the candidates that can be reached from `start`, including `start`.
    pub fn reachable_from(&self, start: CandidateId) -> BTreeSet<CandidateId> {
        let mut closure: BTreeSet<CandidateId> = BTreeSet::new();
        let mut open: Vec<CandidateId> = vec![start];
        while let Some(c) = open.pop() {
            if !closure.insert(c) {
                continue;
            }
            for next in self.successors[c].iter() {
                if !closure.contains(next) {
                    open.push(*next);
                }
            }
        }
        closure
    }

    /// true if adding the edge `(winner, loser)` would create a cycle.
    pub fn would_create_cycle(&self, winner: CandidateId, loser: CandidateId) -> bool {
        self.reachable_from(loser).contains(&winner)
    }

    /// Adds the edge `(winner, loser)` unless it would create a cycle.
    /// Returns true if the edge was added.
    pub fn lock(&mut self, winner: CandidateId, loser: CandidateId) -> bool {
        if self.would_create_cycle(winner, loser) {
            debug!("lock: rejecting {} -> {}: cycle", winner, loser);
            return false;
        }
        self.successors[winner].push(loser);
        self.edges.push((winner, loser));
        true
    }

    pub fn edges(&self) -> &[(CandidateId, CandidateId)] {
        &self.edges
    }

    /// true if some locked edge points to this candidate.
    pub fn is_target(&self, candidate: CandidateId) -> bool {
        self.edges.iter().any(|(_, l)| *l == candidate)
    }

    /// The candidates that no locked edge points to, in index order.
    pub fn sources(&self) -> Vec<CandidateId> {
        let targets: BTreeSet<CandidateId> = self.edges.iter().map(|(_, l)| *l).collect();
        (0..self.num_candidates())
            .filter(|c| !targets.contains(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_reflexive_and_transitive() {
        let mut g = LockGraph::new(4);
        assert!(g.lock(0, 1));
        assert!(g.lock(1, 2));
        let r: Vec<CandidateId> = g.reachable_from(0).into_iter().collect();
        assert_eq!(r, vec![0, 1, 2]);
        let r: Vec<CandidateId> = g.reachable_from(3).into_iter().collect();
        assert_eq!(r, vec![3]);
    }

    #[test]
    fn refuses_cycles() {
        let mut g = LockGraph::new(3);
        assert!(g.lock(0, 1));
        assert!(g.lock(1, 2));
        assert!(g.would_create_cycle(2, 0));
        assert!(!g.lock(2, 0));
        assert_eq!(g.edges().to_vec(), vec![(0, 1), (1, 2)]);
        // Self loops are cycles too.
        assert!(!g.lock(1, 1));
    }

    #[test]
    fn queries_follow_later_insertions() {
        let mut g = LockGraph::new(4);
        assert!(g.lock(2, 3));
        assert!(!g.would_create_cycle(3, 0));
        assert!(g.lock(0, 2));
        // 3 -> 0 was fine before, it now closes 0 -> 2 -> 3 -> 0.
        assert!(g.would_create_cycle(3, 0));
    }

    #[test]
    fn sources_are_untargeted_candidates() {
        let mut g = LockGraph::new(4);
        g.lock(0, 1);
        g.lock(3, 1);
        assert_eq!(g.sources(), vec![0, 2, 3]);
        assert!(g.is_target(1));
        assert!(!g.is_target(0));
    }
}
