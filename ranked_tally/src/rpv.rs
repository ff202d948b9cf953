use log::{debug, info, warn};

use std::cmp::Ordering;

use crate::config::*;
use crate::election::{CandidateId, Election};
use crate::lock_graph::LockGraph;

/// The result of one pairwise contest.
///
/// When both sides have the same number of votes, the candidate with the lower
/// index is named the winner with a margin of 0. This is a convention, not a
/// preference expressed by the voters.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct PairwiseMargin {
    pub winner: CandidateId,
    pub loser: CandidateId,
    pub winner_votes: u64,
    pub loser_votes: u64,
    pub margin: u64,
}

/// The number of ballots preferring each candidate over each other candidate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseTally {
    // prefer[a][b]: ballots ranking a ahead of b.
    prefer: Vec<Vec<u64>>,
}

impl PairwiseTally {
    pub fn new(election: &Election) -> PairwiseTally {
        let n = election.num_candidates();
        let mut prefer: Vec<Vec<u64>> = vec![vec![0; n]; n];
        for ballot in election.ballots() {
            for a in 0..n {
                for b in (a + 1)..n {
                    if ballot.prefers(a, b) {
                        prefer[a][b] += 1;
                    } else {
                        prefer[b][a] += 1;
                    }
                }
            }
        }
        PairwiseTally { prefer }
    }

    pub fn votes(&self, a: CandidateId, b: CandidateId) -> u64 {
        self.prefer[a][b]
    }

    /// The margin of `a` over `b`. Negative if `b` won the pair, 0 when `a == b`.
    pub fn oppose(&self, a: CandidateId, b: CandidateId) -> i64 {
        self.prefer[a][b] as i64 - self.prefer[b][a] as i64
    }

    /// All the unordered pairs, ordered by the lower index and then the higher one.
    pub fn margins(&self) -> Vec<PairwiseMargin> {
        let n = self.prefer.len();
        let mut res: Vec<PairwiseMargin> = Vec::new();
        for a in 0..n {
            for b in (a + 1)..n {
                let (va, vb) = (self.prefer[a][b], self.prefer[b][a]);
                let pm = if va >= vb {
                    PairwiseMargin {
                        winner: a,
                        loser: b,
                        winner_votes: va,
                        loser_votes: vb,
                        margin: va - vb,
                    }
                } else {
                    PairwiseMargin {
                        winner: b,
                        loser: a,
                        winner_votes: vb,
                        loser_votes: va,
                        margin: vb - va,
                    }
                };
                res.push(pm);
            }
        }
        res
    }

    /// Lock order between two pairs. `Less` means that `p1` is locked first.
    ///
    /// Larger margins come first. For equal margins, the pair whose winner does
    /// worse against the other pair's loser comes first.
    pub fn compare(&self, p1: &PairwiseMargin, p2: &PairwiseMargin) -> Ordering {
        p2.margin.cmp(&p1.margin).then_with(|| {
            let op1 = self.oppose(p1.winner, p2.loser);
            let op2 = self.oppose(p2.winner, p1.loser);
            op1.cmp(&op2)
        })
    }
}

/// The votes for two candidates when they are compared head to head.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HeadToHead {
    pub first: (String, u64),
    pub second: (String, u64),
    /// first minus second
    pub difference: i64,
}

/// Compares two candidates, by name.
pub fn head_to_head(
    election: &Election,
    first: &str,
    second: &str,
) -> Result<HeadToHead, TallyError> {
    let a = election.candidate_id(first)?;
    let b = election.candidate_id(second)?;
    let (mut va, mut vb) = (0_u64, 0_u64);
    for ballot in election.ballots() {
        if ballot.prefers(a, b) {
            va += 1;
        } else {
            vb += 1;
        }
    }
    Ok(HeadToHead {
        first: (first.to_string(), va),
        second: (second.to_string(), vb),
        difference: va as i64 - vb as i64,
    })
}

// Stable insertion sort. It terminates and stays deterministic even when the
// comparator is not transitive, which happens with pairwise cycles.
fn sort_pairs(tally: &PairwiseTally, pairs: Vec<PairwiseMargin>) -> Vec<PairwiseMargin> {
    let mut sorted: Vec<PairwiseMargin> = Vec::with_capacity(pairs.len());
    for p in pairs {
        let mut idx = sorted.len();
        while idx > 0 && tally.compare(&p, &sorted[idx - 1]) == Ordering::Less {
            idx -= 1;
        }
        sorted.insert(idx, p);
    }
    sorted
}

fn find_ambiguous(
    election: &Election,
    tally: &PairwiseTally,
    sorted: &[PairwiseMargin],
) -> Vec<AmbiguousOrdering> {
    let name_pair = |p: &PairwiseMargin| {
        (
            election.candidate_name(p.winner).to_string(),
            election.candidate_name(p.loser).to_string(),
        )
    };
    let mut res: Vec<AmbiguousOrdering> = Vec::new();
    for (i, p1) in sorted.iter().enumerate() {
        for p2 in sorted[i + 1..].iter() {
            if tally.compare(p1, p2) == Ordering::Equal {
                res.push(AmbiguousOrdering {
                    first: name_pair(p1),
                    second: name_pair(p2),
                });
            }
        }
    }
    res
}

/// Runs ranked pairs (Tideman).
///
/// The pairwise victories are sorted by strength and locked one by one into a
/// graph, skipping those that would create a cycle. The winners are the
/// candidates that no locked victory points to.
pub fn run_rpv(election: &Election, rules: &TallyRules) -> Result<RpvResult, TallyError> {
    election.ensure_not_empty()?;
    info!(
        "run_rpv: {} ballots, {} candidates",
        election.num_ballots(),
        election.num_candidates()
    );

    let tally = PairwiseTally::new(election);
    let sorted = sort_pairs(&tally, tally.margins());
    debug!("run_rpv: sorted pairs: {:?}", sorted);

    let ambiguous_orderings = find_ambiguous(election, &tally, &sorted);
    if let Some(amb) = ambiguous_orderings.first() {
        warn!(
            "run_rpv: {} pair orderings rely on the tally order, first: {:?}",
            ambiguous_orderings.len(),
            amb
        );
        if rules.non_strict_ordering == NonStrictOrdering::Fail {
            return Err(TallyError::NonStrictComparator {
                first: amb.first.clone(),
                second: amb.second.clone(),
            });
        }
    }

    let mut graph = LockGraph::new(election.num_candidates());
    let mut decisions: Vec<PairDecision> = Vec::new();
    for pm in sorted.iter() {
        let locked = graph.lock(pm.winner, pm.loser);
        debug!("run_rpv: pair {:?} locked: {}", pm, locked);
        decisions.push(PairDecision {
            winner: election.candidate_name(pm.winner).to_string(),
            loser: election.candidate_name(pm.loser).to_string(),
            winner_votes: pm.winner_votes,
            loser_votes: pm.loser_votes,
            margin: pm.margin,
            locked,
        });
    }

    let mut winners: Vec<String> = graph
        .sources()
        .iter()
        .map(|cid| election.candidate_name(*cid).to_string())
        .collect();
    let outcome = match winners.len() {
        0 => {
            warn!("run_rpv: the lock graph has no source");
            Outcome::NoWinner
        }
        1 => Outcome::Winner(winners.remove(0)),
        _ => Outcome::Tie(winners),
    };
    info!("run_rpv: outcome: {:?}", outcome);
    Ok(RpvResult {
        decisions,
        ambiguous_orderings,
        outcome,
    })
}
