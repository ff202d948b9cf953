use log::debug;

use std::collections::BTreeSet;

use crate::config::TallyError;

/// The position of a candidate in the election, starting at 0.
pub type CandidateId = usize;

/// The rank given to a candidate on a ballot. 0 is the most preferred.
pub type Rank = u32;

/// One voter's complete ranking.
///
/// Indexed by candidate: `ranks[c]` is the rank of candidate `c`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    ranks: Vec<Rank>,
}

impl Ballot {
    pub fn rank(&self, candidate: CandidateId) -> Rank {
        self.ranks[candidate]
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// The candidate with the lowest rank. Lowest index wins if the ranks are
    /// not distinct, which cannot happen on a validated ballot.
    pub fn first_choice(&self) -> Option<CandidateId> {
        self.ranks
            .iter()
            .enumerate()
            .min_by_key(|(cid, rank)| (**rank, *cid))
            .map(|(cid, _)| cid)
    }

    /// true if candidate `a` is ranked ahead of candidate `b`.
    pub fn prefers(&self, a: CandidateId, b: CandidateId) -> bool {
        self.ranks[a] < self.ranks[b]
    }

    // Drops the removed candidates and renumbers the others so that the ranks
    // are again 0..n, in the same relative order.
    fn compacted(&self, removed: &BTreeSet<CandidateId>) -> Ballot {
        let kept: Vec<Rank> = self
            .ranks
            .iter()
            .enumerate()
            .filter(|(cid, _)| !removed.contains(cid))
            .map(|(_, r)| *r)
            .collect();
        let ranks = kept
            .iter()
            .map(|r| kept.iter().filter(|other| *other < r).count() as Rank)
            .collect();
        Ballot { ranks }
    }
}

/// A ballot that does not rank every candidate exactly once.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SpoiledBallot {
    /// Position of the ballot in the input, starting at 0.
    pub position: usize,
    pub ranks: Vec<Rank>,
}

fn is_permutation(ranks: &[Rank], num_candidates: usize) -> bool {
    if ranks.len() != num_candidates {
        return false;
    }
    let seen: BTreeSet<Rank> = ranks.iter().cloned().collect();
    seen.len() == num_candidates && ranks.iter().all(|r| (*r as usize) < num_candidates)
}

/// Lists all the ballots whose ranks are not exactly `0..num_candidates`.
pub fn find_spoiled(num_candidates: usize, ballots: &[Vec<Rank>]) -> Vec<SpoiledBallot> {
    ballots
        .iter()
        .enumerate()
        .filter(|(_, ranks)| !is_permutation(ranks, num_candidates))
        .map(|(position, ranks)| SpoiledBallot {
            position,
            ranks: ranks.clone(),
        })
        .collect()
}

/// The candidates and the ballots of an election.
///
/// An election is validated once at construction and never changes afterwards.
/// Tabulators that need a smaller candidate set derive a new election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    candidates: Vec<String>,
    ballots: Vec<Ballot>,
}

impl Election {
    /// Builds an election from candidate names and 0-based rank vectors.
    ///
    /// Fails with `MalformedBallot` on the first ballot that is not a permutation
    /// of the candidate indices.
    pub fn load(candidates: &[String], ballots: &[Vec<Rank>]) -> Result<Election, TallyError> {
        if let Some(spoiled) = find_spoiled(candidates.len(), ballots).into_iter().next() {
            return Err(TallyError::MalformedBallot {
                ballot: spoiled.position,
                ranks: spoiled.ranks,
            });
        }
        debug!(
            "load: {} candidates, {} ballots",
            candidates.len(),
            ballots.len()
        );
        Ok(Election {
            candidates: candidates.to_vec(),
            ballots: ballots
                .iter()
                .map(|ranks| Ballot {
                    ranks: ranks.clone(),
                })
                .collect(),
        })
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn num_ballots(&self) -> usize {
        self.ballots.len()
    }

    pub fn candidate_name(&self, candidate: CandidateId) -> &str {
        self.candidates[candidate].as_str()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn candidate_id(&self, name: &str) -> Result<CandidateId, TallyError> {
        self.candidates
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TallyError::UnknownCandidate(name.to_string()))
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn rank(&self, ballot: usize, candidate: CandidateId) -> Rank {
        self.ballots[ballot].rank(candidate)
    }

    /// The tabulators need at least one candidate and one ballot.
    pub(crate) fn ensure_not_empty(&self) -> Result<(), TallyError> {
        if self.candidates.is_empty() || self.ballots.is_empty() {
            return Err(TallyError::EmptyElection);
        }
        Ok(())
    }

    /// A new election without the given candidates. Every ballot keeps the
    /// relative order of the remaining candidates.
    pub(crate) fn without_candidates(&self, removed: &BTreeSet<CandidateId>) -> Election {
        Election {
            candidates: self
                .candidates
                .iter()
                .enumerate()
                .filter(|(cid, _)| !removed.contains(cid))
                .map(|(_, name)| name.clone())
                .collect(),
            ballots: self.ballots.iter().map(|b| b.compacted(removed)).collect(),
        }
    }

    /// SHA-256 digest of the candidate names and of the ranks, in input order.
    pub fn fingerprint(&self) -> String {
        let mut canonical = self.candidates.join("\t");
        for b in self.ballots.iter() {
            canonical.push('\n');
            let line: Vec<String> = b.ranks.iter().map(|r| r.to_string()).collect();
            canonical.push_str(line.join(",").as_str());
        }
        sha256::digest(canonical.as_str())
    }
}
