use log::{debug, info};

use std::collections::BTreeSet;

use crate::config::*;
use crate::election::{CandidateId, Election};

#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundResult {
    stats: IrvRound,
    // The election for the next round. None when the tabulation is over.
    next: Option<Election>,
}

/// Runs instant-runoff voting.
///
/// Each round counts the first choices. A candidate with strictly more than half
/// of the ballots wins. Otherwise all the candidates with the fewest first
/// choices are eliminated at once and the next round runs on the reduced
/// ballots. If the last candidates standing are all eliminated together, they
/// are tied.
///
/// The input election is not modified.
pub fn run_irv(election: &Election) -> Result<IrvResult, TallyError> {
    election.ensure_not_empty()?;
    info!(
        "run_irv: {} ballots, {} candidates",
        election.num_ballots(),
        election.num_candidates()
    );

    let mut rounds: Vec<IrvRound> = Vec::new();
    let mut current: Election = election.clone();
    // Every round removes at least one candidate.
    for round_id in 1..=(election.num_candidates() as u32) {
        let res = run_one_round(&current, round_id);
        info!("Round id: {:?} stats: {:?}", round_id, res.stats);
        rounds.push(res.stats);
        match res.next {
            Some(next) => current = next,
            None => break,
        }
    }

    // The last round always carries the outcome.
    let outcome = rounds
        .last()
        .and_then(|r| r.outcome.clone())
        .unwrap_or(Outcome::NoWinner);
    Ok(IrvResult { rounds, outcome })
}

/// The number of ballots whose first choice is each candidate, in candidate order.
fn count_firsts(election: &Election) -> Vec<u64> {
    let mut firsts: Vec<u64> = vec![0; election.num_candidates()];
    for ballot in election.ballots() {
        if let Some(cid) = ballot.first_choice() {
            firsts[cid] += 1;
        }
    }
    firsts
}

// Ties go to the lowest index.
fn find_leader(firsts: &[u64]) -> Option<CandidateId> {
    firsts
        .iter()
        .enumerate()
        .fold(None, |best: Option<(CandidateId, u64)>, (cid, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((cid, *count)),
        })
        .map(|(cid, _)| cid)
}

fn find_trailers(firsts: &[u64]) -> BTreeSet<CandidateId> {
    let trail_votes = firsts.iter().min().cloned().unwrap_or(0);
    firsts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == trail_votes)
        .map(|(cid, _)| cid)
        .collect()
}

fn run_one_round(election: &Election, round_id: u32) -> RoundResult {
    let firsts = count_firsts(election);
    debug!("run_one_round: round {} firsts: {:?}", round_id, firsts);
    let tally: Vec<(String, u64)> = election
        .candidates()
        .iter()
        .cloned()
        .zip(firsts.iter().cloned())
        .collect();

    let num_ballots = election.num_ballots() as u64;
    if let Some(leader) = find_leader(&firsts) {
        if firsts[leader] * 2 > num_ballots {
            let name = election.candidate_name(leader).to_string();
            debug!(
                "run_one_round: {} has {} of {} ballots, marking as winner",
                name, firsts[leader], num_ballots
            );
            return RoundResult {
                stats: IrvRound {
                    round: round_id,
                    tally,
                    eliminated: Vec::new(),
                    outcome: Some(Outcome::Winner(name)),
                },
                next: None,
            };
        }
    }

    let trailers = find_trailers(&firsts);
    let eliminated: Vec<String> = trailers
        .iter()
        .map(|cid| election.candidate_name(*cid).to_string())
        .collect();
    debug!("run_one_round: eliminated_candidates: {:?}", eliminated);

    let next = election.without_candidates(&trailers);
    if next.num_candidates() == 0 {
        // Everyone left went out together.
        return RoundResult {
            stats: IrvRound {
                round: round_id,
                tally,
                eliminated: eliminated.clone(),
                outcome: Some(Outcome::Tie(eliminated)),
            },
            next: None,
        };
    }
    RoundResult {
        stats: IrvRound {
            round: round_id,
            tally,
            eliminated,
            outcome: None,
        },
        next: Some(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn election(candidates: &[&str], prefs: &[&[&str]]) -> Election {
        let names: Vec<String> = candidates.iter().map(|s| s.to_string()).collect();
        let mut b = Builder::new(&TallyRules::default())
            .unwrap()
            .candidates(&names)
            .unwrap();
        for p in prefs {
            b.add_preferences(*p).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn majority_in_first_round() {
        init();
        let e = election(&["A", "B"], &[&["A", "B"], &["A", "B"], &["B", "A"]]);
        let res = run_irv(&e).unwrap();
        assert_eq!(res.outcome, Outcome::Winner("A".to_string()));
        assert_eq!(res.rounds.len(), 1);
        assert_eq!(
            res.rounds[0].tally,
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
        assert!(res.rounds[0].eliminated.is_empty());
    }

    #[test]
    fn three_way_tie() {
        init();
        let e = election(
            &["A", "B", "C"],
            &[&["A", "B", "C"], &["B", "C", "A"], &["C", "A", "B"]],
        );
        let res = run_irv(&e).unwrap();
        let everyone = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(res.outcome, Outcome::Tie(everyone.clone()));
        assert_eq!(res.rounds.len(), 1);
        assert_eq!(res.rounds[0].eliminated, everyone);
    }

    #[test]
    fn transfers_after_elimination() {
        init();
        let e = election(
            &["A", "B", "C"],
            &[
                &["A", "B", "C"],
                &["A", "C", "B"],
                &["B", "A", "C"],
                &["B", "C", "A"],
                &["C", "B", "A"],
            ],
        );
        let res = run_irv(&e).unwrap();
        assert_eq!(res.rounds.len(), 2);
        assert_eq!(res.rounds[0].eliminated, vec!["C".to_string()]);
        assert_eq!(
            res.rounds[1].tally,
            vec![("A".to_string(), 2), ("B".to_string(), 3)]
        );
        assert_eq!(res.outcome, Outcome::Winner("B".to_string()));
        assert_eq!(res.rounds[1].outcome, Some(Outcome::Winner("B".to_string())));
    }

    #[test]
    fn trailers_go_out_together() {
        init();
        // C and D both have one first choice and leave in the same round.
        let e = election(
            &["A", "B", "C", "D"],
            &[
                &["A", "B", "C", "D"],
                &["A", "C", "B", "D"],
                &["B", "A", "C", "D"],
                &["B", "A", "D", "C"],
                &["C", "B", "A", "D"],
                &["D", "B", "A", "C"],
            ],
        );
        let res = run_irv(&e).unwrap();
        assert_eq!(
            res.rounds[0].eliminated,
            vec!["C".to_string(), "D".to_string()]
        );
        assert_eq!(
            res.rounds[1].tally,
            vec![("A".to_string(), 2), ("B".to_string(), 4)]
        );
        assert_eq!(res.outcome, Outcome::Winner("B".to_string()));
    }

    #[test]
    fn every_ballot_counts_once_per_round() {
        init();
        let e = election(
            &["A", "B", "C", "D"],
            &[
                &["D", "C", "B", "A"],
                &["C", "D", "A", "B"],
                &["A", "B", "C", "D"],
                &["B", "D", "C", "A"],
                &["D", "A", "B", "C"],
                &["C", "A", "D", "B"],
                &["A", "D", "B", "C"],
            ],
        );
        let res = run_irv(&e).unwrap();
        for r in res.rounds.iter() {
            let total: u64 = r.tally.iter().map(|(_, c)| *c).sum();
            assert_eq!(total, 7);
        }
        // A majority always ends the count in the same round.
        for r in res.rounds.iter() {
            let has_majority = r.tally.iter().any(|(_, c)| c * 2 > 7);
            assert_eq!(has_majority, r.outcome.is_some() && r.eliminated.is_empty());
        }
    }

    #[test]
    fn leader_ties_go_to_lowest_index() {
        assert_eq!(find_leader(&[1, 3, 3, 0]), Some(1));
        assert_eq!(find_leader(&[]), None);
        let t: Vec<CandidateId> = find_trailers(&[2, 0, 1, 0]).into_iter().collect();
        assert_eq!(t, vec![1, 3]);
    }

    #[test]
    fn input_is_not_modified() {
        let e = election(&["A", "B", "C"], &[&["A", "B", "C"], &["C", "B", "A"]]);
        let before = e.clone();
        run_irv(&e).unwrap();
        assert_eq!(e, before);
    }

    #[test]
    fn empty_election() {
        let e = Election::load(&[], &[]).unwrap();
        assert_eq!(run_irv(&e), Err(TallyError::EmptyElection));
    }
}
