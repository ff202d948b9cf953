use log::{debug, info};

use crate::config::*;
use crate::election::{Election, Rank};

impl ScoringSystem {
    /// The points given to a candidate placed at `rank` on one ballot.
    pub fn score(&self, rank: Rank, num_candidates: usize) -> f64 {
        let r = rank as f64;
        let c = num_candidates as f64;
        match self {
            ScoringSystem::Borda => c - r,
            ScoringSystem::ZeroBorda => c - r - 1.0,
            ScoringSystem::Dowdall => 1.0 / (r + 1.0),
            ScoringSystem::DowdallRounded => round_cents(1.0 / (r + 1.0)),
            ScoringSystem::Power => 0.5_f64.powi(rank as i32),
        }
    }

    /// What a single ballot hands out in total, whatever its order.
    pub fn ballot_total(&self, num_candidates: usize) -> f64 {
        (0..num_candidates)
            .map(|r| self.score(r as Rank, num_candidates))
            .sum()
    }
}

/// Rounds a non-negative value to 2 decimal places, half to even on the exact
/// binary value: 1/8 gives 0.12 and 1/40 (slightly above 0.025) gives 0.03.
fn round_cents(x: f64) -> f64 {
    let bits = x.to_bits();
    let biased_exp = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1_u64 << 52) - 1);
    // x == mantissa * 2^exp
    let (mantissa, exp) = if biased_exp == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1_u64 << 52), biased_exp - 1075)
    };
    if exp >= 0 {
        return x;
    }
    let shift = (-exp) as u32;
    // mantissa * 100 < 2^60: far below half a cent.
    if shift > 120 {
        return 0.0;
    }
    let scaled = mantissa as u128 * 100;
    let cents = scaled >> shift;
    let rest = scaled - (cents << shift);
    let half = 1_u128 << (shift - 1);
    let cents = if rest > half || (rest == half && cents % 2 == 1) {
        cents + 1
    } else {
        cents
    };
    cents as f64 / 100.0
}

/// Computes the score of every candidate under each scoring system.
///
/// There is no tie-breaking and no winner: the scores are the whole result.
pub fn score_election(
    election: &Election,
    systems: &[ScoringSystem],
) -> Result<PositionalResult, TallyError> {
    election.ensure_not_empty()?;
    let n = election.num_candidates();
    info!(
        "score_election: {} ballots, {} candidates, systems: {:?}",
        election.num_ballots(),
        n,
        systems
    );

    let mut totals: Vec<Vec<f64>> = vec![vec![0.0; n]; systems.len()];
    for ballot in election.ballots() {
        for (cid, rank) in ballot.ranks().iter().enumerate() {
            for (sidx, system) in systems.iter().enumerate() {
                totals[sidx][cid] += system.score(*rank, n);
            }
        }
    }

    let res = systems
        .iter()
        .zip(totals)
        .map(|(system, scores)| {
            debug!("score_election: {}: {:?}", system.name(), scores);
            SystemScores {
                system: system.name().to_string(),
                scores: election
                    .candidates()
                    .iter()
                    .cloned()
                    .zip(scores)
                    .collect(),
            }
        })
        .collect();
    Ok(PositionalResult { systems: res })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn sample() -> Election {
        let mut b = Builder::new(&TallyRules::default())
            .unwrap()
            .candidates(&["A".to_string(), "B".to_string(), "C".to_string()])
            .unwrap();
        b.add_preferences(&["A", "B", "C"]).unwrap();
        b.add_preferences(&["A", "C", "B"]).unwrap();
        b.add_preferences(&["C", "B", "A"]).unwrap();
        b.add_preferences(&["B", "A", "C"]).unwrap();
        b.build().unwrap()
    }

    fn scores_of<'a>(res: &'a PositionalResult, system: &str) -> &'a [(String, f64)] {
        &res.systems
            .iter()
            .find(|s| s.system == system)
            .unwrap()
            .scores
    }

    #[test]
    fn single_scores() {
        assert_eq!(ScoringSystem::Borda.score(0, 4), 4.0);
        assert_eq!(ScoringSystem::ZeroBorda.score(3, 4), 0.0);
        assert_eq!(ScoringSystem::Dowdall.score(1, 4), 0.5);
        assert_eq!(ScoringSystem::DowdallRounded.score(2, 4), 0.33);
        assert_eq!(ScoringSystem::DowdallRounded.score(5, 9), 0.17);
        assert_eq!(ScoringSystem::Power.score(3, 4), 0.125);
    }

    #[test]
    fn dowdall_rounding_ties_go_to_even() {
        // 1/8 is exactly 0.125.
        assert_eq!(ScoringSystem::DowdallRounded.score(7, 8), 0.12);
        // 1/40 is stored slightly above 0.025.
        assert_eq!(ScoringSystem::DowdallRounded.score(39, 40), 0.03);
        assert_eq!(ScoringSystem::DowdallRounded.score(0, 40), 1.0);
        assert_eq!(ScoringSystem::DowdallRounded.score(1, 40), 0.5);
        assert_eq!(ScoringSystem::DowdallRounded.score(11, 40), 0.08);
        assert_eq!(round_cents(0.0), 0.0);
        assert_eq!(round_cents(1e-300), 0.0);
    }

    #[test]
    fn borda_counts() {
        let res = score_election(&sample(), &ScoringSystem::ALL).unwrap();
        let names: Vec<&str> = res.systems.iter().map(|s| s.system.as_str()).collect();
        assert_eq!(names, vec!["BC", "0-BC", "Dowdall", "Dowdall-AR", "Power"]);
        assert_eq!(
            scores_of(&res, "BC"),
            &[
                ("A".to_string(), 9.0),
                ("B".to_string(), 8.0),
                ("C".to_string(), 7.0)
            ]
        );
        assert_eq!(
            scores_of(&res, "0-BC"),
            &[
                ("A".to_string(), 5.0),
                ("B".to_string(), 4.0),
                ("C".to_string(), 3.0)
            ]
        );
        assert_eq!(scores_of(&res, "Power")[0].1, 2.75);
    }

    #[test]
    fn every_ballot_hands_out_the_same_total() {
        let e = sample();
        let res = score_election(&e, &ScoringSystem::ALL).unwrap();
        for (system, scores) in ScoringSystem::ALL.iter().zip(res.systems.iter()) {
            let total: f64 = scores.scores.iter().map(|(_, s)| *s).sum();
            let expected = e.num_ballots() as f64 * system.ballot_total(e.num_candidates());
            assert!(
                (total - expected).abs() < 1e-9,
                "{}: {} != {}",
                system.name(),
                total,
                expected
            );
        }
    }

    #[test]
    fn scoring_is_pure() {
        let e = sample();
        let r1 = score_election(&e, &ScoringSystem::ALL).unwrap();
        let r2 = score_election(&e, &ScoringSystem::ALL).unwrap();
        for (s1, s2) in r1.systems.iter().zip(r2.systems.iter()) {
            for ((_, x1), (_, x2)) in s1.scores.iter().zip(s2.scores.iter()) {
                assert_eq!(x1.to_bits(), x2.to_bits());
            }
        }
    }

    #[test]
    fn systems_keep_the_requested_order() {
        let res = score_election(
            &sample(),
            &[ScoringSystem::Power, ScoringSystem::Borda],
        )
        .unwrap();
        assert_eq!(res.systems[0].system, "Power");
        assert_eq!(res.systems[1].system, "BC");
    }

    #[test]
    fn empty_election() {
        let e = Election::load(&["A".to_string()], &[]).unwrap();
        assert_eq!(
            score_election(&e, &ScoringSystem::ALL),
            Err(TallyError::EmptyElection)
        );
    }
}
