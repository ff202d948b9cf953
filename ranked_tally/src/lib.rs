/*!
Tabulation of ranked ballots.

Every ballot ranks all the candidates. The same election can be counted with
three families of rules:
- positional scoring (`borda`): several Borda count variants,
- instant-runoff voting (`irv`): trailing candidates are eliminated until one
  candidate holds a majority of the first choices,
- ranked pairs (`rpv`): pairwise victories are locked by strength into an
  acyclic graph whose sources are the winners.

```
use ranked_tally::builder::Builder;
use ranked_tally::{Outcome, TallyRules};
# use ranked_tally::TallyError;

let mut builder = Builder::new(&TallyRules::default())?
    .candidates(&["Alice".to_string(), "Bob".to_string()])?;
builder.add_preferences(&["Alice", "Bob"])?;
builder.add_preferences(&["Alice", "Bob"])?;
builder.add_preferences(&["Bob", "Alice"])?;

let report = builder.tabulate()?;
let irv = report.irv.unwrap()?;
assert_eq!(irv.outcome, Outcome::Winner("Alice".to_string()));
# Ok::<(), TallyError>(())
```
*/

mod config;
pub mod borda;
pub mod builder;
pub mod election;
pub mod irv;
pub mod lock_graph;
pub mod manual;
pub mod rpv;

use log::{info, warn};

pub use crate::borda::score_election;
pub use crate::config::*;
pub use crate::election::{find_spoiled, Ballot, CandidateId, Election, Rank, SpoiledBallot};
pub use crate::irv::run_irv;
pub use crate::rpv::{head_to_head, run_rpv, HeadToHead};

/// Runs every method listed in the rules on the same election.
///
/// The methods do not depend on each other: an error in one of them is reported
/// in its own slot and does not stop the others.
pub fn tabulate_all(election: &Election, rules: &TallyRules) -> TallyReport {
    let fingerprint = election.fingerprint();
    info!(
        "tabulate_all: election {} methods: {:?}",
        fingerprint, rules.methods
    );
    let mut report = TallyReport {
        fingerprint,
        ..TallyReport::default()
    };
    for method in rules.methods.iter() {
        match method {
            Method::Borda => {
                report.positional = Some(score_election(election, &rules.scoring_systems));
            }
            Method::InstantRunoff => {
                report.irv = Some(run_irv(election));
            }
            Method::RankedPairs => {
                report.rpv = Some(run_rpv(election, rules));
            }
        }
    }
    for (method, err) in [
        ("borda", report.positional.as_ref().and_then(|r| r.as_ref().err())),
        ("irv", report.irv.as_ref().and_then(|r| r.as_ref().err())),
        ("rpv", report.rpv.as_ref().and_then(|r| r.as_ref().err())),
    ] {
        if let Some(e) = err {
            warn!("tabulate_all: {} failed: {}", method, e);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_failure_does_not_stop_the_others() {
        // Two tied pairs: ranked pairs fails under the strict policy, the others still run.
        let cands = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let e = Election::load(&cands, &[vec![0, 1, 2], vec![2, 1, 0]]).unwrap();
        let rules = TallyRules {
            non_strict_ordering: NonStrictOrdering::Fail,
            ..TallyRules::default()
        };
        let report = tabulate_all(&e, &rules);
        assert!(matches!(
            report.rpv,
            Some(Err(TallyError::NonStrictComparator { .. }))
        ));
        assert!(matches!(report.positional, Some(Ok(_))));
        assert!(matches!(report.irv, Some(Ok(_))));
        assert_eq!(report.fingerprint, e.fingerprint());
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::from_name("IRV"), Ok(Method::InstantRunoff));
        assert_eq!(Method::from_name("tideman"), Ok(Method::RankedPairs));
        assert!(Method::from_name("approval").is_err());
        assert_eq!(
            ScoringSystem::from_name("dowdall-ar"),
            Ok(ScoringSystem::DowdallRounded)
        );
        assert_eq!(
            ScoringSystem::from_name("nope"),
            Err(TallyError::UnknownScoringSystem("nope".to_string()))
        );
    }
}
