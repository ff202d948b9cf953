pub use crate::config::*;
use crate::election::{Election, Rank};

/// A builder for assembling an election ballot by ballot.
///
/// ```
/// pub use ranked_tally::builder::Builder;
/// pub use ranked_tally::TallyRules;
/// # use ranked_tally::TallyError;
///
/// let mut builder = Builder::new(&TallyRules::default())?
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_preferences(&["Bob", "Anna"])?;
/// builder.add_ranks(&[0, 1])?;
///
/// let election = builder.build()?;
/// assert_eq!(election.num_ballots(), 2);
///
/// # Ok::<(), TallyError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TallyRules,
    pub(crate) _candidates: Vec<String>,
    pub(crate) _ballots: Vec<Vec<Rank>>,
}

// Marks a candidate left out of a preference list. It makes the ballot fail validation.
const UNRANKED: Rank = Rank::MAX;

impl Builder {
    pub fn new(rules: &TallyRules) -> Result<Builder, TallyError> {
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: Vec::new(),
            _ballots: Vec::new(),
        })
    }

    /// Declares the candidates, in order. Ballots added before are dropped.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, TallyError> {
        Ok(Builder {
            _rules: self._rules,
            _candidates: cands.to_vec(),
            _ballots: Vec::new(),
        })
    }

    /// Adds a ballot given as the rank of each candidate, in candidate order.
    /// The ranks start at 0.
    pub fn add_ranks(&mut self, ranks: &[Rank]) -> Result<(), TallyError> {
        self._ballots.push(ranks.to_vec());
        Ok(())
    }

    /// Adds a ballot given as the list of candidate names, most preferred first.
    ///
    /// Every candidate should appear exactly once. Incomplete lists are accepted
    /// here and rejected by `build`.
    pub fn add_preferences<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), TallyError> {
        let mut ranks: Vec<Rank> = vec![UNRANKED; self._candidates.len()];
        for (rank, name) in names.iter().enumerate() {
            let cid = self
                ._candidates
                .iter()
                .position(|c| c == name.as_ref())
                .ok_or_else(|| TallyError::UnknownCandidate(name.as_ref().to_string()))?;
            ranks[cid] = rank as Rank;
        }
        self._ballots.push(ranks);
        Ok(())
    }

    pub fn build(&self) -> Result<Election, TallyError> {
        Election::load(&self._candidates, &self._ballots)
    }

    /// Builds the election and runs the methods listed in the rules.
    pub fn tabulate(&self) -> Result<TallyReport, TallyError> {
        let election = self.build()?;
        Ok(crate::tabulate_all(&election, &self._rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> Builder {
        Builder::new(&TallyRules::default())
            .unwrap()
            .candidates(&["A".to_string(), "B".to_string(), "C".to_string()])
            .unwrap()
    }

    #[test]
    fn preferences_become_ranks() {
        let mut b = builder();
        b.add_preferences(&["C", "A", "B"]).unwrap();
        let e = b.build().unwrap();
        assert_eq!(e.ballots()[0].ranks(), &[1, 2, 0]);
    }

    #[test]
    fn unknown_candidate() {
        let mut b = builder();
        assert_eq!(
            b.add_preferences(&["A", "D"]),
            Err(TallyError::UnknownCandidate("D".to_string()))
        );
    }

    #[test]
    fn incomplete_preferences_fail_at_build() {
        let mut b = builder();
        b.add_preferences(&["A", "B", "C"]).unwrap();
        b.add_preferences(&["A", "B"]).unwrap();
        assert!(matches!(
            b.build(),
            Err(TallyError::MalformedBallot { ballot: 1, .. })
        ));
    }

    #[test]
    fn tabulate_runs_the_configured_methods() {
        let rules = TallyRules {
            methods: vec![Method::InstantRunoff],
            ..TallyRules::default()
        };
        let mut b = Builder::new(&rules)
            .unwrap()
            .candidates(&["A".to_string(), "B".to_string()])
            .unwrap();
        b.add_preferences(&["A", "B"]).unwrap();
        let report = b.tabulate().unwrap();
        assert!(report.irv.is_some());
        assert!(report.positional.is_none());
        assert!(report.rpv.is_none());
    }
}
