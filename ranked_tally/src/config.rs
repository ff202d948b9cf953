// ********* Output data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The final outcome of a tabulation.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Outcome {
    /// A single candidate won.
    Winner(String),
    /// Several candidates are tied. For IRV, they were eliminated together in
    /// the last round. For RPV, none of them is beaten in the lock graph.
    Tie(Vec<String>),
    /// No candidate could be declared. This only happens when an internal
    /// invariant did not hold.
    NoWinner,
}

impl Outcome {
    pub fn winners(&self) -> Vec<String> {
        match self {
            Outcome::Winner(name) => vec![name.clone()],
            Outcome::Tie(names) => names.clone(),
            Outcome::NoWinner => Vec::new(),
        }
    }
}

/// The scores of all the candidates for one positional scoring system.
#[derive(PartialEq, Debug, Clone)]
pub struct SystemScores {
    pub system: String,
    /// In candidate order.
    pub scores: Vec<(String, f64)>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct PositionalResult {
    /// In the order the systems were requested.
    pub systems: Vec<SystemScores>,
}

/// Statistics for one IRV round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IrvRound {
    pub round: u32,
    /// First-place counts of the candidates still running, in candidate order.
    pub tally: Vec<(String, u64)>,
    pub eliminated: Vec<String>,
    /// Only set for the last round.
    pub outcome: Option<Outcome>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IrvResult {
    pub rounds: Vec<IrvRound>,
    pub outcome: Outcome,
}

/// What happened to one pairwise victory during the lock phase.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairDecision {
    pub winner: String,
    pub loser: String,
    pub winner_votes: u64,
    pub loser_votes: u64,
    pub margin: u64,
    /// false if locking the pair would have created a cycle.
    pub locked: bool,
}

/// Two distinct pairs that the ranking comparator could not order.
/// Their relative position comes from the tally order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AmbiguousOrdering {
    pub first: (String, String),
    pub second: (String, String),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RpvResult {
    /// In lock order.
    pub decisions: Vec<PairDecision>,
    pub ambiguous_orderings: Vec<AmbiguousOrdering>,
    pub outcome: Outcome,
}

/// Errors that prevent a tabulation from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyError {
    /// The ranks of the ballot at this position are not a permutation of the candidates.
    MalformedBallot { ballot: usize, ranks: Vec<u32> },
    /// No candidates or no ballots.
    EmptyElection,
    /// The pair ranking could not strictly order these two pairs.
    NonStrictComparator {
        first: (String, String),
        second: (String, String),
    },
    UnknownCandidate(String),
    UnknownScoringSystem(String),
    UnknownMethod(String),
}

impl Error for TallyError {}

impl Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyError::MalformedBallot { ballot, ranks } => {
                write!(f, "ballot {} is not a full ranking: {:?}", ballot, ranks)
            }
            TallyError::EmptyElection => write!(f, "the election has no candidates or no ballots"),
            TallyError::NonStrictComparator { first, second } => write!(
                f,
                "cannot strictly order the pairs {} > {} and {} > {}",
                first.0, first.1, second.0, second.1
            ),
            TallyError::UnknownCandidate(name) => write!(f, "unknown candidate {:?}", name),
            TallyError::UnknownScoringSystem(name) => {
                write!(f, "unknown scoring system {:?}", name)
            }
            TallyError::UnknownMethod(name) => write!(f, "unknown tabulation method {:?}", name),
        }
    }
}

// ********* Configuration **********

/// Positional scoring systems of the Borda family.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ScoringSystem {
    /// C - rank
    Borda,
    /// C - rank - 1
    ZeroBorda,
    /// 1 / (rank + 1)
    Dowdall,
    /// Dowdall rounded to two decimal places.
    DowdallRounded,
    /// 1 / 2^rank
    Power,
}

impl ScoringSystem {
    pub const ALL: [ScoringSystem; 5] = [
        ScoringSystem::Borda,
        ScoringSystem::ZeroBorda,
        ScoringSystem::Dowdall,
        ScoringSystem::DowdallRounded,
        ScoringSystem::Power,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScoringSystem::Borda => "BC",
            ScoringSystem::ZeroBorda => "0-BC",
            ScoringSystem::Dowdall => "Dowdall",
            ScoringSystem::DowdallRounded => "Dowdall-AR",
            ScoringSystem::Power => "Power",
        }
    }

    pub fn from_name(name: &str) -> Result<ScoringSystem, TallyError> {
        ScoringSystem::ALL
            .iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| TallyError::UnknownScoringSystem(name.to_string()))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Method {
    Borda,
    InstantRunoff,
    RankedPairs,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::InstantRunoff, Method::Borda, Method::RankedPairs];

    pub fn name(&self) -> &'static str {
        match self {
            Method::Borda => "borda",
            Method::InstantRunoff => "irv",
            Method::RankedPairs => "rpv",
        }
    }

    pub fn from_name(name: &str) -> Result<Method, TallyError> {
        match name.to_lowercase().as_str() {
            "borda" => Ok(Method::Borda),
            "irv" => Ok(Method::InstantRunoff),
            "rpv" | "tideman" | "ranked_pairs" => Ok(Method::RankedPairs),
            _ => Err(TallyError::UnknownMethod(name.to_string())),
        }
    }
}

/// What to do when the ranked pairs comparator cannot order two pairs.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NonStrictOrdering {
    /// Keep the tally order and report the pairs in the result.
    Flag,
    /// Stop the ranked pairs tabulation with an error.
    Fail,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub methods: Vec<Method>,
    pub scoring_systems: Vec<ScoringSystem>,
    pub non_strict_ordering: NonStrictOrdering,
}

impl Default for TallyRules {
    fn default() -> Self {
        TallyRules {
            methods: Method::ALL.to_vec(),
            scoring_systems: ScoringSystem::ALL.to_vec(),
            non_strict_ordering: NonStrictOrdering::Flag,
        }
    }
}

/// The outcome of running every requested method on the same election.
/// Each method succeeds or fails on its own.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TallyReport {
    pub fingerprint: String,
    pub positional: Option<Result<PositionalResult, TallyError>>,
    pub irv: Option<Result<IrvResult, TallyError>>,
    pub rpv: Option<Result<RpvResult, TallyError>>,
}
