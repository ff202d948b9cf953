use std::path::Path;

use crate::rcv::*;

/// The ballot table, as read from a file.
/// This is before any check on the ranks.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedTable {
    pub candidates: Vec<String>,
    pub ballots: Vec<ParsedBallot>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    /// Line (or row) number in the file, starting at 1 with the header.
    pub lineno: usize,
    /// One cell per candidate. None if the cell was empty.
    pub ranks: Vec<Option<i64>>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Parses the content of a rank cell. Empty cells are missing ranks.
pub fn parse_rank(lineno: usize, content: &str) -> RcvResult<Option<i64>> {
    let s = content.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<i64>()
        .map(Some)
        .ok()
        .context(InvalidRankSnafu {
            lineno,
            content: s.to_string(),
        })
}

/// Shifts the ranks so that they start at 0.
///
/// Missing or out-of-range cells become ranks that can never be valid, so that
/// the ballot is reported as spoiled.
pub fn zero_based_ranks(table: &ParsedTable, rank_base: i64) -> Vec<Vec<Rank>> {
    table
        .ballots
        .iter()
        .map(|pb| {
            pb.ranks
                .iter()
                .map(|r| {
                    r.and_then(|x| x.checked_sub(rank_base))
                        .and_then(|x| Rank::try_from(x).ok())
                        .unwrap_or(Rank::MAX)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_shifted() {
        let table = ParsedTable {
            candidates: vec!["A".to_string(), "B".to_string()],
            ballots: vec![
                ParsedBallot {
                    lineno: 2,
                    ranks: vec![Some(2), Some(1)],
                },
                ParsedBallot {
                    lineno: 3,
                    ranks: vec![Some(0), None],
                },
            ],
        };
        assert_eq!(
            zero_based_ranks(&table, 1),
            vec![vec![1, 0], vec![Rank::MAX, Rank::MAX]]
        );
    }

    #[test]
    fn extreme_ranks_are_spoiled() {
        let table = ParsedTable {
            candidates: vec!["A".to_string(), "B".to_string()],
            ballots: vec![ParsedBallot {
                lineno: 2,
                ranks: vec![Some(i64::MAX), Some(i64::MIN)],
            }],
        };
        assert_eq!(
            zero_based_ranks(&table, -1),
            vec![vec![Rank::MAX, Rank::MAX]]
        );
        assert_eq!(
            zero_based_ranks(&table, 1),
            vec![vec![Rank::MAX, Rank::MAX]]
        );
    }

    #[test]
    fn rank_cells() {
        assert_eq!(parse_rank(2, " 3 ").unwrap(), Some(3));
        assert_eq!(parse_rank(2, "").unwrap(), None);
        assert!(parse_rank(2, "first").is_err());
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/tmp/meme-election.csv"), "meme-election");
    }
}
