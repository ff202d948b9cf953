// Primitives for reading CSV files.

use crate::rcv::{
    io_common::{parse_rank, ParsedBallot, ParsedTable},
    *,
};

/// Reads a ballot table: a header row with the candidate names, then one row
/// per ballot with the rank of each candidate.
pub fn read_csv_table(path: &str) -> RcvResult<ParsedTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let candidates: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu {})?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_table: candidates: {:?}", candidates);
    ensure!(
        !candidates.is_empty(),
        EmptyBallotTableSnafu {
            path: path.to_string()
        }
    );

    let mut ballots: Vec<ParsedBallot> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let ranks = line
            .iter()
            .map(|cell| parse_rank(lineno, cell))
            .collect::<RcvResult<Vec<Option<i64>>>>()?;
        debug!("read_csv_table: lineno: {:?} ranks: {:?}", lineno, &ranks);
        ballots.push(ParsedBallot { lineno, ranks });
    }
    Ok(ParsedTable {
        candidates,
        ballots,
    })
}
