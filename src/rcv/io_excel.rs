use calamine::DataType;

use crate::rcv::{
    io_common::{parse_rank, ParsedBallot, ParsedTable},
    *,
};

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> RcvResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    let wrange = if let Some(worksheet_name) = worksheet_name_o {
        workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?
    };
    Ok(wrange)
}

fn read_rank_cell(lineno: usize, cell: &DataType) -> RcvResult<Option<i64>> {
    match cell {
        DataType::Int(i) => Ok(Some(*i)),
        DataType::Float(f) if f.fract() == 0.0 => Ok(Some(*f as i64)),
        DataType::String(s) => parse_rank(lineno, s),
        DataType::Empty => Ok(None),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

/// Reads a ballot table laid out as in the CSV format: the candidate names in
/// the first row, then one row per ballot.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> RcvResult<ParsedTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu {})?;
    debug!("read_excel_table: header: {:?}", header);
    let mut candidates: Vec<String> = Vec::new();
    for cell in header {
        match cell {
            DataType::String(s) => candidates.push(s.trim().to_string()),
            _ => {
                return ExcelWrongCellTypeSnafu {
                    lineno: 1_usize,
                    content: format!("{:?}", cell),
                }
                .fail();
            }
        }
    }

    let mut ballots: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        debug!("read_excel_table: lineno: {:?} row: {:?}", lineno, row);
        let ranks = row
            .iter()
            .map(|cell| read_rank_cell(lineno, cell))
            .collect::<RcvResult<Vec<Option<i64>>>>()?;
        ballots.push(ParsedBallot { lineno, ranks });
    }
    Ok(ParsedTable {
        candidates,
        ballots,
    })
}
