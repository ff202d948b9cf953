use log::{debug, info, warn};

use ranked_tally::*;
use snafu::{prelude::*, Snafu};

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rcv::config_reader::*;
use crate::rcv::io_common::{simplify_file_name, zero_based_ranks, ParsedTable};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file has no worksheet or no header row"))]
    EmptyExcel {},
    #[snafu(display("Line {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("No candidates in the header of {path}"))]
    EmptyBallotTable { path: String },
    #[snafu(display("Line {lineno}: {content} is not a rank"))]
    InvalidRank { lineno: usize, content: String },
    #[snafu(display("{count} spoiled ballot(s)"))]
    SpoiledBallots { count: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("No ballot file: use --input or a ballotSource in --config"))]
    MissingInput {},
    #[snafu(display("Invalid rules: {source}"))]
    InvalidRules { source: TallyError },
    #[snafu(display("Tabulation error: {source}"))]
    Tally { source: TallyError },
    #[snafu(display("Difference detected between calculated summary and reference summary {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RcvResult<T> = Result<T, RcvError>;

/// Where the ballots come from, after merging the configuration file and the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceSettings {
    pub provider: String,
    pub path: String,
    pub rank_base: i64,
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionSettings {
    pub output: OutputConfig,
    pub source: SourceSettings,
    pub rules: TallyRules,
}

fn infer_provider(path: &str) -> String {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => "xlsx".to_string(),
        _ => "csv".to_string(),
    }
}

/// Merges the configuration file (if any) with the command line options.
/// The command line wins.
pub fn resolve_settings(args: &Args) -> RcvResult<ElectionSettings> {
    let config: Option<TallyConfig> = match &args.config {
        Some(p) => Some(read_config(p)?),
        None => None,
    };

    let (output_settings, config_source, rules_config) = match config {
        Some(c) => {
            let root_p = Path::new(args.config.as_deref().unwrap_or(""))
                .parent()
                .context(MissingParentDirSnafu {})?;
            // Paths in the configuration are relative to the configuration file.
            let source = c.ballot_source.map(|mut bs| {
                let p: PathBuf = [root_p, Path::new(bs.file_path.as_str())].iter().collect();
                bs.file_path = p.display().to_string();
                bs
            });
            (c.output_settings, source, c.rules)
        }
        None => (OutputSettings::default(), None, RulesConfig::default()),
    };

    let path: String = match (&args.input, &config_source) {
        (Some(p), _) => p.clone(),
        (None, Some(bs)) => bs.file_path.clone(),
        (None, None) => return MissingInputSnafu {}.fail(),
    };
    let provider = args
        .input_type
        .clone()
        .or_else(|| config_source.as_ref().and_then(|bs| bs.provider.clone()))
        .unwrap_or_else(|| infer_provider(&path));
    let rank_base = args
        .rank_base
        .or_else(|| config_source.as_ref().and_then(|bs| bs.rank_base))
        .unwrap_or(1);
    let excel_worksheet_name = args.excel_worksheet_name.clone().or_else(|| {
        config_source
            .as_ref()
            .and_then(|bs| bs.excel_worksheet_name.clone())
    });

    let mut rules_config = rules_config;
    if args.methods.is_some() {
        rules_config.methods = args.methods.clone();
    }
    if args.scoring_systems.is_some() {
        rules_config.scoring_systems = args.scoring_systems.clone();
    }
    if args.strict_pairs {
        rules_config.non_strict_pair_ordering = Some("fail".to_string());
    }
    let rules = rules_config.validate()?;

    let output = OutputConfig {
        contest: output_settings
            .contest_name
            .clone()
            .unwrap_or_else(|| simplify_file_name(&path)),
        date: output_settings.contest_date,
        jurisdiction: output_settings.contest_jurisdiction,
        office: output_settings.contest_office,
    };

    Ok(ElectionSettings {
        output,
        source: SourceSettings {
            provider,
            path,
            rank_base,
            excel_worksheet_name,
        },
        rules,
    })
}

fn read_ballot_table(source: &SourceSettings) -> RcvResult<ParsedTable> {
    info!("Attempting to read rank file {:?}", source.path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_table(&source.path),
        "xlsx" => io_excel::read_excel_table(&source.path, source.excel_worksheet_name.as_deref()),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Reads the ballots and lists the spoiled ones.
/// Returns the election if every ballot is a full ranking.
pub fn load_election(source: &SourceSettings) -> RcvResult<Election> {
    let table = read_ballot_table(source)?;
    let ranks = zero_based_ranks(&table, source.rank_base);
    let spoiled = find_spoiled(table.candidates.len(), &ranks);
    for sb in spoiled.iter() {
        let pb = &table.ballots[sb.position];
        warn!("line {}: spoiled ballot: {:?}", sb.position + 1, pb.ranks);
    }
    ensure!(
        spoiled.is_empty(),
        SpoiledBallotsSnafu {
            count: spoiled.len()
        }
    );
    Election::load(&table.candidates, &ranks).context(TallySnafu {})
}

/// The spoiled ballot listing: one line per spoiled ballot, then the count.
/// Ballots are numbered from 1, the header excluded.
pub fn ballot_check_lines(table: &ParsedTable, rank_base: i64) -> (Vec<String>, usize) {
    let ranks = zero_based_ranks(table, rank_base);
    let spoiled = find_spoiled(table.candidates.len(), &ranks);
    let mut lines: Vec<String> = spoiled
        .iter()
        .map(|sb| {
            let cells: Vec<String> = table.ballots[sb.position]
                .ranks
                .iter()
                .map(|r| r.map(|x| x.to_string()).unwrap_or_default())
                .collect();
            format!("line {}: spoiled ballot: {}", sb.position + 1, cells.join(","))
        })
        .collect();
    lines.push(format!(
        "{} ballots, {} spoiled",
        table.ballots.len(),
        spoiled.len()
    ));
    (lines, spoiled.len())
}

/// Prints the spoiled ballots, in the input order, and nothing else.
fn check_ballots(source: &SourceSettings) -> RcvResult<()> {
    let table = read_ballot_table(source)?;
    let (lines, count) = ballot_check_lines(&table, source.rank_base);
    for line in lines.iter() {
        println!("{}", line);
    }
    ensure!(count == 0, SpoiledBallotsSnafu { count });
    Ok(())
}

fn print_head_to_head(election: &Election, names: &[String]) -> RcvResult<()> {
    let (first, second) = match names {
        [a, b] => (a, b),
        x => whatever!("--pair needs exactly two candidates, got {:?}", x),
    };
    let h = head_to_head(election, first, second).context(TallySnafu {})?;
    println!("{} {}", h.first.0, h.first.1);
    println!("{} {}", h.second.0, h.second.1);
    println!("{}", h.difference);
    Ok(())
}

fn outcome_to_json(outcome: &Outcome) -> JSValue {
    match outcome {
        Outcome::Winner(name) => json!({ "winner": name }),
        Outcome::Tie(names) => json!({ "tied": names }),
        Outcome::NoWinner => json!({ "noWinner": true }),
    }
}

fn error_to_json(err: &TallyError) -> JSValue {
    json!({ "error": err.to_string() })
}

fn positional_to_json(res: &PositionalResult) -> JSValue {
    let mut systems: JSMap<String, JSValue> = JSMap::new();
    for ss in res.systems.iter() {
        let mut scores: JSMap<String, JSValue> = JSMap::new();
        for (name, score) in ss.scores.iter() {
            scores.insert(name.clone(), json!(score));
        }
        systems.insert(ss.system.clone(), JSValue::Object(scores));
    }
    JSValue::Object(systems)
}

fn irv_to_json(res: &IrvResult) -> JSValue {
    let mut rounds: Vec<JSValue> = Vec::new();
    for round_stat in res.rounds.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count));
        }
        let mut js = json!({
            "round": round_stat.round,
            "tally": tally,
            "eliminated": round_stat.eliminated,
        });
        if let Some(outcome) = &round_stat.outcome {
            js["outcome"] = outcome_to_json(outcome);
        }
        rounds.push(js);
    }
    json!({ "rounds": rounds, "outcome": outcome_to_json(&res.outcome) })
}

fn rpv_to_json(res: &RpvResult) -> JSValue {
    let pairs: Vec<JSValue> = res
        .decisions
        .iter()
        .map(|d| {
            json!({
                "winner": d.winner,
                "loser": d.loser,
                "winnerVotes": d.winner_votes,
                "loserVotes": d.loser_votes,
                "margin": d.margin,
                "locked": d.locked,
            })
        })
        .collect();
    let ambiguous: Vec<JSValue> = res
        .ambiguous_orderings
        .iter()
        .map(|a| json!([[a.first.0, a.first.1], [a.second.0, a.second.1]]))
        .collect();
    json!({
        "pairs": pairs,
        "ambiguousOrderings": ambiguous,
        "outcome": outcome_to_json(&res.outcome),
    })
}

fn method_to_json<T>(res: &Result<T, TallyError>, f: fn(&T) -> JSValue) -> JSValue {
    match res {
        Ok(x) => f(x),
        Err(e) => error_to_json(e),
    }
}

pub fn build_summary_js(settings: &ElectionSettings, election: &Election, report: &TallyReport) -> JSValue {
    let mut results: JSMap<String, JSValue> = JSMap::new();
    if let Some(irv) = &report.irv {
        results.insert("irv".to_string(), method_to_json(irv, irv_to_json));
    }
    if let Some(positional) = &report.positional {
        results.insert(
            "borda".to_string(),
            method_to_json(positional, positional_to_json),
        );
    }
    if let Some(rpv) = &report.rpv {
        results.insert("rpv".to_string(), method_to_json(rpv, rpv_to_json));
    }
    json!({
        "config": settings.output,
        "fingerprint": report.fingerprint,
        "candidates": election.candidates(),
        "ballots": election.num_ballots(),
        "results": results,
    })
}

fn outcome_lines(out: &mut String, outcome: &Outcome) -> std::fmt::Result {
    match outcome {
        Outcome::Winner(name) => writeln!(out, "    Winner {}", name),
        Outcome::Tie(names) => {
            for name in names {
                writeln!(out, "    Tied {}", name)?;
            }
            Ok(())
        }
        Outcome::NoWinner => writeln!(out, "    No winner."),
    }
}

fn irv_text(out: &mut String, res: &IrvResult) -> std::fmt::Result {
    for round_stat in res.rounds.iter() {
        writeln!(out, "    Round {}", round_stat.round)?;
        for (name, count) in round_stat.tally.iter() {
            writeln!(out, "        {}: {}", name, count)?;
        }
        match &round_stat.outcome {
            Some(Outcome::Winner(name)) => writeln!(out, "        Winner {}", name)?,
            _ => {
                for name in round_stat.eliminated.iter() {
                    writeln!(out, "        Eliminate {}", name)?;
                }
            }
        }
    }
    if let Outcome::Tie(names) = &res.outcome {
        writeln!(out, "    Tie {}", names.join(", "))?;
    }
    Ok(())
}

fn positional_text(out: &mut String, res: &PositionalResult) -> std::fmt::Result {
    for (idx, ss) in res.systems.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", ss.system)?;
        for (name, score) in ss.scores.iter() {
            writeln!(out, "    {} {}", name, score)?;
        }
    }
    Ok(())
}

fn rpv_text(out: &mut String, res: &RpvResult) -> std::fmt::Result {
    for d in res.decisions.iter() {
        let status = if d.locked { "" } else { " (rejected)" };
        writeln!(out, "    {} > {}: {}{}", d.winner, d.loser, d.margin, status)?;
    }
    for amb in res.ambiguous_orderings.iter() {
        writeln!(
            out,
            "    Unordered {} > {} and {} > {}",
            amb.first.0, amb.first.1, amb.second.0, amb.second.1
        )?;
    }
    outcome_lines(out, &res.outcome)
}

fn section<T>(
    out: &mut String,
    title: &str,
    res: &Result<T, TallyError>,
    f: fn(&mut String, &T) -> std::fmt::Result,
) -> std::fmt::Result {
    if !title.is_empty() {
        writeln!(out, "{}", title)?;
    }
    match res {
        Ok(x) => f(out, x)?,
        Err(e) => writeln!(out, "    Error: {}", e)?,
    }
    writeln!(out)
}

/// Renders the results in the order the methods were run: IRV, the Borda
/// systems, then ranked pairs.
pub fn format_text_report(report: &TallyReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_text_report(&mut out, report);
    out
}

fn write_text_report(out: &mut String, report: &TallyReport) -> std::fmt::Result {
    if let Some(irv) = &report.irv {
        section(out, "IRV", irv, irv_text)?;
    }
    if let Some(positional) = &report.positional {
        section(out, "", positional, positional_text)?;
    }
    if let Some(rpv) = &report.rpv {
        section(out, "RPV", rpv, rpv_text)?;
    }
    Ok(())
}

fn write_summary(out: &str, pretty_js: &str) -> RcvResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
        return Ok(());
    }
    info!("Writing summary to {}", out);
    fs::write(out, pretty_js).context(WritingSummarySnafu { path: out })
}

/// Tabulates the election described by the settings, prints the text report,
/// and writes or checks the JSON summary.
pub fn run_election(
    settings: &ElectionSettings,
    out_path: Option<String>,
    check_summary_path: Option<String>,
) -> RcvResult<TallyReport> {
    info!("settings: {:?}", settings);
    let election = load_election(&settings.source)?;
    info!(
        "Loaded {} ballots for {} candidates",
        election.num_ballots(),
        election.num_candidates()
    );

    let report = tabulate_all(&election, &settings.rules);
    debug!("report: {:?}", report);
    print!("{}", format_text_report(&report));

    let result_js = build_summary_js(settings, &election, &report);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    if let Some(out) = out_path {
        write_summary(&out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu { path: summary_p }.fail();
        }
    }
    Ok(report)
}

pub fn run_cli(args: &Args) -> RcvResult<()> {
    let settings = resolve_settings(args)?;
    if args.check_ballots {
        return check_ballots(&settings.source);
    }
    if let Some(names) = &args.pair {
        let election = load_election(&settings.source)?;
        return print_head_to_head(&election, names);
    }
    run_election(&settings, args.out.clone(), args.reference.clone())?;
    Ok(())
}
