//! Delimited-text detection and Markdown table rendering.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::Error;

/// Delimiters tried by [`sniff`], in order of preference.
const CANDIDATE_DELIMITERS: [u8; 5] = [b',', b'\t', b';', b'|', b':'];

/// Number of lines inspected when sniffing.
const SNIFF_LINES: usize = 32;

/// Share of lines that must agree on a delimiter count when no candidate is fully consistent.
const SNIFF_CONSISTENCY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Dialect {
    pub const EXCEL: Dialect = Dialect {
        delimiter: b',',
        quote: b'"',
    };
    pub const EXCEL_TAB: Dialect = Dialect {
        delimiter: b'\t',
        quote: b'"',
    };
    pub const UNIX: Dialect = Dialect {
        delimiter: b',',
        quote: b'"',
    };

    pub fn named(name: &str) -> Option<Dialect> {
        match name {
            "excel" => Some(Self::EXCEL),
            "excel-tab" => Some(Self::EXCEL_TAB),
            "unix" => Some(Self::UNIX),
            _ => None,
        }
    }
}

/// Whether and how attached files are rendered as tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TabularMode {
    #[default]
    Off,
    Sniff,
    Dialect(String, Dialect),
}

impl FromStr for TabularMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(TabularMode::Off),
            "sniff" => Ok(TabularMode::Sniff),
            name => Dialect::named(name)
                .map(|d| TabularMode::Dialect(name.to_string(), d))
                .ok_or_else(|| Error::UnknownDialect(name.to_string())),
        }
    }
}

impl fmt::Display for TabularMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabularMode::Off => f.write_str("off"),
            TabularMode::Sniff => f.write_str("sniff"),
            TabularMode::Dialect(name, _) => f.write_str(name),
        }
    }
}

/// Infers delimiter and quote character from a content sample.
///
/// Returns `None` when no candidate delimiter appears consistently across lines.
pub fn sniff(sample: &str) -> Option<Dialect> {
    let lines: Vec<&str> = sample
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if lines.is_empty() {
        return None;
    }

    let quote = guess_quote(&lines);

    let mut best: Option<(u8, f64)> = None;
    for delimiter in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, delimiter, quote))
            .collect();
        let Some(mode) = modal_count(&counts) else {
            continue;
        };
        let agreeing = counts.iter().filter(|&&c| c == mode).count();
        let ratio = agreeing as f64 / counts.len() as f64;
        if ratio >= 1.0 {
            return Some(Dialect { delimiter, quote });
        }
        if ratio >= SNIFF_CONSISTENCY && best.map_or(true, |(_, r)| ratio > r) {
            best = Some((delimiter, ratio));
        }
    }

    best.map(|(delimiter, _)| Dialect { delimiter, quote })
}

/// Most frequent non-zero count; ties go to the larger count.
fn modal_count(counts: &[usize]) -> Option<usize> {
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for &c in counts.iter().filter(|&&c| c > 0) {
        match tally.iter_mut().find(|(v, _)| *v == c) {
            Some((_, n)) => *n += 1,
            None => tally.push((c, 1)),
        }
    }
    tally
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(v, _)| v)
}

fn count_unquoted(line: &str, delimiter: u8, quote: u8) -> usize {
    let mut quoted = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == quote {
            quoted = !quoted;
        } else if b == delimiter && !quoted {
            count += 1;
        }
    }
    count
}

/// A quote character counts when it opens or closes a field: next to the line
/// edge or to one of the candidate delimiters.
fn guess_quote(lines: &[&str]) -> u8 {
    let boundary = |b: Option<&u8>| b.map_or(true, |b| CANDIDATE_DELIMITERS.contains(b) || *b == b' ');
    let score = |quote: u8| -> usize {
        lines
            .iter()
            .map(|line| {
                let bytes = line.as_bytes();
                bytes
                    .iter()
                    .enumerate()
                    .filter(|(i, &b)| {
                        b == quote
                            && (boundary(i.checked_sub(1).and_then(|p| bytes.get(p)))
                                || boundary(bytes.get(i + 1)))
                    })
                    .count()
            })
            .sum()
    };

    if score(b'\'') > score(b'"') {
        b'\''
    } else {
        b'"'
    }
}

/// Parses `content` with `dialect` and renders it as a Markdown table.
///
/// The first record is the header; records with only empty fields are skipped.
/// Returns `None` if the records fail to parse.
pub fn render_markdown(content: &str, dialect: Dialect) -> Option<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) if record.iter().all(|field| field.trim().is_empty()) => continue,
            Ok(record) => rows.push(record.iter().map(escape_cell).collect::<Vec<_>>()),
            Err(err) => {
                debug!(%err, "content is not delimited text");
                return None;
            }
        }
    }

    let (header, body) = rows.split_first()?;
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(table_row(header));
    lines.push(format!("|{}", " --- |".repeat(header.len())));
    lines.extend(body.iter().map(|row| table_row(row)));
    Some(lines.join("\n"))
}

/// Renders `content` according to `mode`; `None` means "not tabular, use a code fence".
pub fn render(content: &str, mode: &TabularMode) -> Option<String> {
    let dialect = match mode {
        TabularMode::Off => return None,
        TabularMode::Sniff => sniff(content)?,
        TabularMode::Dialect(_, dialect) => *dialect,
    };
    debug!(
        delimiter = %char::from(dialect.delimiter).escape_default(),
        quote = %char::from(dialect.quote),
        "rendering table"
    );
    render_markdown(content, dialect)
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "❘").replace(['\r', '\n'], " ")
}
