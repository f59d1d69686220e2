//! Row/Column Matcher
//!
//! Columns are matched by exact header text. Rows are matched in two passes:
//!
//! 1. **Exact content**: rows whose text across every aligned column is
//!    identical pair up in first-seen order. Each side keeps a queue of row
//!    indices per distinct content and the queues are popped in lockstep, so
//!    duplicates pair one-to-one by position. Surplus occurrences of a shared
//!    content are excluded as duplicates.
//! 2. **Key column**: the remaining rows pair by an identifying column set
//!    (`name`, or `list_name + name` for choice lists). Rows with a blank or
//!    repeated key, or every remaining row when no identifying column exists,
//!    fall back to positional pairing.
//!
//! Both passes only ever pair rows that are still unmatched on both sides, so
//! the alignment is injective in each direction.

use std::collections::{BTreeSet, VecDeque};

use ahash::{AHashMap, AHashSet};
use log::{debug, warn};

use formsync_core::{Error, Result, Worksheet};

use crate::options::AlignOptions;

/// Column mapping between two worksheets, by header text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAlignment {
    a_to_b: Vec<Option<usize>>,
    b_to_a: Vec<Option<usize>>,
}

impl ColumnAlignment {
    /// Match columns of `a` and `b` by trimmed header text
    ///
    /// Blank headers never match. When a header repeats, only its first
    /// occurrence takes part in matching.
    pub fn new(a: &Worksheet, b: &Worksheet) -> Self {
        let headers_a = a.headers();
        let headers_b = b.headers();

        let mut first_in_a: AHashMap<&str, usize> = AHashMap::new();
        for (col, header) in headers_a.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if first_in_a.contains_key(header.as_str()) {
                warn!(
                    "Worksheet '{}': header '{}' repeats; only its first column is compared",
                    a.name(),
                    header
                );
                continue;
            }
            first_in_a.insert(header.as_str(), col);
        }

        let mut a_to_b = vec![None; headers_a.len()];
        let mut b_to_a = vec![None; headers_b.len()];
        for (col_b, header) in headers_b.iter().enumerate() {
            let Some(&col_a) = first_in_a.get(header.as_str()) else {
                continue;
            };
            if a_to_b[col_a].is_some() {
                warn!(
                    "Worksheet '{}': header '{}' repeats; only its first column is compared",
                    b.name(),
                    header
                );
                continue;
            }
            a_to_b[col_a] = Some(col_b);
            b_to_a[col_b] = Some(col_a);
        }

        Self { a_to_b, b_to_a }
    }

    /// Column in B matched to column `col` of A
    pub fn b_for_a(&self, col: usize) -> Option<usize> {
        self.a_to_b.get(col).copied().flatten()
    }

    /// Column in A matched to column `col` of B
    pub fn a_for_b(&self, col: usize) -> Option<usize> {
        self.b_to_a.get(col).copied().flatten()
    }

    /// Matched `(a, b)` column pairs in B column order
    pub fn matched(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.b_to_a
            .iter()
            .enumerate()
            .filter_map(|(b, a)| a.map(|a| (a, b)))
    }

    /// Columns of B with no counterpart in A
    pub fn only_in_b(&self) -> Vec<usize> {
        (0..self.b_to_a.len())
            .filter(|&col| self.b_to_a[col].is_none())
            .collect()
    }

    /// Number of columns in B
    pub fn width_b(&self) -> usize {
        self.b_to_a.len()
    }
}

/// How a row pair was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchKind {
    /// The header rows
    Header,
    /// Identical content across aligned columns
    Content,
    /// Same identifying key
    Key,
    /// Positional fallback
    Positional,
}

/// How rows left over after the content pass were matched
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowStrategy {
    /// By the named identifying columns
    KeyColumns(Vec<String>),
    /// By position, for lack of an identifying column
    Positional,
}

/// Row mapping between two worksheets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAlignment {
    a_to_b: Vec<Option<usize>>,
    b_to_a: Vec<Option<usize>>,
    kinds: Vec<Option<MatchKind>>,
    duplicates_a: Vec<usize>,
    duplicates_b: Vec<usize>,
    only_in_b: Vec<usize>,
    deleted: Vec<usize>,
    reordered: BTreeSet<usize>,
}

impl RowAlignment {
    fn new(len_a: usize, len_b: usize) -> Self {
        Self {
            a_to_b: vec![None; len_a],
            b_to_a: vec![None; len_b],
            kinds: vec![None; len_b],
            duplicates_a: Vec::new(),
            duplicates_b: Vec::new(),
            only_in_b: Vec::new(),
            deleted: Vec::new(),
            reordered: BTreeSet::new(),
        }
    }

    fn pair(&mut self, a: usize, b: usize, kind: MatchKind) {
        debug_assert!(self.a_to_b[a].is_none() && self.b_to_a[b].is_none());
        self.a_to_b[a] = Some(b);
        self.b_to_a[b] = Some(a);
        self.kinds[b] = Some(kind);
    }

    fn finish(&mut self) {
        self.duplicates_a.sort_unstable();
        self.duplicates_b.sort_unstable();
        self.only_in_b.sort_unstable();
        self.deleted.sort_unstable();

        // Rank of each data pair among matched rows, on each side
        let pairs: Vec<(usize, usize)> = self
            .a_to_b
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(a, b)| b.map(|b| (a, b)))
            .collect();
        let mut by_b: Vec<usize> = pairs.iter().map(|(_, b)| *b).collect();
        by_b.sort_unstable();

        for (rank_a, (_, b)) in pairs.iter().enumerate() {
            if by_b.binary_search(b) != Ok(rank_a) {
                self.reordered.insert(*b);
            }
        }
    }

    /// Row in B matched to row `row` of A
    pub fn b_for_a(&self, row: usize) -> Option<usize> {
        self.a_to_b.get(row).copied().flatten()
    }

    /// Row in A matched to row `row` of B
    pub fn a_for_b(&self, row: usize) -> Option<usize> {
        self.b_to_a.get(row).copied().flatten()
    }

    /// How row `row` of B was matched, if it was
    pub fn kind(&self, row: usize) -> Option<MatchKind> {
        self.kinds.get(row).copied().flatten()
    }

    /// Matched `(a, b)` row pairs in B row order, header included
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.b_to_a
            .iter()
            .enumerate()
            .filter_map(|(b, a)| a.map(|a| (a, b)))
            .collect()
    }

    /// Whether row `row` of B moved relative to the other matched rows
    pub fn is_reordered(&self, row: usize) -> bool {
        self.reordered.contains(&row)
    }

    /// Rows of B that moved, ascending
    pub fn reordered(&self) -> impl Iterator<Item = usize> + '_ {
        self.reordered.iter().copied()
    }

    /// Surplus duplicate rows of A, ascending
    pub fn duplicates_in_a(&self) -> &[usize] {
        &self.duplicates_a
    }

    /// Surplus duplicate rows of B, ascending
    pub fn duplicates_in_b(&self) -> &[usize] {
        &self.duplicates_b
    }

    /// Whether row `row` of B is a surplus duplicate
    pub fn is_duplicate_in_b(&self, row: usize) -> bool {
        self.duplicates_b.binary_search(&row).is_ok()
    }

    /// Rows present only in B, ascending
    pub fn only_in_b(&self) -> &[usize] {
        &self.only_in_b
    }

    /// Whether row `row` of B exists only in B
    pub fn is_only_in_b(&self, row: usize) -> bool {
        self.only_in_b.binary_search(&row).is_ok()
    }

    /// Rows of A with no counterpart in B (deleted), ascending
    pub fn deleted(&self) -> &[usize] {
        &self.deleted
    }
}

/// Result of aligning two worksheets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Name of the new (B) worksheet
    pub sheet: String,
    pub columns: ColumnAlignment,
    pub rows: RowAlignment,
    /// Strategy used after the content pass
    pub strategy: RowStrategy,
    /// Recovered problems ([`Error::AmbiguousKey`]) met while matching
    pub degradations: Vec<Error>,
}

/// Align two worksheets with default options
pub fn align(a: &Worksheet, b: &Worksheet) -> Result<Alignment> {
    align_with_options(a, b, &AlignOptions::default())
}

/// Align two worksheets
///
/// Fails only when either worksheet lacks a header row. Ambiguous keys and
/// missing identifying columns degrade to positional matching.
pub fn align_with_options(a: &Worksheet, b: &Worksheet, options: &AlignOptions) -> Result<Alignment> {
    a.require_header()?;
    b.require_header()?;

    let columns = ColumnAlignment::new(a, b);
    let mut rows = RowAlignment::new(a.row_count(), b.row_count());
    rows.pair(0, 0, MatchKind::Header);

    if options.match_content && columns.matched().next().is_some() {
        match_content(a, b, &columns, &mut rows);
    }

    let excluded_a: AHashSet<usize> = rows.duplicates_a.iter().copied().collect();
    let excluded_b: AHashSet<usize> = rows.duplicates_b.iter().copied().collect();
    let rest_a: Vec<usize> = (1..a.row_count())
        .filter(|r| rows.a_to_b[*r].is_none() && !excluded_a.contains(r))
        .collect();
    let rest_b: Vec<usize> = (1..b.row_count())
        .filter(|r| rows.b_to_a[*r].is_none() && !excluded_b.contains(r))
        .collect();

    let mut degradations = Vec::new();
    let strategy = match find_key_columns(a, b, &options.key_columns) {
        Some(spec) => {
            match_keys(a, b, &spec, &rest_a, &rest_b, &mut rows, &mut degradations);
            RowStrategy::KeyColumns(spec.names)
        }
        None => {
            if !rest_a.is_empty() && !rest_b.is_empty() {
                warn!(
                    "Worksheet '{}': no identifying column, aligning {} unmatched rows by position",
                    b.name(),
                    rest_a.len().max(rest_b.len())
                );
            }
            match_positional(&rest_a, &rest_b, &mut rows);
            RowStrategy::Positional
        }
    };

    rows.finish();

    debug!(
        "Worksheet '{}': {} pairs, {} only in new, {} deleted, {} duplicates, {} reordered",
        b.name(),
        rows.pairs().len().saturating_sub(1),
        rows.only_in_b.len(),
        rows.deleted.len(),
        rows.duplicates_a.len() + rows.duplicates_b.len(),
        rows.reordered.len()
    );

    Ok(Alignment {
        sheet: b.name().to_string(),
        columns,
        rows,
        strategy,
        degradations,
    })
}

type ContentQueues = AHashMap<Vec<String>, VecDeque<usize>>;

fn row_content(ws: &Worksheet, row: usize, cols: &[usize]) -> Vec<String> {
    cols.iter().map(|&col| ws.text_at(row, col)).collect()
}

/// Content → queue of data rows, plus the contents in first-seen order
fn content_queues(ws: &Worksheet, cols: &[usize]) -> (Vec<Vec<String>>, ContentQueues) {
    let mut order = Vec::new();
    let mut queues = ContentQueues::new();
    for row in 1..ws.row_count() {
        let content = row_content(ws, row, cols);
        let queue = queues.entry(content.clone()).or_insert_with(|| {
            order.push(content);
            VecDeque::new()
        });
        queue.push_back(row);
    }
    (order, queues)
}

fn match_content(a: &Worksheet, b: &Worksheet, columns: &ColumnAlignment, rows: &mut RowAlignment) {
    let (cols_a, cols_b): (Vec<usize>, Vec<usize>) = columns.matched().unzip();
    let (order_a, mut queues_a) = content_queues(a, &cols_a);
    let (_, mut queues_b) = content_queues(b, &cols_b);

    for content in &order_a {
        let (Some(queue_a), Some(queue_b)) = (queues_a.get_mut(content), queues_b.get_mut(content))
        else {
            continue;
        };
        while let (Some(row_a), Some(row_b)) = (queue_a.pop_front(), queue_b.pop_front()) {
            rows.pair(row_a, row_b, MatchKind::Content);
        }
        // Whatever is left on either side outnumbers the other side
        rows.duplicates_a.extend(queue_a.drain(..));
        rows.duplicates_b.extend(queue_b.drain(..));
    }
}

struct KeySpec {
    names: Vec<String>,
    cols_a: Vec<usize>,
    cols_b: Vec<usize>,
}

fn find_key_columns(a: &Worksheet, b: &Worksheet, candidates: &[Vec<String>]) -> Option<KeySpec> {
    candidates
        .iter()
        .filter(|set| !set.is_empty())
        .find_map(|set| {
            let cols_a = set
                .iter()
                .map(|name| a.column_index(name))
                .collect::<Option<Vec<_>>>()?;
            let cols_b = set
                .iter()
                .map(|name| b.column_index(name))
                .collect::<Option<Vec<_>>>()?;
            Some(KeySpec {
                names: set.clone(),
                cols_a,
                cols_b,
            })
        })
}

/// Rows split into uniquely keyed rows and ambiguous ones
struct KeyedRows {
    unique: Vec<(Vec<String>, usize)>,
    ambiguous: Vec<usize>,
}

fn partition_keys(
    ws: &Worksheet,
    cols: &[usize],
    candidates: &[usize],
    label: &str,
    degradations: &mut Vec<Error>,
) -> KeyedRows {
    let keyed: Vec<(usize, Vec<String>)> = candidates
        .iter()
        .map(|&row| {
            let key = cols
                .iter()
                .map(|&col| ws.text_at(row, col).trim().to_string())
                .collect();
            (row, key)
        })
        .collect();

    let mut counts: AHashMap<&[String], usize> = AHashMap::new();
    for (_, key) in &keyed {
        *counts.entry(key.as_slice()).or_insert(0) += 1;
    }

    let mut unique = Vec::new();
    let mut ambiguous = Vec::new();
    for (row, key) in &keyed {
        let blank = key.iter().all(String::is_empty);
        if blank || counts[key.as_slice()] > 1 {
            ambiguous.push(*row);
            degradations.push(Error::AmbiguousKey {
                sheet: ws.name().to_string(),
                column: label.to_string(),
                row: *row,
                key: key.join("/"),
            });
        } else {
            unique.push((key.clone(), *row));
        }
    }

    if !ambiguous.is_empty() {
        warn!(
            "Worksheet '{}': {} rows have a blank or repeated '{}'; aligning them by position",
            ws.name(),
            ambiguous.len(),
            label
        );
    }

    KeyedRows { unique, ambiguous }
}

fn match_keys(
    a: &Worksheet,
    b: &Worksheet,
    spec: &KeySpec,
    rest_a: &[usize],
    rest_b: &[usize],
    rows: &mut RowAlignment,
    degradations: &mut Vec<Error>,
) {
    let label = spec.names.join("+");
    let keyed_a = partition_keys(a, &spec.cols_a, rest_a, &label, degradations);
    let keyed_b = partition_keys(b, &spec.cols_b, rest_b, &label, degradations);

    let lookup_a: AHashMap<&[String], usize> = keyed_a
        .unique
        .iter()
        .map(|(key, row)| (key.as_slice(), *row))
        .collect();

    for (key, row_b) in &keyed_b.unique {
        match lookup_a.get(key.as_slice()) {
            Some(&row_a) => rows.pair(row_a, *row_b, MatchKind::Key),
            None => rows.only_in_b.push(*row_b),
        }
    }
    for (_, row_a) in &keyed_a.unique {
        if rows.a_to_b[*row_a].is_none() {
            rows.deleted.push(*row_a);
        }
    }

    match_positional(&keyed_a.ambiguous, &keyed_b.ambiguous, rows);
}

/// Pair leftovers i-th with i-th, up to the shorter list
fn match_positional(rest_a: &[usize], rest_b: &[usize], rows: &mut RowAlignment) {
    for (&row_a, &row_b) in rest_a.iter().zip(rest_b) {
        rows.pair(row_a, row_b, MatchKind::Positional);
    }
    let paired = rest_a.len().min(rest_b.len());
    rows.only_in_b.extend_from_slice(&rest_b[paired..]);
    rows.deleted.extend_from_slice(&rest_a[paired..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(rows: &[&[&str]]) -> Worksheet {
        let mut ws = Worksheet::new("survey");
        for row in rows {
            ws.push_row(row.iter().copied());
        }
        ws
    }

    const HEADER: &[&str] = &["type", "name", "label"];

    #[test]
    fn test_reordered_rows_match_by_content() {
        let a = sheet(&[
            HEADER,
            &["text", "r1", "One"],
            &["text", "r2", "Two"],
            &["text", "r3", "Three"],
        ]);
        let b = sheet(&[
            HEADER,
            &["text", "r3", "Three"],
            &["text", "r1", "One"],
            &["text", "r2", "Two"],
        ]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(alignment.rows.b_for_a(1), Some(2));
        assert_eq!(alignment.rows.b_for_a(2), Some(3));
        assert_eq!(alignment.rows.b_for_a(3), Some(1));
        assert_eq!(alignment.rows.reordered().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(alignment.rows.kind(1), Some(MatchKind::Content));
    }

    #[test]
    fn test_surplus_duplicate_is_excluded() {
        let a = sheet(&[HEADER, &["note", "x", "X"], &["note", "x", "X"]]);
        let b = sheet(&[HEADER, &["note", "x", "X"]]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(alignment.rows.b_for_a(1), Some(1));
        assert_eq!(alignment.rows.b_for_a(2), None);
        assert_eq!(alignment.rows.duplicates_in_a(), &[2]);
        assert!(alignment.rows.deleted().is_empty());
        assert!(alignment.rows.reordered().next().is_none());
    }

    #[test]
    fn test_surplus_duplicate_in_new_file() {
        let a = sheet(&[HEADER, &["note", "x", "X"]]);
        let b = sheet(&[HEADER, &["note", "x", "X"], &["note", "x", "X"]]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(alignment.rows.a_for_b(1), Some(1));
        assert!(alignment.rows.is_duplicate_in_b(2));
        assert!(!alignment.rows.is_only_in_b(2));
    }

    #[test]
    fn test_key_pass_pairs_edited_rows() {
        let a = sheet(&[HEADER, &["text", "q1", "Name?"], &["integer", "gone", "Age?"]]);
        let b = sheet(&[
            HEADER,
            &["text", "q1", "Full name?"],
            &["date", "dob", "Birthday?"],
        ]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(alignment.strategy, RowStrategy::KeyColumns(vec!["name".into()]));
        assert_eq!(alignment.rows.a_for_b(1), Some(1));
        assert_eq!(alignment.rows.kind(1), Some(MatchKind::Key));
        assert_eq!(alignment.rows.only_in_b(), &[2]);
        assert_eq!(alignment.rows.deleted(), &[2]);
        assert!(alignment.degradations.is_empty());
    }

    #[test]
    fn test_choices_use_list_name_and_name() {
        let header: &[&str] = &["list_name", "name", "label"];
        let a = sheet(&[header, &["yn", "1", "Yes"], &["agree", "1", "Agree"]]);
        let b = sheet(&[header, &["agree", "1", "Strongly agree"], &["yn", "1", "Yes!"]]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(
            alignment.strategy,
            RowStrategy::KeyColumns(vec!["list_name".into(), "name".into()])
        );
        assert_eq!(alignment.rows.a_for_b(1), Some(2));
        assert_eq!(alignment.rows.a_for_b(2), Some(1));
    }

    #[test]
    fn test_blank_keys_fall_back_to_position() {
        let a = sheet(&[
            HEADER,
            &["begin group", "g", "Group"],
            &["end group", "", ""],
            &["end group", "", "x"],
        ]);
        let b = sheet(&[
            HEADER,
            &["begin group", "g", "Group!"],
            &["end group", "", "y"],
            &["end group", "", "z"],
        ]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(alignment.rows.a_for_b(1), Some(1));
        assert_eq!(alignment.rows.a_for_b(2), Some(2));
        assert_eq!(alignment.rows.kind(2), Some(MatchKind::Positional));
        assert_eq!(alignment.rows.a_for_b(3), Some(3));
        assert_eq!(alignment.degradations.len(), 4);
        assert!(alignment.degradations.iter().all(Error::is_recoverable));
    }

    #[test]
    fn test_no_identifying_column_is_positional() {
        let header: &[&str] = &["a", "b"];
        let a = sheet(&[header, &["1", "2"], &["3", "4"]]);
        let b = sheet(&[header, &["1", "X"], &["3", "Y"], &["5", "6"]]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(alignment.strategy, RowStrategy::Positional);
        assert_eq!(alignment.rows.pairs(), vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(alignment.rows.only_in_b(), &[3]);
    }

    #[test]
    fn test_columns_by_header() {
        let a = sheet(&[&["type", "name", "label::English", "old"]]);
        let b = sheet(&[&["name", "type", "label::English", "label::French", ""]]);

        let columns = ColumnAlignment::new(&a, &b);
        assert_eq!(columns.b_for_a(0), Some(1));
        assert_eq!(columns.a_for_b(0), Some(1));
        assert_eq!(columns.b_for_a(3), None);
        assert_eq!(columns.only_in_b(), vec![3, 4]);
        assert_eq!(columns.matched().collect::<Vec<_>>(), vec![(1, 0), (0, 1), (2, 2)]);
    }

    #[test]
    fn test_repeated_header_matches_once() {
        let a = sheet(&[&["label", "label"]]);
        let b = sheet(&[&["label", "label"]]);

        let columns = ColumnAlignment::new(&a, &b);
        assert_eq!(columns.matched().collect::<Vec<_>>(), vec![(0, 0)]);
        assert_eq!(columns.only_in_b(), vec![1]);
    }

    #[test]
    fn test_missing_header_is_malformed() {
        let a = Worksheet::new("survey");
        let b = sheet(&[HEADER]);
        assert!(matches!(
            align(&a, &b),
            Err(Error::MalformedWorkbook { .. })
        ));
    }

    #[test]
    fn test_insertion_does_not_flag_reorder() {
        let a = sheet(&[HEADER, &["text", "a", "A"], &["text", "b", "B"]]);
        let b = sheet(&[
            HEADER,
            &["text", "new", "New"],
            &["text", "a", "A"],
            &["text", "b", "B"],
        ]);

        let alignment = align(&a, &b).unwrap();
        assert_eq!(alignment.rows.only_in_b(), &[1]);
        assert!(alignment.rows.reordered().next().is_none());
    }
}
