//! Flattening engine specific results into one common table
//!
//! Every [`RawResult`] variant is converted into rows with the same fixed
//! columns (see [`COLUMNS`]). List valued fields, such as the intersecting
//! genes, are joined with [`LIST_DELIMITER`] in their original order.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::{ClassicRecord, GostRecord, HypergeometricRecord, RawResult};
use crate::LIST_DELIMITER;

/// Column names of the result table, in order
pub const COLUMNS: [&str; 14] = [
    "term_id",
    "term_name",
    "aspect",
    "pvalue",
    "p_adjust",
    "term_size",
    "query_size",
    "intersection_size",
    "expected",
    "fold_enrichment",
    "precision",
    "recall",
    "intersection",
    "parents",
];

/// A single flat result row
///
/// Values that an engine does not provide are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResultRow {
    /// GO term ID, e.g. `GO:0006915`
    pub term_id: String,
    /// Name of the GO term
    pub term_name: String,
    /// `BP`, `MF` or `CC`
    pub aspect: String,
    /// Raw p-value
    #[serde(deserialize_with = "lenient_pvalue")]
    pub pvalue: Option<f64>,
    /// Corrected p-value
    #[serde(deserialize_with = "lenient_pvalue")]
    pub p_adjust: Option<f64>,
    /// Number of background genes annotated to the term
    pub term_size: Option<u64>,
    /// Number of query genes that were tested
    pub query_size: Option<u64>,
    /// Number of query genes annotated to the term
    pub intersection_size: Option<u64>,
    /// Intersection size expected by chance
    pub expected: Option<f64>,
    /// Ratio of the observed to the expected intersection size
    pub fold_enrichment: Option<f64>,
    /// Share of the query genes that are annotated to the term
    pub precision: Option<f64>,
    /// Share of the term genes that are part of the query
    pub recall: Option<f64>,
    /// Flattened list of the intersecting genes
    pub intersection: String,
    /// Flattened list of the parent terms
    pub parents: String,
}

impl EnrichmentResultRow {
    /// The p-value used to judge significance, corrected if available
    pub fn significance_pvalue(&self) -> Option<f64> {
        self.p_adjust.or(self.pvalue)
    }
}

/// Reads optional p-values such as `0.01`, `1e-5` or `< 1e-30`
fn lenient_pvalue<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_pvalue))
}

/// Parses a p-value, accepting a leading `<`
///
/// Returns `None` for everything that is not a number.
///
/// # Examples
///
/// ```
/// use goenrich::normalize::parse_pvalue;
///
/// assert_eq!(parse_pvalue("0.05"), Some(0.05));
/// assert_eq!(parse_pvalue("< 1e-30"), Some(1e-30));
/// assert_eq!(parse_pvalue("NA"), None);
/// ```
pub fn parse_pvalue(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_prefix('<').unwrap_or(value).trim();
    value.parse::<f64>().ok().filter(|p| !p.is_nan())
}

/// Joins list values with [`LIST_DELIMITER`]
///
/// ```
/// use goenrich::normalize::flatten;
///
/// assert_eq!(flatten(&["A", "B", "C"]), "A;B;C");
/// assert_eq!(flatten::<&str>(&[]), "");
/// ```
pub fn flatten<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(LIST_DELIMITER)
}

/// The complete, flat result of an enrichment run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentResultTable {
    rows: Vec<EnrichmentResultRow>,
}

impl EnrichmentResultTable {
    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns all rows
    pub fn rows(&self) -> &[EnrichmentResultRow] {
        &self.rows
    }

    /// Returns an Iterator of the rows
    pub fn iter(&self) -> std::slice::Iter<'_, EnrichmentResultRow> {
        self.rows.iter()
    }

    /// Returns the first `n` rows, or all if the table is shorter
    ///
    /// The table itself is not modified.
    pub fn preview(&self, n: usize) -> &[EnrichmentResultRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

impl From<Vec<EnrichmentResultRow>> for EnrichmentResultTable {
    fn from(rows: Vec<EnrichmentResultRow>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a EnrichmentResultTable {
    type Item = &'a EnrichmentResultRow;
    type IntoIter = std::slice::Iter<'a, EnrichmentResultRow>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Converts any engine result into the flat table
///
/// The order of the engine is kept. If a term occurs more than once,
/// only its first row is kept.
pub fn normalize(raw: RawResult) -> EnrichmentResultTable {
    let rows: Vec<EnrichmentResultRow> = match raw {
        RawResult::Classic(records) => records.into_iter().map(classic_row).collect(),
        RawResult::Hypergeometric(records) => {
            records.into_iter().map(hypergeometric_row).collect()
        }
        RawResult::GProfiler(records) => records.into_iter().map(gost_row).collect(),
    };

    let mut seen = HashSet::with_capacity(rows.len());
    let rows = rows
        .into_iter()
        .filter(|row| seen.insert(row.term_id.clone()))
        .collect();
    EnrichmentResultTable { rows }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

#[allow(clippy::cast_precision_loss)]
fn expected(term_size: u64, query_size: u64, universe_size: u64) -> Option<f64> {
    ratio((term_size * query_size) as f64, universe_size as f64)
}

fn classic_row(record: ClassicRecord) -> EnrichmentResultRow {
    #[allow(clippy::cast_precision_loss)]
    let fold_enrichment = ratio(record.significant as f64, record.expected);
    EnrichmentResultRow {
        term_id: record.go_id.to_string(),
        term_name: record.term,
        aspect: record.aspect.map(|a| a.to_string()).unwrap_or_default(),
        pvalue: Some(record.fisher),
        p_adjust: record.adjusted,
        term_size: Some(record.annotated),
        query_size: Some(record.query_size),
        intersection_size: Some(record.significant),
        expected: Some(record.expected),
        fold_enrichment,
        precision: None,
        recall: None,
        intersection: flatten(&record.genes),
        parents: String::new(),
    }
}

fn hypergeometric_row(record: HypergeometricRecord) -> EnrichmentResultRow {
    let (count, query_size) = record.gene_ratio;
    let (term_size, universe_size) = record.bg_ratio;
    EnrichmentResultRow {
        term_id: record.id.to_string(),
        term_name: record.description,
        aspect: record.aspect.map(|a| a.to_string()).unwrap_or_default(),
        pvalue: Some(record.pvalue),
        p_adjust: Some(record.p_adjust),
        term_size: Some(term_size),
        query_size: Some(query_size),
        intersection_size: Some(count),
        expected: expected(term_size, query_size, universe_size),
        fold_enrichment: Some(record.fold_enrichment),
        precision: None,
        recall: None,
        intersection: flatten(&record.gene_ids),
        parents: String::new(),
    }
}

fn gost_row(record: GostRecord) -> EnrichmentResultRow {
    let expected = expected(
        record.term_size,
        record.query_size,
        record.effective_domain_size,
    );
    #[allow(clippy::cast_precision_loss)]
    let fold_enrichment = expected.and_then(|e| ratio(record.intersection_size as f64, e));
    let aspect = record
        .source
        .strip_prefix("GO:")
        .unwrap_or(&record.source)
        .to_string();
    EnrichmentResultRow {
        term_id: record.native,
        term_name: record.name,
        aspect,
        pvalue: None,
        p_adjust: Some(record.p_value),
        term_size: Some(record.term_size),
        query_size: Some(record.query_size),
        intersection_size: Some(record.intersection_size),
        expected,
        fold_enrichment,
        precision: Some(record.precision),
        recall: Some(record.recall),
        intersection: flatten(&record.intersections),
        parents: flatten(&record.parents),
    }
}
