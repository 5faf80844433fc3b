//! Comparison of the results of all three engines
//!
//! Combines the result files of the three engines into one table with one
//! row per GO term, showing which engines tested the term and which of them
//! found it significantly enriched.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::normalize::{EnrichmentResultRow, EnrichmentResultTable};
use crate::pipeline::result_file_name;
use crate::writer::{read_table, write_rows, WriteReport};
use crate::{GoError, GoResult};

/// File name of the comparison table
pub const COMPARISON_FILENAME: &str = "enrichment_methods_comparison_table.csv";

/// Default significance level of the comparison
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

const COLUMNS: [&str; 23] = [
    "term_id",
    "term_name",
    "methods_significant",
    "methods_total",
    "clusterprofiler_pvalue",
    "clusterprofiler_p_adjust",
    "clusterprofiler_fold_enrichment",
    "clusterprofiler_gene_count",
    "clusterprofiler_gene_ratio",
    "clusterprofiler_significant",
    "gprofiler2_pvalue",
    "gprofiler2_significant",
    "gprofiler2_term_size",
    "gprofiler2_intersection_size",
    "gprofiler2_precision",
    "gprofiler2_recall",
    "topgo_pvalue",
    "topgo_pvalue_raw",
    "topgo_significant_flag",
    "topgo_annotated",
    "topgo_significant",
    "topgo_expected",
    "clusterprofiler_gene_ids",
];

/// The engines that take part in the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Hypergeometric engine
    ClusterProfiler,
    /// g:Profiler engine
    GProfiler,
    /// Classic Fisher engine
    TopGo,
}

impl Method {
    /// All methods, in the order used to pick term names
    pub const ALL: [Method; 3] = [Method::ClusterProfiler, Method::GProfiler, Method::TopGo];

    /// Name of the engine, as used in the result file names
    pub fn engine_name(self) -> &'static str {
        match self {
            Method::ClusterProfiler => "clusterProfiler",
            Method::GProfiler => "gprofiler2",
            Method::TopGo => "topGO",
        }
    }
}

/// Paths of the three result files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonInputs {
    /// Result of the hypergeometric engine
    pub cluster_profiler: PathBuf,
    /// Result of the g:Profiler engine
    pub gprofiler: PathBuf,
    /// Result of the classic Fisher engine
    pub topgo: PathBuf,
}

impl ComparisonInputs {
    /// The default result files within `results_dir`
    pub fn from_results_dir<P: AsRef<Path>>(results_dir: P) -> Self {
        let dir = results_dir.as_ref();
        let path = |method: Method| dir.join(result_file_name(method.engine_name()));
        Self {
            cluster_profiler: path(Method::ClusterProfiler),
            gprofiler: path(Method::GProfiler),
            topgo: path(Method::TopGo),
        }
    }

    fn path(&self, method: Method) -> &Path {
        match method {
            Method::ClusterProfiler => &self.cluster_profiler,
            Method::GProfiler => &self.gprofiler,
            Method::TopGo => &self.topgo,
        }
    }
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// GO term ID
    pub term_id: String,
    /// First known name of the term
    pub term_name: String,
    /// Number of engines that found the term significantly enriched
    pub methods_significant: u8,
    /// Number of engines that tested the term
    pub methods_total: u8,
    /// Raw p-value of the hypergeometric engine
    pub clusterprofiler_pvalue: Option<f64>,
    /// Corrected p-value of the hypergeometric engine
    pub clusterprofiler_p_adjust: Option<f64>,
    /// Fold enrichment of the hypergeometric engine
    pub clusterprofiler_fold_enrichment: Option<f64>,
    /// Number of query genes of the term in the hypergeometric engine
    pub clusterprofiler_gene_count: Option<u64>,
    /// Query genes of the term over tested query genes, e.g. `3/12`
    pub clusterprofiler_gene_ratio: String,
    /// Significance call of the hypergeometric engine
    pub clusterprofiler_significant: Option<bool>,
    /// p-value of the g:Profiler engine (already corrected)
    pub gprofiler2_pvalue: Option<f64>,
    /// Significance call of the g:Profiler engine
    pub gprofiler2_significant: Option<bool>,
    /// Term size of the g:Profiler engine
    pub gprofiler2_term_size: Option<u64>,
    /// Intersection size of the g:Profiler engine
    pub gprofiler2_intersection_size: Option<u64>,
    /// Precision reported by g:Profiler
    pub gprofiler2_precision: Option<f64>,
    /// Recall reported by g:Profiler
    pub gprofiler2_recall: Option<f64>,
    /// p-value of the classic Fisher engine, corrected if a correction was applied
    pub topgo_pvalue: Option<f64>,
    /// Uncorrected Fisher p-value of the classic engine
    pub topgo_pvalue_raw: Option<f64>,
    /// Significance call of the classic Fisher engine
    pub topgo_significant_flag: Option<bool>,
    /// Annotated genes in the classic Fisher engine
    pub topgo_annotated: Option<u64>,
    /// Annotated query genes in the classic Fisher engine
    pub topgo_significant: Option<u64>,
    /// Expected query genes in the classic Fisher engine
    pub topgo_expected: Option<f64>,
    /// Query genes of the term in the hypergeometric engine
    pub clusterprofiler_gene_ids: String,
}

impl ComparisonRow {
    /// Returns the significance call of `method`, if it tested the term
    pub fn significant_in(&self, method: Method) -> Option<bool> {
        match method {
            Method::ClusterProfiler => self.clusterprofiler_significant,
            Method::GProfiler => self.gprofiler2_significant,
            Method::TopGo => self.topgo_significant_flag,
        }
    }

    /// Returns the p-value that `method` reported
    pub fn pvalue_of(&self, method: Method) -> Option<f64> {
        match method {
            Method::ClusterProfiler => self.clusterprofiler_pvalue,
            Method::GProfiler => self.gprofiler2_pvalue,
            Method::TopGo => self.topgo_pvalue,
        }
    }

    fn min_pvalue(&self) -> Option<f64> {
        Method::ALL
            .iter()
            .filter_map(|method| self.pvalue_of(*method))
            .min_by(f64::total_cmp)
    }
}

/// The combined table of all engines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

/// Counts of the comparison table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    /// `found_by[i]`: terms tested by `i` engines
    pub found_by: [usize; 4],
    /// `significant_in[i]`: terms significant in `i` engines
    pub significant_in: [usize; 4],
}

impl ComparisonTable {
    /// Returns all rows, sorted by consensus
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Returns the number of terms
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no term was tested by any engine
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Counts terms by the number of engines that tested them or found them significant
    pub fn summary(&self) -> ComparisonSummary {
        let mut summary = ComparisonSummary::default();
        for row in &self.rows {
            summary.found_by[usize::from(row.methods_total)] += 1;
            summary.significant_in[usize::from(row.methods_significant)] += 1;
        }
        summary
    }

    /// The first `n` terms that are significant in at least two engines
    pub fn consensus(&self, n: usize) -> Vec<&ComparisonRow> {
        self.rows
            .iter()
            .filter(|row| row.methods_significant >= 2)
            .take(n)
            .collect()
    }

    /// The first `n` terms that are significant only in `method`
    pub fn specific_to(&self, method: Method, n: usize) -> Vec<&ComparisonRow> {
        self.rows
            .iter()
            .filter(|row| row.methods_significant == 1 && row.significant_in(method) == Some(true))
            .take(n)
            .collect()
    }

    /// Writes the table to `dir`
    ///
    /// # Errors
    ///
    /// [`GoError::Write`] if the file cannot be written
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> GoResult<WriteReport> {
        write_rows(&self.rows, &COLUMNS, dir.as_ref(), COMPARISON_FILENAME)
    }
}

/// Loads the three result files and combines them
///
/// Rows of the g:Profiler result are restricted to Biological Process
/// terms. A term is significant in an engine if its corrected p-value (or
/// the raw p-value, if no correction was applied) is below `significance`.
///
/// # Errors
///
/// - [`GoError::FileNotFound`]: one of the three result files is missing
/// - [`GoError::InvalidInput`]: one of the files is not a result table
pub fn compare_results(inputs: &ComparisonInputs, significance: f64) -> GoResult<ComparisonTable> {
    for method in Method::ALL {
        let path = inputs.path(method);
        if !path.is_file() {
            return Err(GoError::FileNotFound(path.display().to_string()));
        }
    }
    let cluster_profiler = read_table(&inputs.cluster_profiler)?;
    let gprofiler = read_table(&inputs.gprofiler)?;
    let topgo = read_table(&inputs.topgo)?;
    info!(
        "Loaded {} clusterProfiler, {} gprofiler2 and {} topGO results",
        cluster_profiler.len(),
        gprofiler.len(),
        topgo.len()
    );
    Ok(combine(&cluster_profiler, &gprofiler, &topgo, significance))
}

fn index(table: &EnrichmentResultTable) -> HashMap<&str, &EnrichmentResultRow> {
    let mut map = HashMap::with_capacity(table.len());
    for row in table {
        map.entry(row.term_id.as_str()).or_insert(row);
    }
    map
}

/// `intersection_size/query_size`, empty if either is missing
fn gene_ratio(row: &EnrichmentResultRow) -> String {
    match (row.intersection_size, row.query_size) {
        (Some(count), Some(query)) => format!("{count}/{query}"),
        _ => String::new(),
    }
}

/// Combines three result tables into the comparison table
pub fn combine(
    cluster_profiler: &EnrichmentResultTable,
    gprofiler: &EnrichmentResultTable,
    topgo: &EnrichmentResultTable,
    significance: f64,
) -> ComparisonTable {
    let cp = index(cluster_profiler);
    let mut gp = index(gprofiler);
    gp.retain(|_, row| row.aspect == "BP");
    let tg = index(topgo);

    let terms: BTreeSet<&str> = cp
        .keys()
        .chain(gp.keys())
        .chain(tg.keys())
        .copied()
        .filter(|term| !term.is_empty())
        .collect();
    info!("Found {} unique terms across all methods", terms.len());

    let is_significant = |result: Option<&EnrichmentResultRow>| {
        result.map(|row| {
            row.significance_pvalue()
                .is_some_and(|pvalue| pvalue < significance)
        })
    };

    let mut rows: Vec<ComparisonRow> = terms
        .into_iter()
        .map(|term| {
            let cp_row = cp.get(term).copied();
            let gp_row = gp.get(term).copied();
            let tg_row = tg.get(term).copied();
            let calls = [
                is_significant(cp_row),
                is_significant(gp_row),
                is_significant(tg_row),
            ];
            let term_name = [cp_row, gp_row, tg_row]
                .into_iter()
                .flatten()
                .map(|row| row.term_name.as_str())
                .find(|name| !name.is_empty())
                .unwrap_or("Unknown")
                .to_string();

            ComparisonRow {
                term_id: term.to_string(),
                term_name,
                methods_significant: calls.iter().filter(|call| **call == Some(true)).count()
                    as u8,
                methods_total: calls.iter().filter(|call| call.is_some()).count() as u8,
                clusterprofiler_pvalue: cp_row.and_then(|r| r.pvalue),
                clusterprofiler_p_adjust: cp_row.and_then(|r| r.p_adjust),
                clusterprofiler_fold_enrichment: cp_row.and_then(|r| r.fold_enrichment),
                clusterprofiler_gene_count: cp_row.and_then(|r| r.intersection_size),
                clusterprofiler_gene_ratio: cp_row.map(gene_ratio).unwrap_or_default(),
                clusterprofiler_significant: calls[0],
                gprofiler2_pvalue: gp_row.and_then(EnrichmentResultRow::significance_pvalue),
                gprofiler2_significant: calls[1],
                gprofiler2_term_size: gp_row.and_then(|r| r.term_size),
                gprofiler2_intersection_size: gp_row.and_then(|r| r.intersection_size),
                gprofiler2_precision: gp_row.and_then(|r| r.precision),
                gprofiler2_recall: gp_row.and_then(|r| r.recall),
                topgo_pvalue: tg_row.and_then(EnrichmentResultRow::significance_pvalue),
                topgo_pvalue_raw: tg_row.and_then(|r| r.pvalue),
                topgo_significant_flag: calls[2],
                topgo_annotated: tg_row.and_then(|r| r.term_size),
                topgo_significant: tg_row.and_then(|r| r.intersection_size),
                topgo_expected: tg_row.and_then(|r| r.expected),
                clusterprofiler_gene_ids: cp_row
                    .map(|r| r.intersection.clone())
                    .unwrap_or_default(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.methods_significant
            .cmp(&a.methods_significant)
            .then(b.methods_total.cmp(&a.methods_total))
            .then_with(|| match (a.min_pvalue(), b.min_pvalue()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
    ComparisonTable { rows }
}
