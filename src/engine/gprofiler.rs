use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Correction, EnrichmentConfiguration, TestKind, Universe};
use crate::engine::{check_config, EnrichmentEngine, GostRecord, RawResult};
use crate::gprofiler::GProfilerClient;
use crate::mapping::IdNamespace;
use crate::{GoError, GoResult};

const GOST_PATH: &str = "api/gost/profile/";

#[derive(Serialize)]
struct GostRequest<'a> {
    organism: &'a str,
    query: &'a [String],
    sources: Vec<&'static str>,
    user_threshold: f64,
    all_results: bool,
    ordered: bool,
    no_evidences: bool,
    no_iea: bool,
    measure_underrepresentation: bool,
    significance_threshold_method: &'static str,
    numeric_ns: &'static str,
    domain_scope: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct GostResponse {
    result: Vec<GostEntry>,
    #[serde(default)]
    meta: GostMeta,
}

#[derive(Deserialize)]
struct GostEntry {
    native: String,
    name: String,
    source: String,
    p_value: f64,
    significant: bool,
    term_size: u64,
    query_size: u64,
    intersection_size: u64,
    effective_domain_size: u64,
    precision: f64,
    recall: f64,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    intersections: Vec<Vec<String>>,
}

#[derive(Deserialize, Default)]
struct GostMeta {
    #[serde(default)]
    genes_metadata: GenesMetadata,
}

#[derive(Deserialize, Default)]
struct GenesMetadata {
    #[serde(default)]
    query: HashMap<String, QueryMetadata>,
}

#[derive(Deserialize, Default)]
struct QueryMetadata {
    #[serde(default)]
    ensgs: Vec<String>,
    #[serde(default)]
    mapping: HashMap<String, Vec<String>>,
}

/// Over-representation analysis with the g:GOSt web service of g:Profiler
///
/// The service applies the multiple testing correction itself; the
/// reported p-values are already adjusted.
#[derive(Debug, Clone)]
pub struct GProfilerEngine {
    client: GProfilerClient,
}

impl GProfilerEngine {
    /// Creates a new engine that connects to `base_url`
    ///
    /// # Errors
    ///
    /// [`GoError::Config`] if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> GoResult<Self> {
        Ok(Self {
            client: GProfilerClient::new(base_url, timeout)?,
        })
    }
}

impl EnrichmentEngine for GProfilerEngine {
    fn name(&self) -> &'static str {
        "gprofiler2"
    }

    fn namespace(&self) -> IdNamespace {
        IdNamespace::Entrez
    }

    fn run_enrichment(
        &self,
        identifiers: &[String],
        config: &EnrichmentConfiguration,
    ) -> GoResult<RawResult> {
        check_config(config, TestKind::GProfiler)?;
        let request = build_request(identifiers, config)?;
        let response: GostResponse = self
            .client
            .post_json(GOST_PATH, &request)
            .map_err(|failure| failure.into_error(GoError::Engine))?;
        let records = records_from_response(response);
        info!("{} reports {} terms", self.name(), records.len());
        Ok(RawResult::GProfiler(records))
    }
}

fn build_request<'a>(
    identifiers: &'a [String],
    config: &'a EnrichmentConfiguration,
) -> GoResult<GostRequest<'a>> {
    let significance_threshold_method = match config.correction {
        Correction::GScs => "g_SCS",
        Correction::Bonferroni => "bonferroni",
        Correction::BenjaminiHochberg => "fdr",
        other => {
            return Err(GoError::Engine(format!(
                "g:Profiler does not support the {other} correction"
            )))
        }
    };
    let (domain_scope, background) = match &config.universe {
        Universe::Annotated => ("annotated", None),
        Universe::Custom(genes) if genes.is_empty() => {
            return Err(GoError::EmptyUniverse(
                "the custom background is empty".to_string(),
            ))
        }
        Universe::Custom(genes) => ("custom", Some(genes.as_slice())),
    };
    Ok(GostRequest {
        organism: &config.organism.code,
        query: identifiers,
        sources: config
            .scope
            .aspects()
            .into_iter()
            .map(|aspect| aspect.gprofiler_source())
            .collect(),
        user_threshold: config.threshold,
        all_results: true,
        ordered: false,
        no_evidences: false,
        no_iea: false,
        measure_underrepresentation: false,
        significance_threshold_method,
        numeric_ns: "ENTREZGENE_ACC",
        domain_scope,
        background,
    })
}

/// Converts the response and resolves the intersecting genes
///
/// `intersections` holds one evidence list per gene of the query metadata
/// (`ensgs`); a non-empty list marks a gene that is annotated to the term.
/// The genes are reported with the identifier of the input.
fn records_from_response(response: GostResponse) -> Vec<GostRecord> {
    let query = response
        .meta
        .genes_metadata
        .query
        .into_values()
        .next()
        .unwrap_or_default();
    let mut input_of: HashMap<&str, &str> = HashMap::new();
    for (input, ensgs) in &query.mapping {
        for ensg in ensgs {
            input_of.entry(ensg.as_str()).or_insert(input.as_str());
        }
    }

    let mut records: Vec<GostRecord> = response
        .result
        .into_iter()
        .map(|entry| {
            let intersections = entry
                .intersections
                .iter()
                .zip(&query.ensgs)
                .filter(|(evidence, _)| !evidence.is_empty())
                .map(|(_, ensg)| {
                    input_of
                        .get(ensg.as_str())
                        .map_or_else(|| ensg.clone(), |input| (*input).to_string())
                })
                .collect();
            GostRecord {
                native: entry.native,
                name: entry.name,
                source: entry.source,
                p_value: entry.p_value,
                significant: entry.significant,
                term_size: entry.term_size,
                query_size: entry.query_size,
                intersection_size: entry.intersection_size,
                effective_domain_size: entry.effective_domain_size,
                precision: entry.precision,
                recall: entry.recall,
                parents: entry.parents,
                intersections,
            }
        })
        .collect();
    records.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
    records
}
