//! Enrichment engines
//!
//! Every engine tests the GO terms for over-representation within a list of
//! gene identifiers and returns its own, engine specific [`RawResult`].
//! [`normalize`](crate::normalize::normalize) turns the raw result into the
//! common flat table.
//!
//! | Engine | Test | Default correction | Output name |
//! | --- | --- | --- | --- |
//! | [`ClassicFisherEngine`] | one-sided Fisher's exact test | none | `topGO` |
//! | [`HypergeometricEngine`] | hypergeometric test, 10 to 500 genes | Benjamini-Hochberg | `clusterProfiler` |
//! | [`GProfilerEngine`] | g:GOSt web service | g:SCS | `gprofiler2` |

use tracing::{debug, warn};

use crate::annotations::{GeneId, Genes};
use crate::config::{EnrichmentConfiguration, TestKind, Universe};
use crate::mapping::IdNamespace;
use crate::term::Aspect;
use crate::{GoError, GoResult, GoTermId, Ontology};

mod classic;
mod gprofiler;
mod hypergeometric;

pub use classic::ClassicFisherEngine;
pub use gprofiler::GProfilerEngine;
pub use hypergeometric::HypergeometricEngine;

/// An enrichment backend
///
/// The three implementations are interchangeable for the pipeline.
pub trait EnrichmentEngine {
    /// The name of the engine, used for the output file name
    fn name(&self) -> &'static str;

    /// The identifier namespace the engine expects
    fn namespace(&self) -> IdNamespace;

    /// Tests all GO terms for enrichment within `identifiers`
    ///
    /// # Errors
    ///
    /// - [`GoError::Engine`]: the configuration is rejected or the backend
    ///   returned an invalid response
    /// - [`GoError::EmptyUniverse`]: no gene of the universe is annotated
    /// - [`GoError::ServiceUnavailable`]: a remote backend cannot be reached
    fn run_enrichment(
        &self,
        identifiers: &[String],
        config: &EnrichmentConfiguration,
    ) -> GoResult<RawResult>;
}

/// One row of the classic Fisher engine, in the shape of `topGO::GenTable`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicRecord {
    /// `GO.ID`
    pub go_id: GoTermId,
    /// `Term`
    pub term: String,
    /// Aspect of the term
    pub aspect: Option<Aspect>,
    /// `Annotated`: universe genes annotated to the term
    pub annotated: u64,
    /// `Significant`: query genes annotated to the term
    pub significant: u64,
    /// `Expected`: annotated query genes expected by chance
    pub expected: f64,
    /// `fisher`: raw p-value
    pub fisher: f64,
    /// Corrected p-value, if a correction was requested
    pub adjusted: Option<f64>,
    /// Number of query genes within the universe
    pub query_size: u64,
    /// Query genes annotated to the term
    pub genes: Vec<String>,
}

/// One row of the hypergeometric engine, in the shape of `clusterProfiler::enrichGO`
#[derive(Debug, Clone, PartialEq)]
pub struct HypergeometricRecord {
    /// `ID`
    pub id: GoTermId,
    /// `Description`
    pub description: String,
    /// `ONTOLOGY`
    pub aspect: Option<Aspect>,
    /// `GeneRatio` as `(k, n)`
    pub gene_ratio: (u64, u64),
    /// `BgRatio` as `(K, N)`
    pub bg_ratio: (u64, u64),
    /// `pvalue`
    pub pvalue: f64,
    /// `p.adjust`
    pub p_adjust: f64,
    /// `FoldEnrichment`
    pub fold_enrichment: f64,
    /// `geneID`, the query genes annotated to the term
    pub gene_ids: Vec<String>,
}

/// One row of the g:GOSt web service
#[derive(Debug, Clone, PartialEq)]
pub struct GostRecord {
    /// `native`, e.g. `GO:0006915`
    pub native: String,
    /// `name`
    pub name: String,
    /// `source`, e.g. `GO:BP`
    pub source: String,
    /// `p_value`, already corrected by the service
    pub p_value: f64,
    /// `significant`
    pub significant: bool,
    /// `term_size`
    pub term_size: u64,
    /// `query_size`
    pub query_size: u64,
    /// `intersection_size`
    pub intersection_size: u64,
    /// `effective_domain_size`
    pub effective_domain_size: u64,
    /// `precision`
    pub precision: f64,
    /// `recall`
    pub recall: f64,
    /// `parents`
    pub parents: Vec<String>,
    /// Input genes annotated to the term
    pub intersections: Vec<String>,
}

/// Engine specific enrichment result
///
/// Contains nested, list valued fields that need to be flattened
/// before the result can be written as CSV.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// Result of [`ClassicFisherEngine`]
    Classic(Vec<ClassicRecord>),
    /// Result of [`HypergeometricEngine`]
    Hypergeometric(Vec<HypergeometricRecord>),
    /// Result of [`GProfilerEngine`]
    GProfiler(Vec<GostRecord>),
}

impl RawResult {
    /// Returns the number of tested terms in the result
    pub fn len(&self) -> usize {
        match self {
            RawResult::Classic(records) => records.len(),
            RawResult::Hypergeometric(records) => records.len(),
            RawResult::GProfiler(records) => records.len(),
        }
    }

    /// Returns `true` if the result does not contain any term
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ensures that `config` is valid and meant for `test`
fn check_config(config: &EnrichmentConfiguration, test: TestKind) -> GoResult<()> {
    if config.test != test {
        return Err(GoError::Engine(format!(
            "configuration for {:?} cannot be used with a {test:?} engine",
            config.test
        )));
    }
    config.validate()
}

/// Parses Entrez gene IDs, skipping everything that is not numeric
fn parse_gene_ids(identifiers: &[String]) -> Genes {
    let mut skipped = 0usize;
    let genes: Genes = identifiers
        .iter()
        .filter_map(|id| {
            let gene = GeneId::try_from(id.as_str()).ok();
            if gene.is_none() {
                skipped += 1;
            }
            gene
        })
        .collect();
    if skipped > 0 {
        warn!("Ignoring {skipped} identifiers that are not Entrez gene IDs");
    }
    genes
}

/// Returns the background universe of a local engine
///
/// Custom universes are restricted to annotated genes.
fn resolve_universe(ontology: &Ontology, config: &EnrichmentConfiguration) -> GoResult<Genes> {
    let annotated = ontology.annotated_genes(config.scope);
    let universe = match &config.universe {
        Universe::Annotated => annotated,
        Universe::Custom(ids) => parse_gene_ids(ids)
            .intersection(&annotated)
            .copied()
            .collect(),
    };
    if universe.is_empty() {
        return Err(GoError::EmptyUniverse(format!(
            "no gene is annotated to {} terms of taxon {}",
            config.scope, config.organism.taxon
        )));
    }
    debug!("Universe contains {} genes", universe.len());
    Ok(universe)
}

/// Sorts by ascending p-value, ties by term ID
fn by_pvalue(a: (f64, GoTermId), b: (f64, GoTermId)) -> std::cmp::Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_ids() {
        let ids = ["100", "ENSG1", "300", ""].map(String::from);
        let genes = parse_gene_ids(&ids);
        assert_eq!(genes.len(), 2);
        assert!(genes.contains(&GeneId::from(300u32)));
    }

    #[test]
    fn universe() {
        let ont = test_ontology::ontology();
        let config = EnrichmentConfiguration::classic();
        assert_eq!(resolve_universe(&ont, &config).unwrap().len(), 20);

        let mut config = EnrichmentConfiguration::classic();
        config.universe = Universe::Custom(["1", "2", "25", "99"].map(String::from).to_vec());
        assert_eq!(resolve_universe(&ont, &config).unwrap().len(), 2);

        config.universe = Universe::Custom(vec!["25".to_string()]);
        assert!(matches!(
            resolve_universe(&ont, &config),
            Err(GoError::EmptyUniverse(_))
        ));
    }

    #[test]
    fn wrong_engine() {
        let config = EnrichmentConfiguration::classic();
        assert!(check_config(&config, TestKind::Hypergeometric).is_err());
        assert!(check_config(&config, TestKind::ClassicFisher).is_ok());
    }
}
