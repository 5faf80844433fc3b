use tracing::{info, warn};

use crate::config::{EnrichmentConfiguration, TestKind};
use crate::engine::{
    by_pvalue, check_config, parse_gene_ids, resolve_universe, EnrichmentEngine,
    HypergeometricRecord, RawResult,
};
use crate::mapping::IdNamespace;
use crate::stats::{adjust, hypergeom};
use crate::{GoResult, Ontology};

/// Hypergeometric over-representation test with term size filters
///
/// Only terms with `min_term_size..=max_term_size` annotated universe genes
/// and at least one query gene are tested. The p-values are corrected
/// across all tested terms.
#[derive(Debug, Clone, Copy)]
pub struct HypergeometricEngine<'a> {
    ontology: &'a Ontology,
}

impl<'a> HypergeometricEngine<'a> {
    /// Creates a new engine that uses the annotations of `ontology`
    pub fn new(ontology: &'a Ontology) -> Self {
        Self { ontology }
    }
}

impl EnrichmentEngine for HypergeometricEngine<'_> {
    fn name(&self) -> &'static str {
        "clusterProfiler"
    }

    fn namespace(&self) -> IdNamespace {
        IdNamespace::Entrez
    }

    fn run_enrichment(
        &self,
        identifiers: &[String],
        config: &EnrichmentConfiguration,
    ) -> GoResult<RawResult> {
        check_config(config, TestKind::Hypergeometric)?;
        let universe = resolve_universe(self.ontology, config)?;
        let query = parse_gene_ids(identifiers);
        if query.is_disjoint(&universe) {
            warn!("None of the query genes is annotated, no term can be enriched");
            return Ok(RawResult::Hypergeometric(Vec::new()));
        }

        let size_range = config.min_term_size as u64..=config.max_term_size as u64;
        let enrichments: Vec<_> =
            hypergeom::term_enrichment(self.ontology.terms_in(config.scope), &query, &universe)
                .into_iter()
                .filter(|e| e.count() > 0 && size_range.contains(&e.term_size()))
                .collect();

        let pvalues: Vec<f64> = enrichments.iter().map(|e| e.pvalue()).collect();
        let adjusted = adjust(&pvalues, config.correction)?;

        let mut records: Vec<HypergeometricRecord> = enrichments
            .into_iter()
            .zip(adjusted)
            .filter(|(e, p_adjust)| e.pvalue() <= config.threshold && *p_adjust <= config.threshold)
            .map(|(e, p_adjust)| {
                let term = self.ontology.get_unchecked(*e.id());
                HypergeometricRecord {
                    id: *e.id(),
                    description: term.name().to_string(),
                    aspect: term.aspect(),
                    gene_ratio: (e.count(), e.query_size()),
                    bg_ratio: (e.term_size(), e.universe_size()),
                    pvalue: e.pvalue(),
                    p_adjust,
                    fold_enrichment: e.enrichment(),
                    gene_ids: e.genes().iter().map(u32::to_string).collect(),
                }
            })
            .collect();
        records.sort_by(|a, b| by_pvalue((a.pvalue, a.id), (b.pvalue, b.id)));
        info!("{} reports {} GO terms", self.name(), records.len());
        Ok(RawResult::Hypergeometric(records))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Correction;
    use crate::engine::test_ontology;
    use crate::GoTermId;

    fn ids(values: &[u32]) -> Vec<String> {
        values.iter().map(u32::to_string).collect()
    }

    fn config() -> EnrichmentConfiguration {
        let mut config = EnrichmentConfiguration::hypergeometric();
        config.min_term_size = 1;
        config.max_term_size = 15;
        config
    }

    #[test]
    fn size_filter_and_overlap() {
        let ont = test_ontology::ontology();
        let engine = HypergeometricEngine::new(&ont);

        let RawResult::Hypergeometric(records) = engine
            .run_enrichment(&ids(&[1, 2, 3, 4]), &config())
            .unwrap()
        else {
            panic!("wrong result type");
        };
        // root is too large, GO:0000003 has no query gene
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, GoTermId::from(4u32));
        assert_eq!(records[0].gene_ratio, (4, 4));
        assert_eq!(records[0].bg_ratio, (4, 20));
        assert!((records[0].fold_enrichment - 5.0).abs() < 1e-12);
        assert_eq!(records[1].id, GoTermId::from(2u32));
        assert!(records[0].p_adjust >= records[0].pvalue);
    }

    #[test]
    fn defaults_exclude_small_terms() {
        let ont = test_ontology::ontology();
        let engine = HypergeometricEngine::new(&ont);
        let result = engine
            .run_enrichment(&ids(&[1, 2, 3, 4]), &EnrichmentConfiguration::hypergeometric())
            .unwrap();
        // GO:0000004 is too small, GO:0000003 has no query gene
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn threshold() {
        let ont = test_ontology::ontology();
        let engine = HypergeometricEngine::new(&ont);
        let mut config = config();
        config.threshold = 0.01;
        config.correction = Correction::None;
        let result = engine.run_enrichment(&ids(&[1, 2, 3, 4]), &config).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn unannotated_query() {
        let ont = test_ontology::ontology();
        let engine = HypergeometricEngine::new(&ont);
        let result = engine.run_enrichment(&ids(&[25, 99]), &config()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn rejects_foreign_configuration() {
        let ont = test_ontology::ontology();
        let engine = HypergeometricEngine::new(&ont);
        assert!(matches!(
            engine.run_enrichment(&ids(&[1]), &EnrichmentConfiguration::classic()),
            Err(crate::GoError::Engine(_))
        ));
    }
}
