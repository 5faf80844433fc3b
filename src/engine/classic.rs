use tracing::info;

use crate::config::{Correction, EnrichmentConfiguration, TestKind};
use crate::engine::{
    by_pvalue, check_config, parse_gene_ids, resolve_universe, ClassicRecord, EnrichmentEngine,
    RawResult,
};
use crate::mapping::IdNamespace;
use crate::stats::{adjust, hypergeom};
use crate::{GoResult, Ontology};

/// Classic one-sided Fisher's exact test of every GO term
///
/// Each term of the selected aspect with at least `node_size` annotated
/// universe genes is tested on its own, without decorrelating the graph
/// structure. Terms without any query gene are reported as well.
#[derive(Debug, Clone, Copy)]
pub struct ClassicFisherEngine<'a> {
    ontology: &'a Ontology,
}

impl<'a> ClassicFisherEngine<'a> {
    /// Creates a new engine that uses the annotations of `ontology`
    pub fn new(ontology: &'a Ontology) -> Self {
        Self { ontology }
    }
}

impl EnrichmentEngine for ClassicFisherEngine<'_> {
    fn name(&self) -> &'static str {
        "topGO"
    }

    fn namespace(&self) -> IdNamespace {
        IdNamespace::Entrez
    }

    fn run_enrichment(
        &self,
        identifiers: &[String],
        config: &EnrichmentConfiguration,
    ) -> GoResult<RawResult> {
        check_config(config, TestKind::ClassicFisher)?;
        let universe = resolve_universe(self.ontology, config)?;
        let query = parse_gene_ids(identifiers);

        let enrichments: Vec<_> =
            hypergeom::term_enrichment(self.ontology.terms_in(config.scope), &query, &universe)
                .into_iter()
                .filter(|enrichment| enrichment.term_size() >= config.node_size as u64)
                .collect();

        let pvalues: Vec<f64> = enrichments.iter().map(|e| e.pvalue()).collect();
        let adjusted = match config.correction {
            Correction::None => None,
            method => Some(adjust(&pvalues, method)?),
        };

        let mut records = Vec::with_capacity(enrichments.len());
        for (idx, enrichment) in enrichments.into_iter().enumerate() {
            let adjusted = adjusted.as_ref().map(|values| values[idx]);
            if adjusted.unwrap_or(enrichment.pvalue()) > config.threshold {
                continue;
            }
            let term = self.ontology.get_unchecked(*enrichment.id());
            records.push(ClassicRecord {
                go_id: *enrichment.id(),
                term: term.name().to_string(),
                aspect: term.aspect(),
                annotated: enrichment.term_size(),
                significant: enrichment.count(),
                expected: enrichment.expected(),
                fisher: enrichment.pvalue(),
                adjusted,
                query_size: enrichment.query_size(),
                genes: enrichment.genes().iter().map(u32::to_string).collect(),
            });
        }
        records.sort_by(|a, b| by_pvalue((a.fisher, a.go_id), (b.fisher, b.go_id)));
        info!("{} tested {} GO terms", self.name(), records.len());
        Ok(RawResult::Classic(records))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::test_ontology;
    use crate::term::{Aspect, AspectScope};
    use crate::GoTermId;

    fn ids(values: &[u32]) -> Vec<String> {
        values.iter().map(u32::to_string).collect()
    }

    #[test]
    fn tests_all_terms_of_aspect() {
        let ont = test_ontology::ontology();
        let engine = ClassicFisherEngine::new(&ont);
        let config = EnrichmentConfiguration::classic();

        let RawResult::Classic(records) = engine
            .run_enrichment(&ids(&[1, 2, 3, 4, 11]), &config)
            .unwrap()
        else {
            panic!("wrong result type");
        };
        assert_eq!(records.len(), 4);
        let best = &records[0];
        assert_eq!(best.go_id, GoTermId::from(4u32));
        assert_eq!(best.annotated, 4);
        assert_eq!(best.significant, 4);
        assert_eq!(best.query_size, 5);
        assert_eq!(best.genes, ["1", "2", "3", "4"]);
        assert!((best.expected - 1.0).abs() < 1e-12);
        assert!(best.adjusted.is_none());

        let root = records
            .iter()
            .find(|r| r.go_id == GoTermId::from(1u32))
            .unwrap();
        assert!((root.fisher - 1.0).abs() < 1e-12);
        assert!(records.windows(2).all(|w| w[0].fisher <= w[1].fisher));
    }

    #[test]
    fn node_size_and_correction() {
        let ont = test_ontology::ontology();
        let engine = ClassicFisherEngine::new(&ont);
        let mut config = EnrichmentConfiguration::classic();
        config.node_size = 5;
        config.correction = Correction::Bonferroni;

        let RawResult::Classic(records) = engine.run_enrichment(&ids(&[1, 2]), &config).unwrap()
        else {
            panic!("wrong result type");
        };
        assert_eq!(records.len(), 3);
        for record in &records {
            let adjusted = record.adjusted.unwrap();
            assert!((adjusted - (record.fisher * 3.0).min(1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn other_aspect() {
        let ont = test_ontology::ontology();
        let engine = ClassicFisherEngine::new(&ont);
        let mut config = EnrichmentConfiguration::classic();
        config.scope = AspectScope::Single(Aspect::MolecularFunction);
        let result = engine.run_enrichment(&ids(&[21, 22]), &config).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn empty_universe() {
        let ont = test_ontology::ontology();
        let engine = ClassicFisherEngine::new(&ont);
        let mut config = EnrichmentConfiguration::classic();
        config.scope = AspectScope::Single(Aspect::CellularComponent);
        assert!(matches!(
            engine.run_enrichment(&ids(&[1]), &config),
            Err(crate::GoError::EmptyUniverse(_))
        ));
    }
}
