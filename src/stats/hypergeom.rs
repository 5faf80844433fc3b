//! Calculate the enrichment of GO terms within a set of genes and the
//! probability of enrichment within the hypergeometric distribution.
//!
//! # Examples
//!
//! ```no_run
//! use goenrich::{AspectScope, Aspect, Ontology};
//! use goenrich::annotations::GeneId;
//! use goenrich::stats::hypergeom::term_enrichment;
//!
//! let ontology = Ontology::from_standard("data/go-basic.obo", "data/gene2go.gz", 9606).unwrap();
//! let scope = AspectScope::Single(Aspect::BiologicalProcess);
//! let universe = ontology.annotated_genes(scope);
//! let query = [7157u32, 672, 675].into_iter().map(GeneId::from).collect();
//!
//! let mut enrichments = term_enrichment(ontology.terms_in(scope), &query, &universe);
//!
//! // the results are not sorted by default
//! enrichments.sort_by(|a, b| a.pvalue().total_cmp(&b.pvalue()));
//!
//! for term in enrichments {
//!     println!("{}\t{}\t({})", term.id(), term.pvalue(), term.enrichment());
//! }
//! ```

use statrs::distribution::{DiscreteCDF, Hypergeometric};
use tracing::trace;

use crate::annotations::Genes;
use crate::stats::Enrichment;
use crate::GoTerm;

/// Probability to draw `observed` or more successes
///
/// - `population`: number of genes in the universe (N)
/// - `successes`: number of universe genes annotated to the term (K)
/// - `draws`: number of query genes within the universe (n)
/// - `observed`: number of query genes annotated to the term (k)
///
/// Returns `None` if the parameters are inconsistent, e.g. more draws than
/// the population.
///
/// # Examples
///
/// ```
/// use goenrich::stats::hypergeom::upper_tail;
///
/// // Drawing nothing is always at least as extreme as observed
/// assert_eq!(upper_tail(100, 10, 5, 0), Some(1.0));
///
/// let p = upper_tail(100, 10, 5, 3).unwrap();
/// assert!(p < 0.01);
/// ```
pub fn upper_tail(population: u64, successes: u64, draws: u64, observed: u64) -> Option<f64> {
    let hyper = Hypergeometric::new(population, successes, draws).ok()?;
    if observed == 0 {
        return Some(1.0);
    }
    // subtracting 1, because we want to test including `observed`
    // e.g. "7 or more", but sf by default calculates "more than 7"
    Some(hyper.sf(observed - 1).clamp(0.0, 1.0))
}

/// Calculates the hypergeometric enrichment of all `terms` within the `query`
/// genes compared to the `universe`
///
/// Only genes of the universe are considered, both for the term sizes and the
/// query. Every term is returned, including the ones without any query gene.
pub fn term_enrichment<'a, I>(terms: I, query: &Genes, universe: &Genes) -> Vec<Enrichment>
where
    I: IntoIterator<Item = GoTerm<'a>>,
{
    let query: Genes = query.intersection(universe).copied().collect();
    let population = universe.len() as u64;
    let draws = query.len() as u64;

    let mut res = Vec::new();
    for term in terms {
        let successes = term
            .gene_ids()
            .iter()
            .filter(|gene| universe.contains(gene))
            .count();
        let overlap: Vec<u32> = term
            .gene_ids()
            .iter()
            .filter(|gene| query.contains(gene))
            .map(|gene| gene.as_u32())
            .collect();
        let (successes, observed) = (successes as u64, overlap.len() as u64);

        let Some(pvalue) = upper_tail(population, successes, draws, observed) else {
            continue;
        };
        trace!(
            "Term:{}\tPopulation: {}, Successes: {}, Draws: {}, Observed: {}, p: {}",
            term.id(),
            population,
            successes,
            draws,
            observed,
            pvalue
        );
        res.push(
            Enrichment::new(*term.id(), pvalue, observed, successes, draws, population)
                .with_genes(overlap),
        );
    }
    res
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::GeneId;
    use crate::Ontology;

    fn genes(ids: &[u32]) -> Genes {
        ids.iter().copied().map(GeneId::from).collect()
    }

    #[test]
    fn matches_fisher() {
        // 2x2 table: [[3, 2], [7, 88]], one-sided Fisher p = 0.0066379...
        let p = upper_tail(100, 10, 5, 3).unwrap();
        assert!((p - 0.006_637_913).abs() < 1e-8, "{p}");
    }

    #[test]
    fn certain_draw() {
        let p = upper_tail(10, 10, 5, 5).unwrap();
        assert!((p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters() {
        assert!(upper_tail(10, 11, 5, 1).is_none());
        assert!(upper_tail(10, 5, 11, 1).is_none());
    }

    #[test]
    fn enrichment_restricted_to_universe() {
        let mut ont = Ontology::default();
        ont.insert_term("root".into(), 1u32);
        ont.insert_term("leaf".into(), 2u32);
        ont.add_parent(1u32, 2u32);
        ont.create_cache();
        for gene in ["1", "2", "3", "4"] {
            let id = ont.add_gene(gene).unwrap();
            ont.link_gene_term(2u32, id).unwrap();
        }

        let universe = genes(&[1, 2, 3, 5, 6, 7, 8, 9]);
        // gene 10 is not part of the universe and is ignored
        let query = genes(&[1, 2, 10]);
        let res = term_enrichment(ont.term(2u32), &query, &universe);
        assert_eq!(res.len(), 1);
        let leaf = &res[0];
        assert_eq!(leaf.term_size(), 3);
        assert_eq!(leaf.query_size(), 2);
        assert_eq!(leaf.universe_size(), 8);
        assert_eq!(leaf.count(), 2);
        assert_eq!(leaf.genes(), [1, 2]);
        // P(X >= 2) with N=8, K=3, n=2 = 3/28
        assert!((leaf.pvalue() - 3.0 / 28.0).abs() < 1e-9);
    }
}
