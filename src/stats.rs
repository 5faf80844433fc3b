//! Statistical analyses of GO term annotations
//!
//! This module contains the over-representation test of GO terms within a
//! set of genes, compared to a background universe, and the multiple testing
//! corrections that are applied to the resulting p-values.
//!
//! The enrichment uses the survival function of the hypergeometric
//! distribution, which equals the one-sided Fisher's exact test.

use crate::GoTermId;

pub mod correction;
pub mod hypergeom;

pub use correction::adjust;

/// The enrichment of a single GO term within the query genes
///
/// [`Enrichment`] is returned from [`hypergeom::term_enrichment`]
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    term: GoTermId,
    pvalue: f64,
    count: u64,
    term_size: u64,
    query_size: u64,
    universe_size: u64,
    genes: Vec<u32>,
}

impl Enrichment {
    /// Constructs an `Enrichment` for a GO term
    pub fn new(
        term: GoTermId,
        pvalue: f64,
        count: u64,
        term_size: u64,
        query_size: u64,
        universe_size: u64,
    ) -> Self {
        Self {
            term,
            pvalue,
            count,
            term_size,
            query_size,
            universe_size,
            genes: Vec::new(),
        }
    }

    /// Attaches the IDs of the query genes that are annotated to the term
    #[must_use]
    pub fn with_genes(mut self, mut genes: Vec<u32>) -> Self {
        genes.sort_unstable();
        self.genes = genes;
        self
    }

    /// Returns the ID of the GO term
    pub fn id(&self) -> &GoTermId {
        &self.term
    }

    /// Returns the p-value of the enrichment
    ///
    /// The p-value indicates the probability that the enrichment
    /// occured by chance
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// Returns the number of query genes annotated to the term
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the number of universe genes annotated to the term
    pub fn term_size(&self) -> u64 {
        self.term_size
    }

    /// Returns the number of query genes within the universe
    pub fn query_size(&self) -> u64 {
        self.query_size
    }

    /// Returns the number of genes of the universe
    pub fn universe_size(&self) -> u64 {
        self.universe_size
    }

    /// Returns the sorted IDs of the query genes annotated to the term
    pub fn genes(&self) -> &[u32] {
        &self.genes
    }

    /// Returns the number of annotated query genes expected by chance
    pub fn expected(&self) -> f64 {
        if self.universe_size == 0 {
            return 0.0;
        }
        f64_from_u64(self.term_size) * f64_from_u64(self.query_size)
            / f64_from_u64(self.universe_size)
    }

    /// Returns the fold enrichment over the background universe
    pub fn enrichment(&self) -> f64 {
        let expected = self.expected();
        if expected == 0.0 {
            return 0.0;
        }
        f64_from_u64(self.count) / expected
    }
}

/// Counts are at most the number of genes of an organism, far below 2^52
#[allow(clippy::cast_precision_loss)]
pub(crate) fn f64_from_u64(n: u64) -> f64 {
    n as f64
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn f64_from_usize(n: usize) -> f64 {
    n as f64
}
