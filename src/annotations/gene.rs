use core::fmt::Debug;
use std::collections::HashSet;
use std::fmt::Display;

use crate::term::{GoGroup, GoTermId};
use crate::GoError;

/// A set of genes
///
/// The set does not contain [`Gene`]s itself, but only their [`GeneId`]s.
pub type Genes = HashSet<GeneId>;

/// A unique identifier for a [`Gene`]
///
/// It represents the NCBI (Entrez) Gene ID, e.g. `7157` for `TP53`
#[derive(Clone, Copy, Default, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct GeneId {
    inner: u32,
}

impl GeneId {
    /// Returns the integer representation of the gene ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for GeneId {
    type Error = GoError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(GeneId {
            inner: value.trim().parse::<u32>()?,
        })
    }
}

impl From<u32> for GeneId {
    fn from(inner: u32) -> Self {
        GeneId { inner }
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// A single gene
///
/// A gene has a unique [`GeneId`] and is directly
/// annotated to a set of GO terms
#[derive(Default, Debug, Clone)]
pub struct Gene {
    id: GeneId,
    terms: GoGroup,
}

impl Gene {
    /// Initializes a new Gene
    ///
    /// The preferred way to create new genes is through [`Ontology::add_gene`](crate::Ontology::add_gene)
    /// to ensure that each gene exists only once.
    pub fn new(id: GeneId) -> Gene {
        Gene {
            id,
            terms: GoGroup::default(),
        }
    }

    /// The unique [`GeneId`] of the gene
    pub fn id(&self) -> &GeneId {
        &self.id
    }

    /// The GO terms the gene is directly annotated to
    pub fn go_terms(&self) -> &GoGroup {
        &self.terms
    }

    /// Connect another GO term to the gene
    ///
    /// # Note
    ///
    /// This method does **not** add the [`Gene`] to the GO term.
    /// Use [`Ontology::link_gene_term`](crate::Ontology::link_gene_term) for that.
    pub fn add_term<I: Into<GoTermId>>(&mut self, term_id: I) -> bool {
        self.terms.insert(term_id)
    }
}

impl PartialEq for Gene {
    fn eq(&self, other: &Gene) -> bool {
        self.id == other.id
    }
}

impl Eq for Gene {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_gene_id() {
        assert_eq!(GeneId::try_from("7157").unwrap(), GeneId::from(7157u32));
        assert_eq!(GeneId::try_from(" 42 ").unwrap().as_u32(), 42);
        assert!(GeneId::try_from("ENSG00000141510").is_err());
    }

    #[test]
    fn add_terms() {
        let mut gene = Gene::new(GeneId::from(7157u32));
        assert!(gene.add_term(6915u32));
        assert!(!gene.add_term(6915u32));
        assert_eq!(gene.go_terms().len(), 1);
    }
}
