use core::fmt::Debug;
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::annotations::{Gene, GeneId, Genes};
use crate::parser;
use crate::term::internal::GoTermInternal;
use crate::term::{Aspect, AspectScope, GoGroup, GoTerm};
use crate::GoResult;
use crate::{GoError, GoTermId};

mod termarena;
use termarena::Arena;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Ontology` holds all GO terms and their gene annotations
///
/// It is the data source of the local enrichment engines
/// ([`ClassicFisherEngine`](crate::engine::ClassicFisherEngine) and
/// [`HypergeometricEngine`](crate::engine::HypergeometricEngine)).
///
/// # Examples
///
/// ```
/// use goenrich::Ontology;
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("biological_process".into(), 8150u32);
/// ontology.insert_term("cellular process".into(), 9987u32);
/// ontology.add_parent(8150u32, 9987u32);
/// ontology.create_cache();
///
/// let gene = ontology.add_gene("7157").unwrap();
/// ontology.link_gene_term(9987u32, gene).unwrap();
///
/// let root = ontology.term(8150u32).unwrap();
/// assert_eq!(root.name(), "biological_process");
/// // genes are propagated to all ancestors
/// assert_eq!(root.gene_ids().len(), 1);
/// ```
///
/// # Construction
///
/// Use [`Ontology::from_standard`] with
/// - `go-basic.obo` from <https://geneontology.org> (terms and relationships)
/// - `gene2go` from NCBI (gene annotations, filtered to one taxon)
///
/// When building it manually:
/// 1. construct an empty Ontology [`Ontology::default`]
/// 2. Add all terms [`Ontology::insert_term`]
/// 3. Connect terms to their parents [`Ontology::add_parent`]
/// 4. Cache all ancestor connections [`Ontology::create_cache`]
/// 5. Add genes with [`Ontology::add_gene`] and connect them using
///    [`Ontology::link_gene_term`], which propagates the annotation
///    to every ancestor of the term
///
/// # Layout
///
/// ```mermaid
/// erDiagram
///     ONTOLOGY ||--|{ GOTERM : contains
///     GOTERM ||--|{ GOTERM : is_a_or_part_of
///     GOTERM }|--o{ GENE : annotated_to
///     GOTERM {
///         str name
///         GoTermId id
///         Aspect aspect
///         GoGroup parents
///         Genes genes
///     }
///     GENE {
///         GeneId id
///         GoGroup terms
///     }
/// ```
#[derive(Default)]
pub struct Ontology {
    go_terms: Arena,
    genes: HashMap<GeneId, Gene>,
    version: String,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ontology with {} terms and {} genes",
            self.go_terms.len(),
            self.genes.len()
        )
    }
}

/// Public API of the Ontology
impl Ontology {
    /// Builds the [`Ontology`] from an OBO file and an NCBI `gene2go` table
    ///
    /// Only annotations of the NCBI taxonomy ID `taxon` (e.g. `9606` for human)
    /// are used. Both files may be gzip compressed (`.gz`).
    ///
    /// # Errors
    ///
    /// - [`GoError::CannotOpenFile`]: one of the files is missing
    /// - [`GoError::InvalidInput`]: one of the files is malformed
    pub fn from_standard<P: AsRef<Path>, Q: AsRef<Path>>(
        obo: P,
        gene2go: Q,
        taxon: u32,
    ) -> GoResult<Self> {
        let mut ont = Ontology::default();
        parser::go_obo::read_obo_file(obo, &mut ont)?;
        parser::gene2go::parse(gene2go, taxon, &mut ont)?;
        debug!("Loaded {ont:?}");
        Ok(ont)
    }

    /// Returns the number of GO terms in the Ontology
    pub fn len(&self) -> usize {
        self.go_terms.len()
    }

    /// Returns `true` if the Ontology does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `data-version` of the OBO file, e.g. `releases/2024-01-17`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the [`GoTerm`] of the provided [`GoTermId`]
    ///
    /// If no such term is present in the Ontology, `None` is returned
    pub fn term<I: Into<GoTermId>>(&self, term_id: I) -> Option<GoTerm<'_>> {
        let term = self.go_terms.get(term_id.into())?;
        Some(GoTerm::new(self, term))
    }

    /// Returns an Iterator of all [`GoTerm`]s of the Ontology
    pub fn terms(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Returns a reference to the [`Gene`] of the provided [`GeneId`]
    pub fn gene(&self, gene_id: &GeneId) -> Option<&Gene> {
        self.genes.get(gene_id)
    }

    /// Returns an Iterator of all [`Gene`]s
    pub fn genes(&self) -> std::collections::hash_map::Values<'_, GeneId, Gene> {
        self.genes.values()
    }

    /// Returns all genes with at least one direct annotation
    /// to a term within `scope`
    ///
    /// This is the default background universe of the local enrichment engines.
    pub fn annotated_genes(&self, scope: AspectScope) -> Genes {
        self.genes
            .values()
            .filter(|gene| {
                gene.go_terms().iter().any(|term_id| {
                    self.get(term_id)
                        .and_then(GoTermInternal::aspect)
                        .is_some_and(|aspect| scope.contains(aspect))
                })
            })
            .map(|gene| *gene.id())
            .collect()
    }

    /// Returns an iterator of all terms that belong to `scope`
    pub fn terms_in(&self, scope: AspectScope) -> impl Iterator<Item = GoTerm<'_>> {
        self.terms().filter(move |term| {
            term.aspect()
                .is_some_and(|aspect: Aspect| scope.contains(aspect))
        })
    }
}

/// Methods to build the Ontology
///
/// They are used by the parsers and rarely needed by clients.
impl Ontology {
    /// Creates and inserts a new term to the ontology
    ///
    /// This method does not link the term to its parents or to any genes
    pub fn insert_term<I: Into<GoTermId>>(&mut self, name: String, id: I) {
        let term = GoTermInternal::new(name, id.into());
        self.go_terms.insert(term);
    }

    /// Sets the [`Aspect`] of a term
    ///
    /// # Errors
    ///
    /// If the term is not present, [`GoError::DoesNotExist`] is returned
    pub fn set_aspect<I: Into<GoTermId>>(&mut self, term_id: I, aspect: Aspect) -> GoResult<()> {
        let term = self.get_mut(term_id).ok_or(GoError::DoesNotExist)?;
        term.set_aspect(Some(aspect));
        Ok(())
    }

    /// Add a connection from a term to its parent
    ///
    /// # Panics
    ///
    /// This method will panic if the `parent_id` or `child_id` is not present in the Ontology
    pub fn add_parent<I: Into<GoTermId> + Copy, J: Into<GoTermId> + Copy>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) {
        let parent = self.get_unchecked_mut(parent_id);
        parent.add_child(child_id);

        let child = self.get_unchecked_mut(child_id);
        child.add_parent(parent_id);
    }

    /// Creates and caches the `all_parents` values for every term
    ///
    /// Must be called after all terms and relationships are added and
    /// before any gene is linked.
    pub fn create_cache(&mut self) {
        for id in self.go_terms.keys() {
            self.create_cache_of_grandparents(id);
        }
    }

    /// Add a gene to the Ontology and return the [`GeneId`]
    ///
    /// If the gene already exists in the ontology, it is not added again.
    ///
    /// # Errors
    ///
    /// If the `gene_id` is invalid, an [`GoError::ParseIntError`] is returned
    pub fn add_gene(&mut self, gene_id: &str) -> GoResult<GeneId> {
        let id = GeneId::try_from(gene_id)?;
        self.genes.entry(id).or_insert_with(|| Gene::new(id));
        Ok(id)
    }

    /// Annotates the [`Gene`] to the term and every ancestor of the term
    ///
    /// The direct annotation is also recorded on the gene itself.
    ///
    /// # Errors
    ///
    /// If the term or the gene is not present, [`GoError::DoesNotExist`] is returned
    pub fn link_gene_term<I: Into<GoTermId> + Copy>(
        &mut self,
        term_id: I,
        gene_id: GeneId,
    ) -> GoResult<()> {
        self.genes
            .get_mut(&gene_id)
            .ok_or(GoError::DoesNotExist)?
            .add_term(term_id);
        self.propagate_gene(term_id.into(), gene_id)
    }


    pub(crate) fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }
}

/// Crate-only functions for setting up and building the Ontology
impl Ontology {
    /// Insert a `GoTermInternal` to the ontology
    pub(crate) fn add_term(&mut self, term: GoTermInternal) -> GoTermId {
        let id = *term.id();
        self.go_terms.insert(term);
        id
    }

    pub(crate) fn contains(&self, term_id: GoTermId) -> bool {
        self.go_terms.contains(term_id)
    }

    fn propagate_gene(&mut self, term_id: GoTermId, gene_id: GeneId) -> GoResult<()> {
        let term = self.get_mut(term_id).ok_or(GoError::DoesNotExist)?;
        if term.add_gene(gene_id) {
            // Already linked terms have all their parents linked as well
            let parents = term.all_parents().clone();
            for parent in &parents {
                self.propagate_gene(parent, gene_id)?;
            }
        }
        Ok(())
    }

    /// # Panics
    ///
    /// This method will panic if the `term_id` is not present in the Ontology
    fn all_grandparents(&mut self, term_id: GoTermId) -> &GoGroup {
        if !self.get_unchecked(term_id).parents_cached() {
            self.create_cache_of_grandparents(term_id);
        }
        self.get_unchecked(term_id).all_parents()
    }

    /// Recursively walks up to the roots and caches the direct and indirect
    /// parents of every visited term on the way back down
    ///
    /// # Panics
    ///
    /// This method will panic if the `term_id` is not present in the Ontology
    fn create_cache_of_grandparents(&mut self, term_id: GoTermId) {
        let mut res = GoGroup::default();
        let parents = self.get_unchecked(term_id).parents().clone();
        for parent in &parents {
            for gp in self.all_grandparents(parent) {
                res.insert(gp);
            }
        }
        let term = self.get_unchecked_mut(term_id);
        *term.all_parents_mut() = &res | &parents;
    }

    /// Returns the `GoTermInternal` with the given `GoTermId`
    pub(crate) fn get<I: Into<GoTermId>>(&self, term_id: I) -> Option<&GoTermInternal> {
        self.go_terms.get(term_id.into())
    }

    /// # Panics
    ///
    /// This method will panic if the `term_id` is not present in the Ontology
    pub(crate) fn get_unchecked<I: Into<GoTermId>>(&self, term_id: I) -> &GoTermInternal {
        self.go_terms.get_unchecked(term_id.into())
    }

    fn get_mut<I: Into<GoTermId>>(&mut self, term_id: I) -> Option<&mut GoTermInternal> {
        self.go_terms.get_mut(term_id.into())
    }

    fn get_unchecked_mut<I: Into<GoTermId>>(&mut self, term_id: I) -> &mut GoTermInternal {
        self.go_terms.get_unchecked_mut(term_id.into())
    }
}

/// Iterates the Ontology and yields [`GoTerm`]s
pub struct Iter<'a> {
    inner: std::collections::hash_map::Values<'a, GoTermId, GoTermInternal>,
    ontology: &'a Ontology,
}

impl<'a> Iterator for Iter<'a> {
    type Item = GoTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|term| GoTerm::new(self.ontology, term))
    }
}

impl<'a> IntoIterator for &'a Ontology {
    type Item = GoTerm<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.go_terms.values(),
            ontology: self,
        }
    }
}
