use crate::annotations::Genes;
use crate::term::internal::GoTermInternal;
use crate::term::{Aspect, GoGroup, GoTermId, GoTermIds};
use crate::Ontology;

/// The `GoTerm` represents a single term from the Gene Ontology
///
/// It is a cheap, borrowed view into the [`Ontology`] and
/// provides access to relationships and annotated genes.
#[derive(Debug, Clone, Copy)]
pub struct GoTerm<'a> {
    id: &'a GoTermId,
    name: &'a str,
    aspect: Option<Aspect>,
    parents: &'a GoGroup,
    all_parents: &'a GoGroup,
    children: &'a GoGroup,
    genes: &'a Genes,
    ontology: &'a Ontology,
}

impl<'a> GoTerm<'a> {
    pub(crate) fn new(ontology: &'a Ontology, term: &'a GoTermInternal) -> GoTerm<'a> {
        GoTerm {
            id: term.id(),
            name: term.name(),
            aspect: term.aspect(),
            parents: term.parents(),
            all_parents: term.all_parents(),
            children: term.children(),
            genes: term.genes(),
            ontology,
        }
    }

    /// Returns the [`GoTermId`] of the term
    ///
    /// e.g.: `GO:0006915`
    pub fn id(&self) -> &GoTermId {
        self.id
    }

    /// Returns the name of the term
    ///
    /// e.g.: `apoptotic process`
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the [`Aspect`] of the term, if the OBO stanza declared one
    pub fn aspect(&self) -> Option<Aspect> {
        self.aspect
    }

    /// Returns an iterator of the direct parents of the term
    pub fn parents(&self) -> GoTerms<'a> {
        GoTerms::new(self.parents, self.ontology)
    }

    /// Returns the [`GoTermId`]s of the direct parents
    pub fn parent_ids(&self) -> &'a GoGroup {
        self.parents
    }

    /// Returns the [`GoTermId`]s of all direct and indirect parents
    pub fn all_parent_ids(&self) -> &'a GoGroup {
        self.all_parents
    }

    /// Returns an iterator of the direct children of the term
    pub fn children(&self) -> GoTerms<'a> {
        GoTerms::new(self.children, self.ontology)
    }

    /// Returns the IDs of all genes annotated to the term or its descendants
    pub fn gene_ids(&self) -> &'a Genes {
        self.genes
    }

    /// Returns `true` if `self` is a child (direct or indirect) of `other`
    pub fn child_of(&self, other: &GoTerm) -> bool {
        self.all_parents.contains(other.id())
    }
}

impl PartialEq for GoTerm<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Iterates [`GoTerm`]s of a borrowed [`GoGroup`]
pub struct GoTerms<'a> {
    ids: GoTermIds<'a>,
    ontology: &'a Ontology,
}

impl<'a> GoTerms<'a> {
    pub(crate) fn new(group: &'a GoGroup, ontology: &'a Ontology) -> Self {
        Self {
            ids: group.iter(),
            ontology,
        }
    }
}

impl<'a> Iterator for GoTerms<'a> {
    type Item = GoTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|id| {
            let term = self.ontology.get_unchecked(id);
            GoTerm::new(self.ontology, term)
        })
    }
}
