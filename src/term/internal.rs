use crate::annotations::{GeneId, Genes};
use crate::term::{Aspect, GoGroup, GoTermId};
use crate::GoResult;
use crate::DEFAULT_NUM_ALL_PARENTS;
use crate::DEFAULT_NUM_GENES;
use crate::DEFAULT_NUM_PARENTS;

/// Owned storage of a single GO term inside the ontology arena
#[derive(Debug)]
pub(crate) struct GoTermInternal {
    id: GoTermId,
    name: String,
    aspect: Option<Aspect>,
    parents: GoGroup,
    all_parents: GoGroup,
    children: GoGroup,
    genes: Genes,
}

impl GoTermInternal {
    pub fn new(name: String, id: GoTermId) -> GoTermInternal {
        GoTermInternal {
            id,
            name,
            aspect: None,
            parents: GoGroup::with_capacity(DEFAULT_NUM_PARENTS),
            all_parents: GoGroup::with_capacity(DEFAULT_NUM_ALL_PARENTS),
            children: GoGroup::with_capacity(DEFAULT_NUM_PARENTS),
            genes: Genes::with_capacity(DEFAULT_NUM_GENES),
        }
    }

    pub fn try_new(id: &str, name: &str) -> GoResult<GoTermInternal> {
        let id = GoTermId::try_from(id)?;
        Ok(GoTermInternal::new(name.to_string(), id))
    }

    pub fn id(&self) -> &GoTermId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aspect(&self) -> Option<Aspect> {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: Option<Aspect>) {
        self.aspect = aspect;
    }

    pub fn parents(&self) -> &GoGroup {
        &self.parents
    }

    pub fn children(&self) -> &GoGroup {
        &self.children
    }

    pub fn all_parents(&self) -> &GoGroup {
        &self.all_parents
    }

    pub fn all_parents_mut(&mut self) -> &mut GoGroup {
        &mut self.all_parents
    }

    pub fn genes(&self) -> &Genes {
        &self.genes
    }

    /// Root terms have nothing to cache, all others are cached
    /// once `all_parents` has been populated
    pub fn parents_cached(&self) -> bool {
        self.parents.is_empty() || !self.all_parents.is_empty()
    }

    pub fn add_parent<I: Into<GoTermId>>(&mut self, parent_id: I) {
        self.parents.insert(parent_id);
    }

    pub fn add_child<I: Into<GoTermId>>(&mut self, child_id: I) {
        self.children.insert(child_id);
    }

    /// Returns `false` if the gene was linked already
    pub fn add_gene(&mut self, gene_id: GeneId) -> bool {
        self.genes.insert(gene_id)
    }
}

impl PartialEq for GoTermInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GoTermInternal {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn root_counts_as_cached() {
        let mut term = GoTermInternal::try_new("GO:0008150", "biological_process").unwrap();
        assert!(term.parents_cached());
        term.add_parent(1u32);
        assert!(!term.parents_cached());
        term.all_parents_mut().insert(1u32);
        assert!(term.parents_cached());
    }

    #[test]
    fn genes_are_unique() {
        let mut term = GoTermInternal::new("nucleus".into(), 5634u32.into());
        assert!(term.add_gene(7157u32.into()));
        assert!(!term.add_gene(7157u32.into()));
        assert_eq!(term.genes().len(), 1);
    }
}
