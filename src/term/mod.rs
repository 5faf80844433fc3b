//! [`GoTerm`]s are the main building block of the Gene Ontology.
//! Each term has a unique [`GoTermId`], belongs to one [`Aspect`]
//! and is linked to its parents via `is_a` and `part_of` relationships.
//!
//! Terms are stored inside the [`Ontology`](crate::Ontology). Client code
//! only ever receives borrowed [`GoTerm`] views.
use std::fmt::Display;
use std::str::FromStr;

use crate::GoError;

mod gotermid;
mod goterm;
mod group;
pub(crate) mod internal;

pub use gotermid::GoTermId;
pub use goterm::{GoTerm, GoTerms};
pub use group::{GoGroup, GoTermIds};

/// The three sub-ontologies (namespaces) of the Gene Ontology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aspect {
    /// `biological_process`, GO:0008150
    BiologicalProcess,
    /// `molecular_function`, GO:0003674
    MolecularFunction,
    /// `cellular_component`, GO:0005575
    CellularComponent,
}

impl Aspect {
    /// All aspects in their canonical order
    pub const ALL: [Aspect; 3] = [
        Aspect::BiologicalProcess,
        Aspect::MolecularFunction,
        Aspect::CellularComponent,
    ];

    /// The two-letter code, e.g. `BP`
    pub fn code(self) -> &'static str {
        match self {
            Aspect::BiologicalProcess => "BP",
            Aspect::MolecularFunction => "MF",
            Aspect::CellularComponent => "CC",
        }
    }

    /// The data source name used by g:Profiler, e.g. `GO:BP`
    pub fn gprofiler_source(self) -> &'static str {
        match self {
            Aspect::BiologicalProcess => "GO:BP",
            Aspect::MolecularFunction => "GO:MF",
            Aspect::CellularComponent => "GO:CC",
        }
    }

    /// Parses the `namespace` tag of an OBO stanza
    pub fn from_obo_namespace(value: &str) -> Option<Self> {
        match value {
            "biological_process" => Some(Aspect::BiologicalProcess),
            "molecular_function" => Some(Aspect::MolecularFunction),
            "cellular_component" => Some(Aspect::CellularComponent),
            _ => None,
        }
    }
}

impl Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Aspect {
    type Err = GoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BP" | "GO:BP" => Ok(Aspect::BiologicalProcess),
            "MF" | "GO:MF" => Ok(Aspect::MolecularFunction),
            "CC" | "GO:CC" => Ok(Aspect::CellularComponent),
            _ => Err(GoError::Config(format!("unknown GO aspect `{s}`"))),
        }
    }
}

/// The part of the ontology that an enrichment analysis covers
///
/// Either a single [`Aspect`] or all three of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectScope {
    /// Only terms of one aspect are tested
    Single(Aspect),
    /// Terms of all aspects are tested
    #[default]
    All,
}

impl AspectScope {
    /// Returns `true` if terms of `aspect` are part of the scope
    pub fn contains(self, aspect: Aspect) -> bool {
        match self {
            AspectScope::Single(inner) => inner == aspect,
            AspectScope::All => true,
        }
    }

    /// Returns the aspects that are part of the scope
    pub fn aspects(self) -> Vec<Aspect> {
        match self {
            AspectScope::Single(inner) => vec![inner],
            AspectScope::All => Aspect::ALL.to_vec(),
        }
    }
}

impl Display for AspectScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AspectScope::Single(aspect) => write!(f, "{aspect}"),
            AspectScope::All => write!(f, "ALL"),
        }
    }
}

impl FromStr for AspectScope {
    type Err = GoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(AspectScope::All)
        } else {
            Ok(AspectScope::Single(s.parse()?))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_scope() {
        assert_eq!(
            "bp".parse::<AspectScope>().unwrap(),
            AspectScope::Single(Aspect::BiologicalProcess)
        );
        assert_eq!("ALL".parse::<AspectScope>().unwrap(), AspectScope::All);
        assert!("XX".parse::<AspectScope>().is_err());
    }

    #[test]
    fn scope_contains() {
        let scope = AspectScope::Single(Aspect::CellularComponent);
        assert!(scope.contains(Aspect::CellularComponent));
        assert!(!scope.contains(Aspect::MolecularFunction));
        assert!(AspectScope::All.contains(Aspect::MolecularFunction));
        assert_eq!(AspectScope::All.aspects().len(), 3);
    }

    #[test]
    fn namespace_names() {
        assert_eq!(
            Aspect::from_obo_namespace("cellular_component"),
            Some(Aspect::CellularComponent)
        );
        assert!(Aspect::from_obo_namespace("external").is_none());
    }
}
