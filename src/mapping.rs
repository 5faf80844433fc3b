//! Translating gene identifiers between namespaces
//!
//! The input file contains Ensembl gene IDs, the enrichment engines
//! expect NCBI Entrez gene IDs. An [`IdentifierMapper`] translates the
//! identifiers and records which of them could not be mapped.
//! Unmapped identifiers are dropped, never replaced.

use core::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

use crate::{GoError, GoResult};

mod gconvert;
mod offline;

pub use gconvert::GConvertMapper;
pub use offline::OfflineMapper;

/// The identifier namespaces that are supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdNamespace {
    /// NCBI Entrez gene ID, e.g. `7157`
    Entrez,
    /// Ensembl gene ID, e.g. `ENSG00000141510`
    Ensembl,
    /// Official gene symbol, e.g. `TP53`
    Symbol,
}

impl IdNamespace {
    /// The namespace name that g:Convert uses as `target`
    pub fn gconvert_target(self) -> &'static str {
        match self {
            IdNamespace::Entrez => "ENTREZGENE_ACC",
            IdNamespace::Ensembl => "ENSG",
            IdNamespace::Symbol => "ENTREZGENE",
        }
    }
}

impl Display for IdNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IdNamespace::Entrez => "ENTREZID",
            IdNamespace::Ensembl => "ENSEMBL",
            IdNamespace::Symbol => "SYMBOL",
        };
        f.write_str(name)
    }
}

impl FromStr for IdNamespace {
    type Err = GoError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entrez" | "entrezid" => Ok(IdNamespace::Entrez),
            "ensembl" => Ok(IdNamespace::Ensembl),
            "symbol" => Ok(IdNamespace::Symbol),
            _ => Err(GoError::Config(format!("unknown identifier namespace `{s}`"))),
        }
    }
}

/// Result of an identifier translation
///
/// Holds one entry per input identifier, in input order. Entries
/// without a target could not be mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMapping {
    entries: Vec<(String, Option<String>)>,
}

impl IdentifierMapping {
    /// Builds the mapping by looking up every source identifier
    pub fn from_lookup<'a, I, F>(ids: I, mut lookup: F) -> Self
    where
        I: IntoIterator<Item = &'a String>,
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            entries: ids
                .into_iter()
                .map(|id| (id.clone(), lookup(id)))
                .collect(),
        }
    }

    /// All `(source, target)` entries, including the unmapped ones
    pub fn entries(&self) -> &[(String, Option<String>)] {
        &self.entries
    }

    /// Returns the mapped targets in input order
    ///
    /// Unmapped identifiers are excluded.
    ///
    /// # Examples
    ///
    /// ```
    /// use goenrich::mapping::IdentifierMapping;
    ///
    /// let ids = vec!["GENE1".to_string(), "GENE2".to_string(), "GENE3".to_string()];
    /// let mapping = IdentifierMapping::from_lookup(&ids, |id| match id {
    ///     "GENE1" => Some("100".to_string()),
    ///     "GENE3" => Some("300".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(mapping.mapped_targets(), vec!["100", "300"]);
    /// assert_eq!(mapping.unmapped_count(), 1);
    /// ```
    pub fn mapped_targets(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|(_, target)| target.clone())
            .collect()
    }

    /// Number of identifiers with a target
    pub fn mapped_count(&self) -> usize {
        self.entries.iter().filter(|(_, t)| t.is_some()).count()
    }

    /// Number of identifiers without a target
    pub fn unmapped_count(&self) -> usize {
        self.entries.len() - self.mapped_count()
    }

    /// The source identifiers that could not be mapped
    pub fn unmapped(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, t)| t.is_none())
            .map(|(source, _)| source.as_str())
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Translates gene identifiers into another namespace
///
/// Implementors only provide [`IdentifierMapper::translate`], the
/// checks for empty input and empty results are shared.
pub trait IdentifierMapper {
    /// Looks up every identifier in the backend
    ///
    /// Must return one entry per identifier, in input order, and must
    /// never invent a target for an unknown identifier.
    ///
    /// # Errors
    ///
    /// [`GoError::ServiceUnavailable`] if the backend cannot be reached
    fn translate(&self, ids: &[String], target: IdNamespace) -> GoResult<IdentifierMapping>;

    /// Maps `ids` into the `target` namespace
    ///
    /// # Errors
    ///
    /// - [`GoError::EmptyResult`]: `ids` is empty (the backend is not called)
    ///   or not a single identifier could be mapped
    /// - [`GoError::ServiceUnavailable`]: the backend cannot be reached
    fn map_identifiers(&self, ids: &[String], target: IdNamespace) -> GoResult<IdentifierMapping> {
        if ids.is_empty() {
            return Err(GoError::EmptyResult("the input list is empty".to_string()));
        }
        let mapping = self.translate(ids, target)?;
        let mapped = mapping.mapped_count();
        if mapped == 0 {
            return Err(GoError::EmptyResult(format!(
                "none of the {} identifiers could be mapped to {target}",
                ids.len()
            )));
        }
        let unmapped = mapping.unmapped_count();
        if unmapped > 0 {
            warn!(
                "{unmapped} of {} identifiers ({:.2}%) failed to map to {target}",
                ids.len(),
                100.0 * unmapped as f64 / ids.len() as f64
            );
        }
        info!("Mapped {mapped} of {} identifiers to {target}", ids.len());
        Ok(mapping)
    }
}

/// Passes identifiers through unchanged
///
/// Used when the input is already in the namespace of the engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityMapper;

impl IdentifierMapper for IdentityMapper {
    fn translate(&self, ids: &[String], _target: IdNamespace) -> GoResult<IdentifierMapping> {
        Ok(IdentifierMapping::from_lookup(ids, |id| {
            (!id.is_empty()).then(|| id.to_string())
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct CountingMapper {
        table: HashMap<&'static str, &'static str>,
        calls: Cell<usize>,
    }

    impl IdentifierMapper for CountingMapper {
        fn translate(&self, ids: &[String], _: IdNamespace) -> GoResult<IdentifierMapping> {
            self.calls.set(self.calls.get() + 1);
            Ok(IdentifierMapping::from_lookup(ids, |id| {
                self.table.get(id).map(|t| t.to_string())
            }))
        }
    }

    fn mapper() -> CountingMapper {
        CountingMapper {
            table: HashMap::from([("GENE1", "100"), ("GENE3", "300")]),
            calls: Cell::new(0),
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn drops_unmapped() {
        let mapper = mapper();
        let mapping = mapper
            .map_identifiers(&ids(&["GENE1", "GENE2", "GENE3"]), IdNamespace::Entrez)
            .unwrap();
        assert_eq!(mapping.mapped_targets(), ["100", "300"]);
        assert_eq!(mapping.unmapped().collect::<Vec<_>>(), ["GENE2"]);
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn empty_input_skips_backend() {
        let mapper = mapper();
        let res = mapper.map_identifiers(&[], IdNamespace::Entrez);
        assert!(matches!(res, Err(GoError::EmptyResult(_))));
        assert_eq!(mapper.calls.get(), 0);
    }

    #[test]
    fn nothing_mapped() {
        let mapper = mapper();
        let res = mapper.map_identifiers(&ids(&["GENE2", "GENE4"]), IdNamespace::Entrez);
        assert!(matches!(res, Err(GoError::EmptyResult(_))));
        assert_eq!(mapper.calls.get(), 1);
    }

    #[test]
    fn identity() {
        let mapping = IdentityMapper
            .map_identifiers(&ids(&["7157", ""]), IdNamespace::Entrez)
            .unwrap();
        assert_eq!(mapping.mapped_targets(), ["7157"]);
    }

    #[test]
    fn namespace_from_str() {
        assert_eq!("ENTREZID".parse::<IdNamespace>().unwrap(), IdNamespace::Entrez);
        assert_eq!("ensembl".parse::<IdNamespace>().unwrap(), IdNamespace::Ensembl);
        assert!("uniprot".parse::<IdNamespace>().is_err());
    }
}
