use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::mapping::{IdNamespace, IdentifierMapper, IdentifierMapping};
use crate::parser::gene2ensembl;
use crate::{GoError, GoResult};

/// Maps identifiers with an in-memory lookup table
///
/// The table is usually built from the NCBI `gene2ensembl` file and maps
/// Ensembl gene IDs to Entrez gene IDs. If a source identifier is listed
/// with several targets, the first one is used.
#[derive(Debug, Clone)]
pub struct OfflineMapper {
    table: HashMap<String, String>,
    target: IdNamespace,
}

impl OfflineMapper {
    /// Builds the table from `(source, target)` pairs
    ///
    /// # Examples
    ///
    /// ```
    /// use goenrich::mapping::{IdNamespace, IdentifierMapper, OfflineMapper};
    ///
    /// let mapper = OfflineMapper::from_pairs(
    ///     [("ENSG00000141510", "7157"), ("ENSG00000012048", "672")],
    ///     IdNamespace::Entrez,
    /// );
    /// let ids = vec!["ENSG00000141510.17".to_string()];
    /// let mapping = mapper.map_identifiers(&ids, IdNamespace::Entrez).unwrap();
    /// assert_eq!(mapping.mapped_targets(), vec!["7157"]);
    /// ```
    pub fn from_pairs<I, S, T>(pairs: I, target: IdNamespace) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: Into<String>,
    {
        let mut table = HashMap::new();
        for (source, dest) in pairs {
            table
                .entry(strip_version(source.as_ref()).to_string())
                .or_insert_with(|| dest.into());
        }
        Self { table, target }
    }

    /// Builds an Ensembl to Entrez table from the NCBI `gene2ensembl` file
    ///
    /// # Errors
    ///
    /// - [`GoError::CannotOpenFile`]: the file is missing
    /// - [`GoError::InvalidInput`]: the file is malformed
    pub fn from_gene2ensembl<P: AsRef<Path>>(file: P, taxon: u32) -> GoResult<Self> {
        let pairs = gene2ensembl::parse(file, taxon)?;
        let mapper = Self::from_pairs(pairs, IdNamespace::Entrez);
        debug!("Loaded {} Ensembl to Entrez mappings", mapper.len());
        Ok(mapper)
    }

    /// Number of source identifiers in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl IdentifierMapper for OfflineMapper {
    fn translate(&self, ids: &[String], target: IdNamespace) -> GoResult<IdentifierMapping> {
        if target != self.target {
            return Err(GoError::Config(format!(
                "the lookup table maps to {}, not to {target}",
                self.target
            )));
        }
        Ok(IdentifierMapping::from_lookup(ids, |id| {
            self.table.get(strip_version(id.trim())).cloned()
        }))
    }
}

/// Removes the version suffix of Ensembl identifiers
///
/// `ENSG00000141510.17` becomes `ENSG00000141510`
fn strip_version(id: &str) -> &str {
    if id.starts_with("ENS") {
        id.split_once('.').map_or(id, |(stable, _)| stable)
    } else {
        id
    }
}
