//! Loading the list of significant genes from a CSV file

use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::{GoError, GoResult};

/// Ordered list of gene identifiers as they appear in the input file
///
/// Duplicates and the original order are kept. The identifiers are not
/// validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneIdentifierList {
    ids: Vec<String>,
}

impl GeneIdentifierList {
    /// Returns `true` if the list does not contain any identifier
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of identifiers
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns the identifiers as slice
    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    /// Returns an Iterator of the identifiers
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.ids.iter()
    }
}

impl From<Vec<String>> for GeneIdentifierList {
    fn from(ids: Vec<String>) -> Self {
        Self { ids }
    }
}

impl<'a> IntoIterator for &'a GeneIdentifierList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads the values of `column` from a CSV file with header row
///
/// Values are trimmed, all other columns are ignored.
/// A file that contains only the header yields an empty list.
///
/// # Errors
///
/// - [`GoError::FileNotFound`]: `path` does not exist
/// - [`GoError::Schema`]: the header does not contain `column`
/// - [`GoError::InvalidInput`]: the file is not valid CSV
///
/// # Examples
///
/// ```no_run
/// use goenrich::input::load_identifiers;
///
/// let genes = load_identifiers("results/significant_genes_T3_vs_T0.csv", "gene").unwrap();
/// println!("{} significant genes", genes.len());
/// ```
pub fn load_identifiers<P: AsRef<Path>>(path: P, column: &str) -> GoResult<GeneIdentifierList> {
    let path = path.as_ref();
    let filename = path.display().to_string();
    if !path.is_file() {
        return Err(GoError::FileNotFound(filename));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let Some(idx) = rdr
        .headers()?
        .iter()
        .position(|header| header.trim() == column)
    else {
        return Err(GoError::Schema {
            file: filename,
            column: column.to_string(),
        });
    };

    let mut ids = Vec::new();
    for record in rdr.records() {
        let record = record?;
        ids.push(record.get(idx).unwrap_or_default().trim().to_string());
    }
    debug!("Loaded {} identifiers from {filename}", ids.len());
    Ok(GeneIdentifierList { ids })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let file = csv_file("gene,log2FC,padj\nENSG1,1.2,0.01\nENSG2,-2,0.001\nENSG1,1.2,0.01\n");
        let genes = load_identifiers(file.path(), "gene").unwrap();
        assert_eq!(genes.as_slice(), ["ENSG1", "ENSG2", "ENSG1"]);
    }

    #[test]
    fn custom_column() {
        let file = csv_file("id,symbol\n1, TP53 \n2,BRCA1\n");
        let genes = load_identifiers(file.path(), "symbol").unwrap();
        assert_eq!(genes.as_slice(), ["TP53", "BRCA1"]);
    }

    #[test]
    fn header_only() {
        let file = csv_file("gene,padj\n");
        let genes = load_identifiers(file.path(), "gene").unwrap();
        assert!(genes.is_empty());
    }

    #[test]
    fn missing_column() {
        let file = csv_file("symbol,padj\nTP53,0.01\n");
        assert!(matches!(
            load_identifiers(file.path(), "gene"),
            Err(GoError::Schema { column, .. }) if column == "gene"
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            load_identifiers("does/not/exist.csv", "gene"),
            Err(GoError::FileNotFound(_))
        ));
    }
}
