//! Gene Ontology enrichment analysis for lists of differentially expressed genes
//!
//! A run reads gene identifiers from a CSV file, translates them into the
//! namespace an enrichment backend understands, runs the backend and writes
//! a flat result table:
//!
//! 1. [`input::load_identifiers`] reads the identifiers
//! 2. an [`mapping::IdentifierMapper`] translates them
//! 3. an [`engine::EnrichmentEngine`] tests every GO term
//! 4. [`normalize::normalize`] flattens the backend specific result
//! 5. [`writer::write_table`] persists the complete table
//!
//! [`pipeline::Pipeline`] wires all stages together.
//!
//! The two local backends operate on an [`Ontology`] that is built from
//! `go-basic.obo` and the NCBI `gene2go` annotation table. The third
//! backend delegates to the g:Profiler web service.

use core::fmt::Debug;
use std::num::ParseIntError;
use thiserror::Error;

pub mod annotations;
pub mod compare;
pub mod config;
pub mod engine;
mod gprofiler;
pub mod input;
pub mod logging;
pub mod mapping;
pub mod normalize;
mod ontology;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod term;
pub mod writer;

pub use ontology::Ontology;
pub use term::{Aspect, AspectScope, GoTerm, GoTermId};

const DEFAULT_NUM_PARENTS: usize = 4;
const DEFAULT_NUM_ALL_PARENTS: usize = 32;
const DEFAULT_NUM_GENES: usize = 16;

/// Number of result rows shown on the console after a run
pub const PREVIEW_ROWS: usize = 10;

/// Delimiter used when list-valued fields are flattened into a single string
pub const LIST_DELIMITER: &str = ";";

/// Default file name of the GO ontology in OBO format
pub const OBO_FILENAME: &str = "go-basic.obo";

/// Default file name of the NCBI gene to GO annotation table
pub const GENE2GO_FILENAME: &str = "gene2go";

/// Default file name of the NCBI gene to Ensembl cross reference table
pub const GENE2ENSEMBL_FILENAME: &str = "gene2ensembl";

/// Main Error type for this crate
///
/// Every stage of the enrichment pipeline returns one of these variants.
/// None of them are recoverable within a run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GoError {
    /// The input file does not exist
    #[error("file not found: {0}")]
    FileNotFound(String),
    /// The input file exists but lacks the expected column
    #[error("column `{column}` is missing in {file}")]
    Schema {
        /// Path of the offending file
        file: String,
        /// Name of the missing column
        column: String,
    },
    /// The identifier translation backend could not be reached
    #[error("identifier service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Not a single identifier could be mapped to the target namespace
    #[error("no identifiers were mapped: {0}")]
    EmptyResult(String),
    /// The enrichment backend rejected the configuration or returned garbage
    #[error("enrichment engine failed: {0}")]
    Engine(String),
    /// The background gene universe does not contain any annotated gene
    #[error("background universe is empty: {0}")]
    EmptyUniverse(String),
    /// The result table could not be persisted
    #[error("unable to write {path}: {reason}")]
    Write {
        /// Destination that failed
        path: String,
        /// Underlying reason
        reason: String,
    },
    /// Failed to open a reference data file
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// A reference data file contains invalid data
    #[error("invalid data: {0}")]
    InvalidInput(String),
    /// The requested term does not exist in the ontology
    #[error("term does not exist")]
    DoesNotExist,
    /// Failed to parse an integer identifier
    #[error("unable to parse Integer")]
    ParseIntError,
    /// A settings file or command line option is invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<ParseIntError> for GoError {
    fn from(_: ParseIntError) -> Self {
        GoError::ParseIntError
    }
}

impl From<csv::Error> for GoError {
    fn from(err: csv::Error) -> Self {
        GoError::InvalidInput(err.to_string())
    }
}

/// Shortcut for `Result<T, GoError>`
pub type GoResult<T> = Result<T, GoError>;
