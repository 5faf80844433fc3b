//! Wiring of all stages into a single enrichment run
//!
//! ```text
//! input CSV -> load_identifiers -> map_identifiers -> run_enrichment -> normalize -> write_table
//! ```
//!
//! The run stops at the first failing stage. The result file is only
//! written after all previous stages succeeded.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{EnrichmentConfiguration, Universe};
use crate::engine::EnrichmentEngine;
use crate::input::{load_identifiers, GeneIdentifierList};
use crate::mapping::IdentifierMapper;
use crate::normalize::{normalize, EnrichmentResultTable};
use crate::writer::{write_table, WriteReport};
use crate::GoResult;

/// Default input file, relative to the working directory
pub const DEFAULT_INPUT: &str = "results/significant_genes_T3_vs_T0.csv";

/// Default column that holds the gene identifiers
pub const DEFAULT_COLUMN: &str = "gene";

/// Default output folder
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Returns the name of the result file of the engine `engine_name`
///
/// ```
/// use goenrich::pipeline::result_file_name;
///
/// assert_eq!(result_file_name("topGO"), "topGO_enrichment_results.csv");
/// ```
pub fn result_file_name(engine_name: &str) -> String {
    format!("{engine_name}_enrichment_results.csv")
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// The complete normalized result
    pub table: EnrichmentResultTable,
    /// Location and row count of the written file
    pub written: WriteReport,
    /// Number of input identifiers
    pub input_size: usize,
    /// Number of identifiers that were passed to the engine
    pub mapped_size: usize,
}

/// A configured enrichment run
///
/// The mapper and the engine are trait objects, so any combination of
/// backends can be used.
pub struct Pipeline<'a> {
    mapper: &'a dyn IdentifierMapper,
    engine: &'a dyn EnrichmentEngine,
    config: EnrichmentConfiguration,
    background: Option<GeneIdentifierList>,
}

impl<'a> Pipeline<'a> {
    /// Creates a new pipeline
    pub fn new(
        mapper: &'a dyn IdentifierMapper,
        engine: &'a dyn EnrichmentEngine,
        config: EnrichmentConfiguration,
    ) -> Self {
        Self {
            mapper,
            engine,
            config,
            background: None,
        }
    }

    /// Uses `background` as gene universe instead of all annotated genes
    ///
    /// The identifiers are in the namespace of the input file and are
    /// translated with the same mapper as the query genes.
    pub fn with_background(mut self, background: GeneIdentifierList) -> Self {
        self.background = Some(background);
        self
    }

    /// The configuration that is passed to the engine
    pub fn config(&self) -> &EnrichmentConfiguration {
        &self.config
    }

    /// The path of the result file within `results_dir`
    pub fn output_path<P: AsRef<Path>>(&self, results_dir: P) -> PathBuf {
        results_dir
            .as_ref()
            .join(result_file_name(self.engine.name()))
    }

    /// Runs the enrichment for the identifiers of `column` in `input`
    ///
    /// # Errors
    ///
    /// Every error of the individual stages is passed on unchanged. In that
    /// case, no result file is written.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        column: &str,
        results_dir: Q,
    ) -> GoResult<RunReport> {
        self.config.validate()?;
        let identifiers = load_identifiers(input.as_ref(), column)?;
        info!(
            "Loaded {} identifiers from {}",
            identifiers.len(),
            input.as_ref().display()
        );

        let mapping = self
            .mapper
            .map_identifiers(identifiers.as_slice(), self.engine.namespace())?;
        let targets = mapping.mapped_targets();

        let config = match &self.background {
            Some(background) => {
                let universe = self
                    .mapper
                    .map_identifiers(background.as_slice(), self.engine.namespace())?
                    .mapped_targets();
                info!("Using a background of {} genes", universe.len());
                EnrichmentConfiguration {
                    universe: Universe::Custom(universe),
                    ..self.config.clone()
                }
            }
            None => self.config.clone(),
        };

        info!(
            "Running {} with {} genes",
            self.engine.name(),
            targets.len()
        );
        let raw = self.engine.run_enrichment(&targets, &config)?;
        let table = normalize(raw);

        let written = write_table(
            &table,
            results_dir,
            &result_file_name(self.engine.name()),
        )?;
        Ok(RunReport {
            table,
            written,
            input_size: identifiers.len(),
            mapped_size: targets.len(),
        })
    }
}
