//! Configuration of an enrichment run
//!
//! [`EnrichmentConfiguration`] is the immutable record every engine receives.
//! [`Settings`] is the optional TOML file that provides defaults for the
//! command line interface.

use core::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gprofiler;
use crate::input::{load_identifiers, GeneIdentifierList};
use crate::pipeline;
use crate::term::{Aspect, AspectScope};
use crate::{GoError, GoResult};

/// The statistical test of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// One-sided Fisher's exact test per term, without term size filters
    ClassicFisher,
    /// Hypergeometric test with term size filters
    Hypergeometric,
    /// Over-representation analysis of the g:Profiler web service
    GProfiler,
}

/// Multiple testing correction method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Raw p-values are reported
    None,
    /// Bonferroni correction
    Bonferroni,
    /// Holm step-down correction
    Holm,
    /// Benjamini-Hochberg false discovery rate
    BenjaminiHochberg,
    /// Benjamini-Yekutieli false discovery rate
    BenjaminiYekutieli,
    /// g:SCS, only available through g:Profiler
    GScs,
}

impl Display for Correction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Correction::None => "none",
            Correction::Bonferroni => "bonferroni",
            Correction::Holm => "holm",
            Correction::BenjaminiHochberg => "BH",
            Correction::BenjaminiYekutieli => "BY",
            Correction::GScs => "g_SCS",
        };
        f.write_str(name)
    }
}

impl FromStr for Correction {
    type Err = GoError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Correction::None),
            "bonferroni" => Ok(Correction::Bonferroni),
            "holm" => Ok(Correction::Holm),
            "bh" | "fdr" | "benjamini-hochberg" => Ok(Correction::BenjaminiHochberg),
            "by" | "benjamini-yekutieli" => Ok(Correction::BenjaminiYekutieli),
            "g_scs" | "gscs" | "analytical" => Ok(Correction::GScs),
            _ => Err(GoError::Config(format!("unknown correction method `{s}`"))),
        }
    }
}

/// The background gene universe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Universe {
    /// All genes with at least one annotation in the selected aspect
    #[default]
    Annotated,
    /// An explicit list of gene identifiers, in the namespace of the engine
    Custom(Vec<String>),
}

/// Organism of the analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organism {
    /// NCBI taxonomy ID, used to filter `gene2go`
    pub taxon: u32,
    /// g:Profiler organism code
    pub code: String,
}

impl Default for Organism {
    fn default() -> Self {
        Self {
            taxon: 9606,
            code: "hsapiens".to_string(),
        }
    }
}

/// Configuration of a single enrichment run
///
/// Use one of the presets and adjust the public fields as needed:
///
/// ```
/// use goenrich::config::{Correction, EnrichmentConfiguration};
///
/// let mut config = EnrichmentConfiguration::hypergeometric();
/// config.correction = Correction::Bonferroni;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfiguration {
    /// The GO aspect(s) to test
    pub scope: AspectScope,
    /// The statistical test
    pub test: TestKind,
    /// Multiple testing correction
    pub correction: Correction,
    /// Only terms with a (corrected) p-value at or below are reported
    pub threshold: f64,
    /// Background genes
    pub universe: Universe,
    /// Organism of the input genes
    pub organism: Organism,
    /// Smallest term (number of annotated universe genes) to test
    pub min_term_size: usize,
    /// Largest term (number of annotated universe genes) to test
    pub max_term_size: usize,
    /// Terms with fewer annotated universe genes are not tested
    pub node_size: usize,
}

impl EnrichmentConfiguration {
    /// Classic Fisher test of all Biological Process terms, without correction
    pub fn classic() -> Self {
        Self {
            scope: AspectScope::Single(Aspect::BiologicalProcess),
            test: TestKind::ClassicFisher,
            correction: Correction::None,
            threshold: 1.0,
            universe: Universe::Annotated,
            organism: Organism::default(),
            min_term_size: 1,
            max_term_size: usize::MAX,
            node_size: 1,
        }
    }

    /// Hypergeometric test of Biological Process terms with 10 to 500 genes,
    /// Benjamini-Hochberg corrected
    pub fn hypergeometric() -> Self {
        Self {
            test: TestKind::Hypergeometric,
            correction: Correction::BenjaminiHochberg,
            min_term_size: 10,
            max_term_size: 500,
            ..Self::classic()
        }
    }

    /// g:Profiler analysis of Biological Process terms, g:SCS corrected
    pub fn gprofiler() -> Self {
        Self {
            test: TestKind::GProfiler,
            correction: Correction::GScs,
            ..Self::classic()
        }
    }

    /// Returns the preset for the given test
    pub fn for_test(test: TestKind) -> Self {
        match test {
            TestKind::ClassicFisher => Self::classic(),
            TestKind::Hypergeometric => Self::hypergeometric(),
            TestKind::GProfiler => Self::gprofiler(),
        }
    }

    /// Checks that the configuration can be applied
    ///
    /// # Errors
    ///
    /// [`GoError::Engine`] if the threshold is outside of `(0, 1]`, the
    /// term size limits are inconsistent or the correction is not supported
    /// by the test
    pub fn validate(&self) -> GoResult<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(GoError::Engine(format!(
                "threshold must be within (0, 1], got {}",
                self.threshold
            )));
        }
        if self.min_term_size > self.max_term_size {
            return Err(GoError::Engine(format!(
                "min_term_size ({}) is larger than max_term_size ({})",
                self.min_term_size, self.max_term_size
            )));
        }
        if self.node_size == 0 {
            return Err(GoError::Engine("node_size must be at least 1".to_string()));
        }
        match (self.test, self.correction) {
            (TestKind::GProfiler, Correction::Holm | Correction::BenjaminiYekutieli) => {
                Err(GoError::Engine(format!(
                    "g:Profiler does not support the {} correction",
                    self.correction
                )))
            }
            (TestKind::GProfiler, Correction::None) => Err(GoError::Engine(
                "g:Profiler always applies a correction".to_string(),
            )),
            (TestKind::ClassicFisher | TestKind::Hypergeometric, Correction::GScs) => Err(
                GoError::Engine("g:SCS is only available through g:Profiler".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Settings file
///
/// All keys are optional:
///
/// ```toml
/// input = "results/significant_genes_T3_vs_T0.csv"
/// column = "gene"
/// results_dir = "results"
/// obo = "data/go-basic.obo"
/// gene2go = "data/gene2go.gz"
/// gene2ensembl = "data/gene2ensembl.gz"
/// taxon = 9606
/// organism = "hsapiens"
/// mapper = "offline"
/// background = "results/expressed_genes.csv"
///
/// [enrichment]
/// aspect = "BP"
/// threshold = 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CSV file with the significant genes
    pub input: PathBuf,
    /// Column of `input` holding the gene identifiers
    pub column: String,
    /// CSV file with the background genes, all annotated genes if missing
    pub background: Option<PathBuf>,
    /// Column of `background`, defaults to `column`
    pub background_column: Option<String>,
    /// Output folder
    pub results_dir: PathBuf,
    /// GO ontology in OBO format
    pub obo: PathBuf,
    /// NCBI gene to GO annotations
    pub gene2go: PathBuf,
    /// NCBI Entrez to Ensembl cross references
    pub gene2ensembl: PathBuf,
    /// NCBI taxonomy ID
    pub taxon: u32,
    /// g:Profiler organism code
    pub organism: String,
    /// Identifier mapping backend, `offline` or `gconvert`
    pub mapper: String,
    /// Base URL of the g:Profiler API
    pub gprofiler_url: String,
    /// Timeout of every HTTP request
    pub http_timeout_secs: u64,
    /// Overrides of the engine presets
    pub enrichment: EnrichmentSettings,
}

/// Engine overrides of the [`Settings`] file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    /// `BP`, `MF`, `CC` or `all`
    pub aspect: Option<String>,
    /// Reporting threshold
    pub threshold: Option<f64>,
    /// Correction method name
    pub correction: Option<String>,
    /// Smallest term to test
    pub min_term_size: Option<usize>,
    /// Largest term to test
    pub max_term_size: Option<usize>,
    /// Minimum annotated genes of a term
    pub node_size: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(pipeline::DEFAULT_INPUT),
            column: pipeline::DEFAULT_COLUMN.to_string(),
            background: None,
            background_column: None,
            results_dir: PathBuf::from(pipeline::DEFAULT_RESULTS_DIR),
            obo: PathBuf::from("data").join(crate::OBO_FILENAME),
            gene2go: PathBuf::from("data").join(crate::GENE2GO_FILENAME),
            gene2ensembl: PathBuf::from("data").join(crate::GENE2ENSEMBL_FILENAME),
            taxon: 9606,
            organism: "hsapiens".to_string(),
            mapper: "offline".to_string(),
            gprofiler_url: gprofiler::DEFAULT_BASE_URL.to_string(),
            http_timeout_secs: gprofiler::DEFAULT_TIMEOUT.as_secs(),
            enrichment: EnrichmentSettings::default(),
        }
    }
}

impl Settings {
    /// Reads the settings from a TOML file
    ///
    /// # Errors
    ///
    /// [`GoError::Config`] if the file cannot be read or is not valid TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> GoResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            GoError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses settings from a TOML string
    ///
    /// # Errors
    ///
    /// [`GoError::Config`] if the string is not valid TOML
    pub fn from_toml(content: &str) -> GoResult<Self> {
        toml::from_str(content).map_err(|err| GoError::Config(err.to_string()))
    }

    /// Loads the background genes, if a background file is set
    ///
    /// # Errors
    ///
    /// - [`GoError::FileNotFound`]: the background file does not exist
    /// - [`GoError::Schema`]: the background file lacks the column
    pub fn background(&self) -> GoResult<Option<GeneIdentifierList>> {
        let Some(path) = &self.background else {
            return Ok(None);
        };
        let column = self.background_column.as_deref().unwrap_or(&self.column);
        load_identifiers(path, column).map(Some)
    }

    /// Timeout of every HTTP request
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Builds the validated [`EnrichmentConfiguration`] for `test`
    ///
    /// # Errors
    ///
    /// - [`GoError::Config`]: a value cannot be parsed
    /// - [`GoError::Engine`]: the resulting configuration is invalid
    pub fn enrichment_configuration(&self, test: TestKind) -> GoResult<EnrichmentConfiguration> {
        let mut config = EnrichmentConfiguration::for_test(test);
        config.organism = Organism {
            taxon: self.taxon,
            code: self.organism.clone(),
        };
        let overrides = &self.enrichment;
        if let Some(aspect) = &overrides.aspect {
            config.scope = aspect.parse()?;
        }
        if let Some(correction) = &overrides.correction {
            config.correction = correction.parse()?;
        }
        if let Some(threshold) = overrides.threshold {
            config.threshold = threshold;
        }
        if let Some(size) = overrides.min_term_size {
            config.min_term_size = size;
        }
        if let Some(size) = overrides.max_term_size {
            config.max_term_size = size;
        }
        if let Some(size) = overrides.node_size {
            config.node_size = size;
        }
        config.validate()?;
        Ok(config)
    }
}
