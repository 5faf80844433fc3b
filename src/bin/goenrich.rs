//! Command line interface of `goenrich`
//!
//! ```text
//! goenrich run --engine clusterprofiler --input results/significant_genes_T3_vs_T0.csv
//! goenrich compare --results-dir results
//! ```

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use tracing::{error, info};

use goenrich::compare::{
    compare_results, ComparisonInputs, ComparisonRow, ComparisonTable, Method,
    DEFAULT_SIGNIFICANCE,
};
use goenrich::config::{Settings, TestKind};
use goenrich::engine::{
    ClassicFisherEngine, EnrichmentEngine, GProfilerEngine, HypergeometricEngine,
};
use goenrich::logging::{init_logging, LogLevel};
use goenrich::mapping::{GConvertMapper, IdentifierMapper, OfflineMapper};
use goenrich::normalize::EnrichmentResultRow;
use goenrich::pipeline::Pipeline;
use goenrich::{Ontology, PREVIEW_ROWS};

/// Gene Ontology enrichment of differentially expressed genes
#[derive(Parser, Debug)]
#[command(name = "goenrich", version, about)]
struct Cli {
    /// TOML settings file, command line options take precedence
    #[arg(short, long, global = true, env = "GOENRICH_CONFIG")]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs one enrichment engine and writes its result table
    Run(RunArgs),
    /// Combines the results of all three engines
    Compare {
        /// Folder with the three result files
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Significance level applied to every engine
        #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE)]
        significance: f64,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Enrichment engine
    #[arg(short, long, value_enum)]
    engine: EngineChoice,

    /// CSV file with the significant genes
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Column of the input file with the gene identifiers
    #[arg(long)]
    column: Option<String>,

    /// Output folder
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// CSV file with the background genes, all annotated genes by default
    #[arg(long)]
    background: Option<PathBuf>,

    /// Column of the background file, defaults to --column
    #[arg(long)]
    background_column: Option<String>,

    /// GO aspect: BP, MF, CC or all
    #[arg(long)]
    aspect: Option<String>,

    /// Only report terms with a (corrected) p-value at or below
    #[arg(long)]
    threshold: Option<f64>,

    /// Multiple testing correction: none, bonferroni, holm, BH, BY or g_SCS
    #[arg(long)]
    correction: Option<String>,

    /// GO ontology in OBO format
    #[arg(long)]
    obo: Option<PathBuf>,

    /// NCBI gene2go file, optionally gzipped
    #[arg(long)]
    gene2go: Option<PathBuf>,

    /// NCBI gene2ensembl file, optionally gzipped
    #[arg(long)]
    gene2ensembl: Option<PathBuf>,

    /// NCBI taxonomy ID
    #[arg(long)]
    taxon: Option<u32>,

    /// g:Profiler organism code
    #[arg(long)]
    organism: Option<String>,

    /// Identifier mapping backend
    #[arg(long, value_enum)]
    mapper: Option<MapperChoice>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EngineChoice {
    /// Classic Fisher test, no correction
    Topgo,
    /// Hypergeometric test, Benjamini-Hochberg corrected
    Clusterprofiler,
    /// g:Profiler web service, g:SCS corrected
    Gprofiler,
}

impl EngineChoice {
    fn test(self) -> TestKind {
        match self {
            EngineChoice::Topgo => TestKind::ClassicFisher,
            EngineChoice::Clusterprofiler => TestKind::Hypergeometric,
            EngineChoice::Gprofiler => TestKind::GProfiler,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MapperChoice {
    /// Lookup table built from gene2ensembl
    Offline,
    /// g:Convert web service
    Gconvert,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogLevel::from_verbose(cli.verbose)) {
        eprintln!("{err}");
    }

    if let Err(err) = execute(&cli) {
        error!("{err:#}");
        process::exit(1);
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    match &cli.command {
        Commands::Run(args) => run(args, settings),
        Commands::Compare {
            results_dir,
            significance,
        } => {
            let dir = results_dir.clone().unwrap_or(settings.results_dir);
            compare(dir, *significance)
        }
    }
}

fn apply_overrides(args: &RunArgs, settings: &mut Settings) {
    if let Some(input) = &args.input {
        settings.input = input.clone();
    }
    if let Some(column) = &args.column {
        settings.column = column.clone();
    }
    if let Some(background) = &args.background {
        settings.background = Some(background.clone());
    }
    if let Some(column) = &args.background_column {
        settings.background_column = Some(column.clone());
    }
    if let Some(dir) = &args.results_dir {
        settings.results_dir = dir.clone();
    }
    if let Some(obo) = &args.obo {
        settings.obo = obo.clone();
    }
    if let Some(gene2go) = &args.gene2go {
        settings.gene2go = gene2go.clone();
    }
    if let Some(gene2ensembl) = &args.gene2ensembl {
        settings.gene2ensembl = gene2ensembl.clone();
    }
    if let Some(taxon) = args.taxon {
        settings.taxon = taxon;
    }
    if let Some(organism) = &args.organism {
        settings.organism = organism.clone();
    }
    if let Some(aspect) = &args.aspect {
        settings.enrichment.aspect = Some(aspect.clone());
    }
    if let Some(threshold) = args.threshold {
        settings.enrichment.threshold = Some(threshold);
    }
    if let Some(correction) = &args.correction {
        settings.enrichment.correction = Some(correction.clone());
    }
}

fn load_ontology(settings: &Settings) -> Result<Ontology> {
    let ontology = Ontology::from_standard(&settings.obo, &settings.gene2go, settings.taxon)
        .with_context(|| {
            format!(
                "Failed to load the ontology from {} and {}",
                settings.obo.display(),
                settings.gene2go.display()
            )
        })?;
    info!(
        "Loaded {} GO terms ({})",
        ontology.len(),
        ontology.version()
    );
    Ok(ontology)
}

fn run(args: &RunArgs, mut settings: Settings) -> Result<()> {
    apply_overrides(args, &mut settings);
    let config = settings.enrichment_configuration(args.engine.test())?;

    let mapper_choice = match args.mapper {
        Some(choice) => choice,
        None => MapperChoice::from_str(&settings.mapper, true)
            .map_err(|err| anyhow::anyhow!("Invalid mapper `{}`: {err}", settings.mapper))?,
    };
    let mapper: Box<dyn IdentifierMapper> = match mapper_choice {
        MapperChoice::Offline => Box::new(
            OfflineMapper::from_gene2ensembl(&settings.gene2ensembl, settings.taxon)
                .with_context(|| {
                    format!("Failed to load {}", settings.gene2ensembl.display())
                })?,
        ),
        MapperChoice::Gconvert => Box::new(GConvertMapper::new(
            &settings.gprofiler_url,
            &settings.organism,
            settings.http_timeout(),
        )?),
    };

    let ontology: Ontology;
    let engine: Box<dyn EnrichmentEngine + '_> = match args.engine {
        EngineChoice::Topgo => {
            ontology = load_ontology(&settings)?;
            Box::new(ClassicFisherEngine::new(&ontology))
        }
        EngineChoice::Clusterprofiler => {
            ontology = load_ontology(&settings)?;
            Box::new(HypergeometricEngine::new(&ontology))
        }
        EngineChoice::Gprofiler => Box::new(GProfilerEngine::new(
            &settings.gprofiler_url,
            settings.http_timeout(),
        )?),
    };

    let mut pipeline = Pipeline::new(mapper.as_ref(), engine.as_ref(), config);
    if let Some(background) = settings
        .background()
        .context("Failed to load the background genes")?
    {
        pipeline = pipeline.with_background(background);
    }
    let report = pipeline
        .run(&settings.input, &settings.column, &settings.results_dir)
        .with_context(|| format!("{} enrichment failed", engine.name()))?;

    println!("{}", preview_table(report.table.preview(PREVIEW_ROWS)));
    println!(
        "Wrote {} rows to {}",
        report.written.rows,
        report.written.path.display()
    );
    Ok(())
}

fn format_pvalue(value: Option<f64>) -> String {
    value.map(|p| format!("{p:.3e}")).unwrap_or_default()
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

fn preview_table(rows: &[EnrichmentResultRow]) -> Table {
    let mut table = new_table(vec![
        "term_id",
        "term_name",
        "pvalue",
        "p_adjust",
        "intersection_size",
    ]);
    for row in rows {
        table.add_row(vec![
            row.term_id.clone(),
            row.term_name.clone(),
            format_pvalue(row.pvalue),
            format_pvalue(row.p_adjust),
            row.intersection_size
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ]);
    }
    table
}

fn comparison_table(rows: &[&ComparisonRow]) -> Table {
    let mut table = new_table(vec![
        "term_id",
        "term_name",
        "significant",
        "clusterProfiler",
        "gprofiler2",
        "topGO",
    ]);
    for row in rows {
        let mut cells = vec![
            row.term_id.clone(),
            row.term_name.clone(),
            format!("{}/{}", row.methods_significant, row.methods_total),
        ];
        cells.extend(
            Method::ALL
                .iter()
                .map(|method| format_pvalue(row.pvalue_of(*method))),
        );
        table.add_row(cells);
    }
    table
}

fn print_summary(table: &ComparisonTable) {
    let summary = table.summary();
    println!("Terms found by 3 methods: {}", summary.found_by[3]);
    println!("Terms found by 2 methods: {}", summary.found_by[2]);
    println!("Terms found by 1 method: {}", summary.found_by[1]);
    for n in (0..=3).rev() {
        println!("Significant in {n} methods: {}", summary.significant_in[n]);
    }

    let consensus = table.consensus(10);
    if !consensus.is_empty() {
        println!("\nTop consensus terms (significant in at least 2 methods):");
        println!("{}", comparison_table(&consensus));
    }
    for method in Method::ALL {
        let specific = table.specific_to(method, 5);
        if !specific.is_empty() {
            println!("\nSignificant only in {}:", method.engine_name());
            println!("{}", comparison_table(&specific));
        }
    }
}

fn compare(results_dir: PathBuf, significance: f64) -> Result<()> {
    let inputs = ComparisonInputs::from_results_dir(&results_dir);
    let table = compare_results(&inputs, significance).with_context(|| {
        format!(
            "The result files of all three engines are required in {}",
            results_dir.display()
        )
    })?;
    let report = table.write(&results_dir)?;
    print_summary(&table);
    println!(
        "Wrote {} rows to {}",
        report.rows,
        report.path.display()
    );
    Ok(())
}
