use std::path::PathBuf;

use goenrich::compare::{compare_results, ComparisonInputs, DEFAULT_SIGNIFICANCE};
use goenrich::config::{EnrichmentConfiguration, TestKind};
use goenrich::engine::{
    ClassicFisherEngine, EnrichmentEngine, GostRecord, HypergeometricEngine, RawResult,
};
use goenrich::mapping::{IdNamespace, IdentifierMapper, OfflineMapper};
use goenrich::normalize::normalize;
use goenrich::pipeline::{result_file_name, Pipeline};
use goenrich::writer::{read_table, write_table};
use goenrich::{Aspect, AspectScope, GoError, Ontology};

fn data(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(file)
}

fn ontology() -> Ontology {
    Ontology::from_standard(data("mini.obo"), data("gene2go.txt"), 9606).unwrap()
}

fn mapper() -> OfflineMapper {
    OfflineMapper::from_gene2ensembl(data("gene2ensembl.txt"), 9606).unwrap()
}

#[test]
fn reference_data() {
    let ont = ontology();
    // obsolete term is skipped
    assert_eq!(ont.len(), 6);
    assert_eq!(ont.version(), "releases/2024-01-17");

    let bp = ont.annotated_genes(AspectScope::Single(Aspect::BiologicalProcess));
    assert_eq!(bp.len(), 16);

    let apoptosis = ont.term(6915u32).unwrap();
    assert_eq!(apoptosis.name(), "apoptotic process");

    // mouse genes and missing Ensembl IDs are not part of the table
    let mapper = mapper();
    assert_eq!(mapper.len(), 21);
}

#[test]
fn offline_mapping_drops_unknown_genes() {
    let ids = vec![
        "ENSG00000000001.5".to_string(),
        "ENSG00000099999".to_string(),
    ];
    let mapping = mapper()
        .map_identifiers(&ids, IdNamespace::Entrez)
        .unwrap();
    assert_eq!(mapping.mapped_targets(), ["1"]);
    assert_eq!(mapping.unmapped().collect::<Vec<_>>(), ["ENSG00000099999"]);
}

#[test]
fn classic_fisher_run() {
    let ont = ontology();
    let mapper = mapper();
    let engine = ClassicFisherEngine::new(&ont);
    let dir = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(
        &mapper,
        &engine,
        EnrichmentConfiguration::for_test(TestKind::ClassicFisher),
    );
    let report = pipeline
        .run(data("significant_genes.csv"), "gene", dir.path().join("results"))
        .unwrap();

    assert_eq!(report.input_size, 5);
    assert_eq!(report.mapped_size, 4);
    // all four BP terms are reported
    assert_eq!(report.written.rows, 4);
    assert!(report
        .written
        .path
        .ends_with("results/topGO_enrichment_results.csv"));

    let best = &report.table.rows()[0];
    assert_eq!(best.term_id, "GO:0097190");
    assert_eq!(best.intersection, "1;2;3");
    assert_eq!(best.term_size, Some(3));
    // P(X >= 3), N = 16, K = 3, n = 4
    assert!((best.pvalue.unwrap() - 13.0 / 1820.0).abs() < 1e-9);
    assert!(best.p_adjust.is_none());

    let written = read_table(&report.written.path).unwrap();
    assert_eq!(written, report.table);
}

#[test]
fn hypergeometric_run() {
    let ont = ontology();
    let mapper = mapper();
    let engine = HypergeometricEngine::new(&ont);
    let dir = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(
        &mapper,
        &engine,
        EnrichmentConfiguration::for_test(TestKind::Hypergeometric),
    );
    let report = pipeline
        .run(data("significant_genes.csv"), "gene", dir.path())
        .unwrap();

    // only the root and GO:0006954 have at least 10 genes
    assert_eq!(report.written.rows, 2);
    for row in report.table.iter() {
        assert!(row.p_adjust.unwrap() >= row.pvalue.unwrap());
        assert_eq!(row.aspect, "BP");
    }
}

#[test]
fn missing_input_writes_nothing() {
    let ont = ontology();
    let mapper = mapper();
    let engine = ClassicFisherEngine::new(&ont);
    let dir = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(
        &mapper,
        &engine,
        EnrichmentConfiguration::for_test(TestKind::ClassicFisher),
    );
    let res = pipeline.run(data("does_not_exist.csv"), "gene", dir.path());
    assert!(matches!(res, Err(GoError::FileNotFound(_))));
    assert!(!pipeline.output_path(dir.path()).exists());
}

fn gost(native: &str, source: &str, p_value: f64) -> GostRecord {
    GostRecord {
        native: native.to_string(),
        name: String::new(),
        source: source.to_string(),
        p_value,
        significant: p_value < 0.05,
        term_size: 6,
        query_size: 4,
        intersection_size: 3,
        effective_domain_size: 16,
        precision: 0.75,
        recall: 0.5,
        parents: vec!["GO:0008150".to_string()],
        intersections: vec!["1".to_string(), "2".to_string(), "3".to_string()],
    }
}

#[test]
fn compare_all_engines() {
    let ont = ontology();
    let mapper = mapper();
    let dir = tempfile::tempdir().unwrap();

    let classic = ClassicFisherEngine::new(&ont);
    let hypergeometric = HypergeometricEngine::new(&ont);
    let engines: [(&dyn EnrichmentEngine, TestKind); 2] = [
        (&classic, TestKind::ClassicFisher),
        (&hypergeometric, TestKind::Hypergeometric),
    ];
    for (engine, test) in engines {
        Pipeline::new(&mapper, engine, EnrichmentConfiguration::for_test(test))
            .run(data("significant_genes.csv"), "gene", dir.path())
            .unwrap();
    }

    let inputs = ComparisonInputs::from_results_dir(dir.path());
    assert!(matches!(
        compare_results(&inputs, DEFAULT_SIGNIFICANCE),
        Err(GoError::FileNotFound(_))
    ));

    let web = normalize(RawResult::GProfiler(vec![
        gost("GO:0097190", "GO:BP", 0.001),
        gost("GO:0006915", "GO:BP", 0.03),
        gost("GO:0003674", "GO:MF", 0.0001),
    ]));
    write_table(&web, dir.path(), &result_file_name("gprofiler2")).unwrap();

    let table = compare_results(&inputs, DEFAULT_SIGNIFICANCE).unwrap();
    assert_eq!(table.len(), 4);

    let first = &table.rows()[0];
    assert_eq!(first.term_id, "GO:0097190");
    assert_eq!(first.term_name, "apoptotic signaling pathway");
    assert_eq!(first.methods_significant, 2);
    assert_eq!(first.methods_total, 2);
    assert_eq!(first.clusterprofiler_significant, None);

    let second = &table.rows()[1];
    assert_eq!(second.term_id, "GO:0006915");
    assert_eq!(second.methods_significant, 1);

    let summary = table.summary();
    assert_eq!(summary.found_by, [0, 0, 4, 0]);
    assert_eq!(summary.significant_in, [2, 1, 1, 0]);

    let report = table.write(dir.path()).unwrap();
    assert_eq!(report.rows, 4);
    assert!(report
        .path
        .ends_with("enrichment_methods_comparison_table.csv"));
}
