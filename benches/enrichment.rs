use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use goenrich::config::{EnrichmentConfiguration, TestKind};
use goenrich::engine::{ClassicFisherEngine, EnrichmentEngine, HypergeometricEngine};
use goenrich::normalize::normalize;
use goenrich::{Aspect, Ontology};

const TERMS: u32 = 2_000;
const GENES: u32 = 15_000;

/// A binary tree of BP terms, each gene is annotated to one leaf-ish term
fn synthetic_ontology() -> Ontology {
    let mut ont = Ontology::default();
    for id in 1..=TERMS {
        ont.insert_term(format!("process {id}"), id);
        ont.set_aspect(id, Aspect::BiologicalProcess)
            .expect("term was just inserted");
    }
    for id in 2..=TERMS {
        ont.add_parent(id / 2, id);
    }
    ont.create_cache();

    for gene in 1..=GENES {
        let gene_id = ont
            .add_gene(&gene.to_string())
            .expect("gene IDs are numeric");
        let term = TERMS / 2 + gene % (TERMS / 2);
        ont.link_gene_term(term, gene_id)
            .expect("term is part of the ontology");
    }
    ont
}

fn query() -> Vec<String> {
    (1..=GENES).step_by(37).map(|gene| gene.to_string()).collect()
}

fn enrichment_benchmark(c: &mut Criterion) {
    let ont = synthetic_ontology();
    let query = query();

    let classic = ClassicFisherEngine::new(&ont);
    let config = EnrichmentConfiguration::for_test(TestKind::ClassicFisher);
    c.bench_function("classic fisher", |b| {
        b.iter(|| {
            classic
                .run_enrichment(black_box(&query), &config)
                .expect("valid configuration")
                .len()
        })
    });

    let hypergeometric = HypergeometricEngine::new(&ont);
    let config = EnrichmentConfiguration::for_test(TestKind::Hypergeometric);
    c.bench_function("hypergeometric + normalize", |b| {
        b.iter(|| {
            let raw = hypergeometric
                .run_enrichment(black_box(&query), &config)
                .expect("valid configuration");
            normalize(raw).len()
        })
    });
}

criterion_group! {
    name = enrichment;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = enrichment_benchmark
}
criterion_main!(enrichment);
