use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use querycanvas::join::{join, JoinMode, JoinOperand};
use querycanvas::query::{BasicGraphPattern, Query, Resource, SerializeOptions, SparqlSerializer, Variable};
use querycanvas::rdf::NamespaceManager;

/// A chain query `?v0 p ?v1 . ?v1 p ?v2 ...` with every variable projected
fn chain_query(uri: &str, size: usize) -> Query {
    let mut query = Query::new(uri);
    let vars: Vec<_> = (0..=size)
        .map(|i| {
            let name = format!("v{}", i);
            let id = query
                .add_variable(Variable::new(format!("{};var={}", uri, name), name))
                .unwrap();
            query.project(id).unwrap();
            id
        })
        .collect();
    for pair in vars.windows(2) {
        query
            .push_clause(
                BasicGraphPattern::new(
                    pair[0].into(),
                    Resource::new("http://xmlns.com/foaf/0.1/knows").into(),
                    pair[1].into(),
                )
                .unwrap(),
            )
            .unwrap();
    }
    query
}

/// Benchmark SPARQL rendering of growing queries
fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let namespaces = NamespaceManager::new();
    let serializer = SparqlSerializer::new(&namespaces);
    let options = SerializeOptions::new().with_limit(100);

    for size in [10, 100, 1000].iter() {
        let query = chain_query("http://example.org/q/chain", *size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let text = serializer.serialize(&query, &options);
                criterion::black_box(text.len());
            });
        });
    }
    group.finish();
}

/// Benchmark joins where every right variable name collides
fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");

    for size in [10, 100, 1000].iter() {
        let left = chain_query("http://example.org/q/left", *size);
        let right = chain_query("http://example.org/q/right", *size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let (joined, _) = join(
                    JoinOperand::new(&left, "v0"),
                    JoinOperand::new(&right, "v0"),
                    JoinMode::Substitution,
                )
                .unwrap();
                criterion::black_box(joined.variable_count());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_serialize, bench_join);
criterion_main!(benches);
