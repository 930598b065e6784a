//! Benchmarks for contract instantiation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use datamold::prelude::*;
use datamold::testing::{person_document, person_map, person_tuple, Person};

fn registry_benchmark(c: &mut Criterion) {
    let registry = ContractRegistry::new();
    let _ = registry.get_or_create::<Person>();

    c.bench_function("registry_cached_lookup", |b| {
        b.iter(|| black_box(registry.get_or_create::<Person>()))
    });
}

fn factory_benchmark(c: &mut Criterion) {
    let factory = BuilderFactory::new();
    let map = person_map("Riccardo", "Marzi", "Male");
    let tuple = person_tuple("Riccardo", "Marzi", "Male");
    let document = person_document("Riccardo", "Marzi", "Male");

    c.bench_function("create_from_map", |b| {
        b.iter(|| black_box(factory.create::<Person>(&map)))
    });
    c.bench_function("create_from_tuple", |b| {
        b.iter(|| black_box(factory.create::<Person>(&tuple)))
    });
    c.bench_function("create_from_document", |b| {
        b.iter(|| black_box(factory.create::<Person>(&document)))
    });

    let schema = datamold::testing::person_schema();
    c.bench_function("create_dynamic_from_map", |b| {
        b.iter(|| black_box(factory.create_dynamic(&schema, &map)))
    });
}

criterion_group!(benches, registry_benchmark, factory_benchmark);
criterion_main!(benches);
