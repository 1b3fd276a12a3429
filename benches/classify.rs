//! Classification benchmarks
//!
//! Measures the per-call cost of name classification and descriptor parsing,
//! both of which run on every by-name dispatch.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jni_bridge::{method_descriptor, MethodSignature, TypeTag};

fn bench_class_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_class_name");

    for name in ["int", "double", "java.lang.String", "[Ljava.lang.Object;", "com.example.deeply.nested.Outer$Inner"] {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| black_box(TypeTag::from_class_name(black_box(name))));
        });
    }

    group.finish();
}

fn bench_primitive_codes(c: &mut Criterion) {
    c.bench_function("from_primitive_code", |b| {
        b.iter(|| {
            for code in ['V', 'Z', 'B', 'C', 'S', 'I', 'J', 'F', 'D', 'L', '[', '?'] {
                black_box(TypeTag::from_primitive_code(black_box(code)));
            }
        });
    });
}

fn bench_descriptors(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptors");

    for descriptor in ["()V", "(I)Z", "(ILjava/lang/String;[JD)Ljava/lang/Object;"] {
        group.bench_with_input(BenchmarkId::new("parse", descriptor), descriptor, |b, d| {
            b.iter(|| black_box(MethodSignature::parse(black_box(d))));
        });
    }

    group.bench_function("build", |b| {
        b.iter(|| black_box(method_descriptor(black_box(&["int", "java.lang.String", "[J"]), "boolean")));
    });

    group.finish();
}

criterion_group!(benches, bench_class_names, bench_primitive_codes, bench_descriptors);
criterion_main!(benches);
