//! Instrumentation Benchmark
//!
//! Measures instrumenter and type applier throughput (bytes/sec).

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use typewiz::{
    ApplyTypesOptions, FileTypeInfo, InstrumentOptions, SiteInfo, SiteOptions, TypeDescriptor,
    apply_types_to_file, content_hash, instrument,
};

// =============================================================================
// Test Sources
// =============================================================================

const SIMPLE_SOURCE: &str = r#"
function add(a, b) {
    return a + b;
}

const result = add(1, 2);
console.log(result);
"#;

const MEDIUM_SOURCE: &str = r#"
class UserService {
    users;
    lastId;

    addUser(user) {
        this.users.push(user);
        this.lastId = user.id;
    }

    getUser(id) {
        return this.users.find(u => u.id === id);
    }

    rename(id, name, notify?) {
        const user = this.getUser(id);
        user.name = name;
        if (notify) {
            notify(user);
        }
    }
}

const service = new UserService();
service.addUser({ id: 1, name: "Alice" });
service.rename(1, "Alicia", user => console.log(user.name));
"#;

/// Repeats a block of untyped functions to produce a larger file.
fn generate_large_source(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            "function handler{i}(request, response, next?) {{\n    \
             const body = request.body;\n    \
             return items.map(item => item + body).filter((x, index) => x !== index);\n}}\n\n"
        ));
    }
    source
}

/// Synthetic observations: one `number` at every untyped parameter end.
fn observations(source: &str) -> FileTypeInfo {
    let mut info = FileTypeInfo::new(content_hash(source));
    for (offset, _) in source.match_indices(|c: char| c == ',' || c == ')') {
        let before = source[..offset].trim_end();
        if before.ends_with(|c: char| c.is_ascii_alphanumeric()) {
            info.sites.insert(
                before.len() as u32,
                SiteInfo {
                    types: vec![TypeDescriptor::Name("number".to_string())],
                    options: SiteOptions::default(),
                },
            );
        }
    }
    info
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_instrument(c: &mut Criterion) {
    let mut group = c.benchmark_group("instrument");
    let large = generate_large_source(200);
    let options = InstrumentOptions {
        instrument_call_expressions: true,
        ..InstrumentOptions::default()
    };

    for (name, source) in [
        ("simple", SIMPLE_SOURCE),
        ("medium", MEDIUM_SOURCE),
        ("large", large.as_str()),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| instrument(black_box(source), "bench.ts", &options));
        });
    }
    group.finish();
}

fn bench_apply_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_types");
    let large = generate_large_source(200);
    let options = ApplyTypesOptions::default();

    for (name, source) in [("medium", MEDIUM_SOURCE), ("large", large.as_str())] {
        let info = observations(source);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| apply_types_to_file(black_box(source), &info, &options, None));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_instrument, bench_apply_types);
criterion_main!(benches);
