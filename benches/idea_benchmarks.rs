use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use idea_core::{finalize, parse, SchemaTree};

// ============================================================================
// Test Data: Varying Complexity and Size
// ============================================================================

const TINY_IDEA: &str = r#"enum Status { ACTIVE "Active" }"#;

const SMALL_IDEA: &str = r#"
enum Roles {
  ADMIN "Admin"
  USER "User"
}

model User {
  id String @id
  role Roles
}
"#;

const MEDIUM_IDEA: &str = r#"
use "./shared.idea"

plugin "./transform" {
  lang "ts"
  output "./src/types.ts"
}

prop Text { type "text" }
prop Number { type "number" min 0 }

enum Roles {
  ADMIN "Admin"
  MANAGER "Manager"
  USER "User"
}

type Address @label("Address" "Addresses") {
  street String
  city String
  country String?
}

model User! @label("User" "Users") {
  id String @id @default("nanoid(20)")
  name String @field.input(Text)
  age Integer @field.input(Number)
  role Roles @default("USER")
  addresses Address[]
  active Boolean @default(true)
}
"#;

// Generate a schema with many models for stress testing
fn generate_large_idea(models: usize) -> String {
    let mut idea = String::from("prop Text { type \"text\" }\n");
    for i in 0..models {
        idea.push_str(&format!(
            "model Entity{i} @label(\"Entity{i}\" \"Entities{i}\") {{\n  \
             id String @id\n  \
             name String @field.input(Text)\n  \
             rank Integer @default({i})\n  \
             tags String[]\n\
             }}\n"
        ));
    }
    idea
}

// ============================================================================
// Parse and Finalize Benchmarks
// ============================================================================

fn bench_parse_tiny(c: &mut Criterion) {
    c.bench_function("parse_tiny", |b| b.iter(|| parse(black_box(TINY_IDEA))));
}

fn bench_tree_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_by_size");

    for (name, source) in [
        ("tiny", TINY_IDEA),
        ("small", SMALL_IDEA),
        ("medium", MEDIUM_IDEA),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| SchemaTree::parse(black_box(src)))
        });
    }

    group.finish();
}

fn bench_parse_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_by_size");

    for (name, source) in [
        ("tiny", TINY_IDEA),
        ("small", SMALL_IDEA),
        ("medium", MEDIUM_IDEA),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| parse(black_box(src)))
        });
    }

    group.finish();
}

fn bench_finalize_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("finalize_model_scaling");

    for size in [10, 50, 100, 500] {
        let source = generate_large_idea(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| finalize(black_box(src)))
        });
    }

    group.finish();
}

fn bench_finalize_with_serialization(c: &mut Criterion) {
    c.bench_function("finalize_with_json_export", |b| {
        b.iter(|| {
            let config = finalize(black_box(MEDIUM_IDEA)).unwrap();
            config.to_json()
        })
    });
}

criterion_group!(
    benches,
    bench_parse_tiny,
    bench_tree_sizes,
    bench_parse_sizes,
    bench_finalize_scaling,
    bench_finalize_with_serialization
);

criterion_main!(benches);
