use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use octofhir_cjson::{FunctionRegistry, SimpleEnvironment, eval, eval_as_list, eval_as_map};
use std::hint::black_box;

/// A configuration file with `entries` services in it
fn generate_config(entries: usize) -> String {
    let mut text = String::from("// generated\nversion: 1.0\n");
    for i in 0..entries {
        text.push_str(&format!(
            "service{i}: {{\n    host: \"host-{i}.example.com\"\n    port: {}\n    \
             enabled\n    tags: [alpha, beta, 'gamma']\n    /* weight */ ratio: 0.{i}\n}}\n",
            8000 + i
        ));
    }
    text
}

fn benchmark_single_values(c: &mut Criterion) {
    let expressions = [
        "42",
        "\"quoted \\u00e9 string with \\n escapes\"",
        "[1, 2, 3, 4, 5, 6, 7, 8]",
        "{a: 1, b: [true, null], c: {d: 'e'}}",
    ];

    for (i, expression) in expressions.into_iter().enumerate() {
        c.bench_function(&format!("expr_{i}_eval"), |b| {
            b.iter(|| black_box(eval(black_box(expression), &mut SimpleEnvironment, false, None)))
        });
    }
}

fn benchmark_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("documents");

    for entries in [10, 100, 1000] {
        let text = generate_config(entries);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("eval_as_map_{entries}"), |b| {
            b.iter(|| black_box(eval_as_map(black_box(&text), &mut SimpleEnvironment, false, None)))
        });
    }

    let list: String = (0..1000).map(|i| format!("{i}.5\n")).collect();
    group.throughput(Throughput::Bytes(list.len() as u64));
    group.bench_function("eval_as_list_numbers", |b| {
        b.iter(|| black_box(eval_as_list(black_box(&list), &mut SimpleEnvironment, false, None)))
    });

    group.finish();
}

fn benchmark_function_calls(c: &mut Criterion) {
    let mut registry = FunctionRegistry::with_standard_functions();
    registry.set_variable("domain", "example.com");
    let text: String = (0..100)
        .map(|i| format!("url{i}: concat('https://', host{i}, '.', getCustomVariable(domain))\n"))
        .collect();

    c.bench_function("function_calls", |b| {
        b.iter(|| black_box(eval_as_map(black_box(&text), &mut registry, false, None)))
    });
}

criterion_group!(
    benches,
    benchmark_single_values,
    benchmark_documents,
    benchmark_function_calls
);
criterion_main!(benches);
