//! Recommendation Parsing Benchmark (Criterion)
//!
//! Measures the text post-processing applied to model responses: usage
//! extraction and recommendation list parsing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ecosync::budget::{BudgetCalculator, RecommendationParser, UsageExtractor};

/// Numbered list with bold headings and wrapped lines.
fn numbered_response(items: usize) -> String {
    (1..=items)
        .map(|i| {
            format!(
                "{}. **Tip {}**: Replace older appliances in room {} with efficient models\n   \
                 that use less standby power.",
                i, i, i
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prose with no list markers, forcing the sentence fallback.
fn prose_response(sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("Consider shifting laundry load number {} to off-peak hours", i))
        .collect::<Vec<_>>()
        .join(". ")
}

fn benchmark_recommendation_parsing(c: &mut Criterion) {
    let parser = RecommendationParser::new();
    let mut group = c.benchmark_group("recommendation_parsing");

    for items in [3, 7, 20].iter() {
        let numbered = numbered_response(*items);
        group.bench_with_input(BenchmarkId::new("numbered", items), &numbered, |b, text| {
            b.iter(|| parser.parse(std::hint::black_box(text)));
        });

        let prose = prose_response(*items);
        group.bench_with_input(BenchmarkId::new("prose", items), &prose, |b, text| {
            b.iter(|| parser.parse(std::hint::black_box(text)));
        });
    }

    group.finish();
}

fn benchmark_usage_extraction(c: &mut Criterion) {
    let extractor = UsageExtractor::new();
    let inputs = vec![
        ("plain", "245.7"),
        ("labelled", "Your total usage this month was 1,245.7 kWh"),
        ("no_number", "I could not find a usage figure on this bill."),
    ];

    let mut group = c.benchmark_group("usage_extraction");
    for (name, input) in inputs {
        group.bench_with_input(BenchmarkId::new("input", name), &input, |b, text| {
            b.iter(|| extractor.extract(std::hint::black_box(text)));
        });
    }
    group.finish();
}

fn benchmark_budget(c: &mut Criterion) {
    let calculator = BudgetCalculator::new();
    c.bench_function("compute_budget", |b| {
        b.iter(|| calculator.compute_budget(std::hint::black_box(245.7), std::hint::black_box(20)))
    });
}

criterion_group!(
    benches,
    benchmark_recommendation_parsing,
    benchmark_usage_extraction,
    benchmark_budget
);

criterion_main!(benches);
