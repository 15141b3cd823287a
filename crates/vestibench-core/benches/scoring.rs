use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;

use vestibench_core::aggregate::admission_score;
use vestibench_core::model::{ProgramWeights, Subject};
use vestibench_core::statistics::{standardized_score, StandardizedScores, SubjectStats};

fn make_scores() -> StandardizedScores {
    let subjects: BTreeMap<Subject, f64> = Subject::ALL
        .iter()
        .enumerate()
        .map(|(i, &s)| (s, 450.0 + 25.0 * i as f64))
        .collect();
    StandardizedScores {
        subjects,
        essay: 650.0,
        language_combined: 575.0,
    }
}

fn make_weights() -> ProgramWeights {
    ProgramWeights {
        weights: [
            (Subject::Portuguese, 3.0),
            (Subject::Mathematics, 3.0),
            (Subject::Physics, 2.0),
            (Subject::Chemistry, 2.0),
            (Subject::ForeignLanguage, 1.0),
        ]
        .into_iter()
        .collect(),
    }
}

fn bench_standardize(c: &mut Criterion) {
    let mut stats = SubjectStats::new(15.0, 5.0);
    for correct in 0..=30 {
        stats.score_table.insert(correct, 400.0 + 10.0 * correct as f64);
    }

    c.bench_function("standardized_score_formula", |b| {
        b.iter(|| standardized_score(black_box(17.0), black_box(15.0), black_box(5.0)))
    });

    c.bench_function("standardized_score_table", |b| {
        b.iter(|| black_box(&stats).standardized(black_box(17)))
    });
}

fn bench_admission_score(c: &mut Criterion) {
    let scores = make_scores();
    let weights = make_weights();

    c.bench_function("admission_score", |b| {
        b.iter(|| admission_score(black_box(&scores), black_box(&weights)))
    });
}

criterion_group!(benches, bench_standardize, bench_admission_score);
criterion_main!(benches);
