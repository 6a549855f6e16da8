use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use overlong::resolve::resolve_units;
use overlong::{compute_highlights, long_sentences, segment, Settings};

const SHORT_NOTE: &str = "This is short. This is a very long sentence that is far beyond the limit of the 10 words that commonly people want to read. Is this a question? What a surprise! and a trailing fragment";

// Synthetic note: paragraphs of mixed sentence lengths with headings and lists
// WHY: Editor notes are what recomputes run over, not prose-only corpora
fn build_note(paragraphs: usize) -> String {
    let mut note = String::new();
    for i in 0..paragraphs {
        note.push_str(&format!("## Section {i}\n\n"));
        note.push_str("A short opener. ");
        note.push_str("Then a sentence that rambles on through clause after clause without ever quite getting to the point it set out to make! ");
        note.push_str("Really? Yes.\n\n");
        note.push_str("- first item\n- second item that is rather longer than the others and runs past the limit\n\n");
    }
    note
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");
    for paragraphs in [10, 100, 1000] {
        let note = build_note(paragraphs);
        group.throughput(Throughput::Bytes(note.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &note, |b, note| {
            b.iter(|| segment(black_box(note)))
        });
    }
    group.finish();
}

fn bench_compute_highlights(c: &mut Criterion) {
    let settings = Settings {
        max_words: 10,
        ..Default::default()
    };

    c.bench_function("compute_highlights_short_note", |b| {
        b.iter(|| compute_highlights(black_box(SHORT_NOTE), &settings))
    });

    let mut group = c.benchmark_group("compute_highlights");
    for paragraphs in [10, 100, 1000] {
        let note = build_note(paragraphs);
        group.throughput(Throughput::Bytes(note.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &note, |b, note| {
            b.iter(|| compute_highlights(black_box(note), &settings))
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let note = build_note(1000);
    let units = long_sentences(&note, 10);
    c.bench_function("resolve_units_1000", |b| {
        b.iter(|| resolve_units(black_box(&note), black_box(&units)))
    });
}

criterion_group!(benches, bench_segment, bench_compute_highlights, bench_resolve);
criterion_main!(benches);
