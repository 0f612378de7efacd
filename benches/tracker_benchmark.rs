//! Benchmark for range tracking under edits.
//!
//! Every change walks the file's whole range list and resolves positions
//! against the mirrored text, so cost grows with both.

use std::path::Path;

use celltrack::CellRangeTracker;
use celltrack::shadow::{EditorChange, FREE_INPUT_ID, ShadowDocument};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tower_lsp_server::ls_types::{Position, Range, TextDocumentContentChangeEvent};

/// Generate a script of N two-line cells.
fn generate_script(num_cells: usize) -> String {
    let mut doc = String::with_capacity(num_cells * 32);
    for i in 0..num_cells {
        doc.push_str(&format!("# %%\nvalue_{} = {}\n", i, i));
    }
    doc
}

fn tracker_with_cells(num_cells: usize) -> CellRangeTracker {
    let file = Path::new("/bench/script.py");
    let doc = generate_script(num_cells);
    let mut tracker = CellRangeTracker::new();
    tracker.did_open(file, doc);
    for i in 0..num_cells {
        let code = format!("# %%\nvalue_{} = {}", i, i);
        tracker.record_fragment(file, (i * 2) as u32, &code, i as u32 + 1);
    }
    tracker
}

fn insert_at_top() -> TextDocumentContentChangeEvent {
    TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(0, 0), Position::new(0, 0))),
        range_length: None,
        text: "# comment\n".to_string(),
    }
}

fn benchmark_change_walk(c: &mut Criterion) {
    let file = Path::new("/bench/script.py");
    let mut group = c.benchmark_group("change_walk");

    for num_cells in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("insert_above_all", num_cells),
            num_cells,
            |b, &num_cells| {
                b.iter_batched(
                    || tracker_with_cells(num_cells),
                    |mut tracker| {
                        tracker.on_document_changed(file, &insert_at_top());
                        tracker
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn benchmark_shadow_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("shadow_typing");
    group.sample_size(20);

    group.bench_function("100_cells_then_type", |b| {
        b.iter(|| {
            let mut document =
                ShadowDocument::from_path(Path::new("/bench/interactive.py")).unwrap();
            for i in 0..100 {
                document.add_fragment(&format!("value_{} = {}", i, i), &i.to_string());
            }
            for column in 1..=20 {
                document.edit_free_input(&[EditorChange::insert(1, column, "x")], FREE_INPUT_ID);
            }
            document
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_change_walk, benchmark_shadow_typing);
criterion_main!(benches);
