//! Performance benchmarks for invoice-kit
//!
//! This benchmark suite measures:
//! - Draft validation and wire payload transformation across line counts
//! - JSON encoding of the request envelope
//! - A full create submission against the in-memory API
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use chrono::NaiveDate;
use invoice_kit::payload::draft_from_invoice;
use invoice_kit::{
    to_wire_payload, Customer, EditorConfig, InMemoryInvoiceApi, Invoice, InvoiceDraft,
    InvoiceEditor, InvoiceLineRecord, Product, Quantity, SubmitMode, Unit,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

// ============================================================================
// Benchmark Fixtures
// ============================================================================

fn bench_customer() -> Customer {
    Customer {
        id: 6773,
        first_name: "Jean".to_string(),
        last_name: "Dupont".to_string(),
        ..Default::default()
    }
}

/// Persisted invoice with `lines` lines.
fn bench_invoice(lines: usize) -> Invoice {
    Invoice {
        id: 1,
        customer_id: Some(6773),
        customer: Some(bench_customer()),
        finalized: false,
        paid: false,
        date: Some("2021-02-03".to_string()),
        deadline: Some("2021-03-03".to_string()),
        total: None,
        tax: None,
        invoice_lines: (0..lines)
            .map(|i| InvoiceLineRecord {
                id: Some(i as u64),
                invoice_id: Some(1),
                product_id: 67 + i as u64,
                product: None,
                quantity: Some(Quantity::from(1 + i as u32)),
                label: Some(format!("Line {}", i)),
                unit: Some(Unit::Hour),
                vat_rate: None,
                price: Some("120.00".into()),
                tax: None,
            })
            .collect(),
    }
}

fn bench_draft(lines: usize) -> InvoiceDraft {
    let mut draft = draft_from_invoice(
        &bench_invoice(lines),
        Some(bench_customer()),
        Some(Quantity::from(1u32)),
    );
    draft.date = NaiveDate::from_ymd_opt(2025, 6, 8);
    draft
}

// ============================================================================
// Group 1: Transformer Benchmarks
// ============================================================================

fn transformer_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload");

    for lines in [1usize, 10, 100, 1_000].iter() {
        let draft = bench_draft(*lines);

        group
            .throughput(Throughput::Elements(*lines as u64))
            .bench_with_input(BenchmarkId::new("validate", lines), &draft, |b, draft| {
                b.iter(|| black_box(draft).validate())
            });

        group
            .throughput(Throughput::Elements(*lines as u64))
            .bench_with_input(BenchmarkId::new("to_wire", lines), &draft, |b, draft| {
                b.iter(|| to_wire_payload(black_box(draft)).expect("Failed to transform"))
            });

        let payload = to_wire_payload(&draft).expect("Failed to transform");
        group
            .throughput(Throughput::Elements(*lines as u64))
            .bench_with_input(BenchmarkId::new("envelope_json", lines), &payload, |b, payload| {
                b.iter(|| {
                    serde_json::to_vec(&black_box(payload).clone().into_envelope(Some(1)))
                        .expect("Failed to encode")
                })
            });
    }

    group.bench_function("hydrate_100", |b| {
        let invoice = bench_invoice(100);
        b.iter(|| draft_from_invoice(black_box(&invoice), Some(bench_customer()), None))
    });

    group.finish();
}

// ============================================================================
// Group 2: Editor Benchmarks
// ============================================================================

fn editor_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("editor");

    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    group.bench_function("submit_create", |b| {
        let api = InMemoryInvoiceApi::new();

        b.to_async(&rt).iter(|| async {
            let mut editor = InvoiceEditor::new(EditorConfig::default());
            let row = editor.draft().lines.as_slice()[0].row();
            editor
                .set_customer(Some(bench_customer()))
                .expect("Failed to set customer");
            editor
                .set_product(row, Some(Product::reference(67)))
                .expect("Failed to set product");
            editor
                .submit(black_box(&api), SubmitMode::Draft)
                .await
                .expect("Failed to submit")
        });
    });

    group.bench_function("append_remove", |b| {
        let mut editor = InvoiceEditor::new(EditorConfig::default());

        b.iter(|| {
            editor.append_line().expect("Failed to append");
            black_box(editor.remove_line(1))
        });
    });

    group.finish();
}

criterion_group!(benches, transformer_benchmarks, editor_benchmarks);
criterion_main!(benches);
