// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;

use pagewalk::dom::parse_html;
use pagewalk::filters::{clean_text, CleanDecimal, CleanText, Date, FilterExt, Table, TableCell};

fn statement(rows: usize) -> String {
    let mut html = String::from(
        "<table id=\"ops\"><thead><tr><th>Date</th><th>Libellé</th><th>Montant</th></tr></thead><tbody>",
    );
    for i in 0..rows {
        html.push_str(&format!(
            "<tr><td>{:02}/03/2024</td><td>  CARTE   X{}&nbsp;MONOPRIX </td><td>-1.{:03},{:02}&nbsp;€</td></tr>",
            i % 28 + 1,
            i,
            i % 1000,
            i % 100
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn parsing_benchmark(c: &mut Criterion) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let html = statement(200);

    c.bench_function("parse_statement_200", |b| {
        b.iter(|| parse_html(black_box(&html)).unwrap())
    });

    let doc = parse_html(&html).unwrap();
    c.bench_function("select_amount_cells", |b| {
        b.iter(|| black_box(doc.root().query("table#ops tbody tr > td:nth-child(3)").unwrap().len()))
    });
}

fn cleaning_benchmark(c: &mut Criterion) {
    let samples = ["  1\u{a0}234,56 €  ", "\tCARTE\n\n X123   MONOPRIX ", "-12,00"];
    let decimal = CleanDecimal::new(".");

    c.bench_function("clean_text", |b| {
        b.iter(|| {
            for s in &samples {
                black_box(clean_text(s));
            }
        })
    });

    c.bench_function("parse_decimal", |b| {
        b.iter(|| black_box(decimal.parse(black_box("-1.234,56 EUR")).unwrap()))
    });
}

fn table_benchmark(c: &mut Criterion) {
    let doc = parse_html(&statement(200)).unwrap();
    let root = doc.root();
    let table = Table::new("table#ops thead th", "table#ops tbody tr")
        .column("date", ["Date"])
        .column("amount", ["Montant"]);
    let date = Date::new(CleanText::new(TableCell::new(["date"]))).dayfirst();
    let amount = CleanDecimal::new(TableCell::new(["amount"]));

    c.bench_function("extract_statement_200", |b| {
        b.iter(|| {
            let mut total = Decimal::ZERO;
            for row in table.rows(&root).unwrap() {
                let ctx = row.context();
                let _: NaiveDate = date.extract(&ctx).unwrap();
                let value: Decimal = amount.extract(&ctx).unwrap();
                total += value;
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, parsing_benchmark, cleaning_benchmark, table_benchmark);
criterion_main!(benches);
