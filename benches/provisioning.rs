use chrono::{Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use expense_tracker_core::core::services::{BudgetService, ProvisionContext, SummaryService};
use expense_tracker_core::domain::{
    default_categories, BudgetRecord, BudgetTemplate, Category, Expense, ExpenseDraft, Month,
};
use expense_tracker_core::storage::{load_budgets, save_budgets, MemoryStore};
use expense_tracker_core::FixedClock;

fn build_year(categories: &[Category]) -> (Vec<BudgetRecord>, Vec<Expense>) {
    let start = Month::new(2024, 1).expect("month");
    let now = Utc::now();
    let mut records = Vec::new();
    for offset in 0..12 {
        let month = start.shift(offset).expect("month in range");
        for category in categories {
            let mut record = BudgetRecord::new(category.id.clone(), month, 400.0, now);
            record.rollover = offset % 2 == 0;
            records.push(record);
        }
    }

    let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let expenses = (0..5_000)
        .map(|idx| {
            let category = &categories[idx % categories.len()];
            let draft = ExpenseDraft::new(
                5.0 + (idx % 90) as f64,
                category.id.clone(),
                first + Duration::days((idx % 366) as i64),
            );
            Expense::from_draft(draft, now)
        })
        .collect();
    (records, expenses)
}

fn bench_provisioning(c: &mut Criterion) {
    let categories = default_categories();
    let template = BudgetTemplate::suggested();
    let (records, expenses) = build_year(&categories);
    let ctx = ProvisionContext {
        categories: &categories,
        template: &template,
        now: Utc::now(),
    };
    let target = Month::new(2025, 1).expect("month");

    c.bench_function("provision_with_rollover", |b| {
        b.iter_batched(
            || records.clone(),
            |records| {
                let report = BudgetService::provision_month(records, target, true, &expenses, &ctx);
                black_box(report);
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("provision_existing_month", |b| {
        b.iter_batched(
            || records.clone(),
            |records| {
                let report = BudgetService::provision_month(
                    records,
                    Month::new(2024, 6).expect("month"),
                    true,
                    &expenses,
                    &ctx,
                );
                black_box(report);
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("history_twelve_months", |b| {
        b.iter(|| {
            let history =
                SummaryService::history(&records, &expenses, &categories, &target.previous().expect("month"), 12);
            black_box(history);
        })
    });
}

fn bench_loader(c: &mut Criterion) {
    let categories = default_categories();
    let (records, _) = build_year(&categories);
    let store = MemoryStore::new();
    save_budgets(&store, &records).expect("seed budgets");
    let clock = FixedClock::at_date(2024, 12, 15);
    let template = BudgetTemplate::zero();

    c.bench_function("load_budgets_year", |b| {
        b.iter(|| {
            let report = load_budgets(&store, &clock, &categories, &template);
            black_box(report);
        })
    });
}

criterion_group!(benches, bench_provisioning, bench_loader);
criterion_main!(benches);
