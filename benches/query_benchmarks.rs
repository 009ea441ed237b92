use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridstore::*;

fn seeded_grid(rows: usize) -> DataGrid {
    let mut grid = DataGrid::with_parts(
        Box::new(SequentialIdGenerator::new("row")),
        Box::new(FixedClock::default()),
    );
    grid.add_column("Name", ColumnKind::Text, Vec::new()).unwrap();
    grid.add_column("Age", ColumnKind::Number, Vec::new()).unwrap();
    grid.add_column("City", ColumnKind::Text, Vec::new()).unwrap();

    let cities = ["Lisbon", "Oslo", "Kyoto", "Quito"];
    for i in 0..rows {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), CellValue::Text(format!("Person {}", i)));
        fields.insert("age".to_string(), CellValue::Number((i % 90) as f64));
        fields.insert(
            "city".to_string(),
            CellValue::Text(cities[i % cities.len()].to_string()),
        );
        grid.add_row(fields);
    }
    grid
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000, 10000].iter() {
        let mut grid = seeded_grid(*size);
        grid.set_search("person 5");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(grid.query().len()));
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [100, 1000, 10000].iter() {
        let mut grid = seeded_grid(*size);
        grid.set_filters(vec![
            Filter::new("age", FilterOp::GreaterThan, "18"),
            Filter::new("city", FilterOp::Equals, "kyoto"),
        ]);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(grid.query().len()));
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");

    for size in [100, 1000, 10000].iter() {
        let mut grid = seeded_grid(*size);
        grid.set_sort(Some(SortSpec {
            column: "age".to_string(),
            direction: SortDirection::Descending,
        }));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(grid.query().len()));
        });
    }
    group.finish();
}

fn bench_page_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_window");

    for size in [1000, 10000].iter() {
        let mut grid = seeded_grid(*size);
        grid.set_page_size(25);
        grid.set_page(size / 50);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(grid.page_rows().len()));
        });
    }
    group.finish();
}

fn bench_export_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_projection");

    for size in [100, 1000].iter() {
        let grid = seeded_grid(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(grid.project(ExportScope::All).rows.len()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_search,
    bench_filter,
    bench_sort,
    bench_page_window,
    bench_export_projection
);
criterion_main!(benches);
