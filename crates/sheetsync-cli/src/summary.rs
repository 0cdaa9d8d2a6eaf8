use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sheetsync_model::DataSummary;
use sheetsync_refresh::{RefreshOutcome, RefreshStatus, RefreshStatusReport};

use sheetsync_cli::types::RunReport;

pub fn print_summary(report: &RunReport) {
    println!("Input: {}", report.input_folder.display());
    if let Some(output) = &report.output {
        println!("Output: {}", output.path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Result")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("Files found"), Cell::new(report.files_found)]);
    table.add_row(vec![Cell::new("Files loaded"), Cell::new(report.files_loaded)]);
    table.add_row(vec![
        Cell::new("Files skipped"),
        count_cell(report.files_skipped(), Color::Red),
    ]);
    table.add_row(vec![Cell::new("Rows merged"), Cell::new(report.merged_rows)]);
    if let Some(missing) = missing_columns_cell(report) {
        table.add_row(vec![Cell::new("Missing columns"), missing]);
    }
    table.add_row(vec![
        Cell::new("Cells filled"),
        count_cell(report.cleaning.cells_filled, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Duplicates removed"),
        count_cell(report.cleaning.duplicates_removed, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Rows written"),
        match &report.output {
            Some(output) => Cell::new(output.rows),
            None => dim_cell("dry run"),
        },
    ]);
    table.add_row(vec![
        Cell::new("Columns"),
        Cell::new(report.summary.total_columns),
    ]);
    table.add_row(vec![Cell::new("Refresh"), refresh_cell(report.refresh.as_ref())]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        dim_cell(format!("{:.2}s", report.elapsed.as_secs_f64())),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    println!("{table}");

    if !report.failures.is_empty() {
        let mut skipped = Table::new();
        skipped.set_header(vec![header_cell("Skipped file"), header_cell("Reason")]);
        apply_table_style(&mut skipped);
        for failure in &report.failures {
            skipped.add_row(vec![
                Cell::new(failure.path.display()).fg(Color::Red),
                Cell::new(&failure.reason),
            ]);
        }
        println!();
        println!("{skipped}");
    }

    println!();
    print_columns(&report.summary);
    println!();
    print_sources(&report.summary);
}

fn print_columns(summary: &DataSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Missing"),
    ]);
    apply_summary_table_style(&mut table);
    for column in &summary.columns {
        table.add_row(vec![
            Cell::new(&column.name).add_attribute(Attribute::Bold),
            dim_cell(&column.dtype),
            count_cell(column.null_count, Color::Yellow),
        ]);
    }
    align_column(&mut table, 2, CellAlignment::Right);
    println!(
        "Table: {} rows x {} columns, ~{:.2} MB",
        summary.total_rows, summary.total_columns, summary.memory_usage_mb
    );
    println!("{table}");
}

fn print_sources(summary: &DataSummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Source file"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    for source in &summary.source_files {
        table.add_row(vec![Cell::new(&source.file_name), Cell::new(source.rows)]);
    }
    align_column(&mut table, 1, CellAlignment::Right);
    println!("{table}");
}

pub fn print_refresh_status(report: &RefreshStatusReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("Status"), status_cell(report)]);
    let optional = [
        ("Request id", report.request_id.as_deref()),
        ("Refresh type", report.refresh_type.as_deref()),
        ("Started", report.start_time.as_deref()),
        ("Ended", report.end_time.as_deref()),
    ];
    for (label, value) in optional {
        table.add_row(vec![Cell::new(label), optional_cell(value)]);
    }
    if report.status == RefreshStatus::Failed {
        table.add_row(vec![
            Cell::new("Failure"),
            Cell::new(report.failure_reason()).fg(Color::Red),
        ]);
    }
    println!("{table}");
}

fn missing_columns_cell(report: &RunReport) -> Option<Cell> {
    if report.cleaning.projection_skipped {
        return Some(Cell::new("none selected found; kept all").fg(Color::Yellow));
    }
    if report.cleaning.missing_columns.is_empty() {
        return None;
    }
    Some(Cell::new(report.cleaning.missing_columns.join(", ")).fg(Color::Yellow))
}

fn refresh_cell(outcome: Option<&RefreshOutcome>) -> Cell {
    match outcome {
        Some(RefreshOutcome::Failed(reason)) => Cell::new(format!("failed: {reason}"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Some(outcome) => Cell::new(outcome.label())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn status_cell(report: &RefreshStatusReport) -> Cell {
    let color = match report.status {
        RefreshStatus::Completed => Color::Green,
        RefreshStatus::Failed => Color::Red,
        RefreshStatus::Unknown | RefreshStatus::InProgress => Color::Yellow,
    };
    let text = if report.raw_status.is_empty() {
        report.status.to_string()
    } else {
        report.raw_status.clone()
    };
    Cell::new(text).fg(color).add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
