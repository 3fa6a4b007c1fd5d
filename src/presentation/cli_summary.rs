use crate::application::monitoring::PerfReport;
use crate::domain::changeset::Changeset;
use crate::domain::schema_diff::DiffKind;
use crate::domain::table_diff::TableDataInfo;
use colored::*;
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SummaryRow {
    metric: String,
    value: String,
}

fn print_header(title: &str, changeset: &Changeset) {
    println!();
    println!("{}", title.bold().cyan());
    println!(
        "{} → {}",
        changeset.source_database.blue(),
        changeset.target_database.green()
    );
    println!("Changeset: {}", changeset.changeset_id.bright_yellow());
    println!();
}

fn print_rollup(rows: Vec<SummaryRow>) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!();
}

// ─── Schema summary ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct SchemaRow {
    kind: String,
    table: String,
    detail: String,
}

fn colored_kind(kind: DiffKind) -> String {
    match kind {
        DiffKind::Added => kind.as_str().green().to_string(),
        DiffKind::Modified => kind.as_str().yellow().to_string(),
        DiffKind::Removed => kind.as_str().red().to_string(),
    }
}

pub fn print_schema_summary(changeset: &Changeset) {
    print_header("SCHEMA DIFF SUMMARY", changeset);

    if changeset.schema_diffs.is_empty() {
        println!("{}", "Schemas are identical.".italic());
        return;
    }

    let rows: Vec<SchemaRow> = changeset
        .schema_diffs
        .iter()
        .map(|d| SchemaRow {
            kind: colored_kind(d.kind),
            table: d.table_name.bold().to_string(),
            detail: d.detail.clone(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
    println!();

    let s = &changeset.summary;
    print_rollup(vec![
        SummaryRow {
            metric: "Added".into(),
            value: s.added.to_string().green().to_string(),
        },
        SummaryRow {
            metric: "Modified".into(),
            value: s.modified.to_string().yellow().to_string(),
        },
        SummaryRow {
            metric: "Removed".into(),
            value: s.removed.to_string().red().to_string(),
        },
    ]);
}

// ─── Data summary ─────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct DataRow {
    table: String,
    source: String,
    target: String,
    inserts: String,
    updates: String,
    deletes: String,
}

pub fn print_data_summary(changeset: &Changeset) {
    print_header("DATA DIFF SUMMARY", changeset);

    let rows: Vec<DataRow> = changeset
        .tables
        .iter()
        .map(|t| DataRow {
            table: t.table_name.bold().to_string(),
            source: t.source_count.to_string(),
            target: t.target_count.to_string(),
            inserts: t.insert_count.to_string().green().to_string(),
            updates: t.update_count.to_string().yellow().to_string(),
            deletes: t.delete_count.to_string().red().to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("{}", "No tables compared.".italic());
        return;
    }

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!();

    if changeset.is_empty() {
        println!("{}", "No changes selected.".italic());
        println!();
        return;
    }

    let s = &changeset.summary;
    print_rollup(vec![
        SummaryRow {
            metric: "Total inserts".into(),
            value: s.total_inserts.to_string().green().to_string(),
        },
        SummaryRow {
            metric: "Total updates".into(),
            value: s.total_updates.to_string().yellow().to_string(),
        },
        SummaryRow {
            metric: "Total deletes".into(),
            value: s.total_deletes.to_string().red().to_string(),
        },
        SummaryRow {
            metric: "Statements".into(),
            value: s.total_statements.to_string().bold().to_string(),
        },
    ]);
}

// ─── Sync tables ──────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct SyncTableRow {
    table: String,
    #[tabled(rename = "primary key")]
    primary_key: String,
    columns: usize,
    rows: u64,
}

/// Tables a data comparison can cover; keyless tables are flagged.
pub fn print_sync_tables(tables: &[TableDataInfo]) {
    let rows: Vec<SyncTableRow> = tables
        .iter()
        .map(|t| SyncTableRow {
            table: t.table_name.bold().to_string(),
            primary_key: if t.primary_keys.is_empty() {
                "none (skipped)".red().to_string()
            } else {
                t.primary_keys.join(", ")
            },
            columns: t.columns.len(),
            rows: t.source_count,
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

// ─── Performance summary ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PerfRow {
    operation: String,
    table: String,
    #[tabled(rename = "rows")]
    rows: String,
    #[tabled(rename = "time (ms)")]
    duration_ms: String,
}

/// Print a performance timing table to stdout.
pub fn print_perf_summary(report: &PerfReport) {
    if report.timings.is_empty() {
        return;
    }

    println!("{}", "PERFORMANCE".bold().cyan());

    let rows: Vec<PerfRow> = report
        .timings
        .iter()
        .map(|t| PerfRow {
            operation: t.operation.dimmed().to_string(),
            table: t.table.bold().to_string(),
            rows: t.rows.to_string(),
            duration_ms: format_duration(t.duration_ms),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()))
        .to_string();

    println!("{table}");

    println!(
        "  Total: {} row(s) fetched  ·  {} ms elapsed",
        report.total_rows_fetched.to_string().bold(),
        format_duration(report.total_ms),
    );
    println!();
}

fn format_duration(ms: u128) -> String {
    if ms >= 1_000 {
        format!("{:.1}s", ms as f64 / 1_000.0).yellow().to_string()
    } else if ms >= 100 {
        ms.to_string().yellow().to_string()
    } else {
        ms.to_string().green().to_string()
    }
}
