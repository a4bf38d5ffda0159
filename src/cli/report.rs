use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use crate::cli::{filter_label, filtered_snapshot, open_store, FilterArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::grouping::{BucketOrder, Granularity};
use crate::reports::{self, CategoryAnalysis, PeriodSummary, Totals};
use crate::settings::load_settings;

// ---------------------------------------------------------------------------
// Data-fetching wrappers (used by dispatch)
// ---------------------------------------------------------------------------

pub fn summary(opts: &FilterArgs) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let rows = filtered_snapshot(&store, opts)?;
    store.close()?;

    let label = filter_label(opts)?;
    if rows.is_empty() {
        println!("No transactions for {}.", label.to_lowercase());
        return Ok(());
    }
    let totals = Totals::of(&rows);
    println!(
        "Summary: {label} ({} transactions)\n{}",
        rows.len(),
        format_summary(&totals, &settings.currency_symbol)
    );
    Ok(())
}

pub fn group(period: &str, order: &str, opts: &FilterArgs) -> Result<()> {
    let granularity: Granularity = period.parse()?;
    let order: BucketOrder = order.parse()?;
    let settings = load_settings();
    let store = open_store(&settings)?;
    let rows = filtered_snapshot(&store, opts)?;
    store.close()?;

    let label = filter_label(opts)?;
    if rows.is_empty() {
        println!("No transactions for {}.", label.to_lowercase());
        return Ok(());
    }
    let periods = reports::period_summaries(&rows, granularity, order);
    println!("{}", format_group(granularity, &label, &periods, &settings.currency_symbol));
    Ok(())
}

pub fn categories() -> Result<()> {
    let store = open_store(&load_settings())?;
    let rows = store.list_all()?;
    store.close()?;

    let names = reports::categories(&rows);
    if names.is_empty() {
        println!("No categories yet. Add a transaction to create one.");
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn analyze(category: &str, period: &str) -> Result<()> {
    let granularity: Granularity = period.parse()?;
    let settings = load_settings();
    let store = open_store(&settings)?;
    let rows = store.list_all()?;
    store.close()?;

    let analysis = reports::analyze(&rows, category, granularity, BucketOrder::Period);
    if analysis.periods.is_empty() {
        println!("No transactions in category \"{category}\".");
        return Ok(());
    }
    println!("{}", format_analysis(&analysis, &settings.currency_symbol));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data -> String)
// ---------------------------------------------------------------------------

fn net_cell(net: Decimal, symbol: &str) -> Cell {
    let text = money(net, symbol);
    let styled = if net.is_sign_negative() && !net.is_zero() {
        text.red().bold()
    } else {
        text.green().bold()
    };
    Cell::new(styled).set_alignment(CellAlignment::Right)
}

fn amount_cell(value: Decimal, symbol: &str) -> Cell {
    Cell::new(money(value, symbol)).set_alignment(CellAlignment::Right)
}

pub fn format_summary(totals: &Totals, symbol: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![Cell::new("Income".green()), amount_cell(totals.income, symbol)]);
    table.add_row(vec![Cell::new("Expense".red()), amount_cell(totals.expense, symbol)]);
    table.add_row(vec![Cell::new("Net".bold()), net_cell(totals.net, symbol)]);
    table.to_string()
}

pub fn format_periods(periods: &[PeriodSummary], symbol: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Period", "Count", "Income", "Expense", "Net"]);
    for p in periods {
        table.add_row(vec![
            Cell::new(&p.label),
            Cell::new(p.count).set_alignment(CellAlignment::Right),
            amount_cell(p.totals.income, symbol),
            amount_cell(p.totals.expense, symbol),
            net_cell(p.totals.net, symbol),
        ]);
    }
    table.to_string()
}

pub fn format_group(granularity: Granularity, label: &str, periods: &[PeriodSummary], symbol: &str) -> String {
    format!("By {}: {label}\n{}", granularity.noun(), format_periods(periods, symbol))
}

pub fn format_analysis(analysis: &CategoryAnalysis, symbol: &str) -> String {
    format!(
        "Category: {}\n{}\n{}",
        analysis.category.bold(),
        format_summary(&analysis.totals, symbol),
        format_periods(&analysis.periods, symbol)
    )
}
