use super::ui;
use crate::session::ReportSession;
use anyhow::Result;
use comfy_table::Cell;
use console::style;

/// Renders the earnings dashboard: KPI block, per-platform totals with
/// receivable balances, and the monthly movement table (most recent first,
/// as the dashboard orders it).
pub fn run(session: &ReportSession) -> Result<()> {
    let currency = session.display_currency();
    let result = session.aggregate_result();

    println!(
        "Earnings summary ({})\n",
        ui::style_text(&currency.to_string(), ui::StyleType::Title)
    );

    let kpi = |label: &str, value: &str| {
        println!(
            "  {:<24} {}",
            ui::style_text(label, ui::StyleType::TotalLabel),
            value
        );
    };
    kpi(
        "Total net",
        &ui::style_text(
            &ui::format_money(result.grand_total_net, currency),
            ui::StyleType::TotalValue,
        ),
    );
    kpi(
        "Total gross",
        &ui::format_money(result.grand_total_gross, currency),
    );
    kpi(
        "Average / active month",
        &ui::format_money(result.average_per_active_period, currency),
    );
    kpi(
        "Active months",
        &result.active_period_count.to_string(),
    );
    match &result.best_period {
        Some(best) => kpi(
            "Best month",
            &format!(
                "{} ({})",
                ui::format_money(best.net, currency),
                best.period.label()
            ),
        ),
        None => kpi("Best month", "—"),
    }
    match &result.worst_period {
        Some(worst) => kpi(
            "Worst month",
            &format!(
                "{} ({})",
                ui::format_money(worst.net, currency),
                worst.period.label()
            ),
        ),
        None => kpi("Worst month", "—"),
    }

    // Per-platform table
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Platform"),
        ui::header_cell(&format!("Gross ({currency})")),
        ui::header_cell(&format!("Net ({currency})")),
        ui::header_cell(&format!("Receivable ({currency})")),
        ui::header_cell("Share (%)"),
    ]);

    let mut total_receivable = 0.0;
    for platform in &result.platform_totals {
        let receivable = session.receivable(&platform.platform);
        total_receivable += receivable;
        table.add_row(vec![
            Cell::new(&platform.platform),
            ui::money_cell(platform.gross, currency),
            ui::money_cell(platform.net, currency),
            ui::money_cell(receivable, currency),
            ui::pct_cell(platform.share_pct),
        ]);
    }
    println!("\n{table}");
    println!(
        "{} {}   {} {}",
        ui::style_text("Total net:", ui::StyleType::TotalLabel),
        style(ui::format_money(result.grand_total_net, currency))
            .bold()
            .green(),
        ui::style_text("Total receivable:", ui::StyleType::TotalLabel),
        ui::format_money(total_receivable, currency),
    );

    ui::print_separator();

    // Monthly movement, most recent first
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month/Year"),
        ui::header_cell(&format!("Gross ({currency})")),
        ui::header_cell(&format!("Net ({currency})")),
    ]);
    for entry in result.monthly_series.iter().rev() {
        table.add_row(vec![
            Cell::new(entry.period.label()),
            ui::money_cell(entry.gross, currency),
            ui::money_cell(entry.net, currency),
        ]);
    }
    println!("{table}");

    Ok(())
}
