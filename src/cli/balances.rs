use super::ui;
use crate::session::ReportSession;
use anyhow::Result;
use comfy_table::Cell;

/// Renders available balances against payout thresholds. Amounts are shown
/// in each platform's native currency; the total is converted into the
/// display currency.
pub fn run(session: &ReportSession) -> Result<()> {
    let views = session.available_balance_view();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Platform"),
        ui::header_cell("Balance"),
        ui::header_cell("Threshold"),
        ui::header_cell("Payout progress"),
    ]);

    for view in &views {
        table.add_row(vec![
            Cell::new(&view.platform),
            ui::money_cell(view.native_balance, view.native_currency),
            ui::money_cell(view.native_threshold, view.native_currency),
            ui::progress_cell(view.progress_pct),
        ]);
    }
    println!("{table}");

    let currency = session.display_currency();
    println!(
        "\n{} {}",
        ui::style_text(
            &format!("Total available ({currency}):"),
            ui::StyleType::TotalLabel
        ),
        ui::style_text(
            &ui::format_money(session.available_balance_total(), currency),
            ui::StyleType::TotalValue
        ),
    );

    Ok(())
}
