use crate::currency::Currency;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats a monetary amount with its currency symbol.
pub fn format_money(value: f64, currency: Currency) -> String {
    format!("{} {value:.2}", currency.symbol())
}

/// Right-aligned cell holding a monetary amount.
pub fn money_cell(value: f64, currency: Currency) -> Cell {
    Cell::new(format_money(value, currency)).set_alignment(CellAlignment::Right)
}

/// Right-aligned cell holding a percentage.
pub fn pct_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.1}%")).set_alignment(CellAlignment::Right)
}

/// Renders a payout-progress bar. The bar itself is clamped to 100% but the
/// printed percentage is the raw ratio.
pub fn progress_cell(progress_pct: f64) -> Cell {
    const WIDTH: usize = 10;
    let clamped = progress_pct.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * WIDTH as f64).round() as usize;
    let bar: String = "#".repeat(filled) + &"-".repeat(WIDTH - filled);
    let cell = Cell::new(format!("[{bar}] {progress_pct:.0}%")).set_alignment(CellAlignment::Right);
    if progress_pct >= 100.0 {
        cell.fg(Color::Green)
    } else {
        cell
    }
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, with_message: bool) -> ProgressBar {
    let template = if with_message {
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    } else {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    };

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
