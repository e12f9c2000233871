use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use unitconv_cli::commands::{ConvertReport, ValidationReport};
use unitconv_registry::{ConversionEntry, ConversionRegistry};

pub fn print_convert_summary(report: &ConvertReport) {
    println!("Input: {}", report.input.display());
    match &report.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run)"),
    }
    println!("Rows: {}", report.rows);

    if report.summary.fields.is_empty() {
        println!("No configured fields found in the dataset.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Units column"),
        header_cell("Preferred"),
        header_cell("Rows"),
        header_cell("Converted"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    let mut total_converted = 0usize;
    for field in &report.summary.fields {
        total_converted += field.converted;
        table.add_row(vec![
            Cell::new(&field.field_name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&field.units_field_name),
            Cell::new(&field.preferred_unit),
            Cell::new(field.rows),
            count_cell(field.converted),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(report.rows).add_attribute(Attribute::Bold),
        count_cell(total_converted).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_validation(report: &ValidationReport) {
    match report {
        ValidationReport::Valid { entries } => {
            println!("Configuration is valid ({entries} entries).");
        }
        ValidationReport::Invalid {
            message,
            violations,
        } => {
            eprintln!("{message}");
            if violations.is_empty() {
                return;
            }
            let mut table = Table::new();
            table.set_header(vec![header_cell("Path"), header_cell("Problem")]);
            apply_table_style(&mut table);
            for violation in violations {
                table.add_row(vec![
                    Cell::new(&violation.path).fg(Color::Yellow),
                    Cell::new(&violation.message),
                ]);
            }
            eprintln!("{table}");
        }
    }
}

pub fn print_fields(registry: &ConversionRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Units column"),
        header_cell("Units"),
        header_cell("Preferred"),
        header_cell("Rules"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for entry in registry.entries() {
        table.add_row(vec![
            Cell::new(entry.field_name())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(entry.units_field_name()),
            Cell::new(unit_list(entry)),
            Cell::new(&entry.preferred_unit().label),
            Cell::new(entry.rule_count()),
        ]);
    }
    println!("{table}");
}

fn unit_list(entry: &ConversionEntry) -> String {
    entry
        .units()
        .iter()
        .map(|unit| match unit.coded_value {
            Some(code) => format!("{} ({code})", unit.label),
            None => unit.label.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Green)
    } else {
        dim_cell(count)
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
