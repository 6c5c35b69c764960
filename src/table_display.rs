use campus_kit::data::filter::value_to_text;
use campus_kit::notes::{clean_notes, parse_gross_from_notes};
use campus_kit::Pagination;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use serde_json::Value;

/// Column names: explicit fields, or the keys of the first record
pub fn column_names(data: &[Value], fields: &[String]) -> Vec<String> {
    if !fields.is_empty() {
        return fields.to_vec();
    }
    data.first()
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

fn cell_text(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::Null) => "NULL".to_string(),
        Some(value) => value_to_text(value),
        None => String::new(),
    }
}

/// Print one page of records.
///
/// With `notes_field`, the raw notes column is replaced by the cleaned text
/// and a parsed gross amount column is appended.
pub fn display_page(
    page: &[Value],
    fields: &[String],
    notes_field: Option<&str>,
    pagination: &Pagination,
) {
    if page.is_empty() {
        println!("{}", "No results found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let names = column_names(page, fields);
    let mut headers: Vec<Cell> = names
        .iter()
        .map(|f| Cell::new(f).add_attribute(Attribute::Bold))
        .collect();
    if notes_field.is_some() {
        headers.push(Cell::new("gross").add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    for record in page {
        let mut row: Vec<String> = names
            .iter()
            .map(|field| {
                if Some(field.as_str()) == notes_field {
                    clean_notes(record.get(field).and_then(Value::as_str))
                } else {
                    cell_text(record, field)
                }
            })
            .collect();

        if let Some(notes_field) = notes_field {
            let gross = parse_gross_from_notes(record.get(notes_field).and_then(Value::as_str));
            row.push(gross.map(|g| format!("{:.2}", g)).unwrap_or_default());
        }
        table.add_row(row);
    }

    println!("{table}");
    println!(
        "\n{}",
        format!(
            "Page {} of {} ({} items)",
            pagination.current_page(),
            pagination.total_pages(),
            pagination.item_count()
        )
        .green()
    );
}
