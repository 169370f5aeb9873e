use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use common_size::StatementLine;

/// Builds the terminal table for a common-size statement. The industry column
/// is only present when a benchmark was requested; `None` cells render as a
/// dash so missing concepts stay visible in the layout.
pub fn statement_table(lines: &[StatementLine], with_industry: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("Line Item"),
        Cell::new("Value ($M)").set_alignment(CellAlignment::Right),
        Cell::new("% of Base").set_alignment(CellAlignment::Right),
    ];
    if with_industry {
        header.push(Cell::new("Industry %").set_alignment(CellAlignment::Right));
    }
    table.set_header(header);

    for line in lines {
        let indent = "  ".repeat(line.indent as usize);
        let label = format!("{indent}{}", line.label);
        let mut row = vec![if line.is_header {
            Cell::new(label).add_attribute(Attribute::Bold)
        } else {
            Cell::new(label)
        }];

        if line.is_header {
            row.push(Cell::new(""));
            row.push(Cell::new(""));
            if with_industry {
                row.push(Cell::new(""));
            }
        } else {
            row.push(money_cell(line.value_in_millions()));
            row.push(percent_cell(line.common_size));
            if with_industry {
                row.push(percent_cell(line.industry_common_size));
            }
        }
        table.add_row(row);
    }

    table
}

fn money_cell(millions: Option<f64>) -> Cell {
    let text = match millions {
        Some(m) => format!("{m:.1}"),
        None => "-".to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn percent_cell(ratio: Option<f64>) -> Cell {
    let text = match ratio {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "-".to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}
