use bomcheck_core::{ComparisonRow, LengthRequirement, PartsRequirement, TraceEntry};

pub fn parts_table(parts: &[PartsRequirement]) -> String {
    table(
        &["ITEM", "PRODUCT NAME", "QTY"],
        parts
            .iter()
            .map(|part| {
                vec![
                    part.item.to_string(),
                    part.product_name.clone(),
                    part.total_quantity.to_string(),
                ]
            })
            .collect(),
    )
}

pub fn lengths_table(lengths: &[LengthRequirement]) -> String {
    table(
        &["ITEM", "PRODUCT NAME", "QTY", "TEMPLATE"],
        lengths
            .iter()
            .map(|length| {
                vec![
                    length.item.to_string(),
                    length.product_name.clone(),
                    length.total_quantity.to_string(),
                    length.template.clone(),
                ]
            })
            .collect(),
    )
}

pub fn comparison_table(report: &[ComparisonRow]) -> String {
    table(
        &["ITEM", "BOM NAME", "BOM QTY", "TARGET NAME", "TARGET QTY", "STATUS"],
        report
            .iter()
            .map(|row| {
                vec![
                    row.item.to_string(),
                    row.bom_name.clone().unwrap_or_default(),
                    row.bom_quantity.map(|value| value.to_string()).unwrap_or_default(),
                    row.target_name.clone().unwrap_or_default(),
                    row.target_quantity.map(|value| value.to_string()).unwrap_or_default(),
                    row.status.to_string(),
                ]
            })
            .collect(),
    )
}

pub fn trace_listing(item: &str, entries: &[TraceEntry]) -> String {
    let mut lines = vec![format!("Derivation paths for {item}:")];
    for (index, entry) in entries.iter().enumerate() {
        lines.push(format!("  path {}: total {}", index + 1, entry.total_quantity));
        lines.push(format!("    {}", entry.path.render()));
    }
    lines.join("\n")
}

/// Left-aligned fixed-width text table, two spaces between columns.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in &rows {
        for (index, cell) in row.iter().enumerate() {
            if cell.len() > widths[index] {
                widths[index] = cell.len();
            }
        }
    }

    let format_row = |cells: Vec<String>| {
        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines =
        vec![format_row(headers.iter().map(|header| header.to_string()).collect())];
    lines.extend(rows.into_iter().map(format_row));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use bomcheck_core::{ItemId, PartsRequirement};
    use rust_decimal::Decimal;

    use super::parts_table;

    #[test]
    fn columns_align_to_the_widest_cell() {
        let output = parts_table(&[
            PartsRequirement {
                item: ItemId::from("A-1"),
                product_name: "Axle".to_string(),
                total_quantity: Decimal::from(2),
            },
            PartsRequirement {
                item: ItemId::from("LONG-ITEM-90"),
                product_name: "Bolt".to_string(),
                total_quantity: Decimal::from(14),
            },
        ]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "ITEM          PRODUCT NAME  QTY");
        assert_eq!(lines[1], "A-1           Axle          2");
        assert_eq!(lines[2], "LONG-ITEM-90  Bolt          14");
    }
}
