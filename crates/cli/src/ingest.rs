use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bomcheck_core::{BomRow, ItemId, TargetRow};
use rust_decimal::Decimal;
use thiserror::Error;

/// Teamcenter BOM exports delimit fields with a literal `(#)` sequence.
const BOM_DELIMITER: &str = "(#)";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("`{path}` contains no header line")]
    EmptyFile { path: PathBuf },
    #[error("`{path}` is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path}:{line}: malformed quantity `{value}`")]
    MalformedQuantity { path: PathBuf, line: usize, value: String },
    #[error("{path}:{line}: malformed level `{value}`")]
    MalformedLevel { path: PathBuf, line: usize, value: String },
    #[error("could not parse `{path}`: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Read a `(#)`-delimited Teamcenter BOM export into normalized rows.
///
/// The delimiter is longer than one byte, so lines are split by hand rather
/// than through a csv reader.
pub fn read_bom_file(path: &Path) -> Result<Vec<BomRow>, IngestError> {
    let bytes = fs::read(path)
        .map_err(|source| IngestError::ReadFile { path: path.to_path_buf(), source })?;
    let text = decode_export(&bytes);
    parse_bom(&text, path)
}

/// Exports are usually ISO-8859-1. Valid UTF-8 passes through unchanged;
/// anything else decodes byte-wise, since every latin-1 byte is the same
/// Unicode code point.
fn decode_export(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| byte as char).collect(),
    }
}

fn parse_bom(text: &str, path: &Path) -> Result<Vec<BomRow>, IngestError> {
    let mut lines = text.lines().enumerate();
    let (_, header_line) = lines
        .by_ref()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| IngestError::EmptyFile { path: path.to_path_buf() })?;

    let columns = header_index(header_line, BOM_DELIMITER);
    let parent = require_column(&columns, "parentpart", path)?;
    let item = require_column(&columns, "item", path)?;
    let qty = require_column(&columns, "qtyper", path)?;
    let level = require_column(&columns, "level", path)?;
    let template = columns.get("template").copied();
    let make_or_buy = columns.get("makebuy").copied();
    let line_type = columns.get("linetype").copied();
    let product_name = columns.get("productname").copied();

    let mut rows = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(BOM_DELIMITER).collect();
        let field = |column: Option<usize>| {
            column.and_then(|column| fields.get(column)).map(|value| value.trim()).unwrap_or("")
        };

        let line_number = index + 1;
        let qty_raw = field(Some(qty));
        let quantity_per_parent = parse_quantity(qty_raw).ok_or_else(|| {
            IngestError::MalformedQuantity {
                path: path.to_path_buf(),
                line: line_number,
                value: qty_raw.to_string(),
            }
        })?;
        let level_raw = field(Some(level));
        let level_value: i64 = level_raw.parse().map_err(|_| IngestError::MalformedLevel {
            path: path.to_path_buf(),
            line: line_number,
            value: level_raw.to_string(),
        })?;

        rows.push(BomRow {
            parent_item: ItemId::from(field(Some(parent))),
            item: ItemId::from(field(Some(item))),
            quantity_per_parent,
            template: field(template).to_string(),
            make_or_buy: field(make_or_buy).to_string(),
            line_type: field(line_type).to_string(),
            product_name: field(product_name).to_string(),
            level: level_value,
        });
    }

    tracing::info!(rows = rows.len(), path = %path.display(), "bom file ingested");
    Ok(rows)
}

/// Read the externally sourced target quantity list (a plain CSV export of
/// the D365 table), aggregated per `(item, name)` as it is read.
///
/// Unparseable quantities coerce to zero rather than failing the whole
/// file; missing product names default to empty.
pub fn read_target_file(path: &Path) -> Result<Vec<TargetRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv { path: path.to_path_buf(), source })?;

    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv { path: path.to_path_buf(), source })?
        .clone();
    let mut item_column = None;
    let mut name_column = None;
    let mut qty_column = None;
    for (index, raw) in headers.iter().enumerate() {
        match normalize_header(raw).as_str() {
            "item" | "itemnumber" => item_column.get_or_insert(index),
            "productname" => name_column.get_or_insert(index),
            "quantity" | "totalquantity" => qty_column.get_or_insert(index),
            _ => continue,
        };
    }
    let item_column = item_column.ok_or_else(|| IngestError::MissingColumn {
        path: path.to_path_buf(),
        column: "item number".to_string(),
    })?;
    let qty_column = qty_column.ok_or_else(|| IngestError::MissingColumn {
        path: path.to_path_buf(),
        column: "quantity".to_string(),
    })?;

    let mut order: Vec<(ItemId, String)> = Vec::new();
    let mut totals: HashMap<(ItemId, String), Decimal> = HashMap::new();
    for record in reader.records() {
        let record =
            record.map_err(|source| IngestError::Csv { path: path.to_path_buf(), source })?;
        let item = ItemId::from(record.get(item_column).unwrap_or("").trim());
        if item.as_str().is_empty() {
            continue;
        }
        let name = name_column
            .and_then(|column| record.get(column))
            .map(|value| value.trim().to_string())
            .unwrap_or_default();
        let quantity = record
            .get(qty_column)
            .and_then(parse_quantity)
            .unwrap_or(Decimal::ZERO);

        let key = (item, name);
        if !totals.contains_key(&key) {
            order.push(key.clone());
        }
        *totals.entry(key).or_insert(Decimal::ZERO) += quantity;
    }

    tracing::info!(rows = order.len(), path = %path.display(), "target file ingested");
    Ok(order
        .into_iter()
        .map(|key| {
            let total_quantity = totals[&key];
            let (item, product_name) = key;
            TargetRow { item, product_name, total_quantity }
        })
        .collect())
}

/// Quantities may use a comma decimal separator; normalize before parsing.
fn parse_quantity(raw: &str) -> Option<Decimal> {
    raw.trim().replace(',', ".").parse().ok()
}

/// Header cleanup: trim, lowercase, strip everything that is not a word
/// character, so `Parent Part`, `parent-part` and `parentpart` all collapse
/// to the same key.
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|character| character.is_alphanumeric() || *character == '_')
        .collect()
}

fn header_index(header_line: &str, delimiter: &str) -> HashMap<String, usize> {
    header_line
        .split(delimiter)
        .enumerate()
        .map(|(index, raw)| (normalize_header(raw), index))
        .collect()
}

fn require_column(
    columns: &HashMap<String, usize>,
    name: &str,
    path: &Path,
) -> Result<usize, IngestError> {
    columns.get(name).copied().ok_or_else(|| IngestError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })
}
