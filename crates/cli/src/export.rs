use std::path::{Path, PathBuf};

use bomcheck_core::{ComparisonRow, LengthRequirement, PartsRequirement};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write `{path}`: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("could not flush `{path}`: {source}")]
    Flush { path: PathBuf, source: std::io::Error },
}

pub fn write_parts_csv(path: &Path, parts: &[PartsRequirement]) -> Result<(), ExportError> {
    let mut writer = writer_for(path)?;
    write_row(&mut writer, path, &["item", "product_name", "total_quantity"])?;
    for part in parts {
        write_row(
            &mut writer,
            path,
            &[part.item.as_str(), &part.product_name, &part.total_quantity.to_string()],
        )?;
    }
    finish(writer, path)
}

pub fn write_lengths_csv(path: &Path, lengths: &[LengthRequirement]) -> Result<(), ExportError> {
    let mut writer = writer_for(path)?;
    write_row(&mut writer, path, &["item", "product_name", "total_quantity", "template"])?;
    for length in lengths {
        write_row(
            &mut writer,
            path,
            &[
                length.item.as_str(),
                &length.product_name,
                &length.total_quantity.to_string(),
                &length.template,
            ],
        )?;
    }
    finish(writer, path)
}

pub fn write_comparison_csv(path: &Path, report: &[ComparisonRow]) -> Result<(), ExportError> {
    let mut writer = writer_for(path)?;
    write_row(
        &mut writer,
        path,
        &["item", "bom_name", "bom_quantity", "target_name", "target_quantity", "status"],
    )?;
    for row in report {
        write_row(
            &mut writer,
            path,
            &[
                row.item.as_str(),
                row.bom_name.as_deref().unwrap_or(""),
                &optional_quantity(row.bom_quantity),
                row.target_name.as_deref().unwrap_or(""),
                &optional_quantity(row.target_quantity),
                &row.status.to_string(),
            ],
        )?;
    }
    finish(writer, path)
}

fn optional_quantity(value: Option<rust_decimal::Decimal>) -> String {
    value.map(|quantity| quantity.to_string()).unwrap_or_default()
}

fn writer_for(path: &Path) -> Result<csv::Writer<std::fs::File>, ExportError> {
    csv::Writer::from_path(path)
        .map_err(|source| ExportError::Csv { path: path.to_path_buf(), source })
}

fn write_row(
    writer: &mut csv::Writer<std::fs::File>,
    path: &Path,
    fields: &[&str],
) -> Result<(), ExportError> {
    writer
        .write_record(fields)
        .map_err(|source| ExportError::Csv { path: path.to_path_buf(), source })
}

fn finish(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<(), ExportError> {
    writer.flush().map_err(|source| ExportError::Flush { path: path.to_path_buf(), source })
}
