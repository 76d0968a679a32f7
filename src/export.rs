// src/export.rs

use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::{DataType as ArrowDataType, Field, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use tracing::info;

use crate::store::{Cell, Store, Table};

/// Narrowest Arrow type that holds every non-null cell of column `idx`.
fn column_type(table: &Table, idx: usize) -> ArrowDataType {
    let cells = table.rows.iter().filter_map(|r| r.get(idx));
    let mut ty = ArrowDataType::Int64;
    for cell in cells {
        match cell {
            Cell::Null | Cell::Integer(_) => {}
            Cell::Real(_) => ty = ArrowDataType::Float64,
            Cell::Text(_) | Cell::Blob(_) => return ArrowDataType::Utf8,
        }
    }
    ty
}

fn column_array(table: &Table, idx: usize, ty: &ArrowDataType) -> ArrayRef {
    let cells = table.rows.iter().map(|r| r.get(idx));
    match ty {
        ArrowDataType::Int64 => Arc::new(Int64Array::from(
            cells.map(|c| c.and_then(Cell::as_i64)).collect::<Vec<_>>(),
        )),
        ArrowDataType::Float64 => Arc::new(Float64Array::from(
            cells.map(|c| c.and_then(Cell::as_f64)).collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            cells
                .map(|c| match c {
                    None | Some(Cell::Null) => None,
                    Some(other) => Some(other.to_string()),
                })
                .collect::<Vec<_>>(),
        )),
    }
}

/// Convert a stored table into a single Arrow batch.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let types: Vec<ArrowDataType> = (0..table.columns.len())
        .map(|i| column_type(table, i))
        .collect();
    let schema = Arc::new(ArrowSchema::new(
        table
            .columns
            .iter()
            .zip(&types)
            .map(|(name, ty)| Field::new(name, ty.clone(), true))
            .collect::<Vec<_>>(),
    ));
    let arrays = types
        .iter()
        .enumerate()
        .map(|(i, ty)| column_array(table, i, ty))
        .collect();
    RecordBatch::try_new(schema, arrays)
        .with_context(|| format!("building record batch for {}", table.name))
}

/// Snapshot `table` to a Parquet file at `dest`. Returns the row count.
pub fn export_table(store: &Store, table: &str, dest: impl AsRef<Path>) -> Result<usize> {
    let dest = dest.as_ref();
    let data = store
        .read(table)
        .with_context(|| format!("reading {}", table))?;
    let batch = to_record_batch(&data)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut tmp_name = dest.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    let file = File::create(tmp).with_context(|| format!("creating {}", tmp.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing Arrow writer")?;

    fs::rename(tmp, dest)
        .with_context(|| format!("renaming {} → {}", tmp.display(), dest.display()))?;

    info!(table, rows = data.len(), path = %dest.display(), "exported");
    Ok(data.len())
}
