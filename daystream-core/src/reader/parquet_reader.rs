//! Parquet reader for day files. A day file is small, so it is decoded in one
//! pass and then streamed from memory.

use polars::prelude::*;
use std::fs;

use super::row::RowContext;
use super::{RecordStream, SourceReader};
use crate::domain::Record;
use crate::error::EnumerationError;
use crate::fetch::FileAccess;
use crate::source::SourceDescriptor;

/// Reads one Parquet day file with a `millis` column plus the row kind's
/// value columns. Integer columns are cast to the record's types; nulls are
/// rejected.
pub struct ParquetDayReader<'a> {
    file_access: &'a dyn FileAccess,
    context: RowContext,
}

impl<'a> ParquetDayReader<'a> {
    pub fn new(file_access: &'a dyn FileAccess, context: RowContext) -> Self {
        Self {
            file_access,
            context,
        }
    }
}

/// Decode a DataFrame laid out as `millis` + the kind's value columns.
fn dataframe_to_records(
    df: &DataFrame,
    context: &RowContext,
    location: &str,
) -> Result<Vec<Record>, EnumerationError> {
    let column_err = |name: &str, e: PolarsError| EnumerationError::read(location, format!("column '{name}': {e}"));

    let millis = df
        .column("millis")
        .and_then(|c| c.cast(&DataType::Int64))
        .map_err(|e| column_err("millis", e))?;
    let millis_ca = millis.i64().map_err(|e| column_err("millis", e))?;

    let value_columns: Vec<Column> = context
        .kind
        .columns()
        .iter()
        .map(|name| {
            df.column(name)
                .and_then(|c| c.cast(&DataType::Float64))
                .map_err(|e| column_err(name, e))
        })
        .collect::<Result<_, _>>()?;
    let value_cas = value_columns
        .iter()
        .zip(context.kind.columns())
        .map(|(c, name)| c.f64().map_err(|e| column_err(name, e)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(df.height());
    let mut values = vec![0.0_f64; value_cas.len()];
    for i in 0..df.height() {
        let ms = millis_ca
            .get(i)
            .ok_or_else(|| EnumerationError::read(location, format!("null millis at row {i}")))?;
        for ((slot, ca), name) in values.iter_mut().zip(&value_cas).zip(context.kind.columns()) {
            *slot = ca
                .get(i)
                .ok_or_else(|| EnumerationError::read(location, format!("null {name} at row {i}")))?;
        }
        records.push(context.build(location, ms, &values)?);
    }
    Ok(records)
}

impl<'a> SourceReader for ParquetDayReader<'a> {
    fn read(self: Box<Self>, descriptor: &SourceDescriptor) -> Result<RecordStream, EnumerationError> {
        let path = self.file_access.fetch(descriptor)?;
        let location = descriptor.location.as_str();

        let file = fs::File::open(&path)?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| EnumerationError::read(location, e))?;

        let records = dataframe_to_records(&df, &self.context, location)?;
        Ok(Box::new(records.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::LocalFileAccess;
    use crate::reader::row::RowKind;
    use crate::source::{FileFormat, SourceTransport};
    use chrono::NaiveDate;

    fn write_ticks(path: &std::path::Path) {
        let mut df = DataFrame::new(vec![
            Column::new("millis".into(), vec![1_000i64, 2_000, 3_000]),
            Column::new("price".into(), vec![10.0f64, 10.5, 10.25]),
            Column::new("quantity".into(), vec![100i64, 50, 25]),
        ])
        .unwrap();
        let file = fs::File::create(path).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();
    }

    fn context() -> RowContext {
        RowContext {
            kind: RowKind::Tick,
            symbol: "BTCUSD".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
        }
    }

    #[test]
    fn reads_ticks_and_casts_integer_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240106_tick.parquet");
        write_ticks(&path);

        let d = SourceDescriptor::new(path.to_string_lossy(), FileFormat::Parquet, SourceTransport::LocalFile);
        let reader = Box::new(ParquetDayReader::new(&LocalFileAccess, context()));
        let records: Vec<Record> = reader.read(&d).unwrap().map(Result::unwrap).collect();

        assert_eq!(records.len(), 3);
        match &records[2] {
            Record::Tick(t) => {
                assert_eq!(t.price, 10.25);
                assert_eq!(t.quantity, 25.0);
                assert_eq!(t.time.to_string(), "2024-01-06 00:00:03");
            }
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn null_value_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240106_tick.parquet");
        let mut df = DataFrame::new(vec![
            Column::new("millis".into(), vec![1_000i64, 2_000]),
            Column::new("price".into(), vec![Some(10.0f64), None]),
            Column::new("quantity".into(), vec![1.0f64, 2.0]),
        ])
        .unwrap();
        ParquetWriter::new(fs::File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        let d = SourceDescriptor::new(path.to_string_lossy(), FileFormat::Parquet, SourceTransport::LocalFile);
        let reader = Box::new(ParquetDayReader::new(&LocalFileAccess, context()));

        match reader.read(&d) {
            Err(EnumerationError::Read { reason, .. }) => {
                assert!(reason.contains("null price at row 1"), "{reason}");
            }
            Err(other) => panic!("expected Read error, got {other:?}"),
            Ok(_) => panic!("null price decoded"),
        }
    }

    #[test]
    fn missing_column_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240106_tick.parquet");
        write_ticks(&path);

        let mut ctx = context();
        ctx.kind = RowKind::TradeBar;
        let d = SourceDescriptor::new(path.to_string_lossy(), FileFormat::Parquet, SourceTransport::LocalFile);
        let reader = Box::new(ParquetDayReader::new(&LocalFileAccess, ctx));

        assert!(matches!(reader.read(&d), Err(EnumerationError::Read { .. })));
    }
}
