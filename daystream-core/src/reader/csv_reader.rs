//! Streaming CSV reader. Rows are decoded one at a time as the stream is
//! pulled.

use super::row::RowContext;
use super::{RecordStream, SourceReader};
use crate::domain::Record;
use crate::error::EnumerationError;
use crate::fetch::FileAccess;
use crate::source::SourceDescriptor;

/// Reads headerless day files of `millis,value...` rows.
///
/// Fields are trimmed and `#` lines are skipped. A row that fails to decode
/// ends the stream with a `Read` error; earlier rows are still yielded.
pub struct CsvReader<'a> {
    file_access: &'a dyn FileAccess,
    context: RowContext,
}

impl<'a> CsvReader<'a> {
    /// Reader for one day's file. `file_access` resolves the descriptor to a
    /// local path when [`SourceReader::read`] is called.
    pub fn new(file_access: &'a dyn FileAccess, context: RowContext) -> Self {
        Self {
            file_access,
            context,
        }
    }
}

/// Decode one row, checking the field count against the row layout.
fn parse_row(
    context: &RowContext,
    location: &str,
    row: csv::StringRecord,
) -> Result<Record, EnumerationError> {
    let expected = context.kind.columns().len() + 1;
    if row.len() != expected {
        return Err(EnumerationError::read(
            location,
            format!("expected {expected} fields, got {} in {:?}", row.len(), row),
        ));
    }

    let millis: i64 = row[0]
        .parse()
        .map_err(|e| EnumerationError::read(location, format!("bad millis '{}': {e}", &row[0])))?;

    let mut values = [0.0_f64; 10];
    for (i, field) in row.iter().skip(1).enumerate() {
        values[i] = field
            .parse()
            .map_err(|e| EnumerationError::read(location, format!("bad value '{field}': {e}")))?;
    }

    context.build(location, millis, &values[..expected - 1])
}

impl<'a> SourceReader for CsvReader<'a> {
    fn read(self: Box<Self>, descriptor: &SourceDescriptor) -> Result<RecordStream, EnumerationError> {
        let path = self.file_access.fetch(descriptor)?;
        let location = descriptor.location.clone();

        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_path(&path)
            .map_err(|e| EnumerationError::read(&location, e))?;

        let context = self.context;
        Ok(Box::new(reader.into_records().map(move |row| {
            let row = row.map_err(|e| EnumerationError::read(&location, e))?;
            parse_row(&context, &location, row)
        })))
    }
}
