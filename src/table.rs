use crate::assemble::OutputRow;
use crate::value::{RawRecord, Value};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot use '{0}' as delimiter")]
    InvalidDelimiter(char),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("The key column '{name}' could not be found in the first line of the {source_tag} extract")]
    MissingKeyColumn { name: String, source_tag: String },
}

/// Read all rows of a delimited extract with a header line into records, requiring `key_column` to be present.
pub fn read_records(
    input: impl std::io::Read,
    delimiter: char,
    key_column: &str,
    source_tag: &str,
) -> Result<Vec<RawRecord>, Error> {
    let delimiter = to_delimiter(delimiter)?;
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let headers = csv.headers()?.clone();
    if !headers.iter().any(|name| name == key_column) {
        return Err(Error::MissingKeyColumn {
            name: key_column.into(),
            source_tag: source_tag.into(),
        });
    }

    let mut out = Vec::new();
    let mut record = csv::StringRecord::new();
    while csv.read_record(&mut record)? {
        out.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(column, field)| (column.to_owned(), Value::from_field(field)))
                .collect(),
        );
    }
    Ok(out)
}

/// Write `headers` followed by all `rows` as comma-separated values.
pub fn write_rows<'a>(
    out: impl std::io::Write,
    headers: &[String],
    rows: impl IntoIterator<Item = &'a OutputRow>,
) -> Result<(), Error> {
    let mut out = csv::WriterBuilder::new().delimiter(b',').from_writer(out);
    out.write_record(headers)?;
    for row in rows {
        out.write_record(row.fields())?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn to_delimiter(delimiter: char) -> Result<u8, Error> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(Error::InvalidDelimiter(delimiter))
}
