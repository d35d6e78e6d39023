#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not read the {source_tag} extract")]
    ReadSource {
        source_tag: String,
        source: crate::table::Error,
    },
    #[error("Could not write the merged table")]
    Write(#[from] crate::table::Error),
}

/// Everything that can be adjusted about a run without touching the merge logic.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Options {
    /// The column both extracts are joined on.
    pub key_column: String,
    pub name_column: String,
    /// The column holding the current stock in each extract.
    pub stock_column: String,
    /// The tag to suffix all columns of the first extract with.
    pub source_a_tag: String,
    /// The tag to suffix all columns of the second extract with.
    pub source_b_tag: String,
    /// The amount of purchase slots to consider per product and source.
    pub history_limit: usize,
    /// Stock purchased more than this many days before the reference time is aged.
    pub aging_days: u32,
    /// Character sequences to strip from all text fields but the key before processing.
    pub currency_glyphs: Vec<String>,
    /// The delimiter used by both input extracts.
    pub delimiter: char,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            key_column: "EAN".into(),
            name_column: "Product Name".into(),
            stock_column: "Stock".into(),
            source_a_tag: "PSM".into(),
            source_b_tag: "NUK".into(),
            history_limit: 5,
            aging_days: 30,
            currency_glyphs: vec!["Â£".into()],
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// The amount of rows read from each source.
    pub rows_read: [usize; 2],
    /// The amount of rows that were dropped as they had no key.
    pub skipped_without_key: usize,
    /// The amount of rows whose key was seen before in the same source.
    pub duplicate_keys: usize,
    /// The amount of rows in the merged table.
    pub rows_written: usize,
}

/// The file name to use for a merged table produced at `reference_time`.
pub fn output_file_name(options: &Options, reference_time: time::OffsetDateTime) -> String {
    static FORMAT: &[time::format_description::FormatItem<'static>] =
        time::macros::format_description!("[day]-[month]-[year]-[hour][minute]");
    format!(
        "Aging-{}-{}-Merge-{}.csv",
        options.source_a_tag,
        options.source_b_tag,
        reference_time
            .format(FORMAT)
            .expect("all components are available in an OffsetDateTime")
    )
}

pub(crate) mod function {
    use crate::assemble::{assemble, OutputRow};
    use crate::history::{aggregate, purchase_history, Cutoff};
    use crate::join::{outer_join, Source};
    use crate::reconcile::{Error, Options, Outcome};
    use crate::sanitize::sanitize;
    use crate::table;
    use crate::value::RawRecord;

    /// Merge the extracts `source_a` and `source_b` and write the resulting table to `out`.
    ///
    /// Both extracts are fully read before anything is written, so a broken input yields no output at all.
    pub fn reconcile(
        source_a: impl std::io::Read,
        source_b: impl std::io::Read,
        out: impl std::io::Write,
        reference_time: time::OffsetDateTime,
        options: Options,
    ) -> Result<Outcome, Error> {
        let a = read_source(source_a, &options.source_a_tag, &options)?;
        let b = read_source(source_b, &options.source_b_tag, &options)?;

        let (rows, outcome) = process(a, b, reference_time, &options);
        table::write_rows(out, &crate::assemble::headers(&options), &rows)?;
        Ok(outcome)
    }

    fn read_source(
        input: impl std::io::Read,
        tag: &str,
        options: &Options,
    ) -> Result<Vec<RawRecord>, Error> {
        let records = table::read_records(input, options.delimiter, &options.key_column, tag)
            .map_err(|source| Error::ReadSource {
                source_tag: tag.to_owned(),
                source,
            })?;
        log::info!("Read {} rows from the {tag} extract", records.len());
        Ok(records)
    }

    /// Sanitize, join and aggregate both sets of records into one output row per distinct key.
    ///
    /// All purchases are aged against the same `reference_time`.
    pub fn process(
        source_a: Vec<RawRecord>,
        source_b: Vec<RawRecord>,
        reference_time: time::OffsetDateTime,
        options: &Options,
    ) -> (Vec<OutputRow>, Outcome) {
        let cleaned = move |records: Vec<RawRecord>| {
            records
                .into_iter()
                .map(move |record| sanitize(record, &options.key_column, &options.currency_glyphs))
        };
        let rows_read = [source_a.len(), source_b.len()];
        let joined = outer_join(
            &options.key_column,
            Source {
                tag: &options.source_a_tag,
                records: cleaned(source_a),
            },
            Source {
                tag: &options.source_b_tag,
                records: cleaned(source_b),
            },
        );

        let cutoff = Cutoff::new(reference_time, options.aging_days);
        log::info!(
            "Merged {} products, purchases before {} count as aged",
            joined.records.len(),
            cutoff.instant()
        );
        let rows: Vec<_> = joined
            .records
            .iter()
            .map(|record| {
                let [a, b] = [&options.source_a_tag, &options.source_b_tag].map(|tag| {
                    aggregate(
                        &purchase_history(record, tag, options.history_limit),
                        &cutoff,
                    )
                });
                assemble(record, [&a, &b], options)
            })
            .collect();

        let outcome = Outcome {
            rows_read,
            skipped_without_key: joined.skipped_without_key,
            duplicate_keys: joined.duplicate_keys,
            rows_written: rows.len(),
        };
        (rows, outcome)
    }
}
