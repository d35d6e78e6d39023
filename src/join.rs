use crate::value::{RawRecord, Value};
use std::collections::BTreeMap;

/// All fields known about one product, with each column name suffixed by the tag of the source it came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedRecord {
    /// The key shared by all sources that contributed to this record.
    pub key: String,
    /// Fields named `<column> <tag>`.
    pub fields: BTreeMap<String, Value>,
}

impl MergedRecord {
    /// Return the value of `column` as provided by the source with `tag`.
    pub fn get(&self, column: &str, tag: &str) -> Option<&Value> {
        self.fields.get(&tagged(column, tag))
    }

    /// Like [`get()`][Self::get()], but only returns values that are not empty.
    pub fn get_present(&self, column: &str, tag: &str) -> Option<&Value> {
        self.get(column, tag).filter(|v| v.is_present())
    }

    fn absorb(&mut self, record: RawRecord, tag: &str) {
        self.fields.extend(
            record
                .into_iter()
                .map(|(column, value)| (tagged(&column, tag), value)),
        );
    }
}

/// The name of `column` once it was merged from the source with `tag`.
pub fn tagged(column: &str, tag: &str) -> String {
    format!("{column} {tag}")
}

/// One of the two extracts to join, along with its tag.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a, I> {
    pub tag: &'a str,
    pub records: I,
}

pub struct Outcome {
    /// One record per distinct key, in order of first appearance.
    pub records: Vec<MergedRecord>,
    /// The amount of rows that were dropped as they had no key.
    pub skipped_without_key: usize,
    /// The amount of rows whose key was seen before in the same source.
    pub duplicate_keys: usize,
}

/// Join the records of `a` and `b` on `key_column`, keeping records that exist in only one of them.
///
/// Rows of `a` with a key seen before in `a` replace the earlier row entirely. Rows of `b` are merged into
/// whatever is already present for their key. Keys only found in `b` get a `<key_column> <b-tag>` field.
pub fn outer_join(
    key_column: &str,
    a: Source<'_, impl IntoIterator<Item = RawRecord>>,
    b: Source<'_, impl IntoIterator<Item = RawRecord>>,
) -> Outcome {
    let mut out = Outcome {
        records: Vec::new(),
        skipped_without_key: 0,
        duplicate_keys: 0,
    };
    let mut index_by_key = BTreeMap::<String, usize>::new();

    for record in a.records {
        let Some(key) = key_of(&record, key_column) else {
            log::debug!("Skipping row of {} without '{key_column}'", a.tag);
            out.skipped_without_key += 1;
            continue;
        };
        let merged = match index_by_key.get(&key) {
            Some(&idx) => {
                log::debug!("Key '{key}' appears more than once in {}, keeping the last row", a.tag);
                out.duplicate_keys += 1;
                let merged = &mut out.records[idx];
                merged.fields.clear();
                merged
            }
            None => {
                index_by_key.insert(key.clone(), out.records.len());
                out.records.push(MergedRecord {
                    key,
                    fields: BTreeMap::new(),
                });
                out.records.last_mut().expect("just pushed")
            }
        };
        merged.absorb(record, a.tag);
    }

    let mut seen_in_b = std::collections::BTreeSet::<String>::new();
    for record in b.records {
        let Some(key) = key_of(&record, key_column) else {
            log::debug!("Skipping row of {} without '{key_column}'", b.tag);
            out.skipped_without_key += 1;
            continue;
        };
        if !seen_in_b.insert(key.clone()) {
            log::debug!("Key '{key}' appears more than once in {}, merging its rows", b.tag);
            out.duplicate_keys += 1;
        }
        let merged = match index_by_key.get(&key) {
            Some(&idx) => &mut out.records[idx],
            None => {
                index_by_key.insert(key.clone(), out.records.len());
                let mut fields = BTreeMap::new();
                fields.insert(tagged(key_column, b.tag), Value::Text(key.clone()));
                out.records.push(MergedRecord { key, fields });
                out.records.last_mut().expect("just pushed")
            }
        };
        merged.absorb(record, b.tag);
    }
    out
}

fn key_of(record: &RawRecord, key_column: &str) -> Option<String> {
    record
        .get(key_column)
        .filter(|v| v.is_present())
        .map(ToString::to_string)
}
