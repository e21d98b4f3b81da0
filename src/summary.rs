use std::io::{Read, Write};

use indexmap::IndexMap;
use json_decoder::{Decoder, DecoderOptions, Value};
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;

/// What gets printed for every decoded value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueSummary {
    pub source: String,
    /// Position of the value within its source, starting at 0.
    pub index: u64,
    pub kind: &'static str,
    /// Number of values in the tree, the root included.
    pub nodes: u64,
    /// Container nesting depth. 0 for scalars, 1 for a flat array or object.
    pub max_depth: usize,
    /// Byte offset at which the value starts.
    pub start: u64,
    /// Byte offset just past the value and the whitespace after it.
    pub end: u64,
    /// Sorted keys of a top-level object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

impl ValueSummary {
    pub fn new(source: &str, index: u64, value: &Value, start: u64, end: u64) -> Self {
        let mut shape = Shape::default();
        shape.measure(value, 0);
        ValueSummary {
            source: source.to_owned(),
            index,
            kind: value.kind().as_str(),
            nodes: shape.nodes,
            max_depth: shape.max_depth,
            start,
            end,
            keys: None,
        }
    }

    pub fn with_keys(mut self, value: &Value) -> Self {
        if let Some(m) = value.as_object() {
            let mut keys: Vec<String> = m.keys().cloned().collect();
            keys.sort_unstable();
            self.keys = Some(keys);
        }
        self
    }
}

#[derive(Debug, Default)]
struct Shape {
    nodes: u64,
    max_depth: usize,
}

impl Shape {
    fn measure(&mut self, value: &Value, depth: usize) {
        self.nodes += 1;
        match value {
            Value::Object(m) => {
                self.max_depth = self.max_depth.max(depth + 1);
                for v in m.values() {
                    self.measure(v, depth + 1);
                }
            }
            Value::Array(a) => {
                self.max_depth = self.max_depth.max(depth + 1);
                for v in a {
                    self.measure(v, depth + 1);
                }
            }
            Value::Number(_) | Value::String(_) | Value::Bool(_) | Value::Null => {}
        }
    }
}

/// Counters over every input, in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub values: u64,
    pub errors: u64,
    pub kinds: IndexMap<&'static str, u64>,
    /// How many top-level objects had each key.
    pub key_counts: IndexMap<String, u64>,
}

impl Totals {
    fn record(&mut self, summary: &ValueSummary) {
        self.values += 1;
        *self.kinds.entry(summary.kind).or_insert(0) += 1;
        for key in summary.keys.iter().flatten() {
            *self.key_counts.entry(key.clone()).or_insert(0) += 1;
        }
    }
}

#[derive(Serialize)]
struct TotalsLine<'a> {
    totals: &'a Totals,
}

/// Decodes inputs and writes one JSON line per decoded value to `out`.
pub struct Summarizer<W: Write> {
    out: W,
    options: DecoderOptions,
    include_keys: bool,
    totals: Totals,
}

impl<W: Write> Summarizer<W> {
    pub fn new(out: W, options: DecoderOptions, include_keys: bool) -> Self {
        Summarizer {
            out,
            options,
            include_keys,
            totals: Totals::default(),
        }
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Summarizes every value in `reader`. A decode error ends this input,
    /// since the decoder cannot find the start of the next value after it.
    pub fn summarize<R: Read>(&mut self, source_name: &str, reader: R) -> Result<(), CliError> {
        let mut decoder = Decoder::with_options(reader, self.options);
        let mut index = 0;
        loop {
            let start = decoder.location().byte_offset;
            let value = match decoder.decode() {
                Ok(Some(value)) => value,
                Ok(None) => break,
                Err(source) => {
                    self.totals.errors += 1;
                    return Err(CliError::Decode {
                        source_name: source_name.to_owned(),
                        source,
                    });
                }
            };

            let end = decoder.location().byte_offset;
            let mut summary = ValueSummary::new(source_name, index, &value, start, end);
            if self.include_keys {
                summary = summary.with_keys(&value);
            }
            self.totals.record(&summary);
            serde_json::to_writer(&mut self.out, &summary)?;
            self.out.write_all(b"\n")?;
            index += 1;
        }
        debug!(source = source_name, values = index, "finished input");
        Ok(())
    }

    /// Writes the totals line and flushes the output.
    pub fn finish(mut self) -> Result<Totals, CliError> {
        serde_json::to_writer(
            &mut self.out,
            &TotalsLine {
                totals: &self.totals,
            },
        )?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(self.totals)
    }
}
