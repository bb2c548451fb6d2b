use std::collections::HashMap;

use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::tags::{attr_value, local_name};

/// One `LigneBudget` element flattened to column → value.
///
/// The column set varies per record: repeated `MtSup` / `CaracSup`
/// children are told apart by their `Code` attribute (`MtSup_<code>`),
/// every other child contributes its bare tag name. `LigneBudget_id` is
/// always present.
pub type RawRecord = HashMap<String, String>;

/// Column holding the record element's `id` attribute.
pub const RECORD_ID_COLUMN: &str = "LigneBudget_id";

/// Streaming reader yielding one [`RawRecord`] per `LigneBudget` in
/// document order.
///
/// Only the record currently being assembled is held in memory. A reader
/// is one-shot; create a new one to scan the document again.
pub struct LineReader<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
}

impl<'a> LineReader<'a> {
    pub fn new(xml: &'a [u8]) -> Self {
        LineReader {
            reader: Reader::from_reader(xml),
            buf: Vec::new(),
        }
    }

    /// The next budget line, or `None` once the document is exhausted.
    pub fn next_record(&mut self) -> Result<Option<RawRecord>> {
        let mut record: Option<RawRecord> = None;
        // Open elements below the LigneBudget currently being read.
        let mut depth = 0usize;
        let mut pending: Option<PendingChild> = None;

        loop {
            let mut yielded: Option<RawRecord> = None;
            let mut eof = false;

            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) => {
                    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                    let tag = local_name(&name);
                    if record.is_none() {
                        if tag == "LigneBudget" {
                            record = Some(new_record(e)?);
                            depth = 0;
                        }
                    } else {
                        depth += 1;
                        if depth == 1 {
                            pending = Some(PendingChild {
                                column: child_column(tag, e)?,
                                v: attr_value(e, b"V")?,
                                text: String::new(),
                                has_children: false,
                            });
                        } else if let Some(pending) = pending.as_mut() {
                            pending.has_children = true;
                        }
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                    let tag = local_name(&name);
                    match record.as_mut() {
                        None => {
                            if tag == "LigneBudget" {
                                // Self-closing record: only the id column.
                                yielded = Some(new_record(e)?);
                            }
                        }
                        Some(row) => {
                            if depth == 0 {
                                let value = attr_value(e, b"V")?.unwrap_or_default();
                                row.insert(child_column(tag, e)?, value);
                            } else if let Some(pending) = pending.as_mut() {
                                pending.has_children = true;
                            }
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if depth == 1 {
                        if let Some(pending) = pending.as_mut() {
                            // Direct text only; anything after the first
                            // grandchild belongs to that grandchild's tail.
                            if !pending.has_children {
                                pending.text.push_str(&e.unescape()?);
                            }
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(row) = record.as_mut() {
                        if depth == 1 {
                            if let Some(pending) = pending.take() {
                                let column = pending.column.clone();
                                row.insert(column, pending.into_value());
                            }
                            depth = 0;
                        } else if depth == 0 {
                            yielded = record.take();
                        } else {
                            depth -= 1;
                        }
                    }
                }
                Ok(Event::Eof) => {
                    if record.is_some() {
                        return Err(anyhow::anyhow!(
                            "Error parsing XML: end of document inside LigneBudget"
                        ));
                    }
                    eof = true;
                }
                Err(e) => return Err(anyhow::anyhow!("Error parsing XML: {}", e)),
                _ => (),
            }
            self.buf.clear();

            if yielded.is_some() {
                return Ok(yielded);
            }
            if eof {
                return Ok(None);
            }
        }
    }
}

struct PendingChild {
    column: String,
    v: Option<String>,
    text: String,
    has_children: bool,
}

impl PendingChild {
    fn into_value(self) -> String {
        // A V attribute wins even when empty; text content is a fallback.
        match self.v {
            Some(v) => v,
            None => self.text.trim().to_string(),
        }
    }
}

fn new_record(e: &BytesStart) -> Result<RawRecord> {
    let mut row = RawRecord::new();
    row.insert(
        RECORD_ID_COLUMN.to_string(),
        attr_value(e, b"id")?.unwrap_or_default(),
    );
    Ok(row)
}

fn child_column(tag: &str, e: &BytesStart) -> Result<String> {
    if tag == "MtSup" || tag == "CaracSup" {
        let code = attr_value(e, b"Code")?.unwrap_or_default();
        let code = code.trim();
        if !code.is_empty() {
            return Ok(format!("{}_{}", tag, code));
        }
    }
    Ok(tag.to_string())
}
