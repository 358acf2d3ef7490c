//! Heading numbering after expansion.
//!
//! Walks the expanded page and prefixes every `h2`..`h4` with a section number
//! below the page's own section, adding an anchor where the heading has none.
//! Each heading is registered in the table of contents.

use std::io::Cursor;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use specpub_tracking::{SectionNumber, TableOfContents, TocEntry, TocInsert};

use crate::error::ExpandError;

/// Heading levels that are numbered, outermost first.
const NUMBERED: [&[u8]; 3] = [b"h2", b"h3", b"h4"];

/// A heading whose text is being collected.
struct OpenHeading {
    tag: Vec<u8>,
    number: SectionNumber,
    anchor: String,
    text: String,
}

/// Number the headings of an expanded page.
///
/// # Errors
///
/// Returns [`ExpandError::PostPass`] if the page cannot be tokenized.
pub fn number_headings(
    html: &str,
    section: &SectionNumber,
    file: &str,
    toc: &mut TableOfContents,
) -> Result<String, ExpandError> {
    let fail = |message: String| ExpandError::PostPass {
        file: file.to_owned(),
        message,
    };

    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);

    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(html.len() + 256)));
    let mut counters = [0u32; NUMBERED.len()];
    let mut open: Option<OpenHeading> = None;

    loop {
        let event = reader.read_event().map_err(|e| fail(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(ref start) if open.is_none() => {
                let Some(level) = heading_level(start.name().as_ref()) else {
                    writer.write_event(event).map_err(|e| fail(e.to_string()))?;
                    continue;
                };
                let number = next_number(section, &mut counters, level);
                let (elem, anchor) = with_anchor(start, &number);
                let label = format!("{number} ");
                writer
                    .write_event(Event::Start(elem))
                    .map_err(|e| fail(e.to_string()))?;
                writer
                    .write_event(Event::Text(BytesText::new(&label)))
                    .map_err(|e| fail(e.to_string()))?;
                open = Some(OpenHeading {
                    tag: start.name().as_ref().to_ascii_lowercase(),
                    number,
                    anchor,
                    text: String::new(),
                });
            }
            Event::Text(ref text) => {
                if let Some(heading) = open.as_mut() {
                    heading.text.push_str(&String::from_utf8_lossy(text));
                }
                writer.write_event(event).map_err(|e| fail(e.to_string()))?;
            }
            Event::GeneralRef(ref name) => {
                if let Some(heading) = open.as_mut() {
                    heading.text.push('&');
                    heading.text.push_str(&String::from_utf8_lossy(name));
                    heading.text.push(';');
                }
                writer.write_event(event).map_err(|e| fail(e.to_string()))?;
            }
            Event::End(ref end) => {
                let closes = open
                    .as_ref()
                    .is_some_and(|h| end.name().as_ref().eq_ignore_ascii_case(&h.tag));
                if closes && let Some(heading) = open.take() {
                    register(toc, heading, file);
                }
                writer.write_event(event).map_err(|e| fail(e.to_string()))?;
            }
            other => writer.write_event(other).map_err(|e| fail(e.to_string()))?,
        }
    }

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| fail(e.to_string()))
}

fn heading_level(name: &[u8]) -> Option<usize> {
    NUMBERED.iter().position(|tag| name.eq_ignore_ascii_case(tag))
}

/// Advance the counter for `level` and build the heading's number.
///
/// Deeper counters restart; a skipped outer level counts as 1.
fn next_number(section: &SectionNumber, counters: &mut [u32], level: usize) -> SectionNumber {
    counters[level] += 1;
    for deeper in &mut counters[level + 1..] {
        *deeper = 0;
    }
    counters[..=level]
        .iter_mut()
        .fold(section.clone(), |number, counter| {
            *counter = (*counter).max(1);
            number.child(*counter)
        })
}

/// Copy of the start tag with an `id`, plus the anchor to link to.
fn with_anchor(start: &BytesStart<'_>, number: &SectionNumber) -> (BytesStart<'static>, String) {
    let existing = start
        .attributes()
        .with_checks(false)
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(b"id"))
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());

    let mut elem = start.clone().into_owned();
    if let Some(anchor) = existing {
        return (elem, anchor);
    }
    let anchor = number.to_string();
    elem.push_attribute(("id", anchor.as_str()));
    (elem, anchor)
}

fn register(toc: &mut TableOfContents, heading: OpenHeading, file: &str) {
    let link = format!("{file}#{}", heading.anchor);
    let entry = TocEntry::new(heading.number, heading.text.trim(), link);
    if toc.insert(entry) != TocInsert::Added {
        tracing::debug!(page = file, anchor = %heading.anchor, "Heading not added to contents");
    }
}
