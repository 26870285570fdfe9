use super::*;
use crate::document::{Workbook, Worksheet};
use crate::error::{Result, SpillgridError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use spillgrid_engine::engine::{Cell, CellRange, CellRef};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Load an .xlsx file.
pub fn read_xlsx(path: &Path) -> Result<Workbook> {
    let file = File::open(path).map_err(|e| SpillgridError::io("open", path, e))?;
    read_xlsx_from(BufReader::new(file))
}

/// Load an .xlsx package from any seekable reader.
///
/// Values, formulas and dynamic-array anchors are kept; styles and
/// everything else in the package are ignored.
pub fn read_xlsx_from<R: Read + Seek>(reader: R) -> Result<Workbook> {
    let mut archive = ZipArchive::new(reader)?;

    let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?
        .ok_or_else(|| SpillgridError::Xlsx(format!("missing {}", WORKBOOK_PART)))?;
    let rels_xml = read_part(&mut archive, WORKBOOK_RELS_PART)?
        .ok_or_else(|| SpillgridError::Xlsx(format!("missing {}", WORKBOOK_RELS_PART)))?;
    let shared_strings = match read_part(&mut archive, SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let targets = parse_relationships(&rels_xml)?;
    let mut workbook = Workbook::empty();
    for (name, rel_id) in parse_sheet_list(&workbook_xml)? {
        let target = targets.get(&rel_id).ok_or_else(|| {
            SpillgridError::Xlsx(format!("sheet '{}' has no relationship {}", name, rel_id))
        })?;
        let part = resolve_target(target);
        let xml = read_part(&mut archive, &part)?
            .ok_or_else(|| SpillgridError::Xlsx(format!("missing {}", part)))?;

        let sheet = workbook.create_sheet(&name)?;
        parse_sheet(&xml, &shared_strings, sheet)?;
        sheet.rebuild_spill_members(true);
        debug!(sheet = %name, cells = sheet.len(), "loaded worksheet");
    }

    if workbook.sheets.is_empty() {
        return Err(SpillgridError::Xlsx("workbook has no sheets".to_string()));
    }
    workbook.modified = false;
    Ok(workbook)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut text = String::new();
    file.take(MAX_PART_BYTES + 1)
        .read_to_string(&mut text)
        .map_err(|e| SpillgridError::Xlsx(format!("cannot read {}: {}", name, e)))?;
    if text.len() as u64 > MAX_PART_BYTES {
        return Err(SpillgridError::Xlsx(format!(
            "{} exceeds {} bytes",
            name, MAX_PART_BYTES
        )));
    }
    Ok(Some(text))
}

/// Relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// `(name, relationship id)` for every `<sheet>` in tab order.
fn parse_sheet_list(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr_value(&e, b"name")?;
                let id = attr_value(&e, b"id")?;
                match (name, id) {
                    (Some(name), Some(id)) => sheets.push((name, id)),
                    _ => return Err(SpillgridError::Xlsx("<sheet> without name or r:id".into())),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id")?, attr_value(&e, b"Target")?) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

/// Plain text of every `<si>`, ignoring phonetic runs.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    let mut in_phonetic = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" => in_t = !in_phonetic,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(e) if in_t => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&e.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.extend(current.take()),
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

#[derive(Default)]
struct PendingCell {
    reference: Option<String>,
    value_type: Option<String>,
    formula: Option<String>,
    formula_type: Option<String>,
    formula_ref: Option<String>,
    value: Option<String>,
    inline: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Capture {
    None,
    Formula,
    Value,
    Inline,
}

fn parse_sheet(xml: &str, shared_strings: &[String], sheet: &mut Worksheet) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut cell: Option<PendingCell> = None;
    let mut capture = Capture::None;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"c" => {
                    cell = Some(PendingCell {
                        reference: attr_value(&e, b"r")?,
                        value_type: attr_value(&e, b"t")?,
                        ..PendingCell::default()
                    });
                }
                b"f" => {
                    if let Some(c) = cell.as_mut() {
                        c.formula_type = attr_value(&e, b"t")?;
                        c.formula_ref = attr_value(&e, b"ref")?;
                        c.formula = Some(String::new());
                        capture = Capture::Formula;
                    }
                }
                b"v" if cell.is_some() => capture = Capture::Value,
                b"t" if cell.is_some() => capture = Capture::Inline,
                _ => {}
            },
            Event::Text(e) if capture != Capture::None => {
                let text = e.unescape()?;
                if let Some(c) = cell.as_mut() {
                    let slot = match capture {
                        Capture::Formula => &mut c.formula,
                        Capture::Value => &mut c.value,
                        Capture::Inline => &mut c.inline,
                        Capture::None => continue,
                    };
                    slot.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(pending) = cell.take() {
                        store_cell(pending, shared_strings, sheet);
                    }
                    capture = Capture::None;
                }
                b"f" | b"v" | b"t" => capture = Capture::None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn store_cell(pending: PendingCell, shared_strings: &[String], sheet: &mut Worksheet) {
    let Some(reference) = pending.reference else {
        warn!(sheet = sheet.name(), "skipping cell without reference");
        return;
    };
    let Ok(cell_ref) = CellRef::parse(&reference) else {
        warn!(sheet = sheet.name(), reference = %reference, "skipping cell with invalid reference");
        return;
    };

    if let Some(formula) = pending.formula.filter(|f| !f.is_empty()) {
        let formula = format!("={}", formula);
        if pending.formula_type.as_deref() == Some("array") {
            let range = pending
                .formula_ref
                .as_deref()
                .and_then(|r| CellRange::parse(r).ok())
                .filter(|range| range.start() == cell_ref);
            match range {
                Some(range) => sheet.mark_cell_as_array_anchor(cell_ref, &formula, range),
                None => {
                    warn!(sheet = sheet.name(), cell = %cell_ref, "array formula with unusable ref, keeping as plain formula");
                    sheet.set_formula(cell_ref, &formula);
                }
            }
        } else {
            sheet.set_formula(cell_ref, &formula);
        }
        return;
    }

    let value = pending.value;
    let cell = match pending.value_type.as_deref() {
        Some("s") => {
            let text = value
                .as_deref()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .and_then(|idx| shared_strings.get(idx));
            match text {
                Some(text) => Cell::new_text(text),
                None => {
                    warn!(sheet = sheet.name(), cell = %cell_ref, "shared string index out of range");
                    return;
                }
            }
        }
        Some("inlineStr") => Cell::new_text(pending.inline.as_deref().unwrap_or("")),
        Some("str") => Cell::new_text(value.as_deref().unwrap_or("")),
        Some("b") => Cell::new_bool(value.as_deref().map(str::trim) == Some("1")),
        Some("e") => {
            debug!(sheet = sheet.name(), cell = %cell_ref, "skipping error value");
            return;
        }
        _ => match value.as_deref().map(|v| v.trim().parse::<f64>()) {
            Some(Ok(n)) => Cell::new_number(n),
            Some(Err(_)) => {
                warn!(sheet = sheet.name(), cell = %cell_ref, "skipping unparseable number");
                return;
            }
            None => return,
        },
    };
    sheet.set_cell(cell_ref, cell);
}
