use super::*;
use crate::document::{Workbook, Worksheet};
use crate::error::{Result, SpillgridError};
use quick_xml::escape::escape;
use spillgrid_engine::engine::CellType;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// `cm` index of the dynamic-array record in `xl/metadata.xml` (1-based).
const DYNAMIC_ARRAY_CELL_METADATA: u32 = 1;

const METADATA_XML: &str = r#"<metadata xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:xda="http://schemas.microsoft.com/office/spreadsheetml/2017/dynamicarray"><metadataTypes count="1"><metadataType name="XLDAPR" minSupportedVersion="120000" copy="1" pasteAll="1" pasteValues="1" merge="1" splitFirst="1" rowColShift="1" clearFormats="1" clearComments="1" assign="1" coerce="1" cellMeta="1"/></metadataTypes><futureMetadata name="XLDAPR" count="1"><bk><extLst><ext uri="{bdbb8cdc-fa1e-496e-a857-3c3f30c029c3}"><xda:dynamicArrayProperties fDynamic="1" fCollapsed="0"/></ext></extLst></bk></futureMetadata><cellMetadata count="1"><bk><rc t="1" v="0"/></bk></cellMetadata></metadata>"#;

const STYLES_XML: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Write `workbook` to an .xlsx file at `path`.
pub fn write_xlsx(path: &Path, workbook: &Workbook) -> Result<()> {
    let file = File::create(path).map_err(|e| SpillgridError::io("create", path, e))?;
    let mut out = write_xlsx_to(BufWriter::new(file), workbook)?;
    out.flush().map_err(|e| SpillgridError::io("write", path, e))
}

/// Write `workbook` as an .xlsx package into `writer`, returning it once finished.
pub fn write_xlsx_to<W: Write + Seek>(writer: W, workbook: &Workbook) -> Result<W> {
    let has_dynamic_arrays = workbook.sheets.iter().any(has_array_anchor);

    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);
    let mut put = |name: &str, body: &str| -> Result<()> {
        zip.start_file(name, options)?;
        zip.write_all(XML_DECL.as_bytes()).map_err(ZipError::Io)?;
        zip.write_all(body.as_bytes()).map_err(ZipError::Io)?;
        Ok(())
    };

    put("[Content_Types].xml", &content_types_xml(workbook, has_dynamic_arrays))?;
    put("_rels/.rels", &root_rels_xml())?;
    put(WORKBOOK_PART, &workbook_xml(workbook))?;
    put(WORKBOOK_RELS_PART, &workbook_rels_xml(workbook, has_dynamic_arrays))?;
    put("xl/styles.xml", STYLES_XML)?;
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        put(&format!("xl/worksheets/sheet{}.xml", idx + 1), &sheet_xml(sheet))?;
    }
    if has_dynamic_arrays {
        put(METADATA_PART, METADATA_XML)?;
    }

    debug!(
        sheets = workbook.sheets.len(),
        dynamic_arrays = has_dynamic_arrays,
        "wrote xlsx package"
    );
    Ok(zip.finish()?)
}

fn has_array_anchor(sheet: &Worksheet) -> bool {
    sheet
        .grid
        .iter()
        .any(|entry| matches!(entry.value().contents, CellType::ArrayAnchor { .. }))
}

fn content_types_xml(workbook: &Workbook, has_dynamic_arrays: bool) -> String {
    let mut xml = String::from(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    for idx in 1..=workbook.sheets.len() {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    if has_dynamic_arrays {
        xml.push_str(r#"<Override PartName="/xl/metadata.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheetMetadata+xml"/>"#);
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        r#"<Relationships xmlns="{NS_PACKAGE_REL}"><Relationship Id="rId1" Type="{REL_OFFICE_DOCUMENT}" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut xml = format!(r#"<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets>"#);
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        let n = idx + 1;
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape(sheet.name())
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(workbook: &Workbook, has_dynamic_arrays: bool) -> String {
    let mut xml = format!(r#"<Relationships xmlns="{NS_PACKAGE_REL}">"#);
    let sheet_count = workbook.sheets.len();
    for n in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="{REL_WORKSHEET}" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{REL_STYLES}" Target="styles.xml"/>"#,
        sheet_count + 1
    ));
    if has_dynamic_arrays {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_SHEET_METADATA}" Target="metadata.xml"/>"#,
            sheet_count + 2
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn sheet_xml(sheet: &Worksheet) -> String {
    let dimension = sheet
        .dimension()
        .map(|range| {
            if range.is_single_cell() {
                range.start().to_string()
            } else {
                range.to_string()
            }
        })
        .unwrap_or_else(|| "A1".to_string());

    let mut xml = format!(r#"<worksheet xmlns="{NS_MAIN}"><dimension ref="{dimension}"/><sheetData>"#);
    let mut open_row: Option<usize> = None;
    for (cell_ref, cell) in sheet.cells_sorted() {
        let Some(cell_xml) = cell_xml(&cell_ref.to_string(), &cell.contents) else {
            continue;
        };
        if open_row != Some(cell_ref.row) {
            if open_row.is_some() {
                xml.push_str("</row>");
            }
            xml.push_str(&format!(r#"<row r="{}">"#, cell_ref.row_number()));
            open_row = Some(cell_ref.row);
        }
        xml.push_str(&cell_xml);
    }
    if open_row.is_some() {
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Markup for one cell, or `None` for cells that are not stored.
fn cell_xml(r: &str, contents: &CellType) -> Option<String> {
    let xml = match contents {
        CellType::Empty | CellType::SpillMember { .. } => return None,
        CellType::Number(n) => format!(r#"<c r="{r}"><v>{n}</v></c>"#),
        CellType::Bool(b) => format!(r#"<c r="{r}" t="b"><v>{}</v></c>"#, u8::from(*b)),
        CellType::Text(s) => {
            let space = if s.trim() != s { r#" xml:space="preserve""# } else { "" };
            format!(r#"<c r="{r}" t="inlineStr"><is><t{space}>{}</t></is></c>"#, escape(s.as_str()))
        }
        CellType::Formula(f) => format!(r#"<c r="{r}"><f>{}</f></c>"#, escape(ooxml_formula(f))),
        CellType::ArrayAnchor { formula, range } => {
            let reference = if range.is_single_cell() {
                range.start().to_string()
            } else {
                range.to_string()
            };
            format!(
                r#"<c r="{r}" cm="{DYNAMIC_ARRAY_CELL_METADATA}"><f t="array" ref="{reference}">{}</f></c>"#,
                escape(ooxml_formula(formula))
            )
        }
    };
    Some(xml)
}

/// SpreadsheetML stores formulas without the leading `=`.
fn ooxml_formula(formula: &str) -> &str {
    formula.strip_prefix('=').unwrap_or(formula)
}
