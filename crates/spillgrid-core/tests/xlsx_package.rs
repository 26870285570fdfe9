use spillgrid_core::storage::xlsx::{read_xlsx_from, write_xlsx_to};
use spillgrid_core::{CellRef, CellType, Workbook, apply_dynamic_array_formula};
use std::io::{Cursor, Read};
use zip::ZipArchive;

fn part(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    Some(text)
}

fn package(workbook: &Workbook) -> Vec<u8> {
    write_xlsx_to(Cursor::new(Vec::new()), workbook)
        .unwrap()
        .into_inner()
}

fn sales_workbook() -> Workbook {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut("Sheet").unwrap();
    sheet.set_cell_value(CellRef::parse("A1").unwrap(), "Region");
    sheet.set_cell_value(CellRef::parse("B1").unwrap(), "Sales");
    sheet.set_cell_value(CellRef::parse("A2").unwrap(), "North");
    sheet.set_cell_value(CellRef::parse("B2").unwrap(), 1500.0);
    workbook
}

#[test]
fn plain_workbook_has_no_metadata_part() {
    let bytes = package(&sales_workbook());
    for name in [
        "[Content_Types].xml",
        "_rels/.rels",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/styles.xml",
        "xl/worksheets/sheet1.xml",
    ] {
        assert!(part(&bytes, name).is_some(), "missing {name}");
    }
    assert!(part(&bytes, "xl/metadata.xml").is_none());
}

#[test]
fn dynamic_array_markup_on_disk() {
    let mut workbook = sales_workbook();
    apply_dynamic_array_formula(&mut workbook, "Sheet", "F3", "F9", "=SORT(B2:B8,,-1)").unwrap();
    apply_dynamic_array_formula(&mut workbook, "Sheet", "E20", "E20", "=SEQUENCE(1)").unwrap();
    let bytes = package(&workbook);

    let sheet = part(&bytes, "xl/worksheets/sheet1.xml").unwrap();
    assert!(sheet.contains(
        r#"<c r="F3" cm="1"><f t="array" ref="F3:F9">_xlfn._xlws.SORT(B2:B8,,-1)</f></c>"#
    ));
    assert!(sheet.contains(r#"<f t="array" ref="E20">_xlfn.SEQUENCE(1)</f>"#));
    assert!(!sheet.contains(r#"r="F4""#), "spill members are not stored");
    assert!(sheet.contains(r#"<dimension ref="A1:F20"/>"#));

    let metadata = part(&bytes, "xl/metadata.xml").unwrap();
    assert!(metadata.contains(r#"name="XLDAPR""#));
    assert!(metadata.contains(r#"fDynamic="1""#));

    let content_types = part(&bytes, "[Content_Types].xml").unwrap();
    assert!(content_types.contains("spreadsheetml.sheetMetadata+xml"));
    let rels = part(&bytes, "xl/_rels/workbook.xml.rels").unwrap();
    assert!(rels.contains(r#"Target="metadata.xml""#));
}

#[test]
fn package_reads_back_with_spill_members() {
    let mut workbook = sales_workbook();
    workbook.create_sheet("Report & Notes").unwrap();
    apply_dynamic_array_formula(
        &mut workbook,
        "Report & Notes",
        "A17",
        "C19",
        "=FILTER(Sheet!A2:B8,Sheet!B2:B8>2000)",
    )
    .unwrap();

    let loaded = read_xlsx_from(Cursor::new(package(&workbook))).unwrap();
    assert_eq!(loaded.sheet_names(), vec!["Sheet", "Report & Notes"]);
    assert!(!loaded.modified);

    let data = loaded.sheet("Sheet").unwrap();
    assert_eq!(data.len(), 4);
    assert_eq!(
        data.get(&CellRef::parse("A2").unwrap()).map(|c| c.contents),
        Some(CellType::Text("North".into()))
    );

    let report = loaded.sheet("Report & Notes").unwrap();
    let anchor = CellRef::parse("A17").unwrap();
    match report.get(&anchor).map(|c| c.contents) {
        Some(CellType::ArrayAnchor { formula, range }) => {
            assert_eq!(formula, "=_xlfn._xlws.FILTER(Sheet!A2:B8,Sheet!B2:B8>2000)");
            assert_eq!(range.to_string(), "A17:C19");
        }
        other => panic!("expected anchor, got {other:?}"),
    }
    assert_eq!(report.spill_members_of(&anchor).len(), 8);
}

#[test]
fn saved_file_round_trips_through_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.xlsx");
    let mut workbook = sales_workbook();
    apply_dynamic_array_formula(&mut workbook, "Sheet", "J3", "J5", "=FILTER(B2:B8,A2:A8=\"North\")")
        .unwrap();
    workbook.save(&path).unwrap();

    let loaded = Workbook::load(&path).unwrap();
    let cell = loaded
        .sheet("Sheet")
        .unwrap()
        .get(&CellRef::parse("J3").unwrap())
        .unwrap();
    assert_eq!(
        cell.formula_text(),
        Some("=_xlfn._xlws.FILTER(B2:B8,A2:A8=\"North\")")
    );
}
