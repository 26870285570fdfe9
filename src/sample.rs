//! Demo workbook: a week of regional sales plus one example of each
//! dynamic-array function, laid out so no two spill ranges overlap.

use spillgrid_core::{
    CellRef, CellValue, DEFAULT_SHEET_NAME, Result, Workbook, apply_dynamic_array_formula,
};

const SALES: [(&str, i64, &str); 7] = [
    ("2024-01-01", 1500, "North"),
    ("2024-01-02", 2300, "South"),
    ("2024-01-03", 1800, "North"),
    ("2024-01-04", 2100, "East"),
    ("2024-01-05", 1900, "North"),
    ("2024-01-06", 2500, "South"),
    ("2024-01-07", 1700, "East"),
];

/// `(label cell, label, start, end, formula)` for each demo formula.
const SPILLS: [(&str, &str, &str, &str, &str); 5] = [
    ("E3", "Top Sales (Sorted):", "F3", "F9", "=SORT(B2:B8,,-1)"),
    ("E12", "Unique Regions:", "F12", "F14", "=UNIQUE(C2:C8)"),
    ("I3", "North Sales:", "J3", "J5", "=FILTER(B2:B8,C2:C8=\"North\")"),
    ("A16", "Sales > 2000:", "A17", "C19", "=FILTER(A2:C8,B2:B8>2000)"),
    ("D20", "Numbers:", "E20", "E26", "=SEQUENCE(7)"),
];

/// Build the demo workbook. Returns it with one confirmation per formula.
pub fn build_sample() -> Result<(Workbook, Vec<String>)> {
    let mut workbook = Workbook::new();
    let sheet = DEFAULT_SHEET_NAME;

    let mut rows = vec![vec![
        CellValue::from("Date"),
        CellValue::from("Sales"),
        CellValue::from("Region"),
    ]];
    rows.extend(SALES.iter().map(|(date, sales, region)| {
        vec![
            CellValue::from(*date),
            CellValue::from(*sales),
            CellValue::from(*region),
        ]
    }));

    let ws = workbook.sheet_mut(sheet)?;
    ws.write_rows(CellRef::new(0, 0), &rows)?;
    ws.set_cell_value(CellRef::parse("E1")?, "Analysis with SPILL Functions");
    for (label_cell, label, ..) in SPILLS {
        ws.set_cell_value(CellRef::parse(label_cell)?, label);
    }

    let mut messages = Vec::with_capacity(SPILLS.len());
    for (_, _, start, end, formula) in SPILLS {
        messages.push(apply_dynamic_array_formula(
            &mut workbook,
            sheet,
            start,
            end,
            formula,
        )?);
    }
    Ok((workbook, messages))
}
