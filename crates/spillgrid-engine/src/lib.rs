//! spillgrid_engine - cell references, ranges and dynamic-array formula bindings.

pub mod engine;
pub mod error;

pub use error::{EngineError, Result};

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use crate::error::EngineError;

    #[test]
    fn test_parse_single_letter_columns() {
        let a1 = CellRef::parse("A1").unwrap();
        assert_eq!(a1.row, 0);
        assert_eq!(a1.col, 0);

        let b1 = CellRef::parse("B1").unwrap();
        assert_eq!(b1.row, 0);
        assert_eq!(b1.col, 1);

        let z1 = CellRef::parse("Z1").unwrap();
        assert_eq!(z1.row, 0);
        assert_eq!(z1.col, 25);
    }

    #[test]
    fn test_parse_multi_letter_columns() {
        assert_eq!(CellRef::parse("AA1").unwrap().col, 26);
        assert_eq!(CellRef::parse("AB1").unwrap().col, 27);
        assert_eq!(CellRef::parse("AZ1").unwrap().col, 51);
        assert_eq!(CellRef::parse("BA1").unwrap().col, 52);
    }

    #[test]
    fn test_parse_row_numbers() {
        assert_eq!(CellRef::parse("A1").unwrap().row, 0);
        assert_eq!(CellRef::parse("A10").unwrap().row, 9);
        assert_eq!(CellRef::parse("A100").unwrap().row, 99);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let lower = CellRef::parse("a1").unwrap();
        assert_eq!(lower.row, 0);
        assert_eq!(lower.col, 0);

        let mixed = CellRef::parse("aA1").unwrap();
        assert_eq!(mixed.col, 26);
        assert_eq!(mixed.to_string(), "AA1");
    }

    #[test]
    fn test_parse_invalid_inputs() {
        for input in ["", "123", "ABC", "A0", "1A", "A 1", " A1", "A1 ", "$A$1", "A1:B2", "INVALID", "Sheet!A1", "É1"] {
            assert_eq!(
                CellRef::parse(input),
                Err(EngineError::InvalidReference(input.to_string())),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_from_str_trait() {
        let cell: CellRef = "F3".parse().unwrap();
        assert_eq!(cell, CellRef::new(5, 2));
        assert!("F0".parse::<CellRef>().is_err());
    }

    #[test]
    fn test_bind_end_to_end() {
        let range = CellRange::from_refs("F3", "F9").unwrap();
        let binding = SpillBinding::bind(range, "=SORT(B2:B8,,-1)").unwrap();
        assert_eq!(binding.anchor().to_string(), "F3");
        assert_eq!(binding.range().to_string(), "F3:F9");
        assert_eq!(binding.formula(), "=_xlfn._xlws.SORT(B2:B8,,-1)");
        assert_eq!(binding.members().count(), 6);
    }
}
