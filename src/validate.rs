use crate::types::{Piece, Project, SheetPiece, Stock, ValidationResult};

/// Caps on pathological inputs. `max_units` bounds the expanded demand so
/// a single request cannot imply an unbounded packing run; `sanity_units`
/// is the stock-unit count above which the demand is probably a typo.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_units: u64,
    pub sanity_units: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_units: 10_000,
            sanity_units: 100,
        }
    }
}

/// Checks a linear piece set against a bar project. Pure: inputs are
/// untouched and every problem is reported in one pass.
pub fn validate_pieces(pieces: &[Piece], project: &Project, limits: &Limits) -> ValidationResult {
    let mut check = ValidationResult::ok();

    let bar_length = match project.stock {
        Stock::Bar { length } => length,
        Stock::Sheet { .. } => {
            check.push_error(format!(
                "project '{}' stocks {}, but linear pieces were supplied",
                project.name, project.stock
            ));
            return check;
        }
    };

    if bar_length == 0 {
        check.push_error("bar length must be positive");
    }

    if pieces.is_empty() {
        check.push_error("no pieces supplied");
    }

    let mut total_units: u64 = 0;
    let mut total_demand: u64 = 0;

    for (idx, piece) in pieces.iter().enumerate() {
        if piece.length == 0 {
            check.push_error(format!("piece {idx}: length must be positive"));
        }
        if piece.quantity == 0 {
            check.push_error(format!("piece {idx}: quantity must be at least 1"));
        }
        if piece.length > bar_length {
            check.push_error(format!(
                "piece {idx}: length {}mm exceeds bar length {bar_length}mm",
                piece.length
            ));
        } else if piece.length as u64 * 10 > bar_length as u64 * 9 {
            check.push_warning(format!(
                "piece {idx}: length {}mm uses more than 90% of the bar",
                piece.length
            ));
        }
        total_units += piece.quantity as u64;
        total_demand += piece.length as u64 * piece.quantity as u64;
    }

    finish(&mut check, total_units, total_demand, bar_length as u64, limits);
    check
}

/// Sheet counterpart of [`validate_pieces`].
pub fn validate_sheet_pieces(
    pieces: &[SheetPiece],
    project: &Project,
    limits: &Limits,
) -> ValidationResult {
    let mut check = ValidationResult::ok();

    let (sheet_w, sheet_h) = match project.stock {
        Stock::Sheet { width, height } => (width, height),
        Stock::Bar { .. } => {
            check.push_error(format!(
                "project '{}' stocks {}, but sheet pieces were supplied",
                project.name, project.stock
            ));
            return check;
        }
    };

    if sheet_w == 0 || sheet_h == 0 {
        check.push_error("sheet dimensions must be positive");
    }

    if pieces.is_empty() {
        check.push_error("no pieces supplied");
    }

    let mut total_units: u64 = 0;
    let mut total_demand: u64 = 0;

    for (idx, piece) in pieces.iter().enumerate() {
        if piece.width == 0 || piece.height == 0 {
            check.push_error(format!("piece {idx}: dimensions must be positive"));
        }
        if piece.quantity == 0 {
            check.push_error(format!("piece {idx}: quantity must be at least 1"));
        }
        if piece.width > sheet_w {
            check.push_error(format!(
                "piece {idx}: width {}mm exceeds sheet width {sheet_w}mm",
                piece.width
            ));
        } else if piece.width as u64 * 10 > sheet_w as u64 * 9 {
            check.push_warning(format!(
                "piece {idx}: width {}mm uses more than 90% of the sheet width",
                piece.width
            ));
        }
        if piece.height > sheet_h {
            check.push_error(format!(
                "piece {idx}: height {}mm exceeds sheet height {sheet_h}mm",
                piece.height
            ));
        } else if piece.height as u64 * 10 > sheet_h as u64 * 9 {
            check.push_warning(format!(
                "piece {idx}: height {}mm uses more than 90% of the sheet height",
                piece.height
            ));
        }
        total_units += piece.quantity as u64;
        total_demand += piece.area() * piece.quantity as u64;
    }

    finish(
        &mut check,
        total_units,
        total_demand,
        project.stock.capacity(),
        limits,
    );
    check
}

fn finish(
    check: &mut ValidationResult,
    total_units: u64,
    total_demand: u64,
    capacity: u64,
    limits: &Limits,
) {
    if total_units > limits.max_units {
        check.push_error(format!(
            "demand expands to {total_units} pieces, limit is {}",
            limits.max_units
        ));
    }
    if capacity > 0 {
        let implied_stock = total_demand.div_ceil(capacity);
        if implied_stock > limits.sanity_units {
            check.push_warning(format!(
                "demand spans at least {implied_stock} stock units; check the quantities"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_project(length: u32) -> Project {
        Project::new("test", Stock::Bar { length })
    }

    fn sheet_project(width: u32, height: u32) -> Project {
        Project::new("test", Stock::Sheet { width, height })
    }

    #[test]
    fn test_empty_piece_list_is_invalid() {
        let check = validate_pieces(&[], &bar_project(6000), &Limits::default());
        assert!(!check.valid);
        assert!(check.errors.iter().any(|e| e == "no pieces supplied"));
    }

    #[test]
    fn test_valid_pieces_pass() {
        let pieces = vec![Piece::new(2500, 2), Piece::new(1000, 3)];
        let check = validate_pieces(&pieces, &bar_project(6000), &Limits::default());
        assert!(check.valid);
        assert!(check.errors.is_empty());
        assert!(check.warnings.is_empty());
    }

    #[test]
    fn test_all_problems_reported_in_one_pass() {
        let pieces = vec![Piece::new(0, 1), Piece::new(7000, 0)];
        let check = validate_pieces(&pieces, &bar_project(6000), &Limits::default());
        assert!(!check.valid);
        // zero length, oversize length and zero quantity all listed
        assert_eq!(check.errors.len(), 3);
    }

    #[test]
    fn test_oversize_piece_is_an_error() {
        let pieces = vec![Piece::new(6001, 1)];
        let check = validate_pieces(&pieces, &bar_project(6000), &Limits::default());
        assert!(!check.valid);
        assert!(check.errors[0].contains("exceeds bar length"));
    }

    #[test]
    fn test_near_capacity_piece_is_a_warning() {
        let pieces = vec![Piece::new(5500, 1)];
        let check = validate_pieces(&pieces, &bar_project(6000), &Limits::default());
        assert!(check.valid);
        assert_eq!(check.warnings.len(), 1);
        assert!(check.warnings[0].contains("90%"));
    }

    #[test]
    fn test_exact_fit_piece_is_a_warning_not_an_error() {
        let pieces = vec![Piece::new(6000, 1)];
        let check = validate_pieces(&pieces, &bar_project(6000), &Limits::default());
        assert!(check.valid);
        assert_eq!(check.warnings.len(), 1);
    }

    #[test]
    fn test_unit_cap_blocks_pathological_demand() {
        let pieces = vec![Piece::new(100, 20_000)];
        let check = validate_pieces(&pieces, &bar_project(6000), &Limits::default());
        assert!(!check.valid);
        assert!(check.errors[0].contains("limit"));
    }

    #[test]
    fn test_sanity_warning_on_huge_demand() {
        let pieces = vec![Piece::new(6000, 500)];
        let check = validate_pieces(&pieces, &bar_project(6000), &Limits::default());
        assert!(check.valid);
        assert!(
            check
                .warnings
                .iter()
                .any(|w| w.contains("stock units"))
        );
    }

    #[test]
    fn test_stock_kind_mismatch() {
        let pieces = vec![Piece::new(100, 1)];
        let check = validate_pieces(&pieces, &sheet_project(2000, 1000), &Limits::default());
        assert!(!check.valid);
    }

    #[test]
    fn test_sheet_dimension_checks_are_per_axis() {
        let pieces = vec![SheetPiece::new(2100, 400, 1), SheetPiece::new(400, 1100, 1)];
        let check = validate_sheet_pieces(&pieces, &sheet_project(2000, 1000), &Limits::default());
        assert!(!check.valid);
        assert!(check.errors[0].contains("width"));
        assert!(check.errors[1].contains("height"));
    }

    #[test]
    fn test_sheet_near_capacity_warnings() {
        let pieces = vec![SheetPiece::new(1900, 950, 1)];
        let check = validate_sheet_pieces(&pieces, &sheet_project(2000, 1000), &Limits::default());
        assert!(check.valid);
        assert_eq!(check.warnings.len(), 2);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let pieces = vec![Piece::new(2500, 2)];
        let before = pieces.clone();
        let project = bar_project(6000);
        let _ = validate_pieces(&pieces, &project, &Limits::default());
        assert_eq!(pieces, before);
    }
}
