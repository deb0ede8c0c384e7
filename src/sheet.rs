use crate::types::{OptimizationResult, PackedUnit, SheetCut, SheetPiece, Stock};

/// Shelf packer for sheet stock: pieces go into horizontal strips, tallest
/// first, opening a new strip and then a new sheet only when the current
/// ones are exhausted. Waste is area-based and does not model the blade's
/// kerf loss along 2D cuts; kerf only pads the spacing between pieces.
pub struct SheetPacker {
    width: u32,
    height: u32,
    kerf: u32,
}

struct DemandUnit {
    width: u32,
    height: u32,
    group: Option<String>,
}

struct Shelf {
    y: u32,
    x_cursor: u32,
}

struct OpenSheet {
    shelves: Vec<Shelf>,
    y_cursor: u32,
    cuts: Vec<SheetCut>,
    used_area: u64,
}

impl OpenSheet {
    fn new() -> Self {
        Self {
            shelves: Vec::new(),
            y_cursor: 0,
            cuts: Vec::new(),
            used_area: 0,
        }
    }
}

impl SheetPacker {
    pub fn new(width: u32, height: u32, kerf: u32) -> Self {
        Self {
            width,
            height,
            kerf,
        }
    }

    pub fn pack(&self, pieces: &[SheetPiece]) -> OptimizationResult {
        let units = self.expand(pieces);
        let mut sheets: Vec<OpenSheet> = Vec::new();

        for unit in &units {
            assert!(
                unit.width <= self.width && unit.height <= self.height,
                "piece {}x{}mm does not fit sheet {}x{}mm; caller skipped validation",
                unit.width,
                unit.height,
                self.width,
                self.height
            );

            if self.place_on_open_shelf(&mut sheets, unit) {
                continue;
            }
            if self.place_on_new_shelf(&mut sheets, unit) {
                continue;
            }

            let mut sheet = OpenSheet::new();
            self.open_shelf(&mut sheet, unit);
            sheets.push(sheet);
        }

        let sheet_area = self.width as u64 * self.height as u64;
        let units: Vec<PackedUnit> = sheets
            .into_iter()
            .map(|sheet| PackedUnit::Sheet {
                used_area: sheet.used_area,
                waste_area: sheet_area - sheet.used_area,
                cuts: sheet.cuts,
            })
            .collect();
        let total_waste = units.iter().map(|u| u.waste()).sum();

        OptimizationResult {
            stock: Stock::Sheet {
                width: self.width,
                height: self.height,
            },
            units,
            total_waste,
        }
    }

    /// First shelf, in sheet then shelf creation order, with enough width
    /// left. Height never needs re-checking: units arrive tallest first,
    /// so no unit is taller than the strip it lands in.
    fn place_on_open_shelf(&self, sheets: &mut [OpenSheet], unit: &DemandUnit) -> bool {
        for sheet in sheets.iter_mut() {
            for si in 0..sheet.shelves.len() {
                if self.width.saturating_sub(sheet.shelves[si].x_cursor) >= unit.width {
                    Self::place(sheet, si, unit, self.kerf);
                    return true;
                }
            }
        }
        false
    }

    fn place_on_new_shelf(&self, sheets: &mut [OpenSheet], unit: &DemandUnit) -> bool {
        for sheet in sheets.iter_mut() {
            if self.height.saturating_sub(sheet.y_cursor) >= unit.height {
                self.open_shelf(sheet, unit);
                return true;
            }
        }
        false
    }

    fn open_shelf(&self, sheet: &mut OpenSheet, unit: &DemandUnit) {
        sheet.shelves.push(Shelf {
            y: sheet.y_cursor,
            x_cursor: 0,
        });
        sheet.y_cursor = sheet.y_cursor.saturating_add(unit.height + self.kerf);
        let si = sheet.shelves.len() - 1;
        Self::place(sheet, si, unit, self.kerf);
    }

    fn place(sheet: &mut OpenSheet, shelf_idx: usize, unit: &DemandUnit, kerf: u32) {
        let (x, y) = {
            let shelf = &sheet.shelves[shelf_idx];
            (shelf.x_cursor, shelf.y)
        };
        sheet.cuts.push(SheetCut {
            width: unit.width,
            height: unit.height,
            x,
            y,
            group: unit.group.clone(),
        });
        sheet.shelves[shelf_idx].x_cursor = x.saturating_add(unit.width + kerf);
        sheet.used_area += unit.width as u64 * unit.height as u64;
    }

    /// Tallest first, widest first among equals; stable, so equal pieces
    /// keep their input order and repeated runs are identical.
    fn expand(&self, pieces: &[SheetPiece]) -> Vec<DemandUnit> {
        let mut units = Vec::new();
        for piece in pieces {
            for _ in 0..piece.quantity {
                units.push(DemandUnit {
                    width: piece.width,
                    height: piece.height,
                    group: piece.group_key().map(str::to_owned),
                });
            }
        }
        units.sort_by(|a, b| b.height.cmp(&a.height).then(b.width.cmp(&a.width)));
        units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates a complete sheet allocation:
    /// 1. Every cut sits inside the sheet
    /// 2. No two cuts on the same sheet overlap
    /// 3. Per sheet, used + waste = sheet area and used matches the cuts
    fn assert_sheets_valid(result: &OptimizationResult, w: u32, h: u32, expected: usize) {
        let total_cuts: usize = result.units.iter().map(|u| u.cut_count()).sum();
        assert_eq!(
            total_cuts, expected,
            "expected {} cuts placed, got {}",
            expected, total_cuts
        );

        for (si, unit) in result.units.iter().enumerate() {
            let PackedUnit::Sheet {
                cuts,
                used_area,
                waste_area,
            } = unit
            else {
                panic!("sheet packer produced a bar unit");
            };

            let placed: u64 = cuts.iter().map(|c| c.area()).sum();
            assert_eq!(placed, *used_area, "sheet {si} used area drift");
            assert_eq!(
                used_area + waste_area,
                w as u64 * h as u64,
                "sheet {si} does not conserve area"
            );

            for (ci, c) in cuts.iter().enumerate() {
                assert!(
                    c.x + c.width <= w,
                    "sheet {si}, cut {ci} exceeds sheet width: x={} + width={} > {}",
                    c.x,
                    c.width,
                    w
                );
                assert!(
                    c.y + c.height <= h,
                    "sheet {si}, cut {ci} exceeds sheet height: y={} + height={} > {}",
                    c.y,
                    c.height,
                    h
                );
            }

            assert_no_overlaps(si, cuts);
        }
    }

    fn assert_no_overlaps(sheet_idx: usize, cuts: &[SheetCut]) {
        for i in 0..cuts.len() {
            for j in (i + 1)..cuts.len() {
                let a = &cuts[i];
                let b = &cuts[j];
                let overlaps = a.x < b.x + b.width
                    && b.x < a.x + a.width
                    && a.y < b.y + b.height
                    && b.y < a.y + a.height;
                assert!(
                    !overlaps,
                    "sheet {sheet_idx}: cut {i} ({}x{} @ ({},{})) overlaps cut {j} ({}x{} @ ({},{}))",
                    a.width, a.height, a.x, a.y, b.width, b.height, b.x, b.y
                );
            }
        }
    }

    #[test]
    fn test_three_pieces_share_one_sheet() {
        // 800x400 x3 on 2000x1000: two on the first strip, one on a second.
        let result = SheetPacker::new(2000, 1000, 0).pack(&[SheetPiece::new(800, 400, 3)]);
        assert_sheets_valid(&result, 2000, 1000, 3);
        assert_eq!(result.unit_count(), 1);
        assert_eq!(result.total_waste, 2_000_000 - 3 * 320_000);

        let PackedUnit::Sheet { cuts, .. } = &result.units[0] else {
            unreachable!()
        };
        assert_eq!((cuts[0].x, cuts[0].y), (0, 0));
        assert_eq!((cuts[1].x, cuts[1].y), (800, 0));
        assert_eq!((cuts[2].x, cuts[2].y), (0, 400));
    }

    #[test]
    fn test_second_sheet_opens_when_height_is_exhausted() {
        let result = SheetPacker::new(2000, 1000, 0).pack(&[SheetPiece::new(1100, 600, 2)]);
        assert_sheets_valid(&result, 2000, 1000, 2);
        // 1100 wide leaves 900 on the strip, and 600 tall leaves only 400
        // of sheet height, so the second piece cannot stay.
        assert_eq!(result.unit_count(), 2);
    }

    #[test]
    fn test_exact_fill_single_piece() {
        let result = SheetPacker::new(2000, 1000, 3).pack(&[SheetPiece::new(2000, 1000, 1)]);
        assert_sheets_valid(&result, 2000, 1000, 1);
        assert_eq!(result.unit_count(), 1);
        assert_eq!(result.total_waste, 0);
    }

    #[test]
    fn test_kerf_spacing_forces_new_sheet() {
        let pieces = vec![SheetPiece::new(1000, 500, 2)];
        let tight = SheetPacker::new(2000, 1000, 0).pack(&pieces);
        assert_eq!(tight.unit_count(), 1);

        // 1000 + 100 kerf leaves 900 on the strip, and the next strip
        // would start at 600 with only 400 of height left.
        let spaced = SheetPacker::new(2000, 1000, 100).pack(&pieces);
        assert_sheets_valid(&spaced, 2000, 1000, 2);
        assert_eq!(spaced.unit_count(), 2);
    }

    #[test]
    fn test_tallest_piece_founds_the_first_strip() {
        let pieces = vec![SheetPiece::new(400, 300, 1), SheetPiece::new(400, 900, 1)];
        let result = SheetPacker::new(2000, 1000, 0).pack(&pieces);
        assert_sheets_valid(&result, 2000, 1000, 2);
        assert_eq!(result.unit_count(), 1);

        let PackedUnit::Sheet { cuts, .. } = &result.units[0] else {
            unreachable!()
        };
        assert_eq!(cuts[0].height, 900);
        assert_eq!(cuts[0].y, 0);
        // The short piece joins the tall strip instead of founding its own.
        assert_eq!(cuts[1].y, 0);
        assert_eq!(cuts[1].x, 400);
    }

    #[test]
    fn test_no_pieces() {
        let result = SheetPacker::new(2000, 1000, 0).pack(&[]);
        assert_eq!(result.unit_count(), 0);
        assert_eq!(result.total_waste, 0);
    }

    #[test]
    fn test_determinism() {
        let pieces = vec![
            SheetPiece::new(700, 500, 4),
            SheetPiece::new(350, 250, 6),
            SheetPiece::new(1000, 400, 2),
            SheetPiece::new(600, 300, 5),
        ];
        let packer = SheetPacker::new(2440, 1220, 3);
        let first = packer.pack(&pieces);
        let second = packer.pack(&pieces);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mixed_batch_stays_consistent() {
        let pieces = vec![
            SheetPiece::new(800, 600, 5),
            SheetPiece::new(400, 300, 8),
            SheetPiece::new(600, 400, 4),
            SheetPiece::new(1200, 600, 3),
            SheetPiece::new(300, 200, 6),
        ];
        let result = SheetPacker::new(2440, 1220, 3).pack(&pieces);
        assert_sheets_valid(&result, 2440, 1220, 26);

        // Lower bound: total piece area / sheet area.
        let placed: u64 = result
            .units
            .iter()
            .map(|u| {
                let PackedUnit::Sheet { used_area, .. } = u else {
                    unreachable!()
                };
                *used_area
            })
            .sum();
        let min_sheets = placed.div_ceil(2440 * 1220) as usize;
        assert!(result.unit_count() >= min_sheets);
    }

    #[test]
    #[should_panic(expected = "skipped validation")]
    fn test_oversize_piece_is_a_contract_violation() {
        SheetPacker::new(2000, 1000, 0).pack(&[SheetPiece::new(2100, 500, 1)]);
    }
}
