use crate::types::{BarCut, OptimizationResult, PackedUnit, Piece, Stock};

/// First-fit-decreasing packer for linear stock. Kerf is charged once per
/// cut after the first on a bar; a bar holding a single exact-length piece
/// loses nothing to the blade.
pub struct BarPacker {
    bar_length: u32,
    kerf: u32,
}

struct DemandUnit {
    length: u32,
    group: Option<String>,
}

struct OpenBar {
    cuts: Vec<BarCut>,
    remaining: u32,
}

impl OpenBar {
    fn fits(&self, length: u32, kerf: u32) -> bool {
        self.remaining as u64 >= length as u64 + kerf as u64
    }

    fn place(&mut self, bar_length: u32, kerf: u32, unit: &DemandUnit) {
        let charge = if self.cuts.is_empty() {
            unit.length
        } else {
            unit.length + kerf
        };
        let position = bar_length - self.remaining + if self.cuts.is_empty() { 0 } else { kerf };
        self.cuts.push(BarCut {
            length: unit.length,
            position,
            group: unit.group.clone(),
        });
        self.remaining -= charge;
    }
}

impl BarPacker {
    pub fn new(bar_length: u32, kerf: u32) -> Self {
        Self { bar_length, kerf }
    }

    pub fn pack(&self, pieces: &[Piece]) -> OptimizationResult {
        let units = self.expand(pieces);
        let mut bars: Vec<OpenBar> = Vec::new();

        for unit in &units {
            assert!(
                unit.length <= self.bar_length,
                "piece {}mm does not fit bar {}mm; caller skipped validation",
                unit.length,
                self.bar_length
            );

            // First open bar that still holds the piece plus one kerf.
            match bars
                .iter_mut()
                .find(|bar| bar.fits(unit.length, self.kerf))
            {
                Some(bar) => bar.place(self.bar_length, self.kerf, unit),
                None => {
                    let mut bar = OpenBar {
                        cuts: Vec::new(),
                        remaining: self.bar_length,
                    };
                    bar.place(self.bar_length, self.kerf, unit);
                    bars.push(bar);
                }
            }
        }

        let units: Vec<PackedUnit> = bars
            .into_iter()
            .map(|bar| PackedUnit::Bar {
                used: self.bar_length - bar.remaining,
                waste: bar.remaining,
                cuts: bar.cuts,
            })
            .collect();
        let total_waste = units.iter().map(|u| u.waste()).sum();

        OptimizationResult {
            stock: Stock::Bar {
                length: self.bar_length,
            },
            units,
            total_waste,
        }
    }

    /// Expands quantities into individual demand units, longest first.
    /// The sort is stable, so equal lengths keep their input order and
    /// repeated runs assign pieces to the same bars.
    fn expand(&self, pieces: &[Piece]) -> Vec<DemandUnit> {
        let mut units = Vec::new();
        for piece in pieces {
            for _ in 0..piece.quantity {
                units.push(DemandUnit {
                    length: piece.length,
                    group: piece.group_key().map(str::to_owned),
                });
            }
        }
        units.sort_by(|a, b| b.length.cmp(&a.length));
        units
    }
}
