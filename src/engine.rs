use crate::bar::BarPacker;
use crate::history::{HistoryEntry, HistoryLedger, PieceSnapshot};
use crate::sheet::SheetPacker;
use crate::stats::{ProjectStats, compute_stats};
use crate::types::{OptimizationResult, Piece, Project, SheetPiece, Stock, ValidationResult};
use crate::validate::{Limits, validate_pieces, validate_sheet_pieces};
use serde::Serialize;

/// Everything a completed run produces: the allocation, its aggregates,
/// the recorded history entry and any non-blocking validation warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub result: OptimizationResult,
    pub stats: ProjectStats,
    pub entry: HistoryEntry,
    pub warnings: Vec<String>,
}

/// Ties the pipeline together: validate, pack, derive stats, record.
/// A failed validation is returned as data and the packer never runs.
pub struct Engine {
    ledger: HistoryLedger,
    limits: Limits,
}

impl Engine {
    pub fn new(ledger: HistoryLedger) -> Self {
        Self {
            ledger,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(ledger: HistoryLedger, limits: Limits) -> Self {
        Self { ledger, limits }
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn run_bars(
        &self,
        project: &Project,
        pieces: &[Piece],
        kerf: u32,
    ) -> Result<RunReport, ValidationResult> {
        let check = validate_pieces(pieces, project, &self.limits);
        if !check.valid {
            return Err(check);
        }
        let Stock::Bar { length } = project.stock else {
            unreachable!("validation accepted linear pieces against sheet stock")
        };

        let result = BarPacker::new(length, kerf).pack(pieces);
        tracing::info!(
            project = %project.name,
            bars = result.unit_count(),
            waste = result.total_waste,
            "bar run complete"
        );
        let stats = compute_stats(&result);
        let entry = self
            .ledger
            .record(project, PieceSnapshot::Linear(pieces.to_vec()), &result);

        Ok(RunReport {
            result,
            stats,
            entry,
            warnings: check.warnings,
        })
    }

    pub fn run_sheets(
        &self,
        project: &Project,
        pieces: &[SheetPiece],
        kerf: u32,
    ) -> Result<RunReport, ValidationResult> {
        let check = validate_sheet_pieces(pieces, project, &self.limits);
        if !check.valid {
            return Err(check);
        }
        let Stock::Sheet { width, height } = project.stock else {
            unreachable!("validation accepted sheet pieces against bar stock")
        };

        let result = SheetPacker::new(width, height, kerf).pack(pieces);
        tracing::info!(
            project = %project.name,
            sheets = result.unit_count(),
            waste = result.total_waste,
            "sheet run complete"
        );
        let stats = compute_stats(&result);
        let entry = self
            .ledger
            .record(project, PieceSnapshot::Rect(pieces.to_vec()), &result);

        Ok(RunReport {
            result,
            stats,
            entry,
            warnings: check.warnings,
        })
    }
}
