use serde::{Deserialize, Deserializer, Serialize};

/// Accepts both integer and float JSON numbers for u32 fields.
/// Spreadsheet-derived clients routinely send `2500.0` for `2500`.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f64::deserialize(deserializer)?;
    if !v.is_finite() || v < 0.0 || v > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative number, got {v}"
        )));
    }
    Ok(v.round() as u32)
}

/// A linear demand line: cut `quantity` pieces of `length` millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

impl Piece {
    pub fn new(length: u32, quantity: u32) -> Self {
        Self {
            length,
            quantity,
            label: None,
            material: None,
            profile: None,
        }
    }

    /// Grouping key for statistics: material first, profile as fallback.
    pub fn group_key(&self) -> Option<&str> {
        self.material.as_deref().or(self.profile.as_deref())
    }
}

/// A rectangular demand line for sheet stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetPiece {
    pub width: u32,
    pub height: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

impl SheetPiece {
    pub fn new(width: u32, height: u32, quantity: u32) -> Self {
        Self {
            width,
            height,
            quantity,
            label: None,
            material: None,
            profile: None,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn group_key(&self) -> Option<&str> {
        self.material.as_deref().or(self.profile.as_deref())
    }
}

/// Raw material being filled: one bar or one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stock {
    Bar { length: u32 },
    Sheet { width: u32, height: u32 },
}

impl Stock {
    /// Capacity of a single stock unit: millimetres for bars, mm² for sheets.
    pub fn capacity(&self) -> u64 {
        match *self {
            Stock::Bar { length } => length as u64,
            Stock::Sheet { width, height } => width as u64 * height as u64,
        }
    }
}

impl std::fmt::Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Stock::Bar { length } => write!(f, "bar {length}mm"),
            Stock::Sheet { width, height } => write!(f, "sheet {width}x{height}mm"),
        }
    }
}

/// Stock constraints and leftover policy for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub stock: Stock,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub send_offcuts_to_inventory: bool,
    /// Leftover above this (mm or mm², matching the stock kind) is worth
    /// keeping and triggers the inventory notification.
    #[serde(default)]
    pub reuse_threshold: u64,
}

impl Project {
    pub fn new(name: impl Into<String>, stock: Stock) -> Self {
        Self {
            name: name.into(),
            stock,
            material: None,
            send_offcuts_to_inventory: false,
            reuse_threshold: 0,
        }
    }
}

/// One cut taken from a bar. `position` is the offset of its left edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarCut {
    pub length: u32,
    pub position: u32,
    #[serde(default)]
    pub group: Option<String>,
}

/// One cut placed on a sheet at (`x`, `y`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCut {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
    #[serde(default)]
    pub group: Option<String>,
}

impl SheetCut {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// One filled stock unit. Bars account waste down to the millimetre (kerf
/// included); sheet waste is area-based and ignores kerf loss per cut,
/// which callers must treat as an approximation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackedUnit {
    Bar {
        cuts: Vec<BarCut>,
        used: u32,
        waste: u32,
    },
    Sheet {
        cuts: Vec<SheetCut>,
        used_area: u64,
        waste_area: u64,
    },
}

impl PackedUnit {
    pub fn waste(&self) -> u64 {
        match self {
            PackedUnit::Bar { waste, .. } => *waste as u64,
            PackedUnit::Sheet { waste_area, .. } => *waste_area,
        }
    }

    pub fn cut_count(&self) -> usize {
        match self {
            PackedUnit::Bar { cuts, .. } => cuts.len(),
            PackedUnit::Sheet { cuts, .. } => cuts.len(),
        }
    }
}

/// Complete allocation produced by one packer run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub stock: Stock,
    pub units: Vec<PackedUnit>,
    pub total_waste: u64,
}

impl OptimizationResult {
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn waste_percent(&self) -> f64 {
        let total_capacity = self.stock.capacity() * self.units.len() as u64;
        if total_capacity == 0 {
            return 0.0;
        }
        self.total_waste as f64 / total_capacity as f64 * 100.0
    }

    pub fn efficiency_percent(&self) -> f64 {
        100.0 - self.waste_percent()
    }
}

/// Outcome of checking a piece set against a project. Errors block the
/// run; warnings do not. All problems are gathered in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}
