use clap::Parser;
use cut_planner::engine::Engine;
use cut_planner::history::HistoryLedger;
use cut_planner::render;
use cut_planner::types::{PackedUnit, Piece, Project, SheetPiece, Stock};
use std::sync::mpsc::sync_channel;

#[derive(Parser)]
#[command(name = "cut_planner", about = "1D/2D cutting stock planner")]
struct Cli {
    /// Stock bar length in mm (linear mode)
    #[arg(long, conflicts_with = "sheet")]
    bar: Option<u32>,

    /// Stock sheet dimensions WxH in mm (sheet mode, e.g. 2000x1000)
    #[arg(long)]
    sheet: Option<String>,

    /// Pieces as LEN:QTY (bar mode, e.g. 2500:2) or WxH:QTY (sheet mode,
    /// e.g. 800x400:3)
    #[arg(long = "pieces", num_args = 1..)]
    pieces: Vec<String>,

    /// Blade kerf width in mm (default: 0)
    #[arg(long, default_value_t = 0)]
    kerf: u32,

    /// Project name recorded in the run history
    #[arg(long, default_value = "cli")]
    project: String,

    /// Material tag carried into stats grouping and offcut notices
    #[arg(long)]
    material: Option<String>,

    /// Report leftovers above this size (mm for bars, mm² for sheets) as
    /// reusable offcuts
    #[arg(long)]
    reuse_threshold: Option<u64>,

    /// Show ASCII layout of each bar/sheet
    #[arg(long)]
    layout: bool,
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    Ok((width, height))
}

fn parse_quantity(s: &str, full: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", full))
}

fn parse_bar_piece(s: &str, material: Option<&str>) -> Result<Piece, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid piece '{}', expected LEN:QTY", s));
    }
    let length = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let quantity = parse_quantity(parts[1], s)?;
    Ok(Piece {
        material: material.map(str::to_owned),
        ..Piece::new(length, quantity)
    })
}

fn parse_sheet_piece(s: &str, material: Option<&str>) -> Result<SheetPiece, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid piece '{}', expected WxH:QTY", s));
    }
    let (width, height) = parse_dimensions(parts[0])?;
    let quantity = parse_quantity(parts[1], s)?;
    Ok(SheetPiece {
        material: material.map(str::to_owned),
        ..SheetPiece::new(width, height, quantity)
    })
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let stock = match (cli.bar, &cli.sheet) {
        (Some(length), None) => Stock::Bar { length },
        (None, Some(dims)) => {
            let (width, height) = parse_dimensions(dims).unwrap_or_else(|e| fail(&e));
            Stock::Sheet { width, height }
        }
        _ => fail("exactly one of --bar or --sheet is required"),
    };

    let project = Project {
        material: cli.material.clone(),
        send_offcuts_to_inventory: cli.reuse_threshold.is_some(),
        reuse_threshold: cli.reuse_threshold.unwrap_or(0),
        ..Project::new(cli.project.clone(), stock)
    };

    let (tx, rx) = sync_channel(16);
    let engine = Engine::new(HistoryLedger::with_notifier(tx));
    let material = cli.material.as_deref();

    let report = match stock {
        Stock::Bar { length } => {
            let pieces: Vec<Piece> = cli
                .pieces
                .iter()
                .map(|p| parse_bar_piece(p, material))
                .collect::<Result<Vec<_>, _>>()
                .unwrap_or_else(|e| fail(&e));
            let report = engine
                .run_bars(&project, &pieces, cli.kerf)
                .unwrap_or_else(|check| {
                    eprintln!("Validation failed:");
                    for error in &check.errors {
                        eprintln!("  {}", error);
                    }
                    std::process::exit(1);
                });

            for (i, unit) in report.result.units.iter().enumerate() {
                let PackedUnit::Bar { cuts, waste, .. } = unit else {
                    continue;
                };
                let lengths: Vec<String> =
                    cuts.iter().map(|c| format!("{}mm @ {}", c.length, c.position)).collect();
                println!("Bar {}: {} (waste {}mm)", i + 1, lengths.join(", "), waste);
                if cli.layout {
                    print!("{}", render::render_bar(length, cuts, *waste));
                }
            }
            report
        }
        Stock::Sheet { width, height } => {
            let pieces: Vec<SheetPiece> = cli
                .pieces
                .iter()
                .map(|p| parse_sheet_piece(p, material))
                .collect::<Result<Vec<_>, _>>()
                .unwrap_or_else(|e| fail(&e));
            let report = engine
                .run_sheets(&project, &pieces, cli.kerf)
                .unwrap_or_else(|check| {
                    eprintln!("Validation failed:");
                    for error in &check.errors {
                        eprintln!("  {}", error);
                    }
                    std::process::exit(1);
                });

            for (i, unit) in report.result.units.iter().enumerate() {
                let PackedUnit::Sheet { cuts, .. } = unit else {
                    continue;
                };
                println!("Sheet {}:", i + 1);
                for c in cuts {
                    println!("  {}x{} @ ({}, {})", c.width, c.height, c.x, c.y);
                }
                if cli.layout {
                    print!("{}", render::render_sheet(width, height, cuts));
                }
                println!();
            }
            report
        }
    };

    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }

    while let Ok(notice) = rx.try_recv() {
        println!(
            "Offcut worth keeping: {} ({})",
            notice.total_waste,
            notice.material.as_deref().unwrap_or("unspecified material"),
        );
    }

    let units = report.stats.units_used;
    println!(
        "Summary: {} {}{} used, {}% waste, {}% efficiency",
        units,
        match stock {
            Stock::Bar { .. } => "bar",
            Stock::Sheet { .. } => "sheet",
        },
        if units == 1 { "" } else { "s" },
        report.stats.waste_percent,
        report.stats.efficiency_percent,
    );
}
