use crate::types::{BarCut, SheetCut};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// One proportional strip per bar: cuts filled with '=', leftover with '.'.
pub fn render_bar(bar_length: u32, cuts: &[BarCut], waste: u32) -> String {
    if bar_length == 0 {
        return String::new();
    }
    let scale = (MAX_WIDTH - 4.0) / bar_length as f64;

    let mut out = String::from("|");
    for cut in cuts {
        let cols = ((cut.length as f64 * scale).round() as usize).max(3);
        out.push_str(&segment(&cut.length.to_string(), cols, '='));
        out.push('|');
    }
    if waste > 0 {
        let cols = ((waste as f64 * scale).round() as usize).max(3);
        out.push_str(&segment(&waste.to_string(), cols, '.'));
        out.push('|');
    }
    out.push('\n');
    out
}

fn segment(label: &str, cols: usize, fill: char) -> String {
    let mut chars = vec![fill; cols];
    let label_chars: Vec<char> = label.chars().collect();
    if label_chars.len() + 2 <= cols {
        let start = (cols - label_chars.len()) / 2;
        for (i, &ch) in label_chars.iter().enumerate() {
            chars[start + i] = ch;
        }
    }
    chars.into_iter().collect()
}

/// Scaled character-grid layout of one packed sheet.
pub fn render_sheet(sheet_w: u32, sheet_h: u32, cuts: &[SheetCut]) -> String {
    let scale = f64::min(MAX_WIDTH / sheet_w as f64, MAX_HEIGHT / sheet_h as f64);
    let grid_w = (sheet_w as f64 * scale).round() as usize;
    let grid_h = (sheet_h as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    // Draw the sheet border first
    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    // Draw each cut
    for c in cuts {
        let sx = (c.x as f64 * scale).round() as usize;
        let sy = (c.y as f64 * scale).round() as usize;
        let sw = (c.width as f64 * scale).round() as usize;
        let sh = (c.height as f64 * scale).round() as usize;

        if sw == 0 || sh == 0 {
            continue;
        }

        draw_rect(&mut grid, sx, sy, sw, sh);

        // Label
        let label = format!("{}x{}", c.width, c.height);
        let label_chars: Vec<char> = label.chars().collect();

        if sw > 2 && sh > 0 {
            let cx = sx + sw / 2;
            let cy = sy + sh / 2;
            let half = label_chars.len() / 2;
            let start_x = cx.saturating_sub(half);

            for (i, &ch) in label_chars.iter().enumerate() {
                let x = start_x + i;
                if x > sx && x < sx + sw && cy > sy && cy < sy + sh {
                    grid[cy][x] = ch;
                }
            }
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    // Horizontal edges
    for i in x..=x + w {
        if i < cols {
            if y < rows {
                grid[y][i] = if grid[y][i] == '|' || grid[y][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
            if y + h < rows {
                grid[y + h][i] = if grid[y + h][i] == '|' || grid[y + h][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
        }
    }

    // Vertical edges
    for j in y..=y + h {
        if j < rows {
            if x < cols {
                grid[j][x] = if grid[j][x] == '-' || grid[j][x] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
            if x + w < cols {
                grid[j][x + w] = if grid[j][x + w] == '-' || grid[j][x + w] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
        }
    }

    // Corners
    for &cx in &[x, x + w] {
        for &cy in &[y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}
