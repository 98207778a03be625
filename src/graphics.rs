use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::math::edge_function;

/// One terminal cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub fg: Color,
    pub bg: Color,
}

/// Off-screen grid of cells, flushed to the terminal once per frame
pub struct Canvas {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u16, height: u16, background: Color) -> Self {
        let blank = Cell {
            glyph: ' ',
            fg: background,
            bg: background,
        };
        Canvas {
            width,
            height,
            cells: vec![blank; width as usize * height as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x as i32, y as i32).map(|i| &self.cells[i])
    }

    /// Sets glyph and foreground, keeping the cell's background
    pub fn put(&mut self, x: i32, y: i32, glyph: char, fg: Color) {
        if let Some(i) = self.index(x, y) {
            self.cells[i].glyph = glyph;
            self.cells[i].fg = fg;
        }
    }

    /// Changes the background without touching the glyph
    pub fn tint(&mut self, x: i32, y: i32, bg: Color) {
        if let Some(i) = self.index(x, y) {
            self.cells[i].bg = bg;
        }
    }

    /// Writes `text` starting at `(x, y)`, clipped to the canvas
    pub fn text(&mut self, x: i32, y: i32, text: &str, fg: Color) {
        for (offset, glyph) in text.chars().enumerate() {
            self.put(x + offset as i32, y, glyph, fg);
        }
    }

    /// Writes `text` centred on column `x`
    pub fn text_centered(&mut self, x: i32, y: i32, text: &str, fg: Color) {
        let half = text.chars().count() as i32 / 2;
        self.text(x - half, y, text, fg);
    }

    /// Fills every cell whose centre lies inside the triangle
    pub fn fill_triangle(&mut self, v0: [f64; 2], v1: [f64; 2], v2: [f64; 2], glyph: char, fg: Color) {
        // Compute bounding box of the triangle
        let min_x = v0[0].min(v1[0]).min(v2[0]).floor().max(0.0) as i32;
        let max_x = v0[0].max(v1[0]).max(v2[0]).ceil().min(self.width as f64 - 1.0) as i32;
        let min_y = v0[1].min(v1[1]).min(v2[1]).floor().max(0.0) as i32;
        let max_y = v0[1].max(v1[1]).max(v2[1]).ceil().min(self.height as f64 - 1.0) as i32;

        let area = edge_function(&v0, &v1, &v2);
        if area == 0.0 {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f64 + 0.5, y as f64 + 0.5];
                let w0 = edge_function(&v1, &v2, &p) / area;
                let w1 = edge_function(&v2, &v0, &p) / area;
                let w2 = edge_function(&v0, &v1, &p) / area;
                // Normalising by the area makes the test independent of winding
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.put(x, y, glyph, fg);
                }
            }
        }
    }

    /// Draws a line between two cells using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, glyph: char, fg: Color) {
        let (mut x0, mut y0) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            self.put(x0, y0, glyph, fg);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Fills an axis-aligned ellipse centred on `(cx, cy)`
    pub fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, glyph: char, fg: Color) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let min_y = (cy - ry).floor() as i32;
        let max_y = (cy + ry).ceil() as i32;
        let min_x = (cx - rx).floor() as i32;
        let max_x = (cx + rx).ceil() as i32;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let nx = (x as f64 + 0.5 - cx) / rx;
                let ny = (y as f64 + 0.5 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.put(x, y, glyph, fg);
                }
            }
        }
    }

    /// Queues the whole canvas to `out`, only emitting colour changes when needed
    pub fn flush<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut current: Option<(Color, Color)> = None;
        for y in 0..self.height {
            queue!(out, MoveTo(0, y))?;
            for x in 0..self.width {
                let cell = self.cells[y as usize * self.width as usize + x as usize];
                if current != Some((cell.fg, cell.bg)) {
                    queue!(out, SetForegroundColor(cell.fg), SetBackgroundColor(cell.bg))?;
                    current = Some((cell.fg, cell.bg));
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}
