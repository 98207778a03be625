use crossterm::style::Color;

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Converts a colour to RGB components. Non-RGB colours are treated as mid grey.
pub fn rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb { r, g, b } => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::White => (255, 255, 255),
        _ => (128, 128, 128),
    }
}

/// Blends `fg` over `bg` with the given opacity
pub fn mix(fg: Color, bg: Color, opacity: f64) -> Color {
    let opacity = opacity.clamp(0.0, 1.0);
    let (fr, fg_, fb) = rgb(fg);
    let (br, bg_, bb) = rgb(bg);
    let channel = |f: u8, b: u8| (f as f64 * opacity + b as f64 * (1.0 - opacity)).round() as u8;
    Color::Rgb {
        r: channel(fr, br),
        g: channel(fg_, bg_),
        b: channel(fb, bb),
    }
}

/// Glyph standing in for a solid shape at the given blur radius
pub fn shade_for_blur(blur: f64) -> char {
    if blur <= 0.5 {
        '█'
    } else if blur < 3.0 {
        '▓'
    } else if blur < 6.0 {
        '▒'
    } else {
        '░'
    }
}

/// Opacity a blurred shape is drawn with; wider blur spreads the colour thinner
pub fn blur_opacity(blur: f64) -> f64 {
    1.0 / (1.0 + blur.max(0.0) * 0.15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_endpoints() {
        let fg = Color::Rgb { r: 200, g: 100, b: 0 };
        assert_eq!(mix(fg, Color::Black, 1.0), fg);
        assert_eq!(mix(fg, Color::Black, 0.0), Color::Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(mix(fg, Color::Black, 0.5), Color::Rgb { r: 100, g: 50, b: 0 });
        assert_eq!(mix(fg, Color::Black, 7.0), fg);
    }

    #[test]
    fn test_shades_get_lighter_with_blur() {
        let glyphs: Vec<char> = [0.0, 0.5, 1.0, 4.0, 8.0].iter().map(|&b| shade_for_blur(b)).collect();
        assert_eq!(glyphs, ['█', '█', '▓', '▒', '░']);
        assert!(blur_opacity(8.0) < blur_opacity(1.0));
        assert_eq!(blur_opacity(0.0), 1.0);
    }
}
