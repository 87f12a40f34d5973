/// Device color used for fill and stroke operations.
///
/// Components are in the 0.0..=1.0 range; constructors clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// RGB color (red, green, blue)
    Rgb(f64, f64, f64),
    /// Grayscale (0.0 = black, 1.0 = white)
    Gray(f64),
    /// CMYK color (cyan, magenta, yellow, black)
    Cmyk(f64, f64, f64, f64),
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    pub fn gray(value: f64) -> Self {
        Color::Gray(value.clamp(0.0, 1.0))
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Color::Cmyk(
            c.clamp(0.0, 1.0),
            m.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            k.clamp(0.0, 1.0),
        )
    }

    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    pub fn white() -> Self {
        Color::Gray(1.0)
    }

    pub fn red() -> Self {
        Color::Rgb(1.0, 0.0, 0.0)
    }

    pub fn green() -> Self {
        Color::Rgb(0.0, 1.0, 0.0)
    }

    pub fn blue() -> Self {
        Color::Rgb(0.0, 0.0, 1.0)
    }

    /// RGB components of this color, converting from gray/CMYK.
    pub fn to_rgb(&self) -> (f64, f64, f64) {
        match *self {
            Color::Rgb(r, g, b) => (r, g, b),
            Color::Gray(v) => (v, v, v),
            Color::Cmyk(c, m, y, k) => (
                (1.0 - c) * (1.0 - k),
                (1.0 - m) * (1.0 - k),
                (1.0 - y) * (1.0 - k),
            ),
        }
    }
}
