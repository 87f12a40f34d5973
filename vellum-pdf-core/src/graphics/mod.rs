mod color;
mod ext_g_state;
mod image;
mod pattern;

pub use color::Color;
pub use ext_g_state::ExtGState;
pub use image::{ColorSpace as ImageColorSpace, Image, ImageFilter};
pub use pattern::{Pattern, Shading};

use crate::error::{PdfError, Result};
use crate::resources::ResourceRef;
use std::collections::BTreeSet;
use std::fmt::Write;

/// Line cap styles for stroked paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt = 0,
    Round = 1,
    Square = 2,
}

/// Line join styles for stroked paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

/// Accumulates page graphics operators in emission order.
///
/// Every call appends operator bytes; nothing is sorted or batched. Save and
/// restore must balance: an extra restore fails immediately with
/// [`PdfError::UnbalancedGraphicsState`].
#[derive(Debug, Clone)]
pub struct GraphicsContext {
    operations: String,
    current_color: Color,
    stroke_color: Color,
    state_depth: usize,
    used_refs: BTreeSet<ResourceRef>,
}

impl Default for GraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self {
            operations: String::new(),
            current_color: Color::black(),
            stroke_color: Color::black(),
            state_depth: 0,
            used_refs: BTreeSet::new(),
        }
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        writeln!(&mut self.operations, "{x:.2} {y:.2} m").unwrap();
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        writeln!(&mut self.operations, "{x:.2} {y:.2} l").unwrap();
        self
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> &mut Self {
        writeln!(
            &mut self.operations,
            "{x1:.2} {y1:.2} {x2:.2} {y2:.2} {x3:.2} {y3:.2} c"
        )
        .unwrap();
        self
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        writeln!(
            &mut self.operations,
            "{x:.2} {y:.2} {width:.2} {height:.2} re"
        )
        .unwrap();
        self
    }

    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64) -> &mut Self {
        // kappa for cubic Bezier circle approximation
        let k = 0.552284749831;
        let r = radius;

        self.move_to(cx + r, cy);
        self.curve_to(cx + r, cy + k * r, cx + k * r, cy + r, cx, cy + r);
        self.curve_to(cx - k * r, cy + r, cx - r, cy + k * r, cx - r, cy);
        self.curve_to(cx - r, cy - k * r, cx - k * r, cy - r, cx, cy - r);
        self.curve_to(cx + k * r, cy - r, cx + r, cy - k * r, cx + r, cy);
        self.close_path()
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.operations.push_str("h\n");
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.apply_stroke_color();
        self.operations.push_str("S\n");
        self
    }

    pub fn fill(&mut self) -> &mut Self {
        self.apply_fill_color();
        self.operations.push_str("f\n");
        self
    }

    pub fn fill_stroke(&mut self) -> &mut Self {
        self.apply_fill_color();
        self.apply_stroke_color();
        self.operations.push_str("B\n");
        self
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        self.stroke_color = color;
        self
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        self.current_color = color;
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        writeln!(&mut self.operations, "{width:.2} w").unwrap();
        self
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        writeln!(&mut self.operations, "{} J", cap as u8).unwrap();
        self
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        writeln!(&mut self.operations, "{} j", join as u8).unwrap();
        self
    }

    /// Pushes the graphics state (`q`).
    pub fn save_state(&mut self) -> &mut Self {
        self.state_depth += 1;
        self.operations.push_str("q\n");
        self
    }

    /// Pops the graphics state (`Q`).
    ///
    /// Fails when there is no matching save.
    pub fn restore_state(&mut self) -> Result<&mut Self> {
        if self.state_depth == 0 {
            return Err(PdfError::UnbalancedGraphicsState);
        }
        self.state_depth -= 1;
        self.operations.push_str("Q\n");
        Ok(self)
    }

    /// Runs `f` between a save/restore pair.
    ///
    /// The restore is emitted on every exit path, so state changes made inside
    /// the closure cannot leak into later operations even when `f` errors.
    pub fn with_saved_state<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.save_state();
        let result = f(self);
        self.restore_state()?;
        result?;
        Ok(self)
    }

    /// Number of saves without a matching restore.
    pub fn state_depth(&self) -> usize {
        self.state_depth
    }

    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        writeln!(&mut self.operations, "1 0 0 1 {tx:.2} {ty:.2} cm").unwrap();
        self
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        writeln!(&mut self.operations, "{sx:.2} 0 0 {sy:.2} 0 0 cm").unwrap();
        self
    }

    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        let cos = angle.cos();
        let sin = angle.sin();
        writeln!(
            &mut self.operations,
            "{:.6} {:.6} {:.6} {:.6} 0 0 cm",
            cos, sin, -sin, cos
        )
        .unwrap();
        self
    }

    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        writeln!(
            &mut self.operations,
            "{a:.2} {b:.2} {c:.2} {d:.2} {e:.2} {f:.2} cm"
        )
        .unwrap();
        self
    }

    /// Paints a registered image XObject into the given rectangle.
    ///
    /// The placement transform is scoped with q/Q so it cannot leak.
    pub fn draw_image(
        &mut self,
        image: ResourceRef,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<&mut Self> {
        if !image.is_image() {
            return Err(PdfError::InvalidResource(format!(
                "{} is not an image resource",
                image.name()
            )));
        }
        self.used_refs.insert(image);
        self.save_state();
        writeln!(
            &mut self.operations,
            "{width:.2} 0 0 {height:.2} {x:.2} {y:.2} cm"
        )
        .unwrap();
        writeln!(&mut self.operations, "/{} Do", image.name()).unwrap();
        self.restore_state()?;
        Ok(self)
    }

    /// Applies a registered graphics state parameter dictionary (`gs`).
    pub fn set_ext_g_state(&mut self, state: ResourceRef) -> Result<&mut Self> {
        if !state.is_ext_g_state() {
            return Err(PdfError::InvalidResource(format!(
                "{} is not a graphics state resource",
                state.name()
            )));
        }
        self.used_refs.insert(state);
        writeln!(&mut self.operations, "/{} gs", state.name()).unwrap();
        Ok(self)
    }

    /// Selects a registered shading pattern as the fill color.
    pub fn set_fill_pattern(&mut self, pattern: ResourceRef) -> Result<&mut Self> {
        if !pattern.is_pattern() {
            return Err(PdfError::InvalidResource(format!(
                "{} is not a pattern resource",
                pattern.name()
            )));
        }
        self.used_refs.insert(pattern);
        self.operations.push_str("/Pattern cs\n");
        writeln!(&mut self.operations, "/{} scn", pattern.name()).unwrap();
        Ok(self)
    }

    fn apply_stroke_color(&mut self) {
        match self.stroke_color {
            Color::Rgb(r, g, b) => {
                writeln!(&mut self.operations, "{r:.3} {g:.3} {b:.3} RG").unwrap();
            }
            Color::Gray(g) => {
                writeln!(&mut self.operations, "{g:.3} G").unwrap();
            }
            Color::Cmyk(c, m, y, k) => {
                writeln!(&mut self.operations, "{c:.3} {m:.3} {y:.3} {k:.3} K").unwrap();
            }
        }
    }

    fn apply_fill_color(&mut self) {
        match self.current_color {
            Color::Rgb(r, g, b) => {
                writeln!(&mut self.operations, "{r:.3} {g:.3} {b:.3} rg").unwrap();
            }
            Color::Gray(g) => {
                writeln!(&mut self.operations, "{g:.3} g").unwrap();
            }
            Color::Cmyk(c, m, y, k) => {
                writeln!(&mut self.operations, "{c:.3} {m:.3} {y:.3} {k:.3} k").unwrap();
            }
        }
    }

    pub fn operations(&self) -> &str {
        &self.operations
    }

    pub(crate) fn generate_operations(&self) -> Vec<u8> {
        self.operations.as_bytes().to_vec()
    }

    pub(crate) fn used_refs(&self) -> &BTreeSet<ResourceRef> {
        &self.used_refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;

    fn image_ref(id: u32) -> ResourceRef {
        ResourceRef::new(id, ResourceKind::Image)
    }

    #[test]
    fn test_path_operators() {
        let mut ctx = GraphicsContext::new();
        ctx.move_to(10.0, 20.0)
            .line_to(30.0, 40.0)
            .curve_to(1.0, 2.0, 3.0, 4.0, 5.0, 6.0)
            .close_path();

        let ops = ctx.operations();
        assert!(ops.contains("10.00 20.00 m\n"));
        assert!(ops.contains("30.00 40.00 l\n"));
        assert!(ops.contains("1.00 2.00 3.00 4.00 5.00 6.00 c\n"));
        assert!(ops.contains("h\n"));
    }

    #[test]
    fn test_rect_and_fill() {
        let mut ctx = GraphicsContext::new();
        ctx.set_fill_color(Color::rgb(1.0, 0.0, 0.0))
            .rect(10.0, 20.0, 100.0, 50.0)
            .fill();

        let ops = ctx.operations();
        assert!(ops.contains("10.00 20.00 100.00 50.00 re\n"));
        assert!(ops.contains("1.000 0.000 0.000 rg\n"));
        assert!(ops.contains("f\n"));
    }

    #[test]
    fn test_circle_emits_four_curves() {
        let mut ctx = GraphicsContext::new();
        ctx.circle(50.0, 50.0, 25.0);

        let ops = ctx.operations();
        assert!(ops.contains("75.00 50.00 m\n"));
        assert_eq!(ops.matches(" c\n").count(), 4);
        assert!(ops.contains("h\n"));
    }

    #[test]
    fn test_stroke_colors() {
        let mut ctx = GraphicsContext::new();
        ctx.set_stroke_color(Color::gray(0.5)).stroke();
        assert!(ctx.operations().contains("0.500 G\n"));

        let mut ctx = GraphicsContext::new();
        ctx.set_stroke_color(Color::cmyk(0.1, 0.2, 0.3, 0.4)).stroke();
        assert!(ctx.operations().contains("0.100 0.200 0.300 0.400 K\n"));
    }

    #[test]
    fn test_save_restore_balance() {
        let mut ctx = GraphicsContext::new();
        ctx.save_state();
        assert_eq!(ctx.state_depth(), 1);
        ctx.restore_state().unwrap();
        assert_eq!(ctx.state_depth(), 0);

        let err = ctx.restore_state().unwrap_err();
        assert!(matches!(err, PdfError::UnbalancedGraphicsState));
    }

    #[test]
    fn test_nested_save_restore() {
        let mut ctx = GraphicsContext::new();
        ctx.save_state();
        ctx.save_state();
        ctx.restore_state().unwrap();
        ctx.restore_state().unwrap();
        assert!(ctx.restore_state().is_err());
    }

    #[test]
    fn test_with_saved_state_restores_on_error() {
        let mut ctx = GraphicsContext::new();
        let result = ctx.with_saved_state(|g| {
            g.rect(0.0, 0.0, 1.0, 1.0);
            Err(PdfError::InvalidResource("boom".to_string()))
        });

        assert!(result.is_err());
        // the Q was still emitted and the depth is balanced
        assert_eq!(ctx.state_depth(), 0);
        assert!(ctx.operations().ends_with("Q\n"));
    }

    #[test]
    fn test_draw_image_scopes_transform() {
        let mut ctx = GraphicsContext::new();
        ctx.draw_image(image_ref(3), 10.0, 20.0, 100.0, 80.0).unwrap();

        let ops = ctx.operations();
        assert!(ops.contains("q\n"));
        assert!(ops.contains("100.00 0 0 80.00 10.00 20.00 cm\n"));
        assert!(ops.contains("/Im3 Do\n"));
        assert!(ops.ends_with("Q\n"));
        assert!(ctx.used_refs().contains(&image_ref(3)));
    }

    #[test]
    fn test_draw_image_rejects_non_image_ref() {
        let mut ctx = GraphicsContext::new();
        let font = ResourceRef::new(1, ResourceKind::Font);
        let err = ctx.draw_image(font, 0.0, 0.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, PdfError::InvalidResource(_)));
    }

    #[test]
    fn test_set_ext_g_state() {
        let mut ctx = GraphicsContext::new();
        let gs = ResourceRef::new(2, ResourceKind::ExtGState);
        ctx.set_ext_g_state(gs).unwrap();
        assert!(ctx.operations().contains("/GS2 gs\n"));
    }

    #[test]
    fn test_set_fill_pattern() {
        let mut ctx = GraphicsContext::new();
        let pat = ResourceRef::new(4, ResourceKind::Pattern);
        ctx.set_fill_pattern(pat).unwrap();
        let ops = ctx.operations();
        assert!(ops.contains("/Pattern cs\n"));
        assert!(ops.contains("/Sh4 scn\n"));
    }
}
