//! Shading patterns (axial and radial gradients).

use crate::graphics::Color;
use crate::objects::{Dictionary, Object};

/// Geometry of a gradient shading.
#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// Linear gradient along the axis (x0, y0) -> (x1, y1)
    Axial { coords: [f64; 4] },
    /// Radial gradient between circles (x0, y0, r0) and (x1, y1, r1)
    Radial { coords: [f64; 6] },
}

impl Shading {
    fn shading_type(&self) -> i64 {
        match self {
            Shading::Axial { .. } => 2,
            Shading::Radial { .. } => 3,
        }
    }

    fn coords(&self) -> Vec<f64> {
        match self {
            Shading::Axial { coords } => coords.to_vec(),
            Shading::Radial { coords } => coords.to_vec(),
        }
    }
}

/// A two-stop shading pattern interpolating between `start` and `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    shading: Shading,
    start: Color,
    end: Color,
    extend: (bool, bool),
}

impl Pattern {
    pub fn axial(x0: f64, y0: f64, x1: f64, y1: f64, start: Color, end: Color) -> Self {
        Self {
            shading: Shading::Axial {
                coords: [x0, y0, x1, y1],
            },
            start,
            end,
            extend: (true, true),
        }
    }

    pub fn radial(
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
        start: Color,
        end: Color,
    ) -> Self {
        Self {
            shading: Shading::Radial {
                coords: [x0, y0, r0, x1, y1, r1],
            },
            start,
            end,
            extend: (true, true),
        }
    }

    pub fn with_extend(mut self, before: bool, after: bool) -> Self {
        self.extend = (before, after);
        self
    }

    pub(crate) fn fingerprint_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(96);
        bytes.push(self.shading.shading_type() as u8);
        for c in self.shading.coords() {
            bytes.extend_from_slice(&c.to_be_bytes());
        }
        for color in [&self.start, &self.end] {
            let (r, g, b) = color.to_rgb();
            bytes.extend_from_slice(&r.to_be_bytes());
            bytes.extend_from_slice(&g.to_be_bytes());
            bytes.extend_from_slice(&b.to_be_bytes());
        }
        bytes.push(self.extend.0 as u8);
        bytes.push(self.extend.1 as u8);
        bytes
    }

    pub(crate) fn to_dict(&self) -> Dictionary {
        let (r0, g0, b0) = self.start.to_rgb();
        let (r1, g1, b1) = self.end.to_rgb();

        let mut function = Dictionary::new();
        function.set("FunctionType", Object::Integer(2));
        function.set(
            "Domain",
            Object::Array(vec![Object::Integer(0), Object::Integer(1)]),
        );
        function.set(
            "C0",
            Object::Array(vec![
                Object::Real(r0),
                Object::Real(g0),
                Object::Real(b0),
            ]),
        );
        function.set(
            "C1",
            Object::Array(vec![
                Object::Real(r1),
                Object::Real(g1),
                Object::Real(b1),
            ]),
        );
        function.set("N", Object::Integer(1));

        let mut shading = Dictionary::new();
        shading.set("ShadingType", Object::Integer(self.shading.shading_type()));
        shading.set("ColorSpace", Object::Name("DeviceRGB".to_string()));
        shading.set(
            "Coords",
            Object::Array(self.shading.coords().into_iter().map(Object::Real).collect()),
        );
        shading.set("Function", Object::Dictionary(function));
        shading.set(
            "Extend",
            Object::Array(vec![
                Object::Boolean(self.extend.0),
                Object::Boolean(self.extend.1),
            ]),
        );

        let mut pattern = Dictionary::new();
        pattern.set("Type", Object::Name("Pattern".to_string()));
        pattern.set("PatternType", Object::Integer(2));
        pattern.set("Shading", Object::Dictionary(shading));
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axial_pattern_dict() {
        let pattern = Pattern::axial(0.0, 0.0, 100.0, 0.0, Color::red(), Color::blue());
        let dict = pattern.to_dict();

        assert_eq!(dict.get("PatternType"), Some(&Object::Integer(2)));
        let shading = dict.get_dict("Shading").unwrap();
        assert_eq!(shading.get("ShadingType"), Some(&Object::Integer(2)));
        assert_eq!(
            shading.get("ColorSpace"),
            Some(&Object::Name("DeviceRGB".to_string()))
        );
    }

    #[test]
    fn test_radial_pattern_dict() {
        let pattern =
            Pattern::radial(50.0, 50.0, 0.0, 50.0, 50.0, 40.0, Color::white(), Color::black());
        let shading = pattern.to_dict();
        let shading = shading.get_dict("Shading").unwrap();
        assert_eq!(shading.get("ShadingType"), Some(&Object::Integer(3)));
        assert_eq!(shading.get("Coords").unwrap().as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_fingerprint_sensitive_to_geometry() {
        let a = Pattern::axial(0.0, 0.0, 1.0, 0.0, Color::red(), Color::blue());
        let b = Pattern::axial(0.0, 0.0, 2.0, 0.0, Color::red(), Color::blue());
        assert_ne!(a.fingerprint_bytes(), b.fingerprint_bytes());
    }
}
