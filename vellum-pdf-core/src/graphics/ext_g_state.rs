use crate::objects::{Dictionary, Object};

/// Graphics state parameter dictionary (/ExtGState).
///
/// Registered through the document's resource manager and applied with
/// [`GraphicsContext::set_ext_g_state`](crate::graphics::GraphicsContext::set_ext_g_state).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtGState {
    fill_alpha: Option<f64>,
    stroke_alpha: Option<f64>,
}

impl ExtGState {
    pub fn new() -> Self {
        Self {
            fill_alpha: None,
            stroke_alpha: None,
        }
    }

    /// Constant alpha for fill operations (0.0 transparent, 1.0 opaque).
    pub fn with_fill_alpha(mut self, alpha: f64) -> Self {
        self.fill_alpha = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Constant alpha for stroke operations.
    pub fn with_stroke_alpha(mut self, alpha: f64) -> Self {
        self.stroke_alpha = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Same alpha for fill and stroke.
    pub fn with_alpha(self, alpha: f64) -> Self {
        self.with_fill_alpha(alpha).with_stroke_alpha(alpha)
    }

    pub(crate) fn fingerprint_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(16);
        bytes.extend_from_slice(&self.fill_alpha.unwrap_or(-1.0).to_be_bytes());
        bytes.extend_from_slice(&self.stroke_alpha.unwrap_or(-1.0).to_be_bytes());
        bytes
    }

    pub(crate) fn to_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name("ExtGState".to_string()));
        if let Some(ca) = self.fill_alpha {
            dict.set("ca", Object::Real(ca));
        }
        if let Some(ca) = self.stroke_alpha {
            dict.set("CA", Object::Real(ca));
        }
        dict
    }
}

impl Default for ExtGState {
    fn default() -> Self {
        Self::new()
    }
}
