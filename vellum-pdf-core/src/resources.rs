//! Shared page resources, deduplicated by content fingerprint.
//!
//! Every registration computes an md5 fingerprint over the resource's
//! normalized content; identical fingerprints return the identical handle and
//! the asset is embedded once. The dedup map lives inside one document; there
//! is no cross-document or on-disk cache.

use crate::error::Result;
use crate::graphics::{ExtGState, Image, Pattern};
use crate::text::FontSpec;
use std::collections::HashMap;
use std::fmt;

/// Kind of a registered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Font,
    Image,
    ExtGState,
    Pattern,
}

impl ResourceKind {
    /// PDF resource dictionary category the kind lives under.
    pub(crate) fn category(&self) -> &'static str {
        match self {
            ResourceKind::Font => "Font",
            ResourceKind::Image => "XObject",
            ResourceKind::ExtGState => "ExtGState",
            ResourceKind::Pattern => "Pattern",
        }
    }

    fn name_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Font => "F",
            ResourceKind::Image => "Im",
            ResourceKind::ExtGState => "GS",
            ResourceKind::Pattern => "Sh",
        }
    }
}

/// Handle to a registered resource.
///
/// Copyable and cheap; the content-stream name (`F1`, `Im2`, ...) derives
/// from it. Valid only within the document that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceRef {
    id: u32,
    kind: ResourceKind,
}

impl ResourceRef {
    pub(crate) fn new(id: u32, kind: ResourceKind) -> Self {
        Self { id, kind }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Name used to reference the resource from content streams.
    pub fn name(&self) -> String {
        format!("{}{}", self.kind.name_prefix(), self.id)
    }

    pub fn is_font(&self) -> bool {
        self.kind == ResourceKind::Font
    }

    pub fn is_image(&self) -> bool {
        self.kind == ResourceKind::Image
    }

    pub fn is_ext_g_state(&self) -> bool {
        self.kind == ResourceKind::ExtGState
    }

    pub fn is_pattern(&self) -> bool {
        self.kind == ResourceKind::Pattern
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Content fingerprint keying the dedup map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    fn compute(kind: ResourceKind, content: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(content.len() + 1);
        bytes.push(kind as u8);
        bytes.extend_from_slice(content);
        Fingerprint(md5::compute(&bytes).0)
    }
}

/// A registered resource.
#[derive(Debug, Clone)]
pub enum Resource {
    Font(FontSpec),
    Image(Image),
    ExtGState(ExtGState),
    Pattern(Pattern),
}

/// Per-document registry of fonts, images, graphics states and patterns.
#[derive(Debug)]
pub struct ResourceManager {
    entries: Vec<(ResourceRef, Resource)>,
    by_fingerprint: HashMap<Fingerprint, ResourceRef>,
    next_id: u32,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceManager {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_fingerprint: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn register_font(&mut self, spec: FontSpec) -> Result<ResourceRef> {
        let fingerprint = Fingerprint::compute(ResourceKind::Font, &spec.fingerprint_bytes());
        Ok(self.register(ResourceKind::Font, fingerprint, Resource::Font(spec)))
    }

    pub fn register_image(&mut self, image: Image) -> Result<ResourceRef> {
        let fingerprint = Fingerprint::compute(ResourceKind::Image, &image.fingerprint_bytes());
        Ok(self.register(ResourceKind::Image, fingerprint, Resource::Image(image)))
    }

    pub fn register_ext_g_state(&mut self, state: ExtGState) -> Result<ResourceRef> {
        let fingerprint =
            Fingerprint::compute(ResourceKind::ExtGState, &state.fingerprint_bytes());
        Ok(self.register(ResourceKind::ExtGState, fingerprint, Resource::ExtGState(state)))
    }

    pub fn register_pattern(&mut self, pattern: Pattern) -> Result<ResourceRef> {
        let fingerprint =
            Fingerprint::compute(ResourceKind::Pattern, &pattern.fingerprint_bytes());
        Ok(self.register(ResourceKind::Pattern, fingerprint, Resource::Pattern(pattern)))
    }

    fn register(
        &mut self,
        kind: ResourceKind,
        fingerprint: Fingerprint,
        resource: Resource,
    ) -> ResourceRef {
        if let Some(existing) = self.by_fingerprint.get(&fingerprint) {
            tracing::debug!(name = %existing.name(), "resource dedup hit");
            return *existing;
        }

        let resource_ref = ResourceRef::new(self.next_id, kind);
        self.next_id += 1;
        self.entries.push((resource_ref, resource));
        self.by_fingerprint.insert(fingerprint, resource_ref);
        resource_ref
    }

    pub fn get(&self, resource_ref: ResourceRef) -> Option<&Resource> {
        self.entries
            .iter()
            .find(|(r, _)| *r == resource_ref)
            .map(|(_, res)| res)
    }

    /// Resources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceRef, &Resource)> {
        self.entries.iter().map(|(r, res)| (*r, res))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Color, ImageColorSpace};
    use crate::text::Font;

    #[test]
    fn test_resource_names() {
        assert_eq!(ResourceRef::new(1, ResourceKind::Font).name(), "F1");
        assert_eq!(ResourceRef::new(2, ResourceKind::Image).name(), "Im2");
        assert_eq!(ResourceRef::new(3, ResourceKind::ExtGState).name(), "GS3");
        assert_eq!(ResourceRef::new(4, ResourceKind::Pattern).name(), "Sh4");
    }

    #[test]
    fn test_font_dedup() {
        let mut manager = ResourceManager::new();
        let a = manager
            .register_font(FontSpec::standard(Font::Helvetica))
            .unwrap();
        let b = manager
            .register_font(FontSpec::standard(Font::Helvetica))
            .unwrap();
        let c = manager
            .register_font(FontSpec::standard(Font::Courier))
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_image_dedup_by_content() {
        let mut manager = ResourceManager::new();
        let pixels = vec![1u8, 2, 3, 4];
        let img1 =
            Image::from_raw_pixels(2, 2, ImageColorSpace::DeviceGray, pixels.clone()).unwrap();
        let img2 = Image::from_raw_pixels(2, 2, ImageColorSpace::DeviceGray, pixels).unwrap();
        let img3 =
            Image::from_raw_pixels(2, 2, ImageColorSpace::DeviceGray, vec![9, 9, 9, 9]).unwrap();

        let a = manager.register_image(img1).unwrap();
        let b = manager.register_image(img2).unwrap();
        let c = manager.register_image(img3).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_ids_increase_across_kinds() {
        let mut manager = ResourceManager::new();
        let font = manager
            .register_font(FontSpec::standard(Font::Helvetica))
            .unwrap();
        let gs = manager
            .register_ext_g_state(ExtGState::new().with_alpha(0.5))
            .unwrap();
        let pattern = manager
            .register_pattern(Pattern::axial(0.0, 0.0, 1.0, 1.0, Color::red(), Color::blue()))
            .unwrap();

        assert_eq!(font.name(), "F1");
        assert_eq!(gs.name(), "GS2");
        assert_eq!(pattern.name(), "Sh3");
    }

    #[test]
    fn test_get_returns_registered_resource() {
        let mut manager = ResourceManager::new();
        let r = manager
            .register_font(FontSpec::standard(Font::TimesRoman))
            .unwrap();

        match manager.get(r) {
            Some(Resource::Font(FontSpec::Standard { font, .. })) => {
                assert_eq!(*font, Font::TimesRoman);
            }
            other => panic!("unexpected resource: {other:?}"),
        }
        assert!(manager.get(ResourceRef::new(99, ResourceKind::Font)).is_none());
    }
}
