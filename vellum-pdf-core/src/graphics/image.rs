//! Image XObjects.
//!
//! The engine never parses image container formats beyond reading JPEG frame
//! headers for pass-through embedding; decoded pixel buffers come from
//! external loaders (or the optional `image`-crate bridge).

use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId, Stream};

/// Compression filter applied to embedded image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// Pass-through of already-compressed JPEG data
    Dct,
    /// Lossless deflate of raw pixel data
    Flate,
    /// No filter; raw pixel data embedded as-is
    None,
}

impl ImageFilter {
    /// Resolves a filter request by PDF name.
    ///
    /// `"AUTO"` picks DCTDecode for JPEG sources and FlateDecode otherwise.
    pub fn from_name(name: &str, jpeg_source: bool) -> Result<Self> {
        match name {
            "AUTO" => Ok(if jpeg_source {
                ImageFilter::Dct
            } else {
                ImageFilter::Flate
            }),
            "DCTDecode" => Ok(ImageFilter::Dct),
            "FlateDecode" => Ok(ImageFilter::Flate),
            other => Err(PdfError::UnsupportedFilter(other.to_string())),
        }
    }

    pub fn pdf_name(&self) -> Option<&'static str> {
        match self {
            ImageFilter::Dct => Some("DCTDecode"),
            ImageFilter::Flate => Some("FlateDecode"),
            ImageFilter::None => None,
        }
    }
}

/// Color spaces for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl ColorSpace {
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
        }
    }

    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// An image ready for embedding.
///
/// Carries either pass-through JPEG bytes or a decoded pixel buffer, plus an
/// optional alpha channel. An alpha channel that is uniformly opaque is
/// dropped at construction, so no soft mask object is ever produced for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Vec<u8>,
    filter: ImageFilter,
    width: u32,
    height: u32,
    color_space: ColorSpace,
    bits_per_component: u8,
    soft_mask: Option<Vec<u8>>,
}

impl Image {
    /// Embeds JPEG data as-is (DCTDecode pass-through).
    ///
    /// Only the frame header is read, for dimensions and color space.
    pub fn from_jpeg_data(data: Vec<u8>) -> Result<Self> {
        let (width, height, color_space, bits_per_component) = parse_jpeg_header(&data)?;

        Ok(Image {
            data,
            filter: ImageFilter::Dct,
            width,
            height,
            color_space,
            bits_per_component,
            soft_mask: None,
        })
    }

    /// Wraps a decoded pixel buffer (row-major, 8 bits per component).
    pub fn from_raw_pixels(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * color_space.components();
        if pixels.len() != expected {
            return Err(PdfError::InvalidImage(format!(
                "pixel buffer has {} bytes, expected {} for {}x{} {}",
                pixels.len(),
                expected,
                width,
                height,
                color_space.pdf_name()
            )));
        }

        Ok(Image {
            data: pixels,
            filter: default_raw_filter(),
            width,
            height,
            color_space,
            bits_per_component: 8,
            soft_mask: None,
        })
    }

    /// Wraps decoded RGBA pixels, splitting off the alpha channel.
    ///
    /// A uniformly opaque alpha channel is discarded entirely.
    pub fn from_rgba_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PdfError::InvalidImage(format!(
                "pixel buffer has {} bytes, expected {} for {}x{} RGBA",
                pixels.len(),
                expected,
                width,
                height
            )));
        }

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        let mut alpha = Vec::with_capacity(width as usize * height as usize);
        for px in pixels.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }

        let mut image = Self::from_raw_pixels(width, height, ColorSpace::DeviceRGB, rgb)?;
        if alpha.iter().any(|&a| a != 0xFF) {
            image.soft_mask = Some(alpha);
        }
        Ok(image)
    }

    /// Overrides the automatically selected filter by PDF name.
    ///
    /// DCTDecode can only be requested for JPEG sources; raw pixels are not
    /// re-encoded.
    pub fn with_filter_name(mut self, name: &str) -> Result<Self> {
        let jpeg_source = self.filter == ImageFilter::Dct;
        let requested = ImageFilter::from_name(name, jpeg_source)?;
        if requested == ImageFilter::Dct && !jpeg_source {
            return Err(PdfError::InvalidResource(
                "DCTDecode requires a JPEG source".to_string(),
            ));
        }
        if jpeg_source && requested != ImageFilter::Dct {
            return Err(PdfError::InvalidResource(format!(
                "JPEG data is embedded as-is; cannot re-encode with {name}"
            )));
        }
        self.filter = requested;
        Ok(self)
    }

    /// Converts a decoded `image` crate buffer.
    #[cfg(feature = "external-images")]
    pub fn from_dynamic_image(img: &::image::DynamicImage) -> Result<Self> {
        use ::image::DynamicImage;

        match img {
            DynamicImage::ImageLuma8(buf) => Self::from_raw_pixels(
                buf.width(),
                buf.height(),
                ColorSpace::DeviceGray,
                buf.as_raw().clone(),
            ),
            DynamicImage::ImageRgb8(buf) => Self::from_raw_pixels(
                buf.width(),
                buf.height(),
                ColorSpace::DeviceRGB,
                buf.as_raw().clone(),
            ),
            other => {
                let rgba = other.to_rgba8();
                Self::from_rgba_pixels(rgba.width(), rgba.height(), rgba.into_raw())
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn filter(&self) -> ImageFilter {
        self.filter
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn has_soft_mask(&self) -> bool {
        self.soft_mask.is_some()
    }

    /// Source bytes the dedup fingerprint is computed over.
    pub(crate) fn fingerprint_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() + 32);
        bytes.extend_from_slice(self.filter.pdf_name().unwrap_or("Raw").as_bytes());
        bytes.extend_from_slice(self.color_space.pdf_name().as_bytes());
        bytes.extend_from_slice(&self.width.to_be_bytes());
        bytes.extend_from_slice(&self.height.to_be_bytes());
        bytes.extend_from_slice(&self.data);
        if let Some(mask) = &self.soft_mask {
            bytes.extend_from_slice(mask);
        }
        bytes
    }

    /// Builds the image XObject stream, pointing at an already registered
    /// soft-mask object when one exists.
    pub(crate) fn to_stream(&self, soft_mask_id: Option<ObjectId>) -> Result<Stream> {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name("XObject".to_string()));
        dict.set("Subtype", Object::Name("Image".to_string()));
        dict.set("Width", Object::Integer(self.width as i64));
        dict.set("Height", Object::Integer(self.height as i64));
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.pdf_name().to_string()),
        );
        dict.set(
            "BitsPerComponent",
            Object::Integer(self.bits_per_component as i64),
        );
        if let Some(id) = soft_mask_id {
            dict.set("SMask", Object::Reference(id));
        }

        let data = encode_payload(&self.data, self.filter)?;
        if let Some(name) = self.filter.pdf_name() {
            dict.set("Filter", Object::Name(name.to_string()));
        }

        Ok(Stream::with_dictionary(dict, data))
    }

    /// Builds the DeviceGray soft-mask stream for a partially transparent
    /// image. Callers must only invoke this when [`has_soft_mask`] is true.
    ///
    /// [`has_soft_mask`]: Image::has_soft_mask
    pub(crate) fn soft_mask_stream(&self) -> Result<Option<Stream>> {
        let Some(alpha) = &self.soft_mask else {
            return Ok(None);
        };

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name("XObject".to_string()));
        dict.set("Subtype", Object::Name("Image".to_string()));
        dict.set("Width", Object::Integer(self.width as i64));
        dict.set("Height", Object::Integer(self.height as i64));
        dict.set("ColorSpace", Object::Name("DeviceGray".to_string()));
        dict.set("BitsPerComponent", Object::Integer(8));

        let filter = default_raw_filter();
        let data = encode_payload(alpha, filter)?;
        if let Some(name) = filter.pdf_name() {
            dict.set("Filter", Object::Name(name.to_string()));
        }

        Ok(Some(Stream::with_dictionary(dict, data)))
    }
}

fn default_raw_filter() -> ImageFilter {
    if cfg!(feature = "compression") {
        ImageFilter::Flate
    } else {
        ImageFilter::None
    }
}

fn encode_payload(data: &[u8], filter: ImageFilter) -> Result<Vec<u8>> {
    match filter {
        ImageFilter::Dct | ImageFilter::None => Ok(data.to_vec()),
        ImageFilter::Flate => {
            #[cfg(feature = "compression")]
            {
                use flate2::write::ZlibEncoder;
                use flate2::Compression;
                use std::io::Write;

                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder
                    .write_all(data)
                    .map_err(|e| PdfError::CompressionError(e.to_string()))?;
                encoder
                    .finish()
                    .map_err(|e| PdfError::CompressionError(e.to_string()))
            }
            #[cfg(not(feature = "compression"))]
            {
                Err(PdfError::UnsupportedFilter(
                    "FlateDecode (compression feature disabled)".to_string(),
                ))
            }
        }
    }
}

/// Reads dimensions and color space from a JPEG frame header.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace, u8)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::InvalidImage("not a valid JPEG file".to_string()));
    }

    let mut pos = 2;
    let mut width = 0;
    let mut height = 0;
    let mut components = 0;

    while pos < data.len() - 1 {
        if data[pos] != 0xFF {
            return Err(PdfError::InvalidImage("invalid JPEG marker".to_string()));
        }

        let marker = data[pos + 1];
        pos += 2;

        // fill bytes
        if marker == 0xFF {
            continue;
        }

        // SOF0..SOF15 except DHT/JPG/DAC carry the frame dimensions
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            if pos + 7 >= data.len() {
                return Err(PdfError::InvalidImage("truncated JPEG file".to_string()));
            }

            // length + precision
            pos += 3;

            height = ((data[pos] as u32) << 8) | (data[pos + 1] as u32);
            pos += 2;
            width = ((data[pos] as u32) << 8) | (data[pos + 1] as u32);
            pos += 2;

            components = data[pos];
            break;
        } else if marker == 0xD9 {
            break;
        } else if marker == 0xD8 || (0xD0..=0xD7).contains(&marker) {
            // standalone markers without a length field
            continue;
        } else {
            if pos + 1 >= data.len() {
                return Err(PdfError::InvalidImage("truncated JPEG file".to_string()));
            }
            let length = ((data[pos] as usize) << 8) | (data[pos + 1] as usize);
            pos += length;
        }
    }

    if width == 0 || height == 0 {
        return Err(PdfError::InvalidImage(
            "could not find image dimensions".to_string(),
        ));
    }

    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        4 => ColorSpace::DeviceCMYK,
        _ => {
            return Err(PdfError::InvalidImage(format!(
                "unsupported number of components: {components}"
            )))
        }
    };

    Ok((width, height, color_space, 8))
}
