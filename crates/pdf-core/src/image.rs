//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }
    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// Dimensions and component count read from a JPEG SOF segment
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
}

fn read_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    // Walk the marker segments until a start-of-frame (SOFn) marker.
    // DHT (C4), JPG (C8) and DAC (CC) share the range but carry no frame.
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return Ok(JpegInfo {
                height: u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32,
                width: u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32,
                num_components: data[i + 9],
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError("Could not parse JPEG header".to_string()))
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB" or "DeviceGray"
    pub color_space: &'static str,
    pub bits_per_component: u8,
    /// "DCTDecode" for JPEG passthrough, "FlateDecode" for decoded PNG
    pub filter: &'static str,
    /// Encoded sample data
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Create an XObject from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG data is embedded as-is with the DCTDecode filter.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = read_jpeg_info(data)?;

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space: if info.num_components == 1 {
                "DeviceGray"
            } else {
                "DeviceRGB"
            },
            bits_per_component: 8,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    /// PNG data is decoded and re-compressed as raw samples.
    ///
    /// Alpha is flattened onto a white background since PDF image XObjects
    /// would otherwise need a separate soft mask.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let blend = |value: u8, alpha: u8| -> u8 {
            let a = alpha as f32 / 255.0;
            (value as f32 * a + 255.0 * (1.0 - a)) as u8
        };

        let (raw, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let raw: Vec<u8> = image
                    .to_luma_alpha8()
                    .pixels()
                    .map(|p| blend(p[0], p[1]))
                    .collect();
                (raw, "DeviceGray")
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let raw: Vec<u8> = image
                    .to_rgba8()
                    .pixels()
                    .flat_map(|p| [blend(p[0], p[3]), blend(p[1], p[3]), blend(p[2], p[3])])
                    .collect();
                (raw, "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
        };

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            filter: "FlateDecode",
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set("ColorSpace", Object::Name(self.color_space.as_bytes().to_vec()));
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));

        // Already encoded; keep lopdf from compressing it again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

/// Generate operators to draw an image
///
/// `x`/`y` are the lower-left corner in PDF coordinates.
pub fn generate_image_operators(image_name: &str, x: f64, y: f64, width: f64, height: f64) -> Vec<u8> {
    format!("q\n{width:.2} 0 0 {height:.2} {x:.2} {y:.2} cm\n/{image_name} Do\nQ\n").into_bytes()
}
