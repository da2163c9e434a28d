//! Image decoding and single-page PDF rendering.
//!
//! Everything here is blocking and runs on the blocking thread pool.

use crate::error::ConverterError;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

const JPEG_QUALITY: u8 = 75;
const IMAGE_RESOURCE: &str = "Im0";

/// Summary of a written PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfInfo {
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
}

/// Storage key of the PDF produced for an uploaded `filename`.
///
/// Only the last extension is dropped, and only from the final path segment.
/// Leading dots are part of the name, so `.png` has no extension.
pub fn output_key(filename: &str) -> String {
    let base_start = filename.rfind('/').map_or(0, |i| i + 1);
    let base = &filename[base_start..];
    let leading_dots = base.len() - base.trim_start_matches('.').len();

    let stem_end = match base[leading_dots..].rfind('.') {
        Some(i) => base_start + leading_dots + i,
        None => filename.len(),
    };

    format!("{}.pdf", &filename[..stem_end])
}

/// Decode the image at `source` and write it as a one-page PDF to
/// `destination`.
///
/// The format is detected from the file contents. Any colour model other than
/// 8-bit RGB is converted to it, dropping alpha and expanding palettes. The
/// PDF replaces `destination` atomically.
pub fn convert_image_to_pdf(source: &Path, destination: &Path) -> Result<PdfInfo, ConverterError> {
    let image = ImageReader::open(source)?
        .with_guessed_format()?
        .decode()?;

    let rgb = image.into_rgb8();
    let pdf = render_pdf(&rgb)?;

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let partial = destination.with_extension("pdf.partial");
    std::fs::write(&partial, &pdf)?;
    std::fs::rename(&partial, destination)?;

    Ok(PdfInfo {
        width: rgb.width(),
        height: rgb.height(),
        bytes: pdf.len() as u64,
    })
}

/// Lay `image` out on a page of the same size in points (72 dpi).
fn render_pdf(image: &RgbImage) -> Result<Vec<u8>, ConverterError> {
    let (width, height) = image.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(image)
        .map_err(|e| ConverterError::Encode(anyhow::Error::new(e)))?;

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )
        .with_compression(false),
    );

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(i64::from(width)),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(i64::from(height)),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_RESOURCE => image_id,
            },
        },
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(i64::from(width)),
            Object::Integer(i64::from(height)),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut pdf = Vec::new();
    doc.save_to(&mut pdf)?;
    Ok(pdf)
}
