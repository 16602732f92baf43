use crate::encoder::QrCode;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageBuffer, ImageEncoder, Luma};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Largest image side in pixels; `pixel_per_point` is scaled down to fit.
pub const MAX_IMAGE_SIZE: u32 = 1024;

const DARK: Luma<u8> = Luma([0u8]);
const LIGHT: Luma<u8> = Luma([255u8]);

/// Errors raised while rasterizing or writing a symbol.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported output format: {0:?} (expected png, jpg or jpeg)")]
    UnsupportedFormat(String),
}

/// Raster layout of a rendered symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RenderOptions {
    /// Pixels per module, horizontally and vertically.
    pub pixel_per_point: u32,
    /// Quiet zone width in modules.
    pub outer_frame: u32,
    /// JPEG quality, 1 to 100.
    pub jpeg_quality: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pixel_per_point: 4,
            outer_frame: 4,
            jpeg_quality: 85,
        }
    }
}

/// Rasterizes the symbol into a grayscale image with a light quiet zone.
///
/// The side never exceeds [`MAX_IMAGE_SIZE`]: the quiet zone is narrowed
/// until the modules fit, then `pixel_per_point` is scaled down.
///
/// # Example
///
/// ```rust
/// use qrmatrix::{EncodeOptions, QrCode};
/// use qrmatrix::helper::{to_image_buffer, RenderOptions};
///
/// let qr = QrCode::encode_text("Hello, World!", &EncodeOptions::default()).unwrap();
/// let img = to_image_buffer(&qr, &RenderOptions::default());
/// assert_eq!(img.dimensions(), (116, 116));
/// ```
pub fn to_image_buffer(qr: &QrCode, options: &RenderOptions) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let size = qr.size() as u32;
    let frame = options.outer_frame.min((MAX_IMAGE_SIZE - size) / 2);
    let modules = size + 2 * frame;
    let ppp = options.pixel_per_point.clamp(1, MAX_IMAGE_SIZE / modules);
    let border = frame as i32;
    let size = modules * ppp;
    let mut img = ImageBuffer::new(size, size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / ppp) as i32 - border;
        let qr_y = (y / ppp) as i32 - border;
        *pixel = if qr.get_module(qr_x, qr_y) { DARK } else { LIGHT };
    }

    img
}

/// Writes the symbol as a PNG image.
pub fn write_png<W: Write>(
    qr: &QrCode,
    options: &RenderOptions,
    writer: W,
) -> Result<(), RenderError> {
    let img = to_image_buffer(qr, options);
    PngEncoder::new(writer).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::L8,
    )?;
    Ok(())
}

/// Writes the symbol as a JPEG image at `options.jpeg_quality`.
pub fn write_jpeg<W: Write>(
    qr: &QrCode,
    options: &RenderOptions,
    mut writer: W,
) -> Result<(), RenderError> {
    let img = to_image_buffer(qr, options);
    let quality = options.jpeg_quality.clamp(1, 100);
    JpegEncoder::new_with_quality(&mut writer, quality).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::L8,
    )?;
    Ok(())
}

/// Saves the symbol to `path`, picking PNG or JPEG from the file extension.
/// Missing parent directories are created.
///
/// # Errors
///
/// [`RenderError::UnsupportedFormat`] for any other extension.
pub fn save_image(
    qr: &QrCode,
    options: &RenderOptions,
    path: impl AsRef<Path>,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !matches!(ext.as_str(), "png" | "jpg" | "jpeg") {
        return Err(RenderError::UnsupportedFormat(ext));
    }

    create_parent(path)?;
    let mut writer = BufWriter::new(fs::File::create(path)?);
    if ext == "png" {
        write_png(qr, options, &mut writer)?;
    } else {
        write_jpeg(qr, options, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), RenderError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

/// The symbol as `'0'`/`'1'` rows separated by newlines.
pub fn to_text(qr: &QrCode) -> String {
    qr.to_string()
}

/// Writes the `'0'`/`'1'` rows to `path`, creating missing parent directories.
pub fn save_text(qr: &QrCode, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, to_text(qr))?;
    Ok(())
}

/// Prints the given QrCode object to the console.
pub fn print_qr(qr: &QrCode, border: i32) {
    let size = qr.size() as i32;
    for y in -border..size + border {
        for x in -border..size + border {
            let c: char = if qr.get_module(x, y) { '█' } else { ' ' };
            print!("{0}{0}", c);
        }
        println!();
    }
    println!();
}
