use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Luma};
use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};

const QR_SIZE_PX: u32 = 300;

#[derive(Debug, thiserror::Error)]
pub enum QrRenderError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] QrError),
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

fn encode(text: &str) -> Result<QrCode, QrError> {
    QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
}

/// Renders `text` as a black-on-white SVG QR code, for inline HTML.
pub fn render_svg(text: &str) -> Result<String, QrRenderError> {
    Ok(encode(text)?
        .render::<svg::Color>()
        .min_dimensions(QR_SIZE_PX, QR_SIZE_PX)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Renders `text` as a grayscale PNG. Mail clients drop SVG images, so
/// emails carry this form.
pub fn render_png(text: &str) -> Result<Vec<u8>, QrRenderError> {
    let image = encode(text)?
        .render::<Luma<u8>>()
        .min_dimensions(QR_SIZE_PX, QR_SIZE_PX)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Base64 of the PNG, for email attachments.
pub fn render_png_base64(text: &str) -> Result<String, QrRenderError> {
    render_png(text).map(|png| STANDARD.encode(png))
}
