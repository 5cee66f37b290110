use std::io::Cursor;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageFormat, Luma};
use log::debug;
use qrcode::QrCode;
use qrcode::render::unicode;
use rqrr::PreparedImage;

use crate::uri::Provisioning;

const MIN_DIMENSION: u32 = 300;

/// Renders `uri` as a PNG image.
pub fn render_png(uri: &str) -> anyhow::Result<Vec<u8>> {
    let code = QrCode::new(uri.as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    debug!("rendered provisioning qr code ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Renders `uri` as a `data:` URL suitable for an `<img src>`.
pub fn render_data_url(uri: &str) -> anyhow::Result<String> {
    let png = render_png(uri)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

/// Renders `uri` with unicode half blocks for display in a terminal.
pub fn render_terminal(uri: &str) -> anyhow::Result<String> {
    let code = QrCode::new(uri.as_bytes())?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

/// Reads a provisioning URI back out of a QR code image.
pub fn read_provisioning(image: DynamicImage) -> anyhow::Result<Provisioning> {
    let mut prepared = PreparedImage::prepare(image.to_luma8());
    let grids = prepared.detect_grids();

    let Some(grid) = grids.first() else {
        anyhow::bail!("No QR codes found in the image");
    };

    let (_, content) = grid.decode()?;
    if !content.starts_with("otpauth://totp/") {
        anyhow::bail!("The QR code does not contain a TOTP provisioning URI");
    }

    Ok(Provisioning::parse(&content)?)
}

pub fn read_provisioning_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Provisioning> {
    let image = image::open(path)?;
    read_provisioning(image)
}
