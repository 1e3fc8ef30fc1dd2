//! QR-code rendering of `otpauth://` URIs.
//!
//! The service only ever hands a string to a [`QrRenderer`]; the
//! [`QrCodeRenderer`] implementation uses the `qrcode` crate for the
//! matrix and the `image` crate for PNG output.

use image::Luma;
use qrcode::render::{svg, unicode};
use qrcode::QrCode;
use serde::{Deserialize, Serialize};

use crate::otp::types::*;

/// Default edge length in pixels, matching the 256 × 256 code the web
/// front-end drew.
pub const DEFAULT_QR_SIZE: u32 = 256;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Output types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Output encoding of a rendered QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrFormat {
    /// Unicode half-block art for a terminal.
    #[default]
    Terminal,
    Png,
    Svg,
}

impl std::str::FromStr for QrFormat {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "text" => Ok(Self::Terminal),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(OtpError::new(
                OtpErrorKind::InvalidInput,
                format!("Unknown QR format: {}", other),
            )),
        }
    }
}

/// A rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrImage {
    Text(String),
    Png(Vec<u8>),
    Svg(String),
}

impl QrImage {
    pub fn format(&self) -> QrFormat {
        match self {
            Self::Text(_) => QrFormat::Terminal,
            Self::Png(_) => QrFormat::Png,
            Self::Svg(_) => QrFormat::Svg,
        }
    }

    /// Raw bytes, suitable for writing to a file.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) | Self::Svg(s) => s.as_bytes(),
            Self::Png(b) => b,
        }
    }

    /// File extension for the encoding.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text(_) => "txt",
            Self::Png(_) => "png",
            Self::Svg(_) => "svg",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Renderer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Turns a string into a scannable image.
pub trait QrRenderer: Send + Sync {
    fn render(&self, text: &str) -> Result<QrImage, OtpError>;
}

/// [`QrRenderer`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeRenderer {
    pub format: QrFormat,
    /// Minimum edge length in pixels (PNG/SVG only).
    pub size: u32,
}

impl Default for QrCodeRenderer {
    fn default() -> Self {
        Self::new(QrFormat::default())
    }
}

impl QrCodeRenderer {
    pub fn new(format: QrFormat) -> Self {
        Self {
            format,
            size: DEFAULT_QR_SIZE,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

impl QrRenderer for QrCodeRenderer {
    fn render(&self, text: &str) -> Result<QrImage, OtpError> {
        let code = QrCode::new(text.as_bytes()).map_err(|e| {
            OtpError::new(OtpErrorKind::QrEncodeFailed, format!("QR encode error: {}", e))
        })?;

        match self.format {
            QrFormat::Terminal => Ok(QrImage::Text(render_terminal(&code))),
            QrFormat::Svg => Ok(QrImage::Svg(
                code.render::<svg::Color>()
                    .min_dimensions(self.size, self.size)
                    .build(),
            )),
            QrFormat::Png => render_png(&code, self.size).map(QrImage::Png),
        }
    }
}

fn render_terminal(code: &QrCode) -> String {
    // Inverted so the code reads on dark terminal backgrounds.
    code.render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build()
}

fn render_png(code: &QrCode, size: u32) -> Result<Vec<u8>, OtpError> {
    let img = code.render::<Luma<u8>>().min_dimensions(size, size).build();

    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::L8,
    )
    .map_err(|e| OtpError::new(OtpErrorKind::QrEncodeFailed, format!("PNG encode error: {}", e)))?;

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "otpauth://totp/ExampleCo:Alice?secret=JBSWY3DPEHPK3PXP&issuer=ExampleCo";

    #[test]
    fn png_has_magic_bytes() {
        let img = QrCodeRenderer::new(QrFormat::Png).render(URI).unwrap();
        assert_eq!(img.format(), QrFormat::Png);
        assert_eq!(&img.as_bytes()[..4], b"\x89PNG");
    }

    #[test]
    fn png_respects_minimum_size() {
        let small = QrCodeRenderer::new(QrFormat::Png).with_size(64).render(URI).unwrap();
        let large = QrCodeRenderer::new(QrFormat::Png).with_size(512).render(URI).unwrap();
        assert!(large.as_bytes().len() > small.as_bytes().len());
    }

    #[test]
    fn svg_output() {
        let img = QrCodeRenderer::new(QrFormat::Svg).render(URI).unwrap();
        let QrImage::Svg(svg) = &img else {
            panic!("expected svg");
        };
        assert!(svg.contains("<svg"));
        assert_eq!(img.extension(), "svg");
    }

    #[test]
    fn terminal_output_is_block_art() {
        let img = QrCodeRenderer::default().render(URI).unwrap();
        let QrImage::Text(art) = &img else {
            panic!("expected text");
        };
        assert!(art.lines().count() > 10);
        assert_eq!(img.extension(), "txt");
    }

    #[test]
    fn text_too_long_fails() {
        let err = QrCodeRenderer::default().render(&"a".repeat(8000)).unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::QrEncodeFailed);
    }

    #[test]
    fn format_from_str() {
        assert_eq!("PNG".parse::<QrFormat>().unwrap(), QrFormat::Png);
        assert_eq!("text".parse::<QrFormat>().unwrap(), QrFormat::Terminal);
        assert!("gif".parse::<QrFormat>().is_err());
    }
}
