//! Asset loading for the demo: opaque blobs in, canvases out.
//!
//! Images are PNG. A blob that is missing or fails to decode is replaced by a
//! procedurally generated placeholder so the visual pipeline always runs.
//!
//! # Invariants
//! - Decoding never aborts the demo; failures degrade to placeholders.
//! - A missing file is an empty blob, never an error at bundle load.

use std::path::{Path, PathBuf};

use oldskool_common::{Canvas, Rgba};
use serde::Serialize;
use tracing::{debug, warn};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("asset missing: {0}")]
    Missing(String),
}

/// Which procedural image stands in for a failed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    Font,
    Logo,
    SpiralLogo,
    Texture,
}

const CHECKER_SIZE: u32 = 32;

impl Placeholder {
    pub fn size(self) -> (u32, u32) {
        match self {
            Self::Font => (480, 216),
            Self::Logo => (256, 64),
            Self::SpiralLogo => (64, 64),
            Self::Texture => (256, 256),
        }
    }

    pub fn generate(self) -> Canvas {
        let (w, h) = self.size();
        match self {
            Self::Font => Canvas::filled(w, h, Rgba::WHITE),
            Self::Logo => Canvas::filled(w, h, Rgba::MAGENTA),
            Self::SpiralLogo => Canvas::filled(w, h, Rgba::CYAN),
            Self::Texture => {
                let mut c = Canvas::new(w, h);
                for y in 0..h {
                    for x in 0..w {
                        let even = (x / CHECKER_SIZE + y / CHECKER_SIZE) % 2 == 0;
                        let color = if even { Rgba::MAGENTA } else { Rgba::CYAN };
                        c.set(x as i32, y as i32, color);
                    }
                }
                c
            }
        }
    }
}

/// Decode a PNG blob into a canvas.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<Canvas, AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::Missing(name.to_string()));
    }
    let decode_err = |reason: String| AssetError::Decode {
        name: name.to_string(),
        reason,
    };
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| decode_err(e.to_string()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    Canvas::from_rgba8(w, h, img.as_raw()).ok_or_else(|| decode_err("pixel buffer size mismatch".into()))
}

/// Decode `bytes`, or log the failure and return `placeholder`'s image.
pub fn decode_or_placeholder(name: &str, bytes: &[u8], placeholder: Placeholder) -> Canvas {
    decode_with_origin(name, bytes, placeholder).0
}

fn decode_with_origin(name: &str, bytes: &[u8], placeholder: Placeholder) -> (Canvas, ImageOrigin) {
    match decode_image(name, bytes) {
        Ok(canvas) => {
            debug!(name, width = canvas.width(), height = canvas.height(), "image decoded");
            (canvas, ImageOrigin::Decoded)
        }
        Err(e) => {
            warn!(name, error = %e, ?placeholder, "using placeholder image");
            (placeholder.generate(), ImageOrigin::Placeholder)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    Decoded,
    Placeholder,
}

/// Outcome of decoding one bundled image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReport {
    pub file: &'static str,
    pub origin: ImageOrigin,
    pub width: u32,
    pub height: u32,
}

/// The four demo images, decoded or substituted.
#[derive(Debug, Clone)]
pub struct DemoImages {
    pub font: Canvas,
    pub logo: Canvas,
    pub spiral_logo: Canvas,
    pub texture: Canvas,
    pub report: Vec<ImageReport>,
}

pub const FONT_FILE: &str = "font.png";
pub const LOGO_FILE: &str = "teamg1_logo.png";
pub const SPIRAL_LOGO_FILE: &str = "gameone_logo.png";
pub const TEXTURE_FILE: &str = "texture.png";
pub const MUSIC_FILE: &str = "music.ym";

/// Raw asset blobs for one demo run.
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    pub font: Vec<u8>,
    pub logo: Vec<u8>,
    pub spiral_logo: Vec<u8>,
    pub texture: Vec<u8>,
    pub music: Vec<u8>,
}

impl AssetBundle {
    /// Read every asset from `dir`. Missing files become empty blobs.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        Ok(Self {
            font: read_optional(dir.join(FONT_FILE))?,
            logo: read_optional(dir.join(LOGO_FILE))?,
            spiral_logo: read_optional(dir.join(SPIRAL_LOGO_FILE))?,
            texture: read_optional(dir.join(TEXTURE_FILE))?,
            music: read_optional(dir.join(MUSIC_FILE))?,
        })
    }

    pub fn decode_images(&self) -> DemoImages {
        let mut report = Vec::with_capacity(4);
        let mut load = |file: &'static str, bytes: &[u8], placeholder| {
            let (canvas, origin) = decode_with_origin(file, bytes, placeholder);
            report.push(ImageReport {
                file,
                origin,
                width: canvas.width(),
                height: canvas.height(),
            });
            canvas
        };
        let font = load(FONT_FILE, &self.font, Placeholder::Font);
        let logo = load(LOGO_FILE, &self.logo, Placeholder::Logo);
        let spiral_logo = load(SPIRAL_LOGO_FILE, &self.spiral_logo, Placeholder::SpiralLogo);
        let texture = load(TEXTURE_FILE, &self.texture, Placeholder::Texture);
        DemoImages {
            font,
            logo,
            spiral_logo,
            texture,
            report,
        }
    }
}

fn read_optional(path: PathBuf) -> Result<Vec<u8>, AssetError> {
    match std::fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "asset file not found");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn crate_info() -> &'static str {
    "oldskool-assets v0.1.0"
}
