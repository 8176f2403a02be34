//! Square avatar cropping.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};

use super::error::{EngineError, EngineResult};
use super::ImagePreparer;

/// Square crop window inside a `width`x`height` image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub left: u32,
    pub top: u32,
    pub size: u32,
}

/// Pick the largest square window.
///
/// Horizontally centered. Vertically centered on `focus_y` (0-1, clamped)
/// when given, kept inside the frame; otherwise centered.
pub fn crop_window(width: u32, height: u32, focus_y: Option<f32>) -> CropWindow {
    let size = width.min(height);
    let left = (width - size) / 2;
    let max_top = height - size;

    let top = match focus_y {
        Some(focus) => {
            let focus = if focus.is_nan() { 0.5 } else { focus.clamp(0.0, 1.0) };
            let center = (height as f64 * focus as f64) as i64;
            (center - (size / 2) as i64).clamp(0, max_top as i64) as u32
        }
        None => max_top / 2,
    };

    CropWindow { left, top, size }
}

/// [`ImagePreparer`] that square-crops and resizes with Lanczos3.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareCropPreparer;

impl SquareCropPreparer {
    pub fn new() -> Self {
        Self
    }
}

impl ImagePreparer for SquareCropPreparer {
    fn name(&self) -> &str {
        "square-crop"
    }

    fn prepare(
        &self,
        source: &Path,
        size: u32,
        focus_y: Option<f32>,
        out_path: &Path,
    ) -> EngineResult<PathBuf> {
        if !source.exists() {
            return Err(EngineError::missing_input(format!(
                "avatar image not found: {}",
                source.display()
            )));
        }
        if size == 0 {
            return Err(EngineError::not_configured("image size must be positive"));
        }

        let img = image::open(source)?.to_rgb8();
        let window = crop_window(img.width(), img.height(), focus_y);
        if window.size == 0 {
            return Err(EngineError::missing_input(format!(
                "avatar image is empty: {}",
                source.display()
            )));
        }

        let cropped = imageops::crop_imm(&img, window.left, window.top, window.size, window.size)
            .to_image();
        let resized = imageops::resize(&cropped, size, size, FilterType::Lanczos3);

        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| EngineError::io("creating image directory", e))?;
            }
        }
        resized.save(out_path)?;

        tracing::debug!(
            "Prepared avatar {} -> {} ({}px, crop {}x{} at {},{})",
            source.display(),
            out_path.display(),
            size,
            window.size,
            window.size,
            window.left,
            window.top
        );
        Ok(out_path.to_path_buf())
    }
}
