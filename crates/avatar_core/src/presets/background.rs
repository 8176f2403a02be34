//! Procedural preset backgrounds.
//!
//! Draws a styled scene for a preset: vertical gradient, desk band, an
//! optional rounded content panel and a lower-third accent bar. Generated
//! images are cached permanently per preset key.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

use super::registry::Preset;
use super::style::StyleRecipe;
use crate::media::{MediaError, MediaResult};
use crate::models::Rect;

/// Desk band starts at this fraction of the frame height.
const DESK_TOP: f64 = 0.75;
/// Lower-third bar spans these fractions of the frame height.
const LOWER_THIRD: (f64, f64) = (0.68, 0.72);

const PANEL_RADIUS: f64 = 16.0;
const PANEL_OUTLINE_WIDTH: u32 = 4;
const PANEL_FILL_INSET: u32 = 6;
const PANEL_FILL_RADIUS: f64 = 14.0;
const PANEL_FILL: Rgb<u8> = Rgb([255, 255, 255]);
const PANEL_FILL_ALPHA: u8 = 30;

/// Cache location of a preset's generated background.
pub fn background_cache_path(preset: &Preset, cache_dir: &Path) -> PathBuf {
    cache_dir.join(format!("{}_bg.png", preset.key))
}

/// Resolve the background image for a preset.
///
/// A custom path is returned unchanged (no resizing or validation). Otherwise
/// the cached image for `preset.key` is returned, generating it on first use.
/// A cached file is never regenerated, even if the recipe changes.
pub fn render_background(
    preset: &Preset,
    cache_dir: &Path,
    custom: Option<&Path>,
) -> MediaResult<PathBuf> {
    if let Some(custom) = custom {
        return Ok(custom.to_path_buf());
    }

    let out_path = background_cache_path(preset, cache_dir);
    if out_path.exists() {
        tracing::debug!("Using cached background {}", out_path.display());
        return Ok(out_path);
    }

    fs::create_dir_all(cache_dir).map_err(|e| MediaError::io("creating background cache", e))?;

    let img = draw_background(preset);

    // Write beside the target and rename so a half-written file never enters the cache
    let temp_path = out_path.with_extension("png.tmp");
    img.save_with_format(&temp_path, ImageFormat::Png)?;
    fs::rename(&temp_path, &out_path).map_err(|e| MediaError::io("caching background", e))?;

    tracing::debug!(
        "Generated {} background {} ({})",
        preset.key,
        out_path.display(),
        preset.resolution
    );
    Ok(out_path)
}

/// Draw the background for a preset in memory.
pub fn draw_background(preset: &Preset) -> RgbImage {
    let width = preset.resolution.width;
    let height = preset.resolution.height;
    let recipe = preset.background_style.recipe();

    let mut img = gradient(width, height, &recipe);

    let desk_top = (height as f64 * DESK_TOP) as u32;
    fill_rows(&mut img, desk_top, height, Rgb(recipe.desk));

    if let Some(panel) = preset.content_box {
        draw_content_panel(&mut img, panel, Rgb(recipe.accent));
    }

    let bar_top = (height as f64 * LOWER_THIRD.0) as u32;
    let bar_bottom = (height as f64 * LOWER_THIRD.1) as u32;
    fill_rows(&mut img, bar_top, bar_bottom + 1, Rgb(recipe.accent));

    img
}

/// Vertical linear gradient, interpolated per scanline.
fn gradient(width: u32, height: u32, recipe: &StyleRecipe) -> RgbImage {
    let denom = height.saturating_sub(1).max(1) as f64;
    let mut img = RgbImage::new(width, height);

    for y in 0..height {
        let ratio = y as f64 / denom;
        let mut row = [0u8; 3];
        for (c, value) in row.iter_mut().enumerate() {
            let top = recipe.top[c] as f64;
            let bottom = recipe.bottom[c] as f64;
            *value = (top * (1.0 - ratio) + bottom * ratio) as u8;
        }
        for x in 0..width {
            img.put_pixel(x, y, Rgb(row));
        }
    }

    img
}

/// Fill whole rows `[from, to)`, clipped to the image.
fn fill_rows(img: &mut RgbImage, from: u32, to: u32, color: Rgb<u8>) {
    let to = to.min(img.height());
    for y in from..to {
        for x in 0..img.width() {
            img.put_pixel(x, y, color);
        }
    }
}

/// Rounded outline in the accent color with a translucent panel inside.
fn draw_content_panel(img: &mut RgbImage, panel: Rect, accent: Rgb<u8>) {
    let outer = panel;
    let inner = outer.inset(PANEL_OUTLINE_WIDTH);
    let inner_radius = (PANEL_RADIUS - PANEL_OUTLINE_WIDTH as f64).max(0.0);

    for_each_pixel_in(img, outer, |img, x, y| {
        if rounded_contains(outer, PANEL_RADIUS, x, y)
            && !rounded_contains(inner, inner_radius, x, y)
        {
            img.put_pixel(x, y, accent);
        }
    });

    let fill = outer.inset(PANEL_FILL_INSET);
    for_each_pixel_in(img, fill, |img, x, y| {
        if rounded_contains(fill, PANEL_FILL_RADIUS, x, y) {
            let blended = blend(*img.get_pixel(x, y), PANEL_FILL, PANEL_FILL_ALPHA);
            img.put_pixel(x, y, blended);
        }
    });
}

/// Visit every pixel of `rect` that lies inside the image.
fn for_each_pixel_in(img: &mut RgbImage, rect: Rect, mut f: impl FnMut(&mut RgbImage, u32, u32)) {
    let right = rect.right().min(img.width());
    let bottom = rect.bottom().min(img.height());
    for y in rect.y..bottom {
        for x in rect.x..right {
            f(img, x, y);
        }
    }
}

/// Whether the center of pixel (x, y) lies inside a rounded rectangle.
fn rounded_contains(rect: Rect, radius: f64, x: u32, y: u32) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }

    let px = x as f64 + 0.5;
    let py = y as f64 + 0.5;
    let (x0, y0) = (rect.x as f64, rect.y as f64);
    let (x1, y1) = (rect.right() as f64, rect.bottom() as f64);

    if px < x0 || px > x1 || py < y0 || py > y1 {
        return false;
    }

    let r = radius.min((x1 - x0) / 2.0).min((y1 - y0) / 2.0);
    let cx = px.clamp(x0 + r, x1 - r);
    let cy = py.clamp(y0 + r, y1 - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

/// Source-over blend of `src` at `alpha` onto `dst`.
fn blend(dst: Rgb<u8>, src: Rgb<u8>, alpha: u8) -> Rgb<u8> {
    let a = alpha as u32;
    let mut out = [0u8; 3];
    for c in 0..3 {
        let mixed = (src.0[c] as u32 * a + dst.0[c] as u32 * (255 - a) + 127) / 255;
        out[c] = mixed as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::get_preset;
    use tempfile::tempdir;

    #[test]
    fn custom_background_is_returned_unchanged() {
        let dir = tempdir().unwrap();
        let preset = get_preset("news_anchor").unwrap();
        let custom = Path::new("/does/not/need/to/exist.jpg");

        let path = render_background(preset, dir.path(), Some(custom)).unwrap();

        assert_eq!(path, custom);
        assert!(!background_cache_path(preset, dir.path()).exists());
    }

    #[test]
    fn generates_image_at_preset_resolution() {
        let dir = tempdir().unwrap();
        let preset = get_preset("teacher").unwrap();

        let path = render_background(preset, dir.path(), None).unwrap();

        assert_eq!(path, dir.path().join("teacher_bg.png"));
        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 1280);
        assert_eq!(img.height(), 720);
        assert!(!path.with_extension("png.tmp").exists());
    }

    #[test]
    fn cached_background_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let preset = get_preset("news_anchor").unwrap();

        let first = render_background(preset, dir.path(), None).unwrap();
        // Replace the cached file; a second call must hand it back untouched
        fs::write(&first, b"sentinel").unwrap();
        let second = render_background(preset, dir.path(), None).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"sentinel");
    }

    #[test]
    fn layout_bands_use_recipe_colors() {
        let preset = get_preset("podcast_closeup").unwrap();
        let recipe = preset.background_style.recipe();
        let img = draw_background(preset);

        assert_eq!(img.get_pixel(0, 0).0, recipe.top);
        // 720 * 0.70 sits inside the lower-third bar
        assert_eq!(img.get_pixel(10, 504).0, recipe.accent);
        // Bottom quarter is desk
        assert_eq!(img.get_pixel(10, 700).0, recipe.desk);
    }

    #[test]
    fn gradient_reaches_bottom_color_on_last_scanline() {
        let preset = get_preset("news_anchor").unwrap();
        let recipe = preset.background_style.recipe();
        let img = gradient(4, 100, &recipe);
        assert_eq!(img.get_pixel(0, 0).0, recipe.top);
        assert_eq!(img.get_pixel(3, 99).0, recipe.bottom);
    }

    #[test]
    fn content_panel_has_outline_and_translucent_fill() {
        let preset = get_preset("news_anchor").unwrap();
        let recipe = preset.background_style.recipe();
        let img = draw_background(preset);
        let panel = preset.content_box.unwrap();

        // Middle of the top edge is outline
        let top_edge = img.get_pixel(panel.x + panel.width / 2, panel.y + 1);
        assert_eq!(top_edge.0, recipe.accent);

        // Panel interior is lighter than the bare gradient beside it
        let cy = panel.y + panel.height / 2;
        let inside = img.get_pixel(panel.x + panel.width / 2, cy);
        let outside = img.get_pixel(panel.x - 10, cy);
        assert!(inside.0[0] > outside.0[0]);
        assert_ne!(inside.0, [255, 255, 255]);
    }

    #[test]
    fn rounded_corners_are_cut() {
        let rect = Rect::new(0, 0, 100, 100);
        assert!(!rounded_contains(rect, 16.0, 0, 0));
        assert!(rounded_contains(rect, 16.0, 50, 0));
        assert!(rounded_contains(rect, 16.0, 8, 8));
        assert!(!rounded_contains(Rect::new(0, 0, 0, 10), 4.0, 0, 0));
    }

    #[test]
    fn blend_is_weighted_by_alpha() {
        assert_eq!(blend(Rgb([0, 0, 0]), Rgb([255, 255, 255]), 0).0, [0, 0, 0]);
        assert_eq!(
            blend(Rgb([0, 0, 0]), Rgb([255, 255, 255]), 255).0,
            [255, 255, 255]
        );
        assert_eq!(blend(Rgb([0, 0, 0]), Rgb([255, 255, 255]), 30).0, [30, 30, 30]);
    }
}
