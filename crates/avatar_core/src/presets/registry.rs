//! Static catalog of scene presets.

use serde::Serialize;

use super::style::BackgroundStyle;
use crate::models::{Point, Rect, Size};

/// A named scene layout.
///
/// Presets are created once in a static catalog and never mutated.
/// `avatar_pos + avatar_box` is expected to fit inside `resolution`;
/// [`Preset::avatar_fits`] reports whether it does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    /// Stable identifier.
    pub key: &'static str,
    /// Display name.
    pub label: &'static str,
    /// Output frame size.
    pub resolution: Size,
    pub fps: u32,
    /// Size the avatar clip is scaled to.
    pub avatar_box: Size,
    /// Top-left offset of the avatar overlay.
    pub avatar_pos: Point,
    /// Region reserved for subtitle text. `None` disables subtitles.
    pub content_box: Option<Rect>,
    pub background_style: BackgroundStyle,
    /// Normalized (0-1) vertical focus hint for avatar cropping.
    pub crop_focus_y: Option<f32>,
}

impl Preset {
    /// Whether the avatar overlay lies inside the frame.
    pub fn avatar_fits(&self) -> bool {
        self.resolution.contains(self.avatar_pos, self.avatar_box)
    }

    /// Whether this preset reserves room for subtitles.
    pub fn has_subtitles(&self) -> bool {
        self.content_box.is_some()
    }
}

const HD: Size = Size::new(1280, 720);

static PRESETS: [Preset; 6] = [
    Preset {
        key: "news_anchor",
        label: "News Anchor",
        resolution: HD,
        fps: 24,
        avatar_box: Size::new(480, 600),
        avatar_pos: Point::new(70, 80),
        content_box: Some(Rect::new(640, 130, 560, 330)),
        background_style: BackgroundStyle::News,
        crop_focus_y: Some(0.55),
    },
    Preset {
        key: "corporate_presenter",
        label: "Corporate Presenter",
        resolution: HD,
        fps: 24,
        avatar_box: Size::new(440, 580),
        avatar_pos: Point::new(70, 90),
        content_box: Some(Rect::new(560, 140, 640, 320)),
        background_style: BackgroundStyle::Corporate,
        crop_focus_y: Some(0.52),
    },
    Preset {
        key: "teacher",
        label: "Teacher",
        resolution: HD,
        fps: 24,
        avatar_box: Size::new(420, 560),
        avatar_pos: Point::new(70, 100),
        content_box: Some(Rect::new(590, 110, 620, 380)),
        background_style: BackgroundStyle::Teacher,
        crop_focus_y: Some(0.5),
    },
    Preset {
        key: "coach",
        label: "Coach",
        resolution: HD,
        fps: 24,
        avatar_box: Size::new(480, 600),
        avatar_pos: Point::new(70, 80),
        content_box: Some(Rect::new(620, 140, 560, 300)),
        background_style: BackgroundStyle::Default,
        crop_focus_y: Some(0.58),
    },
    Preset {
        key: "podcast_closeup",
        label: "Podcast Close-up",
        resolution: HD,
        fps: 24,
        avatar_box: Size::new(640, 640),
        avatar_pos: Point::new(320, 40),
        content_box: None,
        background_style: BackgroundStyle::Podcast,
        crop_focus_y: Some(0.42),
    },
    Preset {
        key: "ceo_keynote",
        label: "CEO Keynote",
        resolution: HD,
        fps: 24,
        avatar_box: Size::new(420, 560),
        avatar_pos: Point::new(760, 100),
        content_box: Some(Rect::new(80, 120, 600, 360)),
        background_style: BackgroundStyle::Keynote,
        crop_focus_y: Some(0.55),
    },
];

/// Values that explicitly request raw output (no composition).
const RAW_SENTINELS: [&str; 3] = ["none", "off", "raw"];

/// All presets in catalog order.
pub fn list_presets() -> &'static [Preset] {
    &PRESETS
}

/// Look up a preset by exact key.
pub fn get_preset(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.key == key)
}

/// Resolve a label or key to a preset key.
///
/// The input is trimmed, lowercased and spaces become underscores before
/// matching a key; otherwise a case-insensitive label match is tried.
pub fn resolve_preset_key(label_or_key: &str) -> Option<&'static str> {
    let trimmed = label_or_key.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    let normalized = lowered.replace(' ', "_");
    if let Some(preset) = get_preset(&normalized) {
        return Some(preset.key);
    }

    PRESETS
        .iter()
        .find(|p| p.label.to_lowercase() == lowered)
        .map(|p| p.key)
}

/// Whether a value is a raw-output sentinel (`none`, `off`, `raw`, any case).
pub fn is_raw_sentinel(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    RAW_SENTINELS.contains(&lowered.as_str())
}

/// Pick the preset key a run should use.
///
/// A non-empty override wins unless it is a raw sentinel, in which case the
/// run has no preset regardless of the default. Without an override the
/// configured default is used, subject to the same sentinel check.
pub fn effective_preset_key<'a>(
    override_key: Option<&'a str>,
    default_key: Option<&'a str>,
) -> Option<&'a str> {
    let pick = |value: Option<&'a str>| value.map(str::trim).filter(|v| !v.is_empty());

    let chosen = match pick(override_key) {
        Some(explicit) => explicit,
        None => pick(default_key)?,
    };

    if is_raw_sentinel(chosen) {
        None
    } else {
        Some(chosen)
    }
}

/// Resolve the preset a run should composite with.
///
/// Unknown names resolve to `None` (raw passthrough) with a warning.
pub fn resolve_effective_preset(
    override_key: Option<&str>,
    default_key: Option<&str>,
) -> Option<&'static Preset> {
    let requested = effective_preset_key(override_key, default_key)?;
    match resolve_preset_key(requested).and_then(get_preset) {
        Some(preset) => Some(preset),
        None => {
            tracing::warn!("Unknown preset '{}', producing raw output", requested);
            None
        }
    }
}
