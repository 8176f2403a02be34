//! Background style recipes.
//!
//! A closed set of styles, each mapped to a color recipe. `Default` is the
//! fallback for any style tag that has no dedicated recipe.

use serde::{Deserialize, Serialize};

/// RGB color.
pub type Rgb = [u8; 3];

/// Colors used to paint a preset background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRecipe {
    /// Gradient color at the top scanline.
    pub top: Rgb,
    /// Gradient color at the bottom scanline.
    pub bottom: Rgb,
    /// Content panel outline and lower-third bar.
    pub accent: Rgb,
    /// Solid desk band across the bottom quarter.
    pub desk: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundStyle {
    News,
    Corporate,
    Teacher,
    Podcast,
    Keynote,
    #[default]
    Default,
}

impl BackgroundStyle {
    /// Map a style tag to a style; unknown tags use `Default`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "news" => Self::News,
            "corporate" => Self::Corporate,
            "teacher" => Self::Teacher,
            "podcast" => Self::Podcast,
            "keynote" => Self::Keynote,
            _ => Self::Default,
        }
    }

    pub fn recipe(&self) -> StyleRecipe {
        match self {
            Self::News => StyleRecipe {
                top: [8, 22, 45],
                bottom: [12, 30, 60],
                accent: [30, 120, 210],
                desk: [15, 25, 35],
            },
            Self::Corporate => StyleRecipe {
                top: [230, 235, 240],
                bottom: [200, 205, 215],
                accent: [40, 90, 180],
                desk: [210, 215, 225],
            },
            Self::Teacher => StyleRecipe {
                top: [246, 234, 210],
                bottom: [230, 215, 190],
                accent: [60, 120, 80],
                desk: [220, 205, 180],
            },
            Self::Podcast => StyleRecipe {
                top: [18, 16, 24],
                bottom: [8, 8, 12],
                accent: [220, 150, 60],
                desk: [18, 20, 26],
            },
            Self::Keynote => StyleRecipe {
                top: [12, 12, 18],
                bottom: [4, 4, 8],
                accent: [70, 140, 255],
                desk: [10, 10, 14],
            },
            Self::Default => StyleRecipe {
                top: [20, 24, 33],
                bottom: [10, 12, 18],
                accent: [200, 140, 40],
                desk: [18, 20, 26],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_falls_back_to_default() {
        assert_eq!(BackgroundStyle::from_tag("coach"), BackgroundStyle::Default);
        assert_eq!(BackgroundStyle::from_tag("News"), BackgroundStyle::News);
    }

    #[test]
    fn every_style_has_a_distinct_recipe() {
        let styles = [
            BackgroundStyle::News,
            BackgroundStyle::Corporate,
            BackgroundStyle::Teacher,
            BackgroundStyle::Podcast,
            BackgroundStyle::Keynote,
            BackgroundStyle::Default,
        ];
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a.recipe(), b.recipe(), "{:?} == {:?}", a, b);
            }
        }
    }
}
