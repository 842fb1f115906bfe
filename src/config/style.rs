use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;

/// Visual style applied to every prompt before it is sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    Default,
    Photorealistic,
    Artistic,
    Cartoon,
    Sketch,
    DigitalArt,
    Minimalist,
}

impl StylePreset {
    pub const ALL: [StylePreset; 7] = [
        StylePreset::Default,
        StylePreset::Photorealistic,
        StylePreset::Artistic,
        StylePreset::Cartoon,
        StylePreset::Sketch,
        StylePreset::DigitalArt,
        StylePreset::Minimalist,
    ];

    /// Fixed descriptive prefix prepended to the prompt. `None` for Default.
    pub fn prompt_prefix(&self) -> Option<&'static str> {
        match self {
            StylePreset::Default => None,
            StylePreset::Photorealistic =>
                Some(
                    "A photorealistic, high-resolution image with detailed lighting and textures. Shot with professional camera equipment."
                ),
            StylePreset::Artistic =>
                Some("An artistic interpretation with creative composition and enhanced colors."),
            StylePreset::Cartoon =>
                Some("A cartoon-style illustration with bold colors and simplified forms."),
            StylePreset::Sketch =>
                Some("A detailed pencil sketch with fine line work and shading."),
            StylePreset::DigitalArt =>
                Some("A modern digital artwork with vibrant colors and contemporary style."),
            StylePreset::Minimalist =>
                Some("A clean, minimalist design with simple shapes and limited color palette."),
        }
    }

    /// Display label, also recorded in image metadata sidecars.
    pub fn label(&self) -> &'static str {
        match self {
            StylePreset::Default => "Default",
            StylePreset::Photorealistic => "Photorealistic",
            StylePreset::Artistic => "Artistic",
            StylePreset::Cartoon => "Cartoon",
            StylePreset::Sketch => "Sketch",
            StylePreset::DigitalArt => "Digital Art",
            StylePreset::Minimalist => "Minimalist",
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseStyleError {
    message: String,
}

impl fmt::Display for ParseStyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseStyleError {}

impl FromStr for StylePreset {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(StylePreset::Default),
            "photorealistic" => Ok(StylePreset::Photorealistic),
            "artistic" => Ok(StylePreset::Artistic),
            "cartoon" => Ok(StylePreset::Cartoon),
            "sketch" => Ok(StylePreset::Sketch),
            "digital-art" | "digital art" | "digitalart" => Ok(StylePreset::DigitalArt),
            "minimalist" => Ok(StylePreset::Minimalist),
            _ =>
                Err(ParseStyleError {
                    message: format!(
                        "Invalid style preset: '{}' (expected one of default, photorealistic, artistic, cartoon, sketch, digital-art, minimalist)",
                        s
                    ),
                }),
        }
    }
}

/// Aspect ratio requested for generated images. Square is the model default
/// and adds nothing to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Widescreen,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Tall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Tall => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseRatioError {
    message: String,
}

impl fmt::Display for ParseRatioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseRatioError {}

impl FromStr for AspectRatio {
    type Err = ParseRatioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Widescreen),
            "4:3" => Ok(AspectRatio::Landscape),
            "3:4" => Ok(AspectRatio::Portrait),
            "9:16" => Ok(AspectRatio::Tall),
            _ =>
                Err(ParseRatioError {
                    message: format!(
                        "Invalid aspect ratio: '{}' (expected one of 1:1, 16:9, 4:3, 3:4, 9:16)",
                        s
                    ),
                }),
        }
    }
}

/// Enhance a raw prompt with the selected style prefix and aspect-ratio
/// suffix. Pure; Default style and 1:1 ratio leave the prompt untouched.
pub fn enhance_prompt(prompt: &str, style: StylePreset, ratio: AspectRatio) -> String {
    let mut enhanced = prompt.to_string();

    if let Some(prefix) = style.prompt_prefix() {
        enhanced = format!("{} {}", prefix, enhanced);
    }

    if ratio != AspectRatio::Square {
        enhanced = format!("{} The image should be in {} aspect ratio format.", enhanced, ratio);
    }

    enhanced
}
