//! Form state: every user input of one session.
//!
//! The form is grouped by logical section. Each section is replaced as a
//! whole through [`FormUpdate`], so there is exactly one typed entry point per
//! field group instead of a stringly-keyed change handler.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::catalog::{LOCATIONS, TEMPLATES, VIDEO_STYLES};
use crate::model::media::EncodedImage;

pub const DEFAULT_CTA: &str = "Beli Sekarang!";

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| {
                        let labels: Vec<&str> = $name::ALL.iter().map(|v| v.label()).collect();
                        format!("expected one of: {}", labels.join(", "))
                    })
            }
        }
    };
}

labelled_enum!(Gender {
    Male => "Pria",
    Female => "Wanita",
    Unspecified => "Tidak disebutkan",
});

labelled_enum!(Ethnicity {
    Asian => "Asia",
    American => "Amerika",
});

labelled_enum!(AspectRatio {
    Landscape => "16:9",
    Portrait => "9:16",
});

labelled_enum!(Resolution {
    Sd => "720p",
    Hd => "1080p",
});

labelled_enum!(
    /// Which character sub-record is authoritative.
    CharacterMode {
        Describe => "describe",
        Upload => "upload",
    }
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub image: Option<EncodedImage>,
    pub remove_background: bool,
    pub name: String,
    pub description: String,
    pub target_audience: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribedCharacter {
    pub gender: Gender,
    pub ethnicity: Ethnicity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterInput {
    pub mode: CharacterMode,
    pub described: DescribedCharacter,
    pub uploaded: Option<EncodedImage>,
}

/// The character strategy a prompt should use, after fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSource<'a> {
    Uploaded(&'a EncodedImage),
    Described(&'a DescribedCharacter),
    AudienceInferred,
}

impl CharacterInput {
    /// Resolve the active character source. A blank description or a missing
    /// upload falls back to a subject inferred from the target audience.
    pub fn source(&self) -> CharacterSource<'_> {
        match self.mode {
            CharacterMode::Describe if !self.described.description.trim().is_empty() => {
                CharacterSource::Described(&self.described)
            }
            CharacterMode::Upload => match &self.uploaded {
                Some(image) => CharacterSource::Uploaded(image),
                None => CharacterSource::AudienceInferred,
            },
            _ => CharacterSource::AudienceInferred,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSettings {
    pub location: String,
    pub template: String,
    pub video_style: String,
    pub cta: String,
}

impl SceneSettings {
    /// Text before the first whitespace of the template label. Empty when the
    /// label starts with whitespace.
    pub fn visual_style(&self) -> &str {
        self.template.split(char::is_whitespace).next().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub sound_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub product: ProductInput,
    pub character: CharacterInput,
    pub scene: SceneSettings,
    pub output: OutputSettings,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            product: ProductInput {
                image: None,
                remove_background: true,
                name: String::new(),
                description: String::new(),
                target_audience: String::new(),
            },
            character: CharacterInput {
                mode: CharacterMode::Describe,
                described: DescribedCharacter {
                    gender: Gender::Unspecified,
                    ethnicity: Ethnicity::Asian,
                    description: String::new(),
                },
                uploaded: None,
            },
            scene: SceneSettings {
                location: LOCATIONS[0].to_string(),
                template: TEMPLATES[0].to_string(),
                video_style: VIDEO_STYLES[0].to_string(),
                cta: DEFAULT_CTA.to_string(),
            },
            output: OutputSettings {
                aspect_ratio: AspectRatio::Portrait,
                resolution: Resolution::Hd,
                sound_enabled: true,
            },
        }
    }
}

/// One typed change to a field group of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormUpdate {
    ProductDetails {
        name: String,
        description: String,
        target_audience: String,
    },
    RemoveBackground {
        enabled: bool,
    },
    CharacterMode {
        mode: CharacterMode,
    },
    DescribedCharacter(DescribedCharacter),
    ClearCharacterImage,
    Scene(SceneSettings),
    Output(OutputSettings),
}

impl FormState {
    pub fn apply(&mut self, update: FormUpdate) {
        match update {
            FormUpdate::ProductDetails {
                name,
                description,
                target_audience,
            } => {
                self.product.name = name;
                self.product.description = description;
                self.product.target_audience = target_audience;
            }
            FormUpdate::RemoveBackground { enabled } => self.product.remove_background = enabled,
            FormUpdate::CharacterMode { mode } => self.character.mode = mode,
            FormUpdate::DescribedCharacter(described) => self.character.described = described,
            FormUpdate::ClearCharacterImage => self.character.uploaded = None,
            FormUpdate::Scene(scene) => self.scene = scene,
            FormUpdate::Output(output) => self.output = output,
        }
    }
}
