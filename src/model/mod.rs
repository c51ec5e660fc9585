pub mod catalog;
pub mod form;
pub mod media;

pub use form::{
    AspectRatio, CharacterInput, CharacterMode, CharacterSource, DescribedCharacter, Ethnicity,
    FormState, FormUpdate, Gender, OutputSettings, ProductInput, Resolution, SceneSettings,
};
pub use media::{EncodedImage, GeneratedImage, ProductInfo, VideoArtifact, VideoOperation};
