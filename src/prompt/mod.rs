pub mod builder;

pub use builder::{
    build_analysis_prompt, build_background_removal_prompt, build_image_synthesis_prompt,
    build_video_synthesis_prompt,
};
