//! Natural-language instructions for each remote capability.
//!
//! All builders are pure and total over a form: they never fail, they only
//! choose clauses. Prompts are written in Indonesian, the output language of
//! the whole product.
use crate::model::{CharacterSource, EncodedImage, FormState};

const ANALYSIS_PROMPT: &str = "Analisis gambar produk ini. Berikan nama produk yang menarik, \
deskripsi singkat (2-3 kalimat), dan target audience yang paling sesuai dalam format JSON. \
Gunakan Bahasa Indonesia.";

const BACKGROUND_REMOVAL_PROMPT: &str =
    "remove the background from this image, make the background transparent.";

/// Instruction for the product analysis request.
pub fn build_analysis_prompt() -> &'static str {
    ANALYSIS_PROMPT
}

/// Instruction for the background removal request.
pub fn build_background_removal_prompt() -> &'static str {
    BACKGROUND_REMOVAL_PROMPT
}

/// Scene image prompt.
///
/// `reference` is the product image sent alongside the prompt, if any; it
/// adds a clause pinning the product's appearance to that image.
pub fn build_image_synthesis_prompt(form: &FormState, reference: Option<&EncodedImage>) -> String {
    let product = &form.product;
    let scene = &form.scene;

    let mut prompt = String::from("Buat gambar fotorealistik berkualitas tinggi untuk iklan video.");
    prompt.push_str(&format!(
        " Produk utama adalah \"{}\". Deskripsi: \"{}\".",
        product.name, product.description
    ));
    if reference.is_some() {
        prompt.push_str(
            " Gunakan produk pada gambar referensi pertama dan pertahankan bentuk, warna, serta labelnya.",
        );
    }

    prompt.push_str(&character_clause(form));

    prompt.push_str(&format!(" Lokasi diatur di {}.", scene.location));
    prompt.push_str(&format!(
        " Gaya visualnya adalah {}, dengan nuansa yang sesuai dengan gaya video \"{}\".",
        scene.visual_style(),
        scene.video_style
    ));
    prompt.push_str(" Pencahayaan harus profesional dan menonjolkan produk.");
    prompt.push_str(&format!(" Aspek rasio gambar adalah {}.", form.output.aspect_ratio));
    prompt
}

fn character_clause(form: &FormState) -> String {
    match form.character.source() {
        CharacterSource::Described(c) => format!(
            " Tampilkan seorang model {} etnis {} yang dideskripsikan sebagai: \"{}\". \
Model harus berinteraksi secara alami dengan produk.",
            c.gender, c.ethnicity, c.description
        ),
        CharacterSource::Uploaded(_) => {
            " Gunakan model atau karakter dari gambar yang diunggah sebagai referensi utama.".to_string()
        }
        CharacterSource::AudienceInferred => format!(
            " Tampilkan seseorang yang cocok dengan target audience produk: \"{}\".",
            form.product.target_audience
        ),
    }
}

/// Promo video prompt.
pub fn build_video_synthesis_prompt(form: &FormState) -> String {
    let scene = &form.scene;

    let mut prompt = String::from("Buat video promosi pendek yang menarik.");
    prompt.push_str(&format!(" Produk: \"{}\".", form.product.name));
    prompt.push_str(&format!(
        " Video ini harus memiliki gaya {} dan berlokasi di {}.",
        scene.video_style, scene.location
    ));
    prompt.push_str(" Tampilkan produk dan model dalam adegan yang dinamis.");
    if !scene.cta.trim().is_empty() {
        prompt.push_str(&format!(
            " Akhiri video dengan ajakan bertindak (call to action) yang jelas: \"{}\".",
            scene.cta
        ));
    }
    prompt.push_str(&format!(" Resolusi video adalah {}.", form.output.resolution));
    if form.output.sound_enabled {
        prompt.push_str(" Tambahkan musik latar yang sesuai dengan gaya video.");
    }
    prompt
}
