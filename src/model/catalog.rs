//! Fixed choice lists offered to the user.
use std::time::Duration;

pub const LOCATIONS: &[&str] = &[
    "Kafe modern di perkotaan",
    "Pantai tropis saat matahari terbenam",
    "Studio minimalis dengan pencahayaan alami",
    "Jalanan kota Tokyo yang ramai di malam hari",
    "Puncak gunung dengan pemandangan indah",
    "Perpustakaan klasik yang megah",
];

pub const TEMPLATES: &[&str] = &[
    "Fashion & Apparel",
    "Makanan & Minuman",
    "Teknologi & Gadget",
    "Kecantikan & Perawatan Kulit",
    "Travel & Petualangan",
    "Pendidikan & Kursus Online",
];

pub const VIDEO_STYLES: &[&str] = &[
    "Sinematik dengan musik orkestra",
    "Enerjik dengan musik hip-hop",
    "Elegan dengan musik jazz",
    "Ceria dengan musik pop upbeat",
    "Tenang dengan musik akustik",
    "Futuristik dengan musik elektronik",
];

pub const LOADING_MESSAGES: &[&str] = &[
    "Sedang meracik piksel menjadi mahakarya...",
    "AI sedang bermimpi tentang video Anda...",
    "Mengumpulkan foton untuk adegan terbaik...",
    "Mohon tunggu, sedang menyelaraskan warna...",
    "Video Anda hampir siap, sedikit lagi polesan ajaib!",
];

pub const LOADING_MESSAGE_PERIOD: Duration = Duration::from_secs(5);

/// Loading message shown after `elapsed` time spent waiting on a video.
pub fn loading_message(elapsed: Duration) -> &'static str {
    let slot = (elapsed.as_millis() / LOADING_MESSAGE_PERIOD.as_millis()) as usize;
    LOADING_MESSAGES[slot % LOADING_MESSAGES.len()]
}

/// Resolve a CLI-style choice: a 1-based index into `options`, or free text.
pub fn pick(options: &[&str], choice: &str) -> String {
    match choice.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= options.len() => options[n - 1].to_string(),
        _ => choice.to_string(),
    }
}
