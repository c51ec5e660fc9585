//! User-facing progress labels and error messages.

pub const PROGRESS_ANALYZING: &str = "Menganalisis produk...";
pub const PROGRESS_REMOVING_BACKGROUND: &str = "Menghapus background...";
pub const PROGRESS_DESCRIBING: &str = "Membuat deskripsi produk...";
pub const PROGRESS_CHARACTER: &str = "Memproses gambar karakter...";
pub const PROGRESS_IMAGES: &str = "Membuat variasi gambar...";
pub const PROGRESS_VIDEO: &str = "Membuat video...";

pub const ERR_PRODUCT_IMAGE: &str = "Gagal memproses gambar produk. Coba lagi.";
pub const ERR_CHARACTER_IMAGE: &str = "Gagal memproses gambar karakter. Coba lagi.";
pub const ERR_NEED_PRODUCT_IMAGE: &str = "Silakan unggah gambar produk terlebih dahulu.";
pub const ERR_IMAGES: &str = "Gagal membuat gambar. Coba lagi dengan prompt yang berbeda.";
pub const ERR_NEED_SELECTION: &str = "Pilih salah satu gambar untuk dijadikan video.";
pub const ERR_UNKNOWN_IMAGE: &str = "Gambar yang dipilih tidak ditemukan.";
pub const ERR_VIDEO: &str = "Gagal membuat video. Coba lagi nanti.";
