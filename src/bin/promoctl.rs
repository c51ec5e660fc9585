use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use promo_studio::config::SynthesisStrategy;
use promo_studio::encoder::ImageSource;
use promo_studio::model::catalog::{self, LOCATIONS, TEMPLATES, VIDEO_STYLES};
use promo_studio::model::{
    AspectRatio, CharacterMode, DescribedCharacter, Ethnicity, FormUpdate, Gender, OutputSettings,
    Resolution, SceneSettings,
};
use promo_studio::{Config, GeminiGenerator, WorkflowController};

#[derive(Parser, Debug)]
#[command(name = "promoctl", about = "Turn a product photo into a promo video", version)]
struct Cli {
    /// Override GEMINI_BASE_URL
    #[arg(global = true, long)]
    base_url: Option<String>,

    /// Override PROMPT_STRATEGY (inline | text)
    #[arg(global = true, long)]
    strategy: Option<SynthesisStrategy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List locations, templates and video styles
    Catalog,
    /// Analyze a product photo and print the suggested details
    Analyze {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Generate scene images and save them
    Images {
        #[command(flatten)]
        product: ProductArgs,
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Run the whole pipeline and save the video
    Video {
        #[command(flatten)]
        product: ProductArgs,
        #[command(flatten)]
        scene: SceneArgs,
        /// Which generated image seeds the video (1-based)
        #[arg(long, default_value_t = 1)]
        select: usize,
    },
}

#[derive(Args, Debug)]
struct ProductArgs {
    /// Product photo
    #[arg(long, value_name = "PATH")]
    product: PathBuf,
    /// Keep the original background
    #[arg(long)]
    keep_background: bool,
    /// Override the analysed product name
    #[arg(long)]
    name: Option<String>,
    /// Override the analysed product description
    #[arg(long)]
    description: Option<String>,
    /// Override the analysed target audience
    #[arg(long)]
    audience: Option<String>,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Character reference photo (switches to upload mode)
    #[arg(long, value_name = "PATH", conflicts_with = "character_description")]
    character_image: Option<PathBuf>,
    /// Free-text character description
    #[arg(long, value_name = "TEXT")]
    character_description: Option<String>,
    /// Pria | Wanita | "Tidak disebutkan"
    #[arg(long, default_value = "Tidak disebutkan")]
    gender: Gender,
    /// Asia | Amerika
    #[arg(long, default_value = "Asia")]
    ethnicity: Ethnicity,
    /// Location: catalog index (1-based) or free text
    #[arg(long, default_value = "1")]
    location: String,
    /// Template: catalog index (1-based) or free text
    #[arg(long, default_value = "1")]
    template: String,
    /// Video style: catalog index (1-based) or free text
    #[arg(long, default_value = "1")]
    style: String,
    /// Call to action; empty to omit
    #[arg(long, default_value = "Beli Sekarang!")]
    cta: String,
    /// 16:9 | 9:16
    #[arg(long, default_value = "9:16")]
    aspect_ratio: AspectRatio,
    /// 720p | 1080p
    #[arg(long, default_value = "1080p")]
    resolution: Resolution,
    /// Disable background music
    #[arg(long)]
    no_sound: bool,
    /// Output directory (defaults to OUTPUT_DIR)
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    if let Commands::Catalog = cli.command {
        print_catalog();
        return Ok(());
    }

    let mut conf = Config::new()?;
    if let Some(url) = cli.base_url {
        conf.base_url = url;
    }
    if let Some(strategy) = cli.strategy {
        conf.strategy = strategy;
    }

    let mut controller = WorkflowController::new(Arc::new(GeminiGenerator::from_config(&conf)));
    spawn_progress_printer(&controller);

    match cli.command {
        Commands::Catalog => print_catalog(),
        Commands::Analyze { product } => {
            analyze(&mut controller, &product).await?;
            let form = controller.form();
            println!("Nama Produk    : {}", form.product.name);
            println!("Deskripsi      : {}", form.product.description);
            println!("Target Audience: {}", form.product.target_audience);
        }
        Commands::Images { product, scene } => {
            analyze(&mut controller, &product).await?;
            let out = out_dir(&conf, &scene);
            prepare_scene(&mut controller, &scene).await?;
            controller.on_generate_images().await?;
            save_images(&controller, &out).await?;
        }
        Commands::Video { product, scene, select } => {
            analyze(&mut controller, &product).await?;
            let out = out_dir(&conf, &scene);
            prepare_scene(&mut controller, &scene).await?;
            controller.on_generate_images().await?;
            save_images(&controller, &out).await?;

            let id = controller
                .images()
                .get(select.saturating_sub(1))
                .map(|img| img.id.clone())
                .ok_or_else(|| format!("--select {} is out of range ({} images)", select, controller.images().len()))?;
            controller.on_select_image(&id)?;
            controller.on_generate_video().await?;

            if let Some(video) = controller.video() {
                let path = out.join("promo.mp4");
                tokio::fs::write(&path, &video.bytes).await?;
                println!("Saved {} ({} bytes)", path.display(), video.bytes.len());
            }
        }
    }
    Ok(())
}

fn print_catalog() {
    let sections = [("Locations", LOCATIONS), ("Templates", TEMPLATES), ("Video styles", VIDEO_STYLES)];
    for (title, options) in sections {
        println!("{}:", title);
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
    }
}

fn spawn_progress_printer(controller: &WorkflowController) {
    let mut rx = controller.subscribe_progress();
    tokio::spawn(async move {
        let mut last = rx.borrow().clone();
        while rx.changed().await.is_ok() {
            let current = rx.borrow().clone();
            if current.label != last.label {
                if let Some(label) = &current.label {
                    eprintln!("... {}", label);
                }
            }
            if current.message != last.message {
                if let Some(message) = current.message {
                    eprintln!("    {}", message);
                }
            }
            last = current;
        }
    });
}

async fn analyze(
    controller: &mut WorkflowController,
    args: &ProductArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    controller.apply_update(FormUpdate::RemoveBackground {
        enabled: !args.keep_background,
    });
    controller
        .on_product_image_chosen(ImageSource::File(args.product.clone()))
        .await?;

    if args.name.is_some() || args.description.is_some() || args.audience.is_some() {
        let product = &controller.form().product;
        let update = FormUpdate::ProductDetails {
            name: args.name.clone().unwrap_or_else(|| product.name.clone()),
            description: args.description.clone().unwrap_or_else(|| product.description.clone()),
            target_audience: args.audience.clone().unwrap_or_else(|| product.target_audience.clone()),
        };
        controller.apply_update(update);
    }
    Ok(())
}

async fn prepare_scene(
    controller: &mut WorkflowController,
    args: &SceneArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &args.character_image {
        controller.apply_update(FormUpdate::CharacterMode {
            mode: CharacterMode::Upload,
        });
        controller
            .on_character_image_chosen(ImageSource::File(path.clone()))
            .await?;
    }
    controller.apply_update(FormUpdate::DescribedCharacter(DescribedCharacter {
        gender: args.gender,
        ethnicity: args.ethnicity,
        description: args.character_description.clone().unwrap_or_default(),
    }));
    controller.apply_update(FormUpdate::Scene(SceneSettings {
        location: catalog::pick(LOCATIONS, &args.location),
        template: catalog::pick(TEMPLATES, &args.template),
        video_style: catalog::pick(VIDEO_STYLES, &args.style),
        cta: args.cta.clone(),
    }));
    controller.apply_update(FormUpdate::Output(OutputSettings {
        aspect_ratio: args.aspect_ratio,
        resolution: args.resolution,
        sound_enabled: !args.no_sound,
    }));
    Ok(())
}

fn out_dir(conf: &Config, args: &SceneArgs) -> PathBuf {
    args.out.clone().unwrap_or_else(|| PathBuf::from(&conf.output_dir))
}

async fn save_images(controller: &WorkflowController, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(dir).await?;
    for (i, img) in controller.images().iter().enumerate() {
        let ext = match img.image.mime_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        };
        let path = dir.join(format!("scene-{}.{}", i + 1, ext));
        let bytes = img.image.decode()?;
        tokio::fs::write(&path, &bytes).await?;
        println!("Saved {} ({} bytes) [{}]", path.display(), bytes.len(), img.id);
    }
    Ok(())
}
