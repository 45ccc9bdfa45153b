use clap::Parser;
use photo_matte::naming::CollisionPolicy;
use photo_matte::pipeline::{Engine, PhotoRequest};
use photo_matte::types::{Coordinate, RatioRequest};
use photo_matte::{config, output};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the decoder stack handles; directory inputs are filtered to
/// these.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

#[derive(Parser)]
#[command(name = "photo-matte")]
#[command(version)]
#[command(about = "Compose photos with a metadata banner, color palette, and print-ready border")]
#[command(long_about = "\
Compose photos with a metadata banner, color palette, and print-ready border

For each input photo, photo-matte reads the embedded camera metadata,
renders a two-line banner (camera, lens, exposure, timestamp — localized to
the photo's timezone when a location is known), extracts a dominant-color
palette strip, stacks banner + photo + palette on a white matte, and pads
the result to a standard print aspect ratio.

Location can come from --latitude/--longitude or a free-text --address
(resolved through Nominatim). Photos that already carry a GPS block keep it.

The target ratio is 'Default' (the photo's own reduced ratio) or an explicit
pair like 2:3. Supported print ratios: 5:4 3:2 4:3 16:9 10:8 14:11 for
landscape, 4:5 2:3 3:4 9:16 8:10 11:14 for portrait.")]
struct Cli {
    /// Image files or directories to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Destination directory for composed images
    #[arg(long, short, default_value = "matted")]
    output_dir: PathBuf,

    /// Latitude of the shooting location (requires --longitude)
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Longitude of the shooting location (requires --latitude)
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Free-text address, geocoded when no coordinate pair is given
    #[arg(long)]
    address: Option<String>,

    /// Photo title for the banner's first line
    #[arg(long)]
    title: Option<String>,

    /// Target print ratio: "Default" or an explicit pair like 2:3
    #[arg(long, default_value = "Default")]
    ratio: String,

    /// Apply a uniform border instead of solving for a print ratio
    #[arg(long)]
    plain: bool,

    /// What to do when an output file already exists
    #[arg(long, value_enum)]
    on_collision: Option<CollisionPolicy>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads for batch processing (0 = all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Write a JSON batch report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(policy) = cli.on_collision {
        config.on_collision = policy;
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    init_thread_pool(&config);

    let ratio = RatioRequest::parse(&cli.ratio)?;
    let coordinate = match (cli.latitude, cli.longitude) {
        (Some(latitude), Some(longitude)) => Some(
            Coordinate::new(latitude, longitude)
                .ok_or("latitude must be in [-90, 90] and longitude in [-180, 180]")?,
        ),
        (None, None) => None,
        _ => return Err("latitude and longitude must be provided together".into()),
    };

    let inputs = collect_inputs(&cli.inputs);
    if inputs.is_empty() {
        return Err("no image files found in the given inputs".into());
    }
    std::fs::create_dir_all(&cli.output_dir)?;

    let engine = Engine::new(config)?;
    let requests: Vec<PhotoRequest> = inputs
        .into_iter()
        .map(|source| PhotoRequest {
            source,
            coordinate,
            address: cli.address.clone(),
            title: cli.title.clone(),
            ratio,
            for_print: !cli.plain,
        })
        .collect();

    let outcome = engine.process_batch(&requests, &cli.output_dir);
    output::print_batch_output(&outcome);

    if let Some(report_path) = &cli.report {
        let report = output::batch_report(&outcome);
        std::fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
    }

    if outcome.written.is_empty() && !outcome.failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize the rayon thread pool from the processing config.
///
/// Caps at the number of available CPU cores — users can constrain down,
/// not up.
fn init_thread_pool(config: &config::MatteConfig) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config::effective_threads(config))
        .build_global()
        .ok();
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Expand files and directories into a flat, ordered list of image files.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| is_image_file(path))
                .collect();
            files.append(&mut found);
        } else {
            files.push(input.clone());
        }
    }
    files
}
