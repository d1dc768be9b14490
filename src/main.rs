use clap::{Parser, Subcommand};
use log::{debug, info};
use searchprep::batch::{self, BatchInput, BatchOptions};
use searchprep::config::{self, PrepConfig};
use searchprep::imaging::rust_backend::supported_input_extensions;
use searchprep::imaging::{ImageBlob, RustBackend, get_dimensions};
use searchprep::output;
use searchprep::region::{DisplayRect, Region, RegionEditor, Size};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "searchprep")]
#[command(about = "Prepare images for visual search")]
#[command(long_about = "\
Prepare images for visual search

Every image is brought into the same envelope before it is submitted:

  1. jpeg            non-JPEG input is re-encoded as JPEG
  2. min resolution  smaller than 200x200 → upscaled
  3. max resolution  larger than 1024x1024 → downscaled
  4. max size        larger than 1 MB → shrunk until it fits

Limits come from searchprep.toml in the working directory (or --config).
Run 'searchprep gen-config' to generate a documented config file.

Set RUST_LOG=debug to see every stage decision.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./searchprep.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize image files or directories of images
    Normalize {
        /// Image files or directories (searched recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where normalized images are written
        #[arg(long, short, default_value = "normalized")]
        out_dir: PathBuf,
        /// Also write a `<name>-thumb.jpg` thumbnail per image
        #[arg(long)]
        thumbnails: bool,
    },
    /// Show an image's format, size and what normalization would change
    Inspect {
        file: PathBuf,
    },
    /// Convert a region between original-image and displayed coordinates
    Region {
        /// Displayed image size, `WIDTHxHEIGHT`
        #[arg(long, value_parser = parse_size)]
        displayed: Size,
        /// Original image size, `WIDTHxHEIGHT`
        #[arg(long, value_parser = parse_size)]
        original: Size,
        /// Rectangle, `X,Y,WIDTH,HEIGHT` (original pixels unless --from-display)
        #[arg(long, value_parser = parse_rect)]
        rect: [f64; 4],
        /// Interpret --rect in displayed pixels
        #[arg(long)]
        from_display: bool,
        /// Print the original-pixel region as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock searchprep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize {
            inputs,
            out_dir,
            thumbnails,
        } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            let files = collect_inputs(&inputs);
            if files.is_empty() {
                return Err("no image files found".into());
            }
            let batch_inputs = files
                .iter()
                .map(|path| read_input(path))
                .collect::<Result<Vec<_>, std::io::Error>>()?;

            std::fs::create_dir_all(&out_dir)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_batch_event(&event);
                }
            });
            let results = batch::normalize_all(
                &RustBackend::new(),
                &batch_inputs,
                &config.constraints(),
                BatchOptions { thumbnails },
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "output thread panicked")?;

            let names = output_names(&files);
            let mut succeeded = 0;
            for (stem, result) in names.iter().zip(&results) {
                let Ok(item) = result else { continue };
                let target = out_dir.join(format!("{stem}.jpg"));
                std::fs::write(&target, item.normalized.blob.bytes())?;
                info!("wrote {}", target.display());
                if let Some(thumb) = &item.thumbnail {
                    let target = out_dir.join(format!("{stem}-thumb.jpg"));
                    std::fs::write(&target, thumb.bytes())?;
                    info!("wrote {}", target.display());
                }
                succeeded += 1;
            }

            println!();
            println!("{}", output::format_batch_summary(succeeded, files.len()));
            if succeeded < files.len() {
                let failed = files.len() - succeeded;
                return Err(format!("{failed} of {} images failed", files.len()).into());
            }
        }
        Command::Inspect { file } => {
            let config = load_config(cli.config.as_deref())?;
            let blob = ImageBlob::sniffed(std::fs::read(&file)?);
            let dimensions = get_dimensions(&RustBackend::new(), &blob)?;
            output::print_inspect(
                &file.display().to_string(),
                blob.mime(),
                dimensions,
                blob.byte_size(),
                &config.constraints(),
            );
        }
        Command::Region {
            displayed,
            original,
            rect: [x, y, width, height],
            from_display,
            json,
        } => {
            let mut editor = RegionEditor::new(displayed, original, Region::default());
            if from_display {
                let rect = DisplayRect::new(x, y, width, height);
                editor.set_region(editor.transform().to_original(&rect));
            } else {
                editor.set_region(Region::new(x, y, width, height));
            }

            if json {
                println!("{}", serde_json::to_string(&editor.region())?);
            } else {
                output::print_region(&editor.region(), &editor.display_rect());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `--config` if given, otherwise `./searchprep.toml` when it exists.
fn load_config(path: Option<&Path>) -> Result<PrepConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config(path, true),
        None => config::load_config(Path::new(config::CONFIG_FILENAME), false),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    debug!("using {threads} worker threads");
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Expand directories into the image files beneath them, sorted by path.
/// Files named explicitly are kept whatever their extension.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(input)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && has_image_extension(e.path()))
            .map(|e| e.into_path())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| supported_input_extensions().contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_input(path: &Path) -> Result<BatchInput, std::io::Error> {
    let bytes = std::fs::read(path)?;
    Ok(BatchInput {
        name: path.display().to_string(),
        blob: ImageBlob::sniffed(bytes),
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// One output stem per input, in input order. Inputs sharing a stem get a
/// `-1`, `-2`, ... suffix so no output (or its `-thumb` companion) is
/// overwritten. Names are compared case-insensitively.
fn output_names(files: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|path| {
            let stem = file_stem(path);
            let mut name = stem.clone();
            let mut n = 0;
            while taken.contains(&name.to_lowercase())
                || taken.contains(&format!("{name}-thumb").to_lowercase())
            {
                n += 1;
                name = format!("{stem}-{n}");
            }
            taken.insert(name.to_lowercase());
            taken.insert(format!("{name}-thumb").to_lowercase());
            name
        })
        .collect()
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid size `{s}`: {e}"))
    };
    Ok(Size::new(parse(w)?, parse(h)?))
}

fn parse_rect(s: &str) -> Result<[f64; 4], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid rectangle `{s}`: {e}"))?;
    values
        .try_into()
        .map_err(|_| format!("expected X,Y,WIDTH,HEIGHT, got `{s}`"))
}
