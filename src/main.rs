use clap::{Parser, Subcommand};
use orca_gal::catalog::CatalogStore;
use orca_gal::imaging::RustBackend;
use orca_gal::rebuild::{self, Rebuilder, Request};
use orca_gal::{config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orca-gal")]
#[command(about = "Catalog-driven photo gallery builder")]
#[command(long_about = "\
Catalog-driven photo gallery builder

Each gallery is a folder of photos under the photos root plus a record in
the catalog. Operations normalize filenames, optimize photos in place,
write thumbnails and render index.html from a template.

Project structure:

  project/
  ├── orca.toml                  # Optional config
  ├── galleries.json             # The catalog
  ├── templates/
  │   ├── default.html           # ${TITLE}, ${PHOTO_DATE}, ${GALLERY}
  │   └── default.css            # Copied to styles.css
  └── photos/
      └── my-trip/               # Created from title \"My Trip\"
          ├── foto_1.jpg
          ├── thumbs/
          ├── index.html
          └── styles.css

Run 'orca-gal init' to lay out a new project and 'orca-gal gen-config' to
generate a documented orca.toml.")]
#[command(version)]
struct Cli {
    /// Project root (holds orca.toml, the catalog, photos and templates)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a gallery from the folder named after the title
    Create {
        /// Gallery title; the folder is its slug ("My Trip" → my-trip)
        #[arg(long)]
        title: String,
        /// Template name (defaults to [templates] default)
        #[arg(long)]
        template: Option<String>,
    },
    /// Delete and regenerate every thumbnail of a gallery
    RegenerateThumbs {
        #[arg(long)]
        id: String,
    },
    /// Re-optimize every photo of a gallery in place
    RegeneratePhotos {
        #[arg(long)]
        id: String,
    },
    /// Re-render index.html without touching photos or the catalog
    RegenerateHtml {
        #[arg(long)]
        id: String,
    },
    /// Switch a gallery to another template and re-render it
    ChangeTemplate {
        #[arg(long)]
        id: String,
        #[arg(long)]
        template: String,
    },
    /// List every gallery in the catalog
    List,
    /// Create the photos root and the stock template
    Init,
    /// Print a stock orca.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let root = cli.root.as_path();
    let request = match cli.command {
        Command::Create { title, template } => Request::Create { title, template },
        Command::RegenerateThumbs { id } => Request::RegenerateThumbnails { id },
        Command::RegeneratePhotos { id } => Request::RegeneratePhotos { id },
        Command::RegenerateHtml { id } => Request::RegenerateHtml { id },
        Command::ChangeTemplate { id, template } => Request::ChangeTemplate { id, template },
        Command::List => {
            let config = config::load_config(root)?;
            let store = CatalogStore::new(config.layout(root).catalog);
            output::print_catalog_list(&store.load());
            return Ok(());
        }
        Command::Init => {
            let config = config::load_config(root)?;
            let created = rebuild::init_project(&config, root)?;
            output::print_init_output(&created, root);
            return Ok(());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
    };
    run_rebuild(root, &request)
}

/// Run one rebuild operation, streaming progress to stdout.
fn run_rebuild(root: &Path, request: &Request) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(root)?;
    init_thread_pool(&config.processing);
    let backend = RustBackend::new();

    let (tx, rx) = std::sync::mpsc::channel();
    let printer_root = root.to_path_buf();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_rebuild_event(&event, &printer_root);
        }
    });
    let result = Rebuilder::new(&backend, &config, root)
        .with_events(tx)
        .execute(request);
    printer.join().ok();

    output::print_outcome(&result?, root);
    Ok(())
}

/// Install the fmt subscriber. Logs go to stderr so progress output on
/// stdout stays clean.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
