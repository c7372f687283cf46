use clap::{Parser, Subcommand};
use miso::{config, generate, output, scaffold, scan};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flags shared by commands that read a project.
#[derive(clap::Args, Clone)]
struct ProjectArgs {
    /// Project root (contains _config/, content/, templates/)
    #[arg(long, default_value = ".")]
    project: PathBuf,

    /// Site config file (default: <project>/_config/site.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "miso")]
#[command(about = "Static site generator for Markdown content")]
#[command(long_about = "\
Static site generator for Markdown content

Your filesystem is the data source. Top-level directories become collections,
filenames carry dates and slugs, and templates decide the HTML.

Project structure:

  my-site/
  ├── _config/
  │   ├── site.yaml                    # Site config (merged over defaults)
  │   └── menu.yaml                    # Named menus exposed to templates
  ├── content/
  │   ├── index.md                     # Page → /
  │   ├── about.md                     # Page → /about/
  │   └── posts/                       # Collection \"posts\"
  │       └── 2024-01-02-hello.md      # Dated item → /posts/hello/
  ├── templates/
  │   ├── page.html                    # Default page layout
  │   ├── collection-item.html         # Default item layout
  │   └── collection.html              # Default listing layout
  └── css/                             # Asset directory → copied to output

Resolution (first available wins):
  Slug:   front matter slug → filename without date prefix
  Date:   front matter date → YYYY-MM-DD filename prefix
  Layout: front matter layout → collection layout → built-in default

Run 'miso gen-config' to print a documented site.yaml.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the whole site into the output directory
    Build(ProjectArgs),
    /// Load config and content, list what would be built, write nothing
    Check(ProjectArgs),
    /// Create a starter project
    New {
        /// Directory to create the project in
        dir: PathBuf,
        /// Write into a non-empty directory, overwriting skeleton files
        #[arg(long)]
        force: bool,
    },
    /// Print a stock site.yaml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise only warnings reach stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build(args) => {
            let site_config = config::load_config(&args.project, args.config.as_deref())?;
            println!("==> Building {}", args.project.display());
            let report = generate::build(&args.project, &site_config)?;
            output::print_build_output(&report, &args.project);
            println!("==> Build complete: {}", report.output_dir.display());
        }
        Command::Check(args) => {
            let site_config = config::load_config(&args.project, args.config.as_deref())?;
            println!("==> Checking {}", args.project.display());
            let collections = generate::check(&args.project, &site_config)?;
            let content_root = scan::content_root(&args.project, &site_config)?;
            output::print_check_output(&collections, &content_root);
            println!("==> Content is valid");
        }
        Command::New { dir, force } => {
            let created = scaffold::scaffold(&dir, force)?;
            output::print_scaffold_output(&dir, &created);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_yaml());
        }
    }

    Ok(())
}
