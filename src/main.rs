use clap::{Parser, Subcommand};
use dirsite::{build, config, nav, output, tree};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dirsite")]
#[command(about = "Manifest-driven static site compiler")]
#[command(long_about = "\
Manifest-driven static site compiler

Every directory lists what it publishes in a manifest. Files are compiled by
pattern rules into a mirrored output tree, and every page gets the same
navigation, in the order the manifests declare.

Source structure:

  project/
  ├── site.toml                    # Site name, roots, compile rules
  ├── src/
  │   ├── @dirinfo.yml             # nav: [{title, src}], static: [src]
  │   ├── index.md                 # Index page, one per directory
  │   ├── intro.md                 # Listed under nav → page + nav entry
  │   ├── logo.svg                 # Listed under static → copied, no nav entry
  │   ├── guide/                   # Listed as \"guide/\" → nested section
  │   │   ├── @dirinfo.yml
  │   │   └── index.md
  │   └── drafts/                  # Not listed anywhere → ignored
  └── docs/                        # Output, cleared on every build

Run 'dirsite gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Path to the site config file
    #[arg(long, env = "SITE_CONFIG", default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log every compiled file
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (defaults to the number of CPU cores)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Clear the output directory and compile the whole site (default)
    Build,
    /// Resolve every manifest and print the site tree without writing anything
    Check {
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the rendered navigation fragment
    Nav,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    init_thread_pool(cli.jobs);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let options = config::load_options(&cli.config)?;
            println!("==> Building {}", options.name);
            let report = build::build_site(&options)?;
            output::print_build_report(&report, &options.dst_root);
        }
        Command::Check { json } => {
            let options = config::load_options(&cli.config)?;
            let root = tree::resolve_tree(&options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&root)?);
            } else {
                let (index_dst, _) = options.rules.resolve_name(&options.index_name);
                output::print_tree(&root, &index_dst);
                println!("==> Site is valid");
            }
        }
        Command::Nav => {
            let options = config::load_options(&cli.config)?;
            let root = tree::resolve_tree(&options)?;
            println!("{}", nav::render_nav(root.children(), &options.name));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Size the rayon pool; the global default is used when `jobs` is unset.
fn init_thread_pool(jobs: Option<usize>) {
    if let Some(threads) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build_global()
            .ok();
    }
}
