use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use bases_core::MarkerStyle;
use bases_render::{RenderConfig, RenderSession, TAB_CONTROLLER_SCRIPT};
use bases_vault::strip_frontmatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum MarkerArg {
    Numbered,
    Bulleted,
    None,
}

impl From<MarkerArg> for MarkerStyle {
    fn from(arg: MarkerArg) -> Self {
        match arg {
            MarkerArg::Numbered => MarkerStyle::Numbered,
            MarkerArg::Bulleted => MarkerStyle::Bulleted,
            MarkerArg::None => MarkerStyle::None,
        }
    }
}

#[derive(Parser)]
#[command(name = "bases", version, about = "Render note bases to HTML")]
struct Cli {
    /// Vault root (default: $BASES_VAULT_ROOT, then the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    vault: Option<PathBuf>,

    /// Marker style for list views that do not declare one
    #[arg(long, global = true, value_enum)]
    markers: Option<MarkerArg>,

    /// Append the tab controller script to rendered output
    #[arg(long, global = true, conflicts_with = "no_script")]
    script: bool,

    /// Never append the tab controller script, even if $BASES_INCLUDE_SCRIPT is set
    #[arg(long, global = true)]
    no_script: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a base definition file
    Render(RenderArgs),
    /// Replace base embeds in a markdown document
    Embed(EmbedArgs),
    /// List the notes a base would be evaluated over
    Notes,
    /// Print the client-side tab controller script
    Script,
}

#[derive(Args)]
struct RenderArgs {
    /// Definition name or path, resolved against the vault root
    #[arg(value_name = "BASE")]
    base: String,

    /// Render only this view
    #[arg(long, value_name = "NAME")]
    view: Option<String>,

    /// Write to PATH instead of stdout
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct EmbedArgs {
    /// Markdown document containing `![[name.base]]` embeds or base fences
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Drop the document's front-matter block from the output
    #[arg(long)]
    strip_frontmatter: bool,

    /// Write to PATH instead of stdout
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn render_config(cli: &Cli) -> RenderConfig {
    let include_script = match (cli.script, cli.no_script) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    RenderConfig::from_cli_and_env(
        cli.vault.clone(),
        cli.markers.map(MarkerStyle::from),
        include_script,
    )
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = render_config(&cli);
    log::debug!("render config: {:?}", config);
    let mut session = RenderSession::new(config);

    let result = match cli.command {
        Commands::Render(args) => run_render(&mut session, args),
        Commands::Embed(args) => run_embed(&mut session, args),
        Commands::Notes => run_notes(&mut session),
        Commands::Script => {
            print!("{}", TAB_CONTROLLER_SCRIPT);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run_render(session: &mut RenderSession, args: RenderArgs) -> Result<()> {
    let html = session.render_base(&args.base, args.view.as_deref(), None);
    let html = session.with_script(html);
    emit(&html, args.out.as_deref())
}

fn run_embed(session: &mut RenderSession, args: EmbedArgs) -> Result<()> {
    let markdown = fs::read_to_string(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;
    let body = if args.strip_frontmatter {
        strip_frontmatter(&markdown)
    } else {
        markdown.as_str()
    };
    let rendered = session.render_document(body, &args.document);
    emit(&rendered, args.out.as_deref())
}

fn run_notes(session: &mut RenderSession) -> Result<()> {
    let root = session.config().vault_root.clone();
    let corpus = session
        .corpus()
        .with_context(|| format!("loading notes from {}", root.display()))?;
    for record in corpus.iter() {
        println!("{}\t{}", record.identifier(), record.source_path());
    }
    Ok(())
}

fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
