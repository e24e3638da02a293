//! `manzai`: edit a manzai script from the command line.
//!
//! Each invocation opens the saved script, applies one command, and flushes
//! the autosave before exiting. Block positions are 1-based, as printed by
//! `manzai show`.
//!
//! ```text
//! manzai title "コンビニ"
//! manzai heading "つかみ"
//! manzai line "コンビニ店員やってみたいねん"
//! manzai line "やってみ"
//! manzai stats
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use manzai_doc::{PacingReport, export_file_name};
use manzai_kernel::{EditorConfig, EditorSession, GeminiGenerator, SqliteStore, TextGenerator};
use manzai_types::{Block, BlockId, Role};

#[derive(Parser, Debug)]
#[command(name = "manzai")]
#[command(about = "Manzai script editor")]
struct Args {
    /// Config file (default: <config_dir>/manzai/config.ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the script
    Show,
    /// Start a new, empty script
    New,
    /// Set the title
    Title { text: String },
    /// Append a line (role alternates unless given)
    Line {
        text: String,
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
    /// Append a heading
    Heading { text: String },
    /// Replace the content of block N
    Edit { position: usize, text: String },
    /// Delete block N
    Delete { position: usize },
    /// Swap boke/tsukkomi on line N
    Toggle { position: usize },
    /// Move block FROM to position TO
    Move { from: usize, to: usize },
    /// Trim whitespace from every block
    Format,
    /// Pacing analytics
    Stats,
    /// Write the script as JSON (default file name: <title>.json)
    Export { file: Option<PathBuf> },
    /// Replace the script with a JSON export
    Import { file: PathBuf },
    /// Ask the text generator, with the script as context
    Assist { prompt: String },
}

fn parse_role(s: &str) -> std::result::Result<Role, String> {
    Role::from_str(s).ok_or_else(|| format!("unknown role '{s}' (expected boke or tsukkomi)"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::load_default()?,
    };
    if let Some(db) = args.db {
        config.database = db;
    }

    let store = SqliteStore::open(&config.database)
        .with_context(|| format!("opening {}", config.database.display()))?;
    let generator = config.generator.as_ref().map(|provider| {
        Arc::new(GeminiGenerator::from_config(provider)) as Arc<dyn TextGenerator>
    });
    let mut session = EditorSession::open(Arc::new(store), &config, generator)?;
    tracing::debug!(command = ?args.command, script_id = %session.script().id, "running");

    let result = apply(&mut session, args.command).await;
    session.shutdown().await;
    result
}

async fn apply(session: &mut EditorSession, command: Command) -> Result<()> {
    match command {
        Command::Show => print_script(session),
        Command::New => {
            session.new_script();
            println!("started a new script");
        }
        Command::Title { text } => {
            session.set_title(text);
            println!("title: {}", session.script().title);
        }
        Command::Line { text, role } => {
            let toggle = needs_toggle(role, session.next_role());
            let id = session.add_line();
            session.update_block(id, text);
            if toggle {
                session.toggle_role(id);
            }
            print_block(session, id);
        }
        Command::Heading { text } => {
            let id = session.add_heading();
            session.update_block(id, text);
            print_block(session, id);
        }
        Command::Edit { position, text } => {
            let id = block_at(session, position)?;
            session.update_block(id, text);
        }
        Command::Delete { position } => {
            let id = block_at(session, position)?;
            session.delete_block(id);
        }
        Command::Toggle { position } => {
            let id = block_at(session, position)?;
            if !session.script().block(id).is_some_and(|b| b.is_line()) {
                bail!("block {position} is a heading");
            }
            session.toggle_role(id);
            print_block(session, id);
        }
        Command::Move { from, to } => {
            let len = session.script().blocks.len();
            let (from, to) = (index_of(from, len)?, index_of(to, len)?);
            if !session.move_block(from, to) {
                bail!("could not move block {} to {}", from + 1, to + 1);
            }
        }
        Command::Format => session.format(),
        Command::Stats => print_stats(&session.pacing()),
        Command::Export { file } => {
            let path = file.unwrap_or_else(|| PathBuf::from(export_file_name(session.script())));
            let json = session.export_json()?;
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("exported to {}", path.display());
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            session.import_json(&text)?;
            println!(
                "imported '{}' ({} blocks)",
                session.script().title,
                session.script().blocks.len()
            );
        }
        Command::Assist { prompt } => {
            let text = session.assist(&prompt).await?;
            println!("{text}");
        }
    }
    Ok(())
}

/// Zero-based index for a 1-based `position` in a script of `len` blocks.
fn index_of(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        bail!("no block at position {position} (script has {len})");
    }
    Ok(position - 1)
}

fn block_at(session: &EditorSession, position: usize) -> Result<BlockId> {
    let index = index_of(position, session.script().blocks.len())?;
    session
        .block_id_at(index)
        .with_context(|| format!("no block at position {position}"))
}

/// Whether `line --role` has to flip the role alternation would assign.
fn needs_toggle(requested: Option<Role>, assigned: Role) -> bool {
    requested.is_some_and(|r| r != assigned)
}

fn format_block(index: usize, block: &Block) -> String {
    match block.role() {
        Some(role) => format!("{:>3}  {}: {}", index + 1, role.label(), block.content()),
        None => format!("{:>3}  ■ {}", index + 1, block.content()),
    }
}

fn print_block(session: &EditorSession, id: BlockId) {
    let script = session.script();
    if let (Some(index), Some(block)) = (script.position(id), script.block(id)) {
        println!("{}", format_block(index, block));
    }
}

fn print_script(session: &EditorSession) {
    let script = session.script();
    println!("{}", script.title);
    for (index, block) in script.blocks.iter().enumerate() {
        println!("{}", format_block(index, block));
    }
    if script.blocks.is_empty() {
        println!("     (empty)");
    }
}

fn print_stats(report: &PacingReport) {
    let balance = &report.role_balance;
    println!(
        "lines: {} (ボケ {} / {:.0}%, ツッコミ {} / {:.0}%)",
        balance.total(),
        balance.boke,
        balance.share(Role::Boke) * 100.0,
        balance.tsukkomi,
        balance.share(Role::Tsukkomi) * 100.0,
    );

    if !report.phrases.is_empty() {
        println!("\nrepeated phrases:");
        for p in &report.phrases {
            println!("  {}  x{}", p.phrase, p.count);
        }
    }

    if !report.rhythm.is_empty() {
        println!("\n  #  len  role      pattern                   balance");
        for point in &report.rhythm {
            println!(
                "{:>3}  {:>3}  {:<8}  {:<24}  {:>5.2} {}",
                point.index,
                point.length,
                point.role.as_str(),
                point.role_pattern,
                point.tempo_balance,
                point.band().as_str(),
            );
        }
    }
}
