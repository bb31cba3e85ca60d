//! Headless entry point for the paper outline store.
//!
//! # Responsibility
//! - Open the SQLite-backed store and drive one editor session per run.
//! - Apply single edits, print documents and progress, and move documents
//!   in and out as JSON.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use paper_core::view::render::fold_label;
use paper_core::{
    default_log_level, init_logging, open_db, ChecklistScope, Command, Document, Editor,
    EditorConfig, ProgressBand, RandomIdGenerator, SqliteDocumentStore, ViewKind, ViewNodeId,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "paper")]
#[command(about = "Outline documents with sections, subsections, and checklists")]
struct Cli {
    /// SQLite store file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace | debug | info | warn | error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored document as an outline
    Show,
    /// Write the document as JSON to a file or directory
    Export { file: PathBuf },
    /// Replace the document with a JSON file
    Import { file: PathBuf },
    /// Append a new section
    AddSection {
        #[arg(long)]
        title: Option<String>,
    },
    /// Append a checklist item to a section (0-based index)
    AddItem {
        section_index: usize,
        #[arg(long, default_value = "")]
        text: String,
    },
    /// Append a subsection to a section
    AddSubsection {
        section_index: usize,
        #[arg(long)]
        title: Option<String>,
    },
    /// Check (or with --uncheck, clear) a section checklist item
    Check {
        section_index: usize,
        item_index: usize,
        #[arg(long)]
        uncheck: bool,
    },
    /// Collapse or expand a section
    Fold { section_index: usize },
    /// Delete a section with everything in it
    DeleteSection { section_index: usize },
    /// Delete a section checklist item
    DeleteItem {
        section_index: usize,
        item_index: usize,
    },
    /// Move a section one step up or down
    MoveSection {
        section_index: usize,
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Print completion per section
    Progress,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("no platform data directory; pass --db and --log-dir"))?
        .join("paper");
    let log_dir = cli.log_dir.clone().unwrap_or_else(|| data_dir.join("logs"));
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&log_level, &path_str(&log_dir)?)?;

    let db_path = cli.db.clone().unwrap_or_else(|| data_dir.join("paper.sqlite3"));
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating store directory {}", parent.display()))?;
    }
    let conn = open_db(&db_path).with_context(|| format!("opening {}", db_path.display()))?;
    let store = SqliteDocumentStore::try_new(&conn)?;
    let mut editor = Editor::bootstrap(
        store,
        EditorConfig::default(),
        Box::new(RandomIdGenerator::new()),
    );
    info!("event=cli_run module=cli status=start db={}", db_path.display());

    match cli.command {
        Commands::Show => print_outline(editor.document()),
        Commands::Export { file } => {
            let export = editor.export()?;
            let target = if file.is_dir() {
                file.join(&export.file_name)
            } else {
                file
            };
            std::fs::write(&target, export.contents)
                .with_context(|| format!("writing {}", target.display()))?;
            println!("exported {}", target.display());
        }
        Commands::Import { file } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            editor
                .import(&bytes)
                .with_context(|| format!("importing {}", file.display()))?;
            println!(
                "imported {} sections from {}",
                editor.document().sections.len(),
                file.display()
            );
        }
        Commands::AddSection { title } => {
            let outcome = editor.dispatch(Command::AddSection, 0)?;
            if let (Some(title), Some(section)) = (title, outcome.created) {
                let node = editor
                    .view()
                    .find_descendant(section, ViewKind::SectionTitle)
                    .ok_or_else(|| anyhow!("new section has no title field"))?;
                editor.dispatch(Command::EditText { node, text: title }, 0)?;
            }
            editor.flush();
            println!("sections: {}", editor.document().sections.len());
        }
        Commands::AddItem {
            section_index,
            text,
        } => {
            let section = section_at(&editor, section_index)?;
            let outcome = editor.dispatch(
                Command::AddChecklistItem {
                    container: section,
                    scope: ChecklistScope::Section,
                },
                0,
            )?;
            if let Some(item) = outcome.created {
                let node = editor
                    .view()
                    .find_descendant(item, ViewKind::ItemText)
                    .ok_or_else(|| anyhow!("new item has no text field"))?;
                editor.dispatch(Command::EditText { node, text }, 0)?;
            }
            editor.flush();
            print_outline(editor.document());
        }
        Commands::AddSubsection {
            section_index,
            title,
        } => {
            let section = section_at(&editor, section_index)?;
            let outcome = editor.dispatch(Command::AddSubsection { section }, 0)?;
            if let (Some(title), Some(subsection)) = (title, outcome.created) {
                let node = editor
                    .view()
                    .find_descendant(subsection, ViewKind::SubsectionTitle)
                    .ok_or_else(|| anyhow!("new subsection has no title field"))?;
                editor.dispatch(Command::EditText { node, text: title }, 0)?;
            }
            editor.flush();
            print_outline(editor.document());
        }
        Commands::Check {
            section_index,
            item_index,
            uncheck,
        } => {
            let item = item_at(&editor, section_index, item_index)?;
            editor.dispatch(
                Command::SetChecked {
                    item,
                    checked: !uncheck,
                },
                0,
            )?;
            editor.flush();
            print_outline(editor.document());
        }
        Commands::Fold { section_index } => {
            let section = section_at(&editor, section_index)?;
            editor.dispatch(Command::ToggleFold { section }, 0)?;
            editor.flush();
            print_outline(editor.document());
        }
        Commands::DeleteSection { section_index } => {
            let section = section_at(&editor, section_index)?;
            editor.dispatch(Command::DeleteSection { section }, 0)?;
            editor.flush();
            print_outline(editor.document());
        }
        Commands::DeleteItem {
            section_index,
            item_index,
        } => {
            let item = item_at(&editor, section_index, item_index)?;
            editor.dispatch(Command::DeleteItem { item }, 0)?;
            editor.flush();
            print_outline(editor.document());
        }
        Commands::MoveSection {
            section_index,
            direction,
        } => {
            let section = section_at(&editor, section_index)?;
            let command = match direction {
                Direction::Up => Command::MoveSectionUp { section },
                Direction::Down => Command::MoveSectionDown { section },
            };
            let outcome = editor.dispatch(command, 0)?;
            editor.flush();
            if !outcome.changed {
                println!("section {section_index} is already at that end");
            }
            print_outline(editor.document());
        }
        Commands::Progress => {
            for section in &editor.document().sections {
                let percent = section.progress();
                let band = ProgressBand::from_percent(percent);
                println!(
                    "{:>3}% {:<5} {}  {}",
                    percent,
                    band.as_str(),
                    band.color(),
                    display_title(&section.title)
                );
            }
        }
    }

    editor.flush();
    info!("event=cli_run module=cli status=ok");
    Ok(())
}

fn section_at(
    editor: &Editor<SqliteDocumentStore<'_>>,
    index: usize,
) -> anyhow::Result<ViewNodeId> {
    let sections = editor.view().sections();
    match sections.get(index) {
        Some(section) => Ok(*section),
        None => bail!(
            "section index {index} out of range ({} sections)",
            sections.len()
        ),
    }
}

fn item_at(
    editor: &Editor<SqliteDocumentStore<'_>>,
    section_index: usize,
    item_index: usize,
) -> anyhow::Result<ViewNodeId> {
    let section = section_at(editor, section_index)?;
    let view = editor.view();
    let items = view
        .find_descendant(section, ViewKind::Checklist(ChecklistScope::Section))
        .map(|list| view.children(list))
        .unwrap_or(&[]);
    match items.get(item_index) {
        Some(item) => Ok(*item),
        None => bail!(
            "item index {item_index} out of range ({} items in section {section_index})",
            items.len()
        ),
    }
}

fn print_outline(document: &Document) {
    println!("# {}", display_title(&document.title));
    for section in &document.sections {
        println!(
            "\n{} {} [{}%]",
            fold_label(section.collapsed),
            display_title(&section.title),
            section.progress()
        );
        if !section.text.is_empty() {
            println!("  {}", section.text);
        }
        for item in &section.checklist {
            println!("  {} {}", checkbox(item.checked), item.text);
        }
        for subsection in &section.subsections {
            println!("  ## {}", display_title(&subsection.title));
            if !subsection.text.is_empty() {
                println!("    {}", subsection.text);
            }
            for item in &subsection.checklist {
                println!("    {} {}", checkbox(item.checked), item.text);
            }
        }
    }
}

fn display_title(title: &str) -> &str {
    if title.is_empty() {
        "(untitled)"
    } else {
        title
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn path_str(path: &Path) -> anyhow::Result<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    absolute
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("path is not valid UTF-8: {}", absolute.display()))
}
