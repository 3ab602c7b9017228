//! mdnote - Markdown authoring helpers for the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mdnote_core::{image, tasks, transform};
use mdnote_core::{Config, Document, EditorAction, ImageStore, Selection};
use std::path::{Path, PathBuf};

/// Markdown document editing and preview tools
#[derive(Parser, Debug)]
#[command(name = "mdnote")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use this config file instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table of contents
    Toc {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List task list items with their ordinal and source line
    Tasks {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Toggle the Nth checkbox (0-based) and save the file
    Toggle {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        ordinal: usize,
    },
    /// Render the document to HTML on stdout
    #[cfg(feature = "render")]
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Apply an editing action to a character range and save the file
    Apply {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// heading, bold, italic, strikethrough, highlight, inline-code,
        /// code-block, link, ul, ol, task, quote, hr, table, indent
        action: EditorAction,
        /// Selection start (character offset)
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Selection end (character offset), defaults to start
        #[arg(long)]
        end: Option<usize>,
    },
    /// Store an image in the sidecar store and reference it at an offset
    Image {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        /// Insertion offset (character offset), defaults to end of document
        #[arg(long)]
        at: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    match args.command {
        Command::Toc { file } => print_toc(&load(&file)?, &config),
        Command::Tasks { file } => print_tasks(&load(&file)?),
        Command::Toggle { file, ordinal } => toggle(&mut load(&file)?, ordinal),
        #[cfg(feature = "render")]
        Command::Render { file } => render(&load(&file)?, &config),
        Command::Apply {
            file,
            action,
            start,
            end,
        } => {
            let selection = Selection::new(start, end.unwrap_or(start));
            apply(&mut load(&file)?, action, selection)
        }
        Command::Image { file, image, at } => insert_image(&mut load(&file)?, &image, at, &config),
    }
}

fn load(path: &Path) -> Result<Document> {
    Document::load(path).with_context(|| format!("Failed to load document: {}", path.display()))
}

fn print_toc(doc: &Document, config: &Config) -> Result<()> {
    let headings: Vec<_> = doc
        .headings
        .iter()
        .filter(|h| h.level <= config.preview.toc_depth)
        .collect();
    let Some(min_level) = headings.iter().map(|h| h.level).min() else {
        return Ok(());
    };

    for heading in headings {
        println!(
            "{}{} (#{}, line {})",
            "  ".repeat(heading.depth(min_level)),
            heading.text,
            heading.anchor,
            heading.line + 1
        );
    }
    Ok(())
}

fn print_tasks(doc: &Document) -> Result<()> {
    for (ordinal, item) in tasks::task_items(&doc.text()).iter().enumerate() {
        let mark = if item.checked { 'x' } else { ' ' };
        println!("{ordinal}: [{mark}] {} (line {})", item.label, item.line + 1);
    }
    Ok(())
}

fn toggle(doc: &mut Document, ordinal: usize) -> Result<()> {
    let Some(text) = tasks::toggle_task(&doc.text(), ordinal) else {
        bail!(
            "No checkbox #{ordinal} in {} ({} found)",
            doc.path.display(),
            doc.task_lines.len()
        );
    };
    doc.save_text(&text)
}

#[cfg(feature = "render")]
fn render(doc: &Document, config: &Config) -> Result<()> {
    let images = ImageStore::load_from(&doc.image_store_path())?;
    let preview = mdnote_core::render::render_preview(
        &doc.text(),
        &images,
        &config.preview.render_options(),
    );
    print!("{}", preview.html);
    Ok(())
}

fn apply(doc: &mut Document, action: EditorAction, selection: Selection) -> Result<()> {
    let edit = action.apply(&doc.text(), selection);
    doc.save_text(&edit.text)?;
    println!("{} {}", edit.selection.start, edit.selection.end);
    Ok(())
}

fn insert_image(
    doc: &mut Document,
    image_path: &Path,
    at: Option<usize>,
    config: &Config,
) -> Result<()> {
    let bytes = std::fs::read(image_path)
        .with_context(|| format!("Failed to read image: {}", image_path.display()))?;
    let file_name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let payload = image::data_url(&file_name, &bytes, config.images.max_bytes)?;

    let store_path = doc.image_store_path();
    let mut images = ImageStore::load_from(&store_path)?;
    let id = images.save(payload);

    let markdown = image::image_markdown(&image::alt_text(&file_name), &id);
    let caret = Selection::caret(at.unwrap_or_else(|| doc.len_chars()));
    let edit = transform::insert_block(&doc.text(), caret, &markdown);

    doc.save_text(&edit.text)?;
    images.save_to(&store_path)?;
    println!("{id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, content: &str) -> Result<Document> {
        let path = dir.path().join("note.md");
        fs::write(&path, content)?;
        load(&path)
    }

    #[test]
    fn test_args_parse_apply() {
        let args = Args::try_parse_from([
            "mdnote", "apply", "a.md", "bold", "--start", "1", "--end", "4",
        ])
        .unwrap();
        match args.command {
            Command::Apply {
                action, start, end, ..
            } => {
                assert_eq!(action, EditorAction::Bold);
                assert_eq!(start, 1);
                assert_eq!(end, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_reject_unknown_action() {
        assert!(Args::try_parse_from(["mdnote", "apply", "a.md", "underline"]).is_err());
    }

    #[test]
    fn test_toggle_saves_file() -> Result<()> {
        let dir = TempDir::new()?;
        let mut doc = write_doc(&dir, "- [ ] a\n- [ ] b\n")?;

        toggle(&mut doc, 1)?;
        assert_eq!(fs::read_to_string(&doc.path)?, "- [ ] a\n- [x] b\n");
        assert!(toggle(&mut doc, 2).is_err());
        Ok(())
    }

    #[test]
    fn test_apply_saves_file() -> Result<()> {
        let dir = TempDir::new()?;
        let mut doc = write_doc(&dir, "make this bold")?;

        apply(&mut doc, EditorAction::Bold, Selection::new(10, 14))?;
        assert_eq!(fs::read_to_string(&doc.path)?, "make this **bold**");
        Ok(())
    }

    #[test]
    fn test_insert_image_writes_sidecar() -> Result<()> {
        let dir = TempDir::new()?;
        let mut doc = write_doc(&dir, "intro")?;
        let image_path = dir.path().join("cat.png");
        fs::write(&image_path, b"\x89PNG")?;

        insert_image(&mut doc, &image_path, None, &Config::default())?;

        let images = ImageStore::load_from(&doc.image_store_path())?;
        assert_eq!(images.len(), 1);
        let text = fs::read_to_string(&doc.path)?;
        assert!(text.starts_with("intro\n![cat](img:"));
        assert_eq!(images.resolve(&text).matches("data:image/png").count(), 1);
        Ok(())
    }

    #[test]
    fn test_insert_non_image_fails_without_changes() -> Result<()> {
        let dir = TempDir::new()?;
        let mut doc = write_doc(&dir, "intro")?;
        let other = dir.path().join("notes.txt");
        fs::write(&other, b"text")?;

        assert!(insert_image(&mut doc, &other, None, &Config::default()).is_err());
        assert_eq!(fs::read_to_string(&doc.path)?, "intro");
        assert!(!doc.image_store_path().exists());
        Ok(())
    }

    #[test]
    fn test_insert_image_leaves_no_payload_when_document_write_fails() -> Result<()> {
        let dir = TempDir::new()?;
        let mut doc = write_doc(&dir, "intro")?;
        let image_path = dir.path().join("cat.png");
        fs::write(&image_path, b"\x89PNG")?;

        // Replacing the document with a directory makes the write fail for any user
        fs::remove_file(&doc.path)?;
        fs::create_dir(&doc.path)?;

        assert!(insert_image(&mut doc, &image_path, None, &Config::default()).is_err());
        assert!(!doc.image_store_path().exists());
        Ok(())
    }
}
