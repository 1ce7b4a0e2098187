//! quire command-line front end
//!
//! Parses a markup document, lays it out and prints what came out:
//!
//! - quire page.xml                  # Print the cell tree
//! - quire --json page.xml           # Cell tree as JSON
//! - quire -S out.png page.xml       # Render to an image

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use quire_cells::{CellDump, RenderConfig, RenderContext};
use quire_document::{
    Document, DocumentView, FileSystemOpener, FontSet, FontdueMeasurer, Rasterizer,
};

/// quire - lay out and inspect markup documents
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the laid-out cell tree
    quire page.xml

    # Plain text and links of a document
    quire --text --links page.xml

    # Render inline markup to a PNG
    quire --markup '<?xml version="1.0"?><html><body>Hi</body></html>' -S out.png

    # Page breaks for 1000px pages with a custom configuration
    quire --pages 1000 --config print.json page.xml
"#)]
struct Cli {
    /// Markup file to open, optionally with a #fragment
    #[arg(value_name = "FILE")]
    path: Option<String>,

    /// Parse a markup string directly instead of a file
    #[arg(long, value_name = "MARKUP")]
    markup: Option<String>,

    /// Layout width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Height of the rendered image in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Print the cell tree with geometry (the default)
    #[arg(long)]
    tree: bool,

    /// Print the cell tree as JSON
    #[arg(long)]
    json: bool,

    /// Print the document as plain text
    #[arg(long)]
    text: bool,

    /// List the links of the document
    #[arg(long)]
    links: bool,

    /// Print page breaks for pages of this height
    #[arg(long, value_name = "HEIGHT")]
    pages: Option<i32>,

    /// Render the visible part of the document to an image file
    #[arg(short = 'S', long = "png", value_name = "FILE")]
    png: Option<PathBuf>,

    /// JSON file overriding the rendering configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    const fn wants_output(&self) -> bool {
        self.tree || self.json || self.text || self.links || self.pages.is_some() || self.png.is_some()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let fonts = Arc::new(FontSet::load_system());
    let ctx = if fonts.is_empty() {
        RenderContext::with_approximate_metrics(config)
    } else {
        RenderContext::new(config, Box::new(FontdueMeasurer::new(Arc::clone(&fonts))))
    };

    let width = pixels(cli.width, "width")?;
    let height = pixels(cli.height, "height")?;
    let mut view = DocumentView::new(ctx, Box::new(FileSystemOpener::new()), width);
    if let Some(ref markup) = cli.markup {
        view.set_markup(markup.as_bytes(), None)
            .context("cannot parse --markup")?;
    } else if let Some(ref path) = cli.path {
        view.open(path)
            .with_context(|| format!("cannot load '{path}'"))?;
    } else {
        bail!("a markup file or --markup is required");
    }
    let doc = view
        .document()
        .context("no document was loaded")?;

    if cli.tree || !cli.wants_output() {
        print_tree(doc, cli.width);
    }
    if cli.json {
        let dump = doc.dump().context("document has no root")?;
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }
    if cli.text {
        println!("{}", "=== Text ===".bold());
        println!("{}", doc.text());
    }
    if cli.links {
        print_links(doc);
    }
    if let Some(height) = cli.pages {
        println!("{}", "=== Page Breaks ===".bold());
        for (page, bottom) in doc.page_breaks(height).iter().enumerate() {
            println!("  page {}: ends at y={bottom}", page + 1);
        }
    }
    if let Some(ref output) = cli.png {
        let mut raster = Rasterizer::new(cli.width, cli.height, Arc::clone(&fonts))
            .with_images(doc.images());
        view.render(&mut raster, height);
        raster.save(output)?;
        println!("Rendering saved to: {}", output.display());
    }
    Ok(())
}

/// A pixel count given on the command line, as layout geometry.
fn pixels(value: u32, flag: &str) -> Result<i32> {
    i32::try_from(value).with_context(|| format!("--{flag} {value} is too large"))
}

fn load_config(cli: &Cli) -> Result<RenderConfig> {
    let Some(ref path) = cli.config else {
        return Ok(RenderConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("cannot read config '{}'", path.display()))?;
    RenderConfig::from_json(&json)
        .with_context(|| format!("invalid config '{}'", path.display()))
}

fn print_tree(doc: &Document, width: u32) {
    let title = doc.title().unwrap_or("(untitled)");
    println!(
        "{} {} ({width}x{})",
        "=== Cell Tree ===".bold(),
        title,
        doc.height()
    );
    if let Some(dump) = doc.dump() {
        print_cell(&dump, 0);
    }
}

/// Recursively print a cell with its geometry
fn print_cell(cell: &CellDump, depth: usize) {
    let indent = "  ".repeat(depth);
    let rect = cell.rect;
    let mut line = format!(
        "{indent}{} {}",
        cell.kind.cyan(),
        format!("x={} y={} w={} h={}", rect.x, rect.y, rect.width, rect.height).dimmed()
    );
    if let Some(ref text) = cell.text {
        let preview: String = text.chars().take(30).collect();
        let suffix = if text.chars().count() > 30 { "..." } else { "" };
        line.push_str(&format!(" {}", format!("\"{preview}{suffix}\"").green()));
    }
    if let Some(ref link) = cell.link {
        line.push_str(&format!(" -> {}", link.blue()));
    }
    println!("{line}");
    for child in &cell.children {
        print_cell(child, depth + 1);
    }
}

/// Each link once per run of cells it covers
fn print_links(doc: &Document) {
    println!("{}", "=== Links ===".bold());
    let tree = doc.tree();
    let mut previous: Option<&str> = None;
    for id in tree.terminals(doc.root()) {
        let href = tree[id].link.as_ref().map(|link| link.href.as_str());
        if let Some(href) = href
            && previous != Some(href)
        {
            let (x, y) = tree.absolute_position(id);
            println!("  {href} at ({x}, {y})");
        }
        previous = href;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_beyond_i32_is_an_error() {
        let cli = Cli::try_parse_from(["quire", "--width", "4000000000", "page.xml"]).unwrap();
        assert_eq!(cli.width, 4_000_000_000);
        let err = pixels(cli.width, "width").unwrap_err();
        assert_eq!(err.to_string(), "--width 4000000000 is too large");
        assert_eq!(pixels(800, "width").unwrap(), 800);
    }

    #[test]
    fn test_default_output_is_the_tree() {
        let cli = Cli::try_parse_from(["quire", "page.xml"]).unwrap();
        assert!(!cli.wants_output());
        let cli = Cli::try_parse_from(["quire", "--text", "page.xml"]).unwrap();
        assert!(cli.wants_output());
    }
}
