use anyhow::{bail, Context};
use clap::Parser;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use treemap_core::color::{border_color, colorer_for};
use treemap_core::scanner::{ScanMsg, Scanner};
use treemap_core::{export, impute, layout, parser, svg, Record, TreeBuilder, TreemapConfig};

const ABOUT: &str = "Generate treemaps from header-less CSV.

Each row is: <delimited path>,<size>,<heat>

Example:

  $ printf 'Africa/Algeria,33333216,72\\nAfrica/Angola,12420476,42\\n' | treemap > out.svg";

#[derive(Parser, Debug)]
#[command(name = "treemap", about = "Squarified treemap SVG generator", long_about = ABOUT)]
struct Args {
    /// CSV input file. Reads STDIN when omitted.
    input: Option<PathBuf>,
    /// Scan a directory instead of reading CSV.
    #[arg(long, conflicts_with = "input")]
    dir: Option<PathBuf>,
    /// Write SVG here instead of STDOUT.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write the layout as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// JSON file with base settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Width of output.
    #[arg(short, long)]
    width: Option<f64>,
    /// Height of output.
    #[arg(long)]
    height: Option<f64>,
    /// Margin between boxes.
    #[arg(long)]
    margin_box: Option<f64>,
    /// Padding between box border and content.
    #[arg(long)]
    padding_box: Option<f64>,
    /// Padding around root content.
    #[arg(long)]
    padding: Option<f64>,
    /// Color scheme (RdBu, balanced, none).
    #[arg(long)]
    color: Option<String>,
    /// Color of borders (white, black).
    #[arg(long)]
    color_border: Option<String>,
    /// Size given to leaves without one.
    #[arg(long)]
    empty_leaf_size: Option<f64>,
    /// Heat given to leaves without one.
    #[arg(long)]
    empty_leaf_heat: Option<f64>,
    /// Start the map at the first node with more than one child.
    #[arg(long)]
    collapse_root: bool,
    /// Path delimiter.
    #[arg(long, default_value_t = '/')]
    delimiter: char,
}

impl Args {
    fn config(&self) -> anyhow::Result<TreemapConfig> {
        let mut cfg = match &self.config {
            Some(path) => TreemapConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => TreemapConfig::default(),
        };
        let overrides = [
            (&mut cfg.width, self.width),
            (&mut cfg.height, self.height),
            (&mut cfg.margin_box, self.margin_box),
            (&mut cfg.padding_box, self.padding_box),
            (&mut cfg.root_padding, self.padding),
            (&mut cfg.empty_leaf_size, self.empty_leaf_size),
            (&mut cfg.empty_leaf_heat, self.empty_leaf_heat),
        ];
        for (field, value) in overrides {
            if let Some(v) = value {
                *field = v;
            }
        }
        if let Some(c) = &self.color {
            cfg.color_scheme = c.clone();
        }
        if let Some(c) = &self.color_border {
            cfg.color_border = c.clone();
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config()?;

    let records = match (&args.dir, &args.input) {
        (Some(dir), _) => scan(dir.clone())?,
        (None, Some(path)) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            parser::parse_csv(file).context("can not parse nodes")?
        }
        (None, None) => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading STDIN")?;
            parser::parse_str(&input).context("can not parse nodes")?
        }
    };

    let mut tree = TreeBuilder::new()
        .delimiter(args.delimiter)
        .build(records)
        .context("can not make tree")?;
    if args.collapse_root {
        tree.collapse_root();
    }
    impute::prepare(&mut tree, &config);

    let ui = layout::build_treemap(&tree, &config);
    let colorer = colorer_for(&config.color_scheme, &tree);
    let border = border_color(&config.color_scheme, &config.color_border);
    let out = svg::render_svg(&ui, &tree, colorer.as_ref(), border);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&export::to_json(&ui, &tree))?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    match &args.output {
        Some(path) => {
            std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))?
        }
        None => std::io::stdout()
            .lock()
            .write_all(out.as_bytes())
            .context("writing STDOUT")?,
    }
    Ok(())
}

fn scan(root: PathBuf) -> anyhow::Result<Vec<Record>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = crossbeam_channel::unbounded::<ScanMsg>();
    let scanner = Scanner::new(cancel);
    std::thread::spawn({
        let root = root.clone();
        move || scanner.scan(root, tx)
    });

    let mut errors = 0u64;
    while let Ok(msg) = rx.recv() {
        match msg {
            ScanMsg::Progress(p) => {
                tracing::debug!(
                    scanned = p.scanned,
                    bytes = %bytesize::ByteSize(p.bytes as u64),
                    "scanning"
                );
            }
            ScanMsg::Error(_) => errors += 1,
            ScanMsg::Done(records) => {
                let total: f64 = records.iter().map(|r| r.size).sum();
                tracing::info!(
                    files = records.len(),
                    errors,
                    total = %bytesize::ByteSize(total as u64),
                    "scanned {}",
                    root.display()
                );
                return Ok(records);
            }
        }
    }
    bail!("scan of {} ended without a result", root.display())
}
