//! annodiff - inspect and diff per-frame detection annotation files

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use annodiff::{AnnotationStore, ComparisonRow, ComparisonSummary, FrameRecord};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output format.
    #[arg(long, value_enum, env = "ANNODIFF_FORMAT", default_value = "table", global = true)]
    format: Format,
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the distinct labels found in one or more annotation files.
    Labels {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the detections recorded for one frame.
    Frame {
        file: PathBuf,
        frame: u32,
        /// Pixel width of the decoded video frame, for box projection.
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Pixel height of the decoded video frame, for box projection.
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },
    /// Diff confidences of the selected labels between two annotation files.
    Compare {
        baseline: PathBuf,
        candidate: PathBuf,
        /// Label to compare; repeat for several.
        #[arg(long = "label", short = 'l')]
        labels: Vec<String>,
    },
}

fn load(path: &PathBuf) -> Result<AnnotationStore> {
    let store = AnnotationStore::load(path).with_context(|| format!("loading {:?}", path))?;
    let stats = store.stats();
    log::info!(
        "{:?}: {} frames, {} detections ({} malformed lines skipped)",
        path,
        stats.frames,
        stats.detections,
        stats.malformed
    );

    Ok(store)
}

fn render_labels(counts: &BTreeMap<String, usize>, format: Format) -> Result<String> {
    if format == Format::Json {
        return Ok(serde_json::to_string_pretty(counts)?);
    }

    let mut out = String::new();
    for (label, count) in counts {
        writeln!(out, "{:<24} {}", label, count)?;
    }

    Ok(out)
}

/// `pixels` is the decoded frame size; overlays are only produced when set.
fn render_frame(record: &FrameRecord, pixels: Option<(u32, u32)>, format: Format) -> Result<String> {
    let overlays = pixels.map(|(w, h)| record.overlays(w, h));

    if format == Format::Json {
        let doc = serde_json::json!({ "frame": record, "overlays": overlays });
        return Ok(serde_json::to_string_pretty(&doc)?);
    }

    let mut out = String::new();
    writeln!(
        out,
        "frame {} ({}x{}), {} detections",
        record.frame_number,
        record.size.0,
        record.size.1,
        record.len()
    )?;
    for det in record.iter() {
        let [l, t, r, b] = *det.bbox().as_slice();
        writeln!(
            out,
            "  {:<16} id={:<4} conf={:.2} box=[{:.4}, {:.4}, {:.4}, {:.4}]",
            det.label, det.id, det.confidence, l, t, r, b
        )?;
    }
    for overlay in overlays.iter().flatten() {
        let r = overlay.bounds.as_ltwh();
        writeln!(
            out,
            "  {:<22} x={:.0} y={:.0} w={:.0} h={:.0}",
            overlay.caption,
            r.left(),
            r.top(),
            r.width(),
            r.height()
        )?;
    }

    Ok(out)
}

fn render_comparison(rows: &[ComparisonRow], format: Format) -> Result<String> {
    let summary = ComparisonSummary::from_rows(rows);

    if format == Format::Json {
        let doc = serde_json::json!({ "rows": rows, "summary": summary });
        return Ok(serde_json::to_string_pretty(&doc)?);
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:>8} {:<16} {:>8} {:>8} {:>8}  change",
        "frame", "label", "file 1", "file 2", "delta"
    )?;
    for row in rows {
        let [frame, label, conf_a, conf_b, delta] = row.cells();
        writeln!(
            out,
            "{:>8} {:<16} {:>8} {:>8} {:>8}  {}",
            frame, label, conf_a, conf_b, delta, row.change
        )?;
    }
    writeln!(
        out,
        "{} rows over {} frames: {} improved, {} regressed, {} unchanged, {} added, {} removed",
        summary.rows,
        summary.frames,
        summary.improved,
        summary.regressed,
        summary.unchanged,
        summary.added,
        summary.removed
    )?;

    Ok(out)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let out = match args.command {
        Command::Labels { files } => {
            let stores = files.iter().map(load).collect::<Result<Vec<_>>>()?;
            render_labels(&annodiff::label_counts(&stores), args.format)?
        }
        Command::Frame {
            file,
            frame,
            width,
            height,
        } => {
            let store = load(&file)?;
            let Some(record) = store.get(frame) else {
                log::warn!("frame {} has no annotations", frame);
                return Ok(());
            };
            render_frame(record, width.zip(height), args.format)?
        }
        Command::Compare {
            baseline,
            candidate,
            labels,
        } => {
            let a = load(&baseline)?;
            let b = load(&candidate)?;
            render_comparison(&annodiff::compare(&a, &b, &labels)?, args.format)?
        }
    };

    print!("{}", out);

    Ok(())
}
