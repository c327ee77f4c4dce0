//! CLI tool to replay a directory of captured frames through the full
//! telemetry pipeline.
//! Usage: cargo run --features cli --bin analyze_session -- <frames_dir> [data_dir]
//!
//! Frame filenames carry the capture time as a trailing `_<seconds>`
//! before the extension, e.g. `frame_12.5.png`.

use std::path::{Path, PathBuf};

use arena_telemetry::{load_mask_bitmap, AnalyzerConfig, FrameAnalyzer, Session, TemplateLibrary};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena_telemetry=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <frames_dir> [data_dir]", args[0]);
        std::process::exit(1);
    }
    let frames_dir = PathBuf::from(&args[1]);
    let data_dir = if args.len() >= 3 {
        PathBuf::from(&args[2])
    } else {
        PathBuf::from("./data")
    };

    let templates = TemplateLibrary::load(&data_dir).expect("Failed to load digit templates");
    let mask = load_mask_bitmap(&data_dir);
    let config = AnalyzerConfig::load(&data_dir).expect("Failed to load analyzer config");
    let analyzer =
        FrameAnalyzer::new(templates, mask.as_ref(), config).expect("Failed to build analyzer");
    let mut session = Session::new(analyzer);

    let mut frames = collect_frames(&frames_dir);
    frames.sort_by_key(|(ts, _)| *ts);
    println!(
        "Processing {} frame(s) from {}",
        frames.len(),
        frames_dir.display()
    );

    for (ts, path) in &frames {
        let img = image::open(path)
            .unwrap_or_else(|e| panic!("Failed to open {}: {}", path.display(), e))
            .to_rgba8();
        let status = session.process_frame(&img, *ts);
        println!(
            "ts={}ms money={} spells={:?} skills={:?} units={} joystick={}",
            status.ts,
            status.money,
            status.spell_cds,
            status.skill_cds,
            status.units.len(),
            status
                .joystick_angle
                .map_or_else(|| "undetected".to_string(), |a| format!("{:.1}", a)),
        );
    }

    if let Some((mean, std_dev)) = session.axis_stats() {
        println!(
            "Joystick to axis distance: mean {:.2}, std dev {:.2}",
            mean, std_dev
        );
    }

    let json = serde_json::to_string_pretty(session.log().frames())
        .expect("Failed to serialize status log");
    println!("{}", json);
}

/// Collect `(timestamp_ms, path)` for every frame image in the
/// directory; frames without a parseable timestamp are skipped.
fn collect_frames(dir: &Path) -> Vec<(i64, PathBuf)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Failed to read {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    };

    let mut frames = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().map_or(false, |ext| ext == "png") {
            continue;
        }
        match timestamp_from_filename(&path) {
            Some(ts) => frames.push((ts, path)),
            None => eprintln!(
                "Skipping {}: no trailing _<seconds> timestamp",
                path.display()
            ),
        }
    }
    frames
}

/// Parse the capture timestamp from a `..._<seconds>.png` filename into
/// milliseconds.
fn timestamp_from_filename(path: &Path) -> Option<i64> {
    let stem = path.file_stem()?.to_str()?;
    let seconds: f64 = stem.rsplit('_').next()?.parse().ok()?;
    Some((seconds * 1000.0) as i64)
}
