//! inkshape - command line front end
//!
//! Reads a JSON array of strokes (optionally gzip-compressed, the format the
//! whiteboard backups use), recognizes each one and prints the results as
//! JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flate2::read::GzDecoder;
use inkshape::{RecognizedShape, RecognizerConfig, ShapeRecognizer, Strategy, Stroke};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "inkshape", version, about = "Recognize shapes in freehand strokes")]
struct Cli {
    /// JSON file holding an array of strokes
    input: PathBuf,

    /// Recognizer to use; overrides the configuration file
    #[arg(long, value_enum)]
    strategy: Option<CliStrategy>,

    /// Strokes whose bounding-box diagonal is below this are left alone
    #[arg(long, default_value_t = 10.0)]
    min_size: f64,

    /// Input is gzip-compressed (implied by a .gz extension)
    #[arg(long)]
    gzip: bool,

    /// JSON recognizer configuration; missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliStrategy {
    Inertia,
    Segment,
}

impl From<CliStrategy> for Strategy {
    fn from(strategy: CliStrategy) -> Self {
        match strategy {
            CliStrategy::Inertia => Strategy::Inertia,
            CliStrategy::Segment => Strategy::Segment,
        }
    }
}

/// Result for one input stroke
#[derive(Serialize)]
struct StrokeResult {
    stroke_id: String,
    shape: Option<RecognizedShape>,
}

fn load_config(path: Option<&Path>) -> Result<RecognizerConfig> {
    let Some(path) = path else {
        return Ok(RecognizerConfig::default());
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open config {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

fn load_strokes(path: &Path, gzip: bool) -> Result<Vec<Stroke>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let is_gzip = gzip || path.extension().is_some_and(|ext| ext == "gz");

    let mut json = String::new();
    if is_gzip {
        GzDecoder::new(file)
            .read_to_string(&mut json)
            .context("Failed to decompress strokes")?;
    } else {
        BufReader::new(file)
            .read_to_string(&mut json)
            .context("Failed to read strokes")?;
    }

    serde_json::from_str(&json).context("Failed to deserialize strokes")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy.into();
    }
    let strokes = load_strokes(&cli.input, cli.gzip)?;
    log::info!(
        "Loaded {} strokes from {}, strategy {:?}",
        strokes.len(),
        cli.input.display(),
        config.strategy
    );

    let recognizer = ShapeRecognizer::new(config);
    let mut results = Vec::with_capacity(strokes.len());
    for stroke in &strokes {
        let shape = recognizer
            .recognize(stroke, cli.min_size)
            .with_context(|| format!("Stroke {} is invalid", stroke.id))?;
        results.push(StrokeResult {
            stroke_id: stroke.id.clone(),
            shape,
        });
    }

    let recognized = results.iter().filter(|r| r.shape.is_some()).count();
    log::info!("Recognized {} of {} strokes", recognized, results.len());

    let output = if cli.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("inkshape-{}-{}", uuid::Uuid::new_v4(), name))
    }

    const STROKES: &str = r##"[{"id":"s1","points":[{"x":0,"y":0},{"x":50,"y":0},{"x":100,"y":0}],"color":"#000000","width":2.0,"tool":"pen"}]"##;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "inkshape",
            "--strategy",
            "segment",
            "--min-size",
            "4.5",
            "strokes.json",
        ]);
        assert!(matches!(cli.strategy, Some(CliStrategy::Segment)));
        assert_eq!(cli.min_size, 4.5);
        assert!(!cli.gzip);
        assert_eq!(cli.input, PathBuf::from("strokes.json"));
    }

    #[test]
    fn test_load_plain_strokes() {
        let path = temp_path("strokes.json");
        std::fs::write(&path, STROKES).unwrap();
        let strokes = load_strokes(&path, false).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].id, "s1");
        assert_eq!(strokes[0].points.len(), 3);
    }

    #[test]
    fn test_load_gzip_strokes_by_extension() {
        let path = temp_path("strokes.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(STROKES.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let strokes = load_strokes(&path, false).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(strokes[0].points[2].x, 100.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_strokes(Path::new("/nonexistent/strokes.json"), false).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_default_config_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.strategy, Strategy::Inertia);
    }
}
