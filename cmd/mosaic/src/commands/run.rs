//! The `run` command: match frames, play, optionally record and render.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use mosaic_audio::{AudioSink, FanoutSink, LogSink, Renderer, Score, ScoreSink};
use mosaic_engine::{
    ChannelSource, EngineConfig, FrameSource, LoopStats, RetrievalLoop, Selection, VecSource,
};
use mosaic_model::ModelStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::frames::{load_frames, parse_frame};
use crate::Cli;

/// Buffered live frames before the reader waits on the engine.
const LIVE_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SelectionArg {
    Random,
    Nearest,
}

impl From<SelectionArg> for Selection {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::Random => Selection::Random,
            SelectionArg::Nearest => Selection::Nearest,
        }
    }
}

/// Match analyzer frames against a model and play the nearest windows.
///
/// With `--frames` the whole file is processed on a virtual clock and
/// finishes as fast as possible. With `--stdin` frames are read live and
/// the loop follows the wall clock until stdin closes.
#[derive(Args)]
pub struct RunCommand {
    /// Model file
    #[arg(short, long)]
    model: PathBuf,

    /// Analyzer frames, one whitespace separated vector per line
    #[arg(long, conflicts_with = "stdin", required_unless_present = "stdin")]
    frames: Option<PathBuf>,

    /// Read frames live from stdin
    #[arg(long)]
    stdin: bool,

    /// Engine config file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the played score as JSON lines
    #[arg(long)]
    score: Option<PathBuf>,

    /// Render the score to a stereo WAV file
    #[arg(long, requires = "sources")]
    render: Option<PathBuf>,

    /// Directory holding the source WAV files named in the model
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Neighbours per search
    #[arg(short)]
    k: Option<usize>,

    /// Voice pool size
    #[arg(long)]
    voices: Option<usize>,

    /// Candidate selection policy
    #[arg(long, value_enum)]
    selection: Option<SelectionArg>,

    /// Seed for pans and random selection
    #[arg(long)]
    seed: Option<u64>,
}

impl RunCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = self.engine_config()?;
        let store = ModelStore::load(&self.model)
            .with_context(|| format!("load model {}", self.model.display()))?;
        let files = store.files().names().to_vec();
        let sample_rate = config.sample_rate;

        let (stats, score) = match &self.frames {
            Some(path) => {
                let frames = load_frames(path)?;
                let dims = frames.first().map_or(0, Vec::len);
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .start_paused(true)
                    .build()?;
                runtime.block_on(async {
                    let mut source = VecSource::new(dims, frames);
                    play(store, config, &mut source).await
                })?
            }
            None => {
                let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
                runtime.block_on(async {
                    let mut source = stdin_source().await?;
                    play(store, config, &mut source).await
                })?
            }
        };

        if let Some(path) = &self.score {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            score.write_jsonl(BufWriter::new(file))?;
            info!(path = %path.display(), events = score.events().len(), "score written");
        }

        if let (Some(out), Some(dir)) = (&self.render, &self.sources) {
            let mut renderer = Renderer::new(sample_rate);
            for name in &files {
                let path = dir.join(name);
                if let Err(e) = renderer.load_wav(name.as_str(), &path) {
                    warn!(source = %path.display(), error = %e, "source unavailable, rendering silence");
                }
            }
            let frames = renderer
                .render_to_wav(&score, out)
                .with_context(|| format!("render {}", out.display()))?;
            info!(path = %out.display(), frames, "render written");
        }

        let mut summary = serde_json::json!({
            "cycles": stats.cycles,
            "triggers": stats.triggers,
            "stolen": stats.stolen,
        });
        if cli.verbose {
            summary["notes"] = serde_json::to_value(score.notes().len())?;
        }
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(voices) = self.voices {
            config.voices = voices;
        }
        if let Some(selection) = self.selection {
            config.selection = selection.into();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

async fn play(
    store: ModelStore,
    config: EngineConfig,
    source: &mut dyn FrameSource,
) -> anyhow::Result<(LoopStats, Score)> {
    let recorder = Arc::new(ScoreSink::new());
    let sink: Arc<dyn AudioSink> = Arc::new(
        FanoutSink::new()
            .with(recorder.clone())
            .with(Arc::new(LogSink)),
    );
    let mut engine = RetrievalLoop::build(store, config, sink)?;
    let stats = engine.run(source).await?;
    Ok((stats, recorder.score()))
}

/// Reads frames from stdin on a background task. The first frame fixes
/// the dimensionality; later malformed lines are logged and skipped.
async fn stdin_source() -> anyhow::Result<ChannelSource> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0;
    let first = loop {
        let Some(line) = lines.next_line().await? else {
            bail!("stdin closed before the first frame");
        };
        line_no += 1;
        if let Some(frame) = parse_frame(&line, line_no)? {
            break frame;
        }
    };

    let (tx, source) = ChannelSource::channel(first.len(), LIVE_BUFFER);
    tx.send(first).await?;
    tokio::spawn(async move {
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            };
            line_no += 1;
            match parse_frame(&line, line_no) {
                Ok(Some(frame)) => {
                    if tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{e:#}, frame skipped"),
            }
        }
    });
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunCommand,
    }

    fn parse(args: &[&str]) -> Result<RunCommand, clap::Error> {
        let argv = std::iter::once("mosaic").chain(args.iter().copied());
        TestCli::try_parse_from(argv).map(|c| c.run)
    }

    #[test]
    fn test_requires_an_input() {
        assert!(parse(&["--model", "m.txt"]).is_err());
        assert!(parse(&["--model", "m.txt", "--stdin", "--frames", "f.txt"]).is_err());
        assert!(parse(&["--model", "m.txt", "--stdin"]).is_ok());
    }

    #[test]
    fn test_render_requires_sources() {
        assert!(parse(&["-m", "m.txt", "--frames", "f.txt", "--render", "out.wav"]).is_err());
        assert!(
            parse(&["-m", "m.txt", "--frames", "f.txt", "--render", "o.wav", "--sources", "."])
                .is_ok()
        );
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "k: 3\nvoices: 8\nselection: random").unwrap();
        let path = file.path().to_str().unwrap();

        let cmd = parse(&[
            "-m", "m.txt", "--frames", "f.txt", "-c", path, "-k", "5", "--selection", "nearest",
            "--seed", "11",
        ])
        .unwrap();
        let config = cmd.engine_config().unwrap();
        assert_eq!(config.k, 5);
        assert_eq!(config.voices, 8);
        assert_eq!(config.selection, Selection::Nearest);
        assert_eq!(config.seed, Some(11));
    }
}
