//! The `inspect` command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use mosaic_model::ModelStore;
use mosaic_vecstore::{Match, MemoryIndex, Metric, VecIndex};
use serde_json::{Value, json};

use crate::Cli;

/// Print a model summary and, for one window, its nearest neighbours.
#[derive(Args)]
pub struct InspectCommand {
    /// Model file
    #[arg(short, long)]
    model: PathBuf,

    /// Window to query with its own feature row
    #[arg(long)]
    uid: Option<usize>,

    /// Neighbours to list
    #[arg(short, default_value_t = 5)]
    k: usize,

    /// Use cosine instead of euclidean distance
    #[arg(long)]
    cosine: bool,
}

impl InspectCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let store = ModelStore::load(&self.model)
            .with_context(|| format!("load model {}", self.model.display()))?;

        let mut out = summary(&store, cli.verbose);
        if let Some(uid) = self.uid {
            let metric = if self.cosine { Metric::Cosine } else { Metric::Euclidean };
            let matches = neighbours(&store, uid, self.k, metric)?;
            out["neighbours"] = Value::Array(
                matches
                    .iter()
                    .map(|m| describe(&store, m))
                    .collect(),
            );
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        Ok(())
    }
}

fn summary(store: &ModelStore, files_detail: bool) -> Value {
    let mut out = json!({
        "points": store.num_points(),
        "coeffs": store.num_coeffs(),
        "files": store.files().len(),
    });
    if files_detail {
        out["file_names"] = json!(store.files().names());
    }
    out
}

fn neighbours(store: &ModelStore, uid: usize, k: usize, metric: Metric) -> anyhow::Result<Vec<Match>> {
    let query = store
        .features(uid)
        .with_context(|| format!("uid {uid} out of range (model has {} windows)", store.num_points()))?;

    let ids: Vec<usize> = store.windows().iter().map(|w| w.uid()).collect();
    let rows: Vec<&[f32]> = store.matrix().rows().collect();
    let mut index = MemoryIndex::new(metric);
    index.train(&ids, &rows)?;
    Ok(index.search(query, k)?)
}

fn describe(store: &ModelStore, m: &Match) -> Value {
    let window = store.window(m.id);
    json!({
        "uid": m.id,
        "file": window.and_then(|w| store.file_name(w)),
        "start": window.map(|w| w.start_time()),
        "distance": m.distance,
    })
}
