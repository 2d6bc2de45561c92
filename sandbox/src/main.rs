// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Loads a RON manifest from disk and prints what each registry received.
//!
//! Usage: cargo run -p sandbox -- sandbox/assets/pack.ron

use anyhow::{bail, Context, Result};
use clap::Parser;
use porter_agents::loader_agent::LoaderAgent;
use porter_core::event::CycleCompleted;
use porter_core::LoaderConfig;
use porter_lanes::asset_lane::fetch::FileSystemFetcher;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sandbox")]
#[command(about = "Run one porter load cycle over a manifest")]
struct Cli {
    /// The RON manifest to load.
    manifest: PathBuf,
    /// Directory URLs are resolved against. Defaults to the manifest's directory.
    #[arg(long)]
    root: Option<PathBuf>,
    /// RON loader config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of fetch worker threads.
    #[arg(long, default_value_t = 4)]
    workers: usize,
    /// Give up if no fetch settles for this long.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => cli
            .manifest
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default(),
    };
    let fetcher = FileSystemFetcher::new(&root, cli.workers)
        .with_context(|| format!("Failed to start fetch workers at '{}'", root.display()))?;

    let mut agent = match &cli.config {
        Some(path) => LoaderAgent::from_config_file(path, fetcher)?,
        None => LoaderAgent::new(LoaderConfig::default(), fetcher),
    };

    let summary: Arc<Mutex<Option<CycleCompleted>>> = Arc::default();
    let sink = summary.clone();
    agent.on_complete(move |event| {
        if let Ok(mut slot) = sink.lock() {
            *slot = Some(*event);
        }
    });

    let report = agent.enqueue_manifest_file(&cli.manifest)?;
    log::info!(
        "Queued {} entries from '{}' ({} dropped).",
        report.queued,
        cli.manifest.display(),
        report.dropped
    );

    agent.start()?;
    if !agent.wait(Duration::from_millis(cli.timeout_ms)) {
        bail!("Load cycle stalled with {} fetch(es) in flight", agent.progress().in_flight);
    }

    let completed = summary
        .lock()
        .ok()
        .and_then(|slot| *slot)
        .context("Cycle finished without a completion event")?;

    println!("Cycle {} finished in state {}.", completed.cycle.raw(), agent.state());
    println!("  succeeded: {}", completed.succeeded);
    println!("  failed:    {}", completed.failed);
    for item in agent.lane().failed() {
        println!("    - {}", item.item_key());
    }

    let textures = agent.textures();
    println!("Textures ({}):", textures.len());
    for key in textures.keys() {
        if let Some(texture) = textures.get(key) {
            println!("  {} [{} page(s), {} frame(s)]", key, texture.sources.len(), texture.frame_count());
        }
    }

    let caches = agent.caches();
    println!("Caches ({} entries):", caches.len());
    let rows = [
        ("json", caches.json.keys().collect::<Vec<_>>()),
        ("xml", caches.xml.keys().collect()),
        ("text", caches.text.keys().collect()),
        ("binary", caches.binary.keys().collect()),
        ("audio", caches.audio.keys().collect()),
        ("shader", caches.shader.keys().collect()),
        ("tilemap", caches.tilemap.keys().collect()),
        ("bitmap font", caches.bitmap_font.keys().collect()),
    ];
    for (name, keys) in rows.iter().filter(|(_, keys)| !keys.is_empty()) {
        println!("  {}: {}", name, keys.join(", "));
    }

    println!("Animations: {}", agent.animations().len());
    Ok(())
}
