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

use anyhow::Result;
use porter_agents::loader_agent::{LoadManifest, LoaderAgent, ManifestReport};
use porter_core::asset::{AudioData, SpriteSheetConfig};
use porter_core::event::CycleCompleted;
use porter_core::registry::TextureRegistry;
use porter_core::item::FileType;
use porter_core::{LoaderConfig, LoaderError, LoaderState};
use porter_lanes::asset_lane::fetch::{FileSystemFetcher, MemoryFetcher};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

// --- Test Setup: fixture bytes ---

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::new(width, height);
    let mut bytes = std::io::Cursor::new(Vec::new());
    image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

// 16-bit mono 44.1 kHz, four samples.
const WAV: &[u8] = &[
    82, 73, 70, 70, 52, 0, 0, 0, 87, 65, 86, 69, 102, 109, 116, 32, 16, 0, 0, 0, 1, 0, 1, 0, 68,
    172, 0, 0, 136, 88, 1, 0, 2, 0, 16, 0, 100, 97, 116, 97, 8, 0, 0, 0, 0, 12, 204, 251, 51, 13,
    205, 243,
];

const FONT_XML: &str = r#"<?xml version="1.0"?>
<font>
  <info face="Mono" size="16"/>
  <common lineHeight="18" base="14"/>
  <chars count="1"><char id="65" x="0" y="0" width="8" height="12" xadvance="9"/></chars>
</font>"#;

fn record_completions(agent: &mut LoaderAgent) -> Arc<Mutex<Vec<CycleCompleted>>> {
    let log: Arc<Mutex<Vec<CycleCompleted>>> = Arc::default();
    let sink = log.clone();
    agent.on_complete(move |e| sink.lock().unwrap().push(*e));
    log
}

// ---

#[test]
fn test_manifest_from_disk_over_the_filesystem() -> Result<()> {
    // --- 1. Setup: real files on disk ---
    let dir = tempdir()?;
    let assets = dir.path().join("assets");
    std::fs::create_dir(&assets)?;
    std::fs::write(assets.join("logo.png"), png(16, 8))?;
    std::fs::write(assets.join("ui.png"), png(32, 32))?;
    std::fs::write(
        assets.join("ui.json"),
        r#"{"frames": {"button": {"frame": {"x": 0, "y": 0, "w": 16, "h": 8}}}}"#,
    )?;
    std::fs::write(assets.join("mono.png"), png(64, 64))?;
    std::fs::write(assets.join("mono.xml"), FONT_XML)?;
    std::fs::write(assets.join("blip.wav"), WAV)?;
    std::fs::write(assets.join("level.csv"), "0,1\n1,0")?;

    let manifest_path = dir.path().join("pack.ron");
    std::fs::write(
        &manifest_path,
        r#"(
            path: Some("assets"),
            files: [
                File(file_type: Image, key: "logo"),
                Pair(kind: AtlasJson, key: "ui"),
                Pair(kind: BitmapFont, key: "mono"),
                File(file_type: Audio, key: "blip", url: Some("blip.wav")),
                File(file_type: TilemapCsv, key: "level"),
                File(file_type: Text, url: Some("keyless.txt")),
                File(file_type: Json, key: "absent"),
            ],
        )"#,
    )?;

    // --- 2. Run one cycle ---
    let fetcher = FileSystemFetcher::new(dir.path(), 2)?;
    let mut agent = LoaderAgent::new(LoaderConfig::default(), fetcher);
    let completions = record_completions(&mut agent);

    let report = agent.enqueue_manifest_file(&manifest_path)?;
    assert_eq!(report, ManifestReport { queued: 6, dropped: 1 });
    agent.start()?;
    assert!(agent.wait(Duration::from_secs(10)), "cycle did not finish");

    // --- 3. Verify ---
    let done = completions.lock().unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!((done[0].succeeded, done[0].failed), (5, 1));
    assert_eq!(agent.state(), LoaderState::Complete);

    let textures = agent.textures();
    assert!(textures.contains("logo"));
    assert!(textures.get("ui").unwrap().frame("button").is_some());
    assert!(textures.contains("mono"));

    let caches = agent.caches();
    let font = caches.bitmap_font.get("mono").unwrap();
    assert_eq!(font.texture, "mono");
    assert_eq!(font.data.chars[&65].x_advance, 9);
    assert!(matches!(&**caches.audio.get("blip").unwrap(), AudioData::Pcm(s) if s.sample_rate == 44100));
    assert!(caches.tilemap.contains("level"));
    assert!(!caches.json.contains("absent"));
    Ok(())
}

#[test]
fn test_typed_helpers_over_memory() -> Result<()> {
    let fetcher = MemoryFetcher::new()
        .with("sheet.png", png(32, 16))
        .with("mega-0.png", png(8, 8))
        .with("mega-0.json", r#"{"frames": [{"filename": "a", "frame": {"x": 0, "y": 0, "w": 4, "h": 4}}]}"#)
        .with("mega-1.png", png(8, 8))
        .with("mega-1.json", r#"{"frames": [{"filename": "b", "frame": {"x": 4, "y": 4, "w": 4, "h": 4}}]}"#)
        .with("sfx.ogg", b"OggS-not-decoded".to_vec())
        .with("sfx.json", r#"{"spritemap": {"jump": {"start": 0, "end": 0.5}}}"#)
        .with("frag.glsl", "void main() {}")
        .with("walk.json", r#"[{"key": "walk", "frames": [{"key": "sheet", "frame": 0}, {"key": "sheet", "frame": 1}]}]"#);
    let mut agent = LoaderAgent::new(LoaderConfig::default(), fetcher);

    agent.spritesheet(
        "sheet",
        None,
        SpriteSheetConfig {
            frame_width: 16,
            frame_height: 16,
            ..Default::default()
        },
    )?;
    agent.multi_atlas("mega", &[("mega-0.png", "mega-0.json"), ("mega-1.png", "mega-1.json")])?;
    agent.audio_sprite("sfx", Some("sfx.ogg"), None)?;
    agent.glsl("frag", None)?;
    agent.animation("walk", None)?;

    agent.start()?;
    agent.update();

    assert_eq!(agent.state(), LoaderState::Complete);
    let sheet = agent.textures().get("sheet").unwrap();
    assert_eq!(sheet.frame_count(), 2);
    let mega = agent.textures().get("mega").unwrap();
    assert_eq!(mega.sources.len(), 2);
    assert_eq!(mega.frame("b").unwrap().source_index, 1);
    assert!(!agent.textures().contains("mega-0"));

    assert!(matches!(&**agent.caches().audio.get("sfx").unwrap(), AudioData::Encoded(_)));
    assert!(agent.caches().json.contains("sfx"));
    assert!(agent.caches().shader.contains("frag"));
    assert_eq!(agent.animations().get("walk").unwrap().frames.len(), 2);
    Ok(())
}

#[test]
fn test_rejected_multi_atlas_queues_none_of_its_pages() -> Result<()> {
    let fetcher = MemoryFetcher::new()
        .with("w0.png", png(8, 8))
        .with("w0.json", r#"{"frames": {}}"#)
        .with("settings.json", "{}");
    let mut agent = LoaderAgent::new(LoaderConfig::default(), fetcher.clone());
    agent.json("world-1", Some("settings.json"))?;

    let err = agent
        .multi_atlas("world", &[("w0.png", "w0.json"), ("w1.png", "w1.json")])
        .unwrap_err();
    assert!(matches!(err, LoaderError::DuplicateKey { ref key, file_type: FileType::Json } if key == "world-1"));
    assert_eq!(agent.progress().pending, 1);

    let manifest = LoadManifest::from_ron_str(
        r#"(files: [MultiAtlas(key: "world", pages: [("w0.png", "w0.json"), ("w1.png", "w1.json")])])"#,
    )?;
    assert_eq!(agent.enqueue_manifest(&manifest)?, ManifestReport { queued: 0, dropped: 1 });
    assert_eq!(agent.progress().pending, 1);

    agent.start()?;
    agent.update();
    assert_eq!(fetcher.requested(), vec!["settings.json"]);
    assert!(!agent.textures().contains("world-0"));
    assert!(!agent.textures().contains("world"));
    assert!(!agent.caches().json.contains("world-0"));
    assert!(agent.caches().json.contains("world-1"));
    Ok(())
}

#[test]
fn test_manifest_rejected_while_loading() -> Result<()> {
    let mut agent = LoaderAgent::new(LoaderConfig::default(), MemoryFetcher::new());
    agent.text("a", None)?;
    agent.start()?;
    assert!(agent.state().is_loading());

    let manifest = LoadManifest::from_ron_str(r#"(files: [File(file_type: Text, key: "b")])"#)?;
    assert!(agent.enqueue_manifest(&manifest).is_err());

    agent.update();
    assert_eq!(agent.state(), LoaderState::Failed);
    assert_eq!(agent.enqueue_manifest(&manifest)?.queued, 1);
    Ok(())
}

#[test]
fn test_config_file_and_duplicate_entries() -> Result<()> {
    let dir = tempdir()?;
    let config_path = dir.path().join("loader.ron");
    std::fs::write(&config_path, r#"(base_url: "mem://", max_parallel_downloads: 1)"#)?;

    let fetcher = MemoryFetcher::new().with("mem://a.txt", "alpha");
    let mut agent = LoaderAgent::from_config_file(&config_path, fetcher.clone())?;
    let manifest = LoadManifest::from_ron_str(
        r#"(files: [File(file_type: Text, key: "a"), File(file_type: Text, key: "a")])"#,
    )?;
    assert_eq!(agent.enqueue_manifest(&manifest)?, ManifestReport { queued: 1, dropped: 1 });

    agent.start()?;
    agent.update();
    assert_eq!(fetcher.requested(), vec!["mem://a.txt"]);
    assert_eq!(agent.caches().text.get("a").map(|t| t.as_str()), Some("alpha"));

    assert!(LoaderAgent::from_config_file(dir.path().join("nope.ron"), MemoryFetcher::new()).is_err());
    Ok(())
}
