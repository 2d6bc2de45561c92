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

//! A transport reading local files on a pool of worker threads.

use super::decode_data_uri;
use crossbeam_channel::Sender;
use porter_core::fetch::{is_absolute_url, FetchError, FetchRequest, Fetcher, SettlementSender};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Instant;

struct FetchJob {
    request: FetchRequest,
    settle: SettlementSender,
}

/// Reads item URLs as paths relative to a root directory.
///
/// `fetch` only queues the request; one of the worker threads reads the file
/// and settles it. `data:` URIs are decoded on the workers too. Remote schemes
/// settle as [`FetchError::Unsupported`].
///
/// Dropping the fetcher closes the queue and joins the workers once they have
/// drained it.
pub struct FileSystemFetcher {
    root: PathBuf,
    jobs: Option<Sender<FetchJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl FileSystemFetcher {
    /// Starts `workers` threads (at least one) reading below `root`.
    pub fn new(root: impl AsRef<Path>, workers: usize) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<FetchJob>();

        let mut handles = Vec::new();
        for index in 0..workers.max(1) {
            let job_rx = job_rx.clone();
            let root = root.clone();
            let handle = std::thread::Builder::new()
                .name(format!("porter-fetch-{}", index))
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        let outcome = read_request(&root, &job.request);
                        job.settle.settle(outcome);
                    }
                })?;
            handles.push(handle);
        }

        log::debug!(
            "FileSystemFetcher started {} worker(s) at '{}'.",
            handles.len(),
            root.display()
        );
        Ok(Self {
            root,
            jobs: Some(job_tx),
            workers: handles,
        })
    }

    /// The directory relative URLs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Fetcher for FileSystemFetcher {
    fn fetch(&mut self, request: FetchRequest, settle: SettlementSender) {
        let Some(jobs) = &self.jobs else {
            settle.fail(FetchError::Dropped);
            return;
        };
        // A failed send hands the job back; dropping it settles as `Dropped`.
        if let Err(err) = jobs.send(FetchJob { request, settle }) {
            log::error!("Fetch worker pool is gone, dropping '{}'.", err.0.request.url);
        }
    }
}

impl Drop for FileSystemFetcher {
    fn drop(&mut self) {
        self.jobs = None;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("A fetch worker panicked.");
            }
        }
    }
}

fn read_request(root: &Path, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
    let url = request.url.as_str();
    if url.starts_with("data:") {
        return decode_data_uri(url);
    }
    if is_absolute_url(url) {
        return Err(FetchError::Unsupported(url.to_string()));
    }

    let started = Instant::now();
    let path = root.join(url.strip_prefix("file://").unwrap_or(url));
    let bytes = std::fs::read(&path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => FetchError::NotFound(url.to_string()),
        _ => FetchError::Io {
            url: url.to_string(),
            source,
        },
    })?;

    if let Some(timeout) = request.settings.timeout() {
        if started.elapsed() > timeout {
            return Err(FetchError::TimedOut {
                url: url.to_string(),
                timeout_ms: request.settings.timeout_ms.unwrap_or_default(),
            });
        }
    }
    log::trace!("Read {} byte(s) from '{}'.", bytes.len(), path.display());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use porter_core::fetch::{CycleToken, FetchSettings, Settlement};
    use porter_core::item::{FileType, ItemId};
    use std::time::Duration;

    fn submit(fetcher: &mut FileSystemFetcher, id: u64, url: &str, tx: &flume::Sender<Settlement>) {
        let item = ItemId::from_raw(id);
        fetcher.fetch(
            FetchRequest {
                item,
                key: url.into(),
                file_type: FileType::Binary,
                url: url.into(),
                settings: FetchSettings::default(),
                cross_origin: None,
            },
            SettlementSender::new(item, CycleToken::default(), tx.clone()),
        );
    }

    #[test]
    fn test_reads_files_below_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/a.bin"), [1u8, 2, 3]).unwrap();

        let (tx, rx) = flume::unbounded();
        let mut fetcher = FileSystemFetcher::new(dir.path(), 2).unwrap();
        submit(&mut fetcher, 1, "data/a.bin", &tx);
        submit(&mut fetcher, 2, "data/missing.bin", &tx);
        submit(&mut fetcher, 3, "https://cdn.test/a.bin", &tx);

        let mut settled: Vec<Settlement> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        settled.sort_by_key(|s| s.item);

        assert_eq!(settled[0].outcome.as_ref().unwrap(), &vec![1u8, 2, 3]);
        assert!(matches!(settled[1].outcome, Err(FetchError::NotFound(_))));
        assert!(matches!(settled[2].outcome, Err(FetchError::Unsupported(_))));
    }

    #[test]
    fn test_drop_joins_workers_after_draining() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = flume::unbounded();
        {
            let mut fetcher = FileSystemFetcher::new(dir.path(), 1).unwrap();
            submit(&mut fetcher, 1, "data:,x", &tx);
        }
        assert_eq!(rx.try_recv().unwrap().outcome.unwrap(), b"x");
    }
}
