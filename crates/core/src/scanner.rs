use crossbeam_channel::Sender;
use ignore::{WalkBuilder, WalkState};
use parking_lot::Mutex;
use std::path::{Component, Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::model::Record;
use crate::progress::Progress;

/// Progress messages are sent once per this many files.
const PROGRESS_EVERY: u64 = 256;

#[derive(Debug, Clone)]
pub enum ScanMsg {
    Progress(Progress),
    Error(String),
    /// One record per file: byte size, modification time (unix seconds) as heat.
    Done(Vec<Record>),
}

/// Walks a directory tree in parallel and turns every file into a [`Record`].
pub struct Scanner {
    cancel: Arc<AtomicBool>,
}

impl Scanner {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    pub fn scan(&self, root: PathBuf, tx: Sender<ScanMsg>) {
        let progress = Arc::new(Mutex::new(Progress::default()));
        let records: Arc<Mutex<Vec<Record>>> = Arc::new(Mutex::new(Vec::with_capacity(4096)));
        let label = root_label(&root);

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .threads(num_cpus::get());

        builder.build_parallel().run(|| {
            let cancel = self.cancel.clone();
            let tx = tx.clone();
            let progress = progress.clone();
            let records = records.clone();
            let root = root.clone();
            let label = label.clone();
            Box::new(move |entry| {
                if cancel.load(Ordering::Relaxed) {
                    return WalkState::Quit;
                }
                let ent = match entry {
                    Ok(ent) => ent,
                    Err(e) => {
                        tracing::warn!(error = %e, "scan error");
                        let _ = tx.send(ScanMsg::Error(e.to_string()));
                        return WalkState::Continue;
                    }
                };
                if !ent.file_type().is_some_and(|ft| ft.is_file()) {
                    return WalkState::Continue;
                }
                let md = match ent.metadata() {
                    Ok(md) => md,
                    Err(e) => {
                        tracing::warn!(error = %e, path = %ent.path().display(), "no metadata");
                        let _ = tx.send(ScanMsg::Error(e.to_string()));
                        return WalkState::Continue;
                    }
                };
                let mut record = Record::new(record_path(&label, &root, ent.path()), md.len() as f64);
                if let Ok(modified) = md.modified() {
                    let modified: chrono::DateTime<chrono::Utc> = modified.into();
                    record.heat = Some(modified.timestamp() as f64);
                }

                let snapshot = {
                    let mut p = progress.lock();
                    p.scanned += 1;
                    p.bytes = p.bytes.saturating_add(record.size as u128);
                    (p.scanned % PROGRESS_EVERY == 0).then_some(*p)
                };
                if let Some(p) = snapshot {
                    let _ = tx.send(ScanMsg::Progress(p));
                }
                records.lock().push(record);
                WalkState::Continue
            })
        });

        let _ = tx.send(ScanMsg::Progress(*progress.lock()));
        let records = std::mem::take(&mut *records.lock());
        tracing::info!(files = records.len(), root = %root.display(), "scan finished");
        let _ = tx.send(ScanMsg::Done(records));
    }
}

fn root_label(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

/// `label/a/b` for `root/a/b`, always `/`-delimited.
fn record_path(label: &str, root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut out = label.to_string();
    for c in rel.components() {
        if let Component::Normal(part) = c {
            out.push('/');
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}
