use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, DebouncedEvent};
use propscope_watch::{SyncManager, VaultEvent, VaultEventKind};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Raw FS debounce window. Coarse burst suppression only; the
/// per-document debounce lives in the manager's schedule guard.
const FS_DEBOUNCE: Duration = Duration::from_millis(100);

pub async fn execute(manager: SyncManager, vault_root: &Path) -> Result<()> {
    let root = vault_root
        .canonicalize()
        .with_context(|| format!("cannot resolve vault root {}", vault_root.display()))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<VaultEvent>();

    let callback_root = root.clone();
    let mut debouncer = new_debouncer(FS_DEBOUNCE, None, move |result: DebounceEventResult| {
        match result {
            Ok(events) => {
                for event in events {
                    for vault_event in convert_event(&callback_root, &event) {
                        if tx.send(vault_event).is_err() {
                            return;
                        }
                    }
                }
            }
            Err(errors) => {
                for err in errors {
                    error!("watch error: {:?}", err);
                }
            }
        }
    })
    .context("cannot create file watcher")?;

    debouncer
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("cannot watch {}", root.display()))?;

    println!(
        "{} Watching {} (Ctrl-C to stop)",
        "Watch:".green().bold(),
        root.display()
    );

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => manager.handle_event(event).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping.");
                break;
            }
        }
    }

    manager.shutdown();
    Ok(())
}

/// Translate a raw FS event into vault lifecycle events. Non-markdown
/// paths, hidden paths and paths outside the vault are dropped.
fn convert_event(root: &Path, event: &DebouncedEvent) -> Vec<VaultEvent> {
    let kind = match event.event.kind {
        EventKind::Create(_) => VaultEventKind::Created,
        EventKind::Modify(_) => VaultEventKind::Modified,
        _ => return Vec::new(),
    };

    event
        .event
        .paths
        .iter()
        .filter_map(|path| {
            let relative = vault_relative(root, path)?;
            debug!("fs event {:?} for {}", kind, relative.display());
            Some(VaultEvent::new(kind, relative))
        })
        .collect()
}

fn vault_relative(root: &Path, path: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(root).ok()?;
    let hidden = relative
        .components()
        .any(|part| part.as_os_str().to_string_lossy().starts_with('.'));
    if hidden {
        return None;
    }
    let markdown = relative
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    markdown.then(|| relative.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_markdown_path_is_accepted() {
        let root = Path::new("/vault");
        assert_eq!(
            vault_relative(root, Path::new("/vault/index/a.md")),
            Some(PathBuf::from("index/a.md"))
        );
    }

    #[test]
    fn hidden_and_foreign_paths_are_dropped() {
        let root = Path::new("/vault");
        assert_eq!(vault_relative(root, Path::new("/vault/.propscope.yaml")), None);
        assert_eq!(vault_relative(root, Path::new("/vault/.trash/a.md")), None);
        assert_eq!(vault_relative(root, Path::new("/elsewhere/a.md")), None);
        assert_eq!(vault_relative(root, Path::new("/vault/image.png")), None);
    }
}
