use crate::clipboard::{ClipboardSink, ClipboardSource, ClipboardWatcher, SystemClipboard};
use crate::config::Config;
use crate::ipc::{ActionView, ItemView, Request, Response, Status};
use crate::manager::ClipboardManager;
use crate::query::{self, QueryContext};
use crate::snippets::{SnippetDir, SnippetSink};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// Long-running process tying the clipboard, the history and IPC together.
pub struct Daemon {
    manager: Arc<ClipboardManager>,
    source: Arc<dyn ClipboardSource>,
    sink: Arc<dyn ClipboardSink>,
    snippets: Option<Arc<dyn SnippetSink>>,
}

impl Daemon {
    pub fn new(
        manager: Arc<ClipboardManager>,
        source: Arc<dyn ClipboardSource>,
        sink: Arc<dyn ClipboardSink>,
        snippets: Option<Arc<dyn SnippetSink>>,
    ) -> Self {
        Self {
            manager,
            source,
            sink,
            snippets,
        }
    }

    /// Daemon on the system clipboard.
    pub fn from_config(config: Config, config_path: Option<PathBuf>) -> Result<Self> {
        let clipboard = Arc::new(SystemClipboard::new(config.paste_command.clone())?);
        let snippets = config
            .snippets_dir
            .clone()
            .map(|dir| Arc::new(SnippetDir::new(dir)) as Arc<dyn SnippetSink>);
        let manager = Arc::new(ClipboardManager::new(config, config_path));

        Ok(Self::new(manager, clipboard.clone(), clipboard, snippets))
    }

    pub fn manager(&self) -> &Arc<ClipboardManager> {
        &self.manager
    }

    pub fn query_context(&self) -> QueryContext {
        QueryContext {
            store: Arc::clone(self.manager.store()),
            clipboard: Arc::clone(&self.sink),
            snippets: self.snippets.as_ref().map(Arc::downgrade),
        }
    }

    pub fn handle(&self, request: Request) -> Response {
        let manager = &self.manager;

        match request {
            Request::Query { query } => {
                let items = query::items(&query, manager.match_config(), &self.query_context());
                Response::Items(
                    items
                        .into_iter()
                        .map(|item| ItemView {
                            rank: item.rank,
                            text: item.text,
                            subtitle: item.subtitle,
                            actions: item
                                .actions
                                .iter()
                                .map(|a| ActionView {
                                    id: a.id.to_string(),
                                    text: a.text.to_string(),
                                })
                                .collect(),
                        })
                        .collect(),
                )
            }
            Request::Run {
                query,
                rank,
                action,
            } => {
                let items = query::items(&query, manager.match_config(), &self.query_context());
                let Some(item) = items.iter().find(|i| i.rank == rank) else {
                    return Response::Error(format!("No result #{} for query {:?}", rank, query));
                };
                match item.action(&action) {
                    Some(a) => {
                        a.run();
                        Response::Done
                    }
                    None => Response::Error(format!("No action {:?} on result #{}", action, rank)),
                }
            }
            Request::Insert { text } => {
                manager.store().insert(&text);
                Response::Done
            }
            Request::Remove { text } => {
                let removed = manager.store().remove(&text);
                debug!("Removed {} entries", removed);
                Response::Done
            }
            Request::Clear => {
                manager.store().clear();
                Response::Done
            }
            Request::SetHistoryLimit { limit } => {
                manager.set_history_limit(limit);
                Response::Done
            }
            Request::SetPersistent { enabled } => {
                manager.set_store_history(enabled);
                Response::Done
            }
            Request::SetFuzzy { enabled } => {
                manager.set_fuzzy_matching(enabled);
                Response::Done
            }
            Request::Status => Response::Status(Status {
                entries: manager.store().len(),
                history_limit: manager.history_limit(),
                persistent: manager.store_history(),
                fuzzy: manager.fuzzy_matching(),
                history_file: manager.history_file(),
            }),
            Request::Exit => Response::Done,
        }
    }

    /// Polls the clipboard and serves requests until ctrl-c or an `Exit`
    /// request, then persists the history.
    pub async fn run(self: Arc<Self>, sock_path: PathBuf) -> Result<()> {
        let (exit_tx, mut exit_rx) = mpsc::channel::<()>(1);

        let listener = bind(&sock_path)?;
        info!("Listening on {}", sock_path.display());

        let server = {
            let daemon = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = serve(daemon, listener, exit_tx).await {
                    warn!("IPC server stopped: {:#}", e);
                }
            })
        };

        let config = self.manager.config();
        let mut watcher = ClipboardWatcher::new(config.max_entry_bytes());
        let mut interval = tokio::time::interval(Duration::from_millis(config.poll_interval_ms.max(10)));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if watcher.check(self.source.as_ref(), self.manager.store()) {
                        debug!("Recorded clipboard change, {} entries", self.manager.store().len());
                    }
                }
                Some(()) = exit_rx.recv() => {
                    info!("Exit requested");
                    break;
                }
                _ = signal::ctrl_c() => {
                    info!("Shutting down...");
                    break;
                }
            }
        }

        server.abort();
        let _ = std::fs::remove_file(&sock_path);
        self.manager.shutdown();

        Ok(())
    }
}

#[cfg(unix)]
type Listener = tokio::net::UnixListener;

#[cfg(not(unix))]
type Listener = ();

/// Binds the IPC socket, replacing a stale socket file but refusing to
/// take over one a running daemon still answers on.
#[cfg(unix)]
fn bind(sock_path: &Path) -> Result<Listener> {
    use std::os::unix::fs::PermissionsExt;

    if sock_path.exists() {
        if std::os::unix::net::UnixStream::connect(sock_path).is_ok() {
            anyhow::bail!("Another daemon is already listening on {}", sock_path.display());
        }
        std::fs::remove_file(sock_path)
            .with_context(|| format!("Failed to remove stale socket {}", sock_path.display()))?;
    }

    let listener = Listener::bind(sock_path)
        .with_context(|| format!("Failed to bind {}", sock_path.display()))?;
    std::fs::set_permissions(sock_path, std::fs::Permissions::from_mode(0o700))?;
    Ok(listener)
}

#[cfg(not(unix))]
fn bind(_sock_path: &Path) -> Result<Listener> {
    Ok(())
}

#[cfg(unix)]
async fn serve(daemon: Arc<Daemon>, listener: Listener, exit_tx: mpsc::Sender<()>) -> Result<()> {
    use crate::ipc::{read_message, write_message};

    loop {
        let (mut stream, _addr) = listener.accept().await?;

        #[cfg(target_os = "linux")]
        {
            match stream.peer_cred() {
                Ok(cred) => {
                    let current_uid = unsafe { libc::getuid() };
                    if cred.uid() != current_uid {
                        warn!("IPC rejected: different UID ({} != {})", cred.uid(), current_uid);
                        continue;
                    }
                }
                Err(e) => {
                    warn!("Failed to get peer credentials: {}", e);
                    continue;
                }
            }
        }

        let daemon = Arc::clone(&daemon);
        let exit_tx = exit_tx.clone();

        tokio::spawn(async move {
            let (mut rx, mut tx) = stream.split();

            let request: Request = match read_message(&mut rx).await {
                Ok(request) => request,
                Err(e) => {
                    warn!("Bad IPC request: {:#}", e);
                    return;
                }
            };
            let exit = request == Request::Exit;

            // actions may spawn a paste command
            let response = match tokio::task::spawn_blocking(move || daemon.handle(request)).await {
                Ok(response) => response,
                Err(e) => Response::Error(format!("Request failed: {}", e)),
            };

            if let Err(e) = write_message(&mut tx, &response).await {
                warn!("Failed to answer IPC request: {:#}", e);
            }
            if exit {
                let _ = exit_tx.send(()).await;
            }
        });
    }
}

#[cfg(not(unix))]
async fn serve(_daemon: Arc<Daemon>, _listener: Listener, _exit_tx: mpsc::Sender<()>) -> Result<()> {
    warn!("IPC is only supported on unix platforms");
    std::future::pending::<Result<()>>().await
}
