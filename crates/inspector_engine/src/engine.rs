use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use tokio::sync::mpsc as async_mpsc;
use tokio::task::JoinHandle;

use crate::client::{ClientSettings, InspectionApi, ReqwestApi};
use crate::persist::ResultWriter;
use crate::stream::{relay_stream, StreamSink};
use crate::{
    ApiError, EngineEvent, EngineStopped, StartRequest, StreamSignal, UploadAttempt, UploadKind,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    /// Where downloaded results go; `None` disables downloads.
    pub output_dir: Option<PathBuf>,
}

enum EngineCommand {
    Upload {
        kind: UploadKind,
        attempt: UploadAttempt,
        path: PathBuf,
    },
    Start {
        request: StartRequest,
    },
    OpenStream {
        task_id: String,
    },
    CloseStream {
        task_id: String,
    },
    Download {
        task_id: String,
        location: String,
    },
}

/// Runs all network work on a dedicated thread with a single-threaded tokio
/// runtime. Commands go in through the handle, results come back as
/// [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestApi::new(config.client)?);
        let writer = config.output_dir.map(ResultWriter::new);
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("inspector-engine".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        engine_error!("Failed to start engine runtime: {}", err);
                        return;
                    }
                };
                runtime.block_on(run_commands(api, writer, cmd_rx, event_tx));
            })
            .map_err(|err| ApiError::Io(err.to_string()))?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn upload(&self, kind: UploadKind, attempt: UploadAttempt, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Upload {
            kind,
            attempt,
            path: path.into(),
        });
    }

    pub fn start(&self, request: StartRequest) {
        self.send(EngineCommand::Start { request });
    }

    /// Any previously open stream is aborted before the new one connects.
    pub fn open_stream(&self, task_id: impl Into<String>) {
        self.send(EngineCommand::OpenStream {
            task_id: task_id.into(),
        });
    }

    /// No-op when that stream is not the active one.
    pub fn close_stream(&self, task_id: impl Into<String>) {
        self.send(EngineCommand::CloseStream {
            task_id: task_id.into(),
        });
    }

    pub fn download(&self, task_id: impl Into<String>, location: impl Into<String>) {
        self.send(EngineCommand::Download {
            task_id: task_id.into(),
            location: location.into(),
        });
    }

    /// `Ok(None)` when nothing arrived within `timeout`; `Err` once the
    /// engine thread has exited and no further events can come.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_error!("Engine thread is not running; command dropped");
        }
    }
}

struct ChannelStreamSink {
    task_id: String,
    tx: mpsc::Sender<EngineEvent>,
}

impl StreamSink for ChannelStreamSink {
    fn emit(&self, signal: StreamSignal) {
        let _ = self.tx.send(EngineEvent::Stream {
            task_id: self.task_id.clone(),
            signal,
        });
    }
}

async fn run_commands(
    api: Arc<ReqwestApi>,
    writer: Option<ResultWriter>,
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut active_stream: Option<(String, JoinHandle<()>)> = None;

    while let Some(command) = cmd_rx.recv().await {
        match command {
            EngineCommand::Upload {
                kind,
                attempt,
                path,
            } => {
                let api = api.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = upload_file(api.as_ref(), kind, &path).await;
                    let _ = event_tx.send(EngineEvent::UploadCompleted {
                        kind,
                        attempt,
                        result,
                    });
                });
            }
            EngineCommand::Start { request } => {
                let api = api.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = api.start(&request).await;
                    let _ = event_tx.send(EngineEvent::StartCompleted { result });
                });
            }
            EngineCommand::OpenStream { task_id } => {
                abort_stream(&mut active_stream);
                let sink = ChannelStreamSink {
                    task_id: task_id.clone(),
                    tx: event_tx.clone(),
                };
                match api.endpoints().stream(&task_id) {
                    Ok(url) => {
                        engine_info!("Opening event stream for task {}", task_id);
                        let client = api.client().clone();
                        let handle = tokio::spawn(async move {
                            relay_stream(&client, url, &sink).await;
                        });
                        active_stream = Some((task_id, handle));
                    }
                    Err(err) => sink.emit(StreamSignal::Lost(err.to_string())),
                }
            }
            EngineCommand::CloseStream { task_id } => {
                if matches!(&active_stream, Some((active, _)) if *active == task_id) {
                    abort_stream(&mut active_stream);
                }
            }
            EngineCommand::Download { task_id, location } => {
                let api = api.clone();
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = download_result(api.as_ref(), writer, &task_id, &location).await;
                    let _ = event_tx.send(EngineEvent::DownloadCompleted { task_id, result });
                });
            }
        }
    }

    abort_stream(&mut active_stream);
}

fn abort_stream(active_stream: &mut Option<(String, JoinHandle<()>)>) {
    if let Some((task_id, handle)) = active_stream.take() {
        engine_debug!("Closing event stream for task {}", task_id);
        handle.abort();
    }
}

async fn upload_file(
    api: &dyn InspectionApi,
    kind: UploadKind,
    path: &Path,
) -> Result<crate::UploadResponse, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ApiError::Io(format!("{}: {err}", path.display())))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| kind.field_name().to_string());
    api.upload(kind, &file_name, bytes).await
}

async fn download_result(
    api: &dyn InspectionApi,
    writer: Option<ResultWriter>,
    task_id: &str,
    location: &str,
) -> Result<PathBuf, ApiError> {
    let Some(writer) = writer else {
        return Err(ApiError::Io("no output directory configured".to_string()));
    };
    let bytes = api.download(location).await?;
    let task_id = task_id.to_string();
    tokio::task::spawn_blocking(move || writer.save(&task_id, &bytes))
        .await
        .map_err(|err| ApiError::Io(err.to_string()))?
        .map_err(|err| ApiError::Io(err.to_string()))
}
