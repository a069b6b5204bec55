use std::time::Duration;

use engine_logging::engine_info;
use inspector_core::{Effect, Msg, SlotKind, TaskRequest, UploadReceipt};
use inspector_engine::{
    EngineEvent, EngineHandle, EngineStopped, StartRequest, StreamSignal, UploadKind,
};

/// Request-level settings that the core does not model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSettings {
    pub model_name: Option<String>,
    pub max_concurrency: Option<u32>,
}

/// Turns core effects into engine commands and engine events back into
/// core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    model: ModelSettings,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, model: ModelSettings) -> Self {
        Self { engine, model }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::UploadFile {
                    slot,
                    attempt,
                    path,
                } => {
                    engine_info!("Upload {} attempt={} path={:?}", slot, attempt, path);
                    self.engine.upload(upload_kind(slot), attempt, path);
                }
                Effect::StartTask { request } => {
                    self.engine.start(start_request(request, &self.model));
                }
                Effect::OpenStream { task_id } => self.engine.open_stream(task_id),
                Effect::CloseStream { task_id } => self.engine.close_stream(task_id),
                Effect::DownloadResult {
                    task_id,
                    download_url,
                } => self.engine.download(task_id, download_url),
            }
        }
    }

    /// Next engine result as a core message, `None` if nothing arrived within
    /// `timeout`.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, EngineStopped> {
        Ok(self.engine.recv_timeout(timeout)?.map(event_to_msg))
    }
}

fn upload_kind(slot: SlotKind) -> UploadKind {
    match slot {
        SlotKind::Source => UploadKind::Source,
        SlotKind::Target => UploadKind::Target,
        SlotKind::Glossary => UploadKind::Glossary,
    }
}

fn slot_kind(kind: UploadKind) -> SlotKind {
    match kind {
        UploadKind::Source => SlotKind::Source,
        UploadKind::Target => SlotKind::Target,
        UploadKind::Glossary => SlotKind::Glossary,
    }
}

fn start_request(request: TaskRequest, model: &ModelSettings) -> StartRequest {
    StartRequest {
        source_file_id: request.source_file_id,
        target_file_id: request.target_file_id,
        sheets: request.sheets,
        sheet_langs: request.sheet_langs,
        glossary_file_id: request.glossary_file_id,
        cell_range: request.cell_range,
        model_name: model.model_name.clone(),
        max_concurrency: model.max_concurrency,
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadCompleted {
            kind,
            attempt,
            result,
        } => Msg::UploadFinished {
            slot: slot_kind(kind),
            attempt,
            result: result
                .map(|response| UploadReceipt {
                    file_id: response.file_id,
                    sheets: response.sheets,
                })
                .map_err(|err| err.to_string()),
        },
        EngineEvent::StartCompleted { result } => match result {
            Ok(task_id) => Msg::TaskStarted { task_id },
            Err(err) => Msg::TaskStartFailed {
                message: err.to_string(),
            },
        },
        EngineEvent::Stream { task_id, signal } => match signal {
            StreamSignal::Opened => Msg::StreamOpened { task_id },
            StreamSignal::Message(payload) => Msg::StreamMessage { task_id, payload },
            StreamSignal::Lost(reason) => Msg::StreamLost { task_id, reason },
        },
        EngineEvent::DownloadCompleted { task_id, result } => Msg::ResultDownloaded {
            task_id,
            result: result.map_err(|err| err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use inspector_engine::{ApiError, UploadResponse};

    use super::*;

    #[test]
    fn start_request_carries_model_settings() {
        let request = TaskRequest {
            source_file_id: "s".to_string(),
            target_file_id: "t".to_string(),
            sheets: vec!["Main".to_string()],
            sheet_langs: BTreeMap::new(),
            glossary_file_id: Some("g".to_string()),
            cell_range: "C7:C28".to_string(),
        };
        let model = ModelSettings {
            model_name: Some("gpt-4o".to_string()),
            max_concurrency: Some(4),
        };

        let wire = start_request(request, &model);
        assert_eq!(wire.glossary_file_id.as_deref(), Some("g"));
        assert_eq!(wire.model_name.as_deref(), Some("gpt-4o"));
        assert_eq!(wire.max_concurrency, Some(4));
    }

    #[test]
    fn rejected_start_keeps_server_body() {
        let msg = event_to_msg(EngineEvent::StartCompleted {
            result: Err(ApiError::Rejected {
                status: 500,
                message: "Internal Server Error".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::TaskStartFailed {
                message: "Internal Server Error".to_string()
            }
        );
    }

    #[test]
    fn upload_events_keep_slot_and_attempt() {
        let msg = event_to_msg(EngineEvent::UploadCompleted {
            kind: UploadKind::Source,
            attempt: 3,
            result: Ok(UploadResponse {
                file_id: "src".to_string(),
                sheets: vec!["A".to_string()],
            }),
        });
        assert_eq!(
            msg,
            Msg::UploadFinished {
                slot: SlotKind::Source,
                attempt: 3,
                result: Ok(UploadReceipt {
                    file_id: "src".to_string(),
                    sheets: vec!["A".to_string()],
                }),
            }
        );
    }

    #[test]
    fn stream_signals_map_one_to_one() {
        let lost = event_to_msg(EngineEvent::Stream {
            task_id: "t".to_string(),
            signal: StreamSignal::Lost("reset".to_string()),
        });
        assert_eq!(
            lost,
            Msg::StreamLost {
                task_id: "t".to_string(),
                reason: "reset".to_string()
            }
        );
    }
}
