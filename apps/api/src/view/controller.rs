//! The single owner of the session's view state.
//!
//! State lives in a `watch` channel: the controller is the only writer, and
//! handlers observe it through `snapshot` / `subscribe`. Every analysis gets
//! a ticket; a completion carrying any ticket other than the one currently
//! `Analyzing` is stale and dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisError, ResumeAnalyzer};
use crate::encoder::{encode, ByteSource, ReadError};
use crate::errors::{AppError, ANALYSIS_FAILURE_MESSAGE, READ_FAILURE_MESSAGE};
use crate::models::analysis::ResumeAnalysisResult;
use crate::models::document::MediaType;

#[derive(Debug, Clone)]
pub enum ViewState {
    Idle,
    Analyzing {
        ticket: Uuid,
        file_name: Option<String>,
        started_at: DateTime<Utc>,
    },
    Results {
        ticket: Uuid,
        file_name: Option<String>,
        result: Arc<ResumeAnalysisResult>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

impl ViewState {
    pub fn is_analyzing(&self) -> bool {
        matches!(self, ViewState::Analyzing { .. })
    }

    /// Idle and Error take a new upload identically.
    pub fn accepts_upload(&self) -> bool {
        matches!(self, ViewState::Idle | ViewState::Error { .. })
    }

    #[cfg(test)]
    pub fn result(&self) -> Option<&ResumeAnalysisResult> {
        match self {
            ViewState::Results { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// An upload as it arrives at the controller, before the type gate.
pub struct Upload<'a, S: ?Sized> {
    pub file_name: Option<String>,
    pub declared_type: Option<&'a str>,
    pub source: &'a mut S,
}

pub struct ViewController {
    state: watch::Sender<ViewState>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self { state }
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Idle | Error → Analyzing. Returns the ticket for the new analysis.
    pub fn begin(&self, file_name: Option<String>) -> Result<Uuid, AppError> {
        let ticket = Uuid::new_v4();
        let mut refused = None;

        self.state.send_if_modified(|state| match state {
            ViewState::Idle | ViewState::Error { .. } => {
                *state = ViewState::Analyzing {
                    ticket,
                    file_name: file_name.clone(),
                    started_at: Utc::now(),
                };
                true
            }
            ViewState::Analyzing { .. } => {
                refused = Some(AppError::AnalysisInFlight);
                false
            }
            ViewState::Results { .. } => {
                refused = Some(AppError::ResetRequired);
                false
            }
        });

        match refused {
            Some(err) => Err(err),
            None => {
                info!("Analysis {ticket} started ({})", file_name.as_deref().unwrap_or("unnamed"));
                Ok(ticket)
            }
        }
    }

    /// Analyzing → Results. Returns false if `ticket` is stale.
    pub fn complete(&self, ticket: Uuid, result: ResumeAnalysisResult) -> bool {
        let applied = self.state.send_if_modified(|state| match state {
            ViewState::Analyzing {
                ticket: current,
                file_name,
                started_at,
            } if *current == ticket => {
                *state = ViewState::Results {
                    ticket,
                    file_name: file_name.take(),
                    result: Arc::new(result),
                    started_at: *started_at,
                    finished_at: Utc::now(),
                };
                true
            }
            _ => false,
        });

        if applied {
            info!("Analysis {ticket} completed");
        } else {
            warn!("Discarding stale result for analysis {ticket}");
        }
        applied
    }

    /// Analyzing → Error with a user-facing message. Returns false if `ticket` is stale.
    pub fn fail(&self, ticket: Uuid, message: &str) -> bool {
        let applied = self.state.send_if_modified(|state| match state {
            ViewState::Analyzing { ticket: current, .. } if *current == ticket => {
                *state = ViewState::Error {
                    message: message.to_string(),
                };
                true
            }
            _ => false,
        });

        if !applied {
            warn!("Discarding stale failure for analysis {ticket}");
        }
        applied
    }

    pub fn fail_read(&self, ticket: Uuid, cause: &ReadError) -> bool {
        warn!("Analysis {ticket} could not read upload: {cause}");
        self.fail(ticket, READ_FAILURE_MESSAGE)
    }

    pub fn fail_analysis(&self, ticket: Uuid, cause: &AnalysisError) -> bool {
        error!("Analysis {ticket} failed: {cause}");
        self.fail(ticket, ANALYSIS_FAILURE_MESSAGE)
    }

    /// An upload that failed before its type could be read (the body blew
    /// the size limit): Analyzing → Error with the read-failure message, so
    /// it lands exactly where a failed encode does.
    pub fn reject_unreadable(&self, file_name: Option<String>, cause: ReadError) -> AppError {
        match self.begin(file_name) {
            Ok(ticket) => {
                self.fail_read(ticket, &cause);
                AppError::Read(cause)
            }
            Err(refused) => refused,
        }
    }

    /// Back to Idle, dropping any result or message. Refused while an
    /// analysis is running: its worker would keep going and a second upload
    /// could start beside it.
    pub fn reset(&self) -> Result<(), AppError> {
        let mut refused = false;
        self.state.send_if_modified(|state| match state {
            ViewState::Idle => false,
            ViewState::Analyzing { .. } => {
                refused = true;
                false
            }
            ViewState::Results { .. } | ViewState::Error { .. } => {
                *state = ViewState::Idle;
                true
            }
        });

        if refused {
            return Err(AppError::AnalysisInFlight);
        }
        info!("View reset");
        Ok(())
    }

    /// Waits until the current analysis settles or `timeout` elapses, then
    /// returns whatever state is current.
    pub async fn settled(&self, timeout: Duration) -> ViewState {
        let mut rx = self.subscribe();
        let _ = tokio::time::timeout(timeout, rx.wait_for(|s| !s.is_analyzing())).await;
        self.snapshot()
    }

    /// Runs the whole upload flow: type gate, transition, encode, then the
    /// analysis in a background task. Returns the ticket once the document
    /// is encoded; the outcome arrives through the state channel.
    ///
    /// A rejected type never touches the state. A read failure moves the
    /// state to Error and is also returned to the caller.
    pub async fn submit<S>(
        self: &Arc<Self>,
        analyzer: Arc<dyn ResumeAnalyzer>,
        upload: Upload<'_, S>,
    ) -> Result<Uuid, AppError>
    where
        S: ByteSource + ?Sized,
    {
        let media_type = MediaType::resolve(upload.declared_type, upload.file_name.as_deref())
            .ok_or_else(|| {
                let declared = upload.declared_type.unwrap_or("unknown").to_string();
                info!("Rejected upload with type {declared}");
                AppError::UnsupportedFileType(declared)
            })?;

        let ticket = self.begin(upload.file_name)?;

        let document = match encode(upload.source, media_type).await {
            Ok(document) => document,
            Err(e) => {
                self.fail_read(ticket, &e);
                return Err(AppError::Read(e));
            }
        };

        let worker = tokio::spawn(async move { analyzer.analyze(&document).await });
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            match worker.await {
                Ok(Ok(result)) => {
                    controller.complete(ticket, result);
                }
                Ok(Err(e)) => {
                    controller.fail_analysis(ticket, &e);
                }
                Err(e) => {
                    error!("Analysis {ticket} task aborted: {e}");
                    controller.fail(ticket, ANALYSIS_FAILURE_MESSAGE);
                }
            }
        });

        Ok(ticket)
    }
}
