//! In-process platform for tests and headless runs
//!
//! Every capability is a switch, and every prompt and delivery is recorded so
//! tests can assert on what reached the "screen".

use super::{NotificationPlatform, PlatformPermission};
use crate::error::{AppError, DeliveryError, Result};
use crate::models::{DeliveryOutcome, NotificationRequest, WorkerMessage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct FakePlatform {
    supported: bool,
    permission: Mutex<PlatformPermission>,
    prompt_answer: Mutex<Option<PlatformPermission>>,
    prompts: AtomicUsize,
    worker_available: bool,
    worker_registered: AtomicBool,
    worker_fails: AtomicBool,
    direct_available: bool,
    direct_fails: AtomicBool,
    delivered: Mutex<Vec<(DeliveryOutcome, NotificationRequest)>>,
    messages_tx: mpsc::UnboundedSender<WorkerMessage>,
    messages_rx: Mutex<Option<mpsc::UnboundedReceiver<WorkerMessage>>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    /// Supported platform with both surfaces, never asked, prompt answers "granted"
    pub fn new() -> Self {
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        Self {
            supported: true,
            permission: Mutex::new(PlatformPermission::Default),
            prompt_answer: Mutex::new(Some(PlatformPermission::Granted)),
            prompts: AtomicUsize::new(0),
            worker_available: true,
            worker_registered: AtomicBool::new(false),
            worker_fails: AtomicBool::new(false),
            direct_available: true,
            direct_fails: AtomicBool::new(false),
            delivered: Mutex::new(Vec::new()),
            messages_tx,
            messages_rx: Mutex::new(Some(messages_rx)),
        }
    }

    /// No notification capability at all
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn with_permission(self, permission: PlatformPermission) -> Self {
        *lock(&self.permission) = permission;
        self
    }

    /// Answer given by the consent prompt; `None` makes the prompt error out
    pub fn with_prompt_answer(self, answer: Option<PlatformPermission>) -> Self {
        *lock(&self.prompt_answer) = answer;
        self
    }

    /// Worker registration fails
    pub fn without_worker(mut self) -> Self {
        self.worker_available = false;
        self
    }

    pub fn without_direct(mut self) -> Self {
        self.direct_available = false;
        self
    }

    pub fn set_worker_fails(&self, fails: bool) {
        self.worker_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_direct_fails(&self, fails: bool) {
        self.direct_fails.store(fails, Ordering::SeqCst);
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<(DeliveryOutcome, NotificationRequest)> {
        lock(&self.delivered).clone()
    }

    pub fn delivered_titles(&self) -> Vec<String> {
        lock(&self.delivered)
            .iter()
            .map(|(_, request)| request.title.clone())
            .collect()
    }

    /// Post a message as if the background worker sent it
    pub fn post_worker_message(&self, message: WorkerMessage) {
        if self.messages_tx.send(message).is_err() {
            tracing::warn!("Worker message dropped: no receiver");
        }
    }

    fn record(&self, outcome: DeliveryOutcome, request: &NotificationRequest) {
        lock(&self.delivered).push((outcome, request.clone()));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl NotificationPlatform for FakePlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn permission(&self) -> PlatformPermission {
        *lock(&self.permission)
    }

    async fn request_permission(&self) -> Result<PlatformPermission> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let answer = *lock(&self.prompt_answer);
        match answer {
            Some(answer) => {
                *lock(&self.permission) = answer;
                Ok(answer)
            }
            None => Err(AppError::Generic("consent prompt failed".into())),
        }
    }

    async fn register_worker(&self) -> Result<()> {
        if !self.worker_available {
            return Err(AppError::ChannelRegistrationFailed(
                "background worker unavailable".into(),
            ));
        }
        self.worker_registered.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn show_worker_notification(
        &self,
        request: &NotificationRequest,
    ) -> std::result::Result<(), DeliveryError> {
        if !self.worker_registered.load(Ordering::SeqCst) {
            return Err(DeliveryError::Unavailable);
        }
        if self.worker_fails.load(Ordering::SeqCst) {
            return Err(DeliveryError::Failed("worker display failed".into()));
        }
        self.record(DeliveryOutcome::Worker, request);
        Ok(())
    }

    fn show_direct_notification(
        &self,
        request: &NotificationRequest,
    ) -> std::result::Result<(), DeliveryError> {
        if !self.direct_available {
            return Err(DeliveryError::Unavailable);
        }
        if self.direct_fails.load(Ordering::SeqCst) {
            return Err(DeliveryError::Failed("direct display failed".into()));
        }
        self.record(DeliveryOutcome::Direct, request);
        Ok(())
    }

    fn take_worker_messages(&self) -> Option<mpsc::UnboundedReceiver<WorkerMessage>> {
        lock(&self.messages_rx).take()
    }
}
