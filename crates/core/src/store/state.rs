use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Debug};

use colloquy_actor::{Actor, Addr};
use colloquy_backend::ExchangeRecord;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::StoreSnapshot;
use crate::backend_client::{BackendClient, FetchOutcome, SendOutcome};
use crate::transcript::{
    DisplayMessage, SEND_FAILURE_TEXT, Sender, build_transcript,
};

pub(crate) type MessageCallback = Box<dyn Fn(&DisplayMessage) + Send + Sync>;
pub(crate) type BusyCallback = Box<dyn Fn(bool) + Send + Sync>;
pub(crate) type IdleCallback = Box<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
enum Stage {
    #[default]
    Idle,
    Busy,
}

/// One state transition of the store.
///
/// `apply` is the only place transitions happen, which keeps the state
/// machine in one readable spot: every event ends with the stage it
/// leaves the store in, and failures never produce a stage of their
/// own.
enum Event {
    FetchStarted,
    FetchSucceeded(Vec<ExchangeRecord>),
    FetchFailed,
    SendStarted(String),
    SendSucceeded(Option<String>),
    SendFailed,
}

/// The state owned by the store task.
///
/// Commands dispatched to the store are handled immediately, no matter
/// what it is currently doing. A submission that arrives while a fetch
/// or send is in flight is not dropped and not raced: it is queued and
/// submitted on the next return to idle.
pub(crate) struct StoreState {
    backend: BackendClient,
    transcript: Vec<DisplayMessage>,
    draft: String,
    stage: Stage,
    pending_inputs: VecDeque<String>,
    next_local_id: u64,
    in_flight_send: Option<u64>,
    running_tasks: HashMap<u64, JoinHandle<()>>,
    next_task_id: u64,

    on_message: Option<MessageCallback>,
    on_busy_changed: Option<BusyCallback>,
    on_idle: Option<IdleCallback>,
}

impl StoreState {
    pub(crate) fn new(
        backend: BackendClient,
        on_message: Option<MessageCallback>,
        on_busy_changed: Option<BusyCallback>,
        on_idle: Option<IdleCallback>,
    ) -> Self {
        Self {
            backend,
            transcript: Default::default(),
            draft: Default::default(),
            stage: Default::default(),
            pending_inputs: Default::default(),
            next_local_id: 1,
            in_flight_send: None,
            running_tasks: Default::default(),
            next_task_id: 1,
            on_message,
            on_busy_changed,
            on_idle,
        }
    }

    #[inline]
    fn submit_input(&mut self, text: String, addr: &Addr<Self>) {
        if text.trim().is_empty() {
            // An empty submission is a no-op: no queueing, no busy
            // transition, no request.
            return;
        }
        if self.stage != Stage::Idle {
            self.pending_inputs.push_back(text);
            return;
        }
        self.begin_send(text, addr);
    }

    fn begin_send(&mut self, text: String, addr: &Addr<Self>) {
        self.apply(Event::SendStarted(text.clone()));

        let send_fut = self.backend.send_message(text);
        let addr_clone = addr.clone();
        self.spawn_task(
            |_| async move {
                let outcome = send_fut.await;
                addr_clone.send(StoreCommand::SendSettled(outcome)).ok();
            },
            addr,
        );
    }

    fn begin_fetch(&mut self, addr: &Addr<Self>) {
        self.apply(Event::FetchStarted);

        let fetch_fut = self.backend.fetch_recent();
        let addr_clone = addr.clone();
        self.spawn_task(
            |_| async move {
                let outcome = fetch_fut.await;
                addr_clone.send(StoreCommand::FetchSettled(outcome)).ok();
            },
            addr,
        );
    }

    fn process_next_input(&mut self, addr: &Addr<Self>) {
        if self.stage != Stage::Idle {
            // Cannot process the next input now. It will be picked up
            // when the in-flight request settles.
            return;
        }
        let input = self.pending_inputs.pop_front();
        if let Some(input) = input {
            self.begin_send(input, addr);
        } else {
            // Nothing to process, so we can invoke the idle callback.
            if let Some(on_idle) = &self.on_idle {
                on_idle();
            }
        }
    }

    /// Applies one state transition. No I/O happens here; the only
    /// side effects are the notification callbacks.
    fn apply(&mut self, event: Event) {
        match event {
            Event::FetchStarted => self.set_stage(Stage::Busy),
            Event::FetchSucceeded(records) => {
                let history = build_transcript(&records);
                for msg in &history {
                    self.notify_message(msg);
                }
                // Anything already in the transcript is local to this
                // session, hence newer than anything the log can hold.
                let local = std::mem::take(&mut self.transcript);
                self.transcript = history;
                self.transcript.extend(local);
                self.set_stage(Stage::Idle);
            }
            Event::FetchFailed => self.set_stage(Stage::Idle),
            Event::SendStarted(text) => {
                let local_id = self.next_local_id;
                self.next_local_id += 1;
                self.in_flight_send = Some(local_id);
                self.push_message(DisplayMessage::paired(
                    &local_base(local_id),
                    Sender::User,
                    text,
                    None,
                ));
                self.draft.clear();
                self.set_stage(Stage::Busy);
            }
            Event::SendSucceeded(reply) => {
                let local_id = self.take_in_flight_send();
                if let Some(reply) = reply {
                    self.push_message(DisplayMessage::paired(
                        &local_base(local_id),
                        Sender::Bot,
                        reply,
                        None,
                    ));
                }
                self.set_stage(Stage::Idle);
            }
            Event::SendFailed => {
                // The optimistic echo already went out; pair it with
                // the fixed fallback so the failure reads like an
                // ordinary reply.
                let local_id = self.take_in_flight_send();
                self.push_message(DisplayMessage::paired(
                    &local_base(local_id),
                    Sender::Bot,
                    SEND_FAILURE_TEXT.to_owned(),
                    None,
                ));
                self.set_stage(Stage::Idle);
            }
        }
    }

    fn set_stage(&mut self, stage: Stage) {
        if self.stage == stage {
            return;
        }
        self.stage = stage;
        if let Some(on_busy_changed) = &self.on_busy_changed {
            on_busy_changed(stage == Stage::Busy);
        }
    }

    fn push_message(&mut self, msg: DisplayMessage) {
        self.notify_message(&msg);
        self.transcript.push(msg);
    }

    #[inline]
    fn notify_message(&self, msg: &DisplayMessage) {
        if let Some(on_message) = &self.on_message {
            on_message(msg);
        }
    }

    fn take_in_flight_send(&mut self) -> u64 {
        self.in_flight_send
            .take()
            .expect("internal state is inconsistent")
    }

    fn spawn_task<F, Fut>(&mut self, f: F, addr: &Addr<Self>)
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let addr = addr.clone();
        let fut = f(task_id);
        let task = tokio::spawn(async move {
            fut.await;
            addr.send(StoreCommand::TaskEnded(task_id)).ok();
        });
        self.running_tasks.insert(task_id, task);
    }
}

#[inline]
fn local_base(id: u64) -> String {
    format!("local:{id}")
}

pub(crate) enum StoreCommand {
    Greet(String),
    LoadRecent,
    SetDraft(String),
    Submit,
    SubmitText(String),
    FetchSettled(FetchOutcome),
    SendSettled(SendOutcome),
    TaskEnded(u64),
    Inspect(oneshot::Sender<StoreSnapshot>),
}

impl Debug for StoreCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads are elided: transcripts and drafts don't belong in
        // trace logs.
        let name = match self {
            StoreCommand::Greet(_) => "Greet",
            StoreCommand::LoadRecent => "LoadRecent",
            StoreCommand::SetDraft(_) => "SetDraft",
            StoreCommand::Submit => "Submit",
            StoreCommand::SubmitText(_) => "SubmitText",
            StoreCommand::FetchSettled(_) => "FetchSettled",
            StoreCommand::SendSettled(_) => "SendSettled",
            StoreCommand::TaskEnded(_) => "TaskEnded",
            StoreCommand::Inspect(_) => "Inspect",
        };
        f.write_str(name)
    }
}

impl Actor for StoreState {
    type Msg = StoreCommand;

    fn handle_msg(&mut self, msg: StoreCommand, addr: &Addr<Self>) {
        match msg {
            StoreCommand::Greet(text) => {
                self.push_message(DisplayMessage::paired(
                    "greeting",
                    Sender::Bot,
                    text,
                    None,
                ));
            }
            StoreCommand::LoadRecent => self.begin_fetch(addr),
            StoreCommand::SetDraft(text) => self.draft = text,
            StoreCommand::Submit => {
                if self.draft.trim().is_empty() {
                    // Nothing to submit; the draft stays as it is.
                    return;
                }
                let text = std::mem::take(&mut self.draft);
                self.submit_input(text, addr);
            }
            StoreCommand::SubmitText(text) => self.submit_input(text, addr),
            StoreCommand::FetchSettled(outcome) => {
                match outcome {
                    Ok(records) => self.apply(Event::FetchSucceeded(records)),
                    Err(err) => {
                        // Initial-load failures are silent to the end
                        // user; the transcript just stays empty.
                        error!("failed to load recent exchanges: {err}");
                        self.apply(Event::FetchFailed);
                    }
                }
                self.process_next_input(addr);
            }
            StoreCommand::SendSettled(outcome) => {
                match outcome {
                    Ok(reply) => self.apply(Event::SendSucceeded(reply)),
                    Err(err) => {
                        error!("failed to get a reply: {err}");
                        self.apply(Event::SendFailed);
                    }
                }
                self.process_next_input(addr);
            }
            StoreCommand::TaskEnded(task_id) => {
                self.running_tasks
                    .remove(&task_id)
                    .expect("internal state is inconsistent");
            }
            StoreCommand::Inspect(reply_tx) => {
                reply_tx
                    .send(StoreSnapshot {
                        messages: self.transcript.clone(),
                        busy: self.stage == Stage::Busy,
                        draft: self.draft.clone(),
                    })
                    .ok();
            }
        }
    }
}
