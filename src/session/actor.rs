use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::{
    common::error::QuizError,
    history::{service::HistoryService, store::RecordStore},
    quiz::models::Quiz,
    session::{
        feedback::{FeedbackDriver, FeedbackStatus},
        gesture::CardDrag,
        machine::{
            Advance, Confirmation, FeedbackPlan, FeedbackSignal, FeedbackTicket, QuizSession,
            SessionOutcome, SessionView, Transition,
        },
    },
};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 32;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum HistoryWrite {
    Saved(String),
    Failed(String),
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SkipRequested,
    FeedbackStarted { status: FeedbackStatus },
    Advanced { current: usize },
    Finished {
        score: u32,
        questions: u32,
        history: HistoryWrite,
    },
    Stopped,
}

enum SessionCommand {
    Select {
        index: usize,
        reply: oneshot::Sender<Result<Transition, QuizError>>,
    },
    Confirm {
        reply: oneshot::Sender<Confirmation>,
    },
    Skip {
        reply: oneshot::Sender<Advance>,
    },
    Stop {
        reply: oneshot::Sender<Transition>,
    },
    DragCard {
        translation_x: f32,
    },
    ReleaseCard {
        translation_x: f32,
        reply: oneshot::Sender<bool>,
    },
    Feedback {
        ticket: FeedbackTicket,
        signal: FeedbackSignal,
    },
}

/// Shell-side handle to a running session. Every intent is applied by the
/// single task that owns the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<SessionView>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionCommand::Select { index, .. } => write!(f, "Select({})", index),
            SessionCommand::Confirm { .. } => write!(f, "Confirm"),
            SessionCommand::Skip { .. } => write!(f, "Skip"),
            SessionCommand::Stop { .. } => write!(f, "Stop"),
            SessionCommand::DragCard { translation_x } => write!(f, "DragCard({})", translation_x),
            SessionCommand::ReleaseCard { translation_x, .. } => {
                write!(f, "ReleaseCard({})", translation_x)
            }
            SessionCommand::Feedback { ticket, signal } => {
                write!(f, "Feedback({:?}, {:?})", ticket, signal)
            }
        }
    }
}

impl SessionHandle {
    pub fn spawn<S, F>(
        quiz: Arc<Quiz>,
        history: HistoryService<S>,
        feedback: Arc<F>,
    ) -> Result<Self, QuizError>
    where
        S: RecordStore,
        F: FeedbackDriver,
    {
        let session = QuizSession::new(quiz)?;
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view) = watch::channel(session.view());
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let actor = SessionActor {
            session,
            card: CardDrag::default(),
            history,
            feedback,
            commands: commands.downgrade(),
            inbox,
            view: view_tx,
            events: events.clone(),
        };
        tokio::spawn(actor.run());

        Ok(Self {
            commands,
            view,
            events,
        })
    }

    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn select(&self, index: usize) -> Result<Transition, QuizError> {
        self.request(|reply| SessionCommand::Select { index, reply })
            .await?
    }

    pub async fn confirm(&self) -> Result<Confirmation, QuizError> {
        self.request(|reply| SessionCommand::Confirm { reply }).await
    }

    /// Skips the current question. Call only once the user agreed to skip.
    pub async fn skip(&self) -> Result<Advance, QuizError> {
        self.request(|reply| SessionCommand::Skip { reply }).await
    }

    /// Abandons the session without recording it. Call only once the user agreed.
    pub async fn stop(&self) -> Result<Transition, QuizError> {
        self.request(|reply| SessionCommand::Stop { reply }).await
    }

    pub async fn drag_card(&self, translation_x: f32) -> Result<(), QuizError> {
        self.commands
            .send(SessionCommand::DragCard { translation_x })
            .await
            .map_err(|_| QuizError::SessionClosed)
    }

    /// Returns true when the release should prompt the user to skip.
    pub async fn release_card(&self, translation_x: f32) -> Result<bool, QuizError> {
        self.request(|reply| SessionCommand::ReleaseCard {
            translation_x,
            reply,
        })
        .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, QuizError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| QuizError::SessionClosed)?;

        response.await.map_err(|_| QuizError::SessionClosed)
    }
}

struct SessionActor<S, F> {
    session: QuizSession,
    card: CardDrag,
    history: HistoryService<S>,
    feedback: Arc<F>,
    commands: mpsc::WeakSender<SessionCommand>,
    inbox: mpsc::Receiver<SessionCommand>,
    view: watch::Sender<SessionView>,
    events: broadcast::Sender<SessionEvent>,
}

impl<S, F> SessionActor<S, F>
where
    S: RecordStore,
    F: FeedbackDriver,
{
    async fn run(mut self) {
        info!("Session for quiz {} started", self.session.quiz().id);

        while let Some(command) = self.inbox.recv().await {
            debug!("Session received {:?}", command);
            self.handle(command).await;

            if !self.session.is_live() {
                break;
            }
        }

        // Dropping the inbox here turns late feedback completions into no-ops.
        debug!("Session for quiz {} shut down", self.session.quiz().id);
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Select { index, reply } => {
                let result = self.session.select_alternative(index);
                if let Ok(Transition::Applied) = result {
                    self.publish();
                }
                let _ = reply.send(result);
            }
            SessionCommand::Confirm { reply } => {
                let confirmation = self.confirm().await;
                let _ = reply.send(confirmation);
            }
            SessionCommand::Skip { reply } => {
                let advance = self.session.skip();
                self.on_advance(advance).await;
                let _ = reply.send(advance);
            }
            SessionCommand::Stop { reply } => {
                let transition = self.session.stop();
                if transition == Transition::Applied {
                    info!("Session for quiz {} was stopped", self.session.quiz().id);
                    self.publish();
                    let _ = self.events.send(SessionEvent::Stopped);
                }
                let _ = reply.send(transition);
            }
            SessionCommand::DragCard { translation_x } => {
                if self.session.is_input_enabled() {
                    self.card.update(translation_x);
                    self.publish();
                }
            }
            SessionCommand::ReleaseCard {
                translation_x,
                reply,
            } => {
                let skip = self.card.release(translation_x) && self.session.is_input_enabled();
                self.publish();
                if skip {
                    let _ = self.events.send(SessionEvent::SkipRequested);
                }
                let _ = reply.send(skip);
            }
            SessionCommand::Feedback { ticket, signal } => {
                self.signal(ticket, signal).await;
            }
        }
    }

    async fn confirm(&mut self) -> Confirmation {
        let confirmation = self.session.confirm();

        match confirmation {
            Confirmation::Ignored => {}
            Confirmation::SkipRequested => {
                let _ = self.events.send(SessionEvent::SkipRequested);
            }
            Confirmation::Feedback(plan) => {
                self.publish();
                let _ = self.events.send(SessionEvent::FeedbackStarted {
                    status: plan.status,
                });
                self.start_feedback(plan);

                // The new score is published above, which is what a correct answer waits on.
                if plan.status == FeedbackStatus::Correct {
                    self.signal(plan.ticket, FeedbackSignal::ScoreObserved).await;
                }
            }
        }

        confirmation
    }

    async fn signal(&mut self, ticket: FeedbackTicket, signal: FeedbackSignal) {
        let advance = self.session.complete_feedback(ticket, signal);
        self.on_advance(advance).await;
    }

    async fn on_advance(&mut self, advance: Advance) {
        match advance {
            Advance::Ignored | Advance::Pending => {}
            Advance::Next { current } => {
                self.card = CardDrag::default();
                self.publish();
                let _ = self.events.send(SessionEvent::Advanced { current });
            }
            Advance::Finished(outcome) => self.finish(outcome).await,
        }
    }

    async fn finish(&mut self, outcome: SessionOutcome) {
        let history = match self
            .history
            .record_attempt(self.session.quiz(), outcome.score)
            .await
        {
            Ok(record) => HistoryWrite::Saved(record.id),
            Err(e) => HistoryWrite::Failed(e.to_string()),
        };

        self.publish();
        let _ = self.events.send(SessionEvent::Finished {
            score: outcome.score,
            questions: outcome.questions,
            history,
        });
    }

    /// Runs the effects of a confirmed answer off the session task. Their
    /// completions come back through the inbox.
    fn start_feedback(&self, plan: FeedbackPlan) {
        let Some(commands) = self.commands.upgrade() else {
            warn!("Session inbox closed before feedback could start");
            return;
        };

        let driver = self.feedback.clone();
        tokio::spawn(async move {
            if let Err(e) = driver.flash_overlay(plan.status).await {
                warn!("Overlay flash failed: {}", e);
            }
        });

        let driver = self.feedback.clone();
        let sound_commands = commands.clone();
        tokio::spawn(async move {
            if let Err(e) = driver.play_sound(plan.cue).await {
                warn!("Treating failed sound cue as settled: {}", e);
            }

            let _ = sound_commands
                .send(SessionCommand::Feedback {
                    ticket: plan.ticket,
                    signal: FeedbackSignal::SoundSettled,
                })
                .await;
        });

        if plan.shake {
            let driver = self.feedback.clone();
            tokio::spawn(async move {
                if let Err(e) = driver.shake().await {
                    warn!("Treating failed shake as finished: {}", e);
                }

                let _ = commands
                    .send(SessionCommand::Feedback {
                        ticket: plan.ticket,
                        signal: FeedbackSignal::ShakeFinished,
                    })
                    .await;
            });
        }
    }

    fn publish(&self) {
        let mut view = self.session.view();
        view.card_offset = self.card.position();
        self.view.send_replace(view);
    }
}
