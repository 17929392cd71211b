use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::{
    common::error::QuizError,
    quiz::models::{Question, Quiz},
    session::feedback::{FeedbackStatus, SoundCue},
};

/// Identifies one confirmation's feedback. Completions carrying an older
/// ticket are dropped.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedbackTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSignal {
    ScoreObserved,
    SoundSettled,
    ShakeFinished,
}

/// Signals a confirmed answer still waits for before the question advances.
///
/// A correct answer waits for the score change to be observed and for its
/// sound. A wrong answer waits for the shake animation and its sound, and
/// never for the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedbackGate {
    score: bool,
    sound: bool,
    shake: bool,
}

impl FeedbackGate {
    fn for_status(status: FeedbackStatus) -> Self {
        match status {
            FeedbackStatus::Correct => Self {
                score: true,
                sound: true,
                shake: false,
            },
            FeedbackStatus::Wrong => Self {
                score: false,
                sound: true,
                shake: true,
            },
            FeedbackStatus::None => Self::default(),
        }
    }

    pub fn awaits(&self, signal: FeedbackSignal) -> bool {
        match signal {
            FeedbackSignal::ScoreObserved => self.score,
            FeedbackSignal::SoundSettled => self.sound,
            FeedbackSignal::ShakeFinished => self.shake,
        }
    }

    fn release(&mut self, signal: FeedbackSignal) -> bool {
        let slot = match signal {
            FeedbackSignal::ScoreObserved => &mut self.score,
            FeedbackSignal::SoundSettled => &mut self.sound,
            FeedbackSignal::ShakeFinished => &mut self.shake,
        };

        std::mem::replace(slot, false)
    }

    pub fn is_open(&self) -> bool {
        !(self.score || self.sound || self.shake)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAnswer {
        selected: Option<usize>,
    },
    FeedbackPlaying {
        status: FeedbackStatus,
        ticket: FeedbackTicket,
        gate: FeedbackGate,
    },
    Finished {
        score: u32,
        questions: u32,
    },
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackPlan {
    pub ticket: FeedbackTicket,
    pub status: FeedbackStatus,
    pub cue: SoundCue,
    pub shake: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Input is disabled; nothing happened.
    Ignored,
    /// Nothing is selected; the user must confirm the skip first.
    SkipRequested,
    Feedback(FeedbackPlan),
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub score: u32,
    pub questions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Ignored,
    /// The signal was accepted but the gate still waits for others.
    Pending,
    Next {
        current: usize,
    },
    Finished(SessionOutcome),
}

/// Everything a shell needs to render the running session.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SessionView {
    pub quiz_id: String,
    pub title: String,
    pub question: Question,
    pub current: usize,
    pub total: usize,
    pub score: u32,
    pub selected: Option<usize>,
    pub feedback: FeedbackStatus,
    pub input_enabled: bool,
    pub progress: u8,
    pub card_offset: f32,
    pub finished: bool,
}

/// One attempt at one quiz.
#[derive(Debug)]
pub struct QuizSession {
    quiz: Arc<Quiz>,
    current: usize,
    score: u32,
    state: SessionState,
    next_ticket: u64,
    advances: u32,
}

impl QuizSession {
    pub fn new(quiz: Arc<Quiz>) -> Result<Self, QuizError> {
        if quiz.questions.is_empty() {
            return Err(QuizError::Catalog(format!(
                "Quiz {} has no questions",
                quiz.id
            )));
        }

        Ok(Self {
            quiz,
            current: 0,
            score: 0,
            state: SessionState::AwaitingAnswer { selected: None },
            next_ticket: 0,
            advances: 0,
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn advance_count(&self) -> u32 {
        self.advances
    }

    pub fn question(&self) -> &Question {
        &self.quiz.questions[self.current]
    }

    pub fn selected(&self) -> Option<usize> {
        match self.state {
            SessionState::AwaitingAnswer { selected } => selected,
            _ => None,
        }
    }

    pub fn feedback_status(&self) -> FeedbackStatus {
        match self.state {
            SessionState::FeedbackPlaying { status, .. } => status,
            _ => FeedbackStatus::None,
        }
    }

    pub fn is_input_enabled(&self) -> bool {
        matches!(self.state, SessionState::AwaitingAnswer { .. })
    }

    pub fn is_live(&self) -> bool {
        !matches!(
            self.state,
            SessionState::Finished { .. } | SessionState::Stopped
        )
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.state {
            SessionState::Finished { score, questions } => Some(SessionOutcome { score, questions }),
            _ => None,
        }
    }

    pub fn select_alternative(&mut self, index: usize) -> Result<Transition, QuizError> {
        if !self.is_input_enabled() {
            return Ok(Transition::Ignored);
        }

        let len = self.question().alternatives.len();
        if index >= len {
            return Err(QuizError::InvalidAlternative { index, len });
        }

        self.state = SessionState::AwaitingAnswer {
            selected: Some(index),
        };
        Ok(Transition::Applied)
    }

    pub fn confirm(&mut self) -> Confirmation {
        let SessionState::AwaitingAnswer { selected } = self.state else {
            debug!("Confirm ignored while input is disabled");
            return Confirmation::Ignored;
        };

        let Some(selected) = selected else {
            return Confirmation::SkipRequested;
        };

        let status = if self.question().is_correct(selected) {
            self.score += 1;
            FeedbackStatus::Correct
        } else {
            FeedbackStatus::Wrong
        };

        let ticket = self.issue_ticket();
        self.state = SessionState::FeedbackPlaying {
            status,
            ticket,
            gate: FeedbackGate::for_status(status),
        };

        let cue = match status {
            FeedbackStatus::Correct => SoundCue::Correct,
            _ => SoundCue::Wrong,
        };

        debug!(
            "Question {} of {} confirmed as {:?}",
            self.current + 1,
            self.quiz.id,
            status
        );

        Confirmation::Feedback(FeedbackPlan {
            ticket,
            status,
            cue,
            shake: status == FeedbackStatus::Wrong,
        })
    }

    /// Only call after the user agreed to skip.
    pub fn skip(&mut self) -> Advance {
        if !self.is_input_enabled() {
            return Advance::Ignored;
        }

        debug!("Question {} of {} skipped", self.current + 1, self.quiz.id);
        self.advance()
    }

    pub fn complete_feedback(&mut self, ticket: FeedbackTicket, signal: FeedbackSignal) -> Advance {
        let SessionState::FeedbackPlaying {
            status,
            ticket: active,
            mut gate,
        } = self.state
        else {
            return Advance::Ignored;
        };

        if active != ticket || !gate.release(signal) {
            debug!("Dropping stale feedback signal {:?}", signal);
            return Advance::Ignored;
        }

        if !gate.is_open() {
            self.state = SessionState::FeedbackPlaying {
                status,
                ticket,
                gate,
            };
            return Advance::Pending;
        }

        self.advance()
    }

    pub fn stop(&mut self) -> Transition {
        if !self.is_live() {
            return Transition::Ignored;
        }

        debug!("Session for quiz {} stopped", self.quiz.id);
        self.state = SessionState::Stopped;
        Transition::Applied
    }

    pub fn view(&self) -> SessionView {
        let total = self.quiz.questions.len();

        SessionView {
            quiz_id: self.quiz.id.clone(),
            title: self.quiz.title.clone(),
            question: self.question().clone(),
            current: self.current,
            total,
            score: self.score,
            selected: self.selected(),
            feedback: self.feedback_status(),
            input_enabled: self.is_input_enabled(),
            progress: progress_percent(self.current + 1, total),
            card_offset: 0.0,
            finished: matches!(self.state, SessionState::Finished { .. }),
        }
    }

    fn advance(&mut self) -> Advance {
        self.advances += 1;

        if self.current + 1 >= self.quiz.questions.len() {
            let outcome = SessionOutcome {
                score: self.score,
                questions: self.quiz.question_count(),
            };
            self.state = SessionState::Finished {
                score: outcome.score,
                questions: outcome.questions,
            };
            return Advance::Finished(outcome);
        }

        self.current += 1;
        self.state = SessionState::AwaitingAnswer { selected: None };
        Advance::Next {
            current: self.current,
        }
    }

    fn issue_ticket(&mut self) -> FeedbackTicket {
        self.next_ticket += 1;
        FeedbackTicket(self.next_ticket)
    }
}

/// Share of the quiz reached, `current` counting from one.
pub fn progress_percent(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }

    ((current as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::models::QuizLevel;

    fn quiz(correct: &[usize]) -> Arc<Quiz> {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(idx, correct)| Question {
                title: format!("Question {}", idx + 1),
                alternatives: vec!["A".into(), "B".into(), "C".into()],
                correct: *correct,
            })
            .collect();

        Arc::new(Quiz {
            id: "q1".into(),
            title: "Test quiz".into(),
            level: QuizLevel::Easy,
            questions,
        })
    }

    fn answer(session: &mut QuizSession, alternative: usize) -> Advance {
        session.select_alternative(alternative).unwrap();
        let Confirmation::Feedback(plan) = session.confirm() else {
            panic!("Expected feedback");
        };

        let mut last = Advance::Ignored;
        let signals: &[FeedbackSignal] = match plan.status {
            FeedbackStatus::Correct => &[FeedbackSignal::ScoreObserved, FeedbackSignal::SoundSettled],
            _ => &[FeedbackSignal::SoundSettled, FeedbackSignal::ShakeFinished],
        };
        for signal in signals {
            last = session.complete_feedback(plan.ticket, *signal);
        }
        last
    }

    #[test]
    fn all_correct_answers_score_every_question() {
        let mut session = QuizSession::new(quiz(&[0, 1, 2])).unwrap();

        assert_eq!(answer(&mut session, 0), Advance::Next { current: 1 });
        assert_eq!(answer(&mut session, 1), Advance::Next { current: 2 });
        assert_eq!(
            answer(&mut session, 2),
            Advance::Finished(SessionOutcome {
                score: 3,
                questions: 3
            })
        );
        assert_eq!(session.advance_count(), 3);
        assert!(!session.is_live());
    }

    #[test]
    fn wrong_answers_score_nothing() {
        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();

        answer(&mut session, 1);
        let last = answer(&mut session, 0);

        assert_eq!(
            last,
            Advance::Finished(SessionOutcome {
                score: 0,
                questions: 2
            })
        );
    }

    #[test]
    fn selection_is_cleared_by_confirm_and_skip() {
        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();

        session.select_alternative(2).unwrap();
        assert_eq!(session.selected(), Some(2));
        session.confirm();
        assert_eq!(session.selected(), None);

        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();
        session.select_alternative(1).unwrap();
        session.skip();
        assert_eq!(session.selected(), None);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn confirm_without_selection_asks_before_skipping() {
        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();

        assert_eq!(session.confirm(), Confirmation::SkipRequested);
        assert_eq!(session.current_index(), 0);
        assert!(session.is_input_enabled());
    }

    #[test]
    fn second_confirm_during_feedback_is_ignored() {
        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();

        session.select_alternative(0).unwrap();
        assert!(matches!(session.confirm(), Confirmation::Feedback(_)));
        assert_eq!(session.confirm(), Confirmation::Ignored);
        assert_eq!(session.skip(), Advance::Ignored);
        assert_eq!(session.select_alternative(1).unwrap(), Transition::Ignored);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn wrong_answer_waits_for_shake() {
        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();

        session.select_alternative(2).unwrap();
        let Confirmation::Feedback(plan) = session.confirm() else {
            panic!("Expected feedback");
        };
        assert!(plan.shake);
        assert_eq!(plan.cue, SoundCue::Wrong);

        // The score never changes on a wrong answer, so it cannot open the gate.
        assert_eq!(
            session.complete_feedback(plan.ticket, FeedbackSignal::ScoreObserved),
            Advance::Ignored
        );
        assert_eq!(
            session.complete_feedback(plan.ticket, FeedbackSignal::SoundSettled),
            Advance::Pending
        );
        assert_eq!(session.feedback_status(), FeedbackStatus::Wrong);
        assert_eq!(session.current_index(), 0);

        assert_eq!(
            session.complete_feedback(plan.ticket, FeedbackSignal::ShakeFinished),
            Advance::Next { current: 1 }
        );
        assert_eq!(session.feedback_status(), FeedbackStatus::None);
    }

    #[test]
    fn correct_answer_does_not_wait_for_shake() {
        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();

        session.select_alternative(0).unwrap();
        let Confirmation::Feedback(plan) = session.confirm() else {
            panic!("Expected feedback");
        };
        assert!(!plan.shake);

        assert_eq!(
            session.complete_feedback(plan.ticket, FeedbackSignal::ShakeFinished),
            Advance::Ignored
        );
        assert_eq!(
            session.complete_feedback(plan.ticket, FeedbackSignal::ScoreObserved),
            Advance::Pending
        );
        assert_eq!(
            session.complete_feedback(plan.ticket, FeedbackSignal::SoundSettled),
            Advance::Next { current: 1 }
        );
    }

    #[test]
    fn stale_ticket_is_dropped() {
        let mut session = QuizSession::new(quiz(&[0, 1, 2])).unwrap();

        session.select_alternative(0).unwrap();
        let Confirmation::Feedback(first) = session.confirm() else {
            panic!("Expected feedback");
        };
        session.complete_feedback(first.ticket, FeedbackSignal::ScoreObserved);
        session.complete_feedback(first.ticket, FeedbackSignal::SoundSettled);

        session.select_alternative(0).unwrap();
        let Confirmation::Feedback(second) = session.confirm() else {
            panic!("Expected feedback");
        };

        assert_ne!(first.ticket, second.ticket);
        assert_eq!(
            session.complete_feedback(first.ticket, FeedbackSignal::SoundSettled),
            Advance::Ignored
        );
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn stop_is_terminal() {
        let mut session = QuizSession::new(quiz(&[0, 1])).unwrap();

        session.select_alternative(0).unwrap();
        let Confirmation::Feedback(plan) = session.confirm() else {
            panic!("Expected feedback");
        };

        assert_eq!(session.stop(), Transition::Applied);
        assert_eq!(session.stop(), Transition::Ignored);
        assert_eq!(
            session.complete_feedback(plan.ticket, FeedbackSignal::SoundSettled),
            Advance::Ignored
        );
        assert_eq!(session.outcome(), None);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut session = QuizSession::new(quiz(&[0])).unwrap();

        let result = session.select_alternative(3);
        assert!(matches!(
            result,
            Err(QuizError::InvalidAlternative { index: 3, len: 3 })
        ));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn reselecting_is_idempotent() {
        let mut session = QuizSession::new(quiz(&[0])).unwrap();

        session.select_alternative(1).unwrap();
        let before = session.state();
        session.select_alternative(1).unwrap();
        assert_eq!(session.state(), before);
    }

    #[test]
    fn empty_quiz_cannot_start() {
        let empty = Arc::new(Quiz {
            id: "empty".into(),
            title: "Empty".into(),
            level: QuizLevel::Hard,
            questions: vec![],
        });

        assert!(matches!(
            QuizSession::new(empty),
            Err(QuizError::Catalog(_))
        ));
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }
}
