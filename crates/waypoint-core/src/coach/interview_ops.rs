//! Interview and question-mode operations for the Coach.
//!
//! LLM calls are made between database operations, never inside a
//! transaction.

use super::Coach;
use crate::{
    error::{CoachError, Result},
    interview::{InterviewReply, InterviewTopic},
    llm::{prompts, Assistant, PlanSource, VerdictStatus},
    models::{ChatTurn, DialogState},
    tracker::CurrentTask,
};

const QUESTION_MODE_OPENER: &str = "Hi, I have some questions about my current stage.";

impl Coach {
    /// Starts a new interview with a greeting from the assistant.
    ///
    /// Fails with a precondition error when the user already has a plan or is
    /// halfway through an interview; both need a reset first.
    pub async fn begin_interview<A: Assistant>(&self, assistant: &A, id: u64) -> Result<String> {
        let user = self.require_user(id).await?;
        if user.has_plan() {
            return Err(CoachError::precondition("a plan already exists"));
        }
        if user.dialog_state.is_interviewing() || !user.messages.is_empty() {
            return Err(CoachError::precondition("an interview is already in progress"));
        }

        let greeting = assistant.greet().await.map_err(CoachError::Assistant)?;
        self.set_dialog(
            id,
            DialogState::Interview(InterviewTopic::Confirmation),
            vec![ChatTurn::assistant(greeting.clone())],
        )
        .await?;
        Ok(greeting)
    }

    /// Handles the user's answer to the pending interview question.
    ///
    /// After the last topic the plan is generated and stored. If generation
    /// fails the answer is not recorded, so sending it again retries.
    pub async fn submit_answer<A>(&self, model: &A, id: u64, answer: &str) -> Result<InterviewReply>
    where
        A: Assistant + PlanSource,
    {
        let user = self.require_user(id).await?;
        let DialogState::Interview(topic) = user.dialog_state else {
            return Err(CoachError::precondition("no interview is in progress"));
        };
        let mut messages = user.messages;

        let verdict = model
            .review_answer(&messages, topic, answer)
            .await
            .map_err(CoachError::Assistant)?;
        log::debug!("user {id} answer on {topic}: {:?}", verdict.status);

        match verdict.status {
            VerdictStatus::Clarify => return Ok(InterviewReply::Clarify(verdict.reply)),
            VerdictStatus::OffTopic => return Ok(InterviewReply::OffTopic(verdict.reply)),
            VerdictStatus::Accepted => {}
        }
        messages.push(ChatTurn::user(answer));

        match topic.next() {
            Some(next) => {
                let question = model
                    .next_question(&messages, next)
                    .await
                    .map_err(CoachError::Assistant)?;
                messages.push(ChatTurn::assistant(question.clone()));
                self.set_dialog(id, DialogState::Interview(next), messages)
                    .await?;
                Ok(InterviewReply::Question(question))
            }
            None => {
                let plan = model.generate(&messages, self.today()).await?;
                self.store_new_plan(id, plan.clone(), Some(DialogState::Interview(topic)))
                    .await?;
                Ok(InterviewReply::PlanReady(plan))
            }
        }
    }

    /// Enters question mode about the current task and returns the first
    /// answer.
    pub async fn begin_questions<A: Assistant>(&self, assistant: &A, id: u64) -> Result<String> {
        let snapshot = self.current_task(id).await?;
        let CurrentTask::Active(view) = snapshot.current else {
            return Err(CoachError::AlreadyComplete);
        };

        let mut dialog = vec![
            ChatTurn::system(prompts::question_mode(
                &snapshot.plan.goal,
                view.label(),
                &view.description,
            )),
            ChatTurn::user(QUESTION_MODE_OPENER),
        ];
        let reply = assistant
            .answer_question(&dialog)
            .await
            .map_err(CoachError::Assistant)?;
        dialog.push(ChatTurn::assistant(reply.clone()));
        self.set_question_dialog(id, DialogState::AskingQuestion, dialog)
            .await?;
        Ok(reply)
    }

    /// Answers a question asked in question mode.
    pub async fn ask_question<A: Assistant>(&self, assistant: &A, id: u64, question: &str) -> Result<String> {
        let user = self.require_user(id).await?;
        if user.dialog_state != DialogState::AskingQuestion {
            return Err(CoachError::precondition("question mode is not active"));
        }

        let mut dialog = user.question_dialog;
        dialog.push(ChatTurn::user(question));
        let reply = assistant
            .answer_question(&dialog)
            .await
            .map_err(CoachError::Assistant)?;
        dialog.push(ChatTurn::assistant(reply.clone()));
        self.set_question_dialog(id, DialogState::AskingQuestion, dialog)
            .await?;
        Ok(reply)
    }

    /// Leaves question mode and forgets its transcript.
    pub async fn stop_questions(&self, id: u64) -> Result<()> {
        self.set_question_dialog(id, DialogState::Idle, Vec::new())
            .await
    }
}
