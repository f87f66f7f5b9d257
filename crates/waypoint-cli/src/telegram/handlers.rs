//! Update handlers: commands, free text and inline button presses.
//!
//! Every handler registers the sender first, so any contact refreshes their
//! activity timestamp, then checks access before touching the plan.

use std::sync::Arc;

use log::{error, info, warn};
use teloxide::{
    prelude::*,
    types::{ChatAction, InlineKeyboardMarkup},
    utils::command::BotCommands,
};
use waypoint_core::{
    models::ChatRole, CoachError, CurrentTask, DialogState, InterviewReply, InterviewTopic,
    SetAccess, SetAdmin, SetReminderHour, User,
};

use super::{keyboards, texts, BotState};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start or resume")]
    Start,
    #[command(description = "show help")]
    Help,
    #[command(description = "show the whole plan")]
    Plan,
    #[command(description = "show the current task")]
    Task,
    #[command(description = "show your progress")]
    Status,
    #[command(description = "mark the current task as done")]
    Done,
    #[command(description = "get more time after a missed deadline")]
    Postpone,
    #[command(description = "set the reminder hour, e.g. /remind 9")]
    Remind(String),
    #[command(description = "discuss the current task")]
    Ask,
    #[command(description = "delete the plan and start over")]
    Reset,
    #[command(description = "admin: grant access, e.g. /grant 12345")]
    Grant(String),
    #[command(description = "admin: revoke access")]
    Revoke(String),
    #[command(description = "admin: make a user admin")]
    Promote(String),
    #[command(description = "admin: take admin rights away")]
    Demote(String),
}

/// Admin actions addressed at another user.
#[derive(Debug, Clone, Copy)]
enum AdminAction {
    Grant,
    Revoke,
    Promote,
    Demote,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let chat = msg.chat.id;
    let Some(user) = register(&bot, chat, &state, from.id.0).await? else {
        return Ok(());
    };

    match cmd {
        Command::Help => send(&bot, chat, texts::HELP).await,
        Command::Grant(arg) => admin(&bot, chat, &state, &user, AdminAction::Grant, &arg).await,
        Command::Revoke(arg) => admin(&bot, chat, &state, &user, AdminAction::Revoke, &arg).await,
        Command::Promote(arg) => {
            admin(&bot, chat, &state, &user, AdminAction::Promote, &arg).await
        }
        Command::Demote(arg) => admin(&bot, chat, &state, &user, AdminAction::Demote, &arg).await,
        _ if !user.is_authorized() => no_access(&bot, chat, &state).await,
        Command::Start => start(&bot, chat, &state, &user).await,
        Command::Plan => show_plan(&bot, chat, &state, user.id).await,
        Command::Task => show_task(&bot, chat, &state, user.id).await,
        Command::Status => show_status(&bot, chat, &state, user.id).await,
        Command::Done => complete(&bot, chat, &state, user.id, false).await,
        Command::Postpone => postpone(&bot, chat, &state, user.id).await,
        Command::Remind(arg) => remind(&bot, chat, &state, user.id, &arg).await,
        Command::Ask => begin_questions(&bot, chat, &state, user.id).await,
        Command::Reset => {
            send_with(&bot, chat, texts::CONFIRM_RESET, keyboards::reset_confirmation()).await
        }
    }
}

/// Plain text: an interview answer, a question in question mode or noise.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let (Some(from), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };
    let chat = msg.chat.id;
    let Some(user) = register(&bot, chat, &state, from.id.0).await? else {
        return Ok(());
    };
    if !user.is_authorized() {
        return no_access(&bot, chat, &state).await;
    }

    match user.dialog_state {
        DialogState::Interview(topic) => answer(&bot, chat, &state, user.id, topic, text).await,
        DialogState::AskingQuestion => {
            bot.send_chat_action(chat, ChatAction::Typing).await?;
            match state.coach.ask_question(&state.llm, user.id, text).await {
                Ok(reply) => send_with(&bot, chat, &reply, keyboards::stop_questions()).await,
                Err(e) => reply_error(&bot, chat, &e).await,
            }
        }
        DialogState::Idle => send(&bot, chat, texts::IDLE_HINT).await,
    }
}

pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let chat = ChatId::from(q.from.id);
    let Some(user) = register(&bot, chat, &state, q.from.id.0).await? else {
        return Ok(());
    };
    if !user.is_authorized() {
        return no_access(&bot, chat, &state).await;
    }

    match data {
        keyboards::TASK_DONE => complete(&bot, chat, &state, user.id, false).await,
        keyboards::DUE_DONE => complete(&bot, chat, &state, user.id, true).await,
        keyboards::POSTPONE => postpone(&bot, chat, &state, user.id).await,
        keyboards::SHOW_TASK => show_task(&bot, chat, &state, user.id).await,
        keyboards::ASK_QUESTION => begin_questions(&bot, chat, &state, user.id).await,
        keyboards::CONTINUE_INTERVIEW => continue_interview(&bot, chat, &state, &user).await,
        keyboards::STOP_QUESTION => match state.coach.stop_questions(user.id).await {
            Ok(()) => {
                send(&bot, chat, texts::QUESTIONS_STOPPED).await?;
                show_task(&bot, chat, &state, user.id).await
            }
            Err(e) => reply_error(&bot, chat, &e).await,
        },
        keyboards::RESET_CONFIRM => {
            let params = waypoint_core::UserId { id: user.id };
            match state.coach.reset_user(&params).await {
                Ok(()) => {
                    info!("user {} reset their plan", user.id);
                    begin_interview(&bot, chat, &state, user.id).await
                }
                Err(e) => reply_error(&bot, chat, &e).await,
            }
        }
        other => {
            warn!("unknown callback data '{other}' from user {}", user.id);
            Ok(())
        }
    }
}

/// Registers the sender and returns their profile, or replies with an error.
async fn register(
    bot: &Bot,
    chat: ChatId,
    state: &BotState,
    id: u64,
) -> ResponseResult<Option<User>> {
    match state.coach.register_user(id).await {
        Ok((user, created)) => {
            if created {
                info!("registered user {id}");
            }
            Ok(Some(user))
        }
        Err(e) => {
            reply_error(bot, chat, &e).await?;
            Ok(None)
        }
    }
}

async fn start(bot: &Bot, chat: ChatId, state: &BotState, user: &User) -> ResponseResult<()> {
    if user.has_plan() {
        send_with(bot, chat, texts::HAS_PLAN, keyboards::existing_plan()).await
    } else if user.dialog_state.is_interviewing() {
        send_with(
            bot,
            chat,
            texts::UNFINISHED_INTERVIEW,
            keyboards::unfinished_interview(),
        )
        .await
    } else {
        begin_interview(bot, chat, state, user.id).await
    }
}

async fn begin_interview(bot: &Bot, chat: ChatId, state: &BotState, id: u64) -> ResponseResult<()> {
    bot.send_chat_action(chat, ChatAction::Typing).await?;
    match state.coach.begin_interview(&state.llm, id).await {
        Ok(greeting) => send(bot, chat, &greeting).await,
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

/// Repeats the pending question, or starts an interview when none is running.
async fn continue_interview(
    bot: &Bot,
    chat: ChatId,
    state: &BotState,
    user: &User,
) -> ResponseResult<()> {
    if !user.dialog_state.is_interviewing() {
        return start(bot, chat, state, user).await;
    }
    let last_question = user
        .messages
        .iter()
        .rev()
        .find(|turn| turn.role == ChatRole::Assistant);
    match last_question {
        Some(turn) => send(bot, chat, &turn.content).await,
        None => send(bot, chat, texts::UNFINISHED_INTERVIEW).await,
    }
}

async fn answer(
    bot: &Bot,
    chat: ChatId,
    state: &BotState,
    id: u64,
    topic: InterviewTopic,
    text: &str,
) -> ResponseResult<()> {
    if topic.next().is_none() {
        send(bot, chat, texts::GENERATING).await?;
    }
    bot.send_chat_action(chat, ChatAction::Typing).await?;

    match state.coach.submit_answer(&state.llm, id, text).await {
        Ok(InterviewReply::Question(reply) | InterviewReply::Clarify(reply)) => {
            send(bot, chat, &reply).await
        }
        Ok(InterviewReply::OffTopic(reply)) => {
            send_with(bot, chat, &reply, keyboards::unfinished_interview()).await
        }
        Ok(InterviewReply::PlanReady(plan)) => {
            info!("user {id} received a plan with {} tasks", plan.task_count());
            show_plan(bot, chat, state, id).await?;
            show_task(bot, chat, state, id).await
        }
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn show_plan(bot: &Bot, chat: ChatId, state: &BotState, id: u64) -> ResponseResult<()> {
    match state.coach.current_task(id).await {
        Ok(snapshot) => {
            let text = texts::plan_text(&snapshot.plan, &snapshot.task, state.timezone());
            send(bot, chat, &text).await
        }
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn show_task(bot: &Bot, chat: ChatId, state: &BotState, id: u64) -> ResponseResult<()> {
    match state.coach.current_task(id).await {
        Ok(snapshot) => send_task(bot, chat, state, &snapshot.current).await,
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn send_task(
    bot: &Bot,
    chat: ChatId,
    state: &BotState,
    current: &CurrentTask,
) -> ResponseResult<()> {
    let text = texts::current_text(current, state.timezone());
    match current {
        CurrentTask::Active(_) => send_with(bot, chat, &text, keyboards::task_actions()).await,
        CurrentTask::Completed => send(bot, chat, &text).await,
    }
}

async fn show_status(bot: &Bot, chat: ChatId, state: &BotState, id: u64) -> ResponseResult<()> {
    let params = waypoint_core::UserId { id };
    match state.coach.user_status(&params).await {
        Ok(status) => send(bot, chat, &texts::status_text(&status)).await,
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn complete(
    bot: &Bot,
    chat: ChatId,
    state: &BotState,
    id: u64,
    from_reminder: bool,
) -> ResponseResult<()> {
    let result = if from_reminder {
        state.coach.confirm_due_completion(id, &state.sink).await
    } else {
        state.coach.complete_current(id, &state.sink).await
    };
    match result {
        // The congratulation arrives through the sink.
        Ok(completion) if matches!(completion.next, CurrentTask::Completed) => Ok(()),
        Ok(completion) => {
            send(bot, chat, "Well done! Here is what comes next.").await?;
            send_task(bot, chat, state, &completion.next).await
        }
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn postpone(bot: &Bot, chat: ChatId, state: &BotState, id: u64) -> ResponseResult<()> {
    match state.coach.postpone_current(id, None).await {
        Ok(task) => {
            let days = state.coach.tracker().policy().postpone_offset.as_hours() / 24;
            send(bot, chat, &format!("Done, you got {days} more days.")).await?;
            info!("user {id} postponed step {}", task.current_step);
            show_task(bot, chat, state, id).await
        }
        Err(CoachError::Precondition { .. }) => {
            send(
                bot,
                chat,
                "The deadline hasn't passed yet, so there is nothing to postpone.",
            )
            .await
        }
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn remind(bot: &Bot, chat: ChatId, state: &BotState, id: u64, arg: &str) -> ResponseResult<()> {
    let Ok(hour) = arg.trim().parse::<u8>() else {
        return send(bot, chat, "Send the hour as a number from 0 to 23, e.g. /remind 9").await;
    };
    match state.coach.set_reminder_hour(&SetReminderHour { id, hour }).await {
        Ok(user) => {
            let text = format!("Reminders will arrive at {:02}:00.", user.reminder_hour);
            send(bot, chat, &text).await
        }
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn begin_questions(bot: &Bot, chat: ChatId, state: &BotState, id: u64) -> ResponseResult<()> {
    bot.send_chat_action(chat, ChatAction::Typing).await?;
    match state.coach.begin_questions(&state.llm, id).await {
        Ok(reply) => send_with(bot, chat, &reply, keyboards::stop_questions()).await,
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn admin(
    bot: &Bot,
    chat: ChatId,
    state: &BotState,
    user: &User,
    action: AdminAction,
    arg: &str,
) -> ResponseResult<()> {
    if !user.is_admin {
        return send(bot, chat, texts::ADMIN_ONLY).await;
    }
    let Ok(target) = arg.trim().parse::<u64>() else {
        return send(bot, chat, "Pass the numeric Telegram ID of the user.").await;
    };

    let result = match action {
        AdminAction::Grant | AdminAction::Revoke => {
            let access = matches!(action, AdminAction::Grant);
            state
                .coach
                .set_access(&SetAccess { id: target, access })
                .await
        }
        AdminAction::Promote | AdminAction::Demote => {
            let is_admin = matches!(action, AdminAction::Promote);
            state
                .coach
                .set_admin(&SetAdmin { id: target, is_admin })
                .await
        }
    };

    match result {
        Ok(_) => {
            info!("admin {} applied {action:?} to user {target}", user.id);
            send(bot, chat, &format!("Done: {action:?} user {target}.")).await
        }
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn no_access(bot: &Bot, chat: ChatId, state: &BotState) -> ResponseResult<()> {
    match keyboards::support(state.support_url.as_deref()) {
        Some(markup) => send_with(bot, chat, texts::NO_ACCESS, markup).await,
        None => send(bot, chat, texts::NO_ACCESS).await,
    }
}

async fn reply_error(bot: &Bot, chat: ChatId, err: &CoachError) -> ResponseResult<()> {
    if err.is_user_facing() {
        info!("request from chat {chat} rejected: {err}");
    } else {
        error!("request from chat {chat} failed: {err}");
    }
    send(bot, chat, &texts::error_text(err)).await
}

async fn send(bot: &Bot, chat: ChatId, text: &str) -> ResponseResult<()> {
    bot.send_message(chat, text).await?;
    Ok(())
}

async fn send_with(
    bot: &Bot,
    chat: ChatId,
    text: &str,
    markup: InlineKeyboardMarkup,
) -> ResponseResult<()> {
    bot.send_message(chat, text).reply_markup(markup).await?;
    Ok(())
}
