//! Call flow controller
//!
//! `CallFlow::handle` maps (step, carried context, recognized speech) to the
//! voice response for that webhook. Side effects are limited to translation,
//! answer generation and recording the profile once per call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use call_agent_config::{FlowConfig, FlowScript};
use call_agent_core::{
    AnswerEngine, ConversationLogEntry, ConversationLogger, Language, ProfileSink, Translator,
    UserProfile,
};
use call_agent_telephony::{Gather, Say, VoiceResponse};
use call_agent_text_processing::{
    format_blood_group, format_email, is_affirmative, translate_lenient, try_translate,
};

use crate::context::FlowContext;
use crate::error::FlowError;
use crate::gather::{GatherOutcome, GatherPolicy};
use crate::step::Step;

type StepResult = Result<(VoiceResponse, &'static str), FlowError>;

/// Stateless call flow shared by all webhook handlers
pub struct CallFlow {
    translator: Arc<dyn Translator>,
    answers: Arc<dyn AnswerEngine>,
    recorder: Arc<dyn ProfileSink>,
    conversation_log: Option<Arc<dyn ConversationLogger>>,
    script: FlowScript,
    config: FlowConfig,
    organization: String,
    language: Language,
}

impl CallFlow {
    pub fn new(
        translator: Arc<dyn Translator>,
        answers: Arc<dyn AnswerEngine>,
        recorder: Arc<dyn ProfileSink>,
        script: FlowScript,
        config: FlowConfig,
        organization: impl Into<String>,
    ) -> Self {
        let language = Language::from_code(&config.language).unwrap_or_default();
        Self {
            translator,
            answers,
            recorder,
            conversation_log: None,
            script,
            config,
            organization: organization.into(),
            language,
        }
    }

    pub fn with_conversation_log(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_log = Some(logger);
        self
    }

    pub fn script(&self) -> &FlowScript {
        &self.script
    }

    fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.config.upstream_timeout_secs)
    }

    fn line(&self, template: &str, ctx: &FlowContext) -> String {
        FlowScript::render(template, &ctx.name, &self.organization)
    }

    fn speak(&self, text: impl Into<String>) -> Say {
        Say::new(text)
            .voice(&self.config.voice)
            .language(&self.config.language)
            .rate(self.config.speaking_rate.as_deref())
    }

    /// Speak `prompt` while gathering speech for `next`; silence redirects to `fallback`
    fn prompt_and_gather(
        &self,
        prompt: String,
        next: String,
        fallback: String,
        timeout_secs: u32,
    ) -> VoiceResponse {
        VoiceResponse::new()
            .gather(
                Gather::speech(next, timeout_secs)
                    .language(&self.config.language)
                    .say(self.speak(prompt)),
            )
            .redirect(fallback)
    }

    /// Webhook entry point; any error becomes the spoken apology
    pub async fn respond(&self, step: Step, ctx: FlowContext, speech: Option<&str>) -> VoiceResponse {
        match self.handle(step, ctx.clone(), speech).await {
            Ok(response) => {
                self.log_turn(step, &ctx, speech, &response);
                response
            }
            Err(e) => {
                tracing::error!(step = %step, call_sid = ?ctx.call_sid, error = %e, "Flow step failed");
                metrics::counter!("call_agent_steps_total", "step" => step.as_str(), "outcome" => "error")
                    .increment(1);
                self.apology()
            }
        }
    }

    /// Resolve `path` to a step and respond; unknown paths get the apology
    pub async fn respond_to_path(&self, path: &str, ctx: FlowContext, speech: Option<&str>) -> VoiceResponse {
        match Step::from_path(path) {
            Some(step) => self.respond(step, ctx, speech).await,
            None => {
                let e = FlowError::InvalidContext(format!("unknown step path {}", path));
                tracing::warn!(error = %e, "Webhook for unknown step");
                self.apology()
            }
        }
    }

    pub fn apology(&self) -> VoiceResponse {
        VoiceResponse::new()
            .say(self.speak(self.script.application_error.clone()))
            .hangup()
    }

    /// Produce the response for one step
    pub async fn handle(
        &self,
        step: Step,
        ctx: FlowContext,
        speech: Option<&str>,
    ) -> Result<VoiceResponse, FlowError> {
        tracing::debug!(step = %step, attempt = ctx.attempt, call_sid = ?ctx.call_sid, "Handling step");
        self.check_context(&ctx)?;

        let (response, outcome) = match step {
            Step::Greeting => (self.greeting(&ctx), "prompt"),
            Step::AwaitName => self.await_name(ctx, speech).await?,
            Step::AskEmail => (self.ask_email(&ctx), "prompt"),
            Step::AwaitEmail => self.await_email(ctx, speech).await?,
            Step::AskBloodGroup => (self.ask_blood_group(&ctx), "prompt"),
            Step::AwaitBloodGroup => self.await_blood_group(ctx, speech).await?,
            Step::AwaitFollowupConsent => (self.ask_question(&ctx), "prompt"),
            Step::AwaitQuestion => self.await_question(ctx, speech).await?,
            Step::AwaitMoreQuestionsConsent => self.await_more_questions(ctx, speech),
            Step::ThankYou => (self.thank_you(&ctx), "terminal"),
        };

        metrics::counter!("call_agent_steps_total", "step" => step.as_str(), "outcome" => outcome)
            .increment(1);
        Ok(response)
    }

    /// Reject contexts the flow itself never produces
    fn check_context(&self, ctx: &FlowContext) -> Result<(), FlowError> {
        if ctx.attempt > self.config.max_attempts {
            return Err(FlowError::InvalidContext(format!(
                "attempt {} exceeds max_attempts {}",
                ctx.attempt, self.config.max_attempts
            )));
        }
        Ok(())
    }

    fn greeting(&self, ctx: &FlowContext) -> VoiceResponse {
        let next = ctx.url_for(Step::AwaitName);
        self.prompt_and_gather(
            self.line(&self.script.greeting, ctx),
            next.clone(),
            next,
            self.config.gather_timeout_secs,
        )
    }

    async fn await_name(&self, mut ctx: FlowContext, speech: Option<&str>) -> StepResult {
        let outcome = GatherPolicy::required(self.config.max_attempts).evaluate(speech, ctx.attempt);
        let label = outcome.as_str();

        let response = match outcome {
            GatherOutcome::Advance(name) => {
                tracing::info!(name = %name, call_sid = ?ctx.call_sid, "Name recognized");
                ctx.name = name;
                let ctx = ctx.with_attempt(1);
                self.after_name(ctx).await?
            }
            GatherOutcome::Retry { next_attempt } => {
                tracing::info!(attempt = ctx.attempt, call_sid = ?ctx.call_sid, "No name heard, retrying");
                VoiceResponse::new()
                    .say(self.speak(self.line(&self.script.name_retry, &ctx)))
                    .redirect(ctx.with_attempt(next_attempt).url_for(Step::Greeting))
            }
            GatherOutcome::FallThrough => {
                tracing::info!(attempt = ctx.attempt, call_sid = ?ctx.call_sid, "No name heard, ending call");
                VoiceResponse::new()
                    .say(self.speak(self.line(&self.script.name_give_up, &ctx)))
                    .hangup()
            }
        };
        Ok((response, label))
    }

    async fn after_name(&self, ctx: FlowContext) -> Result<VoiceResponse, FlowError> {
        if self.config.collect_email {
            Ok(VoiceResponse::new().redirect(ctx.url_for(Step::AskEmail)))
        } else {
            self.after_email(ctx).await
        }
    }

    async fn after_email(&self, ctx: FlowContext) -> Result<VoiceResponse, FlowError> {
        if self.config.collect_blood_group {
            Ok(VoiceResponse::new().redirect(ctx.url_for(Step::AskBloodGroup)))
        } else {
            self.record(&ctx).await;
            Ok(VoiceResponse::new()
                .say(self.speak(self.line(&self.script.profile_saved, &ctx)))
                .redirect(ctx.url_for(Step::AwaitFollowupConsent)))
        }
    }

    fn ask_email(&self, ctx: &FlowContext) -> VoiceResponse {
        let next = ctx.url_for(Step::AwaitEmail);
        self.prompt_and_gather(
            self.line(&self.script.ask_email, ctx),
            next.clone(),
            next,
            self.config.gather_timeout_secs,
        )
    }

    async fn await_email(&self, mut ctx: FlowContext, speech: Option<&str>) -> StepResult {
        let outcome = GatherPolicy::optional().evaluate(speech, ctx.attempt);
        let label = outcome.as_str();
        if let GatherOutcome::Advance(email) = outcome {
            ctx.email = email;
        }
        Ok((self.after_email(ctx.with_attempt(1)).await?, label))
    }

    fn ask_blood_group(&self, ctx: &FlowContext) -> VoiceResponse {
        let next = ctx.url_for(Step::AwaitBloodGroup);
        self.prompt_and_gather(
            self.line(&self.script.ask_blood_group, ctx),
            next.clone(),
            next,
            self.config.gather_timeout_secs,
        )
    }

    async fn await_blood_group(&self, mut ctx: FlowContext, speech: Option<&str>) -> StepResult {
        let outcome = GatherPolicy::optional().evaluate(speech, ctx.attempt);
        let label = outcome.as_str();

        let confirmation = match outcome {
            GatherOutcome::Advance(blood_group) => {
                ctx.blood_group = blood_group;
                &self.script.profile_saved
            }
            _ => &self.script.profile_saved_without_blood_group,
        };

        self.record(&ctx).await;

        let ctx = ctx.with_attempt(1);
        let response = VoiceResponse::new()
            .say(self.speak(self.line(confirmation, &ctx)))
            .redirect(ctx.url_for(Step::AwaitFollowupConsent));
        Ok((response, label))
    }

    fn ask_question(&self, ctx: &FlowContext) -> VoiceResponse {
        self.prompt_and_gather(
            self.line(&self.script.ask_question, ctx),
            ctx.url_for(Step::AwaitQuestion),
            ctx.url_for(Step::ThankYou),
            self.config.question_timeout_secs,
        )
    }

    async fn await_question(&self, ctx: FlowContext, speech: Option<&str>) -> StepResult {
        let outcome = GatherPolicy::optional().evaluate(speech, ctx.attempt);
        let label = outcome.as_str();

        let question = match outcome {
            GatherOutcome::Advance(question) => question,
            _ => return Ok((VoiceResponse::new().redirect(ctx.url_for(Step::ThankYou)), label)),
        };

        let answer = match self.answer(&question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, call_sid = ?ctx.call_sid, "No answer available");
                self.line(&self.script.answer_unavailable, &ctx)
            }
        };

        let response = VoiceResponse::new()
            .say(self.speak(answer))
            .gather(
                Gather::speech(ctx.url_for(Step::AwaitMoreQuestionsConsent), self.config.gather_timeout_secs)
                    .language(&self.config.language)
                    .say(self.speak(self.line(&self.script.ask_more_questions, &ctx))),
            )
            .redirect(ctx.url_for(Step::ThankYou));
        Ok((response, label))
    }

    fn await_more_questions(&self, ctx: FlowContext, speech: Option<&str>) -> (VoiceResponse, &'static str) {
        let reply = speech.unwrap_or("");
        if is_affirmative(reply) {
            (VoiceResponse::new().redirect(ctx.url_for(Step::AwaitFollowupConsent)), "advance")
        } else {
            (VoiceResponse::new().redirect(ctx.url_for(Step::ThankYou)), "fall_through")
        }
    }

    fn thank_you(&self, ctx: &FlowContext) -> VoiceResponse {
        VoiceResponse::new()
            .say(self.speak(self.line(&self.script.thank_you, ctx)))
            .hangup()
    }

    /// Translate the question and ask the answer engine, both under the upstream deadline
    async fn answer(&self, question: &str) -> Result<String, FlowError> {
        let deadline = self.upstream_timeout();

        let start = Instant::now();
        let english = translate_lenient(
            self.translator.as_ref(),
            question,
            self.language,
            Language::English,
            deadline,
        )
        .await;
        metrics::histogram!("call_agent_upstream_latency_seconds", "kind" => "translation")
            .record(start.elapsed().as_secs_f64());
        tracing::info!(question = %question, translated = %english, "Question received");

        let start = Instant::now();
        let result = tokio::time::timeout(deadline, self.answers.answer(&english)).await;
        metrics::histogram!("call_agent_upstream_latency_seconds", "kind" => "llm")
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(Ok(answer)) if !answer.trim().is_empty() => Ok(answer),
            Ok(Ok(_)) => Err(FlowError::UpstreamAnswerFailure("empty answer".to_string())),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(FlowError::UpstreamAnswerFailure(format!(
                "{} timed out after {:?}",
                self.answers.name(),
                deadline
            ))),
        }
    }

    /// Build the profile from carried context and hand it to the recorder
    async fn record(&self, ctx: &FlowContext) {
        let deadline = self.upstream_timeout();

        let name = translate_lenient(self.translator.as_ref(), &ctx.name, self.language, Language::English, deadline)
            .await;
        // An annotated fallback would end up inside the address
        let email = if ctx.email.is_empty() {
            String::new()
        } else {
            let translated =
                try_translate(self.translator.as_ref(), &ctx.email, self.language, Language::English, deadline)
                    .await;
            format_email(translated.as_deref().unwrap_or(&ctx.email))
        };
        let blood_group = if ctx.blood_group.is_empty() {
            String::new()
        } else {
            format_blood_group(&ctx.blood_group)
        };

        let mut profile = UserProfile::new(name, email, blood_group).with_conversation_id(ctx.conversation_id());
        if let Some(phone) = &ctx.phone_number {
            profile = profile.with_phone_number(phone.clone());
        }

        if let Err(e) = self.recorder.record(&profile).await {
            tracing::warn!(error = %e, call_sid = ?ctx.call_sid, "Profile recording failed");
        }
    }

    fn log_turn(&self, step: Step, ctx: &FlowContext, speech: Option<&str>, response: &VoiceResponse) {
        let (Some(logger), Some(call_sid)) = (&self.conversation_log, &ctx.call_sid) else {
            return;
        };

        let entry = ConversationLogEntry::new(
            call_sid.clone(),
            step.as_str(),
            speech.unwrap_or_default(),
            response.spoken_text().join(" "),
            self.config.language.clone(),
        );
        let logger = Arc::clone(logger);
        tokio::spawn(async move {
            if let Err(e) = logger.log_turn(&entry).await {
                tracing::warn!(error = %e, "Conversation log write failed");
            }
        });
    }
}
