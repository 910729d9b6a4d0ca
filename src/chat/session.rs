//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! store, drives the send flow against a [`Generator`], and moves transcripts
//! in and out of the store.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use time::OffsetDateTime;

use crate::chat::config::ChatConfig;
use crate::client::{GenerationStream, Generator, Ollama};
use crate::error::{Error, Result};
use crate::observability::{
    SESSION_ROLLBACKS, SESSION_SEND_ERRORS, SESSION_SENDS, TRANSCRIPT_EXPORTS,
    TRANSCRIPT_IMPORT_ERRORS, TRANSCRIPT_IMPORTS,
};
use crate::prompt::{compose, is_empty_input};
use crate::render::Renderer;
use crate::store::{SessionStore, Snapshot};
use crate::transcript::{self, TranscriptFile};
use crate::types::{
    Attachment, GenerateOptions, GenerateRequest, GenerationEvent, Message, Usage,
};

/// The result of a successful send.
#[derive(Debug)]
pub struct SendOutcome {
    /// Attachments that could not be read and were replaced by a marker.
    pub attachment_failures: Vec<Error>,

    /// Token counts reported for the reply.
    pub usage: Usage,
}

/// A chat session that manages conversation state and generation calls.
///
/// The session holds the single [`SessionStore`] for a conversation.  Every
/// mutating operation takes `&mut self`, so sends never overlap.
pub struct ChatSession<G: Generator = Ollama> {
    generator: G,
    config: ChatConfig,
    store: SessionStore,
    pending: Vec<Attachment>,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: String,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// The sampling temperature, if set.
    pub temperature: Option<f32>,
    /// The top-p value, if set.
    pub top_p: Option<f32>,
    /// The context window, if set.
    pub num_ctx: Option<u32>,
    /// Whether replies stream.
    pub stream: bool,
    /// Attachments waiting for the next send.
    pub pending_attachments: usize,
    /// Total prompt tokens across all requests.
    pub total_prompt_tokens: u64,
    /// Total completion tokens across all requests.
    pub total_completion_tokens: u64,
    /// Total number of successful generation requests.
    pub total_requests: u64,
    /// Prompt tokens for the last turn, if available.
    pub last_turn_prompt_tokens: Option<u64>,
    /// Completion tokens for the last turn, if available.
    pub last_turn_completion_tokens: Option<u64>,
}

impl ChatSession<Ollama> {
    /// Creates a session talking to the Ollama server named by `config`.
    ///
    /// The session's config is the only source of sampling options; an
    /// option cleared on the session is left to the server's default.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = Ollama::with_options(config.host.clone(), config.timeout)?
            .with_default_options(GenerateOptions::new());
        Ok(Self::with_generator(client, config))
    }

    /// The underlying client.
    pub fn client(&self) -> &Ollama {
        &self.generator
    }
}

impl<G: Generator> ChatSession<G> {
    /// Creates a session around any generator.
    pub fn with_generator(generator: G, config: ChatConfig) -> Self {
        Self {
            generator,
            config,
            store: SessionStore::new(),
            pending: Vec::new(),
            usage_totals: Usage::default(),
            last_turn_usage: None,
            request_count: 0,
        }
    }

    /// Sends `text` with the pending attachments and records the reply.
    ///
    /// Pending attachments are consumed once the input is accepted, even if
    /// generation then fails.  See [`ChatSession::send_with`].
    pub async fn send(&mut self, text: &str, renderer: &mut dyn Renderer) -> Result<SendOutcome> {
        if is_empty_input(text, &self.pending) {
            return Err(Error::EmptyInput);
        }
        let attachments = std::mem::take(&mut self.pending);
        self.send_with(text, attachments, renderer).await
    }

    /// Sends `text` with `attachments` and records the reply.
    ///
    /// The user message is appended before the network call and stays in the
    /// conversation whatever happens next.  With streaming on, an empty
    /// assistant placeholder is appended and extended by each delta as it is
    /// printed; if the call fails or the stream ends without completing, the
    /// placeholder is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if there is no text and nothing attached (the
    /// store is untouched), otherwise any generation error.
    pub async fn send_with(
        &mut self,
        text: &str,
        attachments: Vec<Attachment>,
        renderer: &mut dyn Renderer,
    ) -> Result<SendOutcome> {
        let prompt = compose(text, &attachments).await?;
        SESSION_SENDS.click();
        self.store.push_user(text, attachments);

        let request = self.request(prompt.text);

        let result = if self.config.stream {
            self.receive_streaming(request, renderer).await
        } else {
            self.receive_whole(request, renderer).await
        };
        renderer.finish_response();

        match result {
            Ok(usage) => {
                self.record_usage(usage);
                Ok(SendOutcome {
                    attachment_failures: prompt.failures,
                    usage,
                })
            }
            Err(err) => {
                SESSION_SEND_ERRORS.click();
                Err(err)
            }
        }
    }

    /// The request for `prompt` under the current settings.
    fn request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest::new(self.config.model.clone(), prompt)
            .with_stream(self.config.stream)
            .with_options(self.config.options())
    }

    async fn receive_whole(
        &mut self,
        request: GenerateRequest,
        renderer: &mut dyn Renderer,
    ) -> Result<Usage> {
        let generation = self.generator.generate(request).await?;
        renderer.print_text(&generation.text);
        self.store.push_assistant(generation.text);
        Ok(generation.usage)
    }

    async fn receive_streaming(
        &mut self,
        request: GenerateRequest,
        renderer: &mut dyn Renderer,
    ) -> Result<Usage> {
        let stream = self.generator.generate_stream(request).await?;
        self.store.push_assistant("");
        let outcome = drain_into_tail(stream, &mut self.store, renderer).await;
        if outcome.is_err() {
            SESSION_ROLLBACKS.click();
            self.store.pop_assistant_tail()?;
        }
        outcome
    }

    fn record_usage(&mut self, usage: Usage) {
        self.last_turn_usage = Some(usage);
        self.usage_totals = self.usage_totals + usage;
        self.request_count = self.request_count.saturating_add(1);
    }

    /// Queues a file for the next send.  The file is read at send time.
    pub fn attach(&mut self, path: impl Into<String>) -> &Attachment {
        self.push_attachment(Attachment::from_path(path))
    }

    /// Queues an attachment for the next send.
    pub fn push_attachment(&mut self, attachment: Attachment) -> &Attachment {
        self.pending.push(attachment);
        &self.pending[self.pending.len() - 1]
    }

    /// Removes the pending attachment at `index` (0-based).
    pub fn detach(&mut self, index: usize) -> Result<Attachment> {
        if index >= self.pending.len() {
            return Err(Error::invalid_state(format!(
                "no attachment #{} ({} pending)",
                index + 1,
                self.pending.len()
            )));
        }
        Ok(self.pending.remove(index))
    }

    /// Attachments waiting for the next send.
    pub fn pending_attachments(&self) -> &[Attachment] {
        &self.pending
    }

    /// Drops every pending attachment.
    pub fn clear_attachments(&mut self) {
        self.pending.clear();
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// An immutable copy of the conversation.
    pub fn messages(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// The conversation store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The transcript document for the current conversation.
    pub fn export_document(&self) -> TranscriptFile {
        transcript::export(&self.store.snapshot())
    }

    /// The current conversation as pretty-printed transcript JSON.
    pub fn export_json(&self) -> Result<String> {
        self.export_document().to_json_pretty()
    }

    /// Writes a transcript to `path`.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        transcript::write_file(path, &self.store.snapshot())?;
        TRANSCRIPT_EXPORTS.click();
        Ok(())
    }

    /// Writes a transcript into `dir` under the conventional name for `now`
    /// and returns the path written.
    pub fn export_to_dir<P: AsRef<Path>>(&self, dir: P, now: OffsetDateTime) -> Result<PathBuf> {
        let path = dir.as_ref().join(transcript::export_file_name(now));
        self.export_to(&path)?;
        Ok(path)
    }

    /// Replaces the conversation with the transcript in `input`.
    ///
    /// Returns the number of messages loaded.  On error the conversation is
    /// left exactly as it was.
    pub fn import_json(&mut self, input: &[u8]) -> Result<usize> {
        let messages = transcript::import(input).inspect_err(|_| TRANSCRIPT_IMPORT_ERRORS.click())?;
        Ok(self.adopt(messages))
    }

    /// Replaces the conversation with the transcript at `path`.
    pub fn import_from<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let messages =
            transcript::read_file(path).inspect_err(|_| TRANSCRIPT_IMPORT_ERRORS.click())?;
        Ok(self.adopt(messages))
    }

    fn adopt(&mut self, messages: Vec<Message>) -> usize {
        TRANSCRIPT_IMPORTS.click();
        let count = messages.len();
        self.store.replace_all(messages);
        count
    }

    /// The active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Returns the current model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: Option<f32>) {
        self.config.temperature = temperature;
    }

    /// Sets the top-p value.
    pub fn set_top_p(&mut self, top_p: Option<f32>) {
        self.config.top_p = top_p;
    }

    /// Sets the context window size.
    pub fn set_num_ctx(&mut self, num_ctx: Option<u32>) {
        self.config.num_ctx = num_ctx;
    }

    /// Turns streaming on or off.
    pub fn set_streaming(&mut self, stream: bool) {
        self.config.stream = stream;
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.message_count(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            num_ctx: self.config.num_ctx,
            stream: self.config.stream,
            pending_attachments: self.pending.len(),
            total_prompt_tokens: self.usage_totals.prompt_tokens,
            total_completion_tokens: self.usage_totals.completion_tokens,
            total_requests: self.request_count,
            last_turn_prompt_tokens: self.last_turn_usage.map(|usage| usage.prompt_tokens),
            last_turn_completion_tokens: self.last_turn_usage.map(|usage| usage.completion_tokens),
        }
    }
}

/// Apply each delta to the assistant tail until the server signals completion.
async fn drain_into_tail(
    mut stream: GenerationStream,
    store: &mut SessionStore,
    renderer: &mut dyn Renderer,
) -> Result<Usage> {
    while let Some(event) = stream.next().await {
        if let Some(usage) = apply_event(event?, store, renderer)? {
            return Ok(usage);
        }
    }
    Err(Error::truncated_stream())
}

/// Apply one event to the assistant tail.  Returns the usage once done.
fn apply_event(
    event: GenerationEvent,
    store: &mut SessionStore,
    renderer: &mut dyn Renderer,
) -> Result<Option<Usage>> {
    match event {
        GenerationEvent::Delta(delta) => {
            store.extend_assistant_tail(&delta)?;
            renderer.print_text(&delta);
            Ok(None)
        }
        GenerationEvent::Done(usage) => Ok(Some(usage)),
    }
}
