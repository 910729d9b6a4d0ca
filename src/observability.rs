use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("nexus.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("nexus.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("nexus.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("nexus.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("nexus.stream.errors");
pub(crate) static STREAM_TRUNCATED: Counter = Counter::new("nexus.stream.truncated");
pub(crate) static STREAM_BYTES: Counter = Counter::new("nexus.stream.bytes");

pub(crate) static SESSION_SENDS: Counter = Counter::new("nexus.session.sends");
pub(crate) static SESSION_SEND_ERRORS: Counter = Counter::new("nexus.session.send_errors");
pub(crate) static SESSION_ROLLBACKS: Counter = Counter::new("nexus.session.rollbacks");
pub(crate) static ATTACHMENT_READ_ERRORS: Counter =
    Counter::new("nexus.prompt.attachment_read_errors");

pub(crate) static TRANSCRIPT_EXPORTS: Counter = Counter::new("nexus.transcript.exports");
pub(crate) static TRANSCRIPT_IMPORTS: Counter = Counter::new("nexus.transcript.imports");
pub(crate) static TRANSCRIPT_IMPORT_ERRORS: Counter =
    Counter::new("nexus.transcript.import_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_TRUNCATED);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&SESSION_SENDS);
    collector.register_counter(&SESSION_SEND_ERRORS);
    collector.register_counter(&SESSION_ROLLBACKS);
    collector.register_counter(&ATTACHMENT_READ_ERRORS);

    collector.register_counter(&TRANSCRIPT_EXPORTS);
    collector.register_counter(&TRANSCRIPT_IMPORTS);
    collector.register_counter(&TRANSCRIPT_IMPORT_ERRORS);
}
