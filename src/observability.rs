use biometrics::{Collector, Counter, Moments};

pub(crate) static CHAT_REQUESTS: Counter = Counter::new("intellitutor.chat.requests");
pub(crate) static CHAT_REQUEST_ERRORS: Counter = Counter::new("intellitutor.chat.request_errors");
pub(crate) static CHAT_UNREACHABLE: Counter = Counter::new("intellitutor.chat.unreachable");
pub(crate) static CHAT_MALFORMED_RESPONSES: Counter =
    Counter::new("intellitutor.chat.malformed_responses");
pub(crate) static CHAT_REQUEST_DURATION: Moments =
    Moments::new("intellitutor.chat.request_duration_seconds");

pub(crate) static HEALTH_PROBES: Counter = Counter::new("intellitutor.health.probes");
pub(crate) static HEALTH_PROBE_FAILURES: Counter = Counter::new("intellitutor.health.failures");

pub(crate) static SESSION_SUBMISSIONS: Counter = Counter::new("intellitutor.session.submissions");
pub(crate) static SESSION_REFUSED_SUBMISSIONS: Counter =
    Counter::new("intellitutor.session.refused_submissions");
pub(crate) static SESSION_FEEDBACK: Counter = Counter::new("intellitutor.session.feedback");
pub(crate) static SESSION_COPIES: Counter = Counter::new("intellitutor.session.copies");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CHAT_REQUESTS);
    collector.register_counter(&CHAT_REQUEST_ERRORS);
    collector.register_counter(&CHAT_UNREACHABLE);
    collector.register_counter(&CHAT_MALFORMED_RESPONSES);
    collector.register_moments(&CHAT_REQUEST_DURATION);

    collector.register_counter(&HEALTH_PROBES);
    collector.register_counter(&HEALTH_PROBE_FAILURES);

    collector.register_counter(&SESSION_SUBMISSIONS);
    collector.register_counter(&SESSION_REFUSED_SUBMISSIONS);
    collector.register_counter(&SESSION_FEEDBACK);
    collector.register_counter(&SESSION_COPIES);
}
