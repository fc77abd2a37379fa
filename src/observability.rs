use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("kizazi.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("kizazi.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("kizazi.client.request_duration_seconds");

pub(crate) static SESSION_CREATED: Counter = Counter::new("kizazi.session.created");
pub(crate) static SESSION_CREATE_FAILURES: Counter =
    Counter::new("kizazi.session.create_failures");
pub(crate) static SESSION_RESETS: Counter = Counter::new("kizazi.session.resets");

pub(crate) static EXCHANGE_REPLIES: Counter = Counter::new("kizazi.exchange.replies");
pub(crate) static EXCHANGE_EMPTY: Counter = Counter::new("kizazi.exchange.empty");
pub(crate) static EXCHANGE_UNAVAILABLE: Counter = Counter::new("kizazi.exchange.unavailable");
pub(crate) static EXCHANGE_FAILED: Counter = Counter::new("kizazi.exchange.failed");
pub(crate) static EXCHANGE_DURATION: Moments =
    Moments::new("kizazi.exchange.duration_seconds");

pub(crate) static CONTACT_SUBMISSIONS: Counter = Counter::new("kizazi.contact.submissions");
pub(crate) static CONTACT_FAILURES: Counter = Counter::new("kizazi.contact.failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_CREATED);
    collector.register_counter(&SESSION_CREATE_FAILURES);
    collector.register_counter(&SESSION_RESETS);

    collector.register_counter(&EXCHANGE_REPLIES);
    collector.register_counter(&EXCHANGE_EMPTY);
    collector.register_counter(&EXCHANGE_UNAVAILABLE);
    collector.register_counter(&EXCHANGE_FAILED);
    collector.register_moments(&EXCHANGE_DURATION);

    collector.register_counter(&CONTACT_SUBMISSIONS);
    collector.register_counter(&CONTACT_FAILURES);
}
