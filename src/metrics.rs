//! Process metrics, rendered in the Prometheus text format by the web server.
//!
//! The registry is owned by a [`Metrics`] value shared between tasks rather
//! than installed as the global `metrics` recorder.

use metrics::{Key, KeyName, Label, Recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};

const SUBSCRIPTIONS_TOTAL: &str = "subscriptions_total";
const SENT_MESSAGES_TOTAL: &str = "sent_messages_total";
const BUILD_INFO: &str = "outage_bot_build_info";
const START_TIME: &str = "outage_bot_start_time_seconds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    Success,
    Failure,
}

impl SubscriptionOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

pub struct Metrics {
    recorder: PrometheusRecorder,
}

impl Metrics {
    pub fn new(revision: &str) -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();

        recorder.describe_counter(
            KeyName::from(SUBSCRIPTIONS_TOTAL),
            None,
            "Total number of subscription attempts by outcome.".into(),
        );
        recorder.describe_counter(
            KeyName::from(SENT_MESSAGES_TOTAL),
            None,
            "Total number of delivered outage notifications by service.".into(),
        );
        recorder.describe_gauge(
            KeyName::from(BUILD_INFO),
            None,
            "A metric with a constant '1' value with the build information."
                .into(),
        );
        recorder.describe_gauge(
            KeyName::from(START_TIME),
            None,
            "Unix timestamp of the process start time.".into(),
        );

        recorder
            .register_gauge(&Key::from_parts(
                BUILD_INFO,
                vec![Label::new("revision", revision.to_string())],
            ))
            .set(1.0);
        recorder.register_gauge(&Key::from_name(START_TIME)).set(
            std::time::UNIX_EPOCH.elapsed().unwrap_or_default().as_secs_f64(),
        );

        let metrics = Self { recorder };
        // Expose both outcomes from the start, even while still at zero.
        for outcome in [SubscriptionOutcome::Success, SubscriptionOutcome::Failure]
        {
            metrics.subscription_counter(outcome);
        }
        metrics
    }

    fn subscription_counter(&self, outcome: SubscriptionOutcome) -> metrics::Counter {
        self.recorder.register_counter(&Key::from_parts(
            SUBSCRIPTIONS_TOTAL,
            vec![Label::new("status", outcome.as_str())],
        ))
    }

    pub fn record_subscription(&self, outcome: SubscriptionOutcome) {
        self.subscription_counter(outcome).increment(1);
    }

    /// Count a notification delivered for `service` (e.g. "WATER").
    pub fn record_sent_message(&self, service: &str) {
        self.recorder
            .register_counter(&Key::from_parts(
                SENT_MESSAGES_TOTAL,
                vec![Label::new("service", service.to_string())],
            ))
            .increment(1);
    }

    pub fn render(&self) -> String {
        self.recorder.handle().render()
    }
}
