//! Log subscriber setup and the scan progress bar.
//!
//! Log lines are written through the `tracing-indicatif` writer so they land above
//! the progress bar instead of tearing through it.

use indicatif::ProgressStyle;
use invscan_core::scanner::{HostProgress, ProgressFn};
use tracing::Span;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::terminal::logging::InvscanFormatter;

const BAR_TEMPLATE: &str = "{spinner:.blue} [{bar:30.green/bright_black}] {pos}/{len} {msg}";
const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Installs the global subscriber. `RUST_LOG` narrows or widens log output; plain
/// printed output stays visible regardless.
pub fn init_logging() {
    let indicatif_layer = IndicatifLayer::new();

    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    if let Ok(directive) = "invscan::print=info".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(InvscanFormatter)
                .with_writer(indicatif_layer.get_stdout_writer()),
        )
        .with(indicatif_layer)
        .init();
}

/// Styles `span` as the host progress bar.
pub fn style_scan_span(span: &Span) {
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        span.pb_set_style(&style.tick_strings(TICKS).progress_chars("█▓░"));
    }
    span.pb_set_message("resolving hosts...");
}

/// Sizes the bar once the host count is known.
pub fn on_resolved(span: Span) -> Box<dyn FnOnce(usize) + Send> {
    Box::new(move |total| {
        span.pb_set_length(total as u64);
        span.pb_set_message("");
    })
}

/// Advances the bar by one host.
pub fn on_host_done(span: Span) -> ProgressFn {
    Box::new(move |progress: HostProgress<'_>| {
        span.pb_inc(1);
        span.pb_set_message(progress.host.as_str());
        if progress.failed {
            tracing::debug!("{} did not answer cleanly", progress.host);
        }
    })
}
