//! Colorful console output for pipeline progress.
//!
//! Provides a custom `tracing` layer that formats factoring and
//! integerization events with colors.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect. The level
/// defaults to INFO and can be raised with `RUST_LOG`, e.g.
/// `RUST_LOG=popsim_integerizer=debug`. Does nothing if another global
/// subscriber is already installed.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(PopsimConsoleLayer)
            .try_init();
    });
}

fn print_banner() {
    let banner = r#"
 ____             ____  _
|  _ \ ___  _ __ / ___|(_)_ __ ___
| |_) / _ \| '_ \\___ \| | '_ ` _ \
|  __/ (_) | |_) |___) | | | | | | |
|_|   \___/| .__/|____/|_|_| |_| |_|
           |_|
"#;

    let version_line = format!(
        "      v{} - Control Factoring & Seed Integerization\n",
        env!("CARGO_PKG_VERSION")
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats pipeline events with colors.
pub struct PopsimConsoleLayer;

impl<S: Subscriber> Layer<S> for PopsimConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        // Only handle popsim events
        if !metadata.target().starts_with("popsim") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(*metadata.level(), &visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    step: Option<String>,
    zone: Option<String>,
    target: Option<String>,
    status: Option<String>,
    score: Option<String>,
    cause: Option<String>,
    reason: Option<String>,
    error: Option<String>,
    households: Option<u64>,
    targets: Option<u64>,
    total: Option<u64>,
    zones: Option<u64>,
    seed_zones: Option<u64>,
    threads: Option<u64>,
    failed: Option<u64>,
    succeeded: Option<u64>,
    timed_out: Option<u64>,
    diagnostics: Option<u64>,
    integer_total: Option<u64>,
    duration_ms: Option<u64>,
    integerized: Option<bool>,
    complete: Option<bool>,
}

impl EventVisitor {
    fn text(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "step" => self.step = Some(value),
            "zone" => self.zone = Some(value),
            "target" => self.target = Some(value),
            "status" => self.status = Some(value),
            "score" => self.score = Some(value),
            "cause" => self.cause = Some(value),
            "reason" => self.reason = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "households" => self.households = Some(value),
            "targets" => self.targets = Some(value),
            "total" => self.total = Some(value),
            "zones" => self.zones = Some(value),
            "seed_zones" => self.seed_zones = Some(value),
            "threads" => self.threads = Some(value),
            "failed" => self.failed = Some(value),
            "succeeded" => self.succeeded = Some(value),
            "timed_out" => self.timed_out = Some(value),
            "diagnostics" => self.diagnostics = Some(value),
            "integer_total" => self.integer_total = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "integerized" => self.integerized = Some(value),
            "complete" => self.complete = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.text(field.name(), value.to_string());
    }
}

fn format_event(level: Level, v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "pipeline_start" => format_pipeline_start(v),
        "step_start" => format_step_start(v),
        "step_end" => format_step_end(v),
        "dispatch" => format_dispatch(v),
        "zone_integerized" => format_zone_integerized(v),
        "pipeline_end" => format_pipeline_end(v),
        _ if level <= Level::WARN => format_problem(level, v),
        _ => String::new(),
    }
}

fn format_pipeline_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} Pipeline started: households ({}), control targets ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[PopSim]".bright_cyan(),
        v.households.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
        v.targets.unwrap_or(0).to_string().bright_yellow(),
    )
}

fn format_step_start(v: &EventVisitor) -> String {
    let step = v.step.as_deref().unwrap_or("unknown");
    format!(
        "{} {} {} {} started",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!("[{}]", step).bright_cyan(),
        step.white().bold(),
    )
}

fn format_step_end(v: &EventVisitor) -> String {
    let step = v.step.as_deref().unwrap_or("unknown");
    let duration = format_duration_ms(v.duration_ms.unwrap_or(0));

    let detail = match (v.seed_zones, v.zones) {
        (Some(seed_zones), _) => format!(
            "seed zones ({}), diagnostics ({})",
            seed_zones.to_formatted_string(&Locale::en).white(),
            v.diagnostics.unwrap_or(0).to_string().yellow(),
        ),
        (None, Some(zones)) => format!(
            "zones ({}), failed ({}), timed out ({}), households ({})",
            zones.to_formatted_string(&Locale::en).white(),
            v.failed.unwrap_or(0).to_string().yellow(),
            v.timed_out.unwrap_or(0).to_string().yellow(),
            v.integer_total
                .unwrap_or(0)
                .to_formatted_string(&Locale::en)
                .bright_magenta()
                .bold(),
        ),
        (None, None) => String::new(),
    };

    format!(
        "{} {} {} {} ended: time spent ({}), {}",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!("[{}]", step).bright_cyan(),
        step.white().bold(),
        duration.yellow(),
        detail,
    )
}

fn format_dispatch(v: &EventVisitor) -> String {
    format!(
        "{} {} {} {} seed zones on {} threads",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Dispatch]".bright_cyan(),
        v.zones.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
        v.threads.unwrap_or(0).to_string().bright_yellow(),
    )
}

fn format_zone_integerized(v: &EventVisitor) -> String {
    format!(
        "    {} Zone {:>8} | {:<18} | {:>9} hh | {} | {}",
        "->".bright_blue(),
        v.zone.as_deref().unwrap_or("?").white(),
        v.status.as_deref().unwrap_or("?"),
        v.total.unwrap_or(0).to_formatted_string(&Locale::en),
        format_score(v.score.as_deref().unwrap_or("N/A")),
        format_duration_ms(v.duration_ms.unwrap_or(0)).bright_black(),
    )
}

fn format_problem(level: Level, v: &EventVisitor) -> String {
    let event = v.event.as_deref().unwrap_or("event");
    let mut parts = Vec::new();
    if let Some(zone) = &v.zone {
        parts.push(format!("zone {}", zone));
    }
    if let Some(target) = &v.target {
        parts.push(format!("target {}", target));
    }
    for detail in [&v.cause, &v.reason, &v.error].into_iter().flatten() {
        parts.push(detail.clone());
    }

    let label = if level == Level::ERROR {
        "ERROR".bright_red().bold().to_string()
    } else {
        "WARN ".yellow().to_string()
    };
    format!(
        "{} {} {} {}",
        timestamp().bright_black(),
        label,
        format!("[{}]", event).bright_cyan(),
        parts.join(", "),
    )
}

fn format_pipeline_end(v: &EventVisitor) -> String {
    let complete = v.complete.unwrap_or(false);
    let integerized = v.integerized.unwrap_or(false);
    let duration = format_duration_ms(v.duration_ms.unwrap_or(0));
    let integer_total = v.integer_total.unwrap_or(0).to_formatted_string(&Locale::en);
    let diagnostics = v.diagnostics.unwrap_or(0).to_string();

    let mut output = format!(
        "{} {} {} Pipeline ended: time spent ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[PopSim]".bright_cyan(),
        duration.yellow(),
    );

    output.push_str("\n\n");
    output.push_str(&"╔══════════════════════════════════════════════════════════╗".bright_cyan().to_string());
    output.push('\n');

    let status_text = match (integerized, complete) {
        (false, _) => "FACTORED (integerization skipped)",
        (true, true) => "INTEGER WEIGHTS WRITTEN",
        (true, false) => "PARTIAL (some zones failed)",
    };
    let status_colored = match (integerized, complete) {
        (true, false) => format!("  {}  ", status_text).bright_red().bold().to_string(),
        _ => format!("  {}  ", status_text).bright_green().bold().to_string(),
    };
    let status_padding = 56 - status_text.len() - 4;
    let left_pad = status_padding / 2;
    let right_pad = status_padding - left_pad;
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(&"╠══════════════════════════════════════════════════════════╣".bright_cyan().to_string());
    output.push('\n');

    for (label, value) in [
        ("Integer households:", integer_total.as_str()),
        ("Diagnostics:", diagnostics.as_str()),
    ] {
        output.push_str(&format!(
            "{}  {:<20}{:>34}  {}",
            "║".bright_cyan(),
            label,
            value,
            "║".bright_cyan()
        ));
        output.push('\n');
    }

    output.push_str(&"╚══════════════════════════════════════════════════════════╝".bright_cyan().to_string());
    output.push('\n');

    output
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

// Colors a "Xhard/Ymedium/Zsoft" score level by level.
fn format_score(score: &str) -> String {
    let levels: Vec<&str> = score.split('/').collect();
    if levels.len() != 3 {
        return score.white().to_string();
    }

    levels
        .iter()
        .zip(["hard", "medium", "soft"])
        .map(|(level, suffix)| {
            let value: i64 = level.trim_end_matches(suffix).parse().unwrap_or(0);
            if value == 0 {
                level.bright_green().to_string()
            } else if suffix == "hard" {
                level.bright_red().to_string()
            } else {
                level.yellow().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
