//! Colored console output for solver and job events.
//!
//! [`init`] installs a `tracing` subscriber whose [`SolverConsoleLayer`]
//! renders the solver's structured events as one line each.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (solve and phase start/end, new best, jobs)
//! - **DEBUG**: Progress updates (1/sec with speed and score)
//!
//! `RUST_LOG` overrides the default `plansmith_solver=info` filter.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SOLVE_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes console output.
///
/// Only the first call has an effect. If another global subscriber is
/// already installed, it is left in place.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let mut filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
            if let Ok(directive) = "plansmith_solver=info".parse() {
                filter = filter.add_directive(directive);
            }
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SolverConsoleLayer)
            .try_init();
    });
}

fn print_banner() {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(
        stdout,
        "{} {}",
        "plansmith".bright_cyan().bold(),
        format!("v{VERSION}").bright_white()
    );
    let _ = stdout.flush();
}

fn mark_solve_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    SOLVE_START_NANOS.store(epoch.elapsed().as_nanos() as u64, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start = SOLVE_START_NANOS.load(Ordering::Relaxed);
    let now = epoch.elapsed().as_nanos() as u64;
    now.saturating_sub(start) as f64 / 1_000_000_000.0
}

/// A tracing layer that formats solver events with colors.
#[derive(Debug, Default, Clone, Copy)]
pub struct SolverConsoleLayer;

impl<S: Subscriber> Layer<S> for SolverConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("plansmith_solver") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{output}");
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    phase: Option<String>,
    score: Option<String>,
    problem_id: Option<String>,
    error: Option<String>,
    steps: Option<u64>,
    step: Option<u64>,
    speed: Option<u64>,
    duration_ms: Option<u64>,
    entity_count: Option<u64>,
    value_count: Option<u64>,
    constraints: Option<u64>,
    moves_evaluated: Option<u64>,
    feasible: Option<bool>,
    terminated_early: Option<bool>,
}

impl EventVisitor {
    fn record_text(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "phase" => self.phase = Some(value),
            "score" => self.score = Some(value),
            "problem_id" => self.problem_id = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{value:?}");
        self.record_text(field.name(), text.trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "steps" => self.steps = Some(value),
            "step" => self.step = Some(value),
            "speed" => self.speed = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "entity_count" => self.entity_count = Some(value),
            "value_count" => self.value_count = Some(value),
            "constraints" => self.constraints = Some(value),
            "moves_evaluated" => self.moves_evaluated = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "feasible" => self.feasible = Some(value),
            "terminated_early" => self.terminated_early = Some(value),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        "phase_start" => format_phase_start(v),
        "phase_end" => format_phase_end(v),
        "progress" => format_progress(v),
        "new_best" => format_new_best(v),
        "job_submitted" => format_job(v, "submitted"),
        "job_evicted" => format_job(v, "evicted"),
        "job_failed" => format_job(v, "failed"),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs()).bright_black().to_string()
}

fn number(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

fn format_solve_start(v: &EventVisitor) -> String {
    mark_solve_start();
    let entities = v.entity_count.unwrap_or(0);
    let values = v.value_count.unwrap_or(0);

    let mut output = format!(
        "{} {} Solving │ {} entities │ {} values │ scale {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        number(entities).bright_yellow(),
        number(values).bright_yellow(),
        problem_scale(entities, values).bright_magenta()
    );
    if let Some(constraints) = v.constraints.filter(|&c| c > 0) {
        output.push_str(&format!(" │ {} constraints", number(constraints).bright_yellow()));
    }
    output
}

fn format_solve_end(v: &EventVisitor) -> String {
    let score = v.score.as_deref().unwrap_or("N/A");
    let status = if v.feasible.unwrap_or(false) {
        "FEASIBLE".bright_green().bold().to_string()
    } else {
        "INFEASIBLE".bright_red().bold().to_string()
    };

    let mut output = format!(
        "{} {} Solving complete │ {} │ {} │ {} steps │ {} moves │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_score(score),
        status,
        number(v.steps.unwrap_or(0)).white(),
        number(v.moves_evaluated.unwrap_or(0)).white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    );
    if v.terminated_early == Some(true) {
        output.push_str(&format!(" │ {}", "terminated early".bright_yellow()));
    }
    output
}

fn format_phase_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} started",
        format_elapsed(),
        "▶".bright_blue(),
        v.phase.as_deref().unwrap_or("Unknown").white().bold()
    )
}

fn format_phase_end(v: &EventVisitor) -> String {
    format!(
        "{} {} {} ended │ {} │ {} steps │ {} moves/s │ {}",
        format_elapsed(),
        "◀".bright_blue(),
        v.phase.as_deref().unwrap_or("Unknown").white().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        number(v.steps.unwrap_or(0)).white(),
        number(v.speed.unwrap_or(0)).bright_magenta().bold(),
        format_score(v.score.as_deref().unwrap_or("N/A")),
    )
}

fn format_progress(v: &EventVisitor) -> String {
    format!(
        "{} {} {:>10} steps │ {:>12}/s │ {}",
        format_elapsed(),
        "⚡".bright_cyan(),
        number(v.steps.unwrap_or(0)).white(),
        number(v.speed.unwrap_or(0)).bright_magenta().bold(),
        format_score(v.score.as_deref().unwrap_or("N/A"))
    )
}

fn format_new_best(v: &EventVisitor) -> String {
    format!(
        "{} {} New best at step {} │ {}",
        format_elapsed(),
        "★".bright_yellow(),
        number(v.step.unwrap_or(0)).white(),
        format_score(v.score.as_deref().unwrap_or("N/A"))
    )
}

fn format_job(v: &EventVisitor, what: &str) -> String {
    let mut output = format!(
        "{} {} Job {} {}",
        format_elapsed(),
        "●".bright_blue(),
        v.problem_id.as_deref().unwrap_or("?").bright_white().bold(),
        what
    );
    if let Some(error) = &v.error {
        output.push_str(&format!(" │ {}", error.bright_red()));
    }
    output
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}

/// Colors each level of a score such as `0hard/-2medium/-30soft`.
fn format_score(score: &str) -> String {
    if !score.contains("hard") {
        return score.white().to_string();
    }
    score
        .split('/')
        .map(|part| {
            let number = part.trim_end_matches(|c: char| c.is_ascii_alphabetic());
            let negative = number.starts_with('-') && !number.trim_start_matches(['-', '0', '.']).is_empty();
            match (negative, part.ends_with("hard")) {
                (true, true) => part.bright_red().to_string(),
                (true, false) => part.yellow().to_string(),
                (false, _) => part.bright_green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Rough size of the search space, assuming values spread evenly over entities.
fn problem_scale(entity_count: u64, value_count: u64) -> String {
    if entity_count == 0 || value_count == 0 {
        return "0".to_string();
    }
    let per_entity = (value_count as f64 / entity_count as f64).max(1.0);
    let log_scale = entity_count as f64 * per_entity.log10();
    let exponent = log_scale.floor();
    let mantissa = 10f64.powf(log_scale - exponent);
    format!("{mantissa:.3} x 10^{exponent}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_events_are_silent() {
        assert!(format_event(&visitor("step")).is_empty());
        assert!(format_event(&EventVisitor::default()).is_empty());
    }

    #[test]
    fn test_solve_start_formats_counts() {
        let mut v = visitor("solve_start");
        v.entity_count = Some(12_000);
        v.value_count = Some(240_000);
        v.constraints = Some(6);
        let line = format_event(&v);
        assert!(line.contains("12,000"));
        assert!(line.contains("240,000"));
        assert!(line.contains("constraints"));
    }

    #[test]
    fn test_solve_end_marks_early_termination() {
        let mut v = visitor("solve_end");
        v.score = Some("0hard/-5soft".to_string());
        v.feasible = Some(true);
        v.terminated_early = Some(true);
        let line = format_event(&v);
        assert!(line.contains("FEASIBLE"));
        assert!(line.contains("terminated early"));
    }

    #[test]
    fn test_job_failure_shows_error() {
        let mut v = visitor("job_failed");
        v.problem_id = Some("p7".to_string());
        v.error = Some("score corruption".to_string());
        let line = format_event(&v);
        assert!(line.contains("p7"));
        assert!(line.contains("score corruption"));
    }

    #[test]
    fn test_score_levels_keep_their_text() {
        let colored = format_score("-1hard/0medium/-2.5soft");
        for part in ["-1hard", "0medium", "-2.5soft"] {
            assert!(colored.contains(part));
        }
        assert_eq!(format_score("N/A"), "N/A".white().to_string());
    }

    #[test]
    fn test_durations() {
        assert_eq!(format_duration_ms(999), "999ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_problem_scale() {
        assert_eq!(problem_scale(0, 10), "0");
        // 3 entities with 10 values each
        assert_eq!(problem_scale(3, 30), "1.000 x 10^3");
    }
}
