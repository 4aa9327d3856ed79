//! Terminal output: spinners while models work, colored job summaries.

use chrono::{DateTime, Local};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use coldmail::{ChainError, JobPosting};

/// Spinner shown while a pipeline stage runs.
pub struct StageSpinner {
    pb: ProgressBar,
    green: Style,
}

impl StageSpinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
        }
    }

    pub fn done(&self, message: &str) {
        self.pb.finish_and_clear();
        eprintln!("  {} {message}", self.green.apply_to("✓"));
    }

    pub fn fail(&self) {
        self.pb.finish_and_clear();
    }
}

/// Header, experience and skills of one extracted posting.
pub fn print_job(index: usize, job: &JobPosting, tone: &str, cta: &str) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let chip = Style::new().cyan();

    let role = job.role();
    let role = if role.is_empty() { "Software Engineer".to_string() } else { role };
    let experience = job.experience();

    println!();
    println!(
        "{} {}",
        bold.apply_to(format!("#{index} {role}")),
        dim.apply_to(format!("[{tone}] [{cta}]"))
    );
    let description = job.description();
    if !description.is_empty() {
        println!("{description}");
    }
    println!(
        "{} {}",
        bold.apply_to("Experience:"),
        if experience.is_empty() { "N/A" } else { experience.as_str() }
    );

    let skills = job.skills();
    if skills.is_empty() {
        println!("{}", dim.apply_to("No skills parsed."));
    } else {
        let chips: Vec<String> = skills
            .iter()
            .map(|s| chip.apply_to(format!("[{s}]")).to_string())
            .collect();
        println!("{} {}", bold.apply_to("Skills:"), chips.join(" "));
    }
}

pub fn print_email(text: &str) {
    let rule = Style::new().dim().apply_to("─".repeat(60));
    println!("{rule}");
    println!("{text}");
    println!("{rule}");
}

/// User-facing failure message. Rate-limit exhaustion gets actionable advice.
pub fn print_failure(err: &ChainError) {
    let red = Style::new().red().bold();
    if err.is_rate_limited() {
        eprintln!(
            "{} Rate limit reached for your provider account. Try again later, \
             or configure a separate key (GROQ_API_KEY_FAST / GROQ_API_KEY_HEAVY / GEMINI_API_KEY).",
            red.apply_to("✗")
        );
    } else {
        eprintln!("{} An error occurred: {err}", red.apply_to("✗"));
    }
}

/// `email_20250101_120000_1.txt`
pub fn email_file_name(at: DateTime<Local>, index: usize) -> String {
    format!("email_{}_{index}.txt", at.format("%Y%m%d_%H%M%S"))
}
