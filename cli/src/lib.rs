//! deckfill CLI - fill a PowerPoint template with AI-generated slides
//!
//! Shared by the `deckfill-trim` and `deckfill-enhance` binaries, which
//! differ only in the output variant.

use clap::Parser;
use colored::*;
use deckfill::config::{DEFAULT_TEMPLATE, SOLID_BACKGROUND};
use deckfill::{Config, ErrorKind, RunReport, Variant};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Fill a PowerPoint template with AI-generated slides
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fill a PowerPoint template with AI-generated slides",
    long_about = "Reads a .pptx template, asks the OpenAI API for slide content and writes a new deck \
                  on the template's layouts.\n\n\
                  Keys are read from the environment or a .env file: OPEN_AI (text service) and \
                  UNSPLASH_API_KEY (pictures, enhanced decks only)."
)]
pub struct Args {
    /// Template file
    #[arg(default_value = DEFAULT_TEMPLATE)]
    pub template: PathBuf,

    /// Output file (default: <template>_trimmed.pptx or <template>_enhanced.pptx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Subject of the generated deck
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Number of slides to generate (default: the template's slide count)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub slides: Option<u16>,

    /// Minimum importance score (1-10) a slide needs to stay in a trimmed deck
    #[arg(long, default_value_t = deckfill::variant::DEFAULT_SCORE_THRESHOLD, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub threshold: u8,

    /// Give every slide a solid cream background
    #[arg(long)]
    pub solid_bg: bool,
}

impl Args {
    /// Apply the command-line options on top of the environment settings.
    pub fn apply(self, mut config: Config) -> Config {
        config.template = self.template;
        config.output = self.output;
        config.topic = self.topic;
        config.slides = self.slides.map(usize::from);
        config.threshold = self.threshold;
        config.background = self.solid_bg.then(|| SOLID_BACKGROUND.to_string());
        config
    }
}

/// Entry point of both binaries.
pub fn main(variant: Variant) {
    let args = Args::parse();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(args, variant) {
        let label = match e.kind() {
            ErrorKind::Configuration => "Configuration error",
            ErrorKind::ExternalService => "Service error",
            ErrorKind::Io => "I/O error",
        };
        eprintln!("{}: {}", label.red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: Args, variant: Variant) -> deckfill::Result<()> {
    let config = args.apply(Config::from_env()?);
    log::debug!("{:?}", config);

    let pb = create_spinner(&format!("Building {} deck...", variant));
    let result = deckfill::run(&config, variant);
    pb.finish_and_clear();

    print_report(&result?);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!(
        "{} Wrote {} deck: {}",
        "✓".green().bold(),
        report.variant,
        report.output.display()
    );
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Template slides".bold(), report.template_slides);
    println!("{}: {}", "Generated slides".bold(), report.generated_slides);
    println!("{}: {}", "Slides written".bold(), report.slides);
    println!("{}: {}", "Bullets".bold(), report.bullets);
    if report.variant == Variant::Enhanced {
        println!("{}: {}", "Pictures".bold(), report.images);
        let pictured = report.slides - usize::from(report.cover);
        if report.images < pictured {
            println!(
                "{} {} slides without a matching picture",
                "!".yellow().bold(),
                pictured - report.images
            );
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
