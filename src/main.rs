use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shiken::app::{App, Feedback};
use shiken::config::Config;
use shiken::engine::mode::{Chapter, Mode};
use shiken::event::{AppEvent, EventHandler};
use shiken::lookup;
use shiken::ui::components::lookup_popup::LookupPopup;
use shiken::ui::components::progress_bar::ProgressBar;
use shiken::ui::components::question_set::{QuestionCard, QuestionSet, render_passage};
use shiken::ui::components::report_view::ReportView;
use shiken::ui::components::stats_view::StatsView;
use shiken::ui::theme::Theme;
use shiken::ui::{Canvas, Widget};

#[derive(Parser)]
#[command(name = "shiken", version, about = "Practice tests assembled from a local question bank")]
struct Cli {
    #[arg(short, long, global = true, help = "Question bank directory")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an assembled question set
    Assemble {
        #[arg(short, long, help = "Test mode (vocabulary, grammar_reading, combined, mock_test, reading_drill, photo_reading_full)")]
        mode: Option<String>,
        #[arg(short, long, default_value = "1", help = "Chapter number, random or full")]
        chapter: String,
        #[arg(long, help = "Reveal answers")]
        study: bool,
        #[arg(long, help = "Print the items as JSON")]
        json: bool,
    },
    /// Take a test interactively
    Take {
        #[arg(short, long)]
        mode: Option<String>,
        #[arg(short, long, default_value = "1")]
        chapter: String,
        #[arg(long)]
        study: bool,
    },
    /// Show where correct answers fall in each pool
    Stats,
    /// Look up a Japanese word
    Lookup { word: String },
    /// Show or set the color theme
    Theme { name: Option<String> },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiken=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(dir) = cli.data {
        config.data_dir = dir.to_string_lossy().to_string();
    }

    match cli.command {
        Command::Theme { name } => theme_command(config, name),
        Command::Lookup { word } => lookup_command(&config, &word),
        Command::Stats => {
            let app = App::new(config)?;
            let stats = app.stats();
            print_widget(StatsView::new(&stats, &app.theme));
            Ok(())
        }
        Command::Assemble {
            mode,
            chapter,
            study,
            json,
        } => {
            let mode = parse_mode(mode.as_deref(), &config)?;
            let mut app = App::new(config)?;
            app.start_session(mode, Chapter::parse(&chapter), study);
            let Some(session) = app.session.as_ref() else {
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(session.items())?);
            } else {
                print_widget(QuestionSet::new(session, &app.layout, &app.theme));
            }
            Ok(())
        }
        Command::Take {
            mode,
            chapter,
            study,
        } => {
            let mode = parse_mode(mode.as_deref(), &config)?;
            let mut app = App::new(config)?;
            app.start_session(mode, Chapter::parse(&chapter), study);
            run_session(&mut app)
        }
    }
}

fn parse_mode(mode: Option<&str>, config: &Config) -> Result<Mode> {
    match mode {
        None => Ok(config.mode()),
        Some(key) => match Mode::from_key(key) {
            Some(mode) => Ok(mode),
            None => {
                let known: Vec<&str> = Mode::all().iter().map(|m| m.as_str()).collect();
                bail!("unknown mode {key:?}; expected one of {}", known.join(", "))
            }
        },
    }
}

fn color_enabled() -> bool {
    io::stdout().is_terminal()
}

fn print_widget(widget: impl Widget) {
    let mut canvas = Canvas::new(color_enabled());
    widget.render(&mut canvas);
    print!("{}", canvas.into_string());
}

fn theme_command(mut config: Config, name: Option<String>) -> Result<()> {
    match name {
        None => println!("{}", config.theme),
        Some(name) => {
            if !config.set_theme(&name) {
                bail!("unknown theme {name:?}; expected light or dark");
            }
            config.save()?;
            println!("theme set to {name}");
        }
    }
    Ok(())
}

fn lookup_command(config: &Config, word: &str) -> Result<()> {
    if !lookup::should_lookup(word) {
        bail!("{word:?} is not a Japanese word of 1-30 characters");
    }
    let theme = Theme::load(&config.theme).unwrap_or_default();
    let outcome = lookup::spawn_lookup(word.to_string()).recv()?;
    print_widget(LookupPopup::new(&outcome, &theme));
    Ok(())
}

fn show_current(app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let Some(entry) = app.current_entry() else {
        return;
    };
    let mut canvas = Canvas::new(color_enabled());
    if let Some((section, block)) = app.layout.sections.iter().find_map(|s| {
        s.blocks
            .iter()
            .find(|b| b.entries.contains(&entry))
            .map(|b| (s, b))
    }) {
        canvas.blank();
        if let Some(header) = &section.header {
            canvas.line(header.clone());
        }
        // The passage is shown with the first question of its block.
        if block.entries.first() == Some(&entry) {
            render_passage(&mut canvas, block, &app.theme);
        }
    }
    QuestionCard::new(session, entry, &app.theme).render(&mut canvas);
    ProgressBar::counts(
        &session.progress_label(),
        session.answered_count(),
        session.total_questions(),
        &app.theme,
    )
    .render(&mut canvas);
    print!("{}", canvas.into_string());
    print!("> ");
    let _ = io::stdout().flush();
}

fn run_session(app: &mut App) -> Result<()> {
    let Some(session) = app.session.as_ref() else {
        return Ok(());
    };
    if session.total_questions() == 0 {
        println!("問題がありません (no questions available)");
        return Ok(());
    }
    if session.mode().is_read_only() {
        // Review mode: show everything with answers, nothing to submit.
        print_widget(QuestionSet::new(session, &app.layout, &app.theme));
        return Ok(());
    }

    let events = EventHandler::new(Duration::from_secs(1));
    show_current(app);

    while !app.should_quit {
        match events.next()? {
            AppEvent::Tick => {
                app.tick();
                if let Some(outcome) = app.poll_lookup() {
                    println!();
                    print_widget(LookupPopup::new(&outcome, &app.theme));
                    print!("> ");
                    let _ = io::stdout().flush();
                }
            }
            AppEvent::Line(line) => {
                match app.handle_line(&line) {
                    Feedback::Answered { number, submission } => {
                        let verdict = if submission.correct { "正解！" } else { "不正解" };
                        let answer = submission.correct_index.map_or(0, |i| i + 1);
                        println!("({number}) {verdict} 正解: {answer}");
                    }
                    Feedback::Rejected { number } => println!("({number}) already answered"),
                    Feedback::Skipped => {}
                    Feedback::LookupStarted(word) => println!("looking up {word}..."),
                    Feedback::Invalid(msg) => println!("{msg}"),
                    Feedback::Finished => break,
                }
                show_current(app);
            }
            AppEvent::Eof => break,
        }
    }

    app.finish_session();
    if let Some(report) = app.last_report.as_ref() {
        println!();
        print_widget(ReportView::new(report, &app.theme));
    }
    Ok(())
}
