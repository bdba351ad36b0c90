//! Terminal UI for kerbside that shows the next collection day for each bin.

mod app;
mod input;
mod ui;

use std::{
    fs::File,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use kerbside_core::{
    AreaId, CollectionView, PortError,
    poller::{Clock, CycleOutcome, LocalClock, Poller, PollerConfig},
    service::KerbsideService,
};
use kerbside_provider_auckland as auckland;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::input::Action;

/// Next waste collection days for an Auckland Council area.
#[derive(Parser, Debug)]
#[command(name = "kerbside", version, about)]
struct Args {
    /// Area number to show; skips the entry screen.
    #[arg(short, long)]
    area: Option<String>,

    /// Hours between automatic refreshes (1 to 8760).
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u64).range(1..=8760))]
    interval_hours: u64,

    /// Seconds before a refresh is abandoned (1 to 3600).
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    timeout_secs: u64,

    /// Fetch once, print the result as JSON and exit.
    #[arg(long, requires = "area")]
    once: bool,

    /// Write logs to this file (the terminal UI owns stdout/stderr).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: StdDuration::from_secs(self.interval_hours * 60 * 60),
            deadline: StdDuration::from_secs(self.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // HTTP + service setup
    let client = Client::builder()
        .user_agent(auckland::USER_AGENT)
        .timeout(args.poller_config().deadline)
        .build()?;
    let service = Arc::new(KerbsideService::new(auckland::plugin(client)));

    if args.once {
        return print_once(&service, &args).await;
    }

    let mut app = App::new(service);
    if let Some(area) = &args.area {
        app.area_input.clone_from(area);
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, app, &args).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("kerbside={level}").parse()?)
        .add_directive(format!("kerbside_core={level}").parse()?)
        .add_directive(format!("kerbside_provider_auckland={level}").parse()?);

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.once {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

#[expect(clippy::print_stdout, reason = "--once writes its result to stdout")]
async fn print_once(service: &Arc<KerbsideService>, args: &Args) -> Result<()> {
    let area = AreaId::new(args.area.as_deref().unwrap_or_default());
    service.validate_area(&area).await?;

    let poller = Poller::new(Arc::clone(service), area.clone(), args.poller_config());
    let now = LocalClock.now();
    poller.run_cycle(now).await?;

    let today = now.date();
    let views: Vec<CollectionView> = poller
        .snapshot()
        .latest
        .iter()
        .flat_map(|published| published.result.iter())
        .filter_map(|(_category, record)| {
            record.map(|record| CollectionView::new(record, &area, today))
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    args: &Args,
) -> Result<()> {
    if !app.area_input.trim().is_empty() {
        submit_area(terminal, &mut app, args).await?;
    }

    loop {
        // Pick up results published by the background poller
        app.sync_state();

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::SubmitArea => {
                    submit_area(terminal, &mut app, args).await?;
                }
                Action::Refresh => {
                    if let Some(poller) = app.poller.clone() {
                        app.error_message = None;
                        tokio::spawn(async move {
                            // Outcome reaches the UI through the watch channel.
                            let _outcome: Result<CycleOutcome, PortError> =
                                poller.run_cycle(LocalClock.now()).await;
                        });
                    }
                }
            }
        }
    }

    app.stop_polling();
    Ok(())
}

async fn submit_area(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    args: &Args,
) -> Result<()> {
    let area = AreaId::new(&app.area_input);
    if area.is_empty() {
        app.error_message = Some("Type your area number, then press Enter".into());
        return Ok(());
    }

    app.is_loading = true;
    app.error_message = None;
    terminal.draw(|frame| ui::draw(frame, app))?;

    let res = app.service.validate_area(&area).await;

    app.is_loading = false;
    match res {
        Ok(()) => {
            let poller = Arc::new(Poller::new(
                Arc::clone(&app.service),
                area,
                args.poller_config(),
            ));
            // Subscribe before the first cycle can publish.
            let updates = poller.subscribe();
            let task = tokio::spawn(Arc::clone(&poller).run(LocalClock));
            app.start_polling(poller, updates, task);
        }
        Err(PortError::InvalidArea(rejected)) => {
            app.error_message = Some(format!("Invalid area: {rejected}"));
        }
        Err(err) => {
            app.error_message = Some(format!("Could not check area: {err}"));
        }
    }
    Ok(())
}
