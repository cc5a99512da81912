//! Define the navigate subcommand, an interactive terminal navigator
use super::{build_widget, step_line, summary_line};
use crate::config::Config;
use crate::itinerary::{compute_itinerary, RouteItinerary};
use crate::planner::RouteStatus;
use crate::services::routing::RouteRequest;
use crate::travel_mode::TravelMode;
use crate::widget::NavigatorWidget;
use crate::Error;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::{debug, info};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use structopt::StructOpt;
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

/// How long to wait for a key before checking for finished routing requests
const TICK: Duration = Duration::from_millis(200);

const HELP: &str = "1-9 city | j/k step | enter speak | m mode | n voice | l locate | \
                    s style | t retry | r reset | x dismiss | q quit";

type RouteResult = (u64, Result<RouteItinerary, Error>);

/// Open the navigator, optionally with a route already requested
#[derive(Debug, StructOpt)]
pub struct NavigateOpts {
    /// Start of the route, a configured city name or "lon,lat"
    #[structopt(name = "FROM")]
    from: Option<String>,
    /// End of the route, a configured city name or "lon,lat"
    #[structopt(name = "TO")]
    to: Option<String>,
    /// Travel mode: driving, cycling or walking
    #[structopt(short, long, default_value = "driving")]
    mode: TravelMode,
}

pub fn navigate_command(
    config: Config,
    opts: NavigateOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut widget = build_widget(&config, true, true)?;
    let (tx, rx) = mpsc::channel();

    widget.set_mode(opts.mode);
    if let Some(from) = &opts.from {
        let request = widget.set_start(config.resolve_location(from)?);
        dispatch(&widget, &tx, request);
    }
    if let Some(to) = &opts.to {
        let request = widget.set_end(config.resolve_location(to)?);
        dispatch(&widget, &tx, request);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut widget, &tx, &rx);

    // restore the terminal before reporting anything that went wrong
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Run the routing request on a worker, the result comes back through `tx`
fn dispatch(widget: &NavigatorWidget, tx: &Sender<RouteResult>, request: Option<RouteRequest>) {
    let request = match request {
        Some(request) => request,
        None => return,
    };
    let routing = widget.routing();
    let tx = tx.clone();
    thread::spawn(move || {
        let result = compute_itinerary(routing.as_ref(), &request);
        if tx.send((request.token(), result)).is_err() {
            debug!("navigator closed before request {} finished", request.token());
        }
    });
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    widget: &mut NavigatorWidget,
    tx: &Sender<RouteResult>,
    rx: &Receiver<RouteResult>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok((token, result)) = rx.try_recv() {
            widget.complete(token, result);
        }
        terminal.draw(|f| draw(f, widget))?;

        if !event::poll(TICK)? {
            continue;
        }
        let key = match event::read()? {
            Event::Key(key) => key,
            _ => continue,
        };
        let request = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("leaving the navigator");
                return Ok(());
            }
            KeyCode::Down | KeyCode::Char('j') => {
                widget.next_step();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                widget.previous_step();
                None
            }
            KeyCode::Enter => {
                widget.select_step(widget.planner().current_step_index());
                None
            }
            KeyCode::Char('m') => widget.cycle_mode(),
            KeyCode::Char('n') => {
                widget.toggle_narration();
                None
            }
            KeyCode::Char('l') => widget.start_from_user_location(),
            KeyCode::Char('s') => {
                widget.cycle_style();
                None
            }
            KeyCode::Char('t') => widget.retry(),
            KeyCode::Char('r') => {
                widget.reset();
                None
            }
            KeyCode::Char('x') => {
                widget.dismiss_feedback();
                None
            }
            KeyCode::Char(c) => match c.to_digit(10) {
                Some(n) if n > 0 => match widget.cities().get(n as usize - 1).cloned() {
                    Some(city) => widget.click_map(city),
                    None => None,
                },
                _ => None,
            },
            _ => None,
        };
        dispatch(widget, tx, request);
    }
}

fn draw<B: Backend>(f: &mut Frame<B>, widget: &NavigatorWidget) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    let planner = widget.planner();
    let point = |p: Option<&crate::gps::GeoPoint>| match p {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    };
    let style_name = match widget.map() {
        Some(map) => map.style().name().to_string(),
        None => "unavailable".to_string(),
    };
    let header = Paragraph::new(Spans::from(vec![
        Span::styled("From ", Style::default().fg(Color::Green)),
        Span::raw(point(planner.start())),
        Span::styled("  To ", Style::default().fg(Color::Red)),
        Span::raw(point(planner.end())),
        Span::raw(format!(
            "  | {} | voice {} | map {}",
            planner.mode().label(),
            if widget.narration_enabled() { "on" } else { "off" },
            style_name
        )),
    ]))
    .block(Block::default().borders(Borders::ALL).title("City Navigator"));
    f.render_widget(header, chunks[0]);

    let status = match (widget.feedback(), planner.status()) {
        (Some(feedback), _) => Span::styled(
            format!("{} (x to dismiss)", feedback),
            Style::default().fg(Color::Yellow),
        ),
        (None, RouteStatus::Idle) => Span::raw("Pick a start and an end"),
        (None, RouteStatus::Pending) => Span::raw("Calculating route..."),
        (None, RouteStatus::Ready) => match planner.itinerary() {
            Some(itinerary) => Span::raw(summary_line(itinerary, Local::now())),
            None => Span::raw(""),
        },
        (None, RouteStatus::Unavailable(reason)) => Span::styled(
            format!("Route unavailable: {}", reason),
            Style::default().fg(Color::Red),
        ),
    };
    let status = Paragraph::new(status)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Route"));
    f.render_widget(status, chunks[1]);

    let items: Vec<ListItem> = planner
        .itinerary()
        .map(|itinerary| {
            itinerary
                .steps()
                .iter()
                .enumerate()
                .map(|(i, step)| ListItem::new(format!("{:>3}. {}", i, step_line(step))))
                .collect()
        })
        .unwrap_or_default();
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(planner.current_step_index()));
    }
    let title = match widget.last_utterance() {
        Some(said) => format!("Steps | said: {}", said),
        None => "Steps".to_string(),
    };
    let steps = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(steps, chunks[2], &mut state);

    let cities = widget
        .cities()
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, city)| format!("{} {}", i + 1, city))
        .collect::<Vec<String>>()
        .join("  ");
    let cities = Paragraph::new(cities)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Cities"));
    f.render_widget(cities, chunks[3]);

    f.render_widget(
        Paragraph::new(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
        chunks[4],
    );
}
