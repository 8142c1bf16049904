use anyhow::{Context, Result};
use clap::Parser;
use county_choropleth::app::App;
use county_choropleth::classify::Palette;
use county_choropleth::config::Args;
use county_choropleth::map::ChoroplethRenderer;
use county_choropleth::{data, join, ui};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // Load before taking over the terminal so errors land on stderr
    let renderer = load(&args)?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, renderer);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn init_logging(args: &Args) -> Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("creating log file {}", args.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Read both inputs in parallel, then join them onto the counties
fn load(args: &Args) -> Result<ChoroplethRenderer> {
    let fields = args.feature_fields();
    let columns = args.table_columns();

    let (regions, rows) = rayon::join(
        || data::load_regions(&args.counties, &fields),
        || data::load_records(&args.data, &columns),
    );
    let mut regions = regions.context("failed to load county boundaries")?;
    let rows = rows.context("failed to load jurisdiction table")?;

    let index = join::merge(&mut regions, rows);

    let borders = match &args.states {
        Some(path) => data::load_state_borders(path).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "state file unavailable, deriving borders from counties");
            data::state_borders_from_counties(&regions)
        }),
        None => data::state_borders_from_counties(&regions),
    };

    Ok(ChoroplethRenderer::new(regions, index, Palette::default()).with_state_borders(borders))
}

/// Mouse: wheel zooms, drag pans, click selects
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, renderer: ChoroplethRenderer) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(renderer, size.width as usize, size.height as usize);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    // Layer toggles
                    KeyCode::Char('o') | KeyCode::Char('O') => app.renderer.toggle_outlines(),
                    KeyCode::Char('s') | KeyCode::Char('S') => app.renderer.toggle_states(),
                    KeyCode::Char('g') | KeyCode::Char('G') => app.renderer.toggle_legend(),

                    KeyCode::Char('c') | KeyCode::Char('C') => app.clear_selection(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
