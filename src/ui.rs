use crate::app::{App, SIDEBAR_WIDTH};
use crate::braille::BrailleCanvas;
use crate::breakdown::format_value;
use crate::classify::{ColorClassifier, BUCKETS};
use crate::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into main area and status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map + sidebar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(SIDEBAR_WIDTH)])
        .split(rows[0]);

    render_map(frame, app, columns[0]);
    render_sidebar(frame, app, columns[1]);
    render_status_bar(frame, app, rows[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " US Counties ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.renderer.draw(&viewport, app.selected);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    let map_widget = MapWidget {
        layers,
        classifier: app.renderer.classifier(),
        cursor_pos,
    };
    frame.render_widget(map_widget, inner);
}

/// Filled counties with braille strokes layered on top
struct MapWidget<'a> {
    layers: MapLayers,
    classifier: &'a ColorClassifier,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget<'_> {
    /// Stroke layer in one foreground color; cell backgrounds are left alone
    fn render_strokes(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some(ch) = canvas.glyph(col, row) {
                    let (x, y) = (area.x + col as u16, area.y + row as u16);
                    buf[(x, y)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // 1. County fills
        let palette = self.classifier.palette();
        for row in 0..area.height {
            for col in 0..area.width {
                if let Some(bucket) = self.layers.fill.bucket(col as usize, row as usize) {
                    buf[(area.x + col, area.y + row)].set_bg(palette.color(bucket));
                }
            }
        }

        // 2. County outlines, 3. state borders, 4. selection highlight
        Self::render_strokes(&self.layers.outlines, Color::White, area, buf);
        Self::render_strokes(&self.layers.states, Color::Black, area, buf);
        Self::render_strokes(&self.layers.selected, Color::Red, area, buf);

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let show_legend = app.renderer.settings.show_legend;
    let legend_height = if show_legend { BUCKETS as u16 + 2 } else { 0 };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(legend_height)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Jurisdictions ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let muted = Style::default().fg(Color::DarkGray);
    let lines: Vec<Line> = match &app.sidebar.breakdown {
        None => vec![Line::from(Span::styled(
            "Click a county to see its jurisdiction breakdown",
            muted,
        ))],
        Some(breakdown) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    breakdown.title(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::default(),
            ];
            if breakdown.is_empty() {
                lines.push(Line::from(Span::styled("No jurisdiction data", muted)));
            } else {
                lines.extend(breakdown.lines().map(|text| Line::from(format!(" • {text}"))));
                lines.push(Line::default());
                lines.push(Line::from(vec![
                    Span::styled("Total: ", muted),
                    Span::styled(
                        format_value(breakdown.total()),
                        Style::default().fg(Color::Yellow),
                    ),
                ]));
            }
            lines
        }
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        parts[0],
    );

    if show_legend {
        render_legend(frame, app.renderer.classifier(), parts[1]);
    }
}

fn render_legend(frame: &mut Frame, classifier: &ColorClassifier, area: Rect) {
    let edges = classifier.thresholds();
    let palette = classifier.palette();

    let lines: Vec<Line> = (0..BUCKETS)
        .map(|bucket| {
            Line::from(vec![
                Span::styled("   ", Style::default().bg(palette.color(bucket))),
                Span::raw(format!(" {:.0} - {:.0}", edges[bucket], edges[bucket + 1])),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" Population ", Style::default().fg(Color::Cyan)));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.renderer.settings;
    let toggle = |on: bool, on_text: &'static str, off_text: &'static str| {
        Span::styled(
            if on { on_text } else { off_text },
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        toggle(settings.show_outlines, "[O]utlines ", "[o]utlines "),
        toggle(settings.show_states, "[S]tates ", "[s]tates "),
        toggle(settings.show_legend, "[G]legend ", "[g]legend "),
    ];

    if let Some(coords) = app.center_coords() {
        spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(coords, Style::default().fg(Color::Cyan)));
    }

    if let Some(region) = app.selected.and_then(|idx| app.renderer.region(idx)) {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(region.key.to_string(), Style::default().fg(Color::Magenta)));
    }

    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom click:select c:clear r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
