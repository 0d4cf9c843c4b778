use pfandli_core::{
    busy::BusyState,
    gate::Classification,
    model::RecyclingPoint,
    present::{StatusSwatch, directions_url, distance_label, machine_summary, status_swatch},
    reconcile::{Marker, MarkerKey},
};
use ratatui::{
    prelude::*,
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Wrap,
        canvas::Canvas,
    },
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new("pfandli – recycling point finder")
        .block(Block::default().borders(Borders::ALL).title("Pfandli"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::Capture => draw_capture(frame, app, *content_area),
        Screen::Results => draw_results(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Capture => "Type an image path · Enter analyze · Tab/→ results · Esc/Ctrl-C quit",
        Screen::Results => "↑/↓ move · r refresh nearby · Left/Esc back · q/Ctrl-C quit",
    };

    let busy = match app.service.busy_state() {
        BusyState::Idle => None,
        BusyState::Busy(count) => Some(count),
    };

    let mut status_text = if app.is_loading || busy.is_some() {
        match busy {
            Some(count) if count > 1 => format!("Working ({count} operations)… · {nav_hint}"),
            _ => format!("Working… · {nav_hint}"),
        }
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    if app.warning_count > 0 {
        status_text = format!("{status_text} · {} data warnings", app.warning_count);
    }
    if let Some(refreshed) = app.last_refresh {
        status_text = format!("{status_text} · updated {}", refreshed.format("%H:%M:%S"));
    }

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading || busy.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_capture(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // help
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, help_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.image_path_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Image file to classify (Enter to analyze)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let help = Paragraph::new(
        "Point pfandli at a photo of an object. If it is a recyclable plastic \
         container, nearby recycling points and their machine status are \
         looked up and shown on the results screen.",
    )
    .block(Block::default().borders(Borders::ALL).title("How it works"))
    .wrap(Wrap { trim: true });
    frame.render_widget(help, *help_area);
}

fn draw_results(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [list_area, right_area] = chunks else {
        return;
    };

    draw_point_list(frame, app, *list_area);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(*right_area);

    let right = right_chunks.as_ref();
    let [classification_area, map_area] = right else {
        return;
    };

    draw_classification(frame, app, *classification_area);
    draw_map(frame, app, *map_area);
}

fn draw_point_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = if app.points.is_empty() {
        vec![ListItem::new(
            "No recycling points within range yet. Press r to refresh.",
        )]
    } else {
        app.points.iter().map(point_list_item).collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Nearby recycling points (↑/↓)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.points.is_empty() {
        state.select(Some(app.list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn point_list_item(point: &RecyclingPoint) -> ListItem<'_> {
    let mut lines = vec![
        Line::styled(
            point.name.clone(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!(
            "{} · {} away",
            point.kind,
            distance_label(point.distance_km)
        )),
        Line::raw(format!(
            "Hours: {} · Phone: {}",
            point.operating_hours, point.phone
        )),
    ];

    if point.machines.is_empty() {
        lines.push(Line::styled(
            "  no machines available",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        for machine in &point.machines {
            lines.push(Line::from(vec![
                Span::styled(
                    "  ● ",
                    Style::default().fg(swatch_color(status_swatch(&machine.status))),
                ),
                Span::raw(machine_summary(machine)),
            ]));
        }
    }

    lines.push(Line::styled(
        format!("Directions: {}", directions_url(point)),
        Style::default().fg(Color::Blue),
    ));
    lines.push(Line::raw(""));
    ListItem::new(lines)
}

fn draw_classification(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let lines = match &app.classification {
        None => vec![Line::raw("No image analyzed yet.")],
        Some(classification) => classification_lines(classification),
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Analysis"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn classification_lines(classification: &Classification) -> Vec<Line<'static>> {
    if !classification.recyclable {
        return vec![
            Line::styled(
                "✗ No recyclable bottle detected",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Line::raw("Try again with a clear image of a recyclable bottle."),
        ];
    }

    let mut lines = vec![Line::styled(
        "✓ Recyclable item detected",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];

    for raw in classification.rationale.lines() {
        let trimmed = raw.trim_start();
        let line = if trimmed
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_digit())
            && trimmed.contains('.')
        {
            Line::styled(
                raw.to_owned(),
                Style::default().add_modifier(Modifier::BOLD),
            )
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            Line::raw(format!("  • {}", rest.trim_start()))
        } else {
            Line::raw(raw.to_owned())
        };
        lines.push(line);
    }

    lines
}

fn draw_map(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let markers = app.map.markers();

    if markers.is_empty() {
        let paragraph = Paragraph::new("Map appears once your location is known.")
            .block(Block::default().borders(Borders::ALL).title("Map"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let (x_bounds, y_bounds) = map_bounds(markers);
    let selected = app.selected_point().map(|point| point.id.clone());

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title("Map"))
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            for marker in markers {
                let (glyph, color) = match &marker.key {
                    MarkerKey::User => ("◉", Color::Yellow),
                    MarkerKey::Point(id) if Some(id) == selected.as_ref() => {
                        ("♻", Color::LightGreen)
                    }
                    MarkerKey::Point(_) => ("♻", Color::Green),
                };
                ctx.print(
                    marker.position.longitude,
                    marker.position.latitude,
                    Line::styled(glyph, Style::default().fg(color)),
                );
            }
        });

    frame.render_widget(canvas, area);
}

/// Canvas bounds covering all markers with a margin, never collapsing to a
/// zero-size window.
fn map_bounds(markers: &[Marker]) -> ([f64; 2], [f64; 2]) {
    const MIN_SPAN: f64 = 0.02;

    let mut min_lng = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;

    for marker in markers {
        min_lng = min_lng.min(marker.position.longitude);
        max_lng = max_lng.max(marker.position.longitude);
        min_lat = min_lat.min(marker.position.latitude);
        max_lat = max_lat.max(marker.position.latitude);
    }

    let pad_lng = ((max_lng - min_lng).max(MIN_SPAN)) * 0.2;
    let pad_lat = ((max_lat - min_lat).max(MIN_SPAN)) * 0.2;

    (
        [min_lng - pad_lng, max_lng + pad_lng],
        [min_lat - pad_lat, max_lat + pad_lat],
    )
}

fn swatch_color(swatch: StatusSwatch) -> Color {
    match swatch {
        StatusSwatch::Green => Color::Green,
        StatusSwatch::Amber => Color::Yellow,
        StatusSwatch::Red => Color::Red,
        StatusSwatch::Neutral => Color::DarkGray,
    }
}
