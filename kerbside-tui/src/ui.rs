use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use kerbside_core::{model::Category, view::CollectionView};

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

    let header = Paragraph::new(format!(
        "kerbside – next collection days ({})",
        app.service.provider_name()
    ))
    .block(Block::default().borders(Borders::ALL).title("Kerbside"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::AreaEntry => draw_area_entry(frame, app, *content_area),
        Screen::ScheduleView => draw_schedule_view(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::AreaEntry => "Type area number · Enter confirm · Esc/Ctrl-C quit",
        Screen::ScheduleView => "r refresh · Esc/←/b change area · q/Ctrl-C quit",
    };

    let cycle_error = app
        .state
        .last_error
        .as_deref()
        .map(|err| format!("Last refresh failed: {err}"));

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = app.error_message.as_ref().or(cycle_error.as_ref()) {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() || cycle_error.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
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

fn draw_area_entry(frame: &mut Frame<'_>, app: &App, area: Rect) {
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

    let input = Paragraph::new(app.area_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Area number (Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let help = Paragraph::new(
        "The area number is the last part of your council collection-day page, \
         e.g. …/rubbish-recycling-collection-days/12345678901.html",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"))
    .wrap(Wrap { trim: true });
    frame.render_widget(help, *help_area);
}

fn draw_schedule_view(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let area_label = app.area().map_or("<area>", |area_id| area_id.as_str());
    let title = match app.state.latest.as_ref() {
        Some(published) => format!(
            "Area {area_label} · updated {}",
            published.fetched_at.format("%d.%m.%Y %H:%M")
        ),
        None => format!("Area {area_label}"),
    };

    if app.state.latest.is_none() {
        let message = if app.state.last_error.is_some() {
            "No schedule yet. Press r to try again."
        } else {
            "Loading schedule…"
        };
        let paragraph = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = app.views(App::today()).into_iter().map(|(name, view)| {
        let Some(view) = view else {
            return Row::new(vec![
                Cell::from(name),
                Cell::from("–"),
                Cell::from(""),
                Cell::from("no upcoming collection"),
            ])
            .style(Style::default().fg(Color::DarkGray));
        };

        let mut style = Style::default().fg(category_color(view.waste_type));
        if view.is_today || view.is_tomorrow {
            style = style.add_modifier(Modifier::BOLD);
        }

        Row::new(vec![
            Cell::from(name),
            Cell::from(view.formatted_date.clone()),
            Cell::from(view.date.clone()),
            Cell::from(relative_day_label(&view)),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(12),
        Constraint::Length(22),
        Constraint::Length(12),
        Constraint::Min(16),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Bin", "Next collection", "Date", "In"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Rubbish => Color::Red,
        Category::Recycle => Color::Yellow,
        Category::FoodWaste => Color::Green,
    }
}

fn relative_day_label(view: &CollectionView) -> String {
    match view.days_until {
        _ if view.is_today => "today".to_owned(),
        _ if view.is_tomorrow => "tomorrow".to_owned(),
        days if days > 1 => format!("in {days} days"),
        -1 => "yesterday".to_owned(),
        days => format!("{} days ago", days.abs()),
    }
}
