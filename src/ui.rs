pub mod charting;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, Tabs, Widget,
    },
    Frame,
};
use squarebrick::{
    config::LEADERBOARD_LIVES,
    events::Resolution,
    explosion::{Explosion, BRICK_HEIGHT, BRICK_WIDTH, FIELD_WIDTH},
    fall_clock::GROUND_DISTANCE,
    judge,
    leaderboard::{Category, MAX_ENTRIES},
    mode::{GameConfig, Hardness, SpeedMode},
    session::{Phase, Session, PAUSE_MESSAGE},
    stats::SessionSummary,
};
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

use crate::{App, CustomField, MenuColumn};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
/// Logical playfield height: the fall distance plus the brick itself
const FIELD_HEIGHT: f64 = GROUND_DISTANCE + BRICK_HEIGHT;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.state).render(app, f);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn config_label(config: &GameConfig) -> String {
    format!(
        "{} ({}s) / {} (1-{})",
        config.speed_mode, config.speed_secs, config.hardness, config.max_number
    )
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(text, italic()))
}

fn error_line(error: Option<&str>) -> Line<'static> {
    match error {
        Some(e) => Line::from(Span::styled(e.to_string(), Style::default().fg(Color::Red))),
        None => Line::raw(""),
    }
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let (value_style, cursor) = if focused {
        (bold().add_modifier(Modifier::UNDERLINED), "_")
    } else {
        (bold(), "")
    };
    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(format!("{value}{cursor}"), value_style),
    ])
}

fn option_line(label: String, selected: bool) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            format!("> {label}"),
            bold().fg(Color::Green),
        ))
    } else {
        Line::raw(format!("  {label}"))
    }
}

fn option_list<'a>(title: &'a str, lines: Vec<Line<'a>>, focused: bool) -> Paragraph<'a> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        dim()
    };
    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    )
}

pub fn render_menu(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(7),    // speed / hardness lists
            Constraint::Length(1), // best score
            Constraint::Length(1), // settings
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    let title = Paragraph::new(vec![
        Line::from(Span::styled("SQUARE THE BRICK", bold().fg(Color::Yellow))),
        Line::from(Span::styled(
            "type the square of each number before it lands",
            italic(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let speeds = SpeedMode::ALL
        .iter()
        .map(|m| option_line(m.label(), *m == app.menu.speed))
        .collect();
    f.render_widget(
        option_list("Speed", speeds, app.menu.column == MenuColumn::Speed),
        columns[0],
    );

    let hardness = Hardness::ALL
        .iter()
        .map(|h| option_line(h.label(), *h == app.menu.hardness))
        .collect();
    f.render_widget(
        option_list("Hardness", hardness, app.menu.column == MenuColumn::Hardness),
        columns[1],
    );

    let best = match Category::new(app.menu.speed, app.menu.hardness) {
        Some(category) => match app.leaderboard.best(category) {
            Some(level) => format!("Best {}: level {}", category.key(), level),
            None => format!("No scores yet for {}", category.key()),
        },
        None => "Custom games are not ranked".to_string(),
    };
    f.render_widget(
        Paragraph::new(Span::styled(best, Style::default().fg(Color::Cyan)))
            .alignment(Alignment::Center),
        chunks[2],
    );

    let settings = app.game.settings();
    let mut settings_text = format!(
        "Lives: {} | Speed increase: {}",
        settings.lives,
        on_off(settings.speed_increase)
    );
    if settings.lives != LEADERBOARD_LIVES {
        settings_text.push_str(" | not ranked");
    }
    f.render_widget(
        Paragraph::new(Span::styled(settings_text, dim())).alignment(Alignment::Center),
        chunks[3],
    );

    f.render_widget(
        legend("(↑↓) choose / (tab) switch / (enter) play / (s)ettings / (l)eaderboard / (q)uit"),
        chunks[5],
    );
}

pub fn render_custom_dialog(app: &App, f: &mut Frame) {
    let form = &app.custom_form;
    let area = centered_rect(50, 9, f.area());

    let mut lines = vec![Line::raw("")];
    if app.menu.speed.is_custom() {
        lines.push(field_line(
            "Fall time (1-99 s)",
            &form.speed_text,
            form.focus == CustomField::Speed,
        ));
    }
    if app.menu.hardness.is_custom() {
        lines.push(field_line(
            "Max number (1-9999)",
            &form.max_text,
            form.focus == CustomField::MaxNumber,
        ));
    }
    lines.push(Line::raw(""));
    lines.push(error_line(form.error.as_deref()));
    lines.push(Line::from(Span::styled(
        "(enter) start / (tab) next / (esc) back",
        italic(),
    )));

    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Custom game"));
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

pub fn render_settings(app: &App, f: &mut Frame) {
    let form = &app.settings_form;
    let area = centered_rect(62, 10, f.area());

    let lines = vec![
        Line::raw(""),
        field_line("Lives (1-10)", &form.lives_text, true),
        Line::from(vec![
            Span::raw("Speed increase: "),
            Span::styled(on_off(form.speed_increase), bold()),
        ]),
        Line::from(Span::styled(
            format!("Only games with {LEADERBOARD_LIVES} lives reach the leaderboard"),
            dim(),
        )),
        Line::raw(""),
        error_line(form.error.as_deref()),
        Line::from(Span::styled(
            "(space) toggle / (d)efaults / (enter) save / (esc) cancel",
            italic(),
        )),
    ];

    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

pub fn render_leaderboard(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(MAX_ENTRIES as u16 + 3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let tab = app.leaderboard_tab.min(SpeedMode::PRESETS.len() - 1);
    let speed = SpeedMode::PRESETS[tab];

    let tabs = Tabs::new(SpeedMode::PRESETS.iter().map(|m| m.label()))
        .select(tab)
        .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
        .highlight_style(bold().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    let header = Row::new(
        std::iter::once("Rank".to_string()).chain(Hardness::PRESETS.iter().map(|h| h.to_string())),
    )
    .style(bold());
    let rows = (0..MAX_ENTRIES).map(|rank| {
        let levels = Hardness::PRESETS.iter().map(|h| {
            Category::new(speed, *h)
                .and_then(|category| app.leaderboard.scores(category).get(rank).copied())
                .map_or_else(|| "-".to_string(), |level| level.to_string())
        });
        Row::new(std::iter::once(format!("#{}", rank + 1)).chain(levels))
    });
    let widths = [
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} levels", speed.label())),
    );
    f.render_widget(table, chunks[1]);

    f.render_widget(legend("(←→) speed / (esc) back"), chunks[2]);
}

/// The falling brick and explosion debris, scaled from logical field units
struct Playfield<'a> {
    session: &'a Session,
    now: Instant,
}

impl Widget for Playfield<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_style(dim());
        let field = block.inner(area);
        block.render(area, buf);
        if field.width < 3 || field.height < 2 {
            return;
        }

        if let (Some(fraction), Some(number)) = (
            self.session.brick_fraction(self.now),
            self.session.current_number(),
        ) {
            render_brick(field, fraction * GROUND_DISTANCE, number, buf);
        }
        if let Some(explosion) = self.session.explosion() {
            render_explosion(field, explosion, buf);
        }
    }
}

fn brick_rect(field: Rect, top: f64, label_width: u16) -> Rect {
    let width = ((BRICK_WIDTH / FIELD_WIDTH) * f64::from(field.width)).round() as u16;
    let width = width.max(label_width + 2).min(field.width);
    let height = ((BRICK_HEIGHT / FIELD_HEIGHT) * f64::from(field.height))
        .round()
        .max(1.0) as u16;
    let height = height.min(field.height);
    let row = ((top / FIELD_HEIGHT) * f64::from(field.height)).round() as u16;
    Rect {
        x: field.x + (field.width - width) / 2,
        y: field.y + row.min(field.height - height),
        width,
        height,
    }
}

fn render_brick(field: Rect, top: f64, number: u32, buf: &mut Buffer) {
    let label = number.to_string();
    let label_width = label.width() as u16;
    let rect = brick_rect(field, top, label_width);
    let style = Style::default().bg(Color::Red).fg(Color::White);

    buf.set_style(rect, style);
    buf.set_string(
        rect.x + rect.width.saturating_sub(label_width) / 2,
        rect.y + rect.height / 2,
        &label,
        style.add_modifier(Modifier::BOLD),
    );
}

fn field_cell(field: Rect, x: f64, y: f64) -> Option<(u16, u16)> {
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let col = (x / FIELD_WIDTH * f64::from(field.width)) as u16;
    let row = (y / FIELD_HEIGHT * f64::from(field.height)) as u16;
    (col < field.width && row < field.height).then_some((field.x + col, field.y + row))
}

fn render_explosion(field: Rect, explosion: &Explosion, buf: &mut Buffer) {
    let fade = explosion.fade();
    let style = if fade > 0.6 {
        bold().fg(Color::Yellow)
    } else if fade > 0.3 {
        Style::default().fg(Color::Yellow)
    } else {
        dim().fg(Color::Yellow)
    };

    for piece in &explosion.pieces {
        let Some(pos) = field_cell(field, piece.x, piece.y) else {
            continue;
        };
        if let Some(cell) = buf.cell_mut(pos) {
            cell.set_symbol("▪");
            cell.set_style(style);
        }
    }
}

pub fn render_playing(app: &App, f: &mut Frame) {
    let Some(session) = app.game.session() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // hud
            Constraint::Min(5),    // field
            Constraint::Length(1), // banner
            Constraint::Length(1), // answer
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    let hud = Line::from(vec![
        Span::styled(format!("Level: {}", session.level()), bold()),
        Span::raw("   "),
        Span::styled(
            format!("Lives: {}", "♥".repeat(session.lives() as usize)),
            bold().fg(Color::Red),
        ),
        Span::raw("   "),
        Span::raw(format!("Fall time: {:.2}s", session.current_speed_secs())),
        Span::raw("   "),
        Span::styled(format!("{} / {}", session.speed_mode(), session.hardness()), dim()),
    ]);
    f.render_widget(Paragraph::new(hud), chunks[0]);

    f.render_widget(
        Playfield {
            session,
            now: app.now,
        },
        chunks[1],
    );

    f.render_widget(
        Paragraph::new(banner(session, app.last_resolution)).alignment(Alignment::Center),
        chunks[2],
    );

    let answer = Line::from(vec![
        Span::raw("Answer: "),
        Span::styled(format!("{}_", app.answer), bold()),
    ]);
    f.render_widget(Paragraph::new(answer), chunks[3]);

    let keys = match session.phase() {
        Phase::Active => "(enter) submit / (space) pause / (esc) menu",
        Phase::Paused => "(space) resume / (esc) menu",
        Phase::GameOver => "(space) stats / (esc) menu",
    };
    f.render_widget(legend(keys), chunks[4]);

    if session.phase() == Phase::GameOver {
        render_game_over(session, chunks[1], f);
    }
}

fn banner(session: &Session, last: Option<Resolution>) -> Line<'static> {
    if let Some(message) = session.message() {
        let style = if message.text == PAUSE_MESSAGE {
            bold().fg(Color::Yellow)
        } else {
            bold().fg(Color::Red)
        };
        return Line::from(Span::styled(message.text.clone(), style));
    }
    match last {
        Some(Resolution::Answered { number, seconds }) => Line::from(Span::styled(
            format!("{number}² = {} in {seconds:.2}s", judge::square(number)),
            Style::default().fg(Color::Green),
        )),
        _ => Line::raw(""),
    }
}

fn render_game_over(session: &Session, field: Rect, f: &mut Frame) {
    let area = centered_rect(40, 6, field);
    let lines = vec![
        Line::from(Span::styled("GAME OVER", bold().fg(Color::Red))),
        Line::raw(format!("You reached level {}", session.level())),
        Line::raw(""),
        Line::from(Span::styled("(space) stats / (esc) menu", italic())),
    ];
    let popup = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn leaderboard_line(summary: &SessionSummary) -> String {
    if !summary.eligible {
        return if summary.level == 0 {
            "No score to save".to_string()
        } else if summary.speed_mode.is_custom() || summary.hardness.is_custom() {
            "Custom games are not ranked".to_string()
        } else {
            format!("Only games with {LEADERBOARD_LIVES} lives are ranked")
        };
    }
    match (summary.saved, summary.rank) {
        (true, Some(rank)) => format!("New leaderboard entry: #{rank}"),
        (true, None) => format!("Not in the top {MAX_ENTRIES} this time"),
        (false, _) => String::new(),
    }
}

pub fn render_stats(app: &App, f: &mut Frame) {
    let Some(summary) = app.summary.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(6), // summary
            Constraint::Min(3),    // answer time chart
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled("Game Over", bold().fg(Color::Red)))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let spread = summary
        .answer_spread_secs
        .filter(|_| summary.correct_answers > 1)
        .map(|sd| format!(" ({sd:.2}s sd)"))
        .unwrap_or_default();
    let missed = if summary.failed_numbers.is_empty() {
        "none".to_string()
    } else {
        summary.failed_numbers.iter().join(", ")
    };
    let lines = vec![
        Line::raw(format!("Mode: {}", config_label(&app.config))),
        Line::from(Span::styled(
            format!("Level reached: {}", summary.level),
            bold(),
        )),
        Line::raw(format!("Correct answers: {}", summary.correct_answers)),
        Line::raw(format!(
            "Average answer time: {}{}",
            summary.average_label(),
            spread
        )),
        Line::raw(format!("Missed: {missed}")),
        Line::from(Span::styled(
            leaderboard_line(summary),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        )),
    ];
    f.render_widget(Paragraph::new(lines), chunks[1]);

    let durations = app
        .game
        .session()
        .map(|s| s.answer_durations())
        .unwrap_or(&[]);
    if durations.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("no correct answers to chart", dim()))
                .alignment(Alignment::Center),
            chunks[2],
        );
    } else {
        render_answer_chart(durations, chunks[2], f);
    }

    f.render_widget(legend("(enter) play again / (esc) menu"), chunks[4]);
}

fn render_answer_chart(durations: &[f64], area: Rect, f: &mut Frame) {
    let (answers, slowest) = charting::compute_chart_params(durations);
    let points = charting::answer_points(durations);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("answer")
                .bounds([1.0, answers])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(charting::format_label(answers), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, slowest])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(slowest), bold()),
                ]),
        );
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brick_rect_stays_inside_the_field() {
        let field = Rect::new(2, 1, 45, 20);
        for top in [0.0, 100.0, GROUND_DISTANCE, GROUND_DISTANCE * 2.0] {
            let rect = brick_rect(field, top, 3);
            assert!(rect.x >= field.x && rect.right() <= field.right());
            assert!(rect.y >= field.y && rect.bottom() <= field.bottom());
        }
    }

    #[test]
    fn test_brick_rect_lands_on_the_ground() {
        let field = Rect::new(0, 0, 45, 20);
        let rect = brick_rect(field, GROUND_DISTANCE, 3);
        assert_eq!(rect.bottom(), field.bottom());
        assert_eq!(brick_rect(field, 0.0, 3).y, 0);
    }

    #[test]
    fn test_brick_fits_its_label() {
        let field = Rect::new(0, 0, 20, 10);
        assert!(brick_rect(field, 0.0, 8).width >= 10);
    }

    #[test]
    fn test_field_cell_clips_outside_points() {
        let field = Rect::new(1, 1, 45, 20);
        assert_eq!(field_cell(field, 0.0, 0.0), Some((1, 1)));
        assert_eq!(field_cell(field, -3.0, 10.0), None);
        assert_eq!(field_cell(field, FIELD_WIDTH, 10.0), None);
        assert_eq!(field_cell(field, 10.0, FIELD_HEIGHT), None);
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 30, 8);
        let rect = centered_rect(50, 9, area);
        assert_eq!(rect, area);
        assert_eq!(centered_rect(10, 4, area), Rect::new(10, 2, 10, 4));
    }
}
