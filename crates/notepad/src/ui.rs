use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::str::FromStr;

use crate::app::App;
use crate::config::Theme;
use crate::menu::MenuBar;
use crate::prompt::{Prompt, PromptKind, TextField};
use crate::status_manager::{MessageType, StatusLine};

pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;

fn color(name: &str, fallback: Color) -> Color {
    Color::from_str(name).unwrap_or(fallback)
}

struct Palette {
    menu: Style,
    dropdown: Style,
    selected: Style,
    status: Style,
}

impl Palette {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            menu: Style::default()
                .fg(color(&theme.menu_foreground, Color::Black))
                .bg(color(&theme.menu_background, Color::Cyan)),
            dropdown: Style::default()
                .fg(color(&theme.dropdown_foreground, Color::White))
                .bg(color(&theme.dropdown_background, Color::Blue)),
            selected: Style::default()
                .fg(color(&theme.selection_foreground, Color::Black))
                .bg(color(&theme.selection_background, Color::White)),
            status: Style::default()
                .fg(color(&theme.status_foreground, Color::Black))
                .bg(color(&theme.status_background, Color::Cyan)),
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let palette = Palette::from_theme(&app.config.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Menu bar
            Constraint::Min(1),    // Editor
            Constraint::Length(1), // Status line
        ])
        .split(f.size());

    draw_menu_bar(f, app.menu_bar(), chunks[0], &palette);
    draw_editor(f, app, chunks[1]);
    draw_status_line(f, app, chunks[2], &palette);

    if app.menu_bar().is_open() {
        draw_dropdown(f, app.menu_bar(), chunks[0], &palette);
    }
    if let Some(prompt) = app.prompt() {
        draw_prompt(f, prompt, &palette);
    }
}

fn draw_menu_bar(f: &mut Frame, bar: &MenuBar, area: Rect, palette: &Palette) {
    let mut spans = vec![Span::raw(" ")];
    for (index, menu) in bar.menus().iter().enumerate() {
        let title = format!(" {} ", menu.title);
        if bar.active_menu() == Some(index) {
            spans.push(Span::styled(title, palette.menu.add_modifier(Modifier::REVERSED)));
        } else {
            spans.push(Span::raw(title));
        }
    }

    f.render_widget(Paragraph::new(Line::from(spans)).style(palette.menu), area);
    f.render_widget(
        Paragraph::new(" F1:Help ")
            .style(palette.menu)
            .alignment(Alignment::Right),
        area,
    );
}

fn draw_dropdown(f: &mut Frame, bar: &MenuBar, bar_area: Rect, palette: &Palette) {
    let Some(index) = bar.active_menu() else {
        return;
    };
    let menu = &bar.menus()[index];
    let label_width = menu.items.iter().map(|item| item.label.len()).max().unwrap_or(0);
    let hint_width = menu.items.iter().map(|item| item.hint.len()).max().unwrap_or(0);
    let inner_width = label_width + hint_width + 4;

    let screen = f.size();
    let width = ((inner_width + 2) as u16).min(screen.width);
    let height = ((menu.items.len() + 2) as u16).min(screen.height.saturating_sub(bar_area.y + 1));
    let mut x = bar_area.x + bar.title_x(index) as u16;
    if x + width > screen.width {
        x = screen.width.saturating_sub(width);
    }
    let area = Rect::new(x, bar_area.y + 1, width, height);

    let lines: Vec<Line> = menu
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if item.is_separator() {
                Line::styled("─".repeat(inner_width), palette.dropdown)
            } else {
                let text = format!(
                    " {:<label_width$}  {:>hint_width$} ",
                    item.label, item.hint
                );
                let style = if i == bar.active_item() {
                    palette.selected
                } else {
                    palette.dropdown
                };
                Line::styled(text, style)
            }
        })
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .style(palette.dropdown)
            .block(Block::default().borders(Borders::ALL).style(palette.dropdown)),
        area,
    );
}

fn draw_editor(f: &mut Frame, app: &App, area: Rect) {
    let doc = app.document();
    let (view_row, view_col) = doc.viewport_offset();
    let (cursor_row, cursor_col) = doc.cursor_position();
    let highlight = app.config.editor.highlight_current_line;

    let lines: Vec<Line> = doc
        .visible_lines()
        .into_iter()
        .enumerate()
        .map(|(i, bytes)| {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if highlight && view_row + i == cursor_row {
                Line::styled(text, Style::default().bg(Color::DarkGray))
            } else {
                Line::from(text)
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);

    if app.prompt().is_none() && !app.menu_bar().is_open() {
        let x = area.x + (cursor_col - view_col) as u16;
        let y = area.y + (cursor_row - view_row) as u16;
        if x < area.x + area.width && y < area.y + area.height {
            f.set_cursor(x, y);
        }
    }
}

fn draw_status_line(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let file_name = app.file_name();
    let (dirty, cursor, total) = {
        let doc = app.document();
        (doc.is_dirty(), doc.cursor_position(), doc.line_count())
    };

    match app.status.take_for_draw(&file_name, dirty, cursor, total) {
        StatusLine::Message(message) => {
            let style = match message.message_type {
                MessageType::Info | MessageType::Success => palette.status,
                MessageType::Warning => {
                    palette.status.fg(Color::Yellow).add_modifier(Modifier::BOLD)
                }
                MessageType::Error => palette.status.fg(Color::Red).add_modifier(Modifier::BOLD),
            };
            f.render_widget(
                Paragraph::new(message.content)
                    .style(style)
                    .alignment(Alignment::Center),
                area,
            );
        }
        StatusLine::Position {
            file_name,
            dirty,
            row,
            col,
            total_lines,
        } => {
            let (left, right) = StatusLine::position_text(&file_name, dirty, row, col, total_lines);
            f.render_widget(Paragraph::new(format!(" {left}")).style(palette.status), area);
            f.render_widget(
                Paragraph::new(format!("{right} "))
                    .style(palette.status)
                    .alignment(Alignment::Right),
                area,
            );
        }
    }
}

/// Centered rectangle of at most `width` x `height`.
fn centered(width: u16, height: u16, screen: Rect) -> Rect {
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

fn field_span(field: &TextField, active: bool) -> Span<'static> {
    let style = if active {
        Style::default().add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    Span::styled(field.text().to_string(), style)
}

fn draw_prompt(f: &mut Frame, prompt: &Prompt, palette: &Palette) {
    let screen = f.size();
    let mut lines: Vec<Line> = Vec::new();
    // Field whose cursor is shown, with the row it is drawn on.
    let mut cursor: Option<(&TextField, u16, u16)> = None;

    match &prompt.kind {
        PromptKind::Input { label, field } => {
            lines.push(Line::from(label.clone()));
            lines.push(Line::from(field_span(field, true)));
            cursor = Some((field, 1, 0));
        }
        PromptKind::Confirm { message } => {
            lines.push(Line::from(message.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from("[Y] Yes     [N] No"));
        }
        PromptKind::Choice { options, selected } => {
            for (i, option) in options.iter().enumerate() {
                let style = if i == *selected {
                    palette.selected
                } else {
                    Style::default()
                };
                lines.push(Line::styled(format!(" {option} "), style));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("[Enter] OK  [Esc] Cancel"));
        }
        PromptKind::FindReplace {
            needle,
            replacement,
            active,
            case_sensitive,
            replace_all,
        } => {
            let yes_no = |flag: bool| if flag { "YES" } else { "NO" };
            lines.push(Line::from(vec![
                Span::raw("Find    : "),
                field_span(needle, *active == 0),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::raw("Replace : "),
                field_span(replacement, *active == 1),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(format!("[F2] Match case : {}", yes_no(*case_sensitive))));
            lines.push(Line::from(format!("[F3] Replace all: {}", yes_no(*replace_all))));
            lines.push(Line::from("[Tab] Switch field  [Enter] Apply  [Esc] Cancel"));
            cursor = if *active == 0 {
                Some((needle, 0, 10))
            } else {
                Some((replacement, 2, 10))
            };
        }
        PromptKind::Alert { message } => {
            lines.extend(message.lines().map(|line| Line::from(line.to_string())));
            lines.push(Line::from(""));
            lines.push(Line::from("[ Enter/Esc ]").alignment(Alignment::Center));
        }
    }

    let content_width = lines.iter().map(Line::width).max().unwrap_or(0);
    let width = (content_width.max(prompt.title.len() + 4).max(46) + 4) as u16;
    let height = lines.len() as u16 + 2;
    let area = centered(width, height, screen);

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).style(palette.dropdown).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", prompt.title))
                .title_alignment(Alignment::Center)
                .style(palette.dropdown),
        ),
        area,
    );

    if let Some((field, row, offset)) = cursor {
        let x = area.x + 1 + offset + field.cursor() as u16;
        let y = area.y + 1 + row;
        if x < area.x + area.width.saturating_sub(1) && y < area.y + area.height {
            f.set_cursor(x, y);
        }
    }
}
