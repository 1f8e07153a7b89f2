//! UI rendering using ratatui
//!
//! Layout helpers are public so mouse hit-testing sees exactly the
//! geometry that was drawn.

use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Focus};

/// Primary accent color
const ACCENT: Color = Color::Cyan;
/// Secondary color for less important elements
const SECONDARY: Color = Color::DarkGray;
/// Highlight color for selected items
const HIGHLIGHT: Color = Color::Yellow;
/// Dim text color
const DIM: Color = Color::Rgb(100, 100, 100);

const PALETTE_WIDTH: u16 = 64;

/// One line of the palette list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteRow {
    /// Group heading
    Header(String),
    /// Projection position
    Item(usize),
}

/// Palette geometry for the current frame
#[derive(Debug, Clone)]
pub struct PaletteLayout {
    pub panel: Rect,
    pub input: Rect,
    pub list: Rect,
    pub rows: Vec<PaletteRow>,
    /// First visible row
    pub offset: usize,
}

/// Where a click landed relative to the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteHit {
    /// On an entry (projection position)
    Item(usize),
    /// Inside the panel but not on an entry
    Inside,
    /// On the backdrop
    Outside,
}

/// Where the pointer is relative to the menu bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuHit {
    /// Over a trigger in the bar
    Trigger(usize),
    /// Over an entry of the open dropdown (menu, row)
    Row(usize, usize),
    /// Over the open dropdown's border
    Panel(usize),
}

impl MenuHit {
    /// Menu index the pointer belongs to
    pub fn menu(&self) -> usize {
        match *self {
            MenuHit::Trigger(idx) | MenuHit::Row(idx, _) | MenuHit::Panel(idx) => idx,
        }
    }
}

/// Trigger rectangles in the top bar, one per menu
pub fn menu_triggers(app: &App) -> Vec<Rect> {
    let mut x = app.viewport.x.saturating_add(1);
    app.menus
        .iter()
        .map(|menu| {
            let width = menu.label.chars().count() as u16 + 2;
            let rect = Rect {
                x,
                y: app.viewport.y,
                width,
                height: 1,
            };
            x = x.saturating_add(width + 1);
            rect.intersection(app.viewport)
        })
        .collect()
}

/// Dropdown rectangle for a menu
pub fn dropdown_area(app: &App, menu_idx: usize) -> Option<Rect> {
    let trigger = *menu_triggers(app).get(menu_idx)?;
    let menu = app.menus.get(menu_idx)?;
    let widest = menu
        .items
        .iter()
        .filter_map(|&idx| app.items.get(idx))
        .map(|item| item.title.chars().count())
        .max()
        .unwrap_or(0) as u16;

    let area = Rect {
        x: trigger.x,
        y: trigger.y + 1,
        width: widest + 4,
        height: menu.items.len() as u16 + 2,
    };
    Some(area.intersection(app.viewport))
}

/// Index of the menu whose dropdown is open
pub fn open_menu_index(app: &App) -> Option<usize> {
    let key = app.hover.open_at(None)?;
    app.menus.iter().position(|menu| &menu.key == key)
}

/// Hit-test the menu bar and the open dropdown
pub fn menu_hit(app: &App, column: u16, row: u16) -> Option<MenuHit> {
    let pos = Position::new(column, row);

    if let Some(idx) = open_menu_index(app) {
        if let Some(area) = dropdown_area(app, idx) {
            if area.contains(pos) {
                let inner = area.inner(Margin::new(1, 1));
                if inner.contains(pos) {
                    let entry = (row - inner.y) as usize;
                    if entry < app.menus[idx].items.len() {
                        return Some(MenuHit::Row(idx, entry));
                    }
                }
                return Some(MenuHit::Panel(idx));
            }
        }
    }

    menu_triggers(app)
        .iter()
        .position(|rect| rect.contains(pos))
        .map(MenuHit::Trigger)
}

/// Compute palette geometry (rows, scroll offset, panel placement)
pub fn palette_layout(app: &App) -> PaletteLayout {
    let area = app.viewport;
    let view = app.palette.view();

    let show_headers = !app.config.categories.is_empty();
    let mut rows = Vec::new();
    for (label, positions) in &view.groups {
        if show_headers {
            rows.push(PaletteRow::Header(label.clone()));
        }
        rows.extend(positions.iter().map(|&pos| PaletteRow::Item(pos)));
    }

    let max_visible = app.config.palette.max_visible.max(1);
    let visible = rows.len().clamp(1, max_visible);
    let cursor_row = rows
        .iter()
        .position(|row| *row == PaletteRow::Item(view.cursor))
        .unwrap_or(0);
    let offset = (cursor_row + 1).saturating_sub(visible);

    let width = PALETTE_WIDTH.min(area.width.saturating_sub(4));
    let height = (visible as u16 + 4).min(area.height);
    let panel = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 3,
        width,
        height,
    };

    let inner = panel.inner(Margin::new(1, 1));
    let input = Rect {
        height: inner.height.min(1),
        ..inner
    };
    let list = Rect {
        y: inner.y.saturating_add(2),
        height: inner.height.saturating_sub(2),
        ..inner
    };

    PaletteLayout {
        panel,
        input,
        list,
        rows,
        offset,
    }
}

/// Hit-test the palette
pub fn palette_hit(layout: &PaletteLayout, column: u16, row: u16) -> PaletteHit {
    let pos = Position::new(column, row);
    if !layout.panel.contains(pos) {
        return PaletteHit::Outside;
    }
    if !layout.list.contains(pos) {
        return PaletteHit::Inside;
    }
    let idx = layout.offset + (row - layout.list.y) as usize;
    match layout.rows.get(idx) {
        Some(PaletteRow::Item(pos)) => PaletteHit::Item(*pos),
        _ => PaletteHit::Inside,
    }
}

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Menu bar
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_menu_bar(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if let Some(idx) = open_menu_index(app) {
        render_dropdown(frame, app, idx);
    }

    if app.palette.is_open() {
        render_palette(frame, app);
    }
}

fn render_menu_bar(frame: &mut Frame, app: &App, area: Rect) {
    let open = open_menu_index(app);
    let mut spans = vec![Span::raw(" ")];
    for (idx, menu) in app.menus.iter().enumerate() {
        let style = if open == Some(idx) {
            Style::default()
                .fg(Color::Black)
                .bg(HIGHLIGHT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {} ", menu.label), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(SECONDARY)),
        area,
    );
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            app.config.palette.title.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} commands loaded", app.items.len()),
            Style::default().fg(DIM),
        )),
        Line::from(Span::styled(
            "Ctrl+P or : to search, hover the menu bar to browse",
            Style::default().fg(DIM),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SECONDARY));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (mode_indicator, help_text) = match app.focus {
        Focus::MenuBar => (
            Span::styled(" MENU ", Style::default().bg(ACCENT).fg(Color::Black)),
            "Ctrl+P/:palette  Esc:close menus  q:quit",
        ),
        Focus::Palette => (
            Span::styled(" PALETTE ", Style::default().bg(HIGHLIGHT).fg(Color::Black)),
            "Type to filter  ↑/↓:nav  Enter:run  Esc:cancel",
        ),
    };

    let status = app.status_message.as_deref().unwrap_or("");

    let line = Line::from(vec![
        mode_indicator,
        Span::raw(" "),
        Span::styled(help_text, Style::default().fg(DIM)),
        Span::raw(" "),
        Span::styled(status, Style::default().fg(HIGHLIGHT)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_dropdown(frame: &mut Frame, app: &App, menu_idx: usize) {
    let Some(area) = dropdown_area(app, menu_idx) else {
        return;
    };
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = app.menus[menu_idx]
        .items
        .iter()
        .filter_map(|&idx| app.items.get(idx))
        .map(|item| ListItem::new(Line::from(format!(" {}", item.title))))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    frame.render_widget(List::new(items).block(block), area);
}

/// Render the command palette overlay
fn render_palette(frame: &mut Frame, app: &App) {
    let layout = palette_layout(app);
    let view = app.palette.view();

    frame.render_widget(Clear, layout.panel);

    let block = Block::default()
        .title(format!(" {} ", app.config.palette.title))
        .title_style(Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(HIGHLIGHT));
    frame.render_widget(block, layout.panel);

    let prompt = Span::styled("> ", Style::default().fg(ACCENT));
    let input_line = if view.query.is_empty() {
        Line::from(vec![
            prompt,
            Span::styled(app.config.palette.placeholder.as_str(), Style::default().fg(DIM)),
        ])
    } else {
        Line::from(vec![prompt, Span::raw(view.query)])
    };
    frame.render_widget(Paragraph::new(input_line), layout.input);

    let divider = Rect {
        y: layout.input.y.saturating_add(1),
        height: 1,
        ..layout.input
    }
    .intersection(layout.panel);
    frame.render_widget(
        Paragraph::new("─".repeat(divider.width as usize)).style(Style::default().fg(SECONDARY)),
        divider,
    );

    if let Some(state) = view.empty_state {
        let message = Paragraph::new(Line::from(Span::styled(
            format!("  {}", app.config.empty_message(state)),
            Style::default().fg(DIM),
        )));
        frame.render_widget(message, layout.list);
    } else {
        let items: Vec<ListItem> = layout
            .rows
            .iter()
            .skip(layout.offset)
            .take(layout.list.height as usize)
            .filter_map(|row| match row {
                PaletteRow::Header(label) => Some(ListItem::new(Line::from(Span::styled(
                    label.clone(),
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                )))),
                PaletteRow::Item(pos) => {
                    let item = view.projection.get(*pos)?;
                    let selected = *pos == view.cursor;
                    let style = if selected {
                        Style::default()
                            .fg(Color::Black)
                            .bg(HIGHLIGHT)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    };

                    let mut spans = vec![Span::styled(format!("  {}", item.title), style)];
                    if let Some(description) = &item.description {
                        spans.push(Span::styled(
                            format!("  {}", description),
                            Style::default().fg(DIM),
                        ));
                    }
                    Some(ListItem::new(Line::from(spans)))
                }
            })
            .collect();
        frame.render_widget(List::new(items), layout.list);
    }

    if app.focus == Focus::Palette && layout.input.width > 0 {
        let typed = view.query.chars().count() as u16;
        let x = (layout.input.x + 2 + typed).min(layout.input.right().saturating_sub(1));
        frame.set_cursor_position(Position::new(x, layout.input.y));
    }
}
