use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

use oaracle_core::utils::truncate_string;

use crate::app::{App, AppState};

use super::results::ResultsView;
use super::styles;

/// Width of the side panel holding instructions, location and results.
const SIDE_PANEL_WIDTH: u16 = 44;

const LOGO: [&str; 3] = [
    "    ╔═╗╔═╗╦═╗╔═╗╔═╗╦  ╔═╗",
    "    ║ ║╠═╣╠╦╝╠═╣║  ║  ║╣ ",
    "    ╚═╝╩ ╩╩╚═╩ ╩╚═╝╩═╝╚═╝",
];

/// Split the frame into title bar, map, side panel and status bar.
fn layout(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Map and side panel
            Constraint::Length(2), // Status bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDE_PANEL_WIDTH)])
        .split(rows[1]);

    (rows[0], columns[0], columns[1], rows[2])
}

/// Cells the map is drawn into. Mouse clicks are translated against this.
pub fn map_area(frame_area: Rect) -> Rect {
    let (_, map, _, _) = layout(frame_area);
    map_block(false).inner(map)
}

fn map_block(focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused))
}

pub fn render(frame: &mut Frame, app: &App) {
    let (title, map, side, status) = layout(frame.area());

    render_title_bar(frame, app, title);
    render_map(frame, app, map);
    render_side_panel(frame, app, side);
    render_status_bar(frame, app, status);

    // Render overlays
    if let Some(message) = app.ctx.workflow.error() {
        render_error_dialog(frame, message);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Oaracle";
    let view = app.ctx.map.center();
    let position = format!("{}  z{}", view, app.ctx.map.zoom());
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(
                title.len() + position.chars().count() + help_hint.len() + 6,
            ),
        )),
        Span::styled(position, styles::muted_style()),
        Span::raw("   "),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = map_block(app.state == AppState::Normal);
    let inner = block.inner(area);
    let bounds = app.ctx.map.bounds(inner.width, inner.height);
    let center = app.ctx.map.center();
    let marker = app.ctx.map.marker().map(|m| m.point);

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: styles::COASTLINE,
                resolution: MapResolution::High,
            });
            ctx.layer();
            ctx.print(
                center.longitude,
                center.latitude,
                Span::styled("+", styles::muted_style()),
            );
            if let Some(point) = marker {
                ctx.print(
                    point.longitude,
                    point.latitude,
                    Span::styled("◉", styles::marker_style()),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn render_side_panel(frame: &mut Frame, app: &App, area: Rect) {
    let workflow = &app.ctx.workflow;

    let area = if workflow.instructions_visible() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(area);
        render_instructions(frame, chunks[0]);
        chunks[1]
    } else {
        area
    };

    if workflow.results_visible() {
        render_results_panel(frame, app, area);
    } else if workflow.location_panel_visible() {
        render_location_panel(frame, app, area);
    } else {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  No location selected", styles::muted_style())),
        ])
        .block(side_block(" Location "));
        frame.render_widget(paragraph, area);
    }
}

fn side_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
}

fn render_instructions(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Click a river, lake or stretch of coast to see if it's a good day to row.",
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[d]", styles::help_key_style()),
            Span::styled(" dismiss", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(side_block(" Welcome "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_location_panel(frame: &mut Frame, app: &App, area: Rect) {
    let workflow = &app.ctx.workflow;
    let mut lines = Vec::new();

    match workflow.location_text() {
        Some(description) => lines.push(Line::from(Span::styled(
            description.to_string(),
            styles::list_item_style(),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Resolving...",
            styles::muted_style(),
        ))),
    }

    if let Some(selection) = workflow.selection() {
        lines.push(Line::from(Span::styled(
            selection.point.to_string(),
            styles::muted_style(),
        )));
    }
    lines.push(Line::from(""));

    if workflow.loading() {
        lines.push(Line::from(Span::styled(
            "⏳ Fetching rowing conditions...",
            styles::highlight_style(),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("[c]", styles::help_key_style()),
            Span::styled(" Get rowing conditions", styles::help_desc_style()),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(side_block(" Location "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_results_panel(frame: &mut Frame, app: &App, area: Rect) {
    let Some(result) = app.ctx.workflow.result() else {
        return;
    };
    let view = ResultsView::from_result(result);

    let mut lines = Vec::new();

    let mut heading = vec![Span::styled(view.heading.clone(), styles::heading_style())];
    if let Some(ref score) = view.score {
        heading.push(Span::raw("  "));
        heading.push(Span::styled(score.clone(), styles::highlight_style()));
    }
    lines.push(Line::from(heading));
    if let Some(ref category) = view.category {
        lines.push(Line::from(Span::styled(
            category.clone(),
            styles::category_style(category),
        )));
    }

    let label_width = view
        .sections
        .iter()
        .flat_map(|s| s.rows.iter())
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);

    for section in &view.sections {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(section.title, styles::heading_style())));
        for row in &section.rows {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {:<width$}  ", row.label, width = label_width),
                    styles::muted_style(),
                ),
                Span::styled(row.value.clone(), styles::list_item_style()),
            ]));
        }
        for note in &section.notes {
            lines.push(Line::from(Span::styled(
                format!(" • {}", note),
                styles::list_item_style(),
            )));
        }
    }

    let block = side_block(" Conditions ")
        .title_bottom(Line::from(Span::styled(" [x] close ", styles::muted_style())));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.results_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[l]ocate me | [q]uit";
    let right_text = format!(" {} ", shortcuts);
    let room = (area.width as usize).saturating_sub(right_text.len() + 2);
    let left_text = format!(" {} ", truncate_string(&app.status_text(), room));

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_error_dialog(frame: &mut Frame, message: &str) {
    let area = centered_rect_fixed(56, 9, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", message), styles::error_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [c]", styles::help_key_style()),
            Span::styled(" retry   ", styles::muted_style()),
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" dismiss", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Error ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style())
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 23, frame.area());
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect();
    lines.push(Line::from(""));

    let bindings = [
        ("Click", "Choose a spot"),
        ("Enter", "Choose the spot under +"),
        ("Arrow keys", "Pan the map"),
        ("+ / - / wheel", "Zoom in / out"),
        ("c", "Get rowing conditions"),
        ("x / Esc", "Close results"),
        ("PgUp / PgDn", "Scroll results"),
        ("l", "Jump to my location"),
        ("d", "Dismiss the welcome note"),
        ("?", "Toggle this help"),
        ("q", "Quit"),
    ];
    for (key, desc) in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  Backend: {}", app.config.api_base_url),
        styles::muted_style(),
    )));
    lines.push(Line::from(Span::styled(
        "  Place names © OpenStreetMap contributors",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_area_inside_frame() {
        let frame = Rect::new(0, 0, 120, 40);
        let map = map_area(frame);
        // Title bar (3) plus border (1)
        assert_eq!(map.y, 4);
        assert_eq!(map.x, 1);
        assert_eq!(map.width, 120 - SIDE_PANEL_WIDTH - 2);
        assert_eq!(map.height, 40 - 3 - 2 - 2);
    }

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let r = centered_rect_fixed(50, 20, Rect::new(0, 0, 30, 10));
        assert_eq!(r, Rect::new(0, 0, 30, 10));

        let r = centered_rect_fixed(10, 4, Rect::new(0, 0, 30, 10));
        assert_eq!(r, Rect::new(10, 3, 10, 4));
    }
}
