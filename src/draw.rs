use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::overlay::OverlayState;
use crate::state::views::{DashboardSummary, Presentation, ScoreboardPage, TeamsPage};
use crate::ui::layout::LayoutAreas;
use chrono::Local;
use espn_api::{Competitor, Game, GameSummary, TeamDetail};

static TABS: &[&str; 3] = &["Dashboard", "Scoreboard", "Teams"];

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const HELP_TEXT: &[(&str, &str)] = &[
    ("1 / 2 / 3", "Dashboard / Scoreboard / Teams"),
    ("l", "switch league (NBA / NFL)"),
    ("j k / ↓ ↑", "move selection, scroll details"),
    ("Enter", "open game or team details"),
    ("Esc", "close details, leave help"),
    ("/", "search teams"),
    ("r", "retry failed requests"),
    ("R", "reload everything on screen"),
    ("f", "full screen"),
    ("\"", "toggle logs"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Dashboard => draw_dashboard(f, layout.main, app),
            MenuItem::Scoreboard => draw_scoreboard(f, layout.main, app),
            MenuItem::Teams => draw_teams(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Dashboard => 0,
        MenuItem::Scoreboard => 1,
        MenuItem::Teams => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new(format!("{}  Help: ? ", app.league()))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Shared state panels
// ---------------------------------------------------------------------------

/// Render a non-ready presentation into `area`. Returns the ready payload
/// when there is one.
fn draw_state<T>(f: &mut Frame, area: Rect, presentation: Presentation<T>) -> Option<T> {
    let (lines, color) = match presentation {
        Presentation::Ready(page) => return Some(page),
        Presentation::Loading { message } => (vec![Line::from(message)], Color::DarkGray),
        Presentation::Error { message } => (
            vec![
                Line::from(Span::styled(message, Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from("Press r to retry"),
            ],
            Color::Red,
        ),
        Presentation::Empty { message } => (
            vec![
                Line::from(message),
                Line::from(""),
                Line::from("Try another league with l, or check back later"),
            ],
            Color::DarkGray,
        ),
        Presentation::NoMatches { message } => (
            vec![
                Line::from(message),
                Line::from(""),
                Line::from("Press / to edit the search"),
            ],
            Color::DarkGray,
        ),
    };

    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(lines.len() as u16),
        Constraint::Fill(1),
    ])
    .areas(area);
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        middle,
    );
    None
}

/// Keep `cursor` inside a window of `height` rows.
fn list_offset(cursor: usize, height: u16) -> u16 {
    let height = height.max(1) as usize;
    cursor.saturating_sub(height - 1) as u16
}

fn selectable_line(text: String, selected: bool) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            format!("> {text}"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(format!("  {text}"))
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(format!(" {} Dashboard ", app.league()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(summary) = draw_state(f, inner, app.dashboard()) else {
        return;
    };

    let [cards, welcome] =
        Layout::vertical([Constraint::Length(5), Constraint::Fill(1)]).areas(inner);
    draw_stat_cards(f, cards, &summary);

    let text = vec![
        Line::from(Span::styled(
            format!("Welcome to the {} dashboard", summary.league),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("2: live scores and game details, refreshed every minute"),
        Line::from("3: every team, with search and team details"),
        Line::from("l: switch league"),
    ];
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Gray)),
        welcome,
    );
}

fn draw_stat_cards(f: &mut Frame, area: Rect, summary: &DashboardSummary) {
    let cards = [
        ("Total Games", summary.total_games, Color::White),
        ("Live Games", summary.live_games, Color::Red),
        ("Upcoming", summary.upcoming_games, Color::Cyan),
        ("Teams", summary.total_teams, Color::Green),
    ];
    let areas: [Rect; 4] = Layout::horizontal([Constraint::Fill(1); 4]).areas(area);
    for ((label, value, color), card) in cards.into_iter().zip(areas) {
        let block = default_border(Color::DarkGray).title(format!(" {label} "));
        let inner = block.inner(card);
        f.render_widget(block, card);
        f.render_widget(
            Paragraph::new(value.to_string())
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center),
            inner,
        );
    }
}

// ---------------------------------------------------------------------------
// Scoreboard
// ---------------------------------------------------------------------------

fn draw_scoreboard(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Scoreboard ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let updated = app
        .scoreboard_snapshot()
        .fetched_at
        .map(|at| format!("updated {}s ago", at.elapsed().as_secs()));
    let Some(page) = draw_state(f, inner, app.scoreboard_page()) else {
        return;
    };

    let [header, list] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    draw_page_header(f, header, &page, updated);

    let cursor = app.state.scoreboard.cursor;
    let lines: Vec<Line> = page
        .games
        .iter()
        .enumerate()
        .map(|(idx, game)| selectable_line(game_line(game), idx == cursor))
        .collect();
    f.render_widget(
        Paragraph::new(lines).scroll((list_offset(cursor, list.height), 0)),
        list,
    );

    if app.state.scoreboard.game_overlay.is_open() {
        draw_game_overlay(f, area, app);
    }
}

fn draw_page_header(f: &mut Frame, area: Rect, page: &ScoreboardPage, updated: Option<String>) {
    let mut spans = vec![
        Span::styled(page.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(page.count_label.clone(), Style::default().fg(Color::Gray)),
    ];
    if let Some(updated) = updated {
        spans.push(Span::styled(format!("  ({updated})"), Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(
        Paragraph::new(vec![
            Line::from(spans),
            Line::from(Span::styled(
                "j/k move  Enter details  l league",
                Style::default().fg(Color::DarkGray),
            )),
        ]),
        area,
    );
}

fn game_line(game: &Game) -> String {
    format!(
        "{:<5} {:>3}  @  {:<5} {:>3}   {}",
        game.away.team.abbreviation,
        score(&game.away),
        game.home.team.abbreviation,
        score(&game.home),
        game_status(game),
    )
}

fn score(competitor: &Competitor) -> String {
    competitor.score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

fn game_status(game: &Game) -> String {
    if game.is_live() {
        format!("LIVE {}", game.detail)
    } else if game.is_final() {
        if game.detail.is_empty() { "FINAL".to_string() } else { game.detail.clone() }
    } else {
        game.date
            .map(|d| d.with_timezone(&Local).format("%a %b %-d %-I:%M %p").to_string())
            .unwrap_or_else(|| game.detail.clone())
    }
}

fn draw_game_overlay(f: &mut Frame, area: Rect, app: &App) {
    let popup = centered_rect(area, 80, 80);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Cyan).title(" Game Details (Esc to close) ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let summary = match app.game_overlay() {
        OverlayState::Ready(summary) => summary,
        other => {
            draw_overlay_placeholder(f, inner, other, "Loading game details...");
            return;
        }
    };
    f.render_widget(
        Paragraph::new(game_summary_lines(&summary))
            .wrap(Wrap { trim: false })
            .scroll((app.state.scoreboard.game_overlay.scroll, 0)),
        inner,
    );
}

fn game_summary_lines(summary: &GameSummary) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let section = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let game = &summary.header;

    let mut lines = vec![
        Line::from(Span::styled(game.name.clone(), bold)),
        Line::from(format!(
            "{} {}  @  {} {}",
            game.away.team.display_name,
            score(&game.away),
            game.home.team.display_name,
            score(&game.home)
        )),
        Line::from(Span::styled(game_status(game), Style::default().fg(Color::Gray))),
    ];
    if let Some(venue) = &summary.venue {
        let venue = match venue.location() {
            Some(location) => format!("{} ({location})", venue.name),
            None => venue.name.clone(),
        };
        lines.push(Line::from(format!("Venue: {venue}")));
    }
    if let Some(attendance) = summary.attendance {
        lines.push(Line::from(format!("Attendance: {attendance}")));
    }

    if !summary.leaders.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Leaders", section)));
        for category in &summary.leaders {
            for leader in &category.leaders {
                lines.push(Line::from(format!(
                    "  {:<12} {:<24} {:<5} {}",
                    category.name, leader.athlete, leader.team_abbreviation, leader.display_value
                )));
            }
        }
    }

    if !summary.team_stats.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Team Stats", section)));
        lines.push(Line::from(format!(
            "  {:<24} {:>10} {:>10}",
            "",
            game.away.team.abbreviation,
            game.home.team.abbreviation
        )));
        for stat in &summary.team_stats {
            lines.push(Line::from(format!(
                "  {:<24} {:>10} {:>10}",
                stat.label, stat.away, stat.home
            )));
        }
    }

    for group in &summary.player_groups {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} {}", group.team, group.category),
            section,
        )));
        lines.push(Line::from(Span::styled(
            format!("  {:<24} {}", "", group.labels.join("  ")),
            Style::default().fg(Color::DarkGray),
        )));
        for row in &group.rows {
            lines.push(Line::from(format!("  {:<24} {}", row.athlete, row.stats.join("  "))));
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [search, body] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    draw_search_line(f, search, app);

    let Some(page) = draw_state(f, body, app.teams_page()) else {
        return;
    };

    let [header, list] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(body);
    draw_teams_header(f, header, &page);

    let cursor = app.state.teams.cursor;
    let lines: Vec<Line> = page
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            selectable_line(
                format!("{:<5} {:<32} {}", team.abbreviation, team.display_name, team.location),
                idx == cursor,
            )
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).scroll((list_offset(cursor, list.height), 0)),
        list,
    );

    if app.state.teams.team_overlay.is_open() {
        draw_team_overlay(f, area, app);
    }
}

fn draw_search_line(f: &mut Frame, area: Rect, app: &App) {
    let teams = &app.state.teams;
    let line = if teams.searching {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(teams.search.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if teams.search.is_empty() {
        Line::from(Span::styled(
            "Press / to search teams",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Gray)),
            Span::raw(teams.search.clone()),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_teams_header(f: &mut Frame, area: Rect, page: &TeamsPage) {
    f.render_widget(
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(page.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(page.count_label.clone(), Style::default().fg(Color::Gray)),
            ]),
            Line::from(Span::styled(
                "j/k move  Enter details  / search",
                Style::default().fg(Color::DarkGray),
            )),
        ]),
        area,
    );
}

fn draw_team_overlay(f: &mut Frame, area: Rect, app: &App) {
    let popup = centered_rect(area, 60, 70);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Cyan).title(" Team Details (Esc to close) ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let detail = match app.team_overlay() {
        OverlayState::Ready(detail) => detail,
        other => {
            draw_overlay_placeholder(f, inner, other, "Loading team details...");
            return;
        }
    };
    f.render_widget(
        Paragraph::new(team_detail_lines(&detail))
            .wrap(Wrap { trim: false })
            .scroll((app.state.teams.team_overlay.scroll, 0)),
        inner,
    );
}

fn team_detail_lines(detail: &TeamDetail) -> Vec<Line<'static>> {
    let team = &detail.team;
    let accent = team.color.as_deref().and_then(team_color).unwrap_or(Color::White);
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<14}"), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            team.display_name.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        row("Location", team.location.clone()),
        row("Abbreviation", team.abbreviation.clone()),
        row("Short name", team.short_display_name.clone()),
        row("Status", if team.is_active { "Active" } else { "Inactive" }.to_string()),
    ];
    if let Some(color) = &team.color {
        let mut spans = vec![
            Span::styled(format!("{:<14}", "Colors"), Style::default().fg(Color::Gray)),
            Span::styled("■ ", Style::default().fg(accent)),
            Span::raw(format!("#{color}")),
        ];
        if let Some(alternate) = &team.alternate_color {
            let swatch = team_color(alternate).unwrap_or(Color::Gray);
            spans.push(Span::raw("  "));
            spans.push(Span::styled("■ ", Style::default().fg(swatch)));
            spans.push(Span::raw(format!("#{alternate}")));
        }
        lines.push(Line::from(spans));
    }
    if let Some(record) = &detail.record {
        lines.push(row("Record", record.clone()));
    }
    if let Some(standing) = &detail.standing {
        lines.push(row("Standing", standing.clone()));
    }
    if let Some(venue) = &detail.venue {
        lines.push(row("Venue", venue.clone()));
    }
    lines
}

fn team_color(hex: &str) -> Option<Color> {
    if hex.is_empty() {
        return None;
    }
    format!("#{hex}").parse().ok()
}

fn draw_overlay_placeholder<T>(f: &mut Frame, area: Rect, state: OverlayState<T>, loading: &str) {
    let presentation: Presentation<()> = match state {
        OverlayState::Error { message } => Presentation::Error { message },
        _ => Presentation::Loading { message: loading.to_string() },
    };
    draw_state(f, area, presentation);
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, column, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(area);
    let [_, popup, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(column);
    popup
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help (Esc to go back) ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = HELP_TEXT
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:>12}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App) {
    if !app.is_fetching() {
        return;
    }
    let frame = SPINNER_CHARS[app.state.tick as usize % SPINNER_CHARS.len()];
    let spinner = Paragraph::new(frame.to_string())
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::White));
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(14), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use espn_api::{GameState, Team};

    fn competitor(abbreviation: &str, score: Option<u16>) -> Competitor {
        Competitor {
            team: Team { abbreviation: abbreviation.into(), ..Default::default() },
            score,
            ..Default::default()
        }
    }

    #[test]
    fn game_line_shows_live_scores() {
        let game = Game {
            state: GameState::In,
            detail: "Q3 4:12".into(),
            away: competitor("BOS", Some(81)),
            home: competitor("MIA", Some(77)),
            ..Default::default()
        };
        let line = game_line(&game);
        assert!(line.starts_with("BOS"));
        assert!(line.contains("81"));
        assert!(line.contains("MIA"));
        assert!(line.ends_with("LIVE Q3 4:12"));
    }

    #[test]
    fn finished_games_fall_back_to_final() {
        let mut game = Game { state: GameState::Post, ..Default::default() };
        assert_eq!(game_status(&game), "FINAL");
        game.detail = "Final/OT".into();
        assert_eq!(game_status(&game), "Final/OT");
    }

    #[test]
    fn missing_scores_render_as_dash() {
        assert_eq!(score(&competitor("DEN", None)), "-");
    }

    #[test]
    fn list_offset_keeps_cursor_visible() {
        assert_eq!(list_offset(0, 10), 0);
        assert_eq!(list_offset(9, 10), 0);
        assert_eq!(list_offset(12, 10), 3);
        assert_eq!(list_offset(3, 0), 3);
    }

    #[test]
    fn team_colors_parse_from_bare_hex() {
        assert_eq!(team_color("ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(team_color(""), None);
    }
}
