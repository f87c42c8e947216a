pub mod charting;

use chrono::{DateTime, Local};
use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, Gauge, GraphType, Paragraph, Row, Table, Wrap,
    },
    Frame,
};
use time_humanize::HumanTime;
use unicode_width::UnicodeWidthStr;

use crate::game::{
    rush::Flash, ClassicGame, Game, GameKind, GhostGame, Phase, RaceGame, RushGame, SurvivorGame,
    ZenGame,
};
use crate::opponents::{Racer, TRACK_LEN};
use crate::session::TypingSession;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const RIVAL_COLORS: [Color; 3] = [Color::LightRed, Color::Yellow, Color::LightMagenta];
const PLAYER_COLOR: Color = Color::LightCyan;

pub fn draw(app: &App, f: &mut Frame) {
    match app.state {
        AppState::Home => draw_home(app, f),
        AppState::Game => {
            if let Some(game) = &app.game {
                draw_game(game, f);
            }
        }
        AppState::Results => draw_results(app, f),
    }
}

// ── home ────────────────────────────────────────────

fn draw_home(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Paragraph::new(Span::styled(
        "typeforge",
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let items: Vec<Line> = GameKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let selected = i == app.selected;
            let marker = if selected { "▸ " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{}{}  {:<11}", marker, i + 1, kind.title()), style),
                Span::styled(
                    kind.blurb(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(items).alignment(Alignment::Left), chunks[1]);

    let opts = &app.options;
    let options_line = format!(
        "duration {}s · text {} · punct {} · nums {} · sound {}",
        opts.duration_secs,
        opts.text_mode,
        on_off(opts.punctuation),
        on_off(opts.numbers),
        on_off(app.sound),
    );
    f.render_widget(
        Paragraph::new(Span::styled(options_line, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center),
        chunks[2],
    );

    draw_history(app, f, chunks[3]);

    hint_line(
        f,
        chunks[4],
        "↑/↓ select · enter play · d duration · t text · p punct · n nums · s sound · c clear history · esc quit",
    );
}

fn draw_history(app: &App, f: &mut Frame, area: Rect) {
    if app.history.is_empty() {
        let empty = Paragraph::new("no sessions yet — play one!")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("history"));
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["game", "score", "accuracy", "when"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = app
        .history
        .iter()
        .take(area.height.saturating_sub(3) as usize)
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.game.clone()),
                Cell::from(entry.score.to_string()),
                Cell::from(entry.accuracy.clone()),
                Cell::from(humanize_date(&entry.date)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        &[
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("history"));
    f.render_widget(table, area);
}

fn humanize_date(rfc3339: &str) -> String {
    match DateTime::parse_from_rfc3339(rfc3339) {
        Ok(then) => {
            let delta = then.with_timezone(&Local) - Local::now();
            HumanTime::from(delta.num_seconds()).to_string()
        }
        Err(_) => rfc3339.to_string(),
    }
}

// ── in-game ─────────────────────────────────────────

fn draw_game(game: &Game, f: &mut Frame) {
    match game {
        Game::Classic(g) => draw_classic(g, f),
        Game::Zen(g) => draw_zen(g, f),
        Game::Survivor(g) => draw_survivor(g, f),
        Game::Ghost(g) => draw_ghost(g, f),
        Game::CarRace(g) => draw_race(g, f),
        Game::WordRush(g) => draw_rush(g, f),
    }
}

fn draw_classic(g: &ClassicGame, f: &mut Frame) {
    let chunks = game_layout(f.area());
    hud_line(
        f,
        chunks[0],
        &[
            (g.wpm_now().to_string(), "wpm"),
            (format!("{}%", g.session().stats().accuracy), "acc"),
            (g.streak().to_string(), "streak"),
        ],
        Some((g.time_left(), g.duration_secs())),
    );
    typing_area(f, chunks[2], g.session(), g.phase(), None);
    progress_line(f, chunks[3], g.session().progress());
    hint_line(f, chunks[4], "tab restart · esc menu");
}

fn draw_zen(g: &ZenGame, f: &mut Frame) {
    let chunks = game_layout(f.area());
    let elapsed = if g.elapsed_secs() > 0 {
        format!("{}s", g.elapsed_secs())
    } else {
        "—".to_string()
    };
    hud_line(
        f,
        chunks[0],
        &[
            (g.wpm_now().to_string(), "wpm"),
            (format!("{}%", g.session().stats().accuracy), "acc"),
            (g.streak().to_string(), "streak"),
            (elapsed, "time"),
        ],
        None,
    );
    typing_area(f, chunks[2], g.session(), g.phase(), None);
    progress_line(f, chunks[3], g.session().progress());
    hint_line(f, chunks[4], "no timer · enter to finish · tab restart · esc menu");
}

fn draw_survivor(g: &SurvivorGame, f: &mut Frame) {
    let chunks = game_layout(f.area());
    let hearts: String = (0..crate::game::survivor::MAX_LIVES)
        .map(|i| if i < g.lives() { '♥' } else { '♡' })
        .collect();
    hud_line(
        f,
        chunks[0],
        &[
            (g.wpm_now().to_string(), "wpm"),
            (g.streak().to_string(), "streak"),
            (hearts, "lives"),
        ],
        Some((g.time_left(), g.duration_secs())),
    );
    typing_area(f, chunks[2], g.session(), g.phase(), None);
    progress_line(f, chunks[3], g.session().progress());
    hint_line(f, chunks[4], "finish words with errors → lose a heart");
}

fn draw_ghost(g: &GhostGame, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2), // ghost lane
            Constraint::Length(2), // player lane
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    hud_line(
        f,
        chunks[0],
        &[
            (g.wpm_now().to_string(), "wpm"),
            (g.streak().to_string(), "streak"),
        ],
        Some((g.time_left(), g.duration_secs())),
    );

    let total = g.session().len().max(1) as f64;
    let ghost_ratio = (g.ghost_pos() / total).min(1.0);
    f.render_widget(
        Gauge::default()
            .label(format!("ghost · {} wpm", g.ghost_wpm()))
            .ratio(ghost_ratio)
            .gauge_style(Style::default().fg(Color::Magenta)),
        chunks[1],
    );

    let delta = g.chars_ahead();
    let delta_label = match delta {
        d if d > 0 => format!("you · {} chars ahead", d),
        d if d < 0 => format!("you · {} chars behind", -d),
        _ => "you · even".to_string(),
    };
    f.render_widget(
        Gauge::default()
            .label(delta_label)
            .ratio(g.session().progress())
            .gauge_style(Style::default().fg(PLAYER_COLOR)),
        chunks[2],
    );

    typing_area(f, chunks[3], g.session(), g.phase(), Some(g.ghost_pos()));
    progress_line(f, chunks[4], g.session().progress());
    hint_line(
        f,
        chunks[5],
        "race your best classic score — the ghost always matches your PB",
    );
}

fn draw_race(g: &RaceGame, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(6), // track
            Constraint::Length(1), // difficulty / finish overlay
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    hud_line(
        f,
        chunks[0],
        &[
            (g.wpm_now().to_string(), "wpm"),
            (format!("{}%", g.session().stats().accuracy), "acc"),
        ],
        Some((g.time_left(), crate::game::race::RACE_DURATION_SECS)),
    );

    draw_track(g, f, chunks[1]);

    if let Some(rank) = g.player_rank() {
        let (text, color) = if g.winner() == Some(Racer::Player) {
            ("YOU WIN".to_string(), Color::Green)
        } else {
            (format!("{} place", crate::util::ordinal(rank)), Color::Red)
        };
        f.render_widget(
            Paragraph::new(Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            chunks[2],
        );
    } else {
        let mult = g.difficulty().multiplier();
        let targets = g
            .rivals()
            .rivals
            .iter()
            .map(|r| format!("{} ({} wpm)", r.name, (r.base_wpm as f64 * mult).round()))
            .join(", ");
        let line = format!("difficulty ◂ {} ▸ · targets: {}", g.difficulty(), targets);
        f.render_widget(
            Paragraph::new(Span::styled(line, Style::default().fg(Color::Gray)))
                .alignment(Alignment::Center),
            chunks[2],
        );
    }

    typing_area(f, chunks[3], g.session(), g.phase(), None);
    progress_line(f, chunks[4], g.session().progress());
    hint_line(
        f,
        chunks[5],
        "your speed powers the car · ◂/▸ difficulty before the start",
    );
}

fn draw_track(g: &RaceGame, f: &mut Frame, area: Rect) {
    let inner_width = area.width.saturating_sub(14).max(10) as f64;
    let lane = |name: &str, pos: f64, color: Color| {
        let filled = ((pos / TRACK_LEN).min(1.0) * inner_width) as usize;
        let road: String = std::iter::repeat('·')
            .take(filled)
            .chain(std::iter::once('▶'))
            .collect();
        Line::from(vec![
            Span::styled(format!("{:<8}", name), Style::default().fg(color)),
            Span::styled(road, Style::default().fg(color)),
        ])
    };

    let mut lines = vec![lane("you", g.player_pos(), PLAYER_COLOR)];
    for (i, rival) in g.rivals().rivals.iter().enumerate() {
        lines.push(lane(
            rival.name,
            rival.position,
            RIVAL_COLORS[i % RIVAL_COLORS.len()],
        ));
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("track")),
        area,
    );
}

fn draw_rush(g: &RushGame, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2), // ring
            Constraint::Length(2), // word
            Constraint::Length(1), // limit
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    hud_line(
        f,
        chunks[0],
        &[
            (g.score().to_string(), "score"),
            (g.combo().to_string(), "combo"),
        ],
        Some((g.time_left(), crate::game::rush::RUSH_DURATION_SECS)),
    );

    let frac = g.ring_fraction();
    let ring_color = if frac > 0.5 {
        Color::Cyan
    } else if frac > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    f.render_widget(
        Gauge::default()
            .ratio(frac)
            .gauge_style(Style::default().fg(ring_color)),
        chunks[1],
    );

    let word_line = if g.phase() == Phase::Idle {
        Line::from(Span::styled(
            "start typing to begin",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        let typed: Vec<char> = g.typed().chars().collect();
        let mut spans: Vec<Span> = g
            .word()
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let style = match typed.get(i) {
                    Some(t) if *t == c => Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                    Some(_) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    None => Style::default().add_modifier(Modifier::DIM),
                };
                Span::styled(c.to_string(), style)
            })
            .collect();
        if let Some(flash) = g.flash() {
            let (mark, color) = match flash {
                Flash::Ok => (" ✓", Color::Green),
                Flash::Fail => (" ✗", Color::Red),
            };
            spans.push(Span::styled(mark, Style::default().fg(color)));
        }
        Line::from(spans)
    };
    f.render_widget(
        Paragraph::new(word_line).alignment(Alignment::Center),
        chunks[2],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            format!("{:.2}s per word", g.limit_secs()),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        chunks[3],
    );

    hint_line(
        f,
        chunks[5],
        "space skips · finish the word before the ring empties",
    );
}

// ── results ─────────────────────────────────────────

fn draw_results(app: &App, f: &mut Frame) {
    let Some(result) = &app.result else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled(
            result.label.clone(),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        chunks[0],
    );

    let headline = format!("{} {}", result.main_num, result.main_unit);
    f.render_widget(
        Paragraph::new(Span::styled(
            headline,
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        chunks[1],
    );

    if app.result_is_pb {
        f.render_widget(
            Paragraph::new(Span::styled(
                "new personal best",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center),
            chunks[2],
        );
    }

    let stat_line = result
        .stats
        .iter()
        .map(|s| format!("{} {}", s.val, s.lbl.to_lowercase()))
        .join("   ");
    f.render_widget(
        Paragraph::new(Span::styled(
            stat_line,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        chunks[3],
    );

    if result.wpm_history.len() > 1 {
        draw_wpm_chart(&result.wpm_history, f, chunks[4]);
    }

    hint_line(f, chunks[5], "r play again · esc menu");
}

fn draw_wpm_chart(history: &[u32], f: &mut Frame, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let points = charting::wpm_points(history);
    let (duration, highest) = charting::compute_chart_params(history);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, duration])
                .labels(vec![
                    Span::styled("1", bold),
                    Span::styled(charting::format_label(duration), bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest])
                .labels(vec![
                    Span::styled("0", bold),
                    Span::styled(charting::format_label(highest), bold),
                ]),
        );
    f.render_widget(chart, area);
}

// ── shared pieces ───────────────────────────────────

fn game_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area)
}

fn hud_line(f: &mut Frame, area: Rect, blocks: &[(String, &str)], timer: Option<(u64, u64)>) {
    let mut spans: Vec<Span> = Vec::new();
    for (val, lbl) in blocks {
        spans.push(Span::styled(
            val.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}   ", lbl),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some((left, total)) = timer {
        let urgency = if left <= 5 {
            Color::Red
        } else if left <= total / 2 {
            Color::Yellow
        } else {
            Color::Gray
        };
        spans.push(Span::styled(
            format!("{}s", left),
            Style::default().fg(urgency).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// The prompt with per-character outcome coloring, the cursor underlined,
/// and optionally the ghost marker highlighted in the untyped tail.
fn typing_area(
    f: &mut Frame,
    area: Rect,
    session: &TypingSession,
    phase: Phase,
    ghost_pos: Option<f64>,
) {
    if phase == Phase::Idle {
        let overlay = Paragraph::new(Span::styled(
            "start typing to begin",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(overlay, area);
        return;
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let green = bold.fg(Color::Green);
    let red = bold.fg(Color::Red);
    let dim = bold.add_modifier(Modifier::DIM);
    let cursor_style = dim.add_modifier(Modifier::UNDERLINED);
    let ghost_style = bold.fg(Color::Magenta).add_modifier(Modifier::REVERSED);

    let target = session.target();
    let typed = session.typed();
    let ghost_idx = ghost_pos.map(|p| p.floor() as usize);

    let mut spans: Vec<Span> = Vec::with_capacity(target.len());
    for (idx, expected) in target.iter().enumerate() {
        let style = match typed.get(idx) {
            Some(t) if t == expected => green,
            Some(_) => red,
            None if idx == session.cursor_idx() => cursor_style,
            None if Some(idx) == ghost_idx => ghost_style,
            None => dim,
        };
        let shown = match typed.get(idx) {
            Some(t) if t != expected => {
                if *t == ' ' {
                    '·'
                } else {
                    *t
                }
            }
            _ => *expected,
        };
        spans.push(Span::styled(shown.to_string(), style));
    }

    let prompt: String = target.iter().collect();
    let max_chars_per_line = area.width.saturating_sub(1).max(1) as usize;
    let single_line = prompt.width() <= max_chars_per_line;

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(if single_line {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn progress_line(f: &mut Frame, area: Rect, progress: f64) {
    f.render_widget(
        Gauge::default()
            .ratio(progress.clamp(0.0, 1.0))
            .label("")
            .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black)),
        area,
    );
}

fn hint_line(f: &mut Frame, area: Rect, text: &str) {
    f.render_widget(
        Paragraph::new(Span::styled(
            text,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        area,
    );
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
