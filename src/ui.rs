use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_dispatch::DataResource;

use crate::action::Action;
use crate::duel::{DuelPhase, RoundReport};
use crate::state::{capitalize, AppState, CatalogEntry, Creature, DetailState, DetailTab, Screen};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(214, 92, 84);

const HIDDEN_CARD: &str = "??????????";
const STAT_GAUGE_MAX: f64 = 255.0;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, chunks[0], state);
    match state.screen {
        Screen::Pokedex => match state.detail.as_ref() {
            Some(detail) => render_detail(frame, chunks[1], state, detail),
            None => render_list(frame, chunks[1], state),
        },
        Screen::Duel => render_duel(frame, chunks[1], state),
    }
    render_footer(frame, chunks[2], state);
}

/// Maps a key press to an action for the current screen.
pub fn handle_key(key: KeyEvent, state: &AppState) -> Option<Action> {
    if state.screen == Screen::Pokedex && state.search.active {
        return match key.code {
            KeyCode::Esc => Some(Action::SearchCancel),
            KeyCode::Enter => Some(Action::SearchSubmit),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(ch) => Some(Action::SearchInput(ch)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Tab => return Some(Action::ScreenToggle),
        _ => {}
    }

    match state.screen {
        Screen::Pokedex if state.detail.is_some() => match key.code {
            KeyCode::Esc => Some(Action::DetailClose),
            KeyCode::Left => Some(Action::DetailPrev),
            KeyCode::Right => Some(Action::DetailNext),
            KeyCode::Char('[') => Some(Action::DetailTabCycle(-1)),
            KeyCode::Char(']') | KeyCode::Char('t') => Some(Action::DetailTabCycle(1)),
            _ => None,
        },
        Screen::Pokedex => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectionMove(-1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectionMove(1)),
            KeyCode::PageUp => Some(Action::SelectionMove(-10)),
            KeyCode::PageDown => Some(Action::SelectionMove(10)),
            KeyCode::Char('/') => Some(Action::SearchStart),
            KeyCode::Esc => Some(Action::SearchCancel),
            KeyCode::Char('m') => Some(Action::CatalogLoadMore),
            KeyCode::Enter => Some(Action::DetailOpen),
            _ => None,
        },
        Screen::Duel => match key.code {
            KeyCode::Char('s') => Some(Action::DuelStart),
            KeyCode::Char('r') => Some(Action::DuelReset),
            KeyCode::Enter => Some(Action::DuelCompare),
            KeyCode::Char(ch @ '1'..='9') => {
                let index = ch.to_digit(10).map(|digit| digit as usize - 1)?;
                Some(Action::DuelSelect(index))
            }
            _ => None,
        },
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let selected = match state.screen {
        Screen::Pokedex => 0,
        Screen::Duel => 1,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("POKEDECK")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(10)])
        .split(inner);
    let tabs = Tabs::new(vec!["POKEDEX", "DUEL"])
        .select(selected)
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, layout[0]);

    if state.screen == Screen::Pokedex {
        let search = if state.search.active {
            format!("/{}_", state.search.query)
        } else if state.search.query.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", state.search.query)
        };
        let line = Line::from(vec![
            Span::raw("Search: "),
            Span::styled(search, Style::default().fg(ACCENT_TEAL)),
            Span::raw(format!(
                "  |  {}/{} shown",
                state.visible.len(),
                state.catalog.len()
            )),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), layout[1]);
    }
}

fn render_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DEX")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));

    let mut items: Vec<ListItem> = state
        .visible
        .iter()
        .filter_map(|index| state.catalog.get(*index))
        .map(|entry| ListItem::new(dex_line(entry)))
        .collect();
    let load_more = if state.page.is_loading() {
        "Loading more..."
    } else {
        "[m] Load more"
    };
    items.push(ListItem::new(Line::from(Span::styled(
        load_more,
        Style::default().fg(ACCENT_GOLD),
    ))));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(BG_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    );
    let mut list_state = ListState::default();
    if !state.visible.is_empty() {
        list_state.select(Some(state.selected));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn dex_line(entry: &CatalogEntry) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("#{:03} ", entry.species.id),
            Style::default().fg(TEXT_DIM),
        ),
        Span::styled(
            format!("{:<14}", entry.creature.display_name()),
            Style::default().fg(TEXT_MAIN),
        ),
        Span::styled(
            format!("{:<18}", entry.creature.types.join("/")),
            Style::default().fg(ACCENT_TEAL),
        ),
        Span::styled(entry.species.color.clone(), Style::default().fg(TEXT_DIM)),
    ])
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState, detail: &DetailState) {
    let Some(entry) = state.current_detail() else {
        frame.render_widget(Paragraph::new("Entry not loaded."), area);
        return;
    };
    let title = format!(
        "#{:03} {} ({})",
        entry.species.id,
        entry.creature.display_name(),
        entry.species.color
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(inner);

    let tab_index = DetailTab::ALL
        .iter()
        .position(|tab| *tab == detail.tab)
        .unwrap_or(0);
    let tabs = Tabs::new(DetailTab::ALL.iter().map(|tab| tab.label()).collect::<Vec<_>>())
        .select(tab_index)
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, layout[0]);

    match detail.tab {
        DetailTab::About => frame.render_widget(
            Paragraph::new(about_text(entry)).wrap(Wrap { trim: true }),
            layout[1],
        ),
        DetailTab::Stats => render_stats(frame, layout[1], entry),
        DetailTab::Evolution => frame.render_widget(
            Paragraph::new(evolution_text(detail)).wrap(Wrap { trim: true }),
            layout[1],
        ),
    }

    let mut nav = Vec::new();
    if state.detail_has_prev() {
        nav.push(Span::styled("<- prev  ", Style::default().fg(ACCENT_GOLD)));
    }
    nav.push(Span::styled("next ->", Style::default().fg(ACCENT_GOLD)));
    frame.render_widget(
        Paragraph::new(Line::from(nav)).alignment(Alignment::Center),
        layout[2],
    );
}

fn about_text(entry: &CatalogEntry) -> Text<'static> {
    let mut lines = vec![
        Line::from(format!("Type: {}", entry.creature.types.join(" / "))),
        Line::from(" "),
        Line::from(Span::styled(
            "Abilities",
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    for ability in &entry.abilities {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", format_name(&ability.name)),
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::raw(ability.short_effect.clone()),
        ]));
    }
    Text::from(lines)
}

fn render_stats(frame: &mut Frame, area: Rect, entry: &CatalogEntry) {
    let stats = &entry.profile.base_stats;
    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(stats.iter().map(|_| Constraint::Length(1)));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    frame.render_widget(
        Paragraph::new(format!(
            "Height: {}  Weight: {}",
            entry.profile.height, entry.profile.weight
        )),
        rows[0],
    );
    for (stat, row) in stats.iter().zip(rows.iter().skip(1)) {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(ACCENT_TEAL).bg(BG_BASE))
            .ratio((f64::from(stat.value) / STAT_GAUGE_MAX).min(1.0))
            .label(format!("{} {}", shorten_stat(&stat.name), stat.value));
        frame.render_widget(gauge, *row);
    }
}

fn evolution_text(detail: &DetailState) -> Text<'static> {
    match &detail.evolution {
        DataResource::Empty => Text::from("No evolution data."),
        DataResource::Loading if detail.evolution_names.is_empty() => {
            Text::from("Resolving evolution chain...")
        }
        DataResource::Loading => Text::from(vec![
            Line::from(chain_line(detail.evolution_names.iter().map(String::as_str))),
            Line::from(Span::styled(
                "Loading artwork...",
                Style::default().fg(TEXT_DIM),
            )),
        ]),
        DataResource::Failed(error) => Text::from(Line::from(Span::styled(
            format!("Evolution unavailable: {error}"),
            Style::default().fg(ACCENT_RED),
        ))),
        DataResource::Loaded(steps) => {
            let mut lines = vec![
                Line::from(chain_line(steps.iter().map(|step| step.name.as_str()))),
                Line::from(" "),
            ];
            for step in steps {
                let artwork = if step.artwork.is_some() {
                    "artwork"
                } else {
                    "no artwork"
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("{:<14}", capitalize(&step.name))),
                    Span::styled(artwork, Style::default().fg(TEXT_DIM)),
                ]));
            }
            Text::from(lines)
        }
    }
}

fn chain_line<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.map(capitalize).collect::<Vec<_>>().join(" → ")
}

fn render_duel(frame: &mut Frame, area: Rect, state: &AppState) {
    let duel = &state.duel;
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DUEL")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match duel.phase {
        DuelPhase::Idle => {
            frame.render_widget(
                Paragraph::new("Press [s] to deal a new match.").alignment(Alignment::Center),
                inner,
            );
            return;
        }
        DuelPhase::Dealing => {
            frame.render_widget(
                Paragraph::new("Dealing cards...").alignment(Alignment::Center),
                inner,
            );
            return;
        }
        _ => {}
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(4),
        ])
        .split(inner);

    let status = vec![
        Line::from(vec![
            Span::styled(
                format!("Round {} of {}", duel.round_number(), duel.total_rounds),
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::raw(format!(
                "   You {} - {} Computer   Draws {}",
                duel.round.player_score, duel.round.computer_score, duel.draws
            )),
        ]),
        Line::from(Span::styled(
            format!("Compare: {}", duel.round.category.label().to_uppercase()),
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        )),
        result_line(state),
    ];
    frame.render_widget(Paragraph::new(status), layout[0]);

    let revealed = matches!(duel.phase, DuelPhase::CardsRevealed | DuelPhase::MatchOver);
    let opponent = match (&duel.last_round, revealed) {
        (Some(report), true) => reveal_text(report),
        _ if duel.round.computer_selection.is_some() => Text::from(HIDDEN_CARD),
        _ => Text::from("No card"),
    };
    frame.render_widget(
        Paragraph::new(opponent).block(
            Block::default()
                .borders(Borders::ALL)
                .title("COMPUTER")
                .border_style(Style::default().fg(ACCENT_RED)),
        ),
        layout[1],
    );

    let selected = duel.selected_index();
    let items: Vec<ListItem> = duel
        .player_hand
        .iter()
        .enumerate()
        .map(|(index, card)| ListItem::new(card_line(index, card)))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("YOUR HAND"))
        .highlight_style(
            Style::default()
                .bg(BG_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        );
    let mut list_state = ListState::default();
    list_state.select(selected);
    frame.render_stateful_widget(list, layout[2], &mut list_state);
}

fn result_line(state: &AppState) -> Line<'static> {
    let duel = &state.duel;
    match duel.phase {
        DuelPhase::MatchOver => Line::from(Span::styled(
            duel.final_outcome().message(),
            Style::default()
                .fg(ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        )),
        DuelPhase::CardsRevealed => match &duel.last_round {
            Some(report) => Line::from(report.winner.message()),
            None => Line::from(""),
        },
        _ => Line::from(Span::styled(
            "Pick a card [1-9] and press Enter",
            Style::default().fg(TEXT_DIM),
        )),
    }
}

fn reveal_text(report: &RoundReport) -> Text<'static> {
    Text::from(vec![
        Line::from(format!(
            "{}  {} {}",
            report.computer_card.display_name(),
            report.category.label(),
            report.computer_card.stats.get(report.category)
        )),
        Line::from(Span::styled(
            format!(
                "vs {}  {} {}",
                report.player_card.display_name(),
                report.category.label(),
                report.player_card.stats.get(report.category)
            ),
            Style::default().fg(TEXT_DIM),
        )),
    ])
}

fn card_line(index: usize, card: &Creature) -> Line<'static> {
    let stats = card.stats;
    Line::from(vec![
        Span::styled(format!("{}. ", index + 1), Style::default().fg(TEXT_DIM)),
        Span::raw(format!("{:<14}", card.display_name())),
        Span::styled(
            format!(
                "ATK {:>3}  DEF {:>3}  SPD {:>3}  HP {:>3}",
                stats.attack, stats.defense, stats.speed, stats.hp
            ),
            Style::default().fg(ACCENT_TEAL),
        ),
    ])
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = match state.message.as_deref() {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(ACCENT_GOLD),
        )),
        None => Line::from(Span::styled(hints(state), Style::default().fg(TEXT_DIM))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn hints(state: &AppState) -> &'static str {
    match state.screen {
        Screen::Pokedex if state.search.active => "type to filter  Enter keep  Esc clear",
        Screen::Pokedex if state.detail.is_some() => "[ ] tabs  <- -> prev/next  Esc close  q quit",
        Screen::Pokedex => "j/k move  Enter open  / search  m more  Tab duel  q quit",
        Screen::Duel => "s start  1-9 pick  Enter compare  r reset  Tab pokedex  q quit",
    }
}

fn format_name(name: &str) -> String {
    name.split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => " HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SAT".to_string(),
        "special-defense" => "SDF".to_string(),
        "speed" => "SPD".to_string(),
        _ => name.to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen_text(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn search_mode_captures_letters() {
        let mut state = AppState::default();
        assert_eq!(handle_key(key(KeyCode::Char('q')), &state), Some(Action::Quit));
        state.search.active = true;
        assert_eq!(
            handle_key(key(KeyCode::Char('q')), &state),
            Some(Action::SearchInput('q'))
        );
        assert_eq!(handle_key(key(KeyCode::Esc), &state), Some(Action::SearchCancel));
    }

    #[test]
    fn duel_digits_select_cards() {
        let state = AppState {
            screen: Screen::Duel,
            ..Default::default()
        };
        assert_eq!(
            handle_key(key(KeyCode::Char('1')), &state),
            Some(Action::DuelSelect(0))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('9')), &state),
            Some(Action::DuelSelect(8))
        );
        assert_eq!(handle_key(key(KeyCode::Char('0')), &state), None);
        assert_eq!(handle_key(key(KeyCode::Enter), &state), Some(Action::DuelCompare));
    }

    #[test]
    fn empty_pokedex_offers_load_more() {
        let text = screen_text(&AppState::default());
        assert!(text.contains("POKEDEX"));
        assert!(text.contains("[m] Load more"));
    }

    #[test]
    fn idle_duel_prompts_for_a_deal() {
        let state = AppState {
            screen: Screen::Duel,
            ..Default::default()
        };
        assert!(screen_text(&state).contains("Press [s] to deal a new match."));
    }

    #[test]
    fn names_are_title_cased() {
        assert_eq!(format_name("swift-swim"), "Swift Swim");
        assert_eq!(shorten_stat("special-attack"), "SAT");
    }
}
