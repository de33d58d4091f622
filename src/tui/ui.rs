use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::{App, UiMode};
use super::theme::Theme;
use crate::clipboard::ClipMode;
use crate::dispatcher::CommandSink;
use crate::listing::{Entry, EntryKind};
use crate::pagination::PageLink;
use crate::pane::{FileDetail, PaneController, PaneId, PaneState};

const LOG_LINES: u16 = 4;

pub fn draw<S: CommandSink>(f: &mut Frame, app: &App<S>) {
    let background = Block::default().style(Style::default().bg(Theme::BG));
    f.render_widget(background, f.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(LOG_LINES + 1),
            Constraint::Length(2),
        ])
        .split(f.size());

    draw_header(f, chunks[0], app);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    for (id, area) in [(PaneId::Local, cols[0]), (PaneId::Remote, cols[1])] {
        draw_pane(f, area, app.ws.pane(id), app.focus == id, app.cursor(id));
    }

    let lines: Vec<Line> = app
        .ws
        .log()
        .tail(LOG_LINES as usize)
        .map(|l| Line::from(Span::styled(l.to_string(), Theme::log_line(l))))
        .collect();
    let logp = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Theme::muted())
            .title(Span::styled(" Log ", Theme::muted()))
            .style(Style::default().bg(Theme::BG)),
    );
    f.render_widget(logp, chunks[2]);

    let keys = match &app.ui_mode {
        UiMode::Input(_) => " Type value • [Enter] submit • [Esc] cancel",
        UiMode::ConfirmDelete => " Delete selection? [y]es • any other key cancels",
        UiMode::Preview { .. } => " [↑/↓] scroll • [Esc] close",
        UiMode::Help | UiMode::Detail(_) => " [Esc] close",
        UiMode::Normal => {
            " [Tab]pane [Space]mark [Enter]open [Bksp]up [~]home [r]efresh [ ]page [n]ew [F2]rename [d]el [x]cut [c]opy [v]paste [t]ransfer [u]pdate [p]review [h]elp [q]uit"
        }
    };
    let status = Paragraph::new(Line::from(Span::styled(keys, Theme::muted()))).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Theme::muted())
            .style(Style::default().bg(Theme::BG)),
    );
    f.render_widget(status, chunks[3]);

    match &app.ui_mode {
        UiMode::Normal => {}
        UiMode::Help => draw_help(f),
        UiMode::Input(prompt) => {
            let area = centered_rect(50, 20, f.size());
            f.render_widget(Clear, area);
            let p = Paragraph::new(format!("{}▏", app.input)).block(popup(prompt.label(), Theme::PINK));
            f.render_widget(p, area);
        }
        UiMode::ConfirmDelete => {
            let area = centered_rect(40, 20, f.size());
            f.render_widget(Clear, area);
            let counts = app.ws.pane(app.focus).selection().counts();
            let text = format!(
                "Delete {} director{} and {} file{} on {}?",
                counts.dirs,
                if counts.dirs == 1 { "y" } else { "ies" },
                counts.files,
                if counts.files == 1 { "" } else { "s" },
                app.focus
            );
            let p = Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(popup("Confirm", Theme::RED));
            f.render_widget(p, area);
        }
        UiMode::Detail(detail) => {
            let area = centered_rect(50, 40, f.size());
            f.render_widget(Clear, area);
            let p = Paragraph::new(detail_lines(detail)).block(popup("File detail", Theme::CYAN));
            f.render_widget(p, area);
        }
        UiMode::Preview { preview, scroll } => {
            let area = centered_rect(80, 80, f.size());
            f.render_widget(Clear, area);
            let title = format!("{} [{}]", preview.file_path, preview.language());
            let p = Paragraph::new(preview.rendered())
                .scroll((*scroll, 0))
                .block(popup(&title, Theme::PINK));
            f.render_widget(p, area);
        }
    }
}

fn popup(title: &str, color: ratatui::style::Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(Theme::BG).fg(Theme::FG))
}

fn draw_header<S: CommandSink>(f: &mut Frame, area: Rect, app: &App<S>) {
    let sets: Vec<String> = app
        .ws
        .clipboard()
        .entries()
        .map(|c| {
            format!(
                "{} {} item(s) from {} {}",
                match c.mode {
                    ClipMode::Cut => "cut",
                    ClipMode::Copy => "copied",
                },
                c.len(),
                c.source,
                c.source_path.join()
            )
        })
        .collect();
    let clip = if sets.is_empty() { "empty".to_string() } else { sets.join(" | ") };
    let line = Line::from(vec![
        Span::styled("LDFS ", Theme::heading()),
        Span::styled(app.host.clone(), Style::default().fg(Theme::PINK)),
        Span::raw("  "),
        Span::styled("Clipboard: ", Theme::heading()),
        Span::styled(clip, Style::default().fg(Theme::FG)),
    ]);
    let p = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::muted())
            .style(Style::default().bg(Theme::BG)),
    );
    f.render_widget(p, area);
}

fn pane_title<S: CommandSink>(pane: &PaneController<S>) -> String {
    let state = if pane.is_connection_lost() {
        " LOST CONNECTION".to_string()
    } else {
        match pane.state() {
            PaneState::Disconnected => " offline".to_string(),
            PaneState::Connecting => " connecting...".to_string(),
            PaneState::Browsing => String::new(),
            PaneState::AwaitingServerAck(op) => format!(" {:?}...", op).to_lowercase(),
        }
    };
    let paste = if pane.paste_enabled() { " [paste]" } else { "" };
    format!(" {}: {}{}{} ", pane.id(), pane.path().join(), paste, state)
}

/// Pagination links as one line: `< 1 [2] 3 >`.
pub fn page_line(links: &[PageLink]) -> String {
    links
        .iter()
        .map(|l| match *l {
            PageLink::Previous { enabled } => (if enabled { "<" } else { " " }).to_string(),
            PageLink::Next { enabled } => (if enabled { ">" } else { " " }).to_string(),
            PageLink::Page { number, active: true } => format!("[{}]", number),
            PageLink::Page { number, .. } => number.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn draw_pane<S: CommandSink>(f: &mut Frame, area: Rect, pane: &PaneController<S>, focused: bool, cursor: usize) {
    let inner_width = area.width.saturating_sub(4) as usize;
    let listing = pane.listing();
    let selection = pane.selection();

    let items: Vec<ListItem> = if pane.is_connection_lost() {
        vec![ListItem::new(Span::styled(
            "Lost connection, please restart the viewer!",
            Style::default().fg(Theme::RED).add_modifier(Modifier::BOLD),
        ))]
    } else if pane.state() == PaneState::Connecting {
        vec![ListItem::new(Span::styled("Loading...", Theme::muted()))]
    } else {
        let rows = listing
            .dirs()
            .iter()
            .enumerate()
            .map(|(i, e)| (EntryKind::Directory, i, e))
            .chain(listing.files().iter().enumerate().map(|(i, e)| (EntryKind::File, i, e)));
        rows.map(|(kind, i, e)| {
            let marked = selection.is_marked(kind, i);
            let style = if marked {
                Theme::marked()
            } else if kind == EntryKind::Directory {
                Theme::dir()
            } else {
                Theme::file()
            };
            ListItem::new(Span::styled(entry_row(e, marked, inner_width), style))
        })
        .collect()
    };

    let pagination = pane.pagination();
    let footer = format!(
        " {} • {} item(s) ",
        page_line(&pagination.links()),
        pagination.total()
    );

    let mut list_state = ListState::default();
    if !listing.is_empty() {
        list_state.select(Some(cursor));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border(focused))
                .title(Span::styled(pane_title(pane), Theme::border(focused)))
                .title(
                    Title::from(Span::styled(footer, Theme::muted()))
                        .position(Position::Bottom)
                        .alignment(Alignment::Right),
                )
                .style(Style::default().bg(Theme::BG)),
        )
        .highlight_style(if focused {
            Style::default().bg(Theme::PINK).fg(Theme::BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Theme::COMMENT).fg(Theme::FG)
        })
        .highlight_symbol(if focused { "▶ " } else { "  " });
    f.render_stateful_widget(list, area, &mut list_state);
}

fn entry_row(e: &Entry, marked: bool, width: usize) -> String {
    let mark = if marked { "[x] " } else { "[ ] " };
    let size = e.size.as_ref().map(|s| s.display()).unwrap_or_default();
    let meta = if e.is_dir() {
        "<DIR>".to_string()
    } else {
        format!("{:>6} {:>11}", e.file_type, size)
    };
    let name_width = width.saturating_sub(mark.len() + meta.width() + 1);
    format!("{}{} {}", mark, fit(&e.name, name_width), meta)
}

/// Truncate or pad `s` to exactly `width` terminal columns.
pub fn fit(s: &str, width: usize) -> String {
    if s.width() <= width {
        let pad = width - s.width();
        return format!("{}{}", s, " ".repeat(pad));
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('~');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn detail_lines(d: &FileDetail) -> Vec<Line<'static>> {
    let row = |k: &str, v: String| {
        Line::from(vec![
            Span::styled(format!("{:<16}", k), Theme::heading()),
            Span::raw(v),
        ])
    };
    let mut lines = vec![
        row("name", d.name.clone()),
        row("type", d.file_type.clone()),
        row("size", d.size.clone()),
        row("create at", d.created.clone()),
        row("update at", d.modified.clone()),
    ];
    if let Some(n) = d.current_replicas {
        lines.push(row("current replica", n.to_string()));
    }
    if let Some(n) = d.desired_replicas {
        lines.push(row("replica", n.to_string()));
    }
    lines
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);
    let section = |s: &'static str| Line::from(Span::styled(s, Theme::heading()));
    let lines = vec![
        section("Navigation:"),
        Line::from("  ↑/↓/k/j    Move cursor"),
        Line::from("  Tab        Switch pane"),
        Line::from("  Enter      Open directory / file detail"),
        Line::from("  Backspace  Parent directory"),
        Line::from("  ~          Home directory"),
        Line::from("  r / F5     Refresh"),
        Line::from("  [ / ]      Previous / next page"),
        Line::from("  g          Go to page"),
        Line::from(""),
        section("Selection:"),
        Line::from("  Space      Mark / unmark entry"),
        Line::from("  i          File detail"),
        Line::from(""),
        section("Operations:"),
        Line::from("  n          New directory"),
        Line::from("  F2         Rename"),
        Line::from("  d / Del    Delete"),
        Line::from("  x / c / v  Cut / copy (local) / paste"),
        Line::from("  t          Upload (local) or download (remote)"),
        Line::from("  u          Update replica factor (remote)"),
        Line::from("  p          Preview file (remote)"),
        Line::from(""),
        section("General:"),
        Line::from("  h / F1     Toggle this help"),
        Line::from("  q          Quit"),
    ];
    let help = Paragraph::new(lines).block(popup("Help", Theme::PINK));
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Pagination;

    #[test]
    fn fit_pads_and_truncates_by_columns() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc~");
        // wide glyphs take two columns
        assert_eq!(fit("日本語", 4).width(), 4);
        assert_eq!(fit("x", 0), "");
    }

    #[test]
    fn page_line_marks_current() {
        let links = Pagination::new(100, 5).rebuilt(2, 250).links();
        assert_eq!(page_line(&links), "< 1 [2] 3 >");
        let first = Pagination::new(100, 5).rebuilt(1, 0).links();
        assert_eq!(page_line(&first), "  [1]  ");
    }
}
