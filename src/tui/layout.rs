use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::PostRecord;
use crate::tui::app::{ActivePane, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(frame.area());

    if app.maximized {
        render_preview_pane(frame, app, rows[0], colors);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[0]);

        render_posts_pane(frame, app, columns[0], colors);
        render_preview_pane(frame, app, columns[1], colors);
    }
    render_status_bar(frame, app, rows[1], colors);
}

fn border_style(active: bool, colors: &ColorConfig) -> Style {
    if active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn render_posts_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Posts;

    let mut items: Vec<ListItem> = app
        .posts
        .iter()
        .map(|post| {
            let date = post
                .posted_at()
                .map(|d| d.format("%m/%d").to_string())
                .unwrap_or_else(|| "     ".to_string());
            let first_line = post.display_text().lines().next().unwrap_or("").to_string();

            ListItem::new(Line::from(vec![
                Span::styled(date, Style::default().fg(colors.timestamp)),
                Span::raw(" "),
                Span::raw(first_line),
            ]))
        })
        .collect();

    if !app.posts.is_empty() && !app.has_more() {
        items.push(ListItem::new("No more posts").style(
            Style::default()
                .fg(colors.inactive_border)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let title = format!(
        " Posts [{}/{}] ",
        (app.post_index + 1).min(app.posts.len()),
        app.total
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active, colors));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selection_bg)
                .fg(colors.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.post_list_state);
}

/// Author, timestamp, body, attachments, counters and links; a quoted post is nested with a bar.
pub fn post_lines(post: &PostRecord, colors: &ColorConfig) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        post.display_author(),
        Style::default()
            .fg(colors.author)
            .add_modifier(Modifier::BOLD),
    ))];

    let when = post
        .posted_at()
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| post.created_at.clone());
    if !when.is_empty() {
        lines.push(Line::from(Span::styled(
            when,
            Style::default().fg(colors.timestamp),
        )));
    }
    lines.push(Line::from(""));

    for line in post.display_text().lines() {
        lines.push(Line::from(line.to_string()));
    }

    if !post.media.is_empty() || !post.urls.is_empty() {
        lines.push(Line::from(""));
    }
    let link_style = Style::default().fg(colors.link);
    for media in &post.media {
        lines.push(Line::from(vec![
            Span::raw(format!("[{}] ", media.kind)),
            Span::styled(media.best_url().to_string(), link_style),
        ]));
    }
    for link in post.urls.iter().filter(|l| !l.expanded_url.is_empty()) {
        lines.push(Line::from(vec![
            Span::raw("[link] "),
            Span::styled(link.expanded_url.clone(), link_style),
        ]));
    }

    if let Some(quoted) = &post.quoted_tweet {
        lines.push(Line::from(""));
        let bar = Span::styled("│ ", Style::default().fg(colors.quote_border));
        for line in post_lines(quoted, colors) {
            let mut spans = vec![bar.clone()];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{} likes  {} replies  {} reposts  {} quotes  {} bookmarks  {} views",
            post.favorite_count,
            post.reply_count,
            post.retweet_count,
            post.quote_count,
            post.bookmark_count,
            post.views
        ),
        Style::default().fg(colors.counters),
    )));
    lines.push(Line::from(Span::styled(
        post.view_url.clone(),
        Style::default().fg(colors.link),
    )));
    lines
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Preview;

    let (title, content) = match app.selected_post() {
        Some(post) => (
            format!(" {} ", post.user.at_handle()),
            Text::from(post_lines(post, colors)),
        ),
        None => (" Preview ".to_string(), Text::from("No posts archived")),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active, colors));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.maximized {
        "j/k:Scroll  n/p:Page  m:Exit maximize  q:Quit".to_string()
    } else {
        "j/k:Nav  n/p:Page  g/G:Top/Bottom  Tab:Pane  o:Open  l:Like  r:Reply  m:Max  q:Quit"
            .to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, Link, Media};
    use ratatui::{backend::TestBackend, Terminal};

    fn post(id: &str, text: &str) -> PostRecord {
        PostRecord {
            id: id.into(),
            text: text.into(),
            created_at: "Wed Oct 10 20:19:24 +0000 2018".into(),
            favorite_count: 7,
            view_url: PostRecord::view_url("jane", id),
            user: Author {
                name: "Jane".into(),
                screen_name: "jane".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_post_lines_decode_text_and_nest_quote() {
        let mut outer = post("1", "fish &amp; chips");
        outer.quoted_tweet = Some(Box::new(post("2", "quoted body")));

        let lines = plain(&post_lines(&outer, &ColorConfig::default()));

        assert_eq!(lines[0], "Jane @jane");
        assert_eq!(lines[1], "2018-10-10 20:19");
        assert!(lines.contains(&"fish & chips".to_string()));
        assert!(lines.contains(&"│ quoted body".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("7 likes")));
        assert_eq!(lines.last().unwrap(), "https://x.com/jane/status/1");
    }

    #[test]
    fn test_post_lines_list_media_and_links() {
        let mut p = post("3", "look https://t.co/a https://t.co/m");
        p.urls = vec![Link {
            url: "https://t.co/a".into(),
            expanded_url: "https://example.com/a".into(),
            display_url: "example.com/a".into(),
        }];
        p.media = vec![Media {
            kind: "video".into(),
            url: "https://t.co/m".into(),
            media_url_https: "https://pbs.twimg.com/thumb.jpg".into(),
            expanded_url: String::new(),
            video_url: Some("https://video.twimg.com/hi.mp4".into()),
        }];

        let lines = plain(&post_lines(&p, &ColorConfig::default()));

        assert!(lines.contains(&"look https://example.com/a".to_string()));
        assert!(lines.contains(&"[video] https://video.twimg.com/hi.mp4".to_string()));
        assert!(lines.contains(&"[link] https://example.com/a".to_string()));
        assert_eq!(lines.last().unwrap(), "https://x.com/jane/status/3");
    }

    #[test]
    fn test_post_lines_without_entities_has_no_attachment_lines() {
        let lines = plain(&post_lines(&post("4", "plain"), &ColorConfig::default()));
        assert!(!lines.iter().any(|l| l.starts_with('[')));
    }

    #[test]
    fn test_render_shows_end_of_feed() {
        let mut app = TuiApp::new();
        app.posts = vec![post("1", "only post")];
        app.total = 1;

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| render(frame, &mut app, &ColorConfig::default()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("No more posts"));
        assert!(screen.contains("only post"));
    }
}
