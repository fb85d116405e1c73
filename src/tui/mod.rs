pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{AppContext, Result};
use crate::domain::PostRecord;

use self::app::TuiApp;
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn run(ctx: &AppContext) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(terminal: &mut Tui, ctx: &AppContext) -> Result<()> {
    let colors = &ctx.config.colors;
    let keybindings = ctx.config.keybindings.resolve();
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));

    tui_app.load_more(ctx.store.as_ref())?;

    loop {
        terminal.draw(|frame| layout::render(frame, &mut tui_app, colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                tui_app.clear_status();
                match keybindings.get_action(&key) {
                    Action::Quit => tui_app.should_quit = true,
                    Action::MoveUp => tui_app.move_up(),
                    Action::MoveDown => tui_app.move_down(),
                    Action::NextPage => tui_app.next_page(),
                    Action::PrevPage => tui_app.prev_page(),
                    Action::JumpTop => tui_app.jump_top(),
                    Action::JumpBottom => tui_app.jump_bottom(),
                    Action::NextPane => tui_app.active_pane = tui_app.active_pane.next(),
                    Action::PrevPane => tui_app.active_pane = tui_app.active_pane.prev(),
                    Action::ToggleMaximize => tui_app.toggle_maximize(),
                    Action::OpenPost => open_link(&mut tui_app, |p| p.view_url.clone()),
                    Action::OpenLike => open_link(&mut tui_app, |p| p.like_url.clone()),
                    Action::OpenReply => open_link(&mut tui_app, |p| p.reply_url.clone()),
                    Action::None => {}
                }

                if tui_app.needs_more() {
                    let added = tui_app.load_more(ctx.store.as_ref())?;
                    if !tui_app.has_more() {
                        tui_app.set_status(format!(
                            "Loaded {} more, no more posts ({} total)",
                            added, tui_app.total
                        ));
                    }
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn open_link(tui_app: &mut TuiApp, link: impl Fn(&PostRecord) -> String) {
    let Some(url) = tui_app.selected_post().map(link) else {
        return;
    };
    match open::that(&url) {
        Ok(()) => tui_app.set_status(format!("Opened {}", url)),
        Err(e) => tui_app.set_status(format!("Failed to open browser: {}", e)),
    }
}
