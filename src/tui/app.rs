use ratatui::widgets::ListState;

use crate::app::Result;
use crate::domain::PostRecord;
use crate::store::PostStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Posts,
    Preview,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Posts => ActivePane::Preview,
            ActivePane::Preview => ActivePane::Posts,
        }
    }

    pub fn prev(self) -> Self {
        // Two panes: cycling either way lands on the other one.
        self.next()
    }
}

/// Posts fetched from the store per load.
pub const PAGE_SIZE: usize = 20;
/// Rows skipped by page up/down.
pub const PAGE_JUMP: usize = 10;

pub struct TuiApp {
    pub active_pane: ActivePane,
    pub posts: Vec<PostRecord>,
    /// Posts in the archive; loading stops once `posts` holds them all.
    pub total: usize,
    pub loaded_pages: usize,
    pub post_index: usize,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub maximized: bool,
    pub post_list_state: ListState,
}

impl TuiApp {
    pub fn new() -> Self {
        let mut post_list_state = ListState::default();
        post_list_state.select(Some(0));

        Self {
            active_pane: ActivePane::Posts,
            posts: Vec::new(),
            total: 0,
            loaded_pages: 0,
            post_index: 0,
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            maximized: false,
            post_list_state,
        }
    }

    pub fn selected_post(&self) -> Option<&PostRecord> {
        self.posts.get(self.post_index)
    }

    pub fn has_more(&self) -> bool {
        self.posts.len() < self.total
    }

    /// The selection sits on the last loaded post and the archive holds more.
    pub fn needs_more(&self) -> bool {
        self.has_more() && self.post_index + 1 >= self.posts.len()
    }

    /// Append the next page from `store`. Returns how many posts were added.
    pub fn load_more(&mut self, store: &dyn PostStore) -> Result<usize> {
        if self.loaded_pages == 0 {
            self.total = store.count_posts()?;
        }
        if self.loaded_pages > 0 && !self.has_more() {
            return Ok(0);
        }

        let page = store.get_posts(self.loaded_pages + 1, PAGE_SIZE)?;
        let added = page.len();
        self.posts.extend(page);
        self.loaded_pages += 1;

        // The archive shrank underneath us; stop paging.
        if added < PAGE_SIZE {
            self.total = self.posts.len();
        }
        tracing::debug!(added, loaded = self.posts.len(), total = self.total, "Loaded posts");
        Ok(added)
    }

    fn select(&mut self, index: usize) {
        if index != self.post_index {
            self.post_index = index;
            self.post_list_state.select(Some(index));
            self.preview_scroll = 0;
        }
    }

    fn last_index(&self) -> usize {
        self.posts.len().saturating_sub(1)
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Posts => self.select(self.post_index.saturating_sub(1)),
            ActivePane::Preview => self.preview_scroll = self.preview_scroll.saturating_sub(1),
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Posts => self.select((self.post_index + 1).min(self.last_index())),
            ActivePane::Preview => self.preview_scroll = self.preview_scroll.saturating_add(1),
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::Posts => self.select((self.post_index + PAGE_JUMP).min(self.last_index())),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(PAGE_JUMP as u16)
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::Posts => self.select(self.post_index.saturating_sub(PAGE_JUMP)),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PAGE_JUMP as u16)
            }
        }
    }

    pub fn jump_top(&mut self) {
        match self.active_pane {
            ActivePane::Posts => self.select(0),
            ActivePane::Preview => self.preview_scroll = 0,
        }
    }

    /// Last loaded post; further pages arrive as the selection reaches the end.
    pub fn jump_bottom(&mut self) {
        if self.active_pane == ActivePane::Posts {
            self.select(self.last_index());
        }
    }

    pub fn toggle_maximize(&mut self) {
        self.maximized = !self.maximized;
        if self.maximized {
            self.active_pane = ActivePane::Preview;
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}
