use ratatui::widgets::ListState;

use crate::paging::RequestState;
use crate::source::NewsItem;

pub struct App {
    /// Snapshot of the paged list, newest first.
    pub items: Vec<NewsItem>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    /// Latest zero-items / end-of-list request state.
    pub network: Option<RequestState>,
    /// Latest refresh state.
    pub refresh: Option<RequestState>,
}

impl App {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            network: None,
            refresh: None,
        }
    }

    /// Replace the items with a fresh snapshot, keeping the selection in
    /// range.
    pub fn set_items(&mut self, items: Vec<NewsItem>) {
        self.items = items;
        match self.list_state.selected() {
            Some(_) if self.items.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.items.len() => self.list_state.select(Some(self.items.len() - 1)),
            _ => {}
        }
    }

    pub fn set_network_state(&mut self, state: RequestState) {
        self.status = match &state {
            RequestState::Running => "Loading more news…".to_string(),
            RequestState::Success => format!("Loaded {} items", self.items.len()),
            RequestState::Failed(msg) => format!("Ooops {msg}  (R: retry)"),
        };
        if state == RequestState::Success {
            clear_failure(&mut self.refresh);
        }
        self.network = Some(state);
    }

    pub fn set_refresh_state(&mut self, state: RequestState) {
        self.status = match &state {
            RequestState::Running => "Refreshing…".to_string(),
            RequestState::Success => "Feed updated".to_string(),
            RequestState::Failed(msg) => format!("Ooops {msg}  (R: retry)"),
        };
        if state == RequestState::Success {
            clear_failure(&mut self.network);
        }
        self.refresh = Some(state);
    }

    /// A failure stays up until either channel next succeeds.
    pub fn has_failure(&self) -> bool {
        matches!(self.network, Some(RequestState::Failed(_)))
            || matches!(self.refresh, Some(RequestState::Failed(_)))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.network, Some(RequestState::Running))
            || matches!(self.refresh, Some(RequestState::Running))
    }

    /// True when the selection sits on the last item, or there is nothing
    /// to select; the paged list should grow.
    pub fn at_end(&self) -> bool {
        match self.list_state.selected() {
            Some(i) => i + 1 >= self.items.len(),
            None => self.items.is_empty(),
        }
    }

    pub fn selected_item(&self) -> Option<&NewsItem> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }

    /// Show the selected article's link in the status bar.
    pub fn open_selected(&mut self) {
        let message = match self.selected_item() {
            Some(item) => match &item.url {
                Some(url) => url.clone(),
                None => "This article has no link".to_string(),
            },
            None => return,
        };
        self.status = message;
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(self.items.len() - 1));
        }
    }
}

fn clear_failure(state: &mut Option<RequestState>) {
    if matches!(state, Some(RequestState::Failed(_))) {
        *state = None;
    }
}
