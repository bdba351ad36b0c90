use std::sync::Arc;

use chrono::{Local, NaiveDate};
use kerbside_core::{
    model::AreaId,
    poller::{PollState, Poller},
    service::KerbsideService,
    view::CollectionView,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    AreaEntry,
    ScheduleView,
}

pub(crate) struct App {
    pub service: Arc<KerbsideService>,

    pub screen: Screen,
    pub area_input: String,

    pub poller: Option<Arc<Poller>>,
    pub poll_task: Option<JoinHandle<()>>,
    pub updates: Option<watch::Receiver<PollState>>,
    pub state: PollState,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<KerbsideService>) -> Self {
        Self {
            service,
            screen: Screen::AreaEntry,
            area_input: String::new(),
            poller: None,
            poll_task: None,
            updates: None,
            state: PollState::default(),
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub(crate) fn area(&self) -> Option<&AreaId> {
        self.poller.as_deref().map(Poller::area)
    }

    /// One entry per category; `None` where no pickup is known.
    pub(crate) fn views(&self, today: NaiveDate) -> Vec<(&'static str, Option<CollectionView>)> {
        let (Some(area), Some(published)) = (self.area(), self.state.latest.as_ref()) else {
            return Vec::new();
        };

        published
            .result
            .iter()
            .map(|(category, record)| {
                let view = record.map(|record| CollectionView::new(record, area, today));
                (category.display_name(), view)
            })
            .collect()
    }

    /// Attach a running poller. `updates` must be subscribed before `task`
    /// was spawned so that the first publication is not missed.
    pub(crate) fn start_polling(
        &mut self,
        poller: Arc<Poller>,
        updates: watch::Receiver<PollState>,
        task: JoinHandle<()>,
    ) {
        self.stop_polling();
        self.state = poller.snapshot();
        self.poller = Some(poller);
        self.updates = Some(updates);
        self.poll_task = Some(task);
        self.screen = Screen::ScheduleView;
    }

    /// Copy the poller's state if it changed since the last call.
    pub(crate) fn sync_state(&mut self) -> bool {
        let Some(updates) = self.updates.as_mut() else {
            return false;
        };
        if !updates.has_changed().unwrap_or(false) {
            return false;
        }
        self.state = updates.borrow_and_update().clone();
        true
    }

    pub(crate) fn stop_polling(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        self.poller = None;
        self.updates = None;
        self.state = PollState::default();
    }
}
