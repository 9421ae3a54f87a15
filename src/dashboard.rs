//! Dashboard sessions and their refresh loops.
//!
//! Every session is served by one task that exclusively owns its [`Dashboard`].
//! Handlers talk to it through a command channel and read whatever it last
//! published on a watch channel, so the history of a session has a single writer
//! and each published view reflects exactly one completed tick.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::currency_service::RateFetcher;
use crate::models::{
    ActiveView, ChartView, CurrencyCatalog, DashboardView, HistoryPoint, HistoryStore, Panel,
    TimeRange,
};
use crate::render;
use crate::{AppError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Navigate(ActiveView),
    SelectChart {
        currency: Option<String>,
        range: TimeRange,
    },
}

/// State of one dashboard session
pub struct Dashboard {
    fetcher: Arc<dyn RateFetcher>,
    catalog: Arc<CurrencyCatalog>,
    base: String,
    active: ActiveView,
    selected: Option<String>,
    range: TimeRange,
    history: HistoryStore,
    rng: StdRng,
    tick: u64,
}

impl Dashboard {
    pub fn new(
        fetcher: Arc<dyn RateFetcher>,
        catalog: Arc<CurrencyCatalog>,
        base: impl Into<String>,
        history: HistoryStore,
        rng: StdRng,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            base: base.into(),
            active: ActiveView::default(),
            selected: None,
            range: TimeRange::default(),
            history,
            rng,
            tick: 0,
        }
    }
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
    pub fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Navigate(view) => self.active = view,
            SessionCommand::SelectChart { currency, range } => {
                self.selected = currency
                    .map(|c| c.trim().to_uppercase())
                    .filter(|c| !c.is_empty());
                self.range = range;
            }
        }
    }
    /// The home view, which needs no network call
    pub fn initial_view(&self) -> DashboardView {
        self.publishable(Panel::Home(render::render_clock(
            Utc::now(),
            &render::WORLD_CLOCK_ZONES,
        )))
    }
    /// Runs one refresh cycle for the active view
    pub async fn tick(&mut self) -> DashboardView {
        self.tick += 1;
        let panel = match self.active {
            ActiveView::Home => Panel::Home(render::render_clock(
                Utc::now(),
                &render::WORLD_CLOCK_ZONES,
            )),
            ActiveView::LiveExchange => Panel::LiveExchange(self.refresh_rate_list().await),
            ActiveView::MonthlyRates => Panel::MonthlyRates(self.refresh_chart().await),
        };
        self.publishable(panel)
    }

    async fn refresh_rate_list(&mut self) -> crate::models::RateListView {
        let result = self
            .fetcher
            .fetch(&self.base)
            .await
            .map(|snapshot| snapshot.perturbed(&mut self.rng));
        if let Err(e) = &result {
            tracing::warn!("Tick {} could not refresh the rate list: {e}", self.tick);
        }
        render::render_rate_list(&result, &self.catalog)
    }

    async fn refresh_chart(&mut self) -> ChartView {
        let Some(currency) = self.selected.clone() else {
            return ChartView::placeholder(render::NO_SELECTION_TITLE);
        };
        let snapshot = match self.fetcher.fetch(&self.base).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Tick {} could not refresh the {currency} chart: {e}", self.tick);
                return render::render_chart_error(&e);
            }
        };
        let perturbed = snapshot.perturbed(&mut self.rng);
        let Some(rate) = perturbed.rate(&currency) else {
            return render::render_rate_unavailable(&currency);
        };
        let now = Utc::now();
        self.history.append(
            &currency,
            HistoryPoint {
                timestamp: now,
                rate,
            },
        );
        render::render_chart(
            &currency,
            &snapshot.base,
            self.history.series(&currency),
            &self.catalog,
            self.range,
            now,
        )
    }

    fn publishable(&self, panel: Panel) -> DashboardView {
        DashboardView {
            tick: self.tick,
            rendered_at: Utc::now(),
            selected_currency: self.selected.clone(),
            range_days: self.range.days(),
            panel,
        }
    }
}

/// Ticks `dashboard` every `period` until the command channel closes or nobody
/// listens to the published views any more.
pub async fn run(
    mut dashboard: Dashboard,
    mut commands: UnboundedReceiver<SessionCommand>,
    publisher: watch::Sender<Arc<DashboardView>>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let view = dashboard.tick().await;
                if publisher.send(Arc::new(view)).is_err() {
                    break;
                }
            }
            command = commands.recv() => match command {
                Some(command) => {
                    tracing::debug!("Applying {command:?}");
                    dashboard.apply(command);
                    interval.reset_immediately();
                }
                None => break,
            }
        }
    }
    tracing::debug!("Refresh loop stopped");
}

/// Client-side end of a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    commands: UnboundedSender<SessionCommand>,
    views: watch::Receiver<Arc<DashboardView>>,
    last_seen: Arc<Mutex<Instant>>,
}

impl SessionHandle {
    pub fn latest(&self) -> Arc<DashboardView> {
        self.touch();
        self.views.borrow().clone()
    }
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.touch();
        self.commands
            .send(command)
            .map_err(|_| AppError::SessionNotFound(self.id))
    }
    /// Waits for the next view published after this call
    #[cfg(test)]
    pub async fn next_view(&mut self) -> Result<Arc<DashboardView>> {
        self.views.borrow_and_update();
        self.views
            .changed()
            .await
            .map_err(|_| AppError::SessionNotFound(self.id))?;
        Ok(self.views.borrow_and_update().clone())
    }
    fn touch(&self) {
        if let Ok(mut last_seen) = self.last_seen.lock() {
            *last_seen = Instant::now();
        }
    }
    fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .map(|last_seen| last_seen.elapsed())
            .unwrap_or_default()
    }
}

/// All live sessions of the process
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    config: Arc<Config>,
    catalog: Arc<CurrencyCatalog>,
    fetcher: Arc<dyn RateFetcher>,
}

impl SessionRegistry {
    pub fn new(
        config: Arc<Config>,
        catalog: Arc<CurrencyCatalog>,
        fetcher: Arc<dyn RateFetcher>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
            catalog,
            fetcher,
        }
    }

    /// Starts a new session and its refresh loop
    #[instrument(name = "creating session", skip(self))]
    pub fn create(&self) -> Result<SessionHandle> {
        let id = Uuid::new_v4();
        let dashboard = Dashboard::new(
            self.fetcher.clone(),
            self.catalog.clone(),
            self.config.base_currency.clone(),
            HistoryStore::new(self.config.history_limit),
            StdRng::from_entropy(),
        );
        let (publisher, views) = watch::channel(Arc::new(dashboard.initial_view()));
        let (commands, rx) = unbounded_channel();
        let handle = SessionHandle {
            id,
            commands,
            views,
            last_seen: Arc::new(Mutex::new(Instant::now())),
        };
        self.sessions
            .write()
            .map_err(|_| AppError::Custom("session registry is poisoned".to_string()))?
            .insert(id, handle.clone());
        let period = self.config.refresh_period;
        tokio::spawn(async move {
            run(dashboard, rx, publisher, period).await;
            tracing::info!("Session {id} finished");
        });
        tracing::info!("Session {id} started");
        Ok(handle)
    }

    pub fn get(&self, id: Uuid) -> Result<SessionHandle> {
        self.sessions
            .read()
            .map_err(|_| AppError::Custom("session registry is poisoned".to_string()))?
            .get(&id)
            .cloned()
            .ok_or(AppError::SessionNotFound(id))
    }

    /// Dropping the registry's handle stops the loop once no handler holds a clone
    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.sessions
            .write()
            .map_err(|_| AppError::Custom("session registry is poisoned".to_string()))?
            .remove(&id)
            .map(|_| tracing::info!("Session {id} closed"))
            .ok_or(AppError::SessionNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops sessions idle for longer than `max_idle`, returning how many went
    pub fn reap_idle(&self, max_idle: Duration) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let before = sessions.len();
        sessions.retain(|id, handle| {
            let keep = handle.idle_for() <= max_idle;
            if !keep {
                tracing::info!("Session {id} idle, dropping it");
            }
            keep
        });
        before - sessions.len()
    }

    /// Periodically reaps idle sessions, forever
    pub async fn run_reaper(self) {
        let max_idle = self.config.session_idle_timeout;
        let mut interval = tokio::time::interval(max_idle.min(Duration::from_secs(30)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let reaped = self.reap_idle(max_idle);
            if reaped > 0 {
                tracing::info!("Reaped {reaped} idle sessions, {} left", self.len());
            }
        }
    }
}
