//! Main Application
//!
//! The App struct manages the room's TUI lifecycle:
//! - Event loop (keyboard, resize, overlay snapshots, session bootstrap)
//! - Overlay provider for doctor sessions (treatment panel, leave dialog)
//! - Rendering through the layered compositor
//!
//! # Input routing
//!
//! Keys go to the frontmost open overlay; with nothing open they drive the
//! room itself. `Ctrl-C` always quits.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use ratatui::{Frame, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

use room_core::{
    submit_treatment, ApiClient, BootstrapOutcome, CurrentUser, OverlayKey, RoomConfig, RoomRoute,
};

use crate::compositor::Compositor;
use crate::overlays::{
    RoomOverlays, RoomSnapshot, RoomStack, SlideIn, LEAVE_KEY, TREATMENT_KEY,
};
use crate::screens::{Field, LeaveDialog, RoomScreen, SessionStatus, TreatmentForm};

/// Frame interval while a transition is running
const FRAME: Duration = Duration::from_millis(16);

/// Session collaborators handed to the app
///
/// Everything is optional so the app can run without a network.
#[derive(Default)]
pub struct RoomSession {
    /// Resolved user, published by the bootstrap
    pub user_rx: Option<watch::Receiver<Option<CurrentUser>>>,
    /// Running bootstrap task
    pub bootstrap: Option<JoinHandle<BootstrapOutcome>>,
    /// Client for saving treatments
    pub client: Option<ApiClient>,
}

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Room being shown
    route: RoomRoute,
    /// Treatment POST path
    treatment_path: String,
    /// Z-index of the lowest overlay
    overlay_base_z: i32,

    // === Overlays (doctor only) ===
    overlays: Option<RoomOverlays>,
    snapshot_rx: Option<watch::Receiver<RoomSnapshot>>,
    treatment: TreatmentForm,
    slide: SlideIn,

    // === Session ===
    session: SessionStatus,
    user: Option<CurrentUser>,
    user_rx: Option<watch::Receiver<Option<CurrentUser>>>,
    bootstrap: Option<JoinHandle<BootstrapOutcome>>,
    client: Option<ApiClient>,
    submit_tx: mpsc::UnboundedSender<Result<(), String>>,
    submit_rx: mpsc::UnboundedReceiver<Result<(), String>>,

    // === UI Components ===
    /// The layered compositor
    compositor: Compositor,
}

impl App {
    /// Create the app for a room
    ///
    /// Doctor routes mount the overlay provider and register the treatment
    /// panel and the leave dialog (in that order, so the dialog stacks on
    /// top). Student routes get no overlays.
    pub fn new(route: RoomRoute, config: &RoomConfig, session: RoomSession) -> Self {
        let treatment = TreatmentForm::new(route.room_name.clone());

        let overlays = route.has_overlays().then(|| {
            let overlays = RoomOverlays::new();
            overlays.batch(|batch| {
                batch.register(TREATMENT_KEY, treatment.panel());
                batch.register(LEAVE_KEY, Arc::new(LeaveDialog));
            });
            tracing::info!(room = %route.room_name, "Overlay provider mounted");
            overlays
        });
        let snapshot_rx = overlays.as_ref().map(RoomOverlays::subscribe);
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            route,
            treatment_path: config.treatment_path.clone(),
            overlay_base_z: config.overlay_base_z,
            overlays,
            snapshot_rx,
            treatment,
            slide: SlideIn::new(config.enter_transition),
            session: SessionStatus::Resolving,
            user: None,
            user_rx: session.user_rx,
            bootstrap: session.bootstrap,
            client: session.client,
            submit_tx,
            submit_rx,
            compositor: Compositor::new(Rect::default()),
        }
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            let animating = self.slide.is_animating(Instant::now());

            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => self.running = false,
                },

                alive = watch_changed(&mut self.snapshot_rx) => {
                    if !alive {
                        self.snapshot_rx = None;
                    }
                }

                alive = watch_changed(&mut self.user_rx) => {
                    self.sync_user();
                    if !alive {
                        self.user_rx = None;
                    }
                }

                joined = join(&mut self.bootstrap) => {
                    self.bootstrap = None;
                    self.on_bootstrap(joined);
                }

                Some(result) = self.submit_rx.recv() => self.on_submit_result(result),

                // Frame tick while an overlay slides in
                () = tokio::time::sleep(FRAME), if animating => {}
            }

            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        match self.top_overlay().as_ref().map(OverlayKey::as_str) {
            Some(LEAVE_KEY) => match key.code {
                KeyCode::Char('y' | 'Y') => self.leave(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.close(LEAVE_KEY),
                _ => {}
            },
            Some(TREATMENT_KEY) => self.handle_treatment_key(key),
            _ => match key.code {
                KeyCode::Char('t' | 'T') => self.toggle(TREATMENT_KEY),
                KeyCode::Char('q' | 'Q') => {
                    if self.overlays.is_some() {
                        self.open(LEAVE_KEY);
                    } else {
                        self.leave();
                    }
                }
                _ => {}
            },
        }
    }

    fn handle_treatment_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.close(TREATMENT_KEY),
            KeyCode::Char('t') if ctrl => self.close(TREATMENT_KEY),
            KeyCode::Char('q') if ctrl => self.open(LEAVE_KEY),
            KeyCode::Tab => {
                self.treatment.next_field();
                self.refresh_treatment();
            }
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.treatment.newline();
                self.refresh_treatment();
            }
            KeyCode::Enter => self.submit_treatment(),
            KeyCode::Backspace => {
                self.treatment.backspace();
                self.refresh_treatment();
            }
            KeyCode::Left | KeyCode::Right => {
                if self.treatment.focus() == Field::Level {
                    self.treatment.cycle_level();
                    self.refresh_treatment();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                self.treatment.input(c);
                self.refresh_treatment();
            }
            _ => {}
        }
    }

    /// Validate the treatment and save it in the background
    fn submit_treatment(&mut self) {
        let Some(record) = self.treatment.begin_submit() else {
            self.refresh_treatment();
            return;
        };
        self.refresh_treatment();

        let Some(client) = self.client.clone() else {
            self.on_submit_result(Err("offline: no API client".to_string()));
            return;
        };
        let path = self.treatment_path.clone();
        let tx = self.submit_tx.clone();
        tokio::spawn(async move {
            let result = submit_treatment(&client, &path, &record)
                .await
                .map_err(|e| e.to_string());
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Treatment not saved");
            }
            let _ = tx.send(result);
        });
    }

    fn on_submit_result(&mut self, result: Result<(), String>) {
        self.treatment.finish_submit(result);
        self.refresh_treatment();
    }

    fn on_bootstrap(&mut self, joined: Result<BootstrapOutcome, JoinError>) {
        self.session = match joined {
            Ok(outcome) => {
                if let Some(url) = &outcome.redirect_to {
                    tracing::info!(redirect_to = %url, "Web app sign-in needed");
                }
                if self.user.is_none() {
                    self.user.clone_from(&outcome.user);
                }
                SessionStatus::Resolved(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "Session bootstrap task failed");
                SessionStatus::Failed(e.to_string())
            }
        };
    }

    /// Keep the last published user (it outlives the bootstrap task)
    fn sync_user(&mut self) {
        if let Some(rx) = self.user_rx.as_mut() {
            if let Some(user) = rx.borrow_and_update().clone() {
                self.user = Some(user);
            }
        }
    }

    /// Register the current form under the treatment key (payload update)
    fn refresh_treatment(&self) {
        if let Some(overlays) = &self.overlays {
            overlays.register(TREATMENT_KEY, self.treatment.panel());
        }
    }

    fn open(&self, key: &str) {
        if let Some(overlays) = &self.overlays {
            overlays.open(key);
        }
    }

    fn close(&self, key: &str) {
        if let Some(overlays) = &self.overlays {
            overlays.close(key);
        }
    }

    fn toggle(&self, key: &str) {
        if let Some(overlays) = &self.overlays {
            overlays.toggle(key);
        }
    }

    /// Confirmed leave: tear the overlays down and stop
    fn leave(&mut self) {
        tracing::info!(room = %self.route.room_name, "Leaving room");
        self.quit();
    }

    fn quit(&mut self) {
        if let Some(overlays) = &self.overlays {
            overlays.destroy_all();
        }
        self.running = false;
    }

    /// Frontmost open overlay
    fn top_overlay(&self) -> Option<OverlayKey> {
        let stack = self.stack()?;
        stack.top().map(|layer| layer.key.clone())
    }

    fn stack(&self) -> Option<RoomStack> {
        self.overlays
            .as_ref()
            .map(|o| RoomStack::from_snapshot(&o.snapshot(), self.overlay_base_z))
    }

    /// Draw the room and its overlays into a frame
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        if area != self.compositor.area() {
            self.compositor.resize(area);
        }
        let now = Instant::now();

        self.sync_user();
        let stack = self.stack();
        let treatment_open = stack
            .as_ref()
            .map(|s| s.layers().iter().any(|l| l.key.as_str() == TREATMENT_KEY));

        let content = self.compositor.content_mut();
        let content_area = content.area;
        RoomScreen {
            route: &self.route,
            user: self.user.as_ref(),
            session: &self.session,
            treatment_open,
        }
        .render(content_area, content);

        if let Some(stack) = &stack {
            self.slide.sync(stack, now);
            let slide = &self.slide;
            self.compositor
                .sync_overlays(stack, |key| slide.offset(key, area.width, now));
        }

        let output = self.compositor.composite();
        let buf = frame.buffer_mut();
        for y in 0..area.height.min(output.area.height) {
            for x in 0..area.width.min(output.area.width) {
                let idx = output.index_of(x, y);
                if let Some(cell) = output.content.get(idx) {
                    buf[(x, y)] = cell.clone();
                }
            }
        }
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Overlay controller, when the session has overlays
    pub fn overlays(&self) -> Option<&RoomOverlays> {
        self.overlays.as_ref()
    }

    /// Treatment form state
    pub fn treatment(&self) -> &TreatmentForm {
        &self.treatment
    }

    /// Signed-in user, once published
    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Session bootstrap status
    pub fn session(&self) -> &SessionStatus {
        &self.session
    }

    /// Route being shown
    pub fn route(&self) -> &RoomRoute {
        &self.route
    }

    /// Wait for the bootstrap task and record its outcome
    ///
    /// The event loop does this on its own; headless callers use it directly.
    pub async fn await_bootstrap(&mut self) {
        if self.bootstrap.is_some() {
            let joined = join(&mut self.bootstrap).await;
            self.bootstrap = None;
            self.on_bootstrap(joined);
        }
    }

    /// Apply the next treatment save result
    ///
    /// The event loop does this on its own; headless callers use it directly.
    pub async fn await_submit(&mut self) {
        if let Some(result) = self.submit_rx.recv().await {
            self.on_submit_result(result);
        }
    }
}

/// Wait for a watch change; pends forever without a receiver
///
/// Returns `false` once the sender is gone.
async fn watch_changed<T>(rx: &mut Option<watch::Receiver<T>>) -> bool {
    match rx {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

/// Wait for a task; pends forever without one
async fn join<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
