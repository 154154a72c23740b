//! Main TUI application state machine.
//!
//! Handles:
//! - Form editing and navigation
//! - Submission through a background request worker
//! - Service health probing

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::HttpPredictionClient;
use crate::application::{Begin, PredictionSession};
use crate::config::Config;
use crate::domain::{PredictionResponse, ValidationPolicy};
use crate::ports::{PredictError, PredictionService};

use super::ui::{
    form::{render_form, FormView},
    render_disclaimer, render_header, render_key_hints,
    result::render_result,
    HealthStatus,
};
use super::worker::{HealthProbe, RequestProgress, RequestWorker, RequestWorkerHandle, WorkerPoll};

const PROGRESS_FLOOR: f64 = 0.02;
const PROGRESS_CEILING: f64 = 0.95;
const PROGRESS_TAU_SECS: f64 = 2.5;

/// Main application state
pub struct App {
    service: Arc<dyn PredictionService>,

    session: PredictionSession,

    form_view: FormView,

    /// Base URL shown in the header
    api_url: String,

    health: HealthStatus,

    health_probe: Option<HealthProbe>,

    /// Request worker for the submission in flight
    pending_worker: Option<RequestWorkerHandle>,

    /// Animated gauge value while a request is in flight
    progress: f64,

    progress_started_at: Option<Instant>,

    should_quit: bool,
}

impl App {
    /// Create the application with the reqwest transport built from `config`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let client = HttpPredictionClient::new(config)?;
        Ok(Self::with_service(
            Arc::new(client),
            config.validation,
            config.api_url.clone(),
        ))
    }

    /// Create the application around any prediction service.
    pub fn with_service(
        service: Arc<dyn PredictionService>,
        policy: ValidationPolicy,
        api_url: String,
    ) -> Self {
        Self {
            service,
            session: PredictionSession::new(policy),
            form_view: FormView::default(),
            api_url,
            health: HealthStatus::Checking,
            health_probe: None,
            pending_worker: None,
            progress: 0.0,
            progress_started_at: None,
            should_quit: false,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        self.health_probe = Some(HealthProbe::spawn(Arc::clone(&self.service)));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_health();
            self.poll_worker();
            self.tick_progress();

            terminal.draw(|f| {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Min(0),
                        Constraint::Length(2),
                        Constraint::Length(4),
                    ])
                    .split(f.area());

                let body = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
                    .split(rows[1]);

                render_header(f, rows[0], &self.api_url, &self.health);
                render_form(f, body[0], self.session.form(), &self.form_view);
                render_result(f, body[1], self.session.state(), self.progress);
                render_key_hints(f, rows[2], self.session.form().is_submitting());
                render_disclaimer(f, rows[3]);
            })?;

            // Short poll keeps the gauge moving while a request is in flight.
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn poll_health(&mut self) {
        let Some(probe) = &self.health_probe else {
            return;
        };
        match probe.try_recv() {
            WorkerPoll::Empty => return,
            WorkerPoll::Ready(Ok(status)) => {
                tracing::info!(status = %status.status, "Prediction service reachable");
                self.health = HealthStatus::Online(status.status);
            }
            WorkerPoll::Ready(Err(err)) => {
                tracing::warn!(error = %err, "Prediction service health check failed");
                self.health = HealthStatus::Unreachable;
            }
            WorkerPoll::Lost => self.health = HealthStatus::Unreachable,
        }
        self.health_probe = None;
    }

    /// Drain progress from the request worker and settle the session when
    /// the request ends.
    fn poll_worker(&mut self) {
        loop {
            let poll = match &self.pending_worker {
                Some(worker) => worker.try_recv(),
                None => return,
            };

            match poll {
                WorkerPoll::Empty => return,
                WorkerPoll::Ready(RequestProgress::Sending) => {
                    tracing::debug!("Prediction request sent");
                }
                WorkerPoll::Ready(RequestProgress::Settled(result)) => {
                    self.finish_request(result);
                    return;
                }
                WorkerPoll::Lost => {
                    tracing::error!("Request worker exited without a result");
                    self.finish_request(Err(PredictError::Transport(
                        "request worker exited without a result".to_string(),
                    )));
                    return;
                }
            }
        }
    }

    fn finish_request(&mut self, result: std::result::Result<PredictionResponse, PredictError>) {
        self.session.settle(result);
        self.pending_worker = None;
        self.progress = 0.0;
        self.progress_started_at = None;
    }

    fn tick_progress(&mut self) {
        if self.pending_worker.is_none() {
            return;
        }
        let Some(started_at) = self.progress_started_at else {
            return;
        };

        let elapsed = Instant::now()
            .saturating_duration_since(started_at)
            .as_secs_f64();

        // Monotonic and asymptotic: the gauge never claims completion.
        let k = 1.0 - (-elapsed / PROGRESS_TAU_SECS).exp();
        let desired = PROGRESS_FLOOR + (PROGRESS_CEILING - PROGRESS_FLOOR) * k;
        self.progress = desired.max(self.progress).min(PROGRESS_CEILING);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let submitting = self.session.form().is_submitting();
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') if !submitting => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => self.form_view.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_view.next_field(),
            KeyCode::Left => self.form_view.cycle_choice(&mut self.session, false),
            KeyCode::Right => self.form_view.cycle_choice(&mut self.session, true),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_view.load_sample(&mut self.session);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if !self.session.reset() {
                    tracing::debug!("Reset ignored while a request is in flight");
                }
            }
            KeyCode::Char(c) => {
                self.form_view.input_char(&mut self.session, c);
            }
            KeyCode::Backspace => self.form_view.delete_char(&mut self.session),
            KeyCode::Delete => self.form_view.clear_field(&mut self.session),
            KeyCode::Enter => self.submit(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        match self.session.begin() {
            Begin::Send(payload) => {
                self.progress = PROGRESS_FLOOR;
                self.progress_started_at = Some(Instant::now());
                self.pending_worker = Some(RequestWorker::spawn(Arc::clone(&self.service), payload));
            }
            Begin::Suppressed | Begin::Rejected => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::LifecycleState;
    use crate::domain::{ClinicalField, Outcome, Payload, RiskLabel};
    use crate::ports::ServiceStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;

    /// Blocks every request until the test releases it.
    struct GatedService {
        calls: AtomicUsize,
        gate: Mutex<Receiver<()>>,
    }

    impl GatedService {
        fn new() -> (Arc<Self>, Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let service = Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Mutex::new(rx),
            });
            (service, tx)
        }
    }

    impl PredictionService for GatedService {
        fn predict(&self, _payload: &Payload) -> std::result::Result<PredictionResponse, PredictError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate.lock().expect("gate lock");
            gate.recv().map_err(|e| PredictError::Transport(e.to_string()))?;
            Ok(PredictionResponse {
                prediction: 1.0,
                risk: "High".to_string(),
                confidence: 87.0,
                message: "Elevated risk".to_string(),
            })
        }

        fn health(&self) -> std::result::Result<ServiceStatus, PredictError> {
            Ok(ServiceStatus {
                status: "ok".to_string(),
            })
        }
    }

    fn app_with(service: Arc<dyn PredictionService>) -> App {
        App::with_service(
            service,
            ValidationPolicy::Forward,
            "http://127.0.0.1:8000".to_string(),
        )
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn wait_until_settled(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.pending_worker.is_some() && Instant::now() < deadline {
            app.poll_worker();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_typing_and_navigation() {
        let (service, _gate) = GatedService::new();
        let mut app = app_with(service);

        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Left);

        let form = app.session.form();
        assert_eq!(form.value(ClinicalField::Age), "54");
        assert_eq!(form.value(ClinicalField::Sex), "1");
        assert_eq!(form.value(ClinicalField::Cp), "3");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_repeated_enter_sends_one_request() {
        let (service, gate) = GatedService::new();
        let mut app = app_with(service.clone());

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.state(), LifecycleState::Submitting);

        // Quit keys and reset are ignored while the request is pending.
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('r'));
        assert!(!app.should_quit);
        assert_eq!(app.session.form().value(ClinicalField::Age), "63");

        gate.send(()).expect("release request");
        wait_until_settled(&mut app);

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(!app.session.form().is_submitting());
        assert_eq!(app.session.outcome().risk(), Some(RiskLabel::High));
    }

    #[test]
    fn test_resubmission_after_settle() {
        let (service, gate) = GatedService::new();
        let mut app = app_with(service.clone());

        for _ in 0..2 {
            press(&mut app, KeyCode::Enter);
            gate.send(()).expect("release request");
            wait_until_settled(&mut app);
        }

        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert!(matches!(app.session.outcome(), Outcome::Success { .. }));
    }

    #[test]
    fn test_failed_request_settles_with_error() {
        let (service, gate) = GatedService::new();
        let mut app = app_with(service);

        press(&mut app, KeyCode::Enter);
        // Dropping the sender makes the gated request fail.
        drop(gate);
        wait_until_settled(&mut app);

        assert!(matches!(app.session.outcome(), Outcome::Error { .. }));
        assert!(!app.session.form().is_submitting());
        assert_eq!(app.progress, 0.0);
    }

    #[test]
    fn test_progress_is_monotonic_and_bounded() {
        let (service, gate) = GatedService::new();
        let mut app = app_with(service);

        press(&mut app, KeyCode::Enter);
        app.progress_started_at = Some(Instant::now() - Duration::from_secs(3600));
        app.tick_progress();
        assert!(app.progress <= PROGRESS_CEILING);
        assert!(app.progress > 0.9);

        let before = app.progress;
        app.progress_started_at = Some(Instant::now());
        app.tick_progress();
        assert_eq!(app.progress, before);

        gate.send(()).expect("release request");
        wait_until_settled(&mut app);
    }

    #[test]
    fn test_ctrl_q_quits_while_submitting() {
        let (service, gate) = GatedService::new();
        let mut app = app_with(service);

        press(&mut app, KeyCode::Enter);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        gate.send(()).expect("release request");
        wait_until_settled(&mut app);
    }
}
