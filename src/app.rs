use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::submit::{HttpSubmitter, Submitter};
use crate::ui::{ScreenAction, TerminalGuard, WizardScreen};
use crate::wizard::{SubmitFailure, SubmitOutcome, WizardSession};

pub struct App {
    session: WizardSession,
    screen: WizardScreen,
    submitter: Arc<dyn Submitter>,
    tick_rate: Duration,
    results_tx: mpsc::UnboundedSender<SubmitOutcome>,
    results_rx: mpsc::UnboundedReceiver<SubmitOutcome>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let submitter =
            HttpSubmitter::from_config(&config.submit).context("Failed to build submitter")?;
        Ok(Self::with_submitter(
            Arc::new(submitter),
            Duration::from_millis(config.ui.tick_rate_ms),
        ))
    }

    pub fn with_submitter(submitter: Arc<dyn Submitter>, tick_rate: Duration) -> Self {
        let session = WizardSession::default();
        let screen = WizardScreen::new(&session);
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            session,
            screen,
            submitter,
            tick_rate,
            results_tx,
            results_rx,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut guard = TerminalGuard::enter()?;
        tracing::info!("Wizard started");

        while !self.should_quit {
            if let Some(terminal) = guard.terminal() {
                terminal.draw(|f| self.screen.render(f, &self.session))?;
            }

            if event::poll(self.tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let action = self.screen.handle_key(key, &mut self.session);
                        self.handle_action(action);
                    }
                }
            }

            self.drain_results();
        }

        guard.restore();
        tracing::info!("Wizard closed");
        Ok(())
    }

    fn handle_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::Submit => self.start_submit(),
        }
    }

    /// Gate the submission and run it on a background task. The outcome
    /// comes back through the results channel and keeps the session in
    /// flight until it is applied.
    pub fn start_submit(&mut self) {
        let pending = match self.session.begin_submit() {
            Ok(pending) => pending,
            Err(SubmitFailure::InFlight) => {
                tracing::debug!("Submit ignored, one already in flight");
                return;
            }
            Err(SubmitFailure::Invalid(count)) => {
                tracing::debug!(count, "Submit blocked by validation");
                self.screen.focus_first_error(&self.session);
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Submit rejected");
                return;
            }
        };

        let submitter = Arc::clone(&self.submitter);
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let outcome = pending.send(submitter.as_ref()).await;
            let _ = tx.send(outcome);
        });
    }

    fn apply(&mut self, outcome: SubmitOutcome) {
        if self.session.finish_submit(outcome).is_ok() {
            self.screen.sync(&self.session);
        }
    }

    /// Apply any finished submissions to the session
    pub fn drain_results(&mut self) {
        while let Ok(outcome) = self.results_rx.try_recv() {
            self.apply(outcome);
        }
    }

    /// Wait for the next submission outcome and apply it
    pub async fn wait_for_result(&mut self) -> bool {
        match self.results_rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }
}
