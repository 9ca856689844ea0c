use crate::config::{HarvestConfig, Range};
use crate::error::SessionError;
use crate::renderer::{Identity, PageRenderer, RendererFactory};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Settings for session recycling
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Pages served before a restart, drawn uniformly per session
    pub restart_threshold: Range<u32>,
    /// User agents a new session picks from
    pub user_agents: Vec<String>,
}

impl From<&HarvestConfig> for SessionConfig {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            restart_threshold: config.restart_threshold,
            user_agents: config.user_agents.clone(),
        }
    }
}

/// One live renderer and its bookkeeping
struct SessionState<R> {
    renderer: R,
    identity: Identity,
    pages_served: u32,
    threshold: u32,
}

/// Owns the single live renderer and decides when to recycle it
///
/// At most one renderer exists at any time: the previous one is always
/// closed, or abandoned if closing fails, before a replacement is created.
pub struct SessionManager<F: RendererFactory> {
    factory: F,
    config: SessionConfig,
    rng: StdRng,
    state: Option<SessionState<F::Renderer>>,
    restart_requested: bool,
    restarts: u32,
}

impl<F: RendererFactory> SessionManager<F> {
    pub fn new(factory: F, config: SessionConfig) -> Self {
        Self::with_rng(factory, config, StdRng::from_entropy())
    }

    pub fn with_rng(factory: F, config: SessionConfig, rng: StdRng) -> Self {
        Self {
            factory,
            config,
            rng,
            state: None,
            restart_requested: false,
            restarts: 0,
        }
    }

    /// The live renderer, creating one only if none exists or a restart is pending
    pub async fn ensure_session(&mut self) -> Result<&mut F::Renderer, SessionError> {
        if self.state.is_none() || self.restart_requested {
            self.restart().await?;
        }
        self.renderer()
    }

    /// Close the current renderer (if any) and open a fresh one
    pub async fn restart(&mut self) -> Result<(), SessionError> {
        self.close_current().await;

        let identity = self.pick_identity()?;
        let threshold = self.pick_threshold();

        let renderer = self
            .factory
            .create(&identity)
            .await
            .map_err(|e| SessionError::Create(e.to_string()))?;

        ::log::info!(
            "Started browser session (restart threshold {} pages, agent {})",
            threshold,
            identity.user_agent
        );

        self.state = Some(SessionState {
            renderer,
            identity,
            pages_served: 0,
            threshold,
        });
        self.restart_requested = false;
        self.restarts += 1;
        Ok(())
    }

    /// Ask for a fresh session on the next `ensure_session`
    pub fn request_restart(&mut self) {
        self.restart_requested = true;
    }

    /// The live renderer; fails if no session has been started
    pub fn renderer(&mut self) -> Result<&mut F::Renderer, SessionError> {
        self.state
            .as_mut()
            .map(|state| &mut state.renderer)
            .ok_or(SessionError::NotStarted)
    }

    /// Count one served page, requesting a restart once the session's threshold is reached
    ///
    /// The replacement session is opened by the next `ensure_session`, so a
    /// threshold hit on the last page of a run never launches a browser.
    /// Returns whether a restart was requested.
    pub fn record_page(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };

        state.pages_served += 1;
        if state.pages_served < state.threshold {
            return false;
        }

        ::log::info!(
            "Session served {} pages, restarting browser",
            state.pages_served
        );
        self.restart_requested = true;
        true
    }

    /// Close the live renderer without opening another
    pub async fn shutdown(&mut self) {
        self.close_current().await;
        self.restart_requested = false;
    }

    async fn close_current(&mut self) {
        if let Some(mut state) = self.state.take() {
            if let Err(e) = state.renderer.close().await {
                ::log::warn!("Failed to close browser session, abandoning it: {}", e);
            } else {
                ::log::debug!(
                    "Closed browser session after {} pages",
                    state.pages_served
                );
            }
        }
    }

    fn pick_identity(&mut self) -> Result<Identity, SessionError> {
        let user_agent = self
            .config
            .user_agents
            .choose(&mut self.rng)
            .ok_or(SessionError::NoIdentity)?;
        Ok(Identity {
            user_agent: user_agent.clone(),
        })
    }

    fn pick_threshold(&mut self) -> u32 {
        let Range { min, max } = self.config.restart_threshold;
        if max <= min {
            return min.max(1);
        }
        self.rng.gen_range(min..=max).max(1)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Pages served since the last restart
    pub fn pages_served(&self) -> Option<u32> {
        self.state.as_ref().map(|s| s.pages_served)
    }

    /// Restart threshold drawn for the current session
    pub fn threshold(&self) -> Option<u32> {
        self.state.as_ref().map(|s| s.threshold)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.as_ref().map(|s| &s.identity)
    }

    /// Sessions started so far
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}
