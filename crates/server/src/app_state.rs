use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use invitation_flow::{EventDetails, FlowController, GuestName};
use shared::protocol::ServerEvent;
use storage::Storage;
use tokio::sync::broadcast;
use url::Url;

use crate::{
    config::Settings,
    sessions::{CssAnimator, FlowSessions, GuestFlow, RedirectNavigator},
};

pub(crate) struct SiteConfig {
    pub(crate) event: EventDetails,
    pub(crate) animations_enabled: bool,
    pub(crate) public_url: Url,
    pub(crate) admin_password: Option<String>,
    pub(crate) admin_session_ttl: chrono::Duration,
    pub(crate) guest_session_idle: Duration,
    pub(crate) assets_dir: PathBuf,
}

impl SiteConfig {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let public_url = Url::parse(&settings.public_url)
            .with_context(|| format!("invalid public_url '{}'", settings.public_url))?;
        if settings.admin_session_ttl_minutes <= 0 {
            bail!(
                "admin_session_ttl_minutes must be positive, got {}",
                settings.admin_session_ttl_minutes
            );
        }
        let admin_session_ttl = chrono::TimeDelta::try_minutes(settings.admin_session_ttl_minutes)
            .with_context(|| {
                format!(
                    "admin_session_ttl_minutes {} is out of range",
                    settings.admin_session_ttl_minutes
                )
            })?;
        let guest_session_idle = settings
            .guest_session_idle_minutes
            .checked_mul(60)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .with_context(|| {
                format!(
                    "guest_session_idle_minutes must be between 1 and {}, got {}",
                    u64::MAX / 60,
                    settings.guest_session_idle_minutes
                )
            })?;
        Ok(Self {
            event: EventDetails {
                groom: settings.groom_name.clone(),
                bride: settings.bride_name.clone(),
                date_label: settings.event_date_label.clone(),
            },
            animations_enabled: settings.animations_enabled,
            public_url,
            admin_password: settings.admin_password.clone(),
            admin_session_ttl,
            guest_session_idle,
            assets_dir: PathBuf::from(&settings.assets_dir),
        })
    }
}

pub(crate) struct AppState {
    pub(crate) storage: Storage,
    pub(crate) site: SiteConfig,
    pub(crate) sessions: FlowSessions,
    pub(crate) events: broadcast::Sender<ServerEvent>,
}

impl AppState {
    pub(crate) fn new(storage: Storage, site: SiteConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        let sessions = FlowSessions::new(site.guest_session_idle);
        Self {
            storage,
            site,
            sessions,
            events,
        }
    }

    pub(crate) fn new_flow(&self, guest: GuestName) -> GuestFlow {
        FlowController::new(
            guest,
            self.site.event.clone(),
            RedirectNavigator::default(),
            CssAnimator::new(self.site.animations_enabled),
        )
    }
}

#[cfg(test)]
#[path = "tests/app_state_tests.rs"]
mod tests;
