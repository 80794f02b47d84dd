//! Role/badge state for one shopping session.
//!
//! This is a local permission simulator: "login" flips a flag, badges are
//! toggled freely by the shopper. Pricing only ever reads
//! [`RoleState::can_see_wholesale`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use crate::domain::events::{DomainEvent, SessionEvent};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseRole {
    #[default]
    Guest,
    Member,
}

impl fmt::Display for BaseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Guest => "guest", Self::Member => "member" })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Retailer,
    Tenant,
    Client,
    Creator,
    Principle,
    ThePrinciple,
    SuperPrinciple,
}

/// What a badge unlocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewWholesale,
    ManageBadges,
}

/// Badge that can never be stripped while it is the only one granting
/// badge administration.
pub const PROTECTED_BADGE: Badge = Badge::SuperPrinciple;

impl Badge {
    pub const ALL: [Badge; 7] = [
        Badge::Retailer,
        Badge::Tenant,
        Badge::Client,
        Badge::Creator,
        Badge::Principle,
        Badge::ThePrinciple,
        Badge::SuperPrinciple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retailer => "retailer",
            Self::Tenant => "tenant",
            Self::Client => "client",
            Self::Creator => "creator",
            Self::Principle => "principle",
            Self::ThePrinciple => "theprinciple",
            Self::SuperPrinciple => "superprinciple",
        }
    }

    pub fn grants(&self) -> &'static [Capability] {
        match self {
            Self::Retailer => &[Capability::ViewWholesale],
            Self::SuperPrinciple => &[Capability::ManageBadges],
            _ => &[],
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Badge {
    type Err = RoleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Badge::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RoleError::UnknownBadge(s.to_string()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoleState {
    authenticated: bool,
    base_role: BaseRole,
    badges: BTreeSet<Badge>,
    events: Vec<DomainEvent>,
}

impl RoleState {
    /// Fresh visitor: not logged in, guest, no badges.
    pub fn new() -> Self { Self::default() }

    pub fn is_authenticated(&self) -> bool { self.authenticated }
    pub fn base_role(&self) -> BaseRole { self.base_role }
    pub fn badges(&self) -> &BTreeSet<Badge> { &self.badges }
    pub fn has_badge(&self, badge: Badge) -> bool { self.badges.contains(&badge) }

    /// Wholesale prices are shown only to logged-in retailers.
    pub fn can_see_wholesale(&self) -> bool {
        self.authenticated && self.has_badge(Badge::Retailer)
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        if !self.authenticated { return vec![]; }
        let mut caps: Vec<Capability> = Vec::new();
        for cap in self.badges.iter().flat_map(|b| b.grants()) {
            if !caps.contains(cap) { caps.push(*cap); }
        }
        caps
    }

    /// `visitor` before login, otherwise the base role.
    pub fn session_label(&self) -> String {
        if self.authenticated { self.base_role.to_string() } else { "visitor".to_string() }
    }

    /// Logging in always starts as a guest holding only the protected badge.
    pub fn login(&mut self) {
        self.authenticated = true;
        self.base_role = BaseRole::Guest;
        self.badges = BTreeSet::from([PROTECTED_BADGE]);
        self.raise_event(SessionEvent::LoggedIn);
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        self.base_role = BaseRole::Guest;
        self.badges.clear();
        self.raise_event(SessionEvent::LoggedOut);
    }

    pub fn set_base_role(&mut self, role: BaseRole) -> Result<(), RoleError> {
        self.ensure_authenticated()?;
        self.base_role = role;
        self.raise_event(SessionEvent::BaseRoleChanged { role });
        Ok(())
    }

    pub fn auto_upgrade_to_member(&mut self) {
        if self.base_role == BaseRole::Guest {
            self.base_role = BaseRole::Member;
            self.raise_event(SessionEvent::BaseRoleChanged { role: BaseRole::Member });
        }
    }

    pub fn set_badge(&mut self, badge: Badge, enabled: bool) -> Result<(), RoleError> {
        self.ensure_authenticated()?;
        if !enabled && self.is_last_protected(badge) {
            self.raise_event(SessionEvent::BadgeRemovalRefused { badge });
            return Err(RoleError::ProtectedBadge(badge));
        }
        let changed = if enabled { self.badges.insert(badge) } else { self.badges.remove(&badge) };
        if changed {
            self.raise_event(SessionEvent::BadgeChanged { badge, enabled });
        }
        Ok(())
    }

    pub fn toggle_badge(&mut self, badge: Badge) -> Result<(), RoleError> {
        self.ensure_authenticated()?;
        self.set_badge(badge, !self.has_badge(badge))
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: SessionEvent) { self.events.push(DomainEvent::Session(e)); }

    fn ensure_authenticated(&self) -> Result<(), RoleError> {
        if self.authenticated { Ok(()) } else { Err(RoleError::NotAuthenticated) }
    }

    fn is_last_protected(&self, badge: Badge) -> bool {
        badge == PROTECTED_BADGE
            && self.has_badge(badge)
            && !self.badges.iter().any(|b| *b != badge && b.grants().contains(&Capability::ManageBadges))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    #[error("Please login first")]
    NotAuthenticated,
    #[error("At least one {0} must remain")]
    ProtectedBadge(Badge),
    #[error("Unknown badge: {0}")]
    UnknownBadge(String),
}
