//! Per-shopper state: one role state and one cart per session id.
//!
//! Sessions never share anything. The store hands out `Arc<Mutex<Session>>`
//! so a slow request in one session never holds the map lock.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::aggregates::{Cart, CartError, LineKey, RoleState};
use crate::domain::events::DomainEvent;
use crate::pricing::{resolve_lines, Shopper};

#[derive(Debug)]
pub struct Session {
    id: String,
    role: RoleState,
    cart: Cart,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub session_label: String,
    pub authenticated: bool,
    pub can_see_wholesale: bool,
    pub cart_units: u64,
    pub cart_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), role: RoleState::new(), cart: Cart::new(), created_at: Utc::now() }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn role(&self) -> &RoleState { &self.role }
    pub fn role_mut(&mut self) -> &mut RoleState { &mut self.role }
    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn cart_mut(&mut self) -> &mut Cart { &mut self.cart }
    pub fn shopper(&self) -> Shopper { Shopper::from(&self.role) }

    pub fn replace_cart(&mut self, cart: Cart) { self.cart = cart; }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            session_label: self.role.session_label(),
            authenticated: self.role.is_authenticated(),
            can_see_wholesale: self.role.can_see_wholesale(),
            cart_units: self.cart.total_units(),
            cart_updated_at: self.cart.updated_at(),
            created_at: self.created_at,
        }
    }

    /// Cart-page quantity edit. Positive requests go through the pricing
    /// clamp for the line's product/variant; zero or less removes the line.
    /// Lines whose product has vanished take the raw value.
    pub fn set_cart_quantity(&mut self, catalog: &Catalog, product_id: &str, variant_id: Option<&str>, requested: i64) -> Result<u32, CartError> {
        if requested <= 0 {
            self.cart.set_quantity(product_id, variant_id, requested)?;
            return Ok(0);
        }
        let key = LineKey::new(product_id, variant_id);
        let line = self.cart.lines().iter().find(|l| l.key() == key).cloned().ok_or(CartError::ItemNotFound)?;
        let quantity = match resolve_lines(std::slice::from_ref(&line), catalog).first() {
            Some(resolved) => resolved.assess(self.role.can_see_wholesale()).clamped(requested),
            None => u32::try_from(requested).unwrap_or(u32::MAX),
        };
        self.cart.set_quantity(product_id, variant_id, i64::from(quantity))?;
        Ok(quantity)
    }

    /// Drains events raised by the role state and the cart and logs them.
    pub fn flush_events(&mut self) -> usize {
        let mut events = self.role.take_events();
        events.extend(self.cart.take_events());
        for event in &events {
            log_event(&self.id, event);
        }
        events.len()
    }
}

pub fn log_event(session_id: &str, event: &DomainEvent) {
    match event {
        DomainEvent::Session(e) => tracing::info!(session = %session_id, event = ?e, "session event"),
        DomainEvent::Cart(e) => tracing::debug!(session = %session_id, event = ?e, "cart event"),
        DomainEvent::Order(e) => tracing::info!(session = %session_id, event = ?e, "order event"),
    }
}

#[derive(Debug)]
struct Entry {
    session: Arc<Mutex<Session>>,
    /// Epoch millis of the last lookup.
    last_active: AtomicI64,
}

impl Entry {
    fn new(session: Session, now: DateTime<Utc>) -> Self {
        Self { session: Arc::new(Mutex::new(session)), last_active: AtomicI64::new(now.timestamp_millis()) }
    }

    fn idle_since(&self, now: DateTime<Utc>) -> Duration {
        Duration::milliseconds(now.timestamp_millis() - self.last_active.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self { Self::default() }

    pub async fn create(&self) -> String {
        let id = Uuid::now_v7().to_string();
        let entry = Entry::new(Session::new(id.clone()), Utc::now());
        self.sessions.write().await.insert(id.clone(), entry);
        tracing::info!(session = %id, "session created");
        id
    }

    /// Looking a session up counts as activity.
    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(id)?;
        entry.last_active.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
        Some(Arc::clone(&entry.session))
    }

    /// Drops sessions idle for at least `max_idle`. Sessions still held by a
    /// request are kept.
    pub async fn sweep_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| Arc::strong_count(&entry.session) > 1 || entry.idle_since(now) < max_idle);
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::info!(swept, remaining = sessions.len(), "idle sessions expired");
        }
        swept
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize { self.sessions.read().await.len() }

    pub async fn is_empty(&self) -> bool { self.sessions.read().await.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Badge;

    #[test]
    fn test_set_cart_quantity_clamps_through_pricing() {
        let catalog = Catalog::builtin();
        let mut session = Session::new("s");
        session.cart_mut().add_item("P-001", Some("P-001-BLK-S"), 1).unwrap();
        // BLK-S holds 10 units
        assert_eq!(session.set_cart_quantity(&catalog, "P-001", Some("P-001-BLK-S"), 15), Ok(10));
        // tote retail minimum is 2
        session.cart_mut().add_item("P-002", Some("P-002-NAT-OS"), 5).unwrap();
        assert_eq!(session.set_cart_quantity(&catalog, "P-002", Some("P-002-NAT-OS"), 1), Ok(2));
        assert_eq!(session.set_cart_quantity(&catalog, "P-002", Some("P-002-NAT-OS"), 0), Ok(0));
        assert_eq!(session.cart().line_count(), 1);
        assert_eq!(session.set_cart_quantity(&catalog, "P-003", None, 3), Err(CartError::ItemNotFound));
    }

    #[test]
    fn test_wholesale_minimum_applies_after_badge() {
        let catalog = Catalog::builtin();
        let mut session = Session::new("s");
        session.role_mut().login();
        session.role_mut().set_badge(Badge::Retailer, true).unwrap();
        session.cart_mut().add_item("P-001", Some("P-001-WHT-M"), 1).unwrap();
        assert_eq!(session.set_cart_quantity(&catalog, "P-001", Some("P-001-WHT-M"), 3), Ok(12));
    }

    #[test]
    fn test_flush_events_drains() {
        let mut session = Session::new("s");
        session.role_mut().login();
        session.cart_mut().add_item("P-001", None, 1).unwrap();
        assert_eq!(session.flush_events(), 2);
        assert_eq!(session.flush_events(), 0);
    }

    #[tokio::test]
    async fn test_store_isolates_sessions() {
        let store = SessionStore::new();
        let a = store.create().await;
        let b = store.create().await;
        assert_ne!(a, b);
        store.get(&a).await.unwrap().lock().await.cart_mut().add_item("P-001", None, 2).unwrap();
        assert_eq!(store.get(&b).await.unwrap().lock().await.cart().total_units(), 0);
        assert_eq!(store.len().await, 2);
        assert!(store.remove(&a).await);
        assert!(store.get(&a).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_expires_idle_sessions() {
        let store = SessionStore::new();
        let idle = store.create().await;
        let held = store.create().await;
        let handle = store.get(&held).await.unwrap();

        assert_eq!(store.sweep_idle(Utc::now(), Duration::minutes(30)).await, 0);

        let later = Utc::now() + Duration::minutes(45);
        assert_eq!(store.sweep_idle(later, Duration::minutes(30)).await, 1);
        assert!(store.get(&idle).await.is_none());
        assert!(store.get(&held).await.is_some());

        drop(handle);
        assert_eq!(store.sweep_idle(later, Duration::minutes(30)).await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_lookup_refreshes_activity() {
        let store = SessionStore::new();
        let id = store.create().await;
        let start = Utc::now();
        store.get(&id).await;
        // activity was recorded at or after `start`
        assert_eq!(store.sweep_idle(start + Duration::minutes(29), Duration::minutes(30)).await, 0);
        assert_eq!(store.len().await, 1);
    }
}
