//! Transient score popups shown where the player tapped.
//!
//! Popups live in an [`ExpiryQueue`]: append-only in id order, each entry
//! removed once its display time has passed.

use serde::Serialize;

/// How long a regular "+N" popup stays on screen.
pub const POPUP_TTL_MS: f64 = 800.0;
/// The mega-combo burst is slightly shorter.
pub const MEGA_POPUP_TTL_MS: f64 = 750.0;

/// Tap position in pixels relative to the capsule's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TapPoint {
    pub x: f64,
    pub y: f64,
}

impl TapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupKind {
    Regular,
    Mega,
}

impl PopupKind {
    pub fn ttl_ms(self) -> f64 {
        match self {
            PopupKind::Regular => POPUP_TTL_MS,
            PopupKind::Mega => MEGA_POPUP_TTL_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScorePopup {
    pub id: u64,
    pub position: TapPoint,
    pub points: u64,
    pub kind: PopupKind,
}

#[derive(Clone, Debug)]
struct Entry<T> {
    id: u64,
    expires_at: f64,
    value: T,
}

/// Ordered collection of values that disappear after a fixed time.
/// Ids keep increasing across `clear()` so a stale id never hits a new entry.
#[derive(Clone, Debug)]
pub struct ExpiryQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for ExpiryQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<T> ExpiryQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T, now_ms: f64, ttl_ms: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            expires_at: now_ms + ttl_ms,
            value,
        });
        id
    }

    #[cfg(test)]
    pub fn remove(&mut self, id: u64) -> Option<T> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).value)
    }

    /// Drops everything whose time is up; returns how many went.
    pub fn expire(&mut self, now_ms: f64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.expires_at > now_ms);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.entries.iter().map(|e| (e.id, &e.value))
    }
}

/// Popup queue as the session owns it.
#[derive(Clone, Debug, Default)]
pub struct PopupBoard {
    queue: ExpiryQueue<(TapPoint, u64, PopupKind)>,
}

impl PopupBoard {
    pub fn spawn(&mut self, position: TapPoint, points: u64, kind: PopupKind, now_ms: f64) -> u64 {
        self.queue.push((position, points, kind), now_ms, kind.ttl_ms())
    }

    pub fn expire(&mut self, now_ms: f64) -> usize {
        self.queue.expire(now_ms)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn to_vec(&self) -> Vec<ScorePopup> {
        self.queue
            .iter()
            .map(|(id, &(position, points, kind))| ScorePopup {
                id,
                position,
                points,
                kind,
            })
            .collect()
    }
}
