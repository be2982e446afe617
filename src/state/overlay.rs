use crate::state::cache::{Snapshot, Status};
use std::sync::Arc;

/// Id-parameterized detail view (game drawer, team modal). Holding `None`
/// means closed; a closed overlay never fetches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetailOverlay {
    id: Option<String>,
    pub scroll: u16,
}

impl DetailOverlay {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.id.is_some()
    }

    pub fn open(&mut self, id: &str) {
        if self.id.as_deref() != Some(id) {
            self.scroll = 0;
        }
        self.id = Some(id.to_owned());
    }

    /// Closing leaves the cached detail untouched, so reopening within the
    /// freshness window is served from cache.
    pub fn close(&mut self) {
        self.id = None;
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

/// Overlay presentation. A found entity is never empty; "not found" arrives
/// as an error from the fetcher.
#[derive(Debug)]
pub enum OverlayState<T> {
    Closed,
    Loading,
    Error { message: String },
    Ready(Arc<T>),
}

pub fn overlay_state<T>(snapshot: &Snapshot<T>) -> OverlayState<T> {
    match (snapshot.status, &snapshot.data) {
        (Status::Disabled, _) => OverlayState::Closed,
        (Status::Error, _) => OverlayState::Error {
            message: snapshot
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "Failed to load details".to_owned()),
        },
        (Status::Fresh, Some(data)) => OverlayState::Ready(Arc::clone(data)),
        _ => OverlayState::Loading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::cache::FetchError;

    #[test]
    fn disabled_snapshot_is_closed() {
        let state = overlay_state::<u8>(&Snapshot::disabled());
        assert!(matches!(state, OverlayState::Closed));
    }

    #[test]
    fn snapshot_status_maps_to_overlay_state() {
        let pending: Snapshot<u8> = Snapshot { status: Status::Pending, ..Snapshot::disabled() };
        assert!(matches!(overlay_state(&pending), OverlayState::Loading));

        let failed: Snapshot<u8> = Snapshot {
            status: Status::Error,
            error: Some(FetchError::Transport("Failed to fetch team details: Not Found".into())),
            ..Snapshot::disabled()
        };
        assert!(matches!(
            overlay_state(&failed),
            OverlayState::Error { message } if message == "Failed to fetch team details: Not Found"
        ));

        let ready: Snapshot<u8> = Snapshot {
            status: Status::Fresh,
            data: Some(Arc::new(9)),
            ..Snapshot::disabled()
        };
        assert!(matches!(overlay_state(&ready), OverlayState::Ready(v) if *v == 9));
    }

    #[test]
    fn reopening_same_id_keeps_scroll() {
        let mut overlay = DetailOverlay::default();
        overlay.open("g1");
        overlay.scroll_down();
        overlay.open("g1");
        assert_eq!(overlay.scroll, 1);
        overlay.open("g2");
        assert_eq!(overlay.scroll, 0);
        overlay.close();
        assert!(!overlay.is_open());
        assert_eq!(overlay.id(), None);
    }
}
