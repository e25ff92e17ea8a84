use leptos::prelude::document;

/// Controls disappear after this much inactivity in fullscreen
pub const HIDE_CONTROLS_DELAY_MS: u32 = 200;

pub const FULLSCREEN_CLASS: &str = "fullscreen-mode";
pub const HIDE_CONTROLS_CLASS: &str = "hide-controls";

/// Режим презентации и видимость плавающих кнопок.
///
/// Every (re)armed hide timer gets a ticket; a timer firing with an old ticket
/// does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullscreenControls {
    active: bool,
    controls_hidden: bool,
    ticket: u64,
}

impl FullscreenControls {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn controls_hidden(&self) -> bool {
        self.controls_hidden
    }

    /// Enters fullscreen, shows controls and returns the hide-timer ticket
    pub fn enter(&mut self) -> u64 {
        self.active = true;
        self.rearm()
    }

    /// Mouse move or click. Re-arms the timer while in fullscreen.
    pub fn activity(&mut self) -> Option<u64> {
        if !self.active {
            return None;
        }
        Some(self.rearm())
    }

    /// Hide timer fired
    pub fn timer_elapsed(&mut self, ticket: u64) -> bool {
        if !self.active || ticket != self.ticket {
            return false;
        }
        self.controls_hidden = true;
        true
    }

    /// Leaves fullscreen: controls visible, pending timer invalidated
    pub fn exit(&mut self) {
        self.active = false;
        self.controls_hidden = false;
        self.ticket += 1;
    }

    fn rearm(&mut self) -> u64 {
        self.controls_hidden = false;
        self.ticket += 1;
        self.ticket
    }
}

pub fn browser_is_fullscreen() -> bool {
    document().fullscreen_element().is_some()
}

pub fn request_browser_fullscreen() {
    let Some(root) = document().document_element() else {
        return;
    };
    if let Err(e) = root.request_fullscreen() {
        log::warn!("Fullscreen request rejected: {:?}", e);
    }
}

pub fn exit_browser_fullscreen() {
    if browser_is_fullscreen() {
        document().exit_fullscreen();
    }
}

/// Mirrors the state into the `<body>` classes used by the stylesheet
pub fn apply_body_classes(state: &FullscreenControls) {
    let Some(body) = document().body() else {
        return;
    };
    let classes = body.class_list();
    let _ = classes.toggle_with_force(FULLSCREEN_CLASS, state.is_active());
    let _ = classes.toggle_with_force(HIDE_CONTROLS_CLASS, state.controls_hidden());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_then_timer_hides_controls() {
        let mut fs = FullscreenControls::default();
        let ticket = fs.enter();
        assert!(fs.is_active());
        assert!(!fs.controls_hidden());
        assert!(fs.timer_elapsed(ticket));
        assert!(fs.controls_hidden());
    }

    #[test]
    fn test_activity_rearms_and_invalidates_old_timer() {
        let mut fs = FullscreenControls::default();
        let first = fs.enter();
        let second = fs.activity().unwrap();
        assert!(!fs.timer_elapsed(first));
        assert!(!fs.controls_hidden());
        assert!(fs.timer_elapsed(second));

        // следующее движение мыши снова показывает кнопки
        fs.activity();
        assert!(!fs.controls_hidden());
    }

    #[test]
    fn test_activity_outside_fullscreen_is_ignored() {
        let mut fs = FullscreenControls::default();
        // движение мыши вне полноэкранного режима не должно трогать состояние
        assert!(!fs.is_active());
        assert_eq!(fs.activity(), None);
        assert_eq!(fs, FullscreenControls::default());
    }

    #[test]
    fn test_exit_shows_controls_and_cancels_timer() {
        let mut fs = FullscreenControls::default();
        let ticket = fs.enter();
        fs.exit();
        assert!(!fs.is_active());
        assert!(!fs.controls_hidden());
        assert!(!fs.timer_elapsed(ticket));
    }
}
