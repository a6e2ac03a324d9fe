//! The on-page countup widget boundary.

use std::sync::{Arc, Mutex};

/// The visual countup element a page timer drives.
pub trait Widget: Send {
    /// Inserts the widget into the page.
    fn mount(&mut self, visible: bool);
    /// Replaces the displayed time.
    fn render(&mut self, text: &str);
    fn set_visible(&mut self, visible: bool);
    /// Switches between the active and paused appearance.
    fn set_paused(&mut self, paused: bool);
    /// Removes the widget from the page.
    fn remove(&mut self);
}

/// What a [`HeadlessWidget`] currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetView {
    pub mounted: bool,
    pub visible: bool,
    pub paused: bool,
    pub text: String,
}

/// A widget without a page: it records what would be displayed.
///
/// Clones share the same view, so a caller can keep one handle after moving
/// the other into a page timer.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWidget {
    view: Arc<Mutex<WidgetView>>,
}

impl HeadlessWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current view.
    pub fn view(&self) -> WidgetView {
        self.view.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn update(&self, f: impl FnOnce(&mut WidgetView)) {
        if let Ok(mut view) = self.view.lock() {
            f(&mut view);
        }
    }
}

impl Widget for HeadlessWidget {
    fn mount(&mut self, visible: bool) {
        self.update(|view| {
            *view = WidgetView {
                mounted: true,
                visible,
                paused: false,
                text: "0s".to_string(),
            };
        });
    }

    fn render(&mut self, text: &str) {
        self.update(|view| {
            if view.mounted {
                view.text = text.to_string();
            }
        });
    }

    fn set_visible(&mut self, visible: bool) {
        self.update(|view| {
            if view.mounted {
                view.visible = visible;
            }
        });
    }

    fn set_paused(&mut self, paused: bool) {
        self.update(|view| view.paused = paused);
    }

    fn remove(&mut self) {
        self.update(|view| *view = WidgetView::default());
    }
}
