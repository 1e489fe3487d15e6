//! Pointer interaction from the sketch window.
//!
//! OpenCV delivers mouse events (and touch, on platforms that map it to the
//! primary button) on its own callback. They are forwarded over a channel
//! and drained once per render tick.

use crate::Result;
use crossbeam::channel::{unbounded, Receiver, Sender};
use opencv::highgui;

/// A discrete interaction edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    /// Press or touch began
    Start,
    /// Press or touch ended
    End,
}

impl InteractionEvent {
    /// Map an OpenCV mouse event code to an interaction edge
    #[must_use]
    pub fn from_mouse(event: i32) -> Option<Self> {
        match event {
            highgui::EVENT_LBUTTONDOWN => Some(Self::Start),
            highgui::EVENT_LBUTTONUP => Some(Self::End),
            _ => None,
        }
    }
}

/// Interaction events waiting for the next tick
pub struct InputQueue {
    tx: Sender<InteractionEvent>,
    rx: Receiver<InteractionEvent>,
}

impl InputQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Handle for pushing events from another thread or callback
    #[must_use]
    pub fn sender(&self) -> Sender<InteractionEvent> {
        self.tx.clone()
    }

    /// Forward primary button presses in `window` to this queue
    ///
    /// # Errors
    ///
    /// Returns an error if the window does not exist
    pub fn attach(&self, window: &str) -> Result<()> {
        let tx = self.sender();
        highgui::set_mouse_callback(
            window,
            Some(Box::new(move |event, _x, _y, _flags| {
                if let Some(interaction) = InteractionEvent::from_mouse(event) {
                    // Receiver lives as long as the app
                    let _ = tx.send(interaction);
                }
            })),
        )?;
        Ok(())
    }

    /// All events queued since the last call, oldest first
    pub fn drain(&self) -> Vec<InteractionEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_mapping() {
        assert_eq!(InteractionEvent::from_mouse(highgui::EVENT_LBUTTONDOWN), Some(InteractionEvent::Start));
        assert_eq!(InteractionEvent::from_mouse(highgui::EVENT_LBUTTONUP), Some(InteractionEvent::End));
        assert_eq!(InteractionEvent::from_mouse(highgui::EVENT_MOUSEMOVE), None);
        assert_eq!(InteractionEvent::from_mouse(highgui::EVENT_RBUTTONDOWN), None);
    }

    #[test]
    fn test_drain_preserves_order() {
        let queue = InputQueue::new();
        let tx = queue.sender();
        tx.send(InteractionEvent::Start).unwrap();
        tx.send(InteractionEvent::End).unwrap();
        assert_eq!(queue.drain(), vec![InteractionEvent::Start, InteractionEvent::End]);
        assert!(queue.drain().is_empty());
    }
}
