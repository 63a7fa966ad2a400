/// Tracks the single overlay (context window, modal) that currently owns input.
///
/// Owned by the composition root and handed to every drag controller, which
/// refuses to start a drag while an overlay is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayContext {
    active: Option<String>,
}

impl OverlayContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an overlay, replacing whichever one was open. Returns the replaced id.
    pub fn open(&mut self, id: impl Into<String>) -> Option<String> {
        self.active.replace(id.into())
    }

    /// Close the overlay if `id` is the active one.
    pub fn close(&mut self, id: &str) -> bool {
        if self.active.as_deref() == Some(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn close_all(&mut self) {
        self.active = None;
    }

    pub fn has_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_overlay_at_a_time() {
        let mut ctx = OverlayContext::new();
        assert_eq!(ctx.open("light.kitchen"), None);
        assert_eq!(ctx.open("climate.salon"), Some("light.kitchen".to_string()));
        assert!(!ctx.close("light.kitchen"));
        assert!(ctx.has_open());
        assert!(ctx.close("climate.salon"));
        assert!(!ctx.has_open());
    }
}
