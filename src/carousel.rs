//! Lightbox carousel state machine.
//!
//! Manages the open/closed lifecycle of the media overlay and circular
//! index navigation, independent of which record's media is showing. The
//! keyboard subscription is an explicit guard attached exactly on open and
//! detached exactly on close, so no navigation handler outlives a session.

use crate::model::MediaItem;

/// Keys the lightbox responds to while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Escape,
}

/// Where a pointer activation landed on the overlay.
///
/// Everything except `Backdrop` is intercepted by the control itself; only a
/// click that reaches the backdrop closes the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Content,
    Prev,
    Next,
    CloseGlyph,
}

/// Keyboard subscription held while the lightbox is open
#[derive(Debug, PartialEq, Eq)]
struct NavKeys;

#[derive(Debug, PartialEq)]
enum LightboxState {
    Closed,
    Open { images: Vec<MediaItem>, current: usize },
}

/// The media lightbox. One per app; sessions are created on `open` and fully
/// discarded on `close` — nothing carries over to the next open.
#[derive(Debug)]
pub struct Lightbox {
    state: LightboxState,
    nav_keys: Option<NavKeys>,
}

impl Default for Lightbox {
    fn default() -> Self {
        Lightbox::new()
    }
}

impl Lightbox {
    pub fn new() -> Self {
        Lightbox {
            state: LightboxState::Closed,
            nav_keys: None,
        }
    }

    /// Open a session on the given images at `start`. An empty image list or
    /// an out-of-range start index is rejected as a no-op. Opening while
    /// already open replaces the session; the keyboard subscription stays
    /// singular either way.
    pub fn open(&mut self, images: Vec<MediaItem>, start: usize) -> bool {
        if images.is_empty() || start >= images.len() {
            return false;
        }
        self.state = LightboxState::Open {
            images,
            current: start,
        };
        if self.nav_keys.is_none() {
            self.nav_keys = Some(NavKeys);
        }
        true
    }

    /// Close the session, discarding images and index, and release the
    /// keyboard subscription. Safe to call repeatedly and from any path.
    pub fn close(&mut self) {
        self.state = LightboxState::Closed;
        self.nav_keys = None;
    }

    /// Advance to the next image, wrapping from last to first
    pub fn next(&mut self) {
        if let LightboxState::Open { images, current } = &mut self.state {
            *current = (*current + 1) % images.len();
        }
    }

    /// Step to the previous image, wrapping from first to last
    pub fn prev(&mut self) {
        if let LightboxState::Open { images, current } = &mut self.state {
            *current = (*current + images.len() - 1) % images.len();
        }
    }

    /// Route a key press. Returns whether the key was consumed; always false
    /// once the subscription has been released, so a close from any path
    /// leaves no dangling handler.
    pub fn handle_key(&mut self, key: NavKey) -> bool {
        if self.nav_keys.is_none() {
            return false;
        }
        match key {
            NavKey::Left => self.prev(),
            NavKey::Right => self.next(),
            NavKey::Escape => self.close(),
        }
        true
    }

    /// Route a pointer activation. Controls intercept their own clicks; only
    /// a backdrop hit closes the session.
    pub fn handle_click(&mut self, target: ClickTarget) -> bool {
        if !self.is_open() {
            return false;
        }
        match target {
            ClickTarget::Backdrop | ClickTarget::CloseGlyph => self.close(),
            ClickTarget::Prev => self.prev(),
            ClickTarget::Next => self.next(),
            // Swallowed so it never reaches the backdrop
            ClickTarget::Content => {}
        }
        true
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    /// The item currently showing, if open
    pub fn current(&self) -> Option<&MediaItem> {
        match &self.state {
            LightboxState::Open { images, current } => images.get(*current),
            LightboxState::Closed => None,
        }
    }

    /// (current index, image count) while open
    pub fn position(&self) -> Option<(usize, usize)> {
        match &self.state {
            LightboxState::Open { images, current } => Some((*current, images.len())),
            LightboxState::Closed => None,
        }
    }

    /// True when exactly one image is open; the presentation hides the
    /// prev/next controls then.
    pub fn single_image(&self) -> bool {
        matches!(&self.state, LightboxState::Open { images, .. } if images.len() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;

    fn images(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem {
                kind: MediaKind::Image,
                original: format!("img-{}", i),
            })
            .collect()
    }

    fn current_index(lb: &Lightbox) -> usize {
        lb.position().expect("lightbox should be open").0
    }

    #[test]
    fn open_requires_images_and_valid_start() {
        let mut lb = Lightbox::new();
        assert!(!lb.open(vec![], 0));
        assert!(!lb.is_open());
        assert!(!lb.open(images(2), 2));
        assert!(!lb.is_open());
        assert!(lb.open(images(2), 1));
        assert_eq!(current_index(&lb), 1);
    }

    #[test]
    fn next_wraps_last_to_first() {
        let mut lb = Lightbox::new();
        lb.open(images(3), 2);
        lb.next();
        assert_eq!(current_index(&lb), 0);
    }

    #[test]
    fn prev_wraps_first_to_last() {
        let mut lb = Lightbox::new();
        lb.open(images(3), 0);
        lb.prev();
        assert_eq!(current_index(&lb), 2);
    }

    #[test]
    fn close_discards_session_state() {
        let mut lb = Lightbox::new();
        lb.open(images(3), 2);
        lb.close();
        assert!(!lb.is_open());
        assert!(lb.current().is_none());
        assert!(lb.position().is_none());
        // A fresh open starts from its own index, not the old one
        lb.open(images(2), 0);
        assert_eq!(current_index(&lb), 0);
    }

    #[test]
    fn keys_navigate_while_open() {
        let mut lb = Lightbox::new();
        lb.open(images(3), 0);
        assert!(lb.handle_key(NavKey::Right));
        assert_eq!(current_index(&lb), 1);
        assert!(lb.handle_key(NavKey::Left));
        assert_eq!(current_index(&lb), 0);
        assert!(lb.handle_key(NavKey::Escape));
        assert!(!lb.is_open());
    }

    #[test]
    fn keys_are_dead_after_close() {
        let mut lb = Lightbox::new();
        lb.open(images(3), 1);
        lb.close();
        assert!(!lb.handle_key(NavKey::Left));
        assert!(!lb.handle_key(NavKey::Right));
        assert!(!lb.is_open());
    }

    #[test]
    fn reopen_without_close_keeps_one_subscription() {
        let mut lb = Lightbox::new();
        lb.open(images(3), 0);
        lb.open(images(4), 2);
        // One key press moves exactly one step
        lb.handle_key(NavKey::Right);
        assert_eq!(current_index(&lb), 3);
        lb.close();
        assert!(!lb.handle_key(NavKey::Right));
    }

    #[test]
    fn control_clicks_do_not_reach_backdrop() {
        let mut lb = Lightbox::new();
        lb.open(images(3), 0);

        assert!(lb.handle_click(ClickTarget::Next));
        assert_eq!(current_index(&lb), 1);
        assert!(lb.is_open());

        assert!(lb.handle_click(ClickTarget::Prev));
        assert_eq!(current_index(&lb), 0);
        assert!(lb.is_open());

        assert!(lb.handle_click(ClickTarget::Content));
        assert!(lb.is_open());

        assert!(lb.handle_click(ClickTarget::Backdrop));
        assert!(!lb.is_open());
    }

    #[test]
    fn close_glyph_closes() {
        let mut lb = Lightbox::new();
        lb.open(images(2), 0);
        assert!(lb.handle_click(ClickTarget::CloseGlyph));
        assert!(!lb.is_open());
        assert!(!lb.handle_click(ClickTarget::Backdrop));
    }

    #[test]
    fn single_image_hides_navigation() {
        let mut lb = Lightbox::new();
        lb.open(images(1), 0);
        assert!(lb.single_image());
        // Navigation on a single image is the identity
        lb.next();
        assert_eq!(current_index(&lb), 0);
        lb.prev();
        assert_eq!(current_index(&lb), 0);
        // Close still works
        assert!(lb.handle_key(NavKey::Escape));
        assert!(!lb.is_open());
    }
}
