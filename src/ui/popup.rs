use crate::{core::geo::LatLng, sdk::MarkerId};

/// Info window anchored to one marker.
///
/// Every marker owns its own popup; opening one does not close the others.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    anchor: MarkerId,
    position: LatLng,
    content: String,
    visible: bool,
}

impl Popup {
    pub fn new(anchor: MarkerId, position: LatLng, content: String) -> Self {
        Self {
            anchor,
            position,
            content,
            visible: false,
        }
    }

    pub fn anchor(&self) -> MarkerId {
        self.anchor
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_and_hide() {
        let mut popup = Popup::new(MarkerId(7), LatLng::new(1.0, 2.0), "hello".to_string());
        assert!(!popup.is_open());

        popup.show();
        assert!(popup.is_open());
        assert_eq!(popup.anchor(), MarkerId(7));

        popup.hide();
        assert!(!popup.is_open());
    }
}
