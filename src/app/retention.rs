use crate::models::message::ChatMessage;

/// The messages currently kept for display, oldest first.
///
/// Eviction is driven entirely by the visibility predicate passed to
/// [`RetentionWindow::prune`]; there is no count cap.
#[derive(Debug, Default)]
pub struct RetentionWindow {
    units: Vec<ChatMessage>,
}

impl RetentionWindow {
    pub fn push(&mut self, unit: ChatMessage) {
        self.units.push(unit);
    }

    /// Drops every unit the predicate rejects, keeping the rest in order.
    /// Returns how many were evicted.
    pub fn prune<F>(&mut self, mut is_visible: F) -> usize
    where
        F: FnMut(&ChatMessage) -> bool,
    {
        let before = self.units.len();
        self.units.retain(|unit| is_visible(unit));
        before - self.units.len()
    }

    pub fn units(&self) -> &[ChatMessage] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::message::Segment;
    use chrono::Local;

    pub(crate) fn unit(id: u64, body: &str) -> ChatMessage {
        ChatMessage {
            id,
            sender_name: format!("user{}", id),
            sender_color: "#112233".to_string(),
            badges: Vec::new(),
            segments: vec![Segment::Text(body.to_string())],
            timestamp: Local::now(),
        }
    }

    fn ids(window: &RetentionWindow) -> Vec<u64> {
        window.units().iter().map(|u| u.id).collect()
    }

    #[test]
    fn evicts_invisible_units_in_order() {
        let mut window = RetentionWindow::default();
        for id in 0..5 {
            window.push(unit(id, "hi"));
        }

        let evicted = window.prune(|u| u.id != 1 && u.id != 2);

        assert_eq!(evicted, 2);
        assert_eq!(ids(&window), vec![0, 3, 4]);
    }

    #[test]
    fn keeps_everything_when_all_visible() {
        let mut window = RetentionWindow::default();
        for id in 0..100 {
            window.push(unit(id, "hi"));
        }
        assert_eq!(window.prune(|_| true), 0);
        assert_eq!(window.len(), 100);
    }

    #[test]
    fn can_empty_the_window() {
        let mut window = RetentionWindow::default();
        window.push(unit(0, "hi"));
        assert_eq!(window.prune(|_| false), 1);
        assert!(window.is_empty());
    }
}
