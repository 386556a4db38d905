use std::collections::VecDeque;

use crate::models::chat::Exchange;

/// Rolling buffer of the most recent exchanges. The oldest exchange is evicted
/// once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    capacity: usize,
    exchanges: VecDeque<Exchange>,
}

impl ConversationWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            exchanges: VecDeque::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push_back(exchange);
        while self.exchanges.len() > self.capacity {
            self.exchanges.pop_front();
        }
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Timestamp of the most recent exchange.
    pub fn last_activity(&self) -> Option<i64> {
        self.exchanges.back().map(|e| e.assistant.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(input: &str) -> Exchange {
        Exchange::new(input, &format!("re: {}", input), 0)
    }

    fn inputs(window: &ConversationWindow) -> Vec<String> {
        window.exchanges().map(|e| e.human.content.clone()).collect()
    }

    #[test]
    fn fourth_append_evicts_the_oldest() {
        let mut window = ConversationWindow::new(3);
        for input in ["A", "B", "C"] {
            window.append(exchange(input));
        }
        assert_eq!(inputs(&window), ["A", "B", "C"]);

        window.append(exchange("D"));
        assert_eq!(window.len(), 3);
        assert_eq!(inputs(&window), ["B", "C", "D"]);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut window = ConversationWindow::new(3);
        for i in 0..20 {
            window.append(exchange(&i.to_string()));
            assert!(window.len() <= 3);
        }
        assert_eq!(inputs(&window), ["17", "18", "19"]);
    }

    #[test]
    fn last_activity_follows_the_newest_exchange() {
        let mut window = ConversationWindow::new(2);
        assert_eq!(window.last_activity(), None);
        window.append(Exchange::new("A", "a", 5));
        window.append(Exchange::new("B", "b", 9));
        assert_eq!(window.last_activity(), Some(9));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut window = ConversationWindow::new(0);
        window.append(exchange("A"));
        assert!(window.is_empty());
    }
}
