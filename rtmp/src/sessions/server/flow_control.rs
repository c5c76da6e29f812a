use tracing::debug;

/// Received byte count at which the counters start over, well before they could overflow the
/// 32 bit acknowledgement sequence number
const RESET_THRESHOLD: u64 = 0xF000_0000;

/// Tracks received bytes and decides when an `Acknowledgement` is owed to the peer.
#[derive(Debug)]
pub struct AcknowledgementWindow {
    window_ack_size: u32,
    response_size: u64,
    last_ack: u64,
    total_size: u64,
}

impl AcknowledgementWindow {
    pub fn new(window_ack_size: u32) -> Self {
        AcknowledgementWindow {
            window_ack_size,
            response_size: 0,
            last_ack: 0,
            total_size: 0,
        }
    }

    pub fn set_window_ack_size(&mut self, window_ack_size: u32) {
        debug!("Acknowledgement window set to {} bytes", window_ack_size);
        self.window_ack_size = window_ack_size;
    }

    #[cfg(test)]
    fn window_ack_size(&self) -> u32 {
        self.window_ack_size
    }

    #[cfg(test)]
    fn response_size(&self) -> u64 {
        self.response_size
    }

    #[cfg(test)]
    fn last_ack(&self) -> u64 {
        self.last_ack
    }

    /// Records the transport's running total of received bytes.  Returns the sequence number
    /// to acknowledge when the window has been filled.
    pub fn record(&mut self, total_bytes_received: u64) -> Option<u32> {
        let delta = total_bytes_received.saturating_sub(self.total_size);
        self.total_size = total_bytes_received;
        self.response_size += delta;

        if self.response_size >= RESET_THRESHOLD {
            self.response_size = 0;
            self.last_ack = 0;
        }

        if self.window_ack_size > 0 && self.response_size - self.last_ack >= self.window_ack_size as u64 {
            self.last_ack = self.response_size;
            debug!("Acknowledging {} received bytes", self.response_size);
            return Some(self.response_size as u32);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_acknowledgement_before_window_is_filled() {
        let mut window = AcknowledgementWindow::new(1000);

        assert_eq!(window.record(999), None);
        assert_eq!(window.response_size(), 999);
        assert_eq!(window.last_ack(), 0);
    }

    #[test]
    fn acknowledgement_sent_once_window_is_filled() {
        let mut window = AcknowledgementWindow::new(1000);

        assert_eq!(window.record(600), None);
        assert_eq!(window.record(1200), Some(1200));
        assert_eq!(window.last_ack(), 1200);
        assert_eq!(window.record(2100), None);
        assert_eq!(window.record(2200), Some(2200));
    }

    #[test]
    fn zero_window_never_acknowledges() {
        let mut window = AcknowledgementWindow::new(0);
        assert_eq!(window.record(10_000_000), None);
    }

    #[test]
    fn counters_reset_together_at_threshold() {
        let mut window = AcknowledgementWindow::new(1000);
        window.record(RESET_THRESHOLD - 10);
        assert!(window.last_ack() > 0);

        assert_eq!(window.record(RESET_THRESHOLD + 5), None);
        assert_eq!(window.response_size(), 0);
        assert_eq!(window.last_ack(), 0);

        assert_eq!(window.record(RESET_THRESHOLD + 1005), Some(1000));
    }

    #[test]
    fn response_never_falls_behind_last_ack() {
        let mut window = AcknowledgementWindow::new(333);
        let mut total = 0;
        for step in 1..500_u64 {
            total += step * 7;
            window.record(total);

            assert!(window.response_size() >= window.last_ack());
            assert!(window.response_size() - window.last_ack() < window.window_ack_size() as u64);
        }
    }
}
