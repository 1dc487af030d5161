use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Latest-wins debouncer: every push replaces the pending value, which is
/// released only after a full quiescence window with no newer push. Values
/// are never queued; intermediate ones are dropped.
pub struct Debouncer<T: Send + 'static> {
    input: mpsc::Sender<T>,
    ready: mpsc::Receiver<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        let (input, feed) = mpsc::channel::<T>();
        let (settled, ready) = mpsc::channel::<T>();

        thread::spawn(move || {
            let mut pending: Option<T> = None;
            loop {
                if pending.is_none() {
                    match feed.recv() {
                        Ok(value) => pending = Some(value),
                        Err(_) => break,
                    }
                    continue;
                }
                match feed.recv_timeout(window) {
                    Ok(value) => pending = Some(value),
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if let Some(value) = pending.take() {
                            if settled.send(value).is_err() {
                                break;
                            }
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        // Flush the last value on shutdown rather than losing it.
                        if let Some(value) = pending.take() {
                            let _ = settled.send(value);
                        }
                        break;
                    }
                }
            }
        });

        Debouncer { input, ready }
    }

    /// Replace the pending value and restart the quiescence window.
    pub fn push(&self, value: T) {
        let _ = self.input.send(value);
    }

    /// Latest settled value, if any. Drains intermediate settled values so
    /// only the newest survives.
    pub fn poll(&self) -> Option<T> {
        let mut latest = None;
        while let Ok(value) = self.ready.try_recv() {
            latest = Some(value);
        }
        latest
    }

    /// Block up to `timeout` for the next settled value.
    pub fn wait_settled(&self, timeout: Duration) -> Option<T> {
        self.ready.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_pushes_settle_to_the_last_value() {
        let debouncer = Debouncer::new(Duration::from_millis(30));
        debouncer.push("a");
        debouncer.push("ab");
        debouncer.push("abc");
        assert_eq!(
            debouncer.wait_settled(Duration::from_secs(1)),
            Some("abc")
        );
        // Nothing else was queued behind it.
        assert_eq!(debouncer.poll(), None);
    }

    #[test]
    fn each_quiescent_push_settles_separately() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.push(1);
        assert_eq!(debouncer.wait_settled(Duration::from_secs(1)), Some(1));
        debouncer.push(2);
        assert_eq!(debouncer.wait_settled(Duration::from_secs(1)), Some(2));
    }

    #[test]
    fn poll_without_pushes_is_empty() {
        let debouncer: Debouncer<String> = Debouncer::new(Duration::from_millis(10));
        assert_eq!(debouncer.poll(), None);
    }
}
