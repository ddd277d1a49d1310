use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub enum AppEvent {
    /// One line typed by the user, without the trailing newline.
    Line(String),
    Tick,
    /// Input stream closed.
    Eof,
}

/// Merges stdin lines and clock ticks into one event stream.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self::with_reader(std::io::BufReader::new(std::io::stdin()), tick_rate)
    }

    pub fn with_reader<R: BufRead + Send + 'static>(reader: R, tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        let input_tx = tx.clone();
        thread::spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if input_tx.send(AppEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(AppEvent::Eof);
        });

        thread::spawn(move || {
            loop {
                thread::sleep(tick_rate);
                if tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
