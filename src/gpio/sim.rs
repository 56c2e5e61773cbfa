//! In-process GPIO provider.
//!
//! Stands in for the emulator's external events generator: any thread can
//! drive a line with [`SimulatedGpio::set_value`] or [`SimulatedGpio::toggle`],
//! and the installed listener runs synchronously on that thread, the same way
//! a driver thread would deliver it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::{DashMap, DashSet};

use super::{GpioError, InputPin, PinConfig, PinEvent, PinLine, PinListener, PinProvider, Trigger};

/// Shared state of one simulated line.
struct SimLine {
    value: AtomicBool,
    open: AtomicBool,
    opens: AtomicUsize,
    closes: AtomicUsize,
    trigger: Mutex<Trigger>,
    listener: Mutex<Option<Arc<dyn PinListener>>>,
}

impl SimLine {
    fn new() -> Self {
        Self {
            value: AtomicBool::new(false),
            open: AtomicBool::new(false),
            opens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            trigger: Mutex::new(Trigger::BothEdges),
            listener: Mutex::new(None),
        }
    }

    fn release(&self) {
        self.listener
            .lock()
            .expect("sim line listener mutex poisoned")
            .take();
        self.open.store(false, Ordering::SeqCst);
    }
}

/// Simulated GPIO controller bank.
///
/// Cloning yields another handle onto the same lines.
#[derive(Clone, Default)]
pub struct SimulatedGpio {
    lines: Arc<DashMap<PinLine, Arc<SimLine>>>,
    failing: Arc<DashSet<PinLine>>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&self, line: PinLine) -> Arc<SimLine> {
        self.lines
            .entry(line)
            .or_insert_with(|| Arc::new(SimLine::new()))
            .value()
            .clone()
    }

    /// Make every future `open` of `line` fail.
    pub fn fail_open(&self, line: PinLine) {
        self.failing.insert(line);
    }

    /// Drive a line to `value`.
    ///
    /// Returns `true` if the transition was delivered to a listener.
    pub fn set_value(&self, line: PinLine, value: bool) -> bool {
        let sim = self.line(line);
        let old = sim.value.swap(value, Ordering::SeqCst);

        if !sim.open.load(Ordering::SeqCst) {
            return false;
        }
        let trigger = *sim.trigger.lock().expect("sim line trigger mutex poisoned");
        if !trigger.fires(old, value) {
            return false;
        }

        // Clone out so the listener runs without holding the lock.
        let listener = sim
            .listener
            .lock()
            .expect("sim line listener mutex poisoned")
            .clone();
        match listener {
            Some(listener) => {
                listener.value_changed(PinEvent { value });
                true
            }
            None => false,
        }
    }

    /// Flip a line's level.
    pub fn toggle(&self, line: PinLine) -> bool {
        let current = self.value(line);
        self.set_value(line, !current)
    }

    /// Current logical level of a line.
    pub fn value(&self, line: PinLine) -> bool {
        self.line(line).value.load(Ordering::SeqCst)
    }

    /// Whether a handle currently holds the line.
    pub fn is_open(&self, line: PinLine) -> bool {
        self.lines
            .get(&line)
            .map(|sim| sim.open.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Number of successful `open` calls on a line.
    pub fn open_count(&self, line: PinLine) -> usize {
        self.lines
            .get(&line)
            .map(|sim| sim.opens.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of explicit `close` calls that released the line.
    pub fn close_count(&self, line: PinLine) -> usize {
        self.lines
            .get(&line)
            .map(|sim| sim.closes.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

impl PinProvider for SimulatedGpio {
    fn open(&self, config: &PinConfig) -> Result<Box<dyn InputPin>, GpioError> {
        let line = config.line;
        if self.failing.contains(&line) {
            return Err(GpioError::Unavailable {
                line,
                reason: "injected failure".to_string(),
            });
        }

        let sim = self.line(line);
        if sim.open.swap(true, Ordering::SeqCst) {
            return Err(GpioError::Busy(line));
        }
        sim.value.store(config.initial_value, Ordering::SeqCst);
        *sim.trigger.lock().expect("sim line trigger mutex poisoned") = config.trigger;
        sim.opens.fetch_add(1, Ordering::SeqCst);

        tracing::trace!(line = %line, "Simulated pin opened");

        Ok(Box::new(SimulatedPin {
            line,
            sim,
            closed: false,
        }))
    }
}

/// Handle onto a simulated line.
pub struct SimulatedPin {
    line: PinLine,
    sim: Arc<SimLine>,
    closed: bool,
}

impl InputPin for SimulatedPin {
    fn line(&self) -> PinLine {
        self.line
    }

    fn set_listener(&mut self, listener: Arc<dyn PinListener>) -> Result<(), GpioError> {
        if self.closed {
            return Err(GpioError::Closed(self.line));
        }
        *self
            .sim
            .listener
            .lock()
            .expect("sim line listener mutex poisoned") = Some(listener);
        Ok(())
    }

    fn close(&mut self) -> Result<(), GpioError> {
        if self.closed {
            return Err(GpioError::Closed(self.line));
        }
        self.closed = true;
        self.sim.release();
        self.sim.closes.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(line = %self.line, "Simulated pin closed");
        Ok(())
    }
}

impl Drop for SimulatedPin {
    fn drop(&mut self) {
        if !self.closed {
            self.sim.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Mutex<Vec<bool>>);

    impl PinListener for Recorder {
        fn value_changed(&self, event: PinEvent) {
            self.0.lock().unwrap().push(event.value);
        }
    }

    #[test]
    fn both_edges_notify() {
        let gpio = SimulatedGpio::new();
        let line = PinLine::new(0, 0);
        let mut pin = gpio.open(&PinConfig::button(line)).unwrap();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        pin.set_listener(recorder.clone()).unwrap();

        assert!(gpio.toggle(line));
        assert!(gpio.toggle(line));
        assert!(!gpio.set_value(line, false));

        assert_eq!(*recorder.0.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn line_cannot_be_opened_twice() {
        let gpio = SimulatedGpio::new();
        let config = PinConfig::button(PinLine::new(2, 13));
        let mut first = gpio.open(&config).unwrap();

        assert!(matches!(gpio.open(&config), Err(GpioError::Busy(_))));

        first.close().unwrap();
        assert!(gpio.open(&config).is_ok());
    }

    #[test]
    fn double_close_is_an_error() {
        let gpio = SimulatedGpio::new();
        let line = PinLine::new(6, 15);
        let mut pin = gpio.open(&PinConfig::button(line)).unwrap();

        pin.close().unwrap();
        assert!(matches!(pin.close(), Err(GpioError::Closed(_))));
        assert_eq!(gpio.close_count(line), 1);
        assert!(!gpio.is_open(line));
    }

    #[test]
    fn closed_line_stops_notifying() {
        let gpio = SimulatedGpio::new();
        let line = PinLine::new(0, 0);
        let mut pin = gpio.open(&PinConfig::button(line)).unwrap();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        pin.set_listener(recorder.clone()).unwrap();
        pin.close().unwrap();

        assert!(!gpio.toggle(line));
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn injected_failure() {
        let gpio = SimulatedGpio::new();
        let line = PinLine::new(2, 13);
        gpio.fail_open(line);

        assert!(matches!(
            gpio.open(&PinConfig::button(line)),
            Err(GpioError::Unavailable { .. })
        ));
        assert_eq!(gpio.open_count(line), 0);
    }

    #[test]
    fn dropped_handle_releases_line() {
        let gpio = SimulatedGpio::new();
        let line = PinLine::new(0, 0);
        let pin = gpio.open(&PinConfig::button(line)).unwrap();
        assert!(gpio.is_open(line));
        drop(pin);
        assert!(!gpio.is_open(line));
        assert_eq!(gpio.close_count(line), 0);
    }
}
