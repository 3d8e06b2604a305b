//! Bridge session: the read-parse-dispatch loop and its lifecycle.
//!
//! A session owns an open transport and a dispatcher, and runs a single
//! synchronous loop: read one line (bounded by the transport's timeout),
//! parse it, dispatch it, repeat. The loop ends when cancellation is
//! requested, the device disconnects, or a read fails; in every case the
//! session releases all held input exactly once before reporting why it
//! stopped.
//!
//! The loop is deliberately blocking – serial reads are cheap and the
//! protocol is strictly sequential – so the composition root runs it on a
//! dedicated blocking thread and drives cancellation through a shared
//! [`AtomicBool`] flipped by the Ctrl-C handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hidbridge_core::parse_line;
use tracing::{debug, error, info, warn};

use crate::application::dispatch::CommandDispatcher;
use crate::application::transport::{LineRead, SerialTransport, TransportError};

/// Lifecycle of one bridge session.
///
/// `Disconnected → Connecting` happens in the composition root (discovery
/// plus port open); a session is only constructed once a transport exists,
/// so it starts at `Connecting` and walks forward from there. States never
/// move backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Transport is open; the loop has not started yet.
    Connecting,
    /// The read-parse-dispatch loop is active.
    Running,
    /// The loop has ended; held input is being released.
    ShuttingDown,
    /// Cleanup is complete. Terminal.
    Closed,
}

/// Why a session's run ended. Cancellation is the only clean stop; the
/// bridge never reconnects on its own, so disconnects and read failures are
/// terminal too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation flag was observed (Ctrl-C).
    Cancelled,
    /// The device went away (end-of-stream on the serial port).
    Disconnected,
    /// A read failed for some other reason.
    ReadError(String),
}

/// One connected bridge run: an open transport, a dispatcher, and a shared
/// cancellation flag.
pub struct BridgeSession {
    transport: Box<dyn SerialTransport>,
    dispatcher: CommandDispatcher,
    running: Arc<AtomicBool>,
    state: BridgeState,
}

impl BridgeSession {
    /// Wraps an already-open transport into a session.
    pub fn new(
        transport: Box<dyn SerialTransport>,
        dispatcher: CommandDispatcher,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            transport,
            dispatcher,
            running,
            state: BridgeState::Connecting,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Runs the loop to completion and returns why it stopped.
    ///
    /// Every exit path passes through cleanup: held keys are released in
    /// reverse hold order, then held mouse buttons, each best-effort. By the
    /// time this returns the session is [`BridgeState::Closed`].
    pub fn run(&mut self) -> StopReason {
        self.state = BridgeState::Running;
        info!("bridge running");

        let reason = self.read_loop();

        self.state = BridgeState::ShuttingDown;
        match &reason {
            StopReason::Cancelled => info!("shutdown requested, cleaning up"),
            StopReason::Disconnected => warn!("device disconnected, cleaning up"),
            StopReason::ReadError(e) => error!(error = %e, "read failed, cleaning up"),
        }
        self.dispatcher.release_everything();
        self.state = BridgeState::Closed;

        reason
    }

    fn read_loop(&mut self) -> StopReason {
        loop {
            // The flag is checked once per read tick, so cancellation is
            // observed within one read timeout at the latest.
            if !self.running.load(Ordering::SeqCst) {
                return StopReason::Cancelled;
            }

            match self.transport.read_line() {
                Ok(LineRead::Line(line)) => self.handle_line(&line),
                Ok(LineRead::TimedOut) => continue,
                Err(TransportError::Disconnected) => return StopReason::Disconnected,
                Err(e) => return StopReason::ReadError(e.to_string()),
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match parse_line(line) {
            Some(command) => self.dispatcher.dispatch(&command, self.transport.as_mut()),
            // The device's print-style debug output shares the serial link;
            // echo it at debug level and move on.
            None => debug!(output = %line, "device"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hidbridge_core::{KeySymbol, Modifier, MouseButtonSymbol};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::application::injector::{InjectionError, InputInjector};

    /// Minimal recording injector: logs one string per call.
    struct LoggingInjector {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl InputInjector for LoggingInjector {
        fn type_text(&mut self, text: &str) -> Result<(), InjectionError> {
            self.log.lock().unwrap().push(format!("type {text}"));
            Ok(())
        }
        fn press_key(&mut self, key: KeySymbol) -> Result<(), InjectionError> {
            self.log.lock().unwrap().push(format!("down {key:?}"));
            Ok(())
        }
        fn release_key(&mut self, key: KeySymbol) -> Result<(), InjectionError> {
            self.log.lock().unwrap().push(format!("up {key:?}"));
            Ok(())
        }
        fn click(&mut self, button: MouseButtonSymbol, count: u32) -> Result<(), InjectionError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("click {button:?} x{count}"));
            Ok(())
        }
        fn press_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError> {
            self.log.lock().unwrap().push(format!("btndown {button:?}"));
            Ok(())
        }
        fn release_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError> {
            self.log.lock().unwrap().push(format!("btnup {button:?}"));
            Ok(())
        }
        fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
            self.log.lock().unwrap().push(format!("move {dx},{dy}"));
            Ok(())
        }
        fn cursor_position(&mut self) -> Result<(i32, i32), InjectionError> {
            Ok((0, 0))
        }
        fn scroll(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
            self.log.lock().unwrap().push(format!("scroll {dx},{dy}"));
            Ok(())
        }
    }

    /// Transport that replays a script of read results and records writes.
    /// When the script runs out it reports a disconnect, ending the loop.
    struct ScriptedTransport {
        reads: VecDeque<Result<LineRead, TransportError>>,
        written: Arc<Mutex<Vec<Vec<u8>>>>,
        /// When set, cleared after the first read so a later loop iteration
        /// observes cancellation.
        cancel_after_first_read: Option<Arc<AtomicBool>>,
    }

    impl ScriptedTransport {
        fn new(lines: &[&str]) -> (Self, Arc<Mutex<Vec<Vec<u8>>>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            let transport = Self {
                reads: lines
                    .iter()
                    .map(|l| Ok(LineRead::Line(l.to_string())))
                    .collect(),
                written: Arc::clone(&written),
                cancel_after_first_read: None,
            };
            (transport, written)
        }
    }

    impl SerialTransport for ScriptedTransport {
        fn read_line(&mut self) -> Result<LineRead, TransportError> {
            if let Some(flag) = self.cancel_after_first_read.take() {
                flag.store(false, Ordering::SeqCst);
            }
            self.reads
                .pop_front()
                .unwrap_or(Err(TransportError::Disconnected))
        }
        fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.written.lock().unwrap().push(bytes.to_vec());
            Ok(())
        }
    }

    fn make_session(
        transport: ScriptedTransport,
        running: Arc<AtomicBool>,
    ) -> (BridgeSession, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let injector = LoggingInjector {
            log: Arc::clone(&log),
        };
        let dispatcher = CommandDispatcher::new(Box::new(injector));
        let session = BridgeSession::new(Box::new(transport), dispatcher, running);
        (session, log)
    }

    #[test]
    fn test_run_dispatches_lines_until_disconnect() {
        // Arrange
        let (transport, _) = ScriptedTransport::new(&[
            "HID:KEY:TYPE:Hi",
            "HID:MOUSE:CLICK:LEFT",
        ]);
        let running = Arc::new(AtomicBool::new(true));
        let (mut session, log) = make_session(transport, running);
        assert_eq!(session.state(), BridgeState::Connecting);

        // Act
        let reason = session.run();

        // Assert
        assert_eq!(reason, StopReason::Disconnected);
        assert_eq!(session.state(), BridgeState::Closed);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["type Hi".to_string(), "click Left x1".to_string()]
        );
    }

    #[test]
    fn test_cancellation_stops_before_any_read() {
        let (transport, _) = ScriptedTransport::new(&["HID:KEY:TYPE:never"]);
        let running = Arc::new(AtomicBool::new(false));
        let (mut session, log) = make_session(transport, running);

        let reason = session.run();

        assert_eq!(reason, StopReason::Cancelled);
        assert_eq!(session.state(), BridgeState::Closed);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancellation_observed_after_timeout_tick() {
        // Arrange – first read times out and flips the flag; the next
        // loop-top check must observe it.
        let running = Arc::new(AtomicBool::new(true));
        let (mut transport, _) = ScriptedTransport::new(&[]);
        transport.reads.push_back(Ok(LineRead::TimedOut));
        transport.cancel_after_first_read = Some(Arc::clone(&running));
        let (mut session, _) = make_session(transport, running);

        // Act
        let reason = session.run();

        // Assert
        assert_eq!(reason, StopReason::Cancelled);
    }

    #[test]
    fn test_non_protocol_lines_and_blanks_are_ignored() {
        let (transport, _) = ScriptedTransport::new(&[
            "booting...",
            "   ",
            "hid:key:type:wrong-case-prefix",
            "HID:KEY:TYPE:real",
        ]);
        let running = Arc::new(AtomicBool::new(true));
        let (mut session, log) = make_session(transport, running);

        session.run();

        // Only the well-formed command reached the injector.
        assert_eq!(*log.lock().unwrap(), vec!["type real".to_string()]);
    }

    #[test]
    fn test_timeouts_keep_the_loop_alive() {
        let running = Arc::new(AtomicBool::new(true));
        let (mut transport, _) = ScriptedTransport::new(&[]);
        transport.reads.push_back(Ok(LineRead::TimedOut));
        transport.reads.push_back(Ok(LineRead::TimedOut));
        transport
            .reads
            .push_back(Ok(LineRead::Line("HID:KEY:TYPE:after".to_string())));
        let (mut session, log) = make_session(transport, running);

        session.run();

        assert_eq!(*log.lock().unwrap(), vec!["type after".to_string()]);
    }

    #[test]
    fn test_ping_line_produces_pong_write() {
        let (transport, written) = ScriptedTransport::new(&["HID:SYSTEM:PING"]);
        let running = Arc::new(AtomicBool::new(true));
        let (mut session, _) = make_session(transport, running);

        session.run();

        assert_eq!(*written.lock().unwrap(), vec![b"HID:PONG\n".to_vec()]);
    }

    #[test]
    fn test_held_input_is_released_on_disconnect() {
        // Arrange – a hold lands right before the device vanishes.
        let (transport, _) = ScriptedTransport::new(&[
            "HID:KEY:HOLD:CTRL",
            "HID:MOUSE:HOLD:LEFT",
        ]);
        let running = Arc::new(AtomicBool::new(true));
        let (mut session, log) = make_session(transport, running);

        // Act
        let reason = session.run();

        // Assert – cleanup released the key and the button on the way out.
        assert_eq!(reason, StopReason::Disconnected);
        let ctrl = KeySymbol::Modifier(Modifier::Ctrl);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                format!("down {ctrl:?}"),
                format!("btndown {:?}", MouseButtonSymbol::Left),
                format!("up {ctrl:?}"),
                format!("btnup {:?}", MouseButtonSymbol::Left),
            ]
        );
    }

    #[test]
    fn test_read_error_is_terminal_and_still_cleans_up() {
        let running = Arc::new(AtomicBool::new(true));
        let (mut transport, _) = ScriptedTransport::new(&["HID:KEY:HOLD:SHIFT"]);
        transport.reads.push_back(Err(TransportError::Io(
            std::io::Error::new(std::io::ErrorKind::Other, "bus fault"),
        )));
        let (mut session, log) = make_session(transport, running);

        let reason = session.run();

        assert!(matches!(reason, StopReason::ReadError(_)));
        assert_eq!(session.state(), BridgeState::Closed);
        let shift = KeySymbol::Modifier(Modifier::Shift);
        assert!(log
            .lock()
            .unwrap()
            .contains(&format!("up {shift:?}")));
    }
}
