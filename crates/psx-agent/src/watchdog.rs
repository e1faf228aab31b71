//! Out-of-band deadline and shutdown-signal handling.
//!
//! The watchdog runs beside the agent on the tokio runtime:
//! - on SIGINT/SIGTERM it reports a log line and exits the process with status 1;
//! - when the deadline passes it reports a timeout line and sends SIGTERM to its own
//!   process, which then goes through the signal path above.
//!
//! No FAILED status is reported on either path and in-flight uploads are abandoned.
use std::io;
use std::sync::Arc;
use std::time::Duration;

use psx_platform::Platform;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Exit status used when a signal or the deadline ends the run.
pub const EXIT_CODE: i32 = 1;

/// External termination request observed by the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl ShutdownSignal {
    /// Same wording as `strsignal(3)` on Linux.
    pub fn description(&self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "Interrupt",
            ShutdownSignal::Terminate => "Terminated",
        }
    }
}

/// Process-level termination primitives.
pub trait Terminator: Send + Sync + 'static {
    /// Ask the OS to deliver a termination request to this process.
    fn request_termination(&self) -> io::Result<()>;

    /// Leave the process immediately.
    fn exit(&self, code: i32);
}

/// [`Terminator`] acting on the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    #[cfg(unix)]
    fn request_termination(&self) -> io::Result<()> {
        let rc = unsafe { libc::kill(libc::getpid(), libc::SIGTERM) };
        if rc != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    #[cfg(not(unix))]
    fn request_termination(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "self-termination by signal is only available on unix",
        ))
    }

    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

pub struct Watchdog {
    reporter: Arc<dyn Platform>,
    timeout: Duration,
    terminator: Arc<dyn Terminator>,
}

impl Watchdog {
    pub fn new(reporter: Arc<dyn Platform>, timeout: Duration) -> Self {
        Self {
            reporter,
            timeout,
            terminator: Arc::new(ProcessTerminator),
        }
    }

    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    /// Install the OS signal handlers and start the countdown.
    ///
    /// Must be called from within a tokio runtime. Handlers are in place when this
    /// returns, so a SIGTERM raised by the deadline is always observed.
    pub fn arm(self) -> io::Result<JoinHandle<()>> {
        let signals = os_signals()?;
        debug!("shutdown signal handlers set for SIGINT and SIGTERM");
        Ok(self.spawn(signals))
    }

    /// Start the countdown with an explicit signal source.
    pub fn spawn(self, signals: mpsc::Receiver<ShutdownSignal>) -> JoinHandle<()> {
        debug!(timeout_secs = self.timeout.as_secs(), "watchdog armed");
        tokio::spawn(self.watch(signals))
    }

    async fn watch(self, mut signals: mpsc::Receiver<ShutdownSignal>) {
        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        let mut expired = false;
        let mut listening = true;

        loop {
            tokio::select! {
                _ = &mut deadline, if !expired => {
                    expired = true;
                    self.on_deadline().await;
                    if let Err(e) = self.terminator.request_termination() {
                        warn!(error = %e, "failed to raise SIGTERM; exiting directly");
                        self.terminator.exit(EXIT_CODE);
                        return;
                    }
                }
                received = signals.recv(), if listening => match received {
                    Some(signal) => {
                        self.on_signal(signal).await;
                        self.terminator.exit(EXIT_CODE);
                        return;
                    }
                    None => listening = false,
                },
                else => return,
            }
        }
    }

    async fn on_deadline(&self) {
        let message = format!(
            "Execution timed out after {} seconds.",
            self.timeout.as_secs()
        );
        self.report(&message).await;
    }

    async fn on_signal(&self, signal: ShutdownSignal) {
        let message = format!(
            "Received shutdown signal: '{}'. Exiting.",
            signal.description()
        );
        self.report(&message).await;
    }

    async fn report(&self, message: &str) {
        if let Err(e) = self.reporter.report_log(message).await {
            error!(error = %e, "failed to report watchdog event");
        }
    }
}

#[cfg(unix)]
fn os_signals() -> io::Result<mpsc::Receiver<ShutdownSignal>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => ShutdownSignal::Interrupt,
                Some(()) = terminate.recv() => ShutdownSignal::Terminate,
                else => break,
            };
            if tx.send(received).await.is_err() {
                break;
            }
        }
    });
    Ok(rx)
}

#[cfg(not(unix))]
fn os_signals() -> io::Result<mpsc::Receiver<ShutdownSignal>> {
    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(ShutdownSignal::Interrupt).await.is_err() {
                break;
            }
        }
    });
    Ok(rx)
}
