/// Minimal logger seam so the core stays free of host logging frameworks.
/// Implement this in the CLI and adapt it from the GUI shell.
pub trait CoreLog: Send + Sync {
    fn info(&self, msg: &str) {
        let _ = msg;
    }
    fn warn(&self, msg: &str) {
        let _ = msg;
    }
    fn error(&self, msg: &str) {
        let _ = msg;
    }
    fn debug(&self, msg: &str) {
        let _ = msg;
    }
}

/// No-op logger if you don't care about logs.
pub struct NoopLog;
impl CoreLog for NoopLog {}

/// Plain stderr/stdout logger used by the CLI; debug lines only when verbose.
pub struct StderrLog {
    pub verbose: bool,
}

impl CoreLog for StderrLog {
    fn info(&self, msg: &str) {
        println!("INFO:  {msg}");
    }
    fn warn(&self, msg: &str) {
        eprintln!("WARN:  {msg}");
    }
    fn error(&self, msg: &str) {
        eprintln!("ERROR: {msg}");
    }
    fn debug(&self, msg: &str) {
        if self.verbose {
            println!("DEBUG: {msg}");
        }
    }
}
