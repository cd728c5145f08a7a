//! Run progress bar and a tracing writer that plays well with it.
//!
//! While a [`RunProgress`] is alive, log lines are printed above the bar
//! instead of being interleaved with its redraws.

use std::io::Write;
use std::sync::Mutex;

use domwatch_core::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

/// Bar currently on screen, if any.
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().ok().and_then(|guard| guard.clone())
}

fn set_active_bar(bar: Option<ProgressBar>) {
    if let Ok(mut guard) = ACTIVE_BAR.lock() {
        *guard = bar;
    }
}

/// Progress bar over the domains of one run.
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▓░"));
        }
        set_active_bar(Some(bar.clone()));
        Self { bar }
    }

    /// Callback for the inspector that advances this bar.
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        Box::new(move |completed, _total, domain| {
            bar.set_position(completed as u64);
            bar.set_message(domain.to_string());
        })
    }
}

impl Drop for RunProgress {
    fn drop(&mut self) {
        set_active_bar(None);
        self.bar.finish_and_clear();
    }
}

/// Line-buffered writer: complete lines go through the active bar, or
/// straight to stderr when there is none.
pub struct TracingWriter {
    buffer: Vec<u8>,
}

impl TracingWriter {
    fn emit(line: &str) -> std::io::Result<()> {
        match active_bar() {
            Some(bar) => {
                bar.println(line);
                Ok(())
            }
            None => writeln!(std::io::stderr(), "{}", line),
        }
    }
}

impl Write for TracingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            Self::emit(String::from_utf8_lossy(&line).trim_end_matches(['\r', '\n']))?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            let rest = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
            self.buffer.clear();
            if !rest.is_empty() {
                Self::emit(&rest)?;
            }
        }
        Ok(())
    }
}

impl Drop for TracingWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[derive(Debug, Default)]
pub struct TracingWriterFactory;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for TracingWriterFactory {
    type Writer = TracingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TracingWriter { buffer: Vec::new() }
    }
}
