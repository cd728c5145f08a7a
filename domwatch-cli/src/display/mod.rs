mod progress;

pub use progress::{RunProgress, TracingWriterFactory};
