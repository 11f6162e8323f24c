use super::{format_line, AuditSink, SinkError};
use async_trait::async_trait;
use clicktrail_audit_types::ReceivedRecord;
use parking_lot::Mutex;
use std::io::Write;

/// Writes one line per record, optionally followed by the record as
/// indented JSON.
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    pretty: bool,
}

impl ConsoleSink {
    /// Console sink on standard output.
    pub fn stdout(pretty: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), pretty)
    }

    pub fn new(writer: Box<dyn Write + Send>, pretty: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty,
        }
    }
}

#[async_trait]
impl AuditSink for ConsoleSink {
    async fn write(&self, record: &ReceivedRecord) -> Result<(), SinkError> {
        let line = format_line(record);
        let json = if self.pretty {
            Some(serde_json::to_string_pretty(record)?)
        } else {
            None
        };

        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")?;
        if let Some(json) = json {
            writeln!(writer, "{json}")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clicktrail_audit_types::{AuditRecord, ClickData};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn record() -> ReceivedRecord {
        ReceivedRecord::receive(AuditRecord::new("u", "/", ClickData::default()))
    }

    #[tokio::test]
    async fn test_writes_one_line() {
        let buffer = SharedBuffer::default();
        let sink = ConsoleSink::new(Box::new(buffer.clone()), false);

        sink.write(&record()).await.unwrap();
        sink.write(&record()).await.unwrap();

        let contents = buffer.contents();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().all(|line| line.contains("[CLICK]")));
    }

    #[tokio::test]
    async fn test_pretty_appends_json() {
        let buffer = SharedBuffer::default();
        let sink = ConsoleSink::new(Box::new(buffer.clone()), true);

        sink.write(&record()).await.unwrap();

        let contents = buffer.contents();
        assert!(contents.contains("\"serverTimestamp\""));
        assert!(contents.contains("\"eventType\": \"click\""));
    }
}
