#![allow(dead_code)]

use csv_fetch::{FileProcessingService, ServiceConfig};
use httpmock::prelude::*;
use httpmock::Mock;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub const FILE_ID: &str = "fixture-file";
pub const FIXTURE_CSV: &str = include_str!("../fixtures/test_task_data.csv");
pub const FIXTURE_ROWS: usize = 5;

pub fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn service_for(server: &MockServer, names: &[&str]) -> FileProcessingService<ServiceConfig> {
    let config = ServiceConfig::new(FILE_ID, fields(names)).with_base_url(server.base_url());
    FileProcessingService::new(config)
}

pub fn serve_csv<'a>(server: &'a MockServer, body: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path("/uc").query_param("id", FILE_ID);
        then.status(200)
            .header("Content-Type", "text/csv; charset=utf-8")
            .body(body);
    })
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes log events on the current thread into a buffer until the guard drops.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
