use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Sink for already formatted lines. Lines carry their own trailing newline.
///
/// Write failures are dropped: a broken sink must never make a logging call fail.
pub trait LogWriter {
    fn write_line(&mut self, line: &str);
    fn flush(&mut self);
}

pub struct LogFile {
    file: BufWriter<File>,
}

impl LogFile {
    /// Opens `path` for appending, creating it if missing.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let file = File::options().create(true).append(true).open(&path)?;
        Ok(Self {
            file: BufWriter::new(file),
        })
    }
}

impl LogWriter for LogFile {
    fn write_line(&mut self, line: &str) {
        let _ = self.file.write_all(line.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.file.flush();
    }
}

#[derive(Default, Debug)]
pub struct LogStdout;

impl LogWriter for LogStdout {
    fn write_line(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(line.as_bytes());
        let _ = stdout.flush();
    }

    fn flush(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

#[derive(Default, Debug)]
pub struct LogStderr;

impl LogWriter for LogStderr {
    fn write_line(&mut self, line: &str) {
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&mut self) {
        let _ = std::io::stderr().flush();
    }
}

#[test]
fn test_log_file() {
    std::fs::remove_file("/tmp/catlog_test_log_file.log").ok();
    let mut log_file = LogFile::new("/tmp/catlog_test_log_file.log").unwrap();
    log_file.write_line("Hello, world!\n");
    log_file.write_line("rust is awesome !\n");
    log_file.flush();
    drop(log_file);

    let mut log_file = LogFile::new("/tmp/catlog_test_log_file.log").unwrap();
    log_file.write_line("appended\n");
    log_file.flush();
    assert_eq!(
        std::fs::read_to_string("/tmp/catlog_test_log_file.log").unwrap(),
        "Hello, world!\nrust is awesome !\nappended\n"
    );
}

#[test]
fn test_log_stdout() {
    let mut log_stdout = LogStdout;
    log_stdout.write_line("Hello, world!\n");
    log_stdout.flush();
    let mut log_stderr = LogStderr;
    log_stderr.write_line("Hello, stderr!\n");
    log_stderr.flush();
}
