use env_logger::fmt::{style, Formatter};
use log::{LevelFilter, Record};
use std::fmt::Display;
use std::future::Future;
use std::io;
use std::io::Write;

/// Number of client id characters shown in log lines.
const CLIENT_TAG_LEN: usize = 8;

pub fn initialize_log() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(move |buf, record| {
            let fmt = CustomFormat {
                written_header_value: false,
                buf,
            };

            fmt.write(record)
        })
        .init();
}

tokio::task_local! {
    static CLIENT_LOG_TAG: String;
}

/// Runs the future with every log line it emits tagged with the client.
pub async fn with_client_tag<F>(client_id: &str, future: F) -> F::Output
where
    F: Future,
{
    let tag: String = client_id.chars().take(CLIENT_TAG_LEN).collect();

    CLIENT_LOG_TAG.scope(format!("client-{tag}"), future).await
}

struct CustomFormat<'a> {
    written_header_value: bool,
    buf: &'a mut Formatter,
}

// Based on Env Logger DefaultFormat
impl CustomFormat<'_> {
    fn write(mut self, record: &Record<'_>) -> io::Result<()> {
        self.write_timestamp()?;
        self.write_level(record)?;
        self.write_target(record)?;
        self.write_client()?;
        self.finish_header()?;

        self.write_args(record)?;
        writeln!(self.buf)
    }

    fn write_header_value<T>(&mut self, value: T) -> io::Result<()>
    where
        T: Display,
    {
        if !self.written_header_value {
            self.written_header_value = true;
            let style = style::AnsiColor::BrightBlack.on_default();
            write!(self.buf, "{style}[{style:#}{value}")
        } else {
            write!(self.buf, " {value}")
        }
    }

    fn write_level(&mut self, record: &Record<'_>) -> io::Result<()> {
        let level = record.level();
        let level_style = self.buf.default_level_style(level);

        self.write_header_value(format_args!("{level_style}{level:<5}{level_style:#}"))
    }

    fn write_timestamp(&mut self) -> io::Result<()> {
        self.write_header_value(self.buf.timestamp_millis())
    }

    fn write_target(&mut self, record: &Record<'_>) -> io::Result<()> {
        match record.target() {
            "" => Ok(()),
            target => self.write_header_value(target),
        }
    }

    // Outside of a request there is no client to tag.
    fn write_client(&mut self) -> io::Result<()> {
        match CLIENT_LOG_TAG.try_with(String::clone) {
            Ok(tag) => self.write_header_value(tag),
            Err(_) => Ok(()),
        }
    }

    fn finish_header(&mut self) -> io::Result<()> {
        if self.written_header_value {
            let style = style::AnsiColor::BrightBlack.on_default();
            write!(self.buf, "{style}]{style:#} ")
        } else {
            Ok(())
        }
    }

    fn write_args(&mut self, record: &Record<'_>) -> io::Result<()> {
        write!(self.buf, "{}", record.args())
    }
}
