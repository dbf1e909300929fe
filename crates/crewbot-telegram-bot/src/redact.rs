//! Log writer that masks secrets before they reach stderr.

use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;

/// Regex patterns for redacting sensitive data
pub struct RedactionPatterns {
    bot_url: Regex,
    bot_token: Regex,
    query_keys: Regex,
    bearer: Regex,
}

impl RedactionPatterns {
    /// Compile all patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bot_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)")?,
            bot_token: Regex::new(r"\b[0-9]{8,10}:[A-Za-z0-9_-]{35}\b")?,
            // OpenWeather `appid` and SerpApi `api_key` travel in query strings
            query_keys: Regex::new(r"\b(appid|api_key)=[^\s&]+")?,
            bearer: Regex::new(r"(Bearer\s+)[A-Za-z0-9._~+/=-]+")?,
        })
    }

    /// Mask every secret in `input`
    pub fn redact(&self, input: &str) -> String {
        let output = self.bot_url.replace_all(input, "${1}[TELEGRAM_TOKEN]");
        let output = self.bot_token.replace_all(&output, "[TELEGRAM_TOKEN]");
        let output = self.query_keys.replace_all(&output, "${1}=[MASKED]");
        self.bearer
            .replace_all(&output, "${1}[MASKED]")
            .into_owned()
    }
}

/// Writer passing redacted text to `inner`
pub struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length even though the redacted text may differ
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `MakeWriter` wrapping each writer from `make_inner` in a [`RedactingWriter`]
pub struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    /// Wrap the writers produced by `make_inner`
    pub const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), Arc::clone(&self.patterns))
    }
}
