//! Directive scanning over a file's leading comment block.
//!
//! Only the header is inspected: scanning stops at the first empty line or
//! the first comment line that carries nothing but `#` and whitespace.
//! Anything below that point never enables a check.

use crate::error::{Error, Result};
use crate::models::Directive;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone)]
/// Patterns that opt a file into one linter.
pub struct DirectiveRule {
    pub enable: Regex,
    /// Captures inline tool options in group 1. A match alone also enables.
    pub options: Option<Regex>,
}

impl DirectiveRule {
    pub fn new(enable: &str, options: Option<&str>) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            enable: Regex::new(enable)?,
            options: options.map(Regex::new).transpose()?,
        })
    }

    /// Classify already-loaded text.
    pub fn scan_str(&self, text: &str) -> Directive {
        let mut state = Scan::default();
        for line in text.lines() {
            if !state.feed(self, line) {
                break;
            }
        }
        state.finish()
    }

    /// Classify a reader, consuming only the header lines.
    pub fn scan_reader<R: BufRead>(&self, mut reader: R) -> std::io::Result<Directive> {
        let mut state = Scan::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if !state.feed(self, &line) {
                break;
            }
        }
        Ok(state.finish())
    }

    pub fn scan_file(&self, path: &Path) -> Result<Directive> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        self.scan_reader(BufReader::new(file))
            .map_err(|e| Error::io(path, e))
    }
}

#[derive(Default)]
struct Scan {
    enabled: bool,
    options: Vec<String>,
}

impl Scan {
    /// Returns false once scanning must stop.
    fn feed(&mut self, rule: &DirectiveRule, raw: &str) -> bool {
        let line = raw.trim_end_matches(['\n', '\r']);
        if is_header_end(line) {
            return false;
        }
        if rule.enable.is_match(line) {
            self.enabled = true;
            if rule.options.is_none() {
                return false;
            }
        }
        if let Some(re) = rule.options.as_ref() {
            if let Some(caps) = re.captures(line) {
                self.enabled = true;
                if let Some(m) = caps.get(1) {
                    self.options
                        .extend(m.as_str().split_whitespace().map(str::to_string));
                }
            }
        }
        true
    }

    fn finish(self) -> Directive {
        match (self.enabled, self.options.is_empty()) {
            (false, _) => Directive::Absent,
            (true, true) => Directive::Present,
            (true, false) => Directive::PresentWithOptions(self.options),
        }
    }
}

/// Blank line, or a comment with nothing after the `#`.
fn is_header_end(line: &str) -> bool {
    let t = line.trim();
    if t.is_empty() {
        return true;
    }
    match t.strip_prefix('#') {
        Some(rest) => rest.trim().is_empty(),
        None => false,
    }
}
