//! Candidate selection: which listed paths a driver should look at.
//!
//! Matching is by extension first. Drivers that opt into sniffing also ask a
//! [`Sniffer`] about files with no extension, so executable scripts such as
//! `bin/tool` with a python shebang are still picked up.

use crate::models::{Candidate, LinterKind};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Content-based file type detection.
pub trait Sniffer {
    fn classify(&self, path: &Path) -> Option<LinterKind>;
}

/// Reads the `#!` line and maps the interpreter to a kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShebangSniffer;

impl Sniffer for ShebangSniffer {
    fn classify(&self, path: &Path) -> Option<LinterKind> {
        let file = File::open(path).ok()?;
        let mut first = Vec::new();
        BufReader::new(file)
            .take(256)
            .read_until(b'\n', &mut first)
            .ok()?;
        kind_from_shebang(&String::from_utf8_lossy(&first))
    }
}

/// Interpreter from a shebang line, honoring `/usr/bin/env [-S] <interp>`.
pub fn kind_from_shebang(line: &str) -> Option<LinterKind> {
    let rest = line.strip_prefix("#!")?.trim();
    let mut words = rest.split_whitespace();
    let mut prog = words.next()?;
    if prog.rsplit('/').next() == Some("env") {
        prog = words.find(|w| !w.starts_with('-'))?;
    }
    let name = prog.rsplit('/').next().unwrap_or(prog);
    if name.starts_with("python") {
        Some(LinterKind::Python)
    } else if matches!(name, "sh" | "bash" | "dash" | "ksh") {
        Some(LinterKind::Shell)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
/// Relevance predicate for one driver.
pub struct Matcher {
    pub kind: LinterKind,
    /// Anchored pattern tested against the extension (without the dot).
    pub extension: Regex,
    /// Consult the sniffer for files without an extension.
    pub sniff: bool,
}

impl Matcher {
    pub fn new(kind: LinterKind, extension: &str, sniff: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            extension: Regex::new(extension)?,
            sniff,
        })
    }

    /// Build an anchored extension pattern from a list such as `["sh", "bash"]`.
    pub fn from_extensions(
        kind: LinterKind,
        exts: &[String],
        sniff: bool,
    ) -> Result<Self, regex::Error> {
        let alts: Vec<String> = exts
            .iter()
            .map(|e| regex::escape(e.trim_start_matches('.')))
            .collect();
        Self::new(kind, &format!("^(?:{})$", alts.join("|")), sniff)
    }

    /// Extension match first; any other file is sniffed when enabled.
    pub fn matches(&self, path: &Path, sniffer: &dyn Sniffer) -> bool {
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extension.is_match(ext));
        by_extension || (self.sniff && sniffer.classify(path) == Some(self.kind))
    }

    /// Filter a path stream down to this matcher's candidates, in input order.
    pub fn select<I, P>(&self, paths: I, sniffer: &dyn Sniffer) -> Vec<Candidate>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .filter(|p| self.matches(p.as_ref(), sniffer))
            .map(|p| Candidate::new(p.as_ref(), self.kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Fixed(Option<LinterKind>);

    impl Sniffer for Fixed {
        fn classify(&self, _path: &Path) -> Option<LinterKind> {
            self.0
        }
    }

    #[test]
    fn test_yaml_wildcard_extension() {
        let m = Matcher::new(LinterKind::Yaml, r"^y.*ml$", false).unwrap();
        let none = Fixed(None);
        assert!(m.matches(Path::new("ci/a.yml"), &none));
        assert!(m.matches(Path::new("b.yaml"), &none));
        assert!(!m.matches(Path::new("c.toml"), &none));
        assert!(!m.matches(Path::new("Makefile"), &none));
    }

    #[test]
    fn test_sniffing_covers_files_without_expected_extension() {
        let m = Matcher::from_extensions(LinterKind::Python, &["py".into()], true).unwrap();
        let py = Fixed(Some(LinterKind::Python));
        assert!(m.matches(Path::new("bin/tool"), &py));
        assert!(m.matches(Path::new("cgi/deploy.cgi"), &py));
        assert!(m.matches(Path::new("run-1.0"), &py));
        assert!(!m.matches(Path::new("bin/tool.txt"), &Fixed(None)));
        assert!(!m.matches(Path::new("bin/tool"), &Fixed(Some(LinterKind::Shell))));
        assert!(m.matches(Path::new("a.py"), &Fixed(None)));
    }

    #[test]
    fn test_no_sniffing_when_disabled() {
        let m = Matcher::from_extensions(LinterKind::Shell, &["sh".into()], false).unwrap();
        assert!(!m.matches(Path::new("deploy.cgi"), &Fixed(Some(LinterKind::Shell))));
    }

    #[test]
    fn test_select_preserves_input_order() {
        let m = Matcher::from_extensions(LinterKind::Shell, &[".sh".into(), "bash".into()], false)
            .unwrap();
        let paths = vec![
            PathBuf::from("z.sh"),
            PathBuf::from("a.py"),
            PathBuf::from("m.bash"),
        ];
        let got: Vec<_> = m
            .select(&paths, &Fixed(None))
            .into_iter()
            .map(|c| c.path)
            .collect();
        assert_eq!(got, vec![PathBuf::from("z.sh"), PathBuf::from("m.bash")]);
    }

    #[test]
    fn test_shebang_parsing() {
        assert_eq!(kind_from_shebang("#!/usr/bin/env python3\n"), Some(LinterKind::Python));
        assert_eq!(kind_from_shebang("#!/usr/bin/env -S python3 -u"), Some(LinterKind::Python));
        assert_eq!(kind_from_shebang("#!/bin/bash -e"), Some(LinterKind::Shell));
        assert_eq!(kind_from_shebang("#!/usr/bin/perl"), None);
        assert_eq!(kind_from_shebang("import os"), None);
    }

    #[test]
    fn test_shebang_sniffer_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tool");
        std::fs::write(&p, "#!/usr/bin/python\nprint(1)\n").unwrap();
        assert_eq!(ShebangSniffer.classify(&p), Some(LinterKind::Python));
        assert_eq!(ShebangSniffer.classify(&dir.path().join("gone")), None);
    }
}
