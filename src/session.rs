//! # Interactive session
//!
//! A line-driven front-end over one [`AuthenticatorService`]: every input
//! line is one user action, handled to completion before the next line is
//! read. Commands:
//!
//! | Command | Action |
//! |---------|--------|
//! | `import <file>` | replace the list with the file's credentials |
//! | `list` | show the list and its count |
//! | `count` | show the count label and last import summary |
//! | `qr <row\|id>` | show the QR code of an entry |
//! | `secret <row\|id>` | reveal an entry's secret |
//! | `remove <row\|id>` | remove an entry |
//! | `new` | switch to manual entry |
//! | `manual <account> <issuer> <secret>` | QR code for a manual entry |
//! | `close` | close the open QR/secret view |
//! | `export <uris\|json>` | print the list in an export format |
//! | `help` | show this table |
//! | `quit` | end the session |
//!
//! Arguments containing spaces are quoted (`import "my tokens.txt"`).
//! A failing command prints `error: …` and the session carries on.

use std::io::{BufRead, Write};
use std::path::Path;

use otpbridge_otp::otp::export::export as export_list;
use otpbridge_otp::otp::reader::FileReader;
use otpbridge_otp::otp::{AuthenticatorService, ExportFormat, ManualEntry, OtpError};

use crate::commands::{print_list, show_modal, write_skipped};
use crate::config::AppConfig;
use crate::error::{AppError, Result};

const HELP: &str = "\
commands:
  import <file>                 replace the list with a file's otpauth:// lines
  list                          show the list
  count                         show the number of entries and the last import
  qr <row|id>                   show the QR code of an entry
  secret <row|id>               reveal the secret of an entry
  remove <row|id>               remove an entry
  new                           switch to manual entry
  manual <account> <issuer> <secret>
                                show the QR code for a manual entry
  close                         close the open QR code or secret
  export <uris|json>            print the list
  help                          show this help
  quit                          leave

quote arguments that contain spaces: manual alice \"Example Co\" JBSWY3DPEHPK3PXP";

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A running session: the service plus the collaborators it needs.
pub struct Session<'a> {
    config: &'a AppConfig,
    service: AuthenticatorService,
    reader: &'a dyn FileReader,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a AppConfig, reader: &'a dyn FileReader) -> Self {
        Self {
            config,
            service: AuthenticatorService::new(config.renderer()),
            reader,
        }
    }

    pub fn service(&self) -> &AuthenticatorService {
        &self.service
    }

    /// Read commands until `quit` or end of input.
    pub async fn run<R: BufRead>(&mut self, input: R, out: &mut dyn Write) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            match self.handle(&line, out).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(AppError::Io(e)) => return Err(AppError::Io(e)),
                Err(e) => {
                    tracing::debug!(command = %line, error = %e, "command failed");
                    writeln!(out, "error: {}", e)?;
                }
            }
        }
        Ok(())
    }

    /// Import a file before the first command is read.
    pub async fn import(&mut self, path: &Path, out: &mut dyn Write) -> Result<()> {
        let report = self.service.import_file(self.reader, path).await?;
        write_skipped(report, out)?;
        print_list(&self.service.list_view(), self.config.show_secrets_in_list, out)
    }

    async fn handle(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow> {
        let owned = split_args(line)?;
        let words: Vec<&str> = owned.iter().map(String::as_str).collect();
        let Some((&command, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };

        match (command, args) {
            ("quit" | "exit", _) => return Ok(Flow::Quit),
            ("help", _) => writeln!(out, "{}", HELP)?,
            ("import", [path]) => self.import(Path::new(path), out).await?,
            ("list", []) => {
                print_list(&self.service.list_view(), self.config.show_secrets_in_list, out)?
            }
            ("count", []) => {
                writeln!(out, "{}", self.service.list_view().count_label)?;
                if let Some(report) = self.service.last_import() {
                    writeln!(
                        out,
                        "last import: {} of {} lines imported, {} skipped",
                        report.imported(),
                        report.candidates,
                        report.skipped.len()
                    )?;
                }
            }
            ("qr", [key]) => {
                let id = self.resolve(key)?;
                let modal = self.service.qr_for(&id)?;
                show_modal(self.config, modal, None, out)?;
            }
            ("secret", [key]) => {
                let id = self.resolve(key)?;
                let modal = self.service.reveal_secret(&id)?;
                show_modal(self.config, modal, None, out)?;
            }
            ("remove", [key]) => {
                // Unknown rows are ignored, like a double click on a removed row.
                if let Some(id) = self.service.resolve(key) {
                    self.service.remove(&id);
                }
                writeln!(out, "{}", self.service.list_view().count_label)?;
            }
            ("new", []) => {
                self.service.show_manual_form();
                writeln!(out, "manual entry: manual <account> <issuer> <secret>")?;
            }
            ("manual", [account, issuer, secret]) => {
                let form = ManualEntry::new(*account, *issuer, *secret);
                self.service.show_manual_form();
                let modal = self.service.create_manual_qr(&form)?;
                show_modal(self.config, modal, None, out)?;
            }
            ("manual", _) if args.len() < 3 => {
                // Incomplete forms get the same message as blank fields.
                let mut fields = args.iter().copied();
                let form = ManualEntry::new(
                    fields.next().unwrap_or_default(),
                    fields.next().unwrap_or_default(),
                    fields.next().unwrap_or_default(),
                );
                self.service.show_manual_form();
                let modal = self.service.create_manual_qr(&form)?;
                show_modal(self.config, modal, None, out)?;
            }
            ("manual", _) => {
                return Err(AppError::Usage(
                    "manual takes exactly <account> <issuer> <secret>; quote values containing spaces"
                        .to_string(),
                ))
            }
            ("close", []) => self.service.close_modal(),
            ("export", [format]) => {
                let format: ExportFormat = format.parse()?;
                out.write_all(export_list(self.service.list(), format)?.as_bytes())?;
            }
            _ => {
                return Err(AppError::Usage(format!(
                    "unknown command '{}', try 'help'",
                    line.trim()
                )))
            }
        }
        Ok(Flow::Continue)
    }

    fn resolve(&self, key: &str) -> std::result::Result<String, OtpError> {
        self.service
            .resolve(key)
            .ok_or_else(|| OtpError::not_found(key))
    }
}

/// Split a command line into words. Single or double quotes group words
/// containing spaces; quotes do not nest and have no escapes.
fn split_args(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(AppError::Usage(format!("unterminated quote in '{}'", line.trim())));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use otpbridge_otp::otp::{Modal, OtpErrorKind, ViewMode};

    struct InMemoryReader(&'static str);

    #[async_trait]
    impl FileReader for InMemoryReader {
        async fn read_text(&self, _path: &Path) -> std::result::Result<String, OtpError> {
            Ok(self.0.to_string())
        }
    }

    const FILE: &str = "\
otpauth://totp/ExampleCo:Alice?secret=AAAA&issuer=ExampleCo
otpauth://totp/Acme:bob?secret=BBBB&issuer=Acme
otpauth://totp/Globex:carol?secret=CCCC
";

    async fn run(script: &str) -> (String, Session<'static>) {
        static CONFIG: std::sync::OnceLock<AppConfig> = std::sync::OnceLock::new();
        static READER: InMemoryReader = InMemoryReader(FILE);
        let config = CONFIG.get_or_init(AppConfig::default);
        let mut session = Session::new(config, &READER);
        let mut out = Vec::new();
        session.run(script.as_bytes(), &mut out).await.unwrap();
        (String::from_utf8(out).unwrap(), session)
    }

    #[tokio::test]
    async fn import_then_remove_updates_count() {
        let (out, session) = run("import tokens.txt\nremove 2\nlist\n").await;
        assert!(out.contains("3 items"));
        assert!(out.contains("2 items"));
        let names: Vec<&str> = session
            .service()
            .list()
            .credentials()
            .map(|c| c.account_name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice", "carol"]);
    }

    #[tokio::test]
    async fn remove_unknown_row_is_noop() {
        let (out, session) = run("import t.txt\nremove 7\nremove nope\n").await;
        assert!(!out.contains("error"));
        assert_eq!(session.service().list().count(), 3);
    }

    #[tokio::test]
    async fn secret_reveal_and_close() {
        let (out, session) = run("import t.txt\nsecret 3\n").await;
        assert!(out.contains("Secret: CCCC"));
        assert_eq!(session.service().modal(), Some(&Modal::Secret("CCCC".into())));

        let (_, session) = run("import t.txt\nsecret 3\nclose\n").await;
        assert!(session.service().modal().is_none());
    }

    #[tokio::test]
    async fn qr_for_row_prints_uri() {
        let (out, _) = run("import t.txt\nqr 1\n").await;
        assert!(out.contains("otpauth://totp/ExampleCo:Alice?secret=AAAA&issuer=ExampleCo"));
    }

    #[tokio::test]
    async fn qr_for_missing_row_reports_error_and_continues() {
        let (out, session) = run("qr 1\nimport t.txt\n").await;
        assert!(out.contains("error: [NotFound]"));
        assert_eq!(session.service().list().count(), 3);
    }

    #[tokio::test]
    async fn manual_entry_requires_all_fields() {
        let (out, session) = run("new\nmanual Alice ExampleCo\n").await;
        assert!(out.contains("Please fill in all fields."));
        assert_eq!(session.service().view_mode(), ViewMode::ManualForm);
        assert!(session.service().modal().is_none());
    }

    #[tokio::test]
    async fn manual_entry_shows_uri() {
        let (out, _) = run("manual Alice ExampleCo JBSWY3DPEHPK3PXP\n").await;
        assert!(out.contains(
            "otpauth://totp/ExampleCo:Alice?secret=JBSWY3DPEHPK3PXP&issuer=ExampleCo"
        ));
    }

    #[tokio::test]
    async fn export_uris_roundtrips_file() {
        let (out, _) = run("import t.txt\nexport uris\n").await;
        assert!(out.contains("otpauth://totp/Globex:carol?secret=CCCC&issuer=Globex\n"));
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let (out, session) = run("quit\nimport t.txt\n").await;
        assert!(out.is_empty());
        assert_eq!(session.service().list().count(), 0);
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let (out, _) = run("frobnicate\n\n").await;
        assert!(out.contains("unknown command 'frobnicate'"));
    }

    #[tokio::test]
    async fn manual_entry_with_extra_words_is_rejected() {
        let (out, session) = run("manual alice Example Co JBSWY3DPEHPK3PXP\n").await;
        assert!(!out.contains("otpauth://"));
        assert!(out.contains("error: manual takes exactly <account> <issuer> <secret>"));
        assert!(session.service().modal().is_none());
    }

    #[tokio::test]
    async fn manual_entry_accepts_quoted_values() {
        let (out, _) = run("manual alice \"Example Co\" JBSWY3DPEHPK3PXP\n").await;
        assert!(out.contains(
            "otpauth://totp/Example%20Co:alice?secret=JBSWY3DPEHPK3PXP&issuer=Example%20Co"
        ));
    }

    #[tokio::test]
    async fn count_reports_last_import() {
        let (out, _) = run("count\nimport 'my tokens.txt'\ncount\n").await;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "0 items");
        assert!(out.contains("last import: 3 of 3 lines imported, 0 skipped"));
    }

    #[tokio::test]
    async fn unterminated_quote_is_reported() {
        let (out, session) = run("import \"my tokens.txt\n").await;
        assert!(out.contains("error: unterminated quote"));
        assert_eq!(session.service().list().count(), 0);
    }

    // ── Argument splitting ───────────────────────────────────────

    #[test]
    fn split_args_handles_quotes() {
        assert_eq!(
            split_args("  import  \"my tokens.txt\" ").unwrap(),
            vec!["import", "my tokens.txt"]
        );
        assert_eq!(
            split_args("manual a 'Example Co' S").unwrap(),
            vec!["manual", "a", "Example Co", "S"]
        );
        assert_eq!(split_args("x \"\"").unwrap(), vec!["x", ""]);
        assert!(split_args("").unwrap().is_empty());
        assert!(split_args("import 'oops").is_err());
    }

    #[test]
    fn not_found_error_kind() {
        let config = AppConfig::default();
        let reader = InMemoryReader("");
        let session = Session::new(&config, &reader);
        assert_eq!(session.resolve("1").unwrap_err().kind, OtpErrorKind::NotFound);
    }
}
