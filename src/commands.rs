//! One-shot command implementations and the shared console presentation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use otpbridge_otp::otp::export::export as export_list;
use otpbridge_otp::otp::qr::{QrCodeRenderer, QrFormat, QrImage};
use otpbridge_otp::otp::reader::TokioFileReader;
use otpbridge_otp::otp::{
    count_label, AuthenticatorService, ExportFormat, ImportReport, ListState, ListView, ManualEntry,
    Modal,
};

use crate::config::AppConfig;
use crate::error::Result;

/// Base name for QR images written without an explicit output path.
const DEFAULT_QR_STEM: &str = "otpauth-qr";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Commands
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the URI for a manually entered credential and show its QR code.
pub fn manual(
    config: &AppConfig,
    form: &ManualEntry,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let format = output
        .and_then(format_from_extension)
        .unwrap_or(config.qr_format);
    let mut svc = AuthenticatorService::new(config.renderer_for(format));
    svc.show_manual_form();
    let modal = svc.create_manual_qr(form)?;
    tracing::info!(issuer = %form.issuer.trim(), "manual QR created");
    show_modal(config, modal, output, out)
}

/// Import a file and print the resulting list.
pub async fn import(config: &AppConfig, path: &Path, out: &mut dyn Write) -> Result<()> {
    let mut svc = AuthenticatorService::new(config.renderer());
    let report = svc.import_file(&TokioFileReader, path).await?;
    tracing::info!(
        path = %path.display(),
        imported = report.imported(),
        skipped = report.skipped.len(),
        "import finished"
    );
    write_skipped(report, out)?;
    print_list(&svc.list_view(), config.show_secrets_in_list, out)
}

/// Import a file and write it back out in another format.
pub async fn export(
    path: &Path,
    format: ExportFormat,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut svc = AuthenticatorService::new(QrCodeRenderer::default());
    svc.import_file(&TokioFileReader, path).await?;
    let text = export_list(svc.list(), format)?;

    match output {
        Some(dest) => {
            tokio::fs::write(dest, &text).await?;
            writeln!(
                out,
                "Exported {} to {}",
                count_label(svc.list().count()),
                dest.display()
            )?;
        }
        None => out.write_all(text.as_bytes())?,
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Presentation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Print the import list: count label, then one numbered row per entry.
pub fn print_list(view: &ListView, show_secrets: bool, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", view.count_label)?;
    if view.state == ListState::Empty {
        writeln!(out, "no otpauth:// entries")?;
        return Ok(());
    }
    for (idx, row) in view.rows.iter().enumerate() {
        let c = &row.credential;
        let account = if c.has_account_name() {
            c.account_name.as_str()
        } else {
            "(no account)"
        };
        write!(out, "{:>3}. {} [{}] id={}", idx + 1, account, c.issuer, row.id)?;
        if show_secrets {
            write!(out, " secret={}", c.secret)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Report lines that were skipped during an import.
pub fn write_skipped(report: &ImportReport, out: &mut dyn Write) -> Result<()> {
    for skipped in &report.skipped {
        writeln!(out, "skipped line {}: {}", skipped.line_no, skipped.reason)?;
    }
    Ok(())
}

/// Show an open modal: the URI plus its QR code, or a secret.
pub fn show_modal(
    config: &AppConfig,
    modal: &Modal,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    match modal {
        Modal::Secret(secret) => writeln!(out, "Secret: {}", secret)?,
        Modal::Qr { uri, image } => {
            writeln!(out, "{}", uri)?;
            match (image, output) {
                (QrImage::Text(art), None) => writeln!(out, "{}", art)?,
                (image, _) => {
                    let dest = output.map(Path::to_path_buf).unwrap_or_else(|| {
                        default_image_path(config, image.extension())
                    });
                    fs::write(&dest, image.as_bytes())?;
                    tracing::debug!(path = %dest.display(), "QR image written");
                    writeln!(out, "QR code written to {}", dest.display())?;
                }
            }
        }
    }
    Ok(())
}

fn default_image_path(config: &AppConfig, extension: &str) -> PathBuf {
    config
        .output_dir()
        .join(format!("{}.{}", DEFAULT_QR_STEM, extension))
}

/// QR format implied by an output file name.
pub fn format_from_extension(path: &Path) -> Option<QrFormat> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "png" => Some(QrFormat::Png),
        "svg" => Some(QrFormat::Svg),
        "txt" => Some(QrFormat::Terminal),
        _ => None,
    }
}
