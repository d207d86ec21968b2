//! Manual remediation steps shown when automatic repair fails

use std::io::{self, Write};
use std::path::Path;

use webshell_locale::Translator;

/// Write the localized how-to block naming `helper` and the two commands
/// that make it compliant
pub fn write_manual_instructions<W: Write>(
    out: &mut W,
    helper: &Path,
    translator: &Translator,
) -> io::Result<()> {
    let path = helper.display().to_string();
    let vars = [("path", path.as_str())];

    writeln!(out)?;
    writeln!(out, "{}", translator.t("howto_header"))?;
    writeln!(out, "  {}", translator.translate("howto_line1", &vars))?;
    writeln!(out, "  {}", translator.translate("howto_line2", &vars))?;
    writeln!(out)?;
    writeln!(out, "{}", translator.t("howto_note"))?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_path_and_both_commands() {
        let mut out = Vec::new();
        write_manual_instructions(
            &mut out,
            Path::new("/opt/app/chrome-sandbox"),
            &Translator::default(),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "\nTo fix it manually, run:\n  sudo chown root:root \"/opt/app/chrome-sandbox\"\n  sudo chmod 4755 \"/opt/app/chrome-sandbox\"\n\nThen start the application again.\n\n"
        );
    }
}
