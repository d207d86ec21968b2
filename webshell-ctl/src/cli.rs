use clap::Parser;
use clap::builder::{OsStringValueParser, TypedValueParser};
use std::ffi::OsString;

/// Every argument belongs to the application runtime, so the launcher
/// defines no flags of its own (not even --help).
#[derive(Parser, Debug)]
#[command(name = "webshell")]
#[command(
    version,
    about = "Start the webshell desktop application",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
#[command(after_help = "ENVIRONMENT:
    npm_config_lang, START_LANG, APP_LANG, LANG   language, first set wins (after --lang=)
    WEBSHELL_APP_DIR       application directory (default: current directory)
    WEBSHELL_LOCALES_DIR   locale dictionaries (default: <app dir>/locales)
    WEBSHELL_RUNTIME       runtime executable to use instead of node_modules/electron
    WEBSHELL_VERBOSE       set to 1 for debug output
")]
pub struct Cli {
    /// Arguments forwarded to the runtime; --lang=<code> also selects the launcher language
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_parser = OsStringValueParser::new().map(|s| s.to_string_lossy().into_owned())
    )]
    pub args: Vec<String>,
}

impl Cli {
    /// Parse `argv` (program name first). `args` ends up as every argument
    /// after the program name exactly as given, lossily converted to UTF-8;
    /// a leading `--` belongs to the runtime and is kept.
    pub fn from_argv<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let mut cli = Self::parse_from(&argv);
        cli.args = argv
            .iter()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        cli
    }
}
