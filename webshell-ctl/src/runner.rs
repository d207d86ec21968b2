use console::style;
use log::{debug, warn};
use std::io;

use webshell_core::{LaunchError, Platform, Result};
use webshell_launch::{LaunchOrchestrator, LaunchRequest, LauncherConfig};
use webshell_locale::{Catalog, Translator};
use webshell_sandbox::SystemHost;

/// Run the launcher to completion and return the process exit status
pub fn run_launcher(config: LauncherConfig) -> i32 {
    let catalog = Catalog::load_dir(&config.locales_dir);
    let translator = Translator::new(catalog, &config.language);
    debug!(
        "Languages available: {:?}, using '{}'",
        translator.available_languages(),
        translator.current_language()
    );

    match launch(config, &translator) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, &translator);
            e.exit_code()
        }
    }
}

fn launch(config: LauncherConfig, translator: &Translator) -> Result<i32> {
    let paths = config.locator().resolve()?;
    debug!(
        "Runtime: {} | helper: {:?}",
        paths.runtime.display(),
        paths.helper
    );

    let request = LaunchRequest::new(
        config.passthrough_args,
        translator.current_language(),
        Platform::current(),
    )
    .with_app_entry(config.app_root.to_string_lossy());

    let host = SystemHost::new();
    let orchestrator = LaunchOrchestrator::new(&host, translator);
    let result = orchestrator.run(&request, &paths, &mut io::stdout())?;

    result.into_result()
}

fn report_error(err: &LaunchError, translator: &Translator) {
    match err {
        LaunchError::RuntimeNotFound { .. } => {
            debug!("{}", err);
            eprintln!(
                "{} {}",
                style("error:").red().bold(),
                translator.t("runtime_not_found")
            );
        }
        LaunchError::ChildSpawn { program, source } => {
            let bin = program.display().to_string();
            let error = source.to_string();
            eprintln!(
                "{} {}",
                style("error:").red().bold(),
                translator.translate(
                    "spawn_failed",
                    &[("bin", bin.as_str()), ("error", error.as_str())]
                )
            );
        }
        LaunchError::ChildSignaled { .. } => warn!("{}", err),
        _ => eprintln!("{} {}", style("error:").red().bold(), err),
    }
}
