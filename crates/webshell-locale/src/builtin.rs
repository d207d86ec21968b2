/// English messages compiled into the binary so the launcher can always talk
/// to the user, even when no `locales/` directory ships with the app.
pub(crate) const CATALOG_EN: &[(&str, &str)] = &[
    (
        "runtime_not_found",
        "Application runtime not found. Install the dependencies first (for example: npm install).",
    ),
    ("checking_sandbox", "Checking sandbox helper permissions..."),
    ("sandbox_ok", "Sandbox helper is configured correctly."),
    (
        "sandbox_not_fixed",
        "Could not configure the sandbox helper automatically.",
    ),
    ("sandbox_helper_missing", "Sandbox helper not found at {path}."),
    (
        "sudo_prompt",
        "Administrator password may be requested to fix the sandbox helper permissions.",
    ),
    ("howto_header", "To fix it manually, run:"),
    ("howto_line1", "sudo chown root:root \"{path}\""),
    ("howto_line2", "sudo chmod 4755 \"{path}\""),
    ("howto_note", "Then start the application again."),
    (
        "fallback_warn",
        "Starting with the sandbox disabled (--no-sandbox). This mode is less secure.",
    ),
    ("launching", "Launching {bin} {args}"),
    ("spawn_failed", "Failed to start {bin}: {error}"),
];
