//! Sandbox decision and runtime launch
//!
//! On Linux the helper is audited and, if needed, repaired before the
//! runtime starts. Whatever the repair outcome, the runtime is launched:
//! with its sandbox when the helper is compliant, with `--no-sandbox`
//! (after telling the user how to fix it) when it is not.

use log::{info, warn};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use webshell_core::Result;
use webshell_locale::Translator;
use webshell_sandbox::{
    EscalationEngine, EscalationReport, PrivilegeHost, RepairOutcome, write_manual_instructions,
};

use crate::paths::RuntimePaths;
use crate::request::{LaunchMode, LaunchRequest};
use crate::supervise::{ChildProcessResult, spawn_and_wait};

/// Everything needed to start the runtime
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(OsString, OsString)>,
    pub mode: LaunchMode,
    /// `None` when the platform has no helper to check
    pub report: Option<EscalationReport>,
}

pub struct LaunchOrchestrator<'a, H: PrivilegeHost + ?Sized> {
    host: &'a H,
    translator: &'a Translator,
}

impl<'a, H: PrivilegeHost + ?Sized> LaunchOrchestrator<'a, H> {
    pub fn new(host: &'a H, translator: &'a Translator) -> Self {
        Self { host, translator }
    }

    /// Audit/repair the helper if the platform needs it and pick the mode.
    /// User-facing progress and remediation text goes to `out`.
    pub fn decide_mode<W: Write>(
        &self,
        request: &LaunchRequest,
        helper: Option<&Path>,
        out: &mut W,
    ) -> io::Result<(LaunchMode, Option<EscalationReport>)> {
        if !request.platform().needs_sandbox_helper() {
            info!(
                "No sandbox helper needed on {}, launching directly",
                request.platform()
            );
            return Ok((LaunchMode::Normal, None));
        }

        let t = self.translator;
        writeln!(out, "{}", t.t("checking_sandbox"))?;

        let Some(helper) = helper else {
            warn!("No install directory for the runtime, cannot locate sandbox helper");
            writeln!(out, "{}", t.t("sandbox_not_fixed"))?;
            writeln!(out, "{}", t.t("fallback_warn"))?;
            return Ok((LaunchMode::Degraded, None));
        };

        let report = EscalationEngine::new(self.host, t).repair(helper, out);
        if report.is_compliant() {
            writeln!(out, "{}", t.t("sandbox_ok"))?;
            return Ok((LaunchMode::Normal, Some(report)));
        }

        let path = helper.display().to_string();
        writeln!(out, "{}", t.t("sandbox_not_fixed"))?;
        if report.outcome == RepairOutcome::HelperMissing {
            writeln!(out, "{}", t.translate("sandbox_helper_missing", &[("path", path.as_str())]))?;
        }
        write_manual_instructions(out, helper, t)?;
        writeln!(out, "{}", t.t("fallback_warn"))?;
        warn!("Launching with the sandbox disabled ({:?})", report.outcome);

        Ok((LaunchMode::Degraded, Some(report)))
    }

    /// Decide the mode and assemble arguments and environment against an
    /// explicit parent environment
    pub fn plan_with_env<W, I>(
        &self,
        request: &LaunchRequest,
        paths: &RuntimePaths,
        parent_env: I,
        out: &mut W,
    ) -> io::Result<LaunchPlan>
    where
        W: Write,
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let (mode, report) = self.decide_mode(request, paths.helper.as_deref(), out)?;
        Ok(LaunchPlan {
            program: paths.runtime.clone(),
            args: request.assemble_args(mode),
            env: request.assemble_env(parent_env, mode),
            mode,
            report,
        })
    }

    /// [`plan_with_env`](Self::plan_with_env) over this process's environment
    pub fn plan<W: Write>(
        &self,
        request: &LaunchRequest,
        paths: &RuntimePaths,
        out: &mut W,
    ) -> io::Result<LaunchPlan> {
        self.plan_with_env(request, paths, std::env::vars_os(), out)
    }

    /// Start the planned runtime and wait for it to exit
    pub fn launch<W: Write>(&self, plan: &LaunchPlan, out: &mut W) -> Result<ChildProcessResult> {
        let bin = plan.program.display().to_string();
        let args = plan.args.join(" ");
        writeln!(
            out,
            "{}",
            self.translator
                .translate("launching", &[("bin", bin.as_str()), ("args", args.as_str())])
        )?;
        out.flush()?;

        spawn_and_wait(&plan.program, &plan.args, &plan.env)
    }

    /// Plan and launch in one go
    pub fn run<W: Write>(
        &self,
        request: &LaunchRequest,
        paths: &RuntimePaths,
        out: &mut W,
    ) -> Result<ChildProcessResult> {
        let plan = self.plan(request, paths, out)?;
        self.launch(&plan, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webshell_core::Platform;
    use webshell_sandbox::testing::FakeHost;
    use webshell_sandbox::{Interaction, StrategyKind};

    fn paths() -> RuntimePaths {
        RuntimePaths {
            runtime: PathBuf::from("/opt/app/electron"),
            helper: Some(PathBuf::from("/opt/app/chrome-sandbox")),
        }
    }

    fn plan(host: &FakeHost, platform: Platform) -> (LaunchPlan, String) {
        let translator = Translator::default();
        let orchestrator = LaunchOrchestrator::new(host, &translator);
        let request = LaunchRequest::new(vec!["--foo".to_string()], "en", platform);
        let mut out = Vec::new();
        let plan = orchestrator
            .plan_with_env(&request, &paths(), Vec::new(), &mut out)
            .unwrap();
        (plan, String::from_utf8(out).unwrap())
    }

    #[test]
    fn other_platforms_skip_audit_and_escalation() {
        let host = FakeHost::new(1000, 0o755).with_terminal();
        let (plan, out) = plan(&host, Platform::MacOs);
        assert_eq!(host.stat_count(), 0);
        assert_eq!(host.mutation_count(), 0);
        assert_eq!(plan.mode, LaunchMode::Normal);
        assert_eq!(plan.args, vec!["--lang=en", "--foo"]);
        assert!(plan.report.is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn compliant_helper_launches_normally() {
        let host = FakeHost::new(0, 0o4755);
        let (plan, out) = plan(&host, Platform::Linux);
        assert_eq!(plan.mode, LaunchMode::Normal);
        assert_eq!(plan.args, vec!["--lang=en", "--foo"]);
        assert!(out.contains("configured correctly"));
        assert!(!plan.env.iter().any(|(k, _)| k == "ELECTRON_DISABLE_SANDBOX"));
    }

    #[test]
    fn repaired_helper_launches_normally() {
        let host = FakeHost::new(1000, 0o755).cached_credentials();
        let (plan, _) = plan(&host, Platform::Linux);
        assert_eq!(plan.mode, LaunchMode::Normal);
        assert_eq!(
            plan.report.unwrap().outcome,
            RepairOutcome::Repaired(StrategyKind::NonInteractive)
        );
    }

    #[test]
    fn unrepairable_helper_degrades_after_instructions() {
        let host = FakeHost::new(1000, 0o755).with_terminal();
        let (plan, out) = plan(&host, Platform::Linux);

        assert_eq!(plan.mode, LaunchMode::Degraded);
        assert_eq!(plan.args, vec!["--no-sandbox", "--lang=en", "--foo"]);
        assert!(plan.env.iter().any(|(k, v)| k == "ELECTRON_DISABLE_SANDBOX" && v == "1"));
        assert_eq!(host.elevated_count(Interaction::Interactive), 1);

        let howto = out.find("To fix it manually").unwrap();
        let warning = out.find("less secure").unwrap();
        assert!(howto < warning);
        assert!(out.contains("sudo chmod 4755 \"/opt/app/chrome-sandbox\""));
    }

    #[test]
    fn missing_helper_gets_its_own_notice() {
        let host = FakeHost::new(0, 0).missing();
        let (plan, out) = plan(&host, Platform::Linux);
        assert_eq!(plan.mode, LaunchMode::Degraded);
        assert!(out.contains("Sandbox helper not found at /opt/app/chrome-sandbox"));
        assert_eq!(host.mutation_count(), 0);
    }

    #[test]
    fn unknown_helper_location_degrades() {
        let host = FakeHost::new(0, 0o4755);
        let translator = Translator::default();
        let orchestrator = LaunchOrchestrator::new(&host, &translator);
        let request = LaunchRequest::new(vec![], "en", Platform::Linux);
        let paths = RuntimePaths {
            runtime: PathBuf::from("electron"),
            helper: None,
        };
        let mut out = Vec::new();
        let plan = orchestrator
            .plan_with_env(&request, &paths, Vec::new(), &mut out)
            .unwrap();
        assert_eq!(plan.mode, LaunchMode::Degraded);
        assert_eq!(host.stat_count(), 0);
    }

    #[test]
    fn launch_relays_exit_code() {
        let host = FakeHost::new(0, 0o4755);
        let translator = Translator::default();
        let orchestrator = LaunchOrchestrator::new(&host, &translator);
        let plan = LaunchPlan {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "exit 7".to_string()],
            env: Vec::new(),
            mode: LaunchMode::Normal,
            report: None,
        };
        let mut out = Vec::new();
        let result = orchestrator.launch(&plan, &mut out).unwrap();
        assert_eq!(result.exit_code(), 7);
        assert!(String::from_utf8(out).unwrap().contains("Launching /bin/sh -c exit 7"));
    }
}
