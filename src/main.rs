//! vm-preflight CLI entry point
//!
//! Preflight checks for hypervisor-backed virtual machine provisioning.

use clap::Parser;
use vm_preflight::cli::args::{Args, BeforeArgs, Command, VmArgs};
use vm_preflight::cli::output::save_report;
use vm_preflight::config::{keys, PreflightSettings};
use vm_preflight::engine::orchestrator::{list_checks, PreflightOrchestrator};
use vm_preflight::engine::result::PhaseReport;
use vm_preflight::platform::host::SystemHost;
use vm_preflight::platform::ssh::SshDriver;
use vm_preflight::version::get_build_info;
use vm_preflight::{Driver, Phase, PreflightError};

use std::io;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level());

    match args.command {
        Command::Version => {
            println!("{}", get_build_info());
            ExitCode::SUCCESS
        }
        Command::List => {
            print_check_list();
            ExitCode::SUCCESS
        }
        Command::Before(ref before) => run_phases(&args, Some(before), None),
        Command::After(ref vm) => run_phases(&args, None, Some(vm)),
        Command::Run { ref before, ref vm } => run_phases(&args, Some(before), Some(vm)),
    }
}

/// Logs go to stderr; stdout carries the check protocol.
fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn print_check_list() {
    println!("Available checks:");
    for phase in [Phase::BeforeHostCreation, Phase::AfterHostCreation] {
        println!();
        println!("{}:", phase.to_string().to_uppercase());
        for check in list_checks().into_iter().filter(|c| c.phase == phase) {
            let driver = check.driver.map(|d| format!(" [{}]", d)).unwrap_or_default();
            let severity = if check.warn_by_default { "warn" } else { "fatal" };
            println!("  {:<14} {}{} ({})", check.id, check.message, driver, severity);
            println!("  {:<14} skip: {}  warn: {}", "", check.skip_key, check.warn_key);
        }
    }
}

fn run_phases(args: &Args, before: Option<&BeforeArgs>, vm: Option<&VmArgs>) -> ExitCode {
    let mut settings = match PreflightSettings::load(args.config.as_deref(), &args.overrides) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };
    if let Some(driver) = before.and_then(|b| b.vm_driver.as_deref()) {
        settings.set_string(keys::VM_DRIVER, driver);
    }

    let mut reports = Vec::new();
    let result = execute(&settings, before.is_some(), vm, &mut reports);

    if let Some(path) = &args.report {
        if let Err(e) = save_report(&reports, path) {
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // The runner already printed the hint as the final line.
        Err(PreflightError::CheckFailed { .. }) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(3)
        }
    }
}

fn execute(
    settings: &PreflightSettings,
    run_before: bool,
    vm: Option<&VmArgs>,
    reports: &mut Vec<PhaseReport>,
) -> Result<(), PreflightError> {
    let host = SystemHost;
    let orchestrator = PreflightOrchestrator::new(settings, &host);
    let driver = vm.map(|vm| SshDriver::new(vm.ssh_target()));
    let driver = driver.as_ref().map(|d| d as &dyn Driver);

    orchestrator.run_workflow(run_before, driver, &mut io::stdout(), reports)
}
