mod cli;
mod descriptor;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use ignite_core::kernel::bootstrap::Application;
use ignite_core::kernel::error::Result;
use ignite_core::lifecycle::run_shutdown_hook;
use ignite_core::module_system::ModulePriority;
use logging_listener::LoggingListener;

use crate::cli::{CliArgs, Commands, RunArgs};
use crate::descriptor::AppDescriptor;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let outcome = match args.command {
        Commands::Run(run_args) => run(run_args).await,
        Commands::List { descriptor } => list(&descriptor),
    };

    let code = match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    };
    run_shutdown_hook();
    code
}

async fn run(args: RunArgs) -> Result<()> {
    let descriptor = AppDescriptor::load(&args.descriptor)?;

    let mut registry = descriptor.registry()?;
    LoggingListener::register(&mut registry)?;

    let mut builder = Application::builder(descriptor.name.clone())
        .registry(registry)
        .environment(descriptor.environment(&args.properties)?)
        .classpath(descriptor.classpath()?);
    if let Some(index) = descriptor.metadata_index()? {
        builder = builder.metadata_index(index);
    }
    for id in &args.excludes {
        builder = builder.exclude(id.clone());
    }

    let mut app = builder.build()?;
    let run = app.run().await?;

    let activated = run.activated_module_ids().await;
    println!("Activated modules:");
    if activated.is_empty() {
        println!("  (none)");
    }
    for (position, id) in activated.iter().enumerate() {
        println!("  {}. {}", position + 1, id);
    }
    if args.report {
        println!();
        println!("{}", run.report().render());
    }

    let closed = run.close().await;
    log::debug!("Closed {} component(s)", closed.len());
    Ok(())
}

fn list(path: &Path) -> Result<()> {
    let descriptor = AppDescriptor::load(path)?;
    println!("Modules declared by '{}':", descriptor.name);
    if descriptor.modules.is_empty() {
        println!("  No modules declared.");
    }
    for module in &descriptor.modules {
        let manifest = &module.manifest;
        let priority = manifest.priority.unwrap_or(ModulePriority::DEFAULT);
        match &manifest.group {
            Some(group) => println!(
                "  - {} (priority: {}, group: {}/{})",
                manifest.id, priority, group.name, group.alias
            ),
            None => println!("  - {} (priority: {})", manifest.id, priority),
        }
    }
    Ok(())
}
