mod args;

use clap::Parser;

use args::Cli;

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output = tracecook_engine::cook_file(&cli.input, &cli.output, cli.format)?;

    println!(
        "Processed {} records -> {}",
        output.requests.len(),
        cli.output.display()
    );
    println!("  {} messages", output.messages.len());
    println!("  {} tools", output.tools.len());
    println!("  {} requests", output.requests.len());

    Ok(())
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
