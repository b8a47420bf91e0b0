use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;

pub fn run(log: Option<&str>) -> Result<()> {
    println!();
    println!("{}", "📻 Starting the radio emulator...".cyan().bold());
    println!();

    let mut cmd = Command::new("cargo");
    cmd.args([
        "run",
        "-p",
        "firmware",
        "--features",
        "emulator",
        "--example",
        "radio_emulator",
    ]);
    cmd.env("RUST_LOG", log.unwrap_or("info"));

    let status = cmd.status().context("Failed to run the emulator")?;
    if !status.success() {
        anyhow::bail!("Emulator exited with an error");
    }

    println!();
    println!("{}", "✓ Emulator finished".green().bold());
    println!();

    Ok(())
}
