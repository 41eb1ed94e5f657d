use clap::Parser;
use heapslot::shell::{self, config::ShellConfig};
use tracing_subscriber::EnvFilter;

fn welcome_message(name: &str) -> String {
    format!(
        "{name}\nslotted heap page shell, {} byte pages\nType 'help' for commands.\n",
        heapslot::types::PAGE_SIZE
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ShellConfig::parse();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    println!("{}", welcome_message("HEAPSLOT"));
    shell::run(&config)
}
