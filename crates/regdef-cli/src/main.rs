use clap::Parser;

mod cli;
pub mod exit_codes;
mod prompt;

use cli::args::Cli;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let cli = Cli::parse();
    let code = cli::build::run(cli);
    std::process::exit(code);
}
