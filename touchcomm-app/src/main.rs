mod app;
mod args;
mod session;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::SessionArgs::parse();
    let config = args.to_config()?;
    app::App::new(config)?.run()
}
