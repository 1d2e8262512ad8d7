use anyhow::Result;
use std::env;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    pdf2image::app::run(env::args_os())
}
