use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches};

use crate::app;
use crate::args::TesterArgs;
use crate::config::{apply_config, load_config};
use crate::error::AppResult;

pub(crate) fn run() -> AppResult<ExitCode> {
    let matches = TesterArgs::command().get_matches();
    let mut args = TesterArgs::from_arg_matches(&matches)?;

    crate::logger::init_logging(args.verbose);

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run_local(&args))
}
