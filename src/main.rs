// main.rs: bootstrap and exit-code mapping only. Dispatch lives in the library.
use statup::cli::ServerFlags;
use statup::platform::{Platform, Unlinked};
use statup::update::UpdateChecker;
use statup::{config, envfile, logging, CliError, Disposition, Router};

fn main() -> anyhow::Result<()> {
    let data_dir = config::data_dir()?;
    let work_dir = std::env::current_dir()?;

    let _log_guard = logging::init(&data_dir);

    match envfile::load_into_process(&work_dir) {
        Ok(true) => tracing::info!("loaded environment from .env"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let (flags, args) = ServerFlags::parse(&argv).map_err(CliError::from)?;

    let platform = Unlinked;
    let stdout = std::io::stdout().lock();
    let mut router = Router::new(&platform, &data_dir, &work_dir, stdout)
        .with_flags(flags.clone())
        .with_update_checker(UpdateChecker::from_env());

    let disposition = router.dispatch(&args);
    drop(router);

    match disposition {
        Disposition::Handled => Ok(()),
        Disposition::Failed(e) => Err(e.into()),
        Disposition::Continue => {
            tracing::info!(ip = %flags.ip, port = flags.port, "starting Statup server");
            platform.serve(&flags.ip, flags.port)?;
            Ok(())
        }
    }
}
