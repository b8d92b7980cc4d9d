use std::path::PathBuf;
use std::process;

use clap::Parser;

use hello_fuse::cli::{Args, USAGE};
use hello_fuse::fuse::FuserMountService;
use hello_fuse::lifecycle::{CommandUnmounter, ShutdownSignals};
use hello_fuse::{
    exit_code, identity, logging, Coordinator, LifecycleError, MountConfig, Shutdown,
};

// Exits through `process::exit` on every mounted path: an abandoned mount
// call or a live serve loop would otherwise hold the runtime open.
#[tokio::main]
async fn main() {
    let args = Args::parse();

    // No mount point is not treated as an error
    let Some(mountpoint) = args.mountpoint.clone() else {
        print!("{}", USAGE);
        return;
    };

    logging::init(args.debug);

    let identity = match identity::resolve(args.uid, args.gid) {
        Ok(identity) => identity,
        Err(e) => {
            eprintln!("Error resolving UID/GID: {}", e);
            process::exit(1);
        }
    };
    tracing::info!("Using UID: '{}', GID: '{}'", identity.uid, identity.gid);

    let config = args.to_config(identity);
    let result = run(mountpoint, config).await;
    match &result {
        Ok(Shutdown::Signal(signal)) => tracing::info!("Unmounted after {}", signal),
        Ok(Shutdown::Unmounted) => {}
        Err(e) => eprintln!("{}", e),
    }
    process::exit(exit_code(&result));
}

async fn run(mountpoint: PathBuf, config: MountConfig) -> Result<Shutdown, LifecycleError> {
    let mut signals = ShutdownSignals::install().map_err(LifecycleError::Signal)?;
    let mut coordinator = Coordinator::new(
        FuserMountService,
        CommandUnmounter::default(),
        mountpoint,
        config,
    );
    coordinator.run(signals.recv()).await
}
