use crate::cli::ServeArgs;
use crate::fixture::{self, FixtureBackend};
use crate::fs::default_fs;
use crate::style;

pub fn cmd_serve(args: ServeArgs) -> i32 {
    let backend = match FixtureBackend::load(&args.fixture, default_fs()) {
        Ok(backend) => backend,
        Err(e) => {
            style::error(&format!("{} ({})", e, style::path(&args.fixture)));
            return 1;
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            style::error(&format!("Failed to start runtime: {}", e));
            return 1;
        }
    };

    if let Err(e) = rt.block_on(fixture::serve(backend, args.port, args.open)) {
        style::error(&format!("Server failed: {}", e));
        return 1;
    }

    0
}
