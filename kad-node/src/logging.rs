// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Tracing subscriber assembly, the binary-only counterpart to
//! `ant-logging`'s layer stack (SPEC_FULL.md §2.2). Neither `kad-protocol`
//! nor `kad-networking` install a subscriber; they only emit events.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs a global subscriber combining a stdout layer with a daily
/// rolling file layer under `log_dir/logs`. The returned guard must be
/// held for the process lifetime; dropping it stops the file worker.
pub fn init(log_dir: &Path) -> Result<WorkerGuard, std::io::Error> {
    std::fs::create_dir_all(log_dir.join("logs"))?;
    let file_appender = tracing_appender::rolling::daily(log_dir.join("logs"), "kadnode.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
