use hohm_core::{db, init_logging};
use hohm_server::{build_router, AppState, ResendMailer, ServerConfig};
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;

fn main() -> Result<(), String> {
    let config = ServerConfig::from_env();
    let log_dir = config
        .log_dir
        .to_str()
        .ok_or_else(|| format!("log dir is not valid UTF-8: {}", config.log_dir.display()))?;
    init_logging(&config.log_level, log_dir).map_err(|e| e.to_string())?;

    let conn = db::open_db(&config.db_path)
        .map_err(|e| format!("open db {} failed: {e}", config.db_path.display()))?;
    if config.resend_api_key.is_none() {
        info!("event=server_config module=server status=degraded reason=resend_api_key_missing");
    }
    // The blocking mail client must be created and dropped outside the runtime.
    let mailer = Arc::new(
        ResendMailer::new(config.resend_api_key.clone()).map_err(|e| e.to_string())?,
    );
    let state = AppState::new(conn, mailer.clone(), config.mail_from.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("runtime build failed: {e}"))?;
    let result = runtime.block_on(serve(&config.bind_addr, state));
    drop(runtime);
    drop(mailer);

    if let Err(err) = &result {
        error!("event=server_exit module=server status=error error={err}");
    }
    result
}

async fn serve(bind_addr: &str, state: AppState) -> Result<(), String> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("event=server_listen module=server status=ok addr={bind_addr}");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))?;
    info!("event=server_shutdown module=server status=ok");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
