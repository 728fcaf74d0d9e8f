/*!
    Live AVI over HTTP.

    Every request runs its own remux of the input and streams the result
    as it is written, so the response has no length and the AVI has no
    index.
*/

use std::convert::Infallible;
use std::io::{self, BufWriter, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::UnboundedReceiverStream};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::session;

pub const STREAM_PATH: &str = "/stream.avi";

#[derive(Clone)]
struct AppState {
    input: Arc<PathBuf>,
    config: Arc<PipelineConfig>,
}

/**
    Forwards written bytes to a response body. Writes fail once the
    client has gone away, which ends the remux feeding it.
*/
struct BodyWriter {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl Write for BodyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .send(Bytes::copy_from_slice(buf))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

async fn stream_avi(State(state): State<AppState>) -> Response {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let writer = BufWriter::new(BodyWriter { tx });
        match session::stream(&state.input, writer, &state.config).await {
            Ok(summary) => debug!(duration = %summary.duration, "stream complete"),
            Err(e) => warn!("stream ended early: {e:#}"),
        }
    });

    let body = Body::from_stream(UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>));
    ([(header::CONTENT_TYPE, "video/x-msvideo")], body).into_response()
}

pub fn router(input: PathBuf, config: PipelineConfig) -> Router {
    let state = AppState {
        input: Arc::new(input),
        config: Arc::new(config),
    };
    Router::new()
        .route("/", get(stream_avi))
        .route(STREAM_PATH, get(stream_avi))
        .with_state(state)
}

/**
    Serve `input` as live AVI until interrupted.
*/
pub async fn serve(addr: SocketAddr, input: PathBuf, config: PipelineConfig) -> Result<()> {
    config.validate()?;
    tokio::fs::metadata(&input)
        .await
        .with_context(|| format!("cannot read {}", input.display()))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    info!(addr = %local, input = %input.display(), "serving");
    println!("Serving {} on http://{local}{STREAM_PATH}", input.display());

    axum::serve(listener, router(input, config))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
