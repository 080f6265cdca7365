//! Loopback HTTP endpoint for one resolution session
//!
//! | Route | Method | Result |
//! |---|---|---|
//! | `/` | GET | built-in page |
//! | `/api/conflicts` | GET | frozen conflict list |
//! | `/api/resolve` | POST | apply one decision |
//! | `/api/shutdown` | GET, POST | end the session |
//!
//! Decisions run on the blocking pool so that a decision waiting on the
//! state lock never stalls the accept loop.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ah_core::Conflict;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::http::{Request, Response, read_request};
use crate::protocol::ResolveRequest;
use crate::session::ResolutionSession;
use crate::{Error, Result};

const READ_TIMEOUT: Duration = Duration::from_secs(10);

const INDEX_HTML: &str = include_str!("index.html");

/// State shared by connection tasks.
struct Shared {
    session: Mutex<ResolutionSession>,
    conflicts: Vec<Conflict>,
    shutdown: watch::Sender<bool>,
}

/// Result of routing one request.
struct Routed {
    response: Response,
    shutdown: bool,
}

impl Routed {
    fn respond(response: Response) -> Self {
        Self {
            response,
            shutdown: false,
        }
    }
}

pub struct SessionServer {
    listener: TcpListener,
    shared: Arc<Shared>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SessionServer {
    /// Bind to `addr`, which must be a loopback address. Port 0 picks a free
    /// port; see [`local_addr`](Self::local_addr).
    pub async fn bind(session: ResolutionSession, addr: SocketAddr) -> Result<Self> {
        if !addr.ip().is_loopback() {
            return Err(Error::NotLoopback { addr });
        }
        let listener = TcpListener::bind(addr).await?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        let conflicts = session.conflicts().to_vec();

        tracing::info!(addr = %listener.local_addr()?, "Session server listening");
        Ok(Self {
            listener,
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                conflicts,
                shutdown,
            }),
            shutdown_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn url(&self) -> Result<String> {
        Ok(format!("http://{}", self.local_addr()?))
    }

    /// Serve until a client ends the session, then hand the session back
    /// for [`ResolutionSession::finish`].
    pub async fn serve(self) -> Result<ResolutionSession> {
        let Self {
            listener,
            shared,
            mut shutdown_rx,
        } = self;
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            tracing::debug!(%peer, "Accepted session connection");
                            connections.spawn(handle_connection(stream, Arc::clone(&shared)));
                        }
                        Err(e) => tracing::warn!(error = %e, "Accept failed"),
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }

        drop(listener);
        while connections.join_next().await.is_some() {}

        let shared = Arc::try_unwrap(shared)
            .map_err(|_| Error::Task("session still referenced after shutdown".to_string()))?;
        shared
            .session
            .into_inner()
            .map_err(|_| Error::Task("session state poisoned".to_string()))
    }
}

async fn handle_connection(stream: TcpStream, shared: Arc<Shared>) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let routed = match tokio::time::timeout(READ_TIMEOUT, read_request(&mut reader)).await {
        Ok(Ok(Some(request))) => route(request, &shared).await,
        Ok(Ok(None)) => return,
        Ok(Err(e)) => Routed::respond(Response::error(400, &e.to_string())),
        Err(_) => Routed::respond(Response::error(400, "timed out reading request")),
    };

    if let Err(e) = routed.response.write_to(&mut write_half).await {
        tracing::debug!(error = %e, "Failed to write session response");
    }
    if routed.shutdown {
        let _ = shared.shutdown.send(true);
    }
}

async fn route(request: Request, shared: &Arc<Shared>) -> Routed {
    tracing::debug!(method = %request.method, path = %request.path, "Session request");
    let method = request.method.as_str();

    match request.path.as_str() {
        "/" | "/index.html" => match method {
            "GET" => Routed::respond(Response::html(INDEX_HTML)),
            _ => Routed::respond(method_not_allowed()),
        },
        "/api/conflicts" => match method {
            "GET" => Routed::respond(Response::json(200, &shared.conflicts)),
            _ => Routed::respond(method_not_allowed()),
        },
        "/api/resolve" => match method {
            "POST" => Routed::respond(resolve(&request.body, shared).await),
            _ => Routed::respond(method_not_allowed()),
        },
        "/api/shutdown" => match method {
            "GET" | "POST" => Routed {
                response: Response::json(200, &serde_json::json!({"status": "shutting down"})),
                shutdown: true,
            },
            _ => Routed::respond(method_not_allowed()),
        },
        _ => Routed::respond(Response::error(404, "not found")),
    }
}

fn method_not_allowed() -> Response {
    Response::error(405, "method not allowed")
}

async fn resolve(body: &[u8], shared: &Arc<Shared>) -> Response {
    let request: ResolveRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => return Response::error(400, &format!("malformed body: {e}")),
    };
    tracing::info!(alias = %request.alias, action = %request.action, "Resolve requested");

    let shared = Arc::clone(shared);
    let result = tokio::task::spawn_blocking(move || {
        let mut session = shared
            .session
            .lock()
            .map_err(|_| Error::Task("session state poisoned".to_string()))?;
        session.resolve(request)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))
    .and_then(|inner| inner);

    match result {
        Ok(outcome) => Response::json(200, &outcome),
        Err(e) => {
            if e.status_code() == 500 {
                tracing::warn!(error = %e, "Resolve failed");
            }
            Response::error(e.status_code(), &e.to_string())
        }
    }
}
