//! Scripted in-process transport for tests.
//!
//! Routes are keyed by method and path. Each route answers from a queue of
//! canned replies (the last reply repeats once the queue drains) or from a
//! handler closure that can inspect the request, e.g. to answer 401 unless a
//! particular bearer token is attached. A route can be gated so its replies
//! are held until the test opens the gate, which keeps a refresh in flight
//! while concurrent callers pile up.

use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::watch;

type Reply = Result<ApiResponse, TransportError>;
type Handler = Arc<dyn Fn(&ApiRequest) -> Reply + Send + Sync>;

enum Route {
    Queue(VecDeque<Reply>),
    Handler(Handler),
}

/// Holds replies on a route until [`Gate::open`] is called.
#[derive(Clone)]
pub struct Gate {
    tx: Arc<watch::Sender<bool>>,
}

impl Gate {
    pub fn open(&self) {
        let _ = self.tx.send(true);
    }
}

/// In-process [`HttpTransport`] that records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    gates: Mutex<HashMap<(Method, String), Gate>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for a route.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Ok(ApiResponse::new(status, body)));
    }

    /// Queue a transport failure for a route.
    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.push(method, path, Err(error));
    }

    /// Answer a route with a closure instead of a queue.
    pub fn handle<F>(&self, method: Method, path: &str, handler: F)
    where
        F: Fn(&ApiRequest) -> Reply + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .insert((method, path.to_string()), Route::Handler(Arc::new(handler)));
    }

    /// Answer 200 with `ok` when the request carries `bearer`, 401 otherwise.
    pub fn require_bearer(&self, method: Method, path: &str, bearer: &str, ok: Value) {
        let bearer = bearer.to_string();
        self.handle(method, path, move |request| {
            if request.bearer.as_deref() == Some(bearer.as_str()) {
                Ok(ApiResponse::new(200, ok.clone()))
            } else {
                Ok(ApiResponse::new(401, json!({"message": "Unauthorized"})))
            }
        });
    }

    /// Hold every reply on this route until the returned gate is opened.
    pub fn gate(&self, method: Method, path: &str) -> Gate {
        let (tx, _rx) = watch::channel(false);
        let gate = Gate { tx: Arc::new(tx) };
        self.gates
            .lock()
            .insert((method, path.to_string()), gate.clone());
        gate
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests sent to a route.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().len()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        let mut routes = self.routes.lock();
        let route = routes
            .entry((method, path.to_string()))
            .or_insert_with(|| Route::Queue(VecDeque::new()));
        if matches!(route, Route::Handler(_)) {
            *route = Route::Queue(VecDeque::new());
        }
        if let Route::Queue(queue) = route {
            queue.push_back(reply);
        }
    }

    fn reply_for(&self, request: &ApiRequest) -> Reply {
        let handler = {
            let mut routes = self.routes.lock();
            match routes.get_mut(&(request.method, request.path.clone())) {
                Some(Route::Queue(queue)) => {
                    let next = if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    };
                    return next.unwrap_or_else(|| Ok(ApiResponse::new(500, Value::Null)));
                }
                Some(Route::Handler(handler)) => handler.clone(),
                None => {
                    return Ok(ApiResponse::new(
                        404,
                        json!({"message": format!("no route for {} {}", request.method, request.path)}),
                    ))
                }
            }
        };
        handler(request)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().push(request.clone());

        let gate = self
            .gates
            .lock()
            .get(&(request.method, request.path.clone()))
            .cloned();
        if let Some(gate) = gate {
            let mut rx = gate.tx.subscribe();
            let _ = rx.wait_for(|open| *open).await;
        }

        self.reply_for(request)
    }
}
