pub mod dashboard;
pub mod page;
pub mod refresh;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::Theme;
use crate::services::DashboardService;

/// State shared by every connection.
/// The mutex makes pipeline runs happen one at a time.
pub struct AppState {
    pub config: Config,
    pub dashboard: Mutex<DashboardService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let dashboard = DashboardService::new(&config);
        Self {
            config,
            dashboard: Mutex::new(dashboard),
        }
    }
}

/// Accept connections until the runtime shuts down
pub async fn run_server(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = state.config.listen_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let state = state.clone();
                async move { handle_request(req, &state).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}

/// Route a request. The request body is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, Infallible> {
    info!("{} {}", req.method(), req.uri());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let theme = query_param(req.uri(), "theme")
        .map(|t| Theme::parse(&t))
        .unwrap_or_default();
    drop(req);

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/") => dashboard::execute(state, theme).await,
        (&Method::GET | &Method::POST, "/refresh") => refresh::execute(state, theme).await,
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            respond(StatusCode::OK, "text/plain", "OK")
        }
        _ => respond(StatusCode::NOT_FOUND, "text/plain", "Not Found"),
    };

    Ok(response)
}

/// First value of a query-string parameter, percent-decoded
pub fn query_param(uri: &Uri, name: &str) -> Option<String> {
    uri.query()?
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .map(|(key, value)| (decode_component(key), value))
        .find(|(key, _)| key == name)
        .map(|(_, value)| decode_component(value))
}

/// Form-style decoding: `+` is a space. Invalid UTF-8 is kept as sent.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode(&spaced).map(|d| d.into_owned());
    decoded.unwrap_or(spaced)
}

pub fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubServer;
    use http_body_util::BodyExt;
    use hyper::header::LOCATION;

    const TEMP_PATH: &str = "/api/v2/someone/feeds/temperature/data";
    const HUMID_PATH: &str = "/api/v2/someone/feeds/humidity/data";

    fn state(base_url: &str) -> AppState {
        let base_url = base_url.to_string();
        let config = Config::from_lookup(|name| match name {
            "AIO_USERNAME" => Some("someone".to_string()),
            "AIO_BASE_URL" => Some(base_url.clone()),
            _ => None,
        })
        .unwrap();
        AppState::new(config)
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_query_param() {
        let uri: Uri = "/?theme=dark&x".parse().unwrap();
        assert_eq!(query_param(&uri, "theme").as_deref(), Some("dark"));
        assert_eq!(query_param(&uri, "x").as_deref(), Some(""));
        assert_eq!(query_param(&uri, "y"), None);
        assert_eq!(query_param(&"/".parse().unwrap(), "theme"), None);
    }

    #[test]
    fn test_query_param_is_percent_decoded() {
        let uri: Uri = "/?th%65me=d%61rk&note=a+b%20c&bad=%FF".parse().unwrap();
        assert_eq!(query_param(&uri, "theme").as_deref(), Some("dark"));
        assert_eq!(query_param(&uri, "note").as_deref(), Some("a b c"));
        assert_eq!(query_param(&uri, "bad").as_deref(), Some("%FF"));
        assert_eq!(Theme::parse(&query_param(&uri, "theme").unwrap()), Theme::Dark);
    }

    #[tokio::test]
    async fn test_health_and_not_found() {
        let stub = StubServer::start(&[]).await;
        let state = state(&stub.base_url);

        let health = handle_request(request(Method::GET, "/health"), &state).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(body_text(health).await, "OK");

        let missing = handle_request(request(Method::GET, "/nope"), &state).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let wrong_method = handle_request(request(Method::DELETE, "/"), &state).await.unwrap();
        assert_eq!(wrong_method.status(), StatusCode::NOT_FOUND);
        assert_eq!(stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_page_without_data() {
        let stub = StubServer::start(&[(TEMP_PATH, 200, "[]"), (HUMID_PATH, 200, "[]")]).await;
        let state = state(&stub.base_url);

        let response = handle_request(request(Method::GET, "/?theme=dark"), &state).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let body = body_text(response).await;
        assert!(body.contains("No valid data available"));
        assert!(body.contains("class=\"theme-dark\""));
        assert!(!body.contains("<img"));
    }

    #[tokio::test]
    async fn test_refresh_clears_cache_and_redirects() {
        let stub = StubServer::start(&[(TEMP_PATH, 200, "[]"), (HUMID_PATH, 200, "[]")]).await;
        let state = state(&stub.base_url);

        handle_request(request(Method::GET, "/"), &state).await.unwrap();
        handle_request(request(Method::GET, "/"), &state).await.unwrap();
        assert_eq!(stub.hits(), 2);

        let response = handle_request(request(Method::POST, "/refresh?theme=dark"), &state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/?theme=dark");

        handle_request(request(Method::GET, "/"), &state).await.unwrap();
        assert_eq!(stub.hits(), 4);
    }
}
