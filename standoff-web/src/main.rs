//! Servidor web Axum com WebSocket para pré-visualizar a conversão standoff → SpERT
//!
//! - `POST /convert`: converte um par texto + `.ann` e devolve registros e relatório.
//! - `GET /policies`: nomes das regras e políticas aceitas na configuração.
//! - `GET /ws`: recebe a mesma requisição do `/convert` e transmite cada
//!   [`PipelineEvent`] em JSON.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use standoff_core::{
    ConversionConfig, Converter, DiscontRule, DocumentRecord, DocumentReport, OverlapRule,
    PipelineEvent, TokenizationPolicy,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Estado compartilhado da aplicação
struct AppState {
    /// Configuração usada quando a requisição não traz uma
    default_config: ConversionConfig,
}

#[derive(Debug, Deserialize)]
struct ConvertRequest {
    text: String,
    annotations: String,
    #[serde(default)]
    doc_id: Option<String>,
    #[serde(default)]
    config: Option<ConversionConfig>,
}

#[derive(Serialize)]
struct ConvertResponse {
    records: Vec<DocumentRecord>,
    report: DocumentReport,
    processing_ms: u64,
}

#[derive(Serialize)]
struct PoliciesResponse {
    discont_rules: Vec<&'static str>,
    overlap_rules: Vec<&'static str>,
    tokenizers: Vec<&'static str>,
    defaults: ConversionConfig,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("STANDOFF_WEB_ADDR")
        .ok()
        .and_then(|a| a.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

    let state = Arc::new(AppState {
        default_config: ConversionConfig::default(),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Servidor de conversão iniciado em http://{addr}");
    axum::serve(listener, app(state)).await
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/convert", post(convert_handler))
        .route("/policies", get(policies_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Conversão via HTTP POST (sem streaming)
async fn convert_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConvertRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() && req.annotations.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto e anotações vazios"})),
        )
            .into_response();
    }

    let config = req.config.unwrap_or_else(|| state.default_config.clone());
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        Converter::new(config).convert(req.doc_id.as_deref(), &req.text, &req.annotations)
    })
    .await;

    match result {
        Ok(conversion) => Json(ConvertResponse {
            records: conversion.records,
            report: conversion.report,
            processing_ms: start.elapsed().as_millis() as u64,
        })
        .into_response(),
        Err(err) => {
            warn!(error = %err, "conversão interrompida");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Falha interna na conversão"})),
            )
                .into_response()
        }
    }
}

/// Lista os nomes aceitos pela configuração
async fn policies_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(PoliciesResponse {
        discont_rules: DiscontRule::all().iter().map(DiscontRule::name).collect(),
        overlap_rules: OverlapRule::all().iter().map(OverlapRule::name).collect(),
        tokenizers: TokenizationPolicy::all()
            .iter()
            .map(TokenizationPolicy::name)
            .collect(),
        defaults: state.default_config.clone(),
    })
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe requisições de conversão e devolve os eventos do pipeline, um por mensagem
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let req = match serde_json::from_str::<ConvertRequest>(&text) {
                    Ok(req) => req,
                    Err(err) => {
                        let error = serde_json::json!({
                            "type": "Error",
                            "data": {"message": format!("requisição inválida: {err}")}
                        });
                        if socket.send(Message::Text(error.to_string())).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };

                info!(
                    doc = ?req.doc_id,
                    chars = req.text.len(),
                    "Convertendo via WebSocket"
                );

                let config = req.config.clone().unwrap_or_else(|| state.default_config.clone());
                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();

                // O pipeline é síncrono: roda fora do runtime
                let handle = tokio::task::spawn_blocking(move || {
                    Converter::new(config).convert_streaming(
                        req.doc_id.as_deref(),
                        &req.text,
                        &req.annotations,
                        tx,
                    );
                });
                if handle.await.is_err() {
                    warn!("conversão interrompida");
                    continue;
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(Arc::new(AppState {
            default_config: ConversionConfig::default(),
        }))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_convert(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/convert")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_convert_endpoint() {
        let response = test_app()
            .oneshot(post_convert(serde_json::json!({
                "text": "John met Mary.",
                "annotations": "T1\tPERSON 0 4\tJohn\nT2\tPERSON 9 13\tMary\nR1\tMET Arg1:T1 Arg2:T2\n",
                "doc_id": "doc1",
                "config": {"include_docid": true}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["records"][0]["orig_id"], "doc1");
        assert_eq!(json["records"][0]["entities"][1]["start"], 2);
        assert_eq!(json["records"][0]["relations"][0]["type"], "MET");
        assert_eq!(json["report"]["entities"], 2);
    }

    #[tokio::test]
    async fn test_convert_rejects_empty_request() {
        let response = test_app()
            .oneshot(post_convert(serde_json::json!({"text": " ", "annotations": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_convert_rejects_unknown_rule() {
        let response = test_app()
            .oneshot(post_convert(serde_json::json!({
                "text": "a",
                "annotations": "",
                "config": {"overlap_rule": "keep-middle"}
            })))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_policies_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/policies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["overlap_rules"][0], "keep-longer");
        assert_eq!(json["tokenizers"].as_array().unwrap().len(), 3);
        assert_eq!(json["defaults"]["discont_rule"], "span-to-whole");
    }
}
