//! HTTP surface of the enrichment service.

use std::sync::Arc;

use actix_web::{dev::ServerHandle, web, App, HttpResponse, HttpServer};
use mintscope_common::dto::{EnrichmentResponse, ErrorResponse};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::enrichment::BatchEnricher;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EnrichQueryParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    100
}

pub(crate) struct EnrichmentHandler {
    enricher: Arc<BatchEnricher>,
}

impl EnrichmentHandler {
    fn new(enricher: Arc<BatchEnricher>) -> Self {
        Self { enricher }
    }
}

/// Runs one enrichment pass over the requested page.
///
/// Always answers 200 with aggregate counts; only a failed page read turns
/// into a 500 with the underlying message.
#[instrument(skip(handler))]
async fn enrich_metadata(
    handler: web::Data<EnrichmentHandler>,
    params: web::Query<EnrichQueryParams>,
) -> HttpResponse {
    match handler
        .enricher
        .enrich_page(params.limit, params.offset)
        .await
    {
        Ok(summary) => HttpResponse::Ok().json(EnrichmentResponse::from_summary(&summary)),
        Err(err) => {
            error!(error = %err, "Enrichment pass failed");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to enrich metadata".to_string(),
                details: err.to_string(),
            })
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

pub struct ServicesBuilder {
    enricher: Arc<BatchEnricher>,
    prefix: String,
    bind: String,
    port: u16,
}

impl ServicesBuilder {
    pub fn new(enricher: Arc<BatchEnricher>) -> Self {
        Self {
            enricher,
            prefix: "v1".to_string(),
            bind: "0.0.0.0".to_string(),
            port: 3000,
        }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn bind(mut self, bind: &str) -> Self {
        self.bind = bind.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn run(self) -> Result<(ServerHandle, JoinHandle<Result<(), anyhow::Error>>), anyhow::Error> {
        info!(bind = self.bind, port = self.port, "Starting enrichment server");

        let handler_data = web::Data::new(EnrichmentHandler::new(self.enricher));
        let prefix = self.prefix;
        let server = HttpServer::new(move || {
            App::new()
                .app_data(handler_data.clone())
                .service(
                    web::resource(format!("/{prefix}/enrich-metadata"))
                        .route(web::get().to(enrich_metadata)),
                )
                .service(web::resource(format!("/{prefix}/health")).route(web::get().to(health)))
        })
        .bind((self.bind.as_str(), self.port))?
        .run();

        let handle = server.handle();
        let task = tokio::spawn(async move { server.await.map_err(Into::into) });
        Ok((handle, task))
    }
}
