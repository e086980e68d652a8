use crate::generator::scenario::ScenarioConfig;
use crate::report_bridge::model::{MetricsReport, ReportModel};
use crate::workflow::runner::Runner;
use parking_lot::RwLock;
use serde_json::json;
use std::{convert::Infallible, net::SocketAddr, sync::Arc, thread};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter, Reply};

/// HTTP bridge exposing the active earthquakes and accepting scenarios.
#[derive(Clone)]
pub struct ReportBridge {
    state: Arc<RwLock<ReportModel>>,
    runner: Arc<Runner>,
}

impl ReportBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ReportModel::default())),
            runner,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone + Send + Sync + 'static
    {
        let bridge = self.clone();
        let bridge_filter = warp::any().map(move || bridge.clone());

        let earthquakes_route = warp::path("earthquakes")
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: ReportBridge| {
                bridge.refresh();
                warp::reply::json(&bridge.snapshot())
            });

        let metrics_route = warp::path("metrics")
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: ReportBridge| {
                warp::reply::json(&MetricsReport {
                    counters: bridge.runner.metrics(),
                    active_earthquakes: bridge.runner.earthquakes().len(),
                })
            });

        let scenario_route = warp::path("ingest-scenario")
            .and(warp::post())
            .and(warp::body::json())
            .and(bridge_filter)
            .and_then(|scenario: ScenarioConfig, bridge: ReportBridge| async move {
                Ok::<_, Infallible>(bridge.ingest(scenario).await)
            });

        earthquakes_route.or(metrics_route).or(scenario_route)
    }

    async fn ingest(&self, scenario: ScenarioConfig) -> warp::reply::WithStatus<warp::reply::Json> {
        let runner = self.runner.clone();
        let description = scenario.description.clone().unwrap_or_default();
        // The search is CPU bound; keep it off the reactor.
        let outcome = tokio::task::spawn_blocking(move || runner.execute(&scenario)).await;
        match outcome {
            Ok(Ok(result)) => {
                let archived = self.state.read().archived;
                *self.state.write() = ReportModel::from_result(&result, archived);
                if let Some(name) = result.scenario.as_ref() {
                    log::info!("scenario {} -> {} earthquake(s)", name, result.earthquake_count());
                }
                warp::reply::with_status(
                    warp::reply::json(&json!({
                        "status": "ok",
                        "earthquakes": result.earthquake_count(),
                        "outcomes": result.outcomes,
                        "description": description,
                    })),
                    StatusCode::OK,
                )
            }
            Ok(Err(err)) => {
                log::warn!("ingest-scenario error: {:#}", err);
                warp::reply::with_status(
                    warp::reply::json(&json!({"status": "error", "message": format!("{:#}", err)})),
                    StatusCode::UNPROCESSABLE_ENTITY,
                )
            }
            Err(err) => {
                log::error!("ingest-scenario worker failed: {}", err);
                warp::reply::with_status(
                    warp::reply::json(&json!({"status": "error"})),
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            }
        }
    }

    /// Serves the routes on a dedicated thread.
    pub fn spawn(&self, address: SocketAddr) {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_multi_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("failed to build report bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
        log::info!("report bridge listening on http://{}", address);
    }

    /// Pulls the current active set from the runner.
    pub fn refresh(&self) {
        let earthquakes = self.runner.earthquakes();
        self.state.write().earthquakes = earthquakes;
    }

    pub fn record_archived(&self, count: usize) {
        if count > 0 {
            let mut state = self.state.write();
            state.archived += count;
            state.earthquakes = self.runner.earthquakes();
        }
    }

    pub fn publish(&self, model: ReportModel) {
        log::info!(
            "[report] earthquakes: {}, archived: {}",
            model.earthquakes.len(),
            model.archived
        );
        *self.state.write() = model;
    }

    pub fn publish_status(&self, message: &str) {
        println!("[report] {}", message);
    }

    pub fn snapshot(&self) -> ReportModel {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;

    fn bridge() -> ReportBridge {
        ReportBridge::new(Arc::new(Runner::new(WorkflowConfig::default()).unwrap()))
    }

    #[test]
    fn publish_replaces_the_model() {
        let bridge = bridge();
        bridge.publish(ReportModel {
            last_scenario: Some("replay".into()),
            archived: 3,
            ..Default::default()
        });
        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.last_scenario.as_deref(), Some("replay"));
        assert_eq!(snapshot.archived, 3);
    }

    #[tokio::test]
    async fn routes_report_metrics_and_unknown_paths() {
        let routes = bridge().routes();
        let metrics = warp::test::request()
            .method("GET")
            .path("/metrics")
            .reply(&routes)
            .await;
        assert_eq!(metrics.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(metrics.body()).unwrap();
        assert_eq!(body["active_earthquakes"], 0);
        assert_eq!(body["passes"], 0);

        let missing = warp::test::request()
            .method("GET")
            .path("/nothing")
            .reply(&routes)
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ingested_scenario_becomes_an_earthquake() {
        let routes = bridge().routes();
        let ingest = warp::test::request()
            .method("POST")
            .path("/ingest-scenario")
            .json(&ScenarioConfig {
                origin_ms: Some(5_000_000),
                seed: 2,
                name: Some("bridge".into()),
                ..Default::default()
            })
            .reply(&routes)
            .await;
        assert_eq!(ingest.status(), StatusCode::OK);

        let listing = warp::test::request()
            .method("GET")
            .path("/earthquakes")
            .reply(&routes)
            .await;
        let model: ReportModel = serde_json::from_slice(listing.body()).unwrap();
        assert_eq!(model.earthquakes.len(), 1);
        assert_eq!(model.last_scenario.as_deref(), Some("bridge"));
    }
}
