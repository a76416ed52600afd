use hotspot_shared::{LoadError, VisualizationModel, parse_dataset};

/// Fetch the hotspot dataset and build the visualization model.
pub async fn load_dataset(url: &str) -> Result<VisualizationModel, LoadError> {
    tracing::info!(url, "loading hotspot dataset");
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| LoadError::Fetch(e.to_string()))?;
    if !resp.ok() {
        return Err(LoadError::Http(resp.status()));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| LoadError::Fetch(e.to_string()))?;
    parse_dataset(&body)
}
