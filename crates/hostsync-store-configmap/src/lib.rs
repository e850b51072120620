// # Kubernetes ConfigMap Store
//
// This crate provides the ConfigMap-backed configuration store for hostsync.
//
// ## Behaviour
//
// - `get` reads the ConfigMap; the resource version becomes the record revision
// - `replace` writes the full ConfigMap back with that resource version, so
//   the API server rejects it with 409 if anyone else wrote in between
// - Every ConfigMap field outside `data` (labels, annotations, binaryData,
//   owner references...) is round-tripped through `ConfigRecord::source`
// - The store never creates ConfigMaps
//
// ## Error Mapping
//
// | API result            | Error            |
// |-----------------------|------------------|
// | 404 Not Found         | `RecordNotFound` |
// | 409 Conflict          | `Conflict`       |
// | other API status      | `Store`          |
// | connection / service  | `Transport`      |

use async_trait::async_trait;
use hostsync_core::traits::{ConfigRecord, ConfigStore, RecordId};
use hostsync_core::{Error, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, PostParams};
use kube::Client;

/// ConfigMap-backed configuration store
#[derive(Clone)]
pub struct ConfigMapStore {
    client: Client,
}

impl std::fmt::Debug for ConfigMapStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMapStore")
            .field("default_namespace", &self.client.default_namespace())
            .finish()
    }
}

impl ConfigMapStore {
    /// Create a store around an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a store from the inferred cluster configuration
    ///
    /// Uses the in-cluster service account when available, otherwise the
    /// kubeconfig named by `KUBECONFIG` (or the default location).
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .map_err(|e| Error::config(format!("Error building Kubernetes client: {}", e)))?;
        Ok(Self::new(client))
    }

    fn api(&self, id: &RecordId) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), &id.namespace)
    }
}

/// Convert a ConfigMap into a record, keeping the full object as `source`
fn to_record(id: &RecordId, config_map: &ConfigMap) -> Result<ConfigRecord> {
    let source = serde_json::to_value(config_map)
        .map_err(|e| Error::store(format!("Failed to serialize ConfigMap {}: {}", id, e)))?;

    Ok(ConfigRecord {
        id: id.clone(),
        revision: config_map.metadata.resource_version.clone(),
        data: config_map.data.clone().unwrap_or_default(),
        source,
    })
}

/// Rebuild the ConfigMap to submit for a record
///
/// Starts from `source` so unmapped fields survive, then applies the
/// record's identity, data and revision.
fn to_config_map(record: &ConfigRecord) -> Result<ConfigMap> {
    let mut config_map: ConfigMap = if record.source.is_null() {
        ConfigMap::default()
    } else {
        serde_json::from_value(record.source.clone()).map_err(|e| {
            Error::store(format!("Invalid source document for {}: {}", record.id, e))
        })?
    };

    config_map.metadata.name = Some(record.id.name.clone());
    config_map.metadata.namespace = Some(record.id.namespace.clone());
    config_map.metadata.resource_version = record.revision.clone();
    config_map.data = Some(record.data.clone());

    Ok(config_map)
}

/// Map a Kubernetes client error onto the hostsync error taxonomy
fn map_kube_error(id: &RecordId, err: kube::Error) -> Error {
    match err {
        kube::Error::Api(response) => match response.code {
            404 => Error::record_not_found(format!("ConfigMap {}", id)),
            409 => Error::conflict(format!("ConfigMap {}: {}", id, response.message)),
            code => Error::store(format!(
                "ConfigMap {}: {} ({}): {}",
                id, response.reason, code, response.message
            )),
        },
        kube::Error::SerdeError(e) => {
            Error::store(format!("ConfigMap {}: invalid API payload: {}", id, e))
        }
        other => Error::transport(format!("ConfigMap {}: {}", id, other)),
    }
}

#[async_trait]
impl ConfigStore for ConfigMapStore {
    async fn get(&self, id: &RecordId) -> Result<Option<ConfigRecord>> {
        tracing::debug!("Getting ConfigMap {}", id);

        let config_map = self
            .api(id)
            .get_opt(&id.name)
            .await
            .map_err(|e| map_kube_error(id, e))?;

        config_map.map(|cm| to_record(id, &cm)).transpose()
    }

    async fn replace(&self, record: &ConfigRecord) -> Result<ConfigRecord> {
        let config_map = to_config_map(record)?;

        tracing::debug!(
            "Replacing ConfigMap {} at resource version {:?}",
            record.id,
            record.revision
        );

        let written = self
            .api(&record.id)
            .replace(&record.id.name, &PostParams::default(), &config_map)
            .await
            .map_err(|e| map_kube_error(&record.id, e))?;

        to_record(&record.id, &written)
    }

    fn store_name(&self) -> &'static str {
        "configmap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use axum::extract::State;
    use axum::http::{StatusCode, Uri};
    use axum::routing::get;
    use axum::{Json, Router};
    use kube::error::ErrorResponse;
    use serde_json::{Value, json};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    fn id() -> RecordId {
        RecordId::new("kube-system", "netbox-hosts")
    }

    fn config_map() -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some("netbox-hosts".to_string()),
                namespace: Some("kube-system".to_string()),
                resource_version: Some("4711".to_string()),
                labels: Some([("app".to_string(), "coredns".to_string())].into()),
                annotations: Some([("owner".to_string(), "netops".to_string())].into()),
                ..ObjectMeta::default()
            },
            data: Some(
                [
                    ("hosts".to_string(), "old".to_string()),
                    ("Corefile".to_string(), ".:53 {}".to_string()),
                ]
                .into(),
            ),
            binary_data: Some([("blob".to_string(), ByteString(vec![1, 2, 3]))].into()),
            ..ConfigMap::default()
        }
    }

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} happened", reason),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_record_carries_resource_version_and_data() {
        let record = to_record(&id(), &config_map()).unwrap();

        assert_eq!(record.revision.as_deref(), Some("4711"));
        assert_eq!(record.field("hosts"), Some("old"));
        assert_eq!(record.field("Corefile"), Some(".:53 {}"));
    }

    #[test]
    fn test_unmapped_fields_survive_the_round_trip() {
        let mut record = to_record(&id(), &config_map()).unwrap();
        record.set_field("hosts", "10.0.0.1 gw.lan # gateway");

        let written = to_config_map(&record).unwrap();
        let original = config_map();

        assert_eq!(written.metadata.labels, original.metadata.labels);
        assert_eq!(written.metadata.annotations, original.metadata.annotations);
        assert_eq!(written.binary_data, original.binary_data);
        assert_eq!(written.metadata.resource_version.as_deref(), Some("4711"));

        let data = written.data.unwrap();
        assert_eq!(data.get("hosts").map(String::as_str), Some("10.0.0.1 gw.lan # gateway"));
        assert_eq!(data.get("Corefile").map(String::as_str), Some(".:53 {}"));
    }

    #[test]
    fn test_missing_data_becomes_empty_map() {
        let mut cm = config_map();
        cm.data = None;

        let record = to_record(&id(), &cm).unwrap();
        assert!(record.data.is_empty());
    }

    #[test]
    fn test_record_without_source_builds_minimal_config_map() {
        let record = ConfigRecord::new(id(), Some("1".to_string()), BTreeMap::new());
        let cm = to_config_map(&record).unwrap();

        assert_eq!(cm.metadata.name.as_deref(), Some("netbox-hosts"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("kube-system"));
        assert_eq!(cm.metadata.resource_version.as_deref(), Some("1"));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            map_kube_error(&id(), api_error(404, "NotFound")),
            Error::RecordNotFound(_)
        ));
        assert!(matches!(
            map_kube_error(&id(), api_error(409, "Conflict")),
            Error::Conflict(_)
        ));

        let err = map_kube_error(&id(), api_error(403, "Forbidden"));
        assert!(matches!(err, Error::Store(_)));
        assert!(err.to_string().contains("Forbidden"));
    }

    /// In-process stand-in for the ConfigMap endpoints of an API server
    ///
    /// GET returns the stored object, PUT only succeeds when the submitted
    /// resource version matches the stored one.
    #[derive(Clone, Default)]
    struct FakeApiServer {
        object: Arc<Mutex<Option<Value>>>,
    }

    impl FakeApiServer {
        fn seeded() -> Self {
            let mut object = serde_json::to_value(config_map()).unwrap();
            object["metadata"]["resourceVersion"] = json!("1");
            Self {
                object: Arc::new(Mutex::new(Some(object))),
            }
        }

        fn stored(&self) -> Option<Value> {
            self.object.lock().unwrap().clone()
        }

        fn delete(&self) {
            *self.object.lock().unwrap() = None;
        }
    }

    fn api_status(code: StatusCode, reason: &str) -> (StatusCode, Json<Value>) {
        (
            code,
            Json(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": format!("configmaps \"netbox-hosts\": {}", reason),
                "reason": reason,
                "code": code.as_u16(),
            })),
        )
    }

    async fn get_config_map(State(api): State<FakeApiServer>) -> (StatusCode, Json<Value>) {
        match api.stored() {
            Some(object) => (StatusCode::OK, Json(object)),
            None => api_status(StatusCode::NOT_FOUND, "NotFound"),
        }
    }

    async fn put_config_map(
        State(api): State<FakeApiServer>,
        Json(mut body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let mut object = api.object.lock().unwrap();
        let current = match object.as_ref() {
            Some(current) => current["metadata"]["resourceVersion"].clone(),
            None => return api_status(StatusCode::NOT_FOUND, "NotFound"),
        };
        if body["metadata"]["resourceVersion"] != current {
            return api_status(StatusCode::CONFLICT, "Conflict");
        }

        let next = current.as_str().and_then(|v| v.parse::<u64>().ok()).unwrap_or(0) + 1;
        body["metadata"]["resourceVersion"] = json!(next.to_string());
        *object = Some(body.clone());
        (StatusCode::OK, Json(body))
    }

    /// Serve the fake API on an ephemeral local port and return a store talking to it
    async fn store_for(api: FakeApiServer) -> ConfigMapStore {
        let router = Router::new()
            .route(
                "/api/v1/namespaces/kube-system/configmaps/netbox-hosts",
                get(get_config_map).put(put_config_map),
            )
            .with_state(api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let uri: Uri = format!("http://{}", listener.local_addr().unwrap())
            .parse()
            .unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = Client::try_from(kube::Config::new(uri)).unwrap();
        ConfigMapStore::new(client)
    }

    #[tokio::test]
    async fn test_get_missing_config_map_is_none() {
        let store = store_for(FakeApiServer::default()).await;

        assert!(store.get(&id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_reads_resource_version_and_data() {
        let store = store_for(FakeApiServer::seeded()).await;

        let record = store.get(&id()).await.unwrap().unwrap();
        assert_eq!(record.revision.as_deref(), Some("1"));
        assert_eq!(record.field("hosts"), Some("old"));
    }

    #[tokio::test]
    async fn test_replace_writes_hosts_and_keeps_other_fields() {
        let api = FakeApiServer::seeded();
        let store = store_for(api.clone()).await;

        let mut record = store.get(&id()).await.unwrap().unwrap();
        record.set_field("hosts", "10.0.0.1 gw.lan # gateway");
        let written = store.replace(&record).await.unwrap();

        assert_eq!(written.revision.as_deref(), Some("2"));
        assert_eq!(written.field("hosts"), Some("10.0.0.1 gw.lan # gateway"));

        let stored = api.stored().unwrap();
        assert_eq!(stored["data"]["Corefile"], json!(".:53 {}"));
        assert_eq!(stored["metadata"]["labels"]["app"], json!("coredns"));
        assert_eq!(stored["metadata"]["annotations"]["owner"], json!("netops"));
        assert!(stored["binaryData"]["blob"].is_string());
    }

    #[tokio::test]
    async fn test_replace_with_stale_revision_is_conflict() {
        let store = store_for(FakeApiServer::seeded()).await;

        let mut ours = store.get(&id()).await.unwrap().unwrap();
        let mut theirs = store.get(&id()).await.unwrap().unwrap();
        theirs.set_field("hosts", "10.0.0.9 other.lan # competitor");
        store.replace(&theirs).await.unwrap();

        ours.set_field("hosts", "10.0.0.1 gw.lan # gateway");
        let err = store.replace(&ours).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "got {:?}", err);

        let current = store.get(&id()).await.unwrap().unwrap();
        assert_eq!(current.field("hosts"), Some("10.0.0.9 other.lan # competitor"));
    }

    #[tokio::test]
    async fn test_replace_after_delete_is_record_not_found() {
        let api = FakeApiServer::seeded();
        let store = store_for(api.clone()).await;

        let record = store.get(&id()).await.unwrap().unwrap();
        api.delete();

        let err = store.replace(&record).await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(_)), "got {:?}", err);
    }
}
