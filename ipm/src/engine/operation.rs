//! Engine-driven CRUD and action dispatch over a [`Transport`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::EngineError;
use super::identifier::ResourceIdentifier;
use super::normalize::{decode, normalize, Normalized};
use super::path::{action_path, positional_path};
use super::populate::{MergePolicy, Populate, Populator};
use super::registry::ResourceKind;
use super::resolve::{resolve_read_path, ReadPath, ReadTarget};
use crate::api::{Method, Transport};

/// Server-assigned fields every resource state carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHeader {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub href: Option<String>,
    pub col_id: Option<i64>,
}

impl StateHeader {
    /// Forgets where the resource lives, so nothing claims it still exists
    pub fn clear_address(&mut self) {
        self.id = None;
        self.href = None;
    }
}

impl Populate for StateHeader {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "id" => p.string(key, value, &mut self.id, MergePolicy::AlwaysOverwrite),
            "parentId" => p.string(key, value, &mut self.parent_id, MergePolicy::AlwaysOverwrite),
            "href" => p.string(key, value, &mut self.href, MergePolicy::AlwaysOverwrite),
            "colid" => p.integer(key, value, &mut self.col_id, MergePolicy::AlwaysOverwrite),
            _ => Ok(()),
        }
    }
}

/// A resource state the engine can address, fetch and populate
pub trait Tracked: Populate {
    const KIND: ResourceKind;

    fn identifier(&self) -> ResourceIdentifier;
    fn header(&self) -> &StateHeader;
    fn header_mut(&mut self) -> &mut StateHeader;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// Hardware-backed entity; only dropped from state
    Forgotten,
}

async fn send(
    transport: &dyn Transport,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Result<Vec<u8>, EngineError> {
    let body = body.map(|b| b.to_string().into_bytes());
    match transport.execute(method, path, body).await {
        Ok(response) => Ok(response),
        Err(e) if e.is_accepted() => {
            tracing::debug!(path, "request accepted without a response body");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

fn populate_response<M: Populate>(model: &mut M, body: &[u8], force: bool) -> Result<(), EngineError> {
    match normalize(decode(body)?) {
        Ok(Normalized::Object(object)) => Populator::new(force).populate(model, &object),
        Ok(Normalized::Empty) | Err(EngineError::NotFound) => Ok(()),
        Err(e) => Err(e),
    }
}

fn write_path<M: Tracked>(model: &M) -> Result<String, EngineError> {
    match model.header().href.as_deref().filter(|h| !h.is_empty()) {
        Some(href) => Ok(href.to_string()),
        None => positional_path(M::KIND, &model.identifier()),
    }
}

fn read_target<M: Tracked>(model: &M) -> Result<ReadPath, EngineError> {
    let identifier = model.identifier();
    let header = model.header();
    resolve_read_path(
        M::KIND,
        ReadTarget {
            href: header.href.as_deref(),
            id: header.id.as_deref(),
            identifier: &identifier,
        },
    )
}

/// Fetches the current representation and populates it into `model`.
///
/// A not-found result or a transport failure clears `id` and `href` before the
/// error is returned.
pub async fn read<M: Tracked>(
    transport: &dyn Transport,
    model: &mut M,
    force: bool,
) -> Result<(), EngineError> {
    let target = read_target(model)?;
    fetch(transport, model, &target, force).await
}

async fn fetch<M: Tracked>(
    transport: &dyn Transport,
    model: &mut M,
    target: &ReadPath,
    force: bool,
) -> Result<(), EngineError> {
    let body = match transport.execute(Method::GET, &target.path, None).await {
        Ok(body) => body,
        Err(e) if e.status() == Some(404) => {
            tracing::warn!(path = %target.path, "resource not found");
            model.header_mut().clear_address();
            return Err(EngineError::NotFound);
        }
        Err(e) => {
            model.header_mut().clear_address();
            return Err(e.into());
        }
    };

    match normalize(decode(&body)?) {
        Ok(Normalized::Object(object)) => Populator::new(force).populate(model, &object),
        Ok(Normalized::Empty) => {
            tracing::debug!(path = %target.path, "empty response, state left as is");
            Ok(())
        }
        Err(EngineError::NotFound) => {
            tracing::warn!(path = %target.path, "query matched nothing");
            model.header_mut().clear_address();
            Err(EngineError::NotFound)
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    /// Written and read back
    Confirmed,
    /// Accepted, but neither the response nor the identifier addresses it yet
    Unaddressed,
}

/// Creates the resource, then reads it back with force.
///
/// Top-level kinds are POSTed to their collection as `[{"config": ...}]`.
/// Nested kinds already exist on the hardware, so their config is PUT in place.
pub async fn create<M: Tracked>(
    transport: &dyn Transport,
    model: &mut M,
    config: Value,
) -> Result<Creation, EngineError> {
    let descriptor = M::KIND.descriptor();
    let identifier = model.identifier();
    let (method, path, body) = if descriptor.is_top_level() {
        (
            Method::POST,
            descriptor.collection_path(&identifier)?,
            json!([{ "config": config }]),
        )
    } else {
        (Method::PUT, descriptor.instance_path(&identifier)?, config)
    };

    let response = match send(transport, method, &path, Some(body)).await {
        Ok(response) => response,
        Err(e) => {
            model.header_mut().clear_address();
            return Err(e);
        }
    };
    populate_response(model, &response, true)?;

    let target = match read_target(model) {
        Ok(target) => target,
        Err(EngineError::MissingIdentifier) => {
            tracing::warn!(%path, "create accepted without an address, skipping read-back");
            return Ok(Creation::Unaddressed);
        }
        Err(e) => return Err(e),
    };
    fetch(transport, model, &target, true).await?;
    Ok(Creation::Confirmed)
}

/// PUTs the config to the href (or positional path), then reads back without force
pub async fn update<M: Tracked>(
    transport: &dyn Transport,
    model: &mut M,
    config: Value,
) -> Result<(), EngineError> {
    let path = write_path(model)?;
    if let Err(e) = send(transport, Method::PUT, &path, Some(config)).await {
        model.header_mut().clear_address();
        return Err(e);
    }
    read(transport, model, false).await
}

pub async fn delete<M: Tracked>(
    transport: &dyn Transport,
    model: &M,
) -> Result<Deletion, EngineError> {
    if !M::KIND.descriptor().is_top_level() {
        tracing::info!(kind = %M::KIND, "nested resource removed from state only");
        return Ok(Deletion::Forgotten);
    }

    let path = write_path(model)?;
    match send(transport, Method::DELETE, &path, None).await {
        Ok(_) => Ok(Deletion::Deleted),
        Err(EngineError::Transport(e)) if e.status() == Some(404) => {
            tracing::debug!(path, "already gone");
            Ok(Deletion::Deleted)
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub path: String,
    /// Response text, empty when the action was only accepted
    pub response: String,
}

/// Posts an action to the path the action table gives for it
pub async fn dispatch_action(
    transport: &dyn Transport,
    type_name: &str,
    identifier: &ResourceIdentifier,
    action: &str,
    body: Option<Value>,
) -> Result<Dispatched, EngineError> {
    let path = action_path(type_name, identifier, action)?;
    tracing::debug!(type_name, %path, "dispatching action");
    let response = send(transport, Method::POST, &path, body).await?;
    Ok(Dispatched {
        path,
        response: String::from_utf8_lossy(&response).into_owned(),
    })
}

/// GETs a collection and populates every element with force
pub async fn fetch_all<T: Populate + Default>(
    transport: &dyn Transport,
    path: &str,
) -> Result<Vec<T>, EngineError> {
    let body = transport.execute(Method::GET, path, None).await?;
    let value = decode(&body)?;
    let value = match value {
        Value::Object(_) => Value::Array(vec![value]),
        other => other,
    };

    let mut items = None;
    Populator::new(true).list("items", &value, &mut items, MergePolicy::AlwaysOverwrite)?;
    Ok(items.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::RecordingTransport;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Default)]
    struct EdfaConfig {
        target_gain: Option<f64>,
    }

    impl Populate for EdfaConfig {
        fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
            match key {
                "targetGain" => p.float(key, value, &mut self.target_gain, MergePolicy::OverwriteIfPresent),
                _ => Ok(()),
            }
        }
    }

    #[derive(Debug, Default)]
    struct Edfa {
        identifier: ResourceIdentifier,
        header: StateHeader,
        config: Option<EdfaConfig>,
    }

    impl Populate for Edfa {
        fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
            match key {
                "config" => p.object(key, value, &mut self.config, MergePolicy::OverwriteIfPresent),
                _ => self.header.populate_field(key, value, p),
            }
        }
    }

    impl Tracked for Edfa {
        const KIND: ResourceKind = ResourceKind::NduEdfa;

        fn identifier(&self) -> ResourceIdentifier {
            self.identifier.clone()
        }

        fn header(&self) -> &StateHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut StateHeader {
            &mut self.header
        }
    }

    #[derive(Debug, Default)]
    struct Ndu {
        identifier: ResourceIdentifier,
        header: StateHeader,
    }

    impl Populate for Ndu {
        fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
            self.header.populate_field(key, value, p)
        }
    }

    impl Tracked for Ndu {
        const KIND: ResourceKind = ResourceKind::Ndu;

        fn identifier(&self) -> ResourceIdentifier {
            self.identifier.clone()
        }

        fn header(&self) -> &StateHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut StateHeader {
            &mut self.header
        }
    }

    fn edfa() -> Edfa {
        Edfa {
            identifier: ResourceIdentifier {
                device_id: Some("dev1".to_string()),
                parent_col_id: Some("3".to_string()),
                col_id: Some("7".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn nested_create_puts_then_reads_with_force() {
        let transport = RecordingTransport::new()
            .respond_empty()
            .respond_json(json!([{
                "id": "e7",
                "href": "/ndus/dev1/ports/3/edfa/7",
                "colid": 7,
                "config": {"targetGain": 12.5}
            }]));

        let mut model = edfa();
        let created = create(&transport, &mut model, json!({"targetGain": 12.5}))
            .await
            .unwrap();
        assert_eq!(created, Creation::Confirmed);

        let calls = transport.calls();
        assert_eq!(calls[0].method, Method::PUT);
        assert_eq!(calls[0].path, "/ndus/dev1/ports/3/edfa/7");
        assert_eq!(calls[0].body, Some(json!({"targetGain": 12.5})));
        assert_eq!(calls[1].method, Method::GET);
        assert_eq!(calls[1].path, "/ndus/dev1/ports/3/edfa/7?content=expanded");

        assert_eq!(model.header.id.as_deref(), Some("e7"));
        assert_eq!(model.header.col_id, Some(7));
        assert_eq!(model.config.unwrap().target_gain, Some(12.5));
    }

    #[tokio::test]
    async fn top_level_create_posts_config_list() {
        let transport = RecordingTransport::new()
            .respond_json(json!([{"id": "n1", "href": "/ndus/n1"}]))
            .respond_json(json!({"id": "n1", "href": "/ndus/n1"}));

        let mut model = Ndu::default();
        create(&transport, &mut model, json!({"name": "ndu-1"}))
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "/ndus");
        assert_eq!(calls[0].body, Some(json!([{"config": {"name": "ndu-1"}}])));
        assert_eq!(calls[1].path, "/ndus/n1?content=expanded");
        assert_eq!(model.header.href.as_deref(), Some("/ndus/n1"));
    }

    #[tokio::test]
    async fn create_tolerates_accepted() {
        let transport = RecordingTransport::new()
            .respond_status(202, "")
            .respond_json(json!({"id": "e7"}));

        let mut model = edfa();
        assert_ok!(create(&transport, &mut model, json!({})).await);
        assert_eq!(model.header.id.as_deref(), Some("e7"));
    }

    #[tokio::test]
    async fn accepted_create_without_address_skips_read_back() {
        let transport = RecordingTransport::new().respond_status(202, "");

        let mut model = Ndu::default();
        let created = assert_ok!(create(&transport, &mut model, json!({"name": "ndu-1"})).await);

        assert_eq!(created, Creation::Unaddressed);
        assert_eq!(transport.paths(), vec!["/ndus".to_string()]);
        assert_eq!(model.header.href, None);
    }

    #[tokio::test]
    async fn create_aborts_on_other_errors() {
        let transport = RecordingTransport::new().respond_status(500, "boom");

        let mut model = edfa();
        model.header.href = Some("/stale".to_string());
        let err = assert_err!(create(&transport, &mut model, json!({})).await);

        assert!(matches!(err, EngineError::Transport(_)));
        assert_eq!(model.header.href, None);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn read_not_found_clears_address() {
        let transport = RecordingTransport::new().respond_json(json!([]));

        let mut model = edfa();
        model.header.id = Some("e7".to_string());
        model.header.href = Some("/ndus/dev1/ports/3/edfa/7".to_string());

        let err = read(&transport, &mut model, false).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound));
        assert_eq!(model.header.id, None);
        assert_eq!(model.header.href, None);
    }

    #[tokio::test]
    async fn read_keeps_unset_config_without_force() {
        let transport =
            RecordingTransport::new().respond_json(json!({"config": {"targetGain": 3.0}}));

        let mut model = edfa();
        model.config = Some(EdfaConfig::default());
        read(&transport, &mut model, false).await.unwrap();

        assert_eq!(model.config.unwrap().target_gain, None);
    }

    #[tokio::test]
    async fn update_prefers_href() {
        let transport = RecordingTransport::new()
            .respond_empty()
            .respond_json(json!({"id": "e7"}));

        let mut model = edfa();
        model.header.href = Some("/ndus/dev1/ports/3/edfa/7".to_string());
        update(&transport, &mut model, json!({"targetGain": 1.0}))
            .await
            .unwrap();

        assert_eq!(
            transport.paths(),
            vec![
                "/ndus/dev1/ports/3/edfa/7".to_string(),
                "/ndus/dev1/ports/3/edfa/7?content=expanded".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn update_tolerates_accepted() {
        let transport = RecordingTransport::new()
            .respond_status(202, "")
            .respond_json(json!({"id": "e7", "config": {"targetGain": 2.0}}));

        let mut model = edfa();
        model.header.href = Some("/ndus/dev1/ports/3/edfa/7".to_string());
        model.config = Some(EdfaConfig {
            target_gain: Some(1.0),
        });
        assert_ok!(update(&transport, &mut model, json!({"targetGain": 1.0})).await);

        let calls = transport.calls();
        assert_eq!(calls[0].method, Method::PUT);
        assert_eq!(calls[1].method, Method::GET);
        assert_eq!(model.header.href.as_deref(), Some("/ndus/dev1/ports/3/edfa/7"));
        assert_eq!(model.config.unwrap().target_gain, Some(2.0));
    }

    #[tokio::test]
    async fn update_aborts_on_other_errors() {
        let transport = RecordingTransport::new().respond_status(409, "conflict");

        let mut model = edfa();
        model.header.href = Some("/ndus/dev1/ports/3/edfa/7".to_string());
        assert_err!(update(&transport, &mut model, json!({})).await);
        assert_eq!(model.header.href, None);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn delete_only_forgets_nested_kinds() {
        let transport = RecordingTransport::new();
        assert_eq!(delete(&transport, &edfa()).await.unwrap(), Deletion::Forgotten);
        assert!(transport.calls().is_empty());

        let ndu = Ndu {
            identifier: ResourceIdentifier {
                device_id: Some("n1".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(delete(&transport, &ndu).await.unwrap(), Deletion::Deleted);
        assert_eq!(transport.calls()[0].method, Method::DELETE);
        assert_eq!(transport.calls()[0].path, "/ndus/n1");
    }

    #[tokio::test]
    async fn action_dispatch_posts_to_table_path() {
        let transport = RecordingTransport::new().respond_status(202, "");
        let identifier = ResourceIdentifier {
            device_id: Some("d1".to_string()),
            parent_col_id: Some("2".to_string()),
            ..Default::default()
        };

        let dispatched = dispatch_action(&transport, "NDU Port", &identifier, "retry", None)
            .await
            .unwrap();
        assert_eq!(dispatched.path, "/ndus/d1/ports/2/retry");
        assert_eq!(dispatched.response, "");
        assert_eq!(transport.calls()[0].method, Method::POST);
        assert_eq!(transport.calls()[0].path, "/ndus/d1/ports/2/retry");
    }

    #[tokio::test]
    async fn fetch_all_populates_each_element() {
        let transport = RecordingTransport::new()
            .respond_json(json!([{"id": "a", "colid": 1}, {"id": "b", "colid": 2}]));

        let items: Vec<StateHeader> = fetch_all(&transport, "/events?content=expanded")
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].col_id, Some(2));
    }
}
