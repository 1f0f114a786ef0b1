//! The HyperBEAM node client.
//!
//! Brings together request building, signing, the node HTTP surface, and
//! GraphQL queries.

use std::sync::Arc;

use hbconnect_core::request::{self, FieldValue, Fields};
use hbconnect_core::{ItemId, SignedDataItem};
use hbconnect_net::{
    GqlClient, HttpRequest, HttpResponse, HttpTransport, NetError, ReqwestTransport,
};
use hbconnect_signer::{DataItemSigner, SignerKind, SigningAuthority};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::{ClientConfig, DEFAULT_NODE_AUTHORITY, TRUSTED_AUTHORITY};
use crate::error::{ClientError, Result};

/// aos release the spawned process tags advertise.
pub const AOS_VERSION: &str = "2.0.7";
/// Lua module spawned processes run.
pub const DEFAULT_MODULE: &str = "xVcnPK8MPmcocS6zwq1eLmM2KhfyarP8zzmz3UVi1g4";

const META_ADDRESS_PATH: &str = "/~meta@1.0/info/address";

/// What a successful `send` returned.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// 2xx: the node's JSON body and the message ID.
    Accepted { id: ItemId, body: Value },
    /// 3xx: the response as received, for the caller to follow.
    Redirect(HttpResponse),
}

impl SendOutcome {
    /// The JSON body with `id` set, for accepted messages.
    pub fn into_json(self) -> Option<Value> {
        match self {
            SendOutcome::Accepted { id, body } => {
                let mut object = match body {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => Map::from_iter([("body".to_string(), other)]),
                };
                object.insert("id".to_string(), Value::String(id.to_base64url()));
                Some(Value::Object(object))
            }
            SendOutcome::Redirect(_) => None,
        }
    }

    pub fn id(&self) -> Option<ItemId> {
        match self {
            SendOutcome::Accepted { id, .. } => Some(*id),
            SendOutcome::Redirect(_) => None,
        }
    }
}

/// Which computation to read results for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultQuery {
    pub process: String,
    pub message: Option<String>,
    pub slot: Option<u64>,
}

impl ResultQuery {
    pub fn message(process: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            process: process.into(),
            message: Some(message.into()),
            slot: None,
        }
    }

    pub fn slot(process: impl Into<String>, slot: u64) -> Self {
        Self {
            process: process.into(),
            message: None,
            slot: Some(slot),
        }
    }
}

/// Client for a HyperBEAM node.
pub struct HyperBeam<T> {
    config: ClientConfig,
    transport: Arc<T>,
    gql: GqlClient<Arc<T>>,
    kind: SignerKind,
    signer: Option<Arc<dyn SigningAuthority>>,
}

impl HyperBeam<ReqwestTransport> {
    /// Client over the network with the given configuration.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> HyperBeam<T> {
    /// Create a client. Fails on a malformed GraphQL endpoint or an unknown
    /// signer kind.
    pub fn new(config: ClientConfig, transport: T) -> Result<Self> {
        let kind: SignerKind = config.signer_kind.parse()?;
        let transport = Arc::new(transport);
        let gql = GqlClient::new(config.gql.clone(), Arc::clone(&transport))?;
        Ok(Self {
            config,
            transport,
            gql,
            kind,
            signer: None,
        })
    }

    /// Default signing authority for spawn and send.
    pub fn with_signer(mut self, signer: impl SigningAuthority + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full URL of a node path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.node_url(), path)
    }

    /// Send a raw request to `path` on the node.
    pub async fn fetch(&self, path: &str, template: HttpRequest) -> Result<HttpResponse> {
        let request = HttpRequest {
            url: self.url(path),
            ..template
        };
        Ok(self.transport.execute(request).await.map_err(NetError::from)?)
    }

    /// Address of the scheduler.
    pub async fn scheduler(&self) -> Result<String> {
        let url = format!("{}{}", self.config.scheduler_url(), META_ADDRESS_PATH);
        let response = self
            .transport
            .execute(HttpRequest::get(url))
            .await
            .map_err(NetError::from)?;
        let address = text_or_error(response)?;
        debug!(%address, "scheduler");
        Ok(address)
    }

    /// Authority list for new processes.
    pub async fn authority(&self) -> Result<String> {
        if let Some(authority) = &self.config.authority {
            return Ok(authority.clone());
        }

        let node = if self.config.is_default_node() {
            DEFAULT_NODE_AUTHORITY.to_string()
        } else {
            let response = self
                .fetch(META_ADDRESS_PATH, HttpRequest::get(""))
                .await?;
            text_or_error(response)?
        };

        let authority = format!("{node},{TRUSTED_AUTHORITY}");
        debug!(%authority, "authority");
        Ok(authority)
    }

    /// Spawn a new hyper-aos process named `name`. Returns the process ID.
    pub async fn spawn(
        &self,
        name: &str,
        data: impl Into<FieldValue>,
        signer: Option<&dyn SigningAuthority>,
    ) -> Result<ItemId> {
        let signer = self.signer_for(signer)?;
        let scheduler = self.scheduler().await?;
        let authority = self.authority().await?;

        let fields = Fields::new()
            .with("path", "/push")
            .with("method", "POST")
            .with("type", "Process")
            .with("device", "process@1.0")
            .with("data-protocol", "ao")
            .with("scheduler-device", "scheduler@1.0")
            .with("push-device", "push@1.0")
            .with("execution-device", "lua@5.3a")
            .with("variant", "ao.N.1")
            .with("App-Name", "hyper-aos")
            .with("Name", name)
            .with("Authority", authority)
            .with("aos-version", AOS_VERSION)
            .with("accept-bundle", "true")
            .with("codec-device", "ans104@1.0")
            .with("signingformat", "ANS-104")
            .with("scheduler", scheduler.as_str())
            .with("scheduler-location", scheduler.as_str())
            .with("Module", DEFAULT_MODULE)
            .with("data", data);

        let (item, headers) = self.sign_fields(&fields, signer).await?;
        let request = HttpRequest::post("", item.raw.clone()).headers(headers);
        let response = self.fetch("/~process@1.0/push", request).await?;

        if !response.is_success() {
            return Err(ClientError::SpawnFailed {
                status: response.status,
            });
        }
        info!(process = %item.id, name, "spawned process");
        Ok(item.id)
    }

    /// Send a message to process `target`.
    pub async fn send(
        &self,
        target: &str,
        mut fields: Fields,
        data: impl Into<FieldValue>,
        signer: Option<&dyn SigningAuthority>,
    ) -> Result<SendOutcome> {
        if target.is_empty() {
            return Err(ClientError::MissingTarget);
        }
        let signer = self.signer_for(signer)?;

        fields.insert("Data-Protocol", "ao");
        fields.insert("Variant", "ao.N.1");
        if !fields.contains_key("signingFormat") {
            fields.insert("signingFormat", "ANS-104");
        }
        fields.insert("target", target);
        fields.insert("data", data);

        let (item, headers) = self.sign_fields(&fields, signer).await?;
        let path = format!("/{target}~process@1.0/push?accept=application/json&accept-bundle=true");
        let request = HttpRequest::post("", item.raw.clone()).headers(headers);
        let response = self.fetch(&path, request).await?;

        if response.status >= 400 {
            return Err(ClientError::Http {
                status: response.status,
                body: response.text(),
            });
        }
        if response.is_redirect() {
            debug!(status = response.status, "send redirected");
            return Ok(SendOutcome::Redirect(response));
        }

        let body = if response.body.is_empty() {
            Value::Null
        } else {
            response.json()?
        };
        info!(id = %item.id, process = target, "message sent");
        Ok(SendOutcome::Accepted { id: item.id, body })
    }

    /// Read the results of a message or slot.
    pub async fn result(
        &self,
        query: &ResultQuery,
        headers: Option<Vec<(String, String)>>,
    ) -> Result<Value> {
        if query.process.is_empty() {
            return Err(ClientError::MissingProcess);
        }
        let at = match (&query.slot, &query.message) {
            (Some(slot), _) => slot.to_string(),
            (None, Some(message)) if !message.is_empty() => message.clone(),
            _ => return Err(ClientError::MissingMessageOrSlot),
        };

        let path = format!("/{}~process@1.0/compute={at}/results", query.process);
        let headers = headers.unwrap_or_else(|| {
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Accept-bundle".to_string(), "true".to_string()),
            ]
        });
        let response = self.fetch(&path, HttpRequest::get("").headers(headers)).await?;

        if !response.is_success() {
            return Err(ClientError::Http {
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response.json()?)
    }

    /// Run a GraphQL query and return `data.transactions.edges`.
    pub async fn query(&self, query: &str) -> Result<Value> {
        self.query_with_variables(query, None).await
    }

    pub async fn query_with_variables(&self, query: &str, variables: Option<&Value>) -> Result<Value> {
        let response = self.gql.run(query, variables).await?;

        if let Some(errors) = response.get("errors").filter(|e| !e.is_null()) {
            return Err(ClientError::Query(errors.to_string()));
        }
        response
            .pointer("/data/transactions/edges")
            .cloned()
            .ok_or_else(|| ClientError::Query("response has no data.transactions.edges".into()))
    }

    fn signer_for<'a>(
        &'a self,
        explicit: Option<&'a dyn SigningAuthority>,
    ) -> Result<&'a dyn SigningAuthority> {
        if let Some(signer) = explicit {
            return Ok(signer);
        }
        match self.signer.as_deref() {
            Some(signer) => Ok(signer),
            None => Err(ClientError::MissingWallet),
        }
    }

    async fn sign_fields(
        &self,
        fields: &Fields,
        signer: &dyn SigningAuthority,
    ) -> Result<(SignedDataItem, Vec<(String, String)>)> {
        let descriptor = request::build(fields);
        let item = DataItemSigner::new(signer)
            .with_kind(self.kind)
            .sign(descriptor.envelope)
            .await?;
        Ok((item, descriptor.headers.into_iter().collect()))
    }
}

fn text_or_error(response: HttpResponse) -> Result<String> {
    if !response.is_success() {
        return Err(ClientError::Http {
            status: response.status,
            body: response.text(),
        });
    }
    Ok(response.text())
}
