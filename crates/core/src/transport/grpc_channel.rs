use std::time::Duration;

use thiserror::Error;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

use crate::shared::constants::DEFAULT_MAX_MESSAGE_SIZE;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to start gRPC runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("invalid gRPC address {address}: {source}")]
    Address {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("service at {address} not ready: {source}")]
    NotReady {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("{path} failed: {source}")]
    Call {
        path: &'static str,
        #[source]
        source: tonic::Status,
    },
}

/// Connection options shared by both gRPC adapters.
#[derive(Clone, Debug)]
pub struct ChannelOptions {
    /// Per-call deadline. `None` lets a hung call block forever.
    pub call_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub max_message_size: usize,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            call_timeout: None,
            connect_timeout: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Blocking unary gRPC client.
///
/// Owns a single-worker Tokio runtime and drives every call to completion
/// on it, so callers stay synchronous.
pub struct GrpcChannel {
    address: String,
    runtime: tokio::runtime::Runtime,
    grpc: Grpc<Channel>,
}

impl GrpcChannel {
    /// Dials `address` (`host:port`, or a full `http://` URI) in plaintext.
    pub fn connect(address: &str, options: &ChannelOptions) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(TransportError::Runtime)?;

        let uri = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };
        let mut endpoint =
            Endpoint::from_shared(uri).map_err(|source| TransportError::Address {
                address: address.to_string(),
                source,
            })?;
        if let Some(timeout) = options.call_timeout {
            endpoint = endpoint.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        let channel = runtime
            .block_on(endpoint.connect())
            .map_err(|source| TransportError::Connect {
                address: address.to_string(),
                source,
            })?;
        log::info!("Connected to {address}");

        let grpc = Grpc::new(channel)
            .max_decoding_message_size(options.max_message_size)
            .max_encoding_message_size(options.max_message_size);

        Ok(Self {
            address: address.to_string(),
            runtime,
            grpc,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Sends one request on `path` and blocks until the response arrives.
    pub fn unary<Req, Resp>(&mut self, path: &'static str, message: Req) -> Result<Resp, TransportError>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let grpc = &mut self.grpc;
        let address = &self.address;
        self.runtime.block_on(async move {
            grpc.ready()
                .await
                .map_err(|source| TransportError::NotReady {
                    address: address.clone(),
                    source,
                })?;
            let codec = ProstCodec::<Req, Resp>::default();
            let response = grpc
                .unary(
                    tonic::Request::new(message),
                    PathAndQuery::from_static(path),
                    codec,
                )
                .await
                .map_err(|source| TransportError::Call { path, source })?;
            Ok::<_, TransportError>(response.into_inner())
        })
    }
}
