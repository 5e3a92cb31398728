use crate::endpoint::Endpoint;
use std::fmt;
use tower::util::BoxCloneSyncService;
use tower::{Layer, Service};
use tower_kit_core::{Chain, Invocation, KitError};

/// Stacks middleware around a terminal endpoint.
///
/// Layers are listed outermost first and applied with [`Chain::build`], so
/// `EndpointBuilder::new().layer(a).layer(b).build(ep)` handles a request in
/// the order `a`, `b`, `ep`. A builder can be reused to wrap several endpoints;
/// stateful layers create fresh state for each one.
pub struct EndpointBuilder<Req, Res> {
    chain: Chain<Endpoint<Req, Res>>,
}

impl<Req, Res> EndpointBuilder<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            chain: Chain::new(),
        }
    }

    /// Adds a Tower layer inside the ones added so far.
    pub fn layer<L>(self, layer: L) -> Self
    where
        L: Layer<Endpoint<Req, Res>> + Send + Sync + 'static,
        L::Service: Service<Invocation<Req>, Response = Res, Error = KitError>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Invocation<Req>>>::Future: Send + 'static,
    {
        Self {
            chain: self
                .chain
                .with(move |inner| BoxCloneSyncService::new(layer.layer(inner))),
        }
    }

    /// Adds `layer` if it is `Some`.
    pub fn option_layer<L>(self, layer: Option<L>) -> Self
    where
        L: Layer<Endpoint<Req, Res>> + Send + Sync + 'static,
        L::Service: Service<Invocation<Req>, Response = Res, Error = KitError>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Invocation<Req>>>::Future: Send + 'static,
    {
        match layer {
            Some(layer) => self.layer(layer),
            None => self,
        }
    }

    /// Adds a plain endpoint-to-endpoint function.
    pub fn middleware<F>(self, f: F) -> Self
    where
        F: Fn(Endpoint<Req, Res>) -> Endpoint<Req, Res> + Send + Sync + 'static,
    {
        Self {
            chain: self.chain.with(f),
        }
    }

    /// Wraps `endpoint` with every layer, the first added outermost.
    pub fn build(&self, endpoint: Endpoint<Req, Res>) -> Endpoint<Req, Res> {
        self.chain.build(endpoint)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl<Req, Res> Default for EndpointBuilder<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res> Clone for EndpointBuilder<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
        }
    }
}

impl<Req, Res> fmt::Debug for EndpointBuilder<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder")
            .field("layers", &self.chain.len())
            .finish()
    }
}
