use futures::future::BoxFuture;
use std::future::Future;
use tower::util::BoxCloneSyncService;
use tower_kit_core::{Context, Invocation, KitError};

/// One service operation behind the uniform `(context, request) -> result` call.
///
/// Endpoints are immutable once built and cheap to clone; clones share any
/// middleware state (token buckets, breaker circuits).
pub type Endpoint<Req, Res> = BoxCloneSyncService<Invocation<Req>, Res, KitError>;

/// Future returned by endpoint middleware.
pub type EndpointFuture<Res> = BoxFuture<'static, Result<Res, KitError>>;

/// Builds the terminal endpoint from an async function of context and request.
///
/// The context is checked before `f` runs, so an invocation that is already
/// cancelled or past its deadline never reaches the business logic.
pub fn endpoint_fn<F, Fut, Req, Res>(f: F) -> Endpoint<Req, Res>
where
    F: Fn(Context, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, KitError>> + Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
    BoxCloneSyncService::new(tower::service_fn(move |inv: Invocation<Req>| {
        let f = f.clone();
        async move {
            let (ctx, request) = inv.into_parts();
            ctx.check()?;
            f(ctx, request).await
        }
    }))
}
