//! Services and middleware that record what happens to them.

use addsvc::AddService;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tower::util::BoxCloneSyncService;
use tower_kit::core::{Context, Invocation, KitError};
use tower_kit::endpoint::{Endpoint, endpoint_fn};

/// Event log shared between the pieces of one stack.
pub type Trail = Arc<Mutex<Vec<String>>>;

pub fn trail() -> Trail {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(trail: &Trail) -> Vec<String> {
    trail.lock().unwrap().clone()
}

/// An add service that counts calls and either works or fails with an
/// internal error.
pub struct Counting {
    calls: AtomicUsize,
    fail: bool,
}

impl Counting {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AddService for Counting {
    fn sum(&self, _ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(KitError::internal("database unavailable"))
            } else {
                Ok(a + b)
            }
        })
    }

    fn concat(&self, _ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(KitError::internal("database unavailable"))
            } else {
                Ok(a + &b)
            }
        })
    }
}

/// Service middleware logging `name>` on the way in and `<name` on the way out.
pub struct Tagged {
    pub name: &'static str,
    pub trail: Trail,
    pub next: Arc<dyn AddService>,
}

impl AddService for Tagged {
    fn sum(&self, ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        Box::pin(async move {
            self.trail.lock().unwrap().push(format!("{}>", self.name));
            let result = self.next.sum(ctx, a, b).await;
            self.trail.lock().unwrap().push(format!("<{}", self.name));
            result
        })
    }

    fn concat(&self, ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        self.next.concat(ctx, a, b)
    }
}

pub fn tagged_service(
    name: &'static str,
    trail: &Trail,
) -> impl Fn(Arc<dyn AddService>) -> Arc<dyn AddService> + Send + Sync + 'static {
    let trail = Arc::clone(trail);
    move |next: Arc<dyn AddService>| -> Arc<dyn AddService> {
        Arc::new(Tagged {
            name,
            trail: Arc::clone(&trail),
            next,
        })
    }
}

/// Endpoint middleware with the same in/out logging as [`Tagged`].
pub fn tagged_endpoint(
    name: &'static str,
    trail: &Trail,
) -> impl Fn(Endpoint<u32, u32>) -> Endpoint<u32, u32> + Send + Sync + 'static {
    let trail = Arc::clone(trail);
    move |inner: Endpoint<u32, u32>| -> Endpoint<u32, u32> {
        let trail = Arc::clone(&trail);
        BoxCloneSyncService::new(tower::service_fn(move |inv: Invocation<u32>| {
            let trail = Arc::clone(&trail);
            let inner = inner.clone();
            async move {
                trail.lock().unwrap().push(format!("{name}>"));
                let result = inner.oneshot(inv).await;
                trail.lock().unwrap().push(format!("<{name}"));
                result
            }
        }))
    }
}

/// Terminal endpoint echoing its request and counting calls.
pub fn counting_endpoint(calls: &Arc<AtomicUsize>) -> Endpoint<u32, u32> {
    let calls = Arc::clone(calls);
    endpoint_fn(move |_ctx: Context, n: u32| {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, KitError>(n)
        }
    })
}
