use gloo::net::http::Request;
use gloo::timers::future::TimeoutFuture;
use taskdeck_core::config::RetryPolicy;
use taskdeck_core::{
    ToggleRequest,
    Transport,
};

/// Posts toggle requests in the background. Results are only logged; the
/// checkbox keeps whatever the user set.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    policy: RetryPolicy,
}

impl FetchTransport {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl Transport for FetchTransport {
    fn send(&self, request: ToggleRequest) {
        let policy = self.policy.clone();
        wasm_bindgen_futures::spawn_local(async move {
            deliver(request, policy).await;
        });
    }
}

async fn deliver(request: ToggleRequest, policy: RetryPolicy) {
    let attempts = policy.attempts();
    for attempt in 1..=attempts {
        if attempt > 1 {
            TimeoutFuture::new(policy.delay_before(attempt - 1)).await;
        }

        match post_form(&request).await {
            Ok(()) => {
                tracing::debug!(path = %request.path, attempt, "toggle delivered");
                return;
            }
            Err(err) => {
                tracing::warn!(path = %request.path, attempt, attempts, error = %err, "toggle request failed");
            }
        }
    }
}

async fn post_form(request: &ToggleRequest) -> Result<(), String> {
    let response = Request::post(&request.path)
        .header("Content-Type", request.content_type())
        .body(request.body.clone())
        .map_err(|e| format!("failed to build request: {e}"))?
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if response.ok() {
        Ok(())
    } else {
        Err(format!("server answered {}", response.status()))
    }
}
