use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use backend_application::{AppState, Metrics};
use backend_infrastructure::{
    AppConfig, HttpIdentityProvider, MemoryStore, PaypalPaymentProcessor, SystemClock,
    UnconfiguredPayments, WebhookNotificationSender,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let store = Arc::new(MemoryStore::open(config.store_snapshot_path.as_deref()).await?);
        let identity = Arc::new(HttpIdentityProvider::new(&runtime_config)?);
        let payments: Arc<dyn backend_domain::ports::PaymentProcessor> =
            if runtime_config.paypal_client_id.is_some() && runtime_config.paypal_secret.is_some() {
                Arc::new(PaypalPaymentProcessor::new(&runtime_config)?)
            } else {
                warn!("paypal credentials unset; payment capture disabled");
                Arc::new(UnconfiguredPayments::new())
            };

        let state = AppState {
            config: runtime_config,
            event_repo: store.clone(),
            ticket_type_repo: store.clone(),
            ticket_repo: store.clone(),
            ticket_log_repo: store.clone(),
            identity,
            payments,
            notifications: Arc::new(WebhookNotificationSender::new()),
            clock: Arc::new(SystemClock::new()),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
