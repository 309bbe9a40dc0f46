//! End-to-end settlement pipeline: a signed checkout webhook goes in, the
//! order is recorded once, and the background workers pay the vendor and
//! notify both parties.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::Secret;
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use order_settlement::adapters::http::router;
use order_settlement::adapters::memory::{
    InMemoryNotificationHistory, InMemoryOrderRepository, InMemoryPayeeDirectory,
    InMemoryPushTokenRepository,
};
use order_settlement::adapters::push::MockPushGateway;
use order_settlement::adapters::stripe::MockTransferGateway;
use order_settlement::adapters::tasks::SideEffectWorkerPool;
use order_settlement::app::{Ports, Services};
use order_settlement::application::handlers::PayoutSettings;
use order_settlement::config::WorkerConfig;
use order_settlement::domain::foundation::{Subject, SubjectId, Timestamp};
use order_settlement::domain::notification::{Platform, PushToken};
use order_settlement::domain::order::PayoutStatus;
use order_settlement::domain::payout::PayeeAccount;
use order_settlement::domain::webhook::{signature_header_for, WebhookVerifier};
use order_settlement::ports::{NotificationHistoryRepository, OrderRepository, PushTokenRepository};

const SECRET: &str = "whsec_pipeline";

struct Pipeline {
    router: Router,
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
    orders: InMemoryOrderRepository,
    history: InMemoryNotificationHistory,
    transfers: MockTransferGateway,
    push: MockPushGateway,
}

impl Pipeline {
    async fn start() -> Self {
        let orders = InMemoryOrderRepository::new();
        let payees = InMemoryPayeeDirectory::new();
        let tokens = InMemoryPushTokenRepository::new();
        let history = InMemoryNotificationHistory::new();
        let transfers = MockTransferGateway::new();
        let push = MockPushGateway::new();

        payees
            .add(PayeeAccount::onboarded(SubjectId::new("vendor-1").unwrap(), "acct_vendor"))
            .await;
        for (token, owner) in [
            ("ExponentPushToken[buyer]", Subject::buyer(SubjectId::new("buyer-1").unwrap())),
            ("ExponentPushToken[vendor]", Subject::vendor(SubjectId::new("vendor-1").unwrap())),
        ] {
            tokens
                .upsert(&PushToken::register(token, owner, Platform::Ios).unwrap())
                .await
                .unwrap();
        }

        let mut ports = Ports::in_memory(Arc::new(transfers.clone()), Arc::new(push.clone()));
        ports.orders = Arc::new(orders.clone());
        ports.payees = Arc::new(payees);
        ports.push_tokens = Arc::new(tokens);
        ports.history = Arc::new(history.clone());

        let (queue, pool) = SideEffectWorkerPool::new(&WorkerConfig {
            queue_capacity: 64,
            worker_count: 2,
        });
        let services = Services::wire(
            ports,
            WebhookVerifier::new(Some(Secret::new(SECRET.to_string()))),
            Arc::new(queue),
            PayoutSettings::default(),
        );
        let (shutdown, shutdown_rx) = watch::channel(false);
        let workers = pool.spawn(services.executor, shutdown_rx);

        Self {
            router: router(services.state),
            shutdown,
            workers,
            orders,
            history,
            transfers,
            push,
        }
    }

    async fn deliver(&self, body: &[u8]) -> StatusCode {
        let signature = signature_header_for(SECRET, Timestamp::now().as_unix_secs(), body);
        let request = Request::builder()
            .method("POST")
            .uri("/payments/webhook")
            .header("x-signature", signature)
            .body(Body::from(body.to_vec()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }

    /// Signals shutdown and waits until every queued task has run.
    async fn drain(mut self) -> Self {
        self.shutdown.send(true).unwrap();
        for worker in std::mem::take(&mut self.workers) {
            worker.await.unwrap();
        }
        self
    }
}

fn checkout(session_id: &str, amount: i64) -> Vec<u8> {
    json!({
        "id": "evt_pipeline",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session_id,
            "amount_total": amount,
            "payment_intent": "pi_pipeline",
            "metadata": {
                "buyerId": "buyer-1",
                "vendorId": "vendor-1",
                "items": r#"[{"id":"bouquet","name":"Bouquet","price":900,"quantity":1}]"#,
                "deliveryFee": "100"
            }
        }}
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn checkout_is_settled_and_announced() {
    let pipeline = Pipeline::start().await;

    assert_eq!(pipeline.deliver(&checkout("cs_e2e", 1000)).await, StatusCode::OK);
    let pipeline = pipeline.drain().await;

    let order = pipeline
        .orders
        .find_by_session_id("cs_e2e")
        .await
        .unwrap()
        .expect("order recorded");
    assert_eq!(order.total, 1000);
    assert_eq!(order.payout.status, PayoutStatus::Completed);
    assert_eq!(order.payout.platform_fee, Some(150));
    assert_eq!(order.payout.payee_amount, Some(850));

    let requests = pipeline.transfers.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, 850);
    assert_eq!(requests[0].destination, "acct_vendor");

    let recipients: Vec<String> = pipeline
        .push
        .batches()
        .into_iter()
        .flatten()
        .map(|message| message.to)
        .collect();
    assert_eq!(recipients.len(), 2);
    assert!(recipients.contains(&"ExponentPushToken[buyer]".to_string()));
    assert!(recipients.contains(&"ExponentPushToken[vendor]".to_string()));

    let buyer_history = pipeline
        .history
        .list_for_subject(&Subject::buyer(SubjectId::new("buyer-1").unwrap()), 10)
        .await
        .unwrap();
    assert_eq!(buyer_history.len(), 1);
}

#[tokio::test]
async fn redelivered_webhook_settles_once() {
    let pipeline = Pipeline::start().await;
    let body = checkout("cs_redelivered", 1000);

    assert_eq!(pipeline.deliver(&body).await, StatusCode::OK);
    assert_eq!(pipeline.deliver(&body).await, StatusCode::OK);
    let pipeline = pipeline.drain().await;

    assert_eq!(pipeline.orders.count().await, 1);
    assert_eq!(pipeline.transfers.call_count(), 1);
    assert_eq!(pipeline.push.call_count(), 2);
}

#[tokio::test]
async fn concurrent_deliveries_create_one_order() {
    let pipeline = Pipeline::start().await;
    let body = checkout("cs_concurrent", 1000);

    let (a, b, c) = tokio::join!(
        pipeline.deliver(&body),
        pipeline.deliver(&body),
        pipeline.deliver(&body)
    );
    assert_eq!((a, b, c), (StatusCode::OK, StatusCode::OK, StatusCode::OK));
    let pipeline = pipeline.drain().await;

    assert_eq!(pipeline.orders.count().await, 1);
    assert_eq!(pipeline.transfers.call_count(), 1);
}

#[tokio::test]
async fn tampered_webhook_changes_nothing() {
    let pipeline = Pipeline::start().await;
    let body = checkout("cs_tampered", 1000);
    let signature = signature_header_for(SECRET, Timestamp::now().as_unix_secs(), &body);
    let tampered = checkout("cs_tampered", 1);

    let request = Request::builder()
        .method("POST")
        .uri("/payments/webhook")
        .header("x-signature", signature)
        .body(Body::from(tampered))
        .unwrap();
    let status = pipeline.router.clone().oneshot(request).await.unwrap().status();
    let pipeline = pipeline.drain().await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(pipeline.orders.count().await, 0);
    assert_eq!(pipeline.transfers.call_count(), 0);
    assert_eq!(pipeline.push.call_count(), 0);
}
