//! Store-feed scenarios: callback ordering, malformed-frame tolerance, and
//! teardown semantics.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use axum::Router;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use tfn_api::{ApiClient, ApiConfig};
use tfn_schemas::{Order, OrderStatus};
use tfn_watch::{OrderFeedHandler, StoreWatch};

type EventResult = Result<Event, Infallible>;

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

struct Fixture {
    session: Mutex<Option<mpsc::UnboundedReceiver<EventResult>>>,
}

async fn watch_route(State(fx): State<Arc<Fixture>>) -> Sse<UnboundedReceiverStream<EventResult>> {
    let rx = fx
        .session
        .lock()
        .unwrap()
        .take()
        .expect("fixture scripts a single session");
    Sse::new(UnboundedReceiverStream::new(rx))
}

async fn spawn_fixture() -> (String, mpsc::UnboundedSender<EventResult>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let fx = Arc::new(Fixture {
        session: Mutex::new(Some(rx)),
    });

    let app = Router::new()
        .route("/stores/orders/watch", get(watch_route))
        .with_state(fx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture");
    let addr = listener.local_addr().expect("fixture addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture crashed");
    });
    (format!("http://{addr}"), tx)
}

/// Records callbacks in arrival order.
#[derive(Clone, Default)]
struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl OrderFeedHandler for Recorder {
    fn on_new_order(&self, order: Order) {
        self.log.lock().unwrap().push(format!("new:{}", order.order_id));
    }

    fn on_order_update(&self, order_id: i64, status: OrderStatus) {
        self.log.lock().unwrap().push(format!("update:{order_id}:{status}"));
    }
}

fn new_order_event(order_id: i64) -> EventResult {
    Ok(Event::default().data(format!(
        r#"{{"type":"NEW_ORDER","order":{{"order_id":{order_id},"customer_id":2,"store_id":3,"total_price":120.0,"order_status":"PENDING","order_date":"2026-02-10T10:00:00Z","order_otp":"4821","items":[]}}}}"#
    )))
}

fn update_event(order_id: i64, status: &str) -> EventResult {
    Ok(Event::default().data(format!(
        r#"{{"type":"ORDER_UPDATE","order_id":{order_id},"order_status":"{status}"}}"#
    )))
}

async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for: {what}"));
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callbacks_arrive_in_delivery_order_and_survive_a_bad_frame() {
    let (base, tx) = spawn_fixture().await;
    let client = ApiClient::new(ApiConfig::new(&base)).expect("client");
    let recorder = Recorder::default();

    let watch = StoreWatch::open(&client, recorder.clone());
    wait_until("connected", || watch.is_connected()).await;

    tx.send(new_order_event(10)).unwrap();
    tx.send(Ok(Event::default().data(r#"{"type":"MYSTERY"}"#))).unwrap();
    tx.send(update_event(10, "READY")).unwrap();

    wait_until("both callbacks", || recorder.entries().len() == 2).await;
    assert_eq!(
        recorder.entries(),
        vec!["new:10".to_string(), "update:10:READY".to_string()]
    );
    assert!(watch.is_connected(), "bad frame must not kill the feed");
    watch.close();
}

#[tokio::test]
async fn heartbeats_keep_the_feed_quiet_but_alive() {
    let (base, tx) = spawn_fixture().await;
    let client = ApiClient::new(ApiConfig::new(&base)).expect("client");
    let recorder = Recorder::default();

    let watch = StoreWatch::open(&client, recorder.clone());
    wait_until("connected", || watch.is_connected()).await;

    tx.send(Ok(Event::default().comment("heartbeat"))).unwrap();
    wait_until("liveness", || watch.last_event_at().is_some()).await;
    assert!(recorder.entries().is_empty(), "heartbeat is not a callback");
    watch.close();
}

#[tokio::test]
async fn close_stops_callbacks_for_good() {
    let (base, tx) = spawn_fixture().await;
    let client = ApiClient::new(ApiConfig::new(&base)).expect("client");
    let recorder = Recorder::default();

    let watch = StoreWatch::open(&client, recorder.clone());
    wait_until("connected", || watch.is_connected()).await;

    tx.send(new_order_event(1)).unwrap();
    wait_until("first callback", || recorder.entries().len() == 1).await;

    watch.close();
    wait_until("closed", || watch.is_closed()).await;

    tx.send(new_order_event(2)).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(recorder.entries().len(), 1, "callback after teardown");
}

#[tokio::test]
async fn dropping_the_handle_tears_the_feed_down() {
    let (base, tx) = spawn_fixture().await;
    let client = ApiClient::new(ApiConfig::new(&base)).expect("client");
    let recorder = Recorder::default();

    let watch = StoreWatch::open(&client, recorder.clone());
    wait_until("connected", || watch.is_connected()).await;
    drop(watch);

    tx.send(new_order_event(1)).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(recorder.entries().is_empty(), "callback after handle drop");
}
