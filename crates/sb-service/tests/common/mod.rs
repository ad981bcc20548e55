//! Scripted in-memory bridge shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use sb_core::gateway::{OperatorEvent, Reply};
use sb_core::traits::{RemoteConnector, RemoteShell};
use sb_core::{BridgeError, CommandResult, ConnectionParams, OperatorId};
use sb_service::{AllowList, Dispatcher, SessionState};

pub const OPERATOR: &str = "100";

/// State shared between the connector, its shells and the test
#[derive(Default)]
pub struct Bridge {
    pub connects: AtomicUsize,
    pub open: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub params: Mutex<Vec<ConnectionParams>>,
    pub commands: Mutex<Vec<String>>,
    pub results: Mutex<VecDeque<CommandResult>>,
    pub connect_error: Mutex<Option<String>>,
    pub panic_on: Mutex<Option<String>>,
    pub panic_on_connect: AtomicBool,
    pub run_delay: Mutex<Option<Duration>>,
}

impl Bridge {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn script(&self, result: CommandResult) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn fail_connects(&self, reason: Option<&str>) {
        *self.connect_error.lock().unwrap() = reason.map(str::to_string);
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

pub struct MockConnector {
    pub bridge: Arc<Bridge>,
}

pub struct MockShell {
    bridge: Arc<Bridge>,
    closed: bool,
}

#[async_trait]
impl RemoteConnector for MockConnector {
    type Shell = MockShell;

    async fn connect(&self, params: &ConnectionParams) -> Result<MockShell, BridgeError> {
        self.bridge.connects.fetch_add(1, Ordering::SeqCst);
        self.bridge.params.lock().unwrap().push(params.clone());
        if self.bridge.panic_on_connect.load(Ordering::SeqCst) {
            panic!("connector exploded");
        }

        let error = self.bridge.connect_error.lock().unwrap().clone();
        if let Some(reason) = error {
            return Err(BridgeError::Connect {
                address: format!("{}:{}", params.hostname, params.port),
                reason,
            });
        }

        self.bridge.open.fetch_add(1, Ordering::SeqCst);
        Ok(MockShell {
            bridge: Arc::clone(&self.bridge),
            closed: false,
        })
    }
}

#[async_trait]
impl RemoteShell for MockShell {
    async fn run(&mut self, command: &str) -> CommandResult {
        let panic_on = self.bridge.panic_on.lock().unwrap().clone();
        if panic_on.as_deref() == Some(command) {
            panic!("bridge exploded on {}", command);
        }

        let running = self.bridge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.bridge.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.bridge.run_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.bridge.commands.lock().unwrap().push(command.to_string());
        let scripted = self.bridge.results.lock().unwrap().pop_front();
        self.bridge.in_flight.fetch_sub(1, Ordering::SeqCst);

        scripted.unwrap_or_else(|| CommandResult::Output(format!("ran: {}", command)))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.bridge.open.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

pub fn dispatcher() -> (Arc<Dispatcher<MockConnector>>, Arc<Bridge>) {
    let bridge = Arc::new(Bridge::default());
    let connector = MockConnector {
        bridge: Arc::clone(&bridge),
    };
    let dispatcher = Dispatcher::new(connector, AllowList::new([OPERATOR, "200"]));
    (Arc::new(dispatcher), bridge)
}

pub fn operator() -> OperatorId {
    OperatorId::new(OPERATOR)
}

pub fn button(payload: &str) -> OperatorEvent {
    OperatorEvent::Button {
        payload: payload.to_string(),
    }
}

pub fn text(text: &str) -> OperatorEvent {
    OperatorEvent::Text {
        text: text.to_string(),
    }
}

pub fn command(name: &str) -> OperatorEvent {
    OperatorEvent::Command {
        name: name.to_string(),
    }
}

pub async fn send(
    dispatcher: &Dispatcher<MockConnector>,
    operator: &OperatorId,
    event: OperatorEvent,
) -> Vec<Reply> {
    dispatcher
        .handle_event(operator, event)
        .await
        .expect("operator should be authorized")
}

pub async fn state(dispatcher: &Dispatcher<MockConnector>, operator: &OperatorId) -> SessionState {
    let handle = dispatcher
        .sessions()
        .get(operator)
        .expect("session should exist");
    let session = handle.lock().await;
    session.state
}

/// Enter a value through one pick-option / text cycle
pub async fn enter(
    dispatcher: &Dispatcher<MockConnector>,
    operator: &OperatorId,
    option: &str,
    value: &str,
) {
    send(dispatcher, operator, button(&format!("{}_option", option))).await;
    send(dispatcher, operator, text(value)).await;
}

/// Start, fill in all four parameters and connect
pub async fn connect(dispatcher: &Dispatcher<MockConnector>, operator: &OperatorId) -> Vec<Reply> {
    send(dispatcher, operator, OperatorEvent::Start).await;
    enter(dispatcher, operator, "hostname", "10.0.0.5").await;
    enter(dispatcher, operator, "port", "22").await;
    enter(dispatcher, operator, "username", "ops").await;
    enter(dispatcher, operator, "password", "x").await;
    send(dispatcher, operator, button("connect")).await
}

pub fn texts(replies: &[Reply]) -> Vec<&str> {
    replies.iter().map(Reply::text).collect()
}
