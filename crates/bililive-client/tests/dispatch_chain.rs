//! Dispatch table ordering and short-circuit tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use serde_json::json;

use bililive_client::dispatch::{Dispatcher, Event, Flow, Handler};
use bililive_core::protocol::cmd;

type Log = Arc<Mutex<Vec<&'static str>>>;

/// Object-style handler: logs its name, then returns its configured flow.
struct Named {
    name: &'static str,
    flow: Flow,
    log: Log,
}

impl Handler for Named {
    fn handle(&self, _event: &Event) -> Flow {
        self.log.lock().unwrap().push(self.name);
        self.flow
    }
}

fn named(name: &'static str, flow: Flow, log: &Log) -> Arc<dyn Handler> {
    Arc::new(Named {
        name,
        flow,
        log: log.clone(),
    })
}

fn event(tag: &str) -> Event {
    Event {
        cmd: tag.to_string(),
        payload: json!({ "cmd": tag }),
        room_id: 1,
        owner_name: Arc::from("owner"),
    }
}

#[test]
fn stop_short_circuits_only_its_own_chain() {
    let log: Log = Arc::default();
    let d = Dispatcher::new();
    d.register(cmd::SEND_GIFT, named("typed-a", Flow::Stop, &log));
    d.register(cmd::SEND_GIFT, named("typed-b", Flow::Continue, &log));
    d.register(cmd::ALL, named("all-a", Flow::Continue, &log));
    d.register(cmd::ALL, named("all-b", Flow::Stop, &log));
    d.register(cmd::ALL, named("all-c", Flow::Continue, &log));

    let ran = d.dispatch_with_wildcard(&event(cmd::SEND_GIFT));

    assert_eq!(*log.lock().unwrap(), vec!["typed-a", "all-a", "all-b"]);
    assert_eq!(ran, 3);
}

#[test]
fn wildcard_stop_does_not_suppress_typed_chain() {
    let log: Log = Arc::default();
    let d = Dispatcher::new();
    d.register(cmd::ALL, named("all", Flow::Stop, &log));
    d.register(cmd::LIVE, named("live", Flow::Continue, &log));

    d.dispatch_with_wildcard(&event(cmd::LIVE));
    assert_eq!(*log.lock().unwrap(), vec!["live", "all"]);
}

#[test]
fn same_handler_twice_runs_twice() {
    let hits = Arc::new(Mutex::new(0));
    let d = Dispatcher::new();

    let counter = hits.clone();
    let handler: Arc<dyn Handler> = Arc::new(move |_ev: &Event| {
        *counter.lock().unwrap() += 1;
        Flow::Continue
    });
    d.register(cmd::WELCOME, handler.clone());
    d.register(cmd::WELCOME, handler);

    assert_eq!(d.handler_count(cmd::WELCOME), 2);
    d.dispatch_with_wildcard(&event(cmd::WELCOME));
    assert_eq!(*hits.lock().unwrap(), 2);
}

#[test]
fn unregistered_type_reaches_wildcard_only() {
    let log: Log = Arc::default();
    let d = Dispatcher::new();
    d.register(cmd::DANMU_MSG, named("danmu", Flow::Continue, &log));
    d.register(cmd::ALL, named("all", Flow::Continue, &log));

    d.dispatch_with_wildcard(&event("ROOM_RANK"));
    assert_eq!(*log.lock().unwrap(), vec!["all"]);
    assert_eq!(d.dispatch("ROOM_RANK", &event("ROOM_RANK")), 0);
}

#[test]
fn typed_dispatch_skips_wildcard() {
    let log: Log = Arc::default();
    let d = Dispatcher::new();
    d.register(cmd::ONLINE_CHANGE, named("online", Flow::Continue, &log));
    d.register(cmd::ALL, named("all", Flow::Continue, &log));

    d.dispatch(cmd::ONLINE_CHANGE, &Event::online_change(7, 1, Arc::from("owner")));
    assert_eq!(*log.lock().unwrap(), vec!["online"]);
}

#[test]
fn registration_order_is_call_order() {
    let log: Log = Arc::default();
    let d = Dispatcher::new();
    for name in ["1", "2", "3", "4"] {
        d.register(cmd::NOTICE_MSG, named(name, Flow::Continue, &log));
    }
    d.dispatch(cmd::NOTICE_MSG, &event(cmd::NOTICE_MSG));
    assert_eq!(*log.lock().unwrap(), vec!["1", "2", "3", "4"]);
    assert!(d.registered_cmds().contains(&cmd::NOTICE_MSG.to_string()));
}
