//! Exercises the generated-proxy pattern end to end: this file
//! contains a mock expanded by hand into exactly the shape the emitter
//! produces, driven against the real dispatch core.

use std::cell::RefCell;
use std::rc::Rc;

use mimicry::dispatch::Dispatcher;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String) -> bool;
    fn keys(&self) -> Vec<String>;
}

pub trait Closer {
    fn close(&mut self);
}

pub trait Store: KeyValueStore + Closer {
    fn flush(&mut self) -> usize;
    fn close(&mut self) -> bool;
}

pub struct StoreMock {
    core: RefCell<Dispatcher>,
}

impl StoreMock {
    pub fn new() -> Self {
        Self {
            core: RefCell::new(Dispatcher::new()),
        }
    }

    pub fn add_flush(&self, stub: impl Fn() -> usize + 'static) {
        let stub: Rc<dyn Fn() -> usize> = Rc::new(stub);
        self.core.borrow_mut().add("flush", Rc::new(stub));
    }

    pub fn set_flush(&self, stub: impl Fn() -> usize + 'static) {
        let stub: Rc<dyn Fn() -> usize> = Rc::new(stub);
        self.core.borrow_mut().set("flush", Rc::new(stub));
    }

    pub fn add_close(&self, stub: impl Fn() -> bool + 'static) {
        let stub: Rc<dyn Fn() -> bool> = Rc::new(stub);
        self.core.borrow_mut().add("close", Rc::new(stub));
    }

    pub fn add_get(&self, stub: impl Fn(&str) -> Option<String> + 'static) {
        let stub: Rc<dyn Fn(&str) -> Option<String>> = Rc::new(stub);
        self.core.borrow_mut().add("get", Rc::new(stub));
    }

    pub fn add_put(&self, stub: impl Fn(&str, String) -> bool + 'static) {
        let stub: Rc<dyn Fn(&str, String) -> bool> = Rc::new(stub);
        self.core.borrow_mut().add("put", Rc::new(stub));
    }

    pub fn set_keys(&self, stub: impl Fn() -> Vec<String> + 'static) {
        let stub: Rc<dyn Fn() -> Vec<String>> = Rc::new(stub);
        self.core.borrow_mut().set("keys", Rc::new(stub));
    }

    pub fn has_more(&self) -> bool {
        self.core.borrow().has_more()
    }

    pub fn misses(&self) -> Vec<String> {
        self.core.borrow().misses().to_vec()
    }
}

impl Default for StoreMock {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for StoreMock {
    fn flush(&mut self) -> usize {
        let __stub = self.core.borrow_mut().next("flush");
        match __stub.and_then(|s| s.downcast::<Rc<dyn Fn() -> usize>>().ok()) {
            Some(__call) => (*__call)(),
            None => {
                self.core.borrow_mut().record_miss("flush");
                Default::default()
            }
        }
    }

    fn close(&mut self) -> bool {
        let __stub = self.core.borrow_mut().next("close");
        match __stub.and_then(|s| s.downcast::<Rc<dyn Fn() -> bool>>().ok()) {
            Some(__call) => (*__call)(),
            None => {
                self.core.borrow_mut().record_miss("close");
                Default::default()
            }
        }
    }
}

impl KeyValueStore for StoreMock {
    fn get(&self, key: &str) -> Option<String> {
        let __stub = self.core.borrow_mut().next("get");
        match __stub.and_then(|s| s.downcast::<Rc<dyn Fn(&str) -> Option<String>>>().ok()) {
            Some(__call) => (*__call)(key),
            None => {
                self.core.borrow_mut().record_miss("get");
                Default::default()
            }
        }
    }

    fn put(&mut self, key: &str, value: String) -> bool {
        let __stub = self.core.borrow_mut().next("put");
        match __stub.and_then(|s| s.downcast::<Rc<dyn Fn(&str, String) -> bool>>().ok()) {
            Some(__call) => (*__call)(key, value),
            None => {
                self.core.borrow_mut().record_miss("put");
                Default::default()
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        let __stub = self.core.borrow_mut().next("keys");
        match __stub.and_then(|s| s.downcast::<Rc<dyn Fn() -> Vec<String>>>().ok()) {
            Some(__call) => (*__call)(),
            None => {
                self.core.borrow_mut().record_miss("keys");
                Default::default()
            }
        }
    }
}

impl Closer for StoreMock {
    fn close(&mut self) {
        let __stub = self.core.borrow_mut().next("close");
        match __stub.and_then(|s| s.downcast::<Rc<dyn Fn()>>().ok()) {
            Some(__call) => (*__call)(),
            None => {
                self.core.borrow_mut().record_miss("close");
                Default::default()
            }
        }
    }
}

#[test]
fn sequence_stubs_answer_in_global_order() {
    let mut mock = StoreMock::new();
    mock.add_get(|key| Some(format!("{key}-v")));
    mock.add_put(|_, _| true);

    assert_eq!(mock.get("a").as_deref(), Some("a-v"));
    assert!(mock.put("a", "x".to_string()));
    assert!(!mock.has_more());
    assert!(mock.misses().is_empty());
}

#[test]
fn out_of_order_call_misses_and_returns_default() {
    let mut mock = StoreMock::new();
    mock.add_get(|_| Some("v".to_string()));
    mock.add_flush(|| 7);

    // flush is stubbed but get comes first in the asserted order
    assert_eq!(mock.flush(), 0);
    assert_eq!(mock.misses(), ["flush".to_string()]);
    assert!(mock.has_more());

    assert_eq!(mock.get("k").as_deref(), Some("v"));
    assert_eq!(mock.flush(), 7);
    assert!(!mock.has_more());
}

#[test]
fn permanent_stub_is_reusable() {
    let mock = StoreMock::new();
    mock.set_keys(|| vec!["a".to_string(), "b".to_string()]);
    assert_eq!(mock.keys().len(), 2);
    assert_eq!(mock.keys().len(), 2);
    assert!(mock.misses().is_empty());
}

#[test]
fn sequence_blocks_same_name_permanent_until_consumed() {
    let mut mock = StoreMock::new();
    mock.add_flush(|| 1);
    mock.set_flush(|| 99);

    assert_eq!(mock.flush(), 1);
    assert_eq!(mock.flush(), 99);
    assert_eq!(mock.flush(), 99);
}

#[test]
fn unstubbed_call_records_miss_and_defaults() {
    let mut mock = StoreMock::new();
    assert_eq!(mock.get("nope"), None);
    assert!(!mock.put("k", "v".to_string()));
    assert_eq!(mock.misses(), ["get".to_string(), "put".to_string()]);
}

#[test]
fn shadowed_method_dispatches_through_the_outer_signature() {
    let mut mock = StoreMock::new();
    mock.add_close(|| true);

    // The registration surface is typed after Store's declaration, so
    // the Store path finds a correctly-typed stub.
    assert!(Store::close(&mut mock));
    assert!(mock.misses().is_empty());
}

#[test]
fn shadowed_embedded_path_always_misses() {
    let mut mock = StoreMock::new();
    mock.add_close(|| true);

    // Closer's close takes no results; the stored stub is typed for
    // Store's close, so the downcast fails and the call is journaled.
    Closer::close(&mut mock);
    assert_eq!(mock.misses(), ["close".to_string()]);
}

#[test]
fn shadowed_embedded_path_consumes_the_pending_stub() {
    let mut mock = StoreMock::new();
    mock.add_close(|| true);

    // The timeline head expects close, so the embedded-path call
    // retrieves the sequence entry before its downcast fails. The
    // outer stub is gone; `mim check` flags this shape (CONTRACT-002).
    Closer::close(&mut mock);
    assert!(!mock.has_more());
    assert!(!Store::close(&mut mock));
    assert_eq!(mock.misses(), ["close".to_string(), "close".to_string()]);
}

#[test]
fn stubs_can_capture_test_locals() {
    use std::cell::Cell;

    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    let mock = StoreMock::new();
    mock.set_keys(move || {
        seen.set(seen.get() + 1);
        Vec::new()
    });
    mock.keys();
    mock.keys();
    assert_eq!(hits.get(), 2);
}
