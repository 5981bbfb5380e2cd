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
