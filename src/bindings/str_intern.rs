use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

static INTERN: Lazy<RwLock<HashMap<String, Arc<str>>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Intern a &str -> Arc<str>. Action names and category labels repeat across
/// thousands of bindings; equal strings share the same Arc buffer.
pub fn intern<S: AsRef<str>>(s: S) -> Arc<str> {
    let s = s.as_ref();
    // fast path: read lock
    if let Some(existing) = INTERN.read().get(s) {
        return Arc::clone(existing);
    }
    // slow path: upgrade to write
    let mut w = INTERN.write();
    if let Some(existing) = w.get(s) {
        return Arc::clone(existing);
    }
    let arc: Arc<str> = Arc::from(s.to_owned());
    w.insert(arc.to_string(), Arc::clone(&arc));
    arc
}
