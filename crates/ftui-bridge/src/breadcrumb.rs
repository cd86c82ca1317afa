//! Process-wide breadcrumb trail for debugging context.
//!
//! A bounded, concurrent-safe ring buffer of recent application events,
//! attached to every [`crate::error::ErrorContext`] so a developer can see
//! what led up to a reported error. Grounded on the read-heavy/write-rare
//! global-slot shape used for `ftui-runtime`'s other process-wide state
//! (`log_sink`'s default sink, `locale::current_locale`), implemented here
//! with a plain `Mutex` since writes (recordings) and reads (error
//! reporting) are comparably frequent — unlike the default logger/reporter
//! slots, which are swapped rarely and read constantly (see
//! [`crate::reporter`], [`crate::logger`]).

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, OnceLock};

use web_time::Instant;

use crate::config::DEFAULT_BREADCRUMB_CAPACITY;

/// Severity of a recorded breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreadcrumbLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// A single structured record of an application event.
#[derive(Debug, Clone)]
pub struct Breadcrumb {
    /// Free-form classification, analogous to Sentry's breadcrumb `type`.
    pub kind: String,
    pub category: String,
    pub message: String,
    pub level: BreadcrumbLevel,
    pub timestamp: Instant,
    pub data: HashMap<String, String>,
}

struct BreadcrumbRing {
    capacity: usize,
    entries: VecDeque<Breadcrumb>,
}

impl BreadcrumbRing {
    fn push(&mut self, crumb: Breadcrumb) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(crumb);
    }
}

static BREADCRUMBS: OnceLock<Mutex<BreadcrumbRing>> = OnceLock::new();

fn breadcrumbs() -> &'static Mutex<BreadcrumbRing> {
    BREADCRUMBS.get_or_init(|| {
        Mutex::new(BreadcrumbRing {
            capacity: DEFAULT_BREADCRUMB_CAPACITY,
            entries: VecDeque::with_capacity(DEFAULT_BREADCRUMB_CAPACITY),
        })
    })
}

/// Append a breadcrumb at `Info` level with kind `"default"`. Oldest entry
/// is dropped once the buffer reaches its capacity (100).
pub fn record_breadcrumb(category: impl Into<String>, message: impl Into<String>, data: HashMap<String, String>) {
    record_breadcrumb_with_level(category, message, BreadcrumbLevel::Info, data);
}

/// Append a breadcrumb with an explicit severity level.
pub fn record_breadcrumb_with_level(
    category: impl Into<String>,
    message: impl Into<String>,
    level: BreadcrumbLevel,
    data: HashMap<String, String>,
) {
    let crumb = Breadcrumb {
        kind: "default".to_string(),
        category: category.into(),
        message: message.into(),
        level,
        timestamp: Instant::now(),
        data,
    };
    breadcrumbs().lock().expect("breadcrumb lock poisoned").push(crumb);
}

/// A defensive copy of the trail, oldest first.
#[must_use]
pub fn get_breadcrumbs() -> Vec<Breadcrumb> {
    breadcrumbs()
        .lock()
        .expect("breadcrumb lock poisoned")
        .entries
        .iter()
        .cloned()
        .collect()
}

/// Empty the trail.
pub fn clear_breadcrumbs() {
    breadcrumbs().lock().expect("breadcrumb lock poisoned").entries.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Breadcrumb state is process-global; serialize tests that touch it.
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    #[test]
    fn record_and_get_roundtrip() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear_breadcrumbs();
        record_breadcrumb("nav", "opened modal", HashMap::new());
        let all = get_breadcrumbs();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].category, "nav");
        assert_eq!(all[0].message, "opened modal");
    }

    #[test]
    fn clear_empties_the_trail() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear_breadcrumbs();
        record_breadcrumb("a", "b", HashMap::new());
        clear_breadcrumbs();
        assert!(get_breadcrumbs().is_empty());
    }

    #[test]
    fn overflow_evicts_oldest_and_caps_at_100() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear_breadcrumbs();
        for i in 0..150 {
            record_breadcrumb("loop", format!("crumb-{i}"), HashMap::new());
        }
        let all = get_breadcrumbs();
        assert_eq!(all.len(), 100);
        // First surviving entry is the 50th inserted (index 50), i.e.
        // insertion index k - 99 for k = 150.
        assert_eq!(all[0].message, "crumb-50");
        assert_eq!(all[99].message, "crumb-149");
    }

    #[test]
    fn chronological_order_preserved() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear_breadcrumbs();
        record_breadcrumb("c", "first", HashMap::new());
        record_breadcrumb("c", "second", HashMap::new());
        record_breadcrumb("c", "third", HashMap::new());
        let all = get_breadcrumbs();
        let messages: Vec<&str> = all.iter().map(|b| b.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn data_map_preserved() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear_breadcrumbs();
        let mut data = HashMap::new();
        data.insert("key".to_string(), "value".to_string());
        record_breadcrumb("c", "m", data);
        let all = get_breadcrumbs();
        assert_eq!(all[0].data.get("key").map(String::as_str), Some("value"));
    }

    #[test]
    fn level_defaults_to_info() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear_breadcrumbs();
        record_breadcrumb("c", "m", HashMap::new());
        let all = get_breadcrumbs();
        assert!(matches!(all[0].level, BreadcrumbLevel::Info));
    }

    #[test]
    fn explicit_level_is_honored() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear_breadcrumbs();
        record_breadcrumb_with_level("c", "m", BreadcrumbLevel::Error, HashMap::new());
        let all = get_breadcrumbs();
        assert!(matches!(all[0].level, BreadcrumbLevel::Error));
    }
}
