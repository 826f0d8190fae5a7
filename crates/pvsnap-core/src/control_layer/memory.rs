use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{ControlLayer, TaskStatus};
use crate::errors::{Result, SnapError};
use crate::model::{EpicsData, EpicsValue};

#[derive(Debug, Default)]
struct Pvs {
    values: HashMap<String, EpicsData>,
    unreadable: HashSet<String>,
    put_failures: HashMap<String, String>,
    put_log: Vec<(String, EpicsValue)>,
}

/// Simulated control system
///
/// Holds PV values in memory and supports read and write failure injection.
/// Successful writes update the stored value.
#[derive(Debug, Default)]
pub struct MemoryControlLayer {
    pvs: Mutex<Pvs>,
    get_calls: AtomicUsize,
    get_many_calls: AtomicUsize,
    put_calls: AtomicUsize,
    put_many_calls: AtomicUsize,
}

impl MemoryControlLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a healthy value for `pv_name`
    pub fn with_value(self, pv_name: impl Into<String>, value: impl Into<EpicsValue>) -> Self {
        self.set_data(pv_name, EpicsData::new(value));
        self
    }

    pub fn set_data(&self, pv_name: impl Into<String>, data: EpicsData) {
        self.with_pvs(|pvs| {
            pvs.values.insert(pv_name.into(), data);
        });
    }

    /// Make reads of `pv_name` fail
    pub fn set_unreadable(&self, pv_name: impl Into<String>) {
        self.with_pvs(|pvs| {
            pvs.unreadable.insert(pv_name.into());
        });
    }

    /// Make writes to `pv_name` fail with `reason`
    pub fn set_put_failure(&self, pv_name: impl Into<String>, reason: impl Into<String>) {
        self.with_pvs(|pvs| {
            pvs.put_failures.insert(pv_name.into(), reason.into());
        });
    }

    /// Every attempted write, in order
    pub fn put_log(&self) -> Vec<(String, EpicsValue)> {
        self.with_pvs(|pvs| pvs.put_log.clone())
    }

    pub fn value(&self, pv_name: &str) -> Option<EpicsValue> {
        self.with_pvs(|pvs| pvs.values.get(pv_name).map(|d| d.data.clone()))
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn get_many_count(&self) -> usize {
        self.get_many_calls.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn put_many_count(&self) -> usize {
        self.put_many_calls.load(Ordering::SeqCst)
    }

    fn with_pvs<T>(&self, f: impl FnOnce(&mut Pvs) -> T) -> T {
        let mut guard = self
            .pvs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    fn read(&self, pv_name: &str) -> Result<EpicsData> {
        self.with_pvs(|pvs| {
            if pvs.unreadable.contains(pv_name) {
                return Err(SnapError::UnreadableValue {
                    pv_name: pv_name.to_string(),
                    reason: "channel disconnected".to_string(),
                });
            }
            pvs.values
                .get(pv_name)
                .cloned()
                .ok_or_else(|| SnapError::UnreadableValue {
                    pv_name: pv_name.to_string(),
                    reason: "no such channel".to_string(),
                })
        })
    }

    fn write(&self, pv_name: &str, value: &EpicsValue) -> TaskStatus {
        self.with_pvs(|pvs| {
            pvs.put_log.push((pv_name.to_string(), value.clone()));
            if let Some(reason) = pvs.put_failures.get(pv_name) {
                return TaskStatus::failure(pv_name, value.clone(), reason.clone());
            }
            pvs.values
                .insert(pv_name.to_string(), EpicsData::new(value.clone()));
            TaskStatus::success(pv_name, value.clone())
        })
    }
}

impl ControlLayer for MemoryControlLayer {
    fn get(&self, pv_name: &str) -> Result<EpicsData> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.read(pv_name)
    }

    fn get_many(&self, pv_names: &[String]) -> Vec<Result<EpicsData>> {
        self.get_many_calls.fetch_add(1, Ordering::SeqCst);
        pv_names.iter().map(|pv| self.read(pv)).collect()
    }

    fn put(&self, pv_name: &str, value: &EpicsValue) -> TaskStatus {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.write(pv_name, value)
    }

    fn put_many(&self, targets: &[(String, EpicsValue)]) -> Vec<TaskStatus> {
        self.put_many_calls.fetch_add(1, Ordering::SeqCst);
        targets.iter().map(|(pv, value)| self.write(pv, value)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_many_reports_each_position() {
        let cl = MemoryControlLayer::new()
            .with_value("A", 1.0)
            .with_value("B", 2.0);
        cl.set_unreadable("B");

        let results = cl.get_many(&["A".to_string(), "B".to_string(), "C".to_string()]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().data, EpicsValue::Float(1.0));
        assert!(matches!(results[1], Err(SnapError::UnreadableValue { .. })));
        assert!(results[2].is_err());
        assert_eq!(cl.get_many_count(), 1);
        assert_eq!(cl.get_count(), 0);
    }

    #[test]
    fn test_put_updates_value_unless_failing() {
        let cl = MemoryControlLayer::new().with_value("A", 1.0);
        cl.set_put_failure("B", "read-only channel");

        assert!(!cl.put("A", &EpicsValue::Float(3.0)).failed());
        assert_eq!(cl.value("A"), Some(EpicsValue::Float(3.0)));

        assert!(cl.put("B", &EpicsValue::Int(1)).failed());
        assert_eq!(cl.value("B"), None);
        assert_eq!(cl.put_log().len(), 2);
    }
}
