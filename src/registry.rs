//! Registry：驱动注册表，按名字查找驱动。
//!
//! 注册表是一个普通值，由调用方在启动时构造并传给 [`crate::Database::open`]。

use crate::driver::Driver;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Default)]
pub struct Registry {
    drivers: BTreeMap<String, Box<dyn Driver>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, driver: impl Driver + 'static) -> &mut Self {
        self.drivers.insert(name.into(), Box::new(driver));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }

    /// 选出一个驱动：给了 `preferred` 就只认它，否则按 `candidates` 顺序取第一个已注册的。
    pub fn resolve(&self, candidates: &[&str], preferred: Option<&str>) -> Result<Box<dyn Driver>> {
        let wanted: Vec<&str> = match preferred {
            Some(p) => vec![p],
            None => candidates.to_vec(),
        };
        wanted
            .iter()
            .find_map(|name| self.drivers.get(*name))
            .map(|d| dyn_clone::clone_box(&**d))
            .ok_or_else(|| Error::UnsupportedDriver(wanted.iter().map(|s| s.to_string()).collect()))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.drivers.keys()).finish()
    }
}
