//! Host modules exposing runtime services to guest code by export name.
pub mod threadtest;

use crate::runtime::{Compartment, Function};
use std::collections::HashMap;

/// An instantiated host module: named functions bound to a compartment.
#[derive(Debug)]
pub struct ModuleInstance {
    name: &'static str,
    compartment: Compartment,
    exports: HashMap<String, Function>,
}

impl ModuleInstance {
    pub(crate) fn new(
        name: &'static str,
        compartment: &Compartment,
        functions: impl IntoIterator<Item = Function>,
    ) -> Self {
        Self {
            name,
            compartment: compartment.clone(),
            exports: functions
                .into_iter()
                .map(|f| (f.name().to_string(), f))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn compartment(&self) -> &Compartment {
        &self.compartment
    }

    pub fn export(&self, name: &str) -> Option<&Function> {
        self.exports.get(name)
    }

    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }
}
