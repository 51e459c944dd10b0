use std::collections::BTreeMap;

use log::debug;

use crate::error::SubmitterError;
use crate::template::VAR_PREFIX;

/// Defaults for J/psi in p-Pb (muon_calo pass) and for single muons
static DEFAULTS: &[(&str, &str)] = &[
    ("VAR_OCDB_PATH", "\"raw://\""),
    ("VAR_GENPARAM_GENLIB_TYPE", "AliGenMUONlib::kJpsi"),
    ("VAR_GENPARAM_GENLIB_PARNAME", "\"pPb 5.03\""),
    ("VAR_GENCORRHF_QUARK", "5"),
    ("VAR_GENCORRHF_ENERGY", "5"),
    ("VAR_GENPARAMCUSTOM_PDGPARTICLECODE", "443"),
    ("VAR_GENPARAMCUSTOM_Y_P0", "4.08E5"),
    ("VAR_GENPARAMCUSTOM_Y_P1", "7.1E4"),
    ("VAR_GENPARAMCUSTOM_PT_P0", "1.13E9"),
    ("VAR_GENPARAMCUSTOM_PT_P1", "18.05"),
    ("VAR_GENPARAMCUSTOM_PT_P2", "2.05"),
    ("VAR_GENPARAMCUSTOM_PT_P3", "3.34"),
    ("VAR_GENPARAMCUSTOMSINGLE_PTMIN", "0.35"),
    ("VAR_GENPARAMCUSTOMSINGLE_PT_P0", "4.05962"),
    ("VAR_GENPARAMCUSTOMSINGLE_PT_P1", "1.0"),
    ("VAR_GENPARAMCUSTOMSINGLE_PT_P2", "2.46187"),
    ("VAR_GENPARAMCUSTOMSINGLE_PT_P3", "2.08644"),
    ("VAR_GENPARAMCUSTOMSINGLE_Y_P0", "0.729545"),
    ("VAR_GENPARAMCUSTOMSINGLE_Y_P1", "0.53837"),
    ("VAR_GENPARAMCUSTOMSINGLE_Y_P2", "0.141776"),
    ("VAR_GENPARAMCUSTOMSINGLE_Y_P3", "0.0130173"),
];

/// Replacement values for template variables, keyed by upper case name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    vars: BTreeMap<String, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the default generator parameterisation
    pub fn with_defaults() -> Self {
        let vars = DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VariableStore { vars }
    }

    /// Set (or overwrite) a variable. Names are upper-cased and must start with `VAR_`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), SubmitterError> {
        let key = name.to_uppercase();
        if !key.starts_with(VAR_PREFIX) {
            return Err(SubmitterError::InvalidVariableName(name.to_string()));
        }
        debug!("Setting {key} = {value}");
        self.vars.insert(key, value.to_string());
        Ok(())
    }

    /// Set one of the variables the submitter itself manages
    pub(crate) fn set_builtin(&mut self, key: &'static str, value: &str) {
        debug!("Setting {key} = {value}");
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_uppercases_and_overwrites() {
        let mut store = VariableStore::new();
        store.set("var_genlib_parname", "\"pp 5.03\"").unwrap();
        store.set("VAR_GENLIB_PARNAME", "\"pp 13\"").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("VAR_GENLIB_PARNAME"), Some("\"pp 13\""));
    }

    #[test]
    fn test_set_rejects_missing_prefix() {
        let mut store = VariableStore::new();
        let err = store.set("GENLIB", "x").unwrap_err();
        assert!(matches!(err, SubmitterError::InvalidVariableName(name) if name == "GENLIB"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_defaults() {
        let store = VariableStore::with_defaults();
        assert_eq!(store.get("VAR_GENPARAMCUSTOM_PDGPARTICLECODE"), Some("443"));
        assert!(store.iter().all(|(k, _)| k.starts_with(VAR_PREFIX)));
    }
}
