use std::collections::BTreeMap;

/// Well-known BNB Chain protocol addresses (routers, aggregators).
/// Addresses are kept lowercase, lookups are case-insensitive.
const DEFAULT_PROTOCOLS: &[(&str, &str)] = &[
    (
        "0x10ed43c718714eb63d5aa57b78b54704e256024e",
        "PancakeSwap Router V2",
    ),
    (
        "0x13f4ea83d0bd40e75c8222255bc855a974568dd4",
        "PancakeSwap Router V3",
    ),
    (
        "0x1b81d678ffb9c0263b24a97847620c99d213eb14",
        "PancakeSwap: Smart Router",
    ),
    (
        "0x05ff2b0db69458a0750badebc4f9e13add608c7f",
        "PancakeSwap: Old Router",
    ),
    (
        "0xcf0febd3f17cef5b47b0cd257acf6025c5bff3b7",
        "ApeSwap Router",
    ),
    (
        "0x3a6d8ca21d1cf76f653a67577fa0d27453350dd8",
        "Biswap Router",
    ),
    (
        "0x325e343f1de602396e256b67efd1f61c3a6b38bd",
        "Thena Router",
    ),
    ("0xdef171fe48cf0115b1d80b88dc8eab59176fee57", "ParaSwap"),
    (
        "0x1111111254eeb25477b68fb85ed929f73a960582",
        "1inch Router V5",
    ),
    (
        "0x6352a56caadc4f1e25cd6c75970fa768a3304e64",
        "OpenOcean Exchange",
    ),
];

/// Immutable table mapping known contract addresses to protocol names.
/// Built once at startup and passed by reference into the classifier,
/// so tests can substitute their own table.
#[derive(Debug, Clone, Default)]
pub struct ProtocolRegistry {
    protocols: BTreeMap<String, String>,
}

impl ProtocolRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in table of well-known protocols
    pub fn builtin() -> Self {
        let protocols = DEFAULT_PROTOCOLS
            .iter()
            .map(|(addr, name)| (addr.to_string(), name.to_string()))
            .collect();
        ProtocolRegistry { protocols }
    }

    /// Builtin table extended with entries from the config file.
    /// Config entries win on address collision.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = Self::builtin();
        for (addr, name) in overrides {
            registry
                .protocols
                .insert(addr.to_lowercase(), name.to_string());
        }
        registry
    }

    pub fn lookup(&self, address: &str) -> Option<&str> {
        self.protocols
            .get(&address.to_lowercase())
            .map(|name| name.as_str())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.lookup(address).is_some()
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ProtocolRegistry::builtin();
        assert_eq!(
            registry.lookup("0x10ed43c718714eb63d5aa57b78b54704e256024e"),
            Some("PancakeSwap Router V2")
        );
        assert_eq!(
            registry.lookup("0x10ED43C718714eb63d5aA57B78B54704E256024E"),
            Some("PancakeSwap Router V2")
        );
        assert_eq!(registry.lookup("0x0000000000000000000000000000000000000001"), None);
    }

    #[test]
    fn test_overrides_win_on_collision() {
        let registry = ProtocolRegistry::with_overrides(vec![
            ("0x10ED43C718714eb63d5aA57B78B54704E256024E", "My Router"),
            ("0x00000000000000000000000000000000000000aa", "House DEX"),
        ]);
        assert_eq!(
            registry.lookup("0x10ed43c718714eb63d5aa57b78b54704e256024e"),
            Some("My Router")
        );
        assert_eq!(
            registry.lookup("0x00000000000000000000000000000000000000AA"),
            Some("House DEX")
        );
        assert_eq!(registry.len(), DEFAULT_PROTOCOLS.len() + 1);
    }

    #[test]
    fn test_empty_registry_knows_nothing() {
        let registry = ProtocolRegistry::empty();
        assert!(registry.is_empty());
        assert!(!registry.contains("0x10ed43c718714eb63d5aa57b78b54704e256024e"));
    }
}
