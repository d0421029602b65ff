//! Local address enumeration
//!
//! MOBIKE announces every address the host can be reached on. Where those
//! addresses come from (netlink, routing socket, static configuration) is
//! behind [`KernelInterface`], shared by all IKE SAs of the daemon.

use parking_lot::RwLock;
use std::net::IpAddr;

/// Source of locally configured addresses
///
/// Implementations are queried concurrently from many IKE SAs and must not
/// block.
pub trait KernelInterface: Send + Sync {
    /// Addresses currently configured on local interfaces
    fn local_addresses(&self) -> Vec<IpAddr>;
}

/// Address list kept in memory
///
/// Readers take a shared lock, so enumeration from many SAs runs in
/// parallel; an interface monitor replaces the list as addresses change.
#[derive(Debug, Default)]
pub struct StaticKernelInterface {
    addrs: RwLock<Vec<IpAddr>>,
}

impl StaticKernelInterface {
    /// Create with an initial address list
    pub fn new(addrs: Vec<IpAddr>) -> Self {
        StaticKernelInterface {
            addrs: RwLock::new(addrs),
        }
    }

    /// Replace the whole address list
    pub fn set_addresses(&self, addrs: Vec<IpAddr>) {
        *self.addrs.write() = addrs;
    }

    /// Add an address if not already present
    pub fn add_address(&self, addr: IpAddr) -> bool {
        let mut addrs = self.addrs.write();
        if addrs.contains(&addr) {
            return false;
        }
        addrs.push(addr);
        true
    }

    /// Remove an address, returns whether it was present
    pub fn remove_address(&self, addr: &IpAddr) -> bool {
        let mut addrs = self.addrs.write();
        let before = addrs.len();
        addrs.retain(|a| a != addr);
        addrs.len() != before
    }
}

impl KernelInterface for StaticKernelInterface {
    fn local_addresses(&self) -> Vec<IpAddr> {
        self.addrs.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_add_remove() {
        let kernel = StaticKernelInterface::default();
        let a: IpAddr = "192.0.2.10".parse().unwrap();

        assert!(kernel.add_address(a));
        assert!(!kernel.add_address(a));
        assert_eq!(kernel.local_addresses(), vec![a]);

        assert!(kernel.remove_address(&a));
        assert!(!kernel.remove_address(&a));
        assert!(kernel.local_addresses().is_empty());
    }

    #[test]
    fn test_set_addresses_keeps_order() {
        let kernel = StaticKernelInterface::new(vec!["10.0.0.1".parse().unwrap()]);
        let addrs: Vec<IpAddr> = vec![
            "2001:db8::2".parse().unwrap(),
            "10.0.0.2".parse().unwrap(),
        ];
        kernel.set_addresses(addrs.clone());
        assert_eq!(kernel.local_addresses(), addrs);
    }

    #[test]
    fn test_concurrent_enumeration() {
        let kernel = Arc::new(StaticKernelInterface::new(vec![
            "10.0.0.1".parse().unwrap(),
            "10.0.0.2".parse().unwrap(),
        ]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let kernel = Arc::clone(&kernel);
                thread::spawn(move || kernel.local_addresses().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
