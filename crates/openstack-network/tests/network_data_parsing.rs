//! Integration tests for parsing Neutron responses.

use openstack_network::{IpVersion, Subnet};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Deserialize)]
struct SubnetsRoot {
    subnets: Vec<Subnet>,
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_subnets() -> Vec<Subnet> {
    let fixture_path = fixtures_dir().join("subnets.json");
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read subnet fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    let root: SubnetsRoot = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize subnet list: {e}"));
    root.subnets
}

#[test]
fn test_deserialize_subnet_list() {
    let subnets = load_subnets();
    assert_eq!(subnets.len(), 2, "Expected 2 subnets in test data");
}

#[test]
fn test_ipv4_subnet() {
    let subnets = load_subnets();
    let private = subnets
        .iter()
        .find(|s| s.ip_version == IpVersion::V4)
        .expect("Should have an IPv4 subnet");

    assert_eq!(private.name, "private-subnet");
    assert!(private.enable_dhcp);
    assert_eq!(private.dns_nameservers, ["8.8.8.8", "8.8.4.4"]);
    assert_eq!(private.allocation_pools[0].start, "10.0.0.2");
    assert_eq!(private.host_routes[0].nexthop, "10.0.0.10");
    assert_eq!(private.gateway_ip.as_deref(), Some("10.0.0.1"));
}

#[test]
fn test_ipv6_subnet_without_gateway() {
    let subnets = load_subnets();
    let public = subnets
        .iter()
        .find(|s| s.ip_version == IpVersion::V6)
        .expect("Should have an IPv6 subnet");

    assert_eq!(public.cidr, "2001:db8::/64");
    assert!(public.gateway_ip.is_none());
    assert!(public.host_routes.is_empty());
    assert_eq!(
        public.id.to_string(),
        "54d6f61d-db07-451c-9ab3-b9609b6b6f0b"
    );
}
