//! MOBIKE Integration Tests
//!
//! End-to-end flows between an initiator and a responder task, each working
//! on its own view of the IKE SA.

#![cfg(feature = "ipsec")]

use fynx_mobike::ipsec::{
    ikev2::{
        encode_address, ExchangeType, Extension, IkeMessage, IkePayload, IkeSa, MobikeTask,
        NotifyPayload, NotifyType, Role, SharedIkeSa, Task, TaskStatus,
    },
    kernel::StaticKernelInterface,
    metrics::MobikeMetrics,
    nat::NatStatus,
    MobikeConfig,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

const SPI_I: [u8; 8] = [0x11; 8];
const SPI_R: [u8; 8] = [0x22; 8];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fynx_mobike=trace")
        .with_test_writer()
        .try_init();
}

fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// Initiator and responder view of the same IKE SA
fn create_sa_pair(initiator: &str, responder: &str) -> (SharedIkeSa, SharedIkeSa) {
    let sa_i = IkeSa::new(SPI_I, SPI_R, addr(initiator), addr(responder)).into_shared();
    let sa_r = IkeSa::new(SPI_I, SPI_R, addr(responder), addr(initiator)).into_shared();
    (sa_i, sa_r)
}

fn kernel(addrs: &[&str]) -> Arc<StaticKernelInterface> {
    Arc::new(StaticKernelInterface::new(addrs.iter().map(|a| ip(a)).collect()))
}

fn with_sa_payload(mut message: IkeMessage) -> IkeMessage {
    message.add_payload(IkePayload::SA(vec![0u8; 8]));
    message
}

/// Encode every notify body and parse it back, as the transport does
fn over_the_wire(message: &IkeMessage) -> IkeMessage {
    let mut received =
        IkeMessage::new(message.exchange_type, message.message_id, message.is_response);
    for payload in &message.payloads {
        match payload {
            IkePayload::N(notify) => {
                let body = notify.to_payload_data().unwrap();
                assert_eq!(
                    usize::from(notify.total_length().unwrap()),
                    NotifyPayload::HEADER_SIZE + body.len()
                );
                let parsed = NotifyPayload::from_payload_data(&body)
                    .unwrap()
                    .with_critical(notify.critical);
                received.add_payload(IkePayload::N(parsed));
            }
            other => received.add_payload(other.clone()),
        }
    }
    received
}

/// Run the IKE_AUTH leg of both tasks
fn ike_auth(task_i: &mut MobikeTask, task_r: &mut MobikeTask) -> (IkeMessage, IkeMessage) {
    let mut request = with_sa_payload(IkeMessage::request(ExchangeType::IkeAuth, 1));
    assert_eq!(task_i.build(&mut request).unwrap(), TaskStatus::NeedMore);
    assert_eq!(
        task_r.process(&over_the_wire(&request)).unwrap(),
        TaskStatus::NeedMore
    );

    let mut response = with_sa_payload(IkeMessage::response_to(&request));
    assert_eq!(task_r.build(&mut response).unwrap(), TaskStatus::Success);
    assert_eq!(
        task_i.process(&over_the_wire(&response)).unwrap(),
        TaskStatus::Success
    );

    (request, response)
}

//
// Test Cases - Negotiation
//

#[test]
fn test_mobike_negotiation() {
    init_tracing();
    let (sa_i, sa_r) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    let mut task_i = MobikeTask::new(
        Arc::clone(&sa_i),
        kernel(&["192.0.2.1", "10.0.0.1", "2001:db8::1"]),
        Role::Initiator,
    );
    let mut task_r = MobikeTask::new(
        Arc::clone(&sa_r),
        kernel(&["198.51.100.1", "172.16.0.1"]),
        Role::Responder,
    );

    let (request, response) = ike_auth(&mut task_i, &mut task_r);

    assert_eq!(
        request.notify_types(),
        vec![
            NotifyType::MobikeSupported,
            NotifyType::AdditionalIp4Address,
            NotifyType::AdditionalIp6Address,
        ]
    );
    assert_eq!(
        response.notify_types(),
        vec![
            NotifyType::MobikeSupported,
            NotifyType::AdditionalIp4Address,
        ]
    );

    let sa_i = sa_i.lock();
    let sa_r = sa_r.lock();
    assert!(sa_i.supports_extension(Extension::Mobike));
    assert!(sa_r.supports_extension(Extension::Mobike));

    let learned_r: Vec<IpAddr> = sa_r.additional_addresses().iter().copied().collect();
    assert_eq!(learned_r, vec![ip("10.0.0.1"), ip("2001:db8::1")]);
    let learned_i: Vec<IpAddr> = sa_i.additional_addresses().iter().copied().collect();
    assert_eq!(learned_i, vec![ip("172.16.0.1")]);
}

#[test]
fn test_responder_without_mobike_peer() {
    init_tracing();
    let (_, sa_r) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    let mut task_r = MobikeTask::new(
        Arc::clone(&sa_r),
        kernel(&["172.16.0.1"]),
        Role::Responder,
    );

    // peer without MOBIKE
    let request = with_sa_payload(IkeMessage::request(ExchangeType::IkeAuth, 1));
    assert_eq!(task_r.process(&request).unwrap(), TaskStatus::NeedMore);

    let mut response = with_sa_payload(IkeMessage::response_to(&request));
    assert_eq!(task_r.build(&mut response).unwrap(), TaskStatus::Success);

    assert!(response.notify_types().is_empty());
    assert!(!sa_r.lock().supports_extension(Extension::Mobike));
}

#[test]
fn test_single_homed_peers() {
    init_tracing();
    let (sa_i, sa_r) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    sa_r.lock().additional_addresses_mut().add(ip("10.9.9.9"));

    let mut task_i = MobikeTask::new(Arc::clone(&sa_i), kernel(&["192.0.2.1"]), Role::Initiator);
    let mut task_r = MobikeTask::new(Arc::clone(&sa_r), kernel(&["198.51.100.1"]), Role::Responder);

    let (request, response) = ike_auth(&mut task_i, &mut task_r);

    assert_eq!(
        request.notify_types(),
        vec![NotifyType::MobikeSupported, NotifyType::NoAdditionalAddresses]
    );
    assert_eq!(
        response.notify_types(),
        vec![NotifyType::MobikeSupported, NotifyType::NoAdditionalAddresses]
    );
    assert!(sa_r.lock().additional_addresses().is_empty());
    assert!(sa_i.lock().additional_addresses().is_empty());
}

//
// Test Cases - Roaming
//

#[test]
fn test_roam_with_address_update() {
    init_tracing();
    let (sa_i, sa_r) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    let local = kernel(&["192.0.2.1", "10.0.0.1"]);
    let metrics = MobikeMetrics::new();

    let mut task_i = MobikeTask::new(Arc::clone(&sa_i), local.clone(), Role::Initiator)
        .with_metrics(metrics.clone());
    let mut task_r = MobikeTask::new(Arc::clone(&sa_r), kernel(&[]), Role::Responder)
        .with_metrics(metrics.clone());
    ike_auth(&mut task_i, &mut task_r);

    // the primary interface goes away
    local.remove_address(&ip("192.0.2.1"));
    let mut roam_i = MobikeTask::new(Arc::clone(&sa_i), local.clone(), Role::Initiator);
    roam_i.roam(Some(addr("10.0.0.1:4500")), None);

    let mut request = IkeMessage::request(ExchangeType::Informational, 2);
    assert_eq!(roam_i.build(&mut request).unwrap(), TaskStatus::NeedMore);

    // address list is built against the old primary address
    assert_eq!(
        request.notify_types(),
        vec![
            NotifyType::UpdateSaAddresses,
            NotifyType::AdditionalIp4Address,
        ]
    );
    assert_eq!(
        request
            .get_notify(NotifyType::AdditionalIp4Address)
            .unwrap()
            .data,
        encode_address(&ip("10.0.0.1"))
    );
    assert_eq!(sa_i.lock().my_host(), addr("10.0.0.1:4500"));
    assert_eq!(sa_i.lock().other_host(), addr("198.51.100.1:4500"));

    let received = over_the_wire(&request);
    assert_eq!(received, request);

    let mut roam_r = MobikeTask::new(Arc::clone(&sa_r), kernel(&[]), Role::Responder);
    assert_eq!(roam_r.process(&received).unwrap(), TaskStatus::NeedMore);
    let mut response = IkeMessage::response_to(&request);
    assert_eq!(roam_r.build(&mut response).unwrap(), TaskStatus::Success);
    assert_eq!(roam_i.process(&response).unwrap(), TaskStatus::Success);

    let learned: Vec<IpAddr> = sa_r.lock().additional_addresses().iter().copied().collect();
    assert_eq!(learned, vec![ip("10.0.0.1")]);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.mobike_negotiated, 2);
    assert_eq!(snapshot.address_lists_sent, 2);
}

#[test]
fn test_roam_with_nat_detection() {
    init_tracing();
    let (sa_i, sa_r) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    let config = MobikeConfig::builder()
        .with_nat_detection(true)
        .build()
        .unwrap();

    let mut task_i =
        MobikeTask::from_config(&config, Arc::clone(&sa_i), kernel(&["203.0.113.5"]), Role::Initiator)
            .unwrap();
    let mut task_r =
        MobikeTask::from_config(&config, Arc::clone(&sa_r), kernel(&[]), Role::Responder).unwrap();

    task_i.roam(Some(addr("203.0.113.5:4500")), None);
    let mut request = IkeMessage::request(ExchangeType::Informational, 2);
    task_i.build(&mut request).unwrap();

    assert!(request.get_notify(NotifyType::NatDetectionSourceIp).is_some());
    assert!(request.get_notify(NotifyType::NatDetectionDestinationIp).is_some());

    // the responder's transport sees the request arriving from the new address
    sa_r.lock().update_hosts(None, Some(addr("203.0.113.5:4500")));

    task_r.process(&over_the_wire(&request)).unwrap();
    let mut response = IkeMessage::response_to(&request);
    task_r.build(&mut response).unwrap();
    assert!(response.get_notify(NotifyType::NatDetectionSourceIp).is_some());

    task_i.process(&over_the_wire(&response)).unwrap();

    assert_eq!(sa_r.lock().nat_status(), Some(NatStatus::NoNat));
    assert_eq!(sa_i.lock().nat_status(), Some(NatStatus::NoNat));
}

#[test]
fn test_roam_behind_nat() {
    init_tracing();
    let (sa_i, sa_r) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    let config = MobikeConfig::builder()
        .with_nat_detection(true)
        .build()
        .unwrap();

    let mut task_i =
        MobikeTask::from_config(&config, Arc::clone(&sa_i), kernel(&[]), Role::Initiator).unwrap();
    let mut task_r =
        MobikeTask::from_config(&config, Arc::clone(&sa_r), kernel(&[]), Role::Responder).unwrap();

    task_i.roam(Some(addr("10.0.0.7:4500")), None);
    let mut request = IkeMessage::request(ExchangeType::Informational, 2);
    task_i.build(&mut request).unwrap();

    // a NAT rewrites the private address
    sa_r.lock().update_hosts(None, Some(addr("203.0.113.50:61000")));

    task_r.process(&request).unwrap();
    let mut response = IkeMessage::response_to(&request);
    task_r.build(&mut response).unwrap();
    task_i.process(&response).unwrap();

    assert_eq!(sa_r.lock().nat_status(), Some(NatStatus::RemoteNat));
    assert_eq!(sa_i.lock().nat_status(), Some(NatStatus::LocalNat));
    assert!(sa_i.lock().supports_extension(Extension::NatT));
}

//
// Test Cases - Lifecycle
//

#[test]
fn test_migrate_to_rekeyed_sa() {
    init_tracing();
    let (sa_i, _) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    let rekeyed = IkeSa::new([0x33; 8], [0x44; 8], addr("192.0.2.1:4500"), addr("198.51.100.1:4500"))
        .into_shared();
    let config = MobikeConfig::builder()
        .with_nat_detection(true)
        .build()
        .unwrap();

    let mut task =
        MobikeTask::from_config(&config, Arc::clone(&sa_i), kernel(&[]), Role::Initiator).unwrap();
    task.roam(Some(addr("10.0.0.1:4500")), Some(addr("198.51.100.2:4500")));
    task.migrate(Arc::clone(&rekeyed));

    assert_eq!(task.pending_addresses(), (None, None));
    assert!(task.cookie2().is_empty());
    assert!(task.has_nat_detection());

    // a roam staged after migration applies to the new SA
    task.roam(Some(addr("10.0.0.1:4500")), None);
    let mut request = IkeMessage::request(ExchangeType::Informational, 0);
    task.build(&mut request).unwrap();

    assert_eq!(rekeyed.lock().my_host(), addr("10.0.0.1:4500"));
    assert_eq!(sa_i.lock().my_host(), addr("192.0.2.1:4500"));
}

#[test]
fn test_malformed_address_is_rejected() {
    init_tracing();
    let (_, sa_r) = create_sa_pair("192.0.2.1:4500", "198.51.100.1:4500");
    let mut task_r = MobikeTask::new(Arc::clone(&sa_r), kernel(&[]), Role::Responder);

    let mut request = IkeMessage::request(ExchangeType::Informational, 3);
    request.add_notify(false, NotifyType::AdditionalIp4Address, vec![10, 0, 0, 1, 0]);

    assert!(task_r.process(&request).is_err());
    assert!(sa_r.lock().additional_addresses().is_empty());
}
