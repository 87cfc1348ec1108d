// SPDX-License-Identifier: MIT OR Apache-2.0
//! Post-drain resource-level validation: once the main loop stops,
//! every client's finished store is swept once for mRID-provenance
//! violations, each recorded as a warning rather than failing outright.

use crate::runtime::ClientRuntime;
use cactus_track::{WarningSource, WarningTracker};
use cactus_util::{is_invalid_mrid, is_invalid_resource};
use std::collections::BTreeMap;

/// Sweep every client's store once, flagging any resource whose mRID is
/// malformed or doesn't carry the server's PEN.
pub fn validate_stores(runtimes: &BTreeMap<String, ClientRuntime>, server_pen: u32, warnings: &mut WarningTracker) {
    for runtime in runtimes.values() {
        for resource in runtime.store.resources() {
            let Some(mrid) = resource.payload.mrid() else { continue };
            let kind = resource.payload.kind();
            let href = resource.id.href().to_string();

            if is_invalid_mrid(mrid) {
                warnings.record(
                    WarningSource::StoredResource { href },
                    format!("{kind:?} mRID {mrid:?} is not a well-formed 32-char upper-hex mRID"),
                );
                continue;
            }

            if is_invalid_resource(kind, Some(mrid), server_pen) {
                warnings.record(
                    WarningSource::StoredResource { href },
                    format!("{kind:?} mRID {mrid:?} does not carry the server's PEN ({server_pen})"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientRuntime;
    use cactus_model::payload::der::DerProgram;
    use cactus_model::payload::Payload;
    use cactus_model::{ResourceId, ResourceKind, Role, StoredResource};
    use cactus_notify::NotificationsContext;
    use cactus_protocol::{validate::NoopValidator, ProtocolClient};
    use cactus_store::ResourceStore;
    use std::collections::BTreeMap as Map;
    use std::sync::Arc;
    use std::time::SystemTime;

    fn runtime_with(dir: &tempfile::TempDir, store: ResourceStore) -> BTreeMap<String, ClientRuntime> {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert = dir.path().join("client-1-cert.pem");
        let key = dir.path().join("client-1-key.pem");
        std::fs::write(&cert, certified.cert.pem()).unwrap();
        std::fs::write(&key, certified.key_pair.serialize_pem()).unwrap();

        let config = cactus_model::ClientConfig {
            id: "client-1".into(),
            role: Role::Device,
            cert_path: cert,
            key_path: key,
            lfdi: "A".repeat(40),
            pen: 1,
            pin: 1234,
            nominal_max_watts: 5000,
            user_agent: None,
        };
        let observer = Arc::new(cactus_track::ResponseTracker::new());
        let server = cactus_model::ServerConfig {
            device_capability_uri: "https://example.test/dcap".into(),
            verify_hostname: false,
            trust_anchor_path: None,
            notification_collector_uri: "https://example.test/collector".into(),
            server_pen: 1,
            refetch_delay: std::time::Duration::from_millis(10),
        };
        let client = ProtocolClient::with_validator_and_observer(&server, &config, Arc::new(NoopValidator), observer).unwrap();
        let mut runtimes = Map::new();
        runtimes.insert(
            "client-1".to_string(),
            ClientRuntime { config, client, store, notifications: NotificationsContext::new("https://example.test/collector".into()) },
        );
        runtimes
    }

    fn stored_der_program(mrid: &str) -> StoredResource {
        StoredResource {
            id: ResourceId::root(ResourceKind::DerProgram, "/der-program/1"),
            created_at: SystemTime::now(),
            payload: Payload::DerProgram(DerProgram {
                href: Some("/der-program/1".into()),
                mrid: mrid.to_string(),
                primacy: 0,
                default_der_control_link: None,
                der_control_list_link: None,
            }),
            child_links: Map::new(),
            member_of_list: Some(ResourceKind::DerProgramList),
        }
    }

    #[test]
    fn mismatched_pen_is_recorded_as_a_warning() {
        let mut store = ResourceStore::new();
        store.append(stored_der_program(&format!("{}{:08}", "A".repeat(24), 2)));

        let dir = tempfile::tempdir().unwrap();
        let runtimes = runtime_with(&dir, store);
        let mut warnings = WarningTracker::new();
        validate_stores(&runtimes, 1, &mut warnings);

        assert_eq!(warnings.len(), 1);
        assert!(warnings.warnings()[0].message.contains("PEN"));
    }

    #[test]
    fn matching_pen_raises_no_warning() {
        let mut store = ResourceStore::new();
        store.append(stored_der_program(&format!("{}{:08}", "A".repeat(24), 1)));

        let dir = tempfile::tempdir().unwrap();
        let runtimes = runtime_with(&dir, store);
        let mut warnings = WarningTracker::new();
        validate_stores(&runtimes, 1, &mut warnings);

        assert!(warnings.is_empty());
    }

    #[test]
    fn malformed_mrid_is_recorded_as_a_warning() {
        let mut store = ResourceStore::new();
        store.append(stored_der_program("not-a-valid-mrid"));

        let dir = tempfile::tempdir().unwrap();
        let runtimes = runtime_with(&dir, store);
        let mut warnings = WarningTracker::new();
        validate_stores(&runtimes, 1, &mut warnings);

        assert_eq!(warnings.len(), 1);
        assert!(warnings.warnings()[0].message.contains("not a well-formed"));
    }
}
