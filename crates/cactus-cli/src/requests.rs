// SPDX-License-Identifier: MIT OR Apache-2.0
//! Writes the response tracker's timeline out as `requests/<idx>-...` file
//! pairs.

use cactus_track::response::ResponseTrackerEntry;
use std::path::Path;

/// Write every entry in `entries` (in timeline order) to `dir` as one or
/// two files per entry: `<idx>-<client>-<method>-<sanitised-path>.request`
/// / `.response` for server responses, `<idx>-<resource>-NOTIFICATION.request`
/// for inbound notifications.
pub fn write_all(dir: &Path, entries: &[ResponseTrackerEntry]) -> std::io::Result<()> {
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            ResponseTrackerEntry::ServerResponse(record) => {
                let stem = format!("{index}-{}-{}-{}", record.descriptor.client_alias, record.descriptor.method, sanitise(&record.descriptor.path));
                std::fs::write(dir.join(format!("{stem}.request")), record.request_body.as_deref().unwrap_or(""))?;
                std::fs::write(dir.join(format!("{stem}.response")), record.response_body.as_deref().unwrap_or(""))?;
            }
            ResponseTrackerEntry::NotificationRequest(notification) => {
                let stem = format!("{index}-{}-NOTIFICATION", sanitise(&notification.subscribed_resource));
                std::fs::write(dir.join(format!("{stem}.request")), notification.subscribed_resource.as_bytes())?;
            }
        }
    }
    Ok(())
}

/// Replace every non-alphanumeric byte with `_`, matching the "sanitised
/// url" naming without pinning down an exact algorithm.
fn sanitise(value: &str) -> String {
    value.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitise_replaces_non_alphanumerics() {
        assert_eq!(sanitise("/edev/1?s=0"), "_edev_1_s_0");
    }

    #[test]
    fn write_all_creates_one_pair_per_server_response() {
        use cactus_protocol::{RequestDescriptor, RequestRecord};
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let entries = vec![ResponseTrackerEntry::ServerResponse(RequestRecord {
            descriptor: RequestDescriptor { client_alias: "client-1".into(), step_id: "s1".into(), method: "GET".into(), path: "/edev".into() },
            attempt: 0,
            status: Some(200),
            request_body: Some("<x/>".into()),
            response_body: Some("<y/>".into()),
            validation: None,
            duration: Duration::from_millis(1),
        })];

        write_all(dir.path(), &entries).unwrap();
        let expected_stem = "0-client-1-GET-_edev";
        assert!(dir.path().join(format!("{expected_stem}.request")).is_file());
        assert!(dir.path().join(format!("{expected_stem}.response")).is_file());
    }
}
